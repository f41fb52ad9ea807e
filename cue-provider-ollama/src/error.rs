//! Internal error helpers for mapping HTTP/reqwest errors to [`GenerationError`].

use std::time::Duration;

use cue_types::GenerationError;

/// Map a non-success HTTP status from Ollama to a [`GenerationError`].
///
/// Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md>
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> GenerationError {
    GenerationError::ServerError {
        status: status.as_u16(),
        body: body.to_string(),
    }
}

/// Map a [`reqwest::Error`] to a [`GenerationError`].
///
/// `timeout` is the per-request timeout the client was configured with, if any.
pub(crate) fn map_reqwest_error(err: reqwest::Error, timeout: Option<Duration>) -> GenerationError {
    match timeout {
        Some(limit) if err.is_timeout() => GenerationError::TimedOut(limit),
        _ => GenerationError::TransportFailure(Box::new(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_500_maps_to_server_error() {
        let err = map_http_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "internal error");
        assert!(matches!(
            err,
            GenerationError::ServerError { status: 500, ref body } if body == "internal error"
        ));
    }

    #[test]
    fn status_404_keeps_body() {
        let err = map_http_status(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"error":"model 'foo' not found"}"#,
        );
        match err {
            GenerationError::ServerError { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"), "expected body in error: {body}");
            }
            other => panic!("expected ServerError, got: {other:?}"),
        }
    }

    #[test]
    fn empty_body_preserved_in_error() {
        let err = map_http_status(reqwest::StatusCode::BAD_GATEWAY, "");
        assert!(matches!(
            err,
            GenerationError::ServerError { status: 502, ref body } if body.is_empty()
        ));
    }
}
