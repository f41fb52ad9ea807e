use std::future::Future;
use std::io::Write;

use cue::config::usage;
use cue::{Backend, ClipboardSink, CueError, Invocation, Session, parse_args};
use cue_types::Generator;
use futures::StreamExt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run_cli().await {
        eprintln!("cue error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), CueError> {
    let (config, prompt) = match parse_args(std::env::args().skip(1))? {
        Invocation::Help => {
            println!("{}", usage());
            return Ok(());
        }
        Invocation::Run { config, prompt } => (config, prompt),
    };

    let backend = config.backend();
    match prompt {
        Some(prompt) => one_shot(&backend, &prompt).await,
        None => interactive(backend, config.clipboard()).await,
    }
}

/// Generate once and print. Over HTTP, fragments are printed as they arrive.
async fn one_shot(backend: &Backend, prompt: &str) -> Result<(), CueError> {
    match backend {
        Backend::Http(client) => {
            let mut chunks = client.generate_stream(prompt).await?;
            let mut stdout = std::io::stdout();
            while let Some(chunk) = chunks.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        writeln!(stdout)?;
                        return Err(err.into());
                    }
                };
                write!(stdout, "{}", chunk.response)?;
                stdout.flush()?;
            }
            writeln!(stdout)?;
        }
        Backend::Process(cli) => println!("{}", cli.generate(prompt).await?),
    }
    Ok(())
}

enum Command<'a> {
    Prompt(&'a str),
    List,
    Copy(usize),
    Remove(usize),
    Help,
    Quit,
    Invalid(String),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Prompt(line);
        };
        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default();
        let position = words.next().map(str::parse::<usize>);
        match (name, position) {
            ("list", None) => Command::List,
            ("help", None) => Command::Help,
            ("quit" | "exit", None) => Command::Quit,
            ("copy", Some(Ok(n))) if n > 0 => Command::Copy(n - 1),
            ("remove", Some(Ok(n))) if n > 0 => Command::Remove(n - 1),
            _ => Command::Invalid(format!("unrecognized command: /{rest}")),
        }
    }
}

/// Next input line; `None` at end of input or once `interrupt` fires.
async fn next_input<R>(
    lines: &mut Lines<R>,
    interrupt: impl Future<Output = std::io::Result<()>>,
) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    tokio::select! {
        line = lines.next_line() => line,
        Ok(()) = interrupt => Ok(None),
    }
}

const COMMANDS: &str = "type a prompt, or: /list, /copy N, /remove N, /help, /quit";

async fn interactive(
    backend: Backend,
    clipboard: Option<cue::CommandClipboard>,
) -> Result<(), CueError> {
    let mut session = Session::new(backend);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{COMMANDS}");
    // After the first `ctrl_c()` SIGINT no longer terminates the process.
    while let Some(line) = next_input(&mut lines, tokio::signal::ctrl_c()).await? {
        match Command::parse(&line) {
            Command::Prompt("") => {}
            Command::Prompt(prompt) => {
                session.submit(prompt)?;
                let finished = tokio::select! {
                    result = session.finish() => Some(result),
                    _ = tokio::signal::ctrl_c() => None,
                };
                let outcome = match finished {
                    Some(result) => result,
                    None => {
                        session.cancel();
                        session.finish().await
                    }
                };
                match outcome {
                    Ok(id) => {
                        if let Some(entry) = session.history().get(id) {
                            println!("{}", entry.generated_text());
                        }
                    }
                    Err(_) => {
                        if let Some(message) = session.last_error() {
                            println!("{message}");
                        }
                    }
                }
            }
            Command::List => {
                if session.history().is_empty() {
                    println!("(no results yet)");
                }
                for (n, entry) in session.history().iter().enumerate() {
                    println!("{}. {}\n   {}", n + 1, entry.prompt(), entry.generated_text());
                }
            }
            Command::Copy(index) => {
                let Some(entry) = session.history().nth(index) else {
                    println!("no result #{}", index + 1);
                    continue;
                };
                match &clipboard {
                    Some(sink) => match sink.copy(entry.generated_text()).await {
                        Ok(()) => println!("copied #{}", index + 1),
                        Err(err) => println!("Error: {err}"),
                    },
                    None => println!("no clipboard command configured"),
                }
            }
            Command::Remove(index) => {
                match session.history().nth(index).map(|e| e.id()) {
                    Some(id) => {
                        session.remove(id);
                        println!("removed #{}", index + 1);
                    }
                    None => println!("no result #{}", index + 1),
                }
            }
            Command::Help => println!("{COMMANDS}\n{}", usage()),
            Command::Quit => break,
            Command::Invalid(message) => println!("{message}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn next_input_returns_lines_until_eof() {
        let mut lines = BufReader::new(&b"first\n/list\n"[..]).lines();
        let pending = || std::future::pending::<std::io::Result<()>>();
        assert_eq!(next_input(&mut lines, pending()).await.unwrap().as_deref(), Some("first"));
        assert_eq!(next_input(&mut lines, pending()).await.unwrap().as_deref(), Some("/list"));
        assert_eq!(next_input(&mut lines, pending()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn interrupt_at_idle_prompt_ends_input() {
        // The writer stays open, so reading would wait forever.
        let (_writer, reader) = tokio::io::duplex(64);
        let mut lines = BufReader::new(reader).lines();
        let line = next_input(&mut lines, async { Ok::<(), std::io::Error>(()) }).await.unwrap();
        assert_eq!(line, None);
    }

    #[tokio::test]
    async fn failed_interrupt_listener_keeps_reading() {
        let mut lines = BufReader::new(&b"still here\n"[..]).lines();
        let broken = async { Err::<(), _>(std::io::Error::other("no signal handler")) };
        let line = next_input(&mut lines, broken).await.unwrap();
        assert_eq!(line.as_deref(), Some("still here"));
    }

    #[test]
    fn commands_parse_one_based_positions() {
        assert!(matches!(Command::parse("/copy 1"), Command::Copy(0)));
        assert!(matches!(Command::parse(" /remove 3 "), Command::Remove(2)));
        assert!(matches!(Command::parse("/copy 0"), Command::Invalid(_)));
        assert!(matches!(Command::parse("/exit"), Command::Quit));
        assert!(matches!(Command::parse("hello"), Command::Prompt("hello")));
    }
}
