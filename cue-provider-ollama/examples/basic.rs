//! Basic usage of the Ollama client.
//!
//! Make sure Ollama is running locally with the model pulled and run:
//!   cargo run -p cue-provider-ollama --example basic

use cue_provider_ollama::Ollama;
use cue_types::Generator;
use futures::StreamExt;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Ollama::new();

    // Whole answer at once.
    let text = client.generate("Say hello in one sentence.").await?;
    println!("Response: {text}");

    // Fragments as they arrive.
    let mut chunks = client.generate_stream("Count from one to five.").await?;
    while let Some(chunk) = chunks.next().await {
        print!("{}", chunk?.response);
        std::io::stdout().flush()?;
    }
    println!();

    Ok(())
}
