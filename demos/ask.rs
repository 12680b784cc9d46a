//! Send one prompt through the shared OpenRouter client.
//!
//! Usage:
//!   export OPENROUTER_API_KEY=sk-or-...
//!   cargo run --example ask -- "Why is the sky blue?"

use openrouter_kit::translate::responses_types::ResponsesRequest;
use openrouter_kit::{extract_text, shared, Message, DEFAULT_TRANSLATOR_MODEL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Say hello in one word.".to_string());

    let client = shared()?;
    let messages = vec![Message::system("Answer briefly."), Message::user(prompt)];

    let resp = client
        .create_response(&ResponsesRequest::from_messages(
            DEFAULT_TRANSLATOR_MODEL,
            &messages,
        ))
        .await?;

    println!("{}", extract_text(&resp));
    if let Some(usage) = resp.usage {
        println!(
            "(in={} out={})",
            usage.prompt_tokens(),
            usage.completion_tokens()
        );
    }
    Ok(())
}
