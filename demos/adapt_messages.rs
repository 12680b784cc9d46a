//! Demonstrate the message adapters without touching the network.
//!
//! Usage:
//!   `cargo run --example adapt_messages`

use openrouter_kit::translate::responses_types::{
    OutputContent, OutputItem, Response, ResponseUsage, ResponsesRequest,
};
use openrouter_kit::{extract_text, to_plain_mapping, Message};

fn main() {
    // Chat-style conversation, system guidance mixed in
    let messages = vec![
        Message::system("You are a geography expert."),
        Message::system("Be concise."),
        Message::user("What is the capital of France?"),
        Message::assistant("Paris."),
        Message::user("And Germany?"),
    ];

    let req = ResponsesRequest::from_messages("openai/gpt-4o", &messages);

    println!("=== Responses request ===");
    println!("{}", serde_json::to_string_pretty(&req).unwrap_or_default());

    // What the routing service might send back
    let resp = Response {
        id: "resp_demo".to_string(),
        model: "openai/gpt-4o".to_string(),
        output: vec![OutputItem::message(vec![
            OutputContent::output_text("Berlin"),
            OutputContent::output_text("."),
        ])],
        usage: Some(ResponseUsage::new(42, 2)),
        ..Default::default()
    };

    println!();
    println!("=== Extracted text ===");
    println!("{}", extract_text(&resp));

    println!();
    println!("=== Plain mapping ===");
    let plain = serde_json::Value::Object(to_plain_mapping(&resp));
    println!("{}", serde_json::to_string_pretty(&plain).unwrap_or_default());
}
