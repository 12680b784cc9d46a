//! Turn chat-style message lists into Responses API requests.
//!
//! The Responses API carries system guidance in a dedicated `instructions`
//! field instead of `system` messages, so those are lifted out of the list.

use std::collections::HashMap;
use std::hash::BuildHasher;

use super::message::{Message, Role};
use super::responses_types::ResponsesRequest;

/// Split messages into `(instructions, conversation)`.
///
/// System entries are joined in order with a blank line. Everything else is
/// kept in order. The conversation is never empty: with no non-system
/// entries it holds a single empty user message.
#[must_use]
pub fn prepare(messages: &[Message]) -> (Option<String>, Vec<Message>) {
    let (system, conversation): (Vec<&Message>, Vec<&Message>) =
        messages.iter().partition(|m| m.role == Role::System);

    let instructions = if system.is_empty() {
        None
    } else {
        Some(
            system
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n"),
        )
    };

    let mut conversation: Vec<Message> = conversation.into_iter().cloned().collect();
    if conversation.is_empty() {
        conversation.push(Message::user(""));
    }

    (instructions, conversation)
}

/// Map a requested model through the alias table; unknown names pass through.
pub fn resolve_model<S: BuildHasher>(aliases: &HashMap<String, String, S>, requested: &str) -> String {
    aliases
        .get(requested)
        .cloned()
        .unwrap_or_else(|| requested.to_string())
}

impl ResponsesRequest {
    /// Build a request from a chat-style message list.
    pub fn from_messages(model: impl Into<String>, messages: &[Message]) -> Self {
        let (instructions, input) = prepare(messages);
        Self {
            model: model.into(),
            instructions,
            input,
            max_output_tokens: None,
            temperature: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_messages_become_instructions() {
        let messages = vec![
            Message::system("A"),
            Message::system("B"),
            Message::user("Q"),
        ];

        let (instructions, conversation) = prepare(&messages);

        assert_eq!(instructions.as_deref(), Some("A\n\nB"));
        assert_eq!(conversation, vec![Message::user("Q")]);
    }

    #[test]
    fn test_only_system_yields_placeholder() {
        let (instructions, conversation) = prepare(&[Message::system("A")]);

        assert_eq!(instructions.as_deref(), Some("A"));
        assert_eq!(conversation, vec![Message::user("")]);
    }

    #[test]
    fn test_no_system_means_no_instructions() {
        let messages = vec![
            Message::user("hi"),
            Message::assistant("hello"),
            Message::user("again"),
        ];

        let (instructions, conversation) = prepare(&messages);

        assert!(instructions.is_none());
        assert_eq!(conversation, messages);
    }

    #[test]
    fn test_interleaved_order_preserved() {
        let messages = vec![
            Message::user("1"),
            Message::system("s1"),
            Message::assistant("2"),
            Message::system("s2"),
            Message::user("3"),
        ];

        let (instructions, conversation) = prepare(&messages);

        assert_eq!(instructions.as_deref(), Some("s1\n\ns2"));
        let contents: Vec<_> = conversation.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["1", "2", "3"]);
    }

    #[test]
    fn test_empty_input() {
        let (instructions, conversation) = prepare(&[]);
        assert!(instructions.is_none());
        assert_eq!(conversation, vec![Message::user("")]);
    }

    #[test]
    fn test_request_skips_missing_instructions() {
        let req = ResponsesRequest::from_messages("openai/gpt-4o", &[Message::user("hi")]);
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["model"], "openai/gpt-4o");
        assert!(json.get("instructions").is_none());
        assert_eq!(json["input"][0]["role"], "user");
    }

    #[test]
    fn test_alias_resolution() {
        let aliases = HashMap::from([("fast".to_string(), "openai/gpt-4o-mini".to_string())]);
        assert_eq!(resolve_model(&aliases, "fast"), "openai/gpt-4o-mini");
        assert_eq!(resolve_model(&aliases, "openai/gpt-4o"), "openai/gpt-4o");
    }
}
