//! Message-format adapters for the Responses API.
//!
//! Converts chat-style message lists into `instructions` + `input` requests and
//! turns responses back into text or plain JSON. All functions here are pure.

pub mod chat_types;
pub mod message;
pub mod request;
pub mod response;
pub mod responses_types;

pub use message::{Message, Role};
pub use request::{prepare, resolve_model};
pub use response::{extract_text, normalize_usage, to_plain_mapping};
