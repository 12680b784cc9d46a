pub mod client;
pub mod config;
pub mod error;
pub mod planner;
pub mod translate;
pub mod usage;

pub use client::{shared, OpenRouterClient};
pub use config::{ClientConfig, Settings};
pub use error::{Result, RouterError};
pub use planner::{PlanTranslator, DEFAULT_TRANSLATOR_MODEL};
pub use translate::{extract_text, prepare, to_plain_mapping, Message, Role};
pub use usage::SharedLedger;
