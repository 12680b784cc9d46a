//! Translate free-text plans into PDDL action sequences with an LLM.
//!
//! The model is asked to wrap its answer in `[PDDL PLAN]` / `[PDDL PLAN END]`
//! markers; the text between them is the plan.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::OpenRouterClient;
use crate::error::Result;
use crate::translate::chat_types::ChatCompletionRequest;
use crate::translate::Message;
use crate::usage::{SharedLedger, UsageRecord};

/// Model used when the caller does not pick one.
pub const DEFAULT_TRANSLATOR_MODEL: &str = "openai/gpt-4o";

pub const PLAN_START: &str = "[PDDL PLAN]";
pub const PLAN_END: &str = "[PDDL PLAN END]";

/// Text answer plus the token usage the backend reported for it.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub text: String,
    pub usage: Option<UsageRecord>,
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }
}

/// Anything that can answer a list of chat messages with text.
#[allow(async_fn_in_trait)]
pub trait ChatBackend {
    async fn complete(&self, model: &str, messages: Vec<Message>) -> Result<Completion>;
}

impl ChatBackend for OpenRouterClient {
    async fn complete(&self, model: &str, messages: Vec<Message>) -> Result<Completion> {
        let resp = self
            .chat_completion(&ChatCompletionRequest::new(model, messages))
            .await?;
        Ok(Completion {
            text: resp.first_content().to_string(),
            usage: UsageRecord::from_chat(&resp),
        })
    }
}

impl<B: ChatBackend> ChatBackend for &B {
    async fn complete(&self, model: &str, messages: Vec<Message>) -> Result<Completion> {
        (**self).complete(model, messages).await
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainInfo {
    pub domain_name: String,
    /// Optional natural-language description of the available actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceInfo {
    pub instance_id: u64,
}

pub struct PlanTranslator<B> {
    backend: B,
    model: String,
    ledger: Option<SharedLedger>,
}

impl<B: ChatBackend> PlanTranslator<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            model: DEFAULT_TRANSLATOR_MODEL.to_string(),
            ledger: None,
        }
    }

    /// Record the usage of every translation in `ledger`.
    #[must_use]
    pub fn with_ledger(mut self, ledger: SharedLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model to rewrite `text` as a PDDL plan.
    /// Returns `(plan, raw_translation)`.
    pub async fn text_to_plan(
        &self,
        text: &str,
        domain: &DomainInfo,
        instance: &InstanceInfo,
    ) -> Result<(String, String)> {
        let messages = build_messages(text, domain);

        info!(
            model = %self.model,
            domain = %domain.domain_name,
            instance = instance.instance_id,
            "Translating plan"
        );

        let Completion { text: raw, usage } = self.backend.complete(&self.model, messages).await?;
        if let (Some(ledger), Some(record)) = (&self.ledger, usage) {
            ledger.record(record);
        }
        let plan = extract_plan(&raw);

        debug!(plan_len = plan.len(), raw_len = raw.len(), "Plan translated");

        Ok((plan, raw))
    }
}

fn build_messages(text: &str, domain: &DomainInfo) -> Vec<Message> {
    let mut system = format!(
        "You translate natural-language plans into PDDL action sequences for the \
         '{}' domain. Write one action per line in the form (action arg1 arg2). \
         Wrap the plan between {PLAN_START} and {PLAN_END}.",
        domain.domain_name
    );
    if let Some(ref description) = domain.description {
        system.push_str("\n\nDomain description:\n");
        system.push_str(description);
    }

    vec![Message::system(system), Message::user(text)]
}

/// Text between the plan markers, trimmed. Without a start marker the whole
/// trimmed text is returned; a missing end marker runs to the end of the text.
#[must_use]
pub fn extract_plan(raw: &str) -> String {
    let Some(start) = raw.find(PLAN_START) else {
        return raw.trim().to_string();
    };
    let body = &raw[start + PLAN_START.len()..];
    let body = body.find(PLAN_END).map_or(body, |end| &body[..end]);
    body.trim().to_string()
}
