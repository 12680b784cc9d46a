//! Token usage ledger for cost and quota tracking.
//!
//! Records are appended to a JSONL file and mirrored in a bounded in-memory
//! ring so recent history and totals are available without re-reading disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::translate::chat_types::ChatCompletionResponse;
use crate::translate::responses_types::Response;

const MAX_RECORDS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub timestamp: DateTime<Utc>,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl UsageRecord {
    pub fn new(model: impl Into<String>, prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            model: model.into(),
            response_id: None,
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }

    /// `None` when the response carries no usage block.
    #[must_use]
    pub fn from_response(resp: &Response) -> Option<Self> {
        let usage = resp.usage.as_ref()?;
        Some(Self {
            timestamp: Utc::now(),
            model: resp.model.clone(),
            response_id: (!resp.id.is_empty()).then(|| resp.id.clone()),
            prompt_tokens: usage.prompt_tokens(),
            completion_tokens: usage.completion_tokens(),
            total_tokens: usage.total(),
        })
    }

    /// Same as [`UsageRecord::from_response`] for Chat Completions results.
    #[must_use]
    pub fn from_chat(resp: &ChatCompletionResponse) -> Option<Self> {
        let usage = resp.usage.as_ref()?;
        let total_tokens = if usage.total_tokens > 0 {
            usage.total_tokens
        } else {
            usage.prompt_tokens.saturating_add(usage.completion_tokens)
        };
        Some(Self {
            timestamp: Utc::now(),
            model: resp.model.clone(),
            response_id: (!resp.id.is_empty()).then(|| resp.id.clone()),
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageTotals {
    pub requests: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

pub struct UsageLedger {
    records: VecDeque<UsageRecord>,
    file_path: PathBuf,
    writer: BufWriter<File>,
}

impl UsageLedger {
    /// Open (or create) a ledger file, loading the most recent records.
    pub fn open(file_path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut records = VecDeque::with_capacity(MAX_RECORDS);

        if file_path.exists() {
            let reader = BufReader::new(File::open(&file_path)?);
            for line in reader.lines().map_while(std::result::Result::ok) {
                match serde_json::from_str::<UsageRecord>(&line) {
                    Ok(record) => {
                        if records.len() >= MAX_RECORDS {
                            records.pop_front();
                        }
                        records.push_back(record);
                    }
                    Err(e) => tracing::debug!(error = %e, "Skipping malformed usage line"),
                }
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;

        Ok(Self {
            records,
            file_path,
            writer: BufWriter::new(file),
        })
    }

    pub fn record(&mut self, record: UsageRecord) {
        if let Ok(json) = serde_json::to_string(&record) {
            let written = writeln!(self.writer, "{json}").and_then(|()| self.writer.flush());
            if let Err(e) = written {
                tracing::warn!(path = %self.file_path.display(), error = %e, "Failed to persist usage");
            }
        }
        if self.records.len() >= MAX_RECORDS {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<UsageRecord> {
        self.records.iter().rev().take(limit).cloned().collect()
    }

    #[must_use]
    pub fn totals(&self) -> UsageTotals {
        self.records.iter().fold(UsageTotals::default(), |acc, r| UsageTotals {
            requests: acc.requests.saturating_add(1),
            prompt_tokens: acc.prompt_tokens.saturating_add(r.prompt_tokens),
            completion_tokens: acc.completion_tokens.saturating_add(r.completion_tokens),
            total_tokens: acc.total_tokens.saturating_add(r.total_tokens),
        })
    }
}

#[derive(Clone)]
pub struct SharedLedger(Arc<Mutex<UsageLedger>>);

impl SharedLedger {
    pub fn open(file_path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self(Arc::new(Mutex::new(UsageLedger::open(file_path)?))))
    }

    pub fn record(&self, record: UsageRecord) {
        if let Ok(mut ledger) = self.0.lock() {
            ledger.record(record);
        }
    }

    /// Record a response's usage, if it reported any.
    pub fn record_response(&self, resp: &Response) {
        if let Some(record) = UsageRecord::from_response(resp) {
            self.record(record);
        }
    }

    pub fn recent(&self, limit: usize) -> Vec<UsageRecord> {
        self.0.lock().map(|l| l.recent(limit)).unwrap_or_default()
    }

    pub fn totals(&self) -> UsageTotals {
        self.0.lock().map(|l| l.totals()).unwrap_or_default()
    }
}
