// src/ingest/types.rs
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::analyze::classification::ParseClassification;
use crate::analyze::prompt::PromptFields;
use crate::error::{MappingError, SourceError};
use crate::signal::Signal;

/// One participatory report, flattened from its `{field, value}` answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReport {
    pub fields: BTreeMap<String, String>,
    /// False when the element had no `answers` array at all.
    pub has_answers: bool,
}

impl RawReport {
    /// Flatten one element of the export. Later duplicates of a field win;
    /// `null` values are treated as absent and other non-strings become JSON text.
    pub fn from_value(v: &Value) -> Self {
        let Some(answers) = v.get("answers").and_then(Value::as_array) else {
            return Self {
                fields: BTreeMap::new(),
                has_answers: false,
            };
        };
        let mut fields = BTreeMap::new();
        for item in answers {
            let Some(field) = item.get("field").and_then(Value::as_str) else {
                continue;
            };
            let value = match item.get("value") {
                None | Some(Value::Null) => continue,
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
            fields.insert(field.to_string(), value);
        }
        Self {
            fields,
            has_answers: true,
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// One entry of the outbreak news feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNewsEntry {
    pub title: String,
    pub summary: String,
    pub link: String,
}

/// A source of raw records plus the mapping of (record, classification) to a signal.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    type Record: Send + Sync;
    type Classification: ParseClassification + Send;

    fn name(&self) -> &'static str;

    /// Enumerate the records once at batch start.
    async fn fetch_records(&self) -> Result<Vec<Self::Record>, SourceError>;

    /// Identifying title for logs.
    fn label(&self, record: &Self::Record) -> String;

    /// Prompt inputs for the record, or why it cannot be classified.
    fn prompt_fields<'a>(&self, record: &'a Self::Record)
        -> Result<PromptFields<'a>, MappingError>;

    fn to_signal(
        &self,
        record: &Self::Record,
        classification: Self::Classification,
    ) -> Result<Signal, MappingError>;
}
