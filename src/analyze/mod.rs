// src/analyze/mod.rs
//! Classification step: prompt -> model -> sanitize -> typed parse.

pub mod ai_adapter;
pub mod classification;
pub mod prompt;
pub mod sanitize;

use std::time::Instant;

use metrics::{counter, histogram};

use crate::analyze::ai_adapter::DynModelClient;
use crate::analyze::classification::{parse_classification, ParseClassification, Parsed};
use crate::analyze::prompt::PromptFields;
use crate::analyze::sanitize::extract_json_object;
use crate::error::ClassifyError;

// Re-export convenient types.
pub use crate::analyze::classification::{NewsClassification, ReportClassification};
pub use crate::analyze::prompt::SourceKind;

pub struct Classifier {
    model: DynModelClient,
}

impl Classifier {
    pub fn new(model: DynModelClient) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Render the prompt for `fields` and classify it as `C`.
    pub async fn classify<C: ParseClassification>(
        &self,
        fields: &PromptFields<'_>,
    ) -> Result<Parsed<C>, ClassifyError> {
        let prompt = prompt::render(fields);
        self.classify_prompt(&prompt).await
    }

    pub async fn classify_prompt<C: ParseClassification>(
        &self,
        prompt: &str,
    ) -> Result<Parsed<C>, ClassifyError> {
        let t0 = Instant::now();
        let raw = self.model.generate(prompt).await;
        histogram!("ingest_model_call_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let json = extract_json_object(&raw?);
        let parsed = parse_classification::<C>(&json)?;
        for field in &parsed.defaulted {
            counter!("ingest_classification_defaults_total", "field" => *field).increment(1);
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::ai_adapter::MockModel;
    use crate::analyze::prompt::NewsPromptFields;
    use crate::error::{ModelError, ParseError};
    use std::sync::Arc;

    fn news_fields() -> PromptFields<'static> {
        PromptFields::News(NewsPromptFields {
            title: "Mpox em Manaus",
            summary: "Casos confirmados",
        })
    }

    #[tokio::test]
    async fn classifies_chatty_fenced_response() {
        let model = MockModel::fixed(
            "Claro!\n```json\n{\"relevante\": true, \"doenca\": \"Mpox\", \"nivel_risco\": \"Alto\"}\n```",
        );
        let c = Classifier::new(Arc::new(model));
        let parsed = c.classify::<NewsClassification>(&news_fields()).await.unwrap();
        assert!(parsed.value.relevant);
        assert_eq!(parsed.value.disease, "Mpox");
        assert_eq!(parsed.defaulted, vec!["local"]);
    }

    #[tokio::test]
    async fn model_failure_surfaces_as_model_error() {
        let model = MockModel::from_fn(|_| Err(ModelError::Other("quota exceeded".into())));
        let c = Classifier::new(Arc::new(model));
        let err = c.classify::<NewsClassification>(&news_fields()).await.unwrap_err();
        assert!(matches!(err, ClassifyError::Model(_)));
    }

    #[tokio::test]
    async fn prose_only_response_is_parse_error() {
        let c = Classifier::new(Arc::new(MockModel::fixed("I cannot help with that.")));
        let err = c.classify::<ReportClassification>(&news_fields()).await.unwrap_err();
        assert!(matches!(err, ClassifyError::Parse(ParseError::InvalidJson(_))));
    }
}
