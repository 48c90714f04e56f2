// src/ingest/providers/local_reports.rs
//! Participatory health reports exported as a JSON array on disk.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::analyze::classification::ReportClassification;
use crate::analyze::prompt::{PromptFields, ReportPromptFields};
use crate::error::{MappingError, SourceError};
use crate::ingest::types::{RawReport, SourceAdapter};
use crate::signal::{Signal, SignalStatus, SourceId, LOCATION_MAX_CHARS};

pub const SOURCE_NAME: &str = "local_reports";
pub const DEFAULT_TITLE: &str = "Relato GdS";

pub const FIELD_TITLE: &str = "evento_descricao";
pub const FIELD_DETAILS: &str = "evento_detalhes";
pub const FIELD_LOCATION: &str = "evento_local_ocorrencia";
pub const FIELD_DATE: &str = "evento_data_ocorrencia";

pub struct LocalReportsAdapter {
    path: PathBuf,
    location_max_chars: usize,
}

impl LocalReportsAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            location_max_chars: LOCATION_MAX_CHARS,
        }
    }

    pub fn with_location_max_chars(mut self, n: usize) -> Self {
        self.location_max_chars = n;
        self
    }

    /// Parse the export text into reports.
    pub fn parse_export(&self, content: &str) -> Result<Vec<RawReport>, SourceError> {
        let items: Vec<Value> = serde_json::from_str(content).map_err(|e| {
            SourceError::new(
                SOURCE_NAME,
                format!("{} is not a JSON array: {e}", self.path.display()),
            )
        })?;
        Ok(items.iter().map(RawReport::from_value).collect())
    }
}

fn title_of(r: &RawReport) -> &str {
    r.get(FIELD_TITLE).unwrap_or(DEFAULT_TITLE)
}

#[async_trait]
impl SourceAdapter for LocalReportsAdapter {
    type Record = RawReport;
    type Classification = ReportClassification;

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_records(&self) -> Result<Vec<RawReport>, SourceError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SourceError::new(SOURCE_NAME, format!("reading {}: {e}", self.path.display()))
        })?;
        let reports = self.parse_export(&content)?;
        tracing::info!(
            source = SOURCE_NAME,
            path = %self.path.display(),
            records = reports.len(),
            "reports loaded"
        );
        Ok(reports)
    }

    fn label(&self, record: &RawReport) -> String {
        title_of(record).to_string()
    }

    fn prompt_fields<'a>(&self, r: &'a RawReport) -> Result<PromptFields<'a>, MappingError> {
        if !r.has_answers {
            return Err(MappingError::MissingInput("answers array"));
        }
        Ok(PromptFields::Report(ReportPromptFields {
            title: title_of(r),
            details: r.get(FIELD_DETAILS).unwrap_or_default(),
            location: r.get(FIELD_LOCATION).unwrap_or_default(),
        }))
    }

    fn to_signal(&self, r: &RawReport, c: ReportClassification) -> Result<Signal, MappingError> {
        Ok(Signal {
            title: title_of(r).to_string(),
            description: r.get(FIELD_DETAILS).unwrap_or_default().to_string(),
            status: SignalStatus::Pending,
            risk: c.risk,
            location: c.neighborhood,
            point: c.point,
            source: SourceId::LocalReports,
        }
        .truncate_location(self.location_max_chars))
    }
}
