// src/ingest/mod.rs
//! Batch runner: fetch records, then classify, map and persist them one at a time.
//!
//! A record failure is logged, counted and skipped. A source failure skips the
//! source. Neither stops the run.

pub mod providers;
pub mod rate_limit;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::analyze::Classifier;
use crate::error::{RecordError, RecordStage, SourceError};
use crate::ingest::rate_limit::RateLimiter;
use crate::ingest::types::SourceAdapter;
use crate::store::SignalStore;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "ingest_records_total",
            "Records processed, labelled by source and outcome."
        );
        describe_counter!(
            "ingest_source_unavailable_total",
            "Sources skipped because they could not be enumerated."
        );
        describe_counter!(
            "ingest_classification_defaults_total",
            "Classification fields that fell back to a default."
        );
        describe_histogram!("ingest_model_call_ms", "Model call latency in milliseconds.");
        describe_gauge!("ingest_last_run_ts", "Unix ts when a source last finished.");
    });
}

/// Terminal counts of one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub source: &'static str,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug)]
pub enum SourceReport {
    Completed(BatchSummary),
    Skipped(SourceError),
}

/// Shared collaborators of a run.
pub struct Pipeline<'a, L: RateLimiter + ?Sized> {
    pub classifier: &'a Classifier,
    pub limiter: &'a L,
}

impl<L: RateLimiter + ?Sized> Pipeline<'_, L> {
    /// Process every record of one source.
    pub async fn run_source<A, S>(
        &self,
        adapter: &A,
        store: &mut S,
    ) -> Result<BatchSummary, SourceError>
    where
        A: SourceAdapter,
        S: SignalStore + ?Sized,
    {
        ensure_metrics_described();
        let source = adapter.name();
        info!(source, "processing source");

        let records = adapter.fetch_records().await?;

        let mut summary = BatchSummary {
            source,
            succeeded: 0,
            failed: 0,
        };
        for record in &records {
            let title = adapter.label(record);
            match self.process_record(adapter, record, store).await {
                Ok(()) => {
                    summary.succeeded += 1;
                    counter!("ingest_records_total", "source" => source, "outcome" => "ok")
                        .increment(1);
                    info!(source, title = %title, "signal stored");
                }
                Err(e) => {
                    summary.failed += 1;
                    counter!("ingest_records_total", "source" => source, "outcome" => "error")
                        .increment(1);
                    warn!(source, title = %title, stage = %e.stage, error = %e.failure, "record failed");
                }
            }
        }

        gauge!("ingest_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        info!(
            source,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "source finished"
        );
        Ok(summary)
    }

    async fn process_record<A, S>(
        &self,
        adapter: &A,
        record: &A::Record,
        store: &mut S,
    ) -> Result<(), RecordError>
    where
        A: SourceAdapter,
        S: SignalStore + ?Sized,
    {
        let fields = adapter
            .prompt_fields(record)
            .map_err(|e| RecordError::at(RecordStage::Extracting, e))?;

        self.limiter.acquire().await;
        let parsed = self
            .classifier
            .classify::<A::Classification>(&fields)
            .await
            .map_err(|e| RecordError::at(RecordStage::Classifying, e))?;
        if !parsed.defaulted.is_empty() {
            debug!(
                source = adapter.name(),
                fields = ?parsed.defaulted,
                "classification fell back to defaults"
            );
        }

        let signal = adapter
            .to_signal(record, parsed.value)
            .map_err(|e| RecordError::at(RecordStage::Mapping, e))?;

        store
            .insert(&signal)
            .await
            .map_err(|e| RecordError::at(RecordStage::Persisting, e))
    }

    /// Run a source and turn an unavailable source into a skip.
    pub async fn run_or_skip<A, S>(&self, adapter: &A, store: &mut S) -> SourceReport
    where
        A: SourceAdapter,
        S: SignalStore + ?Sized,
    {
        match self.run_source(adapter, store).await {
            Ok(summary) => SourceReport::Completed(summary),
            Err(e) => {
                counter!("ingest_source_unavailable_total", "source" => e.source_name).increment(1);
                warn!(source = e.source_name, reason = %e.reason, "source skipped");
                SourceReport::Skipped(e)
            }
        }
    }
}
