// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod analyze;
pub mod config;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod signal;
pub mod store;

// ---- Re-exports for stable public API ----
pub use analyze::ai_adapter;
pub use crate::ingest::{BatchSummary, Pipeline, SourceReport};
pub use crate::signal::{GeoPoint, RiskLevel, Signal, SignalStatus, SourceId, CITY_CENTROID};
