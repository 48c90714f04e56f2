// src/metrics.rs
use std::path::{Path, PathBuf};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub const ENV_METRICS_PATH: &str = "INGEST_METRICS_PATH";

/// Prometheus recorder whose rendering is written to a file when the run ends,
/// for a node_exporter textfile collector.
pub struct MetricsSnapshot {
    handle: PrometheusHandle,
    path: PathBuf,
}

impl MetricsSnapshot {
    /// Install the recorder if `$INGEST_METRICS_PATH` is set; otherwise metrics stay no-ops.
    pub fn from_env() -> anyhow::Result<Option<Self>> {
        match std::env::var(ENV_METRICS_PATH) {
            Ok(p) if !p.trim().is_empty() => Ok(Some(Self::install(PathBuf::from(p))?)),
            _ => Ok(None),
        }
    }

    pub fn install(path: PathBuf) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        Ok(Self { handle, path })
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write atomically (tmp file + rename) so a scraper never sees a partial file.
    pub fn write(&self) -> std::io::Result<()> {
        let tmp = self.path.with_extension("prom.tmp");
        std::fs::write(&tmp, self.render())?;
        std::fs::rename(tmp, &self.path)
    }
}
