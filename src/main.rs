//! Ingestion run — Binary Entrypoint
//! Loads configuration, connects the signal store and processes both sources once.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vigimanaus_ingest::analyze::ai_adapter::GeminiClient;
use vigimanaus_ingest::analyze::Classifier;
use vigimanaus_ingest::config::AppConfig;
use vigimanaus_ingest::ingest::providers::{LocalReportsAdapter, NewsFeedAdapter};
use vigimanaus_ingest::ingest::rate_limit::FixedDelay;
use vigimanaus_ingest::ingest::{Pipeline, SourceReport};
use vigimanaus_ingest::metrics::MetricsSnapshot;
use vigimanaus_ingest::store::PgSignalStore;

/// `LOG_FORMAT=json` switches to JSON lines; `RUST_LOG` overrides the filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vigimanaus_ingest=info,warn"));

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shutdown {
    Interrupt,
    Terminate,
}

impl Shutdown {
    /// Shell convention: 128 + signal number.
    fn exit_code(self) -> u8 {
        match self {
            Shutdown::Interrupt => 130,
            Shutdown::Terminate => 143,
        }
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() -> Shutdown {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl-C, shutting down");
            Shutdown::Interrupt
        }
        _ = terminate => {
            info!("received terminate signal, shutting down");
            Shutdown::Terminate
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Everything is validated before the first network or database call.
    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "configuration error");
            return ExitCode::FAILURE;
        }
    };
    info!(
        model = %cfg.model.model,
        db_host = %cfg.db.host,
        db_name = %cfg.db.name,
        table = %cfg.pipeline.signal_table,
        "configuration loaded"
    );

    let metrics = match MetricsSnapshot::from_env() {
        Ok(m) => m,
        Err(e) => {
            warn!(error = %e, "metrics recorder not installed");
            None
        }
    };

    let model = match GeminiClient::new(
        cfg.model.api_key.clone(),
        cfg.model.model.clone(),
        cfg.pipeline.model_timeout(),
    ) {
        Ok(m) => m,
        Err(e) => {
            error!(error = %e, "cannot build model client");
            return ExitCode::FAILURE;
        }
    };
    let classifier = Classifier::new(Arc::new(model));
    let limiter = FixedDelay(cfg.pipeline.request_delay());

    let mut store = match PgSignalStore::connect(
        &cfg.db,
        &cfg.pipeline.signal_table,
        cfg.pipeline.db_statement_timeout(),
    )
    .await
    {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "cannot connect to signal store");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = Pipeline {
        classifier: &classifier,
        limiter: &limiter,
    };

    let run = async {
        let mut reports = Vec::with_capacity(2);

        let local = LocalReportsAdapter::new(&cfg.pipeline.reports_path)
            .with_location_max_chars(cfg.pipeline.location_max_chars);
        reports.push(pipeline.run_or_skip(&local, &mut store).await);

        match NewsFeedAdapter::from_url(&cfg.pipeline.feed_url, cfg.pipeline.feed_timeout()) {
            Ok(feed) => {
                let feed = feed.with_location_max_chars(cfg.pipeline.location_max_chars);
                reports.push(pipeline.run_or_skip(&feed, &mut store).await);
            }
            Err(e) => {
                warn!(source = e.source_name, reason = %e.reason, "source skipped");
                reports.push(SourceReport::Skipped(e));
            }
        }
        reports
    };

    let outcome = tokio::select! {
        reports = run => Ok(reports),
        sig = shutdown_signal() => Err(sig),
    };

    store.close().await;

    if let Some(m) = &metrics {
        if let Err(e) = m.write() {
            warn!(error = %e, path = %m.path().display(), "cannot write metrics snapshot");
        }
    }

    match outcome {
        Ok(reports) => {
            for r in &reports {
                match r {
                    SourceReport::Completed(s) => info!(
                        source = s.source,
                        succeeded = s.succeeded,
                        failed = s.failed,
                        "summary"
                    ),
                    SourceReport::Skipped(e) => {
                        warn!(source = e.source_name, reason = %e.reason, "summary: skipped")
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(sig) => {
            warn!(signal = ?sig, "interrupted; connection closed");
            ExitCode::from(sig.exit_code())
        }
    }
}
