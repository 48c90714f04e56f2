//! Lists the Gemini models this API key can use for `generateContent`.

use std::time::Duration;

use anyhow::Context;
use vigimanaus_ingest::analyze::ai_adapter::GeminiClient;
use vigimanaus_ingest::config::ModelConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let get = |k: &str| std::env::var(k).ok().filter(|v| !v.trim().is_empty());
    let cfg = ModelConfig::from_lookup(&get)?;
    let client = GeminiClient::new(cfg.api_key, cfg.model, Duration::from_secs(30))?;

    let models = client.list_models().await.context("listing models")?;
    println!("--- models available for generateContent ---");
    for m in models {
        match m.display_name {
            Some(d) => println!("- {} ({d})", m.name),
            None => println!("- {}", m.name),
        }
    }
    Ok(())
}
