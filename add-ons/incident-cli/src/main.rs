//! Incident Interview CLI
//!
//! Runs one guided voice interview in the terminal over the simulated voice channel. The
//! finished answers are printed to stdout as JSON for the report renderer; logs go to stderr.

mod commands;
mod repl;

use incident_core::{InterviewConfig, LanguageGate, QuestionCatalog};
use incident_voice::VoiceEngines;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[incident-cli] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = InterviewConfig::load()?;
    let engines = VoiceEngines::simulated(&config.simulation);
    let mut gate = LanguageGate::new(
        Arc::new(QuestionCatalog::standard()),
        engines,
        config.clone(),
    );
    if let Some(language) = config.default_language.as_deref() {
        if let Err(e) = gate.select_language(language) {
            tracing::warn!(error = %e, "ignoring configured default language");
        }
    }

    let outcome = repl::run(gate, BufReader::new(tokio::io::stdin()), &mut std::io::stdout()).await?;
    tracing::info!(?outcome, "CLI finished");
    Ok(())
}
