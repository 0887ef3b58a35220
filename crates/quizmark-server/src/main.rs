//! quizmark server — the grading API binary.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use quizmark_core::store::SubmissionStore;
use quizmark_providers::{create_provider, load_config_from};

mod id;
mod routes;

use id::IdAllocator;
use routes::{build_router, AppState};

#[derive(Parser)]
#[command(name = "quizmark", version, about = "LLM-graded short-answer quiz server")]
struct Cli {
    /// Config file path (default: quizmark.toml, then ~/.config/quizmark/)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bind address override (e.g. 0.0.0.0:8080)
    #[arg(long)]
    bind: Option<String>,

    /// Submission container path override
    #[arg(long)]
    data_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizmark=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config_from(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(data_file) = cli.data_file {
        config.data_file = data_file;
    }

    let provider = create_provider(&config.provider)?;
    info!(provider = provider.name(), "grading provider ready");

    let store = SubmissionStore::new(&config.data_file);
    store.initialize().await?;
    info!(container = %store.path().display(), "submission store ready");

    let state = Arc::new(AppState {
        store,
        provider: Arc::from(provider),
        ids: IdAllocator::new(),
    });
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(addr = %config.bind, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
