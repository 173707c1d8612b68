//! Bufferline - Main Entry Point
//! Producers generate large random payloads into a bounded queue; consumers
//! summarize them into an append-only file.

mod config;

use anyhow::Result;
use std::io;
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bufferline_core::application::{Pipeline, PipelineSettings};
use bufferline_core::domain::{PipelineConfig, WorkerCount};
use bufferline_core::port::RandomAlphabetSource;
use bufferline_infra_system::{prompt_count, ConsoleSizeReporter, FileRecordSink};
use config::{DaemonConfig, LogFormat};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str =
    "bufferline=info,bufferline_core=info,bufferline_infra_system=info,bufferline_daemon=info";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env()?;

    // 2. Initialize logging
    let _log_guard = init_logging(config.log_format)?;
    info!("Bufferline v{} starting...", VERSION);

    // 3. Worker counts (env or interactive)
    let producers = match config.producers {
        Some(count) => count,
        None => ask_count("producers").await?,
    };
    let consumers = match config.consumers {
        Some(count) => count,
        None => ask_count("consumers").await?,
    };

    // 4. Setup dependencies (DI wiring)
    let sink = FileRecordSink::open(&config.output_path)
        .await
        .map_err(|e| anyhow::anyhow!("Opening {} failed: {}", config.output_path.display(), e))?;

    let pipeline = Pipeline::new(
        PipelineConfig::new(producers, consumers),
        PipelineSettings::default(),
        Arc::new(RandomAlphabetSource),
        Arc::new(sink),
        Arc::new(ConsoleSizeReporter::new()),
    )?;

    // 5. Start workers
    let handle = pipeline.start();

    info!(output = %config.output_path.display(), "System ready");
    info!("Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown
    let stats = handle.shutdown().await;
    info!(stats = %serde_json::to_string(&stats)?, "Shutdown complete.");

    Ok(())
}

fn init_logging(format: LogFormat) -> Result<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;
    let (writer, guard) = tracing_appender::non_blocking(io::stdout());

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(writer))
                .init();
        }
        LogFormat::Pretty => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(writer))
                .init();
        }
    }

    Ok(guard)
}

/// Prompt on stdin without blocking the runtime
async fn ask_count(label: &'static str) -> Result<WorkerCount> {
    let count = tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        prompt_count(&mut input, &mut output, label)
    })
    .await??;
    Ok(count)
}
