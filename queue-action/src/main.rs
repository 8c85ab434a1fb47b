//! Push Run Result - sends the current workflow run to an Azure Storage queue.
//!
//! Any failure is fatal: the error is returned from `main` and the process
//! exits non-zero. Logs go to stderr; stdout carries only workflow commands.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use runqueue::output::{self, DATA_SENT};
use runqueue::{push_run_result, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_writer(std::io::stderr),
        )
        .init();

    tracing::info!("action_starting");

    // Load configuration from environment
    let config = Config::from_env();
    tracing::info!(
        storage_account = %config.connection.storage_account_name,
        account_key_set = !config.connection.storage_account_key.is_empty(),
        queue = %config.connection.queue_name,
        service_url = ?config.connection.service_url,
        output_file_set = config.output_file.is_some(),
        "config_loaded"
    );

    let delivery = push_run_result(&config)
        .await
        .context("Failed to push run result to queue")?;

    output::emit(DATA_SENT, &delivery.payload, config.output_file.as_deref())
        .context("Failed to write step output")?;

    tracing::info!(
        message_id = %delivery.message.message_id,
        expiration_time = %delivery.message.expiration_time,
        "action_complete"
    );

    Ok(())
}
