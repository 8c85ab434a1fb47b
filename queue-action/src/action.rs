//! The action's single flow: serialize the run record and enqueue it.

use tracing::info;

use crate::config::Config;
use crate::queue::{EnqueueOptions, EnqueuedMessage, QueueClient, QueueEndpoint, QueueError};

/// What was sent, and where the service put it.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// JSON body of the message, as enqueued.
    pub payload: String,
    pub message: EnqueuedMessage,
}

/// Push the configured run record onto the configured queue.
///
/// Uses the service defaults: visible immediately, default time-to-live.
pub async fn push_run_result(config: &Config) -> Result<Delivery, QueueError> {
    let payload = config.run.to_json()?;

    let endpoint = QueueEndpoint::from_connection(&config.connection)?;
    let client = QueueClient::new(endpoint)?;

    info!(
        queue = %client.endpoint().queue_name(),
        workflow = %config.run.workflow,
        run_id = %config.run.run_id,
        "run_result_sending"
    );

    let message = client.enqueue(&payload, &EnqueueOptions::default()).await?;

    Ok(Delivery { payload, message })
}
