//! Push Run Result - CI action that enqueues workflow run metadata.
//!
//! The binary reads run metadata from the runner environment, encodes it as
//! JSON, and enqueues it on an Azure Storage queue for downstream consumers.
//!
//! ## Flow
//!
//! ```text
//! Environment → Config → RunInfo JSON → QueueClient::enqueue → ::set-output
//! ```

pub mod action;
pub mod config;
pub mod output;
pub mod queue;

// Re-export commonly used types
pub use action::{push_run_result, Delivery};
pub use config::{Config, ConnectionInfo};
pub use queue::{
    DequeuedMessage, EnqueueOptions, EnqueuedMessage, QueueClient, QueueEndpoint, QueueError,
    RunInfo,
};
