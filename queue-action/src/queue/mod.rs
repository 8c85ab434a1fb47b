//! Queue module for Azure Storage queue operations.
//!
//! This module provides:
//! - The run record and queue wire types
//! - Endpoint construction and Shared Key signing
//! - An async client for enqueueing (and receiving) messages
//!
//! ## Flow
//!
//! ```text
//! RunInfo → JSON → QueueEndpoint (url + credential) → QueueClient::enqueue
//! ```

pub mod client;
pub mod endpoint;
pub mod error;
pub mod signature;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{EnqueueOptions, QueueClient, API_VERSION};
pub use endpoint::{QueueEndpoint, QUEUE_SERVICE_HOST};
pub use error::QueueError;
pub use signature::SharedKeyCredential;
pub use types::{DequeuedMessage, EnqueuedMessage, RunInfo};
