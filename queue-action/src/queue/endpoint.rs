//! Queue endpoint construction: queue URL plus signing credential.

use tracing::info;
use url::Url;

use super::error::{QueueError, Result};
use super::signature::SharedKeyCredential;
use crate::config::ConnectionInfo;

/// Host suffix of the public queue service.
pub const QUEUE_SERVICE_HOST: &str = "queue.core.windows.net";

/// A fully resolved, authenticated reference to one queue.
#[derive(Debug, Clone)]
pub struct QueueEndpoint {
    queue_name: String,
    queue_url: Url,
    credential: SharedKeyCredential,
}

impl QueueEndpoint {
    /// Build `https://{account}.queue.core.windows.net/{queue}` and its credential.
    pub fn new(account_name: &str, account_key: &str, queue_name: &str) -> Result<Self> {
        Self::with_service_url(account_name, account_key, queue_name, None)
    }

    /// Same as [`QueueEndpoint::new`], but with an explicit service base URL
    /// (e.g. an emulator at `http://127.0.0.1:10000/devstoreaccount1`).
    pub fn with_service_url(
        account_name: &str,
        account_key: &str,
        queue_name: &str,
        service_url: Option<&str>,
    ) -> Result<Self> {
        info!(queue = %queue_name, "queue_endpoint_creating");

        if !is_valid_account_name(account_name) {
            return Err(QueueError::InvalidAccountName(account_name.to_string()));
        }
        if queue_name.is_empty() {
            return Err(QueueError::InvalidQueueName);
        }

        let base = match service_url {
            Some(raw) => Url::parse(raw)?,
            None => Url::parse(&format!("https://{}.{}", account_name, QUEUE_SERVICE_HOST))?,
        };
        let queue_url = push_segment(base, queue_name)?;

        let credential = SharedKeyCredential::new(account_name, account_key)?;

        info!(
            queue = %queue_name,
            queue_url = %queue_url,
            "queue_endpoint_created"
        );

        Ok(Self {
            queue_name: queue_name.to_string(),
            queue_url,
            credential,
        })
    }

    /// Build the endpoint described by the action inputs.
    pub fn from_connection(connection: &ConnectionInfo) -> Result<Self> {
        Self::with_service_url(
            &connection.storage_account_name,
            &connection.storage_account_key,
            &connection.queue_name,
            connection.service_url.as_deref(),
        )
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    pub fn queue_url(&self) -> &Url {
        &self.queue_url
    }

    /// `{queue}/messages`
    pub fn messages_url(&self) -> Url {
        let mut url = self.queue_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push("messages");
        }
        url
    }

    /// `{queue}/messages/{message_id}`
    pub fn message_id_url(&self, message_id: &str) -> Url {
        let mut url = self.messages_url();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(message_id);
        }
        url
    }

    pub fn credential(&self) -> &SharedKeyCredential {
        &self.credential
    }
}

/// Account names become the first DNS label of the service host.
fn is_valid_account_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

fn push_segment(mut url: Url, segment: &str) -> Result<Url> {
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| QueueError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
        segments.pop_if_empty().push(segment);
    }
    Ok(url)
}
