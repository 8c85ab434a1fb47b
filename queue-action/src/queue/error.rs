//! Error type for queue operations.

use thiserror::Error;

/// Errors returned while building, signing, or sending queue requests.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The run record could not be encoded as JSON.
    #[error("failed to serialize run info: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid storage account name {0:?}")]
    InvalidAccountName(String),

    #[error("queue name must not be empty")]
    InvalidQueueName,

    #[error("failed to build queue url: {0}")]
    Url(#[from] url::ParseError),

    /// The account key is not valid base64.
    #[error("failed to create shared key credential: {0}")]
    InvalidAccountKey(String),

    #[error("queue request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("queue service returned {status}: {code} {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("invalid request header: {0}")]
    InvalidHeader(String),

    #[error("failed to encode or decode queue xml: {0}")]
    Xml(String),
}

impl From<quick_xml::de::DeError> for QueueError {
    fn from(e: quick_xml::de::DeError) -> Self {
        QueueError::Xml(e.to_string())
    }
}

impl From<quick_xml::Error> for QueueError {
    fn from(e: quick_xml::Error) -> Self {
        QueueError::Xml(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QueueError>;
