//! Message types carried to and from the queue service.
//!
//! This module defines:
//! - `RunInfo`: the workflow run record pushed as the message body
//! - The XML bodies the queue REST API accepts and returns

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::error::{QueueError, Result};

// =============================================================================
// Run Record (message body)
// =============================================================================

/// Workflow run metadata sent to the queue.
///
/// Key names and order are consumed by downstream readers and must not change.
/// Every field is optional in practice: an unset variable is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RunInfo {
    pub workflow: String,
    #[serde(rename = "RunID")]
    pub run_id: String,
    pub run_number: String,
    pub actor: String,
    pub repository: String,
    pub event_name: String,
    pub event_path: String,
    pub sha: String,
    #[serde(rename = "Ref")]
    pub git_ref: String,
    pub head_ref: String,
    pub base_ref: String,
    pub job_status: String,
}

impl RunInfo {
    /// Encode the record as the compact JSON message body.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// =============================================================================
// Queue Service Wire Types
// =============================================================================

/// Request body for Put Message.
#[derive(Debug, Serialize)]
#[serde(rename = "QueueMessage")]
pub(crate) struct PutMessageBody<'a> {
    #[serde(rename = "MessageText")]
    pub message_text: &'a str,
}

impl PutMessageBody<'_> {
    pub fn to_xml(&self) -> Result<String> {
        Ok(quick_xml::se::to_string(self)?)
    }
}

/// A message accepted by Put Message.
#[derive(Debug, Clone, Deserialize)]
pub struct EnqueuedMessage {
    #[serde(rename = "MessageId")]
    pub message_id: String,
    #[serde(rename = "PopReceipt")]
    pub pop_receipt: String,
    #[serde(rename = "InsertionTime", default)]
    pub insertion_time: String,
    #[serde(rename = "ExpirationTime", default)]
    pub expiration_time: String,
    #[serde(rename = "TimeNextVisible", default)]
    pub time_next_visible: String,
}

/// A message returned by Get Messages.
#[derive(Debug, Clone, Deserialize)]
pub struct DequeuedMessage {
    #[serde(rename = "MessageId")]
    pub message_id: String,
    #[serde(rename = "PopReceipt")]
    pub pop_receipt: String,
    #[serde(rename = "MessageText", default)]
    pub text: String,
    #[serde(rename = "DequeueCount", default)]
    pub dequeue_count: u64,
    #[serde(rename = "InsertionTime", default)]
    pub insertion_time: String,
    #[serde(rename = "ExpirationTime", default)]
    pub expiration_time: String,
    #[serde(rename = "TimeNextVisible", default)]
    pub time_next_visible: String,
}

/// `<QueueMessagesList>` wrapper shared by Put Message and Get Messages.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct QueueMessagesList<T> {
    #[serde(rename = "QueueMessage", default)]
    pub messages: Vec<T>,
}

/// `<Error>` body returned on failed requests.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServiceErrorBody {
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
}

/// Parse an XML response body, tolerating the leading byte-order mark the
/// service emits.
pub(crate) fn parse_xml<T: DeserializeOwned>(body: &str) -> Result<T> {
    let body = body.trim_start_matches('\u{feff}');
    quick_xml::de::from_str(body).map_err(QueueError::from)
}

/// Parse a Get Messages response.
///
/// The serde deserializer trims text content, so `MessageText` is read a
/// second time with the event reader, which keeps whitespace as sent.
pub(crate) fn parse_dequeued(body: &str) -> Result<Vec<DequeuedMessage>> {
    let list: QueueMessagesList<DequeuedMessage> = parse_xml(body)?;
    let texts = message_texts(body.trim_start_matches('\u{feff}'))?;

    if texts.len() != list.messages.len() {
        return Err(QueueError::Xml(format!(
            "found {} MessageText elements for {} messages",
            texts.len(),
            list.messages.len()
        )));
    }

    Ok(list
        .messages
        .into_iter()
        .zip(texts)
        .map(|(mut message, text)| {
            message.text = text;
            message
        })
        .collect())
}

/// Untrimmed, unescaped contents of every `<MessageText>` element.
fn message_texts(body: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(false);

    let mut texts = Vec::new();
    let mut current: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"MessageText" => {
                current = Some(String::new());
            }
            Event::Empty(e) if e.name().as_ref() == b"MessageText" => {
                texts.push(String::new());
            }
            Event::Text(t) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(e) if e.name().as_ref() == b"MessageText" => {
                if let Some(text) = current.take() {
                    texts.push(text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(texts)
}
