//! Async client for the Azure Storage queue REST API.
//!
//! Every request is signed with the endpoint's Shared Key credential. The
//! action itself only needs [`QueueClient::enqueue`]; the remaining calls
//! cover the queue lifecycle and receive side used to verify a round trip.

use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, Response, StatusCode,
};
use tracing::{info, warn};
use url::Url;

use super::endpoint::QueueEndpoint;
use super::error::{QueueError, Result};
use super::types::{
    parse_dequeued, parse_xml, DequeuedMessage, EnqueuedMessage, PutMessageBody,
    QueueMessagesList, ServiceErrorBody,
};

/// REST API version sent in `x-ms-version`.
pub const API_VERSION: &str = "2018-03-28";

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Options for [`QueueClient::enqueue`].
#[derive(Debug, Clone, Default)]
pub struct EnqueueOptions {
    /// How long the message stays invisible after insertion.
    pub visibility_timeout: Duration,
    /// Message lifetime; `None` leaves the service default (seven days).
    pub time_to_live: Option<Duration>,
}

/// Queue client bound to a single queue endpoint.
#[derive(Debug, Clone)]
pub struct QueueClient {
    http: Client,
    endpoint: QueueEndpoint,
}

impl QueueClient {
    /// Create a client for the given endpoint.
    pub fn new(endpoint: QueueEndpoint) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("push-run-result/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &QueueEndpoint {
        &self.endpoint
    }

    /// Append one message to the queue.
    pub async fn enqueue(
        &self,
        message_text: &str,
        options: &EnqueueOptions,
    ) -> Result<EnqueuedMessage> {
        let mut url = self.endpoint.messages_url();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(
                "visibilitytimeout",
                &options.visibility_timeout.as_secs().to_string(),
            );
            if let Some(ttl) = options.time_to_live {
                query.append_pair("messagettl", &ttl.as_secs().to_string());
            }
        }

        let body = PutMessageBody { message_text }.to_xml()?;

        let response = self.send(Method::POST, url, Some(body)).await?;
        let text = response.text().await?;

        let list: QueueMessagesList<EnqueuedMessage> = parse_xml(&text)?;
        let message = list
            .messages
            .into_iter()
            .next()
            .ok_or_else(|| QueueError::Xml("put message response had no message".to_string()))?;

        info!(
            queue = %self.endpoint.queue_name(),
            message_id = %message.message_id,
            message = %message_text,
            body_length = message_text.len(),
            "queue_message_enqueued"
        );

        Ok(message)
    }

    /// Receive up to `count` messages, hiding them for `visibility_timeout`.
    pub async fn dequeue(
        &self,
        count: u32,
        visibility_timeout: Duration,
    ) -> Result<Vec<DequeuedMessage>> {
        let mut url = self.endpoint.messages_url();
        url.query_pairs_mut()
            .append_pair("numofmessages", &count.to_string())
            .append_pair("visibilitytimeout", &visibility_timeout.as_secs().to_string());

        let response = self.send(Method::GET, url, None).await?;
        let text = response.text().await?;

        let messages = parse_dequeued(&text)?;

        info!(
            queue = %self.endpoint.queue_name(),
            requested = count,
            received = messages.len(),
            "queue_messages_dequeued"
        );

        Ok(messages)
    }

    /// Delete a dequeued message using its pop receipt.
    pub async fn delete_message(&self, message_id: &str, pop_receipt: &str) -> Result<()> {
        let mut url = self.endpoint.message_id_url(message_id);
        url.query_pairs_mut().append_pair("popreceipt", pop_receipt);

        self.send(Method::DELETE, url, None).await?;

        info!(
            queue = %self.endpoint.queue_name(),
            message_id = %message_id,
            "queue_message_deleted"
        );

        Ok(())
    }

    /// Create the queue. Returns `false` when it already existed.
    pub async fn create_queue(&self) -> Result<bool> {
        let url = self.endpoint.queue_url().clone();
        let response = self.send(Method::PUT, url, None).await?;

        let created = response.status() == StatusCode::CREATED;
        info!(
            queue = %self.endpoint.queue_name(),
            created = created,
            "queue_created"
        );

        Ok(created)
    }

    pub async fn delete_queue(&self) -> Result<()> {
        let url = self.endpoint.queue_url().clone();
        self.send(Method::DELETE, url, None).await?;

        info!(queue = %self.endpoint.queue_name(), "queue_deleted");

        Ok(())
    }

    /// Sign and send a request, turning non-success statuses into errors.
    async fn send(&self, method: Method, url: Url, body: Option<String>) -> Result<Response> {
        let body = body.unwrap_or_default();

        let mut headers = HeaderMap::new();
        headers.insert("x-ms-version", HeaderValue::from_static(API_VERSION));
        headers.insert("x-ms-date", header_value(&http_date())?);
        if !body.is_empty() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE));
        }

        let authorization =
            self.endpoint
                .credential()
                .authorization(&method, &url, &headers, body.len());
        headers.insert(AUTHORIZATION, header_value(&authorization)?);

        let mut request = self.http.request(method.clone(), url).headers(headers);
        if !body.is_empty() {
            request = request.body(body);
        }

        let response = request.send().await?;

        if response.status().is_success() {
            return Ok(response);
        }

        Err(service_error(&method, response).await)
    }
}

/// Current time in the RFC 1123 form `x-ms-date` expects.
fn http_date() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| QueueError::InvalidHeader(e.to_string()))
}

async fn service_error(method: &Method, response: Response) -> QueueError {
    let status = response.status().as_u16();
    let header_code = response
        .headers()
        .get("x-ms-error-code")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let text = response.text().await.unwrap_or_default();
    let body: ServiceErrorBody = parse_xml(&text).unwrap_or_default();

    let code = header_code.unwrap_or(body.code);
    // The service appends RequestId/Time lines to the message.
    let message = body.message.lines().next().unwrap_or_default().to_string();

    warn!(
        method = %method,
        status_code = status,
        error_code = %code,
        error_message = %message,
        "queue_request_failed"
    );

    QueueError::Service {
        status,
        code,
        message,
    }
}
