//! In-memory transport for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{ErrorKind, Result};
use crate::transport::{HttpResponse, Transport};

/// A request seen by a [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub body: Option<Value>,
}

enum Reply {
    Response(HttpResponse),
    Failure(String),
}

/// Scripted [`Transport`]: replies are handed out in the order they were
/// queued, and every request is recorded.
///
/// Once the queue is exhausted, the fallback reply (if any) is repeated;
/// without one, requests fail with a transport error.
///
/// # Examples
///
/// ```
/// use daon_client::{MockTransport, Transport};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let transport = MockTransport::new().respond(200, json!({"success": true}));
/// let response = transport.post_json("http://registry/api", &json!({})).await.unwrap();
/// assert!(response.is_success());
/// assert_eq!(transport.request_count(), 1);
/// # }
/// ```
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Option<HttpResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request succeeds with `body` once queued replies run out.
    pub fn always(status: u16, body: Value) -> Self {
        Self {
            fallback: Some(HttpResponse::new(status, body.to_string())),
            ..Self::default()
        }
    }

    pub fn respond(self, status: u16, body: Value) -> Self {
        self.respond_raw(status, body.to_string())
    }

    /// Queues a response whose body is not necessarily JSON.
    pub fn respond_raw(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Reply::Response(HttpResponse::new(status, body)))
    }

    /// Queues a failure to receive any response.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(Reply::Failure(message.into()))
    }

    fn push(self, reply: Reply) -> Self {
        self.replies.lock().unwrap_or_else(|e| e.into_inner()).push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn reply(&self, method: &'static str, url: &str, body: Option<&Value>) -> Result<HttpResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest {
                method,
                url: url.to_string(),
                body: body.cloned(),
            });
        let next = self.replies.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
        match next {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Failure(message)) => exn::bail!(ErrorKind::Transport(message)),
            None => match &self.fallback {
                Some(response) => Ok(response.clone()),
                None => exn::bail!(ErrorKind::Transport("no mock response queued".to_string())),
            },
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse> {
        self.reply("POST", url, Some(body))
    }

    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.reply("GET", url, None)
    }
}
