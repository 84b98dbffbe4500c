//! Scripted transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use http::StatusCode;
use serde_json::Value;

use crate::error::MoltbookClientError;
use crate::transport::{ApiRequest, ApiResponse, BoxFuture, MoltbookTransport};

/// Replays queued responses in order and records every request.
///
/// Once the queue is drained every call fails with a 503.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, MoltbookClientError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push(&self, response: Result<ApiResponse, MoltbookClientError>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub(crate) fn push_ok(&self, data: Value) -> &Self {
        self.push(Ok(ApiResponse::ok(data)))
    }

    pub(crate) fn push_status(&self, status: StatusCode) -> &Self {
        self.push(Err(MoltbookClientError::HttpStatus {
            context: "mock".to_owned(),
            status,
            body: String::new(),
        }))
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> ApiRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

impl MoltbookTransport for MockTransport {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, MoltbookClientError>> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        Box::pin(async move {
            next.unwrap_or_else(|| {
                Err(MoltbookClientError::HttpStatus {
                    context: "mock".to_owned(),
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    body: "no scripted response".to_owned(),
                })
            })
        })
    }
}
