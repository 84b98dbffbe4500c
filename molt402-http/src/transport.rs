//! Request/response envelope of the moltbook API and the transport trait.
//!
//! moltbook wraps every response in `{ "success": bool, "data": ..., "error": ... }`.
//! Services build an [`ApiRequest`], hand it to a [`MoltbookTransport`] and read
//! the [`ApiResponse`] envelope. Putting the transport behind a trait lets tests
//! and embedders swap the HTTP client for anything else.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::MoltbookClientError;

/// A boxed, `Send` future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One call against the moltbook API.
///
/// The path is kept as raw segments so ids and wallets are percent-encoded
/// when the URL is built rather than spliced into a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path segments relative to the API base URL.
    pub segments: Vec<String>,
    /// Query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Optional JSON body.
    pub body: Option<Value>,
}

impl ApiRequest {
    /// Creates a request with no query and no body.
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Creates a `GET` request.
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, segments)
    }

    /// Creates a `POST` request.
    pub fn post<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, segments)
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets the JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Unencoded path, e.g. `/payouts/po_1/cancel`. For logs and errors.
    #[must_use]
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            path.push_str(segment);
        }
        if path.is_empty() {
            path.push('/');
        }
        path
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path())
    }
}

/// The moltbook response envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Whether moltbook accepted the operation.
    #[serde(default)]
    pub success: bool,
    /// Operation result, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Error description, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    /// A successful envelope carrying `data`.
    #[must_use]
    pub const fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// A successful envelope without data.
    #[must_use]
    pub const fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// A failed envelope.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Decodes `data` into `R`. Missing or `null` data yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns the serde error if `data` does not have the shape of `R`.
    pub fn into_data<R: DeserializeOwned>(self) -> Result<Option<R>, serde_json::Error> {
        match self.data {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value).map(Some),
        }
    }
}

/// Sends [`ApiRequest`]s to moltbook.
///
/// Dyn-compatible so services can share one `Arc<dyn MoltbookTransport>`.
pub trait MoltbookTransport: Send + Sync {
    /// Performs the request and returns the decoded envelope.
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, MoltbookClientError>>;
}

impl<T: MoltbookTransport + ?Sized> MoltbookTransport for Arc<T> {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, MoltbookClientError>> {
        (**self).send(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builders() {
        let req = ApiRequest::get(["analytics", "report"])
            .query("wallet", "w1")
            .query("period", "day");
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.path(), "/analytics/report");
        assert_eq!(req.query.len(), 2);
        assert_eq!(req.to_string(), "GET /analytics/report");
    }

    #[test]
    fn test_post_with_body() {
        let req = ApiRequest::post(["escrow"]).json(json!({ "amount": 1 }));
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.body, Some(json!({ "amount": 1 })));
    }

    #[test]
    fn test_empty_path_is_root() {
        let req = ApiRequest::get(Vec::<String>::new());
        assert_eq!(req.path(), "/");
    }

    #[test]
    fn test_envelope_missing_fields_default() {
        let resp: ApiResponse = serde_json::from_str("{}").unwrap();
        assert!(!resp.success);
        assert!(resp.data.is_none());
    }

    #[test]
    fn test_into_data_null_is_none() {
        let resp: ApiResponse = serde_json::from_str(r#"{"success":true,"data":null}"#).unwrap();
        assert_eq!(resp.into_data::<String>().unwrap(), None);
    }

    #[test]
    fn test_into_data_decodes() {
        let resp = ApiResponse::ok(json!({ "url": "https://x" }));
        let data: Option<serde_json::Map<String, Value>> = resp.into_data().unwrap();
        assert_eq!(data.unwrap()["url"], json!("https://x"));
    }

    #[test]
    fn test_into_data_shape_mismatch_errors() {
        let resp = ApiResponse::ok(json!("text"));
        assert!(resp.into_data::<Vec<u32>>().is_err());
    }
}
