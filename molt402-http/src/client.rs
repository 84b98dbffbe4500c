//! A [`MoltbookTransport`] that talks to the moltbook REST API over HTTP.
//!
//! ## Features
//!
//! - Uses `reqwest` for async HTTP requests
//! - Optional bearer API key, extra headers and request timeout
//! - Integrates with `tracing` if the `telemetry` feature is enabled
//!
//! ## Error Handling
//!
//! Every failure is reported as a [`MoltbookClientError`] tagged with the
//! request it belongs to (e.g. `POST /escrow`):
//! - URL construction
//! - HTTP transport failures
//! - Non-2xx statuses, with the response body
//! - JSON deserialization errors

use std::fmt::Display;
use std::time::Duration;

use http::HeaderMap;
use http::header::AUTHORIZATION;
use reqwest::Client;
use url::Url;

#[cfg(feature = "telemetry")]
use tracing::{Instrument, Span};

use crate::constants::DEFAULT_MOLTBOOK_URL;
use crate::error::MoltbookClientError;
use crate::transport::{ApiRequest, ApiResponse, BoxFuture, MoltbookTransport};

/// HTTP client for the moltbook API.
#[derive(Clone)]
pub struct MoltbookClient {
    /// Base URL, always ending with `/` (e.g. `https://api.moltbook.com/v1/`)
    base_url: Url,
    /// Shared Reqwest HTTP client
    client: Client,
    /// Custom headers sent with each request
    headers: HeaderMap,
    /// Bearer token sent as `Authorization`
    api_key: Option<String>,
    /// Optional request timeout
    timeout: Option<Duration>,
}

impl std::fmt::Debug for MoltbookClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoltbookClient")
            .field("base_url", &self.base_url.as_str())
            .field("headers", &self.headers)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl MoltbookClient {
    /// Constructs a client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns [`MoltbookClientError::InvalidBaseUrl`] if the URL cannot
    /// carry path segments.
    pub fn try_new(base_url: Url) -> Result<Self, MoltbookClientError> {
        if base_url.cannot_be_a_base() {
            return Err(MoltbookClientError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            client: Client::new(),
            headers: HeaderMap::new(),
            api_key: None,
            timeout: None,
        })
    }

    /// Client for the public moltbook endpoint.
    ///
    /// # Errors
    ///
    /// Only fails if [`DEFAULT_MOLTBOOK_URL`] stops parsing.
    pub fn public() -> Result<Self, MoltbookClientError> {
        Self::try_from(DEFAULT_MOLTBOOK_URL)
    }

    /// Returns the base URL used by this client.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns any custom headers configured on the client.
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the configured timeout, if any.
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Sends `Authorization: Bearer <api_key>` with every request.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Attaches custom headers to all future requests.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a timeout for all future requests.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the absolute URL for a request, percent-encoding segments and query.
    ///
    /// # Errors
    ///
    /// Returns [`MoltbookClientError::InvalidBaseUrl`] if the base URL
    /// cannot carry path segments.
    pub fn endpoint(&self, request: &ApiRequest) -> Result<Url, MoltbookClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| MoltbookClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(&request.segments);
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    /// Performs the request and decodes the moltbook envelope.
    ///
    /// A 2xx with an empty body is treated as success without data.
    ///
    /// # Errors
    ///
    /// Returns [`MoltbookClientError`] on transport failure, non-2xx status
    /// or an undecodable body.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, MoltbookClientError> {
        let context = request.to_string();
        let url = self.endpoint(request)?;

        let mut req = self.client.request(request.method.clone(), url);
        for (key, value) in &self.headers {
            req = req.header(key, value);
        }
        if let Some(api_key) = &self.api_key {
            req = req.header(AUTHORIZATION, format!("Bearer {api_key}"));
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        if let Some(body) = &request.body {
            req = req.json(body);
        }

        let http_response = req.send().await.map_err(|e| MoltbookClientError::Http {
            context: context.clone(),
            source: e,
        })?;

        let status = http_response.status();
        let result = if status.is_success() {
            let bytes = http_response.bytes().await.map_err(|e| {
                MoltbookClientError::ResponseBodyRead {
                    context: context.clone(),
                    source: e,
                }
            })?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                Ok(ApiResponse::ok_empty())
            } else {
                serde_json::from_slice::<ApiResponse>(&bytes).map_err(|e| {
                    MoltbookClientError::JsonDeserialization {
                        context: context.clone(),
                        source: e,
                    }
                })
            }
        } else {
            let body = http_response.text().await.map_err(|e| {
                MoltbookClientError::ResponseBodyRead {
                    context: context.clone(),
                    source: e,
                }
            })?;
            Err(MoltbookClientError::HttpStatus {
                context,
                status,
                body,
            })
        };

        record_result_on_span(&result);

        result
    }
}

impl MoltbookTransport for MoltbookClient {
    #[cfg(feature = "telemetry")]
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, MoltbookClientError>> {
        let span = tracing::info_span!(
            "moltbook.client.send",
            method = %request.method,
            path = %request.path(),
            timeout = ?self.timeout,
            otel.status_code = tracing::field::Empty,
            error.message = tracing::field::Empty,
        );
        Box::pin(with_span(
            async move { self.execute(&request).await },
            span,
        ))
    }

    #[cfg(not(feature = "telemetry"))]
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, MoltbookClientError>> {
        Box::pin(async move { self.execute(&request).await })
    }
}

/// Converts a string URL into a `MoltbookClient`, parsing the URL and calling `try_new`.
impl TryFrom<&str> for MoltbookClient {
    type Error = MoltbookClientError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // Normalize: strip trailing slashes and add a single trailing slash
        let mut normalized = value.trim_end_matches('/').to_string();
        normalized.push('/');
        let url = Url::parse(&normalized).map_err(|e| MoltbookClientError::UrlParse {
            context: "Failed to parse base url",
            source: e,
        })?;
        Self::try_new(url)
    }
}

/// Converts a String URL into a `MoltbookClient`.
impl TryFrom<String> for MoltbookClient {
    type Error = MoltbookClientError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

/// Records the outcome of a request on a tracing span, including status and errors.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R, E: Display>(result: &Result<R, E>) {
    let span = Span::current();
    match result {
        Ok(_) => {
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
            tracing::event!(tracing::Level::ERROR, error = %err, "Request to moltbook failed");
        }
    }
}

/// Records the outcome of a request on a tracing span, including status and errors.
/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
fn record_result_on_span<R, E: Display>(_result: &Result<R, E>) {}

/// Instruments a future with a given tracing span.
#[cfg(feature = "telemetry")]
fn with_span<F: Future>(fut: F, span: Span) -> impl Future<Output = F::Output> {
    fut.instrument(span)
}
