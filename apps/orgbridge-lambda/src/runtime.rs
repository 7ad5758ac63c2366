//! Minimal client for the Lambda Runtime API.
//!
//! The bootstrap polls `invocation/next`, runs the handler, and posts either
//! a response or an error for the request ID it was given. Initialization
//! failures are reported once through `init/error`.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use reqwest::header::HeaderMap;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Runtime API version prefix.
const API_VERSION: &str = "2018-06-01";

const REQUEST_ID_HEADER: &str = "Lambda-Runtime-Aws-Request-Id";
const DEADLINE_HEADER: &str = "Lambda-Runtime-Deadline-Ms";
const FUNCTION_ARN_HEADER: &str = "Lambda-Runtime-Invoked-Function-Arn";
const TRACE_ID_HEADER: &str = "Lambda-Runtime-Trace-Id";
const ERROR_TYPE_HEADER: &str = "Lambda-Runtime-Function-Error-Type";

/// One event handed out by the Runtime API.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Request ID to report the result under.
    pub request_id: String,
    /// Deadline in milliseconds since the Unix epoch.
    pub deadline_ms: Option<u64>,
    /// ARN of the invoked function.
    pub function_arn: Option<String>,
    /// X-Ray trace header.
    pub trace_id: Option<String>,
    /// Event payload. A body that is not JSON becomes `Null`.
    pub payload: Value,
}

impl Invocation {
    /// Build an invocation from the `invocation/next` response.
    pub fn from_parts(headers: &HeaderMap, body: &[u8]) -> Result<Self> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToOwned::to_owned)
        };

        let request_id = header(REQUEST_ID_HEADER)
            .with_context(|| format!("missing {REQUEST_ID_HEADER} header"))?;

        let payload = serde_json::from_slice(body).unwrap_or_else(|e| {
            warn!(request_id = %request_id, error = %e, "event payload is not JSON");
            Value::Null
        });

        Ok(Self {
            deadline_ms: header(DEADLINE_HEADER).and_then(|v| v.parse().ok()),
            function_arn: header(FUNCTION_ARN_HEADER),
            trace_id: header(TRACE_ID_HEADER),
            request_id,
            payload,
        })
    }

    /// Time left before the deadline, if one was given.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        let deadline = Duration::from_millis(self.deadline_ms?);
        let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
        Some(deadline.saturating_sub(now))
    }
}

/// Error body understood by the Runtime API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// Short error class name.
    pub error_type: String,
    /// Full error message including its causes.
    pub error_message: String,
    /// Unused; always empty.
    pub stack_trace: Vec<String>,
}

impl ErrorReport {
    /// Create a report with the given type and message.
    #[must_use]
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_type: error_type.into(),
            error_message: error_message.into(),
            stack_trace: Vec::new(),
        }
    }
}

/// HTTP client bound to one Runtime API endpoint.
#[derive(Debug, Clone)]
pub struct RuntimeClient {
    http: reqwest::Client,
    base_url: String,
}

impl RuntimeClient {
    /// Create a client for the `host:port` given by `AWS_LAMBDA_RUNTIME_API`.
    #[must_use]
    pub fn new(api: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("http://{api}/{API_VERSION}/runtime"),
        }
    }

    /// Create a client from the `AWS_LAMBDA_RUNTIME_API` environment variable.
    pub fn from_env() -> Result<Self> {
        let api = std::env::var("AWS_LAMBDA_RUNTIME_API")
            .context("AWS_LAMBDA_RUNTIME_API is not set; not running inside Lambda?")?;
        Ok(Self::new(&api))
    }

    /// Base URL of the runtime endpoints.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Block until the next event is available.
    pub async fn next_invocation(&self) -> Result<Invocation> {
        let url = format!("{}/invocation/next", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("failed to poll for the next invocation")?
            .error_for_status()
            .context("runtime API rejected invocation/next")?;

        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .context("failed to read invocation body")?;
        Invocation::from_parts(&headers, &body)
    }

    /// Report a successful result.
    pub async fn send_response<T: Serialize + Sync>(&self, request_id: &str, body: &T) -> Result<()> {
        let url = format!("{}/invocation/{request_id}/response", self.base_url);
        self.http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("failed to post response for {request_id}"))?
            .error_for_status()
            .with_context(|| format!("runtime API rejected response for {request_id}"))?;
        Ok(())
    }

    /// Report a failed invocation.
    pub async fn send_error(&self, request_id: &str, report: &ErrorReport) -> Result<()> {
        let url = format!("{}/invocation/{request_id}/error", self.base_url);
        self.post_error(&url, report)
            .await
            .with_context(|| format!("failed to post error for {request_id}"))
    }

    /// Report a failure during startup.
    pub async fn send_init_error(&self, report: &ErrorReport) -> Result<()> {
        let url = format!("{}/init/error", self.base_url);
        self.post_error(&url, report)
            .await
            .context("failed to post init error")
    }

    async fn post_error(&self, url: &str, report: &ErrorReport) -> Result<()> {
        self.http
            .post(url)
            .header(ERROR_TYPE_HEADER, &report.error_type)
            .json(report)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
