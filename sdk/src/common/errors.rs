use crate::utils::env::EnvVarError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias used by every fallible SDK call.
pub type ArmResult<T> = Result<T, ArmError>;

/// HTTP-level failures that happen before a response can be interpreted.
///
/// These cover the transport side of a request: building the client,
/// sending bytes, and reading a body that does not have the expected shape.
/// Responses that arrive with an error status are reported as
/// [`ArmError::Api`] instead.
#[derive(Debug, Error)]
pub enum HttpError {
    /// HTTP client initialization failed.
    #[error("HTTP client creation failed: {reason}")]
    ClientCreation { reason: String },

    /// The request could not be sent or the connection broke mid-flight.
    #[error("Request failed: {url} - {reason}")]
    RequestFailed { url: String, reason: String },

    /// The request did not complete within the client timeout.
    #[error("Request timeout: {url}")]
    Timeout { url: String },

    /// Received response doesn't match expected format.
    #[error("Invalid response: expected {expected}, got {actual}")]
    InvalidResponse { expected: String, actual: String },
}

impl HttpError {
    /// Classifies a `reqwest` transport error for the given URL.
    pub fn from_reqwest(url: &str, error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            HttpError::Timeout {
                url: url.to_string(),
            }
        } else {
            HttpError::RequestFailed {
                url: url.to_string(),
                reason: error.to_string(),
            }
        }
    }
}

/// Error type for Azure Resource Manager and data-plane operations.
///
/// [`ArmError::Api`] carries the full context Azure returns with a failed
/// call: the service error code, HTTP status, message and the
/// `x-ms-request-id` used when raising support cases.
#[derive(Debug, Error)]
pub enum ArmError {
    /// Azure API specific errors with full context
    #[error(
        "Azure API error during {operation}: {code} (HTTP {status}) - {message}{}",
        request_suffix(.request_id)
    )]
    Api {
        operation: String,
        status: u16,
        code: String,
        message: String,
        request_id: Option<String>,
    },

    /// A long-running operation reached `Failed` or `Canceled`.
    #[error("Operation {operation} finished with status {status}: {code} - {message}")]
    OperationFailed {
        operation: String,
        status: String,
        code: String,
        message: String,
    },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The credential cannot run in this environment (missing variables,
    /// no managed identity endpoint, Azure CLI not installed, ...).
    #[error("Credential unavailable: {0}")]
    CredentialUnavailable(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Environment(#[from] EnvVarError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("JSON parsing failed during {operation}: {reason}")]
    Deserialize { operation: String, reason: String },

    /// A poller or pager was used in a state that does not allow the call.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

fn request_suffix(request_id: &Option<String>) -> String {
    request_id
        .as_deref()
        .map(|id| format!(" [Request ID: {id}]"))
        .unwrap_or_default()
}

impl ArmError {
    pub fn deserialize(operation: &str, error: impl std::fmt::Display) -> Self {
        ArmError::Deserialize {
            operation: operation.to_string(),
            reason: error.to_string(),
        }
    }

    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ArmError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Service error code (`ResourceGroupNotFound`, `Conflict`, ...).
    pub fn code(&self) -> Option<&str> {
        match self {
            ArmError::Api { code, .. } | ArmError::OperationFailed { code, .. } => Some(code),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
    // Some data-plane services and legacy providers put the fields at the top level
    code: Option<String>,
    message: Option<String>,
}

/// The `error` object of an ARM error response or a failed operation status.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Builds an [`ArmError::Api`] from a non-success response.
///
/// Reads the `x-ms-request-id` header and the standard error envelope
/// (`{"error": {"code", "message"}}`); falls back to the
/// `x-ms-error-code` header and the raw body when the body is not JSON.
pub async fn error_from_response(operation: &str, response: reqwest::Response) -> ArmError {
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let request_id = header_value(&headers, "x-ms-request-id");
    let header_code = header_value(&headers, "x-ms-error-code");
    let body = response.text().await.unwrap_or_default();

    let (code, message) = parse_error_body(&body);
    let code = code
        .or(header_code)
        .unwrap_or_else(|| default_code(status).to_string());
    let message = message.unwrap_or_else(|| {
        if body.trim().is_empty() {
            format!("service returned HTTP {status} with an empty body")
        } else {
            body.trim().to_string()
        }
    });

    ArmError::Api {
        operation: operation.to_string(),
        status,
        code,
        message,
        request_id,
    }
}

fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
    let envelope: ErrorEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) => return (None, None),
    };

    match envelope.error {
        Some(detail) => (
            Some(detail.code).filter(|c| !c.is_empty()),
            Some(detail.message).filter(|m| !m.is_empty()),
        ),
        None => (envelope.code, envelope.message),
    }
}

fn default_code(status: u16) -> &'static str {
    match status {
        400 => "BadRequest",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "NotFound",
        409 => "Conflict",
        429 => "TooManyRequests",
        500..=599 => "ServerError",
        _ => "Unknown",
    }
}

pub(crate) fn header_value(headers: &reqwest::header::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}
