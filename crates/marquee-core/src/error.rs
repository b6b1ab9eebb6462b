//! Collaborator error type.
//!
//! Every call to the backend or the catalog fails with a `ServiceError`: a
//! category the UI can branch on plus a one-line message fit for display.

use std::fmt;

use serde_json::Value;

/// Error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    /// Credentials or token rejected by the auth service.
    Auth,
    /// Operation needs a signed-in user.
    NotAuthenticated,
    /// Non-success HTTP status.
    HttpStatus,
    /// Connection failure or timeout.
    Network,
    /// Response body did not match the expected shape.
    Decode,
    /// Missing or invalid local configuration.
    Config,
    /// Input rejected locally before any call was made.
    Invalid,
}

/// Structured error from a collaborator call.
#[derive(Debug, Clone)]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional raw details (e.g. the response body)
    pub details: Option<String>,
    /// HTTP status, for `HttpStatus`/`Auth` errors
    pub status: Option<u16>,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            status: None,
        }
    }

    pub fn not_authenticated() -> Self {
        Self::new(ServiceErrorKind::NotAuthenticated, "Not authenticated")
    }

    pub fn config(err: &anyhow::Error) -> Self {
        Self::new(ServiceErrorKind::Config, format!("{err:#}"))
    }

    pub fn decode(err: impl fmt::Display) -> Self {
        Self::new(
            ServiceErrorKind::Decode,
            format!("Unexpected response: {err}"),
        )
    }

    /// Creates an error from a non-success HTTP response.
    ///
    /// Auth statuses (400/401/403/422 from the auth endpoints) are reported
    /// as `Auth` by the caller via [`ServiceError::into_auth`]. The message
    /// prefers the service's own wording when the body carries one.
    pub fn http_status(status: u16, body: &str) -> Self {
        let extracted = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| extract_message(&json));

        let message = match extracted {
            Some(msg) => msg,
            None => format!("HTTP {status}"),
        };

        Self {
            kind: ServiceErrorKind::HttpStatus,
            message,
            details: (!body.is_empty()).then(|| body.to_string()),
            status: Some(status),
        }
    }

    /// Re-labels a client-side HTTP failure as an auth rejection.
    #[must_use]
    pub fn into_auth(mut self) -> Self {
        if self.kind == ServiceErrorKind::HttpStatus {
            self.kind = ServiceErrorKind::Auth;
        }
        self
    }

    pub fn is_auth(&self) -> bool {
        matches!(
            self.kind,
            ServiceErrorKind::Auth | ServiceErrorKind::NotAuthenticated
        )
    }
}

/// Pulls a human-readable message out of the error shapes used by the
/// auth service (`msg`, `error_description`), the row API (`message`) and
/// the catalog (`status_message`).
fn extract_message(json: &Value) -> Option<String> {
    ["msg", "error_description", "message", "status_message"]
        .iter()
        .find_map(|key| json.get(*key).and_then(Value::as_str))
        .or_else(|| json.get("error").and_then(Value::as_str))
        .map(str::to_string)
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::new(
                ServiceErrorKind::Network,
                format!("Request timed out: {e}"),
            )
        } else if e.is_connect() {
            ServiceError::new(
                ServiceErrorKind::Network,
                format!("Connection failed: {e}"),
            )
        } else if e.is_decode() {
            ServiceError::decode(e)
        } else {
            ServiceError::new(ServiceErrorKind::Network, format!("Network error: {e}"))
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Result type for collaborator operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_uses_service_wording() {
        let err = ServiceError::http_status(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert_eq!(err.message, "Invalid login credentials");
        assert_eq!(err.kind, ServiceErrorKind::HttpStatus);
        assert!(err.details.is_some());
        assert_eq!(err.status, Some(400));

        let row = ServiceError::http_status(409, r#"{"code":"23505","message":"duplicate key"}"#);
        assert_eq!(row.to_string(), "duplicate key");

        let catalog = ServiceError::http_status(
            401,
            r#"{"status_code":7,"status_message":"Invalid API key"}"#,
        );
        assert_eq!(catalog.to_string(), "Invalid API key");
    }

    #[test]
    fn test_http_status_falls_back_to_code() {
        let err = ServiceError::http_status(502, "<html>bad gateway</html>");
        assert_eq!(err.message, "HTTP 502");

        let empty = ServiceError::http_status(500, "");
        assert!(empty.details.is_none());
    }

    #[test]
    fn test_into_auth_only_relabels_http_errors() {
        let auth = ServiceError::http_status(400, "{}").into_auth();
        assert!(auth.is_auth());

        let network = ServiceError::new(ServiceErrorKind::Network, "down").into_auth();
        assert_eq!(network.kind, ServiceErrorKind::Network);
        assert!(!network.is_auth());
    }
}
