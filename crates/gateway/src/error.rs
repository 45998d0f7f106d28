use thiserror::Error;

/// Classification tag carried by every gateway failure.
pub const GATEWAY_ERROR_CODE: &str = "MARKETPLACE_CLIENT_ERROR";

/// Normalized marketplace failure: an HTTP-like status code, the fixed
/// classification tag, and the remote (or transport) message.
#[derive(Debug, Clone, Error)]
#[error("Marketplace client error ({status}): {message}")]
pub struct GatewayError {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
}

impl GatewayError {
    /// A failure reported by the remote side with its HTTP status.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            code: GATEWAY_ERROR_CODE,
            message: message.into(),
        }
    }

    /// A transport-level failure (connect, timeout, malformed body).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::remote(500, message)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16()).unwrap_or(500);
        Self::remote(status, err.to_string())
    }
}
