//! Error types for the Feishu client.

/// Error from Feishu API operations.
#[derive(Debug, thiserror::Error)]
pub enum FeishuError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// The API answered with a non-zero business code.
    #[error("API error {code}: {msg}")]
    Api {
        /// Business error code.
        code: i64,
        /// Error message from the API.
        msg: String,
    },

    /// Tenant access token exchange was rejected.
    #[error("tenant access token exchange failed: {0}")]
    Auth(String),

    /// A successful response lacked an expected field.
    #[error("response is missing {0}")]
    MissingData(&'static str),

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

impl FeishuError {
    /// Whether the API reported rate limiting.
    ///
    /// Feishu signals this with HTTP 429 or business code `99991400`.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::HttpResponse { status, .. } => *status == 429,
            Self::Api { code, .. } => *code == 99_991_400,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection() {
        let http = FeishuError::HttpResponse {
            status: 429,
            body: String::new(),
        };
        let api = FeishuError::Api {
            code: 99_991_400,
            msg: "request trigger frequency limit".to_owned(),
        };
        let other = FeishuError::Api {
            code: 1_254_000,
            msg: "bad request".to_owned(),
        };
        assert!(http.is_rate_limited());
        assert!(api.is_rate_limited());
        assert!(!other.is_rate_limited());
    }

    #[test]
    fn test_display() {
        let err = FeishuError::Api {
            code: 230_002,
            msg: "bot is not in the chat".to_owned(),
        };
        assert_eq!(err.to_string(), "API error 230002: bot is not in the chat");
    }
}
