//! Feishu API wire types.

mod docx;
mod im;

pub use docx::{BlockList, BlockSummary, CreatedDocument, DocumentInfo, DocxBlock, encode_link_url};
pub use im::{
    ChatPage, ChatSummary, MessageContent, PostElement, PostMessage, card_content, message_payload,
};

use serde::Deserialize;

use crate::error::FeishuError;

/// Standard response envelope: `{"code": 0, "msg": "success", "data": {...}}`.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    /// Business code; zero means success.
    pub code: i64,
    /// Human-readable status.
    #[serde(default)]
    pub msg: String,
    /// Payload, present on success for most endpoints.
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Fail on a non-zero business code.
    pub fn check(self) -> Result<Option<T>, FeishuError> {
        if self.code == 0 {
            Ok(self.data)
        } else {
            Err(FeishuError::Api {
                code: self.code,
                msg: self.msg,
            })
        }
    }

    /// Fail on a non-zero business code or a missing payload.
    pub fn into_data(self, what: &'static str) -> Result<T, FeishuError> {
        self.check()?.ok_or(FeishuError::MissingData(what))
    }
}

/// Response of the tenant access token exchange.
///
/// Unlike other endpoints the token fields are not wrapped in `data`.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// Business code; zero means success.
    pub code: i64,
    /// Human-readable status.
    #[serde(default)]
    pub msg: String,
    /// Issued token.
    #[serde(default)]
    pub tenant_access_token: Option<String>,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub expire: Option<u64>,
}

impl TokenResponse {
    /// Extract the token, failing on a non-zero code or missing token.
    pub fn into_token(self) -> Result<String, FeishuError> {
        if self.code != 0 {
            return Err(FeishuError::Auth(format!("code {}: {}", self.code, self.msg)));
        }
        self.tenant_access_token
            .filter(|token| !token.is_empty())
            .ok_or(FeishuError::MissingData("tenant_access_token"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::de::IgnoredAny;

    use super::*;

    #[test]
    fn test_envelope_success() {
        let resp: ApiResponse<BlockList> = serde_json::from_str(
            r#"{"code":0,"msg":"success","data":{"items":[{"block_id":"root","block_type":1}]}}"#,
        )
        .unwrap();
        let data = resp.into_data("blocks").unwrap();
        assert_eq!(data.items[0].block_id, "root");
    }

    #[test]
    fn test_envelope_error_code() {
        let resp: ApiResponse<IgnoredAny> =
            serde_json::from_str(r#"{"code":1770002,"msg":"not found"}"#).unwrap();
        let err = resp.check().unwrap_err();
        assert!(matches!(err, FeishuError::Api { code: 1_770_002, .. }));
    }

    #[test]
    fn test_envelope_missing_data() {
        let resp: ApiResponse<IgnoredAny> = serde_json::from_str(r#"{"code":0}"#).unwrap();
        let err = resp.into_data("document").unwrap_err();
        assert_eq!(err.to_string(), "response is missing document");
    }

    #[test]
    fn test_token_response() {
        let resp: TokenResponse = serde_json::from_str(
            r#"{"code":0,"msg":"ok","tenant_access_token":"t-abc","expire":7200}"#,
        )
        .unwrap();
        assert_eq!(resp.expire, Some(7200));
        assert_eq!(resp.into_token().unwrap(), "t-abc");
    }

    #[test]
    fn test_token_response_rejected() {
        let resp: TokenResponse =
            serde_json::from_str(r#"{"code":10014,"msg":"app secret invalid"}"#).unwrap();
        let err = resp.into_token().unwrap_err();
        assert!(matches!(err, FeishuError::Auth(_)));
        assert!(err.to_string().contains("app secret invalid"));
    }
}
