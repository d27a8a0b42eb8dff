//! Feishu open platform REST client.
//!
//! Provides a blocking HTTP client authenticated with a tenant access token.

mod auth;
mod docx;
mod im;

use std::cell::OnceCell;
use std::time::Duration;

use herald_config::FeishuConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use ureq::Agent;
use ureq::http::Response;

use crate::error::FeishuError;
use crate::types::ApiResponse;

/// Feishu open platform client for one application.
///
/// The tenant access token is exchanged lazily on the first authenticated
/// call and cached for the lifetime of this value only.
pub struct FeishuClient {
    agent: Agent,
    base_url: String,
    app_id: String,
    app_secret: String,
    token: OnceCell<String>,
}

impl FeishuClient {
    /// Create a client.
    ///
    /// # Arguments
    /// * `base_url` - Open platform base URL (e.g. `https://open.feishu.cn/open-apis`)
    /// * `app_id` - Application id
    /// * `app_secret` - Application secret
    /// * `timeout` - Global timeout for every request
    pub fn new(base_url: &str, app_id: &str, app_secret: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            app_id: app_id.to_owned(),
            app_secret: app_secret.to_owned(),
            token: OnceCell::new(),
        }
    }

    /// Create a client from shared settings and one application's credentials.
    pub fn from_config(feishu: &FeishuConfig, app_id: &str, app_secret: &str) -> Self {
        Self::new(
            &feishu.base_url,
            app_id,
            app_secret,
            Duration::from_secs(feishu.timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Authenticated GET returning the response envelope.
    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, FeishuError> {
        let bearer = format!("Bearer {}", self.access_token()?);
        let response = self
            .agent
            .get(&self.url(path))
            .header("Authorization", &bearer)
            .header("Accept", "application/json")
            .call()?;
        read_envelope(response)
    }

    /// Authenticated JSON POST returning the response envelope.
    fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, FeishuError> {
        let bearer = format!("Bearer {}", self.access_token()?);
        let payload = serde_json::to_vec(body)?;
        let response = self
            .agent
            .post(&self.url(path))
            .header("Authorization", &bearer)
            .header("Content-Type", "application/json; charset=utf-8")
            .header("Accept", "application/json")
            .send(&payload[..])?;
        read_envelope(response)
    }
}

/// Turn an HTTP response into an API envelope, mapping error statuses.
fn read_envelope<T: DeserializeOwned>(
    response: Response<ureq::Body>,
) -> Result<ApiResponse<T>, FeishuError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(FeishuError::HttpResponse {
            status,
            body: error_body,
        });
    }

    Ok(body_reader.read_json()?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_url_joining() {
        let client = FeishuClient::new(
            "https://open.feishu.cn/open-apis/",
            "id",
            "secret",
            Duration::from_secs(5),
        );
        assert_eq!(
            client.url("/docx/v1/documents"),
            "https://open.feishu.cn/open-apis/docx/v1/documents"
        );
        assert_eq!(
            client.url("im/v1/chats"),
            "https://open.feishu.cn/open-apis/im/v1/chats"
        );
    }

    #[test]
    fn test_from_config() {
        let client = FeishuClient::from_config(&FeishuConfig::default(), "cli_a", "s");
        assert_eq!(client.base_url, "https://open.feishu.cn/open-apis");
        assert_eq!(client.app_id, "cli_a");
        assert!(client.token.get().is_none());
    }
}
