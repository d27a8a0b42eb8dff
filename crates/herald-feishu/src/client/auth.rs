//! Tenant access token exchange.

use serde_json::json;
use tracing::info;

use super::FeishuClient;
use crate::error::FeishuError;
use crate::types::TokenResponse;

const TOKEN_PATH: &str = "auth/v3/tenant_access_token/internal";

impl FeishuClient {
    /// Tenant access token, exchanged on first use.
    ///
    /// # Errors
    ///
    /// Returns [`FeishuError::Auth`] if the credentials are rejected.
    pub fn access_token(&self) -> Result<&str, FeishuError> {
        if let Some(token) = self.token.get() {
            return Ok(token);
        }
        let token = self.exchange_token()?;
        Ok(self.token.get_or_init(|| token))
    }

    fn exchange_token(&self) -> Result<String, FeishuError> {
        info!("Requesting tenant access token for app {}", self.app_id);

        let payload = serde_json::to_vec(&json!({
            "app_id": self.app_id,
            "app_secret": self.app_secret,
        }))?;

        let response = self
            .agent
            .post(&self.url(TOKEN_PATH))
            .header("Content-Type", "application/json; charset=utf-8")
            .send(&payload[..])?;

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

        let token: TokenResponse = body_reader.read_json()?;
        token.into_token()
    }
}
