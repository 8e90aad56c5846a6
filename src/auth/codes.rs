//! Client for the hosted verification-code functions.
//!
//! Two endpoints, both JSON over POST with a bearer credential:
//! `/send-verification-code {email}` and `/verify-code {email, code, password}`.
//! Field names are part of the contract with the deployed functions.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;

use super::provider::ProviderError;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Outcome of a send-code request.
///
/// `debug_code` is a development-mode affordance of the deployed function and
/// is only surfaced when the flow is explicitly configured to expose it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SendCodeResponse {
    #[serde(default)]
    pub email_sent: bool,
    #[serde(default)]
    pub debug_code: Option<String>,
}

/// Verification-code operations used by the flow.
pub trait CodeApi: Send + Sync {
    fn send_code(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<SendCodeResponse, ProviderError>> + Send;

    fn verify_code(
        &self,
        email: &str,
        code: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;
}

pub struct CodeClient {
    client: reqwest::Client,
    base_url: String,
    bearer: SecretString,
}

impl CodeClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(functions_url: &str, bearer: SecretString) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|err| ProviderError::new(None, err.to_string()))?;

        Ok(Self {
            client,
            base_url: functions_url.trim_end_matches('/').to_string(),
            bearer,
        })
    }

    async fn post(&self, path: &str, payload: &Value) -> Result<Value, ProviderError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(self.bearer.expose_secret())
            .json(payload)
            .send()
            .await
            .map_err(|err| {
                tracing::error!("Verification function request failed: {err}");
                ProviderError::new(err.status().map(|status| status.as_u16()), String::new())
            })?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if status.is_success() {
            return Ok(body);
        }

        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Err(ProviderError::new(Some(status.as_u16()), message))
    }
}

impl CodeApi for CodeClient {
    async fn send_code(&self, email: &str) -> Result<SendCodeResponse, ProviderError> {
        let body = self
            .post("/send-verification-code", &json!({ "email": email }))
            .await?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    async fn verify_code(
        &self,
        email: &str,
        code: &str,
        password: &SecretString,
    ) -> Result<(), ProviderError> {
        self.post(
            "/verify-code",
            &json!({
                "email": email,
                "code": code,
                "password": password.expose_secret(),
            }),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_code_response_defaults() -> anyhow::Result<()> {
        let response: SendCodeResponse = serde_json::from_value(serde_json::json!({}))?;
        assert!(!response.email_sent);
        assert!(response.debug_code.is_none());
        Ok(())
    }

    #[test]
    fn send_code_response_with_debug_code() -> anyhow::Result<()> {
        let response: SendCodeResponse = serde_json::from_value(serde_json::json!({
            "email_sent": false,
            "debug_code": "123456"
        }))?;
        assert!(!response.email_sent);
        assert_eq!(response.debug_code.as_deref(), Some("123456"));
        Ok(())
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() -> anyhow::Result<()> {
        let client = CodeClient::new(
            "https://backend.example.com/functions/v1/",
            SecretString::from("anon".to_string()),
        )?;
        assert_eq!(client.base_url, "https://backend.example.com/functions/v1");
        Ok(())
    }
}
