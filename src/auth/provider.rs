//! Client for the hosted auth provider.
//!
//! The provider owns accounts, passwords, and sessions; this module only
//! forwards calls and interprets failures. `AuthApi` is the seam used by the
//! flow so tests can substitute a fake provider.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::future::Future;
use url::Url;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Provider failure messages that mean the account exists but the email was
/// never confirmed. Matched case-sensitively, as the provider emits them.
const UNCONFIRMED_EMAIL_MARKERS: [&str; 3] = [
    "Email not confirmed",
    "email_not_confirmed",
    "Email address not confirmed",
];

#[derive(Clone, Debug)]
pub struct ProviderError {
    status: Option<u16>,
    message: String,
}

impl ProviderError {
    #[must_use]
    pub fn new(status: Option<u16>, message: String) -> Self {
        Self { status, message }
    }

    fn transport(err: &reqwest::Error) -> Self {
        Self {
            status: err.status().map(|status| status.as_u16()),
            message: String::new(),
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Raw provider message; empty when the failure carried no usable text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn is_unconfirmed_email(&self) -> bool {
        UNCONFIRMED_EMAIL_MARKERS
            .iter()
            .any(|marker| self.message.contains(marker))
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "auth provider request failed")
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ProviderError {}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "user_metadata")]
    pub metadata: Value,
}

/// Result of a successful password sign-in.
#[derive(Clone, Debug)]
pub struct SignedInUser {
    pub access_token: SecretString,
    pub user: AuthUser,
}

/// Auth provider operations used by the flow. Implemented by the HTTP client
/// and by in-memory fakes in tests.
pub trait AuthApi: Send + Sync {
    fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        redirect_to: Option<&str>,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<SignedInUser, ProviderError>> + Send;

    /// Re-send the signup confirmation email.
    fn resend_signup(&self, email: &str) -> impl Future<Output = Result<(), ProviderError>> + Send;

    fn sign_out(
        &self,
        access_token: &SecretString,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    fn get_user(
        &self,
        access_token: &str,
    ) -> impl Future<Output = Result<AuthUser, ProviderError>> + Send;

    /// Compose the OAuth authorize URL; navigating there causes a full-page
    /// redirect handled entirely by the provider.
    fn authorize_url(&self, provider: &str, redirect_to: &str) -> Result<String, ProviderError>;
}

/// HTTP client for the provider's `/auth/v1` API.
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl AuthClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(backend_url: &str, api_key: SecretString) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|err| ProviderError::new(None, err.to_string()))?;

        Ok(Self {
            client,
            base_url: format!("{}/auth/v1", backend_url.trim_end_matches('/')),
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.endpoint(path))
            .header("apikey", self.api_key.expose_secret())
    }

    /// Cheap reachability probe for /health.
    pub async fn ping(&self) -> bool {
        match self.request(reqwest::Method::GET, "/health").send().await {
            Ok(response) => !response.status().is_server_error(),
            Err(err) => {
                tracing::warn!("Auth provider ping failed: {err}");
                false
            }
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body: Value = response.json().await.unwrap_or(Value::Null);
        Err(ProviderError::new(
            Some(status.as_u16()),
            error_message(&body),
        ))
    }
}

/// Pull a human-readable message out of a provider error body. The provider
/// is not consistent about the field name across endpoints.
fn error_message(body: &Value) -> String {
    for field in ["error_description", "msg", "message", "error"] {
        if let Some(message) = body.get(field).and_then(Value::as_str) {
            if !message.is_empty() {
                return message.to_string();
            }
        }
    }
    String::new()
}

impl AuthApi for AuthClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        redirect_to: Option<&str>,
    ) -> Result<(), ProviderError> {
        let mut request = self.request(reqwest::Method::POST, "/signup").json(&json!({
            "email": email,
            "password": password.expose_secret(),
        }));
        if let Some(redirect_to) = redirect_to {
            request = request.query(&[("redirect_to", redirect_to)]);
        }

        let response = request.send().await.map_err(|err| {
            tracing::error!("Sign-up request failed: {err}");
            ProviderError::transport(&err)
        })?;
        Self::check(response).await?;
        Ok(())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SignedInUser, ProviderError> {
        let response = self
            .request(reqwest::Method::POST, "/token")
            .query(&[("grant_type", "password")])
            .json(&json!({
                "email": email,
                "password": password.expose_secret(),
            }))
            .send()
            .await
            .map_err(|err| {
                tracing::error!("Sign-in request failed: {err}");
                ProviderError::transport(&err)
            })?;

        let body: Value = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|err| ProviderError::transport(&err))?;

        let access_token = body
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::new(None, String::new()))?
            .to_string();
        let user: AuthUser = body
            .get("user")
            .cloned()
            .and_then(|user| serde_json::from_value(user).ok())
            .ok_or_else(|| ProviderError::new(None, String::new()))?;

        Ok(SignedInUser {
            access_token: SecretString::from(access_token),
            user,
        })
    }

    async fn resend_signup(&self, email: &str) -> Result<(), ProviderError> {
        let response = self
            .request(reqwest::Method::POST, "/resend")
            .json(&json!({
                "type": "signup",
                "email": email,
            }))
            .send()
            .await
            .map_err(|err| {
                tracing::error!("Resend request failed: {err}");
                ProviderError::transport(&err)
            })?;
        Self::check(response).await?;
        Ok(())
    }

    async fn sign_out(&self, access_token: &SecretString) -> Result<(), ProviderError> {
        let response = self
            .request(reqwest::Method::POST, "/logout")
            .bearer_auth(access_token.expose_secret())
            .send()
            .await
            .map_err(|err| {
                tracing::error!("Sign-out request failed: {err}");
                ProviderError::transport(&err)
            })?;
        Self::check(response).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, ProviderError> {
        let response = self
            .request(reqwest::Method::GET, "/user")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|err| ProviderError::transport(&err))?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|err| ProviderError::transport(&err))
    }

    fn authorize_url(&self, provider: &str, redirect_to: &str) -> Result<String, ProviderError> {
        let mut url = Url::parse(&self.endpoint("/authorize"))
            .map_err(|err| ProviderError::new(None, err.to_string()))?;
        url.query_pairs_mut()
            .append_pair("provider", provider)
            .append_pair("redirect_to", redirect_to);
        Ok(url.to_string())
    }
}
