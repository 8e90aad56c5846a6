//! Auth configuration and shared state.

use super::codes::CodeClient;
use super::flow::{FlowConfig, VerificationSessions};
use super::provider::AuthClient;
use super::redirect::RedirectPolicy;
use super::session::SessionHub;

const DEFAULT_VERIFIED_REDIRECT_PATH: &str = "/dashabi/login?verified=true";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    site_url: String,
    verified_redirect_path: String,
    flow: FlowConfig,
    policy: RedirectPolicy,
}

impl AuthConfig {
    #[must_use]
    pub fn new(site_url: String) -> Self {
        // Origins must not carry a trailing slash when composed with paths.
        let site_url = site_url.trim_end_matches('/').to_string();
        Self {
            site_url,
            verified_redirect_path: DEFAULT_VERIFIED_REDIRECT_PATH.to_string(),
            flow: FlowConfig::new(),
            policy: RedirectPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_flow(mut self, flow: FlowConfig) -> Self {
        self.flow = flow;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RedirectPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_verified_redirect_path(mut self, path: String) -> Self {
        self.verified_redirect_path = path;
        self
    }

    #[must_use]
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// Where the provider's confirmation link lands after the user clicks it.
    #[must_use]
    pub fn signup_redirect(&self) -> String {
        format!("{}{}", self.site_url, self.verified_redirect_path)
    }

    #[must_use]
    pub fn flow(&self) -> &FlowConfig {
        &self.flow
    }

    #[must_use]
    pub fn policy(&self) -> &RedirectPolicy {
        &self.policy
    }
}

/// Everything the auth endpoints share: configuration, the provider client,
/// the optional code-function client, live verification sessions, and the
/// session hub.
pub struct AuthState {
    config: AuthConfig,
    provider: AuthClient,
    codes: Option<CodeClient>,
    sessions: VerificationSessions,
    hub: SessionHub,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, provider: AuthClient, codes: Option<CodeClient>) -> Self {
        let sessions = VerificationSessions::new(config.flow().clone());
        Self {
            config,
            provider,
            codes,
            sessions,
            hub: SessionHub::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn provider(&self) -> &AuthClient {
        &self.provider
    }

    #[must_use]
    pub fn codes(&self) -> Option<&CodeClient> {
        self.codes.as_ref()
    }

    #[must_use]
    pub fn sessions(&self) -> &VerificationSessions {
        &self.sessions
    }

    #[must_use]
    pub fn hub(&self) -> &SessionHub {
        &self.hub
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::redirect::ADMIN_PATH;
    use secrecy::SecretString;

    fn state() -> AuthState {
        let provider = AuthClient::new(
            "https://backend.example.com",
            SecretString::from("anon".to_string()),
        )
        .expect("client");
        AuthState::new(AuthConfig::new("https://hirely.dev/".to_string()), provider, None)
    }

    #[test]
    fn site_url_trailing_slash_is_trimmed() {
        let state = state();
        assert_eq!(state.config().site_url(), "https://hirely.dev");
        assert_eq!(
            state.config().signup_redirect(),
            "https://hirely.dev/dashabi/login?verified=true"
        );
    }

    #[test]
    fn default_policy_routes_admins() {
        let state = state();
        assert_eq!(
            state.config().policy().resolve("it@haixin.org", None, None),
            ADMIN_PATH
        );
    }
}
