//! Post-login redirect resolution.
//!
//! A privileged account always lands on the admin dashboard, no matter what
//! `returnTo` a caller supplied. This ordering is deliberate: a crafted
//! `returnTo` must never steer an admin away from the admin surface.

use std::collections::HashSet;

pub const ADMIN_PATH: &str = "/dashabi/dashboard";
pub const ROOT_PATH: &str = "/";

/// Accounts that always route to the admin dashboard after login.
pub const DEFAULT_ADMIN_EMAILS: [&str; 3] =
    ["admin@example.com", "mz2503687@gmail.com", "it@haixin.org"];

/// Normalize an email for allow-list membership checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone, Debug)]
pub struct RedirectPolicy {
    admin_emails: HashSet<String>,
    admin_path: String,
    default_path: String,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ADMIN_EMAILS.iter().map(ToString::to_string))
    }
}

impl RedirectPolicy {
    #[must_use]
    pub fn new(admin_emails: impl IntoIterator<Item = String>) -> Self {
        Self {
            admin_emails: admin_emails
                .into_iter()
                .map(|email| normalize_email(&email))
                .filter(|email| !email.is_empty())
                .collect(),
            admin_path: ADMIN_PATH.to_string(),
            default_path: ROOT_PATH.to_string(),
        }
    }

    #[must_use]
    pub fn with_admin_path(mut self, path: String) -> Self {
        self.admin_path = path;
        self
    }

    #[must_use]
    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_emails.contains(&normalize_email(email))
    }

    #[must_use]
    pub fn admin_path(&self) -> &str {
        &self.admin_path
    }

    /// Resolve the post-login destination.
    ///
    /// Precedence: admin allow-list, then the query `returnTo`, then the
    /// router-state `returnTo`, then the root path. Total over all inputs.
    #[must_use]
    pub fn resolve(
        &self,
        email: &str,
        query_return_to: Option<&str>,
        state_return_to: Option<&str>,
    ) -> String {
        if self.is_admin(email) {
            return self.admin_path.clone();
        }

        let non_empty = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        non_empty(query_return_to)
            .or_else(|| non_empty(state_return_to))
            .unwrap_or_else(|| self.default_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_email_overrides_return_to() {
        let policy = RedirectPolicy::default();
        for email in DEFAULT_ADMIN_EMAILS {
            assert_eq!(
                policy.resolve(email, Some("/submit-resume"), Some("/jobs/1")),
                ADMIN_PATH
            );
        }
    }

    #[test]
    fn admin_match_is_trimmed_and_case_insensitive() {
        let policy = RedirectPolicy::default();
        assert_eq!(
            policy.resolve("  IT@Haixin.ORG ", Some("/submit-resume"), None),
            ADMIN_PATH
        );
        assert!(policy.is_admin(" Admin@Example.com "));
    }

    #[test]
    fn query_return_to_wins_over_state() {
        let policy = RedirectPolicy::default();
        assert_eq!(
            policy.resolve("user@x.com", Some("/submit-resume"), Some("/jobs/1")),
            "/submit-resume"
        );
    }

    #[test]
    fn state_return_to_used_when_query_empty() {
        let policy = RedirectPolicy::default();
        assert_eq!(
            policy.resolve("user@x.com", Some(""), Some("/jobs/1")),
            "/jobs/1"
        );
        assert_eq!(
            policy.resolve("user@x.com", None, Some("/jobs/1")),
            "/jobs/1"
        );
    }

    #[test]
    fn falls_back_to_root() {
        let policy = RedirectPolicy::default();
        assert_eq!(policy.resolve("user@x.com", None, None), ROOT_PATH);
        assert_eq!(policy.resolve("user@x.com", Some("  "), Some("")), ROOT_PATH);
    }

    #[test]
    fn custom_allow_list_replaces_defaults() {
        let policy = RedirectPolicy::new(vec!["Ops@Hirely.dev ".to_string()]);
        assert!(policy.is_admin("ops@hirely.dev"));
        assert!(!policy.is_admin("it@haixin.org"));
    }
}
