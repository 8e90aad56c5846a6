use secrecy::SecretString;

/// Shared connection settings for the hosted platform.
#[derive(Clone)]
pub struct GlobalArgs {
    pub backend_url: String,
    pub anon_key: SecretString,
    pub service_role_key: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(backend_url: String, anon_key: SecretString, service_role_key: SecretString) -> Self {
        Self {
            backend_url,
            anon_key,
            service_role_key,
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("backend_url", &self.backend_url)
            .field("anon_key", &"***")
            .field("service_role_key", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            "https://backend.example.com".to_string(),
            SecretString::from("anon-key".to_string()),
            SecretString::from("service-key".to_string()),
        );
        assert_eq!(args.backend_url, "https://backend.example.com");
        assert_eq!(args.anon_key.expose_secret(), "anon-key");
    }

    #[test]
    fn debug_redacts_keys() {
        let args = GlobalArgs::new(
            "https://backend.example.com".to_string(),
            SecretString::from("anon-key".to_string()),
            SecretString::from("service-key".to_string()),
        );
        let debug = format!("{args:?}");
        assert!(debug.contains("***"));
        assert!(!debug.contains("anon-key"));
        assert!(!debug.contains("service-key"));
    }
}
