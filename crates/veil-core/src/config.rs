//! Client configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use veil_download::WarningPolicy;

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Hostname identifying this client; its session is what `read` returns
    pub self_domain: String,
    /// Database file persisting sessions and modes; `None` keeps everything
    /// in memory for the lifetime of the process
    pub profile: Option<PathBuf>,
    /// `User-Agent` for sessions without an agent of their own
    pub user_agent: Option<String>,
    pub fetch_timeout_secs: u64,
    pub warning_policy: WarningPolicy,
}

impl Config {
    pub fn new(self_domain: String) -> Self {
        Self {
            self_domain,
            profile: None,
            user_agent: None,
            fetch_timeout_secs: 30,
            warning_policy: WarningPolicy::default(),
        }
    }

    /// Defaults overlaid with `VEIL_HOSTNAME`, `VEIL_PROFILE`,
    /// `VEIL_USER_AGENT` and `VEIL_FETCH_TIMEOUT`
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `var`
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| var(key).filter(|value| !value.trim().is_empty());

        let mut config = Self::new(Self::hostname_from(&var));

        if let Some(profile) = present("VEIL_PROFILE") {
            config.profile = Some(PathBuf::from(profile));
        }

        if let Some(agent) = present("VEIL_USER_AGENT") {
            config.user_agent = Some(agent);
        }

        if let Some(timeout) = var("VEIL_FETCH_TIMEOUT") {
            config.fetch_timeout_secs = timeout.trim().parse().map_err(|_| {
                CoreError::Config(format!("VEIL_FETCH_TIMEOUT is not a number: {:?}", timeout))
            })?;
        }

        Ok(config)
    }

    pub fn hostname() -> String {
        Self::hostname_from(|key| std::env::var(key).ok())
    }

    fn hostname_from<F>(var: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        ["VEIL_HOSTNAME", "HOSTNAME"]
            .iter()
            .filter_map(|&key| var(key))
            .map(|host| host.trim().to_ascii_lowercase())
            .find(|host| !host.is_empty())
            .unwrap_or_else(|| "localhost".to_string())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::hostname())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::new("veil.local".to_string());

        assert_eq!(config.self_domain, "veil.local");
        assert!(config.profile.is_none());
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.warning_policy, WarningPolicy::AnyFailure);
        assert!(!Config::default().self_domain.is_empty());
    }

    #[test]
    fn test_deserialize() {
        let config: Config = serde_json::from_str(
            r#"{
                "self_domain": "veil.local",
                "profile": "/tmp/veil/profile.db",
                "user_agent": null,
                "fetch_timeout_secs": 10,
                "warning_policy": "transport_only"
            }"#,
        )
        .unwrap();

        assert_eq!(config.profile, Some(PathBuf::from("/tmp/veil/profile.db")));
        assert_eq!(config.warning_policy, WarningPolicy::TransportOnly);
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_vars() {
        let config = Config::from_vars(vars(&[
            ("VEIL_HOSTNAME", " Veil.Local "),
            ("HOSTNAME", "box"),
            ("VEIL_PROFILE", "/var/lib/veil/profile.db"),
            ("VEIL_USER_AGENT", "Mozilla/5.0 (Veil)"),
            ("VEIL_FETCH_TIMEOUT", " 10 "),
        ]))
        .unwrap();

        assert_eq!(config.self_domain, "veil.local");
        assert_eq!(config.profile, Some(PathBuf::from("/var/lib/veil/profile.db")));
        assert_eq!(config.user_agent.as_deref(), Some("Mozilla/5.0 (Veil)"));
        assert_eq!(config.fetch_timeout_secs, 10);
        assert_eq!(config.warning_policy, WarningPolicy::AnyFailure);
    }

    #[test]
    fn test_from_vars_fallbacks() {
        let config = Config::from_vars(vars(&[
            ("HOSTNAME", "Box"),
            ("VEIL_PROFILE", "  "),
            ("VEIL_USER_AGENT", ""),
        ]))
        .unwrap();
        assert_eq!(config.self_domain, "box");
        assert!(config.profile.is_none());
        assert!(config.user_agent.is_none());
        assert_eq!(config.fetch_timeout_secs, 30);

        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(config.self_domain, "localhost");
    }

    #[test]
    fn test_from_vars_rejects_bad_timeout() {
        let result = Config::from_vars(vars(&[("VEIL_FETCH_TIMEOUT", "soon")]));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
