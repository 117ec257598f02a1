//! Session record data structure

use serde::{Deserialize, Serialize};

use veil_storage::domain_key;

use crate::error::SessionError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Identifying agent string, if one has been assigned
    pub agent: Option<String>,
    /// Partition key, unique across the registry
    pub domain: String,
    /// Tab identifiers in attach order
    pub tabs: Vec<String>,
    /// Raised once per failed fetch against this domain
    pub warning: u32,
}

impl SessionRecord {
    pub fn new(domain: String) -> Self {
        Self {
            agent: None,
            domain,
            tabs: Vec::new(),
            warning: 0,
        }
    }

    /// Add a tab ID, keeping attach order and skipping duplicates
    pub fn add_tab(&mut self, tab_id: String) {
        if !self.tabs.contains(&tab_id) {
            self.tabs.push(tab_id);
        }
    }

    pub fn remove_tab(&mut self, tab_id: &str) {
        self.tabs.retain(|id| id != tab_id);
    }

    pub fn raise_warning(&mut self) {
        self.warning = self.warning.saturating_add(1);
    }
}

/// Registry key for `domain`; see [`veil_storage::domain_key`]
pub fn normalize_domain(domain: &str) -> Result<String> {
    domain_key(domain).ok_or_else(|| SessionError::InvalidDomain(domain.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record() {
        let record = SessionRecord::new("example.com".to_string());
        assert_eq!(record.agent, None);
        assert!(record.tabs.is_empty());
        assert_eq!(record.warning, 0);
    }

    #[test]
    fn test_tabs() {
        let mut record = SessionRecord::new("example.com".to_string());

        record.add_tab("tab-1".to_string());
        record.add_tab("tab-2".to_string());
        record.add_tab("tab-1".to_string());
        assert_eq!(record.tabs, vec!["tab-1", "tab-2"]);

        record.remove_tab("tab-1");
        record.remove_tab("tab-9");
        assert_eq!(record.tabs, vec!["tab-2"]);
    }

    #[test]
    fn test_serialized_shape() {
        let record = SessionRecord::new("example.com".to_string());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "agent": null,
                "domain": "example.com",
                "tabs": [],
                "warning": 0
            })
        );
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain(" Example.COM. ").unwrap(), "example.com");
        assert!(normalize_domain("").is_err());
        assert!(normalize_domain("   ").is_err());
        assert!(normalize_domain("exa mple.com").is_err());
    }
}
