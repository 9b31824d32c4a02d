//! Configuration types for the WS-Trust response parser.

use crate::error::{WsTrustError, WsTrustResult};
use serde::{Deserialize, Serialize};

/// Main configuration for the response parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WsTrustConfig {
    /// Config version
    pub version: String,

    /// Parse limits
    pub settings: SettingsConfig,

    /// XXE prevention configuration
    pub xxe_prevention: XxePreventionConfig,
}

impl Default for WsTrustConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            settings: SettingsConfig::default(),
            xxe_prevention: XxePreventionConfig::default(),
        }
    }
}

impl WsTrustConfig {
    /// Load configuration from a YAML document.
    pub fn from_yaml(yaml: &str) -> WsTrustResult<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| WsTrustError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject limits that would make every response unparseable.
    pub fn validate(&self) -> WsTrustResult<()> {
        if self.settings.max_document_size == 0 {
            return Err(WsTrustError::Config(
                "settings.max_document_size must be greater than zero".to_string(),
            ));
        }
        if self.settings.max_depth == 0 {
            return Err(WsTrustError::Config(
                "settings.max_depth must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Maximum response size to process (bytes)
    pub max_document_size: usize,

    /// Maximum element nesting depth
    pub max_depth: usize,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            max_document_size: 1_048_576, // 1MB
            max_depth: 64,
        }
    }
}

/// XXE (XML External Entity) prevention configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XxePreventionConfig {
    /// Enable XXE prevention (should always be true)
    pub enabled: bool,

    /// Block DOCTYPE declarations
    pub block_doctype: bool,

    /// Block entity declarations and external identifiers
    pub block_external_entities: bool,
}

impl Default for XxePreventionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            block_doctype: true,
            block_external_entities: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WsTrustConfig::default();
        assert!(config.xxe_prevention.enabled);
        assert!(config.xxe_prevention.block_doctype);
        assert_eq!(config.settings.max_document_size, 1_048_576);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = WsTrustConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed = WsTrustConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
version: "1"
settings:
  max_document_size: 2097152
xxe_prevention:
  block_doctype: false
"#;
        let config = WsTrustConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.settings.max_document_size, 2_097_152);
        assert_eq!(config.settings.max_depth, 64);
        assert!(config.xxe_prevention.enabled);
        assert!(!config.xxe_prevention.block_doctype);
        assert!(config.xxe_prevention.block_external_entities);
    }

    #[test]
    fn test_zero_limits_rejected() {
        let err = WsTrustConfig::from_yaml("settings:\n  max_depth: 0\n").unwrap_err();
        assert_eq!(err.code(), "CONFIG");
    }

    #[test]
    fn test_malformed_yaml_rejected() {
        let err = WsTrustConfig::from_yaml("settings: [1, 2").unwrap_err();
        assert!(matches!(err, WsTrustError::Config(_)));
    }
}
