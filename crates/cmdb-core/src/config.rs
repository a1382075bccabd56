//! Engine configuration
//!
//! Defaults match the behaviour the HTTP layer expects; a deployment can
//! override them from a TOML table.
//!
//! ```toml
//! default_depth = 2
//! unknown_user_label = "unknown"
//! summary_separator = " | "
//! log_profile = "production"
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::logging_facility::{self, Profile};

/// Default reference-section recursion budget for callers that do not pass one
pub const DEFAULT_RENDER_DEPTH: u32 = 1;

/// Label used when an author or editor cannot be resolved
pub const DEFAULT_UNKNOWN_USER_LABEL: &str = "unknown";

/// Separator between values of an object's summary line
pub const DEFAULT_SUMMARY_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_depth: u32,
    pub unknown_user_label: String,
    pub summary_separator: String,
    pub log_profile: Profile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_depth: DEFAULT_RENDER_DEPTH,
            unknown_user_label: DEFAULT_UNKNOWN_USER_LABEL.to_string(),
            summary_separator: DEFAULT_SUMMARY_SEPARATOR.to_string(),
            log_profile: Profile::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from TOML; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns `Config` if the text is not valid TOML or a key has the wrong type.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Install the process-wide subscriber for `log_profile`
    ///
    /// Only the first call in a process takes effect.
    pub fn init_logging(&self) {
        logging_facility::init(self.log_profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CmdbError;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_depth, 1);
        assert_eq!(config.unknown_user_label, "unknown");
        assert_eq!(config.summary_separator, " | ");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("default_depth = 3\nlog_profile = \"production\"")
            .unwrap();
        assert_eq!(config.default_depth, 3);
        assert_eq!(config.log_profile, Profile::Production);
        assert_eq!(config.unknown_user_label, "unknown");
    }

    #[test]
    fn test_init_logging_uses_configured_profile() {
        let config = EngineConfig::from_toml_str("log_profile = \"test\"").unwrap();
        assert_eq!(config.log_profile, Profile::Test);

        config.init_logging();
        config.init_logging();
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = EngineConfig::from_toml_str("default_depth = \"deep\"");
        assert!(matches!(result, Err(CmdbError::Config { .. })));
    }
}
