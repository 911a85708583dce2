//! Checker configuration.
//!
//! Loaded from a TOML file such as:
//!
//! ```toml
//! disabled_rules = ["Review"]
//! identifier_length_max = 31
//! ast_enabled = true
//! fail_on = "required"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::violation::Category;

/// Default significant-character limit for identifiers.
pub const IDENTIFIER_LENGTH_MAX: usize = 31;

/// Configuration for a checker run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
    /// Rule ids to skip (e.g., "Review", "Dir 4.6")
    pub disabled_rules: Vec<String>,
    /// Longest identifier Rule 5.1 accepts
    pub identifier_length_max: usize,
    /// Run the parser-based rules
    pub ast_enabled: bool,
    /// Weakest category that fails the run
    pub fail_on: Category,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            disabled_rules: Vec::new(),
            identifier_length_max: IDENTIFIER_LENGTH_MAX,
            ast_enabled: true,
            fail_on: Category::Advisory,
        }
    }
}

impl CheckerConfig {
    /// Line rules only, no parsing.
    pub fn regex_only() -> Self {
        Self {
            ast_enabled: false,
            ..Default::default()
        }
    }

    /// Fail only on required and mandatory guidelines; advisory findings
    /// are still reported.
    pub fn required_only() -> Self {
        Self {
            fail_on: Category::Required,
            ..Default::default()
        }
    }

    /// Parse from TOML text.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identifier_length_max == 0 {
            return Err(ConfigError::ZeroIdentifierLength);
        }
        Ok(())
    }

    /// Whether a rule id is disabled. Comparison ignores case and surrounding blanks.
    pub fn is_disabled(&self, rule_id: &str) -> bool {
        self.disabled_rules
            .iter()
            .any(|d| d.trim().eq_ignore_ascii_case(rule_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_presets() {
        let default = CheckerConfig::default();
        assert_eq!(default.identifier_length_max, 31);
        assert!(default.ast_enabled);
        assert_eq!(default.fail_on, Category::Advisory);

        assert!(!CheckerConfig::regex_only().ast_enabled);
        let required_only = CheckerConfig::required_only();
        assert_eq!(required_only.fail_on, Category::Required);
        assert!(!Category::Advisory.at_least(required_only.fail_on));
        assert!(Category::Mandatory.at_least(required_only.fail_on));
    }

    #[test]
    fn test_from_toml_partial() {
        let config = CheckerConfig::from_toml(
            "disabled_rules = [\"Review\"]\nfail_on = \"required\"\n",
            Path::new("misra.toml"),
        )
        .unwrap();
        assert!(config.is_disabled("review"));
        assert!(!config.is_disabled("Rule 15.1"));
        assert_eq!(config.fail_on, Category::Required);
        assert_eq!(config.identifier_length_max, 31);
    }

    #[test]
    fn test_from_toml_rejects_unknown_keys() {
        let err = CheckerConfig::from_toml("colour = true\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_from_toml_rejects_zero_length() {
        let err = CheckerConfig::from_toml("identifier_length_max = 0\n", Path::new("x.toml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroIdentifierLength));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("misra.toml");
        std::fs::write(&path, "ast_enabled = false\n").unwrap();
        let config = CheckerConfig::load(&path).unwrap();
        assert!(!config.ast_enabled);

        let missing = CheckerConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Read { .. }));
    }
}
