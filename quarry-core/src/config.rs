//! Configuration types

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// How the nested-relation parsers treat malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestedParseMode {
    /// Recover from malformed input: unreadable embedded queries are dropped,
    /// unbalanced braces are tolerated, empty names are skipped.
    Lenient,
    /// Report the first malformed construct as an error.
    Strict,
}

/// Query-layer configuration.
/// ALL values are required - no defaults anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    pub nested_parse_mode: NestedParseMode,
    /// Deepest `{...}` nesting the parsers will descend into.
    pub max_nested_depth: usize,
}

impl QueryConfig {
    /// Depth used by the named constructors.
    pub const DEFAULT_MAX_NESTED_DEPTH: usize = 32;

    pub fn lenient() -> Self {
        Self {
            nested_parse_mode: NestedParseMode::Lenient,
            max_nested_depth: Self::DEFAULT_MAX_NESTED_DEPTH,
        }
    }

    pub fn strict() -> Self {
        Self {
            nested_parse_mode: NestedParseMode::Strict,
            max_nested_depth: Self::DEFAULT_MAX_NESTED_DEPTH,
        }
    }

    /// Load and validate a configuration from TOML text.
    ///
    /// ```toml
    /// nested_parse_mode = "strict"
    /// max_nested_depth = 16
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: QueryConfig = toml::from_str(source).map_err(|e| ConfigError::Unreadable {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_nested_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_nested_depth".to_string(),
                value: self.max_nested_depth.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn is_strict(&self) -> bool {
        self.nested_parse_mode == NestedParseMode::Strict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_constructors_validate() {
        assert!(QueryConfig::lenient().validate().is_ok());
        assert!(QueryConfig::strict().is_strict());
        assert!(!QueryConfig::lenient().is_strict());
    }

    #[test]
    fn test_from_toml_str() {
        let config = QueryConfig::from_toml_str(
            r#"
            nested_parse_mode = "strict"
            max_nested_depth = 16
            "#,
        )
        .unwrap();
        assert_eq!(config.nested_parse_mode, NestedParseMode::Strict);
        assert_eq!(config.max_nested_depth, 16);
    }

    #[test]
    fn test_from_toml_str_requires_every_field() {
        let err = QueryConfig::from_toml_str(r#"nested_parse_mode = "lenient""#).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let err = QueryConfig::from_toml_str(
            r#"
            nested_parse_mode = "lenient"
            max_nested_depth = 0
            "#,
        )
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "max_nested_depth")
        );
    }
}
