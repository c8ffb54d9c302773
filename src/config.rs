use checkers_core::engine::Strategy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEARCH_DEPTH: u8 = 5;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid session config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("search depth must be at least 1")]
    ZeroDepth,
}

/// Search parameters passed with every best-move request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub strategy: Strategy,
    pub depth: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::AlphaBeta,
            depth: DEFAULT_SEARCH_DEPTH,
        }
    }
}

impl SessionConfig {
    /// Parses a JSON config. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON or an unknown strategy
    /// name, and [`ConfigError::ZeroDepth`] when `depth` is 0.
    pub fn load_from_json(json_str: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json_str)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroDepth`] when `depth` is 0.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_default() {
        let config = SessionConfig::load_from_json("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.strategy, Strategy::AlphaBeta);
        assert_eq!(config.depth, 5);
    }

    #[test]
    fn test_load_config_partial() {
        let config = SessionConfig::load_from_json(r#"{ "strategy": "minimax" }"#).unwrap();
        assert_eq!(config.strategy, Strategy::Minimax);
        assert_eq!(config.depth, DEFAULT_SEARCH_DEPTH);
    }

    #[test]
    fn test_load_config_full() {
        let json = r#"{
            "strategy": "alphabeta",
            "depth": 8
        }"#;
        let config = SessionConfig::load_from_json(json).unwrap();
        assert_eq!(config.strategy, Strategy::AlphaBeta);
        assert_eq!(config.depth, 8);
    }

    #[test]
    fn test_load_config_invalid_json() {
        let result = SessionConfig::load_from_json("{ invalid json }");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_load_config_unknown_strategy() {
        let result = SessionConfig::load_from_json(r#"{ "strategy": "negamax" }"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_load_config_zero_depth() {
        let result = SessionConfig::load_from_json(r#"{ "depth": 0 }"#);
        assert!(matches!(result, Err(ConfigError::ZeroDepth)));
    }
}
