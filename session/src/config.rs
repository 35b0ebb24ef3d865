//! Session configuration.

use crate::{SessionError, SessionResult};
use serde::Deserialize;

/// Page size limits for list operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    /// Largest accepted `size`. Larger requests are rejected.
    pub max_page_size: Option<u32>,
    /// Page size used when a list request carries none.
    pub default_page_size: Option<u32>,
}

/// Session configuration. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub pagination: PaginationConfig,
    /// Check mutation payloads against the derived input shapes.
    pub validate_input: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pagination: PaginationConfig::default(),
            validate_input: true,
        }
    }
}

impl SessionConfig {
    /// Load a configuration from JSON.
    pub fn from_json_str(json: &str) -> SessionResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SessionError::config(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> SessionResult<()> {
        let PaginationConfig {
            max_page_size,
            default_page_size,
        } = self.pagination;
        if max_page_size == Some(0) {
            return Err(SessionError::config("max_page_size must be positive"));
        }
        if let (Some(max), Some(default)) = (max_page_size, default_page_size) {
            if default > max {
                return Err(SessionError::config(format!(
                    "default_page_size {} exceeds max_page_size {}",
                    default, max
                )));
            }
        }
        Ok(())
    }
}
