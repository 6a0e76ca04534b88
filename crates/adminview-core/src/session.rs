//! Operator session
//!
//! Passed explicitly to record sources and action dispatchers. Nothing in
//! the engine reads it.

use adminview_config::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(skip_serializing)]
    pub token: String,
    pub role: String,
    pub name: String,
}

impl Session {
    pub fn new(token: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            role: role.into(),
            name: String::new(),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            token: config.token.clone(),
            role: config.role.clone(),
            name: config.name.clone(),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// Authorization header value
    pub fn bearer(&self) -> CoreResult<String> {
        if !self.is_logged_in() {
            return Err(CoreError::Unauthorized);
        }
        Ok(format!("Bearer {}", self.token.trim()))
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.role
        } else {
            &self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_requires_token() {
        assert!(matches!(Session::default().bearer(), Err(CoreError::Unauthorized)));
        assert!(matches!(Session::new("  ", "admin").bearer(), Err(CoreError::Unauthorized)));
        assert_eq!(Session::new("abc", "admin").bearer().unwrap(), "Bearer abc");
    }

    #[test]
    fn test_from_config() {
        let config = SessionConfig {
            token: "t".to_string(),
            role: "admin".to_string(),
            name: "Rina".to_string(),
        };
        let session = Session::from_config(&config);
        assert!(session.is_logged_in());
        assert_eq!(session.display_name(), "Rina");
        assert_eq!(Session::new("t", "admin").display_name(), "admin");
    }

    #[test]
    fn test_token_not_serialized() {
        let json = serde_json::to_value(Session::new("secret", "admin")).unwrap();
        assert!(json.get("token").is_none());
        assert_eq!(json["role"], "admin");
    }
}
