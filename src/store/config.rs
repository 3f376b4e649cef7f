use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Record keys used to match tasks to the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Task field naming the owning user's email. Defaults to `"user"`.
    pub task_owner_key: String,
    /// User field holding the email address. Defaults to `"email"`.
    pub user_email_key: String,
}

impl StoreConfig {
    /// Load configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            task_owner_key: "user".to_string(),
            user_email_key: "email".to_string(),
        }
    }
}
