//! User profile row consumed as opaque AI context.

use crate::model::entry::UserId;
use serde::{Deserialize, Serialize};

const FALLBACK_DISPLAY_NAME: &str = "User";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

impl UserProfile {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            full_name: None,
            email: None,
        }
    }

    /// Name shown to collaborators; falls back to a generic label.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_DISPLAY_NAME)
    }
}
