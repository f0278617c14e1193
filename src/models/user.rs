use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub type UserId = String;

/// Where a user can be reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactProfile {
    pub user_id: UserId,
    #[serde(default)]
    pub push_tokens: BTreeSet<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl ContactProfile {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            push_tokens: BTreeSet::new(),
            phone_number: None,
        }
    }

    /// Phone number usable for a call. Blank numbers count as missing.
    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number
            .as_deref()
            .map(str::trim)
            .filter(|number| !number.is_empty())
    }
}
