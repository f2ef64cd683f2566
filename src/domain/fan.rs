//! Fan identity.

use crate::domain::{Area, FanId};
use serde::{Deserialize, Serialize};

/// A registered fan. `residence_area` is always a physical area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fan {
    pub id: FanId,
    pub display_name: String,
    pub residence_area: Area,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// Registration timestamp, assigned by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Fan {
    /// Create a fan with a fresh id.
    pub fn new(display_name: impl Into<String>, residence_area: Area) -> Self {
        Self {
            id: FanId::generate(),
            display_name: display_name.into(),
            residence_area,
            memo: None,
            created_at: None,
        }
    }

    pub fn with_id(mut self, id: FanId) -> Self {
        self.id = id;
        self
    }

    pub fn with_memo(mut self, memo: Option<String>) -> Self {
        self.memo = memo.filter(|m| !m.trim().is_empty());
        self
    }
}
