//! Postal addresses for order placement.

use serde::{Deserialize, Serialize};

/// Address payload passed to the order procedures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    pub line1: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,

    pub city: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    pub postal_code: String,
    pub country: String,
}

impl Address {
    /// Stand-in address for demo stores that collect no address yet, named
    /// after the shopper.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            line1: "123 Default St".to_string(),
            line2: None,
            city: "Anytown".to_string(),
            state: None,
            postal_code: "12345".to_string(),
            country: "US".to_string(),
        }
    }

    /// Whether every required field has content.
    pub fn is_complete(&self) -> bool {
        [
            &self.name,
            &self.line1,
            &self.city,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}
