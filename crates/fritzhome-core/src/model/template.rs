// ── Template domain type ──

use serde::{Deserialize, Serialize};

use super::ain::Ain;

/// A template configured on the hub. Applying it switches a set of
/// devices into a stored state; it is exposed to the host as a scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub ain: Ain,
    pub name: String,
}

impl Template {
    pub fn new(ain: impl Into<Ain>, name: impl Into<String>) -> Self {
        Self {
            ain: ain.into(),
            name: name.into(),
        }
    }
}
