// ── Actor identification number ──
//
// Every SmartHome actor (device, group, template) is addressed by its AIN,
// e.g. `"08761 0000434"` for a DECT plug or `"tmp6F0093-39ADCC3AE"` for a
// template. The value is opaque: no normalization is applied.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable hub-assigned address of a device or template.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ain(String);

impl Ain {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Ain {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<String> for Ain {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Ain {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Ain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn keeps_embedded_whitespace() {
        let ain = Ain::from("08761 0000434");
        assert_eq!(ain.as_str(), "08761 0000434");
        assert_eq!(ain.to_string(), "08761 0000434");
    }

    #[test]
    fn serializes_as_plain_string() {
        let ain: Ain = "tmp6F0093-39ADCC3AE".parse().unwrap();
        let json = serde_json::to_string(&ain).unwrap();
        assert_eq!(json, "\"tmp6F0093-39ADCC3AE\"");
    }
}
