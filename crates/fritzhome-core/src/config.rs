// ── Runtime hub configuration ──
//
// Describes *which* hub a coordinator polls and how often. Carries the
// credentials a client is built from, but never touches disk: the
// `fritzhome-config` crate (or the host) builds a `HubConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Poll cadence used when nothing else is configured.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(30);

/// Default hostname of a FRITZ!Box on its own LAN.
pub const DEFAULT_HOST: &str = "fritz.box";

/// Configuration for one hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Name used in logs, usually the host's config entry id.
    pub name: String,
    /// Hostname or URL of the hub (e.g. `fritz.box`, `https://192.168.178.1`).
    pub host: String,
    /// SmartHome user.
    pub username: String,
    pub password: SecretString,
    /// Time between two polls. Must be non-zero.
    pub update_interval: Duration,
}

impl HubConfig {
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            username: username.into(),
            password,
            update_interval: DEFAULT_UPDATE_INTERVAL,
        }
    }

    /// URL of the hub's web interface.
    ///
    /// A bare hostname gets an `http://` prefix; an explicit scheme is kept.
    pub fn configuration_url(&self) -> Result<Url, url::ParseError> {
        if self.host.contains("://") {
            Url::parse(&self.host)
        } else {
            Url::parse(&format!("http://{}", self.host))
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self::new(
            "default",
            DEFAULT_HOST,
            "admin",
            SecretString::from(String::new()),
        )
    }
}
