// ── Error types ──
//
// `ClientError` is what a SmartHome client reports; `CoreError` is what the
// coordinator and scene adapters surface to the host. The coordinator
// decides which client failures are retryable and which need new
// credentials, so consumers never branch on raw client errors.

use thiserror::Error;

/// Failure reported by a [`SmartHomeClient`](crate::SmartHomeClient).
///
/// Clients must keep connection-level failures and HTTP-level failures
/// apart: the coordinator only attempts a re-login for the latter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The hub could not be reached (connection refused, DNS, timeout).
    #[error("cannot reach hub: {0}")]
    Connection(String),

    /// The hub answered with an HTTP error, typically 403 after a reboot
    /// invalidated the session.
    #[error("hub returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Login was rejected.
    #[error("login failed: {0}")]
    Login(String),

    /// Anything else (malformed response, unsupported device, ...).
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// Returns `true` for connection-level failures.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` for HTTP protocol failures, where a re-login may help.
    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Refresh failed in a way the next poll may fix.
    #[error("error fetching hub data: {source}")]
    UpdateFailed {
        #[source]
        source: ClientError,
    },

    /// Re-login failed; the configured credentials need attention.
    #[error("authentication failed, reconfiguration required: {source}")]
    AuthFailed {
        #[source]
        source: ClientError,
    },

    /// Client failure that is neither a refresh nor an auth problem.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The blocking worker running a client call panicked or was cancelled.
    #[error("worker task failed: {0}")]
    Worker(String),
}

impl CoreError {
    /// Returns `true` if the host should simply try again on the next poll.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpdateFailed { .. })
    }

    /// Returns `true` if new credentials are needed before polling resumes.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::AuthFailed { .. })
    }
}

impl From<tokio::task::JoinError> for CoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Worker(err.to_string())
    }
}
