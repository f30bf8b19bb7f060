//! Failure classification (component K) and the session-level error type.

use thiserror::Error;

/// The closed set of failure kinds visible to the embedder through
/// `ConnFailed.kind` or a fatal `Session::handle` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Name resolution failed (handled outside the engine; surfaced here).
    Resolving,
    /// The transport connect attempt failed.
    Connecting,
    /// A frame or packet was malformed (bad welcome, bounds violation).
    Invalid,
    /// A read failed or the peer closed the connection.
    Reading,
    /// A write failed.
    Writing,
    /// Login was rejected for bad credentials.
    Password,
    /// Server rejected the login as an intruder lockout.
    Intruder,
    /// A phase timer expired before the expected reply arrived.
    Timeout,
    /// TLS handshake failed (out of scope for this engine; reserved).
    Tls,
    /// The service is temporarily unavailable.
    Unavailable,
}

impl FailureKind {
    /// Whether retrying the same operation later might succeed.
    ///
    /// Timeouts and transient connectivity failures are transient;
    /// protocol violations, bad credentials, and lockouts are not.
    #[must_use]
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Timeout | Self::Connecting | Self::Resolving | Self::Unavailable)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Resolving => "RESOLVING",
            Self::Connecting => "CONNECTING",
            Self::Invalid => "INVALID",
            Self::Reading => "READING",
            Self::Writing => "WRITING",
            Self::Password => "PASSWORD",
            Self::Intruder => "INTRUDER",
            Self::Timeout => "TIMEOUT",
            Self::Tls => "TLS",
            Self::Unavailable => "UNAVAILABLE",
        };
        f.write_str(label)
    }
}

/// Error returned by [`crate::Session::handle`] when a fatal condition
/// arises while the session is already `Connected`. In connect/login
/// phases the same conditions instead surface as a `ConnFailed` event
/// (see `error.rs` docs in the crate root and spec §7).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("session failed: {kind}")]
pub struct SessionError {
    /// The failure kind that terminated the session.
    pub kind: FailureKind,
}

impl SessionError {
    /// Wrap a failure kind as a fatal session error.
    #[must_use]
    pub fn new(kind: FailureKind) -> Self {
        Self { kind }
    }
}

impl From<gg_proto::ProtocolError> for FailureKind {
    fn from(_: gg_proto::ProtocolError) -> Self {
        Self::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_transient() {
        assert!(FailureKind::Timeout.is_transient());
    }

    #[test]
    fn password_is_not_transient() {
        assert!(!FailureKind::Password.is_transient());
    }

    #[test]
    fn intruder_is_not_transient() {
        assert!(!FailureKind::Intruder.is_transient());
    }
}
