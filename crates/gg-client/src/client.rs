//! The embedder-facing [`Session`] wrapper: owns a [`gg_core::Session`]
//! plus the handshake bookkeeping (hub hostname, login timeout) that
//! sits outside the Sans-IO engine's own data model, and turns each
//! [`SessionEvent`] into the actions the caller must execute.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use bytes::Bytes;
use gg_core::{FailureKind, LocalAddressSource, Phase, SessionError};
use gg_proto::{Frame, PacketType};
use tracing::{debug, warn};

use crate::event::{SessionAction, SessionEvent};

/// Well-known default hostname for the directory hub that redirects a
/// fresh login to the account's assigned server.
pub const DEFAULT_HUB_HOSTNAME: &str = "appmsg.gadu-gadu.pl";

/// How long the engine waits for forward progress during the connect
/// and login phases before synthesizing `ConnFailed { TIMEOUT }`.
pub const DEFAULT_LOGIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Hostname and timeout policy that sits outside the Sans-IO core's own
/// data model (spec.md's `set_resolver`/`set_custom_resolver` global,
/// reshaped per SPEC_FULL §6 into a value captured once at construction).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Hostname of the directory hub.
    pub hub_hostname: String,
    /// Handshake timeout.
    pub login_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { hub_hostname: DEFAULT_HUB_HOSTNAME.to_string(), login_timeout: DEFAULT_LOGIN_TIMEOUT }
    }
}

fn is_handshake_phase(phase: Phase) -> bool {
    !matches!(phase, Phase::Idle | Phase::Connected)
}

/// The public, action-based session handle. Wraps the Sans-IO engine
/// ([`gg_core::Session`]) with the surrounding hub-redirect and timeout
/// bookkeeping that the embedder would otherwise have to reimplement
/// per spec.md §5/§6.
pub struct Session {
    inner: gg_core::Session,
    resolver: ResolverConfig,
    local_address_source: Box<dyn LocalAddressSource>,
}

impl Session {
    /// Create a new session from login parameters. Does not touch a
    /// socket; call [`Session::handle`] with [`SessionEvent::Open`] to
    /// begin the handshake.
    #[must_use]
    pub fn new(params: gg_core::LoginParams, resolver: ResolverConfig, local_address_source: Box<dyn LocalAddressSource>) -> Self {
        Self { inner: gg_core::Session::new(params), resolver, local_address_source }
    }

    /// Current phase, for embedders that want to report connection
    /// status without waiting for an event.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.inner.phase
    }

    /// Handle one event, producing the actions the caller must execute
    /// in order.
    ///
    /// # Errors
    ///
    /// Returns `Err` when a fatal condition (spec §7 tier 3) arises
    /// while the session is already `Connected`; see
    /// [`gg_core::dispatch::handle_frame`] for the full contract.
    pub fn handle(&mut self, event: SessionEvent) -> Result<Vec<SessionAction>, SessionError> {
        match event {
            SessionEvent::Open => Ok(self.handle_open()),
            SessionEvent::HubResolved { addr } => Ok(self.handle_hub_resolved(addr)),
            SessionEvent::TransportConnected => Ok(self.handle_transport_connected()),
            SessionEvent::HubRedirect { addr } => Ok(self.handle_hub_redirect(addr)),
            SessionEvent::FrameReceived(frame) => self.handle_frame(&frame),
            SessionEvent::Tick { now } => Ok(self.handle_tick(now)),
            SessionEvent::RequestDisconnect => Ok(self.handle_request_disconnect()),
        }
    }

    fn handle_open(&mut self) -> Vec<SessionAction> {
        self.inner.phase = Phase::ResolvingHub;
        debug!(hostname = %self.resolver.hub_hostname, "resolving hub");
        vec![SessionAction::Resolve { hostname: self.resolver.hub_hostname.clone() }]
    }

    fn handle_hub_resolved(&mut self, addr: SocketAddr) -> Vec<SessionAction> {
        if self.inner.phase != Phase::ResolvingHub {
            warn!(phase = ?self.inner.phase, "hub resolved while not resolving, ignored");
            return Vec::new();
        }
        self.inner.phase = Phase::ConnectingHub;
        vec![SessionAction::Connect { addr }]
    }

    fn handle_transport_connected(&mut self) -> Vec<SessionAction> {
        match self.inner.phase {
            Phase::ConnectingHub => {
                self.inner.phase = Phase::ReadingHub;
                Vec::new()
            },
            Phase::ConnectingServer => {
                self.inner.phase = Phase::ReadingKey;
                Vec::new()
            },
            other => {
                warn!(phase = ?other, "unexpected transport-connected event, ignored");
                Vec::new()
            },
        }
    }

    fn handle_hub_redirect(&mut self, addr: SocketAddr) -> Vec<SessionAction> {
        if self.inner.phase != Phase::ReadingHub {
            warn!(phase = ?self.inner.phase, "hub redirect while not reading hub, ignored");
            return Vec::new();
        }
        self.inner.phase = Phase::ConnectingServer;
        vec![SessionAction::Connect { addr }]
    }

    fn handle_frame(&mut self, frame: &Frame) -> Result<Vec<SessionAction>, SessionError> {
        let outcome = gg_core::handle_frame(&mut self.inner, frame, self.local_address_source.as_ref())?;
        let mut actions = Vec::new();
        if let Some(reply) = outcome.outbound {
            actions.push(SessionAction::Send(reply));
        }
        if outcome.event != gg_core::Event::None {
            actions.push(SessionAction::Deliver(outcome.event));
        }
        Ok(actions)
    }

    fn handle_tick(&mut self, now: Instant) -> Vec<SessionAction> {
        let Some(last_read) = self.inner.last_read else {
            return Vec::new();
        };
        if !is_handshake_phase(self.inner.phase) {
            return Vec::new();
        }
        if now.duration_since(last_read) < self.resolver.login_timeout {
            return Vec::new();
        }
        warn!(phase = ?self.inner.phase, "handshake timed out");
        self.inner.phase = Phase::Idle;
        vec![SessionAction::Close, SessionAction::Deliver(gg_core::Event::ConnFailed { kind: FailureKind::Timeout })]
    }

    fn handle_request_disconnect(&mut self) -> Vec<SessionAction> {
        if self.inner.phase != Phase::Connected {
            return Vec::new();
        }
        self.inner.phase = Phase::Disconnecting;
        vec![SessionAction::Send(Frame::new(PacketType::Disconnecting.to_u32(), Bytes::new()))]
    }
}
