//! Client events and actions: the "events in, actions out" pairing the
//! embedder drives the session with.

use std::net::SocketAddr;
use std::time::Instant;

use gg_core::Event;
use gg_proto::Frame;

/// Events the caller feeds into [`crate::Session::handle`].
///
/// The caller is responsible for resolving hostnames, opening sockets,
/// and reading/decoding frames off them; this engine only reacts to
/// the outcomes.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Begin the login sequence: resolve the directory hub.
    Open,

    /// The hub hostname resolved to an address.
    HubResolved {
        /// Resolved hub address.
        addr: SocketAddr,
    },

    /// The embedder's transport finished connecting the most recently
    /// requested socket (hub or assigned server, depending on phase).
    TransportConnected,

    /// The hub sent its plaintext redirect to the assigned server.
    /// Parsing that line is the embedder's job (it isn't a framed
    /// packet); this event carries the already-parsed address.
    HubRedirect {
        /// Address of the server the hub assigned.
        addr: SocketAddr,
    },

    /// A whole frame was read off the active socket.
    FrameReceived(Frame),

    /// Time tick for timeout processing. The caller should send these
    /// periodically so the engine can detect a stalled handshake.
    Tick {
        /// Current time.
        now: Instant,
    },

    /// Application wants to end the session gracefully.
    RequestDisconnect,
}

/// Actions the session produces for the caller to execute. None of
/// these touch a socket themselves — the caller (or the optional
/// `transport` adapter) does the I/O.
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// Resolve this hostname and feed the result back as
    /// [`SessionEvent::HubResolved`] or [`SessionEvent::HubRedirect`].
    Resolve {
        /// Hostname to resolve.
        hostname: String,
    },

    /// Open a TCP connection to this address.
    Connect {
        /// Address to connect to.
        addr: SocketAddr,
    },

    /// Send this frame on the active socket.
    Send(Frame),

    /// Close the active socket; the session is done (failed or torn
    /// down) and should be dropped.
    Close,

    /// Deliver a decoded event to the application layer.
    Deliver(Event),

    /// Log message for diagnostics.
    Log {
        /// Log message.
        message: String,
    },
}
