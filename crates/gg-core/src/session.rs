//! The session data model (component F's state) and its configuration.

use std::net::Ipv4Addr;

use gg_crypto::{HashType, Password};

use crate::env::{Clock, SystemClock};

/// Finite phase of the connection. Gates which inbound packet kinds are
/// accepted (see [`crate::dispatch`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No connection attempt in progress.
    Idle,
    /// Resolving the directory hub's address.
    ResolvingHub,
    /// Connecting to the directory hub.
    ConnectingHub,
    /// Reading the hub's redirect to an actual server.
    ReadingHub,
    /// Resolving the assigned server's address.
    ResolvingServer,
    /// Connecting to the assigned server.
    ConnectingServer,
    /// Awaiting the welcome/challenge packet.
    ReadingKey,
    /// Writing the login packet.
    WritingLogin,
    /// Awaiting the login accept/reject reply.
    ReadingReply,
    /// Logged in; steady state.
    Connected,
    /// Teardown in progress.
    Disconnecting,
    /// Opportunistic TLS handshake in progress (out of scope; reserved).
    TlsHandshake,
}

/// Which protocol generation's wire shapes this session speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolGeneration {
    /// 7.x wire shapes (`Login70`).
    Legacy7,
    /// 8.0 wire shapes (`Login80`, XHTML bodies).
    Modern8,
}

/// Character encoding the embedder wants message bodies delivered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Legacy single-byte Windows-1250 codepage.
    Cp1250,
    /// UTF-8.
    Utf8,
}

/// How the hostname-to-address step is performed. The resolution itself
/// is out of scope for this engine (see spec's external collaborators);
/// this only selects which contract the embedder promises to honor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolverKind {
    /// Engine-default resolution strategy.
    Default,
    /// Resolve in a forked child process.
    Fork,
    /// Resolve on a helper thread.
    Pthread,
    /// Platform-specific (Win32) resolution.
    Win32,
    /// Embedder-supplied resolver.
    Custom,
}

/// Parameters supplied to [`crate::Session::new`].
pub struct LoginParams {
    /// Local account identifier.
    pub uin: u32,
    /// Cleartext password, taken by value and zeroized on consumption.
    pub password: Vec<u8>,
    /// Hash family to use for the login challenge.
    pub hash_type: HashType,
    /// Which wire generation to speak.
    pub generation: ProtocolGeneration,
    /// Hostname resolution strategy (external collaborator contract).
    pub resolver_kind: ResolverKind,
    /// Presence to request on successful login.
    pub initial_status: u32,
    /// Optional presence description.
    pub initial_descr: Option<String>,
    /// Feature bitmask advertised to the server.
    pub features: u32,
    /// Declared maximum inbound image size.
    pub image_size: u8,
    /// Body encoding the embedder wants delivered.
    pub encoding: Encoding,
    /// Whether to zero the password buffer once it's been hashed.
    pub clear_password: bool,
    /// Local IPv4 to advertise; `255.255.255.255` requests the engine
    /// query the connected socket's local address instead (see
    /// [`crate::login`]).
    pub local_ip_override: Ipv4Addr,
    /// Local port to advertise.
    pub local_port: u16,
    /// External IPv4/port hint for peer-to-peer transfer, if any.
    pub external_ip: Option<Ipv4Addr>,
    /// External port hint.
    pub external_port: u16,
}

/// An in-progress multi-fragment image reassembly.
///
/// Invariant: `received <= declared_size` always.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    /// Sender's account id.
    pub sender: u32,
    /// Declared total size, from the first fragment.
    pub declared_size: u32,
    /// Declared CRC32, from the first fragment.
    pub declared_crc32: u32,
    /// Bytes received so far.
    pub received: u32,
    /// Accumulated payload bytes.
    pub bytes: Vec<u8>,
    /// Filename carried by the first fragment.
    pub filename: Option<String>,
}

impl ImageEntry {
    /// Append fragment bytes, truncating so `received` never exceeds
    /// `declared_size`.
    pub fn append(&mut self, fragment: &[u8]) {
        let remaining = self.declared_size.saturating_sub(self.received) as usize;
        let take = fragment.len().min(remaining);
        self.bytes.extend_from_slice(&fragment[..take]);
        self.received += take as u32;
        debug_assert!(self.received <= self.declared_size);
    }

    /// Whether all declared bytes have arrived.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.received == self.declared_size
    }
}

/// Pending state for a chunked `UserlistReply` export/import.
#[derive(Debug, Clone, Default)]
pub struct UserlistAccumulator {
    /// Bytes accumulated so far across `GET_MORE_REPLY`/`PUT_MORE_REPLY` blocks.
    pub bytes: Vec<u8>,
    /// Remaining expected `PUT_*` blocks, set when the send was initiated.
    pub expected_put_blocks: u32,
}

/// A process-addressable handle bound to one TCP connection.
///
/// Mutated only by the engine itself, in response to inbound frames,
/// outbound-request calls, and timer fires (spec §3).
pub struct Session<C: Clock = SystemClock> {
    /// Current phase; gates which inbound packet kinds are accepted.
    pub phase: Phase,
    /// Local account identifier.
    pub uin: u32,
    password: Password,
    /// Hash family selector.
    pub hash_type: HashType,
    /// Negotiated protocol generation.
    pub generation: ProtocolGeneration,
    /// Feature bitmask.
    pub features: u32,
    /// Current reported presence.
    pub status: u32,
    /// Current presence description.
    pub descr: Option<String>,
    /// Declared maximum inbound image size.
    pub image_size: u8,
    /// Body encoding requested by the embedder.
    pub encoding: Encoding,
    /// Whether the password should be zeroed once hashed.
    pub clear_password: bool,
    /// Local IPv4 override (resolved at login time, see [`crate::login`]).
    pub local_ip_override: Ipv4Addr,
    /// Local port to advertise.
    pub local_port: u16,
    /// External IPv4/port hint.
    pub external_ip: Option<Ipv4Addr>,
    /// External port hint.
    pub external_port: u16,
    /// Bypass mode: deliver every frame undecoded as `RawPacket`.
    pub raw_mode: bool,
    /// Chunked contact-list export/import accumulator.
    pub userlist: UserlistAccumulator,
    /// In-flight image reassemblies.
    pub image_queue: Vec<ImageEntry>,
    /// Timestamp of the last successful read.
    pub last_read: Option<C::Instant>,
    /// Timestamp of the last inbound pong.
    pub last_pong: Option<C::Instant>,
    /// Converts a legacy-codepage byte string to the embedder's chosen
    /// encoding. Injected so tests can substitute the identity transform
    /// (spec's encoding conversion is an external collaborator; this
    /// engine only decides *when* to call it).
    pub transcode: fn(&[u8]) -> String,
    /// Strips markup from an XHTML body to derive a plain-text body.
    /// Injected for the same reason as `transcode`.
    pub html_strip: fn(&str) -> String,
    clock: C,
}

/// Default transcoder: treats the bytes as UTF-8, replacing invalid
/// sequences. A real legacy-codepage transcoder is an external
/// collaborator (spec §1); this default keeps the engine usable without
/// one.
#[must_use]
pub fn identity_transcode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Default HTML-strip: removes `<...>` tags and nothing else. A full
/// HTML-to-text transform is an external collaborator (spec §1); this
/// default keeps the engine usable without one.
#[must_use]
pub fn naive_html_strip(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {},
        }
    }
    out
}

impl Session<SystemClock> {
    /// Create a new session from login parameters, using the real clock.
    #[must_use]
    pub fn new(params: LoginParams) -> Self {
        Self::with_clock(params, SystemClock)
    }
}

impl<C: Clock> Session<C> {
    /// Create a new session from login parameters with an explicit clock
    /// (for deterministic tests).
    #[must_use]
    pub fn with_clock(params: LoginParams, clock: C) -> Self {
        Self {
            phase: Phase::Idle,
            uin: params.uin,
            password: Password::new(params.password),
            hash_type: params.hash_type,
            generation: params.generation,
            features: params.features,
            status: params.initial_status,
            descr: params.initial_descr,
            image_size: params.image_size,
            encoding: params.encoding,
            clear_password: params.clear_password,
            local_ip_override: params.local_ip_override,
            local_port: params.local_port,
            external_ip: params.external_ip,
            external_port: params.external_port,
            raw_mode: false,
            userlist: UserlistAccumulator::default(),
            image_queue: Vec::new(),
            last_read: None,
            last_pong: None,
            transcode: identity_transcode,
            html_strip: naive_html_strip,
            clock,
        }
    }

    /// Borrow the password bytes (empty once cleared).
    #[must_use]
    pub fn password_bytes(&self) -> &[u8] {
        self.password.as_bytes()
    }

    /// Zero and release the password buffer, if the session is
    /// configured to do so. Idempotent.
    pub fn maybe_clear_password(&mut self) {
        if self.clear_password && !self.password.is_cleared() {
            self.password.clear();
        }
    }

    /// Whether the password has been cleared.
    #[must_use]
    pub fn password_cleared(&self) -> bool {
        self.password.is_cleared()
    }

    /// Record that a frame was just read successfully.
    pub fn record_read(&mut self) {
        self.last_read = Some(self.clock.now());
    }

    /// Record that a `Pong` was just received.
    pub fn record_pong(&mut self) {
        self.last_pong = Some(self.clock.now());
    }

    /// Look up an in-flight image reassembly by its identifying key.
    pub fn find_image_mut(
        &mut self,
        sender: u32,
        declared_size: u32,
        declared_crc32: u32,
    ) -> Option<&mut ImageEntry> {
        self.image_queue
            .iter_mut()
            .find(|e| e.sender == sender && e.declared_size == declared_size && e.declared_crc32 == declared_crc32)
    }

    /// Remove a completed or abandoned image reassembly by key.
    pub fn remove_image(&mut self, sender: u32, declared_size: u32, declared_crc32: u32) -> Option<ImageEntry> {
        let pos = self
            .image_queue
            .iter()
            .position(|e| e.sender == sender && e.declared_size == declared_size && e.declared_crc32 == declared_crc32)?;
        Some(self.image_queue.remove(pos))
    }
}
