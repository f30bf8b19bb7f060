//! The event surface (component I): a tagged union delivered to the
//! embedder, one decoded value per accepted frame.

use crate::error::FailureKind;

/// One contact's record inside a `NotifyReply` family packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyEntry {
    /// Contact's account id, with capability bits masked out.
    pub uin: u32,
    /// Reported presence.
    pub status: u32,
    /// Optional description.
    pub descr: Option<String>,
    /// Advertised IP, for 60/77-series entries.
    pub ip: Option<std::net::Ipv4Addr>,
    /// Advertised port, for 60/77-series entries.
    pub port: Option<u16>,
    /// Protocol version, with capability bits folded in.
    pub version: Option<u32>,
    /// Maximum image size the contact accepts.
    pub image_size: Option<u8>,
    /// Description timestamp, when present.
    pub time: Option<u32>,
}

/// Which userlist operation a `Userlist` event reports the final reply
/// for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserlistSubtype {
    /// Export request's final reply.
    GetReply,
    /// Import (upload) request's final reply.
    PutReply,
}

/// A tagged value consumed by the embedder.
///
/// `None` means "no event from this frame" (silent discard); it is
/// never a partially populated variant (invariant 3, spec §3).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// No event (silent discard, or a decode failure during a
    /// connect/login phase already reflected in `ConnFailed`).
    None,
    /// Login succeeded.
    ConnSuccess,
    /// Login or connection failed.
    ConnFailed {
        /// Why the connection failed.
        kind: FailureKind,
    },
    /// Server sent a disconnect warning while connected.
    Disconnect,
    /// Server acknowledged a client-initiated disconnect.
    DisconnectAck,
    /// A directed message.
    Msg {
        /// Sender's account id.
        sender: u32,
        /// Message class bitmask.
        class: u32,
        /// Server timestamp.
        time: u32,
        /// Sequence number.
        seq: u32,
        /// Plain-text body.
        body: String,
        /// XHTML body, modern wire shape only.
        xhtml: Option<String>,
        /// Conference recipients, if the options tail carried any.
        recipients: Option<Vec<u32>>,
        /// Opaque rich-text format descriptors, if present.
        formats: Option<Vec<u8>>,
    },
    /// Acknowledgement of a previously sent message.
    Ack {
        /// Sequence number being acknowledged.
        seq: u32,
        /// Recipient the ack concerns.
        recipient: u32,
        /// Delivery status code.
        status: u32,
    },
    /// Legacy presence broadcast.
    Status {
        /// Account id.
        uin: u32,
        /// Presence code.
        status: u32,
        /// Optional description.
        descr: Option<String>,
    },
    /// 60/77-series presence broadcast with capability folding.
    Status60 {
        /// Account id, capability bits masked out.
        uin: u32,
        /// Presence code.
        status: u32,
        /// Optional description.
        descr: Option<String>,
        /// Advertised IP.
        ip: std::net::Ipv4Addr,
        /// Advertised port.
        port: u16,
        /// Protocol version, with capability bits folded in.
        version: u32,
        /// Maximum image size.
        image_size: u8,
        /// Description timestamp, if the tail carried one.
        time: Option<u32>,
    },
    /// Legacy contact-list status reply.
    Notify(Vec<NotifyEntry>),
    /// 60/77-series contact-list status reply.
    Notify60(Vec<NotifyEntry>),
    /// A lone description update for one contact.
    NotifyDescr {
        /// Contact's account id.
        entry: u32,
        /// New description.
        descr: String,
    },
    /// Peer requests to send us an image.
    ImageRequest {
        /// Sender's account id.
        sender: u32,
        /// Declared size.
        size: u32,
        /// Declared CRC32.
        crc32: u32,
    },
    /// A complete (possibly empty) image reply.
    ImageReply {
        /// Sender's account id.
        sender: u32,
        /// Declared size.
        size: u32,
        /// Declared CRC32.
        crc32: u32,
        /// Filename carried by the first fragment.
        filename: String,
        /// Reassembled bytes (empty means "peer doesn't have it").
        bytes: Vec<u8>,
    },
    /// Final reply to a userlist export/import.
    Userlist {
        /// Which operation this concludes.
        subtype: UserlistSubtype,
        /// Accumulated reply bytes.
        reply: Vec<u8>,
    },
    /// Free-form XML server event.
    XmlEvent {
        /// Raw XML payload.
        data: String,
    },
    /// Keepalive response.
    Pong,
    /// Undecoded frame, delivered verbatim (raw passthrough mode).
    RawPacket {
        /// Raw wire packet type.
        packet_type: u32,
        /// Raw payload bytes.
        bytes: Vec<u8>,
    },
}
