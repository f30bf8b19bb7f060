//! Packet type codes carried in the frame header.
//!
//! Values marked in the doc comment as "wire-exact" are fixed by the
//! protocol and must not change. The remaining kinds (status/notify
//! families, userlist, xml, pubdir, dcc7) are internal assignments for
//! this engine; the wire only requires them to be distinct, stable
//! within a running process, and gated correctly by phase.

/// One frame's packet type.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    /// Server's opening packet carrying the login challenge. Wire-exact.
    Welcome = 0x01,
    /// Legacy status broadcast, client or server direction.
    Status = 0x02,
    /// Login accepted, legacy/modern generations share this code. Wire-exact.
    LoginOk = 0x03,
    /// Contact add/remove acknowledgement carrying per-contact records.
    NotifyReply = 0x0c,
    /// Acknowledges a previously sent directed message. Wire-exact.
    SendMsgAck = 0x05,
    /// Keepalive response. Wire-exact.
    Pong = 0x07,
    /// Login rejected (bad password). Wire-exact.
    LoginFailed = 0x09,
    /// Directed message, legacy wire shape. Wire-exact.
    RecvMsg = 0x0a,
    /// Presence list reply/import/export blocks.
    UserlistReply = 0x11,
    /// Server requires the account's e-mail to be confirmed. Wire-exact.
    NeedEmail = 0x14,
    /// Legacy (7.x) login request. Wire-exact.
    Login70 = 0x15,
    /// Server-initiated teardown notice. Wire-exact.
    Disconnecting = 0x1b,
    /// Acknowledges a client-initiated teardown.
    DisconnectAck = 0x1c,
    /// Status broadcast with capability bits folded into `uin` (60-series).
    Status60 = 0x2c,
    /// Contact-list status reply, 60-series capability folding.
    NotifyReply60 = 0x2d,
    /// Directed message, modern (8.0) wire shape with XHTML support. Wire-exact.
    RecvMsg80 = 0x2e,
    /// Free-form XML server event (typing notification, etc.).
    XmlEvent = 0x30,
    /// Modern (8.0) login request. Wire-exact.
    Login80 = 0x31,
    /// Public-directory search reply, delegated to an external subsystem.
    Pubdir50Reply = 0x32,
    /// Login accepted, modern (8.0) generation. Wire-exact.
    LoginOk80 = 0x35,
    /// Status broadcast, 77-series capability folding (adds `omnix`).
    Status77 = 0x3a,
    /// Contact-list status reply, 77-series capability folding.
    NotifyReply77 = 0x3b,
    /// Contact-list status reply, modern (8.0) wire shape (UTF-8 descriptions).
    NotifyReply80 = 0x3c,
    /// Direct file-transfer: peer announces a new transfer.
    Dcc7New = 0x50,
    /// Direct file-transfer: peer accepts a transfer.
    Dcc7Accept = 0x51,
    /// Direct file-transfer: peer rejects a transfer.
    Dcc7Reject = 0x52,
    /// Direct file-transfer: relay identifier reply.
    Dcc7IdReply = 0x53,
}

impl PacketType {
    /// Map a raw wire value to a known packet type, if recognized.
    #[must_use]
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0x01 => Self::Welcome,
            0x02 => Self::Status,
            0x03 => Self::LoginOk,
            0x05 => Self::SendMsgAck,
            0x07 => Self::Pong,
            0x09 => Self::LoginFailed,
            0x0a => Self::RecvMsg,
            0x0c => Self::NotifyReply,
            0x11 => Self::UserlistReply,
            0x14 => Self::NeedEmail,
            0x15 => Self::Login70,
            0x1b => Self::Disconnecting,
            0x1c => Self::DisconnectAck,
            0x2c => Self::Status60,
            0x2d => Self::NotifyReply60,
            0x2e => Self::RecvMsg80,
            0x30 => Self::XmlEvent,
            0x31 => Self::Login80,
            0x32 => Self::Pubdir50Reply,
            0x35 => Self::LoginOk80,
            0x3a => Self::Status77,
            0x3b => Self::NotifyReply77,
            0x3c => Self::NotifyReply80,
            0x50 => Self::Dcc7New,
            0x51 => Self::Dcc7Accept,
            0x52 => Self::Dcc7Reject,
            0x53 => Self::Dcc7IdReply,
            _ => return None,
        })
    }

    /// Raw wire value for this packet type.
    #[must_use]
    pub fn to_u32(self) -> u32 {
        self as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        let all = [
            PacketType::Welcome,
            PacketType::Status,
            PacketType::LoginOk,
            PacketType::NotifyReply,
            PacketType::SendMsgAck,
            PacketType::Pong,
            PacketType::LoginFailed,
            PacketType::RecvMsg,
            PacketType::UserlistReply,
            PacketType::NeedEmail,
            PacketType::Login70,
            PacketType::Disconnecting,
            PacketType::DisconnectAck,
            PacketType::Status60,
            PacketType::NotifyReply60,
            PacketType::RecvMsg80,
            PacketType::XmlEvent,
            PacketType::Login80,
            PacketType::Pubdir50Reply,
            PacketType::LoginOk80,
            PacketType::Status77,
            PacketType::NotifyReply77,
            PacketType::NotifyReply80,
            PacketType::Dcc7New,
            PacketType::Dcc7Accept,
            PacketType::Dcc7Reject,
            PacketType::Dcc7IdReply,
        ];
        for kind in all {
            assert_eq!(PacketType::from_u32(kind.to_u32()), Some(kind));
        }
    }

    #[test]
    fn wire_exact_values_match_spec() {
        assert_eq!(PacketType::Welcome.to_u32(), 0x01);
        assert_eq!(PacketType::LoginOk.to_u32(), 0x03);
        assert_eq!(PacketType::SendMsgAck.to_u32(), 0x05);
        assert_eq!(PacketType::Pong.to_u32(), 0x07);
        assert_eq!(PacketType::LoginFailed.to_u32(), 0x09);
        assert_eq!(PacketType::RecvMsg.to_u32(), 0x0a);
        assert_eq!(PacketType::NeedEmail.to_u32(), 0x14);
        assert_eq!(PacketType::Login70.to_u32(), 0x15);
        assert_eq!(PacketType::Disconnecting.to_u32(), 0x1b);
        assert_eq!(PacketType::RecvMsg80.to_u32(), 0x2e);
        assert_eq!(PacketType::Login80.to_u32(), 0x31);
        assert_eq!(PacketType::LoginOk80.to_u32(), 0x35);
    }

    #[test]
    fn unknown_value_is_none() {
        assert_eq!(PacketType::from_u32(0xdead_beef), None);
    }
}
