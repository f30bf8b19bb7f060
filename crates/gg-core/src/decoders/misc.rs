//! Small single-shot decoders: acks, keepalive, teardown, XML events,
//! chunked userlist replies, and the stubbed auxiliary-subsystem packets
//! (component E).

use gg_proto::read_u32;

use crate::error::FailureKind;
use crate::event::{Event, UserlistSubtype};
use crate::session::Session;

/// Decode `SendMsgAck (0x05)`: `{status:u32 recipient:u32 seq:u32}`.
pub fn decode_send_msg_ack(bytes: &[u8]) -> Result<Event, FailureKind> {
    let status = read_u32(bytes, 0).map_err(|_| FailureKind::Invalid)?;
    let recipient = read_u32(bytes, 4).map_err(|_| FailureKind::Invalid)?;
    let seq = read_u32(bytes, 8).map_err(|_| FailureKind::Invalid)?;
    Ok(Event::Ack { seq, recipient, status })
}

/// Handle `Pong (0x07)`: record the keepalive and emit `Pong`.
pub fn decode_pong(session: &mut Session) -> Event {
    session.record_pong();
    Event::Pong
}

/// Handle `Disconnecting (0x1b)` while already `Connected`: a server
/// warning, not a state change.
pub fn decode_disconnecting() -> Event {
    Event::Disconnect
}

/// Handle `DisconnectAck (0x1c)`: the session's own teardown request was
/// acknowledged. Phase transition back to `Idle` is the caller's job
/// (component F); this only produces the event.
pub fn decode_disconnect_ack() -> Event {
    Event::DisconnectAck
}

/// Decode `XmlEvent (0x30)`: the payload, copied, as a UTF-8 string
/// (lossy — the wire format does not guarantee validity).
pub fn decode_xml_event(bytes: &[u8]) -> Event {
    Event::XmlEvent { data: String::from_utf8_lossy(bytes).into_owned() }
}

const USERLIST_GET_REPLY: u8 = 0x00;
const USERLIST_GET_MORE_REPLY: u8 = 0x02;
const USERLIST_PUT_REPLY: u8 = 0x03;
const USERLIST_PUT_MORE_REPLY: u8 = 0x04;

/// Decode a `UserlistReply` block: first byte is the subtype, the rest
/// is appended to the session's accumulator. `PUT_*` blocks count down
/// against `expected_put_blocks`; only the last one emits. `GET_MORE`
/// suppresses the event while still accumulating; `GET_REPLY` (final)
/// transfers ownership of the accumulator and resets it.
pub fn decode_userlist_reply(session: &mut Session, bytes: &[u8]) -> Result<Event, FailureKind> {
    let Some((&subtype, tail)) = bytes.split_first() else {
        return Err(FailureKind::Invalid);
    };

    if !tail.is_empty() {
        session.userlist.bytes.extend_from_slice(tail);
    }

    let mut effective_subtype = subtype;
    if subtype == USERLIST_PUT_REPLY || subtype == USERLIST_PUT_MORE_REPLY {
        session.userlist.expected_put_blocks = session.userlist.expected_put_blocks.saturating_sub(1);
        if session.userlist.expected_put_blocks > 0 {
            return Ok(Event::None);
        }
        effective_subtype = USERLIST_PUT_REPLY;
    }

    if effective_subtype == USERLIST_GET_MORE_REPLY {
        return Ok(Event::None);
    }

    let subtype = if effective_subtype == USERLIST_GET_REPLY { UserlistSubtype::GetReply } else { UserlistSubtype::PutReply };
    let reply = std::mem::take(&mut session.userlist.bytes);
    Ok(Event::Userlist { subtype, reply })
}

/// Stub decoder for `Pubdir50Reply` and the `DCC7` family: these
/// auxiliary subsystems live outside the core (spec §4.4); the core's
/// contract is only to hand the undecoded bytes up so an embedder-side
/// extension can interpret them.
pub fn decode_raw_passthrough(packet_type: u32, bytes: &[u8]) -> Event {
    Event::RawPacket { packet_type, bytes: bytes.to_vec() }
}

#[cfg(test)]
mod tests {
    use gg_crypto::HashType;

    use super::*;
    use crate::session::{Encoding, LoginParams, ProtocolGeneration, ResolverKind};

    fn session() -> Session {
        Session::new(LoginParams {
            uin: 1,
            password: Vec::new(),
            hash_type: HashType::Gg32,
            generation: ProtocolGeneration::Legacy7,
            resolver_kind: ResolverKind::Default,
            initial_status: 2,
            initial_descr: None,
            features: 0,
            image_size: 0,
            encoding: Encoding::Cp1250,
            clear_password: false,
            local_ip_override: std::net::Ipv4Addr::UNSPECIFIED,
            local_port: 0,
            external_ip: None,
            external_port: 0,
        })
    }

    #[test]
    fn send_msg_ack_decodes_fields() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&20u32.to_le_bytes());
        bytes.extend_from_slice(&7u32.to_le_bytes());
        assert_eq!(decode_send_msg_ack(&bytes).unwrap(), Event::Ack { seq: 7, recipient: 20, status: 1 });
    }

    #[test]
    fn pong_records_timestamp() {
        let mut s = session();
        assert!(s.last_pong.is_none());
        assert_eq!(decode_pong(&mut s), Event::Pong);
        assert!(s.last_pong.is_some());
    }

    #[test]
    fn userlist_get_more_reply_suppresses_event_and_accumulates() {
        let mut s = session();
        let bytes = [USERLIST_GET_MORE_REPLY, b'a', b'b'];
        assert_eq!(decode_userlist_reply(&mut s, &bytes).unwrap(), Event::None);
        assert_eq!(s.userlist.bytes, b"ab");
    }

    #[test]
    fn userlist_get_reply_final_transfers_ownership() {
        let mut s = session();
        decode_userlist_reply(&mut s, &[USERLIST_GET_MORE_REPLY, b'a']).unwrap();
        let event = decode_userlist_reply(&mut s, &[USERLIST_GET_REPLY, b'b']).unwrap();
        assert_eq!(event, Event::Userlist { subtype: UserlistSubtype::GetReply, reply: b"ab".to_vec() });
        assert!(s.userlist.bytes.is_empty());
    }

    #[test]
    fn userlist_put_reply_waits_for_all_blocks() {
        let mut s = session();
        s.userlist.expected_put_blocks = 2;
        assert_eq!(decode_userlist_reply(&mut s, &[USERLIST_PUT_MORE_REPLY, b'x']).unwrap(), Event::None);
        let event = decode_userlist_reply(&mut s, &[USERLIST_PUT_REPLY, b'y']).unwrap();
        assert_eq!(event, Event::Userlist { subtype: UserlistSubtype::PutReply, reply: b"xy".to_vec() });
    }
}
