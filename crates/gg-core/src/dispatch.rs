//! Packet handler registry (component D) and the state-machine
//! transitions it drives (component F).
//!
//! The handler table gates *phase* and a *minimum length* floor used to
//! silently drop frames that are stale cross-phase noise (the remote
//! may keep sending packets that became irrelevant after a phase
//! change) rather than genuine protocol violations. A frame whose type
//! and phase match but whose payload is too short for its own decoder
//! to read safely is NOT covered by this floor — that is a decoder-level
//! bounds failure and is fatal (tier 3, spec §7), e.g. a truncated
//! `Welcome`.

use gg_proto::{Frame, PacketType};
use tracing::debug;

use crate::decoders::{message, misc, status};
use crate::error::{FailureKind, SessionError};
use crate::event::Event;
use crate::login::{self, LocalAddressSource};
use crate::session::{Phase, Session};

/// One row of the immutable dispatch table.
struct HandlerRow {
    packet_type: PacketType,
    required_phase: Option<Phase>,
    min_length: usize,
}

const TABLE: &[HandlerRow] = &[
    HandlerRow { packet_type: PacketType::Welcome, required_phase: Some(Phase::ReadingKey), min_length: 0 },
    HandlerRow { packet_type: PacketType::LoginOk, required_phase: Some(Phase::ReadingReply), min_length: 0 },
    HandlerRow { packet_type: PacketType::LoginOk80, required_phase: Some(Phase::ReadingReply), min_length: 0 },
    HandlerRow { packet_type: PacketType::NeedEmail, required_phase: Some(Phase::ReadingReply), min_length: 0 },
    HandlerRow { packet_type: PacketType::LoginFailed, required_phase: Some(Phase::ReadingReply), min_length: 0 },
    HandlerRow { packet_type: PacketType::Disconnecting, required_phase: Some(Phase::ReadingReply), min_length: 0 },
    HandlerRow { packet_type: PacketType::Disconnecting, required_phase: Some(Phase::Connected), min_length: 0 },
    HandlerRow { packet_type: PacketType::DisconnectAck, required_phase: Some(Phase::Disconnecting), min_length: 0 },
    HandlerRow { packet_type: PacketType::RecvMsg, required_phase: Some(Phase::Connected), min_length: 16 },
    HandlerRow { packet_type: PacketType::RecvMsg80, required_phase: Some(Phase::Connected), min_length: 24 },
    HandlerRow { packet_type: PacketType::SendMsgAck, required_phase: Some(Phase::Connected), min_length: 12 },
    HandlerRow { packet_type: PacketType::Pong, required_phase: Some(Phase::Connected), min_length: 0 },
    HandlerRow { packet_type: PacketType::Status, required_phase: Some(Phase::Connected), min_length: 8 },
    HandlerRow { packet_type: PacketType::Status60, required_phase: Some(Phase::Connected), min_length: 19 },
    HandlerRow { packet_type: PacketType::Status77, required_phase: Some(Phase::Connected), min_length: 19 },
    HandlerRow { packet_type: PacketType::NotifyReply, required_phase: Some(Phase::Connected), min_length: 0 },
    HandlerRow { packet_type: PacketType::NotifyReply60, required_phase: Some(Phase::Connected), min_length: 0 },
    HandlerRow { packet_type: PacketType::NotifyReply77, required_phase: Some(Phase::Connected), min_length: 0 },
    HandlerRow { packet_type: PacketType::NotifyReply80, required_phase: Some(Phase::Connected), min_length: 0 },
    HandlerRow { packet_type: PacketType::XmlEvent, required_phase: Some(Phase::Connected), min_length: 0 },
    HandlerRow { packet_type: PacketType::UserlistReply, required_phase: Some(Phase::Connected), min_length: 1 },
    HandlerRow { packet_type: PacketType::Pubdir50Reply, required_phase: Some(Phase::Connected), min_length: 0 },
    HandlerRow { packet_type: PacketType::Dcc7New, required_phase: Some(Phase::Connected), min_length: 0 },
    HandlerRow { packet_type: PacketType::Dcc7Accept, required_phase: Some(Phase::Connected), min_length: 0 },
    HandlerRow { packet_type: PacketType::Dcc7Reject, required_phase: Some(Phase::Connected), min_length: 0 },
    HandlerRow { packet_type: PacketType::Dcc7IdReply, required_phase: Some(Phase::Connected), min_length: 0 },
];

/// Result of handling one inbound frame: the embedder-facing event and,
/// when the state machine decided to talk back (the login handshake),
/// the frame to send.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Event to deliver to the embedder.
    pub event: Event,
    /// Frame the engine wants sent in immediate response, if any.
    pub outbound: Option<Frame>,
}

impl Outcome {
    fn just(event: Event) -> Self {
        Self { event, outbound: None }
    }
}

/// Walk the handler table for one inbound frame and run whatever it
/// matches, applying component F's phase transitions. This is the
/// single entry point the embedder-facing driver calls per decoded
/// frame.
///
/// # Errors
///
/// Returns `Err` only when a fatal condition (spec §7 tier 3) arises
/// while the session is already `Connected` — the session's phase is
/// set to `Idle` either way; in connect/login phases the same
/// conditions surface as `Ok(Outcome { event: Event::ConnFailed, .. })`
/// instead (see [`crate::error`] module docs).
pub fn handle_frame(
    session: &mut Session,
    frame: &Frame,
    local_address_source: &dyn LocalAddressSource,
) -> Result<Outcome, SessionError> {
    session.record_read();

    if session.raw_mode {
        return Ok(Outcome::just(Event::RawPacket { packet_type: frame.packet_type(), bytes: frame.payload().to_vec() }));
    }

    let Some(packet_type) = PacketType::from_u32(frame.packet_type()) else {
        debug!(packet_type = frame.packet_type(), "unknown packet type, ignored");
        return Ok(Outcome::just(Event::None));
    };

    let payload = frame.payload();
    let matched =
        TABLE.iter().find(|row| row.packet_type == packet_type && row.required_phase == Some(session.phase) && payload.len() >= row.min_length);

    let Some(row) = matched else {
        debug!(?packet_type, phase = ?session.phase, "frame discarded: phase or length gate failed");
        return Ok(Outcome::just(Event::None));
    };

    run_row(session, row.packet_type, payload, local_address_source)
}

fn run_row(
    session: &mut Session,
    packet_type: PacketType,
    payload: &[u8],
    local_address_source: &dyn LocalAddressSource,
) -> Result<Outcome, SessionError> {
    match packet_type {
        PacketType::Welcome => match login::decode_welcome(payload) {
            Ok(seed) => {
                let frame = login::build_login_frame(session, seed, local_address_source);
                session.phase = Phase::ReadingReply;
                Ok(Outcome { event: Event::None, outbound: Some(frame) })
            },
            Err(kind) => Ok(fail_in_handshake(session, kind)),
        },
        PacketType::LoginOk | PacketType::LoginOk80 | PacketType::NeedEmail => {
            session.phase = Phase::Connected;
            Ok(Outcome::just(Event::ConnSuccess))
        },
        PacketType::LoginFailed => {
            session.phase = Phase::Idle;
            Ok(Outcome::just(Event::ConnFailed { kind: FailureKind::Password }))
        },
        PacketType::Disconnecting if session.phase == Phase::ReadingReply => {
            // Open question in spec §9: legacy behavior treats this as an
            // intruder lockout; preserved rather than guessed at.
            session.phase = Phase::Idle;
            Ok(Outcome::just(Event::ConnFailed { kind: FailureKind::Intruder }))
        },
        PacketType::Disconnecting => Ok(Outcome::just(misc::decode_disconnecting())),
        PacketType::DisconnectAck => {
            session.phase = Phase::Idle;
            Ok(Outcome::just(misc::decode_disconnect_ack()))
        },
        PacketType::RecvMsg => decode_connected(session, |s| message::decode_recv_msg(s, payload)),
        PacketType::RecvMsg80 => decode_connected(session, |s| message::decode_recv_msg80(s, payload)),
        PacketType::SendMsgAck => decode_connected(session, |_| misc::decode_send_msg_ack(payload)),
        PacketType::Pong => Ok(Outcome::just(misc::decode_pong(session))),
        PacketType::Status => decode_connected(session, |_| status::decode_status(payload)),
        PacketType::Status60 | PacketType::Status77 => decode_connected(session, |_| status::decode_status60(payload)),
        PacketType::NotifyReply => decode_connected(session, |_| status::decode_notify(payload)),
        PacketType::NotifyReply60 | PacketType::NotifyReply77 => decode_connected(session, |_| status::decode_notify60(payload)),
        PacketType::NotifyReply80 => decode_connected(session, |s| status::decode_notify80(s, payload)),
        PacketType::XmlEvent => Ok(Outcome::just(misc::decode_xml_event(payload))),
        PacketType::UserlistReply => decode_connected(session, |s| misc::decode_userlist_reply(s, payload)),
        PacketType::Pubdir50Reply | PacketType::Dcc7New | PacketType::Dcc7Accept | PacketType::Dcc7Reject | PacketType::Dcc7IdReply => {
            Ok(Outcome::just(misc::decode_raw_passthrough(packet_type.to_u32(), payload)))
        },
        PacketType::Login70 | PacketType::Login80 => Ok(Outcome::just(Event::None)),
    }
}

/// Run a decoder whose error should be handled per spec §7 tier 3: a
/// `ConnFailed` while still in a connect/login phase, or a propagated
/// `SessionError` once `Connected`. Either way the phase resets to
/// `Idle` and the socket is considered closed by the caller.
fn decode_connected(session: &mut Session, decode: impl FnOnce(&mut Session) -> Result<Event, FailureKind>) -> Result<Outcome, SessionError> {
    match decode(session) {
        Ok(event) => Ok(Outcome::just(event)),
        Err(kind) => Err(fatal(session, kind)),
    }
}

fn fail_in_handshake(session: &mut Session, kind: FailureKind) -> Outcome {
    session.phase = Phase::Idle;
    Outcome::just(Event::ConnFailed { kind })
}

fn fatal(session: &mut Session, kind: FailureKind) -> SessionError {
    session.phase = Phase::Idle;
    SessionError::new(kind)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use gg_crypto::HashType;

    use super::*;
    use crate::session::{Encoding, LoginParams, ProtocolGeneration, ResolverKind};

    struct NoAddress;
    impl LocalAddressSource for NoAddress {
        fn local_address(&self) -> Option<std::net::Ipv4Addr> {
            None
        }
    }

    fn session_in(phase: Phase) -> Session {
        let mut s = Session::new(LoginParams {
            uin: 123,
            password: b"abc".to_vec(),
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
        });
        s.phase = phase;
        s
    }

    #[test]
    fn welcome_in_reading_key_sends_login_and_advances_to_reading_reply() {
        let mut s = session_in(Phase::ReadingKey);
        let frame = Frame::new(PacketType::Welcome.to_u32(), Bytes::copy_from_slice(&0x1234_5678u32.to_le_bytes()));
        let outcome = handle_frame(&mut s, &frame, &NoAddress).unwrap();
        assert_eq!(s.phase, Phase::ReadingReply);
        assert!(outcome.outbound.is_some());
    }

    #[test]
    fn login_ok_in_reading_reply_connects() {
        let mut s = session_in(Phase::ReadingReply);
        let frame = Frame::new(PacketType::LoginOk.to_u32(), Bytes::new());
        let outcome = handle_frame(&mut s, &frame, &NoAddress).unwrap();
        assert_eq!(s.phase, Phase::Connected);
        assert_eq!(outcome.event, Event::ConnSuccess);
    }

    #[test]
    fn login_failed_in_reading_reply_returns_to_idle() {
        let mut s = session_in(Phase::ReadingReply);
        let frame = Frame::new(PacketType::LoginFailed.to_u32(), Bytes::new());
        let outcome = handle_frame(&mut s, &frame, &NoAddress).unwrap();
        assert_eq!(s.phase, Phase::Idle);
        assert_eq!(outcome.event, Event::ConnFailed { kind: FailureKind::Password });
    }

    #[test]
    fn disconnecting_during_reading_reply_is_intruder_lockout() {
        let mut s = session_in(Phase::ReadingReply);
        let frame = Frame::new(PacketType::Disconnecting.to_u32(), Bytes::new());
        let outcome = handle_frame(&mut s, &frame, &NoAddress).unwrap();
        assert_eq!(s.phase, Phase::Idle);
        assert_eq!(outcome.event, Event::ConnFailed { kind: FailureKind::Intruder });
    }

    #[test]
    fn disconnecting_while_connected_is_a_warning_not_a_transition() {
        let mut s = session_in(Phase::Connected);
        let frame = Frame::new(PacketType::Disconnecting.to_u32(), Bytes::new());
        let outcome = handle_frame(&mut s, &frame, &NoAddress).unwrap();
        assert_eq!(s.phase, Phase::Connected);
        assert_eq!(outcome.event, Event::Disconnect);
    }

    #[test]
    fn frame_for_wrong_phase_is_silently_discarded() {
        let mut s = session_in(Phase::Idle);
        let frame = Frame::new(PacketType::LoginOk.to_u32(), Bytes::new());
        let outcome = handle_frame(&mut s, &frame, &NoAddress).unwrap();
        assert_eq!(outcome.event, Event::None);
        assert_eq!(s.phase, Phase::Idle);
    }

    #[test]
    fn fatal_decode_while_connected_propagates_error_and_resets_phase() {
        let mut s = session_in(Phase::Connected);
        let mut payload = vec![0u8; 16];
        payload[4..8].copy_from_slice(&1u32.to_le_bytes()); // seq = 1, avoids the bait-probe discard
        let frame = Frame::new(PacketType::RecvMsg.to_u32(), Bytes::from(payload));
        let result = handle_frame(&mut s, &frame, &NoAddress);
        // A 16-byte RecvMsg with no NUL terminator after the header is a
        // decoder-level bounds failure (MissingTerminator), fatal per §7.
        assert!(result.is_err());
        assert_eq!(s.phase, Phase::Idle);
    }
}
