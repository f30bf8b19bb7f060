//! End-to-end scenario tests, one per named scenario in the protocol's
//! testable-properties section.

use bytes::Bytes;
use gg_core::{Encoding, Event, FailureKind, LoginParams, Phase, ProtocolGeneration, ResolverKind, Session, handle_frame};
use gg_crypto::{HashType, gg32_hash};
use gg_proto::{Frame, PacketType};

struct NoAddress;
impl gg_core::LocalAddressSource for NoAddress {
    fn local_address(&self) -> Option<std::net::Ipv4Addr> {
        None
    }
}

fn login_session() -> Session {
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
    s.phase = Phase::ReadingKey;
    s
}

#[test]
fn scenario_1_login_gg32() {
    let mut session = login_session();
    let welcome = Frame::new(PacketType::Welcome.to_u32(), Bytes::copy_from_slice(&0x1234_5678u32.to_le_bytes()));

    let outcome = handle_frame(&mut session, &welcome, &NoAddress).unwrap();

    let login_frame = outcome.outbound.expect("engine responds to welcome with a login frame");
    assert_eq!(login_frame.packet_type(), PacketType::Login70.to_u32());

    let payload = login_frame.payload();
    assert_eq!(&payload[0..4], &[0x7b, 0x00, 0x00, 0x00]);
    let expected = gg32_hash(b"abc", 0x1234_5678).to_le_bytes();
    assert_eq!(&payload[5..9], &expected);

    assert_eq!(session.phase, Phase::ReadingReply);
}

#[test]
fn scenario_2_login_success() {
    let mut session = login_session();
    session.phase = Phase::ReadingReply;

    let ok = Frame::new(PacketType::LoginOk.to_u32(), Bytes::new());
    let outcome = handle_frame(&mut session, &ok, &NoAddress).unwrap();

    assert_eq!(outcome.event, Event::ConnSuccess);
    assert_eq!(session.status, 2);
}

#[test]
fn scenario_3_login_failed() {
    let mut session = login_session();
    session.phase = Phase::ReadingReply;

    let failed = Frame::new(PacketType::LoginFailed.to_u32(), Bytes::new());
    let outcome = handle_frame(&mut session, &failed, &NoAddress).unwrap();

    assert_eq!(outcome.event, Event::ConnFailed { kind: FailureKind::Password });
    assert_eq!(session.phase, Phase::Idle);
}

fn connected_session() -> Session {
    let mut s = login_session();
    s.phase = Phase::Connected;
    s
}

fn recv_msg_bytes(sender: u32, seq: u32, time: u32, class: u32, body: &[u8], options: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&sender.to_le_bytes());
    out.extend_from_slice(&seq.to_le_bytes());
    out.extend_from_slice(&time.to_le_bytes());
    out.extend_from_slice(&class.to_le_bytes());
    out.extend_from_slice(body);
    out.push(0);
    out.extend_from_slice(options);
    out
}

#[test]
fn scenario_4_recv_msg_with_conference() {
    let mut session = connected_session();
    let mut options = vec![0x01u8];
    options.extend_from_slice(&2u32.to_le_bytes());
    options.extend_from_slice(&20u32.to_le_bytes());
    options.extend_from_slice(&30u32.to_le_bytes());
    let payload = recv_msg_bytes(10, 1, 1_700_000_000, 4, b"hi", &options);

    let frame = Frame::new(PacketType::RecvMsg.to_u32(), Bytes::from(payload));
    let outcome = handle_frame(&mut session, &frame, &NoAddress).unwrap();

    assert_eq!(
        outcome.event,
        Event::Msg {
            sender: 10,
            class: 4,
            time: 1_700_000_000,
            seq: 1,
            body: "hi".to_string(),
            xhtml: None,
            recipients: Some(vec![20, 30]),
            formats: None,
        }
    );
}

#[test]
fn scenario_5_recv_msg_truncated_option_count_is_silently_discarded() {
    let mut session = connected_session();
    let mut options = vec![0x01u8];
    options.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
    let payload = recv_msg_bytes(10, 1, 1, 4, b"hi", &options);

    let frame = Frame::new(PacketType::RecvMsg.to_u32(), Bytes::from(payload));
    let outcome = handle_frame(&mut session, &frame, &NoAddress).unwrap();

    assert_eq!(outcome.event, Event::None);
    assert_eq!(session.phase, Phase::Connected);
}

fn image_fragment(size: u32, crc32: u32, filename: Option<&str>, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&crc32.to_le_bytes());
    if let Some(name) = filename {
        out.extend_from_slice(name.as_bytes());
        out.push(0);
    }
    out.extend_from_slice(data);
    out
}

#[test]
fn scenario_6_image_reassembly_across_three_frames() {
    let mut session = connected_session();
    const SIZE: u32 = 1024;
    const CRC: u32 = 0xDEAD_BEEF;

    let mut options = vec![0x05u8]; // image reply, first fragment
    options.extend_from_slice(&image_fragment(SIZE, CRC, Some("pic.png"), &vec![0xAA; 500]));
    let f1 = recv_msg_bytes(7, 1, 1, 4, b"", &options);
    let outcome1 = handle_frame(&mut session, &Frame::new(PacketType::RecvMsg.to_u32(), Bytes::from(f1)), &NoAddress).unwrap();
    assert_eq!(outcome1.event, Event::None);

    let mut options = vec![0x06u8]; // continuation
    options.extend_from_slice(&image_fragment(SIZE, CRC, None, &vec![0xBB; 500]));
    let f2 = recv_msg_bytes(7, 2, 1, 4, b"", &options);
    let outcome2 = handle_frame(&mut session, &Frame::new(PacketType::RecvMsg.to_u32(), Bytes::from(f2)), &NoAddress).unwrap();
    assert_eq!(outcome2.event, Event::None);

    let mut tail = vec![0xCCu8; 24];
    tail.extend_from_slice(&[0u8; 10]); // trailing 10 bytes must be truncated
    let mut options = vec![0x06u8];
    options.extend_from_slice(&image_fragment(SIZE, CRC, None, &tail));
    let f3 = recv_msg_bytes(7, 3, 1, 4, b"", &options);
    let outcome3 = handle_frame(&mut session, &Frame::new(PacketType::RecvMsg.to_u32(), Bytes::from(f3)), &NoAddress).unwrap();

    match outcome3.event {
        Event::ImageReply { size, crc32, filename, bytes, .. } => {
            assert_eq!(size, SIZE);
            assert_eq!(crc32, CRC);
            assert_eq!(filename, "pic.png");
            assert_eq!(bytes.len(), 1024);
        },
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(session.image_queue.is_empty());
}

#[test]
fn password_is_zeroed_after_login_when_clear_flag_is_set() {
    let mut session = Session::new(LoginParams {
        uin: 1,
        password: b"secret".to_vec(),
        hash_type: HashType::Gg32,
        generation: ProtocolGeneration::Legacy7,
        resolver_kind: ResolverKind::Default,
        initial_status: 2,
        initial_descr: None,
        features: 0,
        image_size: 0,
        encoding: Encoding::Cp1250,
        clear_password: true,
        local_ip_override: std::net::Ipv4Addr::UNSPECIFIED,
        local_port: 0,
        external_ip: None,
        external_port: 0,
    });
    session.phase = Phase::ReadingKey;

    let welcome = Frame::new(PacketType::Welcome.to_u32(), Bytes::copy_from_slice(&1u32.to_le_bytes()));
    handle_frame(&mut session, &welcome, &NoAddress).unwrap();

    assert!(session.password_cleared());
    assert!(session.password_bytes().is_empty());
}
