//! Fuzz target for the packet-handler dispatch table across every
//! known packet type and phase, with arbitrary payload bytes.
//!
//! Every decoder reachable from `gg_core::handle_frame` must honor
//! invariant 1 (never read past the frame's own length) regardless of
//! phase or payload contents; a fatal decode is a valid outcome, a
//! panic is not.

#![no_main]

use arbitrary::Arbitrary;
use bytes::Bytes;
use gg_core::{Encoding, LoginParams, Phase, ProtocolGeneration, ResolverKind, Session};
use gg_crypto::HashType;
use gg_proto::Frame;
use libfuzzer_sys::fuzz_target;

struct NoAddress;
impl gg_core::LocalAddressSource for NoAddress {
    fn local_address(&self) -> Option<std::net::Ipv4Addr> {
        None
    }
}

const PHASES: &[Phase] = &[
    Phase::Idle,
    Phase::ResolvingHub,
    Phase::ConnectingHub,
    Phase::ReadingHub,
    Phase::ResolvingServer,
    Phase::ConnectingServer,
    Phase::ReadingKey,
    Phase::WritingLogin,
    Phase::ReadingReply,
    Phase::Connected,
    Phase::Disconnecting,
    Phase::TlsHandshake,
];

#[derive(Debug, Arbitrary)]
struct Input {
    packet_type: u32,
    phase_index: u8,
    raw_mode: bool,
    payload: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let mut session = Session::new(LoginParams {
        uin: 1,
        password: b"password".to_vec(),
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
    session.phase = PHASES[input.phase_index as usize % PHASES.len()];
    session.raw_mode = input.raw_mode;

    let frame = Frame::new(input.packet_type, Bytes::from(input.payload));
    let _ = gg_core::handle_frame(&mut session, &frame, &NoAddress);
});
