//! Fuzz target for the full read-buffer-to-event pipeline: arbitrary
//! chunked byte reads through `RecvBuffer::try_take_frame`, each whole
//! frame then run through `handle_frame`.
//!
//! Exercises component C (receive buffer chunking/ceiling) and
//! component D/E (dispatch/decode) together, the way bytes actually
//! arrive off a socket in the non-blocking read loop (spec §5).

#![no_main]

use arbitrary::Arbitrary;
use gg_core::{Encoding, LoginParams, Phase, ProtocolGeneration, RecvBuffer, ResolverKind, Session};
use gg_crypto::HashType;
use libfuzzer_sys::fuzz_target;

struct NoAddress;
impl gg_core::LocalAddressSource for NoAddress {
    fn local_address(&self) -> Option<std::net::Ipv4Addr> {
        None
    }
}

const PHASES: &[Phase] = &[Phase::ReadingKey, Phase::ReadingReply, Phase::Connected];

#[derive(Debug, Arbitrary)]
struct Input {
    phase_index: u8,
    chunks: Vec<Vec<u8>>,
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

    let mut recv = RecvBuffer::new();
    // Cap total fed bytes so one fuzz case can't spend unbounded time
    // replaying a pathologically long chunk list.
    for chunk in input.chunks.iter().take(64) {
        recv.feed(&chunk[..chunk.len().min(4096)]);

        loop {
            match recv.try_take_frame() {
                Ok(Some(frame)) => {
                    if gg_core::handle_frame(&mut session, &frame, &NoAddress).is_err() {
                        // Fatal: spec §7 says the embedder closes and
                        // reopens. Nothing left to feed this session.
                        return;
                    }
                },
                Ok(None) => break,
                Err(_) => return,
            }
        }
    }
});
