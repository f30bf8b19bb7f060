//! Login handshake (component G): challenge/response hashing and the
//! two login-packet wire shapes.

use std::net::Ipv4Addr;

use gg_crypto::{HashType, compute_hash_buf};
use gg_proto::Frame;

use crate::error::FailureKind;
use crate::session::{ProtocolGeneration, Session};

const HASH_TYPE_GG32: u8 = 0x01;
const HASH_TYPE_SHA1: u8 = 0x02;
const LOGIN70_FLAGS: u32 = 0x0000_0000;
const LOGIN70_DUNNO2: u8 = 0xbe;
const LOGIN80_FLAGS: u32 = 0x0080_0001;
const LOGIN80_DUNNO2: u8 = 0x64;
const LOGIN80_LANGUAGE: [u8; 2] = *b"pl";
const CLIENT_VERSION: &str = "Gadu-Gadu Client";

/// Supplies the local IPv4 to advertise when the session's configured
/// override is `255.255.255.255` — a Sans-IO seam standing in for the
/// original's `getsockname` call. Returns `None` on failure, which the
/// caller turns into `0.0.0.0` (spec §4.3).
pub trait LocalAddressSource {
    /// Query the connected socket's local address.
    fn local_address(&self) -> Option<Ipv4Addr>;
}

/// Resolve which local IPv4 to advertise, per the override rule in
/// spec §4.3.
fn resolve_local_ip(configured: Ipv4Addr, source: &dyn LocalAddressSource) -> Ipv4Addr {
    if configured == Ipv4Addr::new(255, 255, 255, 255) {
        source.local_address().unwrap_or(Ipv4Addr::UNSPECIFIED)
    } else {
        configured
    }
}

fn hash_type_byte(hash_type: HashType) -> u8 {
    match hash_type {
        HashType::Gg32 => HASH_TYPE_GG32,
        HashType::Sha1 => HASH_TYPE_SHA1,
    }
}

/// Build the login frame (`Login70` or `Login80` depending on the
/// session's negotiated generation) in response to the welcome
/// challenge `seed`. Does not send it — the caller is responsible for
/// handing the encoded bytes to the transport and advancing phase on
/// success (component F).
#[must_use]
pub fn build_login_frame(session: &mut Session, seed: u32, local_address_source: &dyn LocalAddressSource) -> Frame {
    let hash = compute_hash_buf(session.hash_type, session.password_bytes(), seed);
    session.maybe_clear_password();

    match session.generation {
        ProtocolGeneration::Legacy7 => build_login70(session, hash, local_address_source),
        ProtocolGeneration::Modern8 => build_login80(session, hash),
    }
}

fn build_login70(session: &Session, hash: [u8; 64], local_address_source: &dyn LocalAddressSource) -> Frame {
    let local_ip = resolve_local_ip(session.local_ip_override, local_address_source);
    let external_ip = session.external_ip.unwrap_or(Ipv4Addr::UNSPECIFIED);

    let mut payload = Vec::new();
    payload.extend_from_slice(&session.uin.to_le_bytes());
    payload.push(hash_type_byte(session.hash_type));
    payload.extend_from_slice(&hash);
    payload.extend_from_slice(&session.status.to_le_bytes());
    payload.extend_from_slice(&(session.features | LOGIN70_FLAGS).to_le_bytes());
    payload.push(0); // unknown1
    payload.extend_from_slice(&u32::from(local_ip).to_be_bytes());
    payload.extend_from_slice(&session.local_port.to_le_bytes());
    payload.extend_from_slice(&u32::from(external_ip).to_be_bytes());
    payload.extend_from_slice(&session.external_port.to_le_bytes());
    payload.push(session.image_size);
    payload.push(LOGIN70_DUNNO2);
    if let Some(descr) = &session.descr {
        payload.extend_from_slice(descr.as_bytes());
    }

    Frame::new(gg_proto::PacketType::Login70.to_u32(), payload.into())
}

fn build_login80(session: &Session, hash: [u8; 64]) -> Frame {
    let mut payload = Vec::new();
    payload.extend_from_slice(&session.uin.to_le_bytes());
    payload.extend_from_slice(&LOGIN80_LANGUAGE);
    payload.push(hash_type_byte(session.hash_type));
    payload.extend_from_slice(&hash);
    payload.extend_from_slice(&session.status.to_le_bytes());
    payload.extend_from_slice(&LOGIN80_FLAGS.to_le_bytes());
    payload.extend_from_slice(&session.features.to_le_bytes());
    payload.push(session.image_size);
    payload.push(LOGIN80_DUNNO2);

    let version = CLIENT_VERSION.as_bytes();
    payload.extend_from_slice(&(version.len() as u32).to_le_bytes());
    payload.extend_from_slice(version);

    let descr = session.descr.as_deref().unwrap_or("");
    payload.extend_from_slice(&(descr.len() as u32).to_le_bytes());
    payload.extend_from_slice(descr.as_bytes());

    Frame::new(gg_proto::PacketType::Login80.to_u32(), payload.into())
}

/// Decode the welcome challenge from `Welcome (0x01)`'s payload.
pub fn decode_welcome(bytes: &[u8]) -> Result<u32, FailureKind> {
    gg_proto::read_u32(bytes, 0).map_err(|_| FailureKind::Invalid)
}
