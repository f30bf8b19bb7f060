//! Presence decoders: `Status`/`Status60`/`Status77` and the
//! `NotifyReply` family (component E).
//!
//! Record layouts here are not pinned bit-exact by the wire protocol
//! section; they follow the shape the legacy implementation actually
//! used its structs in, reconstructed from field access order rather
//! than from a published struct definition.

use gg_proto::{read_u8, read_u16, read_u32};

use crate::error::FailureKind;
use crate::event::{Event, NotifyEntry};

const AUDIO_MASK: u32 = 0x4000_0000;
const AUDIO7_MASK: u32 = 0x2000_0000;
const OMNIX_MASK: u32 = 0x0800_0000;
const CAPABILITY_MASK: u32 = AUDIO_MASK | AUDIO7_MASK | OMNIX_MASK;

/// Fold capability bits out of a 60/77-series `uin` field, returning the
/// bare account id and the bits to OR into the reported version.
fn fold_capability_bits(uin: u32) -> (u32, u32) {
    let mut version_bits = 0;
    if uin & AUDIO_MASK != 0 {
        version_bits |= AUDIO_MASK;
    }
    if uin & AUDIO7_MASK != 0 {
        version_bits |= AUDIO7_MASK;
    }
    if uin & OMNIX_MASK != 0 {
        version_bits |= OMNIX_MASK;
    }
    (uin & 0x00ff_ffff, version_bits)
}

/// Trailing bytes, when present and long enough, carry a little-endian
/// UNIX timestamp in their last 4 bytes — signalled by a zero byte five
/// from the end.
fn extract_descr_time(tail: &[u8]) -> Option<u32> {
    if tail.len() > 4 && tail[tail.len() - 5] == 0 {
        read_u32(tail, tail.len() - 4).ok()
    } else {
        None
    }
}

/// Decode a legacy `Status (0x02)` packet: `{uin:u32 status:u32}` then an
/// optional raw description tail (not length-prefixed; runs to the end
/// of the frame).
pub fn decode_status(bytes: &[u8]) -> Result<Event, FailureKind> {
    let uin = read_u32(bytes, 0).map_err(|_| FailureKind::Invalid)?;
    let status = read_u32(bytes, 4).map_err(|_| FailureKind::Invalid)?;
    let descr = if bytes.len() > 8 { Some(String::from_utf8_lossy(&bytes[8..]).into_owned()) } else { None };
    Ok(Event::Status { uin, status, descr })
}

const STATUS60_HEADER_LEN: usize = 18;

/// Decode a `Status60 (0x2c)` / `Status77 (0x3a)` packet: `{uin:u32
/// status:u32 remote_ip:u32 remote_port:u16 version:u32
/// image_size:u8}` then an optional raw description tail.
pub fn decode_status60(bytes: &[u8]) -> Result<Event, FailureKind> {
    let raw_uin = read_u32(bytes, 0).map_err(|_| FailureKind::Invalid)?;
    let status = read_u32(bytes, 4).map_err(|_| FailureKind::Invalid)?;
    let ip_bits = read_u32(bytes, 8).map_err(|_| FailureKind::Invalid)?;
    let port = read_u16(bytes, 12).map_err(|_| FailureKind::Invalid)?;
    let mut version = read_u32(bytes, 14).map_err(|_| FailureKind::Invalid)?;
    let image_size = read_u8(bytes, 18).map_err(|_| FailureKind::Invalid)?;

    let (uin, version_bits) = fold_capability_bits(raw_uin);
    version |= version_bits;

    let (descr, time) = if bytes.len() > STATUS60_HEADER_LEN + 1 {
        let tail = &bytes[STATUS60_HEADER_LEN + 1..];
        (Some(String::from_utf8_lossy(tail).into_owned()), extract_descr_time(tail))
    } else {
        (None, None)
    };

    Ok(Event::Status60 { uin, status, descr, ip: std::net::Ipv4Addr::from(ip_bits.to_be()), port, version, image_size, time })
}

const NOTIFY_RECORD_LEN: usize = 18;

/// Decode a legacy `NotifyReply (0x0c)` packet: a packed array of
/// `{uin:u32 status:u32 remote_ip:u32 remote_port:u16 version:u32}`
/// records, with no explicit sentinel in the wire bytes — the caller's
/// array gets a synthetic `uin == 0` terminator appended (spec §8).
pub fn decode_notify(bytes: &[u8]) -> Result<Event, FailureKind> {
    if bytes.is_empty() {
        return Ok(Event::Notify(Vec::new()));
    }
    if bytes.len() % NOTIFY_RECORD_LEN != 0 {
        return Ok(Event::None);
    }

    let count = bytes.len() / NOTIFY_RECORD_LEN;
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let base = i * NOTIFY_RECORD_LEN;
        let raw_uin = read_u32(bytes, base).map_err(|_| FailureKind::Invalid)?;
        let status = read_u32(bytes, base + 4).map_err(|_| FailureKind::Invalid)?;
        let ip_bits = read_u32(bytes, base + 8).map_err(|_| FailureKind::Invalid)?;
        let port = read_u16(bytes, base + 12).map_err(|_| FailureKind::Invalid)?;
        let version = read_u32(bytes, base + 14).map_err(|_| FailureKind::Invalid)?;
        entries.push(NotifyEntry {
            uin: raw_uin,
            status,
            descr: None,
            ip: Some(std::net::Ipv4Addr::from(ip_bits.to_be())),
            port: Some(port),
            version: Some(version),
            image_size: None,
            time: None,
        });
    }
    // Sentinel terminator (spec §8 invariant), appended for the embedder.
    entries.push(NotifyEntry { uin: 0, status: 0, descr: None, ip: None, port: None, version: None, image_size: None, time: None });
    Ok(Event::Notify(entries))
}

const NOTIFY60_RECORD_LEN: usize = 19;

/// Decode a `NotifyReply60 (0x2d)` / `NotifyReply77 (0x3b)` packet: a
/// packed array of `{uin:u32 status:u32 remote_ip:u32 remote_port:u16
/// version:u32 image_size:u8}` records, each optionally followed by a
/// single-byte-length-prefixed description when its status carries the
/// description flag.
pub fn decode_notify60(bytes: &[u8]) -> Result<Event, FailureKind> {
    let mut entries = Vec::new();
    let mut offset = 0;

    while offset + NOTIFY60_RECORD_LEN <= bytes.len() {
        let raw_uin = read_u32(bytes, offset).map_err(|_| FailureKind::Invalid)?;
        let status = read_u32(bytes, offset + 4).map_err(|_| FailureKind::Invalid)?;
        let ip_bits = read_u32(bytes, offset + 8).map_err(|_| FailureKind::Invalid)?;
        let port = read_u16(bytes, offset + 12).map_err(|_| FailureKind::Invalid)?;
        let mut version = read_u32(bytes, offset + 14).map_err(|_| FailureKind::Invalid)?;
        let image_size = read_u8(bytes, offset + 18).map_err(|_| FailureKind::Invalid)?;

        let (uin, version_bits) = fold_capability_bits(raw_uin);
        version |= version_bits;

        let mut descr = None;
        let mut record_len = NOTIFY60_RECORD_LEN;

        if has_description_flag(status) {
            let Ok(descr_len) = read_u8(bytes, offset + NOTIFY60_RECORD_LEN) else {
                break;
            };
            let descr_len = descr_len as usize;
            let descr_start = offset + NOTIFY60_RECORD_LEN + 1;
            if descr_start + descr_len > bytes.len() {
                break;
            }
            descr = Some(String::from_utf8_lossy(&bytes[descr_start..descr_start + descr_len]).into_owned());
            record_len += 1 + descr_len;
        }

        entries.push(NotifyEntry {
            uin,
            status,
            descr,
            ip: Some(std::net::Ipv4Addr::from(ip_bits.to_be())),
            port: Some(port),
            version: Some(version),
            image_size: Some(image_size),
            time: None,
        });
        offset += record_len;
    }

    entries.push(NotifyEntry { uin: 0, status: 0, descr: None, ip: None, port: None, version: None, image_size: None, time: None });
    Ok(Event::Notify60(entries))
}

const NOTIFY80_HEADER_LEN: usize = 19;

/// Decode a `NotifyReply80 (0x3c)` packet: the same fixed header as
/// `NotifyReply60` plus a `u32`-length-prefixed UTF-8 description.
pub fn decode_notify80(session: &mut crate::session::Session, bytes: &[u8]) -> Result<Event, FailureKind> {
    let mut entries = Vec::new();
    let mut offset = 0;

    while offset + NOTIFY80_HEADER_LEN + 4 <= bytes.len() {
        let raw_uin = read_u32(bytes, offset).map_err(|_| FailureKind::Invalid)?;
        let status = read_u32(bytes, offset + 4).map_err(|_| FailureKind::Invalid)?;
        let ip_bits = read_u32(bytes, offset + 8).map_err(|_| FailureKind::Invalid)?;
        let port = read_u16(bytes, offset + 12).map_err(|_| FailureKind::Invalid)?;
        let image_size = read_u8(bytes, offset + 18).map_err(|_| FailureKind::Invalid)?;
        let descr_len = read_u32(bytes, offset + NOTIFY80_HEADER_LEN).map_err(|_| FailureKind::Invalid)? as usize;

        let (uin, version_bits) = fold_capability_bits(raw_uin);

        let descr_start = offset + NOTIFY80_HEADER_LEN + 4;
        let mut descr = None;
        let mut record_len = NOTIFY80_HEADER_LEN + 4;
        if descr_len > 0 {
            if descr_start + descr_len > bytes.len() {
                break;
            }
            descr = Some((session.transcode)(&bytes[descr_start..descr_start + descr_len]));
            record_len += descr_len;
        }

        entries.push(NotifyEntry {
            uin,
            status,
            descr,
            ip: Some(std::net::Ipv4Addr::from(ip_bits.to_be())),
            port: Some(port),
            version: Some(version_bits),
            image_size: Some(image_size),
            time: None,
        });
        offset += record_len;
    }

    entries.push(NotifyEntry { uin: 0, status: 0, descr: None, ip: None, port: None, version: None, image_size: None, time: None });
    Ok(Event::Notify60(entries))
}

/// Whether a presence status code carries an attached description.
fn has_description_flag(status: u32) -> bool {
    matches!(status & 0xff, 0x04 | 0x06 | 0x0a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_status_reads_uin_and_status() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&123u32.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        let event = decode_status(&bytes).unwrap();
        assert_eq!(event, Event::Status { uin: 123, status: 2, descr: None });
    }

    #[test]
    fn legacy_status_with_description_tail() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&123u32.to_le_bytes());
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(b"afk");
        let event = decode_status(&bytes).unwrap();
        assert_eq!(event, Event::Status { uin: 123, status: 4, descr: Some("afk".to_string()) });
    }

    #[test]
    fn status60_folds_capability_bits_out_of_uin() {
        let mut bytes = Vec::new();
        let raw_uin = 42u32 | AUDIO_MASK;
        bytes.extend_from_slice(&raw_uin.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&10u32.to_le_bytes());
        bytes.push(5);
        let event = decode_status60(&bytes).unwrap();
        match event {
            Event::Status60 { uin, version, .. } => {
                assert_eq!(uin, 42);
                assert_eq!(version, 10 | AUDIO_MASK);
            },
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn status60_clears_the_whole_top_byte_not_just_named_bits() {
        let mut bytes = Vec::new();
        let raw_uin = 1u32 | 0x8100_0000;
        bytes.extend_from_slice(&raw_uin.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&10u32.to_le_bytes());
        bytes.push(5);
        let event = decode_status60(&bytes).unwrap();
        match event {
            Event::Status60 { uin, version, .. } => {
                assert_eq!(uin, 1);
                assert_eq!(version, 10);
            },
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn notify_array_ends_with_sentinel() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        let event = decode_notify(&bytes).unwrap();
        match event {
            Event::Notify(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries.last().unwrap().uin, 0);
            },
            other => panic!("unexpected: {other:?}"),
        }
    }
}
