//! RecvMsg / RecvMsg80 decoders and the options tail (component E).

use gg_proto::{checked_array_len, read_nul_terminated, read_u8, read_u16, read_u32};

use crate::decoders::image;
use crate::error::FailureKind;
use crate::event::Event;
use crate::session::{Encoding, Session};

const OPT_CONFERENCE: u8 = 0x01;
const OPT_ATTRIBUTES: u8 = 0x02;
const OPT_IMAGE_REQUEST: u8 = 0x04;
const OPT_IMAGE_REPLY: u8 = 0x05;
const OPT_IMAGE_REPLY_MORE: u8 = 0x06;

const MAX_CONFERENCE_RECIPIENTS: u32 = 0xFFFF;

struct ParsedOptions {
    recipients: Option<Vec<u32>>,
    formats: Option<Vec<u8>>,
    /// When set, this replaces the `Msg` event entirely (image request or
    /// reply tags short-circuit the rest of the packet).
    override_event: Option<Event>,
}

/// Outcome of walking the options tail.
enum OptionsOutcome {
    Parsed(ParsedOptions),
    /// An attacker-controlled count failed validation: the whole packet
    /// decodes to `Event::None` (scenario 5, spec §8).
    Discard,
}

fn parse_options_tail(session: &mut crate::session::Session, sender: u32, bytes: &[u8], start: usize) -> Result<OptionsOutcome, FailureKind> {
    let mut offset = start;
    let mut recipients = None;
    let mut formats = None;

    while offset < bytes.len() {
        let tag = match read_u8(bytes, offset) {
            Ok(t) => t,
            Err(_) => break,
        };
        offset += 1;

        match tag {
            OPT_CONFERENCE => {
                let count = match read_u32(bytes, offset) {
                    Ok(c) => c,
                    Err(_) => return Ok(OptionsOutcome::Discard),
                };
                offset += 4;
                if count > MAX_CONFERENCE_RECIPIENTS {
                    return Ok(OptionsOutcome::Discard);
                }
                let remaining = bytes.len() - offset;
                let byte_len = match checked_array_len(count, 4, remaining) {
                    Ok(n) => n,
                    Err(_) => return Ok(OptionsOutcome::Discard),
                };
                let mut list = Vec::with_capacity(count as usize);
                for i in 0..count {
                    let value = read_u32(bytes, offset + (i as usize) * 4).map_err(|_| FailureKind::Invalid)?;
                    list.push(value);
                }
                offset += byte_len;
                recipients = Some(list);
            },
            OPT_ATTRIBUTES => {
                let len = match read_u16(bytes, offset) {
                    Ok(l) => l,
                    Err(_) => return Ok(OptionsOutcome::Discard),
                };
                offset += 2;
                let slice = match gg_proto::read_slice(bytes, offset, len as usize) {
                    Ok(s) => s,
                    Err(_) => return Ok(OptionsOutcome::Discard),
                };
                formats = Some(slice.to_vec());
                offset += len as usize;
            },
            OPT_IMAGE_REQUEST => {
                let size = read_u32(bytes, offset).map_err(|_| FailureKind::Invalid)?;
                offset += 4;
                let crc32 = read_u32(bytes, offset).map_err(|_| FailureKind::Invalid)?;
                return Ok(OptionsOutcome::Parsed(ParsedOptions {
                    recipients,
                    formats,
                    override_event: Some(Event::ImageRequest { sender, size, crc32 }),
                }));
            },
            OPT_IMAGE_REPLY | OPT_IMAGE_REPLY_MORE => {
                let continuation = tag == OPT_IMAGE_REPLY_MORE;
                let event = image::handle_image_fragment(session, sender, bytes, offset, continuation)?;
                return Ok(OptionsOutcome::Parsed(ParsedOptions {
                    recipients,
                    formats,
                    override_event: Some(event.unwrap_or(Event::None)),
                }));
            },
            _ => break,
        }
    }

    Ok(OptionsOutcome::Parsed(ParsedOptions { recipients, formats, override_event: None }))
}

/// Decode a legacy `RecvMsg (0x0a)` packet.
///
/// Wire layout: `{sender:u32 seq:u32 time:u32 msgclass:u32}` then a
/// NUL-terminated body then an optional options tail.
pub fn decode_recv_msg(session: &mut Session, bytes: &[u8]) -> Result<Event, FailureKind> {
    let sender = read_u32(bytes, 0).map_err(|_| FailureKind::Invalid)?;
    let seq = read_u32(bytes, 4).map_err(|_| FailureKind::Invalid)?;
    let time = read_u32(bytes, 8).map_err(|_| FailureKind::Invalid)?;
    let msgclass = read_u32(bytes, 12).map_err(|_| FailureKind::Invalid)?;

    if seq == 0 && msgclass == 0 {
        return Ok(Event::None);
    }

    let (body_bytes, after_body) = read_nul_terminated(bytes, 16).map_err(|_| FailureKind::Invalid)?;

    if body_bytes == [0x02] {
        return Ok(Event::Msg {
            sender,
            class: msgclass,
            time,
            seq,
            body: "\u{2}".to_string(),
            xhtml: None,
            recipients: None,
            formats: None,
        });
    }

    let body = (session.transcode)(body_bytes);

    match parse_options_tail(session, sender, bytes, after_body)? {
        OptionsOutcome::Discard => Ok(Event::None),
        OptionsOutcome::Parsed(opts) => {
            if let Some(event) = opts.override_event {
                return Ok(event);
            }
            Ok(Event::Msg {
                sender,
                class: msgclass,
                time,
                seq,
                body,
                xhtml: None,
                recipients: opts.recipients,
                formats: opts.formats,
            })
        },
    }
}

/// Decode a modern `RecvMsg80 (0x2e)` packet.
///
/// Wire layout: `{sender:u32 seq:u32 time:u32 msgclass:u32
/// offset_plain:u32 offset_attr:u32}` then variable-length bodies.
pub fn decode_recv_msg80(session: &mut Session, bytes: &[u8]) -> Result<Event, FailureKind> {
    const HEADER_SIZE: usize = 24;

    let sender = read_u32(bytes, 0).map_err(|_| FailureKind::Invalid)?;
    let seq = read_u32(bytes, 4).map_err(|_| FailureKind::Invalid)?;
    let time = read_u32(bytes, 8).map_err(|_| FailureKind::Invalid)?;
    let msgclass = read_u32(bytes, 12).map_err(|_| FailureKind::Invalid)?;
    let offset_plain = read_u32(bytes, 16).map_err(|_| FailureKind::Invalid)? as usize;
    let mut offset_attr = read_u32(bytes, 20).map_err(|_| FailureKind::Invalid)? as usize;

    if offset_plain < HEADER_SIZE || offset_plain >= bytes.len() {
        return Err(FailureKind::Invalid);
    }
    if offset_attr == bytes.len() {
        offset_attr = 0;
    }
    if offset_attr != 0 && (offset_attr < HEADER_SIZE || offset_attr > bytes.len()) {
        return Err(FailureKind::Invalid);
    }

    let xhtml = if offset_plain > HEADER_SIZE {
        let (xhtml_bytes, next) = read_nul_terminated(bytes, HEADER_SIZE).map_err(|_| FailureKind::Invalid)?;
        if next != offset_plain {
            // The terminator must fall strictly inside [header, offset_plain);
            // one found further out would pull xhtml past the plain body.
            return Err(FailureKind::Invalid);
        }
        Some(String::from_utf8_lossy(xhtml_bytes).into_owned())
    } else {
        None
    };

    let (plain_bytes, after_plain) = read_nul_terminated(bytes, offset_plain).map_err(|_| FailureKind::Invalid)?;

    let body = match (session.encoding, &xhtml) {
        (Encoding::Cp1250, _) => (session.transcode)(plain_bytes),
        (Encoding::Utf8, Some(xhtml)) => xhtml.clone(),
        (Encoding::Utf8, None) => (session.html_strip)(&String::from_utf8_lossy(plain_bytes)),
    };

    let tail_start = if offset_attr != 0 { offset_attr } else { after_plain };

    match parse_options_tail(session, sender, bytes, tail_start)? {
        OptionsOutcome::Discard => Ok(Event::None),
        OptionsOutcome::Parsed(opts) => {
            if let Some(event) = opts.override_event {
                return Ok(event);
            }
            Ok(Event::Msg {
                sender,
                class: msgclass,
                time,
                seq,
                body,
                xhtml,
                recipients: opts.recipients,
                formats: opts.formats,
            })
        },
    }
}
