//! Multi-fragment image reassembly (component H).

use gg_proto::{read_nul_terminated, read_u32};

use crate::error::FailureKind;
use crate::event::Event;
use crate::session::{ImageEntry, Session};

/// Handle one `0x05`/`0x06` options-tail fragment.
///
/// `offset` points just past the option tag byte. Returns `Some(event)`
/// once the image is fully reassembled (or an immediate empty reply),
/// `None` while reassembly is still in progress.
pub fn handle_image_fragment(
    session: &mut Session,
    sender: u32,
    bytes: &[u8],
    offset: usize,
    continuation: bool,
) -> Result<Option<Event>, FailureKind> {
    let size = read_u32(bytes, offset).map_err(|_| FailureKind::Invalid)?;
    let crc32 = read_u32(bytes, offset + 4).map_err(|_| FailureKind::Invalid)?;
    let mut cursor = offset + 8;

    if size == 0 {
        // Header-only reply: peer does not have the requested image.
        return Ok(Some(Event::ImageReply { sender, size: 0, crc32, filename: String::new(), bytes: Vec::new() }));
    }

    let filename = if continuation {
        None
    } else {
        let (name_bytes, next) = read_nul_terminated(bytes, cursor).map_err(|_| FailureKind::Invalid)?;
        cursor = next;
        Some(String::from_utf8_lossy(name_bytes).into_owned())
    };

    let fragment = bytes.get(cursor..).unwrap_or(&[]);

    if continuation {
        let Some(entry) = session.find_image_mut(sender, size, crc32) else {
            // Continuation for an image we never started reassembling;
            // nothing to do but discard (tier 1).
            return Ok(None);
        };
        entry.append(fragment);
    } else if session.find_image_mut(sender, size, crc32).is_some() {
        let entry = session.find_image_mut(sender, size, crc32).expect("just checked Some");
        if filename.is_some() {
            entry.filename = filename;
        }
        entry.append(fragment);
    } else {
        let mut entry =
            ImageEntry { sender, declared_size: size, declared_crc32: crc32, received: 0, bytes: Vec::new(), filename };
        entry.append(fragment);
        session.image_queue.push(entry);
    }

    let complete = session.find_image_mut(sender, size, crc32).is_some_and(ImageEntry::is_complete);

    if complete {
        let entry = session.remove_image(sender, size, crc32).expect("just confirmed present");
        Ok(Some(Event::ImageReply {
            sender,
            size: entry.declared_size,
            crc32: entry.declared_crc32,
            filename: entry.filename.unwrap_or_default(),
            bytes: entry.bytes,
        }))
    } else {
        Ok(None)
    }
}
