//! Little-endian fixed-width reads and checked bounds arithmetic.
//!
//! Every function here takes a frame-length-bounded slice and a cursor
//! position and returns `None`/`Err` rather than panicking or reading
//! past the end. Decoders build on these instead of indexing directly.

use crate::error::{ProtocolError, Result};

/// Read a little-endian `u32` at `offset`.
pub fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    let slice = bytes
        .get(offset..offset + 4)
        .ok_or(ProtocolError::OutOfBounds { offset, size: 4, frame_len: bytes.len() })?;
    Ok(u32::from_le_bytes(slice.try_into().unwrap_or([0; 4])))
}

/// Read a little-endian `u16` at `offset`.
pub fn read_u16(bytes: &[u8], offset: usize) -> Result<u16> {
    let slice = bytes
        .get(offset..offset + 2)
        .ok_or(ProtocolError::OutOfBounds { offset, size: 2, frame_len: bytes.len() })?;
    Ok(u16::from_le_bytes(slice.try_into().unwrap_or([0; 2])))
}

/// Read one byte at `offset`.
pub fn read_u8(bytes: &[u8], offset: usize) -> Result<u8> {
    bytes
        .get(offset)
        .copied()
        .ok_or(ProtocolError::OutOfBounds { offset, size: 1, frame_len: bytes.len() })
}

/// Read `len` raw bytes at `offset`.
pub fn read_slice(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    bytes
        .get(offset..offset + len)
        .ok_or(ProtocolError::OutOfBounds { offset, size: len, frame_len: bytes.len() })
}

/// Find the NUL terminator starting at `offset`, returning the substring
/// before it (without the terminator) and the offset just past it.
pub fn read_nul_terminated(bytes: &[u8], offset: usize) -> Result<(&[u8], usize)> {
    let tail = bytes.get(offset..).ok_or(ProtocolError::OutOfBounds {
        offset,
        size: 0,
        frame_len: bytes.len(),
    })?;
    let nul_pos = tail.iter().position(|&b| b == 0).ok_or(ProtocolError::MissingTerminator)?;
    Ok((&tail[..nul_pos], offset + nul_pos + 1))
}

/// Validate that `count * record_size` fits both in a `usize` and within
/// `remaining` bytes, without ever computing the product in a way that
/// could silently wrap.
///
/// Returns the validated byte length on success.
pub fn checked_array_len(count: u32, record_size: usize, remaining: usize) -> Result<usize> {
    let count = count as usize;
    let total = count
        .checked_mul(record_size)
        .ok_or(ProtocolError::OutOfBounds { offset: 0, size: record_size, frame_len: remaining })?;
    if total > remaining {
        return Err(ProtocolError::OutOfBounds { offset: 0, size: total, frame_len: remaining });
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn read_u32_round_trip() {
        let bytes = 0xdead_beefu32.to_le_bytes();
        assert_eq!(read_u32(&bytes, 0).unwrap(), 0xdead_beef);
    }

    #[test]
    fn read_u32_out_of_bounds() {
        let bytes = [0u8; 2];
        assert!(matches!(read_u32(&bytes, 0), Err(ProtocolError::OutOfBounds { .. })));
    }

    #[test]
    fn nul_terminated_finds_string() {
        let bytes = b"hi\0trailing";
        let (s, next) = read_nul_terminated(bytes, 0).unwrap();
        assert_eq!(s, b"hi");
        assert_eq!(next, 3);
    }

    #[test]
    fn nul_terminated_missing_is_err() {
        let bytes = b"no terminator here";
        assert!(matches!(read_nul_terminated(bytes, 0), Err(ProtocolError::MissingTerminator)));
    }

    #[test]
    fn checked_array_len_rejects_overflowing_count() {
        assert!(checked_array_len(u32::MAX, 4, 100).is_err());
    }

    #[test]
    fn checked_array_len_rejects_oversized_total() {
        assert!(checked_array_len(1000, 4, 100).is_err());
    }

    #[test]
    fn checked_array_len_accepts_exact_fit() {
        assert_eq!(checked_array_len(5, 4, 20).unwrap(), 20);
    }

    proptest! {
        #[test]
        fn checked_array_len_never_panics(count: u32, record_size in 0usize..=64, remaining in 0usize..=4096) {
            let _ = checked_array_len(count, record_size, remaining);
        }
    }
}
