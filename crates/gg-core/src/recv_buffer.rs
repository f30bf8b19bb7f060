//! Receive buffer (component C): accumulates partial reads until a
//! whole frame is available.

use bytes::BytesMut;
use gg_proto::{Frame, FrameHeader, ProtocolError};

/// Accumulates bytes read off the socket and yields whole frames as
/// they become available. Never holds more than one frame's worth of
/// slop beyond the ceiling before rejecting.
#[derive(Debug, Default)]
pub struct RecvBuffer {
    buf: BytesMut,
}

impl RecvBuffer {
    /// An empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self { buf: BytesMut::new() }
    }

    /// Append bytes just read from the socket.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Try to take one whole frame from the front of the buffer.
    ///
    /// Returns `Ok(None)` when fewer than [`FrameHeader::SIZE`] bytes are
    /// buffered, or when the header is present but its payload hasn't
    /// fully arrived yet. Returns `Err` only for conditions that can
    /// never be resolved by waiting for more bytes (oversized payload).
    pub fn try_take_frame(&mut self) -> Result<Option<Frame>, ProtocolError> {
        if self.buf.len() < FrameHeader::SIZE {
            return Ok(None);
        }

        let header = FrameHeader::from_bytes(&self.buf)?;
        let total = FrameHeader::SIZE + header.length() as usize;
        if self.buf.len() < total {
            return Ok(None);
        }

        let frame_bytes = self.buf.split_to(total);
        let frame = Frame::decode(&frame_bytes)?;
        Ok(Some(frame))
    }

    /// Bytes currently buffered but not yet consumed by a frame.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use gg_proto::Frame;

    use super::*;

    #[test]
    fn waits_for_full_header() {
        let mut recv = RecvBuffer::new();
        recv.feed(&[1, 2, 3]);
        assert_eq!(recv.try_take_frame().unwrap(), None);
    }

    #[test]
    fn waits_for_full_payload() {
        let mut recv = RecvBuffer::new();
        let frame = Frame::new(0x01, Bytes::from_static(b"hello"));
        let mut encoded = Vec::new();
        frame.encode(&mut encoded);
        recv.feed(&encoded[..encoded.len() - 2]);
        assert_eq!(recv.try_take_frame().unwrap(), None);
        recv.feed(&encoded[encoded.len() - 2..]);
        assert_eq!(recv.try_take_frame().unwrap(), Some(frame));
    }

    #[test]
    fn yields_multiple_queued_frames_in_order() {
        let mut recv = RecvBuffer::new();
        let a = Frame::new(0x01, Bytes::from_static(b"a"));
        let b = Frame::new(0x02, Bytes::from_static(b"b"));
        let mut encoded = Vec::new();
        a.encode(&mut encoded);
        b.encode(&mut encoded);
        recv.feed(&encoded);
        assert_eq!(recv.try_take_frame().unwrap(), Some(a));
        assert_eq!(recv.try_take_frame().unwrap(), Some(b));
        assert_eq!(recv.try_take_frame().unwrap(), None);
    }

    #[test]
    fn rejects_oversized_header_immediately() {
        let mut recv = RecvBuffer::new();
        let mut header = Vec::new();
        header.extend_from_slice(&1u32.to_le_bytes());
        header.extend_from_slice(&(FrameHeader::MAX_PAYLOAD_SIZE + 1).to_le_bytes());
        recv.feed(&header);
        assert!(recv.try_take_frame().is_err());
    }
}
