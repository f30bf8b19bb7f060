//! The 8-byte frame header and whole-frame value.
//!
//! Wire layout, little-endian: `type:u32 length:u32` followed by
//! `length` payload bytes. All multi-byte integers on the wire are
//! little-endian throughout this protocol.

use bytes::Bytes;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::error::{ProtocolError, Result};

/// Fixed 8-byte frame header.
///
/// `#[repr(C, packed)]` with zerocopy traits lets this be cast directly
/// from untrusted network bytes: every 4-byte pattern is a valid `u32`,
/// so there is no invalid representation to guard against at this layer.
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct FrameHeader {
    packet_type: [u8; 4],
    length: [u8; 4],
}

impl FrameHeader {
    /// Size of the serialized header in bytes.
    pub const SIZE: usize = 8;

    /// Hard ceiling on payload length; larger values are rejected before
    /// any allocation is attempted.
    pub const MAX_PAYLOAD_SIZE: u32 = 64 * 1024;

    /// Build a header for a packet of the given type and payload length.
    #[must_use]
    pub fn new(packet_type: u32, length: u32) -> Self {
        Self { packet_type: packet_type.to_le_bytes(), length: length.to_le_bytes() }
    }

    /// Parse a header from the front of `bytes`, validating the length
    /// ceiling but not the full frame's availability (see [`Frame::decode`]).
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::FrameTooShort`] if fewer than
    /// [`Self::SIZE`] bytes are present, or
    /// [`ProtocolError::PayloadTooLarge`] if the declared length exceeds
    /// [`Self::MAX_PAYLOAD_SIZE`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = Self::read_from_prefix(bytes)
            .map_err(|_| ProtocolError::FrameTooShort { expected: Self::SIZE, actual: bytes.len() })?
            .0;

        let length = header.length();
        if length > Self::MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: length as usize,
                max: Self::MAX_PAYLOAD_SIZE as usize,
            });
        }

        Ok(header)
    }

    /// Serialize the header to its wire bytes.
    #[must_use]
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let bytes = IntoBytes::as_bytes(&self);
        let mut arr = [0u8; Self::SIZE];
        arr.copy_from_slice(bytes);
        arr
    }

    /// Raw packet type code.
    #[must_use]
    pub fn packet_type(&self) -> u32 {
        u32::from_le_bytes(self.packet_type)
    }

    /// Declared payload length in bytes.
    #[must_use]
    pub fn length(&self) -> u32 {
        u32::from_le_bytes(self.length)
    }

    pub(crate) fn set_length(&mut self, length: u32) {
        self.length = length.to_le_bytes();
    }
}

impl std::fmt::Debug for FrameHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameHeader")
            .field("packet_type", &format_args!("{:#04x}", self.packet_type()))
            .field("length", &self.length())
            .finish()
    }
}

impl PartialEq for FrameHeader {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for FrameHeader {}

/// A whole decoded frame: header plus its payload bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    header: FrameHeader,
    payload: Bytes,
}

impl Frame {
    /// Build a frame, deriving the header's length field from `payload`.
    #[must_use]
    pub fn new(packet_type: u32, payload: Bytes) -> Self {
        let mut header = FrameHeader::new(packet_type, 0);
        header.set_length(payload.len() as u32);
        Self { header, payload }
    }

    /// This frame's packet type.
    #[must_use]
    pub fn packet_type(&self) -> u32 {
        self.header.packet_type()
    }

    /// This frame's header.
    #[must_use]
    pub fn header(&self) -> FrameHeader {
        self.header
    }

    /// This frame's payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consume the frame, returning its payload.
    #[must_use]
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Decode one whole frame from the front of `bytes`.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::FrameTooShort`] if the header itself is not fully
    /// present, [`ProtocolError::PayloadTooLarge`] if the declared length
    /// exceeds [`FrameHeader::MAX_PAYLOAD_SIZE`], or
    /// [`ProtocolError::TruncatedFrame`] if fewer than `length` payload
    /// bytes follow the header.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let header = FrameHeader::from_bytes(bytes)?;
        let length = header.length() as usize;
        let available = bytes.len() - FrameHeader::SIZE;
        if available < length {
            return Err(ProtocolError::TruncatedFrame { declared: length, available });
        }
        let payload = Bytes::copy_from_slice(&bytes[FrameHeader::SIZE..FrameHeader::SIZE + length]);
        Ok(Self { header, payload })
    }

    /// Total size in bytes this frame would occupy on the wire.
    #[must_use]
    pub fn wire_len(&self) -> usize {
        FrameHeader::SIZE + self.payload.len()
    }

    /// Serialize header and payload into `dst`.
    pub fn encode(&self, dst: &mut Vec<u8>) {
        dst.extend_from_slice(&self.header.to_bytes());
        dst.extend_from_slice(&self.payload);
    }
}
