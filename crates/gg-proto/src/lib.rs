//! Wire format for the legacy instant-messaging session protocol.
//!
//! This crate owns the bytes-to-bytes layer only: the 8-byte frame
//! header, the closed set of packet type codes, and the bounds-checked
//! primitives decoders build on. It knows nothing about session phase,
//! login, or reassembly — those live one layer up.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod bounds;
mod error;
mod frame;
mod opcode;

pub use bounds::{checked_array_len, read_nul_terminated, read_slice, read_u8, read_u16, read_u32};
pub use error::{ProtocolError, Result};
pub use frame::{Frame, FrameHeader};
pub use opcode::PacketType;
