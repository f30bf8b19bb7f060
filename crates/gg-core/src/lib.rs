//! Session protocol engine for a legacy instant-messaging protocol.
//!
//! This crate owns the non-blocking, event-driven state machine: it
//! consumes whole frames (from [`gg_proto`]), decodes them into
//! [`Event`] values, and drives the login handshake and connection
//! phase. It performs no I/O itself — see `gg-client` for the transport
//! adapter that feeds it bytes.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod decoders;
pub mod dispatch;
pub mod env;
pub mod error;
pub mod event;
pub mod login;
pub mod recv_buffer;
pub mod session;

pub use dispatch::{Outcome, handle_frame};
pub use env::{Clock, SystemClock};
pub use error::{FailureKind, SessionError};
pub use event::{Event, NotifyEntry, UserlistSubtype};
pub use login::LocalAddressSource;
pub use recv_buffer::RecvBuffer;
pub use session::{Encoding, ImageEntry, LoginParams, Phase, ProtocolGeneration, ResolverKind, Session, UserlistAccumulator};
