//! Public, action-based embedder API for the session protocol engine.
//!
//! Wraps [`gg_core`]'s Sans-IO state machine with the surrounding
//! hub-resolution and timeout bookkeeping an embedder needs, and
//! exposes it as `events in, actions out`: [`Session::handle`] consumes
//! a [`SessionEvent`] and returns the [`SessionAction`]s the caller
//! must execute. The core touches no socket; an optional
//! `feature = "transport"` adapter is provided for callers who don't
//! want to drive a non-blocking `TcpStream` themselves.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod event;

#[cfg(feature = "transport")]
pub mod transport;

pub use client::{DEFAULT_HUB_HOSTNAME, DEFAULT_LOGIN_TIMEOUT, ResolverConfig, Session};
pub use event::{SessionAction, SessionEvent};
