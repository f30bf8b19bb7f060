//! Per-packet-kind decoders (component E). Each is pure given the
//! packet bytes plus mutable access to session state it's entitled to
//! touch (image queue, userlist accumulator, last-pong timestamp).

pub mod image;
pub mod message;
pub mod misc;
pub mod status;
