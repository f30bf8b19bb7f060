//! Fuzz target for the session protocol's `Frame::decode`.
//!
//! Arbitrary bytes must never panic, only return `Err` for malformed
//! headers or truncated payloads.

#![no_main]

use gg_proto::Frame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = Frame::decode(data);
});
