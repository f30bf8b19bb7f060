//! Non-blocking `std::net::TcpStream` transport adapter (component N).
//!
//! Reauthored from the teacher's QUIC transport's "read header, then
//! read exactly `payload_size` more, then decode" structural idea,
//! without async or a QUIC stack: spec.md's Non-goals rule out a
//! cryptographic transport and a reconnection policy, and §5 asks for
//! a single-threaded, cooperative, non-blocking model driven by the
//! embedder's own readiness loop (`select`/`poll`/`epoll`), which this
//! adapter assumes the caller already runs.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};

use gg_core::RecvBuffer;
use gg_proto::{Frame, ProtocolError};
use thiserror::Error;

/// Errors the transport adapter can produce. Distinct from
/// [`gg_core::FailureKind`]: this is the I/O layer underneath the
/// engine, not the engine's own failure classification.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer closed the connection (a `read` returning `Ok(0)`,
    /// which spec.md §4.1 is explicit is distinct from "no data yet").
    #[error("connection closed by peer")]
    Closed,
    /// An I/O error other than `WouldBlock`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// A received frame violated the wire-format invariants.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

const READ_CHUNK: usize = 8192;

/// A non-blocking socket carrying whole [`Frame`]s in both directions.
pub struct FrameTransport {
    stream: TcpStream,
    recv: RecvBuffer,
    outbound: Vec<u8>,
}

impl FrameTransport {
    /// Connect to `addr` and put the socket into non-blocking mode.
    pub fn connect(addr: SocketAddr) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Self::from_stream(stream)
    }

    /// Wrap an already-connected stream, putting it into non-blocking
    /// mode.
    pub fn from_stream(stream: TcpStream) -> io::Result<Self> {
        stream.set_nonblocking(true)?;
        Ok(Self { stream, recv: RecvBuffer::new(), outbound: Vec::new() })
    }

    /// Queue a frame for sending and attempt to flush immediately.
    /// Bytes that don't fit in one non-blocking write are kept and
    /// retried on the next [`FrameTransport::poll_write`] call
    /// (suspension point 2, spec §5).
    pub fn send(&mut self, frame: &Frame) -> Result<(), TransportError> {
        frame.encode(&mut self.outbound);
        self.poll_write()
    }

    /// Retry flushing any bytes that a previous write returned short
    /// on. A no-op when nothing is queued.
    pub fn poll_write(&mut self) -> Result<(), TransportError> {
        while !self.outbound.is_empty() {
            match self.stream.write(&self.outbound) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => {
                    self.outbound.drain(..n);
                },
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(TransportError::Io(e)),
            }
        }
        Ok(())
    }

    /// Drain whatever is currently readable and return every whole
    /// frame that became available. Returns an empty vector (not an
    /// error) when nothing is ready yet.
    ///
    /// # Errors
    ///
    /// [`TransportError::Closed`] on a `read` returning `Ok(0)`;
    /// [`TransportError::Protocol`] on a frame exceeding the receive
    /// buffer's ceiling.
    pub fn poll_read(&mut self) -> Result<Vec<Frame>, TransportError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match self.stream.read(&mut chunk) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => self.recv.feed(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => return Err(TransportError::Io(e)),
            }
        }

        let mut frames = Vec::new();
        while let Some(frame) = self.recv.try_take_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::thread;

    use bytes::Bytes;
    use gg_proto::PacketType;

    use super::*;

    #[test]
    fn round_trips_a_frame_over_a_real_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut transport = FrameTransport::from_stream(stream).unwrap();
            let frame = Frame::new(PacketType::Pong.to_u32(), Bytes::new());
            loop {
                match transport.send(&frame) {
                    Ok(()) => break,
                    Err(TransportError::Io(e)) if e.kind() == ErrorKind::WouldBlock => continue,
                    Err(e) => panic!("send failed: {e}"),
                }
            }
        });

        let mut client = FrameTransport::connect(addr).unwrap();
        let mut received = Vec::new();
        while received.is_empty() {
            received = client.poll_read().unwrap();
        }
        assert_eq!(received[0].packet_type(), PacketType::Pong.to_u32());

        server.join().unwrap();
    }
}
