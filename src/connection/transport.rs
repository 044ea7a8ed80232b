use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::constants::CONNECT_TIMEOUT;

use super::TransportError;

/// Outcome of a readiness check on the editor socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// At least one byte is waiting to be read.
    Ready,
    /// Nothing arrived within the timeout.
    Empty,
}

/// The single blocking TCP connection to the editor.
///
/// All transfers are all-or-nothing: a short read or write means the
/// session is gone, and the caller must drop the transport rather than
/// retry on it. Reads outside the handshake are gated by
/// [`poll_readable`](Self::poll_readable), so they never block on an
/// idle peer.
pub struct Transport {
    stream: TcpStream,
    io_timeout: Option<Duration>,
}

impl Transport {
    /// Connect with the short handshake timeout armed on both
    /// directions. The timeout stays in force until
    /// [`clear_timeouts`](Self::clear_timeouts).
    pub fn connect(addr: &SocketAddr) -> Result<Self, TransportError> {
        let stream = TcpStream::connect_timeout(addr, CONNECT_TIMEOUT)?;
        stream.set_read_timeout(Some(CONNECT_TIMEOUT))?;
        stream.set_write_timeout(Some(CONNECT_TIMEOUT))?;
        Ok(Self {
            stream,
            io_timeout: Some(CONNECT_TIMEOUT),
        })
    }

    /// Switch to fully blocking reads and writes once the handshake is
    /// done.
    pub fn clear_timeouts(&mut self) -> Result<(), TransportError> {
        self.stream.set_read_timeout(None)?;
        self.stream.set_write_timeout(None)?;
        self.io_timeout = None;
        Ok(())
    }

    pub fn send_all(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.stream.write_all(bytes)?;
        Ok(())
    }

    pub fn recv_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        match self.stream.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => Err(TransportError::Closed),
            Err(err) => Err(err.into()),
        }
    }

    /// Check whether a message byte is pending.
    ///
    /// A zero timeout performs a nonblocking check (the per-frame drain
    /// path); a nonzero timeout waits at most that long. An orderly
    /// close by the peer is reported as [`TransportError::Closed`].
    pub fn poll_readable(&mut self, timeout: Duration) -> Result<Readiness, TransportError> {
        let mut probe = [0u8; 1];
        if timeout.is_zero() {
            self.stream.set_nonblocking(true)?;
            let result = self.stream.peek(&mut probe);
            // restore before interpreting, so an early return cannot
            // leave the socket nonblocking
            self.stream.set_nonblocking(false)?;
            Self::interpret_peek(result)
        } else {
            self.stream.set_read_timeout(Some(timeout))?;
            let result = self.stream.peek(&mut probe);
            self.stream.set_read_timeout(self.io_timeout)?;
            Self::interpret_peek(result)
        }
    }

    fn interpret_peek(result: std::io::Result<usize>) -> Result<Readiness, TransportError> {
        match result {
            Ok(0) => Err(TransportError::Closed),
            Ok(_) => Ok(Readiness::Ready),
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(Readiness::Empty)
            }
            Err(err) => Err(err.into()),
        }
    }
}
