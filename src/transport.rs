//! Blocking TCP transport.
//!
//! One socket, one remote, synchronous send/receive with independently
//! settable timeouts. The transport knows nothing about 3E framing
//! beyond the length-delimited read contract of [`receive_frame`]; the
//! protocol layer supplies the header size and the length extractor.
//!
//! Any I/O failure or timeout invalidates the connection so the next
//! operation reconnects instead of desynchronizing on a half-read
//! frame.
//!
//! [`receive_frame`]: TcpTransport::receive_frame

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::SessionConfig;
use crate::error::McError;

/// Upper bound for a single length-delimited frame body.
const MAX_FRAME_LEN: usize = 65535;

/// Connect timeout applied per resolved address.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Render bytes as space-separated uppercase hex for logs/diagnostics.
#[must_use]
pub(crate) fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Synchronous stream transport used by the client.
#[derive(Default)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
    send_timeout: Option<Duration>,
    recv_timeout: Option<Duration>,
}

impl TcpTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the configured endpoint and connect, replacing any
    /// previous connection. Timeouts are derived from the session's
    /// 250 ms timer.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an unusable endpoint, `Transport` when no
    /// resolved address accepts the connection.
    pub fn connect(&mut self, config: &SessionConfig) -> Result<(), McError> {
        if config.host.is_empty() {
            return Err(McError::InvalidArgument("host must not be empty".into()));
        }
        if config.port == 0 {
            return Err(McError::InvalidArgument("port must be non-zero".into()));
        }

        self.disconnect();

        let timeout = config.timeout_duration();
        let addrs = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(McError::Transport)?;

        let mut last_err: Option<std::io::Error> = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
                Ok(stream) => {
                    stream.set_nodelay(true).map_err(McError::Transport)?;
                    self.stream = Some(stream);
                    self.set_timeouts(timeout, timeout)?;
                    return Ok(());
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(match last_err {
            Some(e) => McError::Transport(e),
            None => McError::InvalidArgument(format!(
                "host {host} resolved to no addresses",
                host = config.host
            )),
        })
    }

    /// Drop the connection. Idempotent and never fails.
    pub fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Apply send and receive timeouts, remembered for reconnects.
    ///
    /// # Errors
    ///
    /// `Transport` when the socket rejects the option.
    pub fn set_timeouts(&mut self, send: Duration, recv: Duration) -> Result<(), McError> {
        self.send_timeout = Some(send);
        self.recv_timeout = Some(recv);
        if let Some(stream) = &self.stream {
            stream
                .set_write_timeout(Some(send))
                .map_err(McError::Transport)?;
            stream
                .set_read_timeout(Some(recv))
                .map_err(McError::Transport)?;
        }
        Ok(())
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream, McError> {
        self.stream.as_mut().ok_or(McError::NotConnected)
    }

    // Timeouts and failures both poison the stream; a half-written or
    // half-read frame cannot be resynchronized.
    fn fail(&mut self, error: std::io::Error) -> McError {
        self.disconnect();
        match error.kind() {
            ErrorKind::WouldBlock | ErrorKind::TimedOut => McError::Timeout,
            _ => McError::Transport(error),
        }
    }

    /// Write the whole buffer.
    ///
    /// # Errors
    ///
    /// `NotConnected`, `Timeout` or `Transport`; the latter two leave
    /// the transport disconnected.
    pub fn send_all(&mut self, data: &[u8]) -> Result<(), McError> {
        let stream = self.stream_mut()?;
        match stream.write_all(data) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Read exactly `expected` bytes.
    ///
    /// # Errors
    ///
    /// `NotConnected`, `Timeout` or `Transport`; the latter two leave
    /// the transport disconnected.
    pub fn receive_all(&mut self, expected: usize) -> Result<Vec<u8>, McError> {
        let stream = self.stream_mut()?;
        let mut buffer = vec![0u8; expected];
        match stream.read_exact(&mut buffer) {
            Ok(()) => Ok(buffer),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Read a length-delimited frame: `header_size` bytes, then the
    /// body whose size `extractor` derives from the header. Returns
    /// header followed by body.
    ///
    /// # Errors
    ///
    /// Propagates receive errors; an extractor failure or an
    /// out-of-range body size disconnects and surfaces `InvalidFrame`.
    pub fn receive_frame<F>(&mut self, header_size: usize, extractor: F) -> Result<Vec<u8>, McError>
    where
        F: FnOnce(&[u8]) -> Result<usize, McError>,
    {
        if header_size == 0 {
            return Err(McError::InvalidArgument(
                "frame header size must be greater than zero".into(),
            ));
        }
        let mut frame = self.receive_all(header_size)?;
        let body_size = match extractor(&frame) {
            Ok(size) => size,
            Err(e) => {
                self.disconnect();
                return Err(e);
            }
        };
        if body_size == 0 || body_size > MAX_FRAME_LEN {
            self.disconnect();
            return Err(McError::InvalidFrame(format!(
                "frame header declares an unusable body size: {body_size}"
            )));
        }
        let body = self.receive_all(body_size)?;
        frame.extend_from_slice(&body);
        Ok(frame)
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("connected", &self.is_connected())
            .field(
                "peer",
                &self.stream.as_ref().and_then(|s| s.peer_addr().ok()),
            )
            .finish()
    }
}
