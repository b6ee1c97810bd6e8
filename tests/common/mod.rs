#![allow(dead_code)] // not every test binary uses every helper

//! In-process mock 3E server for integration tests.
//!
//! The server accepts one connection and answers each request with the
//! next scripted reply. Received requests are kept for assertions on
//! the exact bytes the client produced.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex, Once};
use std::thread::JoinHandle;

use melsec_mc3e::{CommunicationMode, PlcSeries, SessionConfig};

/// One scripted server action, consumed per request.
pub enum Reply {
    /// Answer with a well-formed binary response frame.
    Binary { completion: u16, payload: Vec<u8> },
    /// Answer with a well-formed ASCII response frame.
    Ascii { completion: u16, payload: String },
    /// Answer with arbitrary bytes.
    Raw(Vec<u8>),
    /// Read the request and never answer (forces a client timeout).
    Silent,
    /// Read the request and close the connection.
    Close,
}

pub struct MockPlc {
    port: u16,
    requests: Arc<Mutex<Vec<Vec<u8>>>>,
    _handle: Option<JoinHandle<()>>,
}

impl MockPlc {
    pub fn spawn(replies: Vec<Reply>) -> Self {
        init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let port = listener.local_addr().expect("local addr").port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let handle = std::thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            for reply in replies {
                let Some(request) = read_request(&mut stream) else {
                    return;
                };
                seen.lock().expect("requests lock").push(request);
                match reply {
                    Reply::Binary {
                        completion,
                        payload,
                    } => {
                        let _ = stream.write_all(&binary_response(completion, &payload));
                    }
                    Reply::Ascii {
                        completion,
                        payload,
                    } => {
                        let _ = stream.write_all(&ascii_response(completion, &payload));
                    }
                    Reply::Raw(bytes) => {
                        let _ = stream.write_all(&bytes);
                    }
                    Reply::Silent => {}
                    Reply::Close => return,
                }
            }
            // Keep the socket open until the client goes away.
            let mut sink = [0u8; 256];
            while matches!(stream.read(&mut sink), Ok(n) if n > 0) {}
        });
        Self {
            port,
            requests,
            _handle: Some(handle),
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Raw request frames the server has read so far.
    pub fn requests(&self) -> Vec<Vec<u8>> {
        self.requests.lock().expect("requests lock").clone()
    }
}

// Read one 3E request frame, either encoding, using its declared
// data length.
fn read_request(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut first = [0u8; 1];
    stream.read_exact(&mut first).ok()?;
    if first[0] == 0x50 {
        // binary: 9 header bytes up to data-length, then data-length more
        let mut rest = [0u8; 8];
        stream.read_exact(&mut rest).ok()?;
        let data_len = usize::from(rest[6]) | (usize::from(rest[7]) << 8);
        let mut body = vec![0u8; data_len];
        stream.read_exact(&mut body).ok()?;
        let mut request = vec![first[0]];
        request.extend_from_slice(&rest);
        request.extend_from_slice(&body);
        Some(request)
    } else {
        // ASCII: 18 header chars up to data-length, then data-length more
        let mut rest = [0u8; 17];
        stream.read_exact(&mut rest).ok()?;
        let mut request = vec![first[0]];
        request.extend_from_slice(&rest);
        let text = std::str::from_utf8(&request[14..18]).ok()?;
        let data_len = usize::from_str_radix(text, 16).ok()?;
        let mut body = vec![0u8; data_len];
        stream.read_exact(&mut body).ok()?;
        request.extend_from_slice(&body);
        Some(request)
    }
}

pub fn binary_response(completion: u16, payload: &[u8]) -> Vec<u8> {
    let data_len = u16::try_from(2 + payload.len()).expect("payload length");
    let mut frame = vec![0xD0, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00];
    frame.extend_from_slice(&data_len.to_le_bytes());
    frame.extend_from_slice(&completion.to_le_bytes());
    frame.extend_from_slice(payload);
    frame
}

pub fn ascii_response(completion: u16, payload: &str) -> Vec<u8> {
    let data_len = 4 + payload.len();
    format!("D00000FF03FF00{data_len:04X}{completion:04X}{payload}").into_bytes()
}

pub fn session_config(port: u16, series: PlcSeries, mode: CommunicationMode) -> SessionConfig {
    SessionConfig {
        host: "127.0.0.1".to_string(),
        port,
        timeout_250ms: 2,
        series,
        mode,
        ..SessionConfig::default()
    }
}

pub fn init_tracing() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
