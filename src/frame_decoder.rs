//! Frame Decoder: parses 3E response frames into a completion code and
//! payload bytes, tolerating both transfer encodings.
//!
//! The encoding is detected from the leading bytes: `"D000"` means
//! ASCII, `D0 00` means binary, anything else is rejected.

use crate::error::McError;
use crate::mc_define::{
    ASCII_RESPONSE_HEADER_LEN, BINARY_RESPONSE_HEADER_LEN, SUBHEADER_RESPONSE,
    SUBHEADER_RESPONSE_ASCII,
};

/// Decoded 3E response. The payload lands in `device_data` for a
/// successful read and in `diagnostic_data` otherwise; write responses
/// always treat the payload as diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameResponse {
    pub completion_code: u16,
    pub device_data: Vec<u8>,
    pub diagnostic_data: Vec<u8>,
}

impl FrameResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.completion_code == 0
    }
}

fn read_le16(frame: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([frame[offset], frame[offset + 1]])
}

fn read_hex_ascii(frame: &[u8], offset: usize, length: usize) -> Result<u32, McError> {
    let slice = frame
        .get(offset..offset + length)
        .ok_or_else(|| McError::InvalidFrame("ASCII field out of range".into()))?;
    let text = std::str::from_utf8(slice)
        .map_err(|_| McError::InvalidFrame("ASCII field is not valid UTF-8".into()))?;
    u32::from_str_radix(text, 16)
        .map_err(|_| McError::InvalidFrame(format!("ASCII field is not hex: {text:?}")))
}

fn is_ascii_frame(frame: &[u8]) -> bool {
    frame.len() >= 4 && &frame[..4] == SUBHEADER_RESPONSE_ASCII.as_bytes()
}

fn is_binary_frame(frame: &[u8]) -> bool {
    frame.len() >= 2 && frame[..2] == SUBHEADER_RESPONSE
}

fn parse_binary(frame: &[u8]) -> Result<(u16, Vec<u8>), McError> {
    const COMPLETION_SIZE: usize = 2;
    if frame.len() < BINARY_RESPONSE_HEADER_LEN + COMPLETION_SIZE {
        return Err(McError::InvalidFrame(format!(
            "binary frame too short: {} bytes",
            frame.len()
        )));
    }
    let data_length = usize::from(read_le16(frame, 7));
    if data_length < COMPLETION_SIZE {
        return Err(McError::InvalidFrame(
            "binary frame reports a data section shorter than the completion code".into(),
        ));
    }
    if frame.len() != BINARY_RESPONSE_HEADER_LEN + data_length {
        return Err(McError::InvalidFrame(format!(
            "binary frame length {} disagrees with declared data length {data_length}",
            frame.len()
        )));
    }
    let completion = read_le16(frame, BINARY_RESPONSE_HEADER_LEN);
    let payload = frame[BINARY_RESPONSE_HEADER_LEN + COMPLETION_SIZE..].to_vec();
    Ok((completion, payload))
}

fn parse_ascii(frame: &[u8]) -> Result<(u16, Vec<u8>), McError> {
    const COMPLETION_SIZE: usize = 4;
    if frame.len() < ASCII_RESPONSE_HEADER_LEN + COMPLETION_SIZE {
        return Err(McError::InvalidFrame(format!(
            "ASCII frame too short: {} chars",
            frame.len()
        )));
    }
    let data_length = read_hex_ascii(frame, 14, 4)? as usize;
    if data_length < COMPLETION_SIZE {
        return Err(McError::InvalidFrame(
            "ASCII frame reports a data section shorter than the completion code".into(),
        ));
    }
    if frame.len() != ASCII_RESPONSE_HEADER_LEN + data_length {
        return Err(McError::InvalidFrame(format!(
            "ASCII frame length {} disagrees with declared data length {data_length}",
            frame.len()
        )));
    }
    let completion = read_hex_ascii(frame, ASCII_RESPONSE_HEADER_LEN, COMPLETION_SIZE)? as u16;
    let payload = frame[ASCII_RESPONSE_HEADER_LEN + COMPLETION_SIZE..].to_vec();
    Ok((completion, payload))
}

fn parse_frame_data(frame: &[u8]) -> Result<(u16, Vec<u8>), McError> {
    if is_ascii_frame(frame) {
        parse_ascii(frame)
    } else if is_binary_frame(frame) {
        parse_binary(frame)
    } else {
        Err(McError::InvalidFrame(
            "response does not start with a 3E subheader".into(),
        ))
    }
}

/// Stateless 3E response parser; one instance serves a whole session.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameDecoder;

impl FrameDecoder {
    /// Parse a response to a read-class command. The payload is device
    /// data on success, diagnostic data on a non-zero completion.
    ///
    /// # Errors
    ///
    /// `InvalidFrame` when the bytes match neither encoding or the
    /// declared lengths are inconsistent.
    pub fn parse_read_response(&self, frame: &[u8]) -> Result<FrameResponse, McError> {
        let (completion_code, payload) = parse_frame_data(frame)?;
        let mut response = FrameResponse {
            completion_code,
            ..FrameResponse::default()
        };
        if completion_code == 0 {
            response.device_data = payload;
        } else {
            response.diagnostic_data = payload;
        }
        Ok(response)
    }

    /// Parse a response to a write-class command. Any payload is
    /// diagnostic data regardless of the completion code.
    ///
    /// # Errors
    ///
    /// Same as [`Self::parse_read_response`].
    pub fn parse_write_response(&self, frame: &[u8]) -> Result<FrameResponse, McError> {
        let (completion_code, payload) = parse_frame_data(frame)?;
        Ok(FrameResponse {
            completion_code,
            device_data: Vec::new(),
            diagnostic_data: payload,
        })
    }
}
