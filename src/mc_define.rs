//! 3E frame constants and the transfer-encoding selector.
//!
//! Only the 3E frame family is covered: a fixed request/response
//! subheader, a 5-byte access route (network, pc, module I/O, module
//! station), a data-length field and the monitoring timer, followed by
//! command / subcommand / payload. Frames exist in a binary and an
//! ASCII rendition; field widths double in ASCII.

use serde::{Deserialize, Serialize};

/// Request subheader, binary rendition (little-endian of 0x5000).
pub const SUBHEADER_REQUEST: [u8; 2] = [0x50, 0x00];

/// Response subheader, binary rendition.
pub const SUBHEADER_RESPONSE: [u8; 2] = [0xD0, 0x00];

/// Request subheader, ASCII rendition.
pub const SUBHEADER_REQUEST_ASCII: &str = "5000";

/// Response subheader, ASCII rendition.
pub const SUBHEADER_RESPONSE_ASCII: &str = "D000";

/// Binary request header: subheader(2) + route(5) + data-length(2) + timer(2).
pub const BINARY_REQUEST_HEADER_LEN: usize = 11;

/// Binary response header: subheader(2) + route(5) + data-length(2).
pub const BINARY_RESPONSE_HEADER_LEN: usize = 9;

/// ASCII request header: "5000" + route(10) + data-length(4) + timer(4).
pub const ASCII_REQUEST_HEADER_LEN: usize = 22;

/// ASCII response header: "D000" + route(10) + data-length(4).
pub const ASCII_RESPONSE_HEADER_LEN: usize = 18;

// Command codes.
pub const CMD_BATCH_READ: u16 = 0x0401;
pub const CMD_BATCH_WRITE: u16 = 0x1401;
pub const CMD_RANDOM_READ: u16 = 0x0403;
pub const CMD_RANDOM_WRITE: u16 = 0x1402;
pub const CMD_CPU_TYPE: u16 = 0x0101;
pub const CMD_REMOTE_RUN: u16 = 0x1001;
pub const CMD_REMOTE_STOP: u16 = 0x1002;
pub const CMD_REMOTE_PAUSE: u16 = 0x1003;
pub const CMD_REMOTE_LATCH_CLEAR: u16 = 0x1005;
pub const CMD_REMOTE_RESET: u16 = 0x1006;
pub const CMD_REMOTE_UNLOCK: u16 = 0x1630;
pub const CMD_REMOTE_LOCK: u16 = 0x1631;

/// Subcommand used by every command that has no series-specific variant.
pub const SUBCMD_NONE: u16 = 0x0000;

/// Completion code reported for a successful operation.
pub const COMPLETION_OK: u16 = 0x0000;

/// Transfer encoding of a session.
///
/// Binary carries little-endian fixed-width integers; ASCII carries
/// uppercase hexadecimal (or zero-padded decimal where a field's
/// natural base is 10) at twice the byte width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum CommunicationMode {
    #[default]
    Binary,
    Ascii,
}

impl CommunicationMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Ascii => "ascii",
        }
    }
}
