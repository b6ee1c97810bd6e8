use thiserror::Error;

/// Error type shared by every fallible operation in this crate.
#[derive(Error, Debug)]
pub enum McError {
    /// User input violates a pre-condition (empty range, count mismatch,
    /// unsupported series combination, bad password, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Device prefix unknown, or not available on the selected PLC series.
    #[error("unsupported device: {0}")]
    UnsupportedDevice(String),

    /// Response bytes match neither frame encoding, or length fields are
    /// inconsistent with the received data.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// The PLC answered with a non-zero completion code.
    #[error("completion code 0x{completion_code:04X}: {diagnostic}")]
    Protocol {
        completion_code: u16,
        diagnostic: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Send or receive exceeded the session timeout. The connection is
    /// invalidated; reconnect before the next operation.
    #[error("transport timeout")]
    Timeout,

    /// Operation invoked before `connect`, or after a transport failure
    /// dropped the session.
    #[error("not connected")]
    NotConnected,

    /// A `DeviceValue` variant does not match its paired `ValueType`.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Decode ran out of words before the plan was satisfied.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Decode finished with unconsumed words left over.
    #[error("trailing data: {0}")]
    TrailingData(String),
}
