#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::doc_markdown
)]

//! melsec_mc3e
//!
//! Client library for the MELSEC MC protocol, 3E frame family, over
//! TCP. It reads and writes device memory on Mitsubishi-class PLCs
//! (Q / L / QnA / iQ-L / iQ-R) in both the binary and the ASCII
//! transfer encoding.
//!
//! Main features:
//! - batch (contiguous) and random (scattered) access to word and bit
//!   devices
//! - a typed value codec: 16/32/64-bit integers, 32/64-bit floats,
//!   ASCII strings, raw word runs and bit arrays
//! - remote CPU control (RUN / STOP / PAUSE / RESET / latch clear /
//!   LOCK / UNLOCK) and the CPU-type query
//!
//! ```no_run
//! use melsec_mc3e::{make_device_range, McClient, SessionConfig};
//!
//! # fn main() -> Result<(), melsec_mc3e::McError> {
//! let config = SessionConfig {
//!     host: "192.168.1.10".to_string(),
//!     port: 5007,
//!     ..SessionConfig::default()
//! };
//! let mut client = McClient::new();
//! client.connect(&config)?;
//! let words = client.read_words(&make_device_range("D100", 10)?)?;
//! client.disconnect();
//! # Ok(())
//! # }
//! ```
//!
//! One client owns one connection and one outstanding request; every
//! operation is synchronous and honors the session's 250 ms-tick
//! monitoring timer.

pub mod config;
pub mod device;
pub mod device_code;
pub mod error;
pub mod error_codes;
pub mod frame_decoder;
pub mod frame_encoder;
pub mod mc_client;
pub mod mc_define;
pub mod plc_series;
pub mod runtime_control;
pub mod toml_helpers;
pub mod transport;
pub mod value_codec;

pub use config::{AccessOption, SessionConfig};
pub use device::{
    is_valid_device_name, make_device_address, make_device_range, normalize_device_name,
    DeviceAddress, DeviceRange, DeviceType, RandomDeviceRequest,
};
pub use error::McError;
pub use frame_decoder::{FrameDecoder, FrameResponse};
pub use frame_encoder::FrameEncoder;
pub use mc_client::McClient;
pub use mc_define::CommunicationMode;
pub use plc_series::PlcSeries;
pub use runtime_control::{
    ClearMode, CpuInfo, RuntimeCommand, RuntimeControl, RuntimeLockOption, RuntimeRunOption,
};
pub use transport::TcpTransport;
pub use value_codec::{
    DeviceReadPlan, DeviceReadPlanEntry, DeviceValue, DeviceWritePlan, DeviceWritePlanEntry,
    ValueCodec, ValueFormat, ValueType,
};
