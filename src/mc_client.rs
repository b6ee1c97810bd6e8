//! High-level MC-protocol client for 3E sessions over TCP.
//!
//! `McClient` composes the device catalog, frame encoder/decoder and
//! value codec with a blocking transport. One client drives one
//! connection with one outstanding request at a time; operations are
//! synchronous and totally ordered by the calling thread.

use tracing::{debug, warn};

use crate::config::{AccessOption, SessionConfig};
use crate::device::{offset_device_name, DeviceAddress, DeviceRange, RandomDeviceRequest};
use crate::error::McError;
use crate::error_codes;
use crate::frame_decoder::{FrameDecoder, FrameResponse};
use crate::frame_encoder::{unpack_bits_binary, BodyBuf, FrameEncoder};
use crate::mc_define::{
    CommunicationMode, ASCII_RESPONSE_HEADER_LEN, BINARY_RESPONSE_HEADER_LEN, CMD_CPU_TYPE,
    CMD_REMOTE_LATCH_CLEAR, CMD_REMOTE_LOCK, CMD_REMOTE_PAUSE, CMD_REMOTE_RESET, CMD_REMOTE_RUN,
    CMD_REMOTE_STOP, CMD_REMOTE_UNLOCK, SUBCMD_NONE,
};
use crate::plc_series::PlcSeries;
use crate::runtime_control::{CpuInfo, RuntimeCommand, RuntimeControl};
use crate::transport::{hex_dump, TcpTransport};
use crate::value_codec::{
    required_words, DeviceReadPlan, DeviceValue, DeviceWritePlan, ValueCodec, ValueType,
};

/// Width class a plan entry occupies in a random access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WidthClass {
    Word,
    DWord,
    LWord,
    Bit,
}

fn width_class(value_type: ValueType) -> Result<WidthClass, McError> {
    match value_type {
        ValueType::Int16 | ValueType::UInt16 | ValueType::RawWords => Ok(WidthClass::Word),
        ValueType::Int32 | ValueType::UInt32 | ValueType::Float32 => Ok(WidthClass::DWord),
        ValueType::Int64 | ValueType::UInt64 | ValueType::Float64 => Ok(WidthClass::LWord),
        ValueType::BitArray => Ok(WidthClass::Bit),
        ValueType::AsciiString => Err(McError::InvalidArgument(
            "AsciiString cannot be used in random access".into(),
        )),
    }
}

// Group plan entries by width class, expanding RawWords into
// consecutive word devices so every wire access stays one word wide.
fn partition_plan<'a, I>(entries: I) -> Result<RandomDeviceRequest, McError>
where
    I: Iterator<Item = (&'a DeviceAddress, &'a crate::value_codec::ValueFormat)>,
{
    let mut request = RandomDeviceRequest::default();
    for (address, format) in entries {
        match width_class(format.value_type)? {
            WidthClass::Word => {
                if format.value_type == ValueType::RawWords {
                    let count = required_words(format)?;
                    for i in 0..count {
                        let name = offset_device_name(&address.name, i as u32)?;
                        request.word_devices.push(DeviceAddress {
                            name,
                            device_type: address.device_type,
                        });
                    }
                } else {
                    request.word_devices.push(address.clone());
                }
            }
            WidthClass::DWord => request.dword_devices.push(address.clone()),
            WidthClass::LWord => request.lword_devices.push(address.clone()),
            WidthClass::Bit => {
                if format.parameter != 1 {
                    return Err(McError::InvalidArgument(format!(
                        "random bit access is single-bit per device, got {} bits for {}",
                        format.parameter, address.name
                    )));
                }
                request.bit_devices.push(address.clone());
            }
        }
    }
    Ok(request)
}

fn payload_words(payload: &[u8], mode: CommunicationMode) -> Result<Vec<u16>, McError> {
    match mode {
        CommunicationMode::Binary => ValueCodec::from_binary_bytes(payload),
        CommunicationMode::Ascii => ValueCodec::from_ascii_words(payload),
    }
}

fn validate_password(password: &str, series: PlcSeries) -> Result<(), McError> {
    if !password.is_ascii() {
        return Err(McError::InvalidArgument(
            "password must be ASCII text".into(),
        ));
    }
    if series.is_iq_r() {
        if !(6..=32).contains(&password.len()) {
            return Err(McError::InvalidArgument(format!(
                "iQ-R password must be 6-32 characters, got {}",
                password.len()
            )));
        }
    } else if password.len() != 4 {
        return Err(McError::InvalidArgument(format!(
            "password must be exactly 4 characters on {} series, got {}",
            series.as_str(),
            password.len()
        )));
    }
    Ok(())
}

fn build_control_payload(
    control: &RuntimeControl,
    config: &SessionConfig,
) -> Result<(u16, Vec<u8>), McError> {
    let mut body = BodyBuf::new(config.mode);
    let command = match control.command {
        RuntimeCommand::Run => {
            let option = control.run_option.unwrap_or_default();
            body.push_uint(if option.force_exec { 0x0003 } else { 0x0001 }, 2)?;
            body.push_uint(u32::from(option.clear_mode.as_byte()), 1)?;
            body.push_uint(0, 1)?;
            CMD_REMOTE_RUN
        }
        RuntimeCommand::Pause => {
            let option = control.run_option.unwrap_or_default();
            body.push_uint(if option.force_exec { 0x0003 } else { 0x0001 }, 2)?;
            CMD_REMOTE_PAUSE
        }
        RuntimeCommand::Stop => {
            body.push_uint(0x0001, 2)?;
            CMD_REMOTE_STOP
        }
        RuntimeCommand::LatchClear => {
            body.push_uint(0x0001, 2)?;
            CMD_REMOTE_LATCH_CLEAR
        }
        RuntimeCommand::Reset => {
            body.push_uint(0x0001, 2)?;
            CMD_REMOTE_RESET
        }
        RuntimeCommand::Lock | RuntimeCommand::Unlock => {
            let password = control
                .lock_option
                .as_ref()
                .and_then(|o| o.password.as_deref())
                .ok_or_else(|| {
                    McError::InvalidArgument("LOCK/UNLOCK requires a password".into())
                })?;
            validate_password(password, config.series)?;
            body.push_uint(password.len() as u32, 2)?;
            body.push_verbatim(password.as_bytes())?;
            if control.command == RuntimeCommand::Lock {
                CMD_REMOTE_LOCK
            } else {
                CMD_REMOTE_UNLOCK
            }
        }
    };
    Ok((command, body.into_bytes()))
}

/// MC-protocol 3E client.
///
/// ```no_run
/// use melsec_mc3e::{make_device_range, McClient, SessionConfig};
///
/// # fn main() -> Result<(), melsec_mc3e::McError> {
/// let config = SessionConfig {
///     host: "192.168.1.10".to_string(),
///     port: 5007,
///     ..SessionConfig::default()
/// };
/// let mut client = McClient::new();
/// client.connect(&config)?;
/// let words = client.read_words(&make_device_range("D100", 10)?)?;
/// println!("D100..D109 = {words:?}");
/// client.disconnect();
/// # Ok(())
/// # }
/// ```
///
/// Interleaving operations from multiple threads on one client is not
/// supported; wrap the client in a mutex if it must be shared.
pub struct McClient {
    transport: TcpTransport,
    encoder: FrameEncoder,
    decoder: FrameDecoder,
    codec: ValueCodec,
    config: Option<SessionConfig>,
    option: AccessOption,
}

impl McClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            transport: TcpTransport::new(),
            encoder: FrameEncoder,
            decoder: FrameDecoder,
            codec: ValueCodec,
            config: None,
            option: AccessOption::default(),
        }
    }

    /// Validate the configuration and open the connection. The access
    /// option is re-seeded from the configuration.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad configuration, `Transport` when the
    /// endpoint cannot be reached.
    pub fn connect(&mut self, config: &SessionConfig) -> Result<(), McError> {
        config.validate()?;
        self.transport.connect(config)?;
        self.option = AccessOption::from_session(config);
        self.config = Some(config.clone());
        Ok(())
    }

    /// Close the connection. Idempotent.
    pub fn disconnect(&mut self) {
        self.transport.disconnect();
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Replace the access option; it applies to every subsequent
    /// operation until replaced again. Socket timeouts are re-derived
    /// immediately when connected.
    ///
    /// # Errors
    ///
    /// `Transport` when the socket rejects the new timeouts.
    pub fn set_access_option(&mut self, option: &AccessOption) -> Result<(), McError> {
        self.option = *option;
        if self.transport.is_connected() {
            let timeout = option.timeout_duration();
            self.transport.set_timeouts(timeout, timeout)?;
        }
        Ok(())
    }

    /// The access option currently applied to operations.
    #[must_use]
    pub fn access_option(&self) -> &AccessOption {
        &self.option
    }

    fn ensure_connected(&self) -> Result<(), McError> {
        if self.transport.is_connected() {
            Ok(())
        } else {
            Err(McError::NotConnected)
        }
    }

    fn effective_config(&self) -> Result<SessionConfig, McError> {
        let base = self.config.as_ref().ok_or(McError::NotConnected)?;
        Ok(base.with_option(&self.option))
    }

    fn exchange(
        &mut self,
        request: &[u8],
        mode: CommunicationMode,
    ) -> Result<Vec<u8>, McError> {
        debug!("[MC send] {}", hex_dump(request));
        self.transport.send_all(request)?;
        let frame = match mode {
            CommunicationMode::Binary => self
                .transport
                .receive_frame(BINARY_RESPONSE_HEADER_LEN, |header| {
                    Ok(usize::from(header[7]) | (usize::from(header[8]) << 8))
                })?,
            CommunicationMode::Ascii => self
                .transport
                .receive_frame(ASCII_RESPONSE_HEADER_LEN, |header| {
                    let text = std::str::from_utf8(&header[14..18]).map_err(|_| {
                        McError::InvalidFrame("ASCII data-length field is not UTF-8".into())
                    })?;
                    usize::from_str_radix(text, 16).map_err(|_| {
                        McError::InvalidFrame(format!("ASCII data-length is not hex: {text:?}"))
                    })
                })?,
        };
        debug!("[MC recv] {}", hex_dump(&frame));
        Ok(frame)
    }

    fn check_completion(response: &FrameResponse, mode: CommunicationMode) -> Result<(), McError> {
        if response.is_success() {
            return Ok(());
        }
        let code = response.completion_code;
        let rendered = match mode {
            CommunicationMode::Binary => hex_dump(&response.diagnostic_data),
            CommunicationMode::Ascii => {
                String::from_utf8_lossy(&response.diagnostic_data).into_owned()
            }
        };
        Err(McError::Protocol {
            completion_code: code,
            diagnostic: format!("{rendered}{}", error_codes::describe(code)),
        })
    }

    /// Batch-read word devices. Returns exactly `range.length` words.
    ///
    /// # Errors
    ///
    /// `NotConnected`, transport failures, `Protocol` on a non-zero
    /// completion code, `InsufficientData` when the PLC returned fewer
    /// words than requested.
    pub fn read_words(&mut self, range: &DeviceRange) -> Result<Vec<u16>, McError> {
        self.ensure_connected()?;
        let config = self.effective_config()?;
        let request = self.encoder.batch_read_request(&config, range)?;
        let frame = self.exchange(&request, config.mode)?;
        let response = self.decoder.parse_read_response(&frame)?;
        Self::check_completion(&response, config.mode)?;

        let mut words = payload_words(&response.device_data, config.mode)?;
        let expected = usize::from(range.length);
        if words.len() < expected {
            return Err(McError::InsufficientData(format!(
                "requested {expected} words, PLC returned {}",
                words.len()
            )));
        }
        words.truncate(expected);
        Ok(words)
    }

    /// Batch-read bit devices. Returns exactly `range.length` booleans.
    ///
    /// # Errors
    ///
    /// Same as [`Self::read_words`].
    pub fn read_bits(&mut self, range: &DeviceRange) -> Result<Vec<bool>, McError> {
        self.ensure_connected()?;
        let config = self.effective_config()?;
        let request = self.encoder.batch_read_request(&config, range)?;
        let frame = self.exchange(&request, config.mode)?;
        let response = self.decoder.parse_read_response(&frame)?;
        Self::check_completion(&response, config.mode)?;

        let expected = usize::from(range.length);
        match config.mode {
            CommunicationMode::Ascii => {
                // One character per bit, '1' means set.
                let payload = &response.device_data;
                if payload.len() < expected {
                    return Err(McError::InsufficientData(format!(
                        "requested {expected} bits, PLC returned {} characters",
                        payload.len()
                    )));
                }
                Ok(payload[..expected].iter().map(|c| *c == b'1').collect())
            }
            CommunicationMode::Binary if config.series.is_iq_r() => {
                // One 16-bit word per bit, low bit significant.
                let words = ValueCodec::from_binary_bytes(&response.device_data)?;
                if words.len() < expected {
                    return Err(McError::InsufficientData(format!(
                        "requested {expected} bits, PLC returned {} words",
                        words.len()
                    )));
                }
                Ok(words[..expected].iter().map(|w| w & 0x1 != 0).collect())
            }
            CommunicationMode::Binary => {
                let needed = (expected + 1) / 2;
                if response.device_data.len() < needed {
                    return Err(McError::InsufficientData(format!(
                        "requested {expected} bits, PLC returned {} bytes",
                        response.device_data.len()
                    )));
                }
                Ok(unpack_bits_binary(&response.device_data, expected))
            }
        }
    }

    /// Batch-write word devices.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when fewer than `range.length` values are
    /// supplied, plus the usual transport/protocol failures.
    pub fn write_words(&mut self, range: &DeviceRange, values: &[u16]) -> Result<(), McError> {
        self.ensure_connected()?;
        let config = self.effective_config()?;
        let request = self.encoder.batch_write_request(&config, range, values)?;
        let frame = self.exchange(&request, config.mode)?;
        let response = self.decoder.parse_write_response(&frame)?;
        Self::check_completion(&response, config.mode)
    }

    /// Batch-write bit devices.
    ///
    /// # Errors
    ///
    /// Same as [`Self::write_words`].
    pub fn write_bits(&mut self, range: &DeviceRange, values: &[bool]) -> Result<(), McError> {
        let raw: Vec<u16> = values.iter().map(|b| u16::from(*b)).collect();
        self.ensure_connected()?;
        let config = self.effective_config()?;
        let request = self.encoder.batch_write_request(&config, range, &raw)?;
        let frame = self.exchange(&request, config.mode)?;
        let response = self.decoder.parse_write_response(&frame)?;
        Self::check_completion(&response, config.mode)
    }

    /// Read scattered devices under a typed plan. Values come back in
    /// plan order.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for formats that have no random-access class
    /// (or multi-bit `BitArray` entries), plus the usual failures.
    pub fn random_read(&mut self, plan: &DeviceReadPlan) -> Result<Vec<DeviceValue>, McError> {
        self.ensure_connected()?;
        let config = self.effective_config()?;
        let request = partition_plan(plan.iter().map(|e| (&e.address, &e.format)))?;
        let encoded = self.encoder.random_read_request(&config, &request)?;
        let frame = self.exchange(&encoded, config.mode)?;
        let response = self.decoder.parse_read_response(&frame)?;
        Self::check_completion(&response, config.mode)?;

        let words = payload_words(&response.device_data, config.mode)?;
        let word_len = request.word_devices.len();
        let dword_len = request.dword_devices.len() * 2;
        let lword_len = request.lword_devices.len() * 4;
        let bit_len = request.bit_devices.len();
        let total = word_len + dword_len + lword_len + bit_len;
        if words.len() < total {
            return Err(McError::InsufficientData(format!(
                "random read expected {total} words, PLC returned {}",
                words.len()
            )));
        }
        if words.len() > total {
            return Err(McError::TrailingData(format!(
                "random read expected {total} words, PLC returned {}",
                words.len()
            )));
        }

        // The response stream is class-ordered (word, dword, lword,
        // bit); re-sequence it into plan order for the codec.
        let dword_base = word_len;
        let lword_base = dword_base + dword_len;
        let bit_base = lword_base + lword_len;
        let (mut wi, mut di, mut li, mut bi) = (0usize, 0usize, 0usize, 0usize);
        let mut ordered = Vec::with_capacity(total);
        for entry in plan {
            match width_class(entry.format.value_type)? {
                WidthClass::Word => {
                    let count = required_words(&entry.format)?;
                    ordered.extend_from_slice(&words[wi..wi + count]);
                    wi += count;
                }
                WidthClass::DWord => {
                    let at = dword_base + 2 * di;
                    ordered.extend_from_slice(&words[at..at + 2]);
                    di += 1;
                }
                WidthClass::LWord => {
                    let at = lword_base + 4 * li;
                    ordered.extend_from_slice(&words[at..at + 4]);
                    li += 1;
                }
                WidthClass::Bit => {
                    // The wire carries 0/1 in the LSB; the codec's bit
                    // layout keeps the even bit in the 0x10 nibble.
                    let raw = words[bit_base + bi];
                    ordered.push(if raw & 0x1 != 0 { 0x0010 } else { 0x0000 });
                    bi += 1;
                }
            }
        }
        self.codec.decode(plan, &ordered)
    }

    /// Write scattered devices under a typed plan.
    ///
    /// # Errors
    ///
    /// Same classes as [`Self::random_read`], plus `TypeMismatch` when
    /// a value does not match its format.
    pub fn random_write(&mut self, plan: &DeviceWritePlan) -> Result<(), McError> {
        self.ensure_connected()?;
        let config = self.effective_config()?;
        let request = partition_plan(plan.iter().map(|e| (&e.address, &e.format)))?;

        let mut word_data: Vec<u16> = Vec::new();
        let mut dword_data: Vec<u32> = Vec::new();
        let mut lword_data: Vec<u64> = Vec::new();
        let mut bit_data: Vec<bool> = Vec::new();
        for entry in plan {
            match width_class(entry.format.value_type)? {
                WidthClass::Word => {
                    let words = self.codec.encode(std::slice::from_ref(entry))?;
                    word_data.extend_from_slice(&words);
                }
                WidthClass::DWord => {
                    let words = self.codec.encode(std::slice::from_ref(entry))?;
                    dword_data.push(u32::from(words[0]) | (u32::from(words[1]) << 16));
                }
                WidthClass::LWord => {
                    let words = self.codec.encode(std::slice::from_ref(entry))?;
                    lword_data.push(
                        u64::from(words[0])
                            | (u64::from(words[1]) << 16)
                            | (u64::from(words[2]) << 32)
                            | (u64::from(words[3]) << 48),
                    );
                }
                WidthClass::Bit => {
                    let DeviceValue::BitArray(bits) = &entry.value else {
                        return Err(McError::TypeMismatch(format!(
                            "device {}: expected BitArray, got {:?}",
                            entry.address.name, entry.value
                        )));
                    };
                    if bits.len() != 1 {
                        return Err(McError::InvalidArgument(format!(
                            "random bit write is single-bit per device, got {} bits",
                            bits.len()
                        )));
                    }
                    bit_data.push(bits[0]);
                }
            }
        }

        let encoded = self.encoder.random_write_request(
            &config,
            &request,
            &word_data,
            &dword_data,
            &lword_data,
            &bit_data,
        )?;
        let frame = self.exchange(&encoded, config.mode)?;
        let response = self.decoder.parse_write_response(&frame)?;
        Self::check_completion(&response, config.mode)
    }

    /// Query the CPU model: 16 characters of type name (right-trimmed)
    /// plus the 4-hex-digit CPU code.
    ///
    /// # Errors
    ///
    /// The usual transport/protocol failures; `InsufficientData` when
    /// the reply is shorter than the fixed layout.
    pub fn read_cpu_type(&mut self) -> Result<CpuInfo, McError> {
        self.ensure_connected()?;
        let config = self.effective_config()?;
        let request = self
            .encoder
            .simple_command_request(&config, CMD_CPU_TYPE, SUBCMD_NONE, &[])?;
        let frame = self.exchange(&request, config.mode)?;
        let response = self.decoder.parse_read_response(&frame)?;
        Self::check_completion(&response, config.mode)?;

        let payload = &response.device_data;
        let (type_len, code_len) = match config.mode {
            CommunicationMode::Binary => (16usize, 2usize),
            CommunicationMode::Ascii => (16usize, 4usize),
        };
        if payload.len() < type_len + code_len {
            return Err(McError::InsufficientData(format!(
                "CPU type reply is {} bytes, expected at least {}",
                payload.len(),
                type_len + code_len
            )));
        }
        let cpu_type = String::from_utf8_lossy(&payload[..type_len])
            .trim_end_matches(' ')
            .to_string();
        let cpu_code = match config.mode {
            CommunicationMode::Binary => {
                format!(
                    "{:04X}",
                    u16::from_le_bytes([payload[type_len], payload[type_len + 1]])
                )
            }
            CommunicationMode::Ascii => {
                String::from_utf8_lossy(&payload[type_len..type_len + code_len]).into_owned()
            }
        };
        Ok(CpuInfo { cpu_type, cpu_code })
    }

    /// Issue a runtime-control command (RUN/STOP/PAUSE/RESET/latch
    /// clear/LOCK/UNLOCK). RESET tolerates a receive timeout because
    /// the CPU may drop the connection before replying.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for bad command parameters (notably password
    /// constraints), plus the usual transport/protocol failures.
    pub fn apply_runtime_control(&mut self, control: &RuntimeControl) -> Result<(), McError> {
        self.ensure_connected()?;
        let config = self.effective_config()?;
        let (command, payload) = build_control_payload(control, &config)?;
        let request = self
            .encoder
            .simple_command_request(&config, command, SUBCMD_NONE, &payload)?;
        let frame = match self.exchange(&request, config.mode) {
            Ok(frame) => frame,
            Err(McError::Timeout) if control.command == RuntimeCommand::Reset => {
                warn!("RESET got no reply before the timeout; the CPU is likely restarting");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        let response = self.decoder.parse_write_response(&frame)?;
        Self::check_completion(&response, config.mode)
    }
}

impl Default for McClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for McClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McClient")
            .field("transport", &self.transport)
            .field("config", &self.config)
            .finish()
    }
}
