//! Frame Encoder: builds fully-formed 3E request frames, binary or
//! ASCII, for every supported operation.
//!
//! Binary and ASCII differ only in field widths and digit encoding, so
//! every command body has a single definition written against
//! [`BodyBuf`], which renders each appended field for the session's
//! mode. `into_frame` then prepends the common 3E header.

use crate::config::SessionConfig;
use crate::device::{device_number, DeviceRange, DeviceType, RandomDeviceRequest};
use crate::device_code::{resolve_ascii, resolve_binary, NumberBase};
use crate::error::McError;
use crate::mc_define::{
    CommunicationMode, CMD_BATCH_READ, CMD_BATCH_WRITE, CMD_RANDOM_READ, CMD_RANDOM_WRITE,
    SUBHEADER_REQUEST, SUBHEADER_REQUEST_ASCII,
};
use crate::plc_series::PlcSeries;

/// Mode-parameterized request-body accumulator.
pub(crate) enum BodyBuf {
    Binary(Vec<u8>),
    Ascii(String),
}

impl BodyBuf {
    pub(crate) fn new(mode: CommunicationMode) -> Self {
        match mode {
            CommunicationMode::Binary => Self::Binary(Vec::new()),
            CommunicationMode::Ascii => Self::Ascii(String::new()),
        }
    }

    /// Append an unsigned field: `byte_width` little-endian bytes, or
    /// `2 * byte_width` uppercase hex characters.
    pub(crate) fn push_uint(&mut self, value: u32, byte_width: usize) -> Result<(), McError> {
        if byte_width < 4 && value >> (8 * byte_width) != 0 {
            return Err(McError::InvalidArgument(format!(
                "value 0x{value:X} does not fit into {byte_width} bytes"
            )));
        }
        match self {
            Self::Binary(buf) => {
                for i in 0..byte_width {
                    buf.push(((value >> (8 * i)) & 0xFF) as u8);
                }
            }
            Self::Ascii(text) => {
                let width = byte_width * 2;
                text.push_str(&format!("{value:0width$X}"));
            }
        }
        Ok(())
    }

    /// Append a 64-bit value: 8 little-endian bytes or 16 hex chars.
    pub(crate) fn push_u64(&mut self, value: u64) {
        match self {
            Self::Binary(buf) => buf.extend_from_slice(&value.to_le_bytes()),
            Self::Ascii(text) => text.push_str(&format!("{value:016X}")),
        }
    }

    fn push_device_number(
        &mut self,
        name: &str,
        number: u32,
        base: NumberBase,
        byte_width: usize,
        char_width: usize,
    ) -> Result<(), McError> {
        match self {
            Self::Binary(_) => {
                if byte_width < 4 && number >> (8 * byte_width) != 0 {
                    return Err(McError::InvalidArgument(format!(
                        "device number of {name} exceeds the {byte_width}-byte field"
                    )));
                }
                self.push_uint(number, byte_width)
            }
            Self::Ascii(text) => {
                let rendered = match base {
                    NumberBase::Decimal => format!("{number:0char_width$}"),
                    NumberBase::Hexadecimal => format!("{number:0char_width$X}"),
                };
                if rendered.len() > char_width {
                    return Err(McError::InvalidArgument(format!(
                        "device number of {name} exceeds the {char_width}-char field"
                    )));
                }
                text.push_str(&rendered);
                Ok(())
            }
        }
    }

    /// Append a device field (number + code for binary, code + number
    /// for ASCII) resolved against the catalog.
    pub(crate) fn push_device(&mut self, series: PlcSeries, name: &str) -> Result<(), McError> {
        let number = device_number(name)?;
        match self {
            Self::Binary(_) => {
                let info = resolve_binary(series, name)?;
                self.push_device_number(name, number, info.number_base, info.number_width, 0)?;
                self.push_uint(u32::from(info.code), info.code_width)
            }
            Self::Ascii(_) => {
                let info = resolve_ascii(series, name)?;
                let Self::Ascii(text) = self else { unreachable!() };
                text.push_str(&info.code);
                self.push_device_number(name, number, info.number_base, 0, info.number_width)
            }
        }
    }

    /// Append caller-provided payload verbatim. In ASCII mode the bytes
    /// must already be ASCII characters.
    pub(crate) fn push_verbatim(&mut self, payload: &[u8]) -> Result<(), McError> {
        match self {
            Self::Binary(buf) => buf.extend_from_slice(payload),
            Self::Ascii(text) => {
                if !payload.is_ascii() {
                    return Err(McError::InvalidArgument(
                        "ASCII command payload contains non-ASCII bytes".into(),
                    ));
                }
                text.push_str(std::str::from_utf8(payload).map_err(|_| {
                    McError::InvalidArgument("ASCII command payload is not valid UTF-8".into())
                })?);
            }
        }
        Ok(())
    }

    fn push_bit_values(&mut self, values: &[u16], series: PlcSeries, length: usize) {
        match self {
            Self::Binary(buf) => {
                if series.is_iq_r() {
                    // iQ-R keeps a full 16-bit word per bit point.
                    for v in &values[..length] {
                        let word: u16 = u16::from(*v != 0);
                        buf.extend_from_slice(&word.to_le_bytes());
                    }
                } else {
                    buf.extend_from_slice(&pack_bits_binary(values, length));
                }
            }
            Self::Ascii(text) => {
                for v in &values[..length] {
                    if series.is_iq_r() {
                        text.push_str(if *v != 0 { "0001" } else { "0000" });
                    } else {
                        text.push(if *v != 0 { '1' } else { '0' });
                    }
                }
            }
        }
    }

    /// The accumulated body without a frame header (used for the raw
    /// payloads of simple commands).
    pub(crate) fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Binary(buf) => buf,
            Self::Ascii(text) => text.into_bytes(),
        }
    }

    /// Prepend the common 3E header and return the finished frame.
    pub(crate) fn into_frame(self, config: &SessionConfig) -> Result<Vec<u8>, McError> {
        match self {
            Self::Binary(body) => {
                let data_len = u16::try_from(2 + body.len()).map_err(|_| {
                    McError::InvalidArgument("request body exceeds the 3E length field".into())
                })?;
                let mut frame = Vec::with_capacity(11 + body.len());
                frame.extend_from_slice(&SUBHEADER_REQUEST);
                frame.push(config.network);
                frame.push(config.pc);
                frame.extend_from_slice(&config.module_io.to_le_bytes());
                frame.push(config.module_station);
                frame.extend_from_slice(&data_len.to_le_bytes());
                frame.extend_from_slice(&config.timeout_250ms.to_le_bytes());
                frame.extend_from_slice(&body);
                Ok(frame)
            }
            Self::Ascii(body) => {
                let data_len = u32::try_from(4 + body.len())
                    .ok()
                    .filter(|v| *v <= u32::from(u16::MAX))
                    .ok_or_else(|| {
                        McError::InvalidArgument("request body exceeds the 3E length field".into())
                    })?;
                let mut frame = String::with_capacity(22 + body.len());
                frame.push_str(SUBHEADER_REQUEST_ASCII);
                frame.push_str(&format!("{:02X}", config.network));
                frame.push_str(&format!("{:02X}", config.pc));
                frame.push_str(&format!("{:04X}", config.module_io));
                frame.push_str(&format!("{:02X}", config.module_station));
                frame.push_str(&format!("{data_len:04X}"));
                frame.push_str(&format!("{:04X}", config.timeout_250ms));
                frame.push_str(&body);
                Ok(frame.into_bytes())
            }
        }
    }
}

/// Pack bits two-per-byte: even index in the upper nibble (0x10), odd
/// index in the lower nibble (0x01). Pre-iQ-R binary layout.
pub(crate) fn pack_bits_binary(values: &[u16], length: usize) -> Vec<u8> {
    let mut packed = vec![0u8; (length + 1) / 2];
    for (idx, v) in values[..length].iter().enumerate() {
        if *v != 0 {
            packed[idx / 2] |= if idx % 2 == 0 { 0x10 } else { 0x01 };
        }
    }
    packed
}

/// Inverse of [`pack_bits_binary`].
pub(crate) fn unpack_bits_binary(bytes: &[u8], length: usize) -> Vec<bool> {
    let mut bits = Vec::with_capacity(length);
    for (i, byte) in bytes.iter().enumerate() {
        let even_index = 2 * i;
        if even_index < length {
            bits.push((byte >> 4) & 0x1 != 0);
        }
        let odd_index = even_index + 1;
        if odd_index < length {
            bits.push(byte & 0x1 != 0);
        }
    }
    bits
}

const fn sequential_subcommand(device_type: DeviceType, series: PlcSeries) -> u16 {
    match device_type {
        DeviceType::Bit => {
            if series.is_iq_r() {
                0x0003
            } else {
                0x0001
            }
        }
        DeviceType::Word | DeviceType::DoubleWord => {
            if series.is_iq_r() {
                0x0002
            } else {
                0x0000
            }
        }
    }
}

const fn random_subcommand(series: PlcSeries) -> u16 {
    if series.is_iq_r() {
        0x0002
    } else {
        0x0000
    }
}

/// Stateless 3E request builder; one instance serves a whole session.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameEncoder;

impl FrameEncoder {
    /// Batch (contiguous) read request.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` on a zero-length range, `UnsupportedDevice` on
    /// catalog misses.
    pub fn batch_read_request(
        &self,
        config: &SessionConfig,
        range: &DeviceRange,
    ) -> Result<Vec<u8>, McError> {
        if range.length == 0 {
            return Err(McError::InvalidArgument(
                "device range length must be greater than zero".into(),
            ));
        }
        let subcommand = sequential_subcommand(range.head.device_type, config.series);
        let mut body = BodyBuf::new(config.mode);
        body.push_uint(u32::from(CMD_BATCH_READ), 2)?;
        body.push_uint(u32::from(subcommand), 2)?;
        body.push_device(config.series, &range.head.name)?;
        body.push_uint(u32::from(range.length), 2)?;
        body.into_frame(config)
    }

    /// Batch (contiguous) write request. Word values occupy one word
    /// each; bit values (0/1 per element) use the per-series packing.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` on a zero-length range or when fewer values
    /// than `range.length` are supplied.
    pub fn batch_write_request(
        &self,
        config: &SessionConfig,
        range: &DeviceRange,
        values: &[u16],
    ) -> Result<Vec<u8>, McError> {
        if range.length == 0 {
            return Err(McError::InvalidArgument(
                "device range length must be greater than zero".into(),
            ));
        }
        let length = usize::from(range.length);
        if values.len() < length {
            return Err(McError::InvalidArgument(format!(
                "write needs {length} values, got {}",
                values.len()
            )));
        }
        let subcommand = sequential_subcommand(range.head.device_type, config.series);
        let mut body = BodyBuf::new(config.mode);
        body.push_uint(u32::from(CMD_BATCH_WRITE), 2)?;
        body.push_uint(u32::from(subcommand), 2)?;
        body.push_device(config.series, &range.head.name)?;
        body.push_uint(u32::from(range.length), 2)?;
        if range.head.device_type == DeviceType::Bit {
            body.push_bit_values(values, config.series, length);
        } else {
            for v in &values[..length] {
                body.push_uint(u32::from(*v), 2)?;
            }
        }
        body.into_frame(config)
    }

    /// Random (scattered) read request. Lword and bit devices are an
    /// iQ-R capability; their fields follow the dword sequence in class
    /// order.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` on an empty request, an lword/bit device off
    /// iQ-R, or a class exceeding 255 devices.
    pub fn random_read_request(
        &self,
        config: &SessionConfig,
        request: &RandomDeviceRequest,
    ) -> Result<Vec<u8>, McError> {
        if request.is_empty() {
            return Err(McError::InvalidArgument(
                "random read requires at least one device".into(),
            ));
        }
        Self::check_random_series(config.series, request)?;
        let word_count = Self::class_count(request.word_devices.len(), "word")?;
        let dword_count = Self::class_count(request.dword_devices.len(), "dword")?;

        let mut body = BodyBuf::new(config.mode);
        body.push_uint(u32::from(CMD_RANDOM_READ), 2)?;
        body.push_uint(u32::from(random_subcommand(config.series)), 2)?;
        body.push_uint(u32::from(word_count), 1)?;
        body.push_uint(u32::from(dword_count), 1)?;
        for device in request
            .word_devices
            .iter()
            .chain(&request.dword_devices)
            .chain(&request.lword_devices)
            .chain(&request.bit_devices)
        {
            body.push_device(config.series, &device.name)?;
        }
        body.into_frame(config)
    }

    /// Random (scattered) write request: interleaved (device, value)
    /// pairs per class, word values 2 bytes, dword 4, lword 8, bit 2
    /// (0/1), concatenated word, dword, lword, bit.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` on an empty request, a device/value count
    /// mismatch in any class, or lword/bit devices off iQ-R.
    pub fn random_write_request(
        &self,
        config: &SessionConfig,
        request: &RandomDeviceRequest,
        word_data: &[u16],
        dword_data: &[u32],
        lword_data: &[u64],
        bit_data: &[bool],
    ) -> Result<Vec<u8>, McError> {
        if request.is_empty() {
            return Err(McError::InvalidArgument(
                "random write requires at least one device".into(),
            ));
        }
        Self::check_random_series(config.series, request)?;
        Self::check_pairing(request.word_devices.len(), word_data.len(), "word")?;
        Self::check_pairing(request.dword_devices.len(), dword_data.len(), "dword")?;
        Self::check_pairing(request.lword_devices.len(), lword_data.len(), "lword")?;
        Self::check_pairing(request.bit_devices.len(), bit_data.len(), "bit")?;
        let word_count = Self::class_count(request.word_devices.len(), "word")?;
        let dword_count = Self::class_count(request.dword_devices.len(), "dword")?;

        let mut body = BodyBuf::new(config.mode);
        body.push_uint(u32::from(CMD_RANDOM_WRITE), 2)?;
        body.push_uint(u32::from(random_subcommand(config.series)), 2)?;
        body.push_uint(u32::from(word_count), 1)?;
        body.push_uint(u32::from(dword_count), 1)?;
        for (device, value) in request.word_devices.iter().zip(word_data) {
            body.push_device(config.series, &device.name)?;
            body.push_uint(u32::from(*value), 2)?;
        }
        for (device, value) in request.dword_devices.iter().zip(dword_data) {
            body.push_device(config.series, &device.name)?;
            body.push_uint(*value, 4)?;
        }
        for (device, value) in request.lword_devices.iter().zip(lword_data) {
            body.push_device(config.series, &device.name)?;
            body.push_u64(*value);
        }
        for (device, value) in request.bit_devices.iter().zip(bit_data) {
            body.push_device(config.series, &device.name)?;
            body.push_uint(u32::from(*value), 2)?;
        }
        body.into_frame(config)
    }

    /// Catch-all request for the CPU-type query and the runtime-control
    /// commands: command, subcommand, then `payload` appended verbatim
    /// (binary bytes, or ASCII characters in ASCII mode).
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when an ASCII-mode payload is not ASCII text.
    pub fn simple_command_request(
        &self,
        config: &SessionConfig,
        command: u16,
        subcommand: u16,
        payload: &[u8],
    ) -> Result<Vec<u8>, McError> {
        let mut body = BodyBuf::new(config.mode);
        body.push_uint(u32::from(command), 2)?;
        body.push_uint(u32::from(subcommand), 2)?;
        body.push_verbatim(payload)?;
        body.into_frame(config)
    }

    fn check_random_series(
        series: PlcSeries,
        request: &RandomDeviceRequest,
    ) -> Result<(), McError> {
        if !series.is_iq_r() && !request.lword_devices.is_empty() {
            return Err(McError::InvalidArgument(format!(
                "random lword access is not supported on {} series",
                series.as_str()
            )));
        }
        if !series.is_iq_r() && !request.bit_devices.is_empty() {
            return Err(McError::InvalidArgument(format!(
                "random bit access is not supported on {} series",
                series.as_str()
            )));
        }
        Ok(())
    }

    fn check_pairing(devices: usize, values: usize, class: &str) -> Result<(), McError> {
        if devices != values {
            return Err(McError::InvalidArgument(format!(
                "{class} device/value count mismatch: {devices} devices, {values} values"
            )));
        }
        Ok(())
    }

    fn class_count(count: usize, class: &str) -> Result<u8, McError> {
        u8::try_from(count).map_err(|_| {
            McError::InvalidArgument(format!("{class} device count exceeds 255: {count}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{make_device_address, make_device_range};
    use crate::mc_define::{CMD_CPU_TYPE, SUBCMD_NONE};

    fn config(series: PlcSeries, mode: CommunicationMode) -> SessionConfig {
        SessionConfig {
            host: "192.168.1.10".to_string(),
            port: 5007,
            series,
            mode,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_iq_r_binary_batch_read_frame() {
        let encoder = FrameEncoder;
        let range = make_device_range("D100", 2).expect("range");
        let frame = encoder
            .batch_read_request(&config(PlcSeries::IqR, CommunicationMode::Binary), &range)
            .expect("encode");
        assert_eq!(
            frame,
            vec![
                0x50, 0x00, 0x00, 0xFF, 0xFF, 0x03, 0x00, 0x0E, 0x00, 0x04, 0x00, // header
                0x01, 0x04, 0x02, 0x00, // command + subcommand
                0x64, 0x00, 0x00, 0x00, 0xA8, 0x00, // D100, 4-byte number + 2-byte code
                0x02, 0x00, // length
            ]
        );
        // Declared data length covers timer + body.
        let declared = u16::from_le_bytes([frame[7], frame[8]]);
        assert_eq!(usize::from(declared), frame.len() - 9);
    }

    #[test]
    fn test_q_ascii_batch_read_frame() {
        let encoder = FrameEncoder;
        let range = make_device_range("D123", 10).expect("range");
        let frame = encoder
            .batch_read_request(&config(PlcSeries::Q, CommunicationMode::Ascii), &range)
            .expect("encode");
        let text = String::from_utf8(frame).expect("ascii frame");
        assert_eq!(text, "500000FF03FF000018000404010000D*000123000A");
        // Declared data length covers timer + body.
        let declared = usize::from_str_radix(&text[14..18], 16).expect("length");
        assert_eq!(declared, text.len() - 18);
    }

    #[test]
    fn test_iq_r_ascii_device_field() {
        let encoder = FrameEncoder;
        let range = make_device_range("D123", 10).expect("range");
        let frame = encoder
            .batch_read_request(&config(PlcSeries::IqR, CommunicationMode::Ascii), &range)
            .expect("encode");
        let text = String::from_utf8(frame).expect("ascii frame");
        assert_eq!(&text[22..26], "0401");
        assert_eq!(&text[26..30], "0002");
        assert_eq!(&text[30..34], "D***");
        assert_eq!(&text[34..42], "00000123");
        assert_eq!(&text[42..46], "000A");
    }

    #[test]
    fn test_binary_device_field_widths() {
        let encoder = FrameEncoder;
        let range = make_device_range("D1", 1).expect("range");
        let q_frame = encoder
            .batch_read_request(&config(PlcSeries::Q, CommunicationMode::Binary), &range)
            .expect("encode");
        // body: cmd(2) + sub(2) + number(3) + code(1) + length(2)
        assert_eq!(q_frame.len(), 11 + 10);
        let iqr_frame = encoder
            .batch_read_request(&config(PlcSeries::IqR, CommunicationMode::Binary), &range)
            .expect("encode");
        // body: cmd(2) + sub(2) + number(4) + code(2) + length(2)
        assert_eq!(iqr_frame.len(), 11 + 12);
    }

    #[test]
    fn test_hex_device_rendered_in_hex() {
        let encoder = FrameEncoder;
        let range = make_device_range("W1FFF", 1).expect("range");
        let frame = encoder
            .batch_read_request(&config(PlcSeries::Q, CommunicationMode::Ascii), &range)
            .expect("encode");
        let text = String::from_utf8(frame).expect("ascii frame");
        assert_eq!(&text[30..32], "W*");
        assert_eq!(&text[32..38], "001FFF");
    }

    #[test]
    fn test_longest_prefix_in_encoded_frame() {
        let encoder = FrameEncoder;
        let range = make_device_range("ZR100", 1).expect("range");
        let frame = encoder
            .batch_read_request(&config(PlcSeries::Q, CommunicationMode::Binary), &range)
            .expect("encode");
        // number 0x100 (ZR is hexadecimal), then code 0xB0, never Z (0xCC)
        assert_eq!(&frame[15..19], &[0x00, 0x01, 0x00, 0xB0]);
    }

    #[test]
    fn test_batch_write_words_binary() {
        let encoder = FrameEncoder;
        let range = make_device_range("D200", 2).expect("range");
        let frame = encoder
            .batch_write_request(
                &config(PlcSeries::Q, CommunicationMode::Binary),
                &range,
                &[0x1234, 0x5678],
            )
            .expect("encode");
        assert_eq!(&frame[frame.len() - 4..], &[0x34, 0x12, 0x78, 0x56]);
        assert_eq!(&frame[11..13], &[0x01, 0x14]);
    }

    #[test]
    fn test_batch_write_bits_binary_packing() {
        let encoder = FrameEncoder;
        let range = make_device_range("M0", 3).expect("range");
        let q_frame = encoder
            .batch_write_request(
                &config(PlcSeries::Q, CommunicationMode::Binary),
                &range,
                &[1, 0, 1],
            )
            .expect("encode");
        // ceil(3/2) bytes, even bits in the upper nibble
        assert_eq!(&q_frame[q_frame.len() - 2..], &[0x10, 0x10]);

        let iqr_frame = encoder
            .batch_write_request(
                &config(PlcSeries::IqR, CommunicationMode::Binary),
                &range,
                &[1, 0, 1],
            )
            .expect("encode");
        // one 16-bit word per bit on iQ-R
        assert_eq!(
            &iqr_frame[iqr_frame.len() - 6..],
            &[0x01, 0x00, 0x00, 0x00, 0x01, 0x00]
        );
    }

    #[test]
    fn test_batch_write_bits_ascii() {
        let encoder = FrameEncoder;
        let range = make_device_range("M0", 3).expect("range");
        let q_frame = encoder
            .batch_write_request(
                &config(PlcSeries::Q, CommunicationMode::Ascii),
                &range,
                &[1, 0, 1],
            )
            .expect("encode");
        let text = String::from_utf8(q_frame).expect("ascii");
        assert!(text.ends_with("101"));

        let iqr_frame = encoder
            .batch_write_request(
                &config(PlcSeries::IqR, CommunicationMode::Ascii),
                &range,
                &[1, 0, 1],
            )
            .expect("encode");
        let text = String::from_utf8(iqr_frame).expect("ascii");
        assert!(text.ends_with("000100000001"));
    }

    #[test]
    fn test_bit_packing_symmetry() {
        for length in 1..=64usize {
            let bits: Vec<u16> = (0..length).map(|i| u16::from(i % 3 == 0)).collect();
            let packed = pack_bits_binary(&bits, length);
            assert_eq!(packed.len(), (length + 1) / 2);
            let unpacked = unpack_bits_binary(&packed, length);
            let expected: Vec<bool> = bits.iter().map(|v| *v != 0).collect();
            assert_eq!(unpacked, expected, "length {length}");
        }
    }

    #[test]
    fn test_zero_length_and_short_values_rejected() {
        let encoder = FrameEncoder;
        let cfg = config(PlcSeries::Q, CommunicationMode::Binary);
        let mut range = make_device_range("D0", 1).expect("range");
        range.length = 0;
        assert!(encoder.batch_read_request(&cfg, &range).is_err());
        assert!(encoder.batch_write_request(&cfg, &range, &[]).is_err());
        range.length = 2;
        assert!(matches!(
            encoder.batch_write_request(&cfg, &range, &[1]),
            Err(McError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_random_read_frame_layout() {
        let encoder = FrameEncoder;
        let request = RandomDeviceRequest {
            word_devices: vec![
                make_device_address("D300").expect("D300"),
                make_device_address("D500").expect("D500"),
            ],
            dword_devices: vec![make_device_address("D700").expect("D700")],
            ..RandomDeviceRequest::default()
        };
        let frame = encoder
            .random_read_request(&config(PlcSeries::Q, CommunicationMode::Binary), &request)
            .expect("encode");
        // counts come right after the subcommand
        assert_eq!(&frame[15..17], &[0x02, 0x01]);
        // three 4-byte device fields follow
        assert_eq!(frame.len(), 11 + 4 + 2 + 3 * 4);
    }

    #[test]
    fn test_random_bit_rejected_off_iq_r() {
        let encoder = FrameEncoder;
        let request = RandomDeviceRequest {
            bit_devices: vec![make_device_address("M0").expect("M0")],
            ..RandomDeviceRequest::default()
        };
        assert!(matches!(
            encoder.random_read_request(&config(PlcSeries::Q, CommunicationMode::Binary), &request),
            Err(McError::InvalidArgument(_))
        ));
        assert!(encoder
            .random_read_request(&config(PlcSeries::IqR, CommunicationMode::Binary), &request)
            .is_ok());
    }

    #[test]
    fn test_random_write_pairing_checks() {
        let encoder = FrameEncoder;
        let cfg = config(PlcSeries::Q, CommunicationMode::Binary);
        let request = RandomDeviceRequest {
            word_devices: vec![make_device_address("D0").expect("D0")],
            ..RandomDeviceRequest::default()
        };
        assert!(matches!(
            encoder.random_write_request(&cfg, &request, &[], &[], &[], &[]),
            Err(McError::InvalidArgument(_))
        ));
        let frame = encoder
            .random_write_request(&cfg, &request, &[0xBEEF], &[], &[], &[])
            .expect("encode");
        assert_eq!(&frame[frame.len() - 2..], &[0xEF, 0xBE]);
    }

    #[test]
    fn test_random_write_lword_iq_r() {
        let encoder = FrameEncoder;
        let request = RandomDeviceRequest {
            lword_devices: vec![make_device_address("D0").expect("D0")],
            ..RandomDeviceRequest::default()
        };
        let frame = encoder
            .random_write_request(
                &config(PlcSeries::IqR, CommunicationMode::Binary),
                &request,
                &[],
                &[],
                &[0x0102_0304_0506_0708],
                &[],
            )
            .expect("encode");
        assert_eq!(
            &frame[frame.len() - 8..],
            &[0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01]
        );
    }

    #[test]
    fn test_simple_command_frame() {
        let encoder = FrameEncoder;
        let frame = encoder
            .simple_command_request(
                &config(PlcSeries::Q, CommunicationMode::Binary),
                CMD_CPU_TYPE,
                SUBCMD_NONE,
                &[],
            )
            .expect("encode");
        assert_eq!(&frame[11..], &[0x01, 0x01, 0x00, 0x00]);
        let declared = u16::from_le_bytes([frame[7], frame[8]]);
        assert_eq!(declared, 6);
    }
}
