//! Device addressing: typed addresses, contiguous ranges, random-access
//! request grouping, and the name utilities the client builds them with.

use serde::{Deserialize, Serialize};

use crate::device_code::{lookup_prefix, NumberBase};
use crate::error::McError;

/// Access granularity of a device.
///
/// `DoubleWord` behaves like `Word` at the frame level; the distinction
/// only matters to callers interpreting the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum DeviceType {
    Word,
    Bit,
    DoubleWord,
}

/// A normalized device name (uppercase prefix + numeric part) plus its
/// access granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceAddress {
    pub name: String,
    pub device_type: DeviceType,
}

/// A contiguous span of devices: head address plus a count (>= 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRange {
    pub head: DeviceAddress,
    pub length: u16,
}

/// Scattered-device request, grouped by width class. User-supplied order
/// is preserved within each class; on the wire the classes appear
/// word, dword, lword, bit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RandomDeviceRequest {
    pub word_devices: Vec<DeviceAddress>,
    pub dword_devices: Vec<DeviceAddress>,
    pub lword_devices: Vec<DeviceAddress>,
    pub bit_devices: Vec<DeviceAddress>,
}

impl RandomDeviceRequest {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.word_devices.is_empty()
            && self.dword_devices.is_empty()
            && self.lword_devices.is_empty()
            && self.bit_devices.is_empty()
    }
}

const BIT_PREFIXES: &[&str] = &["X", "Y", "M", "L", "F", "B", "T", "C"];

/// Uppercase a device name, trimming surrounding whitespace.
#[must_use]
pub fn normalize_device_name(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

/// Access granularity implied by a device name's prefix. Unknown
/// prefixes fall back to `Word` and are rejected later by the catalog.
#[must_use]
pub fn device_type_of(name: &str) -> DeviceType {
    match lookup_prefix(name) {
        Some(entry) if BIT_PREFIXES.contains(&entry.prefix) => DeviceType::Bit,
        _ => DeviceType::Word,
    }
}

fn check_device_name(name: &str) -> Result<(), McError> {
    if name.is_empty() {
        return Err(McError::InvalidArgument("device name is empty".into()));
    }
    let entry = lookup_prefix(name)
        .ok_or_else(|| McError::UnsupportedDevice(format!("unknown device prefix in {name}")))?;
    let number_part = &name[entry.prefix.len()..];
    if number_part.is_empty() {
        return Err(McError::InvalidArgument(format!(
            "device name missing numeric part: {name}"
        )));
    }
    parse_number_part(name, number_part, entry.base)?;
    Ok(())
}

/// Whether `name` (after normalization) is a well-formed device name.
#[must_use]
pub fn is_valid_device_name(name: &str) -> bool {
    check_device_name(&normalize_device_name(name)).is_ok()
}

/// Build a `DeviceAddress` from a raw name, normalizing and validating
/// it and inferring the access granularity from the prefix.
///
/// # Errors
///
/// Returns `InvalidArgument` or `UnsupportedDevice` when the name does
/// not parse against the catalog.
pub fn make_device_address(name: &str) -> Result<DeviceAddress, McError> {
    let normalized = normalize_device_name(name);
    check_device_name(&normalized)?;
    let device_type = device_type_of(&normalized);
    Ok(DeviceAddress {
        name: normalized,
        device_type,
    })
}

/// Build a `DeviceRange` from a head device name and a length.
///
/// # Errors
///
/// Returns `InvalidArgument` when `length` is zero or the name is
/// malformed.
pub fn make_device_range(name: &str, length: u16) -> Result<DeviceRange, McError> {
    if length == 0 {
        return Err(McError::InvalidArgument(
            "device range length must be greater than zero".into(),
        ));
    }
    Ok(DeviceRange {
        head: make_device_address(name)?,
        length,
    })
}

fn parse_number_part(name: &str, number_part: &str, base: NumberBase) -> Result<u32, McError> {
    let digits = if base == NumberBase::Hexadecimal {
        number_part
            .strip_prefix("0X")
            .or_else(|| number_part.strip_prefix("0x"))
            .unwrap_or(number_part)
    } else {
        number_part
    };
    let number = u32::from_str_radix(digits, base.radix()).map_err(|_| {
        McError::InvalidArgument(format!(
            "invalid numeric part {number_part:?} in device name {name}"
        ))
    })?;
    Ok(number)
}

/// Parse the numeric part of a normalized device name using the
/// catalog entry's base.
///
/// # Errors
///
/// Returns `UnsupportedDevice` for an unknown prefix and
/// `InvalidArgument` when the numeric part does not parse.
pub fn device_number(name: &str) -> Result<u32, McError> {
    let entry = lookup_prefix(name)
        .ok_or_else(|| McError::UnsupportedDevice(format!("unknown device prefix in {name}")))?;
    let number_part = &name[entry.prefix.len()..];
    if number_part.is_empty() {
        return Err(McError::InvalidArgument(format!(
            "device name missing numeric part: {name}"
        )));
    }
    parse_number_part(name, number_part, entry.base)
}

/// Produce the name of the device `offset` positions past `name`,
/// rendered in the prefix's natural base. Used to expand multi-word
/// random accesses into consecutive single-word devices.
///
/// # Errors
///
/// Same failure modes as [`device_number`], plus overflow of the
/// address space.
pub fn offset_device_name(name: &str, offset: u32) -> Result<String, McError> {
    let entry = lookup_prefix(name)
        .ok_or_else(|| McError::UnsupportedDevice(format!("unknown device prefix in {name}")))?;
    let number = device_number(name)?;
    let shifted = number
        .checked_add(offset)
        .ok_or_else(|| McError::InvalidArgument(format!("device number overflow for {name}")))?;
    let rendered = match entry.base {
        NumberBase::Decimal => format!("{shifted}"),
        NumberBase::Hexadecimal => format!("{shifted:X}"),
    };
    Ok(format!("{prefix}{rendered}", prefix = entry.prefix))
}
