//! Device Code Map: resolves a device-name prefix to the per-series
//! numeric/ASCII code, numeric base and field widths.
//!
//! The catalog is a constant table; the prefix index is derived lazily.
//! Multi-letter prefixes (`ZR`, `RD`) are probed before single-letter
//! ones so that `"ZR100"` never resolves to `Z`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::McError;
use crate::plc_series::PlcSeries;

/// Numeric base of a device's address portion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum NumberBase {
    Decimal,
    Hexadecimal,
}

impl NumberBase {
    #[must_use]
    pub const fn radix(&self) -> u32 {
        match self {
            Self::Decimal => 10,
            Self::Hexadecimal => 16,
        }
    }
}

/// One catalog row: textual prefix, binary device code, numeric base and
/// the series the device exists on.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub prefix: &'static str,
    pub binary_code: u16,
    pub base: NumberBase,
    pub supported_series: &'static [PlcSeries],
}

const ALL_SERIES: &[PlcSeries] = &[
    PlcSeries::Q,
    PlcSeries::L,
    PlcSeries::QnA,
    PlcSeries::IqL,
    PlcSeries::IqR,
];

const IQR_ONLY: &[PlcSeries] = &[PlcSeries::IqR];

/// Device catalog for the 3E frame family. Two-letter prefixes come
/// first; `lookup_prefix` relies on probing lengths, not table order.
pub const DEVICE_CATALOG: &[CatalogEntry] = &[
    CatalogEntry { prefix: "ZR", binary_code: 0xB0, base: NumberBase::Hexadecimal, supported_series: ALL_SERIES },
    CatalogEntry { prefix: "RD", binary_code: 0x2C, base: NumberBase::Decimal, supported_series: IQR_ONLY },
    CatalogEntry { prefix: "X", binary_code: 0x9C, base: NumberBase::Hexadecimal, supported_series: ALL_SERIES },
    CatalogEntry { prefix: "Y", binary_code: 0x9D, base: NumberBase::Hexadecimal, supported_series: ALL_SERIES },
    CatalogEntry { prefix: "M", binary_code: 0x90, base: NumberBase::Decimal, supported_series: ALL_SERIES },
    CatalogEntry { prefix: "L", binary_code: 0x92, base: NumberBase::Decimal, supported_series: ALL_SERIES },
    CatalogEntry { prefix: "F", binary_code: 0x93, base: NumberBase::Decimal, supported_series: ALL_SERIES },
    CatalogEntry { prefix: "B", binary_code: 0xA0, base: NumberBase::Hexadecimal, supported_series: ALL_SERIES },
    CatalogEntry { prefix: "T", binary_code: 0xC2, base: NumberBase::Decimal, supported_series: ALL_SERIES },
    CatalogEntry { prefix: "C", binary_code: 0xC5, base: NumberBase::Decimal, supported_series: ALL_SERIES },
    CatalogEntry { prefix: "D", binary_code: 0xA8, base: NumberBase::Decimal, supported_series: ALL_SERIES },
    CatalogEntry { prefix: "W", binary_code: 0xB4, base: NumberBase::Hexadecimal, supported_series: ALL_SERIES },
    CatalogEntry { prefix: "R", binary_code: 0xAF, base: NumberBase::Decimal, supported_series: ALL_SERIES },
    CatalogEntry { prefix: "Z", binary_code: 0xCC, base: NumberBase::Decimal, supported_series: ALL_SERIES },
];

static ENTRY_BY_PREFIX: Lazy<HashMap<&'static str, &'static CatalogEntry>> = Lazy::new(|| {
    let mut m = HashMap::with_capacity(DEVICE_CATALOG.len());
    for entry in DEVICE_CATALOG {
        m.insert(entry.prefix, entry);
    }
    m
});

/// Device code resolved for the binary encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryDeviceCode {
    pub code: u16,
    /// Bytes occupied by the code on the wire: 2 on iQ-R, 1 elsewhere.
    pub code_width: usize,
    pub number_base: NumberBase,
    /// Bytes occupied by the device number: 4 on iQ-R, 3 elsewhere.
    pub number_width: usize,
}

/// Device code resolved for the ASCII encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiDeviceCode {
    /// Prefix text right-padded with `*` to 4 chars (iQ-R) or 2 chars.
    pub code: String,
    pub number_base: NumberBase,
    /// Characters occupied by the device number: 8 on iQ-R, 6 elsewhere.
    pub number_width: usize,
}

/// Longest-prefix lookup of a normalized device name against the catalog.
#[must_use]
pub fn lookup_prefix(name: &str) -> Option<&'static CatalogEntry> {
    for len in (1..=2).rev() {
        if name.len() < len {
            continue;
        }
        let candidate = &name[..len];
        if !candidate.bytes().all(|b| b.is_ascii_alphabetic()) {
            continue;
        }
        if let Some(entry) = ENTRY_BY_PREFIX.get(candidate) {
            return Some(entry);
        }
    }
    None
}

fn supported_entry(series: PlcSeries, name: &str) -> Result<&'static CatalogEntry, McError> {
    let entry = lookup_prefix(name)
        .ok_or_else(|| McError::UnsupportedDevice(format!("unknown device name: {name}")))?;
    if !entry.supported_series.contains(&series) {
        return Err(McError::UnsupportedDevice(format!(
            "device {name} is not supported on {series} series",
            series = series.as_str()
        )));
    }
    Ok(entry)
}

/// Resolve a device name for the binary encoding.
///
/// # Errors
///
/// Returns `McError::UnsupportedDevice` when the prefix is unknown or
/// the device does not exist on the requested series.
pub fn resolve_binary(series: PlcSeries, name: &str) -> Result<BinaryDeviceCode, McError> {
    let entry = supported_entry(series, name)?;
    let is_iq_r = series.is_iq_r();
    Ok(BinaryDeviceCode {
        code: entry.binary_code,
        code_width: if is_iq_r { 2 } else { 1 },
        number_base: entry.base,
        number_width: if is_iq_r { 4 } else { 3 },
    })
}

/// Resolve a device name for the ASCII encoding.
///
/// # Errors
///
/// Returns `McError::UnsupportedDevice` when the prefix is unknown or
/// the device does not exist on the requested series.
pub fn resolve_ascii(series: PlcSeries, name: &str) -> Result<AsciiDeviceCode, McError> {
    let entry = supported_entry(series, name)?;
    let is_iq_r = series.is_iq_r();
    let code_width = if is_iq_r { 4 } else { 2 };

    let mut code = entry.prefix.to_string();
    while code.len() < code_width {
        code.push('*');
    }
    Ok(AsciiDeviceCode {
        code,
        number_base: entry.base,
        number_width: if is_iq_r { 8 } else { 6 },
    })
}
