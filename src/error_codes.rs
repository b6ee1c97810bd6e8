//! Completion-code descriptions.
//!
//! The table is embedded as `error_codes.toml` and parsed once at first
//! use. Lookups feed the diagnostic text attached to protocol errors;
//! an unknown code simply renders without a description.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct ErrorCodeFile {
    #[serde(rename = "code")]
    codes: Vec<ErrorCodeEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorCodeEntry {
    #[serde(deserialize_with = "parse_hex_or_int")]
    code: u16,
    name: Option<String>,
    description: Option<String>,
}

// Accept either an integer or a "0xNNNN" string for the code field.
fn parse_hex_or_int<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct V;
    impl serde::de::Visitor<'_> for V {
        type Value = u16;

        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "an integer or a hex string like 0xC059")
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<u16, E> {
            u16::try_from(v).map_err(|_| E::custom(format!("code out of range: {v}")))
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<u16, E> {
            let digits = v
                .strip_prefix("0x")
                .or_else(|| v.strip_prefix("0X"))
                .unwrap_or(v);
            u16::from_str_radix(digits, 16).map_err(|_| E::custom(format!("bad code: {v}")))
        }
    }
    deserializer.deserialize_any(V)
}

static CODE_TABLE: Lazy<HashMap<u16, ErrorCodeEntry>> = Lazy::new(|| {
    let text = include_str!("./error_codes.toml");
    let file: ErrorCodeFile = match toml::from_str(text) {
        Ok(f) => f,
        Err(e) => {
            // A corrupted embed degrades to code-only diagnostics.
            tracing::warn!("failed to parse embedded error_codes.toml: {e}");
            return HashMap::new();
        }
    };
    file.codes.into_iter().map(|e| (e.code, e)).collect()
});

/// Short mnemonic for a known completion code.
#[must_use]
pub fn code_name(code: u16) -> Option<&'static str> {
    CODE_TABLE.get(&code).and_then(|e| e.name.as_deref())
}

/// Human-readable description for a known completion code.
#[must_use]
pub fn code_description(code: u16) -> Option<&'static str> {
    CODE_TABLE.get(&code).and_then(|e| e.description.as_deref())
}

/// `" (NAME: description)"` suffix for diagnostics, empty when the code
/// is unknown.
#[must_use]
pub fn describe(code: u16) -> String {
    match (code_name(code), code_description(code)) {
        (Some(name), Some(desc)) => format!(" ({name}: {desc})"),
        (Some(name), None) => format!(" ({name})"),
        (None, Some(desc)) => format!(" ({desc})"),
        (None, None) => String::new(),
    }
}
