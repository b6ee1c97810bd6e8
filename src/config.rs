//! Session configuration and the runtime-overridable access option.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::McError;
use crate::mc_define::CommunicationMode;
use crate::plc_series::PlcSeries;
use crate::toml_helpers::extract_line_col_from_msg;

/// Module I/O cap for everything before iQ-R.
const MODULE_IO_MAX: u16 = 0x03FF;
/// Module I/O cap for iQ-R.
const MODULE_IO_MAX_IQR: u16 = 0x0FFF;

/// Everything needed to open a 3E session: endpoint, access route,
/// monitoring timer, PLC series and transfer encoding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// PLC host name or IP address.
    pub host: String,
    /// PLC port, commonly 5007 (binary) or 5000.
    pub port: u16,
    /// Network number: 0 = own network, 1-239 = remote.
    pub network: u8,
    /// PC number: 0xFF = direct connection.
    pub pc: u8,
    /// Request-destination module I/O number: 0x03FF = own station CPU.
    pub module_io: u16,
    /// Request-destination module station number.
    pub module_station: u8,
    /// Monitoring timer in 250 ms ticks, minimum 1.
    pub timeout_250ms: u16,
    pub series: PlcSeries,
    pub mode: CommunicationMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 0,
            network: 0,
            pc: 0xFF,
            module_io: MODULE_IO_MAX,
            module_station: 0,
            timeout_250ms: 4,
            series: PlcSeries::IqR,
            mode: CommunicationMode::Binary,
        }
    }
}

impl SessionConfig {
    /// Collect every validation problem instead of stopping at the first.
    #[must_use]
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.host.is_empty() {
            errors.push("host address is empty".to_string());
        }
        if self.port == 0 {
            errors.push("port must be non-zero".to_string());
        }
        if self.network > 239 {
            errors.push(format!("network number must be 0-239 (got {})", self.network));
        }
        // 0xFF means direct connection; 0 is reserved but tolerated.
        if self.pc > 120 && self.pc != 0xFF {
            errors.push(format!(
                "pc number should be 0, 1-120 or 0xFF for direct (got {})",
                self.pc
            ));
        }
        let io_max = if self.series.is_iq_r() {
            MODULE_IO_MAX_IQR
        } else {
            MODULE_IO_MAX
        };
        if self.module_io > io_max {
            errors.push(format!(
                "module I/O number for {series} must be 0x0000-0x{io_max:04X} (got 0x{io:04X})",
                series = self.series.as_str(),
                io = self.module_io
            ));
        }
        if self.module_station > 16 {
            errors.push(format!(
                "module station number must be 0-16 (got {})",
                self.module_station
            ));
        }
        if self.timeout_250ms == 0 {
            errors.push("timeout must be at least 1 tick (250 ms)".to_string());
        }
        // 240 ticks = one minute
        if self.timeout_250ms > 240 {
            errors.push(format!(
                "timeout is very large: {ticks} ticks ({seconds} seconds)",
                ticks = self.timeout_250ms,
                seconds = f64::from(self.timeout_250ms) * 0.25
            ));
        }

        errors
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` carrying every problem found, joined
    /// with `"; "`.
    pub fn validate(&self) -> Result<(), McError> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(McError::InvalidArgument(errors.join("; ")))
        }
    }

    /// Parse a configuration from TOML text. Unknown keys are rejected;
    /// missing keys fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` with the parser's line/column when the
    /// text does not parse.
    pub fn from_toml_str(text: &str) -> Result<Self, McError> {
        toml::from_str(text).map_err(|e| {
            let msg = e.to_string();
            match extract_line_col_from_msg(&msg) {
                Some((line, col)) => McError::InvalidArgument(format!(
                    "session config parse error at {line}:{col}: {msg}"
                )),
                None => McError::InvalidArgument(format!("session config parse error: {msg}")),
            }
        })
    }

    /// Monitoring timer as a wall-clock duration (250 ms quantum,
    /// clamped up to one tick).
    #[must_use]
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeout_250ms.max(1)) * 250)
    }

    /// Project the per-call configuration: route and mode come from the
    /// access option, the timer is re-derived from its whole seconds.
    #[must_use]
    pub fn with_option(&self, option: &AccessOption) -> Self {
        let mut effective = self.clone();
        effective.mode = option.mode;
        effective.network = option.network;
        effective.pc = option.pc;
        effective.module_io = option.module_io;
        effective.module_station = option.module_station;
        effective.timeout_250ms = option.timeout_250ms();
        effective
    }
}

/// Runtime-overridable subset of [`SessionConfig`], applied to every
/// operation until replaced. The timeout is expressed in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessOption {
    pub mode: CommunicationMode,
    pub network: u8,
    pub pc: u8,
    pub module_io: u16,
    pub module_station: u8,
    /// Timeout in whole seconds, minimum 1.
    pub timeout_seconds: u16,
}

impl Default for AccessOption {
    fn default() -> Self {
        Self {
            mode: CommunicationMode::Binary,
            network: 0,
            pc: 0xFF,
            module_io: MODULE_IO_MAX,
            module_station: 0,
            timeout_seconds: 1,
        }
    }
}

impl AccessOption {
    /// Seed an access option from a session configuration, converting
    /// the 250 ms timer to whole seconds (minimum 1).
    #[must_use]
    pub fn from_session(config: &SessionConfig) -> Self {
        Self {
            mode: config.mode,
            network: config.network,
            pc: config.pc,
            module_io: config.module_io,
            module_station: config.module_station,
            timeout_seconds: (config.timeout_250ms / 4).max(1),
        }
    }

    /// The option's timeout converted back to 250 ms ticks, minimum 1.
    #[must_use]
    pub fn timeout_250ms(&self) -> u16 {
        self.timeout_seconds.saturating_mul(4).max(1)
    }

    /// The option's timeout as a wall-clock duration.
    #[must_use]
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.timeout_250ms()) * 250)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SessionConfig {
        SessionConfig {
            host: "192.168.1.10".to_string(),
            port: 5007,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn test_default_config_reports_endpoint_errors() {
        let errors = SessionConfig::default().validation_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("host"));
        assert!(errors[1].contains("port"));
    }

    #[test]
    fn test_valid_config_passes() {
        valid_config().validate().expect("valid config");
    }

    #[test]
    fn test_module_io_cap_depends_on_series() {
        let mut config = valid_config();
        config.module_io = 0x0FFF;
        config.series = PlcSeries::IqR;
        config.validate().expect("iQ-R allows 0x0FFF");

        config.series = PlcSeries::Q;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_network_and_timeout_bounds() {
        let mut config = valid_config();
        config.network = 240;
        config.timeout_250ms = 0;
        let errors = config.validation_errors();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_oversized_timeout_is_flagged() {
        let mut config = valid_config();
        config.timeout_250ms = 240;
        config.validate().expect("one minute is still fine");

        config.timeout_250ms = 500;
        let errors = config.validation_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("timeout is very large"));
        assert!(errors[0].contains("125 seconds"));
    }

    #[test]
    fn test_from_toml_str() {
        let config = SessionConfig::from_toml_str(
            r#"
            host = "10.0.0.5"
            port = 5000
            series = "Q"
            mode = "Ascii"
            timeout_250ms = 8
            "#,
        )
        .expect("parse config");
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.series, PlcSeries::Q);
        assert_eq!(config.mode, CommunicationMode::Ascii);
        assert_eq!(config.pc, 0xFF);

        let err = SessionConfig::from_toml_str("host = ???").expect_err("bad toml");
        assert!(err.to_string().contains("parse error at"));
    }

    #[test]
    fn test_access_option_round_trip() {
        let mut config = valid_config();
        config.timeout_250ms = 9;
        let option = AccessOption::from_session(&config);
        assert_eq!(option.timeout_seconds, 2);
        assert_eq!(option.timeout_250ms(), 8);

        config.timeout_250ms = 1;
        let option = AccessOption::from_session(&config);
        assert_eq!(option.timeout_seconds, 1);

        let effective = config.with_option(&AccessOption {
            mode: CommunicationMode::Ascii,
            network: 3,
            timeout_seconds: 2,
            ..AccessOption::default()
        });
        assert_eq!(effective.mode, CommunicationMode::Ascii);
        assert_eq!(effective.network, 3);
        assert_eq!(effective.timeout_250ms, 8);
        assert_eq!(effective.host, config.host);
        assert_eq!(effective.series, config.series);
    }
}
