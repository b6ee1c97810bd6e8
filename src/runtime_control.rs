//! CPU lifecycle control: remote RUN/STOP/PAUSE/RESET, latch clear and
//! the remote-password LOCK/UNLOCK pair, plus the CPU-type query result.

use serde::{Deserialize, Serialize};

/// Remote operation applied to the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum RuntimeCommand {
    Run,
    Stop,
    Pause,
    Reset,
    LatchClear,
    Unlock,
    Lock,
}

/// What device memory is cleared when the CPU resumes with RUN/PAUSE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum ClearMode {
    #[default]
    NoClear,
    ClearExceptLatch,
    ClearAll,
}

impl ClearMode {
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::NoClear => 0,
            Self::ClearExceptLatch => 1,
            Self::ClearAll => 2,
        }
    }
}

/// Options for RUN and PAUSE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeRunOption {
    pub clear_mode: ClearMode,
    /// Execute even when another station holds the CPU.
    pub force_exec: bool,
}

/// Options for LOCK and UNLOCK. The password is ASCII: exactly 4
/// characters before iQ-R, 6 to 32 characters on iQ-R.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeLockOption {
    pub password: Option<String>,
}

/// A runtime-control request: the command plus its optional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeControl {
    pub command: RuntimeCommand,
    pub run_option: Option<RuntimeRunOption>,
    pub lock_option: Option<RuntimeLockOption>,
}

impl RuntimeControl {
    #[must_use]
    pub const fn new(command: RuntimeCommand) -> Self {
        Self {
            command,
            run_option: None,
            lock_option: None,
        }
    }

    #[must_use]
    pub const fn with_run_option(mut self, option: RuntimeRunOption) -> Self {
        self.run_option = Some(option);
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.lock_option = Some(RuntimeLockOption {
            password: Some(password.into()),
        });
        self
    }
}

/// Result of the CPU-type query: model name and its 4-hex-digit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuInfo {
    pub cpu_type: String,
    pub cpu_code: String,
}
