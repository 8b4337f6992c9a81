//! Exit codes for the mulog CLI.
//!
//! These are a stable contract for scripts wrapping `mulog`.

/// Exit codes for mulog operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Clean = 0,

    /// Reading input, redacting or writing output failed.
    RuntimeError = 1,

    /// Invalid arguments, level configuration or redaction policy.
    ConfigError = 2,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}
