use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

/// Yosh utility extensions for `ExitStatus`
pub trait YoshExitStatusExt {
    /// Create an ExitStatus to indicate *successful* program execution.
    fn from_success() -> Self;

    /// Create an ExitStatus to indicate *unsuccessful* program execution.
    fn from_failure() -> Self;

    /// Create an ExitStatus from a status code
    fn from_status(code: i32) -> Self;

    /// Status code clamped the way a parent shell observes it, i.e. `0..=255`.
    fn code_like_u8(&self) -> i32;
}

impl YoshExitStatusExt for ExitStatus {
    /// # Examples
    /// ```rust
    /// use yosh::YoshExitStatusExt;
    /// use std::process::ExitStatus;
    /// assert!(ExitStatus::from_success().success());
    /// ```
    fn from_success() -> Self {
        ExitStatus::from_status(0)
    }

    /// # Examples
    /// ```rust
    /// use yosh::YoshExitStatusExt;
    /// use std::process::ExitStatus;
    /// assert!(!ExitStatus::from_failure().success());
    /// ```
    fn from_failure() -> Self {
        ExitStatus::from_status(1)
    }

    fn from_status(code: i32) -> Self {
        ExitStatus::from_raw((code & 0xff) << 8)
    }

    fn code_like_u8(&self) -> i32 {
        match (self.code(), self.signal()) {
            (Some(code), _) => code & 0xff,
            (None, Some(signal)) => 128 + signal,
            (None, None) => 1,
        }
    }
}
