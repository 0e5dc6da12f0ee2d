//! Yosh - a small job-control shell
//!
//! Pipelines are turned into one forked process per stage, wired together
//! with pipes and optional file redirection. Background pipelines are tracked
//! as jobs; exited children are reclaimed by a `SIGCHLD` handler and job
//! states are discovered lazily by probing.
#![recursion_limit = "1024"]
#![deny(
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]

#[macro_use]
extern crate error_chain;

/// Logs `$result` at error level if it is an `Err`, then moves on.
macro_rules! log_if_err {
    ($result:expr, $fmt:expr) => {{
        if let Err(e) = $result {
            log::error!(concat!($fmt, ": {}"), e);
        }
    }};
    ($result:expr, $fmt:expr, $($arg:tt)*) => {{
        if let Err(e) = $result {
            log::error!(concat!($fmt, ": {}"), $($arg)*, e);
        }
    }};
}

pub mod core;
mod editor;
pub mod errors;
pub mod shell;
mod util;

pub use crate::shell::{Shell, ShellConfig};
pub use crate::util::YoshExitStatusExt;
