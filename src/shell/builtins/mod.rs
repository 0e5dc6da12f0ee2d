//! Yosh builtins
//!
//! Commands that run inside the shell process, or inside a forked stage when
//! they take part in a pipe or a redirect. Each one writes its regular output
//! to the sink it is handed, never directly to the process's stdout.

use std::iter;

use docopt::Docopt;
use log::debug;
use serde::de::DeserializeOwned;

use self::prelude::*;

use self::cd::Cd;
use self::exit::Exit;
use self::help::Help;
use self::history::History;
use self::jobs::Jobs;
use self::kill::Kill;
use crate::core::parser::Builtin;

pub mod prelude {
    pub use std::io::Write;
    pub use std::process::ExitStatus;

    pub use super::{parse_args, BuiltinCommand};
    pub use crate::errors::{Error, ErrorKind, Result, ResultExt};
    pub use crate::shell::Shell;
    pub use crate::util::YoshExitStatusExt;
}

mod cd;
mod exit;
mod help;
mod history;
mod jobs;
mod kill;

/// Represents a Yosh builtin command such as cd or help.
pub trait BuiltinCommand {
    /// The NAME of the command.
    const NAME: &'static str;
    /// The line `help` shows for this command.
    const HELP: &'static str;
    /// Runs the command with the given arguments in the `shell` environment.
    fn run(shell: &mut Shell, args: &[String], stdout: &mut dyn Write) -> Result<()>;
}

/// Runs `builtin` and pairs its result with the exit status it maps to.
pub fn run(
    shell: &mut Shell,
    builtin: Builtin,
    args: &[String],
    stdout: &mut dyn Write,
) -> (ExitStatus, Result<()>) {
    debug!("running builtin {} {:?}", builtin, args);
    let result = match builtin {
        Builtin::Cd => Cd::run(shell, args, stdout),
        Builtin::Exit => Exit::run(shell, args, stdout),
        Builtin::Help => Help::run(shell, args, stdout),
        Builtin::History => History::run(shell, args, stdout),
        Builtin::Jobs => Jobs::run(shell, args, stdout),
        Builtin::Kill => Kill::run(shell, args, stdout),
    };

    let exit_status = get_builtin_exit_status(&result);
    (exit_status, result)
}

fn get_builtin_exit_status(result: &Result<()>) -> ExitStatus {
    match *result {
        Ok(()) => ExitStatus::from_success(),
        Err(ref e) => ExitStatus::from_status(e.status_code()),
    }
}

/// Parses builtin arguments against a docopt usage string.
pub fn parse_args<D>(usage: &str, program: &str, args: &[String]) -> Result<D>
where
    D: DeserializeOwned,
{
    let argv = iter::once(program).chain(args.iter().map(String::as_str));
    let args = Docopt::new(usage)?
        .help(false)
        .argv(argv)
        .deserialize()?;
    Ok(args)
}
