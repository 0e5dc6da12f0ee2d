use std::path::{Path, PathBuf};
use std::process::{self, ExitStatus};

use docopt::Docopt;
use log::{debug, error};
use nix::unistd::Pid;
use serde_derive::Deserialize;

use yosh::errors::{Error, Result};
use yosh::shell::DEFAULT_HISTORY_CAPACITY;
use yosh::{Shell, ShellConfig, YoshExitStatusExt};

const LOG_FILE_NAME: &str = ".yosh_log";

const USAGE: &str = "
yosh.

Usage:
    yosh [options]
    yosh [options] -c <command>
    yosh [options] <file>
    yosh (-h | --help)
    yosh --version

Options:
    -h --help               Show this screen.
    --version               Show version.
    -c                      If the -c option is present, then commands are read from the first
                                non-option argument command_string.
    --log=<path>            File to write log to, defaults to ~/.yosh_log
    --history-size=<n>      Number of commands kept in the history [default: 10].
";

/// Docopts input arguments.
#[derive(Debug, Deserialize)]
struct Args {
    arg_command: Option<String>,
    arg_file: Option<String>,
    flag_version: bool,
    flag_c: bool,
    flag_log: Option<String>,
    flag_history_size: Option<usize>,
}

fn main() {
    let args: Args = Docopt::new(USAGE)
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    if let Err(e) = init_logger(args.flag_log.as_ref().map(Path::new)) {
        eprintln!("yosh: logging disabled: {}", e);
    }
    debug!("{:?}", args);

    if args.flag_version {
        println!("yosh version {}", env!("CARGO_PKG_VERSION"));
    } else if args.flag_c || args.arg_file.is_some() {
        execute_from_command_string_or_file(&args);
    } else {
        let capacity = args
            .flag_history_size
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_HISTORY_CAPACITY);
        execute_from_stdin(capacity);
    }
}

fn init_logger(path: Option<&Path>) -> Result<()> {
    let log_path = match path {
        Some(path) => path.to_path_buf(),
        None => default_log_path(),
    };

    let pid = Pid::this();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                pid,
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Trace)
        .chain(fern::log_file(log_path)?)
        .apply()
        .map_err(|e| Error::from(e.to_string()))?;
    Ok(())
}

fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(LOG_FILE_NAME)
}

fn execute_from_command_string_or_file(args: &Args) -> ! {
    let mut shell = Shell::new(ShellConfig::noninteractive())
        .unwrap_or_else(|e| display_error_and_exit(&e));

    let result = match (&args.arg_command, &args.arg_file) {
        (Some(command), _) => {
            shell.execute_command_string(command);
            Ok(())
        }
        (None, Some(file_path)) => shell.execute_commands_from_file(Path::new(file_path)),
        (None, None) => Ok(()),
    };

    exit(result, &mut shell);
}

fn execute_from_stdin(history_capacity: usize) -> ! {
    let shell_config = ShellConfig::interactive(history_capacity);
    let mut shell = Shell::new(shell_config).unwrap_or_else(|e| display_error_and_exit(&e));
    shell.execute_from_stdin();
    shell.exit(None)
}

fn display_error_and_exit(error: &Error) -> ! {
    error!("failed to create shell: {}", error);
    eprintln!("{}", error.describe());
    process::exit(ExitStatus::from_failure().code_like_u8());
}

fn exit(result: Result<()>, shell: &mut Shell) -> ! {
    if let Err(e) = result {
        eprintln!("{}", e.describe());
        shell.exit(Some(ExitStatus::from_status(e.status_code())));
    } else {
        shell.exit(None);
    }
}
