//! Error module. See the [error-chain](https://crates.io/crates/error-chain) crate for details.

use std::fmt;

use nix::sys::signal::Signal;

/// Which end of a pipeline a redirection applies to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

error_chain! {
    foreign_links {
        Docopt(::docopt::Error);
        Io(::std::io::Error);
        Nix(::nix::Error);
        Readline(::rustyline::error::ReadlineError);
    }

    errors {
        Syntax(line: String) {
            description("syntax error")
            display("yosh: syntax error near: '{}'", line)
        }
        AmbiguousRedirect(direction: Direction) {
            description("ambiguous redirect")
            display("Ambiguous {} redirect.", direction)
        }
        MissingRedirectTarget {
            description("missing name for redirect")
            display("Missing name for redirect.")
        }
        NoSuchFile(path: String) {
            description("no such file or directory")
            display("{}: No such file or directory.", path)
        }
        FileExists(path: String) {
            description("file exists")
            display("{}: File exists.", path)
        }
        Usage(usage: &'static str) {
            description("usage error")
            display("Usage: {}", usage)
        }
        InvalidArgument(message: String) {
            description("invalid argument")
            display("{}", message)
        }
        NoSuchProcess(arg: String) {
            description("no such process")
            display("yosh: kill: ({}) - No such process", arg)
        }
        EventNotFound(event: String) {
            description("history event not found")
            display("yosh: {}: event not found", event)
        }
        CommandNotFound(command: String) {
            description("command not found")
            display("yosh: {}: command not found", command)
        }
        ChildSignaled(command: String, signal: Signal) {
            description("child terminated by signal")
            display("Error: {} terminated by {}", command, signal.as_str())
        }
        SystemCall(call: &'static str) {
            description("system call failed")
            display("yosh: {}", call)
        }
    }
}

impl Error {
    /// Exit status a command reports when it fails with this error.
    pub fn status_code(&self) -> i32 {
        match *self.kind() {
            ErrorKind::Syntax(_) | ErrorKind::Usage(_) | ErrorKind::Docopt(_) => 2,
            ErrorKind::CommandNotFound(_) => 127,
            ErrorKind::ChildSignaled(_, signal) => 128 + signal as i32,
            _ => 1,
        }
    }

    /// The error and all of its causes, joined the way they are shown to the user.
    pub fn describe(&self) -> String {
        self.iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(": ")
    }
}
