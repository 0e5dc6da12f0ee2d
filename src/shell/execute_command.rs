//! Turns a parsed pipeline into running processes.
//!
//! Every stage is forked before anything is waited on, so the stages of a
//! pipeline run concurrently. The shell only ever waits on the final stage;
//! the others are reclaimed by the `SIGCHLD` reaper.

use std::ffi::CString;
use std::io::{self, Write};
use std::os::unix::io::{AsRawFd, OwnedFd};
use std::process::{self, ExitStatus};

use log::debug;
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::libc;
use nix::sys::wait::{self, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};

use crate::core::parser::{Command, Invocation, PipelineSpec};
use crate::errors::{Error, ErrorKind, Result, ResultExt};
use crate::shell::job_control::{self, SigchldBlock};
use crate::shell::{builtins, redirection, Shell};
use crate::util::YoshExitStatusExt;

/// Runs a prepared pipeline and returns its exit status.
///
/// A lone builtin without redirects runs inside the shell (a trailing `&` is
/// ignored for it); everything else is forked through [`execute_pipeline`].
pub fn dispatch(shell: &mut Shell, spec: PipelineSpec) -> Result<ExitStatus> {
    let simple = spec.simple_command().map(Command::invocation);
    if let Some(Invocation::Builtin(builtin, args)) = simple {
        if !spec.has_redirects() {
            if spec.background {
                debug!("ignoring & for builtin {}", builtin);
            }
            let stdout = io::stdout();
            let mut stdout = stdout.lock();
            let (status, result) = builtins::run(shell, builtin, args, &mut stdout);
            return result.map(|()| status);
        }
    }

    execute_pipeline(shell, &spec)
}

/// Forks one process per stage, wires stages together with pipes and binds
/// the resolved redirects to the pipeline's ends.
///
/// Background pipelines are recorded as a job keyed by the final stage's pid;
/// otherwise the final stage is waited on.
pub fn execute_pipeline(shell: &mut Shell, spec: &PipelineSpec) -> Result<ExitStatus> {
    let redirects = redirection::resolve(spec.stdin.as_ref(), spec.stdout.as_ref())?;
    let mut stdin: Option<OwnedFd> = redirects.stdin.map(OwnedFd::from);
    let mut final_stdout: Option<OwnedFd> = redirects.stdout.map(OwnedFd::from);

    // held until the final stage has been waited on
    let _block = SigchldBlock::new()?;
    log_if_err!(io::stdout().flush(), "failed to flush stdout before fork");

    let last = spec.commands.len().saturating_sub(1);
    let mut pids = Vec::with_capacity(spec.commands.len());
    for (i, command) in spec.commands.iter().enumerate() {
        let (next_stdin, stdout) = if i < last {
            let (read_end, write_end) =
                unistd::pipe2(OFlag::O_CLOEXEC).chain_err(|| ErrorKind::SystemCall("pipe"))?;
            (Some(read_end), Some(write_end))
        } else {
            (None, final_stdout.take())
        };

        match unsafe { unistd::fork() }.chain_err(|| ErrorKind::SystemCall("fork"))? {
            ForkResult::Child => {
                drop(next_stdin);
                drop(final_stdout);
                run_stage(shell, command, stdin.take(), stdout);
            }
            ForkResult::Parent { child } => {
                debug!("forked stage {} ({}) as {}", i, command, child);
                pids.push(child);
            }
        }

        // the parent's copies of this stage's descriptors
        drop(stdout);
        stdin = next_stdin;
    }

    let final_pid = match pids.last() {
        Some(&pid) => pid,
        None => return Ok(ExitStatus::from_success()),
    };

    if spec.background {
        shell.add_job(final_pid, &spec.commands[0].to_string());
        return Ok(ExitStatus::from_success());
    }

    wait_for_stage(final_pid, &spec.commands[last])
}

/// Body of a forked stage. Never returns.
fn run_stage(
    shell: &mut Shell,
    command: &Command,
    stdin: Option<OwnedFd>,
    stdout: Option<OwnedFd>,
) -> ! {
    let result =
        job_control::reset_child_signals().and_then(|()| bind_stdio(stdin, stdout));

    let status = match result {
        Err(e) => {
            eprintln!("{}", e.describe());
            ExitStatus::from_failure()
        }
        Ok(()) => match command.invocation() {
            Invocation::Builtin(builtin, args) => {
                let stdout = io::stdout();
                let mut stdout = stdout.lock();
                let (status, result) = builtins::run(shell, builtin, args, &mut stdout);
                if let Err(e) = result {
                    eprintln!("{}", e.describe());
                }
                log_if_err!(stdout.flush(), "failed to flush output of {}", builtin);
                status
            }
            Invocation::External(..) => {
                let e = exec(command);
                eprintln!("{}", e.describe());
                ExitStatus::from_status(e.status_code())
            }
        },
    };

    process::exit(status.code_like_u8());
}

/// Rebinds the stage's standard input and output, closing the originals.
fn bind_stdio(stdin: Option<OwnedFd>, stdout: Option<OwnedFd>) -> Result<()> {
    if let Some(fd) = stdin {
        unistd::dup2(fd.as_raw_fd(), libc::STDIN_FILENO)
            .chain_err(|| ErrorKind::SystemCall("dup2"))?;
    }
    if let Some(fd) = stdout {
        unistd::dup2(fd.as_raw_fd(), libc::STDOUT_FILENO)
            .chain_err(|| ErrorKind::SystemCall("dup2"))?;
    }
    Ok(())
}

/// Replaces the current process image with `command`. Only returns on failure.
fn exec(command: &Command) -> Error {
    let argv = command
        .argv()
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<::std::result::Result<Vec<_>, _>>();
    let argv = match argv {
        Ok(argv) => argv,
        Err(e) => {
            return Error::with_chain(
                e,
                ErrorKind::InvalidArgument(format!("yosh: {}: invalid argument", command.program())),
            );
        }
    };

    match unistd::execvp(&argv[0], &argv) {
        Err(Errno::ENOENT) => ErrorKind::CommandNotFound(command.program().to_string()).into(),
        Err(e) => Error::with_chain(e, ErrorKind::SystemCall("execvp")),
        Ok(never) => match never {},
    }
}

/// Blocks until the final stage of a foreground pipeline terminates.
fn wait_for_stage(pid: Pid, command: &Command) -> Result<ExitStatus> {
    loop {
        match wait::waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => {
                debug!("{} exited with {}", pid, code);
                return Ok(ExitStatus::from_status(code));
            }
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                debug!("{} terminated by {:?}", pid, signal);
                bail!(ErrorKind::ChildSignaled(command.to_string(), signal));
            }
            Ok(status) => debug!("ignoring wait status {:?}", status),
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e).chain_err(|| ErrorKind::SystemCall("waitpid")),
        }
    }
}
