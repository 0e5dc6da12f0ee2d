//! Signal plumbing for background jobs.
//!
//! Exited children are reclaimed asynchronously by a `SIGCHLD` handler that
//! never touches the job table. Job states are discovered on demand through
//! [`SignalProbe`]. While a pipeline is being launched and its final stage
//! waited on, `SIGCHLD` is held back with a [`SigchldBlock`] so the handler
//! cannot reap the process the shell is about to wait for.

use log::debug;
use nix::errno::Errno;
use nix::libc;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal};
use nix::sys::wait::{self, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::core::job::ProcessProbe;
use crate::errors::{ErrorKind, Result, ResultExt};

/// Installs the `SIGCHLD` handler that reclaims exited children.
pub fn install_reaper() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(handle_sigchld),
        SaFlags::SA_RESTART | SaFlags::SA_NOCLDSTOP,
        SigSet::empty(),
    );
    // handle_sigchld only calls waitpid and touches errno
    unsafe { signal::sigaction(Signal::SIGCHLD, &action) }
        .chain_err(|| ErrorKind::SystemCall("sigaction"))?;
    debug!("installed SIGCHLD reaper");
    Ok(())
}

extern "C" fn handle_sigchld(_: libc::c_int) {
    let saved = Errno::last_raw();
    reap_children();
    Errno::set_raw(saved);
}

/// Reclaims every child that has already exited, without blocking.
///
/// Returns the number of children reclaimed.
pub fn reap_children() -> usize {
    let mut reaped = 0;
    loop {
        match wait::waitpid(None, Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(_) => reaped += 1,
        }
    }
    reaped
}

/// Ignores the keyboard signals meant for foreground programs.
pub fn ignore_interactive_signals() -> Result<()> {
    for &sig in &[Signal::SIGINT, Signal::SIGQUIT] {
        unsafe { signal::signal(sig, SigHandler::SigIgn) }
            .chain_err(|| ErrorKind::SystemCall("signal"))?;
    }
    Ok(())
}

/// Signals a forked stage gets back at their default disposition.
///
/// `SIGPIPE` is ignored by the Rust runtime before `main` runs.
const CHILD_DEFAULT_SIGNALS: [Signal; 4] = [
    Signal::SIGINT,
    Signal::SIGQUIT,
    Signal::SIGCHLD,
    Signal::SIGPIPE,
];

/// Undoes the shell's signal set-up in a freshly forked stage.
///
/// Dispositions set to ignore and blocked signals survive `execvp`, so both
/// are restored before the stage runs anything.
pub fn reset_child_signals() -> Result<()> {
    for &sig in &CHILD_DEFAULT_SIGNALS {
        unsafe { signal::signal(sig, SigHandler::SigDfl) }
            .chain_err(|| ErrorKind::SystemCall("signal"))?;
    }

    let mut set = SigSet::empty();
    set.add(Signal::SIGCHLD);
    signal::sigprocmask(SigmaskHow::SIG_UNBLOCK, Some(&set), None)
        .chain_err(|| ErrorKind::SystemCall("sigprocmask"))?;
    Ok(())
}

/// Liveness probe backed by `kill(2)`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignalProbe;

impl ProcessProbe for SignalProbe {
    fn is_alive(&self, pid: Pid) -> bool {
        signal::kill(pid, None).is_ok()
    }

    fn terminate(&self, pid: Pid) -> Result<()> {
        signal::kill(pid, Signal::SIGKILL).chain_err(|| ErrorKind::SystemCall("kill"))?;
        Ok(())
    }
}

/// RAII guard that keeps `SIGCHLD` blocked.
///
/// The previous signal mask is restored on drop; a pending `SIGCHLD` is
/// delivered at that point.
#[derive(Debug)]
pub struct SigchldBlock {
    previous: SigSet,
}

impl SigchldBlock {
    pub fn new() -> Result<SigchldBlock> {
        let mut set = SigSet::empty();
        set.add(Signal::SIGCHLD);
        let mut previous = SigSet::empty();
        signal::sigprocmask(SigmaskHow::SIG_BLOCK, Some(&set), Some(&mut previous))
            .chain_err(|| ErrorKind::SystemCall("sigprocmask"))?;
        Ok(SigchldBlock { previous })
    }
}

impl Drop for SigchldBlock {
    fn drop(&mut self) {
        let temp_result = signal::sigprocmask(SigmaskHow::SIG_SETMASK, Some(&self.previous), None);
        log_if_err!(temp_result, "failed to restore signal mask");
    }
}
