use nix::unistd::Pid;

use super::prelude::*;
use crate::core::job::JobSelector;

pub struct Kill;

impl BuiltinCommand for Kill {
    const NAME: &'static str = "kill";

    const HELP: &'static str =
        "kill [num or %num]\t\t\t\t\t\tkills the process with pid num or job %num";

    fn run(shell: &mut Shell, args: &[String], stdout: &mut dyn Write) -> Result<()> {
        let arg = match args.first() {
            Some(arg) if !arg.is_empty() => arg,
            _ => {
                bail!(ErrorKind::Usage("Kill %number"));
            }
        };

        let killed = match parse_selector(arg) {
            Some(selector) => shell.kill_job(selector)?,
            None => None,
        };

        match killed {
            Some(pid) => {
                writeln!(stdout, "Process killed: {}", pid)?;
                Ok(())
            }
            None => Err(ErrorKind::NoSuchProcess(arg.clone()).into()),
        }
    }
}

/// `%N` names a job by its listing id, anything else must be a pid.
fn parse_selector(arg: &str) -> Option<JobSelector> {
    if arg.starts_with('%') {
        arg[1..].parse::<usize>().ok().map(JobSelector::Id)
    } else {
        arg.parse::<i32>()
            .ok()
            .filter(|pid| *pid > 0)
            .map(|pid| JobSelector::Pid(Pid::from_raw(pid)))
    }
}
