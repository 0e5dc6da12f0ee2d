use super::prelude::*;

pub struct Exit;

impl BuiltinCommand for Exit {
    const NAME: &'static str = "exit";

    const HELP: &'static str =
        "exit\t\t\t\t\t\t\t\texits out if there are no background commands running";

    /// Refuses to leave while a background job is alive.
    fn run(shell: &mut Shell, _args: &[String], stdout: &mut dyn Write) -> Result<()> {
        if shell.has_running_jobs() {
            writeln!(stdout, "There are still jobs running!")?;
            return Ok(());
        }

        let status = if shell.is_interactive() {
            ExitStatus::from_success()
        } else {
            shell.last_exit_status()
        };
        shell.exit(Some(status));
    }
}
