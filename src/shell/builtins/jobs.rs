use super::prelude::*;

pub struct Jobs;

impl BuiltinCommand for Jobs {
    const NAME: &'static str = "jobs";

    const HELP: &'static str = "jobs\t\t\t\t\t\t\t\tDisplays a list of background jobs";

    fn run(shell: &mut Shell, _args: &[String], stdout: &mut dyn Write) -> Result<()> {
        for listing in shell.list_jobs() {
            writeln!(stdout, "{}", listing)?;
        }

        Ok(())
    }
}
