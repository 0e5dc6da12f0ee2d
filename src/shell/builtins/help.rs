use crate::shell::builtins::{cd::Cd, exit::Exit, history::History, jobs::Jobs, kill::Kill};

use super::prelude::*;

pub struct Help;

impl BuiltinCommand for Help {
    const NAME: &'static str = "help";

    const HELP: &'static str = "help\t\t\t\t\t\t\t\tthis! displays a list of commands";

    fn run(_shell: &mut Shell, _args: &[String], stdout: &mut dyn Write) -> Result<()> {
        for line in &[
            Jobs::HELP,
            Cd::HELP,
            History::HELP,
            Exit::HELP,
            Kill::HELP,
            Help::HELP,
        ] {
            writeln!(stdout, "{}", line)?;
        }

        Ok(())
    }
}
