use std::env;
use std::path::PathBuf;

use log::warn;

use super::prelude::*;
use crate::core::expansion;

pub struct Cd;

impl BuiltinCommand for Cd {
    const NAME: &'static str = "cd";

    const HELP: &'static str =
        "cd [directory name]\t\t\t\t\t\tMoves into a [directory name], if it exists";

    fn run(_shell: &mut Shell, args: &[String], _stdout: &mut dyn Write) -> Result<()> {
        let home = dirs::home_dir();
        let dir = match args {
            [] => match home {
                Some(home) => home,
                None => {
                    bail!(ErrorKind::InvalidArgument("yosh: cd: HOME not set".into()));
                }
            },
            [dir] => PathBuf::from(expansion::expand_tilde(dir, home.as_deref())),
            _ => {
                bail!(ErrorKind::Usage("CD destination"));
            }
        };

        // a failed chdir is reported but does not fail the command
        if let Err(e) = env::set_current_dir(&dir) {
            warn!("cd to {} failed: {}", dir.display(), e);
            eprintln!("yosh: cd: {}: {}", dir.display(), e);
        }

        Ok(())
    }
}
