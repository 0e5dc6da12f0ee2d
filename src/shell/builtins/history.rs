use serde_derive::Deserialize;

use super::prelude::*;

pub struct History;

const USAGE: &str = "
Usage:
    history [-s <size>] [<n>]

Options:
    -s <size>   Set the number of commands kept in the history.
";

#[derive(Debug, Deserialize)]
struct HistoryArgs {
    flag_s: Option<String>,
    arg_n: Option<String>,
}

impl BuiltinCommand for History {
    const NAME: &'static str = "history";

    const HELP: &'static str = "history [OPTIONAL -s num or OPTIONAL num]\t\t\tdisplays the command history. \
                                -s num sets the history buffer. num lists num elements";

    fn run(shell: &mut Shell, args: &[String], stdout: &mut dyn Write) -> Result<()> {
        let args: HistoryArgs = parse_args(USAGE, Self::NAME, args)?;

        if let Some(size) = args.flag_s {
            match size.parse::<usize>() {
                Ok(n) if n >= 1 => shell.history_mut().set_capacity(n),
                _ => {
                    bail!(ErrorKind::InvalidArgument(
                        "History buffer must be an integer of at least 1".into()
                    ));
                }
            }
            return Ok(());
        }

        let last = match args.arg_n {
            Some(n) => match n.parse::<usize>() {
                Ok(n) => Some(n),
                Err(_) => {
                    bail!(ErrorKind::InvalidArgument(format!(
                        "yosh: history: {}: numeric argument required",
                        n
                    )));
                }
            },
            None => None,
        };

        for line in shell.history().display(last) {
            writeln!(stdout, "{}", line)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::core::parser::Builtin;
    use crate::shell::builtins::tests::{fake_shell, run_builtin};

    #[test]
    fn test_history_lists_numbered_entries() {
        let mut shell = fake_shell(&[]);
        for line in &["ls", "echo hi", "pwd"] {
            shell.history_mut().push(line);
        }

        let (status, stdout, _) = run_builtin(&mut shell, Builtin::History, &[]);
        assert_eq!(status, 0);
        let lines: Vec<&str> = stdout.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("0001: ") && lines[0].ends_with(": ls"));
        assert!(lines[2].starts_with("0003: ") && lines[2].ends_with(": pwd"));

        let (_, stdout, _) = run_builtin(&mut shell, Builtin::History, &["2"]);
        let lines: Vec<&str> = stdout.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(": echo hi"));
    }

    #[test]
    fn test_history_set_size_truncates() {
        let mut shell = fake_shell(&[]);
        for i in 0..6 {
            shell.history_mut().push(&format!("cmd{}", i));
        }

        let (status, stdout, _) = run_builtin(&mut shell, Builtin::History, &["-s", "3"]);
        assert_eq!(status, 0);
        assert!(stdout.is_empty());
        assert_eq!(shell.history().capacity(), 3);
        assert_eq!(shell.history().len(), 3);
    }

    #[test]
    fn test_history_rejects_bad_sizes() {
        let mut shell = fake_shell(&[]);
        for size in &["0", "lots"] {
            let (status, _, result) = run_builtin(&mut shell, Builtin::History, &["-s", *size]);
            assert_eq!(status, 1);
            assert_eq!(
                result.unwrap_err().describe(),
                "History buffer must be an integer of at least 1"
            );
        }
        assert_eq!(shell.history().capacity(), 10);
    }

    #[test]
    fn test_history_rejects_unknown_arguments() {
        let mut shell = fake_shell(&[]);
        let (status, _, result) = run_builtin(&mut shell, Builtin::History, &["-x"]);
        assert!(result.is_err());
        assert_eq!(status, 2);

        let (status, _, result) = run_builtin(&mut shell, Builtin::History, &["many"]);
        assert!(result.is_err());
        assert_eq!(status, 1);
    }
}
