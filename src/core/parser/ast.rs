use std::fmt;
use std::str::FromStr;

/// Commands implemented inside the shell.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Builtin {
    Cd,
    Exit,
    Help,
    History,
    Jobs,
    Kill,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Cd => "cd",
            Builtin::Exit => "exit",
            Builtin::Help => "help",
            Builtin::History => "history",
            Builtin::Jobs => "jobs",
            Builtin::Kill => "kill",
        }
    }
}

impl FromStr for Builtin {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "cd" => Ok(Builtin::Cd),
            "exit" => Ok(Builtin::Exit),
            "help" => Ok(Builtin::Help),
            "history" => Ok(Builtin::History),
            "jobs" => Ok(Builtin::Jobs),
            "kill" => Ok(Builtin::Kill),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CommandKind {
    Builtin(Builtin),
    External,
}

/// What running a command means, with its arguments (program name excluded).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Invocation<'a> {
    Builtin(Builtin, &'a [String]),
    External(&'a str, &'a [String]),
}

/// One stage of a pipeline. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Command {
    argv: Vec<String>,
    kind: CommandKind,
}

impl Command {
    /// # Panics
    /// Panics if `argv` is empty.
    pub fn new(argv: Vec<String>) -> Self {
        assert!(!argv.is_empty(), "a command needs a program name");
        let kind = argv[0]
            .parse::<Builtin>()
            .map(CommandKind::Builtin)
            .unwrap_or(CommandKind::External);
        Self { argv, kind }
    }

    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn invocation(&self) -> Invocation<'_> {
        match self.kind {
            CommandKind::Builtin(builtin) => Invocation::Builtin(builtin, self.args()),
            CommandKind::External => Invocation::External(self.program(), self.args()),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv.join(" "))
    }
}

/// A `<` or `>` seen while parsing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Redirect {
    /// `None` when the operator was not followed by a filename.
    pub target: Option<String>,
    /// How many times this direction was redirected on the line.
    pub occurrences: usize,
}

impl Redirect {
    pub fn to(target: &str) -> Self {
        Self {
            target: Some(target.to_string()),
            occurrences: 1,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        self.occurrences > 1
    }

    pub(crate) fn record(&mut self, target: Option<String>) {
        self.occurrences += 1;
        if self.target.is_none() {
            self.target = target;
        }
    }
}

/// Everything the executor needs to know about one input line.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineSpec {
    /// Stage 0 through stage k-1
    pub commands: Vec<Command>,
    pub stdin: Option<Redirect>,
    pub stdout: Option<Redirect>,
    /// Run the pipeline in the background, defaults to false
    pub background: bool,
}

impl PipelineSpec {
    pub fn has_redirects(&self) -> bool {
        self.stdin.is_some() || self.stdout.is_some()
    }

    /// The single command of a pipeline without pipes.
    pub fn simple_command(&self) -> Option<&Command> {
        if self.commands.len() == 1 {
            self.commands.first()
        } else {
            None
        }
    }

    /// Rebuilds every argument through `word` and every redirect target through `path`.
    pub fn map_words<F, G>(self, word: F, path: G) -> PipelineSpec
    where
        F: Fn(&str) -> String,
        G: Fn(&str) -> String,
    {
        let map_redirect = |r: Redirect| Redirect {
            target: r.target.as_ref().map(|t| path(t.as_str())),
            occurrences: r.occurrences,
        };

        PipelineSpec {
            commands: self
                .commands
                .iter()
                .map(|c| Command::new(c.argv().iter().map(|w| word(w.as_str())).collect()))
                .collect(),
            stdin: self.stdin.map(&map_redirect),
            stdout: self.stdout.map(&map_redirect),
            background: self.background,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn classifies_exact_builtin_names_only() {
        assert_eq!(
            Command::new(argv(&["jobs"])).invocation(),
            Invocation::Builtin(Builtin::Jobs, &[][..])
        );
        assert_eq!(
            Command::new(argv(&["exitcode"])).invocation(),
            Invocation::External("exitcode", &[][..])
        );
        assert_eq!(
            Command::new(argv(&["cdrom"])).invocation(),
            Invocation::External("cdrom", &[][..])
        );
    }

    #[test]
    fn invocation_splits_program_and_args() {
        let kill = Command::new(argv(&["kill", "%1"]));
        assert_eq!(
            kill.invocation(),
            Invocation::Builtin(Builtin::Kill, &["%1".to_string()][..])
        );

        let ls = Command::new(argv(&["ls", "-l"]));
        assert_eq!(
            ls.invocation(),
            Invocation::External("ls", &["-l".to_string()][..])
        );
        assert_eq!(ls.to_string(), "ls -l");
    }

    #[test]
    fn map_words_reclassifies_commands() {
        let spec = PipelineSpec {
            commands: vec![Command::new(argv(&["'cd'", "~"]))],
            stdin: None,
            stdout: Some(Redirect::to("'out'")),
            background: false,
        };
        let spec = spec.map_words(
            |w| w.trim_matches('\'').replace('~', "/home/me"),
            |t| t.trim_matches('\'').to_string(),
        );
        assert_eq!(
            spec.commands[0].invocation(),
            Invocation::Builtin(Builtin::Cd, &["/home/me".to_string()][..])
        );
        assert_eq!(spec.stdout.unwrap().target, Some("out".to_string()));
    }
}
