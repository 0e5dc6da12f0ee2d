//! The shell session.
//!
//! A [`Shell`] owns everything a command line runs against: its configuration,
//! the background job table, the command history and the last exit status.
//! Builtins and the pipeline executor receive it explicitly.

use std::env;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::path::Path;
use std::process::{self, ExitStatus};

use log::{debug, error, info};
use nix::unistd::Pid;

use crate::core::expansion;
use crate::core::history::HistoryState;
use crate::core::job::{JobListing, JobSelector, JobTable, ProcessProbe};
use crate::core::parser::PipelineSpec;
use crate::editor::Editor;
use crate::errors::{ErrorKind, Result, ResultExt};
use crate::util::YoshExitStatusExt;

use self::job_control::SignalProbe;

pub mod builtins;
pub mod execute_command;
pub mod job_control;
pub mod redirection;

/// Number of history entries kept unless configured otherwise.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Policy object to control a Shell's behavior
#[derive(Debug, Copy, Clone)]
pub struct ShellConfig {
    /// Determines if the shell ignores keyboard signals and prompts with a line editor.
    interactive: bool,

    /// Determines if new command entries will be added to the shell's command history.
    ///
    /// Note: This is checked before the other command history config fields.
    enable_command_history: bool,

    /// Number of entries to store in the shell's command history
    command_history_capacity: usize,

    /// Determines if some messages (e.g. the banner) should be displayed.
    display_messages: bool,
}

impl ShellConfig {
    /// Creates an interactive shell, e.g. command history, prompt
    ///
    /// # Complete List
    /// - Command History is enabled, including `!` expansions
    /// - `SIGINT` and `SIGQUIT` are ignored by the shell itself
    /// - The banner is displayed
    pub fn interactive(command_history_capacity: usize) -> Self {
        Self {
            interactive: true,
            enable_command_history: true,
            command_history_capacity,
            display_messages: true,
        }
    }

    /// Creates a noninteractive shell, e.g. no command history
    ///
    /// # Complete List
    /// - Command History is disabled. Commands are not saved and history expansions are not
    ///   performed. The history builtin command is not affected by this option.
    /// - Signals keep their default dispositions.
    /// - No banner is displayed.
    pub fn noninteractive() -> Self {
        Default::default()
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            interactive: false,
            enable_command_history: false,
            command_history_capacity: DEFAULT_HISTORY_CAPACITY,
            display_messages: false,
        }
    }
}

pub struct Shell {
    config: ShellConfig,
    jobs: JobTable,
    history: HistoryState,
    probe: Box<dyn ProcessProbe>,
    /// Exit status of last command executed.
    last_exit_status: ExitStatus,
}

impl Shell {
    /// Constructs a new Shell, installing the child reaper.
    pub fn new(config: ShellConfig) -> Result<Self> {
        job_control::install_reaper()?;
        if config.interactive {
            job_control::ignore_interactive_signals()?;
        }

        let shell = Shell::with_probe(config, Box::new(SignalProbe));
        info!("yosh started up");
        Ok(shell)
    }

    /// Constructs a Shell without touching process-wide signal state.
    pub(crate) fn with_probe(config: ShellConfig, probe: Box<dyn ProcessProbe>) -> Self {
        Self {
            config,
            jobs: JobTable::default(),
            history: HistoryState::with_capacity(config.command_history_capacity),
            probe,
            last_exit_status: ExitStatus::from_success(),
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.config.interactive
    }

    pub fn last_exit_status(&self) -> ExitStatus {
        self.last_exit_status
    }

    pub fn history(&self) -> &HistoryState {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryState {
        &mut self.history
    }

    pub fn add_job(&mut self, pid: Pid, command: &str) {
        self.jobs.add(pid, command);
    }

    pub fn list_jobs(&mut self) -> Vec<JobListing> {
        self.jobs.list(&*self.probe)
    }

    pub fn kill_job(&mut self, selector: JobSelector) -> Result<Option<Pid>> {
        self.jobs.kill(selector, &*self.probe)
    }

    pub fn has_running_jobs(&mut self) -> bool {
        self.jobs.has_running_jobs(&*self.probe)
    }

    /// Runs one command line and returns its exit status.
    ///
    /// Errors are reported on stderr; they never end the session.
    pub fn execute_command_string(&mut self, input: &str) -> ExitStatus {
        let status = match self.run_line(input) {
            Ok(status) => status,
            Err(e) => {
                debug!("'{}' failed: {:?}", input, e);
                eprintln!("{}", e.describe());
                ExitStatus::from_status(e.status_code())
            }
        };

        self.last_exit_status = status;
        status
    }

    fn run_line(&mut self, input: &str) -> Result<ExitStatus> {
        let mut line = input.trim().to_string();
        if line.is_empty() {
            return Ok(self.last_exit_status);
        }

        if self.config.enable_command_history {
            if let Some(expanded) = self.history.expand(&line)? {
                eprintln!("{}", expanded);
                line = expanded;
            }
            self.history.push(&line);
        }

        let spec = match PipelineSpec::parse(&line)? {
            Some(spec) => spec,
            None => return Ok(self.last_exit_status),
        };
        // redirect targets are tilde-expanded when they are opened
        let spec = spec.map_words(expansion::expand_word, |target| {
            expansion::strip_quotes(target).to_string()
        });

        execute_command::dispatch(self, spec)
    }

    /// Runs every line of the script at `path`.
    pub fn execute_commands_from_file(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)
            .chain_err(|| ErrorKind::NoSuchFile(path.display().to_string()))?;

        for line in BufReader::new(file).lines() {
            let line = line.chain_err(|| ErrorKind::SystemCall("read"))?;
            self.execute_command_string(&line);
        }

        Ok(())
    }

    /// Runs commands from stdin until end of input.
    pub fn execute_from_stdin(&mut self) {
        if self.config.display_messages {
            println!("This is the YOSH version {}", env!("CARGO_PKG_VERSION"));
        }

        if self.config.interactive && io::stdin().is_terminal() {
            self.execute_from_editor();
        } else {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        self.execute_command_string(&line);
                    }
                    Err(e) => {
                        error!("failed to read from stdin: {}", e);
                        break;
                    }
                }
            }
        }
    }

    fn execute_from_editor(&mut self) {
        let mut editor = match Editor::new() {
            Ok(editor) => editor,
            Err(e) => {
                error!("failed to create line editor: {}", e);
                eprintln!("{}", e.describe());
                return;
            }
        };

        loop {
            let line = match editor.readline(&self.prompt()) {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    error!("failed to read a line: {}", e);
                    eprintln!("Unable to read command");
                    break;
                }
            };

            editor.add_history_entry(&line);
            self.execute_command_string(&line);
        }
    }

    fn prompt(&self) -> String {
        let cwd = env::current_dir()
            .map(|cwd| cwd.display().to_string())
            .unwrap_or_else(|_| "?".to_string());
        format!("{{yosh}}:{}$ ", cwd)
    }

    /// Ends the session with `status`, or the last exit status if `None`.
    pub fn exit(&mut self, status: Option<ExitStatus>) -> ! {
        let code = status.unwrap_or(self.last_exit_status).code_like_u8();
        log_if_err!(io::stdout().flush(), "failed to flush stdout on exit");

        info!("yosh has shut down with status {}", code);
        process::exit(code);
    }
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("config", &self.config)
            .field("jobs", &self.jobs)
            .field("history", &self.history)
            .field("last_exit_status", &self.last_exit_status)
            .finish()
    }
}
