use std::fmt;

use rustyline::{error::ReadlineError, DefaultEditor};

use crate::errors::Result;

/// Line editor behind the interactive prompt, with arrow-key recall.
pub struct Editor {
    internal: DefaultEditor,
}

impl Editor {
    pub fn new() -> Result<Editor> {
        Ok(Editor {
            internal: DefaultEditor::new()?,
        })
    }

    /// Reads one line. Returns `None` at end of input; a line interrupted with
    /// Ctrl-C comes back empty.
    pub fn readline(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.internal.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(e) => Err(e.into()),
        }
    }

    pub fn add_history_entry(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        let temp_result = self.internal.add_history_entry(line);
        log_if_err!(temp_result, "failed to add '{}' to the line editor", line);
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Editor")
    }
}
