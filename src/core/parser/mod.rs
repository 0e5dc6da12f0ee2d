//! Yosh line parser
//!
//! Splits a line into words and the operators `|`, `<`, `>` and a trailing
//! `&`. Quoted words keep their quotes; they are removed later, together with
//! tilde expansion, when the pipeline is prepared for execution.
//!
//! A quoted segment always ends a word: `echo 'a'b` has the arguments `'a'`
//! and `b`. Quote removal only strips a pair enclosing a whole word, so a
//! word is never partly quoted.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::errors::{ErrorKind, Result};

pub use self::ast::{Builtin, Command, Invocation, PipelineSpec, Redirect};

pub mod ast;

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r#"'[^']*'|"[^"]*"|[|<>&]|[^\s|<>&]+"#)
        .expect("token pattern is valid");
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Pipe,
    Input,
    Output,
    Background,
}

fn tokenize(line: &str) -> Vec<Token<'_>> {
    TOKEN
        .find_iter(line)
        .map(|m| match m.as_str() {
            "|" => Token::Pipe,
            "<" => Token::Input,
            ">" => Token::Output,
            "&" => Token::Background,
            word => Token::Word(word),
        })
        .collect()
}

impl PipelineSpec {
    /// Parse `input`. Returns `None` for a blank line.
    pub fn parse(input: &str) -> Result<Option<PipelineSpec>> {
        let tokens = tokenize(input);
        if tokens.is_empty() {
            return Ok(None);
        }

        let syntax_error = || ErrorKind::Syntax(input.trim().to_string());
        let mut commands = Vec::new();
        let mut words: Vec<String> = Vec::new();
        let mut stdin: Option<Redirect> = None;
        let mut stdout: Option<Redirect> = None;
        let mut background = false;

        let mut tokens = tokens.into_iter().peekable();
        while let Some(token) = tokens.next() {
            if background {
                // `&` is only allowed as the last token
                return Err(syntax_error().into());
            }

            match token {
                Token::Word(word) => words.push(word.to_string()),
                Token::Pipe => {
                    if words.is_empty() {
                        return Err(syntax_error().into());
                    }
                    commands.push(Command::new(words.split_off(0)));
                }
                Token::Input | Token::Output => {
                    let target = match tokens.peek() {
                        Some(Token::Word(word)) => Some(word.to_string()),
                        _ => None,
                    };
                    if target.is_some() {
                        tokens.next();
                    }
                    let redirect = if token == Token::Input {
                        &mut stdin
                    } else {
                        &mut stdout
                    };
                    redirect.get_or_insert_with(Redirect::default).record(target);
                }
                Token::Background => background = true,
            }
        }

        if words.is_empty() {
            return Err(syntax_error().into());
        }
        commands.push(Command::new(words));

        let spec = PipelineSpec {
            commands,
            stdin,
            stdout,
            background,
        };
        debug!("parsed PipelineSpec: {:?}", spec);
        Ok(Some(spec))
    }
}
