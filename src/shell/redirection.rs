//! Opens the files a pipeline's first stage reads from and its last stage
//! writes to.
//!
//! Everything is checked and opened in the shell before any stage is forked,
//! so a bad redirect aborts the whole pipeline without spawning anything.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;

use log::debug;

use crate::core::expansion;
use crate::core::parser::Redirect;
use crate::errors::{Direction, ErrorKind, Result, ResultExt};

/// Files bound to the pipeline's endpoints. Both are close-on-exec.
#[derive(Debug, Default)]
pub struct ResolvedRedirects {
    pub stdin: Option<File>,
    pub stdout: Option<File>,
}

/// Validates and opens the pipeline's redirects, input first.
pub fn resolve(stdin: Option<&Redirect>, stdout: Option<&Redirect>) -> Result<ResolvedRedirects> {
    let mut resolved = ResolvedRedirects::default();

    if let Some(redirect) = stdin {
        let path = target_path(redirect, Direction::Input)?;
        resolved.stdin = Some(open_input(path)?);
    }

    if let Some(redirect) = stdout {
        let path = target_path(redirect, Direction::Output)?;
        resolved.stdout = Some(create_output(path)?);
    }

    Ok(resolved)
}

fn target_path(redirect: &Redirect, direction: Direction) -> Result<PathBuf> {
    if redirect.is_ambiguous() {
        bail!(ErrorKind::AmbiguousRedirect(direction));
    }

    match redirect.target {
        Some(ref target) => {
            let home = dirs::home_dir();
            Ok(PathBuf::from(expansion::expand_tilde(target, home.as_deref())))
        }
        None => {
            bail!(ErrorKind::MissingRedirectTarget);
        }
    }
}

fn open_input(path: PathBuf) -> Result<File> {
    match File::open(&path) {
        Ok(file) => {
            debug!("redirecting input from {}", path.display());
            Ok(file)
        }
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
            bail!(ErrorKind::NoSuchFile(path.display().to_string()));
        }
        Err(e) => Err(e).chain_err(|| ErrorKind::SystemCall("open")),
    }
}

/// Output files are never overwritten: the target must not exist yet.
fn create_output(path: PathBuf) -> Result<File> {
    let result = OpenOptions::new()
        .append(true)
        .create_new(true)
        .mode(0o644)
        .open(&path);

    match result {
        Ok(file) => {
            debug!("redirecting output to {}", path.display());
            Ok(file)
        }
        Err(ref e) if e.kind() == io::ErrorKind::AlreadyExists => {
            bail!(ErrorKind::FileExists(path.display().to_string()));
        }
        Err(e) => Err(e).chain_err(|| ErrorKind::SystemCall("open")),
    }
}
