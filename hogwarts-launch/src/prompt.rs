//! The overwrite / resume / abort question asked when a run already exists.

use std::io::{self, BufRead, Write};
use std::path::Path;

/// Terminal outcome of the conflict prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    Overwrite,
    Resume,
    Abort,
}

impl ConflictChoice {
    /// `y` overwrites, `r` resumes, anything else aborts.
    pub fn from_answer(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "y" => Self::Overwrite,
            "r" => Self::Resume,
            _ => Self::Abort,
        }
    }
}

/// Ask once and read one line. End of input counts as abort.
///
/// Without `overwrite_allowed` the question offers only resume or abort, and
/// `y` aborts.
pub fn prompt_conflict<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    run_name: &str,
    run_dir: &Path,
    overwrite_allowed: bool,
) -> io::Result<ConflictChoice> {
    let choices = if overwrite_allowed {
        "overwrite/resume/break? [Y/r/n]"
    } else {
        "resume/break? [r/n]"
    };
    write!(
        output,
        "wizard '{run_name}' already exist at {}, {choices} ",
        run_dir.display()
    )?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(ConflictChoice::Abort);
    }
    Ok(match ConflictChoice::from_answer(&line) {
        ConflictChoice::Overwrite if !overwrite_allowed => ConflictChoice::Abort,
        choice => choice,
    })
}
