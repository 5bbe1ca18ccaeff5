use crate::types::UpdaterError;
use anyhow::Result;
use console::style;
use std::io::{BufRead, Write};

pub const PROMPT: &str = "(y/n)? >";
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// How yes/no questions get answered for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    /// Ask on the terminal, up to `max_attempts` invalid answers.
    Interactive { max_attempts: usize },
    AssumeYes,
    AssumeNo,
}

impl Default for Confirm {
    fn default() -> Self {
        Confirm::Interactive {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Confirm {
    pub fn from_flags(yes: bool, no: bool) -> Self {
        match (yes, no) {
            (true, _) => Confirm::AssumeYes,
            (_, true) => Confirm::AssumeNo,
            _ => Confirm::default(),
        }
    }

    /// Print `question` and reduce the answer to a boolean.
    pub fn ask<R: BufRead, W: Write>(
        &self,
        question: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<bool> {
        writeln!(output, "{}", question)?;
        match *self {
            Confirm::AssumeYes => {
                writeln!(output, "{} y", PROMPT)?;
                Ok(true)
            }
            Confirm::AssumeNo => {
                writeln!(output, "{} n", PROMPT)?;
                Ok(false)
            }
            Confirm::Interactive { max_attempts } => read_yes_no(input, output, max_attempts),
        }
    }
}

/// Prompt until a line reads `y` or `n` (any case).
///
/// Fails when input ends or after `max_attempts` unusable answers.
pub fn read_yes_no<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    max_attempts: usize,
) -> Result<bool> {
    for attempt in 1..=max_attempts {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Err(UpdaterError::PromptClosed.into());
        }

        match line.trim().to_lowercase().as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            other => {
                tracing::debug!("Rejected answer {:?} (attempt {})", other, attempt);
                writeln!(
                    output,
                    "{}",
                    style("Invalid input, please type 'y' or 'n'.").yellow()
                )?;
            }
        }
    }

    Err(UpdaterError::TooManyInvalidAnswers {
        attempts: max_attempts,
    }
    .into())
}
