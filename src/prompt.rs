use std::io::{self, BufRead, Write};
use tracing::debug;

use crate::error::{Error, Result};

/// Outcome of a single-choice prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// Zero-based index of the chosen option
    Chosen(usize),
    /// The user entered an empty line
    Cancelled,
}

/// Blocking line-based terminal interaction
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Console::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Print numbered options and read one answer.
    ///
    /// An empty answer cancels. Anything that is not a number in range is a
    /// usage error; there is no re-prompt.
    pub fn pick_one<S: AsRef<str>>(&mut self, prompt: &str, options: &[S]) -> Result<Pick> {
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "{}) {}", i + 1, option.as_ref())?;
        }
        write!(
            self.output,
            "{} (1-{}, empty to cancel): ",
            prompt,
            options.len()
        )?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a selection was made",
            )));
        }

        let answer = line.trim();
        if answer.is_empty() {
            debug!("Selection cancelled at {:?}", prompt);
            return Ok(Pick::Cancelled);
        }

        match answer.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => Ok(Pick::Chosen(n - 1)),
            _ => Err(Error::Usage(format!("invalid selection: {:?}", answer))),
        }
    }
}
