//! Reporting of errors to the user.

use std::fmt::Display;
use std::io::{self, Write};

use crate::Error;

/// Prefix of error messages when the input comes from the standard input.
pub const STDIN_PREFIX: &str = "error";

/// A writer of `prefix: message` error lines.
#[derive(Debug)]
pub struct Reporter<W> {
    prefix: String,
    out: W,
}

impl<W: Write> Reporter<W> {
    /// Create a reporter writing to `out` with the given prefix.
    pub fn new(prefix: impl Into<String>, out: W) -> Self {
        Reporter {
            prefix: prefix.into(),
            out,
        }
    }

    /// Get the message prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Write one error message.
    pub fn error(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.out, "{}: {}", self.prefix, message)
    }

    /// Write the messages for the given error. Each invalid field gets its own line.
    pub fn report(&mut self, err: &Error) -> io::Result<()> {
        match err {
            Error::Fields(errors) => errors.iter().try_for_each(|x| self.error(x)),
            other => self.error(other),
        }
    }

    /// Get back the output.
    pub fn into_inner(self) -> W {
        self.out
    }
}
