//! Dispatch of the program input, either from the command line or from the standard input.

use std::fmt::Display;
use std::io::{self, BufRead, IsTerminal, Stderr, StdinLock, Stdout, Write};
use std::process::ExitCode;

use crate::config::Config;
use crate::fields::{Arity, FromFields};
use crate::lexer::{self, Lines};
use crate::report::{Reporter, STDIN_PREFIX};
use crate::Error;

/// How the program was invoked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Invoked with `-h` or `--help`: print the usage message.
    Help,

    /// Invoked with `-`, or without arguments and a non-interactive input: read the fields line
    /// by line from the standard input.
    Stdin,

    /// Invoked with an accepted number of arguments: use them as the fields.
    Args,

    /// Invoked with a wrong number of arguments.
    Misuse,
}

impl Mode {
    /// Select the mode from the process arguments, without the program name.
    pub fn select<S: AsRef<str>>(args: &[S], interactive: bool, arity: Arity) -> Self {
        match args {
            [arg] if matches!(arg.as_ref(), "-h" | "--help") => Mode::Help,
            [arg] if arg.as_ref() == "-" => Mode::Stdin,
            [] if !interactive => Mode::Stdin,
            [_, ..] if arity.accepts(args.len()) => Mode::Args,
            _ => Mode::Misuse,
        }
    }
}

/// The outcome of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    /// All the inputs were processed successfully.
    #[default]
    Success,

    /// At least one input failed, or the program was misused.
    Failure,
}

impl Status {
    /// Evaluate if the run succeeded.
    #[inline(always)]
    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => ExitCode::SUCCESS,
            Status::Failure => ExitCode::FAILURE,
        }
    }
}

/// The dispatcher of program input to a user function.
#[derive(Debug)]
pub struct Dispatcher<I, O, E> {
    config: Config,
    input: I,
    out: O,
    err: E,
    interactive: bool,
}

impl Dispatcher<StdinLock<'static>, Stdout, Stderr> {
    /// Create a dispatcher over the standard streams of the process.
    pub fn from_env(config: Config) -> Self {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();

        Dispatcher {
            config,
            input: stdin.lock(),
            out: io::stdout(),
            err: io::stderr(),
            interactive,
        }
    }
}

impl<I, O, E> Dispatcher<I, O, E>
where
    I: BufRead,
    O: Write,
    E: Write,
{
    /// Create a dispatcher over the given streams. The input is considered non-interactive.
    pub fn new(config: Config, input: I, out: O, err: E) -> Self {
        Dispatcher {
            config,
            input,
            out,
            err,
            interactive: false,
        }
    }

    /// Set whether the input is attached to an interactive terminal.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get back the output and error streams.
    pub fn into_outputs(self) -> (O, E) {
        (self.out, self.err)
    }

    /// Run the function `f` on the program input.
    ///
    /// The arguments are those of the process, without the program name. Depending on the
    /// [`Mode`], `f` is called once with the arguments, once per line of the input, or not at
    /// all. An error returned by `f` is reported and makes the run fail, but does not stop the
    /// processing of the next lines.
    pub fn run<S, T, F, R>(&mut self, args: &[S], mut f: F) -> Status
    where
        S: AsRef<str>,
        T: FromFields,
        F: FnMut(T) -> Result<(), R>,
        R: Display,
    {
        let mode = Mode::select(args, self.interactive, T::arity());
        log::debug!("running in {:?} mode with {} argument(s)", mode, args.len());

        let result = match mode {
            Mode::Help => {
                let usage = self.config.usage_message(&T::usage());
                writeln!(self.out, "{usage}").map(|_| Status::Success)
            }

            Mode::Misuse => {
                let usage = self.config.usage_message(&T::usage());
                writeln!(self.err, "{usage}").map(|_| Status::Failure)
            }

            Mode::Args => {
                let fields: Vec<String> = args.iter().map(|x| x.as_ref().to_string()).collect();
                let mut reporter = Reporter::new(self.config.program_name(), &mut self.err);

                apply(&fields, &mut f, &mut reporter).map(|ok| {
                    if ok {
                        Status::Success
                    } else {
                        Status::Failure
                    }
                })
            }

            Mode::Stdin => self.run_lines(&mut f),
        };

        result.unwrap_or_else(|err| {
            log::error!("cannot write program output: {err}");
            Status::Failure
        })
    }

    fn run_lines<T, F, R>(&mut self, f: &mut F) -> io::Result<Status>
    where
        T: FromFields,
        F: FnMut(T) -> Result<(), R>,
        R: Display,
    {
        let arity = T::arity();
        let mut reporter = Reporter::new(STDIN_PREFIX, &mut self.err);
        let mut lines = Lines::new(&mut self.input);
        let mut line = String::new();
        let mut status = Status::Success;

        loop {
            match lines.read_line(&mut line) {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(err) => {
                    reporter.report(&Error::from(err))?;
                    status = Status::Failure;
                    break;
                }
            }

            // Only empty lines are skipped, a blank line still has a wrong number of fields.
            if line.is_empty() {
                continue;
            }

            let fields = lexer::split(&line);
            log::trace!(
                "line ending at {} holds {} field(s)",
                lines.line_number(),
                fields.len()
            );

            // The arity is checked here so that a wrong count does not also report fields.
            if let Err(err) = arity.check(fields.len()) {
                reporter.report(&err)?;
                status = Status::Failure;
                continue;
            }

            if !apply(&fields, f, &mut reporter)? {
                status = Status::Failure;
            }
        }

        Ok(status)
    }
}

/// Build the record from the fields and call `f` with it. Returns whether both succeeded.
fn apply<T, F, R, W>(fields: &[String], f: &mut F, reporter: &mut Reporter<W>) -> io::Result<bool>
where
    T: FromFields,
    F: FnMut(T) -> Result<(), R>,
    R: Display,
    W: Write,
{
    let value = match T::from_fields(fields) {
        Ok(value) => value,
        Err(err) => {
            reporter.report(&err)?;
            return Ok(false);
        }
    };

    match f(value) {
        Ok(()) => Ok(true),
        Err(err) => {
            reporter.error(err)?;
            Ok(false)
        }
    }
}
