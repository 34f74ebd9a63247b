//! simpleio, take the input of a simple program either from its command line arguments or from
//! shell-like lines on its standard input.
//!
//! ```no_run
//! use simpleio::{Config, Fields};
//!
//! /// Sleep for the given number of seconds.
//! #[derive(Fields)]
//! struct Args {
//!     seconds: u64,
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     simpleio::run(Config::from_env(), |args: Args| {
//!         std::thread::sleep(std::time::Duration::from_secs(args.seconds));
//!         Ok::<_, String>(())
//!     })
//! }
//! ```
#![deny(missing_docs)]

use std::process::ExitCode;

pub use simpleio_lexer as lexer;
pub use simpleio_macros as macros;

pub use macros::Fields;

pub mod config;
pub mod dispatch;
pub mod field;
pub mod fields;
pub mod report;

pub use config::Config;
pub use dispatch::{Dispatcher, Mode, Status};
pub use field::{FieldError, FieldParser, from_str};
pub use fields::{Arity, FromFields};

/// Defines the possible errors that may occur during usage of the crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An error comes from reading the input lines.
    #[error(transparent)]
    Lexer(#[from] lexer::Error),

    /// One or more fields cannot be converted to their target type.
    #[error("{}", join_fields(.0))]
    Fields(Vec<FieldError>),

    /// A line holds less fields than expected.
    #[error("too few arguments")]
    TooFewArguments,

    /// A line holds more fields than expected.
    #[error("too many arguments")]
    TooManyArguments,
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Run the function `f` on the input of the current process. See [`Dispatcher::run`].
pub fn run<T, F, R>(config: Config, f: F) -> ExitCode
where
    T: FromFields,
    F: FnMut(T) -> Result<(), R>,
    R: std::fmt::Display,
{
    let args: Vec<String> = std::env::args().skip(1).collect();

    Dispatcher::from_env(config).run(&args, f).into()
}
