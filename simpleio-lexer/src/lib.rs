//! A shell-like lexer for line-oriented program input.
//!
//! Input goes through two stages. The [`lines`] module assembles logical lines from a byte
//! stream (joining continued lines and lines spanned by a quoted region), and the [`words`]
//! module splits one line into fields, resolving quotes and backslash escapes.
#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

extern crate alloc;

#[cfg(feature = "std")]
pub mod lines;
pub mod quote;
pub mod words;

#[cfg(feature = "std")]
pub use lines::{Lines, LogicalLine, lines};
pub use quote::QuoteState;
pub use words::{Words, max_words, split};

/// Defines the errors that may occur while assembling lines from a stream.
#[cfg(feature = "std")]
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The underlying stream failed for a reason other than end of input. This includes input
    /// that is not valid UTF-8, reported with [`std::io::ErrorKind::InvalidData`].
    #[error("cannot read input: {0}")]
    Stream(#[from] std::io::Error),
}
