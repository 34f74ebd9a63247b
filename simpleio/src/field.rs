//! Parsers converting a single field into a typed value.

use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::str::FromStr;

/// An error raised when a field cannot be converted. It displays as `field: reason`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct FieldError {
    field: String,
    reason: String,
}

impl FieldError {
    /// Create an error for the given field text.
    pub fn new(field: impl Into<String>, reason: impl Display) -> Self {
        FieldError {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// Get the text of the field that failed.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the reason of the failure.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A conversion from the text of a field into a typed value.
///
/// Every closure `Fn(&str) -> Result<T, E>` with a displayable `E` is a field parser, and so is
/// [`from_str`] for any type implementing [`FromStr`].
pub trait FieldParser {
    /// Type of the parsed value.
    type Output;

    /// Parse the field.
    fn parse_field(&self, field: &str) -> Result<Self::Output, FieldError>;

    /// Narrow this parser with a predicate. Values accepted by this parser are passed on to the
    /// predicate, which rejects those that are well-formed but still invalid for the program
    /// (e.g. a negative count).
    fn restrict<P, E>(self, predicate: P) -> Restrict<Self, P>
    where
        Self: Sized,
        P: Fn(&Self::Output) -> Result<(), E>,
        E: Display,
    {
        Restrict {
            parser: self,
            predicate,
        }
    }
}

impl<F, T, E> FieldParser for F
where
    F: Fn(&str) -> Result<T, E>,
    E: Display,
{
    type Output = T;

    fn parse_field(&self, field: &str) -> Result<T, FieldError> {
        self(field).map_err(|err| FieldError::new(field, err))
    }
}

/// A field parser delegating to [`FromStr`].
pub struct FromStrParser<T>(PhantomData<fn() -> T>);

impl<T> fmt::Debug for FromStrParser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FromStrParser")
    }
}

impl<T> Clone for FromStrParser<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FromStrParser<T> {}

impl<T> FieldParser for FromStrParser<T>
where
    T: FromStr,
    T::Err: Display,
{
    type Output = T;

    #[inline(always)]
    fn parse_field(&self, field: &str) -> Result<T, FieldError> {
        field.parse::<T>().map_err(|err| FieldError::new(field, err))
    }
}

/// Create a field parser for any type implementing [`FromStr`].
#[inline(always)]
pub fn from_str<T>() -> FromStrParser<T>
where
    T: FromStr,
    T::Err: Display,
{
    FromStrParser(PhantomData)
}

/// A field parser narrowed by a predicate, see [`FieldParser::restrict`].
#[derive(Clone, Copy, Debug)]
pub struct Restrict<P, F> {
    parser: P,
    predicate: F,
}

impl<P, F, E> FieldParser for Restrict<P, F>
where
    P: FieldParser,
    F: Fn(&P::Output) -> Result<(), E>,
    E: Display,
{
    type Output = P::Output;

    fn parse_field(&self, field: &str) -> Result<Self::Output, FieldError> {
        let value = self.parser.parse_field(field)?;

        (self.predicate)(&value)
            .map(|_| value)
            .map_err(|err| FieldError::new(field, err))
    }
}
