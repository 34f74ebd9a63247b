//! Typed records built from a list of fields.

use std::fmt::Display;
use std::str::FromStr;

use crate::Error;
use crate::field::{FieldError, FieldParser, from_str};

/// The number of fields a record accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Arity {
    /// Exactly this number of fields.
    Exactly(usize),

    /// This number of fields or more.
    AtLeast(usize),
}

impl Arity {
    /// Evaluate if the given number of fields is accepted.
    #[inline(always)]
    pub fn accepts(self, count: usize) -> bool {
        self.check(count).is_ok()
    }

    /// Check the given number of fields.
    pub fn check(self, count: usize) -> Result<(), Error> {
        match self {
            Arity::Exactly(n) | Arity::AtLeast(n) if count < n => Err(Error::TooFewArguments),
            Arity::Exactly(n) if count > n => Err(Error::TooManyArguments),
            _ => Ok(()),
        }
    }
}

/// A record that can be built from a list of fields.
///
/// Implemented for `Vec<T>` (any non-zero number of fields of the same type), for tuples of up
/// to six elements, and for structs with `#[derive(Fields)]`.
pub trait FromFields: Sized {
    /// The number of fields expected.
    fn arity() -> Arity;

    /// The argument part of the usage message, e.g. `seconds` for a program sleeping for a number
    /// of seconds. Empty when unknown.
    fn usage() -> String {
        String::new()
    }

    /// Build the record from the given fields.
    fn from_fields(fields: &[String]) -> Result<Self, Error>;
}

/// A cursor over fields collecting every conversion error, so that all the invalid fields of a
/// record are reported at once.
#[derive(Debug)]
pub struct FieldReader<'a> {
    fields: std::slice::Iter<'a, String>,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    /// Create a reader over the given fields.
    pub fn new(fields: &'a [String]) -> Self {
        FieldReader {
            fields: fields.iter(),
            errors: Vec::new(),
        }
    }

    /// Parse the next field. Returns `None` if the field is missing or invalid, in which case
    /// the error is recorded.
    pub fn next_with<P: FieldParser>(&mut self, parser: &P) -> Option<P::Output> {
        let field = self.fields.next()?;

        match parser.parse_field(field) {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(err);
                None
            }
        }
    }

    /// Parse all the remaining fields, keeping the valid ones.
    pub fn rest_with<P: FieldParser>(&mut self, parser: &P) -> Vec<P::Output> {
        let mut values = Vec::with_capacity(self.fields.len());

        for field in self.fields.by_ref() {
            match parser.parse_field(field) {
                Ok(value) => values.push(value),
                Err(err) => self.errors.push(err),
            }
        }

        values
    }

    /// Finish reading. Fails with all the recorded errors, if any.
    pub fn finish(self) -> Result<(), Error> {
        if self.errors.is_empty() {
            return Ok(());
        }

        Err(Error::Fields(self.errors))
    }
}

impl<T> FromFields for Vec<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn arity() -> Arity {
        Arity::AtLeast(1)
    }

    fn usage() -> String {
        String::from("...")
    }

    fn from_fields(fields: &[String]) -> Result<Self, Error> {
        Self::arity().check(fields.len())?;

        let mut reader = FieldReader::new(fields);
        let values = reader.rest_with(&from_str::<T>());
        reader.finish()?;

        Ok(values)
    }
}

macro_rules! make_from_fields_impl {
    ($count:literal; $($ty:ident $var:ident),+) => {
        impl<$($ty),+> FromFields for ($($ty,)+)
        where
            $($ty: FromStr, $ty::Err: Display,)+
        {
            fn arity() -> Arity {
                Arity::Exactly($count)
            }

            fn from_fields(fields: &[String]) -> Result<Self, Error> {
                Self::arity().check(fields.len())?;

                let mut reader = FieldReader::new(fields);
                $(let $var = reader.next_with(&from_str::<$ty>());)+
                reader.finish()?;

                match ($($var,)+) {
                    ($(Some($var),)+) => Ok(($($var,)+)),
                    _ => Err(Error::TooFewArguments),
                }
            }
        }
    };
}

make_from_fields_impl!(1; A a);
make_from_fields_impl!(2; A a, B b);
make_from_fields_impl!(3; A a, B b, C c);
make_from_fields_impl!(4; A a, B b, C c, D d);
make_from_fields_impl!(5; A a, B b, C c, D d, E e);
make_from_fields_impl!(6; A a, B b, C c, D d, E e, F f);
