//! Derive macros for simpleio.

use proc_macro::TokenStream;

mod arg;
mod derive;
mod ty;

/// Derive `simpleio::fields::FromFields` for a struct with named fields.
///
/// Fields are read in declaration order. A trailing `Vec<T>` field takes all the remaining
/// fields. The `#[field(...)]` attribute accepts:
/// - `parser = "path"`, a `simpleio::FieldParser` to use instead of `FromStr`;
/// - `name = "..."`, the name shown in the usage message instead of the field name.
#[proc_macro_derive(Fields, attributes(field))]
pub fn derive_fields(item: TokenStream) -> TokenStream {
    derive::run(item.into()).into()
}
