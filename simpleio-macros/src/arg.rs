//! Field metadata.

use darling::FromField;
use syn::ext::IdentExt;
use syn::{Ident, Path, Type};

/// Field metadata, read from the field and its `#[field(...)]` attribute.
#[derive(Debug, FromField)]
#[darling(attributes(field))]
pub struct MetaArg {
    /// Field identifier.
    pub ident: Option<Ident>,

    /// Type.
    pub ty: Type,

    /// Custom field parser.
    #[darling(default)]
    pub parser: Option<Path>,

    /// Name in the usage message.
    #[darling(default)]
    pub name: Option<String>,
}

impl MetaArg {
    /// Get the name shown in the usage message.
    pub fn usage_name(&self) -> String {
        match (&self.name, &self.ident) {
            (Some(name), _) => name.clone(),
            (None, Some(ident)) => ident.unraw().to_string(),
            (None, None) => String::new(),
        }
    }
}
