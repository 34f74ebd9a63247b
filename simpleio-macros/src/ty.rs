//! Type helpers.

use syn::{GenericArgument, Path, PathArguments, PathSegment, Type, TypePath};

/// Type variants that are supported by the derive.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Ty {
    /// A sequence taking all the remaining fields.
    Vec,

    /// A single field.
    Simple,
}

impl Ty {
    pub(crate) fn from_syn_ty(ty: &Type) -> Self {
        if get_ty_param_if_name(ty, "Vec").is_some() {
            Ty::Vec
        } else {
            Ty::Simple
        }
    }
}

/// Get the type of a single field, i.e. the element type of a `Vec`.
pub(crate) fn get_inner_ty(ty: &Type) -> &Type {
    match Ty::from_syn_ty(ty) {
        Ty::Vec => get_ty_param_if_name(ty, "Vec").unwrap_or(ty),
        Ty::Simple => ty,
    }
}

// These following helpers have been taken from the `clap` crate.

pub(crate) fn get_ty_param_if_name<'a>(ty: &'a Type, name: &str) -> Option<&'a Type> {
    only_last_path_segment(ty)
        .filter(|segment| segment.ident == name)
        .and_then(|segment| {
            if let PathArguments::AngleBracketed(args) = &segment.arguments {
                // NOTE: Only consider the first type parameter, which is assumed to hold
                // inner type.
                args.args.iter().next().and_then(|arg| {
                    if let GenericArgument::Type(ty) = arg {
                        Some(ty)
                    } else {
                        None
                    }
                })
            } else {
                None
            }
        })
}

pub(crate) fn only_last_path_segment(mut ty: &Type) -> Option<&PathSegment> {
    // Types coming from `macro_rules!` expansion can be wrapped in invisible groups.
    while let Type::Group(syn::TypeGroup { elem, .. }) = ty {
        ty = elem;
    }

    match ty {
        Type::Path(TypePath {
            qself: None,
            path:
                Path {
                    leading_colon: None,
                    segments,
                },
        }) => only_one(segments.iter()),

        _ => None,
    }
}

pub(crate) fn only_one<I, T>(mut iter: I) -> Option<T>
where
    I: Iterator<Item = T>,
{
    iter.next().filter(|_| iter.next().is_none())
}
