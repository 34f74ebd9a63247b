//! Derive macro implementation.

use darling::FromField;
use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{Data, DataStruct, DeriveInput, Fields, FieldsNamed};

use crate::arg::MetaArg;
use crate::ty::{Ty, get_inner_ty};

pub fn run(item: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(item) {
        Ok(x) => x,
        Err(e) => return e.to_compile_error(),
    };

    try_run(&input).unwrap_or_else(|err| err.write_errors())
}

pub fn try_run(input: &DeriveInput) -> darling::Result<TokenStream> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(ref fields),
            ..
        }) => fields,

        _ => {
            return Err(darling::Error::custom(
                "#[derive(Fields)] only supports structs with named fields",
            )
            .with_span(&input.ident));
        }
    };

    let args = collect_args_meta(fields)?;
    let arity = build_arity(&args);
    let usage = build_usage(&args);
    let body = build_from_fields(&args);

    Ok(quote! {
        impl #impl_generics simpleio::fields::FromFields for #ident #ty_generics #where_clause {
            fn arity() -> simpleio::fields::Arity {
                #arity
            }

            fn usage() -> String {
                String::from(#usage)
            }

            #[allow(unreachable_patterns)]
            fn from_fields(__fields: &[String]) -> Result<Self, simpleio::Error> {
                #body
            }
        }
    })
}

fn collect_args_meta(fields: &FieldsNamed) -> darling::Result<Vec<MetaArg>> {
    let mut errors = darling::Error::accumulator();

    let args = fields
        .named
        .iter()
        .filter_map(|x| errors.handle(MetaArg::from_field(x)))
        .collect::<Vec<_>>();

    // A sequence takes all the remaining fields, so it can only come last.
    if let Some((_, init)) = args.split_last() {
        for arg in init.iter().filter(|x| Ty::from_syn_ty(&x.ty) == Ty::Vec) {
            errors.push(
                darling::Error::custom("a `Vec` field must be the last field of the struct")
                    .with_span(&arg.ty),
            );
        }
    }

    errors.finish_with(args)
}

fn has_trailing_vec(args: &[MetaArg]) -> bool {
    args.last()
        .is_some_and(|x| Ty::from_syn_ty(&x.ty) == Ty::Vec)
}

fn build_arity(args: &[MetaArg]) -> TokenStream {
    let count = args.len();

    if has_trailing_vec(args) {
        quote!(simpleio::fields::Arity::AtLeast(#count))
    } else {
        quote!(simpleio::fields::Arity::Exactly(#count))
    }
}

fn build_usage(args: &[MetaArg]) -> String {
    let mut names = args.iter().map(MetaArg::usage_name).collect::<Vec<_>>();

    if has_trailing_vec(args) {
        if let Some(last) = names.last_mut() {
            last.push_str("...");
        }
    }

    names.join(" ")
}

fn build_arg_parser(arg: &MetaArg) -> TokenStream {
    let ty = &arg.ty;
    let inner_ty = get_inner_ty(ty);

    match &arg.parser {
        Some(path) => quote_spanned!(path.span()=> #path),
        None => quote_spanned!(inner_ty.span()=> simpleio::field::from_str::<#inner_ty>()),
    }
}

fn build_arg_reader(arg: &MetaArg) -> TokenStream {
    let ident = &arg.ident;
    let parser = build_arg_parser(arg);

    match Ty::from_syn_ty(&arg.ty) {
        Ty::Vec => quote! {
            let #ident = __reader.rest_with(&#parser);
        },

        Ty::Simple => quote! {
            let #ident = __reader.next_with(&#parser);
        },
    }
}

fn build_from_fields(args: &[MetaArg]) -> TokenStream {
    let readers = args.iter().map(build_arg_reader);

    let idents = args.iter().map(|x| &x.ident).collect::<Vec<_>>();
    let simple = args
        .iter()
        .filter(|x| Ty::from_syn_ty(&x.ty) == Ty::Simple)
        .map(|x| &x.ident)
        .collect::<Vec<_>>();

    quote! {
        Self::arity().check(__fields.len())?;

        let mut __reader = simpleio::fields::FieldReader::new(__fields);
        #(#readers)*
        __reader.finish()?;

        match (#(#simple,)*) {
            (#(Some(#simple),)*) => Ok(Self { #(#idents),* }),
            _ => Err(simpleio::Error::TooFewArguments),
        }
    }
}
