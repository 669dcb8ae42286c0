//! Procedural macros for Tawsil.
//!
//! `#[derive(Injectable)]` attaches the ordered dependency identifiers of a
//! struct and generates its constructor, so the container can build it
//! without any hand-written wiring.

use darling::ast::{Data, Style};
use darling::util::Ignored;
use darling::{FromDeriveInput, FromField};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{DeriveInput, Generics, Ident, Path, Type, parse_macro_input};

/// A struct field, in declaration order.
#[derive(FromField)]
#[darling(attributes(inject))]
struct InjectField {
    ident: Option<Ident>,
    ty: Type,
    /// Identifier to resolve; `None` leaves the parameter absent.
    #[darling(default)]
    id: Option<String>,
}

#[derive(FromDeriveInput)]
#[darling(attributes(injectable), supports(struct_named, struct_unit))]
struct InjectableInput {
    ident: Ident,
    generics: Generics,
    data: Data<Ignored, InjectField>,
    /// Path of the runtime crate, `::tawsil` unless overridden.
    #[darling(default, rename = "crate")]
    krate: Option<Path>,
}

/// Derives `Injectable` for a struct.
///
/// Every named field is one positional constructor parameter:
/// - `#[inject(id = "ILogger")]` resolves `ILogger` and converts it into the
///   field type (`Injected<T>`, `Option<Injected<T>>` or `LazyRef`)
/// - a field without the attribute is not injected and starts as
///   `Default::default()`
///
/// ```rust,ignore
/// #[derive(Injectable)]
/// struct UserService {
///     #[inject(id = "IUserRepo")]
///     repo: Injected<UserRepo>,
///     requests: AtomicU64,
///     #[inject(id = "ILogger")]
///     logger: Injected<ConsoleLogger>,
/// }
/// // DEPENDENCIES == [Some("IUserRepo"), None, Some("ILogger")]
/// ```
///
/// Use `#[injectable(crate = "path")]` when the runtime is not reachable as
/// `::tawsil`.
#[proc_macro_derive(Injectable, attributes(inject, injectable))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.write_errors().into(),
    }
}

fn expand(input: &DeriveInput) -> darling::Result<TokenStream2> {
    let parsed = InjectableInput::from_derive_input(input)?;
    let krate = parsed
        .krate
        .unwrap_or_else(|| syn::parse_quote!(::tawsil));
    let ident = &parsed.ident;
    let (impl_generics, ty_generics, where_clause) = parsed.generics.split_for_impl();

    let fields = parsed
        .data
        .take_struct()
        .ok_or_else(|| darling::Error::unsupported_shape("enum"))?;

    let mut errors = darling::Error::accumulator();
    let mut dependencies = Vec::new();
    let mut initializers = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let Some(name) = field.ident.as_ref() else {
            errors.push(darling::Error::unsupported_shape("tuple struct").with_span(&field.ty));
            continue;
        };

        match field.id.as_deref() {
            Some("") => {
                errors.push(
                    darling::Error::custom("service identifier must not be empty")
                        .with_span(name),
                );
            }
            Some(id) => {
                dependencies.push(quote!(::core::option::Option::Some(#id)));
                initializers.push(quote!(#name: args.inject(#index)?));
            }
            None => {
                dependencies.push(quote!(::core::option::Option::None));
                initializers.push(quote!(#name: ::core::default::Default::default()));
            }
        }
    }

    errors.finish()?;

    let injects_any = fields.iter().any(|field| field.id.is_some());
    let args = if injects_any { quote!(args) } else { quote!(_args) };
    let body = if matches!(fields.style, Style::Unit) {
        quote!(Self)
    } else {
        quote!(Self { #(#initializers),* })
    };

    Ok(quote! {
        impl #impl_generics #krate::Injectable for #ident #ty_generics #where_clause {
            const DEPENDENCIES: &'static [::core::option::Option<&'static str>] = &[#(#dependencies),*];

            fn construct(#args: &#krate::Arguments) -> #krate::Result<Self> {
                ::core::result::Result::Ok(#body)
            }
        }
    })
}
