//! Derive macro for `desensitize`.
//!
//! `#[derive(Desensitize)]` turns `#[sensitive(...)]` attributes into a static
//! descriptor table and emits the `Introspect` and `Walk` implementations the
//! engine traverses through. Nothing is parsed at runtime.
//!
//! Masking itself lives in the main `desensitize` crate.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro2::TokenStream;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, Data, DataStruct, DeriveInput, Result};

mod container;
mod derive_enum;
mod derive_struct;
mod generics;
mod rules;
mod types;
use container::{parse_container_options, ContainerOptions};
use derive_enum::check_enum;
use derive_struct::{derive_struct, StructDeriveOutput};
use generics::add_walk_bounds;

/// Derives `desensitize::Walk` and, for structs, `desensitize::Introspect`.
///
/// # Container Attributes
///
/// - `#[sensitive]` - Marks the type: its attributes are masked wherever a value
///   of this type is reached. Unmarked types are only masked when passed as the
///   wrapper type of a call.
///
/// # Field Attributes
///
/// - **No annotation**: the field is walked; nested marked types are still
///   masked, strings are left alone.
/// - `#[sensitive(Strategy)]`: masks a string, or every string element of a
///   collection, map or array, with a `MaskingStrategy` variant such as `Email`.
/// - `#[sensitive(map(keys = ["password"], strategies = [Password]))]`: masks map
///   values whose key is listed, with the strategy at the same position
///   (`Default` past the end of the list).
/// - `#[sensitive(flex(keys = ["email", "phone"], target = "value", strategies = [Email, Phone]))]`:
///   looks this field's value up in `keys` and masks the sibling field `target`
///   with the matching strategy.
/// - `#[sensitive(null)]`: clears the field to its empty value. Primitive
///   numeric, `bool` and `char` fields are never cleared.
/// - `#[sensitive(skip)]`: the field is never read, masked or walked.
///   `PhantomData<T>` and `&T` fields are skipped implicitly.
///
/// Rules may be combined in one attribute or spread over several.
///
/// Fieldless enums derive a terminal `Walk`. Unions and enums with fields are
/// rejected at compile time.
#[proc_macro_derive(Desensitize, attributes(sensitive))]
pub fn derive_desensitize(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Returns the token stream to reference the desensitize crate root.
///
/// Handles crate renaming (e.g., `masking = { package = "desensitize", ... }`)
/// and internal usage (when derive is used inside the desensitize crate itself).
fn crate_root() -> TokenStream {
    match crate_name("desensitize") {
        Ok(FoundCrate::Itself) => quote! { crate },
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Err(_) => quote! { ::desensitize },
    }
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        attrs,
        ..
    } = input;

    let ContainerOptions { marked } = parse_container_options(&attrs)?;
    let root = crate_root();

    match &data {
        Data::Struct(data) => expand_struct(&ident, &generics, data, marked, &root),
        Data::Enum(data) => {
            check_enum(data, marked, &attrs)?;
            let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
            Ok(quote! {
                #[automatically_derived]
                impl #impl_generics #root::Walk for #ident #ty_generics #where_clause {
                    fn node(&mut self) -> #root::Node<'_> {
                        #root::Node::Scalar
                    }

                    fn clear(&mut self) {}
                }
            })
        }
        Data::Union(u) => Err(syn::Error::new(
            u.union_token.span(),
            "`Desensitize` cannot be derived for unions",
        )),
    }
}

fn expand_struct(
    ident: &syn::Ident,
    generics: &syn::Generics,
    data: &DataStruct,
    marked: bool,
    root: &TokenStream,
) -> Result<TokenStream> {
    let StructDeriveOutput {
        attributes,
        attribute_arms,
        clear_arms,
        clear_all,
        used_generics,
        key_generics,
    } = derive_struct(data, generics, root)?;

    let bounded = add_walk_bounds(generics.clone(), &used_generics, &key_generics, root);
    let (impl_generics, ty_generics, where_clause) = bounded.split_for_impl();

    let unknown = quote! {
        ::core::result::Result::Err(#root::DesensitizeError::unknown_attribute(
            <Self as #root::Introspect>::type_descriptor().type_name,
            index,
        ))
    };

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics #root::Introspect for #ident #ty_generics #where_clause {
            fn type_descriptor() -> &'static #root::EntityDescriptor {
                static DESCRIPTOR: #root::EntityDescriptor = #root::EntityDescriptor {
                    type_name: ::core::concat!(
                        ::core::module_path!(),
                        "::",
                        ::core::stringify!(#ident)
                    ),
                    marked: #marked,
                    attributes: &[#(#attributes),*],
                };
                &DESCRIPTOR
            }

            fn descriptor(&self) -> &'static #root::EntityDescriptor {
                <Self as #root::Introspect>::type_descriptor()
            }

            #[allow(clippy::match_single_binding)]
            fn attribute(
                &mut self,
                index: usize,
            ) -> ::core::result::Result<#root::Node<'_>, #root::DesensitizeError> {
                match index {
                    #(#attribute_arms)*
                    _ => #unknown,
                }
            }

            #[allow(clippy::match_single_binding)]
            fn clear_attribute(
                &mut self,
                index: usize,
            ) -> ::core::result::Result<(), #root::DesensitizeError> {
                match index {
                    #(#clear_arms)*
                    _ => #unknown,
                }
            }
        }

        #[automatically_derived]
        impl #impl_generics #root::Walk for #ident #ty_generics #where_clause {
            fn node(&mut self) -> #root::Node<'_> {
                #root::Node::Entity(self)
            }

            fn clear(&mut self) {
                #(#clear_all)*
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;

    fn expand_tokens(tokens: TokenStream) -> Result<TokenStream> {
        expand(syn::parse2(tokens).expect("should parse as DeriveInput"))
    }

    fn expand_error(tokens: TokenStream) -> String {
        match expand_tokens(tokens) {
            Ok(_) => panic!("expected the derive to fail"),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn strategy_on_scalar_field_is_rejected() {
        let message = expand_error(quote! {
            #[sensitive]
            struct Account {
                #[sensitive(Email)]
                age: u32,
            }
        });
        assert!(message.contains("not to primitive scalars"));
    }

    #[test]
    fn missing_flex_target_is_rejected() {
        let message = expand_error(quote! {
            #[sensitive]
            struct Contact {
                #[sensitive(flex(keys = ["email"], target = "value"))]
                kind: String,
            }
        });
        assert!(message.contains("flex target `value`"));
    }

    #[test]
    fn arguments_on_container_are_rejected() {
        let message = expand_error(quote! {
            #[sensitive(Email)]
            struct Contact {
                email: String,
            }
        });
        assert!(message.contains("takes no arguments"));
    }

    #[test]
    fn unions_and_data_enums_are_rejected() {
        let message = expand_error(quote! {
            union Bits {
                int: u32,
                float: f32,
            }
        });
        assert!(message.contains("cannot be derived for unions"));

        let message = expand_error(quote! {
            enum Contact {
                Email(String),
            }
        });
        assert!(message.contains("enums without fields"));
    }

    #[test]
    fn struct_expands_to_both_impls_with_one_descriptor() {
        let expanded = expand_tokens(quote! {
            #[sensitive]
            struct Login {
                #[sensitive(Password)]
                password: String,
            }
        })
        .unwrap()
        .to_string();
        assert!(expanded.contains("Introspect for Login"));
        assert!(expanded.contains("Walk for Login"));
        assert_eq!(expanded.matches("static DESCRIPTOR").count(), 1);
        assert!(expanded.contains("SimpleMask"));
    }

    #[test]
    fn generic_map_keys_are_bounded() {
        let expanded = expand_tokens(quote! {
            struct Index<K, V> {
                entries: HashMap<K, V>,
            }
        })
        .unwrap()
        .to_string();
        assert!(expanded.contains("MapKey"));
    }
}
