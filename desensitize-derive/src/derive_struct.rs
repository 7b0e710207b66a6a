//! Struct-specific derivation: the descriptor table and attribute access.
//!
//! Attributes are numbered in declaration order. The generated `attribute` and
//! `clear_attribute` methods dispatch on that index, and the descriptor lists
//! the same fields in the same order.

use proc_macro2::{Ident, Literal, TokenStream};
use quote::{quote, quote_spanned};
use syn::{ext::IdentExt, spanned::Spanned, DataStruct, Index, Member, Result};

use crate::{
    generics::{collect_generics_from_type, collect_map_key_generics},
    rules::parse_field_rules,
    types::{is_constant_type, is_scalar_type},
};

pub(crate) struct StructDeriveOutput {
    /// `AttributeDescriptor` expressions.
    pub(crate) attributes: Vec<TokenStream>,
    /// `match` arms of `Introspect::attribute`.
    pub(crate) attribute_arms: Vec<TokenStream>,
    /// `match` arms of `Introspect::clear_attribute`.
    pub(crate) clear_arms: Vec<TokenStream>,
    /// Statements of `Walk::clear`.
    pub(crate) clear_all: Vec<TokenStream>,
    pub(crate) used_generics: Vec<Ident>,
    /// Parameters used as map keys.
    pub(crate) key_generics: Vec<Ident>,
}

pub(crate) fn derive_struct(
    data: &DataStruct,
    generics: &syn::Generics,
    root: &TokenStream,
) -> Result<StructDeriveOutput> {
    let members: Vec<(Member, String)> = data
        .fields
        .iter()
        .enumerate()
        .map(|(index, field)| match &field.ident {
            Some(ident) => (Member::Named(ident.clone()), ident.unraw().to_string()),
            None => (Member::Unnamed(Index::from(index)), index.to_string()),
        })
        .collect();

    let mut output = StructDeriveOutput {
        attributes: Vec::new(),
        attribute_arms: Vec::new(),
        clear_arms: Vec::new(),
        clear_all: Vec::new(),
        used_generics: Vec::new(),
        key_generics: Vec::new(),
    };

    for (index, (field, (member, name))) in data.fields.iter().zip(&members).enumerate() {
        let span = field.span();
        let ty = &field.ty;
        let rules = parse_field_rules(&field.attrs)?;
        let constant = rules.skip || is_constant_type(ty);
        rules.validate(ty, constant, span)?;

        if let Some(flex) = &rules.flex {
            let target = flex.target.value();
            if !members.iter().any(|(_, candidate)| *candidate == target) {
                return Err(syn::Error::new(
                    flex.target.span(),
                    format!("flex target `{target}` is not a field of this type"),
                ));
            }
        }

        let primitive = is_scalar_type(ty);
        let rule_tokens = rules.rule_tokens(root);
        output.attributes.push(quote_spanned! { span =>
            #root::AttributeDescriptor {
                name: #name,
                primitive: #primitive,
                constant: #constant,
                rules: &[#(#rule_tokens),*],
            }
        });

        let index = Literal::usize_unsuffixed(index);
        if constant {
            output.attribute_arms.push(quote! {
                #index => ::core::result::Result::Ok(#root::Node::Scalar),
            });
            output.clear_arms.push(quote! {
                #index => ::core::result::Result::Ok(()),
            });
            continue;
        }

        collect_generics_from_type(ty, generics, &mut output.used_generics);
        collect_map_key_generics(ty, generics, &mut output.key_generics);
        output.attribute_arms.push(quote_spanned! { ty.span() =>
            #index => ::core::result::Result::Ok(#root::Walk::node(&mut self.#member)),
        });
        output.clear_arms.push(quote_spanned! { ty.span() =>
            #index => {
                if !<#ty as #root::Walk>::PRIMITIVE {
                    #root::Walk::clear(&mut self.#member);
                }
                ::core::result::Result::Ok(())
            }
        });
        output.clear_all.push(quote_spanned! { ty.span() =>
            #root::Walk::clear(&mut self.#member);
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::{Data, DeriveInput};

    use super::*;

    fn derive(tokens: TokenStream) -> Result<StructDeriveOutput> {
        let input: DeriveInput = syn::parse2(tokens).expect("should parse as DeriveInput");
        let Data::Struct(data) = &input.data else {
            panic!("expected a struct");
        };
        derive_struct(data, &input.generics, &quote! { ::desensitize })
    }

    #[test]
    fn every_field_gets_a_descriptor_and_arms() {
        let output = derive(quote! {
            struct Login {
                #[sensitive(Username)]
                user: String,
                attempts: u32,
            }
        })
        .unwrap();
        assert_eq!(output.attributes.len(), 2);
        assert_eq!(output.attribute_arms.len(), 2);
        assert_eq!(output.clear_arms.len(), 2);
        assert_eq!(output.clear_all.len(), 2);
        assert!(output.attributes[0].to_string().contains("\"user\""));
    }

    #[test]
    fn constant_fields_are_not_cleared() {
        let output = derive(quote! {
            struct Tagged<'a, T> {
                label: &'a str,
                #[sensitive(skip)]
                cached: String,
                marker: PhantomData<T>,
            }
        })
        .unwrap();
        assert!(output.clear_all.is_empty());
        assert!(output.used_generics.is_empty());
        assert!(output.attributes[1].to_string().contains("constant : true"));
    }

    #[test]
    fn tuple_fields_are_named_by_position() {
        let output = derive(quote! {
            struct Pair(#[sensitive(Email)] String, Option<String>);
        })
        .unwrap();
        assert!(output.attributes[1].to_string().contains("\"1\""));
    }

    #[test]
    fn raw_identifiers_are_unrawed() {
        let output = derive(quote! {
            struct Keyword {
                r#type: String,
            }
        })
        .unwrap();
        assert!(output.attributes[0].to_string().contains("\"type\""));
    }

    #[test]
    fn generic_fields_collect_bounds() {
        let output = derive(quote! {
            struct Envelope<T> {
                data: Option<T>,
            }
        })
        .unwrap();
        assert_eq!(output.used_generics.len(), 1);
        assert!(output.key_generics.is_empty());
    }

    #[test]
    fn generic_map_keys_are_collected() {
        let output = derive(quote! {
            struct Index<K, V> {
                entries: HashMap<K, V>,
            }
        })
        .unwrap();
        assert_eq!(output.used_generics.len(), 2);
        assert_eq!(output.key_generics.len(), 1);
        assert_eq!(output.key_generics[0], "K");
    }

    #[test]
    fn unknown_flex_target_errors() {
        let result = derive(quote! {
            struct Contact {
                #[sensitive(flex(keys = ["email"], target = "missing"))]
                kind: String,
            }
        });
        let Err(err) = result else {
            panic!("expected an error");
        };
        assert!(err.to_string().contains("flex target `missing`"));
    }
}
