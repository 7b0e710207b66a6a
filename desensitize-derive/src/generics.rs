//! Trait bounds for generic parameters.
//!
//! Only parameters that appear in walked fields get a `Walk` bound. Constant
//! fields (`PhantomData<T>`, `&T`, `#[sensitive(skip)]`) never reach the
//! engine, so
//!
//! ```ignore
//! struct TypedId<T> {
//!     id: String,
//!     _marker: PhantomData<T>,
//! }
//! ```
//!
//! derives for any `T`.
//!
//! Parameters used directly as the key of a `HashMap` or `BTreeMap` also get a
//! `MapKey` bound.

use proc_macro2::TokenStream;
use syn::{parse_quote, Ident};

pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    match ty {
        syn::Type::Path(path) => {
            for segment in &path.path.segments {
                if segment.ident == "PhantomData" {
                    return;
                }
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    for arg in &args.args {
                        if let syn::GenericArgument::Type(inner) = arg {
                            collect_generics_from_type(inner, generics, result);
                        }
                    }
                }
            }
            if let Some(ident) = path.path.get_ident() {
                let is_param = generics.type_params().any(|param| &param.ident == ident);
                if is_param && !result.contains(ident) {
                    result.push(ident.clone());
                }
            }
        }
        syn::Type::Array(array) => collect_generics_from_type(&array.elem, generics, result),
        syn::Type::Slice(slice) => collect_generics_from_type(&slice.elem, generics, result),
        syn::Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                collect_generics_from_type(elem, generics, result);
            }
        }
        syn::Type::Group(group) => collect_generics_from_type(&group.elem, generics, result),
        syn::Type::Paren(paren) => collect_generics_from_type(&paren.elem, generics, result),
        _ => {}
    }
}

/// Collects parameters that appear bare in the key position of a map.
pub(crate) fn collect_map_key_generics(
    ty: &syn::Type,
    generics: &syn::Generics,
    result: &mut Vec<Ident>,
) {
    match ty {
        syn::Type::Path(path) => {
            for segment in &path.path.segments {
                if segment.ident == "PhantomData" {
                    return;
                }
                let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
                    continue;
                };
                let is_map = segment.ident == "HashMap" || segment.ident == "BTreeMap";
                let mut types = args.args.iter().filter_map(|arg| match arg {
                    syn::GenericArgument::Type(inner) => Some(inner),
                    _ => None,
                });
                if is_map {
                    if let Some(syn::Type::Path(key)) = types.next() {
                        if let Some(ident) = key.path.get_ident() {
                            let is_param =
                                generics.type_params().any(|param| &param.ident == ident);
                            if is_param && !result.contains(ident) {
                                result.push(ident.clone());
                            }
                        }
                    }
                }
                for inner in types {
                    collect_map_key_generics(inner, generics, result);
                }
            }
        }
        syn::Type::Array(array) => collect_map_key_generics(&array.elem, generics, result),
        syn::Type::Slice(slice) => collect_map_key_generics(&slice.elem, generics, result),
        syn::Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                collect_map_key_generics(elem, generics, result);
            }
        }
        syn::Type::Group(group) => collect_map_key_generics(&group.elem, generics, result),
        syn::Type::Paren(paren) => collect_map_key_generics(&paren.elem, generics, result),
        _ => {}
    }
}

/// Adds `Walk` bounds to generic parameters used in walked fields, and
/// `MapKey` bounds to those used as map keys.
pub(crate) fn add_walk_bounds(
    mut generics: syn::Generics,
    used_generics: &[Ident],
    key_generics: &[Ident],
    root: &TokenStream,
) -> syn::Generics {
    for param in generics.type_params_mut() {
        if used_generics.contains(&param.ident) {
            param.bounds.push(parse_quote!(#root::Walk));
        }
        if key_generics.contains(&param.ident) {
            param.bounds.push(parse_quote!(#root::MapKey));
        }
    }
    generics
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::DeriveInput;

    use super::*;

    fn generics_of(tokens: TokenStream) -> syn::Generics {
        let input: DeriveInput = syn::parse2(tokens).expect("should parse as DeriveInput");
        input.generics
    }

    fn collect(ty: TokenStream, generics: &syn::Generics) -> Vec<String> {
        let ty: syn::Type = syn::parse2(ty).expect("should parse as Type");
        let mut used = Vec::new();
        collect_generics_from_type(&ty, generics, &mut used);
        used.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn nested_parameters_are_collected_once() {
        let generics = generics_of(quote! { struct S<K, V>; });
        assert_eq!(collect(quote! { HashMap<K, Vec<V>> }, &generics), ["K", "V"]);
        assert_eq!(collect(quote! { Option<Option<K>> }, &generics), ["K"]);
    }

    #[test]
    fn phantom_data_is_ignored() {
        let generics = generics_of(quote! { struct S<T>; });
        assert!(collect(quote! { PhantomData<T> }, &generics).is_empty());
    }

    #[test]
    fn arrays_expose_their_element() {
        let generics = generics_of(quote! { struct S<T>; });
        assert_eq!(collect(quote! { [T; 3] }, &generics), ["T"]);
    }

    #[test]
    fn bounds_are_added_only_to_used_parameters() {
        let generics = generics_of(quote! { struct S<A, B>; });
        let used = vec![Ident::new("A", proc_macro2::Span::call_site())];
        let bounded = add_walk_bounds(generics, &used, &[], &quote! { ::desensitize });
        let params: Vec<_> = bounded.type_params().collect();
        assert_eq!(params[0].bounds.len(), 1);
        assert!(params[1].bounds.is_empty());
    }

    fn collect_keys(ty: TokenStream, generics: &syn::Generics) -> Vec<String> {
        let ty: syn::Type = syn::parse2(ty).expect("should parse as Type");
        let mut keys = Vec::new();
        collect_map_key_generics(&ty, generics, &mut keys);
        keys.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn map_key_parameters_are_collected() {
        let generics = generics_of(quote! { struct S<K, V>; });
        assert_eq!(collect_keys(quote! { HashMap<K, V> }, &generics), ["K"]);
        assert_eq!(
            collect_keys(quote! { Option<BTreeMap<K, HashMap<V, String>>> }, &generics),
            ["K", "V"]
        );
        assert!(collect_keys(quote! { Vec<K> }, &generics).is_empty());
        assert!(collect_keys(quote! { HashMap<String, K> }, &generics).is_empty());
    }

    #[test]
    fn map_key_parameters_get_both_bounds() {
        let generics = generics_of(quote! { struct S<K, V>; });
        let k = Ident::new("K", proc_macro2::Span::call_site());
        let v = Ident::new("V", proc_macro2::Span::call_site());
        let bounded = add_walk_bounds(
            generics,
            &[k.clone(), v],
            &[k],
            &quote! { ::desensitize },
        );
        let params: Vec<_> = bounded.type_params().collect();
        assert_eq!(params[0].bounds.len(), 2);
        assert_eq!(params[1].bounds.len(), 1);
    }
}
