//! Container-level attribute parsing for `#[derive(Desensitize)]`.

use syn::{spanned::Spanned, Attribute, Meta, Result};

/// Options parsed from the type's own `#[sensitive]` attribute.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ContainerOptions {
    /// Bare `#[sensitive]`: attributes of this type are subject to masking.
    pub(crate) marked: bool,
}

pub(crate) fn parse_container_options(attrs: &[Attribute]) -> Result<ContainerOptions> {
    let mut options = ContainerOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("sensitive") {
            continue;
        }

        match &attr.meta {
            Meta::Path(_) => {
                if options.marked {
                    return Err(syn::Error::new(
                        attr.span(),
                        "#[sensitive] is specified more than once on this type",
                    ));
                }
                options.marked = true;
            }
            Meta::List(list) => {
                return Err(syn::Error::new_spanned(
                    list,
                    "#[sensitive] on a type takes no arguments; rules belong on fields",
                ));
            }
            Meta::NameValue(nv) => {
                return Err(syn::Error::new_spanned(
                    nv,
                    "name-value syntax is not supported for container-level #[sensitive]",
                ));
            }
        }
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use quote::quote;
    use syn::DeriveInput;

    use super::*;

    fn parse_attrs(tokens: proc_macro2::TokenStream) -> Vec<Attribute> {
        let input: DeriveInput = syn::parse2(quote! {
            #tokens
            struct Dummy;
        })
        .expect("should parse as DeriveInput");
        input.attrs
    }

    #[test]
    fn no_attribute_is_unmarked() {
        let options = parse_container_options(&parse_attrs(quote! {})).unwrap();
        assert!(!options.marked);
    }

    #[test]
    fn bare_sensitive_marks_the_type() {
        let options = parse_container_options(&parse_attrs(quote! { #[sensitive] })).unwrap();
        assert!(options.marked);
    }

    #[test]
    fn arguments_are_rejected() {
        let err = parse_container_options(&parse_attrs(quote! { #[sensitive(Email)] }))
            .unwrap_err();
        assert!(err.to_string().contains("takes no arguments"));
    }

    #[test]
    fn repeated_marker_is_rejected() {
        let result = parse_container_options(&parse_attrs(quote! {
            #[sensitive]
            #[sensitive]
        }));
        assert!(result.is_err());
    }
}
