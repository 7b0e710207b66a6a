//! Enum derivation.
//!
//! Only fieldless enums are accepted. They classify as terminal values, the
//! same way the engine treats numbers and booleans.

use syn::{spanned::Spanned, Attribute, DataEnum, Fields, Result};

pub(crate) fn check_enum(data: &DataEnum, marked: bool, attrs: &[Attribute]) -> Result<()> {
    if marked {
        let span = attrs
            .iter()
            .find(|attr| attr.path().is_ident("sensitive"))
            .map_or_else(|| data.enum_token.span(), Spanned::span);
        return Err(syn::Error::new(
            span,
            "#[sensitive] has no effect on an enum: fieldless enums are never masked",
        ));
    }

    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.fields.span(),
                "`Desensitize` can only be derived for enums without fields; wrap the data in a \
                 struct instead",
            ));
        }
        if let Some(attr) = variant
            .attrs
            .iter()
            .find(|attr| attr.path().is_ident("sensitive"))
        {
            return Err(syn::Error::new(
                attr.span(),
                "#[sensitive] is not supported on enum variants",
            ));
        }
    }
    Ok(())
}
