//! Syntactic classification of field types.

const PRIMITIVES: [&str; 16] = [
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize", "f32",
    "f64", "bool", "char",
];

/// Checks if a type is spelled as a bare numeric, `bool` or `char` type.
///
/// Aliases and qualified paths such as `std::primitive::i32` are not
/// recognized here; `Walk::PRIMITIVE` catches those at runtime.
pub(crate) fn is_scalar_type(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Path(path) if path.qself.is_none() => path
            .path
            .get_ident()
            .is_some_and(|ident| PRIMITIVES.iter().any(|primitive| ident == primitive)),
        syn::Type::Group(group) => is_scalar_type(&group.elem),
        syn::Type::Paren(paren) => is_scalar_type(&paren.elem),
        _ => false,
    }
}

/// Checks if a field type is never read or written by the engine.
///
/// Shared references cannot be mutated through the owner, and `PhantomData`
/// holds nothing.
pub(crate) fn is_constant_type(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Reference(reference) => reference.mutability.is_none(),
        syn::Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "PhantomData"),
        syn::Type::Group(group) => is_constant_type(&group.elem),
        syn::Type::Paren(paren) => is_constant_type(&paren.elem),
        _ => false,
    }
}
