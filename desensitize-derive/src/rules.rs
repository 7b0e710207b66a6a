//! Parsing of `#[sensitive(...)]` field attributes.
//!
//! One field may carry several `#[sensitive(...)]` attributes, each holding a
//! comma-separated list of rules. They are merged into one [`FieldRules`] and
//! validated against the field type before any code is generated.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{
    meta::ParseNestedMeta,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    Attribute, Ident, LitStr, Meta, Result, Token,
};

use crate::types::is_scalar_type;

/// Variant names of `MaskingStrategy`, checked here for better error messages.
const STRATEGIES: [&str; 8] = [
    "Default", "Username", "Password", "Email", "Phone", "IdCard", "BankCard", "Address",
];

/// `keys = [..], strategies = [..]`, shared by `map(..)` and `flex(..)`.
#[derive(Clone, Debug)]
pub(crate) struct KeyedSpec {
    pub(crate) keys: Vec<LitStr>,
    pub(crate) strategies: Vec<Ident>,
}

/// `flex(keys = [..], target = "..", strategies = [..])`.
#[derive(Clone, Debug)]
pub(crate) struct FlexSpec {
    pub(crate) keyed: KeyedSpec,
    pub(crate) target: LitStr,
}

/// Every rule declared on one field.
///
/// | Attribute | Rule |
/// |-----------|------|
/// | `#[sensitive(Email)]` | `SimpleMask(Email)` |
/// | `#[sensitive(map(keys = [..], strategies = [..]))]` | `MapKeyedMask` |
/// | `#[sensitive(null)]` | `NullOut` |
/// | `#[sensitive(flex(keys = [..], target = "..", strategies = [..]))]` | `FlexMask` |
/// | `#[sensitive(skip)]` | constant attribute, no rules |
#[derive(Clone, Debug, Default)]
pub(crate) struct FieldRules {
    pub(crate) skip: bool,
    pub(crate) simple: Option<Ident>,
    pub(crate) map: Option<KeyedSpec>,
    pub(crate) null_out: bool,
    pub(crate) flex: Option<FlexSpec>,
}

impl FieldRules {
    fn has_rules(&self) -> bool {
        self.simple.is_some() || self.map.is_some() || self.null_out || self.flex.is_some()
    }

    fn has_masking(&self) -> bool {
        self.simple.is_some() || self.map.is_some() || self.flex.is_some()
    }

    /// Rejects combinations that cannot mean anything for a field of type `ty`.
    pub(crate) fn validate(&self, ty: &syn::Type, constant: bool, span: Span) -> Result<()> {
        if self.skip && self.has_rules() {
            return Err(syn::Error::new(
                span,
                "`skip` cannot be combined with other #[sensitive] rules",
            ));
        }
        if constant && !self.skip && self.has_rules() {
            return Err(syn::Error::new(
                span,
                "rules have no effect on constant fields (`&T` and `PhantomData<T>` are never \
                 touched)",
            ));
        }
        if self.simple.is_some() && self.map.is_some() {
            return Err(syn::Error::new(
                span,
                "a masking strategy and `map(..)` cannot be used on the same field",
            ));
        }
        if self.has_masking() && is_scalar_type(ty) {
            return Err(syn::Error::new(
                ty.span(),
                "masking rules apply to string-like fields, not to primitive scalars",
            ));
        }
        Ok(())
    }

    /// `AttributeRule` constructors for the descriptor table.
    pub(crate) fn rule_tokens(&self, root: &TokenStream) -> Vec<TokenStream> {
        let mut rules = Vec::new();
        if let Some(strategy) = &self.simple {
            rules.push(quote! {
                #root::AttributeRule::SimpleMask(#root::MaskingStrategy::#strategy)
            });
        }
        if let Some(KeyedSpec { keys, strategies }) = &self.map {
            let strategies = strategy_paths(root, strategies);
            rules.push(quote! {
                #root::AttributeRule::MapKeyedMask {
                    keys: &[#(#keys),*],
                    strategies: &[#(#strategies),*],
                }
            });
        }
        if self.null_out {
            rules.push(quote! { #root::AttributeRule::NullOut });
        }
        if let Some(FlexSpec {
            keyed: KeyedSpec { keys, strategies },
            target,
        }) = &self.flex
        {
            let strategies = strategy_paths(root, strategies);
            rules.push(quote! {
                #root::AttributeRule::FlexMask {
                    keys: &[#(#keys),*],
                    target: #target,
                    strategies: &[#(#strategies),*],
                }
            });
        }
        rules
    }
}

fn strategy_paths(root: &TokenStream, strategies: &[Ident]) -> Vec<TokenStream> {
    strategies
        .iter()
        .map(|strategy| quote! { #root::MaskingStrategy::#strategy })
        .collect()
}

fn set_flag(flag: &mut bool, rule: &str, span: Span) -> Result<()> {
    if *flag {
        return Err(syn::Error::new(
            span,
            format!("`{rule}` is specified more than once on the same field"),
        ));
    }
    *flag = true;
    Ok(())
}

fn set_once<T>(slot: &mut Option<T>, value: T, rule: &str, span: Span) -> Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new(
            span,
            format!("multiple {rule} rules specified on the same field"),
        ));
    }
    *slot = Some(value);
    Ok(())
}

fn check_strategy(ident: &Ident) -> Result<()> {
    if STRATEGIES.contains(&ident.to_string().as_str()) {
        Ok(())
    } else {
        Err(syn::Error::new(
            ident.span(),
            format!(
                "unknown masking strategy `{ident}`; expected one of {}",
                STRATEGIES.join(", ")
            ),
        ))
    }
}

fn parse_bracketed<T: Parse>(input: ParseStream<'_>) -> Result<Vec<T>> {
    let content;
    syn::bracketed!(content in input);
    let items = Punctuated::<T, Token![,]>::parse_terminated(&content)?;
    Ok(items.into_iter().collect())
}

#[derive(Default)]
struct KeyedArgs {
    keys: Option<Vec<LitStr>>,
    target: Option<LitStr>,
    strategies: Vec<Ident>,
}

fn parse_keyed_args(meta: &ParseNestedMeta<'_>, rule: &str) -> Result<KeyedArgs> {
    let accepts_target = rule == "flex";
    let mut args = KeyedArgs::default();
    meta.parse_nested_meta(|inner| {
        if inner.path.is_ident("keys") {
            args.keys = Some(parse_bracketed(inner.value()?)?);
            Ok(())
        } else if inner.path.is_ident("strategies") {
            let strategies: Vec<Ident> = parse_bracketed(inner.value()?)?;
            strategies.iter().try_for_each(check_strategy)?;
            args.strategies = strategies;
            Ok(())
        } else if accepts_target && inner.path.is_ident("target") {
            args.target = Some(inner.value()?.parse()?);
            Ok(())
        } else {
            let expected = if accepts_target {
                "`keys`, `target` or `strategies`"
            } else {
                "`keys` or `strategies`"
            };
            Err(inner.error(format!("unknown `{rule}` argument; expected {expected}")))
        }
    })?;
    Ok(args)
}

fn parse_rule(rules: &mut FieldRules, meta: &ParseNestedMeta<'_>) -> Result<()> {
    let span = meta.path.span();
    if meta.path.is_ident("skip") {
        set_flag(&mut rules.skip, "skip", span)
    } else if meta.path.is_ident("null") {
        set_flag(&mut rules.null_out, "null", span)
    } else if meta.path.is_ident("map") {
        let args = parse_keyed_args(meta, "map")?;
        let keys = args
            .keys
            .ok_or_else(|| meta.error("`map(..)` requires `keys = [..]`"))?;
        let spec = KeyedSpec {
            keys,
            strategies: args.strategies,
        };
        set_once(&mut rules.map, spec, "`map`", span)
    } else if meta.path.is_ident("flex") {
        let args = parse_keyed_args(meta, "flex")?;
        let keys = args
            .keys
            .ok_or_else(|| meta.error("`flex(..)` requires `keys = [..]`"))?;
        let target = args
            .target
            .ok_or_else(|| meta.error("`flex(..)` requires `target = \"..\"`"))?;
        let spec = FlexSpec {
            keyed: KeyedSpec {
                keys,
                strategies: args.strategies,
            },
            target,
        };
        set_once(&mut rules.flex, spec, "`flex`", span)
    } else if let Some(ident) = meta.path.get_ident() {
        check_strategy(ident)?;
        set_once(&mut rules.simple, ident.clone(), "masking strategy", span)
    } else {
        Err(meta.error(
            "expected a masking strategy (e.g. `Email`), `null`, `skip`, `map(..)` or `flex(..)`",
        ))
    }
}

pub(crate) fn parse_field_rules(attrs: &[Attribute]) -> Result<FieldRules> {
    let mut rules = FieldRules::default();
    for attr in attrs {
        if !attr.path().is_ident("sensitive") {
            continue;
        }

        match &attr.meta {
            Meta::Path(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "bare #[sensitive] marks a type; on a field, name a rule such as \
                     #[sensitive(Email)]",
                ));
            }
            Meta::List(list) => {
                list.parse_nested_meta(|meta| parse_rule(&mut rules, &meta))?;
            }
            Meta::NameValue(_) => {
                return Err(syn::Error::new(
                    attr.span(),
                    "name-value syntax is not supported for #[sensitive]",
                ));
            }
        }
    }
    Ok(rules)
}
