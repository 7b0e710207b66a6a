//! Static, per-type policy metadata and the introspection seam.
//!
//! `#[derive(Desensitize)]` builds one [`EntityDescriptor`] per type, stored in
//! a `static`, so nothing is parsed at traversal time. The engine reads and
//! writes attributes only through [`Introspect`].

use crate::{error::DesensitizeError, node::Node, strategy::MaskingStrategy};

/// Declarative policy attached to one attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeRule {
    /// Mask the string, or every string element of a container.
    SimpleMask(MaskingStrategy),
    /// Mask map values whose key equals `keys[i]` with `strategies[i]`.
    MapKeyedMask {
        /// Keys to look for.
        keys: &'static [&'static str],
        /// Strategies, positionally aligned with `keys`.
        strategies: &'static [MaskingStrategy],
    },
    /// Force the attribute to its empty representation whenever it is set.
    NullOut,
    /// Use this attribute's value as a key selecting the strategy applied to
    /// the sibling attribute `target`.
    FlexMask {
        /// Keys the attribute value is looked up in.
        keys: &'static [&'static str],
        /// Name of the attribute that gets masked.
        target: &'static str,
        /// Strategies, positionally aligned with `keys`.
        strategies: &'static [MaskingStrategy],
    },
}

/// Keyed lookup shared by [`AttributeRule::MapKeyedMask`] and
/// [`AttributeRule::FlexMask`].
#[derive(Clone, Copy, Debug)]
pub struct KeyedStrategies {
    keys: &'static [&'static str],
    strategies: &'static [MaskingStrategy],
}

impl KeyedStrategies {
    /// Strategy for `key`, or `None` when the key is not listed.
    ///
    /// A key listed past the end of the strategy list gets
    /// [`MaskingStrategy::Default`].
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<MaskingStrategy> {
        let index = self.keys.iter().position(|candidate| *candidate == key)?;
        Some(MaskingStrategy::at(self.strategies, index))
    }
}

/// One attribute of an entity type.
#[derive(Clone, Copy, Debug)]
pub struct AttributeDescriptor {
    /// Field name (tuple fields use their index).
    pub name: &'static str,
    /// Declared as a bare numeric, `bool` or `char` type.
    pub primitive: bool,
    /// Never read, masked or recursed into.
    pub constant: bool,
    /// Declared rules, in source order.
    pub rules: &'static [AttributeRule],
}

impl AttributeDescriptor {
    /// The `SimpleMask` strategy, if declared.
    #[must_use]
    pub fn simple_mask(&self) -> Option<MaskingStrategy> {
        self.rules.iter().find_map(|rule| match rule {
            AttributeRule::SimpleMask(strategy) => Some(*strategy),
            _ => None,
        })
    }

    /// The `MapKeyedMask` table, if declared.
    #[must_use]
    pub fn map_mask(&self) -> Option<KeyedStrategies> {
        self.rules.iter().find_map(|rule| match rule {
            AttributeRule::MapKeyedMask { keys, strategies } => Some(KeyedStrategies {
                keys: *keys,
                strategies: *strategies,
            }),
            _ => None,
        })
    }

    /// The `FlexMask` target and table, if declared.
    #[must_use]
    pub fn flex_mask(&self) -> Option<(&'static str, KeyedStrategies)> {
        self.rules.iter().find_map(|rule| match rule {
            AttributeRule::FlexMask {
                keys,
                target,
                strategies,
            } => Some((
                *target,
                KeyedStrategies {
                    keys: *keys,
                    strategies: *strategies,
                },
            )),
            _ => None,
        })
    }

    /// Whether `NullOut` is declared.
    #[must_use]
    pub fn is_null_out(&self) -> bool {
        self.rules.contains(&AttributeRule::NullOut)
    }
}

/// Immutable metadata for one entity type.
#[derive(Clone, Copy, Debug)]
pub struct EntityDescriptor {
    /// Module path and identifier, for messages. Generic parameters are not
    /// part of it, and it need not be unique.
    pub type_name: &'static str,
    /// Whether the type opted into masking with a container `#[sensitive]`.
    pub marked: bool,
    /// Every attribute, in declaration order.
    pub attributes: &'static [AttributeDescriptor],
}

impl EntityDescriptor {
    /// Index of the attribute called `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|attribute| attribute.name == name)
    }
}

/// Attribute-level access to an entity.
///
/// Implemented by `#[derive(Desensitize)]`. Hand-written implementations may
/// refuse access to an attribute by returning
/// [`DesensitizeError::Inaccessible`].
pub trait Introspect {
    /// The descriptor of the implementing type.
    fn type_descriptor() -> &'static EntityDescriptor
    where
        Self: Sized;

    /// The descriptor of this value's type.
    fn descriptor(&self) -> &'static EntityDescriptor;

    /// Borrows the attribute at `index` as a [`Node`].
    fn attribute(&mut self, index: usize) -> Result<Node<'_>, DesensitizeError>;

    /// Sets the attribute at `index` to its empty representation.
    fn clear_attribute(&mut self, index: usize) -> Result<(), DesensitizeError>;
}

/// A caller-supplied type that opts unmarked values of that type into masking
/// for one call.
///
/// Identity is the address of the type's static descriptor. Every
/// instantiation of a generic type shares one descriptor, so `Envelope<A>` and
/// `Envelope<B>` are the same wrapper, while two distinct types that happen to
/// share a name are not.
#[derive(Clone, Copy, Debug)]
pub struct WrapperClass {
    descriptor: &'static EntityDescriptor,
}

impl WrapperClass {
    /// The wrapper identity of `T`.
    #[must_use]
    pub fn of<T: Introspect>() -> Self {
        Self {
            descriptor: T::type_descriptor(),
        }
    }

    /// Whether an entity with `descriptor` is of this wrapper type.
    #[must_use]
    pub fn matches(&self, descriptor: &EntityDescriptor) -> bool {
        std::ptr::eq(self.descriptor, descriptor)
    }

    /// The qualified type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.descriptor.type_name
    }
}

impl PartialEq for WrapperClass {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.descriptor, other.descriptor)
    }
}

impl Eq for WrapperClass {}

#[cfg(test)]
mod tests {
    use super::{AttributeDescriptor, AttributeRule, EntityDescriptor, WrapperClass};
    use crate::MaskingStrategy;

    static RULES: [AttributeRule; 2] = [
        AttributeRule::NullOut,
        AttributeRule::MapKeyedMask {
            keys: &["password", "username"],
            strategies: &[MaskingStrategy::Password],
        },
    ];

    static ATTRIBUTES: [AttributeDescriptor; 2] = [
        AttributeDescriptor {
            name: "params",
            primitive: false,
            constant: false,
            rules: &RULES,
        },
        AttributeDescriptor {
            name: "age",
            primitive: true,
            constant: false,
            rules: &[],
        },
    ];

    static DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        type_name: "tests::Params",
        marked: true,
        attributes: &ATTRIBUTES,
    };

    #[test]
    fn rule_lookups() {
        let params = &DESCRIPTOR.attributes[0];
        assert!(params.is_null_out());
        assert!(params.simple_mask().is_none());
        assert!(params.flex_mask().is_none());

        let keyed = params.map_mask().unwrap();
        assert_eq!(keyed.resolve("password"), Some(MaskingStrategy::Password));
        assert_eq!(keyed.resolve("username"), Some(MaskingStrategy::Default));
        assert_eq!(keyed.resolve("phone"), None);
    }

    static TWIN: EntityDescriptor = EntityDescriptor {
        type_name: "tests::Params",
        marked: false,
        attributes: &[],
    };

    #[test]
    fn wrapper_identity_is_the_descriptor_not_the_name() {
        let wrapper = WrapperClass {
            descriptor: &DESCRIPTOR,
        };
        assert!(wrapper.matches(&DESCRIPTOR));
        assert!(!wrapper.matches(&TWIN));
        assert_eq!(wrapper.type_name(), TWIN.type_name);
    }

    #[test]
    fn position_finds_attributes_by_name() {
        assert_eq!(DESCRIPTOR.position("age"), Some(1));
        assert_eq!(DESCRIPTOR.position("missing"), None);
    }
}
