//! The value model the engine dispatches on.
//!
//! Every reachable value is classified once into a [`Node`]: a closed union
//! over terminal values, strings, collections, maps, arrays and entities. The
//! engine matches on it exhaustively instead of probing runtime types.
//!
//! ## Container kinds
//!
//! | Kind | Types | Masking writes back by |
//! |------|-------|------------------------|
//! | Collection | `Vec`, `VecDeque`, `LinkedList`, `HashSet`, `BTreeSet` | rebuilding the whole container |
//! | Map | `HashMap`, `BTreeMap` | replacing values in place |
//! | Array | `[T; N]`, `Box<[T]>` | replacing elements in place |
//!
//! Sets cannot hand out mutable references to their elements, so visiting
//! one drains it and inserts every element back afterwards.

use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque},
    hash::{BuildHasher, Hash},
    marker::PhantomData,
    time::Duration,
};

use crate::{descriptor::Introspect, error::DesensitizeError};

/// Callback invoked for every element of a container.
pub type VisitElement<'v> = dyn FnMut(Node<'_>) -> Result<(), DesensitizeError> + 'v;

/// Callback invoked for every map entry, with the key's text when it has one.
pub type VisitEntry<'v> =
    dyn FnMut(Option<&str>, Node<'_>) -> Result<(), DesensitizeError> + 'v;

/// A value classified for traversal, exclusively borrowed from the graph.
pub enum Node<'a> {
    /// An absent value (`None`).
    Null,
    /// A terminal value: numbers, booleans, fieldless enums, immutable text.
    Scalar,
    /// A string that may be masked in place.
    Text(&'a mut dyn SensitiveValue),
    /// A collection that is rebuilt when any string element gets masked.
    Collection(&'a mut dyn CollectionNode),
    /// A map whose values are visited; keys are never masked.
    Map(&'a mut dyn MapNode),
    /// A fixed-length sequence mutated positionally.
    Array(&'a mut dyn ArrayNode),
    /// An entity with introspectable attributes.
    Entity(&'a mut dyn Introspect),
}

impl Node<'_> {
    /// Short name of the variant, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Scalar => "scalar",
            Node::Text(_) => "text",
            Node::Collection(_) => "collection",
            Node::Map(_) => "map",
            Node::Array(_) => "array",
            Node::Entity(_) => "entity",
        }
    }
}

/// Classifies a value for traversal.
///
/// `#[derive(Desensitize)]` implements this for structs (as [`Node::Entity`])
/// and fieldless enums (as [`Node::Scalar`]).
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be walked for sensitive data",
    label = "this field type does not implement `Walk`",
    note = "derive `Desensitize` on the type, or mark the field `#[sensitive(skip)]`"
)]
pub trait Walk {
    /// Bare numeric, `bool` and `char` types. They are never nulled out.
    const PRIMITIVE: bool = false;

    /// Borrows the value as a [`Node`].
    fn node(&mut self) -> Node<'_>;

    /// Replaces the value with its empty representation.
    fn clear(&mut self);

    /// Builds a value from masked text, when the type is string-like.
    #[must_use]
    fn from_masked(masked: String) -> Option<Self>
    where
        Self: Sized,
    {
        drop(masked);
        None
    }
}

/// A string-like leaf value.
///
/// ## Foreign string-like types
///
/// The orphan rule keeps you from implementing this for another crate's type.
/// Wrap it in a local newtype and implement `SensitiveValue` and [`Walk`] for
/// the wrapper.
pub trait SensitiveValue {
    /// Read-only view of the current text.
    fn as_str(&self) -> &str;
    /// Overwrites the value with masked text.
    fn set_masked(&mut self, masked: String);
}

/// Map keys: strings expose their text, everything else is "not a string".
pub trait MapKey {
    /// The key as text, if it is a string.
    fn key_text(&self) -> Option<&str>;
}

/// Container access for [`Node::Collection`].
pub trait CollectionNode {
    /// Visits every element.
    fn for_each_element(&mut self, visit: &mut VisitElement<'_>) -> Result<(), DesensitizeError>;
    /// Replaces the whole collection with the given masked strings.
    fn replace_masked(&mut self, masked: Vec<String>) -> Result<(), DesensitizeError>;
}

/// Container access for [`Node::Map`].
pub trait MapNode {
    /// Visits every entry's value, in place.
    fn for_each_entry(&mut self, visit: &mut VisitEntry<'_>) -> Result<(), DesensitizeError>;
}

/// Container access for [`Node::Array`].
pub trait ArrayNode {
    /// Whether the element type is primitive. Such arrays are left untouched.
    fn component_is_primitive(&self) -> bool;
    /// Visits every element, in place.
    fn for_each_element(&mut self, visit: &mut VisitElement<'_>) -> Result<(), DesensitizeError>;
}

fn rebuild<T, C>(masked: Vec<String>) -> Result<C, DesensitizeError>
where
    T: Walk,
    C: FromIterator<T>,
{
    masked
        .into_iter()
        .map(|text| T::from_masked(text).ok_or_else(DesensitizeError::not_text::<T>))
        .collect()
}

// =============================================================================
// Terminal values
// =============================================================================

macro_rules! impl_walk_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Walk for $ty {
                const PRIMITIVE: bool = true;

                fn node(&mut self) -> Node<'_> {
                    Node::Scalar
                }

                fn clear(&mut self) {
                    *self = <$ty>::default();
                }
            }

            impl MapKey for $ty {
                fn key_text(&self) -> Option<&str> {
                    None
                }
            }
        )*
    };
}

impl_walk_primitive!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl Walk for () {
    fn node(&mut self) -> Node<'_> {
        Node::Scalar
    }

    fn clear(&mut self) {}
}

impl Walk for Duration {
    fn node(&mut self) -> Node<'_> {
        Node::Scalar
    }

    fn clear(&mut self) {
        *self = Duration::ZERO;
    }
}

impl<T: ?Sized> Walk for PhantomData<T> {
    fn node(&mut self) -> Node<'_> {
        Node::Scalar
    }

    fn clear(&mut self) {}
}

// Borrowed text cannot be rewritten in place.
impl Walk for &str {
    fn node(&mut self) -> Node<'_> {
        Node::Scalar
    }

    fn clear(&mut self) {
        *self = "";
    }
}

// =============================================================================
// Text
// =============================================================================

impl SensitiveValue for String {
    fn as_str(&self) -> &str {
        self.as_str()
    }

    fn set_masked(&mut self, masked: String) {
        *self = masked;
    }
}

impl Walk for String {
    fn node(&mut self) -> Node<'_> {
        Node::Text(self)
    }

    fn clear(&mut self) {
        String::clear(self);
    }

    fn from_masked(masked: String) -> Option<Self> {
        Some(masked)
    }
}

impl SensitiveValue for Box<str> {
    fn as_str(&self) -> &str {
        self
    }

    fn set_masked(&mut self, masked: String) {
        *self = masked.into_boxed_str();
    }
}

impl Walk for Box<str> {
    fn node(&mut self) -> Node<'_> {
        Node::Text(self)
    }

    fn clear(&mut self) {
        *self = Box::default();
    }

    fn from_masked(masked: String) -> Option<Self> {
        Some(masked.into_boxed_str())
    }
}

impl SensitiveValue for Cow<'_, str> {
    fn as_str(&self) -> &str {
        self
    }

    fn set_masked(&mut self, masked: String) {
        *self = Cow::Owned(masked);
    }
}

impl Walk for Cow<'_, str> {
    fn node(&mut self) -> Node<'_> {
        Node::Text(self)
    }

    fn clear(&mut self) {
        *self = Cow::Borrowed("");
    }

    fn from_masked(masked: String) -> Option<Self> {
        Some(Cow::Owned(masked))
    }
}

impl MapKey for String {
    fn key_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl MapKey for &str {
    fn key_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl MapKey for Box<str> {
    fn key_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl MapKey for Cow<'_, str> {
    fn key_text(&self) -> Option<&str> {
        Some(self)
    }
}

// =============================================================================
// Wrappers
// =============================================================================

impl<T: Walk> Walk for Option<T> {
    fn node(&mut self) -> Node<'_> {
        match self {
            Some(value) => value.node(),
            None => Node::Null,
        }
    }

    fn clear(&mut self) {
        *self = None;
    }

    fn from_masked(masked: String) -> Option<Self> {
        T::from_masked(masked).map(Some)
    }
}

impl<T: Walk> Walk for Box<T> {
    const PRIMITIVE: bool = T::PRIMITIVE;

    fn node(&mut self) -> Node<'_> {
        (**self).node()
    }

    fn clear(&mut self) {
        (**self).clear();
    }

    fn from_masked(masked: String) -> Option<Self> {
        T::from_masked(masked).map(Box::new)
    }
}

// =============================================================================
// Collections
// =============================================================================

macro_rules! impl_sequence_collection {
    ($($collection:ident),* $(,)?) => {
        $(
            impl<T: Walk> CollectionNode for $collection<T> {
                fn for_each_element(
                    &mut self,
                    visit: &mut VisitElement<'_>,
                ) -> Result<(), DesensitizeError> {
                    self.iter_mut().try_for_each(|element| visit(element.node()))
                }

                fn replace_masked(&mut self, masked: Vec<String>) -> Result<(), DesensitizeError> {
                    *self = rebuild(masked)?;
                    Ok(())
                }
            }

            impl<T: Walk> Walk for $collection<T> {
                fn node(&mut self) -> Node<'_> {
                    Node::Collection(self)
                }

                fn clear(&mut self) {
                    $collection::clear(self);
                }
            }
        )*
    };
}

impl_sequence_collection!(Vec, VecDeque, LinkedList);

impl<T, S> CollectionNode for HashSet<T, S>
where
    T: Walk + Eq + Hash,
    S: BuildHasher,
{
    fn for_each_element(&mut self, visit: &mut VisitElement<'_>) -> Result<(), DesensitizeError> {
        let elements: Vec<T> = self.drain().collect();
        let mut outcome = Ok(());
        for mut element in elements {
            if outcome.is_ok() {
                outcome = visit(element.node());
            }
            self.insert(element);
        }
        outcome
    }

    fn replace_masked(&mut self, masked: Vec<String>) -> Result<(), DesensitizeError> {
        let rebuilt: Vec<T> = rebuild(masked)?;
        HashSet::clear(self);
        self.extend(rebuilt);
        Ok(())
    }
}

impl<T, S> Walk for HashSet<T, S>
where
    T: Walk + Eq + Hash,
    S: BuildHasher,
{
    fn node(&mut self) -> Node<'_> {
        Node::Collection(self)
    }

    fn clear(&mut self) {
        HashSet::clear(self);
    }
}

impl<T: Walk + Ord> CollectionNode for BTreeSet<T> {
    fn for_each_element(&mut self, visit: &mut VisitElement<'_>) -> Result<(), DesensitizeError> {
        let elements = std::mem::take(self);
        let mut outcome = Ok(());
        for mut element in elements {
            if outcome.is_ok() {
                outcome = visit(element.node());
            }
            self.insert(element);
        }
        outcome
    }

    fn replace_masked(&mut self, masked: Vec<String>) -> Result<(), DesensitizeError> {
        *self = rebuild(masked)?;
        Ok(())
    }
}

impl<T: Walk + Ord> Walk for BTreeSet<T> {
    fn node(&mut self) -> Node<'_> {
        Node::Collection(self)
    }

    fn clear(&mut self) {
        BTreeSet::clear(self);
    }
}

// =============================================================================
// Maps
// =============================================================================

impl<K, V, S> MapNode for HashMap<K, V, S>
where
    K: MapKey,
    V: Walk,
{
    fn for_each_entry(&mut self, visit: &mut VisitEntry<'_>) -> Result<(), DesensitizeError> {
        self.iter_mut()
            .try_for_each(|(key, value)| visit(key.key_text(), value.node()))
    }
}

impl<K, V, S> Walk for HashMap<K, V, S>
where
    K: MapKey,
    V: Walk,
{
    fn node(&mut self) -> Node<'_> {
        Node::Map(self)
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }
}

impl<K: MapKey, V: Walk> MapNode for BTreeMap<K, V> {
    fn for_each_entry(&mut self, visit: &mut VisitEntry<'_>) -> Result<(), DesensitizeError> {
        self.iter_mut()
            .try_for_each(|(key, value)| visit(key.key_text(), value.node()))
    }
}

impl<K: MapKey, V: Walk> Walk for BTreeMap<K, V> {
    fn node(&mut self) -> Node<'_> {
        Node::Map(self)
    }

    fn clear(&mut self) {
        BTreeMap::clear(self);
    }
}

// =============================================================================
// Arrays
// =============================================================================

impl<T: Walk, const N: usize> ArrayNode for [T; N] {
    fn component_is_primitive(&self) -> bool {
        T::PRIMITIVE
    }

    fn for_each_element(&mut self, visit: &mut VisitElement<'_>) -> Result<(), DesensitizeError> {
        self.iter_mut().try_for_each(|element| visit(element.node()))
    }
}

impl<T: Walk, const N: usize> Walk for [T; N] {
    fn node(&mut self) -> Node<'_> {
        Node::Array(self)
    }

    fn clear(&mut self) {
        self.iter_mut().for_each(Walk::clear);
    }
}

impl<T: Walk> ArrayNode for Box<[T]> {
    fn component_is_primitive(&self) -> bool {
        T::PRIMITIVE
    }

    fn for_each_element(&mut self, visit: &mut VisitElement<'_>) -> Result<(), DesensitizeError> {
        self.iter_mut().try_for_each(|element| visit(element.node()))
    }
}

impl<T: Walk> Walk for Box<[T]> {
    fn node(&mut self) -> Node<'_> {
        Node::Array(self)
    }

    fn clear(&mut self) {
        *self = Vec::new().into_boxed_slice();
    }
}
