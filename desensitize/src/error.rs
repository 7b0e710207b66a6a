//! Failures surfaced by [`crate::acquire`].
//!
//! Every variant is local to one call tree. `acquire_or_original` converts all
//! of them into "return the original value"; `acquire` hands them to the caller.

use thiserror::Error;

/// Errors raised while walking or mutating an object graph.
#[derive(Debug, Error)]
pub enum DesensitizeError {
    /// An attribute could not be read or written.
    #[error("attribute `{attribute}` of `{entity}` is not accessible: {reason}")]
    Inaccessible {
        /// Qualified name of the entity type.
        entity: &'static str,
        /// Name of the attribute that refused access.
        attribute: &'static str,
        /// Human-readable cause.
        reason: String,
    },
    /// An attribute index outside the entity's descriptor table was requested.
    #[error("`{entity}` has no attribute at index {index}")]
    UnknownAttribute {
        /// Qualified name of the entity type.
        entity: &'static str,
        /// The requested index.
        index: usize,
    },
    /// A collection could not be rebuilt from masked text because its element
    /// type is not string-like.
    #[error("cannot rebuild a collection of `{element}` from masked text")]
    NotText {
        /// Element type name.
        element: &'static str,
    },
    /// The traversal went deeper than the configured limit.
    #[error("traversal exceeded the maximum depth of {limit}")]
    DepthExceeded {
        /// The configured limit.
        limit: usize,
    },
}

impl DesensitizeError {
    /// Builds an [`DesensitizeError::Inaccessible`] error.
    pub fn inaccessible(
        entity: &'static str,
        attribute: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Inaccessible {
            entity,
            attribute,
            reason: reason.into(),
        }
    }

    /// Builds an [`DesensitizeError::UnknownAttribute`] error.
    pub fn unknown_attribute(entity: &'static str, index: usize) -> Self {
        Self::UnknownAttribute { entity, index }
    }

    pub(crate) fn not_text<T: ?Sized>() -> Self {
        Self::NotText {
            element: std::any::type_name::<T>(),
        }
    }
}
