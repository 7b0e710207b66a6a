//! Adapters for emitting masked values through `slog`.
//!
//! [`IntoMaskedJson`] masks a value with [`crate::acquire`] and stores the
//! result as a `serde_json::Value`, which is emitted through `slog`'s
//! nested-value support. The unmasked value is never serialized: when masking
//! fails, [`MASKING_FAILED`] is logged in its place.
//!
//! Serialization failures become a placeholder string rather than a logging
//! error.

use serde::Serialize;
use serde_json::Value as JsonValue;
use slog::{Key, Record, Result as SlogResult, Serializer, Value as SlogValue};

use crate::{descriptor::WrapperClass, engine::acquire, node::Walk};

/// Placeholder logged when the masked value cannot be converted to JSON.
pub const SERIALIZE_FAILED: &str = "Failed to serialize masked value";

/// Placeholder logged when the value could not be masked.
pub const MASKING_FAILED: &str = "Failed to mask value";

/// A `slog::Value` holding the masked form of a value as structured JSON.
pub struct MaskedJson {
    value: JsonValue,
}

impl MaskedJson {
    fn mask<T: Walk + Serialize>(value: T, wrapper: Option<WrapperClass>) -> Self {
        match acquire(value, wrapper) {
            Ok(masked) => Self::from_masked(&masked),
            Err(_) => Self {
                value: JsonValue::String(MASKING_FAILED.to_string()),
            },
        }
    }

    fn from_masked<T: Serialize>(masked: &T) -> Self {
        let value = serde_json::to_value(masked)
            .unwrap_or_else(|_| JsonValue::String(SERIALIZE_FAILED.to_string()));
        Self { value }
    }

    /// The JSON that will be logged.
    pub fn as_json(&self) -> &JsonValue {
        &self.value
    }
}

impl SlogValue for MaskedJson {
    fn serialize(
        &self,
        record: &Record<'_>,
        key: Key,
        serializer: &mut dyn Serializer,
    ) -> SlogResult {
        let nested = slog::Serde(self.value.clone());
        SlogValue::serialize(&nested, record, key, serializer)
    }
}

/// Converts values into a `slog::Value` that logs their masked form as JSON.
///
/// ## Example
/// ```ignore
/// use desensitize::slog::IntoMaskedJson;
///
/// info!(logger, "login"; "request" => request.into_masked_json());
/// ```
pub trait IntoMaskedJson: Walk + Serialize + Sized {
    /// Masks `self` and captures the result as JSON.
    fn into_masked_json(self) -> MaskedJson {
        MaskedJson::mask(self, None)
    }

    /// Same as [`IntoMaskedJson::into_masked_json`], with a wrapper type.
    fn into_masked_json_within(self, wrapper: WrapperClass) -> MaskedJson {
        MaskedJson::mask(self, Some(wrapper))
    }
}

impl<T> IntoMaskedJson for T where T: Walk + Serialize {}
