//! Error types shared by the codec, color and classification modules.

use thiserror::Error;

/// A wire value did not have the expected textual form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A non-first `@` segment of a wire key is not base-10 integer text.
    #[error("invalid segment {index} in key {key:?}: {segment:?} is not an integer")]
    InvalidKeySegment {
        key: String,
        index: usize,
        segment: String,
    },

    /// A color is not 6 or 8 hex digits with an optional leading `#`.
    #[error("invalid color {value:?}: {reason}")]
    InvalidColor { value: String, reason: &'static str },
}

/// A payload could not be mapped onto any domain variant.
#[derive(Debug, Error)]
pub enum ClassificationError {
    /// Batch input was not a JSON array.
    #[error("expected a JSON array, got {found}")]
    NotAnArray { found: &'static str },

    /// An element was not a JSON object.
    #[error("expected a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    /// None of the marker fields that select a variant are present.
    #[error("unrecognized payload shape (fields: {})", fields.join(", "))]
    Unrecognized { fields: Vec<String> },

    /// The variant was selected but its body does not fit the variant.
    #[error("invalid {variant} payload: {source}")]
    InvalidShape {
        variant: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// An element of a batch failed to classify.
    #[error("entry {index}: {source}")]
    Item {
        index: usize,
        #[source]
        source: Box<ClassificationError>,
    },
}

/// Short JSON type name used in error messages.
pub(crate) const fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
