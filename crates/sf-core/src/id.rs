//! Composite identifiers and their wire-key encoding.
//!
//! Identifiers from the scheduling services are hierarchical (group, number,
//! step, ...) but many call sites only need one flat string key. The wire key
//! joins the parts with `@`:
//!
//! - trailing parts that are `""` or `0` are dropped,
//! - an empty text part is written as a single space,
//! - a key without `@` is a plain scalar identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Separator between the parts of a wire key.
pub const KEY_SEPARATOR: char = '@';

/// Placeholder written for an intentionally empty text part.
pub const BLANK_PLACEHOLDER: &str = " ";

/// One scalar part of an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdPart {
    Int(i64),
    Text(String),
}

impl IdPart {
    /// Returns true for `""` and `0`, the parts that carry no information
    /// when they trail an identifier.
    pub const fn is_blank(&self) -> bool {
        match self {
            Self::Int(n) => *n == 0,
            Self::Text(text) => text.is_empty(),
        }
    }
}

impl fmt::Display for IdPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for IdPart {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for IdPart {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for IdPart {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for IdPart {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

/// An entity identifier: either a bare scalar or an ordered list of parts.
///
/// The derived `PartialEq` is exact structural equality. Use [`Id::equals`]
/// to compare identifiers the way the services do, where a composite
/// identifier matches its leading scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Scalar(IdPart),
    Composite(Vec<IdPart>),
}

impl Id {
    /// Builds a composite identifier from anything convertible to parts.
    pub fn composite<I, P>(parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<IdPart>,
    {
        Self::Composite(parts.into_iter().map(Into::into).collect())
    }

    /// Builds a scalar identifier.
    pub fn scalar(part: impl Into<IdPart>) -> Self {
        Self::Scalar(part.into())
    }

    /// Returns the identifier's parts; a scalar is a one-part slice.
    pub fn parts(&self) -> &[IdPart] {
        match self {
            Self::Scalar(part) => std::slice::from_ref(part),
            Self::Composite(parts) => parts,
        }
    }

    /// Compares identifiers across scalar and composite forms.
    ///
    /// Two composites must match element-wise. A composite and a scalar match
    /// when the composite's first part equals the scalar.
    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::Composite(a), Self::Composite(b)) => a == b,
            (Self::Composite(parts), Self::Scalar(scalar))
            | (Self::Scalar(scalar), Self::Composite(parts)) => parts.first() == Some(scalar),
        }
    }

    /// Returns the flat key form: the wire key for composites, the plain
    /// text for scalars.
    pub fn to_key(&self) -> String {
        match self {
            Self::Scalar(part) => part.to_string(),
            Self::Composite(parts) => encode(parts),
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key())
    }
}

impl FromStr for Id {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

impl From<IdPart> for Id {
    fn from(part: IdPart) -> Self {
        Self::Scalar(part)
    }
}

impl From<Vec<IdPart>> for Id {
    fn from(parts: Vec<IdPart>) -> Self {
        Self::Composite(parts)
    }
}

/// Encodes identifier parts as a wire key.
pub fn encode(parts: &[IdPart]) -> String {
    let kept = parts
        .iter()
        .rposition(|part| !part.is_blank())
        .map_or(0, |last| last + 1);

    let mut key = String::new();
    for (index, part) in parts[..kept].iter().enumerate() {
        if index > 0 {
            key.push(KEY_SEPARATOR);
        }
        match part {
            IdPart::Text(text) if text.is_empty() => key.push_str(BLANK_PLACEHOLDER),
            IdPart::Text(text) => key.push_str(text),
            IdPart::Int(n) => key.push_str(&n.to_string()),
        }
    }
    key
}

/// Decodes a wire key.
///
/// A key without a separator comes back unchanged as a scalar. Otherwise the
/// first segment is kept as text (an empty one becomes the blank placeholder)
/// and every later segment must be base-10 integer text.
pub fn decode(key: &str) -> Result<Id, FormatError> {
    if !key.contains(KEY_SEPARATOR) {
        return Ok(Id::Scalar(IdPart::Text(key.to_string())));
    }

    key.split(KEY_SEPARATOR)
        .enumerate()
        .map(|(index, segment)| {
            if index == 0 {
                let head = if segment.is_empty() {
                    BLANK_PLACEHOLDER
                } else {
                    segment
                };
                return Ok(IdPart::Text(head.to_string()));
            }
            parse_int_segment(segment)
                .map(IdPart::Int)
                .ok_or_else(|| FormatError::InvalidKeySegment {
                    key: key.to_string(),
                    index,
                    segment: segment.to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Id::Composite)
}

fn parse_int_segment(segment: &str) -> Option<i64> {
    // `i64::from_str` accepts a leading '+', which the key format does not.
    if segment.starts_with('+') {
        return None;
    }
    segment.parse().ok()
}

/// Flattens an optional identifier to its key form, `""` when absent.
pub fn id_to_string(id: Option<&Id>) -> String {
    id.map(Id::to_key).unwrap_or_default()
}
