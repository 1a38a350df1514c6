//! Legible text color for a job's background color.

use crate::error::FormatError;

/// Foreground for the fully transparent background.
pub const TRANSPARENT_FOREGROUND: &str = "#606060";
/// Foreground for light backgrounds.
pub const DARK_TEXT: &str = "#000000";
/// Foreground for dark backgrounds.
pub const LIGHT_TEXT: &str = "#ffffff";

const TRANSPARENT_SENTINEL: &str = "00000000";

/// Weighted luminance above which dark text is used, scaled by 1000.
const LUMINANCE_THRESHOLD_MILLI: u32 = 130_000;

/// An RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parses 6 or 8 hex digits with an optional leading `#`.
    ///
    /// The trailing six digits are read as RGB; for 8-digit values that is
    /// the last three bytes.
    pub fn parse(color: &str) -> Result<Self, FormatError> {
        let digits = strip_hash(color);
        if digits.len() != 6 && digits.len() != 8 {
            return Err(invalid(color, "expected 6 or 8 hex digits"));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid(color, "contains non-hex characters"));
        }

        let rgb = u32::from_str_radix(&digits[digits.len() - 6..], 16)
            .map_err(|_| invalid(color, "contains non-hex characters"))?;
        let [_, r, g, b] = rgb.to_be_bytes();
        Ok(Self { r, g, b })
    }

    /// Perceived luminance `299R + 587G + 114B` (0.299/0.587/0.114 weights
    /// scaled by 1000).
    pub fn luminance_milli(self) -> u32 {
        299 * u32::from(self.r) + 587 * u32::from(self.g) + 114 * u32::from(self.b)
    }
}

/// Picks black or white text for a background color.
///
/// `#00000000` (fully transparent) gets mid-gray. Other colors get black when
/// their luminance exceeds 130 on the 0–255 scale, white otherwise.
pub fn contrasting_color(background: &str) -> Result<&'static str, FormatError> {
    if strip_hash(background) == TRANSPARENT_SENTINEL {
        return Ok(TRANSPARENT_FOREGROUND);
    }

    let rgb = Rgb::parse(background)?;
    if rgb.luminance_milli() > LUMINANCE_THRESHOLD_MILLI {
        Ok(DARK_TEXT)
    } else {
        Ok(LIGHT_TEXT)
    }
}

fn strip_hash(color: &str) -> &str {
    color.strip_prefix('#').unwrap_or(color)
}

fn invalid(color: &str, reason: &'static str) -> FormatError {
    FormatError::InvalidColor {
        value: color.to_string(),
        reason,
    }
}
