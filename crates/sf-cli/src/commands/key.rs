//! Key command for encoding, decoding and comparing identifiers.

use std::io::Write;

use anyhow::{Context, Result};
use sf_core::{Id, IdPart};

/// Prints the wire key for the given parts.
pub fn encode<W: Write>(writer: &mut W, parts: &[String]) -> Result<()> {
    let parts: Vec<IdPart> = parts.iter().map(|part| parse_part(part)).collect();
    writeln!(writer, "{}", sf_core::encode(&parts))?;
    Ok(())
}

/// Prints the identifier held by a wire key, as JSON.
pub fn decode<W: Write>(writer: &mut W, key: &str) -> Result<()> {
    let id = sf_core::decode(key).with_context(|| format!("failed to decode key {key:?}"))?;
    writeln!(writer, "{}", serde_json::to_string(&id)?)?;
    Ok(())
}

/// Prints whether two identifiers denote the same entity.
pub fn equals<W: Write>(writer: &mut W, left: &str, right: &str) -> Result<()> {
    let left = parse_id_arg(left)?;
    let right = parse_id_arg(right)?;
    writeln!(writer, "{}", left.equals(&right))?;
    Ok(())
}

/// Integer text becomes an integer part; everything else stays text.
fn parse_part(text: &str) -> IdPart {
    if text.starts_with('+') {
        return IdPart::Text(text.to_string());
    }
    text.parse::<i64>()
        .map_or_else(|_| IdPart::Text(text.to_string()), IdPart::Int)
}

/// Reads an identifier given either as JSON (`["A", 1]`, `"A"`, `7`) or as a
/// wire key (`A@1`, `R100`).
fn parse_id_arg(text: &str) -> Result<Id> {
    if let Ok(id) = serde_json::from_str::<Id>(text) {
        return Ok(id);
    }
    sf_core::decode(text).with_context(|| format!("invalid identifier {text:?}"))
}
