//! Circular-shift obfuscation.
//!
//! Each character is moved `salt` positions forward through the Unicode
//! scalar values, wrapping at the end of the range. The surrogate block
//! `U+D800..=U+DFFF` holds no `char`s, so positions are counted with that
//! block removed; every shifted position therefore maps back to a valid
//! `char` and the shift is a bijection.
//!
//! This disguises values; it does not protect them.

use super::error::{Result, TransformError};

const SURROGATE_START: u32 = 0xD800;
const SURROGATE_LEN: u32 = 0x800;
/// Number of Unicode scalar values.
const SCALAR_COUNT: i64 = 0x11_0000 - SURROGATE_LEN as i64;

fn to_position(c: char) -> i64 {
    let value = c as u32;
    if value >= SURROGATE_START {
        i64::from(value - SURROGATE_LEN)
    } else {
        i64::from(value)
    }
}

fn from_position(position: i64) -> char {
    // position is always within 0..SCALAR_COUNT here
    let position = position as u32;
    let value = if position >= SURROGATE_START {
        position + SURROGATE_LEN
    } else {
        position
    };
    char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
}

fn shift(text: &str, offset: i64) -> String {
    text.chars()
        .map(|c| from_position((to_position(c) + offset).rem_euclid(SCALAR_COUNT)))
        .collect()
}

fn check_salt(salt: i32) -> Result<()> {
    if salt <= 0 {
        return Err(TransformError::InvalidParameter(format!(
            "obfuscation salt must be positive (got {})",
            salt
        )));
    }
    Ok(())
}

/// Shifts every character of `text` forward by `salt`.
///
/// # Errors
///
/// Returns `TransformError::InvalidParameter` if `salt <= 0`.
pub fn obfuscate(text: &str, salt: i32) -> Result<String> {
    check_salt(salt)?;
    Ok(shift(text, i64::from(salt)))
}

/// Inverse of [`obfuscate`].
///
/// # Errors
///
/// Returns `TransformError::InvalidParameter` if `salt <= 0`.
pub fn deobfuscate(text: &str, salt: i32) -> Result<String> {
    check_salt(salt)?;
    Ok(shift(text, -i64::from(salt)))
}

/// [`obfuscate`] for optional values; `None` maps to `None`.
pub fn obfuscate_opt(text: Option<&str>, salt: i32) -> Result<Option<String>> {
    check_salt(salt)?;
    Ok(text.map(|t| shift(t, i64::from(salt))))
}

/// [`deobfuscate`] for optional values; `None` maps to `None`.
pub fn deobfuscate_opt(text: Option<&str>, salt: i32) -> Result<Option<String>> {
    check_salt(salt)?;
    Ok(text.map(|t| shift(t, -i64::from(salt))))
}
