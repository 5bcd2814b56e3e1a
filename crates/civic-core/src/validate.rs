//! Field checks shared by agency and report validation.

use crate::{Error, Result};

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MAX_IMAGE_PATH_LEN: usize = 500;
pub const MAX_LOCATION_METHOD_LEN: usize = 50;

/// A required text field: must contain something other than whitespace and,
/// when `max_chars` is set, fit within it. The value itself is never altered.
pub fn required_text(
  field: &str,
  value: &str,
  max_chars: Option<usize>,
) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::InvalidInput(format!("{field} must not be empty")));
  }
  if let Some(max) = max_chars {
    bounded_text(field, value, max)?;
  }
  Ok(())
}

pub fn bounded_text(field: &str, value: &str, max_chars: usize) -> Result<()> {
  let len = value.chars().count();
  if len > max_chars {
    return Err(Error::InvalidInput(format!(
      "{field} is {len} characters long; the limit is {max_chars}"
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn whitespace_only_is_empty() {
    assert!(matches!(
      required_text("message", " \t\n", None),
      Err(Error::InvalidInput(_))
    ));
  }

  #[test]
  fn limit_counts_characters_not_bytes() {
    // 50 two-byte characters
    let label = "é".repeat(50);
    assert!(required_text("location method", &label, Some(50)).is_ok());
    let label = "é".repeat(51);
    assert!(required_text("location method", &label, Some(50)).is_err());
  }
}
