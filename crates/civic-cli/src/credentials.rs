//! Password hashing for agency accounts.
//!
//! The store only ever sees the PHC string produced here; it never handles
//! cleartext.

use std::io::BufRead;

use anyhow::{anyhow, bail};
use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use rand_core::OsRng;

/// Hash `password` into an argon2 PHC string, e.g. `$argon2id$v=19$…`.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow!("argon2 error: {e}"))?
      .to_string(),
  )
}

/// `false` for a wrong password and for a hash that does not parse.
pub fn verify_password(password: &str, phc: &str) -> bool {
  PasswordHash::new(phc).is_ok_and(|parsed| {
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  })
}

/// Read a password line from `input`, prompting on stderr so stdout stays
/// clean for command output.
pub fn read_password(input: &mut impl BufRead) -> anyhow::Result<String> {
  eprint!("Password: ");
  let mut line = String::new();
  input.read_line(&mut line)?;
  let password = line.trim_end_matches('\n').trim_end_matches('\r');
  if password.is_empty() {
    bail!("password must not be empty");
  }
  Ok(password.to_string())
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;

  #[test]
  fn hash_then_verify() {
    let phc = hash_password("hunter2").unwrap();
    assert!(phc.starts_with("$argon2"));
    assert!(verify_password("hunter2", &phc));
    assert!(!verify_password("hunter3", &phc));
  }

  #[test]
  fn garbage_hash_never_verifies() {
    assert!(!verify_password("anything", "not-a-phc-string"));
  }

  #[test]
  fn read_password_strips_line_ending() {
    let mut input = Cursor::new("s3cret\r\n");
    assert_eq!(read_password(&mut input).unwrap(), "s3cret");
  }

  #[test]
  fn empty_password_is_refused() {
    let mut input = Cursor::new("\n");
    assert!(read_password(&mut input).is_err());
  }
}
