//! Agencies: organisation accounts that receive and answer for reports.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  validate::{MAX_EMAIL_LEN, MAX_NAME_LEN, required_text},
};

/// System-assigned agency identifier. Never reused, never changes.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AgencyId(pub i64);

impl fmt::Display for AgencyId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A registered agency.
///
/// `name` and `email` are each unique across all agencies. The password is
/// held only as an opaque hash produced by the authentication layer; this
/// type never serialises it.
#[derive(Clone, Serialize, Deserialize)]
pub struct Agency {
  pub id:            AgencyId,
  pub name:          String,
  pub email:         String,
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub description:   Option<String>,
  /// Server-assigned timestamp; never changes after registration.
  pub created_at:    DateTime<Utc>,
}

impl fmt::Debug for Agency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Agency")
      .field("id", &self.id)
      .field("name", &self.name)
      .field("email", &self.email)
      .field("password_hash", &"<redacted>")
      .field("description", &self.description)
      .field("created_at", &self.created_at)
      .finish()
  }
}

/// Input to [`crate::store::AgencyStore::register`].
/// `id` and `created_at` are always assigned by the store.
#[derive(Clone)]
pub struct NewAgency {
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub description:   Option<String>,
}

impl NewAgency {
  pub fn new(
    name: impl Into<String>,
    email: impl Into<String>,
    password_hash: impl Into<String>,
  ) -> Self {
    Self {
      name:          name.into(),
      email:         email.into(),
      password_hash: password_hash.into(),
      description:   None,
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  /// Shape checks only; uniqueness is the store's job.
  pub fn validate(&self) -> Result<()> {
    required_text("agency name", &self.name, Some(MAX_NAME_LEN))?;
    required_text("agency email", &self.email, Some(MAX_EMAIL_LEN))?;
    required_text("password hash", &self.password_hash, None)?;
    Ok(())
  }
}

impl fmt::Debug for NewAgency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("NewAgency")
      .field("name", &self.name)
      .field("email", &self.email)
      .field("password_hash", &"<redacted>")
      .field("description", &self.description)
      .finish()
  }
}
