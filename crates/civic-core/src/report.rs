//! Reports: single incident submissions.
//!
//! Reports are written once and never edited. The agency link is a weak
//! reference: an identifier checked for existence at write time, not an
//! owned object.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  agency::AgencyId,
  location::Location,
  validate::{MAX_IMAGE_PATH_LEN, bounded_text, required_text},
};

/// System-assigned report identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ReportId(pub i64);

impl fmt::Display for ReportId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A persisted report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
  pub id:         ReportId,
  /// `None` for reports nobody has been assigned yet.
  pub agency_id:  Option<AgencyId>,
  pub message:    String,
  /// Where the intake layer stored the attached image; the bytes live
  /// elsewhere.
  pub image_path: Option<String>,
  pub location:   Option<Location>,
  /// Server-assigned timestamp; never changes after submission.
  pub created_at: DateTime<Utc>,
}

// ─── NewReport ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::ReportStore::submit`], exactly as the intake layer
/// received it. Location data arrives as loose optional parts so that
/// malformed combinations can be rejected rather than papered over.
#[derive(Debug, Clone, Default)]
pub struct NewReport {
  pub message:         String,
  pub image_path:      Option<String>,
  pub latitude:        Option<Decimal>,
  pub longitude:       Option<Decimal>,
  pub location_method: Option<String>,
  pub agency_id:       Option<AgencyId>,
}

impl NewReport {
  pub fn new(message: impl Into<String>) -> Self {
    Self { message: message.into(), ..Default::default() }
  }

  pub fn with_image(mut self, path: impl Into<String>) -> Self {
    self.image_path = Some(path.into());
    self
  }

  pub fn with_coordinates(mut self, latitude: Decimal, longitude: Decimal) -> Self {
    self.latitude = Some(latitude);
    self.longitude = Some(longitude);
    self
  }

  pub fn with_method(mut self, method: impl Into<String>) -> Self {
    self.location_method = Some(method.into());
    self
  }

  pub fn for_agency(mut self, agency_id: AgencyId) -> Self {
    self.agency_id = Some(agency_id);
    self
  }

  /// Check the shape of the submission and assemble its location.
  ///
  /// Order: message, image path, coordinates, method. The agency reference
  /// is left to the store, which checks it inside the insert transaction.
  pub fn validate(&self) -> Result<Option<Location>> {
    required_text("message", &self.message, None)?;
    if let Some(path) = &self.image_path {
      required_text("image path", path, None)?;
      bounded_text("image path", path, MAX_IMAGE_PATH_LEN)?;
    }
    Location::from_parts(
      self.latitude,
      self.longitude,
      self.location_method.as_deref(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  #[test]
  fn empty_message_wins_over_everything() {
    let input = NewReport {
      latitude: Some(Decimal::from(91)),
      location_method: Some("gps".into()),
      agency_id: Some(AgencyId(999)),
      ..NewReport::new("")
    };
    assert!(matches!(input.validate(), Err(Error::InvalidInput(_))));
  }

  #[test]
  fn message_is_not_trimmed() {
    let input = NewReport::new("  pothole on 5th  ");
    assert!(input.validate().unwrap().is_none());
    assert_eq!(input.message, "  pothole on 5th  ");
  }

  #[test]
  fn overlong_image_path_is_invalid() {
    let input = NewReport::new("leak").with_image("a".repeat(501));
    assert!(matches!(input.validate(), Err(Error::InvalidInput(_))));
  }

  #[test]
  fn out_of_range_latitude() {
    let input =
      NewReport::new("pothole").with_coordinates(Decimal::from(91), Decimal::ZERO);
    assert!(matches!(input.validate(), Err(Error::InvalidCoordinates(_))));
  }

  #[test]
  fn method_alone_is_missing_coordinates() {
    let input = NewReport::new("pothole").with_method("gps");
    assert_eq!(input.validate(), Err(Error::MissingCoordinates));
  }
}
