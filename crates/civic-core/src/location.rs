//! Geolocation attached to a report, together with its provenance.
//!
//! Coordinates are fixed-precision decimals with at most
//! [`Coordinates::MAX_FRACTION_DIGITS`] fractional digits. They are stored
//! with the scale the caller supplied; nothing is rounded or re-projected.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  validate::{MAX_LOCATION_METHOD_LEN, required_text},
};

// ─── Coordinates ─────────────────────────────────────────────────────────────

/// A validated latitude/longitude pair. There is no way to hold half a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
  pub latitude:  Decimal,
  pub longitude: Decimal,
}

impl Coordinates {
  pub const MAX_FRACTION_DIGITS: u32 = 8;

  pub fn new(latitude: Decimal, longitude: Decimal) -> Result<Self> {
    check_axis("latitude", latitude, 90)?;
    check_axis("longitude", longitude, 180)?;
    Ok(Self { latitude, longitude })
  }

  /// Pair up optional axes. Both absent is `Ok(None)`; exactly one present is
  /// an error, never a silently dropped value.
  pub fn from_parts(
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
  ) -> Result<Option<Self>> {
    match (latitude, longitude) {
      (None, None) => Ok(None),
      (Some(lat), Some(lon)) => Self::new(lat, lon).map(Some),
      (Some(_), None) => Err(Error::InvalidCoordinates(
        "latitude given without longitude".into(),
      )),
      (None, Some(_)) => Err(Error::InvalidCoordinates(
        "longitude given without latitude".into(),
      )),
    }
  }
}

fn check_axis(axis: &str, value: Decimal, bound: i64) -> Result<()> {
  let bound = Decimal::from(bound);
  if value < -bound || value > bound {
    return Err(Error::InvalidCoordinates(format!(
      "{axis} {value} is outside [-{bound}, {bound}]"
    )));
  }
  if value.scale() > Coordinates::MAX_FRACTION_DIGITS {
    return Err(Error::InvalidCoordinates(format!(
      "{axis} {value} has more than {} fractional digits",
      Coordinates::MAX_FRACTION_DIGITS
    )));
  }
  Ok(())
}

// ─── Method ──────────────────────────────────────────────────────────────────

/// A short label recording how coordinates were obtained. It records
/// provenance only; it says nothing about accuracy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationMethod(String);

impl LocationMethod {
  /// Device satellite positioning.
  pub const GPS: &'static str = "gps";
  /// Typed or picked on a map by the submitter.
  pub const MANUAL: &'static str = "manual";
  /// Read from the attached image's metadata.
  pub const EXIF: &'static str = "exif";
  /// Estimated from the submitter's network address.
  pub const IP: &'static str = "ip";

  pub fn new(label: impl Into<String>) -> Result<Self> {
    let label = label.into();
    required_text("location method", &label, Some(MAX_LOCATION_METHOD_LEN))?;
    Ok(Self(label))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn into_inner(self) -> String { self.0 }
}

impl fmt::Display for LocationMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Location ────────────────────────────────────────────────────────────────

/// Coordinates plus their (optional) provenance. A location with no method is
/// valid but unprovenanced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
  pub coordinates: Coordinates,
  pub method:      Option<LocationMethod>,
}

impl Location {
  /// Assemble a location from the raw optional parts of a submission.
  ///
  /// Coordinate problems are reported before method problems, so a request
  /// that is wrong in both ways always gets the same answer.
  pub fn from_parts(
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
    method: Option<&str>,
  ) -> Result<Option<Self>> {
    let coordinates = Coordinates::from_parts(latitude, longitude)?;
    match (coordinates, method) {
      (None, None) => Ok(None),
      (None, Some(_)) => Err(Error::MissingCoordinates),
      (Some(coordinates), method) => Ok(Some(Self {
        coordinates,
        method: method.map(LocationMethod::new).transpose()?,
      })),
    }
  }
}
