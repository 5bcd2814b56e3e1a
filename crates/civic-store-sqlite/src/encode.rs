//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that text order is time order. Decimals are stored as their canonical
//! text with the submitted scale intact.

use std::str::FromStr as _;

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use civic_core::{
  agency::{Agency, AgencyId},
  location::{Coordinates, Location, LocationMethod},
  report::{Report, ReportId},
};
use rust_decimal::Decimal;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Decimal ─────────────────────────────────────────────────────────────────

pub fn encode_decimal(d: Decimal) -> String { d.to_string() }

pub fn decode_decimal(s: &str) -> Result<Decimal> { Ok(Decimal::from_str(s)?) }

// ─── Column lists ────────────────────────────────────────────────────────────

pub const AGENCY_COLUMNS: &str =
  "id, name, email, password_hash, description, created_at";

pub const REPORT_COLUMNS: &str = "id, agency_id, message, image_path, latitude, \
                                  longitude, location_method, created_at";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `agencies` row.
pub struct RawAgency {
  pub id:            i64,
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub description:   Option<String>,
  pub created_at:    String,
}

impl RawAgency {
  /// Row mapper for queries selecting [`AGENCY_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      name:          row.get(1)?,
      email:         row.get(2)?,
      password_hash: row.get(3)?,
      description:   row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_agency(self) -> Result<Agency> {
    Ok(Agency {
      id:            AgencyId(self.id),
      name:          self.name,
      email:         self.email,
      password_hash: self.password_hash,
      description:   self.description,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `reports` row.
pub struct RawReport {
  pub id:              i64,
  pub agency_id:       Option<i64>,
  pub message:         String,
  pub image_path:      Option<String>,
  pub latitude:        Option<String>,
  pub longitude:       Option<String>,
  pub location_method: Option<String>,
  pub created_at:      String,
}

impl RawReport {
  /// Row mapper for queries selecting [`REPORT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      agency_id:       row.get(1)?,
      message:         row.get(2)?,
      image_path:      row.get(3)?,
      latitude:        row.get(4)?,
      longitude:       row.get(5)?,
      location_method: row.get(6)?,
      created_at:      row.get(7)?,
    })
  }

  pub fn into_report(self) -> Result<Report> {
    let location = match (self.latitude, self.longitude, self.location_method) {
      (None, None, None) => None,
      (Some(lat), Some(lon), method) => Some(Location {
        coordinates: Coordinates {
          latitude:  decode_decimal(&lat)?,
          longitude: decode_decimal(&lon)?,
        },
        method:      method.map(LocationMethod::new).transpose()?,
      }),
      _ => {
        return Err(Error::CorruptRow(format!(
          "report {} has an incomplete location",
          self.id
        )));
      }
    };

    Ok(Report {
      id: ReportId(self.id),
      agency_id: self.agency_id.map(AgencyId),
      message: self.message,
      image_path: self.image_path,
      location,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width() {
    let a = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    let b = a + chrono::Duration::microseconds(1);
    assert_eq!(encode_dt(a), "2024-01-02T03:04:05.000000Z");
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(decode_dt(&encode_dt(b)).unwrap(), b);
  }

  #[test]
  fn decimal_keeps_scale() {
    let d = decode_decimal("-74.00600000").unwrap();
    assert_eq!(encode_decimal(d), "-74.00600000");
  }

  #[test]
  fn half_location_row_is_corrupt() {
    let raw = RawReport {
      id:              1,
      agency_id:       None,
      message:         "leak".into(),
      image_path:      None,
      latitude:        Some("1".into()),
      longitude:       None,
      location_method: None,
      created_at:      encode_dt(now()),
    };
    assert!(matches!(raw.into_report(), Err(Error::CorruptRow(_))));
  }
}
