//! [`SqliteStore`]: the SQLite implementation of [`AgencyStore`] and
//! [`ReportStore`].

use std::{path::Path, time::Duration};

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};

use civic_core::{
  agency::{Agency, AgencyId, NewAgency},
  report::{NewReport, Report, ReportId},
  store::{AgencyStore, ReportStore},
};

use crate::{
  Error, Result,
  encode::{
    AGENCY_COLUMNS, REPORT_COLUMNS, RawAgency, RawReport, encode_decimal,
    encode_dt, now,
  },
  schema::SCHEMA,
};

// ─── Write outcomes ──────────────────────────────────────────────────────────

/// What happened inside a registration transaction. Conflicts are values here
/// so they can cross the connection thread without being stringified.
enum Registration {
  Inserted { id: i64, created_at: DateTime<Utc> },
  NameTaken,
  EmailTaken,
}

enum Submission {
  Inserted { id: i64, created_at: DateTime<Utc> },
  UnknownAgency,
}

/// Map a UNIQUE violation on `agencies` to the conflict it represents.
fn unique_conflict(err: &rusqlite::Error) -> Option<Registration> {
  match err {
    rusqlite::Error::SqliteFailure(e, Some(msg))
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
    {
      if msg.contains("agencies.name") {
        Some(Registration::NameTaken)
      } else if msg.contains("agencies.email") {
        Some(Registration::EmailTaken)
      } else {
        None
      }
    }
    _ => None,
  }
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
  )
}

fn agency_exists_in(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<bool> {
  conn.query_row(
    "SELECT EXISTS (SELECT 1 FROM agencies WHERE id = ?1)",
    rusqlite::params![id],
    |r| r.get(0),
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A civic report store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every write
/// runs in a `BEGIN IMMEDIATE` transaction, so the existence and uniqueness
/// checks it performs hold until it commits, even when several processes
/// share the file.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// How long a write waits for another connection's lock before giving up.
  pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with_busy_timeout(path, Self::DEFAULT_BUSY_TIMEOUT).await
  }

  pub async fn open_with_busy_timeout(
    path: impl AsRef<Path>,
    busy_timeout: Duration,
  ) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema(busy_timeout).await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema(Self::DEFAULT_BUSY_TIMEOUT).await?;
    Ok(store)
  }

  async fn init_schema(&self, busy_timeout: Duration) -> Result<()> {
    let version: i64 = self
      .conn
      .call(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?)
      })
      .await?;
    tracing::info!(schema_version = version, "store schema ready");
    Ok(())
  }

  #[cfg(test)]
  pub(crate) fn conn_for_tests(&self) -> &tokio_rusqlite::Connection { &self.conn }

  async fn query_agency(
    &self,
    column: &'static str,
    key: rusqlite::types::Value,
  ) -> Result<Option<Agency>> {
    let raw: Option<RawAgency> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {AGENCY_COLUMNS} FROM agencies WHERE {column} = ?1"),
              rusqlite::params![key],
              RawAgency::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAgency::into_agency).transpose()
  }
}

// ─── AgencyStore impl ────────────────────────────────────────────────────────

impl AgencyStore for SqliteStore {
  type Error = Error;

  async fn register(&self, input: NewAgency) -> Result<Agency> {
    input.validate()?;

    let NewAgency { name, email, password_hash, description } = input;
    let row = (
      name.clone(),
      email.clone(),
      password_hash.clone(),
      description.clone(),
    );

    let outcome = self
      .conn
      .call(move |conn| {
        let (name, email, password_hash, description) = row;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let name_taken: bool = tx.query_row(
          "SELECT EXISTS (SELECT 1 FROM agencies WHERE name = ?1)",
          rusqlite::params![name],
          |r| r.get(0),
        )?;
        if name_taken {
          return Ok(Registration::NameTaken);
        }

        let email_taken: bool = tx.query_row(
          "SELECT EXISTS (SELECT 1 FROM agencies WHERE email = ?1)",
          rusqlite::params![email],
          |r| r.get(0),
        )?;
        if email_taken {
          return Ok(Registration::EmailTaken);
        }

        let created_at = now();
        let inserted = tx.execute(
          "INSERT INTO agencies (name, email, password_hash, description, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            name,
            email,
            password_hash,
            description,
            encode_dt(created_at),
          ],
        );
        if let Err(e) = inserted {
          return match unique_conflict(&e) {
            Some(conflict) => Ok(conflict),
            None => Err(e.into()),
          };
        }

        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Registration::Inserted { id, created_at })
      })
      .await?;

    match outcome {
      Registration::Inserted { id, created_at } => {
        tracing::debug!(agency_id = id, %name, "registered agency");
        Ok(Agency {
          id: AgencyId(id),
          name,
          email,
          password_hash,
          description,
          created_at,
        })
      }
      Registration::NameTaken => {
        Err(civic_core::Error::DuplicateName(name).into())
      }
      Registration::EmailTaken => {
        Err(civic_core::Error::DuplicateEmail(email).into())
      }
    }
  }

  async fn get_agency(&self, id: AgencyId) -> Result<Agency> {
    self
      .query_agency("id", id.0.into())
      .await?
      .ok_or_else(|| civic_core::Error::NotFound(format!("agency {id}")).into())
  }

  async fn find_agency_by_email(&self, email: &str) -> Result<Agency> {
    self
      .query_agency("email", email.to_owned().into())
      .await?
      .ok_or_else(|| {
        civic_core::Error::NotFound(format!("agency with email {email:?}")).into()
      })
  }

  async fn agency_exists(&self, id: AgencyId) -> Result<bool> {
    Ok(
      self
        .conn
        .call(move |conn| Ok(agency_exists_in(conn, id.0)?))
        .await?,
    )
  }

  async fn list_agencies(&self) -> Result<Vec<Agency>> {
    let raws: Vec<RawAgency> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {AGENCY_COLUMNS} FROM agencies ORDER BY name, id"
        ))?;
        let rows = stmt
          .query_map([], RawAgency::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAgency::into_agency).collect()
  }
}

// ─── ReportStore impl ────────────────────────────────────────────────────────

impl ReportStore for SqliteStore {
  async fn submit(&self, input: NewReport) -> Result<Report> {
    let location = input.validate()?;

    let NewReport { message, image_path, agency_id, .. } = input;
    let row = (
      agency_id.map(|a| a.0),
      message.clone(),
      image_path.clone(),
      location.as_ref().map(|l| encode_decimal(l.coordinates.latitude)),
      location.as_ref().map(|l| encode_decimal(l.coordinates.longitude)),
      location
        .as_ref()
        .and_then(|l| l.method.as_ref())
        .map(|m| m.as_str().to_owned()),
    );

    let outcome = self
      .conn
      .call(move |conn| {
        let (agency_id, message, image_path, latitude, longitude, method) = row;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(id) = agency_id
          && !agency_exists_in(&tx, id)?
        {
          return Ok(Submission::UnknownAgency);
        }

        let created_at = now();
        let inserted = tx.execute(
          "INSERT INTO reports (
             agency_id, message, image_path,
             latitude, longitude, location_method, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            agency_id,
            message,
            image_path,
            latitude,
            longitude,
            method,
            encode_dt(created_at),
          ],
        );
        match inserted {
          Err(e) if is_foreign_key_violation(&e) => {
            return Ok(Submission::UnknownAgency);
          }
          other => other?,
        };

        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Submission::Inserted { id, created_at })
      })
      .await?;

    match outcome {
      Submission::Inserted { id, created_at } => {
        tracing::debug!(report_id = id, agency_id = ?agency_id, "report submitted");
        Ok(Report {
          id: ReportId(id),
          agency_id,
          message,
          image_path,
          location,
          created_at,
        })
      }
      Submission::UnknownAgency => {
        let id = agency_id.ok_or_else(|| {
          Error::CorruptRow("foreign key violation on an unassigned report".into())
        })?;
        Err(civic_core::Error::UnknownAgency(id).into())
      }
    }
  }

  async fn get_report(&self, id: ReportId) -> Result<Report> {
    let raw: Option<RawReport> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"),
              rusqlite::params![id.0],
              RawReport::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(RawReport::into_report)
      .transpose()?
      .ok_or_else(|| civic_core::Error::NotFound(format!("report {id}")).into())
  }

  async fn list_by_agency(&self, agency_id: AgencyId) -> Result<Vec<Report>> {
    let raws: Option<Vec<RawReport>> = self
      .conn
      .call(move |conn| {
        // One read transaction so the existence check and the listing see the
        // same snapshot.
        let tx = conn.transaction()?;
        if !agency_exists_in(&tx, agency_id.0)? {
          return Ok(None);
        }
        let rows = {
          let mut stmt = tx.prepare(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports
             WHERE agency_id = ?1
             ORDER BY created_at DESC, id DESC"
          ))?;
          stmt
            .query_map(rusqlite::params![agency_id.0], RawReport::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;
        Ok(Some(rows))
      })
      .await?;

    raws
      .ok_or(civic_core::Error::UnknownAgency(agency_id))?
      .into_iter()
      .map(RawReport::into_report)
      .collect()
  }

  async fn list_unassigned(&self) -> Result<Vec<Report>> {
    let raws: Vec<RawReport> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REPORT_COLUMNS} FROM reports
           WHERE agency_id IS NULL
           ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawReport::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReport::into_report).collect()
  }
}
