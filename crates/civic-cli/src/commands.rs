//! Agency and report subcommands, run against an open store.
//!
//! Output goes to the supplied writer; passwords are read from the supplied
//! reader. `main` passes stdout/stdin, tests pass buffers.

use std::io::{BufRead, Write};

use anyhow::{Context as _, bail};
use civic_core::{
  agency::{Agency, AgencyId, NewAgency},
  report::{NewReport, Report, ReportId},
  store::{AgencyStore, ReportStore},
};
use civic_store_sqlite::SqliteStore;
use serde::Serialize;

use crate::{
  cli::{AgencyCommand, ReportCommand},
  credentials::{hash_password, read_password, verify_password},
};

// ─── Output ──────────────────────────────────────────────────────────────────

pub struct Output<'a, W: Write> {
  pub out:  &'a mut W,
  pub json: bool,
}

impl<W: Write> Output<'_, W> {
  fn emit<T: Serialize>(
    &mut self,
    value: &T,
    text: impl FnOnce(&mut W) -> std::io::Result<()>,
  ) -> anyhow::Result<()> {
    if self.json {
      serde_json::to_writer_pretty(&mut *self.out, value)?;
      writeln!(self.out)?;
    } else {
      text(&mut *self.out)?;
    }
    Ok(())
  }
}

fn write_agency(out: &mut impl Write, agency: &Agency) -> std::io::Result<()> {
  writeln!(out, "#{}  {} <{}>", agency.id, agency.name, agency.email)?;
  if let Some(description) = &agency.description {
    writeln!(out, "  {description}")?;
  }
  Ok(())
}

fn write_report(out: &mut impl Write, report: &Report) -> std::io::Result<()> {
  let assigned = match report.agency_id {
    Some(id) => format!("agency {id}"),
    None => "unassigned".to_string(),
  };
  writeln!(out, "#{}  {}  {assigned}", report.id, report.created_at.to_rfc3339())?;
  writeln!(out, "  {}", report.message)?;
  if let Some(location) = &report.location {
    let method = location
      .method
      .as_ref()
      .map_or("unspecified", |m| m.as_str());
    writeln!(
      out,
      "  location: {}, {} ({method})",
      location.coordinates.latitude, location.coordinates.longitude
    )?;
  }
  if let Some(path) = &report.image_path {
    writeln!(out, "  image: {path}")?;
  }
  Ok(())
}

// ─── Agencies ────────────────────────────────────────────────────────────────

pub async fn agency<W: Write>(
  store: &SqliteStore,
  command: AgencyCommand,
  input: &mut impl BufRead,
  mut output: Output<'_, W>,
) -> anyhow::Result<()> {
  match command {
    AgencyCommand::Register { name, email, description } => {
      let password = read_password(input)?;
      let mut new = NewAgency::new(name, email, hash_password(&password)?);
      new.description = description;
      let agency = store.register(new).await?;
      tracing::info!(agency_id = %agency.id, "agency registered");
      output.emit(&agency, |out| write_agency(out, &agency))
    }
    AgencyCommand::Show { id: Some(id), .. } => {
      let agency = store.get_agency(AgencyId(id)).await?;
      output.emit(&agency, |out| write_agency(out, &agency))
    }
    AgencyCommand::Show { id: None, email } => {
      let email = email.context("either an id or --email is required")?;
      let agency = store.find_agency_by_email(&email).await?;
      output.emit(&agency, |out| write_agency(out, &agency))
    }
    AgencyCommand::List => {
      let agencies = store.list_agencies().await?;
      output.emit(&agencies, |out| {
        agencies.iter().try_for_each(|a| write_agency(out, a))
      })
    }
    AgencyCommand::Verify { email } => {
      let password = read_password(input)?;
      // Unknown email and wrong password look the same from outside.
      let agency = match store.find_agency_by_email(&email).await {
        Ok(agency) => Some(agency),
        Err(e) if e.rejection().is_some() => None,
        Err(e) => return Err(e.into()),
      };
      match agency {
        Some(agency) if verify_password(&password, &agency.password_hash) => {
          output.emit(&agency, |out| write_agency(out, &agency))
        }
        _ => bail!("invalid email or password"),
      }
    }
  }
}

// ─── Reports ─────────────────────────────────────────────────────────────────

pub async fn report<W: Write>(
  store: &SqliteStore,
  command: ReportCommand,
  mut output: Output<'_, W>,
) -> anyhow::Result<()> {
  match command {
    ReportCommand::Submit { message, image, lat, lon, method, agency } => {
      let report = store
        .submit(NewReport {
          message,
          image_path: image,
          latitude: lat,
          longitude: lon,
          location_method: method,
          agency_id: agency.map(AgencyId),
        })
        .await?;
      output.emit(&report, |out| write_report(out, &report))
    }
    ReportCommand::Show { id } => {
      let report = store.get_report(ReportId(id)).await?;
      output.emit(&report, |out| write_report(out, &report))
    }
    ReportCommand::List { agency, .. } => {
      let reports = match agency {
        Some(id) => store.list_by_agency(AgencyId(id)).await?,
        None => store.list_unassigned().await?,
      };
      output.emit(&reports, |out| {
        reports.iter().try_for_each(|r| write_report(out, r))
      })
    }
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;

  async fn store() -> SqliteStore { SqliteStore::open_in_memory().await.unwrap() }

  async fn run_agency(
    store: &SqliteStore,
    command: AgencyCommand,
    stdin: &str,
    json: bool,
  ) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    agency(
      store,
      command,
      &mut Cursor::new(stdin.to_string()),
      Output { out: &mut buf, json },
    )
    .await?;
    Ok(String::from_utf8(buf).unwrap())
  }

  async fn run_report(
    store: &SqliteStore,
    command: ReportCommand,
    json: bool,
  ) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    report(store, command, Output { out: &mut buf, json }).await?;
    Ok(String::from_utf8(buf).unwrap())
  }

  fn register(name: &str, email: &str) -> AgencyCommand {
    AgencyCommand::Register {
      name:        name.into(),
      email:       email.into(),
      description: None,
    }
  }

  #[tokio::test]
  async fn register_stores_a_hash_not_the_password() {
    let s = store().await;
    let out = run_agency(&s, register("Water", "water@city.gov"), "pw\n", true)
      .await
      .unwrap();
    assert!(!out.contains("password_hash"), "{out}");

    let stored = s.find_agency_by_email("water@city.gov").await.unwrap();
    assert_ne!(stored.password_hash, "pw");
    assert!(verify_password("pw", &stored.password_hash));
  }

  #[tokio::test]
  async fn verify_accepts_right_password_only() {
    let s = store().await;
    run_agency(&s, register("Water", "water@city.gov"), "pw\n", false)
      .await
      .unwrap();

    let verify = || AgencyCommand::Verify { email: "water@city.gov".into() };
    assert!(run_agency(&s, verify(), "pw\n", false).await.is_ok());

    let err = run_agency(&s, verify(), "nope\n", false).await.unwrap_err();
    assert_eq!(err.to_string(), "invalid email or password");

    let unknown = AgencyCommand::Verify { email: "who@city.gov".into() };
    let err = run_agency(&s, unknown, "pw\n", false).await.unwrap_err();
    assert_eq!(err.to_string(), "invalid email or password");
  }

  #[tokio::test]
  async fn duplicate_registration_surfaces_the_rejection() {
    let s = store().await;
    run_agency(&s, register("Water", "water@city.gov"), "pw\n", false)
      .await
      .unwrap();
    let err = run_agency(&s, register("Sewer", "water@city.gov"), "pw\n", false)
      .await
      .unwrap_err();
    let rejection = err
      .downcast_ref::<civic_store_sqlite::Error>()
      .and_then(|e| e.rejection())
      .cloned();
    assert_eq!(
      rejection,
      Some(civic_core::Error::DuplicateEmail("water@city.gov".into()))
    );
  }

  #[tokio::test]
  async fn submit_then_list_by_agency() {
    let s = store().await;
    run_agency(&s, register("Water", "water@city.gov"), "pw\n", false)
      .await
      .unwrap();
    let water = s.find_agency_by_email("water@city.gov").await.unwrap();

    let submit = ReportCommand::Submit {
      message: "leak".into(),
      image:   None,
      lat:     Some("40.71280000".parse().unwrap()),
      lon:     Some("-74.00600000".parse().unwrap()),
      method:  Some("gps".into()),
      agency:  Some(water.id.0),
    };
    run_report(&s, submit, false).await.unwrap();

    let list = ReportCommand::List { agency: Some(water.id.0), unassigned: false };
    let out = run_report(&s, list, false).await.unwrap();
    assert!(out.contains("leak"), "{out}");
    assert!(out.contains("40.71280000, -74.00600000 (gps)"), "{out}");
  }

  #[tokio::test]
  async fn unassigned_listing_as_json() {
    let s = store().await;
    let submit = ReportCommand::Submit {
      message: "graffiti".into(),
      image:   Some("uploads/wall.png".into()),
      lat:     None,
      lon:     None,
      method:  None,
      agency:  None,
    };
    run_report(&s, submit, false).await.unwrap();

    let list = ReportCommand::List { agency: None, unassigned: true };
    let out = run_report(&s, list, true).await.unwrap();
    let parsed: Vec<Report> = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].image_path.as_deref(), Some("uploads/wall.png"));
    assert!(parsed[0].agency_id.is_none());
  }

  #[tokio::test]
  async fn listing_for_unknown_agency_fails() {
    let s = store().await;
    let list = ReportCommand::List { agency: Some(5), unassigned: false };
    assert!(run_report(&s, list, false).await.is_err());
  }
}
