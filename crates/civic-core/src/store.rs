//! The `AgencyStore` and `ReportStore` traits.
//!
//! The traits are implemented by storage backends (e.g. `civic-store-sqlite`).
//! Authentication, intake and triage layers depend on these abstractions, not
//! on any concrete backend.

use std::future::Future;

use crate::{
  agency::{Agency, AgencyId, NewAgency},
  report::{NewReport, Report, ReportId},
};

// ─── Agencies ────────────────────────────────────────────────────────────────

/// Abstraction over agency persistence.
///
/// Uniqueness of name and email is checked and enforced in the same atomic
/// unit as the insert: of two concurrent registrations sharing an email,
/// exactly one succeeds.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait AgencyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Validate and persist a new agency. The store assigns `id` and
  /// `created_at`.
  ///
  /// Fails with `InvalidInput` for empty fields, then `DuplicateName`, then
  /// `DuplicateEmail`.
  fn register(
    &self,
    input: NewAgency,
  ) -> impl Future<Output = Result<Agency, Self::Error>> + Send + '_;

  /// Fetch an agency by id; `NotFound` if absent.
  fn get_agency(
    &self,
    id: AgencyId,
  ) -> impl Future<Output = Result<Agency, Self::Error>> + Send + '_;

  /// Fetch an agency by its login email; `NotFound` if absent.
  fn find_agency_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Agency, Self::Error>> + Send + 'a;

  fn agency_exists(
    &self,
    id: AgencyId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All agencies, ordered by name.
  fn list_agencies(
    &self,
  ) -> impl Future<Output = Result<Vec<Agency>, Self::Error>> + Send + '_;
}

// ─── Reports ─────────────────────────────────────────────────────────────────

/// Abstraction over report persistence. Reports are append-only: there is no
/// update or delete.
pub trait ReportStore: AgencyStore {
  /// Validate and persist a submission. The store assigns `id` and
  /// `created_at`; everything else is stored exactly as given.
  ///
  /// Shape errors (`InvalidInput`, `InvalidCoordinates`,
  /// `MissingCoordinates`) are reported before `UnknownAgency`.
  fn submit(
    &self,
    input: NewReport,
  ) -> impl Future<Output = Result<Report, Self::Error>> + Send + '_;

  /// Fetch a report by id; `NotFound` if absent.
  fn get_report(
    &self,
    id: ReportId,
  ) -> impl Future<Output = Result<Report, Self::Error>> + Send + '_;

  /// Reports linked to `agency_id`, newest first. `UnknownAgency` if the
  /// agency does not exist; an empty list if it simply has no reports.
  fn list_by_agency(
    &self,
    agency_id: AgencyId,
  ) -> impl Future<Output = Result<Vec<Report>, Self::Error>> + Send + '_;

  /// Reports with no agency link, newest first.
  fn list_unassigned(
    &self,
  ) -> impl Future<Output = Result<Vec<Report>, Self::Error>> + Send + '_;
}
