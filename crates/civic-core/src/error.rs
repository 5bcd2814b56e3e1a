//! Error types for `civic-core`.

use thiserror::Error;

use crate::agency::AgencyId;

/// Rejections raised by validation and lookups. None of these is a system
/// failure; callers map them to whatever their surface reports to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("invalid coordinates: {0}")]
  InvalidCoordinates(String),

  #[error("location method given without coordinates")]
  MissingCoordinates,

  #[error("an agency named {0:?} is already registered")]
  DuplicateName(String),

  #[error("an agency with email {0:?} is already registered")]
  DuplicateEmail(String),

  #[error("unknown agency: {0}")]
  UnknownAgency(AgencyId),

  #[error("{0} not found")]
  NotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
