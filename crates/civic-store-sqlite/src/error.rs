//! Error type for `civic-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A validation or lookup rejection from the core taxonomy.
  #[error(transparent)]
  Core(#[from] civic_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("decimal parse error: {0}")]
  Decimal(#[from] rust_decimal::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored row violates an invariant the schema should have enforced.
  #[error("corrupt row: {0}")]
  CorruptRow(String),
}

impl Error {
  /// The core rejection carried by this error, if it is one. Anything else
  /// is a storage failure.
  pub fn rejection(&self) -> Option<&civic_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
