//! Core types and trait definitions for the civic report store.
//!
//! This crate is free of database and I/O dependencies. Storage backends
//! implement the traits in [`store`]; intake and triage layers depend on those
//! traits, not on any concrete backend.

pub mod agency;
pub mod error;
pub mod location;
pub mod report;
pub mod store;

mod validate;

pub use error::{Error, Result};
