//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

#[derive(Parser, Debug)]
#[command(author, version, about = "Civic incident report store")]
pub struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "civic.toml")]
  pub config: PathBuf,

  /// Print results as JSON instead of text.
  #[arg(long, global = true)]
  pub json: bool,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Create the database schema (if needed) and exit.
  InitDb,

  /// Print the argon2 hash for a password read from stdin and exit.
  HashPassword,

  /// Register and look up agencies.
  #[command(subcommand)]
  Agency(AgencyCommand),

  /// Submit and list reports.
  #[command(subcommand)]
  Report(ReportCommand),
}

#[derive(Subcommand, Debug)]
pub enum AgencyCommand {
  /// Register an agency. The password is read from stdin.
  Register {
    #[arg(long)]
    name:        String,
    #[arg(long)]
    email:       String,
    #[arg(long)]
    description: Option<String>,
  },

  /// Show one agency, by id or by email.
  Show {
    #[arg(required_unless_present = "email", conflicts_with = "email")]
    id:    Option<i64>,
    #[arg(long)]
    email: Option<String>,
  },

  /// List all agencies by name.
  List,

  /// Check an agency's password (read from stdin) against the stored hash.
  Verify {
    #[arg(long)]
    email: String,
  },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
  /// Submit a report.
  Submit {
    #[arg(long)]
    message: String,
    /// Where the image has already been stored.
    #[arg(long)]
    image:   Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    lat:     Option<Decimal>,
    #[arg(long, allow_negative_numbers = true)]
    lon:     Option<Decimal>,
    /// How the coordinates were obtained, e.g. gps, manual, exif, ip.
    #[arg(long)]
    method:  Option<String>,
    #[arg(long)]
    agency:  Option<i64>,
  },

  /// Show one report.
  Show { id: i64 },

  /// List reports for an agency, or those not yet assigned; newest first.
  List {
    #[arg(long, required_unless_present = "unassigned", conflicts_with = "unassigned")]
    agency:     Option<i64>,
    #[arg(long)]
    unassigned: bool,
  },
}
