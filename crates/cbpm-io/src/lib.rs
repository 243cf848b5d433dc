//! # cbpm-io: File and Environment Edge for CBPM
//!
//! The parts of the CBPM utility layer that touch the disk or the process
//! environment. Business rules live in `cbpm-core`; this crate only moves
//! their inputs and outputs in and out.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           cbpm-io                                       │
//! │                                                                         │
//! │  settings ── config.toml + CBPM_* env ──► cbpm_core::config::AppConfig  │
//! │  export   ── records ──► CSV / JSON files                               │
//! │  fs       ── upload files ──► size / type checks, upload directory      │
//! │  logging  ── tracing subscriber for binaries                            │
//! │                                                                         │
//! │  bin/provision-admin ── settings + env secret ──► first administrator   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cbpm_io::{export, settings};
//!
//! let config = settings::load(None)?;
//! let report = cbpm_core::reporting::inventory_report(&lines);
//! export::write_json(&report, Path::new("inventaire.json"))?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod export;
pub mod fs;
pub mod logging;
pub mod settings;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{IoError, IoResult};
pub use export::{export_to_csv, export_to_json, read_json, write_csv, write_json};
pub use fs::{check_upload_file, ensure_directory, file_size, stage_upload};
pub use logging::init_tracing;
