//! # cbpm-core: Business Utility Layer for CBPM
//!
//! Everything the CBPM desktop application computes without touching the
//! outside world: validation, money and dates, reports, passwords, roles,
//! inventory bookkeeping, job postings and settings.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CBPM Architecture                                │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    GUI (screens, dashboards)                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 Data-access layer (SQLite)                      │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────────────┐  ┌────────▼───────────────┐   │
//! │  │        ★ cbpm-core (THIS CRATE) ★   │  │        cbpm-io         │   │
//! │  │                                     │◄─┤  export, uploads,      │   │
//! │  │  validation  currency  datetime     │  │  config loading,       │   │
//! │  │  security    auth      roles        │  │  tracing, provisioning │   │
//! │  │  types       inventory reporting    │  │  binary                │   │
//! │  │  jobs        calculation files      │  └────────────────────────┘   │
//! │  │  notification config   provision    │                               │
//! │  │                                     │                               │
//! │  │  NO I/O • NO DATABASE • NO NETWORK  │                               │
//! │  └─────────────────────────────────────┘                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **No I/O**: files, environment and database stay in `cbpm-io` and the
//!    data-access layer
//! 2. **Explicit Errors**: invariant failures are typed, format checks answer
//!    with `bool`/`Option`
//! 3. **Explicit Time**: operations that depend on the clock take `now`
//! 4. **No Built-in Accounts**: the first administrator is provisioned from
//!    operator-supplied identity and secret
//!
//! ## Example Usage
//!
//! ```rust
//! use cbpm_core::currency::format_currency;
//! use cbpm_core::calculation::{units_to_purchase, DEFAULT_WASTE_FACTOR};
//!
//! // 120 m² of floor, one bag of tile adhesive covers 5 m²
//! let bags = units_to_purchase(120.0, 5.0, DEFAULT_WASTE_FACTOR);
//! assert_eq!(bags, 27);
//!
//! assert_eq!(format_currency(bags as f64 * 6_500.0, "XAF"), "175,500 FCFA");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

#[macro_use]
mod macros;

pub mod auth;
pub mod calculation;
pub mod config;
pub mod currency;
pub mod datetime;
pub mod error;
pub mod files;
pub mod inventory;
pub mod jobs;
pub mod notification;
pub mod provision;
pub mod reporting;
pub mod roles;
pub mod security;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, SecurityError, ValidationError};
pub use roles::{Capability, Role};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Cameroon's international calling code, without `+`.
pub const COUNTRY_CALLING_CODE: &str = "237";

/// Minimum password length.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Lines with less than this quantity are reported as low stock.
pub const LOW_STOCK_THRESHOLD: f64 = 10.0;

/// Failed logins before an account locks.
pub const MAX_FAILED_LOGIN_ATTEMPTS: u32 = 5;

/// Idle session lifetime in minutes; `security.session_timeout_minutes`
/// in the config overrides it.
pub const SESSION_TIMEOUT_MINUTES: i64 = 60;

/// Password age after which a change is forced at login.
pub const PASSWORD_MAX_AGE_DAYS: i64 = 90;

/// Upload size limit in bytes (10 MiB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

pub const DEFAULT_PAGE_SIZE: usize = 20;

pub const MAX_PAGE_SIZE: usize = 100;
