//! # Error Types
//!
//! Domain-specific error types for cbpm-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cbpm-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Record invariant failures                      │
//! │  └── SecurityError    - Key derivation and login failures              │
//! │                                                                         │
//! │  cbpm-io errors (separate crate)                                       │
//! │  └── IoError          - File, export and config failures               │
//! │                                                                         │
//! │  Flow: ValidationError / SecurityError → CoreError → IoError → caller  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Input *format* checks (email, phone, price strings) do not use these types;
//! they answer with `bool`/`Option` instead. See [`crate::validation`].

use thiserror::Error;

use crate::roles::{Capability, Role};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Not enough stock at a store to cover a decrement.
    ///
    /// ## When This Occurs
    /// - Selling or consuming more than the store holds
    /// - Transferring more than the source store holds
    ///
    /// The inventory book is left untouched when this is returned.
    #[error(
        "Insufficient stock of material {material_id} at store {store_id}: available {available}, requested {requested}"
    )]
    InsufficientStock {
        store_id: String,
        material_id: String,
        available: f64,
        requested: f64,
    },

    /// A record is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Accepting an application that was already rejected
    /// - Closing a job that is already closed
    /// - Applying to a closed job
    #[error("{entity} {id} is {current_status}, cannot {action}")]
    InvalidStatus {
        entity: String,
        id: String,
        current_status: String,
        action: String,
    },

    /// The acting user's role lacks a required capability.
    #[error("Role {role} is missing capability {capability}")]
    PermissionDenied { role: Role, capability: Capability },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Security error (wraps SecurityError).
    #[error("Security error: {0}")]
    Security(#[from] SecurityError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Record invariant failures.
///
/// Raised when constructing or mutating a record would break one of the data
/// model invariants (non-negative quantities, enumerated roles, ...).
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid email, non-finite number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value.
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Security Error
// =============================================================================

/// Key derivation and authentication failures.
///
/// Messages never include passwords, hashes or salts.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// A salt was supplied but it is empty.
    #[error("salt must not be empty when supplied")]
    EmptySalt,

    /// The configured iteration count is below the floor.
    #[error("key derivation needs at least {minimum} iterations, got {configured}")]
    IterationsTooLow { configured: u32, minimum: u32 },

    /// The underlying KDF rejected its parameters.
    #[error("key derivation failed: {0}")]
    Derivation(String),

    /// Password does not meet the strength policy.
    #[error("password is too weak, missing: {}", missing.join(", "))]
    WeakPassword { missing: Vec<String> },

    /// New password equals the current one.
    #[error("new password must differ from the current password")]
    PasswordReused,

    /// Username/password pair did not verify.
    #[error("invalid credentials, {remaining_attempts} attempts remaining")]
    InvalidCredentials { remaining_attempts: u32 },

    /// Too many failed logins.
    #[error("account '{username}' is locked after {attempts} failed attempts")]
    AccountLocked { username: String, attempts: u32 },

    /// Account is deactivated.
    #[error("account '{username}' is inactive")]
    AccountInactive { username: String },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for Results with SecurityError.
pub type SecurityResult<T> = Result<T, SecurityError>;

// =============================================================================
// Unit Tests
// =============================================================================
