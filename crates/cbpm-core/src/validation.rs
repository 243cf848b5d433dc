//! # Validation Module
//!
//! Input validation utilities for CBPM.
//!
//! ## Two Kinds of Validator
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Format checks (user typing into a form)                               │
//! │  ├── validate_email / validate_phone      → bool                       │
//! │  ├── validate_password                    → PasswordStrength report    │
//! │  └── validate_price                       → Option<f64>                │
//! │      Never fail loudly: malformed input is just `false` / `None`.      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Record invariants (building a User, Transaction, ...)                 │
//! │  ├── validate_username, validate_required                              │
//! │  └── validate_quantity, validate_amount, validate_page_size            │
//! │      Return ValidationResult so constructors can `?` them.             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Database constraints (data-access layer, out of this crate)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cbpm_core::validation::{validate_phone, validate_price, validate_quantity};
//!
//! assert!(validate_phone("+237 677 12 34 56"));
//! assert_eq!(validate_price("12, 500"), Some(12500.0));
//! assert!(validate_quantity(-1.0).is_err());
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::{COUNTRY_CALLING_CODE, PASSWORD_MIN_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Characters that count as "special" for password strength.
const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Local (national) phone number length.
const LOCAL_PHONE_DIGITS: usize = 9;

// =============================================================================
// Format Checks
// =============================================================================

/// Checks an email address against a conservative pattern.
///
/// ## Example
/// ```rust
/// use cbpm_core::validation::validate_email;
///
/// assert!(validate_email("jean.mballa@email.com"));
/// assert!(!validate_email("jean.mballa@"));
/// ```
pub fn validate_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Checks a Cameroon phone number.
///
/// All non-digit characters are stripped first. The remaining digits must be
/// either a 9-digit local number or a 12-digit number starting with the
/// country calling code `237`.
pub fn validate_phone(phone: &str) -> bool {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        LOCAL_PHONE_DIGITS => true,
        n if n == COUNTRY_CALLING_CODE.len() + LOCAL_PHONE_DIGITS => {
            digits.starts_with(COUNTRY_CALLING_CODE)
        }
        _ => false,
    }
}

/// Per-rule outcome of a password strength check.
///
/// Every field is `true` when the rule is satisfied; the GUI renders the
/// unsatisfied ones as hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PasswordStrength {
    pub length: bool,
    pub has_upper: bool,
    pub has_lower: bool,
    pub has_digit: bool,
    pub has_special: bool,
}

impl PasswordStrength {
    /// Evaluates `password` against a minimum length (in characters).
    pub fn evaluate(password: &str, min_length: usize) -> Self {
        PasswordStrength {
            length: password.chars().count() >= min_length,
            has_upper: password.chars().any(char::is_uppercase),
            has_lower: password.chars().any(char::is_lowercase),
            has_digit: password.chars().any(|c| c.is_ascii_digit()),
            has_special: password.chars().any(|c| PASSWORD_SPECIALS.contains(c)),
        }
    }

    /// True when every rule holds.
    pub fn is_strong(&self) -> bool {
        self.missing().is_empty()
    }

    /// Names of the rules that failed, in a stable order.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (self.length, "length"),
            (self.has_upper, "has_upper"),
            (self.has_lower, "has_lower"),
            (self.has_digit, "has_digit"),
            (self.has_special, "has_special"),
        ]
        .into_iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, name)| name)
        .collect()
    }
}

/// Password strength with the default minimum length.
///
/// ## Example
/// ```rust
/// use cbpm_core::validation::validate_password;
///
/// assert!(validate_password("Ciment@2025").is_strong());
/// assert_eq!(validate_password("ciment").missing(),
///            vec!["length", "has_upper", "has_digit", "has_special"]);
/// ```
pub fn validate_password(password: &str) -> PasswordStrength {
    PasswordStrength::evaluate(password, PASSWORD_MIN_LENGTH)
}

/// Parses a price typed by a user.
///
/// Commas and whitespace are removed (`"12 500"`, `"12,500"`) before parsing.
/// Returns `None` for anything that is not a finite, non-negative number.
pub fn validate_price(price: &str) -> Option<f64> {
    let cleaned: String = price
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

// =============================================================================
// Record Invariants
// =============================================================================

/// Validates a username.
///
/// ## Rules
/// - 3 to 50 characters after trimming
/// - Letters, digits, `_`, `.`, `-`, `@` only
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::required("username"));
    }

    let len = username.chars().count();
    if len < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }
    if len > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '@'))
    {
        return Err(ValidationError::invalid(
            "username",
            "must contain only letters, numbers, '_', '.', '-' and '@'",
        ));
    }

    Ok(())
}

/// Validates that a free-text field is present and at most `max` characters.
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a stock quantity.
///
/// ## Rules
/// - Must be finite
/// - Must be non-negative (zero is a valid, empty stock level)
pub fn validate_quantity(quantity: f64) -> ValidationResult<()> {
    validate_non_negative("quantity", quantity)
}

/// Validates a monetary amount (unit price, standard price, salary).
///
/// ## Example
/// ```rust
/// use cbpm_core::validation::validate_amount;
///
/// assert!(validate_amount("price", 4000.0).is_ok());
/// assert!(validate_amount("price", 0.0).is_ok());
/// assert!(validate_amount("price", -1.0).is_err());
/// ```
pub fn validate_amount(field: &str, amount: f64) -> ValidationResult<()> {
    validate_non_negative(field, amount)
}

fn validate_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::invalid(field, "must be a finite number"));
    }

    if value < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a requested page size against the configured maximum.
pub fn validate_page_size(page_size: usize, max: usize) -> ValidationResult<()> {
    if page_size == 0 || page_size > max {
        return Err(ValidationError::OutOfRange {
            field: "page_size".to_string(),
            min: 1,
            max: max as i64,
        });
    }

    Ok(())
}

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use cbpm_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required("id"));
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::invalid("id", "must be a valid UUID"))?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
