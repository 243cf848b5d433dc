//! # Application Settings
//!
//! Typed settings with built-in defaults. Loading from `config.toml` and the
//! environment happens in `cbpm-io::settings`; this module only describes
//! and checks the values.
//!
//! ## Sections
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────────────────┐
//! │ [system]     │ application name, version, company                       │
//! │ [database]   │ SQLite path and connection tuning                        │
//! │ [security]   │ KDF, lockout, session and password rules                 │
//! │ [currency]   │ code, name, symbol, default tax rate                     │
//! │ [regional]   │ country, calling code, timezone, date/time formats       │
//! │ [uploads]    │ size limit, allowed extensions, target directory         │
//! │ [pagination] │ default and maximum page size                            │
//! │ [bootstrap]  │ first administrator identity (optional, no password)     │
//! └──────────────┴──────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::currency::{Currency, TaxRate, FCFA_SYMBOL, XAF};
use crate::datetime::{DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT};
use crate::error::{CoreResult, SecurityError, ValidationError};
use crate::files::{DOCUMENT_EXTENSIONS, IMAGE_EXTENSIONS};
use crate::security::{CredentialHasher, KdfAlgorithm, MIN_PBKDF2_ITERATIONS};
use crate::validation::validate_username;
use crate::{
    COUNTRY_CALLING_CODE, DEFAULT_PAGE_SIZE, MAX_FAILED_LOGIN_ATTEMPTS, MAX_FILE_SIZE,
    MAX_PAGE_SIZE, PASSWORD_MAX_AGE_DAYS, PASSWORD_MIN_LENGTH, SESSION_TIMEOUT_MINUTES,
};

/// Environment variable holding the first administrator's password.
pub const DEFAULT_ADMIN_PASSWORD_ENV: &str = "CBPM_ADMIN_PASSWORD";

/// All settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub system: SystemSettings,
    pub database: DatabaseSettings,
    pub security: SecuritySettings,
    pub currency: CurrencySettings,
    pub regional: RegionalSettings,
    pub uploads: UploadSettings,
    pub pagination: PaginationSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<AdminBootstrap>,
}

impl AppConfig {
    /// Checks cross-field rules and floors.
    pub fn validate(&self) -> CoreResult<()> {
        self.security.hasher()?;

        if self.security.max_failed_login_attempts == 0 {
            return Err(ValidationError::MustBePositive {
                field: "security.max_failed_login_attempts".to_string(),
            }
            .into());
        }
        if self.security.session_timeout_minutes == 0 {
            return Err(ValidationError::MustBePositive {
                field: "security.session_timeout_minutes".to_string(),
            }
            .into());
        }
        if self.security.password_min_length < PASSWORD_MIN_LENGTH {
            return Err(ValidationError::OutOfRange {
                field: "security.password_min_length".to_string(),
                min: PASSWORD_MIN_LENGTH as i64,
                max: i64::MAX,
            }
            .into());
        }

        if self.pagination.max_page_size == 0 {
            return Err(ValidationError::MustBePositive {
                field: "pagination.max_page_size".to_string(),
            }
            .into());
        }
        if self.pagination.default_page_size == 0
            || self.pagination.default_page_size > self.pagination.max_page_size
        {
            return Err(ValidationError::OutOfRange {
                field: "pagination.default_page_size".to_string(),
                min: 1,
                max: self.pagination.max_page_size as i64,
            }
            .into());
        }

        if self.currency.code.trim().is_empty() {
            return Err(ValidationError::required("currency.code").into());
        }
        if self.database.path.trim().is_empty() {
            return Err(ValidationError::required("database.path").into());
        }
        if self.uploads.max_file_size == 0 {
            return Err(ValidationError::MustBePositive {
                field: "uploads.max_file_size".to_string(),
            }
            .into());
        }

        if let Some(bootstrap) = &self.bootstrap {
            validate_username(&bootstrap.username)?;
            if bootstrap.password_env.trim().is_empty() {
                return Err(ValidationError::required("bootstrap.password_env").into());
            }
        }

        Ok(())
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemSettings {
    pub name: String,
    pub version: String,
    pub company: String,
}

impl Default for SystemSettings {
    fn default() -> Self {
        SystemSettings {
            name: "Cameroon Construction Project Management System".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            company: "Cameroon Construction Ltd.".to_string(),
        }
    }
}

/// SQLite location and pragmas for the data-access layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub path: String,
    pub journal_mode: String,
    pub synchronous: String,
    pub foreign_keys: bool,
    /// Negative values are KiB, as SQLite's `cache_size` pragma expects.
    pub cache_size: i64,
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: "cameroon_construction.db".to_string(),
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
            foreign_keys: true,
            cache_size: -20_000,
            busy_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    pub kdf: KdfAlgorithm,
    /// PBKDF2 only.
    pub kdf_iterations: u32,
    pub max_failed_login_attempts: u32,
    pub session_timeout_minutes: u32,
    pub password_min_length: usize,
    /// 0 disables expiry.
    pub password_max_age_days: u32,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        SecuritySettings {
            kdf: KdfAlgorithm::default(),
            kdf_iterations: MIN_PBKDF2_ITERATIONS,
            max_failed_login_attempts: MAX_FAILED_LOGIN_ATTEMPTS,
            session_timeout_minutes: SESSION_TIMEOUT_MINUTES as u32,
            password_min_length: PASSWORD_MIN_LENGTH,
            password_max_age_days: PASSWORD_MAX_AGE_DAYS as u32,
        }
    }
}

impl SecuritySettings {
    /// The hasher these settings select.
    pub fn hasher(&self) -> Result<CredentialHasher, SecurityError> {
        CredentialHasher::new(self.kdf, self.kdf_iterations)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencySettings {
    pub code: String,
    pub name: String,
    pub symbol: String,
    /// Default tax rate in basis points.
    pub tax_rate_bps: u32,
}

impl Default for CurrencySettings {
    fn default() -> Self {
        CurrencySettings {
            code: XAF.to_string(),
            name: "CFA Franc".to_string(),
            symbol: FCFA_SYMBOL.to_string(),
            tax_rate_bps: 0,
        }
    }
}

impl CurrencySettings {
    pub fn currency(&self) -> Currency {
        Currency {
            code: self.code.clone(),
            name: self.name.clone(),
            symbol: self.symbol.clone(),
        }
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionalSettings {
    pub country: String,
    pub calling_code: String,
    pub timezone: String,
    pub date_format: String,
    pub time_format: String,
}

impl Default for RegionalSettings {
    fn default() -> Self {
        RegionalSettings {
            country: "Cameroon".to_string(),
            calling_code: COUNTRY_CALLING_CODE.to_string(),
            timezone: "Africa/Douala".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub directory: String,
    /// Bytes.
    pub max_file_size: u64,
    pub image_extensions: Vec<String>,
    pub document_extensions: Vec<String>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        UploadSettings {
            directory: "uploads".to_string(),
            max_file_size: MAX_FILE_SIZE,
            image_extensions: IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            document_extensions: DOCUMENT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl UploadSettings {
    /// Image and document extensions together.
    pub fn allowed_extensions(&self) -> Vec<&str> {
        self.image_extensions
            .iter()
            .chain(&self.document_extensions)
            .map(String::as_str)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        PaginationSettings {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Identity of the first administrator.
///
/// The password is never part of the file: `password_env` names the
/// environment variable that holds it at provisioning time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminBootstrap {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default = "default_password_env")]
    pub password_env: String,
}

impl AdminBootstrap {
    pub fn new(username: impl Into<String>) -> Self {
        AdminBootstrap {
            username: username.into(),
            email: None,
            first_name: None,
            last_name: None,
            password_env: default_password_env(),
        }
    }
}

fn default_password_env() -> String {
    DEFAULT_ADMIN_PASSWORD_ENV.to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.security.max_failed_login_attempts, 5);
        assert_eq!(config.security.session_timeout_minutes, 60);
        assert_eq!(config.currency.code, "XAF");
        assert_eq!(config.regional.date_format, "%d/%m/%Y");
        assert_eq!(config.uploads.max_file_size, 10 * 1024 * 1024);
        assert!(config.bootstrap.is_none());
    }

    #[test]
    fn test_iteration_floor_is_enforced() {
        let mut config = AppConfig::default();
        config.security.kdf_iterations = 1_000;
        assert!(matches!(
            config.validate(),
            Err(CoreError::Security(SecurityError::IterationsTooLow { .. }))
        ));

        // Argon2 ignores the iteration count
        config.security.kdf = KdfAlgorithm::Argon2id;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        let mut config = AppConfig::default();
        config.security.max_failed_login_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.security.session_timeout_minutes = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.pagination.default_page_size = 500;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.security.password_min_length = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bootstrap_is_checked() {
        let mut config = AppConfig::default();
        config.bootstrap = Some(AdminBootstrap::new("x"));
        assert!(config.validate().is_err());

        config.bootstrap = Some(AdminBootstrap::new("admin"));
        assert!(config.validate().is_ok());
        assert_eq!(
            config.bootstrap.as_ref().unwrap().password_env,
            DEFAULT_ADMIN_PASSWORD_ENV
        );
    }

    #[test]
    fn test_partial_sections_fill_from_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{ "security": { "max_failed_login_attempts": 3 },
                 "bootstrap": { "username": "admin" } }"#,
        )
        .unwrap();
        assert_eq!(config.security.max_failed_login_attempts, 3);
        assert_eq!(config.security.kdf_iterations, MIN_PBKDF2_ITERATIONS);
        assert_eq!(config.database.journal_mode, "WAL");
        assert_eq!(
            config.bootstrap.unwrap().password_env,
            DEFAULT_ADMIN_PASSWORD_ENV
        );
    }

    #[test]
    fn test_allowed_extensions() {
        let uploads = UploadSettings::default();
        let allowed = uploads.allowed_extensions();
        assert!(allowed.contains(&"png"));
        assert!(allowed.contains(&"docx"));
        assert_eq!(allowed.len(), 8);
    }

    #[test]
    fn test_currency_settings() {
        let settings = CurrencySettings {
            tax_rate_bps: 1925,
            ..CurrencySettings::default()
        };
        assert_eq!(settings.currency(), Currency::xaf());
        assert_eq!(settings.tax_rate().percentage(), 19.25);
    }
}
