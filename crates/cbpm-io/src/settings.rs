//! # Configuration Loading
//!
//! Reads [`AppConfig`] from `config.toml` and the environment.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CBPM_DB_PATH=/srv/cbpm/cbpm.db                                     │
//! │     CBPM_KDF=argon2id                                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     explicit path, or                                                  │
//! │     ~/.config/cbpm/config.toml (Linux)                                 │
//! │     ~/Library/Application Support/cm.cbpm.cbpm/config.toml (macOS)     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "cameroon_construction.db"
//!
//! [security]
//! kdf = "pbkdf2_sha256"
//! kdf_iterations = 200000
//! max_failed_login_attempts = 5
//!
//! [bootstrap]
//! username = "admin"
//! email = "it@example.cm"
//! password_env = "CBPM_ADMIN_PASSWORD"
//! ```
//!
//! Passwords never go in this file.

use cbpm_core::config::{AdminBootstrap, AppConfig};
use cbpm_core::security::{KdfAlgorithm, Secret};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::{IoError, IoResult};

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Platform config location, e.g. `~/.config/cbpm/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("cm", "cbpm", "cbpm")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Loads configuration from file, environment, and defaults.
///
/// ## Load Order (later overrides earlier)
/// 1. Default values
/// 2. Config file (`config_path`, else the platform location)
/// 3. Environment variables
///
/// The result is validated before it is returned.
pub fn load(config_path: Option<PathBuf>) -> IoResult<AppConfig> {
    load_with_env(config_path, |key| std::env::var(key).ok())
}

/// [`load`] with a custom environment lookup.
pub fn load_with_env(
    config_path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> IoResult<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(path) = config_path.or_else(default_config_path) {
        if path.exists() {
            info!(?path, "Loading config from file");
            let contents = std::fs::read_to_string(&path)?;
            config = toml::from_str(&contents)?;
        } else {
            debug!(?path, "Config file not found, using defaults");
        }
    }

    apply_env_overrides(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Loads config or returns default if load fails.
pub fn load_or_default(config_path: Option<PathBuf>) -> AppConfig {
    load(config_path).unwrap_or_else(|e| {
        warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    })
}

/// Saves configuration to file and returns where it went.
pub fn save(config: &AppConfig, config_path: Option<PathBuf>) -> IoResult<PathBuf> {
    let path = config_path
        .or_else(default_config_path)
        .ok_or_else(|| IoError::Config("No config path available".into()))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;

    info!(?path, "Config saved");
    Ok(path)
}

/// Applies `CBPM_*` environment variable overrides.
///
/// Values that do not parse are logged and ignored.
pub fn apply_env_overrides(config: &mut AppConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(path) = env("CBPM_DB_PATH") {
        debug!(path = %path, "Overriding database path from environment");
        config.database.path = path;
    }

    if let Some(kdf) = env("CBPM_KDF") {
        if let Some(parsed) = parse_var::<KdfAlgorithm>("CBPM_KDF", &kdf) {
            debug!(kdf = %parsed, "Overriding KDF from environment");
            config.security.kdf = parsed;
        }
    }

    if let Some(value) = env("CBPM_KDF_ITERATIONS") {
        if let Some(iterations) = parse_var("CBPM_KDF_ITERATIONS", &value) {
            config.security.kdf_iterations = iterations;
        }
    }

    if let Some(value) = env("CBPM_MAX_FAILED_LOGINS") {
        if let Some(max) = parse_var("CBPM_MAX_FAILED_LOGINS", &value) {
            config.security.max_failed_login_attempts = max;
        }
    }

    if let Some(value) = env("CBPM_SESSION_TIMEOUT_MINUTES") {
        if let Some(minutes) = parse_var("CBPM_SESSION_TIMEOUT_MINUTES", &value) {
            config.security.session_timeout_minutes = minutes;
        }
    }

    if let Some(code) = env("CBPM_CURRENCY_CODE") {
        debug!(code = %code, "Overriding currency from environment");
        config.currency.code = code.trim().to_uppercase();
    }

    if let Some(username) = env("CBPM_ADMIN_USERNAME") {
        debug!(username = %username, "Overriding bootstrap username from environment");
        match config.bootstrap.as_mut() {
            Some(bootstrap) => bootstrap.username = username,
            None => config.bootstrap = Some(AdminBootstrap::new(username)),
        }
    }

    if let Some(email) = env("CBPM_ADMIN_EMAIL") {
        match config.bootstrap.as_mut() {
            Some(bootstrap) => bootstrap.email = Some(email),
            None => warn!("CBPM_ADMIN_EMAIL is set but there is no bootstrap username"),
        }
    }
}

/// Reads the bootstrap password from the variable the config names.
pub fn bootstrap_password(
    bootstrap: &AdminBootstrap,
    env: impl Fn(&str) -> Option<String>,
) -> IoResult<Secret> {
    env(&bootstrap.password_env)
        .filter(|value| !value.is_empty())
        .map(Secret::from)
        .ok_or_else(|| {
            IoError::Config(format!(
                "environment variable {} is not set",
                bootstrap.password_env
            ))
        })
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(variable = name, value = %value, "Ignoring unparsable environment value");
            None
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cbpm_core::config::DEFAULT_ADMIN_PASSWORD_ENV;
    use cbpm_core::CoreError;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn no_env() -> impl Fn(&str) -> Option<String> {
        |_| None
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = load_with_env(Some(dir.path().join(CONFIG_FILE_NAME)), no_env()).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_file_values_are_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            r#"
[database]
path = "/srv/cbpm/cbpm.db"

[security]
kdf = "argon2id"
max_failed_login_attempts = 3

[bootstrap]
username = "admin"
"#,
        )
        .unwrap();

        let config = load_with_env(Some(path), no_env()).unwrap();
        assert_eq!(config.database.path, "/srv/cbpm/cbpm.db");
        assert_eq!(config.database.journal_mode, "WAL");
        assert_eq!(config.security.kdf, KdfAlgorithm::Argon2id);
        assert_eq!(config.security.max_failed_login_attempts, 3);
        assert_eq!(config.security.session_timeout_minutes, 60);
        let bootstrap = config.bootstrap.unwrap();
        assert_eq!(bootstrap.username, "admin");
        assert_eq!(bootstrap.password_env, DEFAULT_ADMIN_PASSWORD_ENV);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[security]\nmax_failed_login_attempts = 3\n").unwrap();

        let env = env_from(&[
            ("CBPM_MAX_FAILED_LOGINS", "7"),
            ("CBPM_DB_PATH", "override.db"),
            ("CBPM_KDF_ITERATIONS", "250000"),
            ("CBPM_SESSION_TIMEOUT_MINUTES", "not-a-number"),
            ("CBPM_CURRENCY_CODE", " eur "),
            ("CBPM_ADMIN_USERNAME", "root_admin"),
            ("CBPM_ADMIN_EMAIL", "it@cbpm.cm"),
        ]);
        let config = load_with_env(Some(path), env).unwrap();

        assert_eq!(config.security.max_failed_login_attempts, 7);
        assert_eq!(config.database.path, "override.db");
        assert_eq!(config.security.kdf_iterations, 250_000);
        assert_eq!(config.security.session_timeout_minutes, 60);
        assert_eq!(config.currency.code, "EUR");
        let bootstrap = config.bootstrap.unwrap();
        assert_eq!(bootstrap.username, "root_admin");
        assert_eq!(bootstrap.email.as_deref(), Some("it@cbpm.cm"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[security]\nkdf_iterations = 1000\n").unwrap();

        assert!(matches!(
            load_with_env(Some(path.clone()), no_env()),
            Err(IoError::Core(CoreError::Security(_)))
        ));

        std::fs::write(&path, "[security\n").unwrap();
        assert!(matches!(
            load_with_env(Some(path), no_env()),
            Err(IoError::TomlDe(_))
        ));
    }

    #[test]
    fn test_env_kdf_override() {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, env_from(&[("CBPM_KDF", "argon2")]));
        assert_eq!(config.security.kdf, KdfAlgorithm::Argon2id);

        apply_env_overrides(&mut config, env_from(&[("CBPM_KDF", "md5")]));
        assert_eq!(config.security.kdf, KdfAlgorithm::Argon2id);
    }

    #[test]
    fn test_email_without_username_is_ignored() {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, env_from(&[("CBPM_ADMIN_EMAIL", "a@b.cm")]));
        assert!(config.bootstrap.is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = AppConfig::default();
        config.security.kdf_iterations = 300_000;
        config.bootstrap = Some(AdminBootstrap::new("admin"));

        let written = save(&config, Some(path.clone())).unwrap();
        assert_eq!(written, path);

        let loaded = load_with_env(Some(path), no_env()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_bootstrap_password() {
        let bootstrap = AdminBootstrap::new("admin");
        let secret =
            bootstrap_password(&bootstrap, env_from(&[(DEFAULT_ADMIN_PASSWORD_ENV, "S3cret!Pw")]))
                .unwrap();
        assert_eq!(secret.expose(), "S3cret!Pw");

        assert!(matches!(
            bootstrap_password(&bootstrap, env_from(&[(DEFAULT_ADMIN_PASSWORD_ENV, "")])),
            Err(IoError::Config(_))
        ));
        assert!(bootstrap_password(&bootstrap, no_env()).is_err());
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "not toml at all = = =").unwrap();
        assert_eq!(load_or_default(Some(path)), AppConfig::default());
    }
}
