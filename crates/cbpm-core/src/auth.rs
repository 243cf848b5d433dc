//! # Login Policy
//!
//! Applies the account rules around a credential check: lockout after
//! repeated failures, forced rotation, legacy hash upgrade and session issue.
//!
//! ## Login Flow
//! ```text
//! authenticate(user, password)
//!     │
//!     ├── inactive?                 → AccountInactive
//!     ├── failed ≥ max?             → AccountLocked
//!     ├── verify fails              → failed += 1
//!     │                               → InvalidCredentials { remaining }
//!     │                               → AccountLocked when remaining hits 0
//!     └── verify ok                 → failed = 0, last_login = now
//!                                     legacy row? re-derive with fresh salt
//!                                     → Session { must_change_password }
//! ```
//!
//! The caller persists the mutated `User` whatever the outcome.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::config::SecuritySettings;
use crate::error::{SecurityError, SecurityResult};
use crate::roles::Role;
use crate::security::{generate_session_token, CredentialHasher, Verification};
use crate::types::User;
use crate::validation::PasswordStrength;
use crate::{
    MAX_FAILED_LOGIN_ATTEMPTS, PASSWORD_MAX_AGE_DAYS, PASSWORD_MIN_LENGTH, SESSION_TIMEOUT_MINUTES,
};

// =============================================================================
// Policy
// =============================================================================

/// Account rules applied at login and password change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginPolicy {
    pub max_failed_attempts: u32,
    pub session_timeout: Duration,
    /// `None` disables password expiry.
    pub password_max_age: Option<Duration>,
    pub min_password_length: usize,
}

impl Default for LoginPolicy {
    fn default() -> Self {
        LoginPolicy {
            max_failed_attempts: MAX_FAILED_LOGIN_ATTEMPTS,
            session_timeout: Duration::minutes(SESSION_TIMEOUT_MINUTES),
            password_max_age: Some(Duration::days(PASSWORD_MAX_AGE_DAYS)),
            min_password_length: PASSWORD_MIN_LENGTH,
        }
    }
}

impl From<&SecuritySettings> for LoginPolicy {
    fn from(settings: &SecuritySettings) -> Self {
        LoginPolicy {
            max_failed_attempts: settings.max_failed_login_attempts,
            session_timeout: Duration::minutes(i64::from(settings.session_timeout_minutes)),
            password_max_age: (settings.password_max_age_days > 0)
                .then(|| Duration::days(i64::from(settings.password_max_age_days))),
            min_password_length: settings.password_min_length,
        }
    }
}

impl LoginPolicy {
    pub fn is_locked(&self, user: &User) -> bool {
        user.failed_login_attempts >= self.max_failed_attempts
    }

    /// Whether the password is older than the maximum age.
    ///
    /// Accounts that never changed their password count from creation.
    pub fn password_expired(&self, user: &User, now: NaiveDateTime) -> bool {
        let changed = user.password_changed.unwrap_or(user.created_date);
        self.password_max_age
            .is_some_and(|max_age| now - changed > max_age)
    }

    /// Checks `password` for `user` and updates the account accordingly.
    pub fn authenticate(
        &self,
        user: &mut User,
        password: &str,
        hasher: &CredentialHasher,
        now: NaiveDateTime,
    ) -> SecurityResult<Session> {
        if !user.is_active {
            debug!(username = %user.username, "Login refused for inactive account");
            return Err(SecurityError::AccountInactive {
                username: user.username.clone(),
            });
        }

        if self.is_locked(user) {
            warn!(
                username = %user.username,
                attempts = user.failed_login_attempts,
                "Login refused for locked account"
            );
            return Err(self.locked(user));
        }

        let Verification::Valid { needs_rehash } =
            hasher.verify_detailed(password, &user.password_hash, &user.salt)
        else {
            user.failed_login_attempts += 1;
            warn!(
                username = %user.username,
                attempts = user.failed_login_attempts,
                max = self.max_failed_attempts,
                "Failed login"
            );

            if self.is_locked(user) {
                return Err(self.locked(user));
            }
            return Err(SecurityError::InvalidCredentials {
                remaining_attempts: self.max_failed_attempts - user.failed_login_attempts,
            });
        };

        user.failed_login_attempts = 0;
        user.last_login = Some(now);

        if needs_rehash {
            user.set_credential(hasher.derive(password, None)?);
            info!(username = %user.username, kdf = %hasher.algorithm(), "Upgraded legacy credential");
        }

        let must_change_password = user.first_login || self.password_expired(user, now);
        info!(
            username = %user.username,
            role = %user.role,
            must_change_password,
            "Login succeeded"
        );

        Ok(Session::issue(user, now, self.session_timeout, must_change_password))
    }

    /// Sets a new password for an authenticated user.
    ///
    /// The new password must pass the strength rules and differ from the
    /// current one. Clears `first_login`.
    pub fn rotate_password(
        &self,
        user: &mut User,
        new_password: &str,
        hasher: &CredentialHasher,
        now: NaiveDateTime,
    ) -> SecurityResult<()> {
        let strength = PasswordStrength::evaluate(new_password, self.min_password_length);
        if !strength.is_strong() {
            return Err(SecurityError::WeakPassword {
                missing: strength.missing().into_iter().map(String::from).collect(),
            });
        }

        if hasher.verify(new_password, &user.password_hash, &user.salt) {
            return Err(SecurityError::PasswordReused);
        }

        user.set_credential(hasher.derive(new_password, None)?);
        user.first_login = false;
        user.password_changed = Some(now);
        info!(username = %user.username, "Password rotated");

        Ok(())
    }

    fn locked(&self, user: &User) -> SecurityError {
        SecurityError::AccountLocked {
            username: user.username.clone(),
            attempts: user.failed_login_attempts,
        }
    }
}

/// Clears the failed-login counter. Administrator action.
pub fn unlock(user: &mut User) {
    if user.failed_login_attempts > 0 {
        info!(
            username = %user.username,
            attempts = user.failed_login_attempts,
            "Account unlocked"
        );
    }
    user.failed_login_attempts = 0;
}

// =============================================================================
// Session
// =============================================================================

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub issued_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
    /// The GUI must route to the password change screen first.
    pub must_change_password: bool,
    timeout_minutes: i64,
}

impl Session {
    fn issue(
        user: &User,
        now: NaiveDateTime,
        timeout: Duration,
        must_change_password: bool,
    ) -> Self {
        Session {
            token: generate_session_token(),
            user_id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            issued_at: now,
            expires_at: now + timeout,
            must_change_password,
            timeout_minutes: timeout.num_minutes(),
        }
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        now >= self.expires_at
    }

    /// Extends a live session by the full timeout from `now`.
    ///
    /// Returns `false` and leaves the session alone if it already expired.
    pub fn refresh(&mut self, now: NaiveDateTime) -> bool {
        if self.is_expired(now) {
            return false;
        }
        self.expires_at = now + Duration::minutes(self.timeout_minutes);
        true
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::derive_credential;
    use chrono::NaiveDate;

    const PASSWORD: &str = "Ciment@2025";

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn account() -> User {
        let credential = derive_credential(PASSWORD, None).unwrap();
        User::new("fotso", credential, Role::RetailStore, now()).unwrap()
    }

    #[test]
    fn test_successful_login_issues_session() {
        let policy = LoginPolicy::default();
        let hasher = CredentialHasher::default();
        let mut user = account();
        user.failed_login_attempts = 2;

        let session = policy.authenticate(&mut user, PASSWORD, &hasher, now()).unwrap();
        assert_eq!(user.failed_login_attempts, 0);
        assert_eq!(user.last_login, Some(now()));
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.token.len(), 64);
        assert_eq!(session.expires_at, now() + Duration::minutes(60));
        // New accounts must rotate
        assert!(session.must_change_password);
    }

    #[test]
    fn test_five_wrong_passwords_lock_the_account() {
        let policy = LoginPolicy::default();
        let hasher = CredentialHasher::default();
        let mut user = account();

        for expected_remaining in (1..5).rev() {
            match policy.authenticate(&mut user, "wrong", &hasher, now()) {
                Err(SecurityError::InvalidCredentials { remaining_attempts }) => {
                    assert_eq!(remaining_attempts, expected_remaining)
                }
                other => panic!("unexpected outcome: {other:?}"),
            }
        }

        assert!(matches!(
            policy.authenticate(&mut user, "wrong", &hasher, now()),
            Err(SecurityError::AccountLocked { attempts: 5, .. })
        ));
        assert!(policy.is_locked(&user));

        // Even the right password is refused now
        assert!(matches!(
            policy.authenticate(&mut user, PASSWORD, &hasher, now()),
            Err(SecurityError::AccountLocked { .. })
        ));
        assert_eq!(user.failed_login_attempts, 5);

        unlock(&mut user);
        assert!(policy.authenticate(&mut user, PASSWORD, &hasher, now()).is_ok());
    }

    #[test]
    fn test_inactive_account_is_refused() {
        let policy = LoginPolicy::default();
        let mut user = account();
        user.is_active = false;
        assert!(matches!(
            policy.authenticate(&mut user, PASSWORD, &CredentialHasher::default(), now()),
            Err(SecurityError::AccountInactive { .. })
        ));
        assert_eq!(user.failed_login_attempts, 0);
    }

    #[test]
    fn test_legacy_hash_is_upgraded_on_login() {
        let policy = LoginPolicy::default();
        let hasher = CredentialHasher::default();
        let mut user = account();
        user.password_hash =
            "240be518fabd2724ddb6f04eeb1da5967448d7e831c08c8fa822809f74c720a9".to_string();
        user.salt = String::new();

        policy.authenticate(&mut user, "admin123", &hasher, now()).unwrap();
        assert_eq!(user.salt.len(), 64);
        assert!(hasher.verify("admin123", &user.password_hash, &user.salt));
    }

    #[test]
    fn test_rotation_rules() {
        let policy = LoginPolicy::default();
        let hasher = CredentialHasher::default();
        let mut user = account();

        assert!(matches!(
            policy.rotate_password(&mut user, "short", &hasher, now()),
            Err(SecurityError::WeakPassword { .. })
        ));
        assert!(matches!(
            policy.rotate_password(&mut user, PASSWORD, &hasher, now()),
            Err(SecurityError::PasswordReused)
        ));

        policy
            .rotate_password(&mut user, "Bloc@Creux20", &hasher, now())
            .unwrap();
        assert!(!user.first_login);
        assert_eq!(user.password_changed, Some(now()));

        let session = policy
            .authenticate(&mut user, "Bloc@Creux20", &hasher, now())
            .unwrap();
        assert!(!session.must_change_password);
    }

    #[test]
    fn test_expired_password_forces_change() {
        let policy = LoginPolicy::default();
        let hasher = CredentialHasher::default();
        let mut user = account();
        user.first_login = false;
        user.password_changed = Some(now() - Duration::days(91));

        let session = policy.authenticate(&mut user, PASSWORD, &hasher, now()).unwrap();
        assert!(session.must_change_password);
    }

    #[test]
    fn test_policy_from_settings() {
        let settings = SecuritySettings {
            max_failed_login_attempts: 3,
            session_timeout_minutes: 15,
            password_max_age_days: 0,
            ..SecuritySettings::default()
        };
        let policy = LoginPolicy::from(&settings);
        assert_eq!(policy.max_failed_attempts, 3);
        assert_eq!(policy.session_timeout, Duration::minutes(15));
        assert_eq!(policy.password_max_age, None);
    }

    #[test]
    fn test_session_expiry_and_refresh() {
        let policy = LoginPolicy::default();
        let mut user = account();
        let mut session = policy
            .authenticate(&mut user, PASSWORD, &CredentialHasher::default(), now())
            .unwrap();

        let later = now() + Duration::minutes(30);
        assert!(!session.is_expired(later));
        assert!(session.refresh(later));
        assert_eq!(session.expires_at, later + Duration::minutes(60));

        let much_later = later + Duration::minutes(60);
        assert!(session.is_expired(much_later));
        assert!(!session.refresh(much_later));
    }
}
