//! # Administrator Provisioning
//!
//! Creates the first administrator account from an explicit identity and
//! secret. Runs once: as soon as any administrator exists it does nothing.
//!
//! There is no built-in account and no default password. The operator
//! supplies both, and the account must rotate its password at first login.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;
use ts_rs::TS;

use crate::config::AdminBootstrap;
use crate::error::{CoreResult, SecurityError, ValidationError};
use crate::roles::Role;
use crate::security::{CredentialHasher, KdfAlgorithm, Secret};
use crate::types::User;
use crate::validation::{validate_email, validate_username, PasswordStrength};

/// Actor recorded in the audit entry.
pub const PROVISIONING_ACTOR: &str = "provision-admin";

/// Who to create.
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Secret,
}

impl ProvisionRequest {
    /// Combines the configured identity with the password read at runtime.
    pub fn from_bootstrap(bootstrap: &AdminBootstrap, password: Secret) -> Self {
        ProvisionRequest {
            username: bootstrap.username.clone(),
            email: bootstrap.email.clone(),
            first_name: bootstrap.first_name.clone(),
            last_name: bootstrap.last_name.clone(),
            password,
        }
    }
}

/// Audit trail entry for a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuditEntry {
    pub action: String,
    pub actor: String,
    pub target_user_id: String,
    pub target_username: String,
    pub kdf: KdfAlgorithm,
    pub at: NaiveDateTime,
}

/// The account to insert plus its audit entry.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProvisionRecord {
    pub user: User,
    pub audit: AuditEntry,
}

#[derive(Debug, Clone)]
pub enum ProvisionOutcome {
    Created(Box<ProvisionRecord>),
    /// An administrator already exists; nothing was created.
    Skipped { existing_admins: usize },
}

/// Provisions the first administrator.
///
/// `existing_admins` is the number of administrator accounts already stored.
/// With one or more, returns [`ProvisionOutcome::Skipped`] without looking at
/// the request.
///
/// ## Errors
/// - [`ValidationError`] for a bad username or email
/// - [`SecurityError::WeakPassword`] when the password fails the strength rules
pub fn provision_admin(
    request: &ProvisionRequest,
    hasher: &CredentialHasher,
    min_password_length: usize,
    existing_admins: usize,
    now: NaiveDateTime,
) -> CoreResult<ProvisionOutcome> {
    if existing_admins > 0 {
        info!(existing_admins, "Administrator already provisioned, skipping");
        return Ok(ProvisionOutcome::Skipped { existing_admins });
    }

    validate_username(&request.username)?;

    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    if let Some(email) = email {
        if !validate_email(email) {
            return Err(ValidationError::invalid("email", "not a valid email address").into());
        }
    }

    let strength = PasswordStrength::evaluate(request.password.expose(), min_password_length);
    if !strength.is_strong() {
        return Err(SecurityError::WeakPassword {
            missing: strength.missing().into_iter().map(String::from).collect(),
        }
        .into());
    }

    let credential = hasher.derive(request.password.expose(), None)?;
    let mut user = User::new(&request.username, credential, Role::Administrator, now)?;
    user.email = email.map(String::from);
    user.first_name = request.first_name.clone();
    user.last_name = request.last_name.clone();
    user.created_by = Some(PROVISIONING_ACTOR.to_string());

    let audit = AuditEntry {
        action: "provision_admin".to_string(),
        actor: PROVISIONING_ACTOR.to_string(),
        target_user_id: user.id.clone(),
        target_username: user.username.clone(),
        kdf: hasher.algorithm(),
        at: now,
    };

    info!(
        username = %user.username,
        user_id = %user.id,
        kdf = %hasher.algorithm(),
        "Provisioned administrator"
    );

    Ok(ProvisionOutcome::Created(Box::new(ProvisionRecord { user, audit })))
}

// =============================================================================
// Unit Tests
// =============================================================================
