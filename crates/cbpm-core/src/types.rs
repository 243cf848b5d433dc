//! # Domain Types
//!
//! Records shared between the GUI and the data-access layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │     Store       │   │    Material     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  username       │   │  store_type     │   │  category       │       │
//! │  │  role           │   │  owner_id (FK)  │   │  unit           │       │
//! │  │  hash + salt    │   │  address        │   │  standard_price │       │
//! │  └─────────────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │                                 │                     │                 │
//! │                        ┌────────▼─────────────────────▼────────┐        │
//! │                        │            InventoryLine              │        │
//! │                        │   (store_id, material_id) → qty/price │        │
//! │                        └───────────────────▲───────────────────┘        │
//! │                                            │ applied by InventoryBook   │
//! │                        ┌───────────────────┴───────────────────┐        │
//! │                        │             Transaction               │        │
//! │                        │  sale | transfer | purchase |         │        │
//! │                        │  consumption | adjustment             │        │
//! │                        └───────────────────────────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are UUID v4 strings. Quantities and prices are non-negative
//! finite `f64`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::datetime::{self, STORAGE_FORMAT};
use crate::error::ValidationError;
use crate::roles::Role;
use crate::security::Credential;
use crate::validation::{
    validate_amount, validate_quantity, validate_required, validate_username, ValidationResult,
};
use crate::LOW_STOCK_THRESHOLD;

const NAME_MAX_LENGTH: usize = 200;

// =============================================================================
// Enumerations
// =============================================================================

stored_enum! {
    /// Kind of store.
    pub enum StoreType as "store_type" {
        Retail => "retail",
        ContractOwner => "contract_owner",
    }
}

stored_enum! {
    /// Material catalogue category.
    pub enum MaterialCategory as "category" {
        Cement => "Cement",
        Blocks => "Blocks",
        Steel => "Steel",
        Timber => "Timber",
        Roofing => "Roofing",
        Electrical => "Electrical",
        Plumbing => "Plumbing",
        Finishing => "Finishing",
        Tools => "Tools",
        Aggregates => "Aggregates",
        Doors => "Doors",
        Windows => "Windows",
        WoodProducts => "Wood Products",
        Concrete => "Concrete",
        Other => "Other",
    }
}

stored_enum! {
    /// Unit a material is counted in.
    pub enum MaterialUnit as "unit" {
        Piece => "Piece",
        Bag => "Bag",
        Meter => "Meter",
        Roll => "Roll",
        Sheet => "Sheet",
        Liter => "Liter",
        SquareMeter => "m²",
        CubicMeter => "m³",
        Kg => "Kg",
        Ton => "Ton",
        Set => "Set",
        Rod => "Rod",
        Bundle => "Bundle",
    }
}

stored_enum! {
    /// What a transaction does to stock.
    pub enum TransactionType as "type" {
        /// Leaves the source store.
        Sale => "sale",
        /// Moves from the source store to the destination store.
        Transfer => "transfer",
        /// Arrives at the destination store.
        Purchase => "purchase",
        /// Used up at the source store.
        Consumption => "consumption",
        /// Sets the absolute quantity at one store.
        Adjustment => "adjustment",
    }
}

stored_enum! {
    /// Category of a payment between parties.
    pub enum PaymentType as "payment_type" {
        Contract => "contract",
        Salary => "salary",
        Material => "material",
        Service => "service",
        Other => "other",
    }
}

// =============================================================================
// User
// =============================================================================

/// An account.
#[derive(Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Login name, unique across the installation.
    pub username: String,

    /// Hex-encoded derived key.
    pub password_hash: String,

    /// Hex salt. Empty for legacy unsalted rows.
    pub salt: String,

    pub role: Role,

    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,

    /// Deactivated accounts cannot log in.
    pub is_active: bool,

    /// Forces a password change at the next login.
    pub first_login: bool,

    /// Consecutive failed logins since the last success.
    pub failed_login_attempts: u32,

    pub created_date: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
    pub password_changed: Option<NaiveDateTime>,

    /// Id of the user who created this account.
    pub created_by: Option<String>,
}

impl User {
    /// Creates an active account that must rotate its password on first login.
    pub fn new(
        username: &str,
        credential: Credential,
        role: Role,
        now: NaiveDateTime,
    ) -> ValidationResult<Self> {
        validate_username(username)?;

        Ok(User {
            id: Uuid::new_v4().to_string(),
            username: username.trim().to_string(),
            password_hash: credential.hash,
            salt: credential.salt,
            role,
            first_name: None,
            last_name: None,
            email: None,
            phone: None,
            is_active: true,
            first_login: true,
            failed_login_attempts: 0,
            created_date: now,
            last_login: None,
            password_changed: None,
            created_by: None,
        })
    }

    /// "First Last" when a name is on file, otherwise the username.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            self.username.clone()
        } else {
            parts.join(" ")
        }
    }

    /// Replaces the stored hash and salt.
    pub fn set_credential(&mut self, credential: Credential) {
        self.password_hash = credential.hash;
        self.salt = credential.salt;
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("role", &self.role)
            .field("is_active", &self.is_active)
            .field("first_login", &self.first_login)
            .field("failed_login_attempts", &self.failed_login_attempts)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Material
// =============================================================================

/// A catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Material {
    pub id: String,
    pub name: String,
    pub category: MaterialCategory,
    pub unit: MaterialUnit,
    pub description: Option<String>,
    /// Reference price per unit.
    pub standard_price: f64,
    pub is_active: bool,
}

impl Material {
    pub fn new(
        name: &str,
        category: MaterialCategory,
        unit: MaterialUnit,
        standard_price: f64,
    ) -> ValidationResult<Self> {
        validate_required("name", name, NAME_MAX_LENGTH)?;
        validate_amount("standard_price", standard_price)?;

        Ok(Material {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            category,
            unit,
            description: None,
            standard_price,
            is_active: true,
        })
    }
}

// =============================================================================
// Store
// =============================================================================

/// A retail shop or a contract owner's depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Store {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub store_type: StoreType,
    pub owner_id: String,
    pub manager_id: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
}

impl Store {
    pub fn new(name: &str, store_type: StoreType, owner_id: &str) -> ValidationResult<Self> {
        validate_required("name", name, NAME_MAX_LENGTH)?;
        validate_required("owner_id", owner_id, NAME_MAX_LENGTH)?;

        Ok(Store {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            store_type,
            owner_id: owner_id.to_string(),
            manager_id: None,
            address: None,
            phone: None,
            is_active: true,
        })
    }
}

// =============================================================================
// Inventory Line
// =============================================================================

/// Stock of one material at one store.
///
/// `material_name` and `category` are denormalized from the catalogue when
/// the line is loaded for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryLine {
    pub store_id: String,
    pub material_id: String,
    pub quantity: f64,
    /// Selling price per unit at this store.
    pub price: f64,
    #[serde(default)]
    pub material_name: Option<String>,
    #[serde(default)]
    pub category: Option<MaterialCategory>,
    #[serde(default)]
    pub last_updated: Option<NaiveDateTime>,
}

impl InventoryLine {
    pub fn new(
        store_id: &str,
        material_id: &str,
        quantity: f64,
        price: f64,
    ) -> ValidationResult<Self> {
        validate_required("store_id", store_id, NAME_MAX_LENGTH)?;
        validate_required("material_id", material_id, NAME_MAX_LENGTH)?;
        validate_quantity(quantity)?;
        validate_amount("price", price)?;

        Ok(InventoryLine {
            store_id: store_id.to_string(),
            material_id: material_id.to_string(),
            quantity,
            price,
            material_name: None,
            category: None,
            last_updated: None,
        })
    }

    /// Attaches catalogue details for reporting.
    pub fn with_material(mut self, material: &Material) -> Self {
        self.material_name = Some(material.name.clone());
        self.category = Some(material.category);
        self
    }

    /// quantity × price
    pub fn value(&self) -> f64 {
        self.quantity * self.price
    }

    pub fn is_low_stock(&self) -> bool {
        self.quantity < LOW_STOCK_THRESHOLD
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// Input for [`Transaction::record`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewTransaction {
    pub transaction_type: Option<TransactionType>,
    pub from_store_id: Option<String>,
    pub to_store_id: Option<String>,
    pub customer_id: Option<String>,
    pub material_id: String,
    pub quantity: f64,
    pub price: f64,
    pub notes: Option<String>,
    pub created_by: String,
}

/// A stock movement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub from_store_id: Option<String>,
    pub to_store_id: Option<String>,
    pub customer_id: Option<String>,
    pub material_id: String,
    pub quantity: f64,
    /// Unit price.
    pub price: f64,
    /// quantity × price, computed at record time.
    pub total_amount: f64,
    /// Timestamp as stored. Rows written by older clients may use other
    /// formats, see [`Transaction::parsed_date`].
    pub transaction_date: String,
    pub notes: Option<String>,
    pub created_by: String,
}

impl Transaction {
    /// Builds a transaction, computing the total and stamping `now`.
    ///
    /// ## Example
    /// ```rust
    /// use cbpm_core::types::{NewTransaction, Transaction, TransactionType};
    ///
    /// let sale = Transaction::record(
    ///     NewTransaction {
    ///         transaction_type: Some(TransactionType::Sale),
    ///         from_store_id: Some("store-douala".into()),
    ///         material_id: "cement-50kg".into(),
    ///         quantity: 12.0,
    ///         price: 4_500.0,
    ///         created_by: "user-1".into(),
    ///         ..Default::default()
    ///     },
    ///     cbpm_core::datetime::now(),
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(sale.total_amount, 54_000.0);
    /// ```
    pub fn record(new: NewTransaction, now: NaiveDateTime) -> ValidationResult<Self> {
        let transaction_type = new
            .transaction_type
            .ok_or_else(|| ValidationError::required("type"))?;

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            transaction_type,
            from_store_id: non_empty(new.from_store_id),
            to_store_id: non_empty(new.to_store_id),
            customer_id: non_empty(new.customer_id),
            material_id: new.material_id,
            quantity: new.quantity,
            price: new.price,
            total_amount: new.quantity * new.price,
            transaction_date: datetime::format_date(&now, STORAGE_FORMAT),
            notes: new.notes,
            created_by: new.created_by,
        };

        transaction.validate()?;
        Ok(transaction)
    }

    /// Checks the record invariants.
    ///
    /// ## Rules
    /// - material and creator are present
    /// - quantity and price are finite and non-negative
    /// - a transfer names two different stores
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("material_id", &self.material_id, NAME_MAX_LENGTH)?;
        validate_required("created_by", &self.created_by, NAME_MAX_LENGTH)?;
        validate_quantity(self.quantity)?;
        validate_amount("price", self.price)?;

        if self.transaction_type == TransactionType::Transfer {
            let from = self
                .from_store_id
                .as_deref()
                .ok_or_else(|| ValidationError::required("from_store_id"))?;
            let to = self
                .to_store_id
                .as_deref()
                .ok_or_else(|| ValidationError::required("to_store_id"))?;

            if from == to {
                return Err(ValidationError::invalid(
                    "to_store_id",
                    "transfer source and destination must differ",
                ));
            }
        }

        Ok(())
    }

    /// The stored date, or `None` when it is in no known format.
    pub fn parsed_date(&self) -> Option<NaiveDateTime> {
        datetime::parse_date(&self.transaction_date)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================
