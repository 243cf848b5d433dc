//! # Roles and Capabilities
//!
//! Every user holds exactly one [`Role`]. A role maps to a fixed set of
//! [`Capability`] values; permission checks ask the role, never a string.
//!
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────────┐
//! │ Role             │ Capabilities                                         │
//! ├──────────────────┼──────────────────────────────────────────────────────┤
//! │ administrator    │ create_users manage_system view_all_data             │
//! │                  │ system_analytics                                     │
//! │ retail_store     │ manage_stores inventory_management sales transfers   │
//! │                  │ job_posting                                          │
//! │ contract_owner   │ manage_stores contracts payments transfers           │
//! │                  │ job_posting                                          │
//! │ contractor       │ view_contracts sign_contracts job_posting            │
//! │                  │ material_reports                                     │
//! │ manager          │ limited_store_access inventory_view basic_operations │
//! │ job_seeker       │ browse_jobs apply_jobs profile_management            │
//! └──────────────────┴──────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Capability
// =============================================================================

stored_enum! {
    /// A single permission granted by a role.
    pub enum Capability as "capability" {
        CreateUsers => "create_users",
        ManageSystem => "manage_system",
        ViewAllData => "view_all_data",
        SystemAnalytics => "system_analytics",
        ManageStores => "manage_stores",
        InventoryManagement => "inventory_management",
        Sales => "sales",
        Transfers => "transfers",
        JobPosting => "job_posting",
        Contracts => "contracts",
        Payments => "payments",
        ViewContracts => "view_contracts",
        SignContracts => "sign_contracts",
        MaterialReports => "material_reports",
        LimitedStoreAccess => "limited_store_access",
        InventoryView => "inventory_view",
        BasicOperations => "basic_operations",
        BrowseJobs => "browse_jobs",
        ApplyJobs => "apply_jobs",
        ProfileManagement => "profile_management",
    }
}

// =============================================================================
// Role
// =============================================================================

stored_enum! {
    /// The six account roles, in display order.
    pub enum Role as "role" {
        Administrator => "administrator",
        RetailStore => "retail_store",
        ContractOwner => "contract_owner",
        Contractor => "contractor",
        Manager => "manager",
        JobSeeker => "job_seeker",
    }
}

impl Role {
    /// Human-readable name shown in the GUI.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::RetailStore => "Retail Store Owner",
            Role::ContractOwner => "Contract Owner",
            Role::Contractor => "Contractor",
            Role::Manager => "Store Manager",
            Role::JobSeeker => "Job Seeker",
        }
    }

    /// The fixed capability set of this role.
    pub const fn capabilities(&self) -> &'static [Capability] {
        use Capability::*;
        match self {
            Role::Administrator => &[CreateUsers, ManageSystem, ViewAllData, SystemAnalytics],
            Role::RetailStore => &[
                ManageStores,
                InventoryManagement,
                Sales,
                Transfers,
                JobPosting,
            ],
            Role::ContractOwner => &[ManageStores, Contracts, Payments, Transfers, JobPosting],
            Role::Contractor => &[ViewContracts, SignContracts, JobPosting, MaterialReports],
            Role::Manager => &[LimitedStoreAccess, InventoryView, BasicOperations],
            Role::JobSeeker => &[BrowseJobs, ApplyJobs, ProfileManagement],
        }
    }

    /// Whether this role grants `capability`.
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Returns `Ok(())` when the role grants `capability`, otherwise
    /// [`CoreError::PermissionDenied`].
    pub fn require(&self, capability: Capability) -> CoreResult<()> {
        if self.has(capability) {
            Ok(())
        } else {
            Err(CoreError::PermissionDenied {
                role: *self,
                capability,
            })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("administrator".parse::<Role>().unwrap(), Role::Administrator);
        assert_eq!("Retail_Store".parse::<Role>().unwrap(), Role::RetailStore);
        assert_eq!(" job_seeker ".parse::<Role>().unwrap(), Role::JobSeeker);
        assert!("superuser".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
        }
        assert_eq!(Role::ALL.len(), 6);
    }

    #[test]
    fn test_capability_sets() {
        assert!(Role::Administrator.has(Capability::CreateUsers));
        assert!(!Role::Administrator.has(Capability::ApplyJobs));
        assert!(Role::RetailStore.has(Capability::Transfers));
        assert!(Role::ContractOwner.has(Capability::Payments));
        assert!(Role::Contractor.has(Capability::JobPosting));
        assert!(Role::Manager.has(Capability::InventoryView));
        assert!(!Role::Manager.has(Capability::InventoryManagement));
        assert!(Role::JobSeeker.has(Capability::ApplyJobs));
        assert!(!Role::JobSeeker.has(Capability::JobPosting));
    }

    #[test]
    fn test_require_reports_missing_capability() {
        assert!(Role::RetailStore.require(Capability::Sales).is_ok());
        let err = Role::Manager.require(Capability::Transfers).unwrap_err();
        assert!(matches!(
            err,
            CoreError::PermissionDenied {
                role: Role::Manager,
                capability: Capability::Transfers
            }
        ));
    }

    #[test]
    fn test_capability_parsing() {
        assert_eq!(
            "Apply_Jobs".parse::<Capability>().unwrap(),
            Capability::ApplyJobs
        );
        assert_eq!(Capability::InventoryView.to_string(), "inventory_view");
        assert!(matches!(
            "fly".parse::<Capability>(),
            Err(crate::error::ValidationError::NotAllowed { ref field, .. }) if field == "capability"
        ));
        // Every capability is granted by some role
        for capability in Capability::ALL {
            assert!(Role::ALL.iter().any(|role| role.has(*capability)));
        }
    }

    #[test]
    fn test_serde_uses_stored_names() {
        assert_eq!(
            serde_json::to_string(&Role::ContractOwner).unwrap(),
            "\"contract_owner\""
        );
        let role: Role = serde_json::from_str("\"manager\"").unwrap();
        assert_eq!(role, Role::Manager);
        assert!(serde_json::from_str::<Role>("\"owner\"").is_err());
    }
}
