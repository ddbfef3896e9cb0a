//! Collaborator interfaces the engine consumes.
//!
//! None of these are implemented here. Hosts plug in their record storage,
//! their rule-matching primitive and their permission-unit check; the
//! `policy-store` crate ships a storage implementation.

use crate::error::StorageError;
use crate::rule::Rule;
use crate::types::{CollectTermRecord, PermissionRuleRecord, RoleRecord, User, UserRecord};

/// Record type names used in [`StorageError::NotFound`].
pub mod record_type {
    pub const USER: &str = "user";
    pub const ROLE: &str = "permissionRole";
    pub const PERMISSION_RULE: &str = "permissionRule";
    pub const COLLECT_TERM: &str = "collectPermissionTerm";
}

/// Typed read access to the records authorization depends on.
///
/// Every method returns [`StorageError::NotFound`] when the id is unknown.
pub trait PolicyStorage: Send + Sync {
    fn read_user(&self, id: &str) -> Result<UserRecord, StorageError>;

    fn read_role(&self, id: &str) -> Result<RoleRecord, StorageError>;

    fn read_permission_rule(&self, id: &str) -> Result<PermissionRuleRecord, StorageError>;

    fn read_collect_term(&self, id: &str) -> Result<CollectTermRecord, StorageError>;
}

/// The rule-matching primitive.
pub trait RuleMatcher: Send + Sync {
    /// Whether the provided rules satisfy every required rule.
    fn satisfies(&self, provided: &[Rule], required: &[Rule]) -> bool;

    /// The subset of `provided` that matched the required rules.
    fn matching_rules(&self, provided: &[Rule], required: &[Rule]) -> Vec<Rule>;
}

/// Unit-level authorization, delegated to as-is.
pub trait PermissionUnitAuthorizator: Send + Sync {
    fn user_is_authorized_for_permission_unit(&self, user: &User, permission_unit: &str) -> bool;
}
