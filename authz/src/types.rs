//! Core authorization types.
//!
//! Two kinds of types live here:
//!
//! - The request side: [`User`], the authenticated caller as the request layer
//!   knows it, and [`PermissionTerm`], a key/value pair collected from record
//!   content upstream.
//! - The storage side: typed views of the records the engine reads through
//!   [`PolicyStorage`](crate::storage::PolicyStorage). They are materialized
//!   fresh on every resolution and never mutated.
//!
//! # Security Note
//! A `User` carries the role ids that drive rule gathering. It must be built
//! from an authenticated session, never from request input. Its active status
//! is deliberately not part of this type: the authorizer re-reads it from
//! storage on every call.

use serde::{Deserialize, Serialize};

/// The authenticated caller an authorization decision is made for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// The user's record id
    pub id: String,

    /// Role ids in the order rules should be gathered
    #[serde(default)]
    pub roles: Vec<String>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            roles: Vec::new(),
        }
    }

    /// Builder-style helper adding a role id.
    pub fn with_role(mut self, role_id: impl Into<String>) -> Self {
        self.roles.push(role_id.into());
        self
    }
}

/// A (permission key, value) pair extracted from record content.
///
/// Several terms may share a key; the calculator collapses repeated values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionTerm {
    /// Id of the collect term that produced this value
    #[serde(default)]
    pub id: String,

    /// The rule key this term constrains (e.g. `OWNING_ORGANISATION`)
    pub permission_key: String,

    /// The collected value, without scheme prefix
    pub value: String,
}

impl PermissionTerm {
    pub fn new(
        id: impl Into<String>,
        permission_key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            permission_key: permission_key.into(),
            value: value.into(),
        }
    }
}

/// Stored user record. Only the active flag matters to authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Roles as stored; the request-side [`User`] is authoritative for rule gathering
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Stored role record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: String,
    #[serde(default = "default_active")]
    pub active: bool,
    /// Linked permission rule ids, in link order
    #[serde(default)]
    pub permission_rules: Vec<String>,
}

/// A plain rule part, e.g. `type: action` with `values: [system.read]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulePart {
    #[serde(rename = "type")]
    pub part_type: String,
    pub values: Vec<String>,
}

/// A rule part whose key comes from a linked collect term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionTermRulePart {
    /// Id of the collect term that supplies the rule key
    pub collect_term: String,
    pub values: Vec<String>,
}

/// Stored permission rule record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRuleRecord {
    pub id: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub rule_parts: Vec<RulePart>,
    #[serde(default)]
    pub permission_term_rule_parts: Vec<PermissionTermRulePart>,
    /// `None` when the record has no readPermissions group
    #[serde(default)]
    pub read_permissions: Option<Vec<String>>,
    /// `None` when the record has no writePermissions group
    #[serde(default)]
    pub write_permissions: Option<Vec<String>>,
}

/// Stored collect term metadata; `permission_key` mirrors `extraData.permissionKey`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectTermRecord {
    pub id: String,
    pub permission_key: String,
}

fn default_active() -> bool {
    true
}
