use crate::document::PolicyDocument;
use crate::error::{PolicyStoreError, Result};
use authz::storage::{record_type, PolicyStorage};
use authz::types::{CollectTermRecord, PermissionRuleRecord, RoleRecord, UserRecord};
use authz::StorageError;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info};

#[derive(Default)]
struct Records {
    users: HashMap<String, UserRecord>,
    roles: HashMap<String, RoleRecord>,
    permission_rules: HashMap<String, PermissionRuleRecord>,
    collect_terms: HashMap<String, CollectTermRecord>,
}

/// In-memory [`PolicyStorage`] over users, roles, permission rules and collect terms.
///
/// Records can be replaced while authorizers are reading; each read sees a
/// consistent record.
#[derive(Default)]
pub struct MemoryPolicyStore {
    records: RwLock<Records>,
}

impl MemoryPolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding every record of `document`
    pub fn from_document(document: PolicyDocument) -> Result<Self> {
        let store = Self::new();
        store.replace_with(document)?;
        Ok(store)
    }

    /// Swap all records for those of `document`.
    pub fn replace_with(&self, document: PolicyDocument) -> Result<()> {
        let mut records = Records::default();
        for user in document.users {
            records.users.insert(user.id.clone(), user);
        }
        for role in document.roles {
            records.roles.insert(role.id.clone(), role);
        }
        for rule in document.permission_rules {
            records.permission_rules.insert(rule.id.clone(), rule);
        }
        for term in document.collect_terms {
            records.collect_terms.insert(term.id.clone(), term);
        }

        info!(
            "Policy store loaded {} users, {} roles, {} permission rules, {} collect terms",
            records.users.len(),
            records.roles.len(),
            records.permission_rules.len(),
            records.collect_terms.len()
        );

        let mut guard = self
            .records
            .write()
            .map_err(|_| PolicyStoreError::LockPoisoned)?;
        *guard = records;
        Ok(())
    }

    pub fn insert_role(&self, role: RoleRecord) -> Result<()> {
        self.write(|records| {
            records.roles.insert(role.id.clone(), role);
        })
    }

    /// Ids of all stored roles, sorted.
    pub fn role_ids(&self) -> Result<Vec<String>> {
        let records = self
            .records
            .read()
            .map_err(|_| PolicyStoreError::LockPoisoned)?;
        let mut ids: Vec<String> = records.roles.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    fn write(&self, apply: impl FnOnce(&mut Records)) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| PolicyStoreError::LockPoisoned)?;
        apply(&mut records);
        Ok(())
    }

    fn read<T: Clone>(
        &self,
        record_type: &str,
        id: &str,
        select: impl FnOnce(&Records) -> Option<&T>,
    ) -> std::result::Result<T, StorageError> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::Backend("policy store lock poisoned".to_string()))?;
        debug!("Reading {} {}", record_type, id);
        select(&records)
            .cloned()
            .ok_or_else(|| StorageError::not_found(record_type, id))
    }
}

impl PolicyStorage for MemoryPolicyStore {
    fn read_user(&self, id: &str) -> std::result::Result<UserRecord, StorageError> {
        self.read(record_type::USER, id, |records| records.users.get(id))
    }

    fn read_role(&self, id: &str) -> std::result::Result<RoleRecord, StorageError> {
        self.read(record_type::ROLE, id, |records| records.roles.get(id))
    }

    fn read_permission_rule(
        &self,
        id: &str,
    ) -> std::result::Result<PermissionRuleRecord, StorageError> {
        self.read(record_type::PERMISSION_RULE, id, |records| {
            records.permission_rules.get(id)
        })
    }

    fn read_collect_term(&self, id: &str) -> std::result::Result<CollectTermRecord, StorageError> {
        self.read(record_type::COLLECT_TERM, id, |records| {
            records.collect_terms.get(id)
        })
    }
}
