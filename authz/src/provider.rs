//! Provided-rule resolution.
//!
//! A role links to permission rules; every active permission rule becomes one
//! [`Rule`] carrying the values it grants and the record parts it unlocks.
//! Resolution runs top-down through [`PolicyStorage`] and keeps nothing once
//! the rules are built.

use crate::error::{Result, StorageError};
use crate::rule::Rule;
use crate::storage::PolicyStorage;
use crate::types::PermissionRuleRecord;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves the rules granted by a role.
pub trait RulesProvider: Send + Sync {
    /// Rules of the role's active permission rules, in link order.
    ///
    /// An unknown or inactive role yields an empty list, not an error. So does
    /// a role whose active rules link to a collect term that does not exist.
    fn get_active_rules(&self, role_id: &str) -> Result<Vec<Rule>>;
}

/// [`RulesProvider`] reading roles and permission rules from storage.
pub struct StorageRulesProvider {
    storage: Arc<dyn PolicyStorage>,
}

impl StorageRulesProvider {
    pub fn new(storage: Arc<dyn PolicyStorage>) -> Self {
        Self { storage }
    }

    fn rule_from_permission_rule(
        &self,
        permission_rule: &PermissionRuleRecord,
    ) -> std::result::Result<Rule, StorageError> {
        let mut rule = Rule::new();

        for part in &permission_rule.rule_parts {
            rule.set_values(part.part_type.as_str(), part.values.iter().cloned());
        }

        for part in &permission_rule.permission_term_rule_parts {
            let collect_term = self.storage.read_collect_term(&part.collect_term)?;
            rule.merge_values(collect_term.permission_key, part.values.iter().cloned());
        }

        if let Some(read_permissions) = &permission_rule.read_permissions {
            for permission in read_permissions {
                rule.add_read_record_part_permission(permission.as_str());
            }
        }
        if let Some(write_permissions) = &permission_rule.write_permissions {
            for permission in write_permissions {
                rule.add_write_record_part_permission(permission.as_str());
            }
        }

        Ok(rule)
    }
}

impl RulesProvider for StorageRulesProvider {
    fn get_active_rules(&self, role_id: &str) -> Result<Vec<Rule>> {
        let role = match self.storage.read_role(role_id) {
            Ok(role) => role,
            Err(e) if e.is_not_found() => {
                debug!("Role {} not found, it provides no rules", role_id);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if !role.active {
            debug!("Role {} is inactive, it provides no rules", role_id);
            return Ok(Vec::new());
        }

        let mut rules = Vec::with_capacity(role.permission_rules.len());
        for rule_id in &role.permission_rules {
            let permission_rule = match self.storage.read_permission_rule(rule_id) {
                Ok(permission_rule) => permission_rule,
                Err(e) if e.is_not_found() => {
                    warn!("Role {} links to missing permission rule {}", role_id, rule_id);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if !permission_rule.active {
                debug!("Skipping inactive permission rule {}", rule_id);
                continue;
            }
            match self.rule_from_permission_rule(&permission_rule) {
                Ok(rule) => rules.push(rule),
                Err(e) if e.is_not_found() => {
                    warn!(
                        "Permission rule {} of role {} links to a missing collect term, the role provides no rules: {}",
                        rule_id, role_id, e
                    );
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e.into()),
            }
        }

        debug!("Role {} provides {} active rules", role_id, rules.len());
        Ok(rules)
    }
}
