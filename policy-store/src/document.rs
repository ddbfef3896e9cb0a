use crate::error::{PolicyStoreError, Result};
use authz::storage::record_type;
use authz::types::{CollectTermRecord, PermissionRuleRecord, RoleRecord, UserRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The YAML shape of a policy file.
///
/// ```yaml
/// users:
///   - id: someUserId
///     roles: [editor]
/// roles:
///   - id: editor
///     permission_rules: [bookEditing]
/// permission_rules:
///   - id: bookEditing
///     rule_parts:
///       - type: action
///         values: [system.read, system.update]
///     permission_term_rule_parts:
///       - collect_term: organisationTerm
///         values: [system.uu]
///     write_permissions: [book.price]
/// collect_terms:
///   - id: organisationTerm
///     permission_key: OWNING_ORGANISATION
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyDocument {
    pub users: Vec<UserRecord>,
    pub roles: Vec<RoleRecord>,
    pub permission_rules: Vec<PermissionRuleRecord>,
    pub collect_terms: Vec<CollectTermRecord>,
}

impl PolicyDocument {
    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Appends `other`, rejecting ids already present.
    pub fn merge(&mut self, other: PolicyDocument) -> Result<()> {
        append_unique(&mut self.users, other.users, record_type::USER, |u| &u.id)?;
        append_unique(&mut self.roles, other.roles, record_type::ROLE, |r| &r.id)?;
        append_unique(
            &mut self.permission_rules,
            other.permission_rules,
            record_type::PERMISSION_RULE,
            |r| &r.id,
        )?;
        append_unique(
            &mut self.collect_terms,
            other.collect_terms,
            record_type::COLLECT_TERM,
            |t| &t.id,
        )?;
        Ok(())
    }

    /// Reports duplicate ids, links to unknown records and empty rule parts.
    ///
    /// Links to unknown roles and rules are legal at authorization time (they
    /// contribute nothing) but in a policy file they are almost always typos.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        collect_ids(&self.users, |u| &u.id, record_type::USER, &mut problems);
        let role_ids = collect_ids(&self.roles, |r| &r.id, record_type::ROLE, &mut problems);
        let rule_ids = collect_ids(
            &self.permission_rules,
            |r| &r.id,
            record_type::PERMISSION_RULE,
            &mut problems,
        );
        let term_ids = collect_ids(
            &self.collect_terms,
            |t| &t.id,
            record_type::COLLECT_TERM,
            &mut problems,
        );

        for user in &self.users {
            for role in &user.roles {
                if !role_ids.contains(role.as_str()) {
                    problems.push(format!("user {} links to unknown role {}", user.id, role));
                }
            }
        }

        for role in &self.roles {
            for rule in &role.permission_rules {
                if !rule_ids.contains(rule.as_str()) {
                    problems.push(format!(
                        "role {} links to unknown permission rule {}",
                        role.id, rule
                    ));
                }
            }
        }

        for rule in &self.permission_rules {
            for part in &rule.rule_parts {
                if part.values.is_empty() {
                    problems.push(format!(
                        "permission rule {} has no values for {}",
                        rule.id, part.part_type
                    ));
                }
            }
            for part in &rule.permission_term_rule_parts {
                if !term_ids.contains(part.collect_term.as_str()) {
                    problems.push(format!(
                        "permission rule {} links to unknown collect term {}",
                        rule.id, part.collect_term
                    ));
                }
                if part.values.is_empty() {
                    problems.push(format!(
                        "permission rule {} has no values for {}",
                        rule.id, part.collect_term
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(PolicyStoreError::Validation(problems.join("; ")))
        }
    }
}

fn append_unique<T>(
    target: &mut Vec<T>,
    incoming: Vec<T>,
    record_type: &str,
    id_of: impl Fn(&T) -> &String,
) -> Result<()> {
    for record in incoming {
        if target.iter().any(|existing| id_of(existing) == id_of(&record)) {
            return Err(PolicyStoreError::DuplicateId {
                record_type: record_type.to_string(),
                id: id_of(&record).clone(),
            });
        }
        target.push(record);
    }
    Ok(())
}

fn collect_ids<'a, T>(
    records: &'a [T],
    id_of: impl Fn(&'a T) -> &'a String,
    record_type: &str,
    problems: &mut Vec<String>,
) -> HashSet<&'a str> {
    let mut ids = HashSet::new();
    for record in records {
        let id = id_of(record).as_str();
        if !ids.insert(id) {
            problems.push(format!("duplicate {} id {}", record_type, id));
        }
    }
    ids
}
