//! Collaborator fakes shared by the unit tests.

use crate::error::{Result, StorageError};
use crate::provider::RulesProvider;
use crate::rule::Rule;
use crate::storage::{record_type, PermissionUnitAuthorizator, PolicyStorage, RuleMatcher};
use crate::types::{
    CollectTermRecord, PermissionRuleRecord, RoleRecord, User, UserRecord,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeStorage {
    users: Mutex<HashMap<String, UserRecord>>,
    roles: Mutex<HashMap<String, RoleRecord>>,
    permission_rules: Mutex<HashMap<String, PermissionRuleRecord>>,
    collect_terms: Mutex<HashMap<String, CollectTermRecord>>,
    failure: Mutex<Option<StorageError>>,
    collect_term_failure: Mutex<Option<StorageError>>,
    user_reads: AtomicUsize,
    role_reads: AtomicUsize,
    permission_rule_reads: AtomicUsize,
}

impl FakeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, id: &str, active: bool) {
        self.users.lock().unwrap().insert(
            id.to_string(),
            UserRecord {
                id: id.to_string(),
                active,
                roles: Vec::new(),
            },
        );
    }

    pub fn add_role(&self, id: &str, active: bool, permission_rules: &[&str]) {
        self.roles.lock().unwrap().insert(
            id.to_string(),
            RoleRecord {
                id: id.to_string(),
                active,
                permission_rules: permission_rules.iter().map(|s| s.to_string()).collect(),
            },
        );
    }

    pub fn add_permission_rule(&self, rule: PermissionRuleRecord) {
        self.permission_rules
            .lock()
            .unwrap()
            .insert(rule.id.clone(), rule);
    }

    pub fn add_collect_term(&self, id: &str, permission_key: &str) {
        self.collect_terms.lock().unwrap().insert(
            id.to_string(),
            CollectTermRecord {
                id: id.to_string(),
                permission_key: permission_key.to_string(),
            },
        );
    }

    /// Every read after this call fails with `error`.
    pub fn fail_with(&self, error: StorageError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    /// Collect term reads after this call fail with `error`.
    pub fn fail_collect_terms_with(&self, error: StorageError) {
        *self.collect_term_failure.lock().unwrap() = Some(error);
    }

    pub fn user_reads(&self) -> usize {
        self.user_reads.load(Ordering::SeqCst)
    }

    pub fn role_reads(&self) -> usize {
        self.role_reads.load(Ordering::SeqCst)
    }

    pub fn permission_rule_reads(&self) -> usize {
        self.permission_rule_reads.load(Ordering::SeqCst)
    }

    fn lookup<T: Clone>(
        &self,
        records: &Mutex<HashMap<String, T>>,
        record_type: &str,
        id: &str,
    ) -> std::result::Result<T, StorageError> {
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        records
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(record_type, id))
    }
}

impl PolicyStorage for FakeStorage {
    fn read_user(&self, id: &str) -> std::result::Result<UserRecord, StorageError> {
        self.user_reads.fetch_add(1, Ordering::SeqCst);
        self.lookup(&self.users, record_type::USER, id)
    }

    fn read_role(&self, id: &str) -> std::result::Result<RoleRecord, StorageError> {
        self.role_reads.fetch_add(1, Ordering::SeqCst);
        self.lookup(&self.roles, record_type::ROLE, id)
    }

    fn read_permission_rule(
        &self,
        id: &str,
    ) -> std::result::Result<PermissionRuleRecord, StorageError> {
        self.permission_rule_reads.fetch_add(1, Ordering::SeqCst);
        self.lookup(&self.permission_rules, record_type::PERMISSION_RULE, id)
    }

    fn read_collect_term(&self, id: &str) -> std::result::Result<CollectTermRecord, StorageError> {
        if let Some(error) = self.collect_term_failure.lock().unwrap().clone() {
            return Err(error);
        }
        self.lookup(&self.collect_terms, record_type::COLLECT_TERM, id)
    }
}

/// Provider returning canned rules per role and counting calls.
#[derive(Default)]
pub struct SpyRulesProvider {
    rules: Mutex<HashMap<String, Vec<Rule>>>,
    calls: Mutex<Vec<String>>,
}

impl SpyRulesProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_rules(&self, role_id: &str, rules: Vec<Rule>) {
        self.rules.lock().unwrap().insert(role_id.to_string(), rules);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl RulesProvider for SpyRulesProvider {
    fn get_active_rules(&self, role_id: &str) -> Result<Vec<Rule>> {
        self.calls.lock().unwrap().push(role_id.to_string());
        Ok(self
            .rules
            .lock()
            .unwrap()
            .get(role_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Matcher with a fixed answer that records what it was asked.
#[derive(Default)]
pub struct FakeRuleMatcher {
    satisfies: bool,
    matched: Vec<Rule>,
    calls: Mutex<Vec<(Vec<Rule>, Vec<Rule>)>>,
}

impl FakeRuleMatcher {
    pub fn satisfying(satisfies: bool) -> Self {
        Self {
            satisfies,
            ..Self::default()
        }
    }

    pub fn matching(matched: Vec<Rule>) -> Self {
        Self {
            satisfies: !matched.is_empty(),
            matched,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(Vec<Rule>, Vec<Rule>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl RuleMatcher for FakeRuleMatcher {
    fn satisfies(&self, provided: &[Rule], required: &[Rule]) -> bool {
        self.calls
            .lock()
            .unwrap()
            .push((provided.to_vec(), required.to_vec()));
        self.satisfies
    }

    fn matching_rules(&self, provided: &[Rule], required: &[Rule]) -> Vec<Rule> {
        self.calls
            .lock()
            .unwrap()
            .push((provided.to_vec(), required.to_vec()));
        self.matched.clone()
    }
}

pub struct FakeUnitAuthorizator {
    pub authorized_units: Vec<String>,
}

impl PermissionUnitAuthorizator for FakeUnitAuthorizator {
    fn user_is_authorized_for_permission_unit(&self, _user: &User, permission_unit: &str) -> bool {
        self.authorized_units.iter().any(|unit| unit == permission_unit)
    }
}
