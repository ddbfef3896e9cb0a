use crate::calculator::PermissionRuleCalculator;
use crate::config::AuthzConfig;
use crate::error::{AuthzError, Result};
use crate::provider::{RulesProvider, StorageRulesProvider};
use crate::rule::Rule;
use crate::storage::{PermissionUnitAuthorizator, PolicyStorage, RuleMatcher};
use crate::types::{PermissionTerm, User};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decides whether a user may act on a record type and which record parts
/// the matching rules unlock.
///
/// The user's existence and active status are read from storage on every
/// call. The rules granted through the user's roles are gathered once per
/// user and kept for the lifetime of the authorizer, so an authorizer is
/// meant to be scoped to a request or a session.
///
/// # Example
///
/// ```rust,ignore
/// let authorizer = Authorizer::new(storage, matcher, unit_authorizator);
/// let user = User::new("someUserId").with_role("editor");
///
/// authorizer.check_user_is_authorized_for_action_on_record_type(&user, "read", "book")?;
/// ```
pub struct Authorizer {
    storage: Arc<dyn PolicyStorage>,
    rules_provider: Arc<dyn RulesProvider>,
    matcher: Arc<dyn RuleMatcher>,
    unit_authorizator: Arc<dyn PermissionUnitAuthorizator>,
    calculator: PermissionRuleCalculator,
    config: AuthzConfig,
    provided_rules: DashMap<User, Arc<Vec<Rule>>>,
}

impl Authorizer {
    /// Creates an authorizer resolving provided rules from `storage`.
    pub fn new(
        storage: Arc<dyn PolicyStorage>,
        matcher: Arc<dyn RuleMatcher>,
        unit_authorizator: Arc<dyn PermissionUnitAuthorizator>,
    ) -> Self {
        let rules_provider = Arc::new(StorageRulesProvider::new(storage.clone()));
        let config = AuthzConfig::default();
        Self {
            storage,
            rules_provider,
            matcher,
            unit_authorizator,
            calculator: PermissionRuleCalculator::new(config.system_scheme.clone()),
            config,
            provided_rules: DashMap::new(),
        }
    }

    /// Replaces the rules provider, e.g. with one backed by another store.
    pub fn with_rules_provider(mut self, rules_provider: Arc<dyn RulesProvider>) -> Self {
        self.rules_provider = rules_provider;
        self
    }

    pub fn with_config(mut self, config: AuthzConfig) -> Self {
        self.calculator = PermissionRuleCalculator::new(config.system_scheme.clone());
        self.config = config;
        self
    }

    pub fn user_is_authorized_for_action_on_record_type(
        &self,
        user: &User,
        action: &str,
        record_type: &str,
    ) -> Result<bool> {
        self.ensure_user_exists_and_is_active(user)?;
        let provided_rules = self.provided_rules_for(user)?;
        let required_rules = self
            .calculator
            .calculate_rules_for_action_and_record_type(action, record_type);

        let authorized = self.matcher.satisfies(&provided_rules, &required_rules);
        log_decision(user, action, record_type, authorized);
        Ok(authorized)
    }

    pub fn check_user_is_authorized_for_action_on_record_type(
        &self,
        user: &User,
        action: &str,
        record_type: &str,
    ) -> Result<()> {
        if self.user_is_authorized_for_action_on_record_type(user, action, record_type)? {
            return Ok(());
        }
        Err(not_authorized_for_action(user, action, record_type))
    }

    pub fn user_is_authorized_for_action_on_record_type_and_collected_data(
        &self,
        user: &User,
        action: &str,
        record_type: &str,
        permission_terms: &[PermissionTerm],
    ) -> Result<bool> {
        self.ensure_user_exists_and_is_active(user)?;
        let provided_rules = self.provided_rules_for(user)?;
        let required_rules = self
            .calculator
            .calculate_rules_for_action_and_record_type_and_collected_data(
                action,
                record_type,
                permission_terms,
            );

        let authorized = self.matcher.satisfies(&provided_rules, &required_rules);
        log_decision(user, action, record_type, authorized);
        Ok(authorized)
    }

    pub fn check_user_is_authorized_for_action_on_record_type_and_collected_data(
        &self,
        user: &User,
        action: &str,
        record_type: &str,
        permission_terms: &[PermissionTerm],
    ) -> Result<()> {
        if self.user_is_authorized_for_action_on_record_type_and_collected_data(
            user,
            action,
            record_type,
            permission_terms,
        )? {
            return Ok(());
        }
        Err(AuthzError::authorization(format!(
            "user:{} is not authorized to create a record  of type:{}",
            user.id, record_type
        )))
    }

    /// Checks authorization and returns the record parts the matched rules unlock.
    ///
    /// No matched rule is always an authorization failure. With
    /// `collect_matches` false the check still runs but the returned set is
    /// empty. The `read` action collects read record parts, every other action
    /// collects write record parts.
    pub fn check_and_collect_matched_record_part_permissions(
        &self,
        user: &User,
        action: &str,
        record_type: &str,
        permission_terms: &[PermissionTerm],
        collect_matches: bool,
    ) -> Result<HashSet<String>> {
        self.ensure_user_exists_and_is_active(user)?;
        let provided_rules = self.provided_rules_for(user)?;
        let required_rules = self
            .calculator
            .calculate_rules_for_action_and_record_type_and_collected_data(
                action,
                record_type,
                permission_terms,
            );

        let matched_rules = self.matcher.matching_rules(&provided_rules, &required_rules);
        log_decision(user, action, record_type, !matched_rules.is_empty());
        if matched_rules.is_empty() {
            return Err(not_authorized_for_action(user, action, record_type));
        }
        if !collect_matches {
            return Ok(HashSet::new());
        }

        let use_read_permissions = action == self.config.read_action;
        let permissions: HashSet<String> = matched_rules
            .iter()
            .flat_map(|rule| {
                if use_read_permissions {
                    rule.read_record_part_permissions()
                } else {
                    rule.write_record_part_permissions()
                }
            })
            .cloned()
            .collect();

        debug!(
            "{} matched rules unlock {} record parts for user {}",
            matched_rules.len(),
            permissions.len(),
            user.id
        );
        Ok(permissions)
    }

    pub fn user_is_authorized_for_permission_unit(&self, user: &User, permission_unit: &str) -> bool {
        self.unit_authorizator
            .user_is_authorized_for_permission_unit(user, permission_unit)
    }

    pub fn check_user_is_authorized_for_permission_unit(
        &self,
        user: &User,
        permission_unit: &str,
    ) -> Result<()> {
        if self.user_is_authorized_for_permission_unit(user, permission_unit) {
            return Ok(());
        }
        warn!(
            "User {} denied for permission unit {}",
            user.id, permission_unit
        );
        Err(AuthzError::authorization(format!(
            "User {} is not authorized for permissionUnit: {}.",
            user.id, permission_unit
        )))
    }

    fn ensure_user_exists_and_is_active(&self, user: &User) -> Result<()> {
        match self.storage.read_user(&user.id) {
            Ok(record) if record.active => Ok(()),
            Ok(_) => Err(AuthzError::authorization(format!(
                "user with id {} is inactive",
                user.id
            ))),
            Err(e) if e.is_not_found() => Err(AuthzError::authorization_caused_by(
                format!("user with id {} does not exist", user.id),
                e,
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Rules from all of the user's roles, in role order.
    fn provided_rules_for(&self, user: &User) -> Result<Arc<Vec<Rule>>> {
        if self.config.cache_provided_rules {
            // Clone out so the map shard is not locked while resolving
            let cached = self
                .provided_rules
                .get(user)
                .map(|entry| Arc::clone(entry.value()));
            if let Some(rules) = cached {
                debug!("Using cached provided rules for user {}", user.id);
                return Ok(rules);
            }
        }

        let mut rules = Vec::new();
        for role_id in &user.roles {
            rules.extend(self.rules_provider.get_active_rules(role_id)?);
        }
        debug!(
            "Gathered {} provided rules from {} roles for user {}",
            rules.len(),
            user.roles.len(),
            user.id
        );

        let rules = Arc::new(rules);
        if self.config.cache_provided_rules {
            self.provided_rules.insert(user.clone(), Arc::clone(&rules));
        }
        Ok(rules)
    }
}

fn not_authorized_for_action(user: &User, action: &str, record_type: &str) -> AuthzError {
    AuthzError::authorization(format!(
        "user:{} is not authorized to {} a record of type: {}",
        user.id, action, record_type
    ))
}

fn log_decision(user: &User, action: &str, record_type: &str, authorized: bool) {
    if authorized {
        info!("AUTHZ: Access ALLOWED for {} {} {}", user.id, action, record_type);
    } else {
        warn!("AUTHZ: Access DENIED for {} {} {}", user.id, action, record_type);
    }
}
