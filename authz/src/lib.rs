//! Rule-based authorization engine for the Marain metadata repository.
//!
//! This crate decides whether a user may perform an action on a record type,
//! optionally constrained by permission terms collected from the record's
//! content, and which record parts the user may read or write.
//!
//! # Architecture Overview
//!
//! The authorization flow follows this pattern:
//!
//! 1. **Request arrives** with an authenticated [`User`](types::User)
//! 2. **Authorizer** reads the user from storage and rejects unknown or inactive users
//! 3. **RulesProvider** resolves the rules granted by each of the user's roles
//!    (memoized per user for the lifetime of the authorizer)
//! 4. **PermissionRuleCalculator** computes the rules the request requires
//! 5. **RuleMatcher** decides whether the provided rules satisfy the required ones
//! 6. **Decision** is returned, with the record parts unlocked by matched rules
//!    when asked for
//!
//! Storage, the rule-matching primitive and permission-unit checks are
//! collaborators injected at construction, see [`storage`].

pub mod authorizer;
pub mod calculator;
pub mod config;
pub mod error;
pub mod provider;
pub mod rule;
pub mod storage;
pub mod types;

#[cfg(test)]
mod testing;

pub use authorizer::Authorizer;
pub use calculator::PermissionRuleCalculator;
pub use config::AuthzConfig;
pub use error::{AuthzError, Result, StorageError};
pub use provider::{RulesProvider, StorageRulesProvider};
pub use rule::{Rule, RuleKey, ACTION_KEY, RECORD_TYPE_KEY};
pub use storage::{PermissionUnitAuthorizator, PolicyStorage, RuleMatcher};
pub use types::{PermissionTerm, User};
