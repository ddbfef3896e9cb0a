//! The rule value type shared by the calculator, the provider and the matcher.
//!
//! A [`Rule`] maps a [`RuleKey`] (a constraint dimension such as `action`,
//! `recordType` or a permission key like `OWNING_ORGANISATION`) to a set of
//! values. Required rules hold exactly one value per key, provided rules may
//! hold several, in which case any one of them satisfies the key.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Rule key for the action dimension.
pub const ACTION_KEY: &str = "action";

/// Rule key for the record type dimension.
pub const RECORD_TYPE_KEY: &str = "recordType";

/// A named constraint dimension of a rule.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleKey(String);

impl RuleKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn action() -> Self {
        Self::new(ACTION_KEY)
    }

    pub fn record_type() -> Self {
        Self::new(RECORD_TYPE_KEY)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for RuleKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A mapping from rule keys to value sets plus the record parts it unlocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    parts: BTreeMap<RuleKey, BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    read_record_part_permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    write_record_part_permissions: Vec<String>,
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the values stored for `key`.
    pub fn set_values<I, S>(&mut self, key: impl Into<RuleKey>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parts
            .insert(key.into(), values.into_iter().map(Into::into).collect());
    }

    /// Adds values to `key`, keeping whatever is already there.
    pub fn merge_values<I, S>(&mut self, key: impl Into<RuleKey>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parts
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    pub fn values(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.parts.get(&RuleKey::new(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.parts.contains_key(&RuleKey::new(key))
    }

    pub fn parts(&self) -> impl Iterator<Item = (&RuleKey, &BTreeSet<String>)> {
        self.parts.iter()
    }

    pub fn number_of_keys(&self) -> usize {
        self.parts.len()
    }

    pub fn read_record_part_permissions(&self) -> &[String] {
        &self.read_record_part_permissions
    }

    pub fn write_record_part_permissions(&self) -> &[String] {
        &self.write_record_part_permissions
    }

    pub fn add_read_record_part_permission(&mut self, permission: impl Into<String>) {
        self.read_record_part_permissions.push(permission.into());
    }

    /// Write implies read, so the permission lands in both lists.
    pub fn add_write_record_part_permission(&mut self, permission: impl Into<String>) {
        let permission = permission.into();
        self.read_record_part_permissions.push(permission.clone());
        self.write_record_part_permissions.push(permission);
    }
}
