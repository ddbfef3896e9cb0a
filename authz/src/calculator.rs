//! Required-rule calculation.
//!
//! Turns an action, a record type and optionally the permission terms
//! collected from a record into the rules a caller must satisfy. One rule is
//! produced per combination of permission-term values, so a record collected
//! with two organisations and two publishers requires four rules.

use crate::rule::{Rule, ACTION_KEY, RECORD_TYPE_KEY};
use crate::types::PermissionTerm;
use itertools::Itertools;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct PermissionRuleCalculator {
    system_scheme: String,
}

impl PermissionRuleCalculator {
    pub fn new(system_scheme: impl Into<String>) -> Self {
        Self {
            system_scheme: system_scheme.into(),
        }
    }

    /// Exactly one rule with `action` and `recordType`.
    pub fn calculate_rules_for_action_and_record_type(
        &self,
        action: &str,
        record_type: &str,
    ) -> Vec<Rule> {
        vec![self.base_rule(action, record_type)]
    }

    /// One rule per combination of distinct permission-term values.
    ///
    /// Keys are enumerated in the order first seen, the first key varying
    /// slowest. Without terms this is the single base rule.
    pub fn calculate_rules_for_action_and_record_type_and_collected_data(
        &self,
        action: &str,
        record_type: &str,
        permission_terms: &[PermissionTerm],
    ) -> Vec<Rule> {
        let grouped = group_distinct_values_by_key(permission_terms);
        if grouped.is_empty() {
            return self.calculate_rules_for_action_and_record_type(action, record_type);
        }

        let rules: Vec<Rule> = grouped
            .iter()
            .map(|(_, values)| values.iter())
            .multi_cartesian_product()
            .map(|combination| {
                let mut rule = self.base_rule(action, record_type);
                for ((key, _), value) in grouped.iter().zip(combination) {
                    rule.set_values(key.as_str(), [self.with_scheme(value)]);
                }
                rule
            })
            .collect();

        debug!(
            "Calculated {} required rules for {} on {} from {} permission keys",
            rules.len(),
            action,
            record_type,
            grouped.len()
        );
        rules
    }

    fn base_rule(&self, action: &str, record_type: &str) -> Rule {
        let mut rule = Rule::new();
        rule.set_values(ACTION_KEY, [self.with_scheme(action)]);
        rule.set_values(RECORD_TYPE_KEY, [self.with_scheme(record_type)]);
        rule
    }

    fn with_scheme(&self, value: &str) -> String {
        format!("{}{}", self.system_scheme, value)
    }
}

impl Default for PermissionRuleCalculator {
    fn default() -> Self {
        Self::new("system.")
    }
}

fn group_distinct_values_by_key(terms: &[PermissionTerm]) -> Vec<(String, Vec<String>)> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for term in terms {
        match grouped
            .iter_mut()
            .find(|(key, _)| *key == term.permission_key)
        {
            Some((_, values)) => {
                if !values.contains(&term.value) {
                    values.push(term.value.clone());
                }
            }
            None => grouped.push((term.permission_key.clone(), vec![term.value.clone()])),
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_value<'a>(rule: &'a Rule, key: &str) -> &'a str {
        let values = rule.values(key).unwrap();
        assert_eq!(values.len(), 1, "required rules hold one value per key");
        values.iter().next().unwrap()
    }

    #[test]
    fn test_action_and_record_type() {
        let calculator = PermissionRuleCalculator::default();
        let rules = calculator.calculate_rules_for_action_and_record_type("create", "book");

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].number_of_keys(), 2);
        assert_eq!(single_value(&rules[0], ACTION_KEY), "system.create");
        assert_eq!(single_value(&rules[0], RECORD_TYPE_KEY), "system.book");
    }

    #[test]
    fn test_no_terms_gives_base_rule() {
        let calculator = PermissionRuleCalculator::default();
        let rules =
            calculator.calculate_rules_for_action_and_record_type_and_collected_data("read", "book", &[]);

        assert_eq!(
            rules,
            calculator.calculate_rules_for_action_and_record_type("read", "book")
        );
    }

    #[test]
    fn test_one_key_one_value() {
        let calculator = PermissionRuleCalculator::default();
        let terms = vec![PermissionTerm::new("someId", "OWNING_ORGANISATION", "uu")];
        let rules = calculator
            .calculate_rules_for_action_and_record_type_and_collected_data("create", "book", &terms);

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].number_of_keys(), 3);
        assert_eq!(single_value(&rules[0], "OWNING_ORGANISATION"), "system.uu");
    }

    #[test]
    fn test_one_key_two_values() {
        let calculator = PermissionRuleCalculator::default();
        let terms = vec![
            PermissionTerm::new("someId", "OWNING_ORGANISATION", "uu"),
            PermissionTerm::new("someId", "OWNING_ORGANISATION", "kth"),
        ];
        let rules = calculator
            .calculate_rules_for_action_and_record_type_and_collected_data("create", "book", &terms);

        assert_eq!(rules.len(), 2);
        assert_eq!(single_value(&rules[0], "OWNING_ORGANISATION"), "system.uu");
        assert_eq!(single_value(&rules[1], "OWNING_ORGANISATION"), "system.kth");
    }

    #[test]
    fn test_two_keys_one_value_each() {
        let calculator = PermissionRuleCalculator::default();
        let terms = vec![
            PermissionTerm::new("orgId", "OWNING_ORGANISATION", "uu"),
            PermissionTerm::new("depId", "DEPARTMENT", "history"),
        ];
        let rules = calculator
            .calculate_rules_for_action_and_record_type_and_collected_data("create", "book", &terms);

        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].number_of_keys(), 4);
    }

    #[test]
    fn test_two_keys_two_values_first_key_slowest() {
        let calculator = PermissionRuleCalculator::default();
        let terms = vec![
            PermissionTerm::new("someId", "SOME_KEY", "a"),
            PermissionTerm::new("otherId", "OTHER_KEY", "x"),
            PermissionTerm::new("someId2", "SOME_KEY", "b"),
            PermissionTerm::new("otherId2", "OTHER_KEY", "y"),
            PermissionTerm::new("someId3", "SOME_KEY", "a"),
        ];
        let rules = calculator
            .calculate_rules_for_action_and_record_type_and_collected_data("create", "book", &terms);

        let combinations: Vec<(&str, &str)> = rules
            .iter()
            .map(|rule| (single_value(rule, "SOME_KEY"), single_value(rule, "OTHER_KEY")))
            .collect();
        assert_eq!(
            combinations,
            vec![
                ("system.a", "system.x"),
                ("system.a", "system.y"),
                ("system.b", "system.x"),
                ("system.b", "system.y"),
            ]
        );
        for rule in &rules {
            assert_eq!(rule.number_of_keys(), 4);
            assert_eq!(single_value(rule, ACTION_KEY), "system.create");
            assert_eq!(single_value(rule, RECORD_TYPE_KEY), "system.book");
        }
    }

    #[test]
    fn test_rule_count_is_product_of_distinct_values() {
        let calculator = PermissionRuleCalculator::default();
        let terms = vec![
            PermissionTerm::new("1", "A", "a1"),
            PermissionTerm::new("2", "A", "a2"),
            PermissionTerm::new("3", "A", "a3"),
            PermissionTerm::new("4", "B", "b1"),
            PermissionTerm::new("5", "B", "b2"),
            PermissionTerm::new("6", "C", "c1"),
        ];
        let rules = calculator
            .calculate_rules_for_action_and_record_type_and_collected_data("update", "book", &terms);

        assert_eq!(rules.len(), 3 * 2);
    }

    #[test]
    fn test_custom_scheme() {
        let calculator = PermissionRuleCalculator::new("");
        let rules = calculator.calculate_rules_for_action_and_record_type("read", "book");
        assert_eq!(single_value(&rules[0], ACTION_KEY), "read");
    }
}
