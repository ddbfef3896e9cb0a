use anyhow::{anyhow, Context, Result};
use authz::{
    AuthzConfig, PermissionRuleCalculator, PermissionTerm, PolicyStorage, Rule, RulesProvider,
    StorageRulesProvider,
};
use colored::*;
use policy_store::PolicyLoader;
use std::path::Path;
use std::sync::Arc;

/// Load the authorization configuration, falling back to defaults
pub fn load_config(path: Option<&Path>) -> Result<AuthzConfig> {
    match path {
        Some(path) => AuthzConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => Ok(AuthzConfig::default()),
    }
}

/// Print the rules required for an action on a record type
pub fn required(
    config: &AuthzConfig,
    action: &str,
    record_type: &str,
    terms: &[String],
    format: &str,
) -> Result<()> {
    let permission_terms = terms
        .iter()
        .map(|term| parse_term(term))
        .collect::<Result<Vec<_>>>()?;

    let calculator = PermissionRuleCalculator::new(config.system_scheme.clone());
    let rules = calculator.calculate_rules_for_action_and_record_type_and_collected_data(
        action,
        record_type,
        &permission_terms,
    );

    let title = format!("Required rules for {} on {}", action, record_type);
    print_rules(&title, &rules, format)
}

/// Print the rules a role, or every role of a user, provides
pub fn provided(policies: &Path, role: Option<&str>, user: Option<&str>, format: &str) -> Result<()> {
    let store = Arc::new(
        PolicyLoader::load_store_from_directory(policies)
            .map_err(|e| anyhow!("Failed to load policies: {}", e))?,
    );

    let (title, role_ids) = match (role, user) {
        (Some(role), _) => (format!("Rules provided by role {}", role), vec![role.to_string()]),
        (None, Some(user)) => {
            let record = store
                .read_user(user)
                .map_err(|e| anyhow!("Failed to read user {}: {}", user, e))?;
            (format!("Rules provided to user {}", user), record.roles)
        }
        (None, None) => return Err(anyhow!("Either --role or --user is required")),
    };

    let provider = StorageRulesProvider::new(store);
    let mut rules = Vec::new();
    for role_id in &role_ids {
        rules.extend(provider.get_active_rules(role_id)?);
    }

    print_rules(&title, &rules, format)
}

/// Parse a `KEY=VALUE` permission term
fn parse_term(term: &str) -> Result<PermissionTerm> {
    let (key, value) = term
        .split_once('=')
        .ok_or_else(|| anyhow!("Invalid term '{}', expected KEY=VALUE", term))?;
    if key.is_empty() || value.is_empty() {
        return Err(anyhow!("Invalid term '{}', expected KEY=VALUE", term));
    }
    Ok(PermissionTerm::new("", key, value))
}

fn print_rules(title: &str, rules: &[Rule], format: &str) -> Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(rules)?);
        }
        _ => print_rules_text(title, rules),
    }
    Ok(())
}

fn print_rules_text(title: &str, rules: &[Rule]) {
    println!("{}", format!("=== {} ===", title).bold());
    println!();

    if rules.is_empty() {
        println!("{}", "No rules".yellow());
        return;
    }

    for (index, rule) in rules.iter().enumerate() {
        println!("{}", format!("[rule {}]", index + 1).cyan().bold());
        for (key, values) in rule.parts() {
            let values: Vec<&str> = values.iter().map(String::as_str).collect();
            println!("  {}: {}", key.to_string().cyan(), values.join(", ").yellow());
        }
        if !rule.read_record_part_permissions().is_empty() {
            println!(
                "  {}: {}",
                "read".bold(),
                rule.read_record_part_permissions().join(", ").green()
            );
        }
        if !rule.write_record_part_permissions().is_empty() {
            println!(
                "  {}: {}",
                "write".bold(),
                rule.write_record_part_permissions().join(", ").green()
            );
        }
        println!();
    }

    println!("{}", format!("Total rules: {}", rules.len()).green());
}
