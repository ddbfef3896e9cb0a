use anyhow::{anyhow, Result};
use colored::*;
use policy_store::PolicyLoader;
use std::path::Path;

/// Load a policy directory and report what it contains
pub fn execute(policies: &Path) -> Result<()> {
    let document = PolicyLoader::load_document_from_directory(policies)
        .map_err(|e| anyhow!("Policy validation failed: {}", e))?;

    println!("{}", "=== Policy Validation ===".bold());
    println!();
    println!("  {}: {}", "Users".cyan(), document.users.len());
    println!("  {}: {}", "Roles".cyan(), document.roles.len());
    println!(
        "  {}: {}",
        "Permission rules".cyan(),
        document.permission_rules.len()
    );
    println!("  {}: {}", "Collect terms".cyan(), document.collect_terms.len());
    println!();
    println!("{}", "Policies are valid".green());

    Ok(())
}
