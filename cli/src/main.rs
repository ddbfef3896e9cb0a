use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{rules, validate};

/// Marain CLI - inspect authorization policies
#[derive(Parser)]
#[command(name = "marc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Authorization configuration file (YAML)
    #[arg(short, long, global = true, env = "MARAIN_AUTHZ_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the rules required for an action on a record type
    Required {
        /// Action being performed (e.g. read, create, update)
        #[arg(short, long)]
        action: String,

        /// Record type acted on
        #[arg(short, long)]
        record_type: String,

        /// Collected permission term as KEY=VALUE, repeatable
        #[arg(short, long = "term")]
        terms: Vec<String>,

        /// Output format (json, text)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the rules a role or user is granted
    Provided {
        /// Directory of policy YAML files
        #[arg(short, long, env = "MARAIN_POLICY_DIR")]
        policies: PathBuf,

        /// Role id
        #[arg(long, conflicts_with = "user", required_unless_present = "user")]
        role: Option<String>,

        /// User id; rules of all the user's stored roles are printed
        #[arg(long)]
        user: Option<String>,

        /// Output format (json, text)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Load and validate a policy directory
    Validate {
        /// Directory of policy YAML files
        #[arg(short, long, env = "MARAIN_POLICY_DIR")]
        policies: PathBuf,
    },
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = rules::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Required {
            action,
            record_type,
            terms,
            format,
        } => rules::required(&config, &action, &record_type, &terms, &format),
        Commands::Provided {
            policies,
            role,
            user,
            format,
        } => rules::provided(&policies, role.as_deref(), user.as_deref(), &format),
        Commands::Validate { policies } => validate::execute(&policies),
    }
}
