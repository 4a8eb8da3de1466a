use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::presets;
use crate::config::validator;
use crate::score::runner;
use crate::utils::{input, json_schema};

#[derive(Parser)]
#[command(name = "triage", author, version, about = "Claim-risk scoring for bounty batches", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a batch of claims and emit the triage report
    Score {
        /// JSON input file with a claims[] array
        #[arg(long)]
        input: PathBuf,
        /// Policy preset: relaxed, balanced, or strict
        #[arg(long)]
        policy: Option<String>,
        /// Load the policy profile from a JSON file instead of a preset
        #[arg(long, conflicts_with = "policy")]
        policy_file: Option<PathBuf>,
        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Pretty-print the report JSON
        #[arg(long)]
        pretty: bool,
    },
    /// List the built-in policy presets
    Policies,
}

pub fn run() -> Result<()> {
    env_logger::init();

    // Audit trail is best-effort; a read-only filesystem must not block scoring.
    crate::observability::audit::init_audit_logger(None);

    let cli = Cli::parse();
    match cli.command {
        Commands::Score {
            input,
            policy,
            policy_file,
            output,
            pretty,
        } => {
            let policy = match policy_file {
                Some(path) => validator::load_policy_file(&path)?,
                None => presets::resolve(policy.as_deref()),
            };

            let claims = input::load_claims(&input)?;
            let outcome = runner::run(&claims, &policy);
            let report = json_schema::build_report(&policy, outcome);

            let rendered = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };

            match output {
                Some(path) => std::fs::write(&path, rendered + "\n")?,
                None => println!("{}", rendered),
            }
            Ok(())
        }
        Commands::Policies => {
            let registry = presets::presets();
            for name in registry.names() {
                if let Some(profile) = registry.get(name) {
                    println!(
                        "{:<10} medium>={:<3} high>={:<3}{}",
                        profile.name,
                        profile.medium_cut,
                        profile.high_cut,
                        if profile.name == presets::DEFAULT_POLICY {
                            "  (default)"
                        } else {
                            ""
                        }
                    );
                }
            }
            Ok(())
        }
    }
}
