//! # Administrator Provisioning Tool
//!
//! Creates the first administrator from the `[bootstrap]` config section and
//! a password read from the environment.
//!
//! ## Usage
//! ```bash
//! # Password comes from the variable named by bootstrap.password_env
//! export CBPM_ADMIN_PASSWORD='...'
//!
//! # No administrator stored yet: write the account and audit entry
//! cargo run -p cbpm-io --bin provision-admin -- --existing-admins 0 --out admin.json
//!
//! # Custom config file
//! cargo run -p cbpm-io --bin provision-admin -- -c ./config.toml -e 0
//! ```
//!
//! The caller counts the administrators already stored and passes the number
//! with `--existing-admins`. With a non-zero count nothing is created.

use anyhow::{bail, Context, Result};
use cbpm_core::datetime;
use cbpm_core::provision::{provision_admin, ProvisionOutcome, ProvisionRequest};
use cbpm_io::{export, logging, settings};
use std::env;
use std::path::PathBuf;
use tracing::info;

struct Args {
    config: Option<PathBuf>,
    out: Option<PathBuf>,
    existing_admins: Option<usize>,
}

fn main() -> Result<()> {
    logging::init_tracing();

    let Some(args) = parse_args()? else {
        return Ok(());
    };
    let Some(existing_admins) = args.existing_admins else {
        bail!("--existing-admins is required (number of administrators already stored)");
    };

    let config = settings::load(args.config).context("Failed to load configuration")?;
    let bootstrap = config
        .bootstrap
        .as_ref()
        .context("No [bootstrap] section in configuration")?;

    let request = if existing_admins > 0 {
        // Skipped anyway; the secret is not needed
        ProvisionRequest::from_bootstrap(bootstrap, String::new().into())
    } else {
        let password = settings::bootstrap_password(bootstrap, |key| env::var(key).ok())
            .context("Administrator password unavailable")?;
        ProvisionRequest::from_bootstrap(bootstrap, password)
    };

    let hasher = config.security.hasher()?;
    let outcome = provision_admin(
        &request,
        &hasher,
        config.security.password_min_length,
        existing_admins,
        datetime::now(),
    )
    .context("Provisioning failed")?;

    match outcome {
        ProvisionOutcome::Created(record) => match args.out {
            Some(path) => {
                export::write_json(&record, &path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(?path, username = %record.user.username, "Provisioning record written");
            }
            None => println!("{}", serde_json::to_string_pretty(&record)?),
        },
        ProvisionOutcome::Skipped { existing_admins } => {
            info!(existing_admins, "Nothing to do");
        }
    }

    Ok(())
}

/// `None` when only help was requested.
fn parse_args() -> Result<Option<Args>> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args {
        config: None,
        out: None,
        existing_admins: None,
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--config" | "-c" => {
                parsed.config = Some(value.context("--config needs a path")?.into());
                i += 1;
            }
            "--out" | "-o" => {
                parsed.out = Some(value.context("--out needs a path")?.into());
                i += 1;
            }
            "--existing-admins" | "-e" => {
                let count = value.context("--existing-admins needs a number")?;
                parsed.existing_admins = Some(
                    count
                        .parse()
                        .with_context(|| format!("Invalid administrator count: {}", count))?,
                );
                i += 1;
            }
            "--help" | "-h" => {
                println!("CBPM Administrator Provisioning");
                println!();
                println!("Usage: provision-admin --existing-admins <N> [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -e, --existing-admins <N>  Administrators already stored (required)");
                println!("  -c, --config <PATH>        Config file (default: platform config dir)");
                println!("  -o, --out <PATH>           Write the record here instead of stdout");
                println!("  -h, --help                 Show this help message");
                return Ok(None);
            }
            other => bail!("Unknown argument: {}", other),
        }
        i += 1;
    }

    Ok(Some(parsed))
}
