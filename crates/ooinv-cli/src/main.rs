//! ooinv - OneOps dynamic inventory for Ansible
//!
//! Reads OneOps coordinates from OO_* environment variables, gathers the
//! assembly or environment inventory, and prints dynamic-inventory JSON on
//! stdout. Warnings about degraded results go to stderr so Ansible only
//! ever parses the document itself.

mod config;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use config::Config;
use ooinv_client::{OoClient, OoConfig};
use ooinv_core::{FailurePolicy, GatherOptions, Gatherer, Inventory};

#[derive(Parser)]
#[command(name = "ooinv")]
#[command(about = "OneOps dynamic inventory for Ansible")]
#[command(version)]
struct Cli {
    /// List all inventory
    #[arg(long)]
    list: bool,

    /// List one host by its identity
    #[arg(long, value_name = "HOST", conflicts_with = "list")]
    host: Option<String>,

    /// Abort instead of degrading when a component listing fails
    #[arg(long)]
    strict: bool,
}

fn main() {
    let cli = Cli::parse();

    // Ansible always passes --list or --host; anything else gets usage.
    if !cli.list && cli.host.is_none() {
        let _ = Cli::command().print_help();
        std::process::exit(1);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(problems) => {
            for problem in problems {
                eprintln!("{problem}");
            }
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&cli, &config) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, config: &Config) -> Result<()> {
    let client = OoClient::new(OoConfig {
        endpoint: config.endpoint.clone(),
        organization: config.organization.clone(),
        assembly: config.assembly.clone(),
        api_token: config.api_token.clone(),
    })?;

    let options = GatherOptions {
        environment: config.environment.clone(),
        host_method: config.host_method,
        failure_policy: if cli.strict {
            FailurePolicy::Abort
        } else {
            FailurePolicy::BestEffort
        },
    };

    let inventory = Gatherer::new(&client, options).gather()?;
    report_degradations(&inventory);

    let json = match &cli.host {
        Some(host) => match inventory.generate_host(host)? {
            Some(vars) => serde_json::to_string_pretty(&vars)?,
            None => "{}".to_string(),
        },
        None => serde_json::to_string_pretty(&inventory.generate_list()?)?,
    };
    println!("{json}");
    Ok(())
}

fn report_degradations(inventory: &Inventory) {
    for failure in inventory.failures() {
        eprintln!(
            "Warning: skipped {}/{}/{}: {}",
            failure.environment, failure.platform, failure.component, failure.error
        );
    }
    for skipped in inventory.skipped_hosts() {
        eprintln!("Warning: skipped host {}: {}", skipped.ci_name, skipped.reason);
    }
}
