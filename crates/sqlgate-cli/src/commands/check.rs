//! `sqlgate check` command implementation.
//!
//! Validates the assembled configuration without opening any connection and
//! prints what `serve` would use, secrets omitted.

use super::args::GatewayArgs;
use anyhow::Result;
use sqlgate_core::GatewayConfig;

/// Validate the configuration and print a summary.
pub fn run(args: GatewayArgs) -> Result<()> {
    let config = args.into_config();

    println!("Checking sqlgate configuration...");
    println!();
    print!("{}", render_summary(&config));
    println!();

    match config.validate() {
        Ok(()) => {
            println!("Configuration is valid.");
            Ok(())
        }
        Err(e) => anyhow::bail!("configuration is invalid: {}", e),
    }
}

fn render_summary(config: &GatewayConfig) -> String {
    let summary = config.summary();
    let width = summary.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

    summary
        .iter()
        .map(|(key, value)| format!("  {:<width$}  {}\n", key, value, width = width))
        .collect()
}
