use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::args::GatewayArgs;

#[derive(Parser)]
#[command(
    name = "sqlgate",
    version,
    about = "Natural-language SQL over an SSH-tunneled MySQL database, served to agents over MCP"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open the tunnel, check the database and serve the MCP tools.
    Serve(GatewayArgs),

    /// Validate configuration and print a summary. Makes no connections.
    Check(GatewayArgs),

    /// List the tools exposed to agents.
    Tools {
        /// Also print each tool's input schema.
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stderr keeps stdout free for the stdio transport.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve(args) => commands::serve::run(args).await?,
        Command::Check(args) => commands::check::run(args)?,
        Command::Tools { verbose } => commands::tools::list(verbose)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_tools_verbose_flag() {
        let cli = Cli::try_parse_from(["sqlgate", "tools", "-v"]).unwrap();
        assert!(matches!(cli.cmd, Command::Tools { verbose: true }));
    }
}
