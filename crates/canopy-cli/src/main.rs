//! # canopy CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Canopy service-model compiler — descriptor inspection tooling.
///
/// Compiles the bundled demo configuration tree and renders the
/// endpoint descriptors downstream exporters would consume.
#[derive(Parser, Debug)]
#[command(name = "canopy", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the full descriptor list.
    Describe(canopy_cli::describe::DescribeArgs),
    /// Print one route template per endpoint.
    Routes(canopy_cli::routes::RoutesArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Describe(args) => canopy_cli::describe::run(args),
        Commands::Routes(args) => canopy_cli::routes::run(args),
    }
}
