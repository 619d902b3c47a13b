//! # `canopy describe`
//!
//! Compiles the demo tree and renders the full descriptor list.

use clap::{Args, ValueEnum};

use crate::demo::compile_demo;

/// Output format for descriptor rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable one-line-per-endpoint summary.
    Table,
    /// The serialized descriptor list.
    Json,
}

/// Arguments for the `describe` subcommand.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Table)]
    pub format: Format,
}

/// Compile the demo tree and print every descriptor.
pub fn run(args: DescribeArgs) -> anyhow::Result<()> {
    let endpoints = compile_demo()?;

    match args.format {
        Format::Table => {
            for endpoint in &endpoints {
                println!("{endpoint}");
                for param in &endpoint.parameters {
                    println!("    {param}");
                }
                let keys: Vec<&str> = endpoint.context.key_names().collect();
                if !keys.is_empty() {
                    println!("    context: {}", keys.join(", "));
                }
            }
            tracing::info!(endpoints = endpoints.len(), "described demo service");
        }
        Format::Json => {
            println!("{}", serde_json::to_string_pretty(&endpoints)?);
        }
    }
    Ok(())
}
