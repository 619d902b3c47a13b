//! # `canopy routes`
//!
//! Compiles the demo tree and prints one route template per endpoint.

use clap::Args;

use crate::demo::compile_demo;

/// Arguments for the `routes` subcommand.
#[derive(Args, Debug)]
pub struct RoutesArgs {
    /// Also print the endpoint identifier next to each route.
    #[arg(long)]
    pub ids: bool,
}

/// Compile the demo tree and print its route templates.
pub fn run(args: RoutesArgs) -> anyhow::Result<()> {
    let endpoints = compile_demo()?;
    for endpoint in &endpoints {
        if args.ids {
            println!("{}  {}", endpoint.route, endpoint.id);
        } else {
            println!("{}", endpoint.route);
        }
    }
    Ok(())
}
