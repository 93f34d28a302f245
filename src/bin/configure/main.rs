//! configure - generate the build.ninja file for the hash library

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;
use hash_configure::generate::{dump_config, generate, GenerateMeta};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Capture argv before clap consumes anything, for the output header
    let meta = GenerateMeta::capture();

    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("configure=debug,hash_configure=debug")
    } else {
        EnvFilter::new("configure=info,hash_configure=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let (options, output, dump) = cli.into_options();

    if dump {
        println!("{}", dump_config(&options)?);
        return Ok(());
    }

    generate(&options, &output, &meta)
}
