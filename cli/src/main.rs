mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{batch, run};
use tracing_subscriber::{EnvFilter, prelude::*};

/// Log to stderr at the level chosen by `-v`, unless RUST_LOG is set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,districter={level},districter_cli={level}")));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_filter(env_filter))
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Run(args) => run::run(&cli, args),
        Commands::Batch(args) => batch::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
