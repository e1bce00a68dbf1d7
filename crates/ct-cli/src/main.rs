use std::io;

use anyhow::{Context as _, Result};
use chrono::Local;
use clap::Parser;
use ct_core::event::truncate_to_seconds;
use tracing_subscriber::EnvFilter;

use ct_cli::commands::{Context, clockin, clockout, init, status, summary, toggle};
use ct_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    // Every computation in this run sees the same instant.
    let now = truncate_to_seconds(Local::now().naive_local());
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Init(args) => init::run(&mut stdout, &config, args)?,
        Commands::Clockin(args) => clockin::run(&mut stdout, &Context::open(config, now)?, args)?,
        Commands::Clockout(args) => clockout::run(&mut stdout, &Context::open(config, now)?, args)?,
        Commands::Toggle(args) => toggle::run(&mut stdout, &Context::open(config, now)?, args)?,
        Commands::Status(args) => status::run(&mut stdout, &Context::open(config, now)?, args.json)?,
        Commands::Summary(args) => summary::run(&mut stdout, &Context::open(config, now)?, args)?,
    }

    Ok(())
}
