use anyhow::Result;
use clap::Parser;
use guesser::config;
use guesser::output::OutputManager;
use guesser::utils::Wordlist;
use guesser::{Args, GuesserEngine};
use log::{error, info};
use std::process;

const BANNER: &str = r#"
   __ _ _   _  ___  ___ ___  ___ _ __
  / _` | | | |/ _ \/ __/ __|/ _ \ '__|
 | (_| | |_| |  __/\__ \__ \  __/ |
  \__, |\__,_|\___||___/___/\___|_|
  |___/
        DNS subdomain brute-forcing
"#;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level())
        .init();

    if !args.silent {
        eprintln!("{}", BANNER);
    }

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        process::exit(1);
    }

    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = config::build_config(&args)?;

    // Fail on a missing wordlist before any worker is started.
    let wordlist = Wordlist::open(&args.wordlist).await?;

    let engine = GuesserEngine::new(config.clone()).await?;
    let report = engine.scan(&args.domain, wordlist).await?;

    OutputManager::new(config.output).write_report(&report)?;

    info!(
        "Scan completed: {} of {} candidates resolved ({} addresses) in {:.2}s",
        report.stats.resolved_hostnames,
        report.stats.candidates,
        report.stats.results,
        report.stats.duration.as_secs_f64()
    );

    Ok(())
}
