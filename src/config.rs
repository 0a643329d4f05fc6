use crate::cli::Args;
use crate::error::ErrorContext;
use crate::types::{Config, GuesserError, OutputFormat};
use log::debug;
use serde::Deserialize;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

pub const SERVER_ENV: &str = "GUESSER_DNS_SERVER";
pub const CONCURRENCY_ENV: &str = "GUESSER_CONCURRENCY";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    resolver: FileResolverConfig,
    output: FileOutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileResolverConfig {
    server: Option<String>,
    concurrency: Option<usize>,
    timeout_ms: Option<u64>,
    max_cname_hops: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileOutputConfig {
    format: Option<OutputFormat>,
    file: Option<String>,
}

/// Defaults, then the config file, then the environment, then the flags.
pub fn build_config(args: &Args) -> Result<Config, GuesserError> {
    let mut config = match args.config_path.as_deref() {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    apply_env_overrides(&mut config)?;
    apply_args(&mut config, args);
    validate_config(&config)?;

    Ok(config)
}

pub fn load_config(config_path_str: &str) -> Result<Config, GuesserError> {
    let path = Path::new(config_path_str);
    if !path.exists() {
        return Err(GuesserError::ConfigError(format!(
            "Configuration file not found: {}",
            config_path_str
        )));
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", config_path_str))?;
    let config = parse_config(&contents)?;
    debug!("Loaded configuration from {}", config_path_str);
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<Config, GuesserError> {
    let file: FileConfig =
        toml::from_str(contents).with_context(|| "Failed to parse configuration file".to_string())?;

    let mut config = Config::default();
    if let Some(server) = file.resolver.server {
        config.resolver.server = server;
    }
    if let Some(concurrency) = file.resolver.concurrency {
        config.resolver.concurrency = concurrency;
    }
    if let Some(timeout_ms) = file.resolver.timeout_ms {
        config.resolver.timeout = Duration::from_millis(timeout_ms);
    }
    if let Some(hops) = file.resolver.max_cname_hops {
        config.resolver.max_cname_hops = hops;
    }
    if let Some(format) = file.output.format {
        config.output.format = format;
    }
    if file.output.file.is_some() {
        config.output.file = file.output.file;
    }

    Ok(config)
}

fn apply_env_overrides(config: &mut Config) -> Result<(), GuesserError> {
    if let Ok(server) = env::var(SERVER_ENV) {
        config.resolver.server = server.trim().to_string();
    }
    if let Ok(concurrency) = env::var(CONCURRENCY_ENV) {
        config.resolver.concurrency = concurrency
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}", CONCURRENCY_ENV))?;
    }
    Ok(())
}

fn apply_args(config: &mut Config, args: &Args) {
    if let Some(server) = &args.server {
        config.resolver.server = server.clone();
    }
    if let Some(concurrency) = args.concurrency {
        config.resolver.concurrency = concurrency;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.resolver.timeout = Duration::from_millis(timeout_ms);
    }
    if let Some(hops) = args.max_cname_hops {
        config.resolver.max_cname_hops = hops;
    }
    if let Some(output_file) = &args.output_file {
        config.output.file = Some(output_file.clone());
    }
    if args.json {
        config.output.format = OutputFormat::Json;
    }
    if args.csv {
        config.output.format = OutputFormat::Csv;
    }
    config.output.progress = args.show_progress();
}

pub fn validate_config(config: &Config) -> Result<(), GuesserError> {
    if config.resolver.concurrency == 0 {
        return Err(GuesserError::ConfigError("Concurrency must be greater than 0".to_string()));
    }
    if config.resolver.timeout.is_zero() {
        return Err(GuesserError::ConfigError("Timeout must be greater than 0".to_string()));
    }
    validate_server(&config.resolver.server)
}

/// `host:port` shape only; hostnames are resolved when the scan starts.
fn validate_server(server: &str) -> Result<(), GuesserError> {
    if server.parse::<SocketAddr>().is_ok() {
        return Ok(());
    }

    let invalid = || {
        GuesserError::ConfigError(format!("Invalid DNS server address {}: expected HOST:PORT", server))
    };
    let (host, port) = server.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() || host.contains(':') || host.contains(char::is_whitespace) {
        return Err(invalid());
    }
    port.parse::<u16>()
        .with_context(|| format!("Invalid DNS server port in {}", server))?;
    Ok(())
}
