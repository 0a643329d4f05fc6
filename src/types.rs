// src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SERVER: &str = "8.8.8.8:53";
pub const DEFAULT_CONCURRENCY: usize = 100;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_CNAME_HOPS: usize = 8;

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub resolver: ResolverConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub server: String,
    pub concurrency: usize,
    pub timeout: Duration,
    pub max_cname_hops: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout: DEFAULT_TIMEOUT,
            max_cname_hops: DEFAULT_MAX_CNAME_HOPS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub file: Option<String>,
    pub progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            file: None,
            progress: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// The two record types a lookup ever asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    A,
    Cname,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::A => f.write_str("A"),
            RecordKind::Cname => f.write_str("CNAME"),
        }
    }
}

/// A resolvable hostname paired with one of its addresses.
///
/// `hostname` is always the candidate that was asked for, even when the
/// address was reached through one or more CNAMEs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LookupResult {
    pub hostname: String,
    pub ip_addr: String,
}

impl LookupResult {
    pub fn new(hostname: impl Into<String>, ip_addr: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ip_addr: ip_addr.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanStats {
    pub candidates: usize,
    pub resolved_hostnames: usize,
    pub results: usize,
    pub duration: Duration,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub domain: String,
    pub server: String,
    pub results: Vec<LookupResult>,
    pub stats: ScanStats,
    pub timestamp: String,
}

/// Failure of a single DNS exchange.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("No {kind} answer for {name}")]
    NoAnswer { name: String, kind: RecordKind },
}

#[derive(Debug, Error)]
pub enum GuesserError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Failed to read wordlist {path:?}: {source}")]
    WordlistError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker error: {0}")]
    WorkerError(String),

    #[error("Output error: {0}")]
    OutputError(String),
}
