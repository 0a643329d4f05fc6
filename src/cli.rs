use clap::Parser;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

#[derive(Parser, Debug, Clone)]
#[command(
    name = "guesser",
    version,
    long_version = LONG_VERSION,
    about = "Brute-force DNS subdomain enumeration",
    long_about = "guesser joins every word of a wordlist with the target domain, resolves the\nresulting names against a DNS server, follows CNAME chains and prints every\nhostname that resolves to an IPv4 address."
)]
pub struct Args {
    /// Target domain
    #[arg(short = 'd', long = "domain", value_name = "DOMAIN")]
    pub domain: String,

    /// Wordlist with one label per line ("-" reads stdin)
    #[arg(short = 'w', long = "wordlist", value_name = "FILE")]
    pub wordlist: PathBuf,

    /// Number of concurrent lookup workers [default: 100]
    #[arg(short = 'c', long = "concurrency", value_name = "N")]
    pub concurrency: Option<usize>,

    /// DNS server to query [default: 8.8.8.8:53]
    #[arg(short = 's', long = "server", value_name = "HOST:PORT")]
    pub server: Option<String>,

    /// Per-query timeout in milliseconds [default: 2000]
    #[arg(short = 't', long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum number of CNAME records followed per name [default: 8]
    #[arg(long = "max-cname-hops", value_name = "N")]
    pub max_cname_hops: Option<usize>,

    /// Output file
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_file: Option<String>,

    /// Output in JSON format
    #[arg(long = "json", conflicts_with = "csv")]
    pub json: bool,

    /// Output in CSV format
    #[arg(long = "csv")]
    pub csv: bool,

    /// Configuration file path
    #[arg(long = "config", value_name = "FILE")]
    pub config_path: Option<String>,

    /// Silent mode (only output results)
    #[arg(long = "silent", conflicts_with = "verbose")]
    pub silent: bool,

    /// Verbose mode
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.silent {
            log::LevelFilter::Warn
        } else if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }

    /// Show the spinner only when someone is watching stderr.
    pub fn show_progress(&self) -> bool {
        !self.silent && atty::is(atty::Stream::Stderr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_flags() {
        assert!(Args::try_parse_from(["guesser", "-w", "words.txt"]).is_err());
        assert!(Args::try_parse_from(["guesser", "-d", "example.com"]).is_err());
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "guesser", "-d", "example.com", "-w", "words.txt", "-c", "20", "-s", "1.1.1.1:53",
        ])
        .unwrap();

        assert_eq!(args.domain, "example.com");
        assert_eq!(args.wordlist, PathBuf::from("words.txt"));
        assert_eq!(args.concurrency, Some(20));
        assert_eq!(args.server.as_deref(), Some("1.1.1.1:53"));
        assert_eq!(args.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn test_defaults_left_to_config() {
        let args = Args::try_parse_from(["guesser", "-d", "example.com", "-w", "-"]).unwrap();
        assert_eq!(args.concurrency, None);
        assert_eq!(args.server, None);
        assert_eq!(args.wordlist, PathBuf::from("-"));
    }

    #[test]
    fn test_json_conflicts_with_csv() {
        assert!(Args::try_parse_from(["guesser", "-d", "a.com", "-w", "w", "--json", "--csv"]).is_err());
    }
}
