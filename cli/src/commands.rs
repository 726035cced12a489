pub mod bulk;
pub mod enumerate;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use subscout_common::config::{self, Config, RetryPolicy, ScanConfig, Timeouts};
use subscout_common::error::ConfigError;
use subscout_common::models::domain::Domain;

#[derive(Parser)]
#[command(name = "subscout")]
#[command(version, about = "Subdomain discovery and fingerprinting.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Reduce output; repeat to only show warnings and results
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Show debug diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Do not print the banner
    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enumerate the subdomains of a single domain
    #[command(name = "enum", alias = "e")]
    Enumerate(EnumerateArgs),
    /// Enumerate every domain listed in a file
    #[command(alias = "b")]
    Bulk(BulkArgs),
}

#[derive(Args)]
pub struct EnumerateArgs {
    /// Target domain, e.g. example.com
    pub domain: Domain,

    #[command(flatten)]
    pub probe: ProbeArgs,

    /// Write the results as CSV
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write the results as JSON
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,
}

#[derive(Args)]
pub struct BulkArgs {
    /// File with one domain per line, or a ranked `rank,domain` CSV
    pub domains_file: PathBuf,

    #[command(flatten)]
    pub probe: ProbeArgs,

    /// Only process the first N domains
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Number of domains processed at the same time
    #[arg(long, default_value_t = 4)]
    pub parallel: usize,

    /// Per-domain time limit in seconds
    #[arg(long, default_value_t = 300)]
    pub timeout: u64,

    /// Directory receiving one CSV and one JSON file per domain
    #[arg(long, value_name = "DIR", default_value = "bulk_results")]
    pub out_dir: PathBuf,
}

/// Probing options shared by every subcommand.
#[derive(Args, Clone)]
pub struct ProbeArgs {
    /// Wordlist with one candidate label per line
    #[arg(short, long, value_name = "FILE", default_value = "subdomains.txt")]
    pub wordlist: PathBuf,

    /// Comma separated TCP ports to scan on every live host, e.g. 22,80,443
    #[arg(short, long, value_name = "PORTS")]
    pub ports: Option<String>,

    /// Also probe https:// and collect certificate SANs
    #[arg(long)]
    pub https: bool,

    /// Do not mine candidates from the web archive
    #[arg(long)]
    pub no_archive: bool,

    /// Maximum number of hosts processed at the same time
    #[arg(long, default_value_t = 32)]
    pub workers: usize,

    /// Attempts per DNS lookup and HTTP request
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Pause after each live host, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 300)]
    pub delay: u64,
}

impl ProbeArgs {
    pub fn scan_config(&self) -> Result<ScanConfig, ConfigError> {
        let ports: Vec<u16> = match &self.ports {
            Some(list) => config::parse_ports(list)?,
            None => Vec::new(),
        };
        let delay: Duration = Duration::from_millis(self.delay);

        let scan: ScanConfig = ScanConfig {
            workers: self.workers,
            ports,
            https: self.https,
            archive: !self.no_archive,
            retry: RetryPolicy {
                max_attempts: self.retries,
                delay,
            },
            timeouts: Timeouts::default(),
            rate_limit_delay: delay,
            ..ScanConfig::default()
        };
        scan.validate()?;
        Ok(scan)
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            no_banner: self.no_banner,
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
