use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, ensure};
use colored::*;
use subscout_common::config::{Config, ScanConfig};
use subscout_common::models::domain::Domain;
use subscout_common::models::record::ResultSet;
use subscout_common::ports::ResultSink;
use subscout_core::discovery::Collaborators;
use subscout_core::network;
use subscout_core::sinks::{CsvSink, JsonSink};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::commands::BulkArgs;
use crate::commands::enumerate::{enumerate_domain, write_results};
use crate::terminal::{colors, print};

/// Outcome of a single domain inside a bulk run.
enum DomainOutcome {
    Done(usize),
    Failed(String),
    TimedOut,
}

pub async fn bulk(args: BulkArgs, cfg: &Config) -> anyhow::Result<()> {
    ensure!(args.parallel > 0, "--parallel must be at least 1");

    let scan: ScanConfig = args.probe.scan_config()?;
    let collaborators: Collaborators = network::system_collaborators(&scan)?;

    let mut domains: Vec<Domain> = load_domains(&args.domains_file).await?;
    domains.truncate(args.limit);
    if domains.is_empty() {
        warn!("No valid domains in {}", args.domains_file.display());
        return Ok(());
    }

    tokio::fs::create_dir_all(&args.out_dir)
        .await
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    info!(
        "Processing {} domains, {} at a time",
        domains.len(),
        args.parallel
    );

    let start_time: Instant = Instant::now();
    let semaphore: Arc<Semaphore> = Arc::new(Semaphore::new(args.parallel));
    let per_domain: Duration = Duration::from_secs(args.timeout);
    let mut tasks: JoinSet<(Domain, DomainOutcome)> = JoinSet::new();

    for domain in domains {
        let permit = semaphore.clone().acquire_owned().await?;
        let scan: ScanConfig = scan.clone();
        let collaborators: Collaborators = collaborators.clone();
        let wordlist: PathBuf = args.probe.wordlist.clone();
        let out_dir: PathBuf = args.out_dir.clone();
        let cfg: Config = *cfg;

        tasks.spawn(async move {
            let _permit = permit;
            let outcome: DomainOutcome = process_domain(
                &domain,
                &wordlist,
                &out_dir,
                scan,
                collaborators,
                per_domain,
                &cfg,
            )
            .await;
            (domain, outcome)
        });
    }

    let mut completed: usize = 0;
    let mut failed: usize = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((domain, DomainOutcome::Done(records))) => {
                completed += 1;
                info!("{domain}: {records} records");
            }
            Ok((domain, DomainOutcome::Failed(reason))) => {
                failed += 1;
                warn!("{domain}: {reason}");
            }
            Ok((domain, DomainOutcome::TimedOut)) => {
                failed += 1;
                warn!("{domain}: gave up after {}s", per_domain.as_secs());
            }
            Err(e) => {
                failed += 1;
                error!("Bulk task failed: {e}");
            }
        }
    }

    bulk_ends(completed, failed, &args.out_dir, start_time.elapsed(), cfg);
    Ok(())
}

async fn process_domain(
    domain: &Domain,
    wordlist: &Path,
    out_dir: &Path,
    scan: ScanConfig,
    collaborators: Collaborators,
    per_domain: Duration,
    cfg: &Config,
) -> DomainOutcome {
    let run = enumerate_domain(domain, wordlist, scan, collaborators, cfg);
    let results: ResultSet = match tokio::time::timeout(per_domain, run).await {
        Ok(Ok(results)) => results,
        Ok(Err(e)) => return DomainOutcome::Failed(format!("{e:#}")),
        Err(_) => return DomainOutcome::TimedOut,
    };

    let stem: String = output_stem(domain);
    let sinks: Vec<Box<dyn ResultSink>> = vec![
        Box::new(CsvSink::new(out_dir.join(format!("{stem}.csv")))),
        Box::new(JsonSink::new(out_dir.join(format!("{stem}.json")))),
    ];
    match write_results(&results, &sinks).await {
        Ok(()) => DomainOutcome::Done(results.len()),
        Err(e) => DomainOutcome::Failed(format!("{e:#}")),
    }
}

/// `www.example.com` -> `www_example_com`.
pub fn output_stem(domain: &Domain) -> String {
    domain.as_str().replace('.', "_")
}

pub async fn load_domains(path: &Path) -> anyhow::Result<Vec<Domain>> {
    let contents: String = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(parse_domains(&contents))
}

/// Accepts one domain per line or ranked `rank,domain` rows.
///
/// The last comma separated field of a line is the domain. Lines that do not hold
/// a valid domain, such as a CSV header, are skipped. Duplicates keep their first
/// position.
pub fn parse_domains(contents: &str) -> Vec<Domain> {
    let mut seen: HashSet<Domain> = HashSet::new();
    let mut domains: Vec<Domain> = Vec::new();

    for line in contents.lines() {
        let line: &str = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let field: &str = line.rsplit(',').next().unwrap_or(line).trim();
        match field.parse::<Domain>() {
            Ok(domain) => {
                if seen.insert(domain.clone()) {
                    domains.push(domain);
                }
            }
            Err(_) => debug!("Skipping line {line:?}"),
        }
    }

    domains
}

fn bulk_ends(completed: usize, failed: usize, out_dir: &Path, total_time: Duration, cfg: &Config) {
    let done: ColoredString = format!("{completed} domains").bold().green();
    let failed: ColoredString = format!("{failed} failed").bold().red();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Bulk run complete: {done}, {failed} in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
            print::aligned_line("Output", out_dir.display().to_string(), 6);
            print::end_of_program();
        }
        _ => print::print(&output),
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn names(domains: &[Domain]) -> Vec<&str> {
        domains.iter().map(Domain::as_str).collect()
    }

    #[test]
    fn plain_lines_are_domains() {
        let domains: Vec<Domain> = parse_domains("example.com\n\n  Example.org \n# comment\n");
        assert_eq!(names(&domains), vec!["example.com", "example.org"]);
    }

    #[test]
    fn ranked_csv_uses_the_last_field_and_skips_the_header() {
        let domains: Vec<Domain> = parse_domains("rank,domain\n1,google.com\n2,youtube.com\n");
        assert_eq!(names(&domains), vec!["google.com", "youtube.com"]);
    }

    #[test]
    fn duplicates_and_garbage_are_dropped() {
        let domains: Vec<Domain> = parse_domains("a.com\n3,a.com\nnot a domain\nlocalhost\nb.com\n");
        assert_eq!(names(&domains), vec!["a.com", "b.com"]);
    }

    #[test]
    fn output_stem_replaces_dots() {
        let domain: Domain = "www.example.com".parse().unwrap();
        assert_eq!(output_stem(&domain), "www_example_com");
    }

    #[tokio::test]
    async fn domains_are_loaded_from_disk() {
        let mut file: NamedTempFile = NamedTempFile::new().unwrap();
        writeln!(file, "1,example.com").unwrap();
        writeln!(file, "2,example.net").unwrap();

        let domains: Vec<Domain> = load_domains(file.path()).await.unwrap();
        assert_eq!(names(&domains), vec!["example.com", "example.net"]);
    }

    #[tokio::test]
    async fn missing_domain_file_is_an_error() {
        assert!(load_domains(Path::new("/definitely/not/here.csv")).await.is_err());
    }
}
