use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use subscout_common::config::{Config, ScanConfig};
use subscout_common::models::candidate::{CandidateOrigin, CandidateSet};
use subscout_common::models::domain::Domain;
use subscout_common::models::record::{EnrichmentRecord, ResultSet};
use subscout_common::ports::{ArchiveIndex, ResultSink};
use subscout_core::aggregator::RecordObserver;
use subscout_core::candidates::CandidateSource;
use subscout_core::discovery::{Collaborators, Discovery, RunReport};
use subscout_core::network::{self, archive::WaybackArchive};
use subscout_core::sinks::{CsvSink, JsonSink};
use tracing::{Instrument, Span, info, info_span, warn};

use crate::commands::EnumerateArgs;
use crate::sprint;
use crate::terminal::{colors, format, print, spinner};

pub async fn enumerate(args: EnumerateArgs, cfg: &Config) -> anyhow::Result<()> {
    let scan: ScanConfig = args.probe.scan_config()?;
    let collaborators: Collaborators = network::system_collaborators(&scan)?;

    let mut sinks: Vec<Box<dyn ResultSink>> = Vec::new();
    if let Some(path) = &args.output {
        sinks.push(Box::new(CsvSink::new(path)));
    }
    if let Some(path) = &args.json {
        sinks.push(Box::new(JsonSink::new(path)));
    }

    let start_time: Instant = Instant::now();
    let results: ResultSet = enumerate_domain(
        &args.domain,
        &args.probe.wordlist,
        scan,
        collaborators,
        cfg,
    )
    .await?;

    write_results(&results, &sinks).await?;
    enumeration_ends(&args.domain, &results, start_time.elapsed(), cfg);
    Ok(())
}

/// Runs the whole pipeline for one domain, with live progress on the terminal.
pub async fn enumerate_domain(
    domain: &Domain,
    wordlist: &Path,
    scan: ScanConfig,
    collaborators: Collaborators,
    cfg: &Config,
) -> anyhow::Result<ResultSet> {
    let archive: Option<Arc<dyn ArchiveIndex>> = if scan.archive {
        let wayback: Arc<dyn ArchiveIndex> = Arc::new(
            WaybackArchive::new(scan.timeouts.archive).context("building archive client")?,
        );
        Some(wayback)
    } else {
        None
    };

    let span: Span = info_span!("enumerate", indicatif.pb_show = true);
    spinner::attach(&span, &format!("Collecting candidates for {domain}..."));

    let quiet: u8 = cfg.quiet;
    let progress_span: Span = span.clone();
    let observer: RecordObserver = Arc::new(move |record: &EnrichmentRecord, count: usize| {
        spinner::report_progress(&progress_span, count);
        if quiet < 2 {
            print::print(&format::record_line(record));
        }
    });

    run_pipeline(domain, wordlist, scan, collaborators, archive, observer)
        .instrument(span)
        .await
}

async fn run_pipeline(
    domain: &Domain,
    wordlist: &Path,
    scan: ScanConfig,
    collaborators: Collaborators,
    archive: Option<Arc<dyn ArchiveIndex>>,
    observer: RecordObserver,
) -> anyhow::Result<ResultSet> {
    let source: CandidateSource = CandidateSource::new(archive);
    let candidates: CandidateSet = source.generate(domain, Some(wordlist), scan.archive).await;
    if candidates.is_empty() {
        warn!("No candidates to test for {domain}");
        return Ok(ResultSet::default());
    }
    info!(
        "{} candidates ({} from the wordlist, {} from the archive)",
        candidates.len(),
        candidates.count_from(CandidateOrigin::Wordlist),
        candidates.count_from(CandidateOrigin::Archive)
    );

    let discovery: Discovery = Discovery::new(collaborators, scan)?.with_observer(observer);
    let report: RunReport = discovery.run_with_summary(domain, candidates).await;

    if report.results.is_empty() {
        info!(
            "{domain}: {} of {} candidates resolved, none answered over HTTP",
            report.summary.live, report.summary.candidates
        );
    }
    Ok(report.results)
}

/// Hands `results` to every sink. An empty result set is never written.
pub async fn write_results(results: &ResultSet, sinks: &[Box<dyn ResultSink>]) -> anyhow::Result<()> {
    if results.is_empty() {
        if !sinks.is_empty() {
            warn!("No results, skipping output files");
        }
        return Ok(());
    }

    for sink in sinks {
        sink.write(results)
            .await
            .with_context(|| format!("writing {} output", sink.name()))?;
    }
    Ok(())
}

fn enumeration_ends(domain: &Domain, results: &ResultSet, total_time: Duration, cfg: &Config) {
    if results.is_empty() {
        print::header("no live subdomains", cfg.quiet);
        if cfg.quiet == 0 {
            print::no_results();
        }
        return;
    }

    if cfg.quiet == 0 {
        sprint!();
        print::header("Live Subdomains", cfg.quiet);
        print_records(results);
    }
    print_summary(domain, results.len(), total_time, cfg);
}

fn print_records(results: &ResultSet) {
    let mut records: Vec<&EnrichmentRecord> = results.iter().collect();
    records.sort_by(|a, b| a.key().cmp(&b.key()));

    for (idx, record) in records.iter().enumerate() {
        print::tree_head(idx, &record.url);
        print::as_tree_one_level(&format::record_details(record));
        if idx + 1 != records.len() {
            sprint!();
        }
    }
}

fn print_summary(domain: &Domain, records: usize, total_time: Duration, cfg: &Config) {
    let found: ColoredString = format!("{records} records").bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Enumeration of {domain} complete: {found} in {total_time}")
        .color(colors::TEXT_DEFAULT)
        .to_string();

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
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
