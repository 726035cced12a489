//! # Candidate Source
//!
//! Builds the set of labels to test under a target domain from two inputs:
//!
//! 1. a static wordlist, one label per line;
//! 2. hostnames recorded by a historical web archive index (optional).
//!
//! Neither source is allowed to fail the run. A missing wordlist or an unreachable
//! archive only reduces the candidate set and is reported with a warning.

use std::path::Path;
use std::sync::Arc;

use subscout_common::models::candidate::{CandidateOrigin, CandidateSet};
use subscout_common::models::domain::Domain;
use subscout_common::ports::ArchiveIndex;
use tracing::{debug, info, warn};

pub struct CandidateSource {
    archive: Option<Arc<dyn ArchiveIndex>>,
}

impl CandidateSource {
    pub fn new(archive: Option<Arc<dyn ArchiveIndex>>) -> Self {
        Self { archive }
    }

    /// Case-insensitive union of the wordlist and, if `use_archive`, the archive labels.
    pub async fn generate(
        &self,
        domain: &Domain,
        wordlist: Option<&Path>,
        use_archive: bool,
    ) -> CandidateSet {
        let mut candidates: CandidateSet = CandidateSet::new();

        if let Some(path) = wordlist {
            let labels: Vec<String> = load_wordlist(path).await;
            let added: usize = candidates.extend_labels(labels, CandidateOrigin::Wordlist);
            debug!("Loaded {added} candidates from {}", path.display());
        }

        if use_archive {
            match &self.archive {
                Some(archive) => {
                    let labels: Vec<String> = archive_labels(archive.as_ref(), domain).await;
                    let added: usize = candidates.extend_labels(labels, CandidateOrigin::Archive);
                    info!("Archive index contributed {added} new candidates for {domain}");
                }
                None => debug!("No archive index configured, skipping"),
            }
        }

        candidates
    }
}

/// Reads a wordlist file. Missing or unreadable files yield an empty list.
pub async fn load_wordlist(path: &Path) -> Vec<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => parse_wordlist(&contents),
        Err(e) => {
            warn!("Could not read wordlist {}: {e}", path.display());
            Vec::new()
        }
    }
}

/// Splits wordlist contents into trimmed, non-blank lines.
pub fn parse_wordlist(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

async fn archive_labels(archive: &dyn ArchiveIndex, domain: &Domain) -> Vec<String> {
    match archive.hostnames(domain).await {
        Ok(hostnames) => hostnames
            .iter()
            .filter_map(|hostname| domain.child_label(hostname))
            .collect(),
        Err(e) => {
            warn!("Archive lookup for {domain} failed: {e}");
            Vec::new()
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
