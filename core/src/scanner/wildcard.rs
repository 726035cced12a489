use std::net::IpAddr;

use rand::Rng;
use rand::distr::Alphanumeric;
use subscout_common::models::domain::Domain;
use subscout_common::models::host::WildcardSignature;
use tracing::{debug, warn};

use super::resolver::Resolver;

const SENTINEL_PREFIX: &str = "subscout-sentinel-";
const SENTINEL_RANDOM_LEN: usize = 24;

/// A label that cannot plausibly exist under any domain.
pub fn sentinel_label() -> String {
    let random: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SENTINEL_RANDOM_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{SENTINEL_PREFIX}{random}")
}

/// Resolves the sentinel label once and records its address as the wildcard signature.
pub async fn detect(resolver: &Resolver, domain: &Domain) -> WildcardSignature {
    let fqdn: String = domain.fqdn(&sentinel_label());
    let addr: Option<IpAddr> = resolver.lookup(&fqdn).await;

    match addr {
        Some(addr) => warn!("Wildcard DNS detected on {domain}, answers resolving to {addr} will be ignored"),
        None => debug!("No wildcard DNS on {domain}"),
    }
    WildcardSignature::from(addr)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
