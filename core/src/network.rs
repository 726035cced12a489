//! # Network Adapters
//!
//! Concrete implementations of the outbound ports declared in `subscout_common::ports`.
//!
//! | Port                   | Adapter                    | Stack                      |
//! |------------------------|----------------------------|----------------------------|
//! | `DnsResolver`          | [`dns::HickoryResolver`]   | `hickory-resolver`         |
//! | `HttpProber`           | [`http::ReqwestProber`]    | `reqwest` + rustls         |
//! | `PortScanner`          | [`tcp::TcpPortScanner`]    | `tokio::net::TcpStream`    |
//! | `CertificateInspector` | [`tls::RustlsInspector`]   | `tokio-rustls`, `x509-parser` |
//! | `ArchiveIndex`         | [`archive::WaybackArchive`]| `reqwest` + `serde_json`   |

use std::sync::Arc;

use anyhow::Context;
use subscout_common::config::ScanConfig;

use crate::discovery::Collaborators;

pub mod archive;
pub mod dns;
pub mod http;
pub mod tcp;
pub mod tls;

/// Builds the production collaborators for a run.
pub fn system_collaborators(config: &ScanConfig) -> anyhow::Result<Collaborators> {
    let dns: dns::HickoryResolver = dns::HickoryResolver::from_system(config.timeouts.dns);
    let http: http::ReqwestProber =
        http::ReqwestProber::new(config.timeouts.http).context("building HTTP client")?;
    let ports: tcp::TcpPortScanner = tcp::TcpPortScanner::new(
        config.timeouts.connect,
        config.timeouts.banner,
        config.banner_bytes,
    );
    let certs: tls::RustlsInspector =
        tls::RustlsInspector::new(config.timeouts.tls).context("building TLS client")?;

    Ok(Collaborators {
        dns: Arc::new(dns),
        http: Arc::new(http),
        ports: Arc::new(ports),
        certs: Arc::new(certs),
    })
}
