//! # Outbound Ports
//!
//! Contracts for everything the pipeline asks of the outside world.
//!
//! ## Rules
//! 1. All items here are `traits`; implementations live in `subscout-core::network`
//!    and `subscout-core::sinks`, or in tests as stubs.
//! 2. Expected absence (NXDOMAIN, closed port, no certificate) is expressed as
//!    `None`, an empty collection or [`LookupError::NotFound`], never as a failure.
//! 3. Implementations must bound every network call with a timeout.

use std::net::IpAddr;

use async_trait::async_trait;

use crate::error::{LookupError, ProbeError, SinkError};
use crate::models::domain::Domain;
use crate::models::host::{HttpResponse, PortReport, ResolvedHost};
use crate::models::record::ResultSet;

/// Forward and reverse name resolution.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Resolves `name` to a single address.
    async fn lookup(&self, name: &str) -> Result<IpAddr, LookupError>;

    /// Best-effort PTR lookup.
    async fn reverse(&self, addr: IpAddr) -> Option<String>;
}

/// Issues a GET request and follows redirects.
///
/// Any HTTP status is a successful probe; only transport failures are errors.
#[async_trait]
pub trait HttpProber: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, ProbeError>;
}

/// TCP connect scan with banner capture.
#[async_trait]
pub trait PortScanner: Send + Sync {
    async fn scan(&self, host: &ResolvedHost, ports: &[u16]) -> PortReport;
}

/// Reads DNS Subject Alternative Names from the certificate a host presents on 443.
#[async_trait]
pub trait CertificateInspector: Send + Sync {
    async fn sans(&self, host: &ResolvedHost) -> Vec<String>;
}

/// Historical index of URLs seen under a domain.
#[async_trait]
pub trait ArchiveIndex: Send + Sync {
    /// Hostnames of every archived URL under `*.domain`.
    async fn hostnames(&self, domain: &Domain) -> Result<Vec<String>, ProbeError>;
}

/// Destination of a finished run.
#[async_trait]
pub trait ResultSink: Send + Sync {
    fn name(&self) -> &str;

    async fn write(&self, results: &ResultSet) -> Result<(), SinkError>;
}
