use std::collections::HashSet;
use std::time::Duration;

use subscout_common::config::ScanConfig;
use subscout_common::models::candidate::CandidateSet;
use subscout_common::models::domain::Domain;
use subscout_common::models::record::{EnrichmentRecord, ResultSet, Scheme};
use subscout_core::discovery::{Discovery, RunReport};

use crate::stubs::{StubCerts, StubHttp, StubPorts, StubResolver, Stubs, fast_config, v4};

const PAGE: &str = "<html><head><title>Hi</title></head><body>hello</body></html>";

fn domain() -> Domain {
    "example.test".parse().unwrap()
}

fn candidates(labels: &[&str]) -> CandidateSet {
    labels.iter().collect()
}

async fn run(stubs: &Stubs, ports: StubPorts, config: ScanConfig, labels: &[&str]) -> RunReport {
    let discovery: Discovery = Discovery::new(stubs.collaborators(ports), config).unwrap();
    discovery.run_with_summary(&domain(), candidates(labels)).await
}

/// One live host with an HTTP page, one candidate that does not exist.
#[tokio::test]
async fn live_host_becomes_a_single_http_record() {
    let dns: StubResolver = StubResolver::new()
        .with_record("www.example.test", v4(10, 0, 0, 1))
        .with_ptr(v4(10, 0, 0, 1), "edge-1.provider.test");
    let http: StubHttp = StubHttp::new().with_page("http://www.example.test", 200, PAGE);
    let stubs: Stubs = Stubs::new(dns, http);

    let report: RunReport = run(&stubs, StubPorts::new(), fast_config(4), &["www", "api"]).await;

    assert_eq!(report.results.len(), 1);
    let record: &EnrichmentRecord = &report.results.records()[0];
    assert_eq!(record.domain, "example.test");
    assert_eq!(record.subdomain, "www.example.test");
    assert_eq!(record.ip, v4(10, 0, 0, 1));
    assert_eq!(record.reverse_dns.as_deref(), Some("edge-1.provider.test"));
    assert_eq!(record.scheme, Scheme::Http);
    assert_eq!(record.url, "http://www.example.test");
    assert_eq!(record.status, 200);
    assert_eq!(record.length, PAGE.len());
    assert_eq!(record.title.as_deref(), Some("Hi"));
    assert_eq!(record.content_hash.len(), 64);
    assert_eq!(record.server_header.as_deref(), Some("stub/1.0"));
    assert!(record.ssl_sans.is_empty());
    assert!(record.open_ports.is_empty());

    assert_eq!(report.summary.candidates, 2);
    assert_eq!(report.summary.live, 1);
    assert_eq!(report.summary.absent, 1);
    assert!(!report.wildcard.is_present());
}

#[tokio::test]
async fn wildcard_answers_are_suppressed() {
    let dns: StubResolver = StubResolver::new()
        .with_record("www.example.test", v4(10, 0, 0, 1))
        .with_wildcard(v4(10, 9, 9, 9));
    let http: StubHttp = StubHttp::new()
        .with_page("http://www.example.test", 200, PAGE)
        .with_page("http://ghost.example.test", 200, PAGE)
        .with_page("http://phantom.example.test", 200, PAGE);
    let stubs: Stubs = Stubs::new(dns, http);

    let report: RunReport = run(
        &stubs,
        StubPorts::new(),
        fast_config(4),
        &["www", "ghost", "phantom"],
    )
    .await;

    assert_eq!(report.wildcard.addr(), Some(v4(10, 9, 9, 9)));
    assert_eq!(report.summary.wildcard, 2);
    let subdomains: Vec<&str> = report.results.iter().map(|r| r.subdomain.as_str()).collect();
    assert_eq!(subdomains, vec!["www.example.test"]);
    // Wildcard hosts are never enriched.
    assert_eq!(stubs.http.requests(), 1);
}

#[tokio::test]
async fn https_record_survives_a_dead_http_port() {
    let dns: StubResolver = StubResolver::new().with_record("secure.example.test", v4(10, 0, 0, 2));
    let http: StubHttp = StubHttp::new().with_page("https://secure.example.test", 200, PAGE);
    let stubs: Stubs =
        Stubs::new(dns, http).with_certs(StubCerts::new(&["alt.example.test"]));
    let config: ScanConfig = ScanConfig {
        https: true,
        ..fast_config(2)
    };

    let report: RunReport = run(&stubs, StubPorts::new(), config, &["secure"]).await;

    assert_eq!(report.results.len(), 1);
    let record: &EnrichmentRecord = &report.results.records()[0];
    assert_eq!(record.scheme, Scheme::Https);
    assert_eq!(record.url, "https://secure.example.test");
    assert_eq!(
        record.ssl_sans,
        vec!["secure.example.test".to_string(), "alt.example.test".to_string()]
    );
    assert_eq!(stubs.certs.calls(), 1);
}

#[tokio::test]
async fn both_schemes_share_the_port_scan() {
    let dns: StubResolver = StubResolver::new().with_record("mail.example.test", v4(10, 0, 0, 3));
    let http: StubHttp = StubHttp::new()
        .with_page("http://mail.example.test", 301, "")
        .with_page("https://mail.example.test", 200, PAGE);
    let stubs: Stubs = Stubs::new(dns, http);
    let ports: StubPorts = StubPorts::new()
        .with_open(25, Some("220 mail.example.test ESMTP"))
        .with_open(443, None)
        .with_open(8080, None);
    let config: ScanConfig = ScanConfig {
        https: true,
        ports: vec![25, 443],
        ..fast_config(2)
    };

    let report: RunReport = run(&stubs, ports, config, &["mail"]).await;

    assert_eq!(report.results.len(), 2);
    for record in &report.results {
        assert_eq!(record.open_ports, vec![25, 443]);
        assert_eq!(
            record.banners.get(&25).map(String::as_str),
            Some("220 mail.example.test ESMTP")
        );
        assert!(!record.banners.contains_key(&443));
    }

    let keys: HashSet<(&str, Scheme)> = report.results.iter().map(EnrichmentRecord::key).collect();
    assert_eq!(keys.len(), 2);
}

#[tokio::test]
async fn no_answering_scheme_means_no_record() {
    let dns: StubResolver = StubResolver::new().with_record("dark.example.test", v4(10, 0, 0, 4));
    let stubs: Stubs = Stubs::new(dns, StubHttp::new());

    let report: RunReport = run(&stubs, StubPorts::new(), fast_config(1), &["dark"]).await;

    assert!(report.results.is_empty());
    assert_eq!(report.summary.live, 1);
    // Every scheme is retried up to the attempt limit.
    assert_eq!(stubs.http.requests(), 3);
}

#[tokio::test]
async fn repeated_runs_give_the_same_results() -> anyhow::Result<()> {
    let dns: StubResolver = StubResolver::new()
        .with_record("a.example.test", v4(10, 0, 1, 1))
        .with_record("b.example.test", v4(10, 0, 1, 2))
        .with_record("c.example.test", v4(10, 0, 1, 3));
    let http: StubHttp = StubHttp::new()
        .with_page("http://a.example.test", 200, PAGE)
        .with_page("http://b.example.test", 404, "missing")
        .with_page("http://c.example.test", 500, "<title>Oops</title>");
    let stubs: Stubs = Stubs::new(dns, http);
    let discovery: Discovery = Discovery::new(stubs.collaborators(StubPorts::new()), fast_config(8))?;
    let labels: [&str; 4] = ["a", "b", "c", "d"];

    let first: ResultSet = discovery.run(&domain(), candidates(&labels)).await;
    let second: ResultSet = discovery.run(&domain(), candidates(&labels)).await;

    assert_eq!(first.len(), 3);
    assert!(first.eq_unordered(&second));
    Ok(())
}

#[tokio::test]
async fn worker_count_changes_nothing_but_parallelism() -> anyhow::Result<()> {
    let labels: Vec<String> = (0..40).map(|i| format!("host{i}")).collect();
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();

    let mut baseline: Option<ResultSet> = None;
    for workers in [1, 4, 16] {
        let mut dns: StubResolver = StubResolver::new();
        let mut http: StubHttp = StubHttp::new().with_latency(Duration::from_millis(2));
        for (i, label) in labels.iter().enumerate() {
            if i % 3 == 0 {
                continue;
            }
            let fqdn: String = format!("{label}.example.test");
            dns = dns.with_record(&fqdn, v4(10, 1, 0, i as u8));
            http = http.with_page(&format!("http://{fqdn}"), 200, PAGE);
        }
        let stubs: Stubs = Stubs::new(dns, http);

        let report: RunReport = run(&stubs, StubPorts::new(), fast_config(workers), &label_refs).await;

        assert!(
            stubs.http.peak() <= workers,
            "{} requests in flight with {workers} workers",
            stubs.http.peak()
        );
        assert_eq!(report.results.len(), 26);
        match &baseline {
            Some(expected) => assert!(report.results.eq_unordered(expected)),
            None => baseline = Some(report.results),
        }
    }
    Ok(())
}

#[tokio::test]
async fn flaky_dns_is_retried_within_the_attempt_limit() {
    let dns: StubResolver = StubResolver::new()
        .with_record("slow.example.test", v4(10, 0, 2, 1))
        .with_record("down.example.test", v4(10, 0, 2, 2))
        .failing("slow.example.test", 2)
        .failing("down.example.test", u32::MAX);
    let http: StubHttp = StubHttp::new()
        .with_page("http://slow.example.test", 200, PAGE)
        .with_page("http://down.example.test", 200, PAGE);
    let stubs: Stubs = Stubs::new(dns, http);

    let report: RunReport = run(&stubs, StubPorts::new(), fast_config(2), &["slow", "down"]).await;

    let subdomains: Vec<&str> = report.results.iter().map(|r| r.subdomain.as_str()).collect();
    assert_eq!(subdomains, vec!["slow.example.test"]);
    assert_eq!(stubs.dns.calls_for("slow.example.test"), 3);
    assert_eq!(stubs.dns.calls_for("down.example.test"), 3);
}

#[tokio::test]
async fn missing_names_are_not_retried() {
    let stubs: Stubs = Stubs::new(StubResolver::new(), StubHttp::new());

    let report: RunReport = run(&stubs, StubPorts::new(), fast_config(4), &["www"]).await;

    assert!(report.results.is_empty());
    assert_eq!(stubs.dns.calls_for("www.example.test"), 1);
    assert_eq!(report.summary.absent, 1);
}
