use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::Writer;
use serde::Serialize;
use subscout_common::error::SinkError;
use subscout_common::models::record::{EnrichmentRecord, ResultSet};
use subscout_common::ports::ResultSink;
use tracing::info;

/// Flat CSV row. Column order and names are part of the output format.
#[derive(Serialize)]
struct CsvRow<'a> {
    domain: &'a str,
    subdomain: &'a str,
    ip: String,
    reverse_dns: &'a str,
    scheme: &'a str,
    url: &'a str,
    status: u16,
    length: usize,
    title: &'a str,
    content_hash: &'a str,
    server_header: &'a str,
    ssl_sans: String,
    open_ports: String,
    banners: String,
}

impl<'a> CsvRow<'a> {
    fn from_record(record: &'a EnrichmentRecord) -> Result<Self, SinkError> {
        let open_ports: String = record
            .open_ports
            .iter()
            .map(u16::to_string)
            .collect::<Vec<String>>()
            .join(",");
        let banners: String =
            serde_json::to_string(&record.banners).map_err(|e| SinkError::Encode(e.to_string()))?;

        Ok(Self {
            domain: &record.domain,
            subdomain: &record.subdomain,
            ip: record.ip.to_string(),
            reverse_dns: record.reverse_dns.as_deref().unwrap_or_default(),
            scheme: record.scheme.as_str(),
            url: &record.url,
            status: record.status,
            length: record.length,
            title: record.title.as_deref().unwrap_or_default(),
            content_hash: &record.content_hash,
            server_header: record.server_header.as_deref().unwrap_or_default(),
            ssl_sans: record.ssl_sans.join(", "),
            open_ports,
            banners,
        })
    }
}

pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encodes `results` with a header row.
    pub fn render(results: &ResultSet) -> Result<Vec<u8>, SinkError> {
        let mut writer: Writer<Vec<u8>> = Writer::from_writer(vec![]);
        for record in results {
            let row: CsvRow<'_> = CsvRow::from_record(record)?;
            writer
                .serialize(row)
                .map_err(|e| SinkError::Encode(e.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| SinkError::Encode(e.to_string()))
    }
}

#[async_trait]
impl ResultSink for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    async fn write(&self, results: &ResultSet) -> Result<(), SinkError> {
        let data: Vec<u8> = Self::render(results)?;
        tokio::fs::write(&self.path, data).await?;
        info!("Wrote {} records to {}", results.len(), self.path.display());
        Ok(())
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
    use std::collections::BTreeMap;
    use std::net::{IpAddr, Ipv4Addr};
    use subscout_common::models::record::Scheme;
    use tempfile::TempDir;

    fn record() -> EnrichmentRecord {
        let mut banners: BTreeMap<u16, String> = BTreeMap::new();
        banners.insert(22, "SSH-2.0-OpenSSH_9.6".into());
        EnrichmentRecord {
            domain: "example.test".into(),
            subdomain: "www.example.test".into(),
            ip: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            reverse_dns: None,
            scheme: Scheme::Https,
            url: "https://www.example.test".into(),
            status: 200,
            length: 17,
            title: Some("Hi, there".into()),
            content_hash: "abc".into(),
            server_header: Some("nginx".into()),
            ssl_sans: vec!["www.example.test".into(), "example.test".into()],
            open_ports: vec![22, 443],
            banners,
        }
    }

    #[test]
    fn render_writes_header_and_flat_row() {
        let results: ResultSet = ResultSet::from(vec![record()]);
        let text: String = String::from_utf8(CsvSink::render(&results).unwrap()).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some(
                "domain,subdomain,ip,reverse_dns,scheme,url,status,length,title,content_hash,\
                 server_header,ssl_sans,open_ports,banners"
            )
        );
        assert_eq!(
            lines.next(),
            Some(
                "example.test,www.example.test,10.0.0.1,,https,https://www.example.test,200,17,\
                 \"Hi, there\",abc,nginx,\"www.example.test, example.test\",\"22,443\",\
                 \"{\"\"22\"\":\"\"SSH-2.0-OpenSSH_9.6\"\"}\""
            )
        );
        assert_eq!(lines.next(), None);
    }

    #[tokio::test]
    async fn write_creates_file() {
        let dir: TempDir = TempDir::new().unwrap();
        let sink: CsvSink = CsvSink::new(dir.path().join("results.csv"));

        sink.write(&ResultSet::from(vec![record()])).await.unwrap();

        let written: String = tokio::fs::read_to_string(sink.path()).await.unwrap();
        assert_eq!(written.lines().count(), 2);
    }

    #[tokio::test]
    async fn write_to_missing_directory_fails() {
        let dir: TempDir = TempDir::new().unwrap();
        let sink: CsvSink = CsvSink::new(dir.path().join("missing").join("results.csv"));

        let result: Result<(), SinkError> = sink.write(&ResultSet::from(vec![record()])).await;
        assert!(matches!(result, Err(SinkError::Io(_))));
    }
}
