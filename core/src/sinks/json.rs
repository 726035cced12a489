use std::path::{Path, PathBuf};

use async_trait::async_trait;
use subscout_common::error::SinkError;
use subscout_common::models::record::ResultSet;
use subscout_common::ports::ResultSink;
use tracing::info;

pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(results: &ResultSet) -> Result<Vec<u8>, SinkError> {
        serde_json::to_vec_pretty(results).map_err(|e| SinkError::Encode(e.to_string()))
    }
}

#[async_trait]
impl ResultSink for JsonSink {
    fn name(&self) -> &str {
        "json"
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
    use serde_json::Value;
    use std::collections::BTreeMap;
    use std::net::{IpAddr, Ipv4Addr};
    use subscout_common::models::record::{EnrichmentRecord, Scheme};
    use tempfile::TempDir;

    fn results() -> ResultSet {
        let mut banners: BTreeMap<u16, String> = BTreeMap::new();
        banners.insert(80, "HTTP/1.0 200 OK".into());
        ResultSet::from(vec![EnrichmentRecord {
            domain: "example.test".into(),
            subdomain: "www.example.test".into(),
            ip: IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            reverse_dns: Some("host.provider.test".into()),
            scheme: Scheme::Http,
            url: "http://www.example.test".into(),
            status: 200,
            length: 17,
            title: None,
            content_hash: "abc".into(),
            server_header: None,
            ssl_sans: vec![],
            open_ports: vec![80],
            banners,
        }])
    }

    #[test]
    fn render_produces_nested_records() {
        let value: Value = serde_json::from_slice(&JsonSink::render(&results()).unwrap()).unwrap();

        let record: &Value = &value[0];
        assert_eq!(record["scheme"], "http");
        assert_eq!(record["ip"], "10.0.0.1");
        assert_eq!(record["title"], Value::Null);
        assert_eq!(record["open_ports"][0], 80);
        assert_eq!(record["banners"]["80"], "HTTP/1.0 200 OK");
    }

    #[tokio::test]
    async fn written_file_reads_back_as_result_set() {
        let dir: TempDir = TempDir::new().unwrap();
        let sink: JsonSink = JsonSink::new(dir.path().join("results.json"));

        sink.write(&results()).await.unwrap();

        let bytes: Vec<u8> = tokio::fs::read(sink.path()).await.unwrap();
        let parsed: ResultSet = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, results());
    }
}
