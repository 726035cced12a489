use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use subscout_common::models::host::{PortReport, ResolvedHost};
use subscout_common::ports::PortScanner;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

const BANNER_PROBE: &[u8] = b"HEAD / HTTP/1.0\r\n\r\n";

/// TCP connect scanner that grabs a banner from every open port.
pub struct TcpPortScanner {
    connect_timeout: Duration,
    banner_timeout: Duration,
    banner_bytes: usize,
}

impl TcpPortScanner {
    pub fn new(connect_timeout: Duration, banner_timeout: Duration, banner_bytes: usize) -> Self {
        Self {
            connect_timeout,
            banner_timeout,
            banner_bytes,
        }
    }

    /// Completes a handshake with `addr`. Refused, unreachable and timed out all read as closed.
    async fn handshake(&self, addr: SocketAddr) -> Option<TcpStream> {
        match timeout(self.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Some(stream),
            Ok(Err(_)) | Err(_) => None,
        }
    }

    /// Sends the banner probe and reads a single chunk of the reply.
    async fn grab_banner(&self, stream: &mut TcpStream) -> Option<String> {
        let exchange = async {
            stream.write_all(BANNER_PROBE).await?;
            let mut buf: Vec<u8> = vec![0u8; self.banner_bytes];
            let read: usize = stream.read(&mut buf).await?;
            buf.truncate(read);
            Ok::<Vec<u8>, std::io::Error>(buf)
        };

        match timeout(self.banner_timeout, exchange).await {
            Ok(Ok(bytes)) if !bytes.is_empty() => {
                Some(String::from_utf8_lossy(&bytes).trim().to_string())
            }
            _ => None,
        }
    }
}

#[async_trait]
impl PortScanner for TcpPortScanner {
    async fn scan(&self, host: &ResolvedHost, ports: &[u16]) -> PortReport {
        let mut open: Vec<u16> = Vec::new();
        let mut banners: BTreeMap<u16, String> = BTreeMap::new();

        for &port in ports {
            let Some(mut stream) = self.handshake(SocketAddr::new(host.addr, port)).await else {
                continue;
            };
            open.push(port);

            if let Some(banner) = self.grab_banner(&mut stream).await {
                banners.insert(port, banner);
            }
        }

        debug!(fqdn = %host.fqdn, ?open, "Port scan finished");
        PortReport { open, banners }
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
