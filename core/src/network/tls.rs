//! Certificate inspection over TLS.
//!
//! The handshake accepts any certificate chain, self-signed and expired ones included.
//! Handshake signatures are still verified.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use subscout_common::models::host::ResolvedHost;
use subscout_common::ports::CertificateInspector;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use tokio_rustls::rustls::crypto::{self, CryptoProvider};
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use tokio_rustls::rustls::{self, ClientConfig, DigitallySignedStruct, SignatureScheme};
use tracing::debug;
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::FromDer;

const HTTPS_PORT: u16 = 443;

/// [`CertificateInspector`] that reads DNS SANs from the leaf certificate on port 443.
pub struct RustlsInspector {
    connector: TlsConnector,
    /// Bounds the TCP connect and the TLS handshake separately.
    timeout: Duration,
}

impl RustlsInspector {
    pub fn new(timeout: Duration) -> Result<Self, rustls::Error> {
        let provider: Arc<CryptoProvider> = Arc::new(crypto::ring::default_provider());
        let config: ClientConfig = ClientConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider)))
            .with_no_client_auth();

        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            timeout,
        })
    }

    async fn leaf_certificate(&self, host: &ResolvedHost) -> Option<Vec<u8>> {
        let server_name: ServerName<'static> = ServerName::try_from(host.fqdn.clone()).ok()?;
        let addr: SocketAddr = SocketAddr::new(host.addr, HTTPS_PORT);

        let stream: TcpStream = timeout(self.timeout, TcpStream::connect(addr))
            .await
            .ok()?
            .ok()?;

        let tls: TlsStream<TcpStream> =
            match timeout(self.timeout, self.connector.connect(server_name, stream)).await {
                Ok(Ok(tls)) => tls,
                Ok(Err(e)) => {
                    debug!(fqdn = %host.fqdn, "TLS handshake failed: {e}");
                    return None;
                }
                Err(_elapsed) => {
                    debug!(fqdn = %host.fqdn, "TLS handshake timed out");
                    return None;
                }
            };

        let (_, session) = tls.get_ref();
        session
            .peer_certificates()
            .and_then(|chain| chain.first())
            .map(|leaf| leaf.as_ref().to_vec())
    }
}

#[async_trait]
impl CertificateInspector for RustlsInspector {
    async fn sans(&self, host: &ResolvedHost) -> Vec<String> {
        match self.leaf_certificate(host).await {
            Some(der) => dns_sans(&der),
            None => Vec::new(),
        }
    }
}

/// DNS-type Subject Alternative Names of a DER encoded certificate, in certificate order.
pub fn dns_sans(der: &[u8]) -> Vec<String> {
    let Ok((_, cert)) = X509Certificate::from_der(der) else {
        return Vec::new();
    };

    match cert.subject_alternative_name() {
        Ok(Some(extension)) => extension
            .value
            .general_names
            .iter()
            .filter_map(|name| match name {
                GeneralName::DNSName(dns) => Some(dns.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Verifier that accepts every certificate chain while still checking handshake signatures.
#[derive(Debug)]
struct AcceptAnyCertificate(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
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
