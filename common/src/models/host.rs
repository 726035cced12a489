use std::collections::BTreeMap;
use std::net::IpAddr;

/// A candidate that resolved to a network address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedHost {
    pub fqdn: String,
    pub addr: IpAddr,
}

impl ResolvedHost {
    pub fn new(fqdn: impl Into<String>, addr: IpAddr) -> Self {
        Self {
            fqdn: fqdn.into(),
            addr,
        }
    }
}

/// Address returned for a name that cannot exist under the target domain.
///
/// Written once before any candidate is resolved and only read afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WildcardSignature(Option<IpAddr>);

impl WildcardSignature {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn addr(&self) -> Option<IpAddr> {
        self.0
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    /// `true` when `addr` is the wildcard address, i.e. a false positive.
    pub fn matches(&self, addr: &IpAddr) -> bool {
        self.0.as_ref() == Some(addr)
    }
}

impl From<Option<IpAddr>> for WildcardSignature {
    fn from(addr: Option<IpAddr>) -> Self {
        Self(addr)
    }
}

/// Result of scanning the configured TCP ports of one host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortReport {
    /// Open ports, in the order they were configured.
    pub open: Vec<u16>,
    /// Banner text per open port. Ports that sent nothing have no entry.
    pub banners: BTreeMap<u16, String>,
}

/// Raw HTTP response handed back by an [`crate::ports::HttpProber`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub server: Option<String>,
    pub body: Vec<u8>,
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
    use std::net::Ipv4Addr;

    #[test]
    fn wildcard_signature_matches_only_its_address() {
        let a: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let b: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2));

        let signature: WildcardSignature = WildcardSignature::from(Some(a));
        assert!(signature.is_present());
        assert!(signature.matches(&a));
        assert!(!signature.matches(&b));

        let empty: WildcardSignature = WildcardSignature::none();
        assert!(!empty.is_present());
        assert!(!empty.matches(&a));
    }
}
