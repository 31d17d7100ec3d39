/// Endpoint model: one network destination per cluster contact
use std::fmt;

use crate::core::SharedContactInfo;
use crate::tls::TlsMaterial;

/// Identifies one network destination for connection establishment
///
/// Two flavors by construction: a default endpoint carries a literal
/// address and port; an sni endpoint addresses the cluster's sni proxy
/// and selects the member through the TLS server name. Sni endpoints
/// resolve the proxy address through the shared contact information on
/// every read, so endpoints handed out before a refresh follow it.
#[derive(Clone)]
pub enum Endpoint {
    Default {
        address: String,
        port: u16,
    },
    Sni {
        contact_info: SharedContactInfo,
        host_id: String,
        tls: TlsMaterial,
    },
}

impl Endpoint {
    /// An endpoint reached directly at `address:port`, no TLS override
    pub fn new_default(address: impl Into<String>, port: u16) -> Self {
        Endpoint::Default {
            address: address.into(),
            port,
        }
    }

    /// An endpoint reached through the sni proxy, selected by `host_id`
    ///
    /// The endpoint's TLS material shares the cluster configuration with
    /// the server name rewritten to `<host-id>.<sni-domain>`.
    pub fn new_sni(
        contact_info: SharedContactInfo,
        host_id: impl Into<String>,
        cluster_tls: &TlsMaterial,
    ) -> Self {
        let host_id = host_id.into();
        let tls = cluster_tls.for_host_id(&host_id);
        Endpoint::Sni {
            contact_info,
            host_id,
            tls,
        }
    }

    /// The network address to dial
    pub fn address(&self) -> String {
        match self {
            Endpoint::Default { address, .. } => address.clone(),
            Endpoint::Sni { contact_info, .. } => contact_info.read().sni_proxy_addr.clone(),
        }
    }

    /// The port to dial
    ///
    /// For sni endpoints the stored proxy address carries no port; it is
    /// recovered from the full `host:port` proxy endpoint string.
    pub fn port(&self) -> u16 {
        match self {
            Endpoint::Default { port, .. } => *port,
            Endpoint::Sni { contact_info, .. } => {
                let info = contact_info.read();
                info.sni_proxy_endpoint
                    .rsplit_once(':')
                    .and_then(|(_, port)| port.parse().ok())
                    .unwrap_or(0)
            }
        }
    }

    /// The TLS server name override, if any
    pub fn server_name(&self) -> Option<&str> {
        match self {
            Endpoint::Default { .. } => None,
            Endpoint::Sni { host_id, .. } => Some(host_id),
        }
    }

    /// Per-endpoint TLS configuration; absent means cluster-level TLS applies
    pub fn tls_config(&self) -> Option<&TlsMaterial> {
        match self {
            Endpoint::Default { .. } => None,
            Endpoint::Sni { tls, .. } => Some(tls),
        }
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
            && self.port() == other.port()
            && self.server_name() == other.server_name()
    }
}

impl Eq for Endpoint {}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address(), self.port())
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Default { address, port } => f
                .debug_struct("Endpoint::Default")
                .field("address", address)
                .field("port", port)
                .finish(),
            Endpoint::Sni { host_id, tls, .. } => f
                .debug_struct("Endpoint::Sni")
                .field("address", &self.address())
                .field("port", &self.port())
                .field("host_id", host_id)
                .field("tls_server_name", &tls.server_name())
                .finish(),
        }
    }
}
