/// TLS materialization from secure connect bundle PEM material
///
/// Builds one immutable `rustls::ClientConfig` per cluster: a root store
/// holding only the bundled CA, a client certificate/key pair for mutual
/// TLS, and TLS 1.2 as the protocol floor. The configuration is shared by
/// the metadata client and every sni endpoint; the server-name pin travels
/// next to it and is rewritten per endpoint without touching the shared
/// configuration.

use std::fmt;
use std::sync::Arc;

use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::{ClientConfig, RootCertStore};

use crate::error::TlsError;

/// An immutable TLS configuration pinned to one server name
#[derive(Clone)]
pub struct TlsMaterial {
    config: Arc<ClientConfig>,
    server_name: String,
}

impl TlsMaterial {
    /// Build a TLS configuration from PEM-encoded CA certificate, client
    /// certificate, and client key bytes, pinned to `server_name`.
    pub fn from_pem(
        ca_pem: &[u8],
        cert_pem: &[u8],
        key_pem: &[u8],
        server_name: &str,
    ) -> Result<Self, TlsError> {
        let mut roots = RootCertStore::empty();
        for cert in CertificateDer::pem_slice_iter(ca_pem) {
            let cert = cert.map_err(|e| TlsError::InvalidCa(e.to_string()))?;
            roots
                .add(cert)
                .map_err(|e| TlsError::InvalidCa(e.to_string()))?;
        }
        if roots.is_empty() {
            return Err(TlsError::InvalidCa(
                "no CA certificate found in PEM data".to_string(),
            ));
        }

        let certs = CertificateDer::pem_slice_iter(cert_pem)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TlsError::InvalidKeyPair(e.to_string()))?;
        if certs.is_empty() {
            return Err(TlsError::InvalidKeyPair(
                "no client certificate found in PEM data".to_string(),
            ));
        }
        let key = PrivateKeyDer::from_pem_slice(key_pem)
            .map_err(|e| TlsError::InvalidKeyPair(e.to_string()))?;

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(provider)
            .with_protocol_versions(&[&rustls::version::TLS13, &rustls::version::TLS12])
            .map_err(|e| TlsError::InvalidKeyPair(e.to_string()))?
            .with_root_certificates(roots)
            .with_client_auth_cert(certs, key)
            .map_err(|e| TlsError::InvalidKeyPair(e.to_string()))?;

        Ok(Self {
            config: Arc::new(config),
            server_name: server_name.to_string(),
        })
    }

    /// The shared rustls client configuration
    pub fn config(&self) -> &Arc<ClientConfig> {
        &self.config
    }

    /// The server name this configuration verifies against
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Derive the per-endpoint configuration for one cluster member.
    ///
    /// The returned material shares the underlying `ClientConfig` and pins
    /// `<host-id>.<sni-domain>`, where the sni domain is this material's
    /// original server name from the bundle.
    pub fn for_host_id(&self, host_id: &str) -> Self {
        Self {
            config: Arc::clone(&self.config),
            server_name: format!("{}.{}", host_id, self.server_name),
        }
    }
}

impl fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("server_name", &self.server_name)
            .finish_non_exhaustive()
    }
}
