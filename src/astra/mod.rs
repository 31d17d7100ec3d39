/// Astra metadata service client
///
/// The metadata service is an HTTPS endpoint reachable only through the
/// bundle's mutual-TLS material. It reports the current sni proxy address,
/// the contact-point host-ids, and the local datacenter name.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MetadataError;
use crate::tls::TlsMaterial;

/// Metadata service response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstraMetadata {
    pub contact_info: AstraContactInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstraContactInfo {
    pub local_dc: String,
    #[serde(default)]
    pub contact_points: Vec<String>,
    pub sni_proxy_address: String,
}

/// Retrieves cluster metadata for the managed connection mode
///
/// The production implementation talks to the Astra metadata service over
/// HTTPS; tests substitute canned responders.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch(&self) -> Result<AstraMetadata, MetadataError>;
}

/// HTTPS client for `https://<host>:<port>/metadata`
pub struct AstraMetadataClient {
    host: String,
    port: String,
    tls: TlsMaterial,
    timeout: Duration,
}

impl AstraMetadataClient {
    pub fn new(host: String, port: String, tls: TlsMaterial, timeout: Duration) -> Self {
        Self {
            host,
            port,
            tls,
            timeout,
        }
    }

    fn classify(&self, err: reqwest::Error) -> MetadataError {
        if err.is_timeout() {
            MetadataError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else if err.is_decode() {
            MetadataError::Parse(err.to_string())
        } else {
            MetadataError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl MetadataFetcher for AstraMetadataClient {
    async fn fetch(&self) -> Result<AstraMetadata, MetadataError> {
        let url = format!("https://{}:{}/metadata", self.host, self.port);

        // The client carries the materialized bundle TLS configuration;
        // certificate verification against the bundled CA is mandatory.
        let client = reqwest::Client::builder()
            .use_preconfigured_tls((**self.tls.config()).clone())
            .http1_only()
            .timeout(self.timeout)
            .build()
            .map_err(|e| MetadataError::Tls(e.to_string()))?;

        let response = client.get(&url).send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Http {
                status: status.as_u16(),
            });
        }

        let metadata: AstraMetadata = response.json().await.map_err(|e| self.classify(e))?;
        if metadata.contact_info.local_dc.is_empty() {
            return Err(MetadataError::MissingLocalDc);
        }
        Ok(metadata)
    }
}

/// Split an `sni_proxy_address` of the form `host:port`.
///
/// Returns `(host, port)`; both parts are required and the port must be
/// numeric.
pub fn split_sni_proxy_address(address: &str) -> Result<(String, String), MetadataError> {
    match address.rsplit_once(':') {
        Some((host, port))
            if !host.is_empty()
                && !port.is_empty()
                && port.chars().all(|c| c.is_ascii_digit()) =>
        {
            Ok((host.to_string(), port.to_string()))
        }
        _ => Err(MetadataError::BadSniAddress {
            address: address.to_string(),
        }),
    }
}
