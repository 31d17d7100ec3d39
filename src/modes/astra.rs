/// Astra connection mode: secure-connect-bundle bootstrap, sni routing,
/// and metadata-driven contact point refresh
use std::any::Any;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::astra::{self, AstraMetadata, AstraMetadataClient, MetadataFetcher};
use crate::bundle;
use crate::core::endpoint::Endpoint;
use crate::core::{ClusterType, ContactInfo, Host, SharedContactInfo};
use crate::error::PasarelaResult;
use crate::tls::TlsMaterial;
use crate::ConnectionConfig;

/// Connection configuration for a managed cluster behind an sni proxy
///
/// Contact points are host-ids resolved to sni endpoints at connection
/// time. The refreshable triple (contact points, sni proxy address, sni
/// proxy endpoint) lives behind a single reader-writer lock and is only
/// replaced wholesale after a successful metadata fetch; a failed refresh
/// leaves the previous snapshot untouched.
pub struct AstraConnectionConfig {
    base: super::BaseConnectionConfig,
    tls: TlsMaterial,
    datacenter: String,
    fetcher: Arc<dyn MetadataFetcher>,
    contact_info: SharedContactInfo,
}

impl AstraConnectionConfig {
    /// Bootstrap from a secure connect bundle.
    ///
    /// Reads the bundle, materializes TLS pinned to the metadata service
    /// host, and performs one metadata refresh before the configuration is
    /// handed out. Any failure aborts the whole bootstrap; no partially
    /// initialized configuration is ever observable.
    pub(crate) async fn initialize(
        bundle_path: &Path,
        connection_timeout_ms: u64,
        cluster_type: ClusterType,
    ) -> PasarelaResult<Self> {
        let files = bundle::extract_files_from_archive(bundle_path)?;

        let config_json = bundle::required_entry(&files, bundle::SCB_CONFIG)?;
        let (metadata_host, metadata_port) = bundle::parse_metadata_service_address(config_json)?;
        log::debug!(
            "{} cluster metadata service at {}:{}",
            cluster_type,
            metadata_host,
            metadata_port
        );

        let tls = TlsMaterial::from_pem(
            bundle::required_entry(&files, bundle::SCB_CA_CERT)?,
            bundle::required_entry(&files, bundle::SCB_CLIENT_CERT)?,
            bundle::required_entry(&files, bundle::SCB_CLIENT_KEY)?,
            &metadata_host,
        )?;

        let fetcher = Arc::new(AstraMetadataClient::new(
            metadata_host,
            metadata_port,
            tls.clone(),
            Duration::from_millis(connection_timeout_ms),
        ));
        Self::bootstrap_with_fetcher(fetcher, tls, connection_timeout_ms, cluster_type).await
    }

    /// Bootstrap against an already-built metadata fetcher.
    ///
    /// The local datacenter is frozen from the first successful refresh
    /// and never rewritten, even if later refreshes disagree.
    pub(crate) async fn bootstrap_with_fetcher(
        fetcher: Arc<dyn MetadataFetcher>,
        tls: TlsMaterial,
        connection_timeout_ms: u64,
        cluster_type: ClusterType,
    ) -> PasarelaResult<Self> {
        let mut config = Self {
            base: super::BaseConnectionConfig::new(connection_timeout_ms, cluster_type),
            tls,
            datacenter: String::new(),
            fetcher,
            contact_info: Arc::new(RwLock::new(ContactInfo::default())),
        };

        let (metadata, _) = config.refresh_metadata().await?;
        config.datacenter = metadata.contact_info.local_dc;
        Ok(config)
    }

    /// Hostname portion of the current sni proxy address
    pub fn sni_proxy_addr(&self) -> String {
        self.contact_info.read().sni_proxy_addr.clone()
    }

    /// The full `host:port` sni proxy address
    pub fn sni_proxy_endpoint(&self) -> String {
        self.contact_info.read().sni_proxy_endpoint.clone()
    }

    /// Coherent snapshot of the refreshable contact information
    pub fn contact_info(&self) -> ContactInfo {
        self.contact_info.read().clone()
    }

    fn endpoint_for_host_id(&self, host_id: &str) -> Endpoint {
        Endpoint::new_sni(Arc::clone(&self.contact_info), host_id, &self.tls)
    }

    /// Fetch metadata and publish the new contact information.
    ///
    /// The network call happens before the write lock is taken; the write
    /// section spans only the assignment of the three fields.
    async fn refresh_metadata(&self) -> PasarelaResult<(AstraMetadata, Vec<Endpoint>)> {
        let metadata = self.fetcher.fetch().await?;
        log::debug!("astra metadata parsed to: {:?}", metadata);

        let (sni_proxy_host, _) =
            astra::split_sni_proxy_address(&metadata.contact_info.sni_proxy_address)?;

        let endpoints: Vec<Endpoint> = metadata
            .contact_info
            .contact_points
            .iter()
            .map(|host_id| self.endpoint_for_host_id(host_id))
            .collect();

        {
            let mut info = self.contact_info.write();
            info.sni_proxy_addr = sni_proxy_host;
            info.sni_proxy_endpoint = metadata.contact_info.sni_proxy_address.clone();
            info.contact_points = metadata.contact_info.contact_points.clone();
        }

        Ok((metadata, endpoints))
    }
}

#[async_trait]
impl ConnectionConfig for AstraConnectionConfig {
    fn cluster_type(&self) -> ClusterType {
        self.base.cluster_type()
    }

    fn local_datacenter(&self) -> &str {
        &self.datacenter
    }

    fn tls_config(&self) -> Option<&TlsMaterial> {
        Some(&self.tls)
    }

    fn uses_sni(&self) -> bool {
        true
    }

    fn connection_timeout_ms(&self) -> u64 {
        self.base.connection_timeout_ms()
    }

    fn contact_points(&self) -> Vec<Endpoint> {
        let host_ids = self.contact_info.read().contact_points.clone();
        host_ids
            .iter()
            .map(|host_id| self.endpoint_for_host_id(host_id))
            .collect()
    }

    async fn refresh_contact_points(&self) -> PasarelaResult<Vec<Endpoint>> {
        let (_, endpoints) = self.refresh_metadata().await?;
        Ok(endpoints)
    }

    fn create_endpoint(&self, host: &Host) -> Endpoint {
        self.endpoint_for_host_id(&host.host_id.to_string())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
