pub mod astra;
pub mod bundle;
pub mod config;
/// Pasarela - cluster connection configuration for a dual-cluster CQL migration proxy
///
/// The proxy fronts two independent clusters ("origin" and "target") and
/// needs, for each of them, a uniform way to reach its members. Pasarela
/// hides two radically different deployment modes behind one abstraction:
///
/// 1. Generic mode: a static list of host:port contact points, endpoints
///    built directly from discovered hosts, no SNI.
/// 2. Astra mode: bootstrap from a secure connect bundle; contact points
///    are host-ids rewritten into SNI server names aimed at a single
///    sni-terminating proxy, with the member list refreshed from an HTTPS
///    metadata service.
pub mod core;
pub mod error;
pub mod modes;
pub mod tls;

use std::any::Any;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::endpoint::Endpoint;
use crate::core::{ClusterType, Host};
use crate::error::PasarelaResult;
use crate::modes::astra::AstraConnectionConfig;
use crate::modes::generic::GenericConnectionConfig;
use crate::tls::TlsMaterial;

/// The uniform cluster-connection abstraction
///
/// One instance exists per cluster per proxy process and lives until
/// shutdown. All reads are non-blocking memory accesses; only
/// [`refresh_contact_points`](ConnectionConfig::refresh_contact_points)
/// performs I/O, and only in astra mode.
#[async_trait]
pub trait ConnectionConfig: Send + Sync {
    /// Which cluster this configuration belongs to
    fn cluster_type(&self) -> ClusterType;

    /// The local datacenter; in astra mode frozen from the first
    /// successful metadata refresh
    fn local_datacenter(&self) -> &str;

    /// Cluster-level TLS configuration, if any
    fn tls_config(&self) -> Option<&TlsMaterial>;

    /// Whether connections go through an sni-terminating proxy
    fn uses_sni(&self) -> bool;

    /// Timeout applied to connection establishment and metadata requests
    fn connection_timeout_ms(&self) -> u64;

    /// Snapshot of the current contact points
    fn contact_points(&self) -> Vec<Endpoint>;

    /// Refresh the contact point list.
    ///
    /// Generic mode returns the configured list and never fails. Astra
    /// mode re-queries the metadata service; on failure the previously
    /// published contact information stays in place and the caller
    /// decides whether to retry.
    async fn refresh_contact_points(&self) -> PasarelaResult<Vec<Endpoint>>;

    /// Build the endpoint for one discovered cluster member
    fn create_endpoint(&self, host: &Host) -> Endpoint;

    /// Downcast support for mode-specific accessors
    ///
    /// Callers needing the sni proxy address check [`uses_sni`] first and
    /// downcast to [`AstraConnectionConfig`].
    fn as_any(&self) -> &dyn Any;
}

/// Factory inputs for [`initialize_connection_config`]
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    /// Path to a secure connect bundle; empty selects generic mode
    pub secure_connect_bundle_path: String,
    /// Generic-mode contact points (hostnames or IPs)
    pub contact_points: Vec<String>,
    /// Default port for generic-mode contact points
    pub port: u16,
    pub connection_timeout_ms: u64,
    pub cluster_type: ClusterType,
    /// Generic-mode datacenter; astra mode overrides it from metadata
    pub datacenter: String,
}

/// Build the connection configuration for one cluster.
///
/// Bootstrap is all-or-nothing: either a fully initialized configuration
/// is returned or an error, never a partially built one.
pub async fn initialize_connection_config(
    params: ConnectionParams,
) -> PasarelaResult<Arc<dyn ConnectionConfig>> {
    if !params.secure_connect_bundle_path.is_empty() {
        let config = AstraConnectionConfig::initialize(
            Path::new(&params.secure_connect_bundle_path),
            params.connection_timeout_ms,
            params.cluster_type,
        )
        .await?;
        log::info!(
            "initialized astra connection config for {} cluster, local datacenter {}",
            config.cluster_type(),
            config.local_datacenter()
        );
        Ok(Arc::new(config))
    } else {
        let contact_points = params
            .contact_points
            .iter()
            .map(|contact_point| Endpoint::new_default(contact_point.clone(), params.port))
            .collect();
        log::info!(
            "initialized generic connection config for {} cluster with {} contact points",
            params.cluster_type,
            params.contact_points.len()
        );
        Ok(Arc::new(GenericConnectionConfig::new(
            None,
            params.connection_timeout_ms,
            params.cluster_type,
            params.datacenter,
            contact_points,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BundleError, PasarelaError};
    use std::io::Write;
    use uuid::Uuid;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn generic_params() -> ConnectionParams {
        ConnectionParams {
            secure_connect_bundle_path: String::new(),
            contact_points: vec![
                "10.0.0.1".to_string(),
                "10.0.0.2".to_string(),
                "10.0.0.3".to_string(),
            ],
            port: 9042,
            connection_timeout_ms: 5000,
            cluster_type: ClusterType::Origin,
            datacenter: "dc1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_generic_mode_three_contact_points() {
        let config = initialize_connection_config(generic_params()).await.unwrap();

        assert!(!config.uses_sni());
        assert_eq!(config.cluster_type(), ClusterType::Origin);
        assert_eq!(config.local_datacenter(), "dc1");
        assert_eq!(config.connection_timeout_ms(), 5000);
        assert!(config.tls_config().is_none());

        let contact_points = config.contact_points();
        assert_eq!(contact_points.len(), 3);
        for (endpoint, address) in contact_points.iter().zip(["10.0.0.1", "10.0.0.2", "10.0.0.3"])
        {
            assert_eq!(endpoint.address(), address);
            assert_eq!(endpoint.port(), 9042);
            assert_eq!(endpoint.server_name(), None);
        }

        let refreshed = config.refresh_contact_points().await.unwrap();
        assert_eq!(refreshed, contact_points);
    }

    #[tokio::test]
    async fn test_generic_mode_create_endpoint() {
        let config = initialize_connection_config(generic_params()).await.unwrap();
        let host = Host::new("10.0.0.7".parse().unwrap(), 9042, Uuid::new_v4());

        let endpoint = config.create_endpoint(&host);
        assert_eq!(endpoint.address(), "10.0.0.7");
        assert_eq!(endpoint.port(), 9042);
    }

    #[tokio::test]
    async fn test_missing_bundle_aborts_bootstrap() {
        let params = ConnectionParams {
            secure_connect_bundle_path: "/nonexistent/bundle.zip".to_string(),
            contact_points: Vec::new(),
            port: 9042,
            connection_timeout_ms: 5000,
            cluster_type: ClusterType::Target,
            datacenter: String::new(),
        };

        let result = initialize_connection_config(params).await;
        assert!(matches!(
            result,
            Err(PasarelaError::Bundle(BundleError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_bundle_missing_ca_cert_aborts_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = dir.path().join("bundle.zip");
        let file = std::fs::File::create(&bundle_path).unwrap();
        let mut writer = ZipWriter::new(file);
        for (name, bytes) in [
            ("cert", b"cert bytes".as_slice()),
            ("key", b"key bytes".as_slice()),
            (
                "config.json",
                br#"{"host":"metadata.example","port":31443}"#.as_slice(),
            ),
        ] {
            writer
                .start_file(name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();

        let params = ConnectionParams {
            secure_connect_bundle_path: bundle_path.display().to_string(),
            contact_points: Vec::new(),
            port: 9042,
            connection_timeout_ms: 5000,
            cluster_type: ClusterType::Target,
            datacenter: String::new(),
        };

        let err = match initialize_connection_config(params).await {
            Ok(_) => panic!("expected bootstrap to fail"),
            Err(err) => err,
        };
        match err {
            PasarelaError::Bundle(BundleError::MissingEntry { name }) => {
                assert_eq!(name, "ca.crt")
            }
            other => panic!("expected missing ca.crt, got {other}"),
        }
    }
}
