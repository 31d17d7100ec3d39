/// Generic connection mode: static contact points, no sni
use std::any::Any;

use async_trait::async_trait;

use crate::core::endpoint::Endpoint;
use crate::core::{ClusterType, Host};
use crate::error::PasarelaResult;
use crate::modes::BaseConnectionConfig;
use crate::tls::TlsMaterial;
use crate::ConnectionConfig;

/// Connection configuration for a self-managed cluster
///
/// Everything is fixed at construction: the contact points never change
/// and refreshing is a no-op that returns the stored list.
pub struct GenericConnectionConfig {
    base: BaseConnectionConfig,
    tls: Option<TlsMaterial>,
    datacenter: String,
    contact_points: Vec<Endpoint>,
}

impl GenericConnectionConfig {
    pub fn new(
        tls: Option<TlsMaterial>,
        connection_timeout_ms: u64,
        cluster_type: ClusterType,
        datacenter: String,
        contact_points: Vec<Endpoint>,
    ) -> Self {
        Self {
            base: BaseConnectionConfig::new(connection_timeout_ms, cluster_type),
            tls,
            datacenter,
            contact_points,
        }
    }
}

#[async_trait]
impl ConnectionConfig for GenericConnectionConfig {
    fn cluster_type(&self) -> ClusterType {
        self.base.cluster_type()
    }

    fn local_datacenter(&self) -> &str {
        &self.datacenter
    }

    fn tls_config(&self) -> Option<&TlsMaterial> {
        self.tls.as_ref()
    }

    fn uses_sni(&self) -> bool {
        false
    }

    fn connection_timeout_ms(&self) -> u64 {
        self.base.connection_timeout_ms()
    }

    fn contact_points(&self) -> Vec<Endpoint> {
        self.contact_points.clone()
    }

    async fn refresh_contact_points(&self) -> PasarelaResult<Vec<Endpoint>> {
        Ok(self.contact_points.clone())
    }

    fn create_endpoint(&self, host: &Host) -> Endpoint {
        Endpoint::new_default(host.address.to_string(), host.port)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
