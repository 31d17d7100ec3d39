/// The two connection modes behind the uniform configuration abstraction
///
/// Generic mode wraps a static contact-point list; astra mode bootstraps
/// from a secure connect bundle and refreshes its member list from the
/// metadata service.
pub mod astra;
pub mod generic;

use crate::core::ClusterType;

/// State shared by both connection modes
#[derive(Debug, Clone)]
pub(crate) struct BaseConnectionConfig {
    connection_timeout_ms: u64,
    cluster_type: ClusterType,
}

impl BaseConnectionConfig {
    pub(crate) fn new(connection_timeout_ms: u64, cluster_type: ClusterType) -> Self {
        Self {
            connection_timeout_ms,
            cluster_type,
        }
    }

    pub(crate) fn connection_timeout_ms(&self) -> u64 {
        self.connection_timeout_ms
    }

    pub(crate) fn cluster_type(&self) -> ClusterType {
        self.cluster_type
    }
}
