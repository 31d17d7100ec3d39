/// Core value types shared between the generic and astra connection modes
pub mod endpoint;

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

/// Which of the two proxied clusters a configuration belongs to
///
/// Carried through verbatim; the connection subsystem never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterType {
    Origin,
    Target,
}

impl fmt::Display for ClusterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterType::Origin => write!(f, "origin"),
            ClusterType::Target => write!(f, "target"),
        }
    }
}

/// A cluster member as reported by the CQL discovery layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub address: IpAddr,
    pub port: u16,
    pub host_id: Uuid,
}

impl Host {
    pub fn new(address: IpAddr, port: u16, host_id: Uuid) -> Self {
        Self {
            address,
            port,
            host_id,
        }
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.address, self.port, self.host_id)
    }
}

/// The refreshable contact information of a managed cluster
///
/// The three fields are always replaced together under one write section;
/// readers taking the lock once observe a coherent triple. Contact points
/// are stored as host-id strings rather than materialized endpoints so
/// that endpoints can hold a handle to this state without forming an
/// ownership cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInfo {
    /// Host-ids usable as entry points into the cluster
    pub contact_points: Vec<String>,
    /// Hostname portion of the sni proxy address
    pub sni_proxy_addr: String,
    /// The full `host:port` sni proxy address as reported by the metadata service
    pub sni_proxy_endpoint: String,
}

/// Shared handle to [`ContactInfo`], updated atomically on each refresh
pub type SharedContactInfo = Arc<RwLock<ContactInfo>>;
