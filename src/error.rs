/// Unified error handling for pasarela
///
/// This module provides the error type system covering every failure path
/// in the connection-configuration subsystem: secure connect bundle
/// extraction, TLS materialization, metadata service retrieval, and
/// proxy-level configuration loading.

use thiserror::Error;

/// Main error type for pasarela operations
#[derive(Debug, Error)]
pub enum PasarelaError {
    /// Secure connect bundle errors
    #[error("secure connect bundle error: {0}")]
    Bundle(#[from] BundleError),

    /// TLS materialization errors
    #[error("TLS error: {0}")]
    Tls(#[from] TlsError),

    /// Metadata service errors
    #[error("metadata service error: {0}")]
    Metadata(#[from] MetadataError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Secure connect bundle errors
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("secure connect bundle not found: {path}")]
    NotFound { path: String },

    #[error("secure connect bundle is not a valid zip archive: {0}")]
    Malformed(String),

    #[error("bundle entry {name} is {size} bytes, exceeding the {limit} byte limit")]
    EntryTooLarge { name: String, size: u64, limit: u64 },

    #[error("bundle uncompressed size exceeds the {limit} byte limit")]
    ArchiveTooLarge { limit: u64 },

    #[error("bundle contains duplicate entry: {name}")]
    DuplicateEntry { name: String },

    #[error("bundle is missing required entry: {name}")]
    MissingEntry { name: String },

    #[error("could not parse bundle config.json: {0}")]
    ConfigParse(String),

    #[error("incomplete metadata service contact information. hostname: {host:?}, port: {port:?}")]
    IncompleteMetadata { host: String, port: String },
}

/// TLS materialization errors
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("invalid CA certificate: {0}")]
    InvalidCa(String),

    #[error("invalid client certificate or key: {0}")]
    InvalidKeyPair(String),
}

/// Metadata service errors
///
/// All of these are recoverable at refresh time: a failed refresh never
/// touches the previously published contact information.
#[derive(Debug, Clone, Error)]
pub enum MetadataError {
    #[error("metadata request failed: {0}")]
    Network(String),

    #[error("metadata TLS setup failed: {0}")]
    Tls(String),

    #[error("metadata service returned HTTP status {status}")]
    Http { status: u16 },

    #[error("could not parse metadata response: {0}")]
    Parse(String),

    #[error("could not split sni proxy hostname and port: {address:?}")]
    BadSniAddress { address: String },

    #[error("metadata request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("metadata response carries an empty local datacenter")]
    MissingLocalDc,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Result type alias for pasarela operations
pub type PasarelaResult<T> = Result<T, PasarelaError>;

impl PasarelaError {
    /// Check if this error is recoverable (can retry)
    ///
    /// Bundle, TLS, and configuration failures are bootstrap-fatal. Metadata
    /// failures surface at refresh time and leave the last successful
    /// contact information in place, so the caller may retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PasarelaError::Metadata(_))
    }
}
