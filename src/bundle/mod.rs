/// Secure connect bundle extraction
///
/// A secure connect bundle is a zip archive distributed out-of-band. It
/// carries the TLS material (`ca.crt`, `cert`, `key`) and a `config.json`
/// naming the metadata service to bootstrap from. The whole archive is
/// read into memory once during bootstrap; no file handle outlives the
/// extraction.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use serde::Deserialize;
use zip::ZipArchive;

use crate::error::BundleError;

/// CA certificate entry name
pub const SCB_CA_CERT: &str = "ca.crt";
/// Client certificate entry name
pub const SCB_CLIENT_CERT: &str = "cert";
/// Client key entry name
pub const SCB_CLIENT_KEY: &str = "key";
/// Metadata service contact information entry name
pub const SCB_CONFIG: &str = "config.json";

/// Maximum uncompressed size of a single bundle entry
pub const MAX_ENTRY_BYTES: u64 = 1024 * 1024;
/// Maximum total uncompressed size of the bundle
pub const MAX_ARCHIVE_BYTES: u64 = 10 * 1024 * 1024;

/// Read every entry of the bundle at `path` into memory.
///
/// Rejects archives with entries above [`MAX_ENTRY_BYTES`], archives whose
/// total uncompressed size exceeds [`MAX_ARCHIVE_BYTES`], and archives
/// with duplicate entry names.
pub fn extract_files_from_archive(
    path: &Path,
) -> Result<HashMap<String, Vec<u8>>, BundleError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => BundleError::NotFound {
            path: path.display().to_string(),
        },
        _ => BundleError::Malformed(e.to_string()),
    })?;

    let mut archive = ZipArchive::new(file).map_err(|e| BundleError::Malformed(e.to_string()))?;

    let mut files = HashMap::new();
    let mut total_bytes = 0u64;
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| BundleError::Malformed(e.to_string()))?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        if entry.size() > MAX_ENTRY_BYTES {
            return Err(BundleError::EntryTooLarge {
                name,
                size: entry.size(),
                limit: MAX_ENTRY_BYTES,
            });
        }
        total_bytes += entry.size();
        if total_bytes > MAX_ARCHIVE_BYTES {
            return Err(BundleError::ArchiveTooLarge {
                limit: MAX_ARCHIVE_BYTES,
            });
        }

        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| BundleError::Malformed(e.to_string()))?;
        if files.insert(name.clone(), bytes).is_some() {
            return Err(BundleError::DuplicateEntry { name });
        }
    }

    log::debug!(
        "extracted {} entries ({} bytes) from secure connect bundle {}",
        files.len(),
        total_bytes,
        path.display()
    );
    Ok(files)
}

/// Look up a required bundle entry by name
pub fn required_entry<'a>(
    files: &'a HashMap<String, Vec<u8>>,
    name: &str,
) -> Result<&'a [u8], BundleError> {
    files
        .get(name)
        .map(Vec::as_slice)
        .ok_or_else(|| BundleError::MissingEntry {
            name: name.to_string(),
        })
}

#[derive(Debug, Deserialize)]
struct ScbConfig {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    port: Option<PortValue>,
}

/// `config.json` ships the port as either a number or a numeric string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u64),
    Text(String),
}

/// Parse the metadata service `(host, port)` out of the bundle's `config.json`.
///
/// Both fields are required and non-empty.
pub fn parse_metadata_service_address(
    config_json: &[u8],
) -> Result<(String, String), BundleError> {
    let config: ScbConfig =
        serde_json::from_slice(config_json).map_err(|e| BundleError::ConfigParse(e.to_string()))?;

    let host = config.host.unwrap_or_default();
    let port = match config.port {
        Some(PortValue::Number(n)) => n.to_string(),
        Some(PortValue::Text(s)) => s,
        None => String::new(),
    };

    if host.is_empty() || port.is_empty() {
        return Err(BundleError::IncompleteMetadata { host, port });
    }
    Ok((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_bundle(dir: &Path, entries: &[(&str, &[u8])]) -> std::path::PathBuf {
        let path = dir.join("bundle.zip");
        let file = File::create(&path).unwrap();
        let mut writer = ZipWriter::new(file);
        for (name, bytes) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn test_extracts_all_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bundle(
            dir.path(),
            &[
                (SCB_CA_CERT, b"ca bytes"),
                (SCB_CLIENT_CERT, b"cert bytes"),
                (SCB_CLIENT_KEY, b"key bytes"),
                (SCB_CONFIG, br#"{"host":"metadata.example","port":31443}"#),
            ],
        );

        let files = extract_files_from_archive(&path).unwrap();
        assert_eq!(files.len(), 4);
        assert_eq!(required_entry(&files, SCB_CA_CERT).unwrap(), b"ca bytes");
        assert_eq!(required_entry(&files, SCB_CLIENT_KEY).unwrap(), b"key bytes");
    }

    #[test]
    fn test_missing_bundle_file() {
        let result = extract_files_from_archive(Path::new("/nonexistent/bundle.zip"));
        assert!(matches!(result, Err(BundleError::NotFound { .. })));
    }

    #[test]
    fn test_not_a_zip_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        std::fs::write(&path, b"plainly not a zip").unwrap();

        let result = extract_files_from_archive(&path);
        assert!(matches!(result, Err(BundleError::Malformed(_))));
    }

    #[test]
    fn test_missing_entry_is_reported_by_name() {
        let files = HashMap::new();
        let err = required_entry(&files, SCB_CA_CERT).unwrap_err();
        match err {
            BundleError::MissingEntry { name } => assert_eq!(name, "ca.crt"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_oversized_entry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let oversized = vec![0u8; (MAX_ENTRY_BYTES + 1) as usize];
        let path = write_bundle(dir.path(), &[("cert", &oversized)]);

        let result = extract_files_from_archive(&path);
        assert!(matches!(result, Err(BundleError::EntryTooLarge { .. })));
    }

    #[test]
    fn test_oversized_archive_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let entry = vec![0u8; MAX_ENTRY_BYTES as usize];
        let entries: Vec<(String, &[u8])> = (0..11)
            .map(|i| (format!("file-{i}"), entry.as_slice()))
            .collect();
        let borrowed: Vec<(&str, &[u8])> = entries
            .iter()
            .map(|(name, bytes)| (name.as_str(), *bytes))
            .collect();
        let path = write_bundle(dir.path(), &borrowed);

        let result = extract_files_from_archive(&path);
        assert!(matches!(result, Err(BundleError::ArchiveTooLarge { .. })));
    }

    #[test]
    fn test_duplicate_entry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bundle(dir.path(), &[("cert", b"first"), ("cert", b"second")]);

        let result = extract_files_from_archive(&path);
        assert!(matches!(result, Err(BundleError::DuplicateEntry { .. })));
    }

    #[test]
    fn test_parse_config_with_numeric_port() {
        let (host, port) =
            parse_metadata_service_address(br#"{"host":"metadata.example","port":31443}"#).unwrap();
        assert_eq!(host, "metadata.example");
        assert_eq!(port, "31443");
    }

    #[test]
    fn test_parse_config_with_string_port() {
        let (host, port) =
            parse_metadata_service_address(br#"{"host":"metadata.example","port":"31443"}"#)
                .unwrap();
        assert_eq!(host, "metadata.example");
        assert_eq!(port, "31443");
    }

    #[test]
    fn test_parse_config_ignores_unknown_fields() {
        let (host, port) = parse_metadata_service_address(
            br#"{"host":"metadata.example","port":31443,"keyspace":"ks","region":"eu-west-1"}"#,
        )
        .unwrap();
        assert_eq!(host, "metadata.example");
        assert_eq!(port, "31443");
    }

    #[test]
    fn test_parse_config_missing_host() {
        let result = parse_metadata_service_address(br#"{"port":31443}"#);
        assert!(matches!(
            result,
            Err(BundleError::IncompleteMetadata { .. })
        ));
    }

    #[test]
    fn test_parse_config_empty_port() {
        let result = parse_metadata_service_address(br#"{"host":"metadata.example","port":""}"#);
        assert!(matches!(
            result,
            Err(BundleError::IncompleteMetadata { .. })
        ));
    }

    #[test]
    fn test_parse_config_invalid_json() {
        let result = parse_metadata_service_address(b"{ host: ");
        assert!(matches!(result, Err(BundleError::ConfigParse(_))));
    }
}
