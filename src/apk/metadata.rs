//! Package metadata structures and reader
//!
//! The metadata file is a JSON document with a `general` section carrying the
//! package identity plus optional desktop and registration sections that are
//! passed through untouched. The reader is selected by the packaging format
//! version, which is a property of the format itself, not of the package.

use crate::apk::config::FormatConfig;
use crate::exceptions::{ApkgError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Top-level package metadata document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub general: GeneralSection,
    #[serde(
        rename = "adm-desktop",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub desktop: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register: Option<Value>,
    /// Unknown sections ride along unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `general` section of the metadata document
///
/// Only `package`, `version`, `architecture` and `firmware` are required;
/// everything else is descriptive and kept as raw JSON so repacking preserves
/// whatever shape the author used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GeneralSection {
    /// Required fields paired with their values, in validation order.
    pub fn required_fields(&self) -> [(&'static str, Option<&str>); 4] {
        [
            ("package", self.package.as_deref()),
            ("version", self.version.as_deref()),
            ("architecture", self.architecture.as_deref()),
            ("firmware", self.firmware.as_deref()),
        ]
    }
}

/// Read the package metadata file from a control folder, selecting the parser
/// by the packaging format version.
///
/// # Errors
///
/// Returns `ApkgError::Metadata` when the file cannot be opened or parsed, or
/// when the format version is not a recognized one.
pub fn read_package_metadata(control_dir: &Path, cfg: &FormatConfig) -> Result<PackageMetadata> {
    match cfg.format_version {
        "1.0" => read_v1(control_dir, cfg),
        "2.0" | "2.1" => read_v2(control_dir, cfg),
        other => Err(ApkgError::Metadata(format!(
            "unsupported package format version: {other}"
        ))),
    }
}

// The 1.0 document still parses with the 2.x reader; the split stays so the
// two can diverge without touching callers.
fn read_v1(control_dir: &Path, cfg: &FormatConfig) -> Result<PackageMetadata> {
    read_v2(control_dir, cfg)
}

fn read_v2(control_dir: &Path, cfg: &FormatConfig) -> Result<PackageMetadata> {
    let path = control_dir.join(cfg.config_file);
    log::debug!("reading package metadata: {}", path.display());

    let file = File::open(&path).map_err(|e| {
        ApkgError::Metadata(format!("can't open config file {}: {e}", path.display()))
    })?;
    let metadata = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        ApkgError::Metadata(format!("can't parse config file {}: {e}", path.display()))
    })?;
    Ok(metadata)
}

/// Serialize a metadata document back to disk.
///
/// Keeps the historic on-disk shape: three-space indent and a trailing
/// newline.
pub fn write_package_metadata(path: &Path, metadata: &PackageMetadata) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"   ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    metadata.serialize(&mut ser)?;
    buf.push(b'\n');
    fs::write(path, buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, cfg: &FormatConfig, body: &str) {
        fs::write(dir.join(cfg.config_file), body).unwrap();
    }

    #[test]
    fn test_read_minimal_metadata() {
        let tmp = TempDir::new().unwrap();
        let cfg = FormatConfig::default();
        write_config(
            tmp.path(),
            &cfg,
            r#"{"general":{"package":"myapp","version":"1.0.0","architecture":"x86_64","firmware":"2.0"}}"#,
        );

        let meta = read_package_metadata(tmp.path(), &cfg).unwrap();
        assert_eq!(meta.general.package.as_deref(), Some("myapp"));
        assert_eq!(meta.general.firmware.as_deref(), Some("2.0"));
        assert!(meta.desktop.is_none());
    }

    #[test]
    fn test_unknown_sections_are_kept() {
        let tmp = TempDir::new().unwrap();
        let cfg = FormatConfig::default();
        write_config(
            tmp.path(),
            &cfg,
            r#"{"general":{"package":"a","version":"1","architecture":"any","firmware":"2.0","vendor":"acme"},"custom":{"x":1}}"#,
        );

        let meta = read_package_metadata(tmp.path(), &cfg).unwrap();
        assert!(meta.extra.contains_key("custom"));
        assert_eq!(
            meta.general.extra.get("vendor").and_then(|v| v.as_str()),
            Some("acme")
        );
    }

    #[test]
    fn test_unsupported_format_version() {
        let tmp = TempDir::new().unwrap();
        let cfg = FormatConfig {
            format_version: "9.9",
            ..FormatConfig::default()
        };
        write_config(tmp.path(), &cfg, r#"{"general":{}}"#);

        let err = read_package_metadata(tmp.path(), &cfg).unwrap_err();
        assert!(err.to_string().contains("unsupported package format version"));
    }

    #[test]
    fn test_v1_reader_matches_v2() {
        let tmp = TempDir::new().unwrap();
        let body =
            r#"{"general":{"package":"a","version":"1","architecture":"any","firmware":"2.0"}}"#;
        let v1 = FormatConfig {
            format_version: "1.0",
            ..FormatConfig::default()
        };
        write_config(tmp.path(), &v1, body);

        let meta = read_package_metadata(tmp.path(), &v1).unwrap();
        assert_eq!(meta.general.package.as_deref(), Some("a"));
    }

    #[test]
    fn test_write_round_trip() {
        let tmp = TempDir::new().unwrap();
        let cfg = FormatConfig::default();
        write_config(
            tmp.path(),
            &cfg,
            r#"{"general":{"package":"a","version":"1","architecture":"any","firmware":"2.0"},"register":{"port":[8080]}}"#,
        );

        let meta = read_package_metadata(tmp.path(), &cfg).unwrap();
        let out = tmp.path().join("rewritten.json");
        write_package_metadata(&out, &meta).unwrap();

        let body = fs::read_to_string(&out).unwrap();
        assert!(body.ends_with('\n'));
        let reparsed: PackageMetadata = serde_json::from_str(&body).unwrap();
        assert_eq!(reparsed.general.package.as_deref(), Some("a"));
        assert!(reparsed.register.is_some());
    }
}
