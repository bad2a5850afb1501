//! Legacy (1.x) metadata schema and one-way conversion to the current format
//!
//! Old packages carry their identity in an `app` section, desktop entries in
//! `desktop` and registration data in `install`. Conversion remaps those into
//! the current `general` / `adm-desktop` / `register` shape, splits changelog
//! and description into standalone text files, and repacks the layout with
//! the regular assembly pipeline.

use crate::apk::config::FormatConfig;
use crate::apk::metadata::{self, GeneralSection, PackageMetadata};
use crate::apk::{builder, extract};
use crate::exceptions::{ApkgError, Result};
use log::info;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::{env, path};

/// Top-level legacy metadata document
#[derive(Debug, Deserialize)]
pub struct LegacyMetadata {
    pub app: LegacyApp,
    #[serde(default)]
    pub desktop: LegacyDesktop,
    #[serde(default)]
    pub install: LegacyInstall,
}

/// Legacy `app` section; identity fields are mandatory, the two text blobs
/// are optional.
#[derive(Debug, Deserialize)]
pub struct LegacyApp {
    pub package: String,
    pub name: Value,
    pub version: String,
    pub depends: Value,
    pub conflicts: Value,
    pub maintainer: Value,
    pub email: Value,
    pub website: Value,
    pub architecture: String,
    #[serde(default)]
    pub changes: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Legacy `desktop` section; absent substructures default to empty.
#[derive(Debug, Default, Deserialize)]
pub struct LegacyDesktop {
    #[serde(default)]
    pub icon: Map<String, Value>,
    #[serde(default)]
    pub privilege: Map<String, Value>,
}

/// Legacy `install` section; absent substructures default to empty.
#[derive(Debug, Default, Deserialize)]
pub struct LegacyInstall {
    #[serde(default)]
    pub link: Map<String, Value>,
    #[serde(default)]
    pub share: Vec<Value>,
    #[serde(default, rename = "service-reg")]
    pub service_reg: LegacyServiceReg,
    #[serde(default, rename = "dep-service")]
    pub dep_service: LegacyDepService,
}

#[derive(Debug, Default, Deserialize)]
pub struct LegacyServiceReg {
    #[serde(default)]
    pub priority: Map<String, Value>,
    #[serde(default)]
    pub port: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LegacyDepService {
    #[serde(default)]
    pub start: Vec<Value>,
    #[serde(default)]
    pub restart: Vec<Value>,
}

/// Remap a legacy document into the current schema.
///
/// Returns the new document plus the extracted changelog and description
/// texts (trimmed; `None` when absent or blank).
pub fn convert_legacy_metadata(
    old: LegacyMetadata,
    cfg: &FormatConfig,
) -> (PackageMetadata, Option<String>, Option<String>) {
    let app = old.app;

    let general = GeneralSection {
        package: Some(app.package),
        name: Some(app.name),
        version: Some(app.version),
        depends: Some(app.depends),
        conflicts: Some(app.conflicts),
        // Old packages never carried a developer field; the website doubles
        // as the best available value.
        developer: Some(app.website.clone()),
        maintainer: Some(app.maintainer),
        email: Some(app.email),
        website: Some(app.website),
        architecture: Some(app.architecture),
        firmware: Some(cfg.format_version.to_string()),
        extra: Map::new(),
    };

    let mut icon = old.desktop.icon;
    icon.remove("title");
    let desktop = json!({
        "app": icon,
        "privilege": old.desktop.privilege,
    });

    let mut boot_priority = Map::new();
    if let Some(start) = old.install.service_reg.priority.get("start") {
        boot_priority.insert("start-order".to_string(), start.clone());
    }
    if let Some(stop) = old.install.service_reg.priority.get("stop") {
        boot_priority.insert("stop-order".to_string(), stop.clone());
    }
    let register = json!({
        "symbolic-link": old.install.link,
        "share-folder": old.install.share,
        "port": old.install.service_reg.port,
        "boot-priority": boot_priority,
        "prerequisites": {
            "enable-service": old.install.dep_service.start,
            "restart-service": old.install.dep_service.restart,
        },
    });

    let changelog = app
        .changes
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    let description = app
        .description
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let meta = PackageMetadata {
        general,
        desktop: Some(desktop),
        register: Some(register),
        extra: Map::new(),
    };
    (meta, changelog, description)
}

/// Convert a legacy container into a current-format one.
///
/// Extracts the container into a scratch layout, rewrites its metadata to
/// the current schema, then repacks it into `<dest_root>/apk-<version>/`
/// (dest_root defaults to the working directory; the subfolder is created
/// when missing). The scratch layout is removed on every exit path.
pub fn convert(package: &Path, dest_root: Option<&Path>, cfg: &FormatConfig) -> Result<PathBuf> {
    let package = path::absolute(package)?;

    let scratch = tempfile::Builder::new()
        .prefix(cfg.tmp_prefix)
        .tempdir()
        .map_err(|e| ApkgError::Archive(format!("can't create temp workspace: {e}")))?;

    let layout = extract::extract_container(&package, scratch.path(), cfg)?;
    let control_dir = layout.join(cfg.control_dir);
    let config_file = control_dir.join(cfg.config_file);

    let file = File::open(&config_file).map_err(|e| {
        ApkgError::Metadata(format!(
            "can't open config file {}: {e}",
            config_file.display()
        ))
    })?;
    let old: LegacyMetadata = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        ApkgError::Metadata(format!(
            "can't parse legacy config {}: {e}",
            config_file.display()
        ))
    })?;

    let (new_meta, changelog, description) = convert_legacy_metadata(old, cfg);
    metadata::write_package_metadata(&config_file, &new_meta)?;

    if let Some(text) = changelog {
        fs::write(control_dir.join(cfg.changelog_file), format!("{text}\n"))?;
    }
    if let Some(text) = description {
        fs::write(control_dir.join(cfg.description_file), format!("{text}\n"))?;
    }

    let dest_root = match dest_root {
        Some(dir) => path::absolute(dir)?,
        None => env::current_dir()?,
    };
    let convert_dir = dest_root.join(cfg.convert_dir_name());
    if !convert_dir.exists() {
        fs::create_dir(&convert_dir)?;
    }

    let apk = builder::create(&layout, Some(&convert_dir), cfg)?;
    info!("convert success: {}", apk.display());

    Ok(apk)
    // scratch drops here; the extraction workspace is removed best-effort
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apk::{archive, container};
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    const LEGACY_CONFIG: &str = r#"{
        "app": {
            "package": "oldapp",
            "name": "Old App",
            "version": "0.9.0",
            "depends": [],
            "conflicts": [],
            "maintainer": "Maintainer",
            "email": "dev@example.com",
            "website": "https://example.com",
            "architecture": "x86_64",
            "changes": "  fixed things  ",
            "description": "An old application"
        },
        "desktop": {
            "icon": {"title": "Old App", "path": "icon.png"}
        },
        "install": {
            "service-reg": {
                "priority": {"start": 80},
                "port": [8080]
            }
        }
    }"#;

    fn parse_legacy(body: &str) -> LegacyMetadata {
        serde_json::from_str(body).unwrap()
    }

    fn build_legacy_container(root: &Path, cfg: &FormatConfig) -> PathBuf {
        let layout = root.join("oldapp_0.9.0_x86_64");
        fs::create_dir_all(layout.join(cfg.control_dir)).unwrap();
        fs::write(
            layout.join(cfg.control_dir).join(cfg.config_file),
            LEGACY_CONFIG,
        )
        .unwrap();
        fs::write(layout.join("index.html"), "<html></html>").unwrap();

        let staging = root.join("staging");
        fs::create_dir(&staging).unwrap();
        // Old containers carry their own version marker; content is not
        // checked by the pre-conversion verification.
        fs::write(staging.join(cfg.version_entry), "1.0\n").unwrap();
        archive::archive_data_dir(&layout, &staging.join(cfg.data_entry), cfg).unwrap();
        archive::archive_control_dir(
            &layout.join(cfg.control_dir),
            &staging.join(cfg.control_entry),
        )
        .unwrap();

        let apk = root.join("oldapp_0.9.0_x86_64.apk");
        container::write_container(&staging, cfg, &apk).unwrap();
        apk
    }

    #[test]
    fn test_remap_fields() {
        let cfg = FormatConfig::default();
        let (meta, changelog, description) =
            convert_legacy_metadata(parse_legacy(LEGACY_CONFIG), &cfg);

        let general = &meta.general;
        assert_eq!(general.package.as_deref(), Some("oldapp"));
        assert_eq!(general.firmware.as_deref(), Some("2.0"));
        assert_eq!(
            general.developer.as_ref().and_then(|v| v.as_str()),
            Some("https://example.com")
        );
        assert_eq!(
            general.website.as_ref().and_then(|v| v.as_str()),
            Some("https://example.com")
        );

        // Icon keeps its path but loses the obsolete title
        let desktop = meta.desktop.unwrap();
        assert!(desktop["app"].get("title").is_none());
        assert_eq!(desktop["app"]["path"], "icon.png");

        let register = meta.register.unwrap();
        assert_eq!(register["port"][0], 8080);
        assert_eq!(register["boot-priority"]["start-order"], 80);
        assert!(register["boot-priority"].get("stop-order").is_none());
        assert_eq!(register["symbolic-link"], json!({}));
        assert_eq!(register["share-folder"], json!([]));
        assert_eq!(register["prerequisites"]["enable-service"], json!([]));

        assert_eq!(changelog.as_deref(), Some("fixed things"));
        assert_eq!(description.as_deref(), Some("An old application"));
    }

    #[test]
    fn test_remap_defaults_absent_sections() {
        let cfg = FormatConfig::default();
        let minimal = r#"{
            "app": {
                "package": "p", "name": "n", "version": "1",
                "depends": [], "conflicts": [], "maintainer": "m",
                "email": "e", "website": "w", "architecture": "any"
            }
        }"#;
        let (meta, changelog, description) =
            convert_legacy_metadata(parse_legacy(minimal), &cfg);

        let desktop = meta.desktop.unwrap();
        assert_eq!(desktop["app"], json!({}));
        assert_eq!(desktop["privilege"], json!({}));

        let register = meta.register.unwrap();
        assert_eq!(register["boot-priority"], json!({}));
        assert_eq!(register["prerequisites"]["restart-service"], json!([]));

        assert!(changelog.is_none());
        assert!(description.is_none());
    }

    #[test]
    fn test_convert_repacks_container() {
        let tmp = TempDir::new().unwrap();
        let cfg = FormatConfig::default();
        let old_apk = build_legacy_container(tmp.path(), &cfg);

        let dest_root = tmp.path().join("dest");
        fs::create_dir(&dest_root).unwrap();
        let new_apk = convert(&old_apk, Some(&dest_root), &cfg).unwrap();

        assert_eq!(
            new_apk,
            dest_root.join("apk-2.0").join("oldapp_0.9.0_x86_64.apk")
        );
        container::verify_container(&new_apk, &cfg).unwrap();

        // The repacked control archive carries the rewritten config plus the
        // extracted text files
        let mut zip = zip::ZipArchive::new(File::open(&new_apk).unwrap()).unwrap();
        let mut bytes = Vec::new();
        zip.by_name(cfg.control_entry)
            .unwrap()
            .read_to_end(&mut bytes)
            .unwrap();

        let mut config_body = String::new();
        let mut changelog_body = String::new();
        let mut names = Vec::new();
        let mut archive = tar::Archive::new(GzDecoder::new(&bytes[..]));
        for entry in archive.entries().unwrap() {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().into_owned();
            if name == "./config.json" {
                entry.read_to_string(&mut config_body).unwrap();
            } else if name == "./changelog.txt" {
                entry.read_to_string(&mut changelog_body).unwrap();
            }
            names.push(name);
        }
        assert!(names.contains(&"./description.txt".to_string()));
        assert_eq!(changelog_body, "fixed things\n");

        let meta: PackageMetadata = serde_json::from_str(&config_body).unwrap();
        assert_eq!(meta.general.package.as_deref(), Some("oldapp"));
        assert_eq!(meta.general.firmware.as_deref(), Some("2.0"));
        // The text blobs moved out of the document into their own files
        assert!(!config_body.contains("fixed things"));
        assert!(!config_body.contains("An old application"));
    }

    #[test]
    fn test_convert_rejects_broken_container() {
        let tmp = TempDir::new().unwrap();
        let cfg = FormatConfig::default();
        let bogus = tmp.path().join("broken.apk");
        fs::write(&bogus, "not a zip").unwrap();

        let err = convert(&bogus, Some(tmp.path()), &cfg).unwrap_err();
        assert!(matches!(err, ApkgError::ContainerFormat(_)));
    }
}
