//! Package assembly pipeline
//!
//! Validates a package layout, stages the version marker and the two tar
//! archives in a private temporary workspace, and packs them into the final
//! container. The workspace is removed on every exit path; the destination
//! folder only ever sees the finished container.

use crate::apk::config::FormatConfig;
use crate::apk::{archive, container, metadata, validate};
use crate::exceptions::{ApkgError, Result};
use log::info;
use std::path::{Path, PathBuf};
use std::{env, path};

/// Build a container from a package layout folder.
///
/// `destination` defaults to the current working directory and is assumed to
/// exist. Returns the absolute path of the produced container.
///
/// # Errors
///
/// Fails with a typed error before anything is written when the layout, the
/// metadata document, or its required fields are invalid. Filesystem failures
/// while staging or packing abort the whole operation.
pub fn create(folder: &Path, destination: Option<&Path>, cfg: &FormatConfig) -> Result<PathBuf> {
    let app_dir = path::absolute(folder)?;
    if !app_dir.is_dir() {
        return Err(ApkgError::Layout(format!(
            "directory doesn't exist: {}",
            app_dir.display()
        )));
    }

    validate::check_layout(&app_dir, cfg)?;
    let control_dir = app_dir.join(cfg.control_dir);

    let workspace = tempfile::Builder::new()
        .prefix(cfg.tmp_prefix)
        .tempdir()
        .map_err(|e| ApkgError::Archive(format!("can't create temp workspace: {e}")))?;

    // Historic behavior mutates the source layout; the staged mode keeps the
    // source untouched by normalizing a disposable copy instead.
    let control_src = if cfg.normalize_in_place {
        archive::normalize_control_dir(&control_dir, cfg)?;
        control_dir.clone()
    } else {
        let staged = workspace.path().join(cfg.control_dir);
        archive::copy_tree(&control_dir, &staged)?;
        archive::normalize_control_dir(&staged, cfg)?;
        staged
    };

    let meta = metadata::read_package_metadata(&control_src, cfg)?;
    validate::check_required_fields(&meta.general)?;

    let general = &meta.general;
    let package = general.package.as_deref().unwrap_or_default();
    let version = general.version.as_deref().unwrap_or_default();
    let architecture = general.architecture.as_deref().unwrap_or_default();
    validate::check_package_name(package)?;

    info!("📦 building {package} {version} ({architecture})");

    archive::write_version_marker(workspace.path(), cfg)?;
    archive::archive_data_dir(&app_dir, &workspace.path().join(cfg.data_entry), cfg)?;
    archive::archive_control_dir(&control_src, &workspace.path().join(cfg.control_entry))?;

    let dest_dir = match destination {
        Some(dir) => path::absolute(dir)?,
        None => env::current_dir()?,
    };
    let apk_path = dest_dir.join(cfg.container_file_name(package, version, architecture));

    container::write_container(workspace.path(), cfg, &apk_path)?;
    info!("✅ created {}", apk_path.display());

    Ok(apk_path)
    // workspace drops here; removal is best-effort on success and failure
}
