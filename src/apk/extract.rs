//! Container extraction
//!
//! Rebuilds a package layout from an existing container: the data archive
//! lands at the layout root, the control archive inside the control folder.
//! Used by the legacy converter as its first step.

use crate::apk::config::FormatConfig;
use crate::apk::container;
use crate::exceptions::{ApkgError, Result};
use flate2::read::GzDecoder;
use log::debug;
use std::fs::{self, File};
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Extract a container into `dest_dir`, recreating the package layout.
///
/// The layout folder is named after the container file stem and replaces any
/// leftover folder of the same name. Returns the layout path.
pub fn extract_container(apk_path: &Path, dest_dir: &Path, cfg: &FormatConfig) -> Result<PathBuf> {
    container::verify_container(apk_path, cfg)?;

    let stem = apk_path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            ApkgError::ContainerFormat(format!(
                "bad package file name: {}",
                apk_path.display()
            ))
        })?;
    let layout_dir = dest_dir.join(stem);

    if layout_dir.exists() {
        fs::remove_dir_all(&layout_dir).map_err(|e| {
            ApkgError::Archive(format!("can't clear {}: {e}", layout_dir.display()))
        })?;
    }
    fs::create_dir_all(&layout_dir).map_err(|e| {
        ApkgError::Archive(format!("can't create {}: {e}", layout_dir.display()))
    })?;

    debug!(
        "extracting {} -> {}",
        apk_path.display(),
        layout_dir.display()
    );

    let file = File::open(apk_path).map_err(|e| {
        ApkgError::ContainerFormat(format!("can't open apk file {}: {e}", apk_path.display()))
    })?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|_| {
        ApkgError::ContainerFormat(format!("file is not an apk file: {}", apk_path.display()))
    })?;

    unpack_entry(&mut zip, cfg.data_entry, &layout_dir)?;
    unpack_entry(&mut zip, cfg.control_entry, &layout_dir.join(cfg.control_dir))?;

    Ok(layout_dir)
}

fn unpack_entry(
    zip: &mut ZipArchive<BufReader<File>>,
    name: &str,
    dest: &Path,
) -> Result<()> {
    let mut entry = zip
        .by_name(name)
        .map_err(|e| ApkgError::ContainerFormat(format!("can't read {name}: {e}")))?;
    let mut data = Vec::new();
    entry
        .read_to_end(&mut data)
        .map_err(|e| ApkgError::ContainerFormat(format!("can't read {name}: {e}")))?;

    fs::create_dir_all(dest)
        .map_err(|e| ApkgError::Archive(format!("can't create {}: {e}", dest.display())))?;

    let mut tar = tar::Archive::new(GzDecoder::new(Cursor::new(data)));
    tar.unpack(dest)
        .map_err(|e| ApkgError::Archive(format!("can't unpack {name}: {e}")))?;
    Ok(())
}
