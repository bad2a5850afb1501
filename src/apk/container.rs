//! Container read/write for .apk packages
//!
//! The container is a zip file with exactly three stored (uncompressed)
//! entries: the version marker, the control archive and the data archive,
//! each under its bare file name.

use crate::apk::config::FormatConfig;
use crate::exceptions::{ApkgError, Result};
use log::{debug, error};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Pack the three staged files into a container at `apk_path`.
///
/// Entries are added by their plain file names in fixed order; the staging
/// folder is looked up for each of them. The destination folder must already
/// exist; an existing container is overwritten.
pub fn write_container(staging: &Path, cfg: &FormatConfig, apk_path: &Path) -> Result<PathBuf> {
    debug!("packing container {}", apk_path.display());

    let file = File::create(apk_path)
        .map_err(|e| ApkgError::Archive(format!("can't create {}: {e}", apk_path.display())))?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for name in cfg.container_entries() {
        let source = staging.join(name);
        let mut reader = File::open(&source)
            .map_err(|e| ApkgError::Archive(format!("can't open {}: {e}", source.display())))?;

        zip.start_file(name, options)
            .map_err(|e| ApkgError::Archive(format!("can't add {name} to container: {e}")))?;
        io::copy(&mut reader, &mut zip)
            .map_err(|e| ApkgError::Archive(format!("can't write {name} to container: {e}")))?;
    }

    zip.finish()
        .map_err(|e| ApkgError::Archive(format!("can't finalize {}: {e}", apk_path.display())))?;
    Ok(apk_path.to_path_buf())
}

/// Check that a container holds the three fixed entries.
///
/// Every missing entry is reported individually through the log before the
/// overall failure is returned.
pub fn verify_container(apk_path: &Path, cfg: &FormatConfig) -> Result<()> {
    let file = File::open(apk_path).map_err(|e| {
        ApkgError::ContainerFormat(format!("can't open apk file {}: {e}", apk_path.display()))
    })?;
    let archive = ZipArchive::new(BufReader::new(file)).map_err(|_| {
        ApkgError::ContainerFormat(format!("file is not an apk file: {}", apk_path.display()))
    })?;

    if archive.len() == 0 {
        return Err(ApkgError::ContainerFormat(format!(
            "file is empty: {}",
            apk_path.display()
        )));
    }

    let names: Vec<&str> = archive.file_names().collect();
    let mut missing = Vec::new();
    for required in cfg.container_entries() {
        if !names.contains(&required) {
            error!("can't find file in apk file: {required}");
            missing.push(required);
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApkgError::ContainerFormat(format!(
            "incomplete apk file {}: missing {}",
            apk_path.display(),
            missing.join(", ")
        )))
    }
}
