//! Archive staging for .apk packages
//!
//! Builds the two compressed tar archives that go into the container (data
//! and control), writes the version marker, and normalizes permissions and
//! ownership of the control folder before it is archived.

use crate::apk::config::{ExclusionRule, FormatConfig};
use crate::exceptions::{ApkgError, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use log::{debug, trace};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Write the one-line version marker into the staging workspace.
pub fn write_version_marker(workspace: &Path, cfg: &FormatConfig) -> Result<PathBuf> {
    let path = workspace.join(cfg.version_entry);
    fs::write(&path, format!("{}\n", cfg.format_version))
        .map_err(|e| ApkgError::Archive(format!("can't write {}: {e}", path.display())))?;
    Ok(path)
}

/// Archive the package layout into the data archive, excluding control
/// folder entries according to the configured rule.
pub fn archive_data_dir(app_dir: &Path, dest: &Path, cfg: &FormatConfig) -> Result<()> {
    let control_dir = cfg.control_dir;
    let rule = cfg.exclusion;
    archive_dir(app_dir, dest, |rel| !is_excluded(rel, control_dir, rule))
}

/// Archive the control folder into the control archive, unfiltered.
pub fn archive_control_dir(control_dir: &Path, dest: &Path) -> Result<()> {
    archive_dir(control_dir, dest, |_| true)
}

fn archive_dir<F>(src_dir: &Path, dest: &Path, mut keep: F) -> Result<()>
where
    F: FnMut(&Path) -> bool,
{
    debug!("archiving {} -> {}", src_dir.display(), dest.display());

    let file = File::create(dest)
        .map_err(|e| ApkgError::Archive(format!("can't create {}: {e}", dest.display())))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    for entry in WalkDir::new(src_dir).min_depth(1).sort_by_file_name() {
        let entry = entry
            .map_err(|e| ApkgError::Archive(format!("can't walk {}: {e}", src_dir.display())))?;
        let rel = entry.path().strip_prefix(src_dir).map_err(|e| {
            ApkgError::Archive(format!("can't relativize {}: {e}", entry.path().display()))
        })?;

        if !keep(rel) {
            trace!("excluding {}", rel.display());
            continue;
        }

        // Entries are stored with bare relative names, rooted at "."
        let name = Path::new(".").join(rel);
        builder
            .append_path_with_name(entry.path(), &name)
            .map_err(|e| ApkgError::Archive(format!("can't add {}: {e}", rel.display())))?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|e| ApkgError::Archive(format!("can't finish {}: {e}", dest.display())))?;
    encoder
        .finish()
        .map_err(|e| ApkgError::Archive(format!("can't finish {}: {e}", dest.display())))?;
    Ok(())
}

fn is_excluded(rel: &Path, control_dir: &str, rule: ExclusionRule) -> bool {
    match rule {
        ExclusionRule::ControlSegment => rel
            .components()
            .any(|c| c.as_os_str() == control_dir),
        ExclusionRule::LegacySubstring => rel.to_string_lossy().contains(control_dir),
    }
}

/// Normalize permissions and ownership of a control folder in place.
///
/// The folder itself and every file directly inside it get fixed modes and,
/// when running as root, root ownership. Shell scripts additionally lose
/// carriage-return line endings; interpreter scripts only gain the
/// executable bit.
pub fn normalize_control_dir(control_dir: &Path, cfg: &FormatConfig) -> Result<()> {
    debug!("normalizing control folder {}", control_dir.display());

    set_mode(control_dir, cfg.control_dir_mode)?;
    take_root_ownership(control_dir)?;

    for path in glob_entries(control_dir, "*")? {
        if path.is_file() {
            set_mode(&path, cfg.control_file_mode)?;
            take_root_ownership(&path)?;
        }
    }

    for path in glob_entries(control_dir, "*.sh")? {
        set_mode(&path, cfg.script_mode)?;
        strip_crlf(&path)?;
    }

    for path in glob_entries(control_dir, "*.py")? {
        set_mode(&path, cfg.script_mode)?;
    }

    Ok(())
}

/// Copy a directory tree, preserving file permissions.
///
/// Used to stage a disposable copy of the control folder when normalization
/// must not touch the source layout.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)
        .map_err(|e| ApkgError::Archive(format!("can't create {}: {e}", dest.display())))?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry =
            entry.map_err(|e| ApkgError::Archive(format!("can't walk {}: {e}", src.display())))?;
        let rel = entry.path().strip_prefix(src).map_err(|e| {
            ApkgError::Archive(format!("can't relativize {}: {e}", entry.path().display()))
        })?;
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| ApkgError::Archive(format!("can't create {}: {e}", target.display())))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| {
                ApkgError::Archive(format!(
                    "can't copy {} -> {}: {e}",
                    entry.path().display(),
                    target.display()
                ))
            })?;
        }
    }
    Ok(())
}

fn glob_entries(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let full = dir.join(pattern);
    let full = full
        .to_str()
        .ok_or_else(|| ApkgError::Archive(format!("non-UTF-8 path: {}", dir.display())))?;

    let mut out = Vec::new();
    for entry in
        glob::glob(full).map_err(|e| ApkgError::Archive(format!("bad glob pattern: {e}")))?
    {
        out.push(entry.map_err(|e| ApkgError::Archive(format!("can't read entry: {e}")))?);
    }
    Ok(out)
}

/// Rewrite CRLF line endings to LF, leaving lone carriage returns alone.
fn strip_crlf(path: &Path) -> Result<()> {
    let data = fs::read(path)
        .map_err(|e| ApkgError::Archive(format!("can't read {}: {e}", path.display())))?;
    if !data.contains(&b'\r') {
        return Ok(());
    }

    let mut out = Vec::with_capacity(data.len());
    let mut iter = data.iter().copied().peekable();
    while let Some(byte) = iter.next() {
        if byte == b'\r' && iter.peek() == Some(&b'\n') {
            continue;
        }
        out.push(byte);
    }

    fs::write(path, out)
        .map_err(|e| ApkgError::Archive(format!("can't write {}: {e}", path.display())))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| ApkgError::Archive(format!("can't set mode on {}: {e}", path.display())))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn take_root_ownership(path: &Path) -> Result<()> {
    use nix::unistd::{Gid, Uid, chown, geteuid};

    // Ownership can only be reassigned by root; regular builds keep the
    // caller's ownership.
    if !geteuid().is_root() {
        trace!("not running as root, keeping ownership of {}", path.display());
        return Ok(());
    }

    chown(path, Some(Uid::from_raw(0)), Some(Gid::from_raw(0)))
        .map_err(|e| ApkgError::Archive(format!("can't chown {}: {e}", path.display())))
}

#[cfg(not(unix))]
fn take_root_ownership(_path: &Path) -> Result<()> {
    Ok(())
}
