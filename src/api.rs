//! High-level API for apkg operations

use crate::apk::config::FormatConfig;
use crate::apk::{builder, container, legacy};
use crate::exceptions::{ApkgError, Result};
use std::path::{Path, PathBuf};

/// Build a container from a package layout folder.
///
/// `destination` defaults to the current working directory. Returns the
/// absolute path of the produced container.
pub fn create_package(folder: &Path, destination: Option<&Path>) -> Result<PathBuf> {
    let cfg = FormatConfig::default();
    builder::create(folder, destination, &cfg)
}

/// Convert a legacy container into the current format.
///
/// The result lands in an `apk-2.0` folder under the current working
/// directory.
pub fn convert_package(package: &Path) -> Result<PathBuf> {
    let cfg = FormatConfig::default();
    legacy::convert(package, None, &cfg)
}

/// Check that a container holds the three fixed entries.
pub fn verify_package(package: &Path) -> Result<()> {
    let cfg = FormatConfig::default();
    container::verify_container(package, &cfg)
}

/// Upload stub; reports the operation as unsupported once the file exists.
pub fn upload_package(package: &Path) -> Result<()> {
    let path = std::path::absolute(package)?;
    if !path.is_file() {
        return Err(ApkgError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("file doesn't exist: {}", path.display()),
        )));
    }
    Err(ApkgError::Unsupported("upload".to_string()))
}
