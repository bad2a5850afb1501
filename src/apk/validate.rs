//! Layout and metadata field validation

use crate::apk::config::FormatConfig;
use crate::apk::metadata::GeneralSection;
use crate::exceptions::{ApkgError, Result};
use std::path::Path;

/// Character set allowed in the package field, as shown to the user
const PACKAGE_NAME_CHARS: &str = "[a-zA-Z0-9.+-]";

/// Check that a package layout has the reserved control folder and the
/// metadata file inside it. Read-only; checks short-circuit in order.
///
/// # Errors
///
/// Returns `ApkgError::Layout` naming the first missing path.
pub fn check_layout(app_dir: &Path, cfg: &FormatConfig) -> Result<()> {
    let control_dir = app_dir.join(cfg.control_dir);
    if !control_dir.is_dir() {
        return Err(ApkgError::Layout(format!(
            "{} folder not found: {}",
            cfg.control_dir,
            control_dir.display()
        )));
    }

    let config_file = control_dir.join(cfg.config_file);
    if !config_file.is_file() {
        return Err(ApkgError::Layout(format!(
            "config file not found: {}",
            config_file.display()
        )));
    }

    if !control_dir.join(cfg.icon_file).is_file() {
        log::debug!("control folder has no {}", cfg.icon_file);
    }

    Ok(())
}

/// Check the required fields of the `general` section.
///
/// A missing key and a present-but-blank value are reported as distinct
/// failures; both abort the operation.
pub fn check_required_fields(general: &GeneralSection) -> Result<()> {
    for (field, value) in general.required_fields() {
        match value {
            None => {
                return Err(ApkgError::FieldValidation(format!(
                    "missing field: {field}"
                )));
            }
            Some(v) if v.trim().is_empty() => {
                return Err(ApkgError::FieldValidation(format!("empty field: {field}")));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn is_allowed_package_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-')
}

/// Check that the package name only uses the allowed character set.
pub fn check_package_name(package: &str) -> Result<()> {
    if package.chars().all(is_allowed_package_char) {
        Ok(())
    } else {
        Err(ApkgError::FieldValidation(format!(
            "package field contains invalid characters (valid characters {PACKAGE_NAME_CHARS})"
        )))
    }
}
