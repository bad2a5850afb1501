//! CLI command handlers
//!
//! Thin wrappers that turn API results into printed messages and process
//! exit codes. Only `create` is wired into the argument parser today;
//! `convert` and `upload` are reachable through the library.

use crate::exceptions::ApkgError;
use crate::exit_codes::{
    EXIT_ARCHIVE_ERROR, EXIT_CONFIG_ERROR, EXIT_CONTAINER_ERROR, EXIT_IO_ERROR, EXIT_LAYOUT_ERROR,
    EXIT_SUCCESS, EXIT_UNSUPPORTED,
};
use crate::api;
use std::path::Path;

/// Run the create pipeline and report the produced container path.
pub fn run_create(folder: &Path, destination: Option<&Path>) -> i32 {
    match api::create_package(folder, destination) {
        Ok(path) => {
            println!("{}", path.display());
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            exit_code_for(&e)
        }
    }
}

/// Run the legacy converter against an existing container.
pub fn run_convert(package: &Path) -> i32 {
    match api::convert_package(package) {
        Ok(path) => {
            println!("{}", path.display());
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            exit_code_for(&e)
        }
    }
}

/// Run the upload stub.
pub fn run_upload(package: &Path) -> i32 {
    match api::upload_package(package) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            exit_code_for(&e)
        }
    }
}

/// Map an error to the binary's exit-code table.
pub fn exit_code_for(err: &ApkgError) -> i32 {
    match err {
        ApkgError::Layout(_) => EXIT_LAYOUT_ERROR,
        ApkgError::Metadata(_) | ApkgError::FieldValidation(_) | ApkgError::Json(_) => {
            EXIT_CONFIG_ERROR
        }
        ApkgError::Archive(_) => EXIT_ARCHIVE_ERROR,
        ApkgError::ContainerFormat(_) => EXIT_CONTAINER_ERROR,
        ApkgError::Unsupported(_) => EXIT_UNSUPPORTED,
        ApkgError::Io(_) => EXIT_IO_ERROR,
    }
}
