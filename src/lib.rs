//! apkg - NAS application package (.apk) build and conversion tool
//!
//! An .apk container is a zip file with exactly three stored entries: a
//! one-line version marker, a gzipped tar of the reserved `CONTROL` folder,
//! and a gzipped tar of the application payload with control entries
//! excluded. This crate validates a package layout, assembles that
//! container, and converts containers carrying the legacy 1.x metadata
//! schema into the current one.

#![deny(unsafe_code)]
#![warn(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]

pub mod api;
pub mod apk;
pub mod exceptions;
pub mod exit_codes;
pub mod logger;
pub mod version;

// Re-export main API functions
pub use api::{convert_package, create_package, upload_package, verify_package};
pub use apk::config::{ExclusionRule, FormatConfig};
pub use exceptions::ApkgError;
