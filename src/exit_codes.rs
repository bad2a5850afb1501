//! Standard exit codes for the apkg binary
//!
//! These exit codes give scripts that drive apkg a stable way to tell
//! layout problems apart from metadata problems and plain IO failures.

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// Generic error (avoid using - be more specific)
pub const EXIT_ERROR: i32 = 1;

/// Panic or unrecoverable error
pub const EXIT_PANIC: i32 = 101;

/// Container format error (not a zip, missing fixed entries)
pub const EXIT_CONTAINER_ERROR: i32 = 102;

/// Layout error (missing control folder or config file)
pub const EXIT_LAYOUT_ERROR: i32 = 103;

/// Archive error (tar/gzip failure while staging)
pub const EXIT_ARCHIVE_ERROR: i32 = 104;

/// I/O error (file not found, permission denied, disk error)
pub const EXIT_IO_ERROR: i32 = 106;

/// Metadata error (unparseable config, bad or missing fields)
pub const EXIT_CONFIG_ERROR: i32 = 109;

/// Operation is recognized but not supported
pub const EXIT_UNSUPPORTED: i32 = 110;
