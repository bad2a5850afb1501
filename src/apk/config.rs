//! Format configuration for .apk packages
//!
//! All fixed names and modes of the packaging format live in one immutable
//! value that is passed into each component, so nothing reaches for hidden
//! process-wide state.

/// How the data archive decides that an entry belongs to the control folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionRule {
    /// Exclude entries with a path component equal to the control folder name.
    ControlSegment,
    /// Exclude any entry whose path string contains the control folder name
    /// anywhere. This reproduces the historic packer, which also drops
    /// legitimately named payload entries that happen to contain the name.
    LegacySubstring,
}

/// Immutable description of the .apk container format.
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Packaging format version written into the version marker
    pub format_version: &'static str,
    /// Extension of the final container file
    pub container_suffix: &'static str,

    /// Container entry holding the format version marker
    pub version_entry: &'static str,
    /// Container entry holding the control archive
    pub control_entry: &'static str,
    /// Container entry holding the data archive
    pub data_entry: &'static str,

    /// Reserved control folder name inside a package layout
    pub control_dir: &'static str,
    /// Package metadata file inside the control folder
    pub config_file: &'static str,
    /// Changelog text file inside the control folder
    pub changelog_file: &'static str,
    /// Description text file inside the control folder
    pub description_file: &'static str,
    /// Icon image inside the control folder
    pub icon_file: &'static str,

    /// Mode applied to the control folder itself
    pub control_dir_mode: u32,
    /// Mode applied to plain files directly inside the control folder
    pub control_file_mode: u32,
    /// Mode applied to lifecycle/interpreter scripts in the control folder
    pub script_mode: u32,

    /// Exclusion rule used when building the data archive
    pub exclusion: ExclusionRule,
    /// Normalize permissions on the source layout (historic behavior) instead
    /// of on a staged copy of the control folder
    pub normalize_in_place: bool,

    /// Prefix for per-invocation temporary workspaces
    pub tmp_prefix: &'static str,
}

impl Default for FormatConfig {
    fn default() -> Self {
        FormatConfig {
            format_version: "2.0",
            container_suffix: "apk",
            version_entry: "apkg-version",
            control_entry: "control.tar.gz",
            data_entry: "data.tar.gz",
            control_dir: "CONTROL",
            config_file: "config.json",
            changelog_file: "changelog.txt",
            description_file: "description.txt",
            icon_file: "icon.png",
            control_dir_mode: 0o755,
            control_file_mode: 0o644,
            script_mode: 0o755,
            exclusion: ExclusionRule::ControlSegment,
            normalize_in_place: true,
            tmp_prefix: "APKG-",
        }
    }
}

impl FormatConfig {
    /// The three fixed container entries, in packing order.
    pub fn container_entries(&self) -> [&'static str; 3] {
        [self.version_entry, self.control_entry, self.data_entry]
    }

    /// File name of the final container for the given package identity.
    pub fn container_file_name(&self, package: &str, version: &str, architecture: &str) -> String {
        format!(
            "{}_{}_{}.{}",
            package, version, architecture, self.container_suffix
        )
    }

    /// Name of the destination folder the converter repacks into.
    pub fn convert_dir_name(&self) -> String {
        format!("apk-{}", self.format_version)
    }
}
