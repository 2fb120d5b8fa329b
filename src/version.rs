//! PBN format versions.

use std::fmt;

/// Version announced by a `% PBN x.y` directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PbnVersion {
    /// A directive was present but names a version we do not know.
    Unknown,
    /// The document has no version directive.
    #[default]
    NotSpecified,
    V1_0,
    V2_0,
    V2_1,
}

impl PbnVersion {
    /// Map a version string from a directive. Unrecognized strings give `Unknown`.
    pub fn from_version_string(s: &str) -> Self {
        match s {
            "1.0" => PbnVersion::V1_0,
            "2.0" => PbnVersion::V2_0,
            "2.1" => PbnVersion::V2_1,
            _ => PbnVersion::Unknown,
        }
    }
}

impl fmt::Display for PbnVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PbnVersion::Unknown => "unknown",
            PbnVersion::NotSpecified => "not specified",
            PbnVersion::V1_0 => "1.0",
            PbnVersion::V2_0 => "2.0",
            PbnVersion::V2_1 => "2.1",
        };
        f.write_str(s)
    }
}
