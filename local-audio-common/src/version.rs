//! Index version marker and staleness check

use crate::Result;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// A `major.minor.patch` version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(pub u32, pub u32, pub u32);

/// Versions whose index layout changed; an older index must be rebuilt
pub const UPDATE_VERSIONS: &[Version] = &[Version(1, 3, 0)];

impl Version {
    /// The version of this crate, which is the version every new index gets
    pub fn current() -> Self {
        env!("CARGO_PKG_VERSION")
            .parse()
            .unwrap_or(Version(0, 0, 0))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0, self.1, self.2)
    }
}

impl FromStr for Version {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || crate::Error::InvalidInput(format!("Invalid version: {:?}", s));
        let parts = s
            .trim()
            .split('.')
            .map(|part| part.parse::<u32>().map_err(|_| invalid()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [major, minor, patch] => Ok(Version(*major, *minor, *patch)),
            _ => Err(invalid()),
        }
    }
}

/// True if an index built at `previous` must be rebuilt to reach `latest`
///
/// An index from the latest version or newer is never stale. Otherwise it
/// is stale when some update version in `(previous, latest]` exists.
pub fn update_check(previous: Version, latest: Version, update_versions: &[Version]) -> bool {
    if previous >= latest {
        return false;
    }
    update_versions
        .iter()
        .any(|&version| previous < version && version <= latest)
}

/// Read the version marker; None if it is missing or malformed
pub fn read_version_marker(path: &Path) -> Option<Version> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            debug!("Cannot read version marker {}: {}", path.display(), e);
            return None;
        }
    };
    text.parse().ok()
}

/// Record that the index was built by this version
pub fn write_version_marker(path: &Path, version: Version) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, version.to_string())?;
    Ok(())
}

/// True if the marker forces a rebuild for the current version
pub fn marker_requires_rebuild(path: &Path) -> bool {
    match read_version_marker(path) {
        Some(previous) => {
            let latest = Version::current();
            let stale = update_check(previous, latest, UPDATE_VERSIONS);
            if stale {
                info!("Index version {} is older than required for {}", previous, latest);
            }
            stale
        }
        None => {
            info!("Missing or malformed version marker {}", path.display());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_and_display() {
        let version: Version = " 1.4.0\n".parse().unwrap();
        assert_eq!(version, Version(1, 4, 0));
        assert_eq!(version.to_string(), "1.4.0");

        assert!("1.4".parse::<Version>().is_err());
        assert!("1.4.x".parse::<Version>().is_err());
        assert!("1.4.0.1".parse::<Version>().is_err());
    }

    #[test]
    fn test_current_version() {
        assert_eq!(Version::current().to_string(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_update_check() {
        let list = [Version(1, 3, 0), Version(1, 6, 0)];

        // Already at or past the latest version
        assert!(!update_check(Version(1, 6, 0), Version(1, 6, 0), &list));
        assert!(!update_check(Version(1, 7, 0), Version(1, 6, 0), &list));

        // An update version lies after the stored one
        assert!(update_check(Version(1, 2, 0), Version(1, 3, 0), &list));
        assert!(update_check(Version(1, 2, 0), Version(1, 4, 0), &list));
        assert!(update_check(Version(1, 5, 9), Version(1, 6, 0), &list));

        // No update version between stored and latest
        assert!(!update_check(Version(1, 3, 0), Version(1, 5, 0), &list));
        assert!(!update_check(Version(1, 4, 0), Version(1, 5, 0), &list));

        // Update versions beyond latest do not count
        assert!(!update_check(Version(1, 2, 0), Version(1, 2, 5), &list));
        assert!(!update_check(Version(1, 3, 1), Version(1, 5, 0), &list));

        assert!(!update_check(Version(1, 0, 0), Version(2, 0, 0), &[]));
    }

    #[test]
    fn test_marker_round_trip() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("user_files").join("db_version.txt");

        assert_eq!(read_version_marker(&marker), None);
        assert!(marker_requires_rebuild(&marker));

        write_version_marker(&marker, Version::current()).unwrap();
        assert_eq!(read_version_marker(&marker), Some(Version::current()));
        assert!(!marker_requires_rebuild(&marker));
    }

    #[test]
    fn test_malformed_marker_requires_rebuild() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("db_version.txt");
        std::fs::write(&marker, "garbage").unwrap();
        assert!(marker_requires_rebuild(&marker));
    }

    #[test]
    fn test_marker_before_update_version_requires_rebuild() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("db_version.txt");
        write_version_marker(&marker, Version(1, 2, 0)).unwrap();
        assert!(marker_requires_rebuild(&marker));
    }
}
