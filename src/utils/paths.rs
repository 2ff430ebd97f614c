use std::path::{Path, PathBuf};

/// Returns an Option containing the given `PathBuf`, if the `PathBuf` points to an actual directory
pub fn some_if_dir(path: PathBuf) -> Option<PathBuf> {
    path.is_dir().then_some(path)
}

/// Joins `relative` onto `root`, unless it is already an absolute path.
///
/// LaunchBox data files usually store paths relative to the installation
/// directory, but absolute paths do occur.
pub fn resolve_against(root: &Path, relative: &str) -> PathBuf {
    let path = Path::new(relative);
    if path.is_absolute() {
        path.to_owned()
    } else {
        root.join(path)
    }
}

/// The symlink-free absolute form of `path`, or `None` when the target does
/// not exist. This is the form used as a game's deduplication key.
pub fn canonical(path: &Path) -> Option<PathBuf> {
    path.canonicalize().ok()
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn test_resolve_against() {
        assert_eq!(
            resolve_against(Path::new("/library"), "Games/rom.z64"),
            PathBuf::from("/library/Games/rom.z64")
        );
        assert_eq!(
            resolve_against(Path::new("/library"), "/elsewhere/rom.z64"),
            PathBuf::from("/elsewhere/rom.z64")
        );
    }

    #[test]
    fn test_canonical_of_missing_path() {
        assert_eq!(canonical(Path::new("/does/not/exist/anywhere")), None);
    }
}
