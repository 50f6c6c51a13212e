use crate::error::{AppError, Result};
use std::path::{Component, Path, PathBuf};

/// Forward-slash rendering of a path, independent of the host separator.
pub fn to_posix(path: &Path) -> String {
    let mut prefix = String::new();
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(p) => prefix.push_str(&p.as_os_str().to_string_lossy()),
            Component::RootDir => prefix.push('/'),
            Component::CurDir => {}
            Component::ParentDir => parts.push("..".into()),
            Component::Normal(name) => parts.push(name.to_string_lossy()),
        }
    }
    prefix + &parts.join("/")
}

/// Resolves `candidate` and returns it relative to the resolved `root`.
///
/// Both sides are canonicalized first, so symlinks and `..` segments cannot
/// smuggle a path out of the root; anything that lands outside is a
/// `PathEscape`.
pub fn safe_relative_path(root: &Path, candidate: &Path) -> Result<PathBuf> {
    let root_resolved = root.canonicalize().map_err(|e| AppError::FileRead {
        path: root.to_path_buf(),
        source: e,
    })?;
    relative_to_resolved_root(&root_resolved, candidate)
}

/// Same as [`safe_relative_path`] for a root that is already canonical.
pub(crate) fn relative_to_resolved_root(root_resolved: &Path, candidate: &Path) -> Result<PathBuf> {
    let candidate_resolved = candidate.canonicalize().map_err(|e| AppError::FileRead {
        path: candidate.to_path_buf(),
        source: e,
    })?;
    candidate_resolved
        .strip_prefix(root_resolved)
        .map(Path::to_path_buf)
        .map_err(|_| AppError::PathEscape {
            path: candidate.to_path_buf(),
            root: root_resolved.to_path_buf(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn posix_form_uses_forward_slashes() {
        let path: PathBuf = ["a", "b", "c.py"].iter().collect();
        assert_eq!(to_posix(&path), "a/b/c.py");
        assert_eq!(to_posix(Path::new("./a")), "a");
        assert_eq!(to_posix(Path::new("")), "");
    }

    #[test]
    fn relative_path_inside_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("app/sub")).unwrap();
        fs::write(dir.path().join("app/sub/x.py"), "x").unwrap();

        let rel = safe_relative_path(dir.path(), &dir.path().join("app/sub/x.py")).unwrap();
        assert_eq!(to_posix(&rel), "app/sub/x.py");

        let rel = safe_relative_path(dir.path(), &dir.path().join("app/sub/../sub")).unwrap();
        assert_eq!(to_posix(&rel), "app/sub");

        let rel = safe_relative_path(dir.path(), dir.path()).unwrap();
        assert_eq!(rel, PathBuf::new());
    }

    #[test]
    fn escaping_path_is_rejected() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(outer.path().join("secret.txt"), "s").unwrap();

        let err = safe_relative_path(&root, &root.join("../secret.txt")).unwrap_err();
        assert!(matches!(err, AppError::PathEscape { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_out_of_root_is_rejected() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("root");
        fs::create_dir(&root).unwrap();
        fs::write(outer.path().join("secret.py"), "s").unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.py"), root.join("link.py")).unwrap();

        let err = safe_relative_path(&root, &root.join("link.py")).unwrap_err();
        assert!(matches!(err, AppError::PathEscape { .. }));
    }
}
