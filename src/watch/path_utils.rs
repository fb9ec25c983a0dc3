// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Path, PathBuf};

/// Rewrite an event path so it starts with `root` when it refers to a file
/// inside `root`.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize the event's *parent* directory and try again. The
///   file itself may already be gone, so it is not canonicalized.
/// - Otherwise the path is returned unchanged and will be ignored later.
pub fn normalize_event_path(root: &Path, path: &Path) -> PathBuf {
    // Fast path: event path already starts with our root.
    if path.starts_with(root) {
        return path.to_path_buf();
    }

    // Notably macOS reports /private/var/... for /var/... temp dirs.
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        if let (Ok(root_canon), Ok(parent_canon)) = (root.canonicalize(), parent.canonicalize()) {
            if parent_canon.starts_with(&root_canon) {
                let rel = parent_canon.strip_prefix(&root_canon).unwrap_or(Path::new(""));
                return root.join(rel).join(name);
            }
        }
    }

    path.to_path_buf()
}

/// Name of `path` relative to `root` when it is a *direct* child of `root`.
pub fn direct_child_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut components = rel.components();
    let first = components.next()?;
    if components.next().is_some() {
        return None;
    }
    first.as_os_str().to_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_children_only() {
        let root = Path::new("/site/templates");
        assert_eq!(
            direct_child_name(root, Path::new("/site/templates/index.html")).as_deref(),
            Some("index.html")
        );
        assert_eq!(direct_child_name(root, Path::new("/site/templates/a/b.html")), None);
        assert_eq!(direct_child_name(root, Path::new("/site/templates")), None);
        assert_eq!(direct_child_name(root, Path::new("/elsewhere/index.html")), None);
    }

    #[test]
    fn normalize_keeps_paths_already_under_root() {
        let root = Path::new("/site/templates");
        let p = Path::new("/site/templates/index.html");
        assert_eq!(normalize_event_path(root, p), p);
    }

    #[test]
    fn normalize_resolves_symlinked_parent() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        std::fs::create_dir(&real).unwrap();
        let canon = real.canonicalize().unwrap();

        let normalized = normalize_event_path(&real, &canon.join("index.html"));
        assert_eq!(normalized, real.join("index.html"));
    }
}
