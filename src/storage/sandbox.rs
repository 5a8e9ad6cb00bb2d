//! Path sandboxing
//!
//! Resolves client-supplied paths against a user's root and current
//! directory. Resolution never fails: anything that would land outside the
//! root is clamped to the root itself. Normalization is purely lexical and
//! happens before the containment check, so no arrangement of `..`
//! segments can escape.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` segments without touching the filesystem.
///
/// `..` at the root of an absolute path stays at the root; leading `..`
/// segments of a relative path are kept. An empty result becomes `.`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Number of segments between `root` and `path`; zero when `path` is not
/// below `root`
pub fn depth_below(root: &Path, path: &Path) -> usize {
    path.strip_prefix(root)
        .map(|relative| relative.components().count())
        .unwrap_or(0)
}

/// A user's root plus the directory relative paths are resolved from
#[derive(Debug, Clone)]
pub struct PathSandbox {
    root: PathBuf,
    cwd: PathBuf,
}

impl PathSandbox {
    /// `cwd` outside `root` is replaced by `root`.
    pub fn new(root: &Path, cwd: &Path) -> Self {
        let root = normalize(root);
        let cwd = normalize(cwd);
        let cwd = if cwd.starts_with(&root) {
            cwd
        } else {
            root.clone()
        };
        Self { root, cwd }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Map a raw client path to a host path equal to or below the root.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        let cleaned = normalize(Path::new(raw));

        let candidate = if cleaned.has_root() {
            let relative: PathBuf = cleaned
                .components()
                .filter(|c| matches!(c, Component::Normal(_)))
                .collect();
            normalize(&self.root.join(relative))
        } else {
            normalize(&self.cwd.join(cleaned))
        };

        if candidate.starts_with(&self.root) {
            candidate
        } else {
            self.root.clone()
        }
    }

    pub fn is_root(&self, path: &Path) -> bool {
        path == self.root
    }

    /// Root-relative rendering shown to clients; the root itself is `/`.
    pub fn display(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(relative) if relative.as_os_str().is_empty() => "/".to_string(),
            Ok(relative) => format!("/{}", relative.to_string_lossy()),
            Err(_) => "/".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sandbox() -> PathSandbox {
        PathSandbox::new(Path::new("/srv/store/r1"), Path::new("/srv/store/r1/docs"))
    }

    #[test]
    fn normalize_is_lexical() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../../x")), PathBuf::from("/x"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize(Path::new("")), PathBuf::from("."));
        assert_eq!(normalize(Path::new("./")), PathBuf::from("."));
        assert_eq!(normalize(Path::new("a//b/")), PathBuf::from("a/b"));
    }

    #[test]
    fn resolution_never_leaves_root() {
        let sandbox = sandbox();
        let hostile = [
            "",
            ".",
            "..",
            "../..",
            "../../../etc",
            "../../../../../../etc/passwd",
            "/",
            "/..",
            "/../../etc/passwd",
            "//etc",
            "docs/../../..",
            "../r10",
            "../r1/../../r2/secret",
            "a/b/../../../../..",
            "....",
            "./../.",
        ];
        for raw in hostile {
            let resolved = sandbox.resolve(raw);
            assert!(
                resolved.starts_with(sandbox.root()),
                "{raw:?} resolved to {}",
                resolved.display()
            );
        }
    }

    #[test]
    fn absolute_paths_are_relative_to_root() {
        let sandbox = sandbox();
        assert_eq!(sandbox.resolve("/f.txt"), PathBuf::from("/srv/store/r1/f.txt"));
        assert_eq!(sandbox.resolve("/../etc"), PathBuf::from("/srv/store/r1/etc"));
        assert_eq!(sandbox.resolve("/"), PathBuf::from("/srv/store/r1"));
    }

    #[test]
    fn relative_paths_start_at_cwd() {
        let sandbox = sandbox();
        assert_eq!(sandbox.resolve(""), PathBuf::from("/srv/store/r1/docs"));
        assert_eq!(sandbox.resolve("a/b"), PathBuf::from("/srv/store/r1/docs/a/b"));
        assert_eq!(sandbox.resolve(".."), PathBuf::from("/srv/store/r1"));
    }

    #[test]
    fn escapes_clamp_to_root() {
        let sandbox = sandbox();
        assert_eq!(sandbox.resolve("../.."), PathBuf::from("/srv/store/r1"));
        // a sibling root sharing the string prefix is still outside
        assert_eq!(sandbox.resolve("../../r10/x"), PathBuf::from("/srv/store/r1"));
    }

    #[test]
    fn cwd_outside_root_is_ignored() {
        let sandbox = PathSandbox::new(Path::new("/srv/store/r1"), Path::new("/etc"));
        assert_eq!(sandbox.cwd(), Path::new("/srv/store/r1"));
        assert_eq!(sandbox.resolve("x"), PathBuf::from("/srv/store/r1/x"));
    }

    #[test]
    fn display_strips_root() {
        let sandbox = sandbox();
        assert_eq!(sandbox.display(sandbox.root()), "/");
        assert_eq!(sandbox.display(&sandbox.resolve("a/b")), "/docs/a/b");
        assert_eq!(depth_below(sandbox.root(), &sandbox.resolve("a/b")), 3);
        assert_eq!(depth_below(sandbox.root(), sandbox.root()), 0);
        assert_eq!(depth_below(sandbox.root(), Path::new("/etc/passwd")), 0);
    }
}
