//! File collection under one or more roots, with exclusions.
//!
//! Shared by the YAML aggregator and the doc-comment scanner.

use crate::config::PathSpec;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File collector for gathering annotation files under one or more roots.
///
/// Directory roots are walked recursively (following symbolic links) for files
/// with the configured extension. File roots are taken as they are, whatever
/// their extension. Hidden entries below a root are skipped, as are any extra
/// directory names given with [`FileCollector::skip_dir`].
///
/// # Exclusions
///
/// An absolute exclude path is used as is. A relative one that already begins
/// with a root (component-wise) is taken as written, relative to the working
/// directory like the root itself. Any other relative exclude is resolved
/// against every directory root and against the parent directory of every
/// file root. A collected file is dropped when its path lies at or below any
/// resolved exclude path. Excludes that match nothing are ignored.
///
/// # Example
///
/// ```no_run
/// use openapi_docgen::collector::FileCollector;
/// use openapi_docgen::config::PathSpec;
///
/// let collector = FileCollector::new("yaml");
/// let files = collector
///     .collect(&PathSpec::single("apps"), &PathSpec::single("apps/legacy"))
///     .unwrap();
/// println!("Found {} YAML files", files.len());
/// ```
#[derive(Debug, Clone)]
pub struct FileCollector {
    extension: String,
    skipped_dirs: Vec<String>,
}

impl FileCollector {
    /// Creates a collector for files ending in `.<extension>`.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            skipped_dirs: Vec::new(),
        }
    }

    /// Adds a directory name that is never descended into.
    pub fn skip_dir(mut self, name: impl Into<String>) -> Self {
        self.skipped_dirs.push(name.into());
        self
    }

    /// Collects the matching files, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a root does not exist.
    pub fn collect(&self, roots: &PathSpec, excludes: &PathSpec) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut bases = Vec::new();

        for root in roots.iter() {
            if root.is_file() {
                debug!("Adding single file: {}", root.display());
                files.push(root.to_path_buf());
                bases.push(root.parent().map(Path::to_path_buf).unwrap_or_default());
            } else if root.is_dir() {
                self.walk(root, &mut files);
                bases.push(root.to_path_buf());
            } else {
                return Err(Error::InvalidInput(format!(
                    "path does not exist: {}",
                    root.display()
                )));
            }
        }

        let excluded = resolve_excludes(excludes, &bases);
        if !excluded.is_empty() {
            debug!("Excluding paths: {:?}", excluded);
            files.retain(|file| !excluded.iter().any(|ex| file.starts_with(ex)));
        }

        files.sort();
        files.dedup();

        debug!(
            "Collected {} .{} files from {} roots",
            files.len(),
            self.extension,
            roots.len()
        );
        Ok(files)
    }

    fn walk(&self, root: &Path, files: &mut Vec<PathBuf>) {
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_skipped = e.file_type().is_dir()
                    && self.skipped_dirs.iter().any(|dir| dir.as_str() == file_name.as_ref());

                !is_hidden && !is_skipped
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && self.matches_extension(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    warn!("Failed to access path: {}", e);
                }
            }
        }
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension().and_then(|s| s.to_str()) == Some(self.extension.as_str())
    }
}

/// Resolves every exclude against every base directory.
fn resolve_excludes(excludes: &PathSpec, bases: &[PathBuf]) -> Vec<PathBuf> {
    let mut resolved = Vec::new();
    for exclude in excludes.iter() {
        if exclude.is_absolute() {
            resolved.push(exclude.to_path_buf());
            continue;
        }
        for base in bases {
            if !base.as_os_str().is_empty() && exclude.starts_with(base) {
                resolved.push(exclude.to_path_buf());
            } else {
                resolved.push(base.join(exclude));
            }
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_collect_filters_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "a.yaml", "a: 1");
        write(root, "b.yml", "b: 1");
        write(root, "c.json", "{}");
        write(root, "nested/d.yaml", "d: 1");

        let files = FileCollector::new("yaml")
            .collect(&PathSpec::single(root), &PathSpec::default())
            .unwrap();

        assert_eq!(names(root, &files), vec!["a.yaml", "nested/d.yaml"]);
    }

    #[test]
    fn test_collect_is_sorted_and_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "zeta.yaml", "");
        write(root, "alpha.yaml", "");
        write(root, "mid/beta.yaml", "");

        let collector = FileCollector::new("yaml");
        let first = collector
            .collect(&PathSpec::single(root), &PathSpec::default())
            .unwrap();
        let second = collector
            .collect(&PathSpec::single(root), &PathSpec::default())
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(names(root, &first), vec!["alpha.yaml", "mid/beta.yaml", "zeta.yaml"]);
    }

    #[test]
    fn test_single_file_root_ignores_extension() {
        let temp_dir = TempDir::new().unwrap();
        let file = write(temp_dir.path(), "extra.txt", "x: 1");

        let files = FileCollector::new("yaml")
            .collect(&PathSpec::single(&file), &PathSpec::default())
            .unwrap();

        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_relative_exclude_resolved_against_each_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "one/keep.yaml", "");
        write(root, "one/legacy/old.yaml", "");
        write(root, "two/keep.yaml", "");
        write(root, "two/legacy/old.yaml", "");
        write(root, "two/legacy-notes/new.yaml", "");

        let roots = PathSpec::new(vec![root.join("one"), root.join("two")]);
        let files = FileCollector::new("yaml")
            .collect(&roots, &PathSpec::single("legacy"))
            .unwrap();

        assert_eq!(
            names(root, &files),
            vec!["one/keep.yaml", "two/keep.yaml", "two/legacy-notes/new.yaml"]
        );
    }

    #[test]
    fn test_absolute_exclude_removes_exact_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "a.yaml", "");
        let dropped = write(root, "b.yaml", "");
        write(root, "c.yaml", "");

        let files = FileCollector::new("yaml")
            .collect(&PathSpec::single(root), &PathSpec::single(&dropped))
            .unwrap();

        assert_eq!(names(root, &files), vec!["a.yaml", "c.yaml"]);
    }

    #[test]
    fn test_exclude_already_prefixed_by_root_is_kept_as_written() {
        let bases = vec![PathBuf::from("apps"), PathBuf::from("src")];
        let excludes = PathSpec::new(vec![PathBuf::from("apps/legacy"), PathBuf::from("gen")]);

        let resolved = resolve_excludes(&excludes, &bases);

        assert_eq!(
            resolved,
            vec![
                PathBuf::from("apps/legacy"),
                PathBuf::from("src/apps/legacy"),
                PathBuf::from("apps/gen"),
                PathBuf::from("src/gen"),
            ]
        );
    }

    #[test]
    fn test_root_prefix_match_is_component_wise() {
        let bases = vec![PathBuf::from("app")];
        let excludes = PathSpec::single("apps/legacy");

        assert_eq!(
            resolve_excludes(&excludes, &bases),
            vec![PathBuf::from("app/apps/legacy")]
        );
    }

    #[test]
    fn test_unmatched_exclude_is_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "a.yaml", "");

        let files = FileCollector::new("yaml")
            .collect(&PathSpec::single(root), &PathSpec::single("does/not/exist"))
            .unwrap();

        assert_eq!(names(root, &files), vec!["a.yaml"]);
    }

    #[test]
    fn test_exclude_relative_to_file_root_parent() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let file = write(root, "single.yaml", "");

        let files = FileCollector::new("yaml")
            .collect(&PathSpec::single(&file), &PathSpec::single("single.yaml"))
            .unwrap();

        assert!(files.is_empty());
    }

    #[test]
    fn test_skips_hidden_and_named_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "src/lib.rs", "");
        write(root, "target/debug/build.rs", "");
        write(root, ".git/hook.rs", "");

        let files = FileCollector::new("rs")
            .skip_dir("target")
            .collect(&PathSpec::single(root), &PathSpec::default())
            .unwrap();

        assert_eq!(names(root, &files), vec!["src/lib.rs"]);
    }

    #[test]
    fn test_duplicate_roots_are_deduplicated() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let file = write(root, "a.yaml", "");

        let roots = PathSpec::new(vec![root.to_path_buf(), file]);
        let files = FileCollector::new("yaml")
            .collect(&roots, &PathSpec::default())
            .unwrap();

        assert_eq!(names(root, &files), vec!["a.yaml"]);
    }

    #[test]
    fn test_missing_root_is_invalid_input() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let result = FileCollector::new("yaml").collect(&PathSpec::single(missing), &PathSpec::default());

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_follows_symlinked_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "real/linked.yaml", "");
        fs::create_dir(root.join("scan")).unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("scan/link")).unwrap();

        let files = FileCollector::new("yaml")
            .collect(&PathSpec::single(root.join("scan")), &PathSpec::default())
            .unwrap();

        assert_eq!(names(root, &files), vec!["scan/link/linked.yaml"]);
    }
}
