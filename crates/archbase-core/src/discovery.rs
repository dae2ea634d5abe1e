//! Source file discovery.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A compiled list of glob patterns matched against root-relative paths.
///
/// A pattern without `/` also matches a bare file name at any depth, so
/// `*.test.tsx` behaves like `**/*.test.tsx`.
#[derive(Debug, Clone, Default)]
pub struct GlobList {
    patterns: Vec<glob::Pattern>,
}

impl GlobList {
    /// Compiles the given patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if any pattern is invalid.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, glob::PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| glob::Pattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Returns true if no patterns are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns true if any pattern matches the relative path.
    #[must_use]
    pub fn matches(&self, relative: &Path) -> bool {
        let normalized = normalize(relative);
        let file_name = relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let options = glob::MatchOptions {
            require_literal_separator: true,
            ..glob::MatchOptions::new()
        };
        self.patterns.iter().any(|p| {
            p.matches_with(&normalized, options)
                || (!p.as_str().contains('/') && p.matches_with(&file_name, options))
        })
    }
}

/// Forward-slash form of a relative path.
#[must_use]
pub fn normalize(relative: &Path) -> String {
    relative.to_string_lossy().replace('\\', "/")
}

/// Walks a root directory and yields matching files.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    root: PathBuf,
    include: GlobList,
    exclude: GlobList,
    deep: bool,
    respect_gitignore: bool,
}

impl FileDiscovery {
    /// Creates a discovery over `root`.
    #[must_use]
    pub fn new(root: PathBuf, include: GlobList, exclude: GlobList) -> Self {
        Self {
            root,
            include,
            exclude,
            deep: true,
            respect_gitignore: true,
        }
    }

    /// Limits the walk to the root directory when `false`.
    #[must_use]
    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    /// Honors `.gitignore` files when `true`.
    #[must_use]
    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns true if a root-relative path passes the include and exclude sets.
    #[must_use]
    pub fn accepts(&self, relative: &Path) -> bool {
        if !self.deep && relative.components().count() > 1 {
            return false;
        }
        (self.include.is_empty() || self.include.matches(relative)) && !self.exclude.matches(relative)
    }

    /// Relative paths of all matching files, in path order.
    ///
    /// Unreadable directory entries are logged and skipped.
    #[must_use]
    pub fn discover(&self) -> Vec<PathBuf> {
        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .ignore(false)
            .sort_by_file_path(|a, b| a.cmp(b));
        if !self.deep {
            builder.max_depth(Some(1));
        }

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.path();
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if self.accepts(relative) {
                files.push(relative.to_path_buf());
            } else {
                debug!("Excluding: {}", relative.display());
            }
        }

        files.sort();
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{default_exclude, default_include};
    use std::fs;
    use tempfile::TempDir;

    fn discovery(root: &Path) -> FileDiscovery {
        FileDiscovery::new(
            root.to_path_buf(),
            GlobList::new(&default_include()).unwrap(),
            GlobList::new(&default_exclude()).unwrap(),
        )
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn default_globs() {
        let include = GlobList::new(&default_include()).unwrap();
        let exclude = GlobList::new(&default_exclude()).unwrap();
        assert!(include.matches(Path::new("App.tsx")));
        assert!(include.matches(Path::new("src/pages/List.jsx")));
        assert!(!include.matches(Path::new("README.md")));
        assert!(exclude.matches(Path::new("node_modules/react/index.js")));
        assert!(exclude.matches(Path::new("packages/a/dist/main.js")));
        assert!(!exclude.matches(Path::new("src/distance.ts")));
    }

    #[test]
    fn bare_patterns_match_file_names() {
        let list = GlobList::new(&["*.test.tsx"]).unwrap();
        assert!(list.matches(Path::new("src/deep/App.test.tsx")));
        assert!(!list.matches(Path::new("src/App.tsx")));
    }

    #[test]
    fn discovers_sorted_relative_paths() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/b.tsx");
        touch(dir.path(), "src/a.tsx");
        touch(dir.path(), "index.ts");
        touch(dir.path(), "node_modules/x/index.js");
        touch(dir.path(), "build/out.js");
        touch(dir.path(), "styles.css");

        let files = discovery(dir.path()).discover();
        assert_eq!(
            files,
            vec![
                PathBuf::from("index.ts"),
                PathBuf::from("src/a.tsx"),
                PathBuf::from("src/b.tsx"),
            ]
        );
    }

    #[test]
    fn shallow_walk_stays_in_root() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "App.tsx");
        touch(dir.path(), "src/Nested.tsx");
        let files = discovery(dir.path()).deep(false).discover();
        assert_eq!(files, vec![PathBuf::from("App.tsx")]);
    }

    #[test]
    fn gitignore_is_respected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "generated/\n").unwrap();
        touch(dir.path(), "generated/Api.ts");
        touch(dir.path(), "src/App.tsx");

        let files = discovery(dir.path()).discover();
        assert_eq!(files, vec![PathBuf::from("src/App.tsx")]);

        let files = discovery(dir.path()).respect_gitignore(false).discover();
        assert_eq!(files.len(), 2);
    }
}
