use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::warn;
use url::Url;

/// Outcome of walking a workspace root.
#[derive(Debug, Default, Clone, Serialize)]
pub struct DiscoveryReport {
    pub registered: Vec<Url>,
    /// Paths that could not be read, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

/// Depth-first collection of source files below a root.
///
/// Symbolic links are resolved against the directory holding the link and
/// followed once: anything reached through a link that is itself a link is
/// skipped. Directories are tracked by canonical path so cycles terminate.
pub(crate) struct Discovery<'a> {
    matches: &'a dyn Fn(&Path) -> bool,
    visited: FxHashSet<PathBuf>,
    pub files: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl<'a> Discovery<'a> {
    pub fn new(matches: &'a dyn Fn(&Path) -> bool) -> Self {
        Self {
            matches,
            visited: FxHashSet::default(),
            files: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn walk(&mut self, root: &Path) {
        self.walk_dir(root, false);
    }

    fn fail(&mut self, path: &Path, err: io::Error) {
        warn!(path = %path.display(), error = %err, "skipping unreadable path");
        self.failed.push((path.to_path_buf(), err.to_string()));
    }

    fn walk_dir(&mut self, dir: &Path, via_link: bool) {
        match fs::canonicalize(dir) {
            Ok(canonical) => {
                if !self.visited.insert(canonical) {
                    return;
                }
            }
            Err(err) => return self.fail(dir, err),
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => return self.fail(dir, err),
        };
        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(err) => self.fail(dir, err),
            }
        }
        // Stable order regardless of what the file system returns
        paths.sort();

        for path in paths {
            self.visit_entry(&path, via_link);
        }
    }

    fn visit_entry(&mut self, path: &Path, via_link: bool) {
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(err) => return self.fail(path, err),
        };

        if metadata.file_type().is_symlink() {
            if via_link {
                return;
            }
            let target = match fs::read_link(path) {
                Ok(target) if target.is_relative() => match path.parent() {
                    Some(parent) => parent.join(target),
                    None => target,
                },
                Ok(target) => target,
                Err(err) => return self.fail(path, err),
            };
            match fs::metadata(&target) {
                Ok(meta) if meta.is_dir() => self.walk_dir(&target, true),
                Ok(meta) if meta.is_file() && (self.matches)(path) => self.files.push(path.to_path_buf()),
                Ok(_) => {}
                Err(err) => self.fail(path, err),
            }
        } else if metadata.is_dir() {
            self.walk_dir(path, via_link);
        } else if metadata.is_file() && (self.matches)(path) {
            self.files.push(path.to_path_buf());
        }
    }
}
