//! Font discovery helpers for nfssgen-core (made by FontLab https://www.fontlab.com/)

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use walkdir::WalkDir;

/// Trait for enumerating candidate font files.
pub trait FontDiscovery {
    fn discover(&self) -> Result<Vec<PathBuf>>;
}

/// Filesystem walker collecting OpenType files.
///
/// A root that is itself a file is taken as-is when it has a font extension.
/// Directories are scanned one level deep unless recursion is enabled.
#[derive(Debug, Clone)]
pub struct PathDiscovery {
    roots: Vec<PathBuf>,
    follow_symlinks: bool,
    recursive: bool,
}

impl PathDiscovery {
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let roots = roots.into_iter().map(Into::into).collect();
        Self {
            roots,
            follow_symlinks: false,
            recursive: false,
        }
    }

    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }
}

impl FontDiscovery for PathDiscovery {
    fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut found = Vec::new();

        for root in &self.roots {
            if !root.exists() {
                return Err(anyhow!("root path does not exist: {}", root.display()));
            }

            let mut walker = WalkDir::new(root).follow_links(self.follow_symlinks);
            if !self.recursive {
                walker = walker.max_depth(1);
            }

            for entry in walker {
                let entry = entry?;
                if entry.file_type().is_file() && is_font(entry.path()) {
                    found.push(entry.path().to_path_buf());
                } else if entry.file_type().is_file() && entry.depth() == 0 {
                    log::warn!("skipping {}: not an OpenType file", entry.path().display());
                }
            }
        }

        found.sort();
        found.dedup();
        Ok(found)
    }
}

fn is_font(path: &Path) -> bool {
    let ext = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return false,
    };

    matches!(ext.as_str(), "ttf" | "otf")
}
