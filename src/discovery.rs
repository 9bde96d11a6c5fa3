//! Chart directory and ApplicationSet file discovery.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Direct children of each chart root, sorted for deterministic processing.
///
/// A missing root is a warning, not an error: remaining roots still get
/// validated.
pub fn chart_dirs(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for root in roots {
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(root = %root.display(), %err, "skipping unreadable chart root");
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
    }
    dirs.sort();
    dirs
}

/// All YAML files under the ApplicationSet root, sorted.
///
/// This enumerates every YAML file rather than pre-filtering on a
/// `kind: ApplicationSet` content marker: the syntax pass exists precisely to
/// catch files under the root that claim some other kind.
pub fn appset_files(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        warn!(root = %root.display(), "ApplicationSet root does not exist");
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("yml" | "yaml")
            )
        })
        .collect();
    files.sort();
    files
}
