mod all;
mod appsets;
mod charts;
mod values;

pub use all::all_command;
pub use appsets::appsets_command;
pub use charts::charts_command;
pub use values::values_command;

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

/// Resolved hook configuration: every path is absolute by the time a
/// command runs.
pub struct HookConfig {
    pub chart_roots: Vec<PathBuf>,
    pub appset_root: PathBuf,
    pub helm_bin: PathBuf,
}

impl HookConfig {
    pub fn resolve(
        repo_root: Option<&Path>,
        chart_roots: &str,
        appset_root: &Path,
        helm_bin: &Path,
    ) -> Result<Self> {
        let repo_root = resolve_repo_root(repo_root)?;

        let chart_roots = chart_roots
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|root| repo_root.join(root))
            .collect();

        Ok(Self {
            chart_roots,
            appset_root: repo_root.join(appset_root),
            helm_bin: helm_bin.to_path_buf(),
        })
    }
}

/// Find the repository root: either the explicit flag or the first ancestor
/// of the current directory containing `.git`.
fn resolve_repo_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = explicit {
        if !root.is_dir() {
            bail!("repository root {} does not exist", root.display());
        }
        return Ok(root.to_path_buf());
    }

    let mut dir = std::env::current_dir().context("failed to read current directory")?;
    loop {
        if dir.join(".git").exists() {
            return Ok(dir);
        }
        if !dir.pop() {
            bail!("could not locate repository root (no .git above the current directory)");
        }
    }
}
