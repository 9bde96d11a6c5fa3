//! Helm invocation adapter.
//!
//! Rendering goes through the [`Renderer`] trait so the orchestration logic
//! can be exercised without a helm binary. [`HelmRenderer`] is the production
//! implementation: synchronous `helm` subprocesses with captured output.

use anyhow::{Result, bail};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use which::which;

use crate::appset::ChartRef;
use crate::classify;

/// A rendering step failed. Diagnostics are helm's combined output,
/// displayed verbatim and never parsed.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },
    #[error("{0}")]
    Failed(String),
}

/// The operations validation needs from helm.
pub trait Renderer {
    /// `helm template` against a local chart directory.
    fn render_local(&self, chart_dir: &Path) -> Result<(), RenderError>;

    /// `helm template` against a repository chart at a pinned version.
    fn render_remote(
        &self,
        chart: &str,
        alias: &str,
        version: &str,
        values: &Path,
    ) -> Result<(), RenderError>;

    /// `helm dependency build` for a chart with declared dependencies.
    fn dependency_build(&self, chart_dir: &Path) -> Result<(), RenderError>;

    fn repo_add(&self, alias: &str, url: &str) -> Result<(), RenderError>;
    fn repo_update(&self, alias: &str) -> Result<(), RenderError>;
    fn repo_remove(&self, alias: &str) -> Result<(), RenderError>;
}

/// Shells out to the configured helm binary.
pub struct HelmRenderer {
    helm_bin: PathBuf,
}

impl HelmRenderer {
    pub fn new(helm_bin: impl Into<PathBuf>) -> Self {
        Self {
            helm_bin: helm_bin.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<(), RenderError> {
        tracing::debug!(helm = %self.helm_bin.display(), ?args, "invoking helm");
        let output = Command::new(&self.helm_bin)
            .args(args)
            .output()
            .map_err(|source| RenderError::Spawn {
                tool: self.helm_bin.display().to_string(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let mut diagnostics = String::from_utf8_lossy(&output.stderr).into_owned();
        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            if !diagnostics.is_empty() {
                diagnostics.push('\n');
            }
            diagnostics.push_str(stdout.trim_end());
        }
        Err(RenderError::Failed(diagnostics))
    }
}

impl Renderer for HelmRenderer {
    fn render_local(&self, chart_dir: &Path) -> Result<(), RenderError> {
        self.run(&["template", &chart_dir.to_string_lossy()])
    }

    fn render_remote(
        &self,
        chart: &str,
        alias: &str,
        version: &str,
        values: &Path,
    ) -> Result<(), RenderError> {
        self.run(&[
            "template",
            &format!("{alias}/{chart}"),
            "--version",
            version,
            "-f",
            &values.to_string_lossy(),
        ])
    }

    fn dependency_build(&self, chart_dir: &Path) -> Result<(), RenderError> {
        self.run(&["dependency", "build", &chart_dir.to_string_lossy()])
    }

    fn repo_add(&self, alias: &str, url: &str) -> Result<(), RenderError> {
        self.run(&["repo", "add", alias, url])
    }

    fn repo_update(&self, alias: &str) -> Result<(), RenderError> {
        self.run(&["repo", "update", alias])
    }

    fn repo_remove(&self, alias: &str) -> Result<(), RenderError> {
        self.run(&["repo", "remove", alias])
    }
}

/// Fail fast when the configured helm binary is not on PATH.
pub fn ensure_helm(helm_bin: &Path) -> Result<()> {
    if which(helm_bin).is_err() {
        bail!(
            "helm binary '{}' not found. Install helm (https://helm.sh/docs/intro/install/) \
             or point --helm-bin at an existing binary.",
            helm_bin.display()
        );
    }
    Ok(())
}

/// Deterministic repository alias for a repo URL.
///
/// Hashing the URL keeps aliases collision-free across charts that share a
/// run and stable across repeated runs of the same chart.
pub fn repo_alias(repo_url: &str) -> String {
    let digest = Sha256::digest(repo_url.as_bytes());
    format!("pf-{}", &hex::encode(digest)[..12])
}

/// Fields of Chart.yaml the validator actually reads.
/// `dependencies: null` counts as no dependencies, not an error.
#[derive(Debug, Default, Deserialize)]
struct ChartDescriptor {
    #[serde(default)]
    dependencies: Option<Vec<serde_yaml::Value>>,
}

fn has_dependencies(descriptor_path: &Path) -> Result<bool, RenderError> {
    let content = fs::read_to_string(descriptor_path).map_err(|e| {
        RenderError::Failed(format!(
            "failed to read {}: {e}",
            descriptor_path.display()
        ))
    })?;
    let descriptor: ChartDescriptor = serde_yaml::from_str(&content).map_err(|e| {
        RenderError::Failed(format!(
            "failed to parse {}: {e}",
            descriptor_path.display()
        ))
    })?;
    Ok(descriptor
        .dependencies
        .map(|deps| !deps.is_empty())
        .unwrap_or(false))
}

/// Validate a custom chart by rendering it in place.
///
/// Charts with declared dependencies get a dependency build first; if that
/// fails, rendering is not attempted and the build output is the diagnostic.
pub fn render_custom(renderer: &dyn Renderer, chart_dir: &Path) -> Result<(), RenderError> {
    let descriptor = classify::chart_descriptor(chart_dir).ok_or_else(|| {
        RenderError::Failed(format!("no chart descriptor in {}", chart_dir.display()))
    })?;

    if has_dependencies(&descriptor)? {
        renderer.dependency_build(chart_dir)?;
    }
    renderer.render_local(chart_dir)
}

/// Outcome of an upstream render that is not a hard failure.
#[derive(Debug, PartialEq, Eq)]
pub enum UpstreamRender {
    Rendered,
    /// Git-backed charts cannot be fetched without a clone; never rendered.
    SkippedGitBacked,
}

/// Releases a registered repo alias when dropped, on every exit path.
struct RepoAliasGuard<'a> {
    renderer: &'a dyn Renderer,
    alias: String,
}

impl Drop for RepoAliasGuard<'_> {
    fn drop(&mut self) {
        // Best effort: a stale alias is an annoyance, not an error.
        if let Err(err) = self.renderer.repo_remove(&self.alias) {
            tracing::debug!(alias = %self.alias, %err, "repo remove failed");
        }
    }
}

/// Validate a values-only chart against its upstream coordinates.
pub fn render_upstream(
    renderer: &dyn Renderer,
    chart: &ChartRef,
    values: &Path,
) -> Result<UpstreamRender, RenderError> {
    let ChartRef::Repository {
        name,
        repo_url,
        target_revision,
    } = chart
    else {
        return Ok(UpstreamRender::SkippedGitBacked);
    };

    let alias = repo_alias(repo_url);
    if let Err(err) = renderer.repo_add(&alias, repo_url) {
        // Alias may already be registered from an interrupted run; an update
        // failure on top of that is ignored.
        tracing::debug!(%alias, %err, "repo add failed, trying update");
        let _ = renderer.repo_update(&alias);
    }
    let _guard = RepoAliasGuard {
        renderer,
        alias: alias.clone(),
    };

    renderer.render_remote(name, &alias, target_revision, values)?;
    Ok(UpstreamRender::Rendered)
}
