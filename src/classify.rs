//! Chart directory classification.
//!
//! A chart directory is either a custom chart (owns its `Chart.yaml`), a
//! values-only chart (supplies a values overlay for an upstream chart), or
//! unrecognized. Classification is a pure filesystem-existence check.

use std::path::{Path, PathBuf};

const DESCRIPTOR_NAMES: &[&str] = &["Chart.yaml", "Chart.yml"];
const VALUES_NAMES: &[&str] = &["values.yaml", "values.yml"];

/// What kind of deployable unit a chart directory holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Has its own chart descriptor and templates.
    Custom,
    /// Has only a values overlay; the chart itself lives upstream.
    ValuesOnly,
    /// Neither marker file present.
    Unrecognized,
}

/// Classify a directory by its marker files.
///
/// A chart descriptor always wins: a directory holding both `Chart.yaml`
/// and `values.yaml` is a custom chart.
pub fn classify(dir: &Path) -> ChartKind {
    if chart_descriptor(dir).is_some() {
        ChartKind::Custom
    } else if values_file(dir).is_some() {
        ChartKind::ValuesOnly
    } else {
        ChartKind::Unrecognized
    }
}

/// Path of the chart descriptor directly inside `dir`, if present.
pub fn chart_descriptor(dir: &Path) -> Option<PathBuf> {
    first_existing(dir, DESCRIPTOR_NAMES)
}

/// Path of the values file directly inside `dir`, if present.
pub fn values_file(dir: &Path) -> Option<PathBuf> {
    first_existing(dir, VALUES_NAMES)
}

fn first_existing(dir: &Path, names: &[&str]) -> Option<PathBuf> {
    names
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}
