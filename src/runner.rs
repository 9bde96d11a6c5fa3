//! Validation orchestration.
//!
//! Drives discovery → classification → resolution → rendering for each chart
//! directory and a syntax pass over ApplicationSet files, converting every
//! per-item error into a recorded outcome. Processing is sequential and no
//! item's failure stops the items after it.

use std::path::{Path, PathBuf};

use crate::appset::{self, ExtractError};
use crate::classify::{self, ChartKind};
use crate::discovery;
use crate::renderer::{Renderer, UpstreamRender, render_custom, render_upstream};
use crate::report;

/// Per-item validation outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// Carries the diagnostic text shown to the user.
    Failed(String),
    /// Carries the skip reason; skips never fail a run.
    Skipped(String),
}

/// Running totals for one category.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CategoryTotals {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl CategoryTotals {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed(_) => self.failed += 1,
            Outcome::Skipped(_) => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }
}

/// Totals per category plus the overall verdict.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub custom: CategoryTotals,
    pub values: CategoryTotals,
    pub appsets: CategoryTotals,
    /// Unrecognized chart directories, counted only by the comprehensive run.
    pub unknown_skipped: usize,
}

impl RunSummary {
    /// A run fails iff something actually failed. Skips and an empty
    /// discovery never fail a run.
    pub fn success(&self) -> bool {
        self.custom.failed == 0 && self.values.failed == 0 && self.appsets.failed == 0
    }
}

/// One configured validation run.
pub struct Runner<'a> {
    renderer: &'a dyn Renderer,
    chart_roots: Vec<PathBuf>,
    appset_root: PathBuf,
}

impl<'a> Runner<'a> {
    pub fn new(
        renderer: &'a dyn Renderer,
        chart_roots: Vec<PathBuf>,
        appset_root: PathBuf,
    ) -> Self {
        Self {
            renderer,
            chart_roots,
            appset_root,
        }
    }

    /// Category hook: custom charts only. Non-matching directories are
    /// excluded from the totals entirely.
    pub fn validate_custom_charts(&self) -> CategoryTotals {
        let mut totals = CategoryTotals::default();
        report::section("Custom charts");
        for dir in discovery::chart_dirs(&self.chart_roots) {
            if classify::classify(&dir) != ChartKind::Custom {
                continue;
            }
            let outcome = self.validate_custom(&dir);
            self.report_item(&chart_label(&dir), &outcome);
            totals.record(&outcome);
        }
        totals
    }

    /// Category hook: values-only charts.
    pub fn validate_values_charts(&self) -> CategoryTotals {
        let mut totals = CategoryTotals::default();
        report::section("Values-only charts");
        for dir in discovery::chart_dirs(&self.chart_roots) {
            if classify::classify(&dir) != ChartKind::ValuesOnly {
                continue;
            }
            let outcome = self.validate_values_only(&dir);
            self.report_item(&chart_label(&dir), &outcome);
            totals.record(&outcome);
        }
        totals
    }

    /// Category hook: ApplicationSet syntax.
    pub fn validate_appsets(&self) -> CategoryTotals {
        let mut totals = CategoryTotals::default();
        report::section("ApplicationSets");
        for file in discovery::appset_files(&self.appset_root) {
            let outcome = match appset::validate_appset_syntax(&file) {
                Ok(()) => Outcome::Passed,
                Err(err) => Outcome::Failed(err.to_string()),
            };
            self.report_item(&file.display().to_string(), &outcome);
            totals.record(&outcome);
        }
        totals
    }

    /// The comprehensive run: every chart directory in every root, then the
    /// ApplicationSet syntax pass. Unrecognized directories are recorded as
    /// skipped instead of silently dropped.
    pub fn run_all(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        report::section("Charts");
        for dir in discovery::chart_dirs(&self.chart_roots) {
            let label = chart_label(&dir);
            match classify::classify(&dir) {
                ChartKind::Custom => {
                    let outcome = self.validate_custom(&dir);
                    self.report_item(&label, &outcome);
                    summary.custom.record(&outcome);
                }
                ChartKind::ValuesOnly => {
                    let outcome = self.validate_values_only(&dir);
                    self.report_item(&label, &outcome);
                    summary.values.record(&outcome);
                }
                ChartKind::Unrecognized => {
                    report::item_skipped(&label, "unknown chart type");
                    summary.unknown_skipped += 1;
                }
            }
        }

        println!();
        summary.appsets = self.validate_appsets();
        summary
    }

    fn validate_custom(&self, dir: &Path) -> Outcome {
        match render_custom(self.renderer, dir) {
            Ok(()) => Outcome::Passed,
            Err(err) => Outcome::Failed(err.to_string()),
        }
    }

    fn validate_values_only(&self, dir: &Path) -> Outcome {
        let Some(values) = classify::values_file(dir) else {
            // classify() said ValuesOnly, so the file exists; races with a
            // concurrent delete land here.
            return Outcome::Skipped("values file disappeared".to_string());
        };
        let name = chart_label(dir);

        let Some(appset_file) = appset::find_appset_file(&name, &self.appset_root) else {
            return Outcome::Skipped("no ApplicationSet found".to_string());
        };

        let chart = match appset::extract_chart_ref_from_file(&appset_file) {
            Ok(chart) => chart,
            Err(ExtractError::UnresolvedTemplate { .. }) => {
                return Outcome::Skipped("no generator value to resolve template".to_string());
            }
            Err(err) => {
                tracing::debug!(appset = %appset_file.display(), %err, "extraction failed");
                return Outcome::Skipped("unresolvable coordinates".to_string());
            }
        };

        match render_upstream(self.renderer, &chart, &values) {
            Ok(UpstreamRender::Rendered) => Outcome::Passed,
            Ok(UpstreamRender::SkippedGitBacked) => {
                Outcome::Skipped("git-based chart".to_string())
            }
            Err(err) => Outcome::Failed(err.to_string()),
        }
    }

    fn report_item(&self, label: &str, outcome: &Outcome) {
        match outcome {
            Outcome::Passed => report::item_passed(label),
            Outcome::Failed(diagnostics) => report::item_failed(label, diagnostics),
            Outcome::Skipped(reason) => report::item_skipped(label, reason),
        }
    }
}

fn chart_label(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}
