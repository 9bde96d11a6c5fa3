use anyhow::Result;

use helm_preflight::renderer::{HelmRenderer, ensure_helm};
use helm_preflight::report;
use helm_preflight::runner::Runner;

use super::HookConfig;

/// The comprehensive hook: every category in one run, with skip accounting
/// for unrecognized chart directories.
pub fn all_command(config: &HookConfig) -> Result<bool> {
    ensure_helm(&config.helm_bin)?;
    let renderer = HelmRenderer::new(&config.helm_bin);
    let runner = Runner::new(
        &renderer,
        config.chart_roots.clone(),
        config.appset_root.clone(),
    );

    let summary = runner.run_all();
    report::print_summary(&summary);
    Ok(summary.success())
}
