use anyhow::Result;

use helm_preflight::renderer::{HelmRenderer, ensure_helm};
use helm_preflight::report;
use helm_preflight::runner::Runner;

use super::HookConfig;

/// The custom-charts hook: render every chart that owns a Chart.yaml.
pub fn charts_command(config: &HookConfig) -> Result<bool> {
    ensure_helm(&config.helm_bin)?;
    let renderer = HelmRenderer::new(&config.helm_bin);
    let runner = Runner::new(
        &renderer,
        config.chart_roots.clone(),
        config.appset_root.clone(),
    );

    let totals = runner.validate_custom_charts();
    if totals.total() == 0 {
        report::warn_nothing_found("custom charts");
    }
    report::print_category("custom charts", &totals);
    report::print_verdict(totals.failed == 0);
    Ok(totals.failed == 0)
}
