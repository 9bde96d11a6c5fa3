use anyhow::Result;

use helm_preflight::renderer::HelmRenderer;
use helm_preflight::report;
use helm_preflight::runner::Runner;

use super::HookConfig;

/// The ApplicationSet hook: syntax and kind checks only, no helm involved.
pub fn appsets_command(config: &HookConfig) -> Result<bool> {
    let renderer = HelmRenderer::new(&config.helm_bin);
    let runner = Runner::new(
        &renderer,
        config.chart_roots.clone(),
        config.appset_root.clone(),
    );

    let totals = runner.validate_appsets();
    if totals.total() == 0 {
        report::warn_nothing_found("ApplicationSet files");
    }
    report::print_category("applicationsets", &totals);
    report::print_verdict(totals.failed == 0);
    Ok(totals.failed == 0)
}
