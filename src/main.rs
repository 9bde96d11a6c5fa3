use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::HookConfig;

#[derive(Parser)]
#[command(
    name = "helm-preflight",
    about = "Pre-commit validation for Helm charts and ArgoCD ApplicationSets",
    version,
    author,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Repository root (walks up to the nearest .git when omitted)
    #[arg(long, global = true)]
    repo_root: Option<PathBuf>,

    /// Comma-separated chart roots, relative to the repository root
    #[arg(
        long,
        global = true,
        default_value = "charts",
        env = "PREFLIGHT_CHART_ROOTS"
    )]
    chart_roots: String,

    /// ApplicationSet root, relative to the repository root
    #[arg(
        long,
        global = true,
        default_value = "argocd/applicationsets",
        env = "PREFLIGHT_APPSET_ROOT"
    )]
    appset_root: PathBuf,

    /// Helm binary to invoke
    #[arg(long, global = true, default_value = "helm", env = "PREFLIGHT_HELM_BIN")]
    helm_bin: PathBuf,

    /// Enable verbose output (use -vv for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate custom charts (directories owning a Chart.yaml)
    Charts,

    /// Validate values-only charts against their ApplicationSets
    Values,

    /// Validate ApplicationSet manifest syntax
    Appsets,

    /// Run every validation category (default command)
    All,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = HookConfig::resolve(
        cli.repo_root.as_deref(),
        &cli.chart_roots,
        &cli.appset_root,
        &cli.helm_bin,
    )?;

    let passed = match cli.command {
        Some(Commands::Charts) => commands::charts_command(&config)?,
        Some(Commands::Values) => commands::values_command(&config)?,
        Some(Commands::Appsets) => commands::appsets_command(&config)?,
        // Default to the comprehensive run
        Some(Commands::All) | None => commands::all_command(&config)?,
    };

    if !passed {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbose {
        0 => EnvFilter::new("helm_preflight=warn"),
        1 => EnvFilter::new("helm_preflight=info"),
        _ => EnvFilter::new("helm_preflight=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
