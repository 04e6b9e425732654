//! kubeval: audit a Kubernetes cluster for operationally important workloads

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use kubeval_cluster::{ApiClient, KubectlClient};
use kubeval_core::{
    CheckDefinition, CoveragePolicy, ResourceQuery, Summary, builtin_checks, ensure_unique_ids,
    evaluate_all, evaluate_concurrent, load_custom_checks,
};
use kubeval_report::{
    ChecksPayload, ResultsPayload, render_banner, render_catalog, render_results, render_summary,
    scan_with_spinner, to_pretty_json,
};
use std::fs::File;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::{EnvFilter, prelude::*};

/// Exit status for setup problems (query tool unusable, bad checks file)
const EXIT_SETUP_ERROR: i32 = 2;

/// kubeval: validate cluster best-practice components
#[derive(Parser, Debug)]
#[command(name = "kubeval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Log file path (default: <temp_dir>/kubeval.log)
    #[arg(long, global = true)]
    log_file: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run checks against the current cluster
    Scan(ScanArgs),
    /// List available built-in checks
    ListChecks(ListArgs),
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// kubectl context to use
    #[arg(short, long)]
    context: Option<String>,

    /// Path to a JSON or YAML file containing additional checks
    #[arg(long)]
    checks_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Disable banner in table output
    #[arg(long)]
    no_banner: bool,

    /// Disable spinner animation during scan
    #[arg(long)]
    no_spinner: bool,

    /// How to query the cluster
    #[arg(long, value_enum, default_value_t = Backend::Kubectl)]
    backend: Backend,

    /// Per-query timeout in seconds
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Number of checks to run at once (spinner is only shown when 1)
    #[arg(long, default_value = "1")]
    concurrency: usize,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    /// Shell out to kubectl
    Kubectl,
    /// Talk to the API server using the kubeconfig
    Api,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments, defaulting to `scan`
    let cli = Cli::parse_from(normalize_args(std::env::args().collect()));

    // Initialize error handling
    color_eyre::install()?;

    // Initialize logging to file (stdout carries the report)
    let log_path = resolve_log_path(cli.log_file);
    let log_file = File::create(&log_path)?;

    // Build filter: set base level, but quiet down noisy HTTP libraries
    let filter = if cli.debug {
        EnvFilter::from_default_env()
            .add_directive(Level::DEBUG.into())
            .add_directive("hyper=info".parse()?)
            .add_directive("tower=info".parse()?)
            .add_directive("rustls=info".parse()?)
            .add_directive("kube_client=info".parse()?)
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .init();

    tracing::info!("Starting kubeval");

    let code = match cli.command {
        Command::Scan(args) => run_scan(args).await?,
        Command::ListChecks(args) => run_list_checks(args)?,
    };

    tracing::info!("Exiting with status {}", code);
    std::process::exit(code);
}

/// Insert the default `scan` subcommand when none is given
///
/// `kubeval` and `kubeval --context prod` both mean `kubeval scan ...`;
/// help and version flags are left for clap, as is a subcommand that
/// follows global flags (`kubeval --debug list-checks`).
fn normalize_args(mut args: Vec<String>) -> Vec<String> {
    let cli = Cli::command();
    let names_subcommand = |arg: &str| arg == "help" || cli.find_subcommand(arg).is_some();
    let has_subcommand = args.iter().skip(1).any(|arg| names_subcommand(arg.as_str()));

    match args.get(1).map(String::as_str) {
        None => args.push("scan".to_string()),
        Some("-h" | "--help" | "-V" | "--version") => {}
        Some(first) if first.starts_with('-') && !has_subcommand => {
            args.insert(1, "scan".to_string())
        }
        Some(_) => {}
    }
    args
}

/// Resolve the log file path, falling back to the platform temp directory.
fn resolve_log_path(log_file: Option<String>) -> PathBuf {
    match log_file {
        Some(path) => PathBuf::from(path),
        None => std::env::temp_dir().join("kubeval.log"),
    }
}

/// Built-in checks followed by any custom checks, plus the coverage policy
fn load_checks(checks_file: Option<&PathBuf>) -> Result<(Vec<CheckDefinition>, CoveragePolicy)> {
    let mut checks = builtin_checks()?;
    let mut policy = CoveragePolicy::default();

    if let Some(path) = checks_file {
        let custom = load_custom_checks(path)?;
        checks.extend(custom.checks);
        policy.extend(custom.groups);
    }

    ensure_unique_ids(&checks)?;
    Ok((checks, policy))
}

/// Describe a catalog load failure, naming the user file when there is one
fn load_failure(checks_file: Option<&Path>, err: &dyn std::fmt::Display) -> String {
    match checks_file {
        Some(path) => format!("unable to load checks file '{}': {err}", path.display()),
        None => format!("unable to load built-in checks: {err}"),
    }
}

async fn run_scan(args: ScanArgs) -> Result<i32> {
    let timeout = Duration::from_secs(args.timeout);

    let query: Box<dyn ResourceQuery> = match args.backend {
        Backend::Kubectl => {
            let client = KubectlClient::new(args.context.clone()).with_timeout(timeout);
            if let Err(e) = client.validate().await {
                tracing::error!("kubectl validation failed: {}", e);
                eprintln!("ERROR: {e}");
                return Ok(EXIT_SETUP_ERROR);
            }
            Box::new(client)
        }
        Backend::Api => match ApiClient::connect(args.context.as_deref()).await {
            Ok(client) => Box::new(client.with_timeout(timeout)),
            Err(e) => {
                tracing::error!("API client setup failed: {}", e);
                eprintln!("ERROR: {e}");
                return Ok(EXIT_SETUP_ERROR);
            }
        },
    };

    let (checks, policy) = match load_checks(args.checks_file.as_ref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("Failed to load checks: {}", e);
            eprintln!("ERROR: {}", load_failure(args.checks_file.as_deref(), &e));
            return Ok(EXIT_SETUP_ERROR);
        }
    };
    tracing::info!("Running {} check(s) via {:?}", checks.len(), args.backend);

    let is_tty = std::io::stdout().is_terminal();
    let use_spinner =
        args.output == OutputFormat::Table && is_tty && !args.no_spinner && args.concurrency <= 1;

    let mut results = if use_spinner {
        scan_with_spinner(&checks, query.as_ref(), &mut std::io::stdout(), is_tty).await?
    } else if args.concurrency > 1 {
        evaluate_concurrent(&checks, query.as_ref(), args.concurrency).await
    } else {
        evaluate_all(&checks, query.as_ref()).await
    };

    // Runs only once the whole batch is in
    let promoted = policy.reconcile(&mut results);
    tracing::debug!("Coverage policy promoted {} result(s)", promoted);

    let summary = Summary::from_results(&results);
    tracing::info!("Scan complete: {}", summary);

    match args.output {
        OutputFormat::Json => println!("{}", to_pretty_json(&ResultsPayload::new(&results))?),
        OutputFormat::Table => {
            if !args.no_banner {
                print!("{}", render_banner(is_tty));
            }
            print!("{}", render_results(&results, is_tty));
            println!();
            println!("{}", render_summary(&summary));
            println!(
                "Note: Cluster scaling is considered covered if Cluster Autoscaler or Karpenter is present."
            );
        }
    }

    Ok(summary.exit_status())
}

fn run_list_checks(args: ListArgs) -> Result<i32> {
    let checks = builtin_checks()?;
    match args.output {
        OutputFormat::Json => println!("{}", to_pretty_json(&ChecksPayload::new(&checks))?),
        OutputFormat::Table => {
            print!("{}", render_banner(std::io::stdout().is_terminal()));
            print!("{}", render_catalog(&checks));
        }
    }
    Ok(0)
}
