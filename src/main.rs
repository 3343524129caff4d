use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use is_terminal::IsTerminal;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

mod ci;
mod classify;
mod config;
mod dashboard;
mod editor;
mod error;
mod menu;
mod references;
mod report;
mod scanner;
mod walk;

use classify::{classify_files, Summary};
use config::{Config, DEFAULT_CONFIG_FILE};
use error::ConnectorError;
use menu::{apply_strategy, prompt_fix_menu, Strategy};
use scanner::{find_root_readme, scan_all, MarkdownDocument};

/// md-connector - Check which Markdown files are reachable from the root README
#[derive(Parser)]
#[command(name = "md-connector")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (relative paths resolve against the project root)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan, report, and optionally link isolated files from the root README
    Check(CheckArgs),

    /// Print key=value coverage figures for CI scripts
    Outputs {
        /// Project root
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Directory names to exclude (can be repeated)
        #[arg(short, long)]
        exclude: Vec<String>,
    },
}

#[derive(Args)]
struct CheckArgs {
    /// Project root
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Directory names to exclude (can be repeated; replaces the configured list)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Output path for the markdown report
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Skip generating the report file
    #[arg(long)]
    no_report: bool,

    /// Exit with code 1 if any isolated files remain
    #[arg(long)]
    fail_on_isolated: bool,

    /// Link isolated files without prompting
    #[arg(long, value_enum)]
    fix: Option<Strategy>,

    /// Print the run summary as JSON instead of the dashboard
    #[arg(long)]
    json: bool,

    /// Never show the interactive fix menu
    #[arg(long)]
    no_interactive: bool,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check(args) => cmd_check(args, &cli.config, cli.quiet),
        Commands::Outputs { root, exclude } => cmd_outputs(&root, &exclude, &cli.config).map(|_| true),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MD_CONNECTOR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Canonical project root; anything but an existing directory is fatal
fn resolve_root(path: &Path) -> Result<PathBuf, ConnectorError> {
    match fs::canonicalize(path) {
        Ok(root) if root.is_dir() => Ok(root),
        _ => Err(ConnectorError::InvalidRoot(path.to_path_buf())),
    }
}

/// Files discovered and scanned under `root`, plus the root README if there is one.
/// The generated report is never part of the inventory.
fn scan_project(root: &Path, config: &Config) -> Result<(Vec<MarkdownDocument>, Option<PathBuf>)> {
    let start = Instant::now();
    let report_path = config.report_path(root);
    let mut paths = walk::discover(root, &config.exclude, config.respect_gitignore)?;
    paths.retain(|p| *p != report_path);
    let docs = scan_all(&paths, root);
    let root_readme = find_root_readme(&docs);

    tracing::debug!(files = docs.len(), elapsed = ?start.elapsed(), "scan finished");
    Ok((docs, root_readme))
}

/// Returns `Ok(false)` when strict mode fails the run
fn cmd_check(args: CheckArgs, config_path: &Path, quiet: bool) -> Result<bool> {
    let root = resolve_root(&args.root)?;

    let mut config = Config::load_or_default(config_path, &root)?;
    if !args.exclude.is_empty() {
        config.exclude = args.exclude;
    }
    if let Some(report) = args.report {
        config.report = report;
    }
    config.no_report |= args.no_report;
    config.fail_on_isolated |= args.fail_on_isolated;

    let chatty = !quiet && !args.json;

    let (docs, root_readme) = scan_project(&root, &config)?;
    if root_readme.is_none() {
        tracing::warn!(root = %root.display(), "no root README");
        if chatty {
            println!(
                "{}",
                "⚠️  No README.md found at project root — all MD files will be isolated.".yellow()
            );
        }
    }

    let classification = classify_files(&docs, root_readme.as_deref(), &root);
    let summary = Summary::new(&root, root_readme.as_deref(), &docs, classification);

    if args.json {
        println!("{}", summary.to_json()?);
    } else if !quiet {
        dashboard::print_dashboard(&summary);
    }

    if !config.no_report {
        let report_path = config.report_path(&root);
        report::write_report(&report_path, &summary)?;
        if chatty {
            println!("{} {}", "📄 Report written to:".green(), report_path.display().to_string().cyan());
        }
    }

    ci::sink_from_env().emit(&summary)?;

    let mut remaining = summary.isolated.len();
    if let Some(readme) = root_readme.as_deref().filter(|_| remaining > 0) {
        let outcome = if let Some(strategy) = args.fix {
            let outcome = apply_strategy(strategy, readme, &summary.isolated)?;
            if chatty {
                if let Some(o) = &outcome {
                    println!(
                        "{} Added {} link(s) under \"{}\"",
                        "✅".green(),
                        o.added.to_string().bold(),
                        o.section.cyan()
                    );
                }
            }
            outcome
        } else if !args.no_interactive && !args.json && io::stdin().is_terminal() {
            prompt_fix_menu(readme, &summary.isolated, &mut io::stdin().lock(), &mut io::stdout())?
        } else {
            None
        };

        if outcome.is_some_and(|o| o.added > 0) {
            remaining = classify_files(&docs, Some(readme), &root).isolated.len();
        }
    }

    if config.fail_on_isolated && remaining > 0 {
        println!(
            "{}",
            format!(
                "\n✖ Failing: {} isolated file(s) found. Fix them or remove --fail-on-isolated to suppress.",
                remaining
            )
            .red()
            .bold()
        );
        return Ok(false);
    }

    Ok(true)
}

fn cmd_outputs(root: &Path, exclude: &[String], config_path: &Path) -> Result<()> {
    let root = resolve_root(root)?;

    let mut config = Config::load_or_default(config_path, &root)?;
    if !exclude.is_empty() {
        config.exclude = exclude.to_vec();
    }

    let (docs, root_readme) = scan_project(&root, &config)?;
    let classification = classify_files(&docs, root_readme.as_deref(), &root);
    let summary = Summary::new(&root, root_readme.as_deref(), &docs, classification);

    for line in ci::output_lines(&summary) {
        println!("{}", line);
    }

    Ok(())
}
