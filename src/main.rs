use anyhow::{Context, Result};
use cancelcheck::config::{self, Config};
use cancelcheck::rule::Severity;
use cancelcheck::workspace::{FileAnalysis, FilePlan, Workspace};
use cancelcheck::Diagnostic;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cancelcheck")]
#[command(about = "Find and fix if statements that should call ThrowIfCancellationRequested()", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report cancellation checks that can be simplified
    Check {
        /// Files or directories to analyze (default: current directory)
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Config file (default: cancelcheck.toml in the current directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Rewrite cancellation checks in place
    Fix {
        /// Files or directories to fix (default: current directory)
        paths: Vec<PathBuf>,

        /// Show what would change without writing files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Config file (default: cancelcheck.toml in the current directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            paths,
            format,
            config,
        } => cmd_check(paths, format, config),
        Commands::Fix {
            paths,
            dry_run,
            diff,
            config,
        } => cmd_fix(paths, dry_run, diff, config),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

/// Logs go to stderr so JSON on stdout stays machine readable.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "cancelcheck=warn",
        1 => "cancelcheck=debug",
        _ => "cancelcheck=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Workspace rooted at the current directory with its configuration.
fn open_workspace(config_path: Option<PathBuf>) -> Result<Workspace> {
    let root = env::current_dir().context("cannot determine current directory")?;
    let config: Config = match config_path {
        Some(path) => config::load_from_path(&path)?,
        None => config::discover(&root)?,
    };
    Ok(Workspace::new(root, config))
}

fn source_files(workspace: &Workspace, paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let paths = if paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        paths
    };
    workspace.discover(&paths)
}

/// Analyze files, printing per-file failures and keeping the rest.
fn analyze(workspace: &Workspace, files: &[PathBuf]) -> (Vec<FileAnalysis>, usize) {
    let mut analyses = Vec::with_capacity(files.len());
    let mut failures = 0;
    for result in workspace.analyze(files) {
        match result {
            Ok(analysis) => analyses.push(analysis),
            Err(err) => {
                failures += 1;
                eprintln!("{} {err}", "error:".red().bold());
            }
        }
    }
    (analyses, failures)
}

fn cmd_check(paths: Vec<PathBuf>, format: OutputFormat, config: Option<PathBuf>) -> Result<ExitCode> {
    let workspace = open_workspace(config)?;
    let files = source_files(&workspace, paths);
    let (analyses, failures) = analyze(&workspace, &files);

    let diagnostics: Vec<&Diagnostic> = analyses
        .iter()
        .flat_map(|analysis| &analysis.diagnostics)
        .filter(|diagnostic| diagnostic.severity != Severity::Hidden)
        .collect();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&diagnostics)?);
        }
        OutputFormat::Text => {
            for diagnostic in &diagnostics {
                print_diagnostic(diagnostic);
            }
            let summary = format!(
                "{} issue(s) in {} file(s) checked",
                diagnostics.len(),
                files.len()
            );
            if diagnostics.is_empty() {
                eprintln!("{}", summary.green());
            } else {
                eprintln!("{}", summary.yellow());
            }
        }
    }

    Ok(if failures > 0 {
        ExitCode::from(2)
    } else if diagnostics.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let severity = diagnostic.severity.to_string();
    let severity = match diagnostic.severity {
        Severity::Error => severity.red().bold(),
        Severity::Warning => severity.yellow().bold(),
        Severity::Info | Severity::Hidden => severity.cyan(),
    };
    println!(
        "{}:{}:{}: {}[{}]: {}",
        diagnostic.location.file.display(),
        diagnostic.location.start.line,
        diagnostic.location.start.column,
        severity,
        diagnostic.id.dimmed(),
        diagnostic.message
    );
}

fn cmd_fix(
    paths: Vec<PathBuf>,
    dry_run: bool,
    show_diff: bool,
    config: Option<PathBuf>,
) -> Result<ExitCode> {
    let workspace = open_workspace(config)?;
    let files = source_files(&workspace, paths);
    let (analyses, mut failures) = analyze(&workspace, &files);

    let mut plans: Vec<FilePlan> = Vec::new();
    for analysis in &analyses {
        match workspace.plan(analysis) {
            Ok(Some(plan)) => plans.push(plan),
            Ok(None) => {}
            Err(err) => {
                failures += 1;
                eprintln!("{} {err}", "error:".red().bold());
            }
        }
    }

    if !dry_run && !plans.is_empty() {
        workspace.write(&plans)?;
    }

    for plan in &plans {
        if show_diff {
            display_diff(&plan.path, &plan.before, &plan.after);
        }
        let verb = if dry_run { "Would fix" } else { "Fixed" };
        println!(
            "{} {} in {}",
            verb.green(),
            plural(plan.fixed(), "statement"),
            plan.path.display()
        );
        for action in &plan.actions {
            println!(
                "  {}:{}: {}",
                action.start.line, action.start.column, action.title
            );
        }
        if plan.conflicts > 0 {
            println!(
                "  {}",
                format!("{} nested fix(es) skipped, run again", plan.conflicts).yellow()
            );
        }
    }

    if dry_run {
        println!("{}", "[DRY RUN - no files written]".cyan());
    }

    let total: usize = plans.iter().map(FilePlan::fixed).sum();
    eprintln!(
        "{} in {}",
        plural(total, "statement"),
        plural(plans.len(), "file")
    );

    Ok(if failures > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (fixed)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        println!("{}", hunk.header().to_string().cyan());
        for change in hunk.iter_changes() {
            let line = match change.tag() {
                ChangeTag::Delete => format!("-{change}").red(),
                ChangeTag::Insert => format!("+{change}").green(),
                ChangeTag::Equal => format!(" {change}").normal(),
            };
            print!("{line}");
        }
    }
}
