mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use warmy_core::WarmyConfig;
use warmy_difflens::focus::FocusMatcher;
use warmy_gitscan::analyze::analyze_commit;

#[derive(Parser)]
#[command(
    name = "warmy",
    version,
    about = "Extract one commit's changes as JSON and flag the ones that matter",
    long_about = "Warmy analyzes a single git commit and emits a JSON report: per-file change\n\
                   records with synthesized diffs, added and deleted lines, commit statistics,\n\
                   and \"focus\" files selected by path and content patterns.\n\n\
                   Configuration is read from --config, else .warmy.toml, else config.json.\n\n\
                   Examples:\n  \
                     warmy                              Analyze HEAD of the current directory\n  \
                     warmy --repo ../rules --commit v2  Analyze a tag in another repository\n  \
                     warmy --no-file --compact | jq .   Print compact JSON only\n  \
                     warmy init                         Write a default .warmy.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .warmy.toml, then config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Repository to analyze
    #[arg(long)]
    repo: Option<PathBuf>,

    /// Commit hash, unique prefix, or revision (default: HEAD)
    #[arg(long)]
    commit: Option<String>,

    /// Directory for the report file
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Do not write the report file
    #[arg(long)]
    no_file: bool,

    /// Do not print the report to stdout
    #[arg(long)]
    no_console: bool,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,

    /// Log filter used when RUST_LOG is unset (e.g. debug, warn)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Create a default .warmy.toml in the current directory
    Init,
}

const DEFAULT_CONFIG: &str = r#"# Warmy Configuration

# repo_path = "."
# commit_hash = ""          # empty means HEAD
# pretty_json = true
# max_diff_size = 1048576   # per-file diff text ceiling in bytes
# include_full_diff = false
# parse_diff = true
# output_dir = "."
# no_file = false
# no_console = false
# log_level = "info"

[focus]
# enable = true
# add_files = true
# modify_files = true
# delete_files = true
# file_patterns = ['.*\.ya?ml$']
# ignore_patterns = ['digest', '^\s*#']
"#;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();

    if let Some(Command::Init) = cli.command {
        let path = std::path::Path::new(".warmy.toml");
        if path.exists() {
            miette::bail!(".warmy.toml already exists");
        }
        std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
        println!("Created .warmy.toml with default configuration");
        return Ok(());
    }

    let cwd = std::env::current_dir().into_diagnostic()?;
    let mut config = WarmyConfig::discover(cli.config.as_deref(), &cwd)?;
    apply_overrides(&cli, &mut config);

    init_tracing(&config.log_level);
    info!(
        repo = %config.repo_path.display(),
        commit = config.commit_hash.as_str(),
        "starting analysis"
    );

    let matcher = FocusMatcher::new(&config.focus)?;
    let mut report = analyze_commit(&config, &matcher)?;

    if !config.no_file {
        let name = output::report_file_name(&report);
        report = report.with_output_file(name);
    }
    let json = report.to_json(config.pretty_json)?;

    if !config.no_file {
        match output::write_report(&config.output_dir, &report.output_file, &json) {
            Ok(path) => info!(path = %path.display(), "report written"),
            Err(e) => error!(
                error = %e,
                dir = %config.output_dir.display(),
                "failed to write report"
            ),
        }
    }

    if !config.no_console {
        println!("{json}");
    }

    Ok(())
}

fn apply_overrides(cli: &Cli, config: &mut WarmyConfig) {
    if let Some(repo) = &cli.repo {
        config.repo_path = repo.clone();
    }
    if let Some(commit) = &cli.commit {
        config.commit_hash = commit.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.no_file |= cli.no_file;
    config.no_console |= cli.no_console;
    if cli.compact {
        config.pretty_json = false;
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
