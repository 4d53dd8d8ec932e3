use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use covview::cli::{self, Style};
use covview::record::DEFAULT_DATA_PATH;
use covview::session::{ConsolePrompt, Session};
use covview::source::LineScanner;

/// covview — terminal viewer for line-coverage data: per-file missing lines
/// and quality tiers, computed fresh from the coverage data file.
#[derive(Parser)]
#[command(name = "covview", version, about)]
struct Cli {
    /// Path to the coverage data file (default: ./.coverage)
    #[arg(long, global = true, default_value = DEFAULT_DATA_PATH)]
    data: PathBuf,

    /// Base directory for display paths (default: current directory).
    #[arg(long, global = true)]
    base: Option<PathBuf>,

    /// Exclusion marker pattern (default: "pragma: no cover").
    #[arg(long, global = true)]
    exclude: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-file coverage table with percentages and tiers.
    Files {
        /// Sort by coverage percentage ascending (show worst files first).
        #[arg(long)]
        sort_by_coverage: bool,

        /// Output style.
        #[arg(long, value_enum, default_value = "text")]
        style: Style,
    },

    /// Missing-line ranges for one source file.
    Missing {
        /// The source file (absolute, or relative to the base directory).
        source_file: String,
    },

    /// Annotated source listing for one source file.
    Show {
        /// The source file (absolute, or relative to the base directory).
        source_file: String,
    },

    /// Project-wide summary of the latest load.
    Summary,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let base = match args.base {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine working directory")?,
    };
    let base = base.to_string_lossy().into_owned();

    let scanner = match args.exclude.as_deref() {
        Some(pattern) => LineScanner::with_exclude_pattern(pattern)
            .context("Invalid --exclude pattern")?,
        None => LineScanner::new(),
    };

    let mut session = Session::new(&args.data, scanner);
    let outcome = session
        .load(&mut ConsolePrompt)
        .context("Coverage load aborted")?;

    for (path, err) in &outcome.skipped {
        eprintln!("Warning: skipping {path}: {err}");
    }

    let output = match args.command {
        Commands::Files {
            sort_by_coverage,
            style,
        } => cli::cmd_files(&outcome, &base, sort_by_coverage, &style)?,
        Commands::Missing { source_file } => cli::cmd_missing(&outcome, &base, &source_file)?,
        Commands::Show { source_file } => {
            cli::cmd_show(&outcome, session.record(), &base, &source_file)?
        }
        Commands::Summary => cli::cmd_summary(&outcome, &base, session.loaded_at())?,
    };
    print!("{output}");

    Ok(())
}
