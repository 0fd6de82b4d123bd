//! cppcheck CLI - command-line front end for the analyzer.
//!
//! This is the thin shell around `cc-drv`: parse argv into a `cc_drv::Config`
//! plus a list of paths, let the external file lister expand `--recursive`
//! directories, and hand the rest to `AnalyzerSession`.

mod error;
mod file_lister;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cc_drv::{AnalyzerSession, Config};
use error::{CliError, Result};

/// A static analyzer for C and C++ source files.
#[derive(Parser, Debug)]
#[command(name = "cppcheck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A static analyzer for C and C++ source files", long_about = None)]
struct Cli {
    /// Show every occurrence of a diagnostic instead of deduping per file,
    /// and enable the strlen-only dynamic-data-copy heuristic.
    #[arg(long)]
    all: bool,

    /// Enable the coding-style checks.
    #[arg(long)]
    style: bool,

    /// Suppress the "Checking <file>..." / "No errors found" progress lines.
    #[arg(long = "errorsonly")]
    errors_only: bool,

    /// Treat each PATH as a directory to search recursively for .c/.cc/.cpp
    /// files, rather than an explicit file path.
    #[arg(long)]
    recursive: bool,

    /// Files (or, with --recursive, directories) to analyze.
    paths: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    if cli.paths.is_empty() {
        let mut command = <Cli as clap::CommandFactory>::command();
        let _ = command.print_help();
        println!();
        return Ok(());
    }

    let mut files = Vec::new();
    for path in &cli.paths {
        file_lister::recursive_add_files(&mut files, path, cli.recursive);
    }
    files.sort();
    files.dedup();

    let config = Config {
        show_all: cli.all,
        style: cli.style,
        errors_only: cli.errors_only,
    };

    let session = AnalyzerSession::new(config);
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    session.run(&files, &mut stdout.lock(), &mut stderr.lock());

    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    let subscriber = fmt::layer().with_target(false).with_thread_ids(false).with_thread_names(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| CliError::Logging(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_style_flags_and_paths() {
        let cli = Cli::parse_from(["cppcheck", "--all", "--style", "a.c", "b.cpp"]);
        assert!(cli.all);
        assert!(cli.style);
        assert!(!cli.errors_only);
        assert!(!cli.recursive);
        assert_eq!(cli.paths, vec![PathBuf::from("a.c"), PathBuf::from("b.cpp")]);
    }

    #[test]
    fn parses_errorsonly_and_recursive() {
        let cli = Cli::parse_from(["cppcheck", "--errorsonly", "--recursive", "src"]);
        assert!(cli.errors_only);
        assert!(cli.recursive);
    }

    #[test]
    fn no_paths_parses_to_empty_vec() {
        let cli = Cli::parse_from(["cppcheck"]);
        assert!(cli.paths.is_empty());
    }
}
