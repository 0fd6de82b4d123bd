//! cc-drv - Analyzer Driver
//!
//! ============================================================================
//! DRIVER OVERVIEW
//! ============================================================================
//!
//! The driver is the entry point and orchestrator for the analysis pipeline.
//! It owns the one piece of state the rest of the workspace is
//! deliberately built without: per-file session state. Earlier designs kept
//! the token store and diagnostic sink behind module-level statics; that
//! made two files analyzed back to back observably share state through
//! leftover dedup entries. [`AnalyzerSession`] replaces that with an
//! explicit, short-lived value constructed fresh for every file.
//!
//! ============================================================================
//! PIPELINE
//! ============================================================================
//!
//! ```text
//! source file
//!      │
//!      ▼
//! [B] Tokenizer ──────────▶ raw TokenStore   (cc-lex)
//!      │
//!      ▼ (clone)
//! [D] Simplifier ─────────▶ simplified TokenStore   (cc-simplify)
//!      │
//!      ▼
//! [E] Function index                          (cc-simplify)
//!      │
//!      ▼
//! [F, G] Leak analyzer + other checkers ──────▶ Diagnostics   (cc-check)
//!      │
//!      ▼
//! [H] Diagnostic sink ────────────────────────▶ stderr
//! ```
//!
//! The checker that needs the *un-simplified* list (unneeded header)
//! runs against the store captured before [D], everything else runs
//! against the simplified one — both survive side by side for exactly the
//! duration of one file's analysis and are dropped together at the end.
//!
//! ============================================================================
//! CONCURRENCY
//! ============================================================================
//!
//! Strictly single-threaded. The caller is responsible for sorting input
//! paths lexicographically before calling [`AnalyzerSession::run`]; the
//! session itself processes them in the order given, one at a time, to
//! completion, releasing that file's tokens before starting the next.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use cc_lex::{FileRegistry, Tokenizer, TokenStore};
use cc_simplify::{build_function_index, simplify};
use tracing::{debug, trace};

/// Run configuration. Mirrors the CLI flags one to one; the `cli`
/// crate is responsible for parsing argv into this shape.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// `--all`: disables per-file diagnostic dedup and enables the
    /// `strlen`-only dynamic-data-copy heuristic.
    pub show_all: bool,

    /// `--style`: enables the coding-style checks.
    pub style: bool,

    /// `--errorsonly`: suppresses the "Checking <file>..." / "No errors
    /// found" progress lines.
    pub errors_only: bool,
}

/// Outcome of analyzing one file, for callers that want to inspect results
/// rather than have them written straight to a stream.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: String,
    pub opened: bool,
    pub diagnostics: Vec<cc_check::Diagnostic>,
}

/// Owns the configuration for one invocation and drives every input file
/// through the pipeline in turn. Nothing on this type outlives the files
/// it was constructed to analyze.
pub struct AnalyzerSession {
    config: Config,
}

impl AnalyzerSession {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs the full pipeline over every path, writing progress to `out`
    /// and diagnostics to `err` as it goes (progress on stdout, findings on
    /// stderr). Returns a report per file for callers (tests,
    /// mainly) that want the structured result instead of formatted text.
    pub fn run<W: Write, E: Write>(&self, paths: &[PathBuf], out: &mut W, err: &mut E) -> Vec<FileReport> {
        paths.iter().map(|path| self.analyze_one(path, out, err)).collect()
    }

    fn analyze_one<W: Write, E: Write>(&self, path: &Path, out: &mut W, err: &mut E) -> FileReport {
        let display_path = normalize_path(path).to_string_lossy().into_owned();
        if !self.config.errors_only {
            let _ = writeln!(out, "Checking {display_path}...");
        }

        debug!(file = %display_path, "analyzing file");

        let mut raw_store = TokenStore::new();
        let mut files = FileRegistry::new();
        let opened = {
            let mut tokenizer = Tokenizer::new(&mut raw_store, &mut files);
            tokenizer.tokenize_top_level(&display_path)
        };

        if !opened {
            let _ = writeln!(err, "cannot open {display_path}");
            return FileReport { path: display_path, opened: false, diagnostics: Vec::new() };
        }

        let mut store = raw_store.clone();
        trace!(file = %display_path, "running simplifier to fixed point");
        simplify(&mut store);

        let functions = build_function_index(&store);
        trace!(file = %display_path, functions = functions.len(), "function index built");

        let sink = cc_check::run_all(&raw_store, &store, &files, &functions, self.config.show_all, self.config.style);

        if sink.is_empty() {
            if !self.config.errors_only {
                let _ = writeln!(out, "No errors found");
            }
        } else {
            for diagnostic in sink.iter() {
                let _ = writeln!(err, "{diagnostic}");
            }
        }

        FileReport { path: display_path, opened: true, diagnostics: sink.into_vec() }
    }
}

/// Collapses `.` and `..` path segments lexically, without touching the
/// filesystem — a diagnostic shows exactly the path the user supplied,
/// only normalized this far.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn collapses_current_dir_segments() {
        assert_eq!(normalize_path(Path::new("./a/./b.c")), PathBuf::from("a/b.c"));
    }

    #[test]
    fn collapses_parent_dir_segments() {
        assert_eq!(normalize_path(Path::new("a/b/../c.c")), PathBuf::from("a/c.c"));
    }

    #[test]
    fn leading_parent_dir_is_kept() {
        assert_eq!(normalize_path(Path::new("../a.c")), PathBuf::from("../a.c"));
    }

    #[test]
    fn missing_file_prints_cannot_open_and_continues() {
        let session = AnalyzerSession::new(Config::default());
        let mut out = Cursor::new(Vec::new());
        let mut err = Cursor::new(Vec::new());
        let reports = session.run(&[PathBuf::from("/no/such/file.c")], &mut out, &mut err);
        assert_eq!(reports.len(), 1);
        assert!(!reports[0].opened);
        let err_text = String::from_utf8(err.into_inner()).unwrap();
        assert!(err_text.contains("cannot open"));
    }

    #[test]
    fn clean_file_reports_no_errors_found() {
        let dir = std::env::temp_dir().join(format!("cc-drv-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("clean.c");
        std::fs::write(&file, "int main(){ return 0; }").unwrap();

        let session = AnalyzerSession::new(Config::default());
        let mut out = Cursor::new(Vec::new());
        let mut err = Cursor::new(Vec::new());
        let reports = session.run(&[file.clone()], &mut out, &mut err);

        assert!(reports[0].opened);
        assert!(reports[0].diagnostics.is_empty());
        let out_text = String::from_utf8(out.into_inner()).unwrap();
        assert!(out_text.contains("No errors found"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn leaking_file_reports_a_diagnostic_on_stderr() {
        let dir = std::env::temp_dir().join(format!("cc-drv-test-leak-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("leaky.c");
        std::fs::write(&file, "void f(){int*a=new int[10];}").unwrap();

        let session = AnalyzerSession::new(Config::default());
        let mut out = Cursor::new(Vec::new());
        let mut err = Cursor::new(Vec::new());
        let reports = session.run(&[file.clone()], &mut out, &mut err);

        assert_eq!(reports[0].diagnostics.len(), 1);
        let err_text = String::from_utf8(err.into_inner()).unwrap();
        assert!(err_text.contains("Memory leak: a"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn errors_only_suppresses_progress_lines() {
        let dir = std::env::temp_dir().join(format!("cc-drv-test-eo-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("clean.c");
        std::fs::write(&file, "int main(){ return 0; }").unwrap();

        let session = AnalyzerSession::new(Config { errors_only: true, ..Config::default() });
        let mut out = Cursor::new(Vec::new());
        let mut err = Cursor::new(Vec::new());
        session.run(&[file.clone()], &mut out, &mut err);

        assert!(String::from_utf8(out.into_inner()).unwrap().is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }
}
