//! Diagnostic sink: a single append point shared by every checker.
//! Findings are never errors — a check that can't say anything about a
//! piece of code just stays silent.

use cc_util::FxHashSet;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn new(file: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]: {}", self.file, self.line, self.message)
    }
}

/// Append-only collector with per-file exact-string dedup. `show_all`
/// disables the dedup set entirely, for modes that want every occurrence.
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<(String, String)>,
    show_all: bool,
}

impl DiagnosticSink {
    pub fn new(show_all: bool) -> Self {
        Self {
            diagnostics: Vec::new(),
            seen: FxHashSet::default(),
            show_all,
        }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if !self.show_all {
            let key = (diagnostic.file.clone(), diagnostic.to_string());
            if !self.seen.insert(key) {
                return;
            }
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for d in diagnostics {
            self.push(d);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_file_line_message() {
        let d = Diagnostic::new("a.c", 3, "memory leak");
        assert_eq!(d.to_string(), "[a.c:3]: memory leak");
    }

    #[test]
    fn dedups_exact_duplicates_per_file() {
        let mut sink = DiagnosticSink::new(false);
        sink.push(Diagnostic::new("a.c", 3, "leak"));
        sink.push(Diagnostic::new("a.c", 3, "leak"));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn same_message_different_file_is_kept() {
        let mut sink = DiagnosticSink::new(false);
        sink.push(Diagnostic::new("a.c", 3, "leak"));
        sink.push(Diagnostic::new("b.c", 3, "leak"));
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn show_all_disables_dedup() {
        let mut sink = DiagnosticSink::new(true);
        sink.push(Diagnostic::new("a.c", 3, "leak"));
        sink.push(Diagnostic::new("a.c", 3, "leak"));
        assert_eq!(sink.len(), 2);
    }
}
