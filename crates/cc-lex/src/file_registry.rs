//! File registry: an ordered list of file paths. A token's file index
//! is its position in this list; index 0 is always the top-level input,
//! everything after it an included header, in the order first encountered.

use cc_util::FileId;

#[derive(Default)]
pub struct FileRegistry {
    paths: Vec<String>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self { paths: Vec::new() }
    }

    /// Registers a path and returns its `FileId`. Does not deduplicate —
    /// the tokenizer's include-resolution already tracks which paths have
    /// been seen (case-insensitively) before calling this.
    pub fn push(&mut self, path: impl Into<String>) -> FileId {
        let id = FileId::new(self.paths.len() as u32);
        self.paths.push(path.into());
        id
    }

    pub fn path(&self, id: FileId) -> &str {
        &self.paths[id.index()]
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_level_gets_index_zero() {
        let mut reg = FileRegistry::new();
        let id = reg.push("main.c");
        assert_eq!(id, FileId::TOP_LEVEL);
        assert_eq!(reg.path(id), "main.c");
    }

    #[test]
    fn includes_get_subsequent_indices() {
        let mut reg = FileRegistry::new();
        reg.push("main.c");
        let header = reg.push("util.h");
        assert_eq!(header.index(), 1);
        assert_eq!(reg.path(header), "util.h");
    }
}
