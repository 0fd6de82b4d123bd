//! Source location identifiers.
//!
//! The analyzer never needs byte offsets or columns — per the token model,
//! a location is just a file index plus a 1-based line number. `FileId`
//! doubles as the position of a path in the file registry (index 0 is
//! always the top-level input file; anything else is an included header).

use std::fmt;

/// Index into the file registry. Index 0 is the top-level translation unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    pub const TOP_LEVEL: FileId = FileId(0);

    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl Default for FileId {
    #[inline]
    fn default() -> Self {
        Self::TOP_LEVEL
    }
}

impl crate::Idx for FileId {
    fn from_usize(idx: usize) -> Self {
        assert!(idx <= u32::MAX as usize);
        FileId(idx as u32)
    }
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A 1-based line number together with the file it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Loc {
    pub file: FileId,
    pub line: u32,
}

impl Loc {
    #[inline]
    pub const fn new(file: FileId, line: u32) -> Self {
        Self { file, line }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.0, self.line)
    }
}
