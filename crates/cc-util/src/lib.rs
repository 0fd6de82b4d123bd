//! cc-util — shared infrastructure for the cppcheck-rs workspace.
//!
//! Every other crate in the workspace depends on this one for the two
//! pieces of plumbing the rest of the pipeline needs but no single stage
//! owns: typed arena indices ([`index_vec`]) and source locations
//! ([`file_id`]). Neither is specific to tokens, the matcher, or any one
//! checker — they're the zero-cost newtypes the rest of the crates build
//! their domain types on top of.

pub mod file_id;
pub mod index_vec;

pub use file_id::{FileId, Loc};
pub use index_vec::{Idx, IndexVec};

pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
