//! File lister: walks a directory tree
//! collecting files whose extension is `.c`, `.cc`, or `.cpp`, matched
//! case-insensitively. Dotfiles and dot-directories are skipped, same as
//! the glob-based walk this is modeled on skipped `.` and `..`.

use std::path::{Path, PathBuf};

use tracing::trace;

const ACCEPTED_EXTENSIONS: &[&str] = &["c", "cc", "cpp"];

fn is_dotted(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.starts_with('.'))
}

fn accept_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ACCEPTED_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

/// Recursively collects accepted files under `root`. If `recursive` is
/// false, `root` is returned as-is (the caller already treats it as an
/// explicit file path, not something to list).
pub fn recursive_add_files(out: &mut Vec<PathBuf>, root: &Path, recursive: bool) {
    if !recursive {
        out.push(root.to_path_buf());
        return;
    }

    let Ok(entries) = std::fs::read_dir(root) else {
        trace!(path = %root.display(), "could not list directory");
        return;
    };

    let mut children: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    children.sort();

    for path in children {
        if is_dotted(&path) {
            continue;
        }
        if path.is_dir() {
            recursive_add_files(out, &path, true);
        } else if accept_file(&path) {
            out.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TempDir {
        path: PathBuf,
    }

    impl TempDir {
        fn new(tag: &str) -> Self {
            let path = std::env::temp_dir().join(format!("cli-file-lister-{tag}-{}", std::process::id()));
            std::fs::create_dir_all(&path).unwrap();
            Self { path }
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.path).ok();
        }
    }

    #[test]
    fn collects_accepted_extensions_case_insensitively() {
        let dir = TempDir::new("ext");
        std::fs::write(dir.path.join("a.C"), "").unwrap();
        std::fs::write(dir.path.join("b.CPP"), "").unwrap();
        std::fs::write(dir.path.join("notes.txt"), "").unwrap();

        let mut out = Vec::new();
        recursive_add_files(&mut out, &dir.path, true);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn skips_dotfiles_and_dot_directories() {
        let dir = TempDir::new("dot");
        std::fs::write(dir.path.join(".hidden.c"), "").unwrap();
        std::fs::create_dir(dir.path.join(".git")).unwrap();
        std::fs::write(dir.path.join(".git").join("x.c"), "").unwrap();
        std::fs::write(dir.path.join("visible.c"), "").unwrap();

        let mut out = Vec::new();
        recursive_add_files(&mut out, &dir.path, true);
        assert_eq!(out, vec![dir.path.join("visible.c")]);
    }

    #[test]
    fn recurses_into_subdirectories() {
        let dir = TempDir::new("nested");
        std::fs::create_dir(dir.path.join("sub")).unwrap();
        std::fs::write(dir.path.join("sub").join("deep.c"), "").unwrap();

        let mut out = Vec::new();
        recursive_add_files(&mut out, &dir.path, true);
        assert_eq!(out, vec![dir.path.join("sub").join("deep.c")]);
    }

    #[test]
    fn non_recursive_keeps_given_path_verbatim() {
        let mut out = Vec::new();
        recursive_add_files(&mut out, Path::new("given.c"), false);
        assert_eq!(out, vec![PathBuf::from("given.c")]);
    }
}
