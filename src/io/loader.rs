//! Source loading for exercise directories.
//!
//! Collects the `.c` files directly under a directory and strips
//! preprocessor lines before the text reaches the parser. The directory is
//! always an explicit argument; there is no process-wide default path.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File content with `#`-prefixed lines already removed.
    pub content: String,
}

/// Load every `.c` file directly under `dir`, in file-name order.
pub fn load_directory(dir: &Path) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter();

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to read directory {}", dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_c_file(path) {
            continue;
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        files.push(SourceFile {
            path: path.to_path_buf(),
            content: strip_preprocessor_lines(&raw),
        });
    }

    Ok(files)
}

fn is_c_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "c")
}

/// Drop every line beginning with `#`. Preprocessor directives are outside
/// the parsed grammar subset and are excluded before extraction sees the
/// text.
pub fn strip_preprocessor_lines(source: &str) -> String {
    source
        .lines()
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn strips_only_hash_prefixed_lines() {
        let source = "#include <stdio.h>\nint x;\n#define N 3\n  #indented stays\n";
        assert_eq!(
            strip_preprocessor_lines(source),
            "int x;\n  #indented stays"
        );
    }

    #[test]
    fn loads_only_c_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.c"), "#include <x.h>\nint a;\n").unwrap();
        fs::write(dir.path().join("b.txt"), "not code").unwrap();
        fs::write(dir.path().join("c.c"), "int c;\n").unwrap();

        let files = load_directory(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].content, "int a;");
        assert_eq!(files[1].content, "int c;");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(load_directory(&missing).is_err());
    }
}
