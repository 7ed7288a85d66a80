// File scanning

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::lang::language_for_path;
use crate::options::{ScanOptions, DEFAULT_IGNORE_PATTERNS};

/// A file surviving the walk, with its content loaded.
#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub path: PathBuf,
    /// Path relative to the scan root, with forward slashes. Stable
    /// external identifier for the file.
    pub relative_path: String,
    pub language: Option<&'static str>,
    pub content: String,
    /// blake3 of the raw content, for change detection only.
    pub content_hash: String,
    pub size_bytes: u64,
    pub last_modified: i64,
}

impl FileInfo {
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// Walk `root` and load every indexable file.
///
/// Ignore rules combine the built-in defaults, nested `.gitignore` files
/// (merged top-down by the walker), and any caller-supplied patterns.
/// Unreadable and binary files are skipped, never fatal.
pub fn scan(root: &Path, options: &ScanOptions) -> Result<Vec<FileInfo>> {
    let root = root
        .canonicalize()
        .map_err(|e| Error::io(root.to_path_buf(), e))?;

    let mut overrides = OverrideBuilder::new(&root);
    for pattern in DEFAULT_IGNORE_PATTERNS
        .iter()
        .copied()
        .chain(options.ignore_patterns.iter().map(String::as_str))
    {
        // Override globs use "!" to mean "ignore".
        let inverted = format!("!{pattern}");
        if let Err(e) = overrides.add(&inverted) {
            warn!("skipping malformed ignore pattern {pattern:?}: {e}");
        }
    }
    let overrides = overrides
        .build()
        .map_err(|e| Error::validation(format!("bad ignore pattern set: {e}")))?;

    let walker = WalkBuilder::new(&root)
        .follow_links(options.follow_symlinks)
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .require_git(false)
        .overrides(overrides)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("walk error: {e}");
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if let Some(info) = load_file(&root, entry.path(), options) {
            files.push(info);
        }
    }

    debug!("scan of {} found {} files", root.display(), files.len());
    Ok(files)
}

/// Read one file into a `FileInfo`, or `None` if it should be skipped.
fn load_file(root: &Path, path: &Path, options: &ScanOptions) -> Option<FileInfo> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            debug!("skipping {}: {e}", path.display());
            return None;
        }
    };

    if metadata.len() > options.max_file_size {
        debug!(
            "skipping {} ({} bytes over limit)",
            path.display(),
            metadata.len()
        );
        return None;
    }

    let language = language_for_path(path);
    if let Some(allowed) = &options.languages {
        match language {
            Some(lang) if allowed.iter().any(|a| a == lang) => {}
            _ => return None,
        }
    }

    // Binary files fail UTF-8 decoding here and are silently dropped.
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            debug!("skipping {}: {e}", path.display());
            return None;
        }
    };

    let relative_path = path
        .strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/");

    let last_modified = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);

    Some(FileInfo {
        path: path.to_path_buf(),
        relative_path,
        language,
        content_hash: blake3::hash(content.as_bytes()).to_hex().to_string(),
        size_bytes: metadata.len(),
        last_modified,
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_scan_finds_source_files() {
        let dir = tempdir().unwrap();
        write(dir.path(), "src/main.ts", "function main() {}\n");
        write(dir.path(), "lib.py", "def helper():\n    pass\n");

        let files = scan(dir.path(), &ScanOptions::default()).unwrap();
        let mut paths: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();
        paths.sort();
        assert_eq!(paths, vec!["lib.py", "src/main.ts"]);
    }

    #[test]
    fn test_default_ignores_prune_directories() {
        let dir = tempdir().unwrap();
        write(dir.path(), "app.js", "const x = 1;\n");
        write(dir.path(), "node_modules/pkg/index.js", "module.exports = 1;\n");
        write(dir.path(), "target/debug/gen.rs", "fn x() {}\n");

        let files = scan(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, "app.js");
    }

    #[test]
    fn test_gitignore_is_honored() {
        let dir = tempdir().unwrap();
        write(dir.path(), ".gitignore", "generated/\n");
        write(dir.path(), "kept.py", "def kept():\n    pass\n");
        write(dir.path(), "generated/skipped.py", "def skipped():\n    pass\n");

        let files = scan(dir.path(), &ScanOptions::default()).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.relative_path.as_str()).collect();
        assert!(paths.contains(&"kept.py"));
        assert!(!paths.iter().any(|p| p.contains("generated")));
    }

    #[test]
    fn test_max_file_size_skips() {
        let dir = tempdir().unwrap();
        write(dir.path(), "big.js", &"x".repeat(4096));
        write(dir.path(), "small.js", "let y = 2;\n");

        let options = ScanOptions {
            max_file_size: 1024,
            ..Default::default()
        };
        let files = scan(dir.path(), &options).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].relative_path, "small.js");
    }

    #[test]
    fn test_language_allow_list() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.py", "def a():\n    pass\n");
        write(dir.path(), "b.rs", "fn b() {}\n");

        let options = ScanOptions {
            languages: Some(vec!["python".to_string()]),
            ..Default::default()
        };
        let files = scan(dir.path(), &options).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].language, Some("python"));
    }

    #[test]
    fn test_content_hash_changes_with_content() {
        let dir = tempdir().unwrap();
        write(dir.path(), "f.py", "def one():\n    pass\n");
        let first = scan(dir.path(), &ScanOptions::default()).unwrap();

        write(dir.path(), "f.py", "def two():\n    pass\n");
        let second = scan(dir.path(), &ScanOptions::default()).unwrap();

        assert_ne!(first[0].content_hash, second[0].content_hash);
    }
}
