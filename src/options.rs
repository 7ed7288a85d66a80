// In-memory option structs for the core API
//
// The presentation layer owns argument parsing and config files; the core
// only sees these typed options.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options for the file scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Extra gitignore-style patterns, merged on top of the defaults.
    pub ignore_patterns: Vec<String>,
    /// When set, only files whose inferred language is in this list are
    /// returned.
    pub languages: Option<Vec<String>>,
    /// Files larger than this are skipped.
    pub max_file_size: u64,
    pub follow_symlinks: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ignore_patterns: Vec::new(),
            languages: None,
            max_file_size: 1024 * 1024,
            follow_symlinks: false,
        }
    }
}

/// Patterns always excluded from scanning, regardless of caller options.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    "target",
    "dist",
    "build",
    "out",
    ".next",
    ".nuxt",
    "vendor",
    "__pycache__",
    ".venv",
    "venv",
    "coverage",
    ".codescope",
    "*.lock",
    "package-lock.json",
    "yarn.lock",
    "*.min.js",
    "*.map",
    "*.png",
    "*.jpg",
    "*.jpeg",
    "*.gif",
    "*.ico",
    "*.pdf",
    "*.zip",
    "*.tar",
    "*.gz",
    "*.wasm",
    "*.so",
    "*.dylib",
    "*.dll",
    "*.exe",
    "*.o",
    "*.a",
    "*.class",
    "*.pyc",
];

/// Options for an indexing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexOptions {
    pub scan: ScanOptions,
    /// Compare content hashes against the existing index and re-extract
    /// only changed files. Off means a full rebuild of every scanned file.
    pub update_existing: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            scan: ScanOptions::default(),
            update_existing: true,
        }
    }
}

/// Options for impact analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactOptions {
    pub max_depth: u32,
    /// Include a suggested order for applying the change (deepest callers
    /// first).
    pub suggest_order: bool,
}

impl Default for ImpactOptions {
    fn default() -> Self {
        Self {
            max_depth: 3,
            suggest_order: false,
        }
    }
}

/// Options for circular-dependency detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircularOptions {
    pub max_depth: u32,
    /// Report every enumerated cycle instead of deduplicating by canonical
    /// signature.
    pub show_all: bool,
    /// Collapse nodes to the file level before searching.
    pub by_file: bool,
}

impl Default for CircularOptions {
    fn default() -> Self {
        Self {
            max_depth: 10,
            show_all: false,
            by_file: false,
        }
    }
}

/// Options for duplicate-code detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateOptions {
    pub min_lines: u32,
    /// Restrict to one symbol kind (e.g. "function").
    pub kind: Option<String>,
    pub ignore_tests: bool,
}

impl Default for DuplicateOptions {
    fn default() -> Self {
        Self {
            min_lines: 5,
            kind: None,
            ignore_tests: true,
        }
    }
}

/// Options for unused-symbol detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnusedOptions {
    pub kind: Option<String>,
    /// Substring filter on the relative file path.
    pub file_pattern: Option<String>,
    pub min_lines: Option<u32>,
    /// Disable the false-positive exclusion heuristics and report every
    /// symbol without incoming edges (except imports/exports).
    pub strict: bool,
}

/// Reject a search pattern before it reaches the store.
pub fn validate_pattern(pattern: &str) -> Result<()> {
    let trimmed = pattern.trim();
    if trimmed.len() < 2 {
        return Err(Error::validation(format!(
            "search pattern too short: {trimmed:?} (need at least 2 characters)"
        )));
    }
    Ok(())
}
