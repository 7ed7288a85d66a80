// Indexing pipeline: scan, extract, store

use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::extract::{ExtractedContext, ExtractorPipeline};
use crate::options::IndexOptions;
use crate::scan::{self, FileInfo};
use crate::store::SymbolStore;
use crate::Result;

/// Outcome of an index run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexStats {
    pub files_indexed: usize,
    pub files_skipped: usize,
    pub symbols_extracted: usize,
    pub total_tokens: u64,
    pub time_elapsed_ms: u64,
    pub errors: Vec<String>,
}

/// Coordinates scanning, extraction, and storage for a project root.
pub struct Indexer {
    store: SymbolStore,
    pipeline: ExtractorPipeline,
}

impl Indexer {
    pub fn new(store: SymbolStore) -> Self {
        Self {
            store,
            pipeline: ExtractorPipeline::new(),
        }
    }

    /// Index every file under `root`. Extraction runs in parallel across
    /// files; database writes are serialized so each file replacement stays
    /// a single transaction.
    pub fn index(&self, root: &Path, options: &IndexOptions) -> Result<IndexStats> {
        let started = Instant::now();
        let mut stats = IndexStats::default();

        let files = scan::scan(root, &options.scan)?;
        info!(files = files.len(), root = %root.display(), "indexing");

        // Incremental runs skip files whose content hash is unchanged.
        let mut to_extract: Vec<FileInfo> = Vec::with_capacity(files.len());
        for file in files {
            if options.update_existing {
                if let Some(existing) = self.store.file_by_path(&file.relative_path)? {
                    if existing.content_hash == file.content_hash {
                        debug!(path = %file.relative_path, "unchanged, skipping");
                        stats.files_skipped += 1;
                        continue;
                    }
                }
            }
            to_extract.push(file);
        }

        let extracted: Vec<(FileInfo, ExtractedContext, bool)> = to_extract
            .into_par_iter()
            .map(|file| {
                let (context, errored) = self.pipeline.extract(&file);
                (file, context, errored)
            })
            .collect();

        for (file, context, errored) in extracted {
            if errored {
                stats
                    .errors
                    .push(format!("extraction failed: {}", file.relative_path));
            }
            stats.symbols_extracted += context.symbols.len();
            stats.total_tokens += estimate_tokens(&file.content);
            self.store
                .replace_file(&file, &context.symbols, &context.calls)?;
            stats.files_indexed += 1;
        }

        // Callee resolution needs every file's symbols in place first.
        let resolved = self.store.resolve_callees()?;
        self.store.set_last_indexed(crate::store::db::now())?;

        stats.time_elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            indexed = stats.files_indexed,
            skipped = stats.files_skipped,
            symbols = stats.symbols_extracted,
            resolved_edges = resolved,
            elapsed_ms = stats.time_elapsed_ms,
            "index complete"
        );
        Ok(stats)
    }

    /// Drop all indexed data.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}

/// Rough token estimate: whitespace-separated words scaled by 4/3, the
/// usual words-to-LLM-tokens ratio for source text.
fn estimate_tokens(content: &str) -> u64 {
    let words = content.split_whitespace().count() as u64;
    words * 4 / 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ScanOptions;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    fn open_indexer(dir: &TempDir) -> (Indexer, SymbolStore) {
        let store = SymbolStore::open(dir.path().join("index.db")).unwrap();
        (Indexer::new(store.clone()), store)
    }

    #[test]
    fn test_index_basic_project() {
        let dir = TempDir::new().unwrap();
        write(&dir, "app.js", "function main() {\n  helper();\n}\nfunction helper() {}\n");
        let (indexer, store) = open_indexer(&dir);

        let stats = indexer.index(dir.path(), &IndexOptions::default()).unwrap();
        assert_eq!(stats.files_indexed, 1);
        assert!(stats.symbols_extracted >= 2);
        assert!(stats.total_tokens > 0);
        assert!(stats.errors.is_empty());
        assert_eq!(store.file_count().unwrap(), 1);
    }

    #[test]
    fn test_reindex_skips_unchanged_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.py", "def one():\n    pass\n");
        write(&dir, "b.py", "def two():\n    pass\n");
        let (indexer, _store) = open_indexer(&dir);

        let options = IndexOptions::default();
        indexer.index(dir.path(), &options).unwrap();

        let second = indexer.index(dir.path(), &options).unwrap();
        assert_eq!(second.files_indexed, 0);
        assert_eq!(second.files_skipped, 2);
    }

    #[test]
    fn test_reindex_picks_up_changed_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.py", "def one():\n    pass\n");
        let (indexer, store) = open_indexer(&dir);

        let options = IndexOptions::default();
        indexer.index(dir.path(), &options).unwrap();

        write(&dir, "a.py", "def one():\n    pass\n\ndef two():\n    pass\n");
        let stats = indexer.index(dir.path(), &options).unwrap();
        assert_eq!(stats.files_indexed, 1);
        assert_eq!(store.symbols_by_name("two").unwrap().len(), 1);
    }

    #[test]
    fn test_cross_file_edges_resolve() {
        let dir = TempDir::new().unwrap();
        write(&dir, "util.js", "function format(x) { return x; }\n");
        write(&dir, "main.js", "function run() {\n  format(1);\n}\n");
        let (indexer, store) = open_indexer(&dir);

        indexer.index(dir.path(), &IndexOptions::default()).unwrap();

        let edges = store.all_edges().unwrap();
        let edge = edges
            .iter()
            .find(|e| e.callee_name == "format")
            .expect("call edge to format");
        assert!(edge.callee_id.is_some());
    }

    #[test]
    fn test_clear_empties_store() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.py", "def one():\n    pass\n");
        let (indexer, store) = open_indexer(&dir);

        indexer.index(dir.path(), &IndexOptions::default()).unwrap();
        indexer.clear().unwrap();
        assert_eq!(store.file_count().unwrap(), 0);
    }

    #[test]
    fn test_full_reindex_when_update_disabled() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.py", "def one():\n    pass\n");
        let (indexer, _store) = open_indexer(&dir);

        let options = IndexOptions {
            scan: ScanOptions::default(),
            update_existing: false,
        };
        indexer.index(dir.path(), &options).unwrap();
        let second = indexer.index(dir.path(), &options).unwrap();
        assert_eq!(second.files_indexed, 1);
        assert_eq!(second.files_skipped, 0);
    }
}
