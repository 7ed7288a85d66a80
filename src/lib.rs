//! Heuristic code index with call-graph analyses.
//!
//! `codescope` scans a project tree, extracts symbols and call sites with
//! language-aware patterns, and stores them in SQLite. On top of that index
//! it answers the questions agents and editors keep asking: what breaks if
//! this changes, where are the cycles, what is duplicated, what is dead.
//!
//! ```no_run
//! use codescope::{CodeIndex, IndexOptions, ImpactOptions};
//!
//! # fn main() -> codescope::Result<()> {
//! let index = CodeIndex::open("path/to/project")?;
//! index.index(&IndexOptions::default())?;
//! let impact = index.impact("save_user", &ImpactOptions::default())?;
//! for entry in &impact.impacted {
//!     println!("{} (depth {})", entry.symbol.name, entry.depth);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod extract;
pub mod graph;
pub mod indexer;
pub mod lang;
pub mod options;
pub mod query;
pub mod scan;
pub mod store;

use std::path::{Path, PathBuf};

use tracing::info;

use cache::{cache_key, ResultCache};

pub use error::{Error, Result};
pub use graph::{
    CircularAnalysis, Cycle, DuplicateAnalysis, DuplicateGroup, ImpactAnalysis, ImpactedSymbol,
    RiskLevel, UnusedAnalysis, UnusedSymbol,
};
pub use indexer::IndexStats;
pub use options::{
    CircularOptions, DuplicateOptions, ImpactOptions, IndexOptions, ScanOptions, UnusedOptions,
};
pub use query::FindResult;
pub use scan::FileInfo;
pub use store::{DatabaseInfo, SymbolKind, SymbolRecord};

/// Directory under the project root holding the index database.
const STORE_DIR: &str = ".codescope";
const STORE_FILE: &str = "index.db";

/// Facade over the store, indexer, queries, and graph analyses for one
/// project root. Cheap to clone handles internally; open once per project.
pub struct CodeIndex {
    root: PathBuf,
    store: store::SymbolStore,
    indexer: indexer::Indexer,
    query: query::QueryEngine,
    impact_cache: ResultCache<ImpactAnalysis>,
    circular_cache: ResultCache<CircularAnalysis>,
    duplicate_cache: ResultCache<DuplicateAnalysis>,
    unused_cache: ResultCache<UnusedAnalysis>,
}

impl CodeIndex {
    /// Open (creating if needed) the index for `root`. The database lives
    /// at `<root>/.codescope/index.db`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let store_dir = root.join(STORE_DIR);
        std::fs::create_dir_all(&store_dir)
            .map_err(|e| Error::io(store_dir.clone(), e))?;
        let db_path = store_dir.join(STORE_FILE);

        let store = store::SymbolStore::open(&db_path)?;
        info!(root = %root.display(), db = %db_path.display(), "index opened");
        Ok(Self {
            indexer: indexer::Indexer::new(store.clone()),
            query: query::QueryEngine::new(store.clone()),
            store,
            root,
            impact_cache: ResultCache::new(),
            circular_cache: ResultCache::new(),
            duplicate_cache: ResultCache::new(),
            unused_cache: ResultCache::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List the files an index run would consider, without indexing.
    pub fn scan(&self, options: &ScanOptions) -> Result<Vec<FileInfo>> {
        scan::scan(&self.root, options)
    }

    /// Run (or incrementally update) the index and drop all cached
    /// analysis results.
    pub fn index(&self, options: &IndexOptions) -> Result<IndexStats> {
        let stats = self.indexer.index(&self.root, options)?;
        self.invalidate_caches();
        Ok(stats)
    }

    /// Delete every indexed file, symbol, and edge.
    pub fn clear_index(&self) -> Result<()> {
        self.indexer.clear()?;
        self.invalidate_caches();
        Ok(())
    }

    pub fn find_symbol(
        &self,
        pattern: &str,
        kind: Option<SymbolKind>,
    ) -> Result<FindResult> {
        options::validate_pattern(pattern)?;
        self.ensure_indexed()?;
        self.query.find_symbol(pattern, kind)
    }

    /// Closest indexed names to `pattern`, best match first.
    pub fn fuzzy_suggestions(&self, pattern: &str, limit: usize) -> Result<Vec<String>> {
        options::validate_pattern(pattern)?;
        self.ensure_indexed()?;
        self.query.fuzzy_suggestions(pattern, limit)
    }

    pub fn list_symbols(
        &self,
        kind: Option<SymbolKind>,
        file_pattern: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SymbolRecord>> {
        self.ensure_indexed()?;
        self.query.list_symbols(kind, file_pattern, limit)
    }

    /// Transitive callers of `name` with per-caller risk scores.
    pub fn impact(&self, name: &str, options: &ImpactOptions) -> Result<ImpactAnalysis> {
        options::validate_pattern(name)?;
        self.ensure_indexed()?;

        let key = cache_key("impact", &(name, options));
        if let Some(hit) = self.impact_cache.get(&key) {
            return Ok(hit);
        }
        let graph = graph::CallGraph::load(&self.store)?;
        let result = graph::impact::analyze(&self.store, &graph, name, options)?;
        self.impact_cache.put(key, result.clone());
        Ok(result)
    }

    /// Dependency cycles between symbols, or between files with
    /// `options.by_file`.
    pub fn circular(&self, options: &CircularOptions) -> Result<CircularAnalysis> {
        self.ensure_indexed()?;

        let key = cache_key("circular", options);
        if let Some(hit) = self.circular_cache.get(&key) {
            return Ok(hit);
        }
        let graph = graph::CallGraph::load(&self.store)?;
        let result = graph::circular::analyze(&graph, options)?;
        self.circular_cache.put(key, result.clone());
        Ok(result)
    }

    /// Symbols whose normalized bodies are identical.
    pub fn duplicates(&self, options: &DuplicateOptions) -> Result<DuplicateAnalysis> {
        self.ensure_indexed()?;

        let key = cache_key("duplicates", options);
        if let Some(hit) = self.duplicate_cache.get(&key) {
            return Ok(hit);
        }
        let result = graph::duplicates::analyze(&self.store, options)?;
        self.duplicate_cache.put(key, result.clone());
        Ok(result)
    }

    /// Symbols with no incoming call edge, heuristically filtered.
    pub fn unused(&self, options: &UnusedOptions) -> Result<UnusedAnalysis> {
        self.ensure_indexed()?;

        let key = cache_key("unused", options);
        if let Some(hit) = self.unused_cache.get(&key) {
            return Ok(hit);
        }
        let result = graph::unused::analyze(&self.store, options)?;
        self.unused_cache.put(key, result.clone());
        Ok(result)
    }

    pub fn database_info(&self) -> Result<DatabaseInfo> {
        self.store.database_info()
    }

    /// Analyses over an empty index answer a different question than the
    /// caller asked; fail fast instead.
    fn ensure_indexed(&self) -> Result<()> {
        if self.store.file_count()? == 0 {
            return Err(Error::EmptyIndex);
        }
        Ok(())
    }

    fn invalidate_caches(&self) {
        self.impact_cache.invalidate_all();
        self.circular_cache.invalidate_all();
        self.duplicate_cache.invalidate_all();
        self.unused_cache.invalidate_all();
    }
}
