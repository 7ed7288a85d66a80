//! Call-graph analyses over the indexed edge table.
//!
//! All four analyses work on the same in-memory adjacency view built from
//! one pass over the store. Traversals are iterative; recursion depth would
//! otherwise track user code shape.

pub mod circular;
pub mod duplicates;
pub mod impact;
pub mod unused;

use std::collections::HashMap;

use crate::store::{CallKind, EdgeRow, SymbolRecord, SymbolStore};
use crate::Result;

pub use circular::{CircularAnalysis, Cycle};
pub use duplicates::{DuplicateAnalysis, DuplicateGroup};
pub use impact::{ImpactAnalysis, ImpactedSymbol, RiskLevel};
pub use unused::{UnusedAnalysis, UnusedSymbol};

/// Adjacency view over resolved call edges, plus a symbol lookup table.
/// Import edges are excluded; they model dependencies, not calls.
pub struct CallGraph {
    /// caller id -> callee ids
    pub forward: HashMap<i64, Vec<i64>>,
    /// callee id -> caller ids
    pub reverse: HashMap<i64, Vec<i64>>,
    pub symbols: HashMap<i64, SymbolRecord>,
    pub edges: Vec<EdgeRow>,
}

impl CallGraph {
    /// Snapshot the store into adjacency maps. Unresolved edges (callee_id
    /// NULL) are kept in `edges` for name-based fallbacks but contribute no
    /// adjacency.
    pub fn load(store: &SymbolStore) -> Result<Self> {
        let edges = store.all_edges()?;
        let symbols: HashMap<i64, SymbolRecord> = store
            .all_symbols()?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut forward: HashMap<i64, Vec<i64>> = HashMap::new();
        let mut reverse: HashMap<i64, Vec<i64>> = HashMap::new();
        for edge in &edges {
            if edge.kind == CallKind::Import {
                continue;
            }
            if let Some(callee_id) = edge.callee_id {
                forward.entry(edge.caller_id).or_default().push(callee_id);
                reverse.entry(callee_id).or_default().push(edge.caller_id);
            }
        }
        for list in forward.values_mut() {
            list.sort_unstable();
            list.dedup();
        }
        for list in reverse.values_mut() {
            list.sort_unstable();
            list.dedup();
        }

        Ok(Self {
            forward,
            reverse,
            symbols,
            edges,
        })
    }

    pub fn callers(&self, id: i64) -> &[i64] {
        self.reverse.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn callees(&self, id: i64) -> &[i64] {
        self.forward.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn symbol(&self, id: i64) -> Option<&SymbolRecord> {
        self.symbols.get(&id)
    }
}

/// True for paths that look like test, example, or generated code. Shared
/// between the unused and duplicate analyses.
pub(crate) fn is_test_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.contains("/test")
        || lower.contains("/tests/")
        || lower.contains("/spec/")
        || lower.contains("/__tests__/")
        || lower.contains("/fixtures/")
        || lower.starts_with("test")
        || lower.ends_with("_test.go")
        || lower.ends_with("_test.py")
        || lower.ends_with(".test.js")
        || lower.ends_with(".test.ts")
        || lower.ends_with(".spec.js")
        || lower.ends_with(".spec.ts")
}
