// Change-impact analysis: who breaks if this symbol changes

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;
use tracing::debug;

use super::CallGraph;
use crate::error::{Error, Result};
use crate::options::ImpactOptions;
use crate::store::{SymbolKind, SymbolRecord, SymbolStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    fn from_score(score: u64) -> Self {
        if score > 10 {
            RiskLevel::High
        } else if score > 5 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactedSymbol {
    pub symbol: SymbolRecord,
    /// Call-graph distance from the target; direct callers are depth 1.
    pub depth: u32,
    pub risk_score: u64,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactAnalysis {
    pub target: String,
    pub seeds: Vec<SymbolRecord>,
    /// Transitive callers ordered by depth, then path.
    pub impacted: Vec<ImpactedSymbol>,
    /// Impacted symbol names grouped per depth level, starting at depth 1.
    pub levels: Vec<Vec<String>>,
    /// Files mentioning the target by text when the call graph has no
    /// resolved callers. Names the blind spot instead of reporting zero.
    pub text_references: Vec<String>,
    /// Suggested update order, target first then outward by depth.
    pub suggested_order: Vec<String>,
    pub high_risk_count: usize,
    pub direct_caller_count: usize,
    /// Distinct files touched by the impacted set.
    pub files_affected: usize,
}

/// Walk the reverse call graph outward from every definition of `name`.
pub fn analyze(
    store: &SymbolStore,
    graph: &CallGraph,
    name: &str,
    options: &ImpactOptions,
) -> Result<ImpactAnalysis> {
    let seeds: Vec<SymbolRecord> = store
        .symbols_by_name(name)?
        .into_iter()
        .filter(|s| s.kind != SymbolKind::Import && s.kind != SymbolKind::Export)
        .collect();
    if seeds.is_empty() {
        return Err(Error::NotFound(format!("symbol '{name}'")));
    }

    let max_depth = options.max_depth.max(1);
    let mut depths: HashMap<i64, u32> = HashMap::new();
    let mut queue: VecDeque<(i64, u32)> = VecDeque::new();
    let mut visited: HashSet<i64> = HashSet::new();

    for seed in &seeds {
        visited.insert(seed.id);
        queue.push_back((seed.id, 0));
    }

    while let Some((id, depth)) = queue.pop_front() {
        if depth >= max_depth {
            continue;
        }
        for &caller in graph.callers(id) {
            if visited.insert(caller) {
                depths.insert(caller, depth + 1);
                queue.push_back((caller, depth + 1));
            }
        }
    }

    let mut impacted: Vec<ImpactedSymbol> = Vec::with_capacity(depths.len());
    for (&id, &depth) in &depths {
        let Some(symbol) = graph.symbol(id) else {
            continue;
        };
        let references = store.reference_count(&symbol.name)?;
        // Closer callers carry more of the blast radius
        let score = u64::from(max_depth + 1 - depth) * references.max(1);
        impacted.push(ImpactedSymbol {
            symbol: symbol.clone(),
            depth,
            risk_score: score,
            risk: RiskLevel::from_score(score),
        });
    }
    impacted.sort_by(|a, b| {
        a.depth
            .cmp(&b.depth)
            .then_with(|| a.symbol.file_path.cmp(&b.symbol.file_path))
            .then_with(|| a.symbol.line_start.cmp(&b.symbol.line_start))
    });

    let mut levels: Vec<Vec<String>> = Vec::new();
    for entry in &impacted {
        let idx = (entry.depth - 1) as usize;
        while levels.len() <= idx {
            levels.push(Vec::new());
        }
        levels[idx].push(entry.symbol.name.clone());
    }

    // No resolved callers at all: surface text mentions so the caller knows
    // the graph may simply be under-resolved.
    let text_references = if impacted.is_empty() {
        let seed_files: HashSet<&str> = seeds.iter().map(|s| s.file_path.as_str()).collect();
        store
            .files_containing(name)?
            .into_iter()
            .map(|(_, path)| path)
            .filter(|path| !seed_files.contains(path.as_str()))
            .collect()
    } else {
        Vec::new()
    };
    debug!(
        target = name,
        impacted = impacted.len(),
        text_refs = text_references.len(),
        "impact walk done"
    );

    let suggested_order = if options.suggest_order {
        let mut order = vec![name.to_string()];
        order.extend(impacted.iter().map(|e| e.symbol.name.clone()));
        order.dedup();
        order
    } else {
        Vec::new()
    };

    let high_risk_count = impacted
        .iter()
        .filter(|e| e.risk == RiskLevel::High)
        .count();
    let direct_caller_count = impacted.iter().filter(|e| e.depth == 1).count();
    let files_affected = impacted
        .iter()
        .map(|e| e.symbol.file_path.as_str())
        .collect::<HashSet<_>>()
        .len();

    Ok(ImpactAnalysis {
        target: name.to_string(),
        seeds,
        impacted,
        levels,
        text_references,
        suggested_order,
        high_risk_count,
        direct_caller_count,
        files_affected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::indexed_store;

    const CHAIN: &[(&str, &str)] = &[
        (
            "core.js",
            "function save(record) {\n  return record;\n}\n",
        ),
        (
            "service.js",
            "function createUser(data) {\n  return save(data);\n}\n",
        ),
        (
            "api.js",
            "function handleRequest(req) {\n  return createUser(req.body);\n}\n",
        ),
    ];

    #[test]
    fn test_direct_and_transitive_callers() {
        let (_dir, store) = indexed_store(CHAIN);
        let graph = CallGraph::load(&store).unwrap();
        let result = analyze(&store, &graph, "save", &ImpactOptions::default()).unwrap();

        assert_eq!(result.impacted.len(), 2);
        assert_eq!(result.impacted[0].symbol.name, "createUser");
        assert_eq!(result.impacted[0].depth, 1);
        assert_eq!(result.impacted[1].symbol.name, "handleRequest");
        assert_eq!(result.impacted[1].depth, 2);
        assert_eq!(result.levels.len(), 2);
        assert_eq!(result.direct_caller_count, 1);
        assert_eq!(result.files_affected, 2);
        assert!(result.text_references.is_empty());
    }

    #[test]
    fn test_depth_limit_truncates_walk() {
        let (_dir, store) = indexed_store(CHAIN);
        let graph = CallGraph::load(&store).unwrap();
        let options = ImpactOptions {
            max_depth: 1,
            ..ImpactOptions::default()
        };
        let result = analyze(&store, &graph, "save", &options).unwrap();
        assert_eq!(result.impacted.len(), 1);
        assert_eq!(result.impacted[0].symbol.name, "createUser");
    }

    #[test]
    fn test_closer_callers_score_higher() {
        let (_dir, store) = indexed_store(CHAIN);
        let graph = CallGraph::load(&store).unwrap();
        let result = analyze(&store, &graph, "save", &ImpactOptions::default()).unwrap();
        assert!(result.impacted[0].risk_score >= result.impacted[1].risk_score);
    }

    #[test]
    fn test_text_fallback_when_no_resolved_callers() {
        let (_dir, store) = indexed_store(&[
            ("lonely.js", "function orphan() {\n  return 1;\n}\n"),
            ("notes.js", "// orphan is scheduled for removal\nfunction other() {}\n"),
        ]);
        let graph = CallGraph::load(&store).unwrap();
        let result = analyze(&store, &graph, "orphan", &ImpactOptions::default()).unwrap();
        assert!(result.impacted.is_empty());
        assert_eq!(result.text_references, vec!["notes.js".to_string()]);
    }

    #[test]
    fn test_suggest_order_starts_with_target() {
        let (_dir, store) = indexed_store(CHAIN);
        let graph = CallGraph::load(&store).unwrap();
        let options = ImpactOptions {
            suggest_order: true,
            ..ImpactOptions::default()
        };
        let result = analyze(&store, &graph, "save", &options).unwrap();
        assert_eq!(
            result.suggested_order,
            vec!["save", "createUser", "handleRequest"]
        );
    }

    #[test]
    fn test_unknown_symbol_is_not_found() {
        let (_dir, store) = indexed_store(CHAIN);
        let graph = CallGraph::load(&store).unwrap();
        let err = analyze(&store, &graph, "missing", &ImpactOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_cycle_terminates() {
        let (_dir, store) = indexed_store(&[(
            "loop.js",
            "function ping() {\n  pong();\n}\nfunction pong() {\n  ping();\n}\n",
        )]);
        let graph = CallGraph::load(&store).unwrap();
        let result = analyze(&store, &graph, "ping", &ImpactOptions::default()).unwrap();
        assert_eq!(result.impacted.len(), 1);
        assert_eq!(result.impacted[0].symbol.name, "pong");
    }
}
