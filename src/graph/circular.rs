// Circular dependency detection

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use super::CallGraph;
use crate::options::CircularOptions;
use crate::Result;

/// Stop enumerating once this many cycles have been collected; dense graphs
/// can hold combinatorially many.
const MAX_CYCLES: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct Cycle {
    /// Participant names in traversal order.
    pub nodes: Vec<String>,
    /// Edge count; a 2-node cycle is the tightest coupling.
    pub strength: usize,
    pub hint: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CircularAnalysis {
    pub cycles: Vec<Cycle>,
    /// True when enumeration stopped at the cap.
    pub truncated: bool,
}

/// Find simple cycles in the call graph, tightest first. `by_file`
/// collapses symbols to their files, which reports module-level tangles
/// instead of mutual recursion.
pub fn analyze(graph: &CallGraph, options: &CircularOptions) -> Result<CircularAnalysis> {
    let (adjacency, labels) = if options.by_file {
        file_level_view(graph)
    } else {
        symbol_level_view(graph)
    };

    let mut found = enumerate_cycles(&adjacency, options.max_depth.max(2) as usize);
    let truncated = found.len() >= MAX_CYCLES;

    if !options.show_all {
        let mut seen: HashSet<Vec<i64>> = HashSet::new();
        found.retain(|cycle| {
            let mut signature = cycle.clone();
            signature.sort_unstable();
            seen.insert(signature)
        });
    }

    let mut cycles: Vec<Cycle> = found
        .into_iter()
        .map(|ids| {
            let nodes: Vec<String> = ids
                .iter()
                .filter_map(|id| labels.get(id).cloned())
                .collect();
            let strength = ids.len();
            let hint = hint_for(&nodes);
            Cycle {
                nodes,
                strength,
                hint,
            }
        })
        .collect();
    cycles.sort_by(|a, b| {
        a.strength
            .cmp(&b.strength)
            .then_with(|| a.nodes.cmp(&b.nodes))
    });

    debug!(cycles = cycles.len(), truncated, "cycle search done");
    Ok(CircularAnalysis { cycles, truncated })
}

fn symbol_level_view(graph: &CallGraph) -> (HashMap<i64, Vec<i64>>, HashMap<i64, String>) {
    let labels = graph
        .symbols
        .iter()
        .map(|(&id, s)| (id, s.name.clone()))
        .collect();
    (graph.forward.clone(), labels)
}

/// Collapse to file nodes, dropping intra-file edges.
fn file_level_view(graph: &CallGraph) -> (HashMap<i64, Vec<i64>>, HashMap<i64, String>) {
    let mut adjacency: HashMap<i64, Vec<i64>> = HashMap::new();
    let mut labels: HashMap<i64, String> = HashMap::new();

    for edge in &graph.edges {
        let Some(callee_file) = edge.callee_file_id else {
            continue;
        };
        if callee_file == edge.caller_file_id {
            continue;
        }
        adjacency
            .entry(edge.caller_file_id)
            .or_default()
            .push(callee_file);
        labels
            .entry(edge.caller_file_id)
            .or_insert_with(|| edge.caller_file_path.clone());
    }
    // Callee files may never appear as callers; name them from the symbol table
    for symbol in graph.symbols.values() {
        labels
            .entry(symbol.file_id)
            .or_insert_with(|| symbol.file_path.clone());
    }
    for list in adjacency.values_mut() {
        list.sort_unstable();
        list.dedup();
    }
    (adjacency, labels)
}

/// Enumerate simple cycles with a bounded-depth path search. A cycle is
/// reported only from its minimum node, so each comes out once.
fn enumerate_cycles(adjacency: &HashMap<i64, Vec<i64>>, max_len: usize) -> Vec<Vec<i64>> {
    struct Frame {
        node: i64,
        next: usize,
    }

    let mut starts: Vec<i64> = adjacency.keys().copied().collect();
    starts.sort_unstable();

    let mut cycles: Vec<Vec<i64>> = Vec::new();
    let empty: Vec<i64> = Vec::new();

    'outer: for &start in &starts {
        let mut stack = vec![Frame {
            node: start,
            next: 0,
        }];
        let mut path = vec![start];
        let mut on_path: HashSet<i64> = HashSet::from([start]);

        while let Some(frame) = stack.last_mut() {
            let neighbors = adjacency.get(&frame.node).unwrap_or(&empty);
            if frame.next < neighbors.len() {
                let next = neighbors[frame.next];
                frame.next += 1;

                if next == start && path.len() >= 2 {
                    cycles.push(path.clone());
                    if cycles.len() >= MAX_CYCLES {
                        break 'outer;
                    }
                } else if next > start && !on_path.contains(&next) && path.len() < max_len {
                    stack.push(Frame {
                        node: next,
                        next: 0,
                    });
                    path.push(next);
                    on_path.insert(next);
                }
            } else {
                stack.pop();
                if let Some(done) = path.pop() {
                    on_path.remove(&done);
                }
            }
        }
    }
    cycles
}

fn hint_for(nodes: &[String]) -> String {
    let lowered: Vec<String> = nodes.iter().map(|n| n.to_lowercase()).collect();
    let has = |needle: &str| lowered.iter().any(|n| n.contains(needle));
    if has("controller") && has("service") {
        return "layering violation: services should not call back into controllers".to_string();
    }
    match nodes {
        [a, b] => format!("extract the logic shared by '{a}' and '{b}' into a third unit"),
        [a, ..] => format!(
            "introduce an interface so '{a}' no longer depends on the rest of the cycle directly"
        ),
        [] => String::new(),
    }
}
