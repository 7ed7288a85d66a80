// Unused symbol detection

use serde::Serialize;
use tracing::debug;

use super::is_test_path;
use crate::error::Result;
use crate::options::UnusedOptions;
use crate::store::{SymbolKind, SymbolRecord, SymbolStore};

#[derive(Debug, Clone, Serialize)]
pub struct UnusedSymbol {
    pub symbol: SymbolRecord,
    /// Exported symbols may be consumed outside the indexed tree; callers
    /// should treat these as lower confidence.
    pub exported: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnusedAnalysis {
    pub symbols: Vec<UnusedSymbol>,
    /// Candidates dropped by the exclusion heuristics, for transparency.
    pub excluded_count: usize,
}

/// Entry points a framework or runtime calls without a visible call site.
const LIFECYCLE_NAMES: &[&str] = &[
    "main",
    "init",
    "setup",
    "teardown",
    "start",
    "stop",
    "run",
    "render",
    "constructor",
    "activate",
    "deactivate",
    "install",
    "uninstall",
];

/// Symbols with no resolved incoming call edge. Non-strict mode prunes the
/// usual false positives: entry points, framework hooks, exported API, and
/// anything still mentioned by text elsewhere in the tree.
pub fn analyze(store: &SymbolStore, options: &UnusedOptions) -> Result<UnusedAnalysis> {
    let kind = options.kind.as_deref().map(SymbolKind::parse).transpose()?;

    let candidates = store.unreferenced_symbols()?;
    let total = candidates.len();

    let mut symbols: Vec<UnusedSymbol> = Vec::new();
    for symbol in candidates {
        // Imports and exports are declarations, never call targets
        if matches!(symbol.kind, SymbolKind::Import | SymbolKind::Export) {
            continue;
        }
        if let Some(kind) = kind {
            if symbol.kind != kind {
                continue;
            }
        }
        if let Some(pattern) = &options.file_pattern {
            if !symbol.file_path.contains(pattern.as_str()) {
                continue;
            }
        }
        if let Some(min_lines) = options.min_lines {
            if symbol.line_count() < min_lines {
                continue;
            }
        }

        if !options.strict && is_probably_alive(store, &symbol)? {
            continue;
        }

        symbols.push(UnusedSymbol {
            exported: symbol.is_exported(),
            symbol,
        });
    }

    symbols.sort_by(|a, b| {
        a.symbol
            .file_path
            .cmp(&b.symbol.file_path)
            .then_with(|| a.symbol.line_start.cmp(&b.symbol.line_start))
    });

    let excluded_count = total - symbols.len();
    debug!(
        unused = symbols.len(),
        excluded = excluded_count,
        strict = options.strict,
        "unused scan done"
    );
    Ok(UnusedAnalysis {
        symbols,
        excluded_count,
    })
}

/// Heuristics for "no call edge, but almost certainly not dead".
fn is_probably_alive(store: &SymbolStore, symbol: &SymbolRecord) -> Result<bool> {
    let name = symbol.name.as_str();

    if LIFECYCLE_NAMES.contains(&name.to_lowercase().as_str()) {
        return Ok(true);
    }
    // Underscore prefix marks intentionally unused; dunders are runtime hooks
    if name.starts_with('_') {
        return Ok(true);
    }
    if matches!(
        symbol.kind,
        SymbolKind::Endpoint | SymbolKind::Middleware | SymbolKind::Constant
    ) {
        return Ok(true);
    }
    if is_test_path(&symbol.file_path) || is_support_path(&symbol.file_path) {
        return Ok(true);
    }

    // A textual mention in another file covers dynamic dispatch, string
    // registries, and calls our extractor failed to resolve.
    let mentions = store.files_containing(name)?;
    let referenced_elsewhere = mentions
        .iter()
        .any(|(_, path)| path != &symbol.file_path);
    Ok(referenced_elsewhere)
}

fn is_support_path(path: &str) -> bool {
    let lower = path.to_lowercase();
    lower.contains("/examples/")
        || lower.contains("/docs/")
        || lower.contains("/scripts/")
        || lower.contains("/migrations/")
        || lower.ends_with(".config.js")
        || lower.ends_with(".config.ts")
        || lower.ends_with("conftest.py")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::indexed_store;

    #[test]
    fn test_dead_helper_reported() {
        let (_dir, store) = indexed_store(&[(
            "app.js",
            "function used() {\n  return 1;\n}\nfunction caller() {\n  used();\n}\nfunction deadHelper() {\n  return 2;\n}\n",
        )]);
        let result = analyze(&store, &UnusedOptions::default()).unwrap();
        let names: Vec<&str> = result
            .symbols
            .iter()
            .map(|u| u.symbol.name.as_str())
            .collect();
        assert!(names.contains(&"deadHelper"));
        assert!(!names.contains(&"used"));
    }

    #[test]
    fn test_lifecycle_names_excluded_by_default() {
        let (_dir, store) = indexed_store(&[(
            "app.js",
            "function main() {\n  return 1;\n}\nfunction orphanFn() {\n  return 2;\n}\n",
        )]);
        let result = analyze(&store, &UnusedOptions::default()).unwrap();
        let names: Vec<&str> = result
            .symbols
            .iter()
            .map(|u| u.symbol.name.as_str())
            .collect();
        assert!(!names.contains(&"main"));
        assert!(names.contains(&"orphanFn"));
    }

    #[test]
    fn test_strict_mode_reports_everything() {
        let (_dir, store) = indexed_store(&[(
            "app.js",
            "function main() {\n  return 1;\n}\nfunction _ignored() {\n  return 2;\n}\n",
        )]);
        let options = UnusedOptions {
            strict: true,
            ..UnusedOptions::default()
        };
        let result = analyze(&store, &options).unwrap();
        let names: Vec<&str> = result
            .symbols
            .iter()
            .map(|u| u.symbol.name.as_str())
            .collect();
        assert!(names.contains(&"main"));
        assert!(names.contains(&"_ignored"));
    }

    #[test]
    fn test_text_mention_elsewhere_keeps_symbol_alive() {
        let (_dir, store) = indexed_store(&[
            ("registry.js", "function dynamicHandler() {\n  return 1;\n}\n"),
            ("config.js", "const handlers = { name: 'dynamicHandler' };\n"),
        ]);
        let result = analyze(&store, &UnusedOptions::default()).unwrap();
        let names: Vec<&str> = result
            .symbols
            .iter()
            .map(|u| u.symbol.name.as_str())
            .collect();
        assert!(!names.contains(&"dynamicHandler"));
    }

    #[test]
    fn test_kind_and_min_lines_filters() {
        let (_dir, store) = indexed_store(&[(
            "app.ts",
            "class OrphanService {\n  x = 1;\n  y = 2;\n}\nfunction orphanFn() {\n  return 2;\n}\n",
        )]);
        let options = UnusedOptions {
            kind: Some("class".into()),
            ..UnusedOptions::default()
        };
        let result = analyze(&store, &options).unwrap();
        assert!(result
            .symbols
            .iter()
            .all(|u| u.symbol.kind == SymbolKind::Class));

        let options = UnusedOptions {
            min_lines: Some(3),
            ..UnusedOptions::default()
        };
        let result = analyze(&store, &options).unwrap();
        assert!(result.symbols.iter().all(|u| u.symbol.line_count() >= 3));
    }

    #[test]
    fn test_exported_symbols_flagged() {
        let (_dir, store) = indexed_store(&[(
            "lib.js",
            "export function publicApi() {\n  return 1;\n}\n",
        )]);
        let options = UnusedOptions {
            strict: true,
            ..UnusedOptions::default()
        };
        let result = analyze(&store, &options).unwrap();
        let entry = result
            .symbols
            .iter()
            .find(|u| u.symbol.name == "publicApi")
            .expect("publicApi reported in strict mode");
        assert!(entry.exported);
    }
}
