// Symbol lookup queries

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::options::validate_pattern;
use crate::store::{SymbolKind, SymbolRecord, SymbolStore};

/// How many fuzzy suggestions a failed lookup returns.
const MAX_SUGGESTIONS: usize = 5;

const MAX_MATCHES: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct FindResult {
    pub matches: Vec<SymbolRecord>,
    /// Near-miss names offered when `matches` is empty.
    pub suggestions: Vec<String>,
}

pub struct QueryEngine {
    store: SymbolStore,
}

impl QueryEngine {
    pub fn new(store: SymbolStore) -> Self {
        Self { store }
    }

    /// Find symbols whose name contains `pattern` (case-insensitive). On a
    /// miss, falls back to fuzzy suggestions so callers can self-correct.
    pub fn find_symbol(&self, pattern: &str, kind: Option<SymbolKind>) -> Result<FindResult> {
        validate_pattern(pattern)?;

        let matches = self.store.symbols_like(pattern, kind, MAX_MATCHES)?;

        if matches.is_empty() {
            let suggestions = self.fuzzy_suggestions(pattern, MAX_SUGGESTIONS)?;
            debug!(pattern, suggestions = suggestions.len(), "no exact matches");
            return Ok(FindResult {
                matches,
                suggestions,
            });
        }

        Ok(FindResult {
            matches,
            suggestions: Vec::new(),
        })
    }

    /// List symbols, optionally filtered by kind and file path substring.
    pub fn list_symbols(
        &self,
        kind: Option<SymbolKind>,
        file_pattern: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SymbolRecord>> {
        if let Some(pattern) = file_pattern {
            validate_pattern(pattern)?;
        }
        let mut symbols = self.store.list_symbols(kind, limit)?;
        if let Some(pattern) = file_pattern {
            let needle = pattern.to_lowercase();
            symbols.retain(|s| s.file_path.to_lowercase().contains(&needle));
        }
        Ok(symbols)
    }

    pub fn symbol_by_id(&self, id: i64) -> Result<SymbolRecord> {
        self.store
            .symbol_by_id(id)?
            .ok_or_else(|| Error::NotFound(format!("symbol id {id}")))
    }

    /// Rank every indexed name against `pattern` and keep the closest `limit`.
    pub fn fuzzy_suggestions(&self, pattern: &str, limit: usize) -> Result<Vec<String>> {
        let names = self.store.all_symbol_names()?;
        let needle = pattern.to_lowercase();

        let mut scored: Vec<(i64, String)> = names
            .into_iter()
            .filter_map(|name| {
                let score = similarity(&needle, &name.to_lowercase());
                (score > 0).then_some((score, name))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        scored.dedup_by(|a, b| a.1 == b.1);
        scored.truncate(limit);
        Ok(scored.into_iter().map(|(_, name)| name).collect())
    }
}

/// Similarity score between a lowercase query and a lowercase candidate.
/// Substring beats subsequence beats edit distance; 0 means no plausible
/// relation.
fn similarity(query: &str, candidate: &str) -> i64 {
    if candidate == query {
        return 1000;
    }
    if candidate.contains(query) {
        // Shorter candidates are closer matches
        return 500 - candidate.len() as i64;
    }
    if is_subsequence(query, candidate) {
        return 200 - candidate.len() as i64;
    }
    let distance = edit_distance(query, candidate);
    let tolerance = (query.len() / 3).max(1);
    if distance <= tolerance {
        100 - distance as i64 * 10
    } else {
        0
    }
}

fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut chars = haystack.chars();
    needle.chars().all(|n| chars.any(|h| h == n))
}

fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::Indexer;
    use crate::options::IndexOptions;
    use std::fs;
    use tempfile::TempDir;

    fn indexed_engine(files: &[(&str, &str)]) -> (TempDir, QueryEngine) {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        let store = SymbolStore::open(dir.path().join("index.db")).unwrap();
        Indexer::new(store.clone())
            .index(dir.path(), &IndexOptions::default())
            .unwrap();
        (dir, QueryEngine::new(store))
    }

    #[test]
    fn test_find_symbol_substring_match() {
        let (_dir, engine) = indexed_engine(&[(
            "app.js",
            "function getUserById(id) {}\nfunction deleteUser(id) {}\n",
        )]);
        let result = engine.find_symbol("user", None).unwrap();
        assert_eq!(result.matches.len(), 2);
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_find_symbol_kind_filter() {
        let (_dir, engine) = indexed_engine(&[(
            "app.ts",
            "class UserService {}\nfunction userHelper() {}\n",
        )]);
        let result = engine
            .find_symbol("user", Some(SymbolKind::Class))
            .unwrap();
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].name, "UserService");
    }

    #[test]
    fn test_miss_returns_suggestions() {
        let (_dir, engine) =
            indexed_engine(&[("app.js", "function calculateTotal(x) {}\n")]);
        let result = engine.find_symbol("calculteTotal", None).unwrap();
        assert!(result.matches.is_empty());
        assert_eq!(result.suggestions, vec!["calculateTotal".to_string()]);
    }

    #[test]
    fn test_short_pattern_rejected() {
        let (_dir, engine) = indexed_engine(&[("app.js", "function main() {}\n")]);
        assert!(engine.find_symbol("a", None).is_err());
    }

    #[test]
    fn test_list_symbols_by_file_pattern() {
        let (_dir, engine) = indexed_engine(&[
            ("auth.js", "function login() {}\n"),
            ("billing.js", "function charge() {}\n"),
        ]);
        let symbols = engine.list_symbols(None, Some("auth"), 100).unwrap();
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].name, "login");
    }

    #[test]
    fn test_similarity_ordering() {
        assert!(similarity("user", "user") > similarity("user", "getUser".to_lowercase().as_str()));
        assert!(similarity("user", "getuser") > similarity("user", "usr"));
        assert_eq!(similarity("user", "invoice"), 0);
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("abc", "abc"), 0);
        assert_eq!(edit_distance("", "abc"), 3);
    }
}
