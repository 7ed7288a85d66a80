// Duplicate code detection by normalized body fingerprint

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::is_test_path;
use crate::error::Result;
use crate::options::DuplicateOptions;
use crate::store::{SymbolKind, SymbolRecord, SymbolStore};

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    /// Copies sorted by path then line.
    pub symbols: Vec<SymbolRecord>,
    pub line_count: u32,
    /// Lines that could be removed by deduplicating: body size times the
    /// number of redundant copies.
    pub savings: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateAnalysis {
    /// Groups ordered by potential savings, largest first.
    pub groups: Vec<DuplicateGroup>,
    pub total_savings: u64,
    /// Groups of duplicated functions or methods.
    pub duplicate_functions: usize,
    /// Groups of duplicated classes or structs.
    pub duplicate_classes: usize,
    /// Groups whose copies span more than one file.
    pub cross_file_groups: usize,
}

/// Group symbols whose normalized bodies hash identically. Formatting,
/// comments, and quote style do not defeat the match; renamed identifiers
/// do.
pub fn analyze(store: &SymbolStore, options: &DuplicateOptions) -> Result<DuplicateAnalysis> {
    let kind = options.kind.as_deref().map(SymbolKind::parse).transpose()?;

    let candidates = store.symbols_with_content(options.min_lines.max(1), kind)?;

    let mut buckets: HashMap<String, Vec<SymbolRecord>> = HashMap::new();
    for (symbol, content) in candidates {
        if !symbol.kind.is_definition() {
            continue;
        }
        if options.ignore_tests && is_test_path(&symbol.file_path) {
            continue;
        }
        let Some(body) = body_lines(&content, symbol.line_start, symbol.line_end) else {
            continue;
        };
        let normalized = normalize(&body);
        if normalized.is_empty() {
            continue;
        }
        let fingerprint = blake3::hash(normalized.as_bytes()).to_hex().to_string();
        buckets.entry(fingerprint).or_default().push(symbol);
    }

    let mut groups: Vec<DuplicateGroup> = buckets
        .into_values()
        .filter(|symbols| symbols.len() >= 2)
        .map(|mut symbols| {
            symbols.sort_by(|a, b| {
                a.file_path
                    .cmp(&b.file_path)
                    .then_with(|| a.line_start.cmp(&b.line_start))
            });
            let line_count = symbols
                .iter()
                .map(SymbolRecord::line_count)
                .max()
                .unwrap_or(0);
            let savings = u64::from(line_count) * (symbols.len() as u64 - 1);
            DuplicateGroup {
                symbols,
                line_count,
                savings,
            }
        })
        .collect();

    groups.sort_by(|a, b| {
        b.savings
            .cmp(&a.savings)
            .then_with(|| a.symbols[0].file_path.cmp(&b.symbols[0].file_path))
    });
    let total_savings = groups.iter().map(|g| g.savings).sum();

    let duplicate_functions = groups
        .iter()
        .filter(|g| matches!(g.symbols[0].kind, SymbolKind::Function | SymbolKind::Method))
        .count();
    let duplicate_classes = groups
        .iter()
        .filter(|g| matches!(g.symbols[0].kind, SymbolKind::Class | SymbolKind::Struct))
        .count();
    let cross_file_groups = groups
        .iter()
        .filter(|g| g.symbols.iter().any(|s| s.file_path != g.symbols[0].file_path))
        .count();

    debug!(groups = groups.len(), total_savings, "duplicate scan done");
    Ok(DuplicateAnalysis {
        groups,
        total_savings,
        duplicate_functions,
        duplicate_classes,
        cross_file_groups,
    })
}

fn body_lines(content: &str, line_start: u32, line_end: u32) -> Option<String> {
    let start = line_start.checked_sub(1)? as usize;
    let lines: Vec<&str> = content.lines().collect();
    if start >= lines.len() {
        return None;
    }
    let end = (line_end as usize).min(lines.len());
    Some(lines[start..end].join("\n"))
}

/// Canonical form for comparison: line and block comments stripped, quotes
/// folded, all whitespace runs collapsed to one space.
fn normalize(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut in_block = false;
    for line in body.lines() {
        let line = strip_comments(line, &mut in_block);
        let folded: String = line
            .chars()
            .map(|c| match c {
                '\'' | '`' => '"',
                c => c,
            })
            .collect();
        for token in folded.split_whitespace() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(token);
        }
    }
    out
}

fn strip_comments(line: &str, in_block: &mut bool) -> String {
    // Comment markers inside string literals are rare enough in practice
    // that tracking quote state is not worth it here.
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if *in_block {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                *in_block = false;
            }
            continue;
        }
        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                *in_block = true;
            }
            '/' if chars.peek() == Some(&'/') => break,
            '#' => break,
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::indexed_store;

    const BODY_A: &str = concat!(
        "function computeTax(amount) {\n",
        "  var rate = 0.2;\n",
        "  var base = amount * rate;\n",
        "  var rounded = Math.round(base * 100) / 100;\n",
        "  return rounded;\n",
        "}\n",
    );

    // Same tokens, different formatting and comments
    const BODY_B: &str = concat!(
        "function computeTax(amount) {\n",
        "  var rate = 0.2; // flat rate\n",
        "  var base  =  amount * rate;\n",
        "  var rounded = Math.round(base * 100) / 100;\n",
        "  return rounded;\n",
        "}\n",
    );

    #[test]
    fn test_formatting_and_comments_do_not_defeat_match() {
        let (_dir, store) = indexed_store(&[("a.js", BODY_A), ("b.js", BODY_B)]);
        let result = analyze(&store, &DuplicateOptions::default()).unwrap();

        assert_eq!(result.groups.len(), 1);
        let group = &result.groups[0];
        assert_eq!(group.symbols.len(), 2);
        assert_eq!(group.line_count, 6);
        assert_eq!(group.savings, 6);
    }

    #[test]
    fn test_block_comments_do_not_defeat_match() {
        let with_blocks = concat!(
            "function formatPrice(amount) {\n",
            "  var cents = Math.round(amount * 100); /* to cents */\n",
            "  /* integer part\n",
            "     of the price */\n",
            "  var whole = Math.floor(cents / 100);\n",
            "  var frac = cents % 100;\n",
            "  return whole + '.' + frac;\n",
            "}\n",
        );
        let without = concat!(
            "function formatPrice(amount) {\n",
            "  var cents = Math.round(amount * 100);\n",
            "  var whole = Math.floor(cents / 100);\n",
            "  var frac = cents % 100;\n",
            "  return whole + \".\" + frac;\n",
            "}\n",
        );
        let (_dir, store) = indexed_store(&[("a.js", with_blocks), ("b.js", without)]);
        let result = analyze(&store, &DuplicateOptions::default()).unwrap();

        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].symbols.len(), 2);
    }

    #[test]
    fn test_classification_counts() {
        let functions = concat!(
            "function sumList(items) {\n",
            "  var total = 0;\n",
            "  for (var i = 0; i < items.length; i++) {\n",
            "    total = total + items[i];\n",
            "  }\n",
            "  return total;\n",
            "}\n",
            "function sumList(items) {\n",
            "  var total = 0;\n",
            "  for (var i = 0; i < items.length; i++) {\n",
            "    total = total + items[i];\n",
            "  }\n",
            "  return total;\n",
            "}\n",
        );
        let class_body = concat!(
            "class Point {\n",
            "  constructor(x, y) {\n",
            "    this.x = x;\n",
            "    this.y = y;\n",
            "  }\n",
            "}\n",
        );
        let (_dir, store) = indexed_store(&[
            ("sums.js", functions),
            ("model_a.js", class_body),
            ("model_b.js", class_body),
        ]);
        let result = analyze(&store, &DuplicateOptions::default()).unwrap();

        assert_eq!(result.groups.len(), 2);
        assert_eq!(result.duplicate_functions, 1);
        assert_eq!(result.duplicate_classes, 1);
        // Only the class copies span two files
        assert_eq!(result.cross_file_groups, 1);
    }

    #[test]
    fn test_different_bodies_do_not_group() {
        let (_dir, store) = indexed_store(&[
            ("a.js", BODY_A),
            (
                "c.js",
                concat!(
                    "function computeFee(amount) {\n",
                    "  var rate = 0.4;\n",
                    "  var base = amount * rate;\n",
                    "  var rounded = Math.round(base * 100) / 100;\n",
                    "  return rounded;\n",
                    "}\n",
                ),
            ),
        ]);
        let result = analyze(&store, &DuplicateOptions::default()).unwrap();
        assert!(result.groups.is_empty());
    }

    #[test]
    fn test_min_lines_excludes_small_symbols() {
        let (_dir, store) = indexed_store(&[
            ("a.js", "function tiny() {\n  return 1;\n}\n"),
            ("b.js", "function tiny() {\n  return 1;\n}\n"),
        ]);
        let result = analyze(&store, &DuplicateOptions::default()).unwrap();
        assert!(result.groups.is_empty());

        let relaxed = DuplicateOptions {
            min_lines: 2,
            ..DuplicateOptions::default()
        };
        let result = analyze(&store, &relaxed).unwrap();
        assert_eq!(result.groups.len(), 1);
    }

    #[test]
    fn test_ignore_tests_filters_test_paths() {
        let (_dir, store) = indexed_store(&[("a.js", BODY_A), ("a.test.js", BODY_A)]);
        let result = analyze(&store, &DuplicateOptions::default()).unwrap();
        assert!(result.groups.is_empty());

        let include_tests = DuplicateOptions {
            ignore_tests: false,
            ..DuplicateOptions::default()
        };
        let result = analyze(&store, &include_tests).unwrap();
        assert_eq!(result.groups.len(), 1);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let (_dir, store) = indexed_store(&[("a.js", BODY_A)]);
        let options = DuplicateOptions {
            kind: Some("gizmo".into()),
            ..DuplicateOptions::default()
        };
        assert!(analyze(&store, &options).is_err());
    }
}
