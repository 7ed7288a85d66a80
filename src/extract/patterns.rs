// Pattern-table fallback extractor
//
// Best-effort regex extraction for every supported language. No real
// parser: matches are converted to symbols with line ranges estimated by
// brace matching or indentation, and call references come from generic
// call shapes filtered through a keyword blacklist. Intentionally
// imprecise; downstream analyses are built around that contract.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ExtractedContext, Extractor, RawCall, RawComment, RawImport, RawSymbol};
use crate::error::Result;
use crate::lang::is_brace_language;
use crate::scan::FileInfo;
use crate::store::{CallKind, SymbolKind};

/// Hard cap on an estimated symbol span when no block end is found.
const FALLBACK_SPAN: usize = 100;

struct SymbolPattern {
    regex: Regex,
    kind: SymbolKind,
}

struct LanguageRules {
    /// Ordered groups: earlier patterns win on (name, line) collisions.
    symbols: Vec<SymbolPattern>,
    imports: Vec<Regex>,
    /// Patterns whose capture 1 is an exported name.
    exports: Vec<Regex>,
    line_comment: &'static str,
    block_comment: Option<(&'static str, &'static str)>,
}

fn sym(kind: SymbolKind, pattern: &str) -> SymbolPattern {
    SymbolPattern {
        regex: Regex::new(pattern).expect("invalid symbol pattern"),
        kind,
    }
}

fn rx(pattern: &str) -> Regex {
    Regex::new(pattern).expect("invalid pattern")
}

fn js_rules() -> LanguageRules {
    LanguageRules {
        symbols: vec![
            sym(
                SymbolKind::Function,
                r"(?m)^[\t ]*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s+([A-Za-z_$][\w$]*)\s*\(",
            ),
            sym(
                SymbolKind::Function,
                r"(?m)^[\t ]*(?:export\s+)?(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?(?:\([^)\n]*\)|[A-Za-z_$][\w$]*)\s*=>",
            ),
            sym(
                SymbolKind::Class,
                r"(?m)^[\t ]*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)",
            ),
            sym(
                SymbolKind::Interface,
                r"(?m)^[\t ]*(?:export\s+)?interface\s+([A-Za-z_$][\w$]*)",
            ),
            sym(
                SymbolKind::Type,
                r"(?m)^[\t ]*(?:export\s+)?type\s+([A-Za-z_$][\w$]*)\s*(?:<[^>\n]*>)?\s*=",
            ),
            sym(
                SymbolKind::Enum,
                r"(?m)^[\t ]*(?:export\s+)?(?:const\s+)?enum\s+([A-Za-z_$][\w$]*)",
            ),
            sym(
                SymbolKind::Constant,
                r"(?m)^[\t ]*(?:export\s+)?const\s+([A-Z][A-Z0-9_]*)\s*=",
            ),
            sym(
                SymbolKind::Variable,
                r"(?m)^[\t ]*(?:export\s+)?(?:let|var)\s+([A-Za-z_$][\w$]*)\s*=",
            ),
            // Class methods: name(args) { on its own line, not a keyword
            sym(
                SymbolKind::Method,
                r"(?m)^[\t ]+(?:public\s+|private\s+|protected\s+|static\s+)*(?:async\s+)?([A-Za-z_$][\w$]*)\s*\([^)\n]*\)\s*\{",
            ),
        ],
        imports: vec![
            rx(r#"(?m)^[\t ]*import\s+(?:type\s+)?(?:\{[^}]*\}|[\w$*,\s]+)\s+from\s+['"]([@\w./-]+)['"]"#),
            rx(r#"(?m)^[\t ]*import\s+['"]([@\w./-]+)['"]"#),
            rx(r#"require\s*\(\s*['"]([@\w./-]+)['"]\s*\)"#),
        ],
        exports: vec![
            rx(r"(?m)^[\t ]*export\s+(?:default\s+)?(?:async\s+)?(?:function\s*\*?\s+|class\s+|const\s+|let\s+|var\s+|interface\s+|type\s+|enum\s+)([A-Za-z_$][\w$]*)"),
            rx(r"(?m)^[\t ]*module\.exports\s*=\s*([A-Za-z_$][\w$]*)"),
        ],
        line_comment: "//",
        block_comment: Some(("/*", "*/")),
    }
}

fn python_rules() -> LanguageRules {
    LanguageRules {
        symbols: vec![
            sym(
                SymbolKind::Function,
                r"(?m)^[\t ]*(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(",
            ),
            sym(SymbolKind::Class, r"(?m)^[\t ]*class\s+([A-Za-z_]\w*)"),
            sym(SymbolKind::Constant, r"(?m)^([A-Z][A-Z0-9_]*)\s*(?::[^=\n]+)?="),
            sym(
                SymbolKind::Decorator,
                r"(?m)^[\t ]*@([A-Za-z_]\w*(?:\.\w+)*)",
            ),
        ],
        imports: vec![
            rx(r"(?m)^[\t ]*from\s+([\w.]+)\s+import"),
            rx(r"(?m)^[\t ]*import\s+([\w.]+)"),
        ],
        exports: vec![],
        line_comment: "#",
        block_comment: None,
    }
}

fn rust_rules() -> LanguageRules {
    LanguageRules {
        symbols: vec![
            sym(
                SymbolKind::Function,
                r"(?m)^[\t ]*(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(?:unsafe\s+)?fn\s+([A-Za-z_]\w*)",
            ),
            sym(
                SymbolKind::Struct,
                r"(?m)^[\t ]*(?:pub(?:\([^)]*\))?\s+)?struct\s+([A-Za-z_]\w*)",
            ),
            sym(
                SymbolKind::Enum,
                r"(?m)^[\t ]*(?:pub(?:\([^)]*\))?\s+)?enum\s+([A-Za-z_]\w*)",
            ),
            sym(
                SymbolKind::Trait,
                r"(?m)^[\t ]*(?:pub(?:\([^)]*\))?\s+)?trait\s+([A-Za-z_]\w*)",
            ),
            sym(
                SymbolKind::Type,
                r"(?m)^[\t ]*(?:pub(?:\([^)]*\))?\s+)?type\s+([A-Za-z_]\w*)\s*=",
            ),
            sym(
                SymbolKind::Constant,
                r"(?m)^[\t ]*(?:pub(?:\([^)]*\))?\s+)?(?:const|static)\s+([A-Z][A-Z0-9_]*)\s*:",
            ),
            sym(SymbolKind::Module, r"(?m)^[\t ]*(?:pub(?:\([^)]*\))?\s+)?mod\s+([A-Za-z_]\w*)"),
        ],
        imports: vec![rx(r"(?m)^[\t ]*use\s+([\w:]+)")],
        exports: vec![rx(
            r"(?m)^[\t ]*pub\s+(?:async\s+)?(?:unsafe\s+)?(?:fn|struct|enum|trait|mod|const|static|type)\s+([A-Za-z_]\w*)",
        )],
        line_comment: "//",
        block_comment: Some(("/*", "*/")),
    }
}

fn go_rules() -> LanguageRules {
    LanguageRules {
        symbols: vec![
            sym(
                SymbolKind::Function,
                r"(?m)^func\s+([A-Za-z_]\w*)\s*\(",
            ),
            sym(
                SymbolKind::Method,
                r"(?m)^func\s+\([^)]+\)\s+([A-Za-z_]\w*)\s*\(",
            ),
            sym(SymbolKind::Struct, r"(?m)^type\s+([A-Za-z_]\w*)\s+struct"),
            sym(
                SymbolKind::Interface,
                r"(?m)^type\s+([A-Za-z_]\w*)\s+interface",
            ),
            sym(SymbolKind::Constant, r"(?m)^const\s+([A-Za-z_]\w*)"),
            sym(SymbolKind::Variable, r"(?m)^var\s+([A-Za-z_]\w*)"),
        ],
        imports: vec![
            rx(r#"(?m)^import\s+(?:\w+\s+)?"([\w./-]+)""#),
            rx(r#"(?m)^\t(?:\w+\s+)?"([\w./-]+)"$"#),
        ],
        exports: vec![],
        line_comment: "//",
        block_comment: Some(("/*", "*/")),
    }
}

fn java_rules() -> LanguageRules {
    LanguageRules {
        symbols: vec![
            sym(
                SymbolKind::Class,
                r"(?m)^[\t ]*(?:public\s+|private\s+|protected\s+|static\s+|final\s+|abstract\s+)*class\s+([A-Za-z_]\w*)",
            ),
            sym(
                SymbolKind::Interface,
                r"(?m)^[\t ]*(?:public\s+)?interface\s+([A-Za-z_]\w*)",
            ),
            sym(
                SymbolKind::Enum,
                r"(?m)^[\t ]*(?:public\s+)?enum\s+([A-Za-z_]\w*)",
            ),
            sym(
                SymbolKind::Method,
                r"(?m)^[\t ]*(?:public\s+|private\s+|protected\s+|static\s+|final\s+|synchronized\s+|abstract\s+)+[\w<>\[\],\s]+\s+([a-z_]\w*)\s*\([^)\n]*\)\s*(?:throws\s+[\w,\s]+)?\{",
            ),
        ],
        imports: vec![rx(r"(?m)^[\t ]*import\s+(?:static\s+)?([\w.]+(?:\.\*)?);")],
        exports: vec![],
        line_comment: "//",
        block_comment: Some(("/*", "*/")),
    }
}

fn ruby_rules() -> LanguageRules {
    LanguageRules {
        symbols: vec![
            sym(SymbolKind::Method, r"(?m)^[\t ]*def\s+([A-Za-z_]\w*[!?]?)"),
            sym(SymbolKind::Class, r"(?m)^[\t ]*class\s+([A-Z]\w*)"),
            sym(SymbolKind::Module, r"(?m)^[\t ]*module\s+([A-Z]\w*)"),
            sym(SymbolKind::Constant, r"(?m)^[\t ]*([A-Z][A-Z0-9_]*)\s*="),
        ],
        imports: vec![rx(
            r#"(?m)^[\t ]*require(?:_relative)?\s+['"]([\w./-]+)['"]"#,
        )],
        exports: vec![],
        line_comment: "#",
        block_comment: None,
    }
}

fn php_rules() -> LanguageRules {
    LanguageRules {
        symbols: vec![
            sym(
                SymbolKind::Function,
                r"(?m)^[\t ]*(?:public\s+|private\s+|protected\s+|static\s+)*function\s+([A-Za-z_]\w*)\s*\(",
            ),
            sym(
                SymbolKind::Class,
                r"(?m)^[\t ]*(?:abstract\s+|final\s+)*class\s+([A-Za-z_]\w*)",
            ),
            sym(SymbolKind::Interface, r"(?m)^[\t ]*interface\s+([A-Za-z_]\w*)"),
            sym(SymbolKind::Trait, r"(?m)^[\t ]*trait\s+([A-Za-z_]\w*)"),
        ],
        imports: vec![rx(r"(?m)^[\t ]*use\s+([\w\\]+)")],
        exports: vec![],
        line_comment: "//",
        block_comment: Some(("/*", "*/")),
    }
}

fn c_rules() -> LanguageRules {
    LanguageRules {
        symbols: vec![
            sym(
                SymbolKind::Function,
                r"(?m)^(?:static\s+|inline\s+|extern\s+)*[\w*]+(?:\s+[\w*]+)*[\s*]+([A-Za-z_]\w*)\s*\([^)\n]*\)\s*\{",
            ),
            sym(SymbolKind::Struct, r"(?m)^[\t ]*(?:typedef\s+)?struct\s+([A-Za-z_]\w*)"),
            sym(SymbolKind::Enum, r"(?m)^[\t ]*(?:typedef\s+)?enum\s+([A-Za-z_]\w*)"),
            sym(SymbolKind::Class, r"(?m)^[\t ]*class\s+([A-Za-z_]\w*)"),
            sym(SymbolKind::Constant, r"(?m)^#define\s+([A-Z][A-Z0-9_]*)"),
        ],
        imports: vec![rx(r#"(?m)^[\t ]*#include\s*[<"]([^>"]+)[>"]"#)],
        exports: vec![],
        line_comment: "//",
        block_comment: Some(("/*", "*/")),
    }
}

fn shell_rules() -> LanguageRules {
    LanguageRules {
        symbols: vec![
            sym(SymbolKind::Function, r"(?m)^[\t ]*(?:function\s+)?([A-Za-z_]\w*)\s*\(\)\s*\{"),
            sym(SymbolKind::Variable, r"(?m)^([A-Za-z_]\w*)="),
        ],
        imports: vec![rx(r"(?m)^[\t ]*(?:source|\.)\s+([\w./-]+)")],
        exports: vec![],
        line_comment: "#",
        block_comment: None,
    }
}

/// Generic rules for languages without a dedicated table.
fn generic_rules() -> LanguageRules {
    LanguageRules {
        symbols: vec![
            sym(
                SymbolKind::Function,
                r"(?m)^[\t ]*(?:function|def|fn|func|sub)\s+([A-Za-z_]\w*)",
            ),
            sym(SymbolKind::Class, r"(?m)^[\t ]*(?:class|module)\s+([A-Za-z_]\w*)"),
        ],
        imports: vec![],
        exports: vec![],
        line_comment: "#",
        block_comment: None,
    }
}

static RULES: Lazy<HashMap<&'static str, LanguageRules>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("javascript", js_rules());
    map.insert("typescript", js_rules());
    map.insert("vue", js_rules());
    map.insert("svelte", js_rules());
    map.insert("python", python_rules());
    map.insert("rust", rust_rules());
    map.insert("go", go_rules());
    map.insert("java", java_rules());
    map.insert("kotlin", java_rules());
    map.insert("csharp", java_rules());
    map.insert("scala", java_rules());
    map.insert("swift", rust_rules());
    map.insert("ruby", ruby_rules());
    map.insert("php", php_rules());
    map.insert("c", c_rules());
    map.insert("cpp", c_rules());
    map.insert("shell", shell_rules());
    map
});

static GENERIC: Lazy<LanguageRules> = Lazy::new(generic_rules);

/// Call shapes, shared across languages
static METHOD_CALL: Lazy<Regex> =
    Lazy::new(|| rx(r"([A-Za-z_]\w*)\s*(?:\.|->|::)\s*([A-Za-z_]\w*)\s*\("));
static CONSTRUCTOR_CALL: Lazy<Regex> = Lazy::new(|| rx(r"\bnew\s+([A-Za-z_][\w.]*)\s*\("));
static PLAIN_CALL: Lazy<Regex> = Lazy::new(|| rx(r"\b([A-Za-z_]\w*)\s*\("));

/// Definition keywords that precede a name on the same line; a match of
/// the call shape right after one of these is a definition, not a call.
static DEFINITION_PREFIX: Lazy<Regex> = Lazy::new(|| {
    rx(r"(?:\b(?:function|def|fn|func|fun|sub|macro|class|struct|interface|trait|impl|enum)\s*\*?\s*)$")
});

/// Universal fallback extractor over per-language regex tables.
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }

    fn rules_for(language: Option<&str>) -> &'static LanguageRules {
        language
            .and_then(|lang| RULES.get(lang))
            .unwrap_or(&GENERIC)
    }
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor for PatternExtractor {
    fn name(&self) -> &'static str {
        "patterns"
    }

    fn can_handle(&self, _file: &FileInfo) -> bool {
        true
    }

    fn priority(&self) -> u32 {
        0
    }

    fn supported_languages(&self) -> &[&'static str] {
        &[
            "javascript",
            "typescript",
            "python",
            "rust",
            "go",
            "java",
            "kotlin",
            "csharp",
            "ruby",
            "php",
            "c",
            "cpp",
            "shell",
        ]
    }

    fn extract(&self, file: &FileInfo) -> Result<ExtractedContext> {
        let rules = Self::rules_for(file.language);
        let content = &file.content;
        let lines: Vec<&str> = content.lines().collect();
        let brace_style = file.language.map(is_brace_language).unwrap_or(true);

        let mut ctx = ExtractedContext::default();

        for pattern in &rules.symbols {
            for caps in pattern.regex.captures_iter(content) {
                let Some(name_match) = caps.get(1) else { continue };
                let name = name_match.as_str().to_string();
                if is_keyword(&name) {
                    continue;
                }

                let line_start = line_of_offset(content, name_match.start());
                let line_end = estimate_end_line(&lines, line_start as usize, brace_style);

                let full_match = caps.get(0).map(|m| m.as_str()).unwrap_or("");
                let exported = full_match.contains("export")
                    || full_match.trim_start().starts_with("pub")
                    || full_match.contains("public");

                let signature = lines
                    .get(line_start as usize - 1)
                    .map(|l| l.trim().to_string());

                ctx.symbols.push(RawSymbol {
                    name,
                    kind: pattern.kind,
                    line_start,
                    line_end: line_end as u32,
                    signature,
                    metadata: serde_json::json!({ "exported": exported }),
                });
            }
        }

        // First pattern group wins on (name, line) collisions
        dedup_symbols(&mut ctx.symbols);

        extract_imports(content, rules, &mut ctx);
        extract_exports(content, rules, &mut ctx);
        extract_comments(&lines, rules, &mut ctx);
        extract_calls(content, file.language, &mut ctx);

        Ok(ctx)
    }
}

fn dedup_symbols(symbols: &mut Vec<RawSymbol>) {
    let mut seen = std::collections::HashSet::new();
    symbols.retain(|s| seen.insert((s.name.clone(), s.line_start)));
    symbols.sort_by_key(|s| (s.line_start, s.name.clone()));
}

fn extract_imports(content: &str, rules: &LanguageRules, ctx: &mut ExtractedContext) {
    for pattern in &rules.imports {
        for caps in pattern.captures_iter(content) {
            let Some(module_match) = caps.get(1) else { continue };
            let module = module_match.as_str().to_string();
            let line = line_of_offset(content, module_match.start());

            if ctx.imports.iter().any(|i| i.module == module && i.line == line) {
                continue;
            }

            ctx.symbols.push(RawSymbol {
                name: module.clone(),
                kind: crate::store::SymbolKind::Import,
                line_start: line,
                line_end: line,
                signature: None,
                metadata: serde_json::json!({ "module": module }),
            });
            ctx.calls.push(RawCall {
                callee_name: import_base_name(&module),
                kind: CallKind::Import,
                line,
            });
            if !ctx.dependencies.contains(&module) {
                ctx.dependencies.push(module.clone());
            }
            ctx.imports.push(RawImport { module, line });
        }
    }
}

fn extract_exports(content: &str, rules: &LanguageRules, ctx: &mut ExtractedContext) {
    for pattern in &rules.exports {
        for caps in pattern.captures_iter(content) {
            if let Some(name) = caps.get(1) {
                let name = name.as_str().to_string();
                if !ctx.exports.contains(&name) {
                    ctx.exports.push(name);
                }
            }
        }
    }

    // Mark matching symbols as exported
    for symbol in &mut ctx.symbols {
        if ctx.exports.contains(&symbol.name) {
            symbol.metadata["exported"] = serde_json::Value::Bool(true);
        }
    }
}

fn extract_comments(lines: &[&str], rules: &LanguageRules, ctx: &mut ExtractedContext) {
    let mut in_block = false;
    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        let line_no = i as u32 + 1;

        if let Some((open, close)) = rules.block_comment {
            if in_block {
                if line.contains(close) {
                    in_block = false;
                }
                continue;
            }
            if let Some(pos) = line.find(open) {
                let text = line[pos..].trim_start_matches(open).trim().to_string();
                if !line[pos..].contains(close) {
                    in_block = true;
                }
                ctx.comments.push(RawComment { line: line_no, text });
                continue;
            }
        }

        if line.starts_with(rules.line_comment) {
            let text = line
                .trim_start_matches(rules.line_comment)
                .trim()
                .to_string();
            ctx.comments.push(RawComment { line: line_no, text });
        }
    }
}

fn extract_calls(content: &str, language: Option<&str>, ctx: &mut ExtractedContext) {
    let mut seen = std::collections::HashSet::new();

    for caps in CONSTRUCTOR_CALL.captures_iter(content) {
        if let Some(name_match) = caps.get(1) {
            let name = name_match
                .as_str()
                .rsplit('.')
                .next()
                .unwrap_or(name_match.as_str())
                .to_string();
            if is_keyword(&name) || is_builtin(&name, language) {
                continue;
            }
            let line = line_of_offset(content, name_match.start());
            if seen.insert((name.clone(), name_match.start())) {
                ctx.calls.push(RawCall {
                    callee_name: name,
                    kind: CallKind::Constructor,
                    line,
                });
            }
        }
    }

    for caps in METHOD_CALL.captures_iter(content) {
        if let Some(method_match) = caps.get(2) {
            let name = method_match.as_str().to_string();
            if is_keyword(&name) || is_builtin(&name, language) {
                continue;
            }
            let line = line_of_offset(content, method_match.start());
            if seen.insert((name.clone(), method_match.start())) {
                ctx.calls.push(RawCall {
                    callee_name: name,
                    kind: CallKind::Method,
                    line,
                });
            }
        }
    }

    for caps in PLAIN_CALL.captures_iter(content) {
        if let Some(name_match) = caps.get(1) {
            let name = name_match.as_str().to_string();
            if is_keyword(&name) || is_builtin(&name, language) {
                continue;
            }
            // A call shape right after a definition keyword is the
            // definition itself
            if DEFINITION_PREFIX.is_match(&content[..name_match.start()]) {
                continue;
            }
            let start = name_match.start();
            // Skip positions already captured as method/constructor calls
            if seen.iter().any(|(n, s)| *s == start && n == &name) {
                continue;
            }
            let line = line_of_offset(content, start);
            if seen.insert((name.clone(), start)) {
                ctx.calls.push(RawCall {
                    callee_name: name,
                    kind: CallKind::Function,
                    line,
                });
            }
        }
    }

    ctx.calls.sort_by_key(|c| c.line);
}

/// 1-based line containing a byte offset.
fn line_of_offset(content: &str, offset: usize) -> u32 {
    content[..offset].matches('\n').count() as u32 + 1
}

/// Last path segment of an import target, without extension.
fn import_base_name(module: &str) -> String {
    let base = module
        .rsplit(['/', '.', ':', '\\'])
        .find(|s| !s.is_empty())
        .unwrap_or(module);
    base.to_string()
}

/// Estimate where the block starting at `start_line` ends.
///
/// Brace matching for C-family layouts, indentation decrease otherwise,
/// always capped so pathological input terminates.
fn estimate_end_line(lines: &[&str], start_line: usize, brace_style: bool) -> usize {
    if start_line == 0 || start_line > lines.len() {
        return start_line;
    }

    let start_idx = start_line - 1;
    let cap = (start_line + FALLBACK_SPAN).min(lines.len());

    if brace_style {
        let mut depth: i32 = 0;
        let mut found_opening = false;
        for (i, line) in lines.iter().enumerate().skip(start_idx) {
            if i + 1 > cap {
                break;
            }
            for ch in line.chars() {
                match ch {
                    '{' => {
                        depth += 1;
                        found_opening = true;
                    }
                    '}' => depth -= 1,
                    _ => {}
                }
            }
            if found_opening && depth <= 0 {
                return i + 1;
            }
            // Single-line declaration with no block at all
            if !found_opening && i > start_idx {
                return start_line;
            }
        }
        return cap;
    }

    let start_indent = indent_of(lines[start_idx]);
    let mut last_code_line = start_line;
    for (i, line) in lines.iter().enumerate().skip(start_idx + 1) {
        if i + 1 > cap {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if indent_of(line) <= start_indent {
            return last_code_line;
        }
        last_code_line = i + 1;
    }
    last_code_line
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Language-agnostic keyword blacklist for call-shape filtering.
fn is_keyword(name: &str) -> bool {
    matches!(
        name,
        "if" | "else" | "elif" | "for" | "while" | "do" | "switch" | "case" | "default"
            | "break" | "continue" | "return" | "throw" | "try" | "catch" | "finally"
            | "var" | "let" | "const" | "function" | "class" | "extends" | "implements"
            | "import" | "export" | "from" | "as" | "async" | "await" | "yield" | "static"
            | "public" | "private" | "protected" | "readonly" | "true" | "false" | "null"
            | "undefined" | "void" | "never" | "this" | "super" | "constructor" | "typeof"
            | "instanceof" | "in" | "of"
            | "def" | "lambda" | "with" | "assert" | "pass" | "raise" | "global"
            | "nonlocal" | "and" | "or" | "not" | "is" | "None" | "True" | "False"
            | "self" | "cls" | "except"
            | "fn" | "pub" | "mod" | "use" | "crate" | "Self" | "struct" | "enum"
            | "trait" | "impl" | "type" | "where" | "mut" | "ref" | "move" | "dyn"
            | "unsafe" | "loop" | "match"
            | "func" | "package" | "go" | "defer" | "chan" | "select" | "range"
            | "interface" | "nil" | "map"
            | "int" | "float" | "double" | "char" | "string" | "bool" | "boolean"
            | "byte" | "short" | "long" | "signed" | "unsigned" | "sizeof"
            | "auto" | "register" | "volatile" | "extern" | "elsif" | "end" | "then"
            | "begin" | "rescue" | "ensure" | "until" | "unless"
    )
}

/// Common builtins that would otherwise flood the call graph.
fn is_builtin(name: &str, language: Option<&str>) -> bool {
    match language {
        Some("javascript") | Some("typescript") => matches!(
            name,
            "console" | "log" | "require" | "parseInt" | "parseFloat" | "isNaN"
                | "setTimeout" | "setInterval" | "clearTimeout" | "clearInterval"
                | "JSON" | "stringify" | "parse" | "fetch" | "Promise" | "resolve"
                | "reject" | "then" | "push" | "pop" | "shift" | "slice" | "splice"
                | "join" | "split" | "indexOf" | "includes" | "forEach" | "filter"
                | "reduce" | "toString" | "hasOwnProperty" | "keys" | "values"
                | "entries" | "assign" | "freeze" | "isArray" | "concat" | "trim"
                | "replace" | "charAt" | "substring" | "toLowerCase" | "toUpperCase"
        ),
        Some("python") => matches!(
            name,
            "print" | "len" | "str" | "repr" | "isinstance" | "issubclass" | "hasattr"
                | "getattr" | "setattr" | "open" | "input" | "iter" | "next" | "zip"
                | "sorted" | "reversed" | "enumerate" | "sum" | "min" | "max" | "abs"
                | "round" | "format" | "hash" | "callable" | "staticmethod"
                | "classmethod" | "property" | "append" | "extend" | "items" | "get"
                | "pop" | "join" | "split" | "strip" | "startswith" | "endswith"
        ),
        Some("rust") => matches!(
            name,
            "println" | "print" | "eprintln" | "eprint" | "format" | "write" | "writeln"
                | "panic" | "vec" | "todo" | "unimplemented" | "unreachable" | "cfg"
                | "derive" | "unwrap" | "expect" | "clone" | "to_string" | "into"
                | "from" | "as_str" | "as_ref" | "iter" | "collect" | "push" | "insert"
                | "get" | "len" | "is_empty" | "Some" | "Ok" | "Err" | "Box" | "Vec"
                | "String" | "Arc" | "Rc"
        ),
        Some("go") => matches!(
            name,
            "len" | "cap" | "make" | "append" | "copy" | "close" | "panic" | "recover"
                | "Println" | "Printf" | "Sprintf" | "Errorf" | "Error"
        ),
        _ => false,
    }
}
