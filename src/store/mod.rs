// Symbol store: domain types and SQLite persistence

pub mod db;
pub mod schema;

pub use db::SymbolStore;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An indexed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    /// Path relative to the indexed root; the stable external identifier.
    pub relative_path: String,
    pub absolute_path: String,
    pub content_hash: String,
    pub size_bytes: u64,
    pub language: Option<String>,
    pub last_modified: i64,
    pub indexed_at: i64,
}

/// A named, line-ranged code construct owned by exactly one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub id: i64,
    pub file_id: i64,
    /// Relative path of the owning file, denormalized for results.
    pub file_path: String,
    pub name: String,
    pub kind: SymbolKind,
    pub line_start: u32,
    pub line_end: u32,
    pub signature: Option<String>,
    /// Extractor-specific facts (exported flag, HTTP method/path, ...).
    pub metadata: serde_json::Value,
}

impl SymbolRecord {
    pub fn is_exported(&self) -> bool {
        self.metadata
            .get("exported")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn line_count(&self) -> u32 {
        self.line_end.saturating_sub(self.line_start) + 1
    }
}

/// Symbol kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Interface,
    Type,
    Struct,
    Enum,
    Trait,
    Variable,
    Constant,
    Property,
    Namespace,
    Module,
    Export,
    Import,
    Endpoint,
    Middleware,
    Decorator,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Type => "type",
            SymbolKind::Struct => "struct",
            SymbolKind::Enum => "enum",
            SymbolKind::Trait => "trait",
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Property => "property",
            SymbolKind::Namespace => "namespace",
            SymbolKind::Module => "module",
            SymbolKind::Export => "export",
            SymbolKind::Import => "import",
            SymbolKind::Endpoint => "endpoint",
            SymbolKind::Middleware => "middleware",
            SymbolKind::Decorator => "decorator",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let kind = match s {
            "function" => SymbolKind::Function,
            "method" => SymbolKind::Method,
            "class" => SymbolKind::Class,
            "interface" => SymbolKind::Interface,
            "type" => SymbolKind::Type,
            "struct" => SymbolKind::Struct,
            "enum" => SymbolKind::Enum,
            "trait" => SymbolKind::Trait,
            "variable" => SymbolKind::Variable,
            "constant" => SymbolKind::Constant,
            "property" => SymbolKind::Property,
            "namespace" => SymbolKind::Namespace,
            "module" => SymbolKind::Module,
            "export" => SymbolKind::Export,
            "import" => SymbolKind::Import,
            "endpoint" => SymbolKind::Endpoint,
            "middleware" => SymbolKind::Middleware,
            "decorator" => SymbolKind::Decorator,
            _ => {
                return Err(crate::error::Error::validation(format!(
                    "unknown symbol kind: {s}"
                )))
            }
        };
        Ok(kind)
    }

    /// Kinds that define callable or referencable code, as opposed to
    /// re-export plumbing.
    pub fn is_definition(&self) -> bool {
        !matches!(self, SymbolKind::Export | SymbolKind::Import)
    }
}

/// How a call site referenced its callee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Function,
    Method,
    Constructor,
    Import,
}

impl CallKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallKind::Function => "function",
            CallKind::Method => "method",
            CallKind::Constructor => "constructor",
            CallKind::Import => "import",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let kind = match s {
            "function" => CallKind::Function,
            "method" => CallKind::Method,
            "constructor" => CallKind::Constructor,
            "import" => CallKind::Import,
            _ => {
                return Err(crate::error::Error::validation(format!(
                    "unknown call kind: {s}"
                )))
            }
        };
        Ok(kind)
    }
}

/// A directed, possibly-unresolved reference from one symbol to a callee.
///
/// Weak relation: recreated whenever the caller's file is re-indexed, and
/// `callee_id` is cleared (then re-resolved) when the callee's file is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller_id: i64,
    /// `None` when the callee name did not resolve to an indexed symbol.
    pub callee_id: Option<i64>,
    pub callee_name: String,
    pub kind: CallKind,
    pub line: u32,
}

/// A call edge joined with both endpoints' location info, as the graph
/// analyzer consumes it.
#[derive(Debug, Clone)]
pub struct EdgeRow {
    pub caller_id: i64,
    pub caller_name: String,
    pub caller_file_id: i64,
    pub caller_file_path: String,
    pub callee_id: Option<i64>,
    pub callee_name: String,
    pub callee_file_id: Option<i64>,
    pub kind: CallKind,
    pub line: u32,
}

/// Store-level summary for `database_info()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub file_count: u64,
    pub symbol_count: u64,
    pub edge_count: u64,
    pub total_size_bytes: u64,
    pub last_indexed: Option<i64>,
}
