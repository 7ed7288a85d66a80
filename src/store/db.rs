use std::path::{Path, PathBuf};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

use super::{CallKind, DatabaseInfo, EdgeRow, FileRecord, SymbolKind, SymbolRecord};
use crate::error::{Error, Result};
use crate::extract::{RawCall, RawSymbol};
use crate::scan::FileInfo;

/// Type alias for connection pool
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// SQLite-backed symbol store. Single source of truth for all analyses.
///
/// Explicit handle with open/close lifecycle; cloning shares the pool.
#[derive(Clone)]
pub struct SymbolStore {
    pool: ConnectionPool,
    db_path: PathBuf,
}

impl SymbolStore {
    /// Create or open the store file.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        info!("Opening symbol store at: {}", db_path.display());

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let manager = SqliteConnectionManager::file(&db_path)
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

        let pool = Pool::builder().max_size(10).build(manager)?;

        {
            let conn = pool.get()?;
            super::schema::init_schema(&conn)?;
        }

        Ok(Self { pool, db_path })
    }

    fn conn(&self) -> Result<r2d2::PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Look up a file by its relative path.
    pub fn file_by_path(&self, relative_path: &str) -> Result<Option<FileRecord>> {
        let conn = self.conn()?;
        let file = conn
            .prepare(
                "SELECT id, path, absolute_path, content_hash, size_bytes, language,
                        last_modified, indexed_at
                 FROM files WHERE path = ?1",
            )?
            .query_row([relative_path], row_to_file)
            .optional()?;
        Ok(file)
    }

    /// Replace a file and everything it owns in one transaction.
    ///
    /// Old symbols cascade-delete (taking their outgoing edges with them);
    /// edges from other files that resolved into this file get their
    /// `callee_id` cleared and are re-linked by the next `resolve_callees`.
    /// Calls are attributed to the innermost symbol whose line range
    /// contains the call site; calls outside any symbol are dropped.
    pub fn replace_file(
        &self,
        info: &FileInfo,
        symbols: &[RawSymbol],
        calls: &[RawCall],
    ) -> Result<i64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM files WHERE path = ?1", [&info.relative_path])?;

        tx.execute(
            "INSERT INTO files (path, absolute_path, content_hash, size_bytes, language,
                                content, last_modified, indexed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                info.relative_path,
                info.path.to_string_lossy(),
                info.content_hash,
                info.size_bytes as i64,
                info.language,
                info.content,
                info.last_modified,
                now(),
            ],
        )?;
        let file_id = tx.last_insert_rowid();

        let mut symbol_ids = Vec::with_capacity(symbols.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO symbols (file_id, name, kind, line_start, line_end, signature, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for sym in symbols {
                stmt.execute(params![
                    file_id,
                    sym.name,
                    sym.kind.as_str(),
                    sym.line_start,
                    sym.line_end.max(sym.line_start),
                    sym.signature,
                    sym.metadata.to_string(),
                ])?;
                symbol_ids.push(tx.last_insert_rowid());
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO call_edges (caller_id, callee_id, callee_name, kind, line)
                 VALUES (?1, NULL, ?2, ?3, ?4)",
            )?;
            for call in calls {
                if let Some(caller) = enclosing_symbol(symbols, &symbol_ids, call.line) {
                    stmt.execute(params![
                        caller,
                        call.callee_name,
                        call.kind.as_str(),
                        call.line,
                    ])?;
                }
            }
        }

        tx.commit()?;
        debug!(
            "replaced {} ({} symbols, {} call sites)",
            info.relative_path,
            symbols.len(),
            calls.len()
        );
        Ok(file_id)
    }

    /// Re-link unresolved callee names to indexed symbols.
    ///
    /// Name-based heuristic, same-file match preferred over global; stays
    /// `NULL` when nothing matches. Resolution ignores import/export
    /// symbols so edges land on definitions.
    pub fn resolve_callees(&self) -> Result<u64> {
        let conn = self.conn()?;

        let same_file = conn.execute(
            "UPDATE call_edges SET callee_id = (
                SELECT s.id FROM symbols s
                JOIN symbols c ON c.id = call_edges.caller_id
                WHERE s.name = call_edges.callee_name
                  AND s.file_id = c.file_id
                  AND s.id != call_edges.caller_id
                  AND s.kind NOT IN ('import', 'export')
                LIMIT 1
             )
             WHERE callee_id IS NULL",
            [],
        )?;

        let global = conn.execute(
            "UPDATE call_edges SET callee_id = (
                SELECT MIN(s.id) FROM symbols s
                WHERE s.name = call_edges.callee_name
                  AND s.id != call_edges.caller_id
                  AND s.kind NOT IN ('import', 'export')
             )
             WHERE callee_id IS NULL",
            [],
        )?;

        debug!("resolved callees: {} same-file pass, {} global pass", same_file, global);

        let resolved: i64 = conn.query_row(
            "SELECT COUNT(*) FROM call_edges WHERE callee_id IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(resolved as u64)
    }

    /// Remove all files, symbols and edges.
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM call_edges", [])?;
        conn.execute("DELETE FROM symbols", [])?;
        conn.execute("DELETE FROM files", [])?;
        conn.execute("DELETE FROM index_meta", [])?;
        Ok(())
    }

    pub fn set_last_indexed(&self, timestamp: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO index_meta (key, value) VALUES ('last_indexed', ?1)",
            [timestamp.to_string()],
        )?;
        Ok(())
    }

    pub fn file_count(&self) -> Result<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn symbol_by_id(&self, id: i64) -> Result<Option<SymbolRecord>> {
        let conn = self.conn()?;
        let symbol = conn
            .prepare(&format!("{SYMBOL_SELECT} WHERE s.id = ?1"))?
            .query_row([id], row_to_symbol)
            .optional()?;
        Ok(symbol)
    }

    pub fn symbols_by_name(&self, name: &str) -> Result<Vec<SymbolRecord>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("{SYMBOL_SELECT} WHERE s.name = ?1 ORDER BY f.path, s.line_start"))?;
        let symbols = stmt
            .query_map([name], row_to_symbol)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(symbols)
    }

    /// Substring search on symbol names, optionally filtered by kind.
    pub fn symbols_like(
        &self,
        pattern: &str,
        kind: Option<SymbolKind>,
        limit: usize,
    ) -> Result<Vec<SymbolRecord>> {
        let conn = self.conn()?;
        let like = format!("%{}%", escape_like(pattern));

        let symbols = if let Some(kind) = kind {
            let mut stmt = conn.prepare(&format!(
                "{SYMBOL_SELECT} WHERE s.name LIKE ?1 ESCAPE '\\' AND s.kind = ?2
                 ORDER BY s.name LIMIT ?3"
            ))?;
            let rows = stmt
                .query_map(params![like, kind.as_str(), limit as i64], row_to_symbol)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        } else {
            let mut stmt = conn.prepare(&format!(
                "{SYMBOL_SELECT} WHERE s.name LIKE ?1 ESCAPE '\\' ORDER BY s.name LIMIT ?2"
            ))?;
            let rows = stmt
                .query_map(params![like, limit as i64], row_to_symbol)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        Ok(symbols)
    }

    pub fn list_symbols(&self, kind: Option<SymbolKind>, limit: usize) -> Result<Vec<SymbolRecord>> {
        let conn = self.conn()?;
        let symbols = if let Some(kind) = kind {
            let mut stmt = conn.prepare(&format!(
                "{SYMBOL_SELECT} WHERE s.kind = ?1 ORDER BY f.path, s.line_start LIMIT ?2"
            ))?;
            let rows = stmt
                .query_map(params![kind.as_str(), limit as i64], row_to_symbol)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        } else {
            let mut stmt = conn.prepare(&format!(
                "{SYMBOL_SELECT} ORDER BY f.path, s.line_start LIMIT ?1"
            ))?;
            let rows = stmt
                .query_map(params![limit as i64], row_to_symbol)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        Ok(symbols)
    }

    pub fn all_symbols(&self) -> Result<Vec<SymbolRecord>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("{SYMBOL_SELECT} ORDER BY f.path, s.line_start"))?;
        let symbols = stmt
            .query_map([], row_to_symbol)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(symbols)
    }

    pub fn all_symbol_names(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT DISTINCT name FROM symbols ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// Symbols meeting a minimum line span, with the owning file content
    /// for body extraction. Duplicate detection input.
    pub fn symbols_with_content(
        &self,
        min_lines: u32,
        kind: Option<SymbolKind>,
    ) -> Result<Vec<(SymbolRecord, String)>> {
        let conn = self.conn()?;
        let base = "SELECT s.id, s.file_id, f.path, s.name, s.kind, s.line_start, s.line_end,
                    s.signature, s.metadata, f.content
             FROM symbols s JOIN files f ON f.id = s.file_id
             WHERE (s.line_end - s.line_start + 1) >= ?1";
        let rows = if let Some(kind) = kind {
            let mut stmt = conn.prepare(&format!("{base} AND s.kind = ?2"))?;
            let rows = stmt
                .query_map(params![min_lines, kind.as_str()], row_to_symbol_content)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        } else {
            let mut stmt = conn.prepare(base)?;
            let rows = stmt
                .query_map(params![min_lines], row_to_symbol_content)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };
        Ok(rows)
    }

    /// Every call edge with caller location joined in. Adjacency input
    /// for the graph analyzer.
    pub fn all_edges(&self) -> Result<Vec<EdgeRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT e.caller_id, c.name, c.file_id, f.path,
                    e.callee_id, e.callee_name, t.file_id, e.kind, e.line
             FROM call_edges e
             JOIN symbols c ON c.id = e.caller_id
             JOIN files f ON f.id = c.file_id
             LEFT JOIN symbols t ON t.id = e.callee_id",
        )?;
        let edges = stmt
            .query_map([], |row| {
                let kind_str: String = row.get(7)?;
                Ok(EdgeRow {
                    caller_id: row.get(0)?,
                    caller_name: row.get(1)?,
                    caller_file_id: row.get(2)?,
                    caller_file_path: row.get(3)?,
                    callee_id: row.get(4)?,
                    callee_name: row.get(5)?,
                    callee_file_id: row.get(6)?,
                    kind: CallKind::parse(&kind_str).unwrap_or(CallKind::Function),
                    line: row.get::<_, i64>(8)? as u32,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(edges)
    }

    /// Symbols whose body contains a call to `name`.
    ///
    /// Matches on the recorded callee name rather than the resolved id, so
    /// unresolved edges still count. This is the imprecision contract the
    /// risk scoring depends on.
    pub fn callers_of_name(&self, name: &str) -> Result<Vec<(SymbolRecord, u32)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT s.id, s.file_id, f.path, s.name, s.kind, s.line_start, s.line_end,
                    s.signature, s.metadata, e.line
             FROM call_edges e
             JOIN symbols s ON s.id = e.caller_id
             JOIN files f ON f.id = s.file_id
             WHERE e.callee_name = ?1",
        )?;
        let rows = stmt
            .query_map([name], |row| {
                let sym = row_to_symbol(row)?;
                let line = row.get::<_, i64>(9)? as u32;
                Ok((sym, line))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Number of call sites referencing `name`.
    pub fn reference_count(&self, name: &str) -> Result<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM call_edges WHERE callee_name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Symbols whose id never appears as a resolved callee. Anti-join for
    /// unused-symbol detection.
    pub fn unreferenced_symbols(&self) -> Result<Vec<SymbolRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{SYMBOL_SELECT}
             WHERE s.id NOT IN (SELECT callee_id FROM call_edges WHERE callee_id IS NOT NULL)
             ORDER BY f.path, s.line_start"
        ))?;
        let symbols = stmt
            .query_map([], row_to_symbol)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(symbols)
    }

    /// Files whose raw content contains `token`. Text-reference fallback
    /// for under-resolved call graphs.
    pub fn files_containing(&self, token: &str) -> Result<Vec<(i64, String)>> {
        let conn = self.conn()?;
        let like = format!("%{}%", escape_like(token));
        let mut stmt = conn.prepare(
            "SELECT id, path FROM files WHERE content LIKE ?1 ESCAPE '\\' ORDER BY path",
        )?;
        let rows = stmt
            .query_map([like], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn database_info(&self) -> Result<DatabaseInfo> {
        let conn = self.conn()?;

        let file_count: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |r| r.get(0))?;
        let symbol_count: i64 = conn.query_row("SELECT COUNT(*) FROM symbols", [], |r| r.get(0))?;
        let edge_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM call_edges", [], |r| r.get(0))?;
        let last_indexed: Option<String> = conn
            .query_row(
                "SELECT value FROM index_meta WHERE key = 'last_indexed'",
                [],
                |r| r.get(0),
            )
            .optional()?;

        let total_size_bytes = std::fs::metadata(&self.db_path).map(|m| m.len()).unwrap_or(0);

        Ok(DatabaseInfo {
            file_count: file_count as u64,
            symbol_count: symbol_count as u64,
            edge_count: edge_count as u64,
            total_size_bytes,
            last_indexed: last_indexed.and_then(|v| v.parse().ok()),
        })
    }
}

const SYMBOL_SELECT: &str =
    "SELECT s.id, s.file_id, f.path, s.name, s.kind, s.line_start, s.line_end,
            s.signature, s.metadata
     FROM symbols s JOIN files f ON f.id = s.file_id";

fn row_to_file(row: &Row) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        id: row.get(0)?,
        relative_path: row.get(1)?,
        absolute_path: row.get(2)?,
        content_hash: row.get(3)?,
        size_bytes: row.get::<_, i64>(4)? as u64,
        language: row.get(5)?,
        last_modified: row.get(6)?,
        indexed_at: row.get(7)?,
    })
}

fn row_to_symbol(row: &Row) -> rusqlite::Result<SymbolRecord> {
    let kind_str: String = row.get(4)?;
    let metadata_str: String = row.get(8)?;

    Ok(SymbolRecord {
        id: row.get(0)?,
        file_id: row.get(1)?,
        file_path: row.get(2)?,
        name: row.get(3)?,
        kind: SymbolKind::parse(&kind_str).unwrap_or(SymbolKind::Function),
        line_start: row.get::<_, i64>(5)? as u32,
        line_end: row.get::<_, i64>(6)? as u32,
        signature: row.get(7)?,
        metadata: serde_json::from_str(&metadata_str).unwrap_or(serde_json::Value::Null),
    })
}

fn row_to_symbol_content(row: &Row) -> rusqlite::Result<(SymbolRecord, String)> {
    let sym = row_to_symbol(row)?;
    let content: String = row.get(9)?;
    Ok((sym, content))
}

/// Escape LIKE wildcards in user input.
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Pick the innermost symbol whose span contains `line`.
fn enclosing_symbol(symbols: &[RawSymbol], ids: &[i64], line: u32) -> Option<i64> {
    symbols
        .iter()
        .zip(ids)
        .filter(|(s, _)| s.line_start <= line && line <= s.line_end)
        .min_by_key(|(s, _)| s.line_end - s.line_start)
        .map(|(_, id)| *id)
}

/// Current timestamp in seconds.
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
