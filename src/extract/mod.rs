// Extractor pipeline: capability/priority dispatch over heuristic extractors

pub mod endpoints;
pub mod patterns;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::scan::FileInfo;
use crate::store::{CallKind, SymbolKind};

/// A symbol as produced by extraction, before the store assigns ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSymbol {
    pub name: String,
    pub kind: SymbolKind,
    pub line_start: u32,
    pub line_end: u32,
    pub signature: Option<String>,
    pub metadata: serde_json::Value,
}

/// A call site found in a file. Attribution to a caller symbol happens
/// at store time by line containment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCall {
    pub callee_name: String,
    pub kind: CallKind,
    pub line: u32,
}

/// An import statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawImport {
    pub module: String,
    pub line: u32,
}

/// A comment line (block comments contribute their first line).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawComment {
    pub line: u32,
    pub text: String,
}

/// Everything one extractor produced for one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedContext {
    pub symbols: Vec<RawSymbol>,
    pub imports: Vec<RawImport>,
    pub exports: Vec<String>,
    /// External modules this file depends on (deduplicated import targets).
    pub dependencies: Vec<String>,
    pub comments: Vec<RawComment>,
    pub calls: Vec<RawCall>,
}

/// A strategy for converting file text into an [`ExtractedContext`].
///
/// For each file every capable extractor is considered and the one with
/// the highest priority wins. The pattern-table extractor reports
/// `can_handle = true` for everything at priority 0 and is the universal
/// fallback.
pub trait Extractor {
    fn name(&self) -> &'static str;
    fn can_handle(&self, file: &FileInfo) -> bool;
    fn priority(&self) -> u32;
    fn supported_languages(&self) -> &[&'static str];
    fn extract(&self, file: &FileInfo) -> Result<ExtractedContext>;
}

/// Ordered set of extractors plus the endpoint detector that augments
/// whatever the chosen extractor produced.
pub struct ExtractorPipeline {
    extractors: Vec<Box<dyn Extractor + Send + Sync>>,
}

impl ExtractorPipeline {
    pub fn new() -> Self {
        Self {
            extractors: vec![Box::new(patterns::PatternExtractor::new())],
        }
    }

    /// Register an additional extractor.
    pub fn register(&mut self, extractor: Box<dyn Extractor + Send + Sync>) {
        self.extractors.push(extractor);
    }

    /// Extract one file. Returns the context and whether extraction
    /// degraded to empty because the chosen extractor failed.
    pub fn extract(&self, file: &FileInfo) -> (ExtractedContext, bool) {
        let chosen = self
            .extractors
            .iter()
            .filter(|e| e.can_handle(file))
            .max_by_key(|e| e.priority());

        let (mut context, errored) = match chosen {
            Some(extractor) => match extractor.extract(file) {
                Ok(ctx) => (ctx, false),
                Err(e) => {
                    warn!(
                        "extractor {} failed on {}: {e}",
                        extractor.name(),
                        file.relative_path
                    );
                    (ExtractedContext::default(), true)
                }
            },
            None => (ExtractedContext::default(), false),
        };

        // Route declarations are detected independently of the chosen
        // extractor and merged in, deduplicated by (line, name).
        let routes = endpoints::detect(&file.content, file.language);
        for endpoint in routes {
            let duplicate = context
                .symbols
                .iter()
                .any(|s| s.line_start == endpoint.line_start && s.name == endpoint.name);
            if !duplicate {
                context.symbols.push(endpoint);
            }
        }

        debug!(
            "extracted {}: {} symbols, {} calls",
            file.relative_path,
            context.symbols.len(),
            context.calls.len()
        );
        (context, errored)
    }
}

impl Default for ExtractorPipeline {
    fn default() -> Self {
        Self::new()
    }
}
