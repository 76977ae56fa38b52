//! A generalized (multi-string) online suffix trie of Ukkonen's
//! construction, plus the traversal that extracts maximal repeated line
//! sequences from it.
//!
//! This crate is the core described by SPEC_FULL.md: it owns the trie,
//! the repeat extractor, the line alphabet, and the analyzer façade that
//! ties them to real files. The CLI, the severity-expression compiler's
//! command-line wiring, terminal coloring, and cross-run persistence all
//! live in `dupfind-cli`.

pub mod alphabet;
pub mod analyzer;
pub mod canon;
pub mod error;
pub mod extractor;
pub mod metric;
pub mod node;
pub mod position;
pub mod trie;

pub use alphabet::{Alphabet, Symbol};
pub use analyzer::{Analyzer, RenderedRepeat};
pub use canon::default_canonicalize;
pub use error::CoreError;
pub use extractor::{maximal_repeats, maximal_repeats_by_root_symbol, MaximalRepeat, Metric};
pub use metric::{CompiledMetric, MetricError, DEFAULT_METRIC_EXPR};
pub use position::Position;
pub use trie::STrie;
