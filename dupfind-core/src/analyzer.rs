use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::alphabet::{Alphabet, Symbol};
use crate::canon::default_canonicalize;
use crate::error::CoreError;
use crate::extractor::{self, MaximalRepeat, Metric};
use crate::trie::STrie;

/// Holds the alphabet, the trie, and enough per-file bookkeeping to turn
/// an extractor result back into human-readable locations and text.
pub struct Analyzer<F = fn(&str) -> String>
where
    F: Fn(&str) -> String,
{
    canonicalize: F,
    alphabet: Alphabet,
    trie: STrie,
    files: Vec<PathBuf>,
    /// Per-file kept-symbol sequence (parallels `cur.py`'s `self.lines`).
    lines: Vec<Vec<Symbol>>,
    /// Per-file `canonical_index -> original (0-based) line number`.
    lineno_map: Vec<Vec<usize>>,
    /// Total raw (not just kept) lines scanned across every added file.
    lines_count: usize,
}

impl Analyzer<fn(&str) -> String> {
    /// An analyzer using the default canonicalizer (strip whitespace and braces).
    pub fn with_default_canonicalizer() -> Self {
        Analyzer::new(default_canonicalize)
    }
}

impl<F> Analyzer<F>
where
    F: Fn(&str) -> String,
{
    pub fn new(canonicalize: F) -> Self {
        Analyzer {
            canonicalize,
            alphabet: Alphabet::new(),
            trie: STrie::new(),
            files: Vec::new(),
            lines: Vec::new(),
            lineno_map: Vec::new(),
            lines_count: 0,
        }
    }

    pub fn lines_count(&self) -> usize {
        self.lines_count
    }

    /// Reads `path`, canonicalizes each line (dropping lines whose
    /// canonical form is empty), and feeds the resulting symbol stream
    /// into the shared trie. `on_progress` receives the trie's node
    /// counter for this file (see [`STrie::add`]).
    pub fn add_file(&mut self, path: &Path, on_progress: impl FnMut(u64)) -> Result<(), CoreError> {
        let content = fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut elements = Vec::new();
        let mut lineno_map = Vec::new();
        let mut actual_index = 0usize;
        for raw_line in content.lines() {
            let canonical = (self.canonicalize)(raw_line);
            if !canonical.is_empty() {
                let symbol = self.alphabet.intern(&canonical);
                elements.push(symbol);
                lineno_map.push(actual_index);
            }
            actual_index += 1;
        }

        self.trie.add(&elements, on_progress);
        self.files.push(path.to_path_buf());
        self.lines.push(elements);
        self.lineno_map.push(lineno_map);
        self.lines_count += actual_index;
        Ok(())
    }

    /// Extracts and returns maximal repeats satisfying `metric`, in the
    /// trie's natural (root-symbol, then DFS) order.
    pub fn maximal_repeats<M: Metric>(
        &self,
        metric: &M,
    ) -> Result<Vec<Rc<MaximalRepeat>>, M::Error> {
        extractor::maximal_repeats(&self.trie, metric)
    }

    /// Renders a repeat into the canonical lines of its first occurrence
    /// plus `(basename, original 1-based line number)` for every
    /// occurrence.
    pub fn render(&self, repeat: &MaximalRepeat) -> RenderedRepeat {
        let first = repeat.indices[0];
        let file_idx = first.string_id as usize;
        let end_ci = first.offset as usize;
        let start_ci = end_ci + 1 - repeat.length;
        let lines: Vec<String> = (start_ci..=end_ci)
            .map(|ci| self.alphabet.text_of(self.lines[file_idx][ci]).to_string())
            .collect();

        let locations = repeat
            .indices
            .iter()
            .map(|p| {
                let file_idx = p.string_id as usize;
                let start_ci = p.offset as usize + 1 - repeat.length;
                let lineno = self.lineno_map[file_idx][start_ci] + 1;
                let basename = self.files[file_idx]
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| self.files[file_idx].display().to_string());
                (basename, lineno)
            })
            .collect();

        RenderedRepeat { lines, locations }
    }
}

/// A repeat rendered back into text and source locations, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRepeat {
    pub lines: Vec<String>,
    pub locations: Vec<(String, usize)>,
}
