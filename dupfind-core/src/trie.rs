use std::collections::HashSet;

use crate::alphabet::Symbol;
use crate::node::{Arena, EdgeKey, NodeId, ROOT};
use crate::position::Position;

/// Every 1000 internal node visits, `add` reports the running total
/// through its progress callback (purely advisory, see §5).
const PROGRESS_MODULUS: u64 = 1000;

/// A generalized online suffix trie, built incrementally over a sequence
/// of symbol strings via repeated calls to [`STrie::add`].
///
/// This is Ukkonen's algorithm generalized to multiple strings: each
/// `add` appends a fresh string terminated by a string-unique end-marker
/// edge, so suffixes of one string can never extend into another.
#[derive(Debug)]
pub struct STrie {
    arena: Arena,
    strings: Vec<Vec<Symbol>>,
    nodes_processed: u64,
    /// The active point, carried across the symbols of the *current*
    /// string only. Reset to `ROOT` at the start of every `add`.
    current: NodeId,
    root_keys: Vec<Symbol>,
    root_keys_seen: HashSet<Symbol>,
}

impl STrie {
    pub fn new() -> Self {
        STrie {
            arena: Arena::new(),
            strings: Vec::new(),
            nodes_processed: 0,
            current: ROOT,
            root_keys: Vec::new(),
            root_keys_seen: HashSet::new(),
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn root_keys(&self) -> &[Symbol] {
        &self.root_keys
    }

    pub fn strings(&self) -> &[Vec<Symbol>] {
        &self.strings
    }

    /// Appends `symbols` as a new generalized string and returns its
    /// `string_id`. `on_progress` is invoked with the running node count
    /// every 1000 internal node visits, plus once more at completion;
    /// construction proceeds to completion regardless of what the
    /// caller does with these values.
    pub fn add(&mut self, symbols: &[Symbol], mut on_progress: impl FnMut(u64)) -> u32 {
        let string_id = self.strings.len() as u32;
        self.strings.push(symbols.to_vec());
        self.current = ROOT;
        self.nodes_processed = 0;

        for (i, &symbol) in symbols.iter().enumerate() {
            if self.root_keys_seen.insert(symbol) {
                self.root_keys.push(symbol);
            }
            let p = Position::new(string_id, i as u32);
            self.insert(p, EdgeKey::Symbol(symbol), &mut on_progress);
        }

        let end = Position::new(string_id, symbols.len() as u32);
        self.insert(end, EdgeKey::End(end), &mut on_progress);
        on_progress(self.nodes_processed);

        string_id
    }

    /// Inserts position `p` (under edge key `key`) into every suffix
    /// reachable from the active point by following suffix links, in the
    /// manner of Ukkonen's single-phase extension.
    fn insert(&mut self, p: Position, key: EdgeKey, on_progress: &mut impl FnMut(u64)) {
        let mut cur: Option<NodeId> = Some(self.current);
        let mut last: Option<NodeId> = None;

        while let Some(cur_id) = cur {
            let child = if let Some(existing) = self.arena.get(cur_id).children.get(&key) {
                self.extend_along_suffix_links(existing, p);
                existing
            } else if self.arena.get(cur_id).suffix_link.is_none() {
                // cur_id is the root: the new child links straight back to it.
                self.arena.alloc(Some(cur_id), p)
            } else {
                // Suffix link resolved one step later, by the next
                // iteration's `last` assignment below.
                self.arena.alloc(None, p)
            };

            if let Some(last_id) = last {
                self.arena.get_mut(last_id).suffix_link = Some(child);
            }
            self.arena.get_mut(cur_id).children.insert(key, child);

            last = Some(child);
            cur = self.arena.get(cur_id).suffix_link;

            self.nodes_processed += 1;
            if self.nodes_processed % PROGRESS_MODULUS == 0 {
                on_progress(self.nodes_processed);
            }
        }

        self.current = self
            .arena
            .get(self.current)
            .children
            .get(&key)
            .expect("key was just inserted along the active point's suffix chain");
    }

    /// Adds `p` to the occurrence set of `start` and every node reached
    /// by following suffix links from it, stopping *before* a node whose
    /// own suffix link is `None` (i.e. before the root). Root's `indices`
    /// is therefore never touched — see SPEC_FULL.md open question 3.
    fn extend_along_suffix_links(&mut self, start: NodeId, p: Position) {
        let mut n = start;
        loop {
            match self.arena.get(n).suffix_link {
                Some(next) => {
                    self.arena.get_mut(n).indices.add(p);
                    n = next;
                }
                None => break,
            }
        }
    }
}

impl Default for STrie {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;

    fn build(strings: &[&str]) -> (STrie, Alphabet) {
        let mut alphabet = Alphabet::new();
        let mut trie = STrie::new();
        for s in strings {
            let symbols: Vec<Symbol> = s.split_whitespace().map(|tok| alphabet.intern(tok)).collect();
            trie.add(&symbols, |_| {});
        }
        (trie, alphabet)
    }

    #[test]
    fn single_string_builds_without_panicking() {
        let (trie, _) = build(&["a b c a b c a b c"]);
        assert!(trie.arena().len() > 1);
    }

    #[test]
    fn root_keys_preserve_first_seen_order() {
        let (trie, alphabet) = build(&["b a c a b"]);
        let texts: Vec<&str> = trie.root_keys().iter().map(|&s| alphabet.text_of(s)).collect();
        assert_eq!(texts, vec!["b", "a", "c"]);
    }

    #[test]
    fn root_indices_are_never_populated() {
        let (trie, _) = build(&["a a a"]);
        assert!(trie.arena().get(ROOT).indices.is_empty());
    }

    #[test]
    fn two_strings_share_the_trie() {
        let (trie, _) = build(&["x y z", "x y z"]);
        assert_eq!(trie.strings().len(), 2);
    }

    #[test]
    fn progress_callback_fires_at_completion() {
        let mut alphabet = Alphabet::new();
        let mut trie = STrie::new();
        let symbols: Vec<Symbol> = "a b c".split_whitespace().map(|t| alphabet.intern(t)).collect();
        let mut seen = Vec::new();
        trie.add(&symbols, |n| seen.push(n));
        // a 4-symbol insertion (3 symbols + end marker) is far below the
        // 1000-modulus, so the only emission is the final one.
        assert_eq!(seen.len(), 1);
        assert!(seen[0] > 0);
    }
}
