/// Characters stripped from both ends of a raw line by the default
/// canonicalizer. Matches `cur.py`'s `line.strip(' \r\n\t{}')` exactly,
/// rather than a generic "ASCII whitespace" predicate, so that e.g. a
/// vertical-tab-padded line is canonicalized identically to the source.
const STRIPPED: [char; 6] = [' ', '\r', '\n', '\t', '{', '}'];

/// A rudimentary C/C++-oriented canonicalizer: strips surrounding
/// whitespace and curly braces so that brace style (cuddled or not)
/// doesn't defeat duplicate detection.
pub fn default_canonicalize(line: &str) -> String {
    line.trim_matches(|c| STRIPPED.contains(&c)).to_string()
}
