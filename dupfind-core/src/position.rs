/// A location of one symbol in the combined corpus: the `string_id`-th
/// added string, at `offset` within that string's symbol sequence.
///
/// `offset == len(string)` is reserved for the string's end-marker and
/// never denotes a real symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub string_id: u32,
    pub offset: u32,
}

impl Position {
    pub fn new(string_id: u32, offset: u32) -> Self {
        Position { string_id, offset }
    }
}
