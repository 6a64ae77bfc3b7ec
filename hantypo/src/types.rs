/// Edit cost of a replacement option. `f32::INFINITY` marks a forbidden
/// rewrite that is recorded but never emitted.
pub type Cost = f32;

/// Index of a node in a pattern trie or frozen automaton arena.
pub type NodeIndex = u32;

/// Index of a compiled pattern in the prepared replacement tables.
pub type PatternIndex = u32;
