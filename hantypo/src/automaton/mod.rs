//! Multi-pattern matching automaton over decomposed jamo units.
//!
//! Patterns are collected in a mutable [`PatternTrie`] arena during rule
//! compilation, then frozen into a [`PatternAutomaton`] with failure links
//! (Aho–Corasick). The frozen form is immutable and safe to share across
//! query threads.

use std::collections::VecDeque;

use hashbrown::HashMap;

use crate::types::{NodeIndex, PatternIndex};

const ROOT: NodeIndex = 0;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: HashMap<char, NodeIndex>,
    value: Option<PatternIndex>,
}

/// Mutable arena trie keyed by jamo-unit sequences.
///
/// Nodes are addressed by stable integer indices into the arena; the root
/// is node 0. Values are opaque pattern ids assigned by the caller.
#[derive(Debug, Clone)]
pub struct PatternTrie {
    nodes: Vec<TrieNode>,
}

impl Default for PatternTrie {
    fn default() -> Self {
        PatternTrie::new()
    }
}

impl PatternTrie {
    /// Creates an empty trie containing only the root node.
    pub fn new() -> PatternTrie {
        PatternTrie {
            nodes: vec![TrieNode::default()],
        }
    }

    /// Inserts `pattern` and assigns it `value`, unless the pattern is
    /// already present, in which case the existing value is kept.
    /// Returns the value stored at the pattern's node.
    pub fn get_or_insert(&mut self, pattern: &[char], value: PatternIndex) -> PatternIndex {
        let mut node = ROOT;

        for &unit in pattern {
            node = match self.nodes[node as usize].children.get(&unit) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len() as NodeIndex;
                    self.nodes.push(TrieNode::default());
                    self.nodes[node as usize].children.insert(unit, next);
                    next
                }
            };
        }

        *self.nodes[node as usize].value.get_or_insert(value)
    }

    /// Number of nodes in the arena, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[derive(Debug, Clone)]
struct FrozenNode {
    children: HashMap<char, NodeIndex>,
    fail: NodeIndex,
    depth: u32,
    value: Option<PatternIndex>,
    // The value above is borrowed from a shorter accepting suffix further
    // down the failure chain; it must not be emitted at this node.
    has_submatch: bool,
}

/// Frozen failure-link automaton compiled from a [`PatternTrie`].
///
/// Each node's failure link points to the longest proper suffix of its
/// pattern that is also in the trie. Nodes without a value of their own
/// inherit the value of the nearest accepting suffix, flagged as a
/// submatch, so a scan can stop walking a failure chain as soon as it
/// sees a value-free node.
#[derive(Debug, Clone)]
pub struct PatternAutomaton {
    nodes: Vec<FrozenNode>,
}

impl PatternAutomaton {
    /// Compacts `trie` into its frozen form, computing failure links in
    /// breadth-first order.
    pub fn freeze(trie: &PatternTrie) -> PatternAutomaton {
        let mut nodes: Vec<FrozenNode> = trie
            .nodes
            .iter()
            .map(|n| FrozenNode {
                children: n.children.clone(),
                fail: ROOT,
                depth: 0,
                value: n.value,
                has_submatch: false,
            })
            .collect();

        let mut queue: VecDeque<NodeIndex> = nodes[ROOT as usize].children.values().copied().collect();
        for &child in queue.iter() {
            nodes[child as usize].depth = 1;
        }

        while let Some(index) = queue.pop_front() {
            let edges: Vec<(char, NodeIndex)> = nodes[index as usize]
                .children
                .iter()
                .map(|(&unit, &child)| (unit, child))
                .collect();

            for (unit, child) in edges {
                let mut fail = nodes[index as usize].fail;
                let fail = loop {
                    if let Some(&next) = nodes[fail as usize].children.get(&unit) {
                        break next;
                    }
                    if fail == ROOT {
                        break ROOT;
                    }
                    fail = nodes[fail as usize].fail;
                };

                nodes[child as usize].fail = fail;
                nodes[child as usize].depth = nodes[index as usize].depth + 1;
                if nodes[child as usize].value.is_none() {
                    // Inherited transitively: `fail` was frozen earlier in
                    // BFS order, so its value is already propagated.
                    if let Some(value) = nodes[fail as usize].value {
                        nodes[child as usize].value = Some(value);
                        nodes[child as usize].has_submatch = true;
                    }
                }

                queue.push_back(child);
            }
        }

        log::debug!("froze pattern automaton with {} nodes", nodes.len());

        PatternAutomaton { nodes }
    }

    /// The scan start state (the root node).
    #[inline(always)]
    pub fn start_state(&self) -> NodeIndex {
        ROOT
    }

    /// Advances `state` by one input unit, following failure links until a
    /// matching edge is found or the root is reached.
    #[inline(always)]
    pub fn step(&self, mut state: NodeIndex, unit: char) -> NodeIndex {
        loop {
            if let Some(&next) = self.nodes[state as usize].children.get(&unit) {
                return next;
            }
            if state == ROOT {
                return ROOT;
            }
            state = self.nodes[state as usize].fail;
        }
    }

    /// Pattern id of the longest match ending at `state`, if any.
    #[inline(always)]
    pub fn value(&self, state: NodeIndex) -> Option<PatternIndex> {
        self.nodes[state as usize].value
    }

    /// Number of input units consumed along the trie path to `state`.
    #[inline(always)]
    pub fn depth(&self, state: NodeIndex) -> u32 {
        self.nodes[state as usize].depth
    }

    /// Iterates every distinct pattern ending at `state`, longest first,
    /// by walking the failure chain and skipping submatch-flagged nodes.
    pub fn matches(&self, state: NodeIndex) -> Matches<'_> {
        Matches {
            automaton: self,
            state: Some(state),
        }
    }
}

/// Iterator over the accepting patterns along a failure chain.
pub struct Matches<'a> {
    automaton: &'a PatternAutomaton,
    state: Option<NodeIndex>,
}

impl Iterator for Matches<'_> {
    type Item = PatternIndex;

    fn next(&mut self) -> Option<PatternIndex> {
        loop {
            let state = self.state?;
            let node = &self.automaton.nodes[state as usize];

            let value = match node.value {
                Some(value) => value,
                None => {
                    self.state = None;
                    return None;
                }
            };

            self.state = if state == ROOT { None } else { Some(node.fail) };

            if !node.has_submatch {
                return Some(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn scan(automaton: &PatternAutomaton, input: &str) -> Vec<(usize, PatternIndex)> {
        let mut found = vec![];
        let mut state = automaton.start_state();
        for (i, unit) in input.chars().enumerate() {
            state = automaton.step(state, unit);
            for pattern in automaton.matches(state) {
                found.push((i + 1, pattern));
            }
        }
        found
    }

    #[test]
    fn get_or_insert_keeps_first_value() {
        let mut trie = PatternTrie::new();
        assert_eq!(trie.get_or_insert(&units("abc"), 0), 0);
        assert_eq!(trie.get_or_insert(&units("abc"), 7), 0);
        assert_eq!(trie.get_or_insert(&units("ab"), 1), 1);
        assert_eq!(trie.node_count(), 4);
    }

    #[test]
    fn collects_all_suffix_matches() {
        let mut trie = PatternTrie::new();
        trie.get_or_insert(&units("abc"), 0);
        trie.get_or_insert(&units("bc"), 1);
        trie.get_or_insert(&units("c"), 2);
        let automaton = PatternAutomaton::freeze(&trie);

        assert_eq!(scan(&automaton, "abc"), vec![(3, 0), (3, 1), (3, 2)]);
        assert_eq!(scan(&automaton, "xbc"), vec![(3, 1), (3, 2)]);
    }

    #[test]
    fn submatch_nodes_are_skipped_not_duplicated() {
        // "bc" is not a pattern itself; it inherits "c" along its failure
        // chain, and the inherited value must only be emitted once.
        let mut trie = PatternTrie::new();
        trie.get_or_insert(&units("bcd"), 0);
        trie.get_or_insert(&units("c"), 1);
        let automaton = PatternAutomaton::freeze(&trie);

        assert_eq!(scan(&automaton, "bc"), vec![(2, 1)]);
        assert_eq!(scan(&automaton, "bcd"), vec![(2, 1), (3, 0)]);
    }

    #[test]
    fn failure_links_resume_matching() {
        let mut trie = PatternTrie::new();
        trie.get_or_insert(&units("aab"), 0);
        let automaton = PatternAutomaton::freeze(&trie);

        // The second "a" run must reuse the "aa" prefix state.
        assert_eq!(scan(&automaton, "aaab"), vec![(4, 0)]);
    }

    #[test]
    fn depth_tracks_trie_path_length() {
        let mut trie = PatternTrie::new();
        trie.get_or_insert(&units("bcd"), 0);
        trie.get_or_insert(&units("c"), 1);
        let automaton = PatternAutomaton::freeze(&trie);

        let mut state = automaton.start_state();
        assert_eq!(automaton.depth(state), 0);
        for (i, unit) in "bcd".chars().enumerate() {
            state = automaton.step(state, unit);
            assert_eq!(automaton.depth(state) as usize, i + 1);
        }
    }

    #[test]
    fn no_matches_on_empty_automaton() {
        let trie = PatternTrie::new();
        let automaton = PatternAutomaton::freeze(&trie);
        assert!(scan(&automaton, "abc").is_empty());
    }
}
