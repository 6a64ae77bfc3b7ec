//! Candidate generation and lazy enumeration.
//!
//! A query against a [`PreparedTypoTransformer`] produces a
//! [`TypoCandidates`] value: a compact branch encoding of every rewrite
//! combination, enumerated lazily by [`TypoIterator`] so that combinations
//! over the cost threshold never materialize a string.

use std::cmp::Ordering;

use serde::Serialize;
use smol_str::SmolStr;

use crate::hangul;
use crate::transformer::{LeftContext, PreparedTypoTransformer};
use crate::types::{Cost, PatternIndex};

/// One generated rewrite of a query string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypoCandidate {
    value: SmolStr,
    cost: Cost,
    left_context: LeftContext,
}

impl TypoCandidate {
    /// The rewritten text, recomposed into full syllable blocks.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Sum of the costs of every applied rewrite.
    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// Context requirement of the rewrite applied at the very start of the
    /// text, for the caller to check against the preceding unit.
    pub fn left_context(&self) -> LeftContext {
        self.left_context
    }
}

impl Eq for TypoCandidate {}

impl PartialOrd for TypoCandidate {
    fn partial_cmp(&self, other: &TypoCandidate) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypoCandidate {
    fn cmp(&self, other: &TypoCandidate) -> Ordering {
        self.cost
            .partial_cmp(&other.cost)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.value.cmp(&other.value))
    }
}

/// Compact encoding of every rewrite combination for one query.
///
/// The input is cut into alternating literal runs and branch regions. Each
/// branch region stores the untouched text plus one span per applicable
/// rewrite; a full candidate is one choice per branch. Spans live in a
/// shared character pool and are only assembled into strings during
/// iteration.
#[derive(Debug, Clone)]
pub struct TypoCandidates {
    pool: Vec<char>,
    // Span i covers pool[spans[i]..spans[i + 1]].
    spans: Vec<u32>,
    // Branch i owns spans [branches[i], branches[i + 1]): first the literal
    // run before the branch region, then one span per option. The span at
    // branches.last() is the trailing literal run.
    branches: Vec<u32>,
    // One entry per option span, in span order.
    costs: Vec<Cost>,
    conditions: Vec<LeftContext>,
    threshold: Cost,
}

impl TypoCandidates {
    pub(crate) fn new(threshold: Cost) -> TypoCandidates {
        TypoCandidates {
            pool: Vec::new(),
            spans: vec![0],
            branches: vec![0],
            costs: Vec::new(),
            conditions: Vec::new(),
            threshold,
        }
    }

    pub(crate) fn push_literal(&mut self, units: &[char]) {
        self.pool.extend_from_slice(units);
        self.spans.push(self.pool.len() as u32);
    }

    pub(crate) fn push_option_single(&mut self, units: &[char], cost: Cost, condition: LeftContext) {
        self.pool.extend_from_slice(units);
        self.spans.push(self.pool.len() as u32);
        self.costs.push(cost);
        self.conditions.push(condition);
    }

    pub(crate) fn push_option(
        &mut self,
        head: &[char],
        body: &[char],
        tail: &[char],
        cost: Cost,
        condition: LeftContext,
    ) {
        self.pool.extend_from_slice(head);
        self.pool.extend_from_slice(body);
        self.pool.extend_from_slice(tail);
        self.spans.push(self.pool.len() as u32);
        self.costs.push(cost);
        self.conditions.push(condition);
    }

    pub(crate) fn finish_branch(&mut self) {
        self.branches.push(self.spans.len() as u32 - 1);
    }

    fn span(&self, index: usize) -> &[char] {
        &self.pool[self.spans[index] as usize..self.spans[index + 1] as usize]
    }

    fn option_count(&self, branch: usize) -> u32 {
        self.branches[branch + 1] - self.branches[branch] - 1
    }

    /// Number of branch regions found in the query.
    pub fn branch_count(&self) -> usize {
        self.branches.len() - 1
    }

    /// The cost threshold candidates are enumerated under.
    pub fn threshold(&self) -> Cost {
        self.threshold
    }

    /// Lazily enumerates every combination within the threshold.
    pub fn iter(&self) -> TypoIterator<'_> {
        TypoIterator::new(self)
    }
}

impl<'a> IntoIterator for &'a TypoCandidates {
    type Item = TypoCandidate;
    type IntoIter = TypoIterator<'a>;

    fn into_iter(self) -> TypoIterator<'a> {
        self.iter()
    }
}

/// Mixed-radix enumerator over a [`TypoCandidates`] encoding.
///
/// One digit per branch, least significant first, so cheap combinations
/// that only perturb early branches come out before expensive ones.
/// Combinations whose summed cost exceeds the threshold are skipped
/// without being assembled.
pub struct TypoIterator<'a> {
    cands: &'a TypoCandidates,
    digits: Vec<u32>,
    finished: bool,
}

impl<'a> TypoIterator<'a> {
    fn new(cands: &'a TypoCandidates) -> TypoIterator<'a> {
        let mut iter = TypoIterator {
            cands,
            digits: vec![0; cands.branches.len().max(2) - 1],
            finished: false,
        };
        while !iter.is_valid() {
            if iter.advance_digits() {
                iter.finished = true;
                break;
            }
        }
        iter
    }

    fn is_valid(&self) -> bool {
        if self.cands.branches.len() <= 1 {
            return true;
        }
        let mut cost = 0.0;
        for (i, &digit) in self.digits.iter().enumerate() {
            let s = self.cands.branches[i] as usize + digit as usize;
            cost += self.cands.costs[s - i];
        }
        cost <= self.cands.threshold
    }

    // Odometer step; returns true when the digits are exhausted.
    fn advance_digits(&mut self) -> bool {
        if self.cands.branches.len() <= 1 {
            self.digits[0] += 1;
            return true;
        }
        let last_count = self.cands.option_count(self.cands.branch_count() - 1);
        if *self.digits.last().unwrap() >= last_count {
            return true;
        }

        self.digits[0] += 1;
        for i in 0..self.digits.len() - 1 {
            if self.digits[i] < self.cands.option_count(i) {
                break;
            }
            self.digits[i] = 0;
            self.digits[i + 1] += 1;
        }
        *self.digits.last().unwrap() >= last_count
    }

    fn current(&self) -> TypoCandidate {
        let cands = self.cands;
        let mut units = Vec::with_capacity(cands.pool.len());
        let mut cost = 0.0;
        let mut left_context = LeftContext::None;

        if cands.branches.len() > 1 {
            for (i, &digit) in self.digits.iter().enumerate() {
                let literal = cands.branches[i] as usize;
                units.extend_from_slice(cands.span(literal));

                let s = literal + digit as usize;
                cost += cands.costs[s - i];
                if i == 0 {
                    left_context = cands.conditions[s - i];
                }
                units.extend_from_slice(cands.span(s + 1));
            }
        }
        units.extend_from_slice(cands.span(*cands.branches.last().unwrap() as usize));

        TypoCandidate {
            value: hangul::compose(&units),
            cost,
            left_context,
        }
    }
}

impl Iterator for TypoIterator<'_> {
    type Item = TypoCandidate;

    fn next(&mut self) -> Option<TypoCandidate> {
        if self.finished {
            return None;
        }
        let item = self.current();
        loop {
            if self.advance_digits() {
                self.finished = true;
                break;
            }
            if self.is_valid() {
                break;
            }
        }
        Some(item)
    }
}

impl PreparedTypoTransformer {
    /// Builds the rewrite candidates of `text` under `threshold`.
    ///
    /// The input is decomposed, scanned once for every rule pattern, and
    /// cut into branch regions of overlapping or touching matches. The
    /// untouched text is always the first candidate, at cost 0.
    pub fn generate(&self, text: &str, threshold: Cost) -> TypoCandidates {
        self.generate_units(&hangul::decompose(text), threshold)
    }

    /// [`generate`](Self::generate) over an already-decomposed unit
    /// sequence, as produced by [`hangul::decompose`].
    pub fn generate_units(&self, units: &[char], threshold: Cost) -> TypoCandidates {
        let mut out = TypoCandidates::new(threshold);
        let mut matches: Vec<(usize, PatternIndex)> = Vec::new();
        let mut last = 0;

        let mut state = self.automaton.start_state();
        for (i, &unit) in units.iter().enumerate() {
            state = self.automaton.step(state, unit);
            let value = match self.automaton.value(state) {
                Some(value) => value,
                None => continue,
            };

            let end = i + 1;
            let mut span = self.automaton.depth(state) as usize;
            let first = &self.replacements[self.patterns[value as usize].first as usize];
            if first.condition == LeftContext::Applosive {
                span -= 1;
            }

            // A gap between the previous match and this one closes the
            // current branch region; touching matches share one region.
            if matches.last().map_or(false, |&(prev_end, _)| prev_end < end - span) {
                self.flush_branch(&mut out, units, &mut matches, &mut last);
            }
            matches.extend(self.automaton.matches(state).map(|pattern| (end, pattern)));
        }
        if !matches.is_empty() {
            self.flush_branch(&mut out, units, &mut matches, &mut last);
        }
        out.push_literal(&units[last..]);

        log::trace!(
            "{} branch regions over {} units",
            out.branch_count(),
            units.len()
        );
        out
    }

    fn flush_branch(
        &self,
        out: &mut TypoCandidates,
        units: &[char],
        matches: &mut Vec<(usize, PatternIndex)>,
        last: &mut usize,
    ) {
        let tot_end = matches.last().map(|&(end, _)| end).unwrap();
        let tot_start = matches
            .iter()
            .map(|&(end, pattern)| end - self.patterns[pattern as usize].length as usize)
            .min()
            .unwrap()
            .max(*last);

        out.push_literal(&units[*last..tot_start]);
        out.push_option_single(&units[tot_start..tot_end], 0.0, LeftContext::None);

        for &(end, pattern) in matches.iter() {
            let info = &self.patterns[pattern as usize];
            let start = end - info.length as usize;
            if start < tot_start {
                continue;
            }
            for option in &self.replacements[info.first as usize..(info.first + info.count) as usize] {
                if option.condition == LeftContext::Vowel
                    && (start == 0 || !hangul::is_syllable(units[start - 1]))
                {
                    continue;
                }
                out.push_option(
                    &units[tot_start..start],
                    &self.pool[option.begin as usize..option.end as usize],
                    &units[end..tot_end],
                    option.cost,
                    option.condition,
                );
            }
        }

        out.finish_branch();
        *last = tot_end;
        matches.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::TypoTransformer;

    fn two_rule_set() -> PreparedTypoTransformer {
        let mut typos = TypoTransformer::new();
        typos
            .add_rule(&["안"], &["않"], 1.5, LeftContext::None)
            .unwrap();
        typos
            .add_rule(&["돼"], &["되"], 1.0, LeftContext::None)
            .unwrap();
        typos.compile()
    }

    fn collect(prepared: &PreparedTypoTransformer, input: &str, threshold: f32) -> Vec<(String, f32)> {
        prepared
            .generate(input, threshold)
            .iter()
            .map(|c| (c.value().to_string(), c.cost()))
            .collect()
    }

    #[test]
    fn empty_rule_set_yields_exactly_the_input() {
        let prepared = TypoTransformer::without_typo().compile();
        let found = collect(&prepared, "안녕 btw", 2.0);
        assert_eq!(found, vec![("안녕 btw".to_string(), 0.0)]);
    }

    #[test]
    fn untouched_text_comes_first_at_cost_zero() {
        let mut typos = TypoTransformer::new();
        typos
            .add_rule(&["안"], &["않"], 1.5, LeftContext::None)
            .unwrap();
        let prepared = typos.compile();

        let found = collect(&prepared, "안 돼", 2.0);
        assert_eq!(
            found,
            vec![("안 돼".to_string(), 0.0), ("않 돼".to_string(), 1.5)]
        );
    }

    #[test]
    fn enumeration_perturbs_early_branches_first() {
        let prepared = two_rule_set();
        let found = collect(&prepared, "안 돼", 10.0);
        assert_eq!(
            found,
            vec![
                ("안 돼".to_string(), 0.0),
                ("않 돼".to_string(), 1.5),
                ("안 되".to_string(), 1.0),
                ("않 되".to_string(), 2.5),
            ]
        );
        assert_eq!(prepared.generate("안 돼", 10.0).branch_count(), 2);
    }

    #[test]
    fn threshold_skips_expensive_combinations() {
        let prepared = two_rule_set();
        let found = collect(&prepared, "안 돼", 2.0);
        assert_eq!(
            found,
            vec![
                ("안 돼".to_string(), 0.0),
                ("않 돼".to_string(), 1.5),
                ("안 되".to_string(), 1.0),
            ]
        );
    }

    #[test]
    fn tighter_threshold_yields_a_subset() {
        let prepared = two_rule_set();
        let loose = collect(&prepared, "안 돼", 2.0);
        let tight = collect(&prepared, "안 돼", 1.2);
        assert!(!tight.is_empty());
        for item in &tight {
            assert!(loose.contains(item));
        }
    }

    #[test]
    fn infinite_cost_is_never_within_threshold() {
        let mut typos = TypoTransformer::new();
        typos
            .add_rule(&["아"], &["어"], f32::INFINITY, LeftContext::None)
            .unwrap();
        let prepared = typos.compile();
        assert_eq!(collect(&prepared, "아", 1e9), vec![("아".to_string(), 0.0)]);
    }

    #[test]
    fn vowel_condition_requires_preceding_open_syllable() {
        let mut typos = TypoTransformer::new();
        typos
            .add_rule(&["\u{11B8}\u{110B}"], &["\u{1107}"], 1.0, LeftContext::Vowel)
            .unwrap();
        let prepared = typos.compile();

        let candidates: Vec<_> = prepared.generate("잡아", 2.0).iter().collect();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].value(), "자바");
        assert_eq!(candidates[1].cost(), 1.0);
        assert_eq!(candidates[1].left_context(), LeftContext::Vowel);

        // At the start of the text there is no preceding syllable.
        assert_eq!(
            collect(&prepared, "\u{11B8}아", 2.0),
            vec![("\u{11B8}아".to_string(), 0.0)]
        );

        // A non-syllable unit before the match fails the gate too.
        assert_eq!(
            collect(&prepared, "x\u{11B8}아", 2.0),
            vec![("x\u{11B8}아".to_string(), 0.0)]
        );
    }

    #[test]
    fn touching_matches_share_one_branch() {
        let mut typos = TypoTransformer::new();
        typos
            .add_rule(&["아"], &["어"], 1.0, LeftContext::None)
            .unwrap();
        typos
            .add_rule(&["누"], &["루"], 1.0, LeftContext::None)
            .unwrap();
        let prepared = typos.compile();

        // 아 and 누 touch, so only one rewrite of the pair can apply per
        // candidate.
        let cands = prepared.generate("아누", 10.0);
        assert_eq!(cands.branch_count(), 1);
        let mut found = collect(&prepared, "아누", 10.0);
        found.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(
            found,
            vec![
                ("아누".to_string(), 0.0),
                ("아루".to_string(), 1.0),
                ("어누".to_string(), 1.0),
            ]
        );
    }

    #[test]
    fn candidates_order_by_cost_then_value() {
        let prepared = two_rule_set();
        let mut candidates: Vec<_> = prepared.generate("안 돼", 10.0).iter().collect();
        candidates.sort();
        let costs: Vec<f32> = candidates.iter().map(|c| c.cost()).collect();
        assert_eq!(costs, vec![0.0, 1.0, 1.5, 2.5]);
    }

    #[test]
    fn threshold_is_recorded() {
        let prepared = TypoTransformer::without_typo().compile();
        assert_eq!(prepared.generate("아", 3.5).threshold(), 3.5);
    }
}
