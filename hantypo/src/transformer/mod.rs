//! Typo rule compilation.
//!
//! A [`TypoTransformer`] accepts human-authored typo rules and expands them
//! into the concrete jamo-level patterns the matching automaton needs:
//! onset-final and vowel-initial rules are instantiated across the full
//! onset/vowel tables, and applosive-conditioned rules are instantiated
//! once per tense coda. [`TypoTransformer::compile`] freezes the result
//! into a [`PreparedTypoTransformer`] for querying.

use itertools::iproduct;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

use crate::automaton::{PatternAutomaton, PatternTrie};
use crate::hangul;
use crate::types::{Cost, PatternIndex};

pub mod candidates;

pub use candidates::{TypoCandidate, TypoCandidates, TypoIterator};

/// Sentinel unit standing in for a morpheme boundary.
///
/// Applosive-conditioned rules register their no-coda copy behind this
/// sentinel; a caller that wants such rewrites at the start of a span
/// includes the sentinel at the boundary position in its query.
pub const BOUNDARY: char = '\u{0}';

/// Tense codas that condition applosive rules, in coda-table order.
const APPLOSIVE_CODAS: [char; 13] = [
    '\u{11A8}', '\u{11A9}', '\u{11AA}', '\u{11AE}', '\u{11B8}', '\u{11B9}', '\u{11BA}',
    '\u{11BB}', '\u{11BD}', '\u{11BE}', '\u{11BF}', '\u{11C0}', '\u{11C1}',
];

/// Constraint on the unit immediately preceding a rewrite span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeftContext {
    /// No constraint.
    #[default]
    None,
    /// The preceding unit must be an open (coda-free) syllable.
    Vowel,
    /// The preceding unit must be an applosive coda; instantiated copies
    /// carry the coda literally and downgrade to [`LeftContext::None`].
    Applosive,
}

/// Error raised while authoring a typo rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleError {
    /// Origin and error disagree on whether the pattern ends in a bare onset.
    #[error("`origin` and `error` must both end in an onset, or neither: {origin:?} vs {error:?}")]
    OnsetMismatch {
        /// Offending origin pattern.
        origin: SmolStr,
        /// Offending error pattern.
        error: SmolStr,
    },
    /// Origin and error disagree on whether the pattern starts with a vowel.
    #[error("`origin` and `error` must both start with a vowel, or neither: {origin:?} vs {error:?}")]
    VowelMismatch {
        /// Offending origin pattern.
        origin: SmolStr,
        /// Offending error pattern.
        error: SmolStr,
    },
    /// An origin or error pattern was empty.
    #[error("typo rule patterns must not be empty")]
    EmptyPattern,
    /// A cost scale factor was not a positive finite number.
    #[error("cost scale factor must be a positive finite number, got {0}")]
    InvalidScale(f32),
}

/// One authored typo rule: a Cartesian relation between an origin set and
/// an error set at a fixed cost, optionally gated on left context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypoRule {
    /// Correctly spelled forms.
    pub origins: Vec<SmolStr>,
    /// Misspelled forms each origin may be rewritten to.
    pub errors: Vec<SmolStr>,
    /// Edit cost of one application; `f32::INFINITY` forbids the rewrite.
    pub cost: Cost,
    /// Constraint on the unit preceding the rewrite.
    pub condition: LeftContext,
}

#[derive(Debug, Clone)]
pub(crate) struct Replacement {
    pub(crate) begin: u32,
    pub(crate) end: u32,
    pub(crate) cost: Cost,
    pub(crate) condition: LeftContext,
}

#[derive(Debug, Clone)]
struct ReplacementGroup {
    options: Vec<Replacement>,
    pattern_len: u32,
}

/// Mutable typo rule compiler.
///
/// Collects rules into a pattern trie and a shared replacement pool. Not
/// safe for concurrent mutation; compile once at startup and share the
/// resulting [`PreparedTypoTransformer`] instead.
#[derive(Debug, Clone, Default)]
pub struct TypoTransformer {
    trie: PatternTrie,
    groups: Vec<ReplacementGroup>,
    pool: Vec<char>,
    continual_typo_cost: Option<Cost>,
}

impl TypoTransformer {
    /// Creates a transformer with no rules.
    pub fn new() -> TypoTransformer {
        TypoTransformer::default()
    }

    /// The empty rule set: every query yields exactly its input at cost 0.
    pub fn without_typo() -> TypoTransformer {
        TypoTransformer::new()
    }

    /// The built-in linguistic confusion set.
    pub fn basic() -> TypoTransformer {
        let mut transformer = TypoTransformer::new();
        for &(origins, errors, cost, condition) in BASIC_RULES {
            transformer
                .add_rule(origins, errors, cost, condition)
                .expect("built-in typo rule table is well-formed");
        }
        transformer
    }

    /// Continual-typing errors only: no rewrite rules, but a continual typo
    /// cost for the surrounding analyzer to apply.
    pub fn continual() -> TypoTransformer {
        let mut transformer = TypoTransformer::new();
        transformer.set_continual_typo_cost(1.0);
        transformer
    }

    /// The basic confusion set combined with continual-typing errors.
    pub fn basic_with_continual() -> TypoTransformer {
        let mut transformer = TypoTransformer::basic();
        transformer.set_continual_typo_cost(1.0);
        transformer
    }

    /// Builds a transformer from authored rules.
    pub fn from_rules<'a, I>(rules: I) -> Result<TypoTransformer, RuleError>
    where
        I: IntoIterator<Item = &'a TypoRule>,
    {
        let mut transformer = TypoTransformer::new();
        for rule in rules {
            transformer.add_rule(&rule.origins, &rule.errors, rule.cost, rule.condition)?;
        }
        Ok(transformer)
    }

    /// True when no rule has inserted any pattern.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Adds one rule: every origin may be rewritten to every error
    /// (self-pairs are skipped) at `cost` under `condition`.
    pub fn add_rule<S: AsRef<str>>(
        &mut self,
        origins: &[S],
        errors: &[S],
        cost: Cost,
        condition: LeftContext,
    ) -> Result<(), RuleError> {
        for (origin, error) in iproduct!(origins, errors) {
            let (origin, error) = (origin.as_ref(), error.as_ref());
            if origin == error {
                continue;
            }
            self.add_typo(
                hangul::decompose(origin),
                hangul::decompose(error),
                cost,
                condition,
            )?;
        }
        Ok(())
    }

    /// Multiplies every stored cost (continual typo cost included).
    pub fn scale_cost(&mut self, factor: f32) -> Result<(), RuleError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(RuleError::InvalidScale(factor));
        }
        for group in &mut self.groups {
            for option in &mut group.options {
                option.cost *= factor;
            }
        }
        if let Some(cost) = self.continual_typo_cost.as_mut() {
            *cost *= factor;
        }
        Ok(())
    }

    /// Sets the continual-typing cost carried to the prepared transformer.
    pub fn set_continual_typo_cost(&mut self, cost: Cost) {
        self.continual_typo_cost = Some(cost);
    }

    /// The continual-typing cost, if one is set.
    pub fn continual_typo_cost(&self) -> Option<Cost> {
        self.continual_typo_cost
    }

    fn add_typo(
        &mut self,
        origin: Vec<char>,
        error: Vec<char>,
        cost: Cost,
        condition: LeftContext,
    ) -> Result<(), RuleError> {
        let (&origin_first, &origin_last) = match (origin.first(), origin.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(RuleError::EmptyPattern),
        };
        let (&error_first, &error_last) = match (error.first(), error.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(RuleError::EmptyPattern),
        };
        if origin == error {
            return Ok(());
        }

        if hangul::is_onset(origin_last) != hangul::is_onset(error_last) {
            return Err(RuleError::OnsetMismatch {
                origin: hangul::compose(&origin),
                error: hangul::compose(&error),
            });
        }
        if hangul::is_vowel(origin_first) != hangul::is_vowel(error_first) {
            return Err(RuleError::VowelMismatch {
                origin: hangul::compose(&origin),
                error: hangul::compose(&error),
            });
        }

        if hangul::is_onset(origin_last) {
            // A trailing bare onset stands for every syllable it can start.
            for vowel in 0..hangul::VOWEL_COUNT {
                let mut origin = origin.clone();
                let mut error = error.clone();
                *origin.last_mut().unwrap() =
                    hangul::join_onset_vowel(origin_last as u32 - hangul::ONSET_BASE, vowel);
                *error.last_mut().unwrap() =
                    hangul::join_onset_vowel(error_last as u32 - hangul::ONSET_BASE, vowel);
                self.add_typo_with_context(origin, error, cost, condition);
            }
        } else if hangul::is_vowel(origin_first) {
            // A leading bare vowel stands for every syllable containing it.
            for onset in 0..hangul::ONSET_COUNT {
                let mut origin = origin.clone();
                let mut error = error.clone();
                origin[0] =
                    hangul::join_onset_vowel(onset, origin_first as u32 - hangul::VOWEL_BASE);
                error[0] = hangul::join_onset_vowel(onset, error_first as u32 - hangul::VOWEL_BASE);
                self.add_typo_with_context(origin, error, cost, condition);
            }
        } else {
            self.add_typo_with_context(origin, error, cost, condition);
        }

        Ok(())
    }

    fn add_typo_with_context(
        &mut self,
        origin: Vec<char>,
        error: Vec<char>,
        cost: Cost,
        condition: LeftContext,
    ) {
        match condition {
            LeftContext::None | LeftContext::Vowel => self.insert(origin, error, cost, condition),
            LeftContext::Applosive => {
                for &coda in APPLOSIVE_CODAS.iter() {
                    let mut pattern = Vec::with_capacity(origin.len() + 1);
                    pattern.push(coda);
                    pattern.extend_from_slice(&origin);
                    let mut replacement = Vec::with_capacity(error.len() + 1);
                    replacement.push(coda);
                    replacement.extend_from_slice(&error);
                    // The conditioning coda is literal in this copy.
                    self.insert(pattern, replacement, cost, LeftContext::None);
                }
                let mut pattern = Vec::with_capacity(origin.len() + 1);
                pattern.push(BOUNDARY);
                pattern.extend_from_slice(&origin);
                self.insert(pattern, error, cost, LeftContext::Applosive);
            }
        }
    }

    fn insert(&mut self, pattern: Vec<char>, replacement: Vec<char>, cost: Cost, condition: LeftContext) {
        if pattern == replacement {
            return;
        }

        let group = self
            .trie
            .get_or_insert(&pattern, self.groups.len() as PatternIndex);
        if group as usize == self.groups.len() {
            self.groups.push(ReplacementGroup {
                options: Vec::new(),
                pattern_len: pattern.len() as u32,
            });
        }

        let (groups, pool) = (&mut self.groups, &mut self.pool);
        let options = &mut groups[group as usize].options;
        let existing = options.iter_mut().find(|option| {
            option.condition == condition
                && pool[option.begin as usize..option.end as usize] == replacement[..]
        });

        match existing {
            Some(option) => option.cost = option.cost.min(cost),
            None => {
                let begin = pool.len() as u32;
                pool.extend_from_slice(&replacement);
                options.push(Replacement {
                    begin,
                    end: pool.len() as u32,
                    cost,
                    condition,
                });
            }
        }
    }

    /// Freezes the rule set into an immutable, shareable form.
    pub fn compile(self) -> PreparedTypoTransformer {
        let automaton = PatternAutomaton::freeze(&self.trie);

        let total: usize = self.groups.iter().map(|g| g.options.len()).sum();
        let mut patterns = Vec::with_capacity(self.groups.len());
        let mut replacements = Vec::with_capacity(total);

        for group in &self.groups {
            // Sentinel-prefixed applosive entries match one unit more than
            // the span they rewrite; compensate here so span bookkeeping
            // during matching stays correct.
            let prefixed = matches!(
                group.options.first().map(|o| o.condition),
                Some(LeftContext::Applosive)
            );
            let length = group.pattern_len - if prefixed { 1 } else { 0 };

            patterns.push(PatternInfo {
                first: replacements.len() as u32,
                count: group.options.len() as u32,
                length,
            });
            replacements.extend(group.options.iter().cloned());
        }

        log::debug!(
            "compiled {} patterns with {} replacement options",
            patterns.len(),
            replacements.len()
        );

        PreparedTypoTransformer {
            automaton,
            patterns,
            replacements,
            pool: self.pool,
            continual_typo_cost: self.continual_typo_cost,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PatternInfo {
    pub(crate) first: u32,
    pub(crate) count: u32,
    pub(crate) length: u32,
}

/// Frozen typo transformer.
///
/// Immutable after compilation and safe to share across query threads; each
/// query allocates its own [`TypoCandidates`].
#[derive(Debug, Clone)]
pub struct PreparedTypoTransformer {
    pub(crate) automaton: PatternAutomaton,
    pub(crate) patterns: Vec<PatternInfo>,
    pub(crate) replacements: Vec<Replacement>,
    pub(crate) pool: Vec<char>,
    continual_typo_cost: Option<Cost>,
}

impl PreparedTypoTransformer {
    /// The continual-typing cost carried over from the rule set, if any.
    pub fn continual_typo_cost(&self) -> Option<Cost> {
        self.continual_typo_cost
    }
}

type RuleDef = (
    &'static [&'static str],
    &'static [&'static str],
    f32,
    LeftContext,
);

#[rustfmt::skip]
static BASIC_RULES: &[RuleDef] = &[
    (&["ㅐ", "ㅔ"], &["ㅐ", "ㅔ"], 1.0, LeftContext::None),
    (&["ㅐ", "ㅔ"], &["ㅒ", "ㅖ"], 1.5, LeftContext::None),
    (&["ㅒ", "ㅖ"], &["ㅐ", "ㅔ"], 1.5, LeftContext::None),
    (&["ㅒ", "ㅖ"], &["ㅒ", "ㅖ"], 1.0, LeftContext::None),
    (&["ㅚ", "ㅙ", "ㅞ"], &["ㅚ", "ㅙ", "ㅞ", "ㅐ", "ㅔ"], 1.0, LeftContext::None),
    (&["ㅝ"], &["ㅗ", "ㅓ"], 1.0, LeftContext::None),
    (&["ㅟ"], &["ㅣ"], 1.0, LeftContext::None),
    (&["ㅢ"], &["ㅣ"], 1.0, LeftContext::None),
    // Excludes overcorrection of 이 toward 위/의.
    (&["이"], &["위", "의"], f32::INFINITY, LeftContext::None),
    (&["자", "쟈"], &["자", "쟈"], 1.0, LeftContext::None),
    (&["재", "쟤"], &["재", "쟤"], 1.0, LeftContext::None),
    (&["저", "져"], &["저", "져"], 1.0, LeftContext::None),
    (&["제", "졔"], &["제", "졔"], 1.0, LeftContext::None),
    (&["조", "죠", "줘"], &["조", "죠", "줘"], 1.0, LeftContext::None),
    (&["주", "쥬"], &["주", "쥬"], 1.0, LeftContext::None),
    (&["차", "챠"], &["차", "챠"], 1.0, LeftContext::None),
    (&["채", "챼"], &["채", "챼"], 1.0, LeftContext::None),
    (&["처", "쳐"], &["처", "쳐"], 1.0, LeftContext::None),
    (&["체", "쳬"], &["체", "쳬"], 1.0, LeftContext::None),
    (&["초", "쵸", "춰"], &["초", "쵸", "춰"], 1.0, LeftContext::None),
    (&["추", "츄"], &["추", "츄"], 1.0, LeftContext::None),
    (&["유", "류"], &["유", "류"], 1.0, LeftContext::None),
    (&["므", "무"], &["므", "무"], 1.0, LeftContext::None),
    (&["브", "부"], &["브", "부"], 1.0, LeftContext::None),
    (&["프", "푸"], &["프", "푸"], 1.0, LeftContext::None),
    (&["르", "루"], &["르", "루"], 1.0, LeftContext::None),
    (&["러", "뤄"], &["러", "뤄"], 1.0, LeftContext::None),
    (&["\u{11A9}", "\u{11AA}"], &["\u{11A8}", "\u{11A9}", "\u{11AA}"], 1.5, LeftContext::None),
    (&["\u{11AC}", "\u{11AD}"], &["\u{11AB}", "\u{11AC}", "\u{11AD}"], 1.5, LeftContext::None),
    (&["\u{11B0}", "\u{11B1}", "\u{11B2}", "\u{11B3}", "\u{11B4}", "\u{11B5}", "\u{11B6}"],
     &["\u{11AF}", "\u{11B0}", "\u{11B1}", "\u{11B2}", "\u{11B3}", "\u{11B4}", "\u{11B5}", "\u{11B6}"],
     1.5, LeftContext::None),
    (&["\u{11BA}", "\u{11BB}"], &["\u{11BA}", "\u{11BB}"], 1.0, LeftContext::None),
    (&["안"], &["않"], 1.5, LeftContext::None),
    (&["맞추", "맞히"], &["맞추", "맞히"], 1.5, LeftContext::None),
    (&["맞춰", "맞혀"], &["맞춰", "맞혀"], 1.5, LeftContext::None),
    (&["받치", "바치", "받히"], &["받치", "바치", "받히"], 1.5, LeftContext::None),
    (&["받쳐", "바쳐", "받혀"], &["받쳐", "바쳐", "받혀"], 1.5, LeftContext::None),
    (&["던", "든"], &["던", "든"], 1.0, LeftContext::None),
    (&["때", "데"], &["때", "데"], 1.5, LeftContext::None),
    (&["빛", "빚"], &["빛", "빚"], 1.0, LeftContext::None),
    (&["\u{11AE}이", "지"], &["\u{11AE}이", "지"], 1.0, LeftContext::None),
    (&["\u{11AE}여", "져"], &["\u{11AE}여", "져"], 1.0, LeftContext::None),
    (&["\u{11C0}이", "치"], &["\u{11C0}이", "치"], 1.0, LeftContext::None),
    (&["\u{11C0}여", "쳐"], &["\u{11C0}여", "쳐"], 1.0, LeftContext::None),
    (&["\u{1100}", "\u{1101}"], &["\u{1100}", "\u{1101}"], 1.0, LeftContext::Applosive),
    (&["\u{1103}", "\u{1104}"], &["\u{1103}", "\u{1104}"], 1.0, LeftContext::Applosive),
    (&["\u{1107}", "\u{1108}"], &["\u{1107}", "\u{1108}"], 1.0, LeftContext::Applosive),
    (&["\u{1109}", "\u{110A}"], &["\u{1109}", "\u{110A}"], 1.0, LeftContext::Applosive),
    (&["\u{110C}", "\u{110D}"], &["\u{110C}", "\u{110D}"], 1.0, LeftContext::Applosive),
    (&["\u{11C2}\u{1112}", "\u{11A8}\u{1112}", "\u{11C2}\u{1100}"],
     &["\u{11C2}\u{1112}", "\u{11A8}\u{1112}", "\u{11C2}\u{1100}"], 1.0, LeftContext::None),
    (&["\u{11A8}\u{1102}", "\u{11A9}\u{1102}", "\u{11AA}\u{1102}", "\u{11BF}\u{1102}", "\u{11BC}\u{1102}"],
     &["\u{11A8}\u{1102}", "\u{11A9}\u{1102}", "\u{11AA}\u{1102}", "\u{11BF}\u{1102}", "\u{11BC}\u{1102}"],
     1.0, LeftContext::None),
    (&["\u{11A8}\u{1106}", "\u{11A9}\u{1106}", "\u{11AA}\u{1106}", "\u{11BF}\u{1106}", "\u{11BC}\u{1106}"],
     &["\u{11A8}\u{1106}", "\u{11A9}\u{1106}", "\u{11AA}\u{1106}", "\u{11BF}\u{1106}", "\u{11BC}\u{1106}"],
     1.0, LeftContext::None),
    (&["\u{11A8}\u{1105}", "\u{11A9}\u{1105}", "\u{11AA}\u{1105}", "\u{11BF}\u{1105}", "\u{11BC}\u{1105}", "\u{11BC}\u{1102}"],
     &["\u{11A8}\u{1105}", "\u{11A9}\u{1105}", "\u{11AA}\u{1105}", "\u{11BF}\u{1105}", "\u{11BC}\u{1105}", "\u{11BC}\u{1102}"],
     1.0, LeftContext::None),
    (&["\u{11AE}\u{1102}", "\u{11BA}\u{1102}", "\u{11BB}\u{1102}", "\u{11BD}\u{1102}", "\u{11BE}\u{1102}", "\u{11C0}\u{1102}", "\u{11AB}\u{1102}"],
     &["\u{11AE}\u{1102}", "\u{11BA}\u{1102}", "\u{11BB}\u{1102}", "\u{11BD}\u{1102}", "\u{11BE}\u{1102}", "\u{11C0}\u{1102}", "\u{11AB}\u{1102}"],
     1.0, LeftContext::None),
    (&["\u{11AE}\u{1106}", "\u{11BA}\u{1106}", "\u{11BB}\u{1106}", "\u{11BD}\u{1106}", "\u{11BE}\u{1106}", "\u{11C0}\u{1106}", "\u{11AB}\u{1106}"],
     &["\u{11AE}\u{1106}", "\u{11BA}\u{1106}", "\u{11BB}\u{1106}", "\u{11BD}\u{1106}", "\u{11BE}\u{1106}", "\u{11C0}\u{1106}", "\u{11AB}\u{1106}"],
     1.0, LeftContext::None),
    (&["\u{11AE}\u{1105}", "\u{11BA}\u{1105}", "\u{11BB}\u{1105}", "\u{11BD}\u{1105}", "\u{11BE}\u{1105}", "\u{11C0}\u{1105}", "\u{11AB}\u{1105}", "\u{11AB}\u{1102}"],
     &["\u{11AE}\u{1105}", "\u{11BA}\u{1105}", "\u{11BB}\u{1105}", "\u{11BD}\u{1105}", "\u{11BE}\u{1105}", "\u{11C0}\u{1105}", "\u{11AB}\u{1105}", "\u{11AB}\u{1102}"],
     1.0, LeftContext::None),
    (&["\u{11B8}\u{1102}", "\u{11B9}\u{1102}", "\u{11C1}\u{1102}", "\u{11B7}\u{1102}"],
     &["\u{11B8}\u{1102}", "\u{11B9}\u{1102}", "\u{11C1}\u{1102}", "\u{11B7}\u{1102}"],
     1.0, LeftContext::None),
    (&["\u{11B8}\u{1106}", "\u{11B9}\u{1106}", "\u{11C1}\u{1106}", "\u{11B7}\u{1106}"],
     &["\u{11B8}\u{1106}", "\u{11B9}\u{1106}", "\u{11C1}\u{1106}", "\u{11B7}\u{1106}"],
     1.0, LeftContext::None),
    (&["\u{11B8}\u{1105}", "\u{11B9}\u{1105}", "\u{11C1}\u{1105}", "\u{11B7}\u{1105}", "\u{11B7}\u{1102}"],
     &["\u{11B8}\u{1105}", "\u{11B9}\u{1105}", "\u{11C1}\u{1105}", "\u{11B7}\u{1105}", "\u{11B7}\u{1102}"],
     1.0, LeftContext::None),
    (&["\u{11AB}\u{1105}", "\u{11AB}\u{1102}", "\u{11AF}\u{1105}", "\u{11AF}\u{1102}"],
     &["\u{11AB}\u{1105}", "\u{11AB}\u{1102}", "\u{11AF}\u{1105}", "\u{11AF}\u{1102}"],
     1.0, LeftContext::None),
    (&["\u{11A8}\u{110B}", "\u{1100}"], &["\u{11A8}\u{110B}", "\u{1100}"], 1.0, LeftContext::Vowel),
    (&["\u{11A9}\u{110B}", "\u{1101}"], &["\u{11A9}\u{110B}", "\u{1101}"], 1.0, LeftContext::Vowel),
    (&["\u{11AB}\u{110B}", "\u{11AB}\u{1112}", "\u{1102}"],
     &["\u{11AB}\u{110B}", "\u{11AB}\u{1112}", "\u{1102}"], 1.0, LeftContext::Vowel),
    (&["\u{11AC}\u{110B}", "\u{11AB}\u{110C}"], &["\u{11AC}\u{110B}", "\u{11AB}\u{110C}"], 1.0, LeftContext::Vowel),
    (&["\u{11AD}\u{110B}", "\u{1102}"], &["\u{11AD}\u{110B}", "\u{1102}"], 1.0, LeftContext::Vowel),
    (&["\u{11AE}\u{110B}", "\u{1103}"], &["\u{11AE}\u{110B}", "\u{1103}"], 1.0, LeftContext::Vowel),
    (&["\u{11AF}\u{110B}", "\u{11AF}\u{1112}", "\u{1105}"],
     &["\u{11AF}\u{110B}", "\u{11AF}\u{1112}", "\u{1105}"], 1.0, LeftContext::Vowel),
    (&["\u{11B0}\u{110B}", "\u{11AF}\u{1100}"], &["\u{11B0}\u{110B}", "\u{11AF}\u{1100}"], 1.0, LeftContext::Vowel),
    (&["\u{11B0}\u{1112}", "\u{11AF}\u{110F}"], &["\u{11B0}\u{1112}", "\u{11AF}\u{110F}"], 1.0, LeftContext::Vowel),
    (&["\u{11B7}\u{110B}", "\u{1106}"], &["\u{11B7}\u{110B}", "\u{1106}"], 1.0, LeftContext::Vowel),
    (&["\u{11B8}\u{110B}", "\u{1107}"], &["\u{11B8}\u{110B}", "\u{1107}"], 1.0, LeftContext::Vowel),
    (&["\u{11BA}\u{110B}", "\u{1109}"], &["\u{11BA}\u{110B}", "\u{1109}"], 1.0, LeftContext::Vowel),
    (&["\u{11BB}\u{110B}", "\u{11BA}\u{1109}", "\u{110A}"],
     &["\u{11BB}\u{110B}", "\u{11BA}\u{1109}", "\u{110A}"], 1.0, LeftContext::Vowel),
    (&["\u{11BD}\u{110B}", "\u{110C}"], &["\u{11BD}\u{110B}", "\u{110C}"], 1.0, LeftContext::Vowel),
    (&["\u{11BE}\u{110B}", "\u{11BE}\u{1112}", "\u{11BD}\u{1112}", "\u{110E}"],
     &["\u{11BE}\u{110B}", "\u{11BE}\u{1112}", "\u{11BD}\u{1112}", "\u{110E}"], 1.0, LeftContext::Vowel),
    (&["\u{11BF}\u{110B}", "\u{11BF}\u{1112}", "\u{11A8}\u{1112}", "\u{110F}"],
     &["\u{11BF}\u{110B}", "\u{11BF}\u{1112}", "\u{11A8}\u{1112}", "\u{110F}"], 1.0, LeftContext::Vowel),
    (&["\u{11C0}\u{110B}", "\u{11C0}\u{1112}", "\u{11AE}\u{1112}", "\u{1110}"],
     &["\u{11C0}\u{110B}", "\u{11C0}\u{1112}", "\u{11AE}\u{1112}", "\u{1110}"], 1.0, LeftContext::Vowel),
    (&["\u{11C1}\u{110B}", "\u{11C1}\u{1112}", "\u{11B8}\u{1112}", "\u{1111}"],
     &["\u{11C1}\u{110B}", "\u{11C1}\u{1112}", "\u{11B8}\u{1112}", "\u{1111}"], 1.0, LeftContext::Vowel),
    (&["은", "는"], &["은", "는"], 2.0, LeftContext::None),
    (&["을", "를"], &["을", "를"], 2.0, LeftContext::None),
    (&["ㅣ워", "ㅣ어", "ㅕ"], &["ㅣ워", "ㅣ어", "ㅕ"], 1.5, LeftContext::None),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn values(prepared: &PreparedTypoTransformer, input: &str, threshold: f32) -> Vec<(String, f32)> {
        prepared
            .generate(input, threshold)
            .iter()
            .map(|c| (c.value().to_string(), c.cost()))
            .collect()
    }

    #[test]
    fn self_pairs_are_skipped() {
        let mut typos = TypoTransformer::new();
        typos
            .add_rule(&["이"], &["이"], 1.0, LeftContext::None)
            .unwrap();
        assert!(typos.is_empty());
    }

    #[test]
    fn structural_mismatch_is_rejected() {
        let mut typos = TypoTransformer::new();
        assert!(matches!(
            typos.add_rule(&["\u{1100}"], &["가"], 1.0, LeftContext::None),
            Err(RuleError::OnsetMismatch { .. })
        ));
        assert!(matches!(
            typos.add_rule(&["ㅐ"], &["가"], 1.0, LeftContext::None),
            Err(RuleError::VowelMismatch { .. })
        ));
        assert!(matches!(
            typos.add_rule(&[""], &["가"], 1.0, LeftContext::None),
            Err(RuleError::EmptyPattern)
        ));
    }

    #[test]
    fn vowel_rule_expands_across_onsets() {
        let mut typos = TypoTransformer::new();
        typos
            .add_rule(&["ㅐ"], &["ㅔ"], 1.0, LeftContext::None)
            .unwrap();
        let prepared = typos.compile();

        assert!(values(&prepared, "개", 1.0).contains(&("게".to_string(), 1.0)));
        assert!(values(&prepared, "태", 1.0).contains(&("테".to_string(), 1.0)));
    }

    #[test]
    fn onset_rule_expands_across_vowels_and_codas() {
        let mut typos = TypoTransformer::new();
        typos
            .add_rule(&["\u{1100}"], &["\u{1101}"], 1.0, LeftContext::Applosive)
            .unwrap();
        let prepared = typos.compile();

        // Instantiated with a literal coda context: 학고 -> 학꼬.
        assert!(values(&prepared, "학고", 2.0).contains(&("학꼬".to_string(), 1.0)));
        // No coda: only reachable behind the boundary sentinel.
        assert_eq!(values(&prepared, "가구", 2.0).len(), 1);
        let boundary = format!("{}가구", BOUNDARY);
        let found = prepared.generate(&boundary, 2.0);
        let sentinel: Vec<_> = found.iter().collect();
        assert!(sentinel
            .iter()
            .any(|c| c.value() == format!("{}까구", BOUNDARY).as_str()
                && c.left_context() == LeftContext::Applosive));
    }

    #[test]
    fn duplicate_entries_keep_minimum_cost() {
        let mut typos = TypoTransformer::new();
        typos
            .add_rule(&["아"], &["어"], 1.5, LeftContext::None)
            .unwrap();
        typos
            .add_rule(&["아"], &["어"], 0.5, LeftContext::None)
            .unwrap();
        let prepared = typos.compile();
        assert!(values(&prepared, "아", 2.0).contains(&("어".to_string(), 0.5)));
    }

    #[test]
    fn finite_cost_wins_over_infinite() {
        let mut typos = TypoTransformer::new();
        typos
            .add_rule(&["아"], &["어"], f32::INFINITY, LeftContext::None)
            .unwrap();
        typos
            .add_rule(&["아"], &["어"], 1.0, LeftContext::None)
            .unwrap();
        let prepared = typos.compile();
        assert!(values(&prepared, "아", 2.0).contains(&("어".to_string(), 1.0)));
    }

    #[test]
    fn scale_cost_multiplies_all_costs() {
        let mut typos = TypoTransformer::new();
        typos
            .add_rule(&["안"], &["않"], 1.5, LeftContext::None)
            .unwrap();
        typos.set_continual_typo_cost(1.0);
        typos.scale_cost(2.0).unwrap();
        assert_eq!(typos.continual_typo_cost(), Some(2.0));

        let prepared = typos.compile();
        assert!(values(&prepared, "안", 4.0).contains(&("않".to_string(), 3.0)));

        let mut bad = TypoTransformer::new();
        assert!(matches!(bad.scale_cost(0.0), Err(RuleError::InvalidScale(_))));
        assert!(matches!(
            bad.scale_cost(f32::NAN),
            Err(RuleError::InvalidScale(_))
        ));
    }

    #[test]
    fn basic_set_excludes_overcorrection() {
        let prepared = TypoTransformer::basic().compile();

        // 이 must never be rewritten toward 위/의: those entries carry an
        // infinite cost.
        for (value, _) in values(&prepared, "이", 5.0) {
            assert_ne!(value, "위");
            assert_ne!(value, "의");
        }

        // The forward rewrites toward 이 stay available.
        assert!(values(&prepared, "의", 5.0).contains(&("이".to_string(), 1.0)));
        assert!(values(&prepared, "위", 5.0).contains(&("이".to_string(), 1.0)));
    }

    #[test]
    fn preset_surfaces() {
        assert!(TypoTransformer::without_typo().is_empty());
        assert!(!TypoTransformer::basic().is_empty());
        assert_eq!(TypoTransformer::continual().continual_typo_cost(), Some(1.0));
        let combined = TypoTransformer::basic_with_continual();
        assert!(!combined.is_empty());
        assert_eq!(combined.compile().continual_typo_cost(), Some(1.0));
    }

    #[test]
    fn from_rules_builds_the_same_patterns() {
        let rules = vec![TypoRule {
            origins: vec!["안".into()],
            errors: vec!["않".into()],
            cost: 1.5,
            condition: LeftContext::None,
        }];
        let prepared = TypoTransformer::from_rules(&rules).unwrap().compile();
        assert!(values(&prepared, "안", 2.0).contains(&("않".to_string(), 1.5)));
    }
}
