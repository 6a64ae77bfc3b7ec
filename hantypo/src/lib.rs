/*! Typo-tolerant candidate generation for Korean text.

Compiles a table of linguistically motivated typo rules into a pattern
automaton over phonologically decomposed syllable units, then enumerates
cost-tagged rewrites of an input string for a downstream lattice search.

Rule compilation is a two-phase affair: a mutable [`TypoTransformer`]
accepts rules, and [`TypoTransformer::compile`] freezes it into an
immutable [`PreparedTypoTransformer`] that is safe to share across
threads and query repeatedly.

# Usage example

```
use hantypo::transformer::TypoTransformer;

let mut typos = TypoTransformer::new();
typos.add_rule(&["안"], &["않"], 1.5, Default::default()).unwrap();
let prepared = typos.compile();

let candidates: Vec<_> = prepared.generate("안 돼", 2.0).iter().collect();
assert_eq!(candidates[0].value(), "안 돼");
assert_eq!(candidates[1].value(), "않 돼");
```

[`TypoTransformer`]: transformer::TypoTransformer
[`TypoTransformer::compile`]: transformer::TypoTransformer::compile
[`PreparedTypoTransformer`]: transformer::PreparedTypoTransformer

*/

#![warn(missing_docs)]

pub mod automaton;
pub mod hangul;
pub mod transformer;

pub(crate) mod types;
