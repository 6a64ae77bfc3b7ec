//! Phonological normalization of Hangul text.
//!
//! Typo patterns are matched over a decomposed representation where each
//! syllable block is split into an onset+vowel (LV) block plus a separate
//! coda jamo, so that rules can address the coda of one syllable and the
//! onset of the next independently. Compatibility vowels (ㅏ..ㅣ) and
//! leading consonants (ᄀ..ᄒ) pass through unchanged and only occur in
//! rule patterns, never in decomposed running text.

use smol_str::SmolStr;

/// First composed syllable block (가).
pub const SYLLABLE_BASE: u32 = 0xAC00;
/// Last composed syllable block (힣).
pub const SYLLABLE_LAST: u32 = 0xD7A3;
/// First leading consonant jamo (ᄀ).
pub const ONSET_BASE: u32 = 0x1100;
/// First compatibility vowel jamo (ㅏ).
pub const VOWEL_BASE: u32 = 0x314F;
/// One less than the first trailing consonant jamo; coda indices are 1-based.
pub const CODA_BASE: u32 = 0x11A7;

/// Number of leading consonants in the syllable block arithmetic.
pub const ONSET_COUNT: u32 = 19;
/// Number of vowels in the syllable block arithmetic.
pub const VOWEL_COUNT: u32 = 21;
/// Number of trailing consonant slots, including the empty one.
pub const CODA_COUNT: u32 = 28;

/// Is `c` a leading consonant jamo (ᄀ..ᄒ)?
#[inline(always)]
pub fn is_onset(c: char) -> bool {
    (ONSET_BASE..ONSET_BASE + ONSET_COUNT).contains(&(c as u32))
}

/// Is `c` a compatibility vowel jamo (ㅏ..ㅣ)?
#[inline(always)]
pub fn is_vowel(c: char) -> bool {
    (VOWEL_BASE..VOWEL_BASE + VOWEL_COUNT).contains(&(c as u32))
}

/// Is `c` a trailing consonant jamo (ᆨ..ᇂ)?
#[inline(always)]
pub fn is_coda(c: char) -> bool {
    (CODA_BASE + 1..CODA_BASE + CODA_COUNT).contains(&(c as u32))
}

/// Is `c` a composed syllable block (가..힣)?
#[inline(always)]
pub fn is_syllable(c: char) -> bool {
    (SYLLABLE_BASE..=SYLLABLE_LAST).contains(&(c as u32))
}

/// Composes an open (coda-free) syllable block from onset and vowel table
/// indices. Out-of-range indices are a programmer error.
#[inline(always)]
pub fn join_onset_vowel(onset: u32, vowel: u32) -> char {
    debug_assert!(onset < ONSET_COUNT);
    debug_assert!(vowel < VOWEL_COUNT);
    // Safe by the assertions above: the result stays inside the block range.
    char::from_u32(SYLLABLE_BASE + (onset * VOWEL_COUNT + vowel) * CODA_COUNT).unwrap()
}

/// Decomposes text into matching units: every syllable block becomes an LV
/// block plus a trailing coda jamo when one is present. All other
/// characters are passed through unchanged.
pub fn decompose(text: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(text.len());

    for c in text.chars() {
        if !is_syllable(c) {
            out.push(c);
            continue;
        }

        let index = c as u32 - SYLLABLE_BASE;
        let coda = index % CODA_COUNT;
        out.push(char::from_u32(c as u32 - coda).unwrap());
        if coda != 0 {
            out.push(char::from_u32(CODA_BASE + coda).unwrap());
        }
    }

    out
}

/// Recomposes a decomposed unit sequence: a coda jamo directly following an
/// open LV block merges back into a full LVT block. Everything else is
/// emitted as-is.
pub fn compose(units: &[char]) -> SmolStr {
    let mut out = String::with_capacity(units.len() * 3);

    for &c in units {
        if is_coda(c) {
            if let Some(prev) = out.chars().next_back() {
                if is_syllable(prev) && (prev as u32 - SYLLABLE_BASE) % CODA_COUNT == 0 {
                    out.pop();
                    out.push(char::from_u32(prev as u32 + (c as u32 - CODA_BASE)).unwrap());
                    continue;
                }
            }
        }
        out.push(c);
    }

    SmolStr::from(out)
}
