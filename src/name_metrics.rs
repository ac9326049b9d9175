// ✍️ Name Metrics - Expression, Soul Urge and Personality numbers
// All three are pure functions of the input string, case-insensitive.

use crate::reducer::reduce;
use crate::table::{clean_name, is_vowel, CHALDEAN};
use serde::{Deserialize, Serialize};

/// Name-derived indices, each a single digit or a master value (0 for empty input)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameMetrics {
    pub expression_number: u32,
    pub soul_urge_number: u32,
    pub personality_number: u32,
}

impl NameMetrics {
    pub fn from_name(name: &str) -> Self {
        NameMetrics {
            expression_number: expression_number(name),
            soul_urge_number: soul_urge_number(name),
            personality_number: personality_number(name),
        }
    }
}

/// Sum table values of the cleaned name for characters accepted by `keep`
fn letter_total<F>(name: &str, keep: F) -> u32
where
    F: Fn(char) -> bool,
{
    clean_name(name)
        .chars()
        .filter(|c| keep(*c))
        .map(|c| CHALDEAN.value_of(c))
        .fold(0u32, |acc, v| acc.saturating_add(v))
}

/// Every letter of the name (spaces contribute 0)
pub fn expression_number(name: &str) -> u32 {
    reduce(letter_total(name, |_| true), true)
}

/// Vowels only: A, E, I, O, U
pub fn soul_urge_number(name: &str) -> u32 {
    reduce(letter_total(name, is_vowel), true)
}

/// Consonants that have a table entry
pub fn personality_number(name: &str) -> u32 {
    reduce(
        letter_total(name, |c| !is_vowel(c) && CHALDEAN.has_entry(c)),
        true,
    )
}

// ============================================================================
// TESTS
// ============================================================================
