// 📅 Date Metrics - Life Path and Birth Day numbers
// Input is a year-month-day string ("1990-05-15"). Any parse failure yields 0.

use crate::reducer::reduce;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateMetrics {
    pub life_path_number: u32,
    pub birth_day_number: u32,
}

impl DateMetrics {
    pub fn from_date(date: &str) -> Self {
        DateMetrics {
            life_path_number: life_path_number(date),
            birth_day_number: birth_day_number(date),
        }
    }
}

/// Digits of the string, in order, non-digits skipped
pub fn date_digits(date: &str) -> impl Iterator<Item = u32> + '_ {
    date.chars().filter_map(|c| c.to_digit(10))
}

/// Day-of-month component: leading digits of the third `-` field
fn day_component(date: &str) -> Option<u32> {
    let field = date.split('-').nth(2)?.trim_start();
    let digits: String = field.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Reduced day of month; 0 when the day is missing or outside 1..=31
pub fn birth_day_number(date: &str) -> u32 {
    match day_component(date) {
        Some(day) if (1..=31).contains(&day) => reduce(day, true),
        _ => 0,
    }
}

/// Raw sum of every digit in the date string
pub fn date_digit_total(date: &str) -> u32 {
    date_digits(date).fold(0u32, |acc, d| acc.saturating_add(d))
}

/// Reduced sum of every digit in the date string
pub fn life_path_number(date: &str) -> u32 {
    reduce(date_digit_total(date), true)
}

/// Strict calendar parse. The numbers above never depend on this; callers use it
/// to flag dates such as "2023-02-30" that still produce metrics.
pub fn parse_birth_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}

// ============================================================================
// TESTS
// ============================================================================
