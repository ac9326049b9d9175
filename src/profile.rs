// 👤 Profiles - locally computed numbers + the remote client profile
//
// NumericProfile is a value: recompute and replace, never patch in place.
// ClientProfile is what the remote service returns; annotation fields it adds
// (astrological, phonetic, ...) are carried through untouched.

use crate::date_metrics::{birth_day_number, life_path_number};
use crate::grid::{build_grid, Grid};
use crate::name_metrics::NameMetrics;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// NUMERIC PROFILE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericProfile {
    pub name: String,
    pub birth_date: String,
    pub expression_number: u32,
    pub soul_urge_number: u32,
    pub personality_number: u32,
    pub life_path_number: u32,
    pub birth_day_number: u32,

    /// Birth-date digits with the expression number folded in
    pub grid: Grid,
}

impl NumericProfile {
    pub fn compute(name: &str, birth_date: &str) -> Self {
        let names = NameMetrics::from_name(name);

        NumericProfile {
            name: name.to_string(),
            birth_date: birth_date.to_string(),
            expression_number: names.expression_number,
            soul_urge_number: names.soul_urge_number,
            personality_number: names.personality_number,
            life_path_number: life_path_number(birth_date),
            birth_day_number: birth_day_number(birth_date),
            grid: build_grid(birth_date, Some(names.expression_number)),
        }
    }

    /// Same birth date, different name
    pub fn with_name(&self, name: &str) -> Self {
        NumericProfile::compute(name, &self.birth_date)
    }

    pub fn name_metrics(&self) -> NameMetrics {
        NameMetrics {
            expression_number: self.expression_number,
            soul_urge_number: self.soul_urge_number,
            personality_number: self.personality_number,
        }
    }
}

// ============================================================================
// CLIENT PROFILE (remote shape)
// ============================================================================

/// Profile as exchanged with the remote service.
///
/// Only `full_name` and `birth_date` are read by this crate. Everything else
/// the service sends lands in `annotations` and is sent back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientProfile {
    pub full_name: String,
    pub birth_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_place: Option<String>,

    /// Opaque passthrough payload
    #[serde(flatten)]
    pub annotations: HashMap<String, serde_json::Value>,
}

impl ClientProfile {
    pub fn new(full_name: &str, birth_date: &str) -> Self {
        ClientProfile {
            full_name: full_name.to_string(),
            birth_date: birth_date.to_string(),
            birth_time: None,
            birth_place: None,
            annotations: HashMap::new(),
        }
    }

    /// Local quick numbers for the profile's own name
    pub fn numbers(&self) -> NumericProfile {
        NumericProfile::compute(&self.full_name, &self.birth_date)
    }

    /// Local quick numbers for a candidate name on this birth date
    pub fn numbers_for(&self, name: &str) -> NumericProfile {
        NumericProfile::compute(name, &self.birth_date)
    }
}

// ============================================================================
// TESTS
// ============================================================================
