//! Order-independent, type-tolerant result comparison.
//!
//! Both grids are normalized the same way before comparing:
//! - `NULL` stays a distinct value
//! - a real with no fractional part becomes an integer (`1.0` == `1`)
//! - text is trimmed
//!
//! Row order is never significant.

use crate::model::{Grid, MatchMode, Row, Scalar};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Order in which comparison modes are tried when grading.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonPolicy {
    #[default]
    ExactThenSubset,
    ExactOnly,
}

impl ComparisonPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exact_then_subset" => Some(ComparisonPolicy::ExactThenSubset),
            "exact_only" | "exact" => Some(ComparisonPolicy::ExactOnly),
            _ => None,
        }
    }

    fn modes(&self) -> &'static [MatchMode] {
        match self {
            ComparisonPolicy::ExactThenSubset => &[MatchMode::Exact, MatchMode::Subset],
            ComparisonPolicy::ExactOnly => &[MatchMode::Exact],
        }
    }

    /// Returns the first mode that accepts `actual`, if any.
    pub fn accept(&self, actual: &Grid, expected: &Grid) -> Option<MatchMode> {
        self.modes()
            .iter()
            .copied()
            .find(|mode| compare(actual, expected, *mode))
    }
}

pub fn normalize_scalar(value: &Scalar) -> Scalar {
    match value {
        Scalar::Real(f) if is_integral(*f) => Scalar::Integer(*f as i64),
        Scalar::Text(s) => Scalar::Text(s.trim().to_string()),
        other => other.clone(),
    }
}

pub fn normalize_row(row: &Row) -> Row {
    row.iter().map(normalize_scalar).collect()
}

pub fn normalize_grid(grid: &Grid) -> Grid {
    grid.iter().map(normalize_row).collect()
}

// Outside i64 range the cast would saturate and conflate distinct values.
fn is_integral(f: f64) -> bool {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63
    f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f)
}

pub fn compare(actual: &Grid, expected: &Grid, mode: MatchMode) -> bool {
    match (actual.is_empty(), expected.is_empty()) {
        (true, true) => return true,
        (true, false) | (false, true) => return false,
        _ => {}
    }

    let actual_set = row_set(actual);
    let expected_set = row_set(expected);

    match mode {
        // Row counts are compared before collapsing duplicates; the set
        // comparison then ignores multiplicity.
        MatchMode::Exact => actual.len() == expected.len() && actual_set == expected_set,
        MatchMode::Subset => expected_set.is_subset(&actual_set),
    }
}

fn row_set(grid: &Grid) -> HashSet<Row> {
    grid.iter().map(normalize_row).collect()
}
