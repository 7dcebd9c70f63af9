use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::time::Duration;

pub type Row = Vec<Scalar>;
pub type Grid = Vec<Row>;

pub const DEFAULT_MAX_QUERY_RESULTS: usize = 1000;
pub const MAX_QUERY_RESULTS_CEILING: usize = 10_000;
pub const DEFAULT_POINTS: u32 = 10;
pub const DEFAULT_MAX_EXECUTION_MS: u64 = 30_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub test_cases: Vec<TestCase>,
    #[serde(default = "default_max_query_results")]
    pub max_query_results: usize,
    #[serde(default = "default_points")]
    pub points: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(alias = "test_id")]
    pub id: u32,
    #[serde(alias = "test_schema")]
    pub schema: String,
    #[serde(alias = "test_data")]
    pub data: String,
    #[serde(alias = "expected_result")]
    pub expected: Grid,
    #[serde(default = "default_max_execution_ms")]
    pub max_execution_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TestCase {
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.max_execution_ms)
    }
}

fn default_max_query_results() -> usize {
    DEFAULT_MAX_QUERY_RESULTS
}

fn default_points() -> u32 {
    DEFAULT_POINTS
}

fn default_max_execution_ms() -> u64 {
    DEFAULT_MAX_EXECUTION_MS
}

/// A single cell of a result grid.
///
/// Equality and hashing are structural; `Real` compares by bit pattern so the
/// type can sit in hash sets. Compare grids only after normalization (see
/// [`crate::compare`]), where integral reals have already become `Integer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum Scalar {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Null, Scalar::Null) => true,
            (Scalar::Integer(a), Scalar::Integer(b)) => a == b,
            (Scalar::Real(a), Scalar::Real(b)) => a.to_bits() == b.to_bits(),
            (Scalar::Text(a), Scalar::Text(b)) => a == b,
            (Scalar::Blob(a), Scalar::Blob(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Scalar {}

impl Hash for Scalar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Scalar::Null => {}
            Scalar::Integer(i) => i.hash(state),
            Scalar::Real(f) => f.to_bits().hash(state),
            Scalar::Text(s) => s.hash(state),
            Scalar::Blob(b) => b.hash(state),
        }
    }
}

impl TryFrom<serde_json::Value> for Scalar {
    type Error = String;

    fn try_from(v: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;
        match v {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Integer(i64::from(b))),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Scalar::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Scalar::Real(f))
                } else {
                    Err(format!("number out of range: {}", n))
                }
            }
            Value::String(s) => Ok(Scalar::Text(s)),
            Value::Array(_) | Value::Object(_) => {
                Err("result cells must be scalars (null, bool, number or string)".into())
            }
        }
    }
}

impl From<Scalar> for serde_json::Value {
    fn from(s: Scalar) -> Self {
        match s {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Integer(i) => serde_json::json!(i),
            Scalar::Real(f) => serde_json::json!(f),
            Scalar::Text(t) => serde_json::Value::String(t),
            Scalar::Blob(b) => serde_json::Value::String(hex::encode(b)),
        }
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Null => write!(f, "NULL"),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Real(r) => write!(f, "{}", r),
            Scalar::Text(t) => write!(f, "{:?}", t),
            Scalar::Blob(b) => write!(f, "x'{}'", hex::encode(b)),
        }
    }
}

/// Which comparison rule accepted a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Exact,
    Subset,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Correct,
    Incorrect,
    Error,
    Timeout,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Correct => "correct",
            CaseStatus::Incorrect => "incorrect",
            CaseStatus::Error => "error",
            CaseStatus::Timeout => "timeout",
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, CaseStatus::Correct)
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub test_id: u32,
    pub status: CaseStatus,
    pub elapsed_ms: u64,
    pub rows_returned: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Grid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_by: Option<MatchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<crate::errors::ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub challenge_id: u32,
    pub passed: bool,
    pub passed_count: usize,
    pub total: usize,
    pub score: u32,
    pub feedback: String,
    pub results: Vec<TestCaseResult>,
    pub elapsed_ms: u64,
    pub fingerprint: String,
    pub graded_at: chrono::DateTime<chrono::Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_from_json() {
        let grid: Grid = serde_json::from_str(r#"[[1, 2.5, "a", null, true]]"#).unwrap();
        assert_eq!(
            grid[0],
            vec![
                Scalar::Integer(1),
                Scalar::Real(2.5),
                Scalar::Text("a".into()),
                Scalar::Null,
                Scalar::Integer(1),
            ]
        );
    }

    #[test]
    fn test_nested_cells_rejected() {
        let res: Result<Grid, _> = serde_json::from_str(r#"[[[1]]]"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_blob_serializes_as_hex() {
        let v = serde_json::to_value(Scalar::Blob(vec![0xde, 0xad])).unwrap();
        assert_eq!(v, serde_json::json!("dead"));
    }

    #[test]
    fn test_test_case_accepts_legacy_field_names() {
        let tc: TestCase = serde_json::from_str(
            r#"{
                "test_id": 7,
                "test_schema": "CREATE TABLE t(x INT);",
                "test_data": "INSERT INTO t VALUES (1);",
                "expected_result": [[1]]
            }"#,
        )
        .unwrap();
        assert_eq!(tc.id, 7);
        assert_eq!(tc.max_execution_ms, DEFAULT_MAX_EXECUTION_MS);
        assert_eq!(tc.expected, vec![vec![Scalar::Integer(1)]]);
    }
}
