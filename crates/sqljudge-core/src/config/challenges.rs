use crate::errors::ConfigError;
use crate::model::{Challenge, MAX_QUERY_RESULTS_CEILING};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChallengeFile {
    #[serde(default)]
    pub challenges: Vec<Challenge>,
}

/// Loads a challenge file. `.yaml`/`.yml` is read as YAML, anything else as
/// JSON. Every challenge is checked before the file is accepted.
pub fn load_challenges(path: &Path) -> Result<Vec<Challenge>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ConfigError(format!("failed to read challenges {}: {}", path.display(), e))
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let file: ChallengeFile = if is_yaml {
        serde_yaml::from_str(&raw)
            .map_err(|e| ConfigError(format!("failed to parse challenges YAML: {}", e)))?
    } else {
        serde_json::from_str(&raw)
            .map_err(|e| ConfigError(format!("failed to parse challenges JSON: {}", e)))?
    };

    let mut seen = HashSet::new();
    for ch in &file.challenges {
        if !seen.insert(ch.id) {
            return Err(ConfigError(format!("duplicate challenge id {}", ch.id)));
        }
        validate_challenge(ch)?;
    }

    tracing::debug!(
        event = "config.challenges_loaded",
        file = %path.display(),
        count = file.challenges.len()
    );
    Ok(file.challenges)
}

pub fn find_challenge(challenges: &[Challenge], id: u32) -> Result<&Challenge, ConfigError> {
    challenges
        .iter()
        .find(|c| c.id == id)
        .ok_or_else(|| ConfigError(format!("challenge {} not found", id)))
}

pub fn validate_challenge(ch: &Challenge) -> Result<(), ConfigError> {
    let err = |msg: String| ConfigError(format!("challenge {}: {}", ch.id, msg));

    if ch.title.trim().is_empty() {
        return Err(err("title cannot be empty".into()));
    }
    if ch.description.trim().is_empty() {
        return Err(err("description cannot be empty".into()));
    }
    if ch.test_cases.is_empty() {
        return Err(err("must have at least one test case".into()));
    }
    if ch.max_query_results == 0 || ch.max_query_results > MAX_QUERY_RESULTS_CEILING {
        return Err(err(format!(
            "max_query_results must be between 1 and {}",
            MAX_QUERY_RESULTS_CEILING
        )));
    }
    if ch.points == 0 {
        return Err(err("points must be positive".into()));
    }

    let mut ids = HashSet::new();
    for (i, tc) in ch.test_cases.iter().enumerate() {
        let pos = i + 1;
        if !ids.insert(tc.id) {
            return Err(err(format!("test case {} reuses id {}", pos, tc.id)));
        }
        if tc.schema.trim().is_empty() {
            return Err(err(format!("test case {}: schema cannot be empty", pos)));
        }
        if tc.data.trim().is_empty() {
            return Err(err(format!("test case {}: data cannot be empty", pos)));
        }
        if tc.max_execution_ms == 0 {
            return Err(err(format!(
                "test case {}: max_execution_ms must be positive",
                pos
            )));
        }
    }
    Ok(())
}

pub fn write_sample_challenges(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(
        path,
        r#"{
  "challenges": [
    {
      "id": 1,
      "title": "Adult users",
      "description": "List the names of users aged 18 or over.",
      "difficulty": "easy",
      "category": "filtering",
      "points": 10,
      "max_query_results": 1000,
      "test_cases": [
        {
          "id": 1,
          "description": "mixed ages",
          "schema": "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, age INTEGER);",
          "data": "INSERT INTO users VALUES (1, 'Alice', 30), (2, 'Bob', 15), (3, 'Cara', 18);",
          "expected": [["Alice"], ["Cara"]],
          "max_execution_ms": 2000
        },
        {
          "id": 2,
          "description": "nobody qualifies",
          "schema": "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, age INTEGER);",
          "data": "INSERT INTO users VALUES (1, 'Dan', 12);",
          "expected": [],
          "max_execution_ms": 2000
        }
      ]
    }
  ]
}
"#,
    )
    .map_err(|e| ConfigError(format!("failed to write sample challenges: {}", e)))?;
    Ok(())
}
