use crate::compare::ComparisonPolicy;
use crate::errors::ConfigError;
use crate::validate::policy::ValidatorPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Knobs the calling layer passes to the grader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GradeOptions {
    /// Global row cap. The effective cap is the smaller of this and the
    /// challenge's own `max_query_results`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
    /// Replaces every test case's own time budget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub comparison: ComparisonPolicy,
    #[serde(default = "default_parallel")]
    pub parallel: usize,
    #[serde(default)]
    pub validator: ValidatorPolicy,
}

impl Default for GradeOptions {
    fn default() -> Self {
        Self {
            max_rows: None,
            timeout_ms: None,
            comparison: ComparisonPolicy::default(),
            parallel: default_parallel(),
            validator: ValidatorPolicy::default(),
        }
    }
}

fn default_parallel() -> usize {
    1
}

impl GradeOptions {
    pub fn budget_override(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn effective_max_rows(&self, challenge_cap: usize) -> usize {
        match self.max_rows {
            Some(global) => global.min(challenge_cap),
            None => challenge_cap,
        }
    }

    /// Overlays `SQLJUDGE_*` environment variables. Unparseable values are
    /// ignored with a warning.
    pub fn apply_env(mut self) -> Self {
        if let Some(n) = env_parse::<usize>("SQLJUDGE_MAX_ROWS") {
            self.max_rows = Some(n);
        }
        if let Some(n) = env_parse::<u64>("SQLJUDGE_TIMEOUT_MS") {
            self.timeout_ms = Some(n);
        }
        if let Some(n) = env_parse::<usize>("SQLJUDGE_PARALLEL") {
            self.parallel = n;
        }
        if let Ok(v) = std::env::var("SQLJUDGE_COMPARISON") {
            match ComparisonPolicy::parse(&v) {
                Some(p) => self.comparison = p,
                None => tracing::warn!(
                    event = "config.env_ignored",
                    var = "SQLJUDGE_COMPARISON",
                    value = %v
                ),
            }
        }
        self
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_rows == Some(0) {
            return Err(ConfigError("max_rows must be positive".into()));
        }
        if self.timeout_ms == Some(0) {
            return Err(ConfigError("timeout_ms must be positive".into()));
        }
        if self.parallel == 0 {
            return Err(ConfigError("parallel must be at least 1".into()));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(event = "config.env_ignored", var = key, value = %raw);
            None
        }
    }
}

/// Reads options from YAML. Unknown keys fail in strict mode and are logged
/// otherwise.
pub fn load_options(path: &Path, strict: bool) -> Result<GradeOptions, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read options {}: {}", path.display(), e)))?;

    let mut ignored_keys = Vec::new();
    let deserializer = serde_yaml::Deserializer::from_str(&raw);
    let opts: GradeOptions = serde_ignored::deserialize(deserializer, |p| {
        ignored_keys.push(p.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse options YAML: {}", e)))?;

    if !ignored_keys.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "unknown option fields: {:?} (file: {})",
                ignored_keys,
                path.display()
            )));
        }
        tracing::warn!(
            event = "config.unknown_fields",
            fields = ?ignored_keys,
            file = %path.display()
        );
    }

    opts.check()?;
    Ok(opts)
}
