//! Static screening of submissions before anything touches a database.
//!
//! Two independent checks run on every submission:
//! 1. After stripping comments, every `;`-separated statement must start with
//!    an allowed keyword.
//! 2. Neither the raw submission text (comments included) nor its
//!    comment-stripped form, both upper-cased, may match any denylist rule.

pub mod policy;

use crate::errors::{ConfigError, Rejection};
use policy::{DenyCategory, ValidatorPolicy};
use regex::Regex;
use std::sync::OnceLock;

struct CompiledRule {
    name: String,
    category: DenyCategory,
    re: Regex,
}

pub struct Validator {
    allowed_keywords: Vec<String>,
    rules: Vec<CompiledRule>,
    comments: Regex,
}

impl Validator {
    pub fn new(policy: &ValidatorPolicy) -> Result<Self, ConfigError> {
        let allowed_keywords: Vec<String> = policy
            .allowed_keywords
            .iter()
            .map(|k| k.trim().to_uppercase())
            .filter(|k| !k.is_empty())
            .collect();
        if allowed_keywords.is_empty() {
            return Err(ConfigError("validator policy allows no statement keywords".into()));
        }

        let mut rules = Vec::with_capacity(policy.denylist.len());
        for rule in &policy.denylist {
            let re = Regex::new(&rule.pattern).map_err(|e| {
                ConfigError(format!("invalid denylist pattern '{}': {}", rule.name, e))
            })?;
            rules.push(CompiledRule {
                name: rule.name.clone(),
                category: rule.category,
                re,
            });
        }

        Ok(Self {
            allowed_keywords,
            rules,
            comments: comment_regex().clone(),
        })
    }

    /// Validator for the built-in policy.
    pub fn builtin() -> &'static Validator {
        static BUILTIN: OnceLock<Validator> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            Validator::new(&ValidatorPolicy::default())
                .expect("built-in validator policy must compile")
        })
    }

    pub fn allowed_keywords(&self) -> &[String] {
        &self.allowed_keywords
    }

    pub fn validate(&self, query: &str) -> Result<(), Rejection> {
        if query.trim().is_empty() {
            return Err(Rejection::Empty);
        }

        let cleaned = self.strip_comments(query);
        let statements = split_statements(&cleaned);
        if statements.is_empty() {
            return Err(Rejection::Empty);
        }
        for stmt in &statements {
            let upper = stmt.to_uppercase();
            if !self
                .allowed_keywords
                .iter()
                .any(|kw| starts_with_keyword(&upper, kw))
            {
                tracing::debug!(event = "validate.rejected", reason = "statement_class");
                return Err(Rejection::DisallowedStatement {
                    allowed: self.allowed_keywords.clone(),
                });
            }
        }

        // Both forms are scanned: the raw text catches keywords hidden in
        // comments, the stripped text catches statements glued on with one.
        let raw = query.to_uppercase();
        let stripped = cleaned.to_uppercase();
        if let Some(rule) = self
            .rules
            .iter()
            .find(|r| r.re.is_match(&raw) || r.re.is_match(&stripped))
        {
            tracing::debug!(event = "validate.rejected", reason = "denylist", rule = %rule.name);
            return Err(Rejection::DeniedPattern {
                rule: rule.name.clone(),
                category: rule.category.as_str().to_string(),
            });
        }

        Ok(())
    }

    fn strip_comments(&self, sql: &str) -> String {
        self.comments.replace_all(sql, " ").trim().to_string()
    }
}

/// Validates against the built-in policy.
pub fn validate(query: &str) -> Result<(), Rejection> {
    Validator::builtin().validate(query)
}

/// Removes `-- line` and `/* block */` comments. Leftmost match wins, so a
/// `--` inside a block comment does not eat the rest of the line.
pub fn strip_comments(sql: &str) -> String {
    comment_regex().replace_all(sql, " ").trim().to_string()
}

pub fn split_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)--[^\n]*|/\*.*?\*/").expect("comment regex"))
}

fn starts_with_keyword(stmt: &str, kw: &str) -> bool {
    match stmt.strip_prefix(kw) {
        Some(rest) => rest
            .chars()
            .next()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_')),
        None => false,
    }
}
