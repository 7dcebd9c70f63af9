use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DenyCategory {
    Mutation,
    Admin,
    FileAccess,
    Smuggling,
}

impl DenyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyCategory::Mutation => "data mutation",
            DenyCategory::Admin => "administrative command",
            DenyCategory::FileAccess => "file access",
            DenyCategory::Smuggling => "multiple statements",
        }
    }
}

/// One denylist entry. Patterns run against the upper-cased submission, so
/// they are written in upper case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DenyRule {
    pub name: String,
    pub category: DenyCategory,
    pub pattern: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidatorPolicy {
    #[serde(default = "default_allowed_keywords")]
    pub allowed_keywords: Vec<String>,
    #[serde(default = "default_denylist")]
    pub denylist: Vec<DenyRule>,
}

impl Default for ValidatorPolicy {
    fn default() -> Self {
        Self {
            allowed_keywords: default_allowed_keywords(),
            denylist: default_denylist(),
        }
    }
}

const BUILTIN_DENYLIST: &[(&str, DenyCategory, &str)] = &[
    ("insert", DenyCategory::Mutation, r"\bINSERT\b"),
    ("update", DenyCategory::Mutation, r"\bUPDATE\b"),
    ("delete", DenyCategory::Mutation, r"\bDELETE\b"),
    ("drop", DenyCategory::Mutation, r"\bDROP\b"),
    ("alter", DenyCategory::Mutation, r"\bALTER\b"),
    ("create", DenyCategory::Mutation, r"\bCREATE\b"),
    ("truncate", DenyCategory::Mutation, r"\bTRUNCATE\b"),
    ("replace_into", DenyCategory::Mutation, r"\bREPLACE\s+INTO\b"),
    ("exec", DenyCategory::Admin, r"\bEXEC\b"),
    ("execute", DenyCategory::Admin, r"\bEXECUTE\b"),
    ("extended_procedure", DenyCategory::Admin, r"\b(?:XP|SP)_\w+"),
    ("attach", DenyCategory::Admin, r"\bATTACH\b"),
    ("detach", DenyCategory::Admin, r"\bDETACH\b"),
    ("pragma", DenyCategory::Admin, r"\bPRAGMA\b"),
    ("vacuum", DenyCategory::Admin, r"\bVACUUM\b"),
    ("into_outfile", DenyCategory::FileAccess, r"\bINTO\s+(?:OUTFILE|DUMPFILE)\b"),
    ("load_file", DenyCategory::FileAccess, r"\bLOAD_FILE\b"),
    ("load_extension", DenyCategory::FileAccess, r"\bLOAD_EXTENSION\b"),
    ("readfile", DenyCategory::FileAccess, r"\bREADFILE\b"),
    ("writefile", DenyCategory::FileAccess, r"\bWRITEFILE\b"),
    ("stacked_statement", DenyCategory::Smuggling, r";\s*\w+"),
];

pub fn default_allowed_keywords() -> Vec<String> {
    vec!["SELECT".to_string()]
}

pub fn default_denylist() -> Vec<DenyRule> {
    BUILTIN_DENYLIST
        .iter()
        .map(|(name, category, pattern)| DenyRule {
            name: (*name).to_string(),
            category: *category,
            pattern: (*pattern).to_string(),
        })
        .collect()
}
