use crate::errors::Rejection;
use crate::model::Verdict;
use anyhow::Context;
use std::path::Path;

pub fn verdict_json(verdict: &Verdict) -> anyhow::Result<String> {
    serde_json::to_string_pretty(verdict).context("failed to serialize verdict")
}

pub fn rejection_json(challenge_id: Option<u32>, rejection: &Rejection) -> anyhow::Result<String> {
    let doc = serde_json::json!({
        "challenge_id": challenge_id,
        "passed": false,
        "rejected": true,
        "reason": rejection.to_string(),
        "rejection": rejection,
    });
    serde_json::to_string_pretty(&doc).context("failed to serialize rejection")
}

pub fn write_verdict(verdict: &Verdict, out: &Path) -> anyhow::Result<()> {
    let body = verdict_json(verdict)?;
    std::fs::write(out, body).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(())
}
