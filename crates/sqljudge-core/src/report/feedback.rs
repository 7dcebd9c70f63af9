use crate::errors::ErrorKind;
use crate::model::{CaseStatus, MatchMode, TestCaseResult};

/// Human-readable feedback: a summary line, then one line per case in
/// challenge order (1-based). Engine error text is left out on purpose; it
/// lives in each result's `message`.
pub fn compose(results: &[TestCaseResult]) -> String {
    let total = results.len();
    let passed = results.iter().filter(|r| r.status.is_correct()).count();

    let summary = if total > 0 && passed == total {
        format!("All tests passed! ({}/{})", passed, total)
    } else {
        format!("Tests passed: {}/{}", passed, total)
    };

    let mut lines = Vec::with_capacity(total + 1);
    lines.push(summary);
    for (i, r) in results.iter().enumerate() {
        lines.push(case_line(i + 1, r));
    }
    lines.join("\n")
}

pub fn case_line(position: usize, r: &TestCaseResult) -> String {
    match r.status {
        CaseStatus::Correct => match r.matched_by {
            Some(MatchMode::Subset) => format!("✓ Test case {}: Passed (subset match)", position),
            _ => format!("✓ Test case {}: Passed", position),
        },
        CaseStatus::Incorrect => format!("✗ Test case {}: Failed - Result mismatch", position),
        CaseStatus::Timeout => format!("✗ Test case {}: Timeout", position),
        CaseStatus::Error => match r.error_kind {
            Some(ErrorKind::Internal) | None => format!("✗ Test case {}: System error", position),
            Some(kind) => format!("✗ Test case {}: Error - {}", position, kind.label()),
        },
    }
}
