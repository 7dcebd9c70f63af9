use crate::errors::Rejection;
use crate::model::{CaseStatus, Verdict};

pub fn print_summary(verdict: &Verdict) {
    eprintln!(
        "\nChallenge {}: {} test case(s)",
        verdict.challenge_id, verdict.total
    );

    let mut correct = 0;
    let mut incorrect = 0;
    let mut error = 0;
    let mut timeout = 0;

    for r in &verdict.results {
        let duration = format!("({:.2}s)", r.elapsed_ms as f64 / 1000.0);
        match r.status {
            CaseStatus::Correct => {
                correct += 1;
                eprintln!("✅ case {:<8} {:<10} {}", r.test_id, "CORRECT", duration);
            }
            CaseStatus::Incorrect => {
                incorrect += 1;
                eprintln!("❌ case {:<8} {:<10} {}", r.test_id, "INCORRECT", duration);
            }
            CaseStatus::Error => {
                error += 1;
                eprintln!("💥 case {:<8} {:<10} {}", r.test_id, "ERROR", duration);
            }
            CaseStatus::Timeout => {
                timeout += 1;
                eprintln!("⏱️  case {:<8} {:<10} {}", r.test_id, "TIMEOUT", duration);
            }
        }
        if let Some(msg) = &r.message {
            eprintln!("    {}", msg);
        }
    }

    eprintln!(
        "Results: correct={} incorrect={} error={} timeout={}",
        correct, incorrect, error, timeout
    );
    eprintln!(
        "Verdict: {} (score {}, {} ms)",
        if verdict.passed { "PASSED" } else { "FAILED" },
        verdict.score,
        verdict.elapsed_ms
    );
}

pub fn print_rejection(rejection: &Rejection) {
    eprintln!("🚫 Submission rejected: {}", rejection);
}
