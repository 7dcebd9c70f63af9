use crate::compare::ComparisonPolicy;
use crate::config::GradeOptions;
use crate::engine::executor::{ExecutionOutcome, SandboxExecutor};
use crate::config::validate_challenge;
use crate::errors::{ConfigError, ErrorKind, GradeError};
use crate::model::{CaseStatus, Challenge, Grid, TestCase, TestCaseResult, Verdict};
use crate::report::feedback;
use crate::validate::Validator;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinError;

pub struct Grader {
    validator: Arc<Validator>,
    executor: SandboxExecutor,
    options: GradeOptions,
}

impl Grader {
    pub fn new(options: GradeOptions) -> Result<Self, ConfigError> {
        options.check()?;
        let validator = Validator::new(&options.validator)?;
        Ok(Self {
            validator: Arc::new(validator),
            executor: SandboxExecutor::new(options.budget_override()),
            options,
        })
    }

    pub fn options(&self) -> &GradeOptions {
        &self.options
    }

    /// Grades `query` against every test case of `challenge`.
    ///
    /// The challenge is checked first, so hand-built challenges get the same
    /// guarantees as loaded ones. A rejected submission never reaches a
    /// sandbox and yields no per-case results. Once past validation, every
    /// case ends in a terminal status; one case failing (even panicking) does
    /// not stop the others.
    pub async fn grade(&self, challenge: &Challenge, query: &str) -> Result<Verdict, GradeError> {
        let start = Instant::now();
        validate_challenge(challenge)?;
        if let Err(rejection) = self.validator.validate(query) {
            tracing::info!(
                event = "grade.rejected",
                challenge_id = challenge.id,
                reason = %rejection
            );
            return Err(rejection.into());
        }

        let query = query.trim().to_string();
        let max_rows = self.options.effective_max_rows(challenge.max_query_results);
        let policy = self.options.comparison;
        let sem = Arc::new(Semaphore::new(self.options.parallel.max(1)));

        let mut handles = Vec::with_capacity(challenge.test_cases.len());
        for tc in &challenge.test_cases {
            let sem = sem.clone();
            let executor = self.executor.clone();
            let tc = tc.clone();
            let query = query.clone();
            let test_id = tc.id;
            let h = tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.ok();
                grade_case(&executor, &tc, &query, max_rows, policy).await
            });
            handles.push((test_id, h));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (test_id, h) in handles {
            results.push(joined_result(test_id, h.await));
        }

        let verdict = compose_verdict(challenge, &query, results, start);
        tracing::info!(
            event = "grade.finished",
            challenge_id = challenge.id,
            passed = verdict.passed,
            passed_count = verdict.passed_count,
            total = verdict.total,
            elapsed_ms = verdict.elapsed_ms
        );
        Ok(verdict)
    }
}

async fn grade_case(
    executor: &SandboxExecutor,
    tc: &TestCase,
    query: &str,
    max_rows: usize,
    policy: ComparisonPolicy,
) -> TestCaseResult {
    let exec = executor.execute(tc, query, max_rows).await;
    let elapsed_ms = exec.elapsed.as_millis() as u64;

    let result = match exec.outcome {
        ExecutionOutcome::Rows(actual) => match policy.accept(&actual, &tc.expected) {
            Some(mode) => TestCaseResult {
                test_id: tc.id,
                status: CaseStatus::Correct,
                elapsed_ms,
                rows_returned: actual.len(),
                actual: Some(actual),
                matched_by: Some(mode),
                error_kind: None,
                message: None,
            },
            None => TestCaseResult {
                test_id: tc.id,
                status: CaseStatus::Incorrect,
                elapsed_ms,
                rows_returned: actual.len(),
                message: Some(mismatch_message(&tc.expected, &actual)),
                actual: Some(actual),
                matched_by: None,
                error_kind: None,
            },
        },
        ExecutionOutcome::Failed(failure) => TestCaseResult {
            test_id: tc.id,
            status: CaseStatus::Error,
            elapsed_ms,
            rows_returned: 0,
            actual: None,
            matched_by: None,
            error_kind: Some(failure.kind()),
            message: Some(failure.to_string()),
        },
        ExecutionOutcome::TimedOut { budget } => TestCaseResult {
            test_id: tc.id,
            status: CaseStatus::Timeout,
            elapsed_ms,
            rows_returned: 0,
            actual: None,
            matched_by: None,
            error_kind: None,
            message: Some(format!(
                "query exceeded time limit of {} ms",
                budget.as_millis()
            )),
        },
    };

    tracing::debug!(
        event = "grade.case",
        test_id = tc.id,
        status = %result.status,
        elapsed_ms,
        rows = result.rows_returned
    );
    result
}

/// A case whose task died (panic or cancellation) still gets a row.
fn joined_result(test_id: u32, joined: Result<TestCaseResult, JoinError>) -> TestCaseResult {
    match joined {
        Ok(row) => row,
        Err(e) => {
            tracing::error!(event = "grade.case_panicked", test_id, error = %e);
            internal_error(test_id, format!("grading task failed: {}", e))
        }
    }
}

fn internal_error(test_id: u32, message: String) -> TestCaseResult {
    TestCaseResult {
        test_id,
        status: CaseStatus::Error,
        elapsed_ms: 0,
        rows_returned: 0,
        actual: None,
        matched_by: None,
        error_kind: Some(ErrorKind::Internal),
        message: Some(message),
    }
}

fn mismatch_message(expected: &Grid, actual: &Grid) -> String {
    let render = |g: &Grid| serde_json::to_string(g).unwrap_or_else(|_| format!("{:?}", g));
    format!("Expected: {}, Got: {}", render(expected), render(actual))
}

fn compose_verdict(
    challenge: &Challenge,
    query: &str,
    results: Vec<TestCaseResult>,
    start: Instant,
) -> Verdict {
    let total = results.len();
    let passed_count = results.iter().filter(|r| r.status.is_correct()).count();
    let passed = total > 0 && passed_count == total;

    Verdict {
        challenge_id: challenge.id,
        passed,
        passed_count,
        total,
        score: if passed { challenge.points } else { 0 },
        feedback: feedback::compose(&results),
        results,
        elapsed_ms: start.elapsed().as_millis() as u64,
        fingerprint: crate::fingerprint::submission(challenge.id, query),
        graded_at: chrono::Utc::now(),
    }
}
