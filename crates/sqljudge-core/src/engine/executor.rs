use crate::errors::ExecutionFailure;
use crate::model::{Grid, TestCase};
use crate::storage::sandbox::Sandbox;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// How long to wait for an interrupted worker to drop its sandbox.
const RELEASE_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Rows(Grid),
    Failed(ExecutionFailure),
    TimedOut { budget: Duration },
}

#[derive(Debug, Clone)]
pub struct Execution {
    pub outcome: ExecutionOutcome,
    pub elapsed: Duration,
}

/// Runs one test case in a fresh [`Sandbox`] on a blocking worker, bounded by
/// the case's time budget (or the override).
#[derive(Debug, Clone, Default)]
pub struct SandboxExecutor {
    pub budget_override: Option<Duration>,
}

impl SandboxExecutor {
    pub fn new(budget_override: Option<Duration>) -> Self {
        Self { budget_override }
    }

    pub fn budget_for(&self, tc: &TestCase) -> Duration {
        self.budget_override.unwrap_or_else(|| tc.time_budget())
    }

    pub async fn execute(&self, tc: &TestCase, query: &str, max_rows: usize) -> Execution {
        let budget = self.budget_for(tc);
        let start = Instant::now();

        let sandbox = match Sandbox::open() {
            Ok(s) => s,
            Err(f) => {
                return Execution {
                    outcome: ExecutionOutcome::Failed(f),
                    elapsed: start.elapsed(),
                }
            }
        };
        let cancel = sandbox.cancel_handle();

        let fixture = tc.clone();
        let query = query.to_string();
        let mut task = tokio::task::spawn_blocking(move || {
            // Owned by the worker: dropped on return, error, panic or interrupt.
            let sandbox = sandbox;
            sandbox.load_fixture(&fixture)?;
            sandbox.query(&query, max_rows)
        });

        let outcome = match timeout(budget, &mut task).await {
            Ok(Ok(Ok(rows))) => ExecutionOutcome::Rows(rows),
            Ok(Ok(Err(failure))) => ExecutionOutcome::Failed(failure),
            Ok(Err(join_err)) => ExecutionOutcome::Failed(ExecutionFailure::Internal(format!(
                "sandbox worker failed: {}",
                join_err
            ))),
            Err(_) => {
                cancel.cancel();
                if timeout(RELEASE_GRACE, &mut task).await.is_err() {
                    tracing::warn!(
                        event = "sandbox.release_slow",
                        test_id = tc.id,
                        grace_ms = RELEASE_GRACE.as_millis() as u64,
                        "interrupted sandbox did not stop within grace period"
                    );
                }
                ExecutionOutcome::TimedOut { budget }
            }
        };

        let mut elapsed = start.elapsed();
        if matches!(outcome, ExecutionOutcome::TimedOut { .. }) {
            elapsed = elapsed.max(budget);
        }

        Execution { outcome, elapsed }
    }
}
