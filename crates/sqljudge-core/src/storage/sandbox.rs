use crate::errors::ExecutionFailure;
use crate::model::{Grid, Scalar, TestCase};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, InterruptHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// VM instructions between cancellation checks.
const PROGRESS_OPS: i32 = 1_000;

/// One disposable in-memory database.
///
/// Never shared, never reused: every test case gets a new one and the
/// connection closes when the value drops, whichever path got there.
pub struct Sandbox {
    conn: Connection,
    cancelled: Arc<AtomicBool>,
}

/// Handle used from outside the worker to stop a running sandbox.
#[derive(Clone)]
pub struct CancelHandle {
    interrupt: Arc<InterruptHandle>,
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.interrupt.interrupt();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Sandbox {
    pub fn open() -> Result<Self, ExecutionFailure> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ExecutionFailure::Internal(format!("failed to open sandbox: {}", e)))?;

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = cancelled.clone();
        // Returning true aborts the statement in flight. Covers the window
        // where an interrupt lands between statements and would be lost.
        conn.progress_handler(PROGRESS_OPS, Some(move || flag.load(Ordering::SeqCst)));

        tracing::trace!(event = "sandbox.open");
        Ok(Self { conn, cancelled })
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            interrupt: Arc::new(self.conn.get_interrupt_handle()),
            cancelled: self.cancelled.clone(),
        }
    }

    /// Applies schema then data, then locks the database against writes.
    pub fn load_fixture(&self, tc: &TestCase) -> Result<(), ExecutionFailure> {
        self.check_cancelled()?;
        self.conn
            .execute_batch(&tc.schema)
            .map_err(|e| ExecutionFailure::Fixture(format!("schema: {}", e)))?;
        self.check_cancelled()?;
        self.conn
            .execute_batch(&tc.data)
            .map_err(|e| ExecutionFailure::Fixture(format!("data: {}", e)))?;
        self.conn
            .execute_batch("PRAGMA query_only = ON")
            .map_err(|e| ExecutionFailure::Internal(format!("failed to lock sandbox: {}", e)))?;
        Ok(())
    }

    /// Runs `query` and collects at most `max_rows` rows. One row more than
    /// the limit is a failure, never a truncated result.
    pub fn query(&self, query: &str, max_rows: usize) -> Result<Grid, ExecutionFailure> {
        self.check_cancelled()?;
        let mut stmt = self
            .conn
            .prepare(query)
            .map_err(|e| ExecutionFailure::Query(e.to_string()))?;
        let columns = stmt.column_count();

        let mut rows = stmt
            .query([])
            .map_err(|e| ExecutionFailure::Query(e.to_string()))?;

        let mut out: Grid = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| ExecutionFailure::Query(e.to_string()))?
        {
            if out.len() == max_rows {
                return Err(ExecutionFailure::RowLimitExceeded { limit: max_rows });
            }
            let mut cells = Vec::with_capacity(columns);
            for i in 0..columns {
                let v = row
                    .get_ref(i)
                    .map_err(|e| ExecutionFailure::Query(e.to_string()))?;
                cells.push(to_scalar(v));
            }
            out.push(cells);
        }
        Ok(out)
    }

    fn check_cancelled(&self) -> Result<(), ExecutionFailure> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(ExecutionFailure::Internal("sandbox cancelled".into()));
        }
        Ok(())
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        tracing::trace!(
            event = "sandbox.release",
            cancelled = self.cancelled.load(Ordering::SeqCst)
        );
    }
}

fn to_scalar(v: ValueRef<'_>) -> Scalar {
    match v {
        ValueRef::Null => Scalar::Null,
        ValueRef::Integer(i) => Scalar::Integer(i),
        ValueRef::Real(f) => Scalar::Real(f),
        ValueRef::Text(t) => Scalar::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Scalar::Blob(b.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(schema: &str, data: &str) -> TestCase {
        TestCase {
            id: 1,
            schema: schema.into(),
            data: data.into(),
            expected: vec![],
            max_execution_ms: 1_000,
            description: None,
        }
    }

    #[test]
    fn test_query_returns_typed_cells() {
        let sb = Sandbox::open().unwrap();
        sb.load_fixture(&case(
            "CREATE TABLE t(i INTEGER, r REAL, s TEXT, b BLOB, n INTEGER);",
            "INSERT INTO t VALUES (1, 2.5, 'x', x'00ff', NULL);",
        ))
        .unwrap();
        let rows = sb.query("SELECT i, r, s, b, n FROM t", 10).unwrap();
        assert_eq!(
            rows,
            vec![vec![
                Scalar::Integer(1),
                Scalar::Real(2.5),
                Scalar::Text("x".into()),
                Scalar::Blob(vec![0x00, 0xff]),
                Scalar::Null,
            ]]
        );
    }

    #[test]
    fn test_row_limit_is_failure_not_truncation() {
        let sb = Sandbox::open().unwrap();
        sb.load_fixture(&case(
            "CREATE TABLE t(x INTEGER);",
            "INSERT INTO t VALUES (1), (2), (3);",
        ))
        .unwrap();
        assert_eq!(sb.query("SELECT x FROM t", 3).unwrap().len(), 3);
        assert_eq!(
            sb.query("SELECT x FROM t", 2),
            Err(ExecutionFailure::RowLimitExceeded { limit: 2 })
        );
    }

    #[test]
    fn test_sandbox_is_read_only_after_fixture() {
        let sb = Sandbox::open().unwrap();
        sb.load_fixture(&case("CREATE TABLE t(x INTEGER);", "INSERT INTO t VALUES (1);"))
            .unwrap();
        let res = sb.query("INSERT INTO t VALUES (2)", 10);
        assert!(matches!(res, Err(ExecutionFailure::Query(_))));
        assert_eq!(sb.query("SELECT count(*) FROM t", 10).unwrap()[0][0], Scalar::Integer(1));
    }

    #[test]
    fn test_fixture_errors_are_classified() {
        let sb = Sandbox::open().unwrap();
        let res = sb.load_fixture(&case("CREATE TABLE t(", "SELECT 1;"));
        assert!(matches!(res, Err(ExecutionFailure::Fixture(_))));
    }

    #[test]
    fn test_engine_error_text_preserved() {
        let sb = Sandbox::open().unwrap();
        sb.load_fixture(&case("CREATE TABLE t(x INTEGER);", "INSERT INTO t VALUES (1);"))
            .unwrap();
        match sb.query("SELECT nope FROM t", 10) {
            Err(ExecutionFailure::Query(msg)) => assert!(msg.contains("nope"), "{msg}"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_cancel_before_query() {
        let sb = Sandbox::open().unwrap();
        let handle = sb.cancel_handle();
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(matches!(
            sb.query("SELECT 1", 10),
            Err(ExecutionFailure::Internal(_))
        ));
    }

    #[test]
    fn test_fresh_sandboxes_share_nothing() {
        let a = Sandbox::open().unwrap();
        a.load_fixture(&case("CREATE TABLE t(x INTEGER);", "INSERT INTO t VALUES (1);"))
            .unwrap();
        drop(a);
        let b = Sandbox::open().unwrap();
        assert!(matches!(
            b.query("SELECT x FROM t", 10),
            Err(ExecutionFailure::Query(_))
        ));
    }
}
