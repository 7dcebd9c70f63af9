use assert_cmd::Command;
use predicates::str::contains;
use std::path::Path;
use tempfile::TempDir;

fn sqljudge() -> Command {
    let mut cmd = Command::cargo_bin("sqljudge").unwrap();
    cmd.env_remove("SQLJUDGE_LOG")
        .env_remove("SQLJUDGE_MAX_ROWS")
        .env_remove("SQLJUDGE_TIMEOUT_MS")
        .env_remove("SQLJUDGE_PARALLEL")
        .env_remove("SQLJUDGE_COMPARISON");
    cmd
}

fn init_sample(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("challenges.json");
    sqljudge()
        .args(["init", "--out"])
        .arg(&path)
        .assert()
        .success()
        .stderr(contains("created"));
    path
}

fn grade(challenges: &Path, query: &str) -> Command {
    let mut cmd = sqljudge();
    cmd.arg("grade")
        .arg("--challenges")
        .arg(challenges)
        .args(["--challenge", "1", "--query", query]);
    cmd
}

#[test]
fn test_correct_submission_exits_zero() {
    let dir = TempDir::new().unwrap();
    let path = init_sample(&dir);

    grade(&path, "SELECT name FROM users WHERE age >= 18")
        .assert()
        .success()
        .stdout(contains("All tests passed! (2/2)"))
        .stderr(contains("Verdict: PASSED"));
}

#[test]
fn test_wrong_submission_exits_one() {
    let dir = TempDir::new().unwrap();
    let path = init_sample(&dir);

    grade(&path, "SELECT name FROM users")
        .assert()
        .code(1)
        .stdout(contains("Tests passed: 1/2"))
        .stdout(contains("✗ Test case 2: Failed - Result mismatch"));

    grade(&path, "SELECT name FROM users")
        .arg("--exact-only")
        .assert()
        .code(1)
        .stdout(contains("Tests passed: 0/2"));
}

#[test]
fn test_rejected_submission() {
    let dir = TempDir::new().unwrap();
    let path = init_sample(&dir);

    grade(&path, "SELECT * FROM users; DROP TABLE users")
        .assert()
        .code(1)
        .stdout(contains("Query rejected"));
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().unwrap();
    let path = init_sample(&dir);

    let out = grade(&path, "SELECT name FROM users WHERE age >= 18")
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["passed"], true);
    assert_eq!(v["score"], 10);
    assert_eq!(v["results"].as_array().unwrap().len(), 2);
    assert_eq!(v["fingerprint"].as_str().unwrap().len(), 64);
}

#[test]
fn test_out_file_written() {
    let dir = TempDir::new().unwrap();
    let path = init_sample(&dir);
    let out = dir.path().join("reports/verdict.json");
    std::fs::create_dir_all(out.parent().unwrap()).unwrap();

    grade(&path, "SELECT name FROM users")
        .arg("--out")
        .arg(&out)
        .assert()
        .code(1)
        .stdout(contains("Tests passed: 1/2"));

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(v["challenge_id"], 1);
    assert_eq!(v["passed"], false);
    assert_eq!(v["results"][1]["status"], "incorrect");
}

#[test]
fn test_comment_glued_statement_rejected() {
    let dir = TempDir::new().unwrap();
    let path = init_sample(&dir);

    grade(&path, "SELECT name FROM users WHERE age >= 18;/**/SELECT 2")
        .assert()
        .code(1)
        .stdout(contains("Query rejected"));
}

#[test]
fn test_query_file_and_stdin() {
    let dir = TempDir::new().unwrap();
    let path = init_sample(&dir);
    let query_path = dir.path().join("answer.sql");
    std::fs::write(&query_path, "-- adults\nSELECT name FROM users WHERE age >= 18;\n").unwrap();

    sqljudge()
        .arg("grade")
        .arg("--challenges")
        .arg(&path)
        .args(["--challenge", "1", "--query-file"])
        .arg(&query_path)
        .assert()
        .success();

    sqljudge()
        .arg("grade")
        .arg("--challenges")
        .arg(&path)
        .args(["--challenge", "1", "--query-file", "-"])
        .write_stdin("SELECT name FROM users WHERE age >= 18")
        .assert()
        .success();
}

#[test]
fn test_config_errors_exit_two() {
    let dir = TempDir::new().unwrap();
    let path = init_sample(&dir);

    sqljudge()
        .arg("grade")
        .arg("--challenges")
        .arg(&path)
        .args(["--challenge", "7", "--query", "SELECT 1"])
        .assert()
        .code(2)
        .stderr(contains("challenge 7 not found"));

    sqljudge()
        .arg("grade")
        .arg("--challenges")
        .arg(dir.path().join("missing.json"))
        .args(["--challenge", "1", "--query", "SELECT 1"])
        .assert()
        .code(2);

    grade(&path, "SELECT 1")
        .args(["--parallel", "0"])
        .assert()
        .code(2)
        .stderr(contains("parallel must be at least 1"));
}

#[test]
fn test_strict_options_file() {
    let dir = TempDir::new().unwrap();
    let path = init_sample(&dir);
    let opts = dir.path().join("options.yaml");
    std::fs::write(&opts, "comparison: exact_only\nbogus: true\n").unwrap();

    grade(&path, "SELECT name FROM users WHERE age >= 18")
        .arg("--options")
        .arg(&opts)
        .assert()
        .success();

    grade(&path, "SELECT name FROM users WHERE age >= 18")
        .arg("--options")
        .arg(&opts)
        .arg("--strict-options")
        .assert()
        .code(2)
        .stderr(contains("unknown option fields"));
}

#[test]
fn test_env_overlay() {
    let dir = TempDir::new().unwrap();
    let path = init_sample(&dir);

    grade(&path, "SELECT name FROM users")
        .env("SQLJUDGE_COMPARISON", "exact_only")
        .assert()
        .code(1)
        .stdout(contains("Tests passed: 0/2"));
}

#[test]
fn test_check_command() {
    sqljudge()
        .args(["check", "--query", "SELECT 1"])
        .assert()
        .success()
        .stdout("ok\n");

    sqljudge()
        .args(["check", "--query", "DELETE FROM users"])
        .assert()
        .code(1)
        .stdout(contains("rejected: only SELECT statements are allowed"));

    sqljudge()
        .args(["check", "--query", "   "])
        .assert()
        .code(1)
        .stdout(contains("query cannot be empty"));
}

#[test]
fn test_init_does_not_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = init_sample(&dir);
    std::fs::write(&path, "{\"challenges\": []}").unwrap();

    sqljudge()
        .args(["init", "--out"])
        .arg(&path)
        .assert()
        .success()
        .stderr(contains("already exists"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"challenges\": []}");
}

#[test]
fn test_version() {
    sqljudge()
        .arg("version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}
