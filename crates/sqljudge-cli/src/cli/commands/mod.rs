use super::args::*;
use anyhow::Context;
use sqljudge_core::config::{load_options, GradeOptions};
use std::path::Path;
use tokio::io::AsyncReadExt;

pub mod check;
pub mod grade;
pub mod init;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const TEST_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Grade(args) => grade::run(args).await,
        Command::Check(args) => check::run(args).await,
        Command::Init(args) => init::run(args).await,
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

pub(crate) async fn read_query(source: &QuerySource) -> anyhow::Result<String> {
    if let Some(q) = &source.query {
        return Ok(q.clone());
    }
    match &source.query_file {
        Some(path) if path.as_os_str() == "-" => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read query from stdin")?;
            Ok(buf)
        }
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read query file {}", path.display())),
        None => anyhow::bail!("one of --query or --query-file is required"),
    }
}

pub(crate) fn base_options(path: Option<&Path>, strict: bool) -> anyhow::Result<GradeOptions> {
    let opts = match path {
        Some(p) => load_options(p, strict)?,
        None => GradeOptions::default(),
    };
    Ok(opts.apply_env())
}
