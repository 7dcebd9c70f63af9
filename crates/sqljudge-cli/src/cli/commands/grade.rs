use super::{base_options, exit_codes, read_query};
use crate::cli::args::GradeArgs;
use sqljudge_core::compare::ComparisonPolicy;
use sqljudge_core::config::{find_challenge, load_challenges, GradeOptions};
use sqljudge_core::engine::Grader;
use sqljudge_core::errors::GradeError;
use sqljudge_core::report::{console, json};

pub async fn run(args: GradeArgs) -> anyhow::Result<i32> {
    let challenges = match load_challenges(&args.challenges) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let challenge = match find_challenge(&challenges, args.challenge) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let opts = match base_options(args.options.as_deref(), args.strict_options) {
        Ok(o) => apply_flags(o, &args),
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let grader = match Grader::new(opts) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };

    let query = read_query(&args.source).await?;
    tracing::debug!(
        event = "cli.grade",
        challenge_id = challenge.id,
        cases = challenge.test_cases.len(),
        parallel = grader.options().parallel
    );
    let as_json = args.format == "json";

    match grader.grade(challenge, &query).await {
        Ok(verdict) => {
            if let Some(out) = &args.out {
                json::write_verdict(&verdict, out)?;
                eprintln!("wrote {}", out.display());
            }
            if as_json {
                println!("{}", json::verdict_json(&verdict)?);
            } else {
                println!("{}", verdict.feedback);
                console::print_summary(&verdict);
            }
            Ok(if verdict.passed {
                exit_codes::OK
            } else {
                exit_codes::TEST_FAILED
            })
        }
        Err(GradeError::InvalidChallenge(e)) => {
            eprintln!("{}", e);
            Ok(exit_codes::CONFIG_ERROR)
        }
        Err(GradeError::Rejected(rejection)) => {
            if as_json {
                println!("{}", json::rejection_json(Some(challenge.id), &rejection)?);
            } else {
                println!("Query rejected: {}", rejection);
                console::print_rejection(&rejection);
            }
            Ok(exit_codes::TEST_FAILED)
        }
    }
}

/// Command-line flags win over the options file and the environment.
fn apply_flags(mut opts: GradeOptions, args: &GradeArgs) -> GradeOptions {
    if let Some(n) = args.max_rows {
        opts.max_rows = Some(n);
    }
    if let Some(ms) = args.timeout_ms {
        opts.timeout_ms = Some(ms);
    }
    if let Some(n) = args.parallel {
        opts.parallel = n;
    }
    if args.exact_only {
        opts.comparison = ComparisonPolicy::ExactOnly;
    }
    opts
}
