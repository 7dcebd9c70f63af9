use super::{base_options, exit_codes, read_query};
use crate::cli::args::CheckArgs;
use sqljudge_core::validate::Validator;

pub async fn run(args: CheckArgs) -> anyhow::Result<i32> {
    let opts = match base_options(args.options.as_deref(), false) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let validator = match Validator::new(&opts.validator) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(exit_codes::CONFIG_ERROR);
        }
    };
    let query = read_query(&args.source).await?;

    match validator.validate(&query) {
        Ok(()) => {
            println!("ok");
            Ok(exit_codes::OK)
        }
        Err(rejection) => {
            println!("rejected: {}", rejection);
            Ok(exit_codes::TEST_FAILED)
        }
    }
}
