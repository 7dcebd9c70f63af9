use super::exit_codes;
use crate::cli::args::InitArgs;

pub async fn run(args: InitArgs) -> anyhow::Result<i32> {
    if args.out.exists() {
        eprintln!("note: {} already exists (skipped)", args.out.display());
        return Ok(exit_codes::OK);
    }
    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    sqljudge_core::config::write_sample_challenges(&args.out)?;
    eprintln!("created {}", args.out.display());
    Ok(exit_codes::OK)
}
