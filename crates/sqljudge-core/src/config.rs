pub mod challenges;
pub mod options;

pub use challenges::{find_challenge, load_challenges, validate_challenge, write_sample_challenges};
pub use options::{load_options, GradeOptions};
