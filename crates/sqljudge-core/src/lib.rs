pub mod compare;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fingerprint;
pub mod model;
pub mod report;
pub mod storage;
pub mod validate;
