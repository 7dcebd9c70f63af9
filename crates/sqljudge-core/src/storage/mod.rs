pub mod sandbox;

pub use sandbox::{CancelHandle, Sandbox};
