pub mod console;
pub mod feedback;
pub mod json;
