pub mod filename;
pub mod pattern;
