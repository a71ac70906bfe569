pub mod base;
pub mod types;
pub mod wfo;
