// Public API for integration tests and library usage

pub mod api;
pub mod arbiter;
pub mod fuzzy;
pub mod llm;
pub mod state;
pub mod types;
