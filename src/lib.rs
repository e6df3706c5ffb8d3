// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod config;
pub mod llm;
pub mod roster;
pub mod scoring;
pub mod slate;
