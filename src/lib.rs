// library crate for editcond
// exposes modules needed by auxiliary binaries (e.g., generate-man) and integration tests

pub mod cli;
pub mod conditions;
pub mod config;
pub mod subject;
