// library crate for rulekit
// exposes modules needed by auxiliary binaries (e.g., generate-man)

pub mod cli;
pub mod conditions;
pub mod config;
pub mod rules;
pub mod version;
