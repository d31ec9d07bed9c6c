//! rule model and in-memory store

mod model;
mod store;

pub use model::Rule;
pub use store::{suggest_names, RuleStore, StoreError, StoredRule};
