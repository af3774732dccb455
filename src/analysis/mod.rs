//! Analysis modules.
//!
//! Selection decides which analyzers run; aggregation folds what they
//! return into one overall verdict.

pub mod aggregator;
pub mod selector;

pub use aggregator::aggregate;
pub use selector::{AgentSelector, SelectionPolicy};
