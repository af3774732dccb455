//! Analyzer modules.
//!
//! This module provides the analyzer trait the orchestrator dispatches to,
//! plus the stub analyzers and their canned scenarios.

pub mod analyzer;
pub mod scenarios;
pub mod stub;

pub use analyzer::{Analyzer, AnalyzerClass, AnalyzerDescriptor, RequestContext};
pub use stub::build_registry;
