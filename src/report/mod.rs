//! Report rendering for verification outcomes.

pub mod generator;

pub use generator::{generate_json_report, generate_session_summary, generate_text_report};
