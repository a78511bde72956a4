//! Core domain types and logic.

pub mod error;
pub mod record;
pub mod metric;
pub mod threshold;
pub mod threshold_parser;
pub mod evaluator;
pub mod screen;
pub mod config_validation;
