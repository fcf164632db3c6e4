//! Core domain types and logic.

pub mod config_validation;
pub mod engine;
pub mod error;
pub mod growth;
pub mod plan;
pub mod price_series;
pub mod record;
pub mod risk;
