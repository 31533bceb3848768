//! Configuration schema and the structured report model.

pub mod config;
pub mod report;
