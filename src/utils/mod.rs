//! Utilities
//!
//! Input loading and the frozen report schema.

pub mod input;
pub mod json_schema;
