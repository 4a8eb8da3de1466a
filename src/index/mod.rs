//! Cross-claim correlation index
//!
//! Immutable batch-wide groupings, built before any claim is evaluated.

pub mod batch;

pub use batch::BatchIndex;
