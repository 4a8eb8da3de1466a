//! triagebox: heuristic risk scoring and triage for bounty claim batches
//!
//! Given an already-fetched batch of bounty-claim records, triagebox computes
//! a suspicion score per claim, buckets each claim into a risk level, and
//! emits ordered reason codes plus a maintainer action recommendation. It is
//! a deterministic batch engine: no fetching, no verdicts, no learned models.
//!
//! # Architecture
//!
//! The crate is organized by pipeline stage:
//!
//! ## Configuration & Policy ([`config`])
//! - [`config::types`]: shared type definitions and closed enums
//! - [`config::presets`]: named policy profiles (relaxed/balanced/strict)
//! - [`config::validator`]: policy validation for externally loaded profiles
//!
//! ## Normalization ([`normalize`])
//! - [`normalize::record`]: identity validation and optional-field defaults
//! - [`normalize::text`]: claim body and proof-link canonicalization
//!
//! ## Cross-Claim Index ([`index`])
//! - [`index::batch`]: immutable batch-wide groupings, built in one pass
//!
//! ## Heuristic Evaluators ([`heuristics`])
//! - [`heuristics::account`]: claimant account age
//! - [`heuristics::liveness`]: missing-PR and stale-session detectors
//! - [`heuristics::sybil`]: velocity, spread, wallet and proof reuse
//! - [`heuristics::similarity`]: cross-user and same-user text templating
//!
//! ## Scoring ([`score`])
//! - [`score::aggregate`]: per-claim signal aggregation under a policy
//! - [`score::action`]: maintainer action recommendation
//! - [`score::report`]: output ordering contract
//! - [`score::runner`]: two-phase batch execution with worker-pool fan-out
//!
//! ## Observability ([`observability`])
//! - [`observability::audit`]: structured audit events per run
//!
//! ## Utilities ([`utils`])
//! - [`utils::input`]: claims document loading
//! - [`utils::json_schema`]: frozen report schema
//!
//! # Design Principles
//!
//! 1. **Index before evaluation** - cross-claim signals need the full batch
//! 2. **Unknown is not zero-risk** - missing data is an explicit abstention
//! 3. **Evaluators are isolated** - one fault never aborts its siblings
//! 4. **Deterministic output** - same batch + same policy = same bytes

// Configuration & Policy
pub mod config;

// Normalization
pub mod normalize;

// Cross-claim correlation index
pub mod index;

// Heuristic evaluators
pub mod heuristics;

// Scoring pipeline
pub mod score;

// Observability
pub mod observability;

// Utilities
pub mod utils;

// CLI entrypoint wiring for the triage binary.
pub mod cli;

// Re-export commonly used types for convenience
pub use config::types::*;
