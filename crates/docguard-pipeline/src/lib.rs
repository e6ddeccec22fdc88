//! # docguard-pipeline
//!
//! The end-to-end fraud decision pipeline:
//! feature extraction, ensemble scoring, policy gating, matrix-constrained
//! LLM synthesis, decision assembly, and the history commit.
//!
//! Control flow per request:
//! `document -> extract -> score -> policy gate -> (synthesize if not gated)
//! -> assemble -> commit`. The policy gate short-circuits before the LLM;
//! the assembler re-enforces the decision matrix on every LLM verdict; the
//! history commit happens exactly once, under the per-identity guard held
//! since before the duplicate check.

mod assembler;
mod error;
mod pipeline;
mod policy;

pub use assembler::*;
pub use error::*;
pub use pipeline::*;
pub use policy::*;
