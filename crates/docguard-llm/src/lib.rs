//! # docguard-llm
//!
//! Matrix-constrained LLM decision synthesis.
//!
//! The synthesizer asks a chat model for a recommendation, but the decision
//! itself is owned by the decision matrix: the system prompt quotes the
//! matrix verbatim and forbids deviation, the response is parsed as strict
//! JSON, and any unavailable, unparseable, or matrix-violating reply is
//! resolved locally to an `LLM_FALLBACK` verdict. No failure in this crate
//! ever propagates to the decision assembler.

mod client;
mod error;
pub mod parse;
pub mod prompt;
mod synthesizer;

pub use client::*;
pub use error::*;
pub use synthesizer::*;
