//! # docguard-core
//!
//! Core domain models and decision contracts for the docguard fraud pipeline.
//!
//! This crate provides the foundational types used throughout the pipeline:
//! - Normalized document models (bank statements, checks, paystubs, money orders)
//! - Feature vector contracts (declared schemas with name, index, range, default)
//! - ML analysis results and risk levels
//! - Customer fraud history records and submission fingerprints
//! - Policy/LLM verdicts and the emitted decision record
//! - The decision matrix mapping (customer class, score) to a mandated decision

pub mod error;
pub mod matrix;
pub mod models;

pub use error::*;
pub use matrix::*;
pub use models::*;
