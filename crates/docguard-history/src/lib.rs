//! # docguard-history
//!
//! Customer fraud history stores.
//!
//! The store owns all [`CustomerRecord`] state; every other component sees
//! read-only summaries. Three operations are exposed: `lookup`,
//! `has_fingerprint`, and `commit`. Duplicate detection and the subsequent
//! commit are critical-section work, so the store also hands out
//! per-identity guards; the pipeline holds one from before the duplicate
//! check until after the commit.
//!
//! [`CustomerRecord`]: docguard_core::CustomerRecord

mod error;
mod file;
mod locks;
mod memory;
mod store;

pub use error::*;
pub use file::*;
pub use locks::*;
pub use memory::*;
pub use store::*;
