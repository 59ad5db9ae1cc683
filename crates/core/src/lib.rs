//! Core ledger primitives for minicoin.
//!
//! This crate provides the fundamental types used throughout the ledger:
//! - SHA-512/256 hashing
//! - Blocks and the chained block digest

pub mod block;
pub mod hash;

// Re-export commonly used types at the crate root
pub use block::{compute_digest, AccountId, Block};
pub use hash::{hash_concat, Hash};
