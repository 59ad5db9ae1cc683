//! Ledger blocks and the chained digest.

use crate::hash::{hash_concat, Hash};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Account identifier.
pub type AccountId = u32;

/// A single value transfer on the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Account the transfer applies to.
    pub account: AccountId,
    /// Creation time in nanoseconds since the Unix epoch.
    pub timestamp: i64,
    /// Signed amount: positive is a credit, negative a debit.
    pub amount: i64,
    /// Digest binding this block to its predecessor.
    pub digest: Hash,
}

impl Block {
    /// Create a block chained onto `prev_digest`, stamped with the current time.
    pub fn new(prev_digest: &Hash, account: AccountId, amount: i64) -> Self {
        Self::with_timestamp(prev_digest, account, Self::current_timestamp(), amount)
    }

    /// Create a block chained onto `prev_digest` with an explicit timestamp.
    pub fn with_timestamp(prev_digest: &Hash, account: AccountId, timestamp: i64, amount: i64) -> Self {
        Self {
            account,
            timestamp,
            amount,
            digest: compute_digest(prev_digest, account, timestamp, amount),
        }
    }

    /// Create the genesis block. All fields are zero and it is never hashed.
    pub fn genesis() -> Self {
        Self {
            account: 0,
            timestamp: 0,
            amount: 0,
            digest: Hash::ZERO,
        }
    }

    /// Check if this block has the genesis shape.
    pub fn is_genesis(&self) -> bool {
        *self == Self::genesis()
    }

    /// Recompute the digest this block should carry when chained onto `prev_digest`.
    pub fn expected_digest(&self, prev_digest: &Hash) -> Hash {
        compute_digest(prev_digest, self.account, self.timestamp, self.amount)
    }

    /// Check the stored digest against the one recomputed from `prev_digest`.
    pub fn links_to(&self, prev_digest: &Hash) -> bool {
        self.expected_digest(prev_digest) == self.digest
    }

    /// Creation time as a UTC datetime.
    pub fn datetime(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.timestamp)
    }

    /// Get the current Unix timestamp in nanoseconds.
    pub fn current_timestamp() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// Digest of a block with the given fields, chained onto `prev_digest`.
///
/// Byte layout, all little-endian fixed width:
///
/// ```text
/// account (4) | timestamp (8) | amount (8) | prev_digest (32)
/// ```
///
/// hashed with SHA-512/256. The fields are packed to 52 bytes with no
/// padding. An implementation that hashes an in-memory struct with natural
/// alignment sees 56 bytes (4 zero bytes after `account`), so digests from
/// such a ledger are not comparable with these.
pub fn compute_digest(prev_digest: &Hash, account: AccountId, timestamp: i64, amount: i64) -> Hash {
    hash_concat(&[
        &account.to_le_bytes(),
        &timestamp.to_le_bytes(),
        &amount.to_le_bytes(),
        prev_digest.as_bytes(),
    ])
}
