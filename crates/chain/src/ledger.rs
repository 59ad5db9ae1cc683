//! In-memory hash-chained ledger.
//!
//! The ledger owns the ordered chain of blocks, starting at genesis. Balances
//! and the taint state are never stored; both are derived by scanning the
//! chain on demand.

use crate::fault::FaultInjector;
use minicoin_core::{AccountId, Block, Hash};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("account {0} has no transactions")]
    UnknownAccount(AccountId),

    #[error("account {account} would be overdrawn (balance {balance}, amount {amount})")]
    Overdrawn {
        account: AccountId,
        balance: i64,
        amount: i64,
    },

    #[error("balance of account {account} would overflow (balance {balance}, amount {amount})")]
    BalanceOverflow {
        account: AccountId,
        balance: i64,
        amount: i64,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;

/// The chain of blocks plus its fault injector.
#[derive(Debug, Clone)]
pub struct Ledger {
    blocks: Vec<Block>,
    injector: FaultInjector,
}

impl Ledger {
    /// Create a ledger holding only the genesis block.
    ///
    /// `corrupt_after` arms the fault injector: the `corrupt_after`-th
    /// successful append stores a deliberately corrupted digest. Zero or a
    /// negative value disables injection.
    pub fn new(corrupt_after: i64) -> Self {
        Self {
            blocks: vec![Block::genesis()],
            injector: FaultInjector::armed(corrupt_after),
        }
    }

    /// Discard every block and start over from genesis.
    pub fn reset(&mut self, corrupt_after: i64) {
        *self = Self::new(corrupt_after);
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: a ledger holds at least the genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The last block on the chain.
    pub fn tip(&self) -> &Block {
        // `blocks` is never empty, genesis is pushed on construction.
        &self.blocks[self.blocks.len() - 1]
    }

    /// Get a block by height (0 is genesis).
    pub fn block(&self, height: usize) -> Option<&Block> {
        self.blocks.get(height)
    }

    /// All blocks in chain order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The fault injector state.
    pub fn injector(&self) -> &FaultInjector {
        &self.injector
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Append a transfer for `account`, stamped with the current time.
    ///
    /// Debits are checked against the derived balance first; an account with
    /// no history counts as balance zero, so any debit on it is `Overdrawn`.
    /// Returns the digest stored for the new block.
    pub fn append_transaction(&mut self, account: AccountId, amount: i64) -> Result<Hash> {
        self.append_transaction_at(account, amount, Block::current_timestamp())
    }

    /// Append a transfer with an explicit timestamp.
    pub fn append_transaction_at(
        &mut self,
        account: AccountId,
        amount: i64,
        timestamp: i64,
    ) -> Result<Hash> {
        let balance = match self.balance(account) {
            Ok(balance) => balance,
            Err(LedgerError::UnknownAccount(_)) => 0,
            Err(e) => return Err(e),
        };

        match balance.checked_add(amount) {
            Some(next) if next < 0 => {
                return Err(LedgerError::Overdrawn {
                    account,
                    balance,
                    amount,
                })
            }
            Some(_) => {}
            None => {
                return Err(LedgerError::BalanceOverflow {
                    account,
                    balance,
                    amount,
                })
            }
        }

        let mut block = Block::with_timestamp(&self.tip().digest, account, timestamp, amount);

        debug!(
            height = self.blocks.len(),
            account,
            amount,
            time = %block.datetime().to_rfc2822(),
            digest = %block.digest,
            "appending block"
        );

        if self.injector.tick() {
            FaultInjector::corrupt(&mut block.digest);
            warn!(
                height = self.blocks.len(),
                digest = %block.digest,
                "fault injector fired, stored digest altered"
            );
        }

        let digest = block.digest;
        self.blocks.push(block);
        Ok(digest)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Sum of every amount recorded for `account`.
    ///
    /// Fails with `UnknownAccount` when the account has no blocks at all,
    /// which is distinct from a balance of zero.
    pub fn balance(&self, account: AccountId) -> Result<i64> {
        let mut found = false;
        let mut balance = 0i64;

        for block in self.blocks.iter().skip(1) {
            if block.account == account {
                balance += block.amount;
                found = true;
            }
        }

        if found {
            Ok(balance)
        } else {
            Err(LedgerError::UnknownAccount(account))
        }
    }

    /// Check whether any block's digest disagrees with its predecessor.
    pub fn is_tainted(&self) -> bool {
        match self.first_tainted_block() {
            Some(height) => {
                warn!(height, "block digest does not match its predecessor");
                true
            }
            None => false,
        }
    }

    /// Height of the first block whose stored digest does not match the one
    /// recomputed from its predecessor's stored digest.
    pub fn first_tainted_block(&self) -> Option<usize> {
        self.blocks
            .windows(2)
            .position(|pair| !pair[1].links_to(&pair[0].digest))
            .map(|i| i + 1)
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(-1)
    }
}
