//! Hash-chained ledger engine for minicoin.
//!
//! This crate holds the single authoritative chain:
//! - **Ledger**: append, per-account balance, integrity scan
//! - **Fault injector**: deliberate one-time digest corruption for testing
//!
//! # Example
//!
//! ```rust
//! use minicoin_chain::{Ledger, LedgerError};
//!
//! // Corrupt the second appended block
//! let mut ledger = Ledger::new(2);
//!
//! ledger.append_transaction(7, 100).unwrap();
//! assert_eq!(ledger.balance(7), Ok(100));
//!
//! assert!(matches!(
//!     ledger.append_transaction(7, -150),
//!     Err(LedgerError::Overdrawn { .. })
//! ));
//!
//! ledger.append_transaction(9, 50).unwrap();
//! assert!(ledger.is_tainted());
//! ```

pub mod fault;
pub mod ledger;

// Re-export commonly used types
pub use fault::FaultInjector;
pub use ledger::{Ledger, LedgerError};
