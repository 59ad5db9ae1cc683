//! Request dispatch and the "frozen while tainted" policy.
//!
//! Every request first re-scans the chain. A tainted chain rejects everything
//! except integrity checks; there is no repair operation, so once tainted the
//! ledger stays frozen until the process restarts.

use minicoin_api::{FailReason, Request, RequestKind, Response};
use minicoin_chain::{Ledger, LedgerError};
use minicoin_core::AccountId;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// Ledger shared between every connection task.
pub type SharedLedger = Arc<Mutex<Ledger>>;

/// Routes typed requests to the ledger.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    ledger: SharedLedger,
}

impl Dispatcher {
    /// Create a dispatcher owning `ledger`.
    pub fn new(ledger: Ledger) -> Self {
        Self::from_shared(Arc::new(Mutex::new(ledger)))
    }

    /// Create a dispatcher over an already shared ledger.
    pub fn from_shared(ledger: SharedLedger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    /// Handle one request.
    ///
    /// The ledger lock is held for the whole request, so the taint decision
    /// and any write it allows see the same chain.
    pub fn dispatch(&self, request: &Request) -> Response {
        let mut ledger = self.ledger.lock();
        let tainted = ledger.is_tainted();

        if tainted && request.kind != RequestKind::CheckBlockchainIntegrity {
            warn!(kind = ?request.kind, account = request.account, "blockchain corrupted, operation denied");
            return Response::tainted();
        }

        match request.kind {
            RequestKind::Transaction => transaction(&mut ledger, request.account, request.amount),
            RequestKind::CheckBalance => check_balance(&ledger, request.account),
            RequestKind::CheckBlockchainIntegrity => check_integrity(request.account, tainted),
        }
    }

    /// Answer a request whose kind is not a known request kind.
    ///
    /// The taint gate still applies first: on a tainted chain the caller gets
    /// the tainted rejection, otherwise a generic failure.
    pub fn reject_unknown(&self, kind: i32) -> Response {
        if self.ledger.lock().is_tainted() {
            warn!(kind, "blockchain corrupted, operation denied");
            return Response::tainted();
        }

        warn!(kind, "request is not a known client request");
        Response::rejected()
    }
}

fn transaction(ledger: &mut Ledger, account: AccountId, amount: i64) -> Response {
    info!(account, amount, "transaction request");

    if let Err(e) = ledger.append_transaction(account, amount) {
        info!(account, error = %e, "transaction rejected");
        return Response::failed(fail_reason(&e));
    }

    match ledger.balance(account) {
        Ok(balance) => {
            info!(account, balance, "transaction applied");
            Response::success(balance)
        }
        Err(e) => Response::failed(fail_reason(&e)),
    }
}

fn check_balance(ledger: &Ledger, account: AccountId) -> Response {
    info!(account, "balance request");

    match ledger.balance(account) {
        Ok(balance) => {
            info!(account, balance, "balance found");
            Response::success(balance)
        }
        Err(e) => {
            info!(account, error = %e, "balance unavailable");
            Response::failed(fail_reason(&e))
        }
    }
}

fn check_integrity(account: AccountId, tainted: bool) -> Response {
    if tainted {
        warn!(account, "integrity check: blockchain is corrupted");
    } else {
        info!(account, "integrity check: blockchain is intact");
    }
    Response::integrity(tainted)
}

/// Response code for a ledger error.
pub fn fail_reason(err: &LedgerError) -> FailReason {
    match err {
        LedgerError::UnknownAccount(_) => FailReason::UnknownAccount,
        LedgerError::Overdrawn { .. } => FailReason::Overdrawn,
        LedgerError::BalanceOverflow { .. } => FailReason::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minicoin_api::Status;

    fn dispatcher(corrupt_after: i64) -> Dispatcher {
        Dispatcher::new(Ledger::new(corrupt_after))
    }

    fn chain_len(dispatcher: &Dispatcher) -> usize {
        dispatcher.ledger().lock().len()
    }

    #[test]
    fn test_balance_of_unknown_account() {
        let d = dispatcher(-1);
        let res = d.dispatch(&Request::check_balance(1));

        assert_eq!(res.status, Status::Failed);
        assert_eq!(res.fail_reason, FailReason::UnknownAccount);
        assert!(!res.chain_corrupted);
    }

    #[test]
    fn test_transaction_returns_new_balance() {
        let d = dispatcher(-1);

        assert_eq!(d.dispatch(&Request::transaction(7, 100)), Response::success(100));
        assert_eq!(d.dispatch(&Request::transaction(7, -30)), Response::success(70));
        assert_eq!(d.dispatch(&Request::check_balance(7)), Response::success(70));
    }

    #[test]
    fn test_overdraw() {
        let d = dispatcher(-1);
        d.dispatch(&Request::transaction(7, 100));

        let res = d.dispatch(&Request::transaction(7, -150));
        assert_eq!(res, Response::failed(FailReason::Overdrawn));
        assert_eq!(chain_len(&d), 2);
    }

    #[test]
    fn test_debit_on_unknown_account_is_overdraw() {
        let d = dispatcher(-1);

        let res = d.dispatch(&Request::transaction(3, -1));
        assert_eq!(res.fail_reason, FailReason::Overdrawn);
        assert_eq!(chain_len(&d), 1);
    }

    #[test]
    fn test_overflow_maps_to_generic_failure() {
        let d = dispatcher(-1);
        d.dispatch(&Request::transaction(1, i64::MAX));

        let res = d.dispatch(&Request::transaction(1, 1));
        assert_eq!(res.status, Status::Failed);
        assert_eq!(res.fail_reason, FailReason::None);
    }

    #[test]
    fn test_integrity_on_healthy_chain() {
        let d = dispatcher(-1);
        assert_eq!(
            d.dispatch(&Request::check_integrity(0)),
            Response::integrity(false)
        );
    }

    #[test]
    fn test_tainted_chain_rejects_writes_and_reads() {
        let d = dispatcher(1);
        d.dispatch(&Request::transaction(7, 100));
        let len = chain_len(&d);

        assert_eq!(d.dispatch(&Request::transaction(7, 5)), Response::tainted());
        assert_eq!(d.dispatch(&Request::check_balance(7)), Response::tainted());
        assert_eq!(chain_len(&d), len);
    }

    #[test]
    fn test_tainted_chain_allows_integrity_check() {
        let d = dispatcher(1);
        d.dispatch(&Request::transaction(7, 100));

        let res = d.dispatch(&Request::check_integrity(42));
        assert_eq!(res.status, Status::Success);
        assert!(res.chain_corrupted);
    }

    #[test]
    fn test_corrupting_transaction_still_succeeds() {
        // The corruption is only observed by the next request's scan.
        let d = dispatcher(1);
        assert_eq!(d.dispatch(&Request::transaction(7, 100)), Response::success(100));
    }

    #[test]
    fn test_scenario() {
        let d = dispatcher(2);

        assert_eq!(d.dispatch(&Request::transaction(7, 100)), Response::success(100));
        assert_eq!(d.dispatch(&Request::check_balance(7)), Response::success(100));

        assert_eq!(
            d.dispatch(&Request::transaction(7, -150)),
            Response::failed(FailReason::Overdrawn)
        );
        assert_eq!(d.dispatch(&Request::check_balance(7)), Response::success(100));

        assert_eq!(d.dispatch(&Request::transaction(9, 50)), Response::success(50));
        assert!(d.ledger().lock().is_tainted());

        let res = d.dispatch(&Request::check_balance(7));
        assert_eq!(res.status, Status::Failed);
        assert_eq!(res.fail_reason, FailReason::BlockchainTainted);
        assert!(res.chain_corrupted);

        let res = d.dispatch(&Request::check_integrity(1234));
        assert_eq!(res.status, Status::Success);
        assert!(res.chain_corrupted);
    }

    #[test]
    fn test_unknown_kind_on_healthy_chain() {
        let d = dispatcher(-1);
        assert_eq!(d.reject_unknown(5), Response::rejected());
        assert_eq!(chain_len(&d), 1);
    }

    #[test]
    fn test_unknown_kind_on_tainted_chain() {
        let d = dispatcher(1);
        d.dispatch(&Request::transaction(7, 100));

        let res = d.reject_unknown(5);
        assert_eq!(res.status, Status::Failed);
        assert_eq!(res.fail_reason, FailReason::BlockchainTainted);
        assert!(res.chain_corrupted);
    }

    #[test]
    fn test_fail_reason_mapping() {
        assert_eq!(fail_reason(&LedgerError::UnknownAccount(1)), FailReason::UnknownAccount);
        assert_eq!(
            fail_reason(&LedgerError::Overdrawn {
                account: 1,
                balance: 0,
                amount: -1
            }),
            FailReason::Overdrawn
        );
        assert_eq!(
            fail_reason(&LedgerError::BalanceOverflow {
                account: 1,
                balance: i64::MAX,
                amount: 1
            }),
            FailReason::None
        );
    }

    #[test]
    fn test_concurrent_dispatch() {
        let d = dispatcher(-1);
        d.dispatch(&Request::transaction(1, 1_000));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let d = d.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        d.dispatch(&Request::transaction(1, -1));
                        d.dispatch(&Request::transaction(2, 1));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(d.dispatch(&Request::check_balance(1)), Response::success(600));
        assert_eq!(d.dispatch(&Request::check_balance(2)), Response::success(400));
        assert!(!d.ledger().lock().is_tainted());
    }
}
