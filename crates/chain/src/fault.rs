//! Deliberate digest corruption for exercising integrity checks.
//!
//! This is a test/demo hook, not a security feature. It lets an operator
//! make the ledger corrupt exactly one block so that integrity verification
//! has a reproducible failure to detect.

use minicoin_core::Hash;

/// Countdown that fires once, on the N-th successful append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultInjector {
    remaining: i64,
}

impl FaultInjector {
    /// Arm the injector to corrupt the `countdown`-th appended block.
    ///
    /// A countdown of zero or less never fires.
    pub fn armed(countdown: i64) -> Self {
        Self {
            remaining: countdown,
        }
    }

    /// An injector that never fires.
    pub fn disarmed() -> Self {
        Self::armed(-1)
    }

    /// Appends left before the injector fires, if it still can.
    pub fn remaining(&self) -> Option<u64> {
        u64::try_from(self.remaining).ok().filter(|n| *n > 0)
    }

    /// Count one append. Returns true exactly once, when the counter reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining < 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    /// Corrupt a freshly computed digest by flipping its lowest bit.
    pub fn corrupt(digest: &mut Hash) {
        digest.0[0] ^= 0x01;
    }
}

impl Default for FaultInjector {
    fn default() -> Self {
        Self::disarmed()
    }
}
