use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::{IntegrityError, Result};
use crate::{Ledger, RecordBatch};

/// Cloneable, thread-safe handle to one [`Ledger`].
///
/// Mutations take the write lock for their whole duration, so a `mine` call
/// drains the pool and appends its block without any `add_transaction` or
/// second `mine` interleaving. Reads share the lock with each other.
#[derive(Clone, Debug, Default)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    pub fn add_transaction(&self, batch: RecordBatch) {
        self.inner.write().add_transaction(batch);
    }

    /// Blocks the calling thread for the whole proof-of-work search.
    pub fn mine(&self) -> Result<u64> {
        self.inner.write().mine()
    }

    pub fn chain_is_intact(&self) -> bool {
        self.inner.read().chain_is_intact()
    }

    pub fn verify(&self) -> Result<(), IntegrityError> {
        self.inner.read().verify()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.inner.read().pending().len()
    }

    /// Run `f` against the ledger under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.inner.read())
    }

    /// Detached copy of the current ledger state.
    pub fn snapshot(&self) -> Ledger {
        self.inner.read().clone()
    }
}
