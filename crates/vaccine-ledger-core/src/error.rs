use thiserror::Error;

/// Errors from ledger construction, mining and block admission.
///
/// None of these are fatal. A failed `mine` or `add_block` leaves the chain
/// and the pending pool untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("nothing to mine: the pending pool is empty")]
    EmptyPool,

    #[error("stale tip: candidate builds on {found} but the tip is {expected}")]
    StaleTip { expected: String, found: String },

    #[error("block index {found} does not follow the tip, expected {expected}")]
    UnexpectedIndex { expected: u64, found: u64 },

    #[error("block carries {found} batches that are not the head of the {pending} pending")]
    PoolMismatch { pending: usize, found: usize },

    #[error("invalid proof for {hash}: {reason}")]
    InvalidProof { hash: String, reason: ProofFailure },

    #[error("difficulty {difficulty} exceeds the {max} hex digits of a hash")]
    InvalidDifficulty { difficulty: u32, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProofFailure {
    #[error("hash does not have {difficulty} leading zero digits")]
    InsufficientWork { difficulty: u32 },
    #[error("hash does not match the block contents")]
    HashMismatch,
}

/// First defect found by [`crate::Ledger::verify`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("block at position {position} carries index {index}")]
    IndexMismatch { position: u64, index: u64 },

    #[error("block {index} stores hash {stored} but its contents hash to {computed}")]
    HashMismatch {
        index: u64,
        stored: String,
        computed: String,
    },

    #[error("block {index} links to {found}, predecessor hash is {expected}")]
    BrokenLink {
        index: u64,
        expected: String,
        found: String,
    },

    #[error("block {index} hash {hash} misses difficulty {difficulty}")]
    InsufficientWork {
        index: u64,
        hash: String,
        difficulty: u32,
    },
}

pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
