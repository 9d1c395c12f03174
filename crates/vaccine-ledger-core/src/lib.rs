//! Append-only ledger of vaccination records, hash-chained and sealed with a
//! small proof-of-work rule.
//!
//! Records are accumulated in a pending pool and periodically mined into
//! [`Block`]s owned by a [`Ledger`]. [`Ledger::chain_is_intact`] checks the
//! hash linkage; [`Ledger::verify`] additionally recomputes every block hash.

pub mod block;
pub mod config;
pub mod constants;
pub mod error;
pub mod ledger;
pub mod mine;
pub mod shared;

pub use block::{Block, BlockHeader, CandidateBlock};
pub use config::LedgerConfig;
pub use error::{IntegrityError, LedgerError, ProofFailure};
pub use ledger::{create_ledger, genesis_block, Ledger};
pub use shared::SharedLedger;

use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

pub type Hash = [u8; 32];

/// One opaque key-value record. Keys are kept sorted, so its JSON form is canonical.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// An ordered batch of records submitted as a single transaction.
pub type RecordBatch = Vec<Record>;

/// Milliseconds since the UNIX epoch, or 0 if the clock reads before it.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn batch_hash(batch: &RecordBatch) -> Hash {
    // String-keyed JSON maps cannot fail to serialize.
    let bytes = serde_json::to_vec(batch).expect("record batch serializes to JSON");
    Sha256::digest(bytes).into()
}

pub fn merkle_root(batches: &[RecordBatch]) -> Hash {
    if batches.is_empty() {
        return [0u8; 32];
    }
    let mut level: Vec<Hash> = batches.iter().map(batch_hash).collect();

    while level.len() > 1 {
        let mut next: Vec<Hash> = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            let (a, b) = if pair.len() == 2 {
                (pair[0], pair[1])
            } else {
                (pair[0], pair[0])
            };
            let mut hasher = Sha256::new();
            hasher.update(a);
            hasher.update(b);
            next.push(hasher.finalize().into());
        }
        level = next;
    }
    level[0]
}

pub mod pow {
    use crate::block::hash_with_nonce;
    use crate::{Block, CandidateBlock, Hash};
    use tracing::info;

    pub use crate::mine::mine_parallel;

    /// Leading zero hex digits of a raw digest.
    pub fn count_leading_zero_nibbles(hash: &Hash) -> u32 {
        let mut total = 0u32;
        for b in hash {
            if *b == 0 {
                total += 2;
            } else {
                if *b < 0x10 {
                    total += 1;
                }
                break;
            }
        }
        total
    }

    pub fn meets_difficulty(hash: &Hash, difficulty: u32) -> bool {
        count_leading_zero_nibbles(hash) >= difficulty
    }

    /// Same predicate over the stored hex form of a hash.
    pub fn hex_meets_difficulty(hash: &str, difficulty: u32) -> bool {
        let difficulty = difficulty as usize;
        hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
    }

    /// Search nonces upward from 0 until the candidate hash has at least
    /// `difficulty` leading zero hex digits, then seal it.
    ///
    /// Never returns for a difficulty above the 64 digits of a hash.
    pub fn mine(mut candidate: CandidateBlock, difficulty: u32) -> Block {
        let prefix = candidate.header().prefix_hasher();
        let mut nonce = 0u64;
        while !meets_difficulty(&hash_with_nonce(&prefix, nonce), difficulty) {
            nonce = nonce.wrapping_add(1);
        }
        candidate.set_nonce(nonce);
        let block = candidate.seal();
        info!(
            "Mined block {} with nonce {} and hash {}",
            block.index(),
            nonce,
            block.block_hash()
        );
        block
    }
}
