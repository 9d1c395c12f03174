use serde::Serialize;
use tracing::{debug, info, warn};

use crate::constants::GENESIS_PREVIOUS_HASH;
use crate::error::{IntegrityError, LedgerError, ProofFailure, Result};
use crate::{now_millis, pow, Block, CandidateBlock, LedgerConfig, RecordBatch};

/// The owned chain of sealed blocks plus the pool of records waiting to be mined.
///
/// Mutating operations take `&mut self`; wrap the ledger in a
/// [`crate::SharedLedger`] to share it across threads.
#[derive(Clone, Debug, Serialize)]
pub struct Ledger {
    config: LedgerConfig,
    chain: Vec<Block>,
    unconfirmed_transactions: Vec<RecordBatch>,
}

/// A transaction-free block with the sentinel predecessor hash. Not mined.
pub fn genesis_block(timestamp: u64) -> Block {
    Block::new(0, GENESIS_PREVIOUS_HASH, vec![], timestamp, 0)
}

/// A new ledger at the default difficulty, holding only the genesis block.
pub fn create_ledger() -> Ledger {
    Ledger::new()
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::from_valid_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: LedgerConfig) -> Self {
        let genesis = genesis_block(now_millis());
        debug!("created genesis block {}", genesis.block_hash());
        Self {
            config,
            chain: vec![genesis],
            unconfirmed_transactions: Vec::new(),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    /// Queue a record batch for the next mined block. Contents are not inspected.
    pub fn add_transaction(&mut self, batch: RecordBatch) {
        self.unconfirmed_transactions.push(batch);
        debug!(
            "queued batch, {} pending",
            self.unconfirmed_transactions.len()
        );
    }

    pub fn pending(&self) -> &[RecordBatch] {
        &self.unconfirmed_transactions
    }

    pub fn tip(&self) -> &Block {
        // The genesis block is never removed.
        &self.chain[self.chain.len() - 1]
    }

    /// Index of the tip block.
    pub fn height(&self) -> u64 {
        self.tip().index()
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false: the genesis block is never removed.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn block(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.chain.get(i))
    }

    /// Read-only traversal from genesis to tip.
    pub fn blocks(&self) -> std::slice::Iter<'_, Block> {
        self.chain.iter()
    }

    /// Build the next candidate on top of the current tip from the whole pool.
    pub fn candidate(&self) -> Result<CandidateBlock> {
        if self.unconfirmed_transactions.is_empty() {
            return Err(LedgerError::EmptyPool);
        }
        let tip = self.tip();
        let candidate = CandidateBlock::new(
            tip.index() + 1,
            tip.block_hash(),
            self.unconfirmed_transactions.clone(),
            now_millis(),
        );
        debug!(
            "built candidate {} with {} batches on {}",
            candidate.index(),
            self.unconfirmed_transactions.len(),
            tip.block_hash()
        );
        Ok(candidate)
    }

    /// Seal the pending pool into a new block and append it.
    ///
    /// Returns the new block's index. On any error the chain and the pool are
    /// left untouched.
    pub fn mine(&mut self) -> Result<u64> {
        let candidate = match self.candidate() {
            Ok(candidate) => candidate,
            Err(err) => {
                debug!("mine skipped: {}", err);
                return Err(err);
            }
        };
        let difficulty = self.difficulty();
        let block = if self.config.parallel_mining {
            pow::mine_parallel(candidate, difficulty)
        } else {
            pow::mine(candidate, difficulty)
        };
        self.add_block(block)
    }

    /// Admission check: the block must extend the current tip, carry a hash
    /// that is both its own recomputed digest and meets the difficulty, and
    /// hold exactly the oldest pending batches. On success only those batches
    /// leave the pool.
    pub fn add_block(&mut self, block: Block) -> Result<u64> {
        if let Err(err) = self.admit(&block) {
            warn!("rejected block {}: {}", block.index(), err);
            return Err(err);
        }
        let index = block.index();
        info!("appended block {} with hash {}", index, block.block_hash());
        let sealed = block.transactions().len();
        self.chain.push(block);
        self.unconfirmed_transactions.drain(..sealed);
        Ok(index)
    }

    fn admit(&self, block: &Block) -> Result<()> {
        let tip = self.tip();
        if block.previous_block_hash() != tip.block_hash() {
            return Err(LedgerError::StaleTip {
                expected: tip.block_hash().to_owned(),
                found: block.previous_block_hash().to_owned(),
            });
        }
        if block.index() != tip.index() + 1 {
            return Err(LedgerError::UnexpectedIndex {
                expected: tip.index() + 1,
                found: block.index(),
            });
        }
        let difficulty = self.difficulty();
        if !pow::hex_meets_difficulty(block.block_hash(), difficulty) {
            return Err(LedgerError::InvalidProof {
                hash: block.block_hash().to_owned(),
                reason: ProofFailure::InsufficientWork { difficulty },
            });
        }
        if !block.has_valid_hash() {
            return Err(LedgerError::InvalidProof {
                hash: block.block_hash().to_owned(),
                reason: ProofFailure::HashMismatch,
            });
        }
        let batches = block.transactions();
        if batches.is_empty() || !self.unconfirmed_transactions.starts_with(batches) {
            return Err(LedgerError::PoolMismatch {
                pending: self.unconfirmed_transactions.len(),
                found: batches.len(),
            });
        }
        Ok(())
    }

    /// True when every block's recorded predecessor hash equals the stored
    /// hash of the block before it. Stored hashes are trusted; see
    /// [`Ledger::verify`] for the check that recomputes them.
    pub fn chain_is_intact(&self) -> bool {
        self.chain
            .windows(2)
            .all(|pair| pair[1].previous_block_hash() == pair[0].block_hash())
    }

    /// Full check of every block: position matches index, stored hash matches
    /// the recomputed digest, linkage holds and mined blocks meet the
    /// difficulty. Reports the first defect.
    pub fn verify(&self) -> Result<(), IntegrityError> {
        let difficulty = self.difficulty();
        let mut previous: Option<&Block> = None;

        for (position, block) in self.chain.iter().enumerate() {
            let position = position as u64;
            if block.index() != position {
                return Err(IntegrityError::IndexMismatch {
                    position,
                    index: block.index(),
                });
            }

            let computed = block.compute_hash();
            if computed != block.block_hash() {
                return Err(IntegrityError::HashMismatch {
                    index: position,
                    stored: block.block_hash().to_owned(),
                    computed,
                });
            }

            let expected = previous.map_or(GENESIS_PREVIOUS_HASH, |prev| prev.block_hash());
            if block.previous_block_hash() != expected {
                return Err(IntegrityError::BrokenLink {
                    index: position,
                    expected: expected.to_owned(),
                    found: block.previous_block_hash().to_owned(),
                });
            }

            if previous.is_some() && !pow::hex_meets_difficulty(block.block_hash(), difficulty) {
                return Err(IntegrityError::InsufficientWork {
                    index: position,
                    hash: block.block_hash().to_owned(),
                    difficulty,
                });
            }
            previous = Some(block);
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        match self.verify() {
            Ok(()) => true,
            Err(err) => {
                warn!("integrity check failed: {}", err);
                false
            }
        }
    }
}
