use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::pow::meets_difficulty;
use crate::{merkle_root, Hash, RecordBatch};

fn serialize_hex<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(hash))
}

/// Linkage metadata of a block. The merkle root commits the header to the
/// block's transactions, so hashing the header covers every block field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockHeader {
    pub index: u64,
    pub previous_block_hash: String,
    #[serde(serialize_with = "serialize_hex")]
    pub merkle_root: Hash,
    pub timestamp: u64,
    pub nonce: u64,
}

impl BlockHeader {
    pub fn new(
        index: u64,
        previous_block_hash: impl Into<String>,
        merkle_root: Hash,
        timestamp: u64,
        nonce: u64,
    ) -> Self {
        Self {
            index,
            previous_block_hash: previous_block_hash.into(),
            merkle_root,
            timestamp,
            nonce,
        }
    }

    pub fn hash_bytes(&self) -> Vec<u8> {
        let prev = self.previous_block_hash.as_bytes();
        let mut bytes = Vec::with_capacity(8 + 8 + prev.len() + 32 + 8 + 8);
        bytes.extend_from_slice(&self.index.to_le_bytes());
        bytes.extend_from_slice(&(prev.len() as u64).to_le_bytes());
        bytes.extend_from_slice(prev);
        bytes.extend_from_slice(&self.merkle_root);
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        bytes
    }

    /// Hasher primed with every header field except the trailing nonce.
    pub(crate) fn prefix_hasher(&self) -> Sha256 {
        let bytes = self.hash_bytes();
        let mut hasher = Sha256::new();
        hasher.update(&bytes[..bytes.len() - 8]);
        hasher
    }

    pub fn hash(&self) -> Hash {
        hash_with_nonce(&self.prefix_hasher(), self.nonce)
    }
}

pub(crate) fn hash_with_nonce(prefix: &Sha256, nonce: u64) -> Hash {
    let mut hasher = prefix.clone();
    hasher.update(nonce.to_le_bytes());
    hasher.finalize().into()
}

/// A block under construction. Only the nonce may change; [`CandidateBlock::seal`]
/// freezes it into a [`Block`].
#[derive(Clone, Debug)]
pub struct CandidateBlock {
    header: BlockHeader,
    transactions: Vec<RecordBatch>,
}

impl CandidateBlock {
    pub fn new(
        index: u64,
        previous_block_hash: impl Into<String>,
        transactions: Vec<RecordBatch>,
        timestamp: u64,
    ) -> Self {
        let header = BlockHeader::new(
            index,
            previous_block_hash,
            merkle_root(&transactions),
            timestamp,
            0,
        );
        Self {
            header,
            transactions,
        }
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn index(&self) -> u64 {
        self.header.index
    }

    pub fn previous_block_hash(&self) -> &str {
        &self.header.previous_block_hash
    }

    pub fn nonce(&self) -> u64 {
        self.header.nonce
    }

    pub fn set_nonce(&mut self, nonce: u64) {
        self.header.nonce = nonce;
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Whether the hash at the current nonce satisfies `difficulty`.
    pub fn meets(&self, difficulty: u32) -> bool {
        meets_difficulty(&self.hash(), difficulty)
    }

    pub fn seal(self) -> Block {
        let block_hash = hex::encode(self.header.hash());
        Block {
            header: self.header,
            transactions: self.transactions,
            block_hash,
        }
    }
}

/// A sealed block. Fields are read-only so the stored hash always matches
/// the contents it was computed from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Block {
    #[serde(flatten)]
    header: BlockHeader,
    transactions: Vec<RecordBatch>,
    block_hash: String,
}

impl Block {
    pub fn new(
        index: u64,
        previous_block_hash: impl Into<String>,
        transactions: Vec<RecordBatch>,
        timestamp: u64,
        nonce: u64,
    ) -> Self {
        let mut candidate =
            CandidateBlock::new(index, previous_block_hash, transactions, timestamp);
        candidate.set_nonce(nonce);
        candidate.seal()
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn index(&self) -> u64 {
        self.header.index
    }

    pub fn previous_block_hash(&self) -> &str {
        &self.header.previous_block_hash
    }

    pub fn transactions(&self) -> &[RecordBatch] {
        &self.transactions
    }

    pub fn timestamp(&self) -> u64 {
        self.header.timestamp
    }

    pub fn nonce(&self) -> u64 {
        self.header.nonce
    }

    pub fn block_hash(&self) -> &str {
        &self.block_hash
    }

    /// Recompute the digest from the current field values, rebuilding the
    /// merkle root from the transactions rather than trusting the header.
    pub fn compute_hash(&self) -> String {
        let header = BlockHeader {
            merkle_root: merkle_root(&self.transactions),
            ..self.header.clone()
        };
        hex::encode(header.hash())
    }

    pub fn has_valid_hash(&self) -> bool {
        self.compute_hash() == self.block_hash
    }

    #[cfg(test)]
    pub(crate) fn transactions_mut(&mut self) -> &mut Vec<RecordBatch> {
        &mut self.transactions
    }

    #[cfg(test)]
    pub(crate) fn with_forged_hash(mut self, block_hash: impl Into<String>) -> Self {
        self.block_hash = block_hash.into();
        self
    }
}
