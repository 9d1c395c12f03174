use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DIFFICULTY, HASH_HEX_SIZE};
use crate::error::{LedgerError, Result};

/// Tunables for a [`crate::Ledger`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Required leading `'0'` hex digits in a sealed block hash.
    pub difficulty: u32,
    /// Search nonces on the rayon pool instead of the calling thread.
    pub parallel_mining: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            parallel_mining: false,
        }
    }
}

impl LedgerConfig {
    pub fn with_difficulty(difficulty: u32) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// A difficulty longer than the hex digest can never be met.
    pub fn validate(&self) -> Result<()> {
        let max = HASH_HEX_SIZE as u32;
        if self.difficulty > max {
            return Err(LedgerError::InvalidDifficulty {
                difficulty: self.difficulty,
                max,
            });
        }
        Ok(())
    }
}
