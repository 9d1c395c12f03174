use crate::block::hash_with_nonce;
use crate::constants::NONCE_WINDOW;
use crate::pow::meets_difficulty;
use crate::{Block, CandidateBlock};
use rayon::prelude::*;
use tracing::{debug, info};

/// Mines a candidate by searching nonces in parallel, one window of
/// [`NONCE_WINDOW`] nonces at a time.
///
/// Within a window `find_first` keeps the lowest qualifying nonce, and windows
/// are visited in ascending order, so the result is the same nonce that
/// [`crate::pow::mine`] finds sequentially.
pub fn mine_parallel(mut candidate: CandidateBlock, difficulty: u32) -> Block {
    let prefix = candidate.header().prefix_hasher();

    let mut start = 0u64;
    let found = loop {
        let end = start.saturating_add(NONCE_WINDOW);
        let hit = (start..end)
            .into_par_iter()
            .find_first(|nonce| meets_difficulty(&hash_with_nonce(&prefix, *nonce), difficulty));
        if let Some(nonce) = hit {
            break nonce;
        }
        debug!(
            "no qualifying nonce in {}..{} for block {}",
            start,
            end,
            candidate.index()
        );
        start = if end == u64::MAX { 0 } else { end };
    };

    candidate.set_nonce(found);
    let block = candidate.seal();
    info!(
        "Mined block {} with nonce {} and hash {} (parallel)",
        block.index(),
        found,
        block.block_hash()
    );
    block
}
