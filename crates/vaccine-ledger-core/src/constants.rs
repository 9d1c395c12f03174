pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const DEFAULT_DIFFICULTY: u32 = 2;
pub const GENESIS_PREVIOUS_HASH: &str = "First Block";
/// Nonces handed to the parallel miner per search window.
pub const NONCE_WINDOW: u64 = 1 << 16;
