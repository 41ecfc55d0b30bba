// Raffle Draw Program - Constants
use solana_program::clock::UnixTimestamp;

/// Seed of the global config PDA
pub const CONFIG_SEED: &[u8] = b"config";

/// Seed of the per-raffle escrow authority PDA
pub const ESCROW_SEED: &[u8] = b"escrow";

/// Random words requested per draw (single-word randomness)
pub const NUM_WORDS: usize = 1;

/// Default claim window: 7 days
pub const DEFAULT_CLAIM_PERIOD: UnixTimestamp = 7 * 24 * 60 * 60;

/// Default compute budget the oracle grants the fulfillment callback
pub const DEFAULT_CALLBACK_COMPUTE_LIMIT: u32 = 200_000;

/// Default confirmation depth before the oracle answers
pub const DEFAULT_REQUEST_CONFIRMATIONS: u16 = 3;

/// Prize NFTs are single-unit, zero-decimal mints
pub const PRIZE_AMOUNT: u64 = 1;
