use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};

use crate::constants::{
    DEFAULT_CALLBACK_COMPUTE_LIMIT, DEFAULT_CLAIM_PERIOD, DEFAULT_REQUEST_CONFIRMATIONS,
    NUM_WORDS,
};

const WORDS_LEN: usize = 8 * NUM_WORDS;

/// Program configuration account, a PDA at `["config"]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Admin authority that can update config
    pub admin: Pubkey,
    /// Randomness oracle program receiving request CPIs
    pub oracle_program: Pubkey,
    /// Key the oracle signs fulfillment callbacks with
    pub oracle_authority: Pubkey,
    /// Seconds a winner has to claim after randomness is fulfilled
    pub claim_period: UnixTimestamp,
    /// Compute units the oracle grants the fulfillment callback
    pub callback_compute_limit: u32,
    /// Confirmation depth the oracle waits before answering
    pub request_confirmations: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            is_initialized: false,
            admin: Pubkey::default(),
            oracle_program: Pubkey::default(),
            oracle_authority: Pubkey::default(),
            claim_period: DEFAULT_CLAIM_PERIOD,
            callback_compute_limit: DEFAULT_CALLBACK_COMPUTE_LIMIT,
            request_confirmations: DEFAULT_REQUEST_CONFIRMATIONS,
        }
    }
}

/// One ticket holder in the externally agreed participant ordering.
///
/// Only the commitment hash of the full list lives on chain; the list itself
/// travels in `DetermineWinner` instruction data.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipantEntry {
    /// Ticket holder
    pub address: Pubkey,
    /// Tickets owned by this holder
    pub ticket_count: u64,
    /// Running ticket total up to and including this entry
    pub cumulative_count: u64,
}

impl ParticipantEntry {
    /// Encoded size of one entry
    pub const LEN: usize = 32 + 8 + 8;
}

/// The single NFT a raffle gives away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prize {
    /// Token program that owns the mint
    pub token_program: Pubkey,
    /// Mint of the NFT (supply 1, zero decimals)
    pub mint: Pubkey,
}

/// Oracle request owned by a raffle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomnessRequest {
    /// Identifier the oracle assigned at request time
    pub request_id: u64,
    /// Lamports forwarded to the oracle
    pub amount_paid: u64,
    /// Has the oracle called back
    pub fulfilled: bool,
    words: [u64; NUM_WORDS],
}

impl RandomnessRequest {
    pub fn new(request_id: u64, amount_paid: u64) -> Self {
        Self {
            request_id,
            amount_paid,
            fulfilled: false,
            words: [0; NUM_WORDS],
        }
    }

    /// Random words delivered by the oracle; empty until fulfilled
    pub fn random_words(&self) -> &[u64] {
        if self.fulfilled {
            &self.words
        } else {
            &[]
        }
    }

    pub(crate) fn store_words(&mut self, words: &[u64]) {
        self.words.copy_from_slice(words);
        self.fulfilled = true;
    }
}

/// Raffle account data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Raffle {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Creator of the raffle who deposited the prize
    pub owner: Pubkey,
    /// keccak256 of the borsh-encoded participant list, fixed at creation
    pub commitment: [u8; 32],
    /// Prize held in escrow
    pub prize: Prize,
    /// Token account holding the prize, owned by the escrow PDA
    pub escrow: Pubkey,
    /// Bump of the escrow authority PDA
    pub escrow_bump: u8,
    /// Set once the prize has left escrow
    pub prize_claimed: bool,
    /// Oracle program snapshotted from config
    pub oracle_program: Pubkey,
    /// Only signer allowed to deliver randomness
    pub oracle_authority: Pubkey,
    /// Claim window length in seconds
    pub claim_period: UnixTimestamp,
    /// Compute units granted to the fulfillment callback
    pub callback_compute_limit: u32,
    /// Oracle confirmation depth
    pub request_confirmations: u16,
    /// Current randomness request, if any was ever made
    pub request: Option<RandomnessRequest>,
    /// Winner of the current cycle, `Pubkey::default()` until determined
    pub winner: Pubkey,
    /// Fulfillment time of the current request
    pub claim_window_start: UnixTimestamp,
}

impl Raffle {
    /// Winner of the current request cycle
    pub fn winner(&self) -> Option<Pubkey> {
        if self.winner == Pubkey::default() {
            None
        } else {
            Some(self.winner)
        }
    }

    pub fn request(&self) -> Option<&RandomnessRequest> {
        self.request.as_ref()
    }

    pub fn prize(&self) -> &Prize {
        &self.prize
    }
}

impl Sealed for Raffle {}
impl Sealed for Config {}

impl IsInitialized for Raffle {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl IsInitialized for Config {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for Raffle {
    const LEN: usize = 1 + 32 + 32 + 32 + 32 + 32 + 1 + 1 + 32 + 32 + 8 + 4 + 2 // setup
        + 1 + 8 + 8 + 1 + WORDS_LEN // request
        + 32 + 8; // winner record

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, Raffle::LEN];
        let (
            is_initialized,
            owner,
            commitment,
            prize_token_program,
            prize_mint,
            escrow,
            escrow_bump,
            prize_claimed,
            oracle_program,
            oracle_authority,
            claim_period,
            callback_compute_limit,
            request_confirmations,
            has_request,
            request_id,
            amount_paid,
            fulfilled,
            words,
            winner,
            claim_window_start,
        ) = array_refs![
            src, 1, 32, 32, 32, 32, 32, 1, 1, 32, 32, 8, 4, 2, 1, 8, 8, 1, WORDS_LEN, 32, 8
        ];

        let request = match has_request[0] {
            0 => None,
            1 => {
                let mut request = RandomnessRequest::new(
                    u64::from_le_bytes(*request_id),
                    u64::from_le_bytes(*amount_paid),
                );
                for (word, chunk) in request.words.iter_mut().zip(words.chunks_exact(8)) {
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(chunk);
                    *word = u64::from_le_bytes(bytes);
                }
                request.fulfilled = unpack_bool(fulfilled)?;
                Some(request)
            }
            _ => return Err(ProgramError::InvalidAccountData),
        };

        Ok(Raffle {
            is_initialized: unpack_bool(is_initialized)?,
            owner: Pubkey::new_from_array(*owner),
            commitment: *commitment,
            prize: Prize {
                token_program: Pubkey::new_from_array(*prize_token_program),
                mint: Pubkey::new_from_array(*prize_mint),
            },
            escrow: Pubkey::new_from_array(*escrow),
            escrow_bump: escrow_bump[0],
            prize_claimed: unpack_bool(prize_claimed)?,
            oracle_program: Pubkey::new_from_array(*oracle_program),
            oracle_authority: Pubkey::new_from_array(*oracle_authority),
            claim_period: UnixTimestamp::from_le_bytes(*claim_period),
            callback_compute_limit: u32::from_le_bytes(*callback_compute_limit),
            request_confirmations: u16::from_le_bytes(*request_confirmations),
            request,
            winner: Pubkey::new_from_array(*winner),
            claim_window_start: UnixTimestamp::from_le_bytes(*claim_window_start),
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, Raffle::LEN];
        let (
            is_initialized_dst,
            owner_dst,
            commitment_dst,
            prize_token_program_dst,
            prize_mint_dst,
            escrow_dst,
            escrow_bump_dst,
            prize_claimed_dst,
            oracle_program_dst,
            oracle_authority_dst,
            claim_period_dst,
            callback_compute_limit_dst,
            request_confirmations_dst,
            has_request_dst,
            request_id_dst,
            amount_paid_dst,
            fulfilled_dst,
            words_dst,
            winner_dst,
            claim_window_start_dst,
        ) = mut_array_refs![
            dst, 1, 32, 32, 32, 32, 32, 1, 1, 32, 32, 8, 4, 2, 1, 8, 8, 1, WORDS_LEN, 32, 8
        ];

        is_initialized_dst[0] = self.is_initialized as u8;
        owner_dst.copy_from_slice(self.owner.as_ref());
        commitment_dst.copy_from_slice(&self.commitment);
        prize_token_program_dst.copy_from_slice(self.prize.token_program.as_ref());
        prize_mint_dst.copy_from_slice(self.prize.mint.as_ref());
        escrow_dst.copy_from_slice(self.escrow.as_ref());
        escrow_bump_dst[0] = self.escrow_bump;
        prize_claimed_dst[0] = self.prize_claimed as u8;
        oracle_program_dst.copy_from_slice(self.oracle_program.as_ref());
        oracle_authority_dst.copy_from_slice(self.oracle_authority.as_ref());
        *claim_period_dst = self.claim_period.to_le_bytes();
        *callback_compute_limit_dst = self.callback_compute_limit.to_le_bytes();
        *request_confirmations_dst = self.request_confirmations.to_le_bytes();

        match &self.request {
            Some(request) => {
                has_request_dst[0] = 1;
                *request_id_dst = request.request_id.to_le_bytes();
                *amount_paid_dst = request.amount_paid.to_le_bytes();
                fulfilled_dst[0] = request.fulfilled as u8;
                for (chunk, word) in words_dst.chunks_exact_mut(8).zip(request.words.iter()) {
                    chunk.copy_from_slice(&word.to_le_bytes());
                }
            }
            None => {
                has_request_dst[0] = 0;
                *request_id_dst = [0; 8];
                *amount_paid_dst = [0; 8];
                fulfilled_dst[0] = 0;
                *words_dst = [0; WORDS_LEN];
            }
        }

        winner_dst.copy_from_slice(self.winner.as_ref());
        *claim_window_start_dst = self.claim_window_start.to_le_bytes();
    }
}

impl Pack for Config {
    const LEN: usize = 1 + 32 + 32 + 32 + 8 + 4 + 2;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, Config::LEN];
        let (
            is_initialized,
            admin,
            oracle_program,
            oracle_authority,
            claim_period,
            callback_compute_limit,
            request_confirmations,
        ) = array_refs![src, 1, 32, 32, 32, 8, 4, 2];

        Ok(Config {
            is_initialized: unpack_bool(is_initialized)?,
            admin: Pubkey::new_from_array(*admin),
            oracle_program: Pubkey::new_from_array(*oracle_program),
            oracle_authority: Pubkey::new_from_array(*oracle_authority),
            claim_period: UnixTimestamp::from_le_bytes(*claim_period),
            callback_compute_limit: u32::from_le_bytes(*callback_compute_limit),
            request_confirmations: u16::from_le_bytes(*request_confirmations),
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, Config::LEN];
        let (
            is_initialized_dst,
            admin_dst,
            oracle_program_dst,
            oracle_authority_dst,
            claim_period_dst,
            callback_compute_limit_dst,
            request_confirmations_dst,
        ) = mut_array_refs![dst, 1, 32, 32, 32, 8, 4, 2];

        is_initialized_dst[0] = self.is_initialized as u8;
        admin_dst.copy_from_slice(self.admin.as_ref());
        oracle_program_dst.copy_from_slice(self.oracle_program.as_ref());
        oracle_authority_dst.copy_from_slice(self.oracle_authority.as_ref());
        *claim_period_dst = self.claim_period.to_le_bytes();
        *callback_compute_limit_dst = self.callback_compute_limit.to_le_bytes();
        *request_confirmations_dst = self.request_confirmations.to_le_bytes();
    }
}

fn unpack_bool(src: &[u8; 1]) -> Result<bool, ProgramError> {
    match src[0] {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(ProgramError::InvalidAccountData),
    }
}
