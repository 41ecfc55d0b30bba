// Randomness oracle integration for the raffle draw program
use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    account_info::AccountInfo,
    instruction::{AccountMeta, Instruction},
    msg,
    program::{get_return_data, invoke},
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};

use crate::error::RaffleError;

/// Oracle queue account, owned by the oracle program. Holds the fee schedule
/// and the request counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleQueue {
    pub is_initialized: bool,
    /// Key the oracle signs fulfillments with
    pub authority: Pubkey,
    /// Flat fee per request in lamports
    pub base_fee: u64,
    /// Additional lamports per random word
    pub fee_per_word: u64,
    /// Id handed to the next request
    pub next_request_id: u64,
}

impl OracleQueue {
    /// Price of a request for `num_words` words
    pub fn quote(&self, num_words: u32) -> Option<u64> {
        self.fee_per_word
            .checked_mul(num_words as u64)?
            .checked_add(self.base_fee)
    }
}

impl Sealed for OracleQueue {}

impl IsInitialized for OracleQueue {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for OracleQueue {
    const LEN: usize = 1 + 32 + 8 + 8 + 8;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, OracleQueue::LEN];
        let (is_initialized, authority, base_fee, fee_per_word, next_request_id) =
            array_refs![src, 1, 32, 8, 8, 8];

        Ok(OracleQueue {
            is_initialized: is_initialized[0] != 0,
            authority: Pubkey::new_from_array(*authority),
            base_fee: u64::from_le_bytes(*base_fee),
            fee_per_word: u64::from_le_bytes(*fee_per_word),
            next_request_id: u64::from_le_bytes(*next_request_id),
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, OracleQueue::LEN];
        let (is_initialized_dst, authority_dst, base_fee_dst, fee_per_word_dst, next_request_id_dst) =
            mut_array_refs![dst, 1, 32, 8, 8, 8];

        is_initialized_dst[0] = self.is_initialized as u8;
        authority_dst.copy_from_slice(self.authority.as_ref());
        *base_fee_dst = self.base_fee.to_le_bytes();
        *fee_per_word_dst = self.fee_per_word.to_le_bytes();
        *next_request_id_dst = self.next_request_id.to_le_bytes();
    }
}

/// Instructions understood by the oracle program
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub enum OracleInstruction {
    /// Queue a randomness request. Return data is an [`OracleReceipt`].
    ///
    /// Accounts expected:
    /// 0. `[writable]` The oracle queue
    /// 1. `[]` The requesting account (receives the callback)
    RequestRandomness {
        /// Program the fulfillment callback is sent to
        callback_program: Pubkey,
        /// Compute units granted to the callback
        callback_compute_limit: u32,
        /// Confirmations to wait before answering
        confirmations: u16,
        /// Random words wanted
        num_words: u32,
        /// Oracle-specific options, empty for the default
        extra_args: Vec<u8>,
    },
}

/// What the oracle reports back synchronously for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleReceipt {
    pub request_id: u64,
    pub price: u64,
}

impl OracleReceipt {
    pub const LEN: usize = 16;

    pub fn pack(&self) -> [u8; 16] {
        let mut buf = [0u8; 16];
        buf[..8].copy_from_slice(&self.request_id.to_le_bytes());
        buf[8..].copy_from_slice(&self.price.to_le_bytes());
        buf
    }

    pub fn unpack(data: &[u8]) -> Result<Self, RaffleError> {
        if data.len() != Self::LEN {
            return Err(RaffleError::OracleResponseInvalid);
        }
        let (request_id, price) = array_refs![array_ref![data, 0, 16], 8, 8];
        Ok(Self {
            request_id: u64::from_le_bytes(*request_id),
            price: u64::from_le_bytes(*price),
        })
    }
}

/// Request parameters, fixed per raffle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomnessParams {
    pub callback_compute_limit: u32,
    pub confirmations: u16,
    pub num_words: u32,
}

/// Build the oracle request instruction
pub fn request_randomness_instruction(
    oracle_program: &Pubkey,
    oracle_queue: &Pubkey,
    requester: &Pubkey,
    callback_program: &Pubkey,
    params: &RandomnessParams,
) -> Result<Instruction, ProgramError> {
    let data = OracleInstruction::RequestRandomness {
        callback_program: *callback_program,
        callback_compute_limit: params.callback_compute_limit,
        confirmations: params.confirmations,
        num_words: params.num_words,
        extra_args: Vec::new(),
    }
    .try_to_vec()
    .map_err(|e| ProgramError::BorshIoError(e.to_string()))?;

    Ok(Instruction {
        program_id: *oracle_program,
        accounts: vec![
            AccountMeta::new(*oracle_queue, false),
            AccountMeta::new_readonly(*requester, false),
        ],
        data,
    })
}

/// Read the fee schedule from the oracle queue and price a request
pub fn quote_price(
    oracle_program_info: &AccountInfo,
    oracle_queue_info: &AccountInfo,
    num_words: u32,
) -> Result<u64, ProgramError> {
    if oracle_queue_info.owner != oracle_program_info.key {
        msg!("Oracle queue not owned by the oracle program");
        return Err(ProgramError::IncorrectProgramId);
    }
    let queue = OracleQueue::unpack(&oracle_queue_info.data.borrow())?;
    queue.quote(num_words).ok_or(ProgramError::InvalidArgument)
}

/// Submit the request and return the oracle's receipt
pub fn request_randomness<'a>(
    oracle_program_info: &AccountInfo<'a>,
    oracle_queue_info: &AccountInfo<'a>,
    requester_info: &AccountInfo<'a>,
    callback_program: &Pubkey,
    params: &RandomnessParams,
) -> Result<OracleReceipt, ProgramError> {
    let instruction = request_randomness_instruction(
        oracle_program_info.key,
        oracle_queue_info.key,
        requester_info.key,
        callback_program,
        params,
    )?;
    invoke(
        &instruction,
        &[
            oracle_queue_info.clone(),
            requester_info.clone(),
            oracle_program_info.clone(),
        ],
    )?;

    let (program_id, data) = get_return_data().ok_or(RaffleError::OracleResponseInvalid)?;
    if program_id != *oracle_program_info.key {
        msg!("Return data did not come from the oracle program");
        return Err(RaffleError::OracleResponseInvalid.into());
    }
    let receipt = OracleReceipt::unpack(&data)?;

    msg!(
        "Oracle accepted request {} for {} lamports",
        receipt.request_id,
        receipt.price
    );
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_adds_per_word_fee() {
        let queue = OracleQueue {
            is_initialized: true,
            authority: Pubkey::new_unique(),
            base_fee: 5_000,
            fee_per_word: 1_000,
            next_request_id: 0,
        };
        assert_eq!(queue.quote(1), Some(6_000));
        assert_eq!(queue.quote(3), Some(8_000));

        let greedy = OracleQueue {
            fee_per_word: u64::MAX,
            ..queue
        };
        assert_eq!(greedy.quote(2), None);
    }

    #[test]
    fn receipt_rejects_wrong_length() {
        let receipt = OracleReceipt {
            request_id: 12,
            price: 6_000,
        };
        assert_eq!(OracleReceipt::unpack(&receipt.pack()), Ok(receipt));
        assert_eq!(
            OracleReceipt::unpack(&receipt.pack()[..12]),
            Err(RaffleError::OracleResponseInvalid)
        );
    }

    #[test]
    fn request_instruction_targets_queue() {
        let oracle = Pubkey::new_unique();
        let queue = Pubkey::new_unique();
        let raffle = Pubkey::new_unique();
        let program = Pubkey::new_unique();
        let params = RandomnessParams {
            callback_compute_limit: 200_000,
            confirmations: 3,
            num_words: 1,
        };

        let ix = request_randomness_instruction(&oracle, &queue, &raffle, &program, &params).unwrap();
        assert_eq!(ix.program_id, oracle);
        assert_eq!(ix.accounts[0], AccountMeta::new(queue, false));
        assert_eq!(ix.accounts[1], AccountMeta::new_readonly(raffle, false));
        assert_eq!(
            OracleInstruction::try_from_slice(&ix.data).unwrap(),
            OracleInstruction::RequestRandomness {
                callback_program: program,
                callback_compute_limit: 200_000,
                confirmations: 3,
                num_words: 1,
                extra_args: Vec::new(),
            }
        );
    }
}
