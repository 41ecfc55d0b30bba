// Raffle Draw Program - Instructions
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::{
    error::RaffleError,
    state::ParticipantEntry,
    utils::{find_config_address, find_escrow_authority, find_escrow_token_address},
};

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub enum RaffleInstruction {
    /// Initialize the global config
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The admin account, pays for the config account
    /// 1. `[writable]` The config account (PDA)
    /// 2. `[]` The system program
    InitializeConfig {
        oracle_program: Pubkey,
        oracle_authority: Pubkey,
        /// Claim window length in seconds
        claim_period: UnixTimestamp,
        callback_compute_limit: u32,
        request_confirmations: u16,
    },

    /// Point new raffles at a different oracle (admin only)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The admin authority
    /// 1. `[writable]` Config account
    UpdateOracle {
        oracle_program: Pubkey,
        oracle_authority: Pubkey,
    },

    /// Update the claim window for new raffles (admin only)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The admin authority
    /// 1. `[writable]` Config account
    UpdateClaimPeriod { claim_period: UnixTimestamp },

    /// Update oracle request parameters for new raffles (admin only)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The admin authority
    /// 1. `[writable]` Config account
    UpdateRequestParams {
        callback_compute_limit: u32,
        request_confirmations: u16,
    },

    /// Create a raffle and lock its NFT prize in escrow
    ///
    /// Accounts expected:
    /// 0. `[signer]` The raffle owner, holder of the prize
    /// 1. `[writable]` The raffle account (pre-created, owned by this program)
    /// 2. `[]` Config account
    /// 3. `[]` The prize mint
    /// 4. `[writable]` Owner's token account holding the prize
    /// 5. `[writable]` Escrow token account (ATA of the escrow authority)
    /// 6. `[]` Escrow authority PDA
    /// 7. `[]` The token program
    InitializeRaffle {
        /// keccak256 of the borsh-encoded participant list
        commitment: [u8; 32],
    },

    /// Pay the oracle and request one random word
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The payer
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The oracle program
    /// 3. `[writable]` The oracle queue
    /// 4. `[]` The system program
    RequestRandomness {
        /// Most the payer is willing to spend; the unused part is refunded
        max_fee: u64,
    },

    /// Oracle callback delivering randomness
    ///
    /// Accounts expected:
    /// 0. `[signer]` The oracle authority
    /// 1. `[writable]` The raffle account
    FulfillRandomness {
        request_id: u64,
        random_words: Vec<u64>,
    },

    /// Draw the winner from the committed participant list
    ///
    /// Accounts expected:
    /// 0. `[signer]` Any user
    /// 1. `[writable]` The raffle account
    DetermineWinner { participants: Vec<ParticipantEntry> },

    /// Winner collects the prize
    ///
    /// Accounts expected:
    /// 0. `[signer]` The winner
    /// 1. `[writable]` The raffle account
    /// 2. `[writable]` Escrow token account
    /// 3. `[]` Escrow authority PDA
    /// 4. `[writable]` Winner's token account for the prize mint
    /// 5. `[]` The token program
    ClaimPrize {},
}

impl RaffleInstruction {
    /// Unpacks a byte buffer into a RaffleInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        Self::try_from_slice(input).map_err(|_| RaffleError::InvalidInstructionData.into())
    }

    /// Packs a RaffleInstruction into a byte buffer
    pub fn pack(&self) -> Result<Vec<u8>, ProgramError> {
        self.try_to_vec()
            .map_err(|e| ProgramError::BorshIoError(e.to_string()))
    }
}

/// Create initialize_config instruction
pub fn initialize_config(
    program_id: &Pubkey,
    admin: &Pubkey,
    oracle_program: &Pubkey,
    oracle_authority: &Pubkey,
    claim_period: UnixTimestamp,
    callback_compute_limit: u32,
    request_confirmations: u16,
) -> Result<Instruction, ProgramError> {
    let (config_account, _) = find_config_address(program_id);
    let data = RaffleInstruction::InitializeConfig {
        oracle_program: *oracle_program,
        oracle_authority: *oracle_authority,
        claim_period,
        callback_compute_limit,
        request_confirmations,
    }
    .pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*admin, true),
            AccountMeta::new(config_account, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    })
}

fn admin_instruction(
    program_id: &Pubkey,
    admin: &Pubkey,
    instruction: RaffleInstruction,
) -> Result<Instruction, ProgramError> {
    let (config_account, _) = find_config_address(program_id);
    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*admin, true),
            AccountMeta::new(config_account, false),
        ],
        data: instruction.pack()?,
    })
}

/// Create update_oracle instruction
pub fn update_oracle(
    program_id: &Pubkey,
    admin: &Pubkey,
    oracle_program: &Pubkey,
    oracle_authority: &Pubkey,
) -> Result<Instruction, ProgramError> {
    admin_instruction(
        program_id,
        admin,
        RaffleInstruction::UpdateOracle {
            oracle_program: *oracle_program,
            oracle_authority: *oracle_authority,
        },
    )
}

/// Create update_claim_period instruction
pub fn update_claim_period(
    program_id: &Pubkey,
    admin: &Pubkey,
    claim_period: UnixTimestamp,
) -> Result<Instruction, ProgramError> {
    admin_instruction(
        program_id,
        admin,
        RaffleInstruction::UpdateClaimPeriod { claim_period },
    )
}

/// Create update_request_params instruction
pub fn update_request_params(
    program_id: &Pubkey,
    admin: &Pubkey,
    callback_compute_limit: u32,
    request_confirmations: u16,
) -> Result<Instruction, ProgramError> {
    admin_instruction(
        program_id,
        admin,
        RaffleInstruction::UpdateRequestParams {
            callback_compute_limit,
            request_confirmations,
        },
    )
}

/// Create initialize_raffle instruction
pub fn initialize_raffle(
    program_id: &Pubkey,
    owner: &Pubkey,
    raffle_account: &Pubkey,
    prize_mint: &Pubkey,
    owner_token_account: &Pubkey,
    commitment: [u8; 32],
) -> Result<Instruction, ProgramError> {
    let (config_account, _) = find_config_address(program_id);
    let (escrow_authority, _) = find_escrow_authority(program_id, raffle_account);
    let escrow = find_escrow_token_address(program_id, raffle_account, prize_mint);
    let data = RaffleInstruction::InitializeRaffle { commitment }.pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new(*raffle_account, false),
            AccountMeta::new_readonly(config_account, false),
            AccountMeta::new_readonly(*prize_mint, false),
            AccountMeta::new(*owner_token_account, false),
            AccountMeta::new(escrow, false),
            AccountMeta::new_readonly(escrow_authority, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data,
    })
}

/// Create request_randomness instruction
pub fn request_randomness(
    program_id: &Pubkey,
    payer: &Pubkey,
    raffle_account: &Pubkey,
    oracle_program: &Pubkey,
    oracle_queue: &Pubkey,
    max_fee: u64,
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::RequestRandomness { max_fee }.pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(*raffle_account, false),
            AccountMeta::new_readonly(*oracle_program, false),
            AccountMeta::new(*oracle_queue, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    })
}

/// Create fulfill_randomness instruction (sent by the oracle)
pub fn fulfill_randomness(
    program_id: &Pubkey,
    oracle_authority: &Pubkey,
    raffle_account: &Pubkey,
    request_id: u64,
    random_words: Vec<u64>,
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::FulfillRandomness {
        request_id,
        random_words,
    }
    .pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*oracle_authority, true),
            AccountMeta::new(*raffle_account, false),
        ],
        data,
    })
}

/// Create determine_winner instruction
pub fn determine_winner(
    program_id: &Pubkey,
    caller: &Pubkey,
    raffle_account: &Pubkey,
    participants: Vec<ParticipantEntry>,
) -> Result<Instruction, ProgramError> {
    let data = RaffleInstruction::DetermineWinner { participants }.pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*caller, true),
            AccountMeta::new(*raffle_account, false),
        ],
        data,
    })
}

/// Create claim_prize instruction
pub fn claim_prize(
    program_id: &Pubkey,
    winner: &Pubkey,
    raffle_account: &Pubkey,
    prize_mint: &Pubkey,
    winner_token_account: &Pubkey,
) -> Result<Instruction, ProgramError> {
    let (escrow_authority, _) = find_escrow_authority(program_id, raffle_account);
    let escrow = find_escrow_token_address(program_id, raffle_account, prize_mint);
    let data = RaffleInstruction::ClaimPrize {}.pack()?;

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*winner, true),
            AccountMeta::new(*raffle_account, false),
            AccountMeta::new(escrow, false),
            AccountMeta::new_readonly(escrow_authority, false),
            AccountMeta::new(*winner_token_account, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data,
    })
}
