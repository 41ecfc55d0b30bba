// Raffle Draw Program
// NFT raffle winner selection: oracle randomness, committed participant
// list, weighted draw and a bounded claim window

pub mod constants;
pub mod error;
pub mod escrow;
pub mod events;
pub mod instruction;
pub mod lifecycle;
pub mod oracle;
pub mod processor;
pub mod selection;
pub mod state;
pub mod utils;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;

use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, msg, pubkey::Pubkey,
};

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    processor::Processor::process(program_id, accounts, instruction_data).map_err(|error| {
        msg!("Instruction failed: {}", error);
        error
    })
}
