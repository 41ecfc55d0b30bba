// Raffle Draw Program - Utility Functions
use solana_program::pubkey::Pubkey;

use crate::constants::{CONFIG_SEED, ESCROW_SEED};

/// Find the program derived address of the global config
pub fn find_config_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CONFIG_SEED], program_id)
}

/// Find the program derived address that owns a raffle's prize escrow
pub fn find_escrow_authority(program_id: &Pubkey, raffle: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[ESCROW_SEED, raffle.as_ref()], program_id)
}

/// Token account the prize sits in while the raffle runs
pub fn find_escrow_token_address(program_id: &Pubkey, raffle: &Pubkey, mint: &Pubkey) -> Pubkey {
    let (escrow_authority, _) = find_escrow_authority(program_id, raffle);
    spl_associated_token_account::get_associated_token_address(&escrow_authority, mint)
}
