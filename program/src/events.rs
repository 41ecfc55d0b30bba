// Raffle Draw Program - Events
//
// Each event is logged as `sol_log_data([discriminator, borsh(event)])` so
// indexers can decode it from transaction logs.
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp, entrypoint::ProgramResult, hash, log::sol_log_data, program_error::ProgramError,
    pubkey::Pubkey,
};

pub trait Event: BorshSerialize {
    const NAME: &'static str;

    /// First 8 bytes of `sha256("event:<NAME>")`
    fn discriminator() -> [u8; 8] {
        let digest = hash::hash(format!("event:{}", Self::NAME).as_bytes()).to_bytes();
        let mut discriminator = [0u8; 8];
        discriminator.copy_from_slice(&digest[..8]);
        discriminator
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct RandomnessRequested {
    pub raffle: Pubkey,
    pub payer: Pubkey,
    pub request_id: u64,
    pub amount_paid: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct RandomnessFulfilled {
    pub raffle: Pubkey,
    pub request_id: u64,
    pub claim_window_start: UnixTimestamp,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct WinnerDetermined {
    pub raffle: Pubkey,
    pub request_id: u64,
    pub winner: Pubkey,
    pub target: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq)]
pub struct PrizeClaimed {
    pub raffle: Pubkey,
    pub winner: Pubkey,
    pub mint: Pubkey,
}

impl Event for RandomnessRequested {
    const NAME: &'static str = "RandomnessRequested";
}

impl Event for RandomnessFulfilled {
    const NAME: &'static str = "RandomnessFulfilled";
}

impl Event for WinnerDetermined {
    const NAME: &'static str = "WinnerDetermined";
}

impl Event for PrizeClaimed {
    const NAME: &'static str = "PrizeClaimed";
}

/// Log an event for off-chain observers
pub fn emit<E: Event>(event: &E) -> ProgramResult {
    let data = event
        .try_to_vec()
        .map_err(|e| ProgramError::BorshIoError(e.to_string()))?;
    sol_log_data(&[&E::discriminator(), &data]);
    Ok(())
}
