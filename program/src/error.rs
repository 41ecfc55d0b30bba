use solana_program::{decode_error::DecodeError, program_error::ProgramError};
use thiserror::Error;

/// Errors that may be returned by the raffle draw program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// Invalid instruction data passed
    #[error("Invalid instruction data")]
    InvalidInstructionData,

    /// A randomness request is outstanding or its claim window is still open
    #[error("Randomness request already pending")]
    RandomnessAlreadyPending,

    /// No fulfilled randomness to draw from
    #[error("Randomness not ready")]
    RandomnessNotReady,

    /// Participant list does not hash to the stored commitment
    #[error("Participant list does not match commitment")]
    CommitmentMismatch,

    /// No winner has been determined for the current request
    #[error("Winner not set")]
    WinnerNotSet,

    /// Signer is not the recorded winner
    #[error("Caller is not the winner")]
    CallerNotWinner,

    /// The claim window for the current winner has closed
    #[error("Claim period elapsed")]
    ClaimPeriodElapsed,

    /// The prize has already left escrow
    #[error("Prize already claimed")]
    PrizeAlreadyClaimed,

    /// Insufficient funds for operation
    #[error("Insufficient funds for operation")]
    InsufficientFunds,

    /// Fulfillment arrived while no request exists
    #[error("No randomness request recorded")]
    NoRandomnessRequest,

    /// Fulfillment is for a different request
    #[error("Request id does not match current request")]
    RequestIdMismatch,

    /// Fulfillment carried the wrong number of words
    #[error("Invalid random words")]
    InvalidRandomWords,

    /// Fulfillment was not signed by the trusted oracle authority
    #[error("Callback not signed by oracle authority")]
    UnauthorizedCallback,

    /// Participant list is empty or carries no tickets
    #[error("Participant list is empty")]
    EmptyParticipants,

    /// Oracle charged a different price than it quoted
    #[error("Oracle price does not match quote")]
    OracleQuoteMismatch,

    /// Oracle returned no or malformed request data
    #[error("Oracle response invalid")]
    OracleResponseInvalid,

    /// Only the config admin can perform this action
    #[error("Only the config admin can perform this action")]
    NotConfigAdmin,

    /// Escrow account is not the escrow authority's token account for the prize
    #[error("Invalid escrow account")]
    InvalidEscrowAccount,

    /// Prize mint is not a single-unit NFT
    #[error("Invalid prize mint")]
    InvalidPrizeMint,

    /// Claim period must be positive
    #[error("Invalid claim period")]
    InvalidClaimPeriod,
}

impl From<RaffleError> for ProgramError {
    fn from(e: RaffleError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for RaffleError {
    fn type_of() -> &'static str {
        "Raffle Draw Error"
    }
}
