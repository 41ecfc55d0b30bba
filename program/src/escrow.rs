// Prize escrow: one NFT per raffle, held by the `["escrow", raffle]` PDA
use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
};
use spl_token::state::{Account as TokenAccount, Mint};

use crate::{
    constants::{ESCROW_SEED, PRIZE_AMOUNT},
    error::RaffleError,
    state::Prize,
};

/// Check the mint is a single-unit, zero-decimal SPL token
pub fn validate_prize_mint(mint_info: &AccountInfo) -> Result<Prize, ProgramError> {
    if mint_info.owner != &spl_token::id() {
        msg!("Prize mint must be owned by the token program");
        return Err(ProgramError::IncorrectProgramId);
    }
    let mint = Mint::unpack(&mint_info.data.borrow())?;
    if mint.decimals != 0 || mint.supply != PRIZE_AMOUNT {
        msg!(
            "Prize mint must have 0 decimals and supply 1, got {} decimals and supply {}",
            mint.decimals,
            mint.supply
        );
        return Err(RaffleError::InvalidPrizeMint.into());
    }
    Ok(Prize {
        token_program: *mint_info.owner,
        mint: *mint_info.key,
    })
}

/// Check the escrow token account is the escrow authority's associated
/// account for the prize mint
pub fn validate_escrow_account(
    escrow_info: &AccountInfo,
    escrow_authority: &Pubkey,
    prize: &Prize,
) -> ProgramResult {
    let expected = spl_associated_token_account::get_associated_token_address(escrow_authority, &prize.mint);
    if *escrow_info.key != expected || escrow_info.owner != &prize.token_program {
        msg!("Escrow must be the associated token account of {}", escrow_authority);
        return Err(RaffleError::InvalidEscrowAccount.into());
    }
    let account = TokenAccount::unpack(&escrow_info.data.borrow())?;
    if account.owner != *escrow_authority || account.mint != prize.mint {
        return Err(RaffleError::InvalidEscrowAccount.into());
    }
    Ok(())
}

/// Check the destination token account belongs to the winner and holds the prize mint
pub fn validate_destination(destination_info: &AccountInfo, winner: &Pubkey, prize: &Prize) -> ProgramResult {
    if destination_info.owner != &prize.token_program {
        return Err(ProgramError::IncorrectProgramId);
    }
    let account = TokenAccount::unpack(&destination_info.data.borrow())?;
    if account.owner != *winner || account.mint != prize.mint {
        msg!("Destination token account must belong to the winner");
        return Err(ProgramError::InvalidAccountData);
    }
    Ok(())
}

/// Move the prize from the owner's token account into escrow
pub fn deposit_prize<'a>(
    token_program_info: &AccountInfo<'a>,
    source_info: &AccountInfo<'a>,
    escrow_info: &AccountInfo<'a>,
    owner_info: &AccountInfo<'a>,
) -> ProgramResult {
    let ix = spl_token::instruction::transfer(
        token_program_info.key,
        source_info.key,
        escrow_info.key,
        owner_info.key,
        &[],
        PRIZE_AMOUNT,
    )?;
    invoke(
        &ix,
        &[
            source_info.clone(),
            escrow_info.clone(),
            owner_info.clone(),
            token_program_info.clone(),
        ],
    )?;

    msg!("Prize deposited into escrow {}", escrow_info.key);
    Ok(())
}

/// Release the prize to the winner, signing as the escrow authority
pub fn transfer_to_winner<'a>(
    token_program_info: &AccountInfo<'a>,
    escrow_info: &AccountInfo<'a>,
    destination_info: &AccountInfo<'a>,
    escrow_authority_info: &AccountInfo<'a>,
    raffle: &Pubkey,
    escrow_bump: u8,
) -> ProgramResult {
    let ix = spl_token::instruction::transfer(
        token_program_info.key,
        escrow_info.key,
        destination_info.key,
        escrow_authority_info.key,
        &[],
        PRIZE_AMOUNT,
    )?;
    invoke_signed(
        &ix,
        &[
            escrow_info.clone(),
            destination_info.clone(),
            escrow_authority_info.clone(),
            token_program_info.clone(),
        ],
        &[&[ESCROW_SEED, raffle.as_ref(), &[escrow_bump]]],
    )?;

    msg!("Prize released to {}", destination_info.key);
    Ok(())
}
