use solana_program::{
    account_info::{next_account_info, AccountInfo},
    clock::UnixTimestamp,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    system_instruction,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

use crate::{
    constants::{CONFIG_SEED, NUM_WORDS},
    error::RaffleError,
    escrow,
    events::{self, PrizeClaimed, RandomnessFulfilled, RandomnessRequested, WinnerDetermined},
    instruction::RaffleInstruction,
    oracle::{self, RandomnessParams},
    state::{Config, ParticipantEntry, Raffle},
    utils::{find_config_address, find_escrow_authority},
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)?;

        match instruction {
            RaffleInstruction::InitializeConfig {
                oracle_program,
                oracle_authority,
                claim_period,
                callback_compute_limit,
                request_confirmations,
            } => {
                msg!("Instruction: Initialize Config");
                let config = Config {
                    is_initialized: true,
                    admin: Pubkey::default(),
                    oracle_program,
                    oracle_authority,
                    claim_period,
                    callback_compute_limit,
                    request_confirmations,
                };
                Self::process_initialize_config(accounts, config, program_id)
            }
            RaffleInstruction::UpdateOracle {
                oracle_program,
                oracle_authority,
            } => {
                msg!("Instruction: Update Oracle");
                Self::process_update_config(accounts, program_id, |config| {
                    config.oracle_program = oracle_program;
                    config.oracle_authority = oracle_authority;
                    Ok(())
                })
            }
            RaffleInstruction::UpdateClaimPeriod { claim_period } => {
                msg!("Instruction: Update Claim Period");
                Self::process_update_config(accounts, program_id, |config| {
                    validate_claim_period(claim_period)?;
                    config.claim_period = claim_period;
                    Ok(())
                })
            }
            RaffleInstruction::UpdateRequestParams {
                callback_compute_limit,
                request_confirmations,
            } => {
                msg!("Instruction: Update Request Params");
                Self::process_update_config(accounts, program_id, |config| {
                    config.callback_compute_limit = callback_compute_limit;
                    config.request_confirmations = request_confirmations;
                    Ok(())
                })
            }
            RaffleInstruction::InitializeRaffle { commitment } => {
                msg!("Instruction: Initialize Raffle");
                Self::process_initialize_raffle(accounts, commitment, program_id)
            }
            RaffleInstruction::RequestRandomness { max_fee } => {
                msg!("Instruction: Request Randomness");
                Self::process_request_randomness(accounts, max_fee, program_id)
            }
            RaffleInstruction::FulfillRandomness {
                request_id,
                random_words,
            } => {
                msg!("Instruction: Fulfill Randomness");
                Self::process_fulfill_randomness(accounts, request_id, &random_words, program_id)
            }
            RaffleInstruction::DetermineWinner { participants } => {
                msg!("Instruction: Determine Winner");
                Self::process_determine_winner(accounts, &participants, program_id)
            }
            RaffleInstruction::ClaimPrize {} => {
                msg!("Instruction: Claim Prize");
                Self::process_claim_prize(accounts, program_id)
            }
        }
    }

    /// Creates the config PDA on first use and writes the initial settings.
    /// The signer becomes the admin.
    fn process_initialize_config(
        accounts: &[AccountInfo],
        mut config: Config,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !admin_info.is_signer {
            msg!("Admin must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let (expected_config_pubkey, bump_seed) = find_config_address(program_id);
        if *config_info.key != expected_config_pubkey {
            msg!("Invalid config account address");
            return Err(ProgramError::InvalidArgument);
        }

        validate_claim_period(config.claim_period)?;

        if config_info.owner != program_id {
            msg!("Creating new config account");
            let rent = Rent::get()?;
            invoke_signed(
                &system_instruction::create_account(
                    admin_info.key,
                    config_info.key,
                    rent.minimum_balance(Config::LEN),
                    Config::LEN as u64,
                    program_id,
                ),
                &[
                    admin_info.clone(),
                    config_info.clone(),
                    system_program_info.clone(),
                ],
                &[&[CONFIG_SEED, &[bump_seed]]],
            )?;
        } else if Config::unpack_unchecked(&config_info.data.borrow())?.is_initialized {
            msg!("Config account is already initialized");
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        config.admin = *admin_info.key;
        Config::pack(config, &mut config_info.data.borrow_mut())?;

        msg!(
            "Config initialized: Admin={}, Oracle={}, OracleAuthority={}, ClaimPeriod={}s",
            config.admin,
            config.oracle_program,
            config.oracle_authority,
            config.claim_period
        );
        Ok(())
    }

    /// Loads the config, checks the admin signature, applies `update`
    fn process_update_config<F>(accounts: &[AccountInfo], program_id: &Pubkey, update: F) -> ProgramResult
    where
        F: FnOnce(&mut Config) -> ProgramResult,
    {
        let account_info_iter = &mut accounts.iter();
        let admin_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;

        if !admin_info.is_signer {
            msg!("Admin must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if config_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut config = Config::unpack(&config_info.data.borrow())?;
        if config.admin != *admin_info.key {
            msg!("Only the admin can update the config");
            return Err(RaffleError::NotConfigAdmin.into());
        }

        update(&mut config)?;
        Config::pack(config, &mut config_info.data.borrow_mut())?;

        msg!("Config updated by {}", admin_info.key);
        Ok(())
    }

    fn process_initialize_raffle(
        accounts: &[AccountInfo],
        commitment: [u8; 32],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let owner_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let mint_info = next_account_info(account_info_iter)?;
        let owner_token_info = next_account_info(account_info_iter)?;
        let escrow_info = next_account_info(account_info_iter)?;
        let escrow_authority_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;

        if !owner_info.is_signer {
            msg!("Raffle owner must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }
        if Raffle::unpack_unchecked(&raffle_info.data.borrow())?.is_initialized {
            msg!("Raffle account is already initialized");
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        let (expected_config_pubkey, _) = find_config_address(program_id);
        if *config_info.key != expected_config_pubkey || config_info.owner != program_id {
            msg!("Invalid config account");
            return Err(ProgramError::InvalidArgument);
        }
        let config = Config::unpack(&config_info.data.borrow())?;

        let prize = escrow::validate_prize_mint(mint_info)?;
        if token_program_info.key != &prize.token_program {
            return Err(ProgramError::IncorrectProgramId);
        }
        let (escrow_authority, escrow_bump) = find_escrow_authority(program_id, raffle_info.key);
        if *escrow_authority_info.key != escrow_authority {
            msg!("Invalid escrow authority");
            return Err(ProgramError::InvalidSeeds);
        }
        escrow::validate_escrow_account(escrow_info, &escrow_authority, &prize)?;
        escrow::deposit_prize(token_program_info, owner_token_info, escrow_info, owner_info)?;

        let raffle = Raffle {
            is_initialized: true,
            owner: *owner_info.key,
            commitment,
            prize,
            escrow: *escrow_info.key,
            escrow_bump,
            prize_claimed: false,
            oracle_program: config.oracle_program,
            oracle_authority: config.oracle_authority,
            claim_period: config.claim_period,
            callback_compute_limit: config.callback_compute_limit,
            request_confirmations: config.request_confirmations,
            request: None,
            winner: Pubkey::default(),
            claim_window_start: 0,
        };
        Raffle::pack(raffle, &mut raffle_info.data.borrow_mut())?;

        msg!(
            "Raffle initialized: Raffle={}, Prize={}, ClaimPeriod={}s",
            raffle_info.key,
            prize.mint,
            raffle.claim_period
        );
        Ok(())
    }

    /// Collects `max_fee` from the payer, forwards the quoted price to the
    /// oracle queue, submits the request and refunds the rest.
    fn process_request_randomness(
        accounts: &[AccountInfo],
        max_fee: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let payer_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let oracle_program_info = next_account_info(account_info_iter)?;
        let oracle_queue_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !payer_info.is_signer {
            msg!("Payer must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by the program");
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::unpack(&raffle_info.data.borrow())?;
        let now = current_time()?;
        raffle.ensure_request_slot_free(now)?;

        if raffle.oracle_program != *oracle_program_info.key {
            msg!("Oracle program does not match the one registered with this raffle");
            return Err(ProgramError::IncorrectProgramId);
        }

        let params = RandomnessParams {
            callback_compute_limit: raffle.callback_compute_limit,
            confirmations: raffle.request_confirmations,
            num_words: NUM_WORDS as u32,
        };
        let price = oracle::quote_price(oracle_program_info, oracle_queue_info, params.num_words)?;
        msg!("Oracle quote: {} lamports, payer offers {}", price, max_fee);

        if price > max_fee || payer_info.lamports() < max_fee {
            msg!(
                "Insufficient funds: quote {} lamports, offered {}, balance {}",
                price,
                max_fee,
                payer_info.lamports()
            );
            return Err(RaffleError::InsufficientFunds.into());
        }

        invoke(
            &system_instruction::transfer(payer_info.key, raffle_info.key, max_fee),
            &[
                payer_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;
        move_lamports(raffle_info, oracle_queue_info, price)?;

        let receipt = oracle::request_randomness(
            oracle_program_info,
            oracle_queue_info,
            raffle_info,
            program_id,
            &params,
        )?;
        if receipt.price != price {
            msg!("Oracle charged {} lamports but quoted {}", receipt.price, price);
            return Err(RaffleError::OracleQuoteMismatch.into());
        }

        let change = max_fee - price;
        if change > 0 {
            move_lamports(raffle_info, payer_info, change)?;
            msg!("Refunded {} lamports to {}", change, payer_info.key);
        }

        raffle.record_request(receipt.request_id, price);
        Raffle::pack(raffle, &mut raffle_info.data.borrow_mut())?;

        events::emit(&RandomnessRequested {
            raffle: *raffle_info.key,
            payer: *payer_info.key,
            request_id: receipt.request_id,
            amount_paid: price,
        })?;
        msg!(
            "Randomness requested: Raffle={}, RequestId={}, Paid={}",
            raffle_info.key,
            receipt.request_id,
            price
        );
        Ok(())
    }

    fn process_fulfill_randomness(
        accounts: &[AccountInfo],
        request_id: u64,
        random_words: &[u64],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let oracle_authority_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        if raffle_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }
        let mut raffle = Raffle::unpack(&raffle_info.data.borrow())?;

        if !oracle_authority_info.is_signer || *oracle_authority_info.key != raffle.oracle_authority {
            msg!("Fulfillment must be signed by the oracle authority");
            return Err(RaffleError::UnauthorizedCallback.into());
        }

        let now = current_time()?;
        raffle.fulfill(request_id, random_words, now)?;
        Raffle::pack(raffle, &mut raffle_info.data.borrow_mut())?;

        events::emit(&RandomnessFulfilled {
            raffle: *raffle_info.key,
            request_id,
            claim_window_start: now,
        })?;
        msg!(
            "Randomness fulfilled: Raffle={}, RequestId={}, ClaimWindowStart={}",
            raffle_info.key,
            request_id,
            now
        );
        Ok(())
    }

    fn process_determine_winner(
        accounts: &[AccountInfo],
        participants: &[ParticipantEntry],
        program_id: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        // Anyone can draw; the result only depends on committed data
        if !caller_info.is_signer {
            msg!("Initiator must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if raffle_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::unpack(&raffle_info.data.borrow())?;
        let draw = raffle.determine_winner(participants)?;
        Raffle::pack(raffle, &mut raffle_info.data.borrow_mut())?;

        let request_id = raffle.request().map(|r| r.request_id).unwrap_or_default();
        let winner = participants[draw.index].address;
        events::emit(&WinnerDetermined {
            raffle: *raffle_info.key,
            request_id,
            winner,
            target: draw.target,
        })?;
        msg!(
            "Winner determined: Raffle={}, Winner={}, Target={}, Index={}",
            raffle_info.key,
            winner,
            draw.target,
            draw.index
        );
        Ok(())
    }

    fn process_claim_prize(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let winner_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let escrow_info = next_account_info(account_info_iter)?;
        let escrow_authority_info = next_account_info(account_info_iter)?;
        let destination_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;

        if !winner_info.is_signer {
            msg!("Winner must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if raffle_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut raffle = Raffle::unpack(&raffle_info.data.borrow())?;
        let now = current_time()?;
        let winner = raffle.authorize_claim(winner_info.key, now)?;

        if *escrow_info.key != raffle.escrow {
            return Err(RaffleError::InvalidEscrowAccount.into());
        }
        if *token_program_info.key != raffle.prize.token_program {
            return Err(ProgramError::IncorrectProgramId);
        }
        escrow::validate_destination(destination_info, &winner, &raffle.prize)?;
        escrow::transfer_to_winner(
            token_program_info,
            escrow_info,
            destination_info,
            escrow_authority_info,
            raffle_info.key,
            raffle.escrow_bump,
        )?;

        raffle.prize_claimed = true;
        Raffle::pack(raffle, &mut raffle_info.data.borrow_mut())?;

        events::emit(&PrizeClaimed {
            raffle: *raffle_info.key,
            winner,
            mint: raffle.prize.mint,
        })?;
        msg!("Prize claimed: Raffle={}, Winner={}", raffle_info.key, winner);
        Ok(())
    }
}

fn current_time() -> Result<UnixTimestamp, ProgramError> {
    Ok(Clock::get()?.unix_timestamp)
}

fn validate_claim_period(claim_period: UnixTimestamp) -> ProgramResult {
    if claim_period <= 0 {
        msg!("Claim period must be positive, got {}", claim_period);
        return Err(RaffleError::InvalidClaimPeriod.into());
    }
    Ok(())
}

/// Debit a program-owned account and credit another
fn move_lamports(from: &AccountInfo, to: &AccountInfo, amount: u64) -> ProgramResult {
    let from_balance = from
        .lamports()
        .checked_sub(amount)
        .ok_or(RaffleError::InsufficientFunds)?;
    let to_balance = to
        .lamports()
        .checked_add(amount)
        .ok_or(ProgramError::InvalidArgument)?;
    **from.try_borrow_mut_lamports()? = from_balance;
    **to.try_borrow_mut_lamports()? = to_balance;
    Ok(())
}
