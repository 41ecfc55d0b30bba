use borsh::BorshDeserialize;
use solana_program::{
    account_info::AccountInfo,
    clock::{Clock, UnixTimestamp},
    entrypoint::ProgramResult,
    instruction::{Instruction, InstructionError},
    program::set_return_data,
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    system_instruction, system_program,
};
use solana_program_test::*;
use solana_sdk::{
    account::Account,
    signature::{Keypair, Signer},
    transaction::{Transaction, TransactionError},
};
use spl_token::{
    error::TokenError,
    state::{Account as TokenAccount, Mint},
};

use raffle_draw::{
    error::RaffleError,
    instruction,
    lifecycle::RafflePhase,
    oracle::{OracleInstruction, OracleQueue, OracleReceipt},
    process_instruction,
    selection::commitment_hash,
    state::{Config, ParticipantEntry, Raffle},
    utils::{find_config_address, find_escrow_authority, find_escrow_token_address},
};

const CLAIM_PERIOD: UnixTimestamp = 3_600;
const BASE_FEE: u64 = 5_000;
const FEE_PER_WORD: u64 = 1_000;
const QUOTE: u64 = BASE_FEE + FEE_PER_WORD;
const FIRST_REQUEST_ID: u64 = 7;
const T0: UnixTimestamp = 1_700_000_000;
const TICKETS: [u64; 3] = [2, 5, 3];

/// Stand-in oracle: bumps the queue counter and reports id and price
fn process_mock_oracle(_program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    let OracleInstruction::RequestRandomness { num_words, .. } =
        OracleInstruction::try_from_slice(data).map_err(|_| ProgramError::InvalidInstructionData)?;
    let queue_info = &accounts[0];
    let mut queue = OracleQueue::unpack(&queue_info.data.borrow())?;
    let receipt = OracleReceipt {
        request_id: queue.next_request_id,
        price: queue.quote(num_words).ok_or(ProgramError::InvalidArgument)?,
    };
    queue.next_request_id += 1;
    OracleQueue::pack(queue, &mut queue_info.data.borrow_mut())?;
    set_return_data(&receipt.pack());
    Ok(())
}

struct Fixture {
    context: ProgramTestContext,
    program_id: Pubkey,
    oracle_program: Pubkey,
    oracle_queue: Pubkey,
    oracle_authority: Keypair,
    owner: Keypair,
    requester: Keypair,
    raffle: Keypair,
    mint: Pubkey,
    holders: Vec<Keypair>,
    ledger: Vec<ParticipantEntry>,
}

fn funded_account(lamports: u64) -> Account {
    Account::new(lamports, 0, &system_program::id())
}

async fn setup() -> Fixture {
    let program_id = Pubkey::new_unique();
    let oracle_program = Pubkey::new_unique();
    let oracle_queue = Pubkey::new_unique();
    let oracle_authority = Keypair::new();
    let owner = Keypair::new();
    let requester = Keypair::new();

    let mut program_test = ProgramTest::new("raffle_draw", program_id, processor!(process_instruction));
    program_test.add_program("mock_oracle", oracle_program, processor!(process_mock_oracle));

    let mut queue_data = vec![0u8; OracleQueue::LEN];
    OracleQueue::pack(
        OracleQueue {
            is_initialized: true,
            authority: oracle_authority.pubkey(),
            base_fee: BASE_FEE,
            fee_per_word: FEE_PER_WORD,
            next_request_id: FIRST_REQUEST_ID,
        },
        &mut queue_data,
    )
    .unwrap();
    program_test.add_account(
        oracle_queue,
        Account {
            lamports: 1_000_000_000,
            data: queue_data,
            owner: oracle_program,
            executable: false,
            rent_epoch: 0,
        },
    );
    program_test.add_account(owner.pubkey(), funded_account(10_000_000_000));
    program_test.add_account(requester.pubkey(), funded_account(1_000_000_000));

    let holders: Vec<Keypair> = TICKETS.iter().map(|_| Keypair::new()).collect();
    let mut cumulative_count = 0;
    let ledger: Vec<ParticipantEntry> = holders
        .iter()
        .zip(TICKETS.iter())
        .map(|(holder, &ticket_count)| {
            cumulative_count += ticket_count;
            ParticipantEntry {
                address: holder.pubkey(),
                ticket_count,
                cumulative_count,
            }
        })
        .collect();

    let context = program_test.start_with_context().await;
    let mut fixture = Fixture {
        context,
        program_id,
        oracle_program,
        oracle_queue,
        oracle_authority,
        owner,
        requester,
        raffle: Keypair::new(),
        mint: Pubkey::default(),
        holders,
        ledger,
    };

    initialize_config(&mut fixture).await;
    fixture.mint = create_prize(&mut fixture).await;
    initialize_raffle(&mut fixture).await;
    fixture
}

async fn process(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    let mut all_signers = vec![&context.payer];
    all_signers.extend_from_slice(signers);
    let transaction = Transaction::new_signed_with_payer(
        instructions,
        Some(&context.payer.pubkey()),
        &all_signers,
        context.last_blockhash,
    );
    context.banks_client.process_transaction(transaction).await
}

fn assert_raffle_error(result: Result<(), BanksClientError>, expected: RaffleError) {
    match result.unwrap_err().unwrap() {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
            assert_eq!(code, expected as u32, "expected {:?}", expected)
        }
        other => panic!("expected {:?}, got {:?}", expected, other),
    }
}

async fn set_time(context: &mut ProgramTestContext, unix_timestamp: UnixTimestamp) {
    let mut clock: Clock = context.banks_client.get_sysvar().await.unwrap();
    clock.unix_timestamp = unix_timestamp;
    context.set_sysvar(&clock);
}

async fn initialize_config(fixture: &mut Fixture) {
    let ix = instruction::initialize_config(
        &fixture.program_id,
        &fixture.context.payer.pubkey(),
        &fixture.oracle_program,
        &fixture.oracle_authority.pubkey(),
        CLAIM_PERIOD,
        200_000,
        3,
    )
    .unwrap();
    process(&mut fixture.context, &[ix], &[]).await.unwrap();
}

/// Mint a 1-of-1 NFT into the owner's associated token account. The owner
/// keeps the freeze authority.
async fn create_prize(fixture: &mut Fixture) -> Pubkey {
    let mint = Keypair::new();
    let payer = fixture.context.payer.pubkey();
    let owner = fixture.owner.pubkey();
    let rent = fixture.context.banks_client.get_rent().await.unwrap();
    let owner_ata = spl_associated_token_account::get_associated_token_address(&owner, &mint.pubkey());

    let instructions = [
        system_instruction::create_account(
            &payer,
            &mint.pubkey(),
            rent.minimum_balance(Mint::LEN),
            Mint::LEN as u64,
            &spl_token::id(),
        ),
        spl_token::instruction::initialize_mint(&spl_token::id(), &mint.pubkey(), &owner, Some(&owner), 0).unwrap(),
        spl_associated_token_account::instruction::create_associated_token_account(
            &payer,
            &owner,
            &mint.pubkey(),
            &spl_token::id(),
        ),
        spl_token::instruction::mint_to(&spl_token::id(), &mint.pubkey(), &owner_ata, &owner, &[], 1).unwrap(),
    ];
    let owner_kp = Keypair::from_bytes(&fixture.owner.to_bytes()).unwrap();
    process(&mut fixture.context, &instructions, &[&mint, &owner_kp])
        .await
        .unwrap();
    mint.pubkey()
}

async fn create_token_account(fixture: &mut Fixture, wallet: &Pubkey) -> Pubkey {
    let ix = spl_associated_token_account::instruction::create_associated_token_account(
        &fixture.context.payer.pubkey(),
        wallet,
        &fixture.mint,
        &spl_token::id(),
    );
    process(&mut fixture.context, &[ix], &[]).await.unwrap();
    spl_associated_token_account::get_associated_token_address(wallet, &fixture.mint)
}

async fn initialize_raffle(fixture: &mut Fixture) {
    let raffle = fixture.raffle.pubkey();
    let (escrow_authority, _) = find_escrow_authority(&fixture.program_id, &raffle);
    create_token_account(fixture, &escrow_authority).await;

    let rent = fixture.context.banks_client.get_rent().await.unwrap();
    let owner = fixture.owner.pubkey();
    let owner_ata = spl_associated_token_account::get_associated_token_address(&owner, &fixture.mint);
    let instructions = [
        system_instruction::create_account(
            &fixture.context.payer.pubkey(),
            &raffle,
            rent.minimum_balance(Raffle::LEN),
            Raffle::LEN as u64,
            &fixture.program_id,
        ),
        instruction::initialize_raffle(
            &fixture.program_id,
            &owner,
            &raffle,
            &fixture.mint,
            &owner_ata,
            commitment_hash(&fixture.ledger),
        )
        .unwrap(),
    ];
    let raffle_kp = Keypair::from_bytes(&fixture.raffle.to_bytes()).unwrap();
    let owner_kp = Keypair::from_bytes(&fixture.owner.to_bytes()).unwrap();
    process(&mut fixture.context, &instructions, &[&raffle_kp, &owner_kp])
        .await
        .unwrap();
}

async fn load_raffle(fixture: &mut Fixture) -> Raffle {
    let account = fixture
        .context
        .banks_client
        .get_account(fixture.raffle.pubkey())
        .await
        .unwrap()
        .unwrap();
    Raffle::unpack(&account.data).unwrap()
}

async fn lamports(fixture: &mut Fixture, address: &Pubkey) -> u64 {
    fixture
        .context
        .banks_client
        .get_account(*address)
        .await
        .unwrap()
        .unwrap()
        .lamports
}

async fn token_balance(fixture: &mut Fixture, address: &Pubkey) -> u64 {
    let account = fixture
        .context
        .banks_client
        .get_account(*address)
        .await
        .unwrap()
        .unwrap();
    TokenAccount::unpack(&account.data).unwrap().amount
}

async fn request(fixture: &mut Fixture, max_fee: u64) -> Result<(), BanksClientError> {
    let ix = instruction::request_randomness(
        &fixture.program_id,
        &fixture.requester.pubkey(),
        &fixture.raffle.pubkey(),
        &fixture.oracle_program,
        &fixture.oracle_queue,
        max_fee,
    )
    .unwrap();
    let requester = Keypair::from_bytes(&fixture.requester.to_bytes()).unwrap();
    process(&mut fixture.context, &[ix], &[&requester]).await
}

async fn fulfill(
    fixture: &mut Fixture,
    signer: &Keypair,
    request_id: u64,
    word: u64,
) -> Result<(), BanksClientError> {
    let ix = instruction::fulfill_randomness(
        &fixture.program_id,
        &signer.pubkey(),
        &fixture.raffle.pubkey(),
        request_id,
        vec![word],
    )
    .unwrap();
    process(&mut fixture.context, &[ix], &[signer]).await
}

async fn oracle_fulfill(fixture: &mut Fixture, request_id: u64, word: u64) -> Result<(), BanksClientError> {
    let authority = Keypair::from_bytes(&fixture.oracle_authority.to_bytes()).unwrap();
    fulfill(fixture, &authority, request_id, word).await
}

async fn determine(fixture: &mut Fixture, participants: Vec<ParticipantEntry>) -> Result<(), BanksClientError> {
    let ix = instruction::determine_winner(
        &fixture.program_id,
        &fixture.context.payer.pubkey(),
        &fixture.raffle.pubkey(),
        participants,
    )
    .unwrap();
    process(&mut fixture.context, &[ix], &[]).await
}

async fn claim(fixture: &mut Fixture, holder: usize, destination: &Pubkey) -> Result<(), BanksClientError> {
    let signer = Keypair::from_bytes(&fixture.holders[holder].to_bytes()).unwrap();
    let ix = instruction::claim_prize(
        &fixture.program_id,
        &signer.pubkey(),
        &fixture.raffle.pubkey(),
        &fixture.mint,
        destination,
    )
    .unwrap();
    process(&mut fixture.context, &[ix], &[&signer]).await
}

#[tokio::test]
async fn test_initialize_config_and_raffle() {
    let mut fixture = setup().await;

    let (config_pubkey, _) = find_config_address(&fixture.program_id);
    let config_account = fixture
        .context
        .banks_client
        .get_account(config_pubkey)
        .await
        .unwrap()
        .unwrap();
    let config = Config::unpack(&config_account.data).unwrap();
    assert_eq!(config.admin, fixture.context.payer.pubkey());
    assert_eq!(config.oracle_program, fixture.oracle_program);
    assert_eq!(config.oracle_authority, fixture.oracle_authority.pubkey());
    assert_eq!(config.claim_period, CLAIM_PERIOD);

    let raffle = load_raffle(&mut fixture).await;
    assert!(raffle.is_initialized);
    assert_eq!(raffle.owner, fixture.owner.pubkey());
    assert_eq!(raffle.commitment, commitment_hash(&fixture.ledger));
    assert_eq!(raffle.prize().mint, fixture.mint);
    assert_eq!(raffle.prize().token_program, spl_token::id());
    assert_eq!(raffle.claim_period, CLAIM_PERIOD);
    assert_eq!(raffle.phase(T0), RafflePhase::NoRequest);

    let escrow = find_escrow_token_address(&fixture.program_id, &fixture.raffle.pubkey(), &fixture.mint);
    assert_eq!(raffle.escrow, escrow);
    assert_eq!(token_balance(&mut fixture, &escrow).await, 1);
}

#[tokio::test]
async fn test_full_draw_and_claim() {
    let mut fixture = setup().await;
    let requester = fixture.requester.pubkey();
    let queue = fixture.oracle_queue;
    let requester_before = lamports(&mut fixture, &requester).await;
    let queue_before = lamports(&mut fixture, &queue).await;

    request(&mut fixture, 10_000).await.unwrap();

    // only the quote is kept, the rest of max_fee comes back
    assert_eq!(lamports(&mut fixture, &requester).await, requester_before - QUOTE);
    assert_eq!(lamports(&mut fixture, &queue).await, queue_before + QUOTE);
    let raffle = load_raffle(&mut fixture).await;
    let pending = raffle.request().unwrap();
    assert_eq!(pending.request_id, FIRST_REQUEST_ID);
    assert_eq!(pending.amount_paid, QUOTE);
    assert!(!pending.fulfilled);
    assert!(pending.random_words().is_empty());

    set_time(&mut fixture.context, T0).await;
    // 15 % 10 = 5 -> cumulative [2, 7, 10] -> second holder
    oracle_fulfill(&mut fixture, FIRST_REQUEST_ID, 15).await.unwrap();
    let raffle = load_raffle(&mut fixture).await;
    assert_eq!(raffle.claim_window_start, T0);
    assert_eq!(raffle.request().unwrap().random_words(), &[15]);
    assert_eq!(raffle.phase(T0), RafflePhase::Fulfilled);

    let ledger = fixture.ledger.clone();
    determine(&mut fixture, ledger).await.unwrap();
    let raffle = load_raffle(&mut fixture).await;
    assert_eq!(raffle.winner(), Some(fixture.holders[1].pubkey()));

    let loser = fixture.holders[0].pubkey();
    let loser_ata = create_token_account(&mut fixture, &loser).await;
    assert_raffle_error(
        claim(&mut fixture, 0, &loser_ata).await,
        RaffleError::CallerNotWinner,
    );

    let winner = fixture.holders[1].pubkey();
    let winner_ata = create_token_account(&mut fixture, &winner).await;
    set_time(&mut fixture.context, T0 + CLAIM_PERIOD - 1).await;
    claim(&mut fixture, 1, &winner_ata).await.unwrap();

    assert_eq!(token_balance(&mut fixture, &winner_ata).await, 1);
    let escrow = find_escrow_token_address(&fixture.program_id, &fixture.raffle.pubkey(), &fixture.mint);
    assert_eq!(token_balance(&mut fixture, &escrow).await, 0);
    let raffle = load_raffle(&mut fixture).await;
    assert!(raffle.prize_claimed);
    assert_eq!(raffle.phase(T0), RafflePhase::Claimed);
}

#[tokio::test]
async fn test_second_request_while_pending_fails() {
    let mut fixture = setup().await;
    request(&mut fixture, QUOTE).await.unwrap();
    assert_raffle_error(
        request(&mut fixture, QUOTE + 1).await,
        RaffleError::RandomnessAlreadyPending,
    );
}

#[tokio::test]
async fn test_request_below_quote_fails() {
    let mut fixture = setup().await;
    assert_raffle_error(
        request(&mut fixture, QUOTE - 1).await,
        RaffleError::InsufficientFunds,
    );
    assert!(load_raffle(&mut fixture).await.request().is_none());
}

#[tokio::test]
async fn test_fulfill_requires_oracle_authority() {
    let mut fixture = setup().await;
    request(&mut fixture, QUOTE).await.unwrap();

    let impostor = Keypair::new();
    assert_raffle_error(
        fulfill(&mut fixture, &impostor, FIRST_REQUEST_ID, 3).await,
        RaffleError::UnauthorizedCallback,
    );
    assert_raffle_error(
        oracle_fulfill(&mut fixture, FIRST_REQUEST_ID + 1, 3).await,
        RaffleError::RequestIdMismatch,
    );
    assert!(!load_raffle(&mut fixture).await.request().unwrap().fulfilled);
}

#[tokio::test]
async fn test_determine_winner_checks_randomness_and_commitment() {
    let mut fixture = setup().await;
    request(&mut fixture, QUOTE).await.unwrap();

    let ledger = fixture.ledger.clone();
    assert_raffle_error(
        determine(&mut fixture, ledger.clone()).await,
        RaffleError::RandomnessNotReady,
    );

    oracle_fulfill(&mut fixture, FIRST_REQUEST_ID, 4).await.unwrap();
    let mut forged = ledger;
    forged.swap(0, 2);
    assert_raffle_error(
        determine(&mut fixture, forged).await,
        RaffleError::CommitmentMismatch,
    );
    assert_eq!(load_raffle(&mut fixture).await.winner(), None);
}

#[tokio::test]
async fn test_expired_claim_recycles_request() {
    let mut fixture = setup().await;
    request(&mut fixture, QUOTE).await.unwrap();
    set_time(&mut fixture.context, T0).await;
    oracle_fulfill(&mut fixture, FIRST_REQUEST_ID, 15).await.unwrap();
    let ledger = fixture.ledger.clone();
    determine(&mut fixture, ledger.clone()).await.unwrap();

    let first_winner = fixture.holders[1].pubkey();
    let first_ata = create_token_account(&mut fixture, &first_winner).await;
    set_time(&mut fixture.context, T0 + CLAIM_PERIOD + 1).await;
    assert_raffle_error(
        claim(&mut fixture, 1, &first_ata).await,
        RaffleError::ClaimPeriodElapsed,
    );
    assert_eq!(
        load_raffle(&mut fixture).await.phase(T0 + CLAIM_PERIOD + 1),
        RafflePhase::Expired
    );

    request(&mut fixture, QUOTE + 500).await.unwrap();
    let raffle = load_raffle(&mut fixture).await;
    assert_eq!(raffle.request().unwrap().request_id, FIRST_REQUEST_ID + 1);
    assert!(!raffle.request().unwrap().fulfilled);

    let t1 = T0 + 2 * CLAIM_PERIOD;
    set_time(&mut fixture.context, t1).await;
    // 0 % 10 = 0 -> first holder
    oracle_fulfill(&mut fixture, FIRST_REQUEST_ID + 1, 0).await.unwrap();
    let raffle = load_raffle(&mut fixture).await;
    assert_eq!(raffle.winner(), None);
    assert_eq!(raffle.claim_window_start, t1);

    determine(&mut fixture, ledger).await.unwrap();
    let second_winner = fixture.holders[0].pubkey();
    assert_eq!(load_raffle(&mut fixture).await.winner(), Some(second_winner));

    let second_ata = create_token_account(&mut fixture, &second_winner).await;
    set_time(&mut fixture.context, t1 + CLAIM_PERIOD).await;
    claim(&mut fixture, 0, &second_ata).await.unwrap();
    assert_eq!(token_balance(&mut fixture, &second_ata).await, 1);
}

#[tokio::test]
async fn test_config_updates_are_admin_only() {
    let mut fixture = setup().await;
    let outsider = Keypair::from_bytes(&fixture.owner.to_bytes()).unwrap();

    let ix = instruction::update_claim_period(&fixture.program_id, &outsider.pubkey(), 60).unwrap();
    assert_raffle_error(
        process(&mut fixture.context, &[ix], &[&outsider]).await,
        RaffleError::NotConfigAdmin,
    );

    let admin = fixture.context.payer.pubkey();
    let ix = instruction::update_claim_period(&fixture.program_id, &admin, 0).unwrap();
    assert_raffle_error(
        process(&mut fixture.context, &[ix], &[]).await,
        RaffleError::InvalidClaimPeriod,
    );

    let new_authority = Pubkey::new_unique();
    let instructions = [
        instruction::update_claim_period(&fixture.program_id, &admin, 60).unwrap(),
        instruction::update_oracle(&fixture.program_id, &admin, &fixture.oracle_program, &new_authority).unwrap(),
        instruction::update_request_params(&fixture.program_id, &admin, 100_000, 5).unwrap(),
    ];
    process(&mut fixture.context, &instructions, &[]).await.unwrap();

    let (config_pubkey, _) = find_config_address(&fixture.program_id);
    let account = fixture
        .context
        .banks_client
        .get_account(config_pubkey)
        .await
        .unwrap()
        .unwrap();
    let config = Config::unpack(&account.data).unwrap();
    assert_eq!(config.claim_period, 60);
    assert_eq!(config.oracle_authority, new_authority);
    assert_eq!(config.callback_compute_limit, 100_000);
    assert_eq!(config.request_confirmations, 5);

    // raffles keep the settings they were created with
    assert_eq!(load_raffle(&mut fixture).await.claim_period, CLAIM_PERIOD);
}

#[tokio::test]
async fn test_expired_winner_cannot_claim_while_next_request_pending() {
    let mut fixture = setup().await;
    request(&mut fixture, QUOTE).await.unwrap();
    set_time(&mut fixture.context, T0).await;
    oracle_fulfill(&mut fixture, FIRST_REQUEST_ID, 15).await.unwrap();
    let ledger = fixture.ledger.clone();
    determine(&mut fixture, ledger).await.unwrap();

    let winner = fixture.holders[1].pubkey();
    let winner_ata = create_token_account(&mut fixture, &winner).await;
    let expired = T0 + CLAIM_PERIOD + 1;
    set_time(&mut fixture.context, expired).await;
    request(&mut fixture, QUOTE + 1).await.unwrap();

    let raffle = load_raffle(&mut fixture).await;
    assert_eq!(raffle.phase(expired), RafflePhase::Requested);
    assert_eq!(raffle.winner(), Some(winner));
    assert_raffle_error(
        claim(&mut fixture, 1, &winner_ata).await,
        RaffleError::ClaimPeriodElapsed,
    );
    assert_eq!(token_balance(&mut fixture, &winner_ata).await, 0);
    assert!(!load_raffle(&mut fixture).await.prize_claimed);
}

#[tokio::test]
async fn test_failed_prize_transfer_can_be_retried() {
    let mut fixture = setup().await;
    request(&mut fixture, QUOTE).await.unwrap();
    set_time(&mut fixture.context, T0).await;
    oracle_fulfill(&mut fixture, FIRST_REQUEST_ID, 15).await.unwrap();
    let ledger = fixture.ledger.clone();
    determine(&mut fixture, ledger).await.unwrap();

    let winner = fixture.holders[1].pubkey();
    let winner_ata = create_token_account(&mut fixture, &winner).await;
    let owner = Keypair::from_bytes(&fixture.owner.to_bytes()).unwrap();
    let freeze = spl_token::instruction::freeze_account(
        &spl_token::id(),
        &winner_ata,
        &fixture.mint,
        &owner.pubkey(),
        &[],
    )
    .unwrap();
    process(&mut fixture.context, &[freeze], &[&owner]).await.unwrap();

    // the token program rejects the transfer into a frozen account
    let result = claim(&mut fixture, 1, &winner_ata).await;
    match result.unwrap_err().unwrap() {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
            assert_eq!(code, TokenError::AccountFrozen as u32)
        }
        other => panic!("expected a token program error, got {:?}", other),
    }
    assert!(!load_raffle(&mut fixture).await.prize_claimed);
    let escrow = find_escrow_token_address(&fixture.program_id, &fixture.raffle.pubkey(), &fixture.mint);
    assert_eq!(token_balance(&mut fixture, &escrow).await, 1);

    let thaw = spl_token::instruction::thaw_account(
        &spl_token::id(),
        &winner_ata,
        &fixture.mint,
        &owner.pubkey(),
        &[],
    )
    .unwrap();
    let winner_signer = Keypair::from_bytes(&fixture.holders[1].to_bytes()).unwrap();
    let retry = instruction::claim_prize(
        &fixture.program_id,
        &winner,
        &fixture.raffle.pubkey(),
        &fixture.mint,
        &winner_ata,
    )
    .unwrap();
    process(&mut fixture.context, &[thaw, retry], &[&owner, &winner_signer])
        .await
        .unwrap();
    assert_eq!(token_balance(&mut fixture, &winner_ata).await, 1);
    assert_eq!(token_balance(&mut fixture, &escrow).await, 0);
    assert!(load_raffle(&mut fixture).await.prize_claimed);
}

#[tokio::test]
async fn test_request_beyond_payer_balance_fails() {
    let mut fixture = setup().await;
    let requester = fixture.requester.pubkey();
    let balance = lamports(&mut fixture, &requester).await;
    assert!(balance > QUOTE);

    assert_raffle_error(
        request(&mut fixture, balance + 1).await,
        RaffleError::InsufficientFunds,
    );
    assert!(load_raffle(&mut fixture).await.request().is_none());
    assert_eq!(lamports(&mut fixture, &requester).await, balance);
}
