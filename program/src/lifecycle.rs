// Raffle Draw Program - request / fulfillment / claim state machine
use solana_program::{clock::UnixTimestamp, pubkey::Pubkey};

use crate::{
    constants::NUM_WORDS,
    error::RaffleError,
    selection::{self, Draw},
    state::{ParticipantEntry, RandomnessRequest, Raffle},
};

/// Where a raffle stands at a given moment. Derived on demand, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RafflePhase {
    /// No randomness was ever requested
    NoRequest,
    /// Waiting on the oracle
    Requested,
    /// Randomness delivered, winner not drawn yet
    Fulfilled,
    /// Winner drawn, claim window open
    WinnerSet,
    /// Claim window closed without a claim; a new request may be made
    Expired,
    /// Prize has left escrow
    Claimed,
}

impl Raffle {
    /// Last second at which the current winner may still claim
    pub fn claim_deadline(&self) -> Option<UnixTimestamp> {
        match &self.request {
            Some(request) if request.fulfilled => {
                Some(self.claim_window_start.saturating_add(self.claim_period))
            }
            _ => None,
        }
    }

    fn claim_window_elapsed(&self, now: UnixTimestamp) -> bool {
        matches!(self.claim_deadline(), Some(deadline) if now > deadline)
    }

    pub fn phase(&self, now: UnixTimestamp) -> RafflePhase {
        if self.prize_claimed {
            return RafflePhase::Claimed;
        }
        match &self.request {
            None => RafflePhase::NoRequest,
            Some(request) if !request.fulfilled => RafflePhase::Requested,
            Some(_) if self.claim_window_elapsed(now) => RafflePhase::Expired,
            Some(_) if self.winner().is_some() => RafflePhase::WinnerSet,
            Some(_) => RafflePhase::Fulfilled,
        }
    }

    /// A new request is allowed only when none exists yet or the previous
    /// one was fulfilled and its claim window has closed.
    pub fn ensure_request_slot_free(&self, now: UnixTimestamp) -> Result<(), RaffleError> {
        match &self.request {
            None => Ok(()),
            Some(_) if self.claim_window_elapsed(now) => Ok(()),
            Some(_) => Err(RaffleError::RandomnessAlreadyPending),
        }
    }

    pub fn record_request(&mut self, request_id: u64, amount_paid: u64) {
        self.request = Some(RandomnessRequest::new(request_id, amount_paid));
    }

    /// Oracle callback: store the words, drop the previous winner and open
    /// a fresh claim window.
    pub fn fulfill(
        &mut self,
        request_id: u64,
        random_words: &[u64],
        now: UnixTimestamp,
    ) -> Result<(), RaffleError> {
        let request = self
            .request
            .as_mut()
            .ok_or(RaffleError::NoRandomnessRequest)?;
        if request.request_id != request_id {
            return Err(RaffleError::RequestIdMismatch);
        }
        if random_words.len() != NUM_WORDS {
            return Err(RaffleError::InvalidRandomWords);
        }

        request.store_words(random_words);
        self.winner = Pubkey::default();
        self.claim_window_start = now;
        Ok(())
    }

    /// Draw the winner from the committed participant list
    pub fn determine_winner(&mut self, participants: &[ParticipantEntry]) -> Result<Draw, RaffleError> {
        let random_word = match &self.request {
            Some(request) if request.fulfilled => request.random_words()[0],
            _ => return Err(RaffleError::RandomnessNotReady),
        };
        if !selection::verify_participants(&self.commitment, participants) {
            return Err(RaffleError::CommitmentMismatch);
        }

        let draw = selection::select_winner(participants, random_word)?;
        self.winner = participants[draw.index].address;
        Ok(draw)
    }

    /// Check every claim precondition; returns the winner on success
    pub fn authorize_claim(&self, caller: &Pubkey, now: UnixTimestamp) -> Result<Pubkey, RaffleError> {
        if self.prize_claimed {
            return Err(RaffleError::PrizeAlreadyClaimed);
        }
        let winner = self.winner().ok_or(RaffleError::WinnerNotSet)?;
        // A recorded winner always belongs to the window opened at
        // `claim_window_start`, even after a newer request went out.
        if now > self.claim_window_start.saturating_add(self.claim_period) {
            return Err(RaffleError::ClaimPeriodElapsed);
        }
        if *caller != winner {
            return Err(RaffleError::CallerNotWinner);
        }
        Ok(winner)
    }
}
