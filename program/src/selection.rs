//! Commitment verification and weighted winner selection.
//!
//! Both functions are pure so any off-chain verifier can reproduce a draw
//! from the committed participant list and the oracle's random word.

use solana_program::keccak;

use crate::{error::RaffleError, state::ParticipantEntry};

/// Outcome of a weighted draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    /// Index into the participant list
    pub index: usize,
    /// `random_word % total_tickets`
    pub target: u64,
}

/// Canonical encoding of a participant list.
///
/// Matches the borsh encoding of `Vec<ParticipantEntry>`: a u32 LE length
/// prefix, then address, ticket count and cumulative count per entry.
pub fn encode_participants(participants: &[ParticipantEntry]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + participants.len() * ParticipantEntry::LEN);
    buf.extend_from_slice(&(participants.len() as u32).to_le_bytes());
    for entry in participants {
        buf.extend_from_slice(entry.address.as_ref());
        buf.extend_from_slice(&entry.ticket_count.to_le_bytes());
        buf.extend_from_slice(&entry.cumulative_count.to_le_bytes());
    }
    buf
}

/// Commitment hash stored at raffle creation
pub fn commitment_hash(participants: &[ParticipantEntry]) -> [u8; 32] {
    keccak::hash(&encode_participants(participants)).to_bytes()
}

/// True iff `participants` hashes to `commitment`
pub fn verify_participants(commitment: &[u8; 32], participants: &[ParticipantEntry]) -> bool {
    commitment_hash(participants) == *commitment
}

/// Pick the first entry whose cumulative count reaches `random_word % total`.
///
/// Entry `i` owns targets in `(cumulative[i - 1], cumulative[i]]`; the first
/// entry also owns target 0.
pub fn select_winner(participants: &[ParticipantEntry], random_word: u64) -> Result<Draw, RaffleError> {
    let total = match participants.last() {
        Some(last) if last.cumulative_count > 0 => last.cumulative_count,
        _ => return Err(RaffleError::EmptyParticipants),
    };
    let target = random_word % total;

    let mut low = 0;
    let mut high = participants.len() - 1;
    while low < high {
        let mid = (low + high) / 2;
        if participants[mid].cumulative_count < target {
            low = mid + 1;
        } else {
            high = mid;
        }
    }

    Ok(Draw { index: low, target })
}
