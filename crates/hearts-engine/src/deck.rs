//! Deck construction, shuffling, and dealing.
//!
//! All functions here are stateless. The caller owns the deck and the
//! seats; nothing is cached between rounds.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::{Card, Rank, Seat, Suit, sort_hand};

/// Number of cards in a standard deck.
pub const DECK_SIZE: usize = 52;

/// Cards dealt to each seat.
pub const HAND_SIZE: usize = 13;

/// Builds all 52 suit × rank combinations, each with a fresh identity.
pub fn create_deck() -> Vec<Card> {
    Suit::ALL
        .iter()
        .flat_map(|&suit| Rank::ALL.iter().map(move |&rank| Card::new(suit, rank)))
        .collect()
}

/// Returns a uniformly shuffled copy of `deck`. The input is untouched.
pub fn shuffle(deck: &[Card]) -> Vec<Card> {
    shuffle_with(deck, &mut rand::rng())
}

/// Like [`shuffle`], with a caller-supplied random source.
pub fn shuffle_with<R: Rng + ?Sized>(deck: &[Card], rng: &mut R) -> Vec<Card> {
    let mut shuffled = deck.to_vec();
    // Fisher–Yates under the hood.
    shuffled.shuffle(rng);
    shuffled
}

/// Shuffles `deck` and deals [`HAND_SIZE`] cards to each seat in order.
///
/// Seat `i` receives shuffled positions `[i*13, (i+1)*13)`. Each hand is
/// sorted for display. Whatever is not dealt stays in `deck`, so the
/// total number of cards is preserved.
pub fn deal<S: Seat>(seats: &mut [S], deck: &mut Vec<Card>) {
    deal_with(seats, deck, &mut rand::rng());
}

/// Like [`deal`], with a caller-supplied random source.
pub fn deal_with<S: Seat, R: Rng + ?Sized>(seats: &mut [S], deck: &mut Vec<Card>, rng: &mut R) {
    let mut remaining = shuffle_with(deck, rng);

    for seat in seats.iter_mut() {
        let rest = remaining.split_off(HAND_SIZE.min(remaining.len()));
        let mut hand = std::mem::replace(&mut remaining, rest);
        sort_hand(&mut hand);
        *seat.hand_mut() = hand;
    }

    *deck = remaining;
}
