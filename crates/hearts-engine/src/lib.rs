//! Cards, deck handling, and the rules of Hearts.
//!
//! This crate is the stateless core of the server: nothing here knows about
//! rooms, connections, or locking. Callers hand in seats (anything that
//! implements [`Seat`]) and get answers or rearranged hands back.
//!
//! # Key items
//!
//! - [`Card`], [`Suit`], [`Rank`], [`CardId`]: the card model
//! - [`create_deck`], [`shuffle`], [`deal`]: the deck engine
//! - [`check_play`], [`trick_points`], [`exchange`], ...: the rules engine

mod card;
mod deck;
mod rules;
mod seat;

pub use card::{Card, CardId, Rank, Suit, sort_hand};
pub use deck::{DECK_SIZE, HAND_SIZE, create_deck, deal, deal_with, shuffle, shuffle_with};
pub use rules::{
    IllegalPlay, MOON_POINTS, PassDirection, all_passed, check_play, exchange,
    find_two_of_clubs_holder, find_winner, is_game_over, is_legal_play, is_round_over,
    shooting_the_moon, trick_points, trick_winner,
};
pub use seat::{Seat, Trick};
