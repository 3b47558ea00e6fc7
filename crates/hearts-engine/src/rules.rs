//! Hearts rules: play legality, scoring, passing, and round/game checks.
//!
//! Every function here is pure. They read (or, for [`exchange`], rearrange)
//! the seats handed to them and never touch shared state.

use serde::{Deserialize, Serialize};

use crate::{Card, Seat, Suit, sort_hand};

/// Total penalty points in a deck: 13 hearts plus the queen of spades.
pub const MOON_POINTS: u32 = 26;

// ---------------------------------------------------------------------------
// Pass direction
// ---------------------------------------------------------------------------

/// Where each player's three passed cards go this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassDirection {
    #[default]
    Left,
    Right,
    Across,
    None,
}

impl PassDirection {
    /// Rotation used for round `round` (0-indexed): left, right, across,
    /// none, repeating.
    pub fn for_round(round: u32) -> Self {
        match round % 4 {
            0 => Self::Left,
            1 => Self::Right,
            2 => Self::Across,
            _ => Self::None,
        }
    }

    /// Seat receiving the cards passed by `seat` at a table of `seats`.
    ///
    /// With [`PassDirection::None`] every seat keeps its own cards.
    pub fn target(self, seat: usize, seats: usize) -> usize {
        match self {
            Self::Left => (seat + 1) % seats,
            Self::Right => (seat + seats - 1) % seats,
            Self::Across => (seat + 2) % seats,
            Self::None => seat,
        }
    }
}

impl std::fmt::Display for PassDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Across => write!(f, "across"),
            Self::None => write!(f, "none"),
        }
    }
}

// ---------------------------------------------------------------------------
// Play legality
// ---------------------------------------------------------------------------

/// Why a card may not be played right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IllegalPlay {
    /// The first trick of a round must be opened with the two of clubs.
    #[error("the first trick must be led with the two of clubs")]
    MustLeadTwoOfClubs,

    /// Hearts and the queen of spades can't be dumped on the first trick
    /// unless the hand holds nothing else.
    #[error("hearts and the queen of spades can't be played on the first trick")]
    NoPointsOnFirstTrick,

    /// The player holds the led suit and must play it.
    #[error("you must follow suit ({0})")]
    MustFollowSuit(Suit),

    /// Hearts can't be led while the hand still holds another suit.
    #[error("hearts can't be led yet")]
    HeartsNotBroken,
}

/// Checks whether `card` may be played from `hand`.
///
/// Rules, in order of precedence:
/// 1. Opening the first trick of a round: only the two of clubs.
/// 2. Following on the first trick: no hearts or queen of spades, unless
///    the hand is nothing but those.
/// 3. Holding the led suit: must follow it.
/// 4. Leading: no hearts unless the hand is all hearts. This is re-derived
///    from the hand each time; there is no round-level "hearts broken"
///    flag, so a hand without hearts never trips it.
pub fn check_play(
    card: &Card,
    hand: &[Card],
    led_suit: Option<Suit>,
    first_trick_of_round: bool,
) -> Result<(), IllegalPlay> {
    if first_trick_of_round && led_suit.is_none() {
        return if card.is_two_of_clubs() {
            Ok(())
        } else {
            Err(IllegalPlay::MustLeadTwoOfClubs)
        };
    }

    if first_trick_of_round {
        let is_penalty = |c: &Card| c.is_heart() || c.is_queen_of_spades();
        if is_penalty(card) && !hand.iter().all(is_penalty) {
            return Err(IllegalPlay::NoPointsOnFirstTrick);
        }
    }

    match led_suit {
        Some(led) if card.suit() != led && hand.iter().any(|c| c.suit() == led) => {
            Err(IllegalPlay::MustFollowSuit(led))
        }
        None if card.is_heart() && !hand.iter().all(Card::is_heart) => {
            Err(IllegalPlay::HeartsNotBroken)
        }
        _ => Ok(()),
    }
}

/// Boolean form of [`check_play`].
pub fn is_legal_play(
    card: &Card,
    hand: &[Card],
    led_suit: Option<Suit>,
    first_trick_of_round: bool,
) -> bool {
    check_play(card, hand, led_suit, first_trick_of_round).is_ok()
}

// ---------------------------------------------------------------------------
// Tricks
// ---------------------------------------------------------------------------

/// Penalty points in a trick: 1 per heart, 13 for the queen of spades.
pub fn trick_points(trick: &[Card]) -> u32 {
    trick.iter().map(Card::points).sum()
}

/// Position within `trick` of the winning card: the highest value among
/// cards of the led suit. Off-suit cards never win.
///
/// Returns `None` only for an empty trick.
pub fn trick_winner(trick: &[Card], led_suit: Suit) -> Option<usize> {
    trick
        .iter()
        .enumerate()
        .filter(|(_, c)| c.suit() == led_suit)
        .max_by_key(|(_, c)| c.value())
        .map(|(i, _)| i)
}

// ---------------------------------------------------------------------------
// Passing
// ---------------------------------------------------------------------------

/// `true` once every seat has a pending selection of exactly three cards.
pub fn all_passed<S: Seat>(seats: &[S]) -> bool {
    seats.iter().all(|s| s.passed().len() == 3)
}

/// Moves every pending selection to its recipient and re-sorts all hands.
///
/// Selections are collected before any are delivered, so a seat's own
/// outgoing cards never mix with what it receives.
pub fn exchange<S: Seat>(seats: &mut [S], direction: PassDirection) {
    let n = seats.len();
    let outgoing: Vec<Vec<Card>> = seats
        .iter_mut()
        .map(|s| std::mem::take(s.passed_mut()))
        .collect();

    for (from, cards) in outgoing.into_iter().enumerate() {
        let to = direction.target(from, n);
        seats[to].hand_mut().extend(cards);
    }

    for seat in seats.iter_mut() {
        sort_hand(seat.hand_mut());
    }
}

/// Seat index holding the two of clubs, if it has been dealt.
pub fn find_two_of_clubs_holder<S: Seat>(seats: &[S]) -> Option<usize> {
    seats
        .iter()
        .position(|s| s.hand().iter().any(Card::is_two_of_clubs))
}

// ---------------------------------------------------------------------------
// Round and game end
// ---------------------------------------------------------------------------

/// `true` when every hand is empty.
pub fn is_round_over<S: Seat>(seats: &[S]) -> bool {
    seats.iter().all(|s| s.hand().is_empty())
}

/// Seat that collected all 26 penalty points in its tricks this round.
pub fn shooting_the_moon<S: Seat>(seats: &[S]) -> Option<usize> {
    seats.iter().position(|s| {
        let points: u32 = s.tricks().iter().map(|t| trick_points(t)).sum();
        points == MOON_POINTS
    })
}

/// `true` when any cumulative score has reached `end_point`.
pub fn is_game_over<S: Seat>(seats: &[S], end_point: u32) -> bool {
    seats.iter().any(|s| s.score() >= end_point)
}

/// Seat with the lowest score (low score wins). Ties go to the earliest
/// seat.
pub fn find_winner<S: Seat>(seats: &[S]) -> Option<usize> {
    seats
        .iter()
        .enumerate()
        .min_by_key(|(_, s)| s.score())
        .map(|(i, _)| i)
}
