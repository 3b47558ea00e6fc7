//! Playing cards: suits, ranks, and uniquely identified cards.
//!
//! Every card dealt in a round carries a fresh [`CardId`] so clients can
//! refer to "this exact card" when passing or playing, without the server
//! trusting any suit/rank they send.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Unique identity token of a single card instance.
///
/// Serialized as a plain UUID string so the wire shape stays
/// `"id": "3f1c..."`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub Uuid);

impl CardId {
    /// Allocates a fresh random identity.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Suit
// ---------------------------------------------------------------------------

/// One of the four suits.
///
/// Declaration order is the display order used when sorting hands:
/// clubs < diamonds < hearts < spades.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    /// All suits in sort order.
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];
}

/// Lowercase suit name, as on the wire.
impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format!("{self:?}").to_lowercase())
    }
}

// ---------------------------------------------------------------------------
// Rank
// ---------------------------------------------------------------------------

/// Card rank, two through ace. Aces are high.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Rank {
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "A")]
    Ace,
}

impl Rank {
    /// All ranks, lowest first.
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Numeric comparison value: 2..=10 for pips, J/Q/K/A = 11/12/13/14.
    pub fn value(self) -> u8 {
        self as u8 + 2
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A single card. Immutable once created.
///
/// `value` is stored (not only derived) because clients compare and sort
/// on it directly from the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    suit: Suit,
    rank: Rank,
    value: u8,
}

impl Card {
    /// Creates a card with a fresh identity.
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self {
            id: CardId::new(),
            suit,
            rank,
            value: rank.value(),
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// The card that must open every round.
    pub fn is_two_of_clubs(&self) -> bool {
        self.suit == Suit::Clubs && self.rank == Rank::Two
    }

    pub fn is_queen_of_spades(&self) -> bool {
        self.suit == Suit::Spades && self.rank == Rank::Queen
    }

    pub fn is_heart(&self) -> bool {
        self.suit == Suit::Hearts
    }

    /// Penalty points this card is worth when collected in a trick.
    pub fn points(&self) -> u32 {
        if self.is_heart() {
            1
        } else if self.is_queen_of_spades() {
            13
        } else {
            0
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} of {}", self.rank, self.suit)
    }
}

/// Sorts a hand for display: by suit (clubs, diamonds, hearts, spades),
/// then ascending value.
pub fn sort_hand(hand: &mut [Card]) {
    hand.sort_by_key(|c| (c.suit, c.value));
}
