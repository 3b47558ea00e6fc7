//! The [`Seat`] trait: what the rules need to see of a player.

use crate::Card;

/// A completed trick: exactly one card from each of the four seats, in
/// play order.
pub type Trick = [Card; 4];

/// Card-holding view of a player at the table.
///
/// The deck and rules functions operate on slices of seats (seat order is
/// turn order) without knowing anything about connections, names, or
/// readiness. The room layer's player type implements this.
pub trait Seat {
    /// Cards currently held.
    fn hand(&self) -> &[Card];

    fn hand_mut(&mut self) -> &mut Vec<Card>;

    /// Pending pass selection (0 or 3 cards while passing).
    fn passed(&self) -> &[Card];

    fn passed_mut(&mut self) -> &mut Vec<Card>;

    /// Tricks won this round.
    fn tricks(&self) -> &[Trick];

    /// Cumulative score across rounds.
    fn score(&self) -> u32;
}
