//! Game flow for a room: starting, passing, playing, and scoring.
//!
//! Every operation validates completely before it mutates anything, so a
//! rejected action leaves the room exactly as it was.

use std::collections::HashSet;

use hearts_engine::{
    Card, CardId, MOON_POINTS, PassDirection, Trick, all_passed, check_play, create_deck,
    deal_with, exchange, find_two_of_clubs_holder, find_winner, is_game_over, is_round_over,
    shooting_the_moon, trick_points, trick_winner,
};
use hearts_protocol::ConnectionId;
use rand::Rng;

use crate::{GameError, GameState, Room};

/// Cards each player passes per round.
pub const PASS_SIZE: usize = 3;

/// Result of a successful pass selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOutcome {
    /// The last selection came in and cards changed hands.
    pub exchanged: bool,
}

/// Result of a successful card play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    pub card: Card,
    /// Set when this card completed the trick.
    pub trick: Option<CompletedTrick>,
    /// Set when that trick was the last of the round.
    pub round: Option<RoundEnd>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTrick {
    pub winner: ConnectionId,
    pub points: u32,
    pub cards: Trick,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundEnd {
    /// Who shot the moon, if anyone.
    pub moon: Option<ConnectionId>,
    /// Set when the game is over.
    pub winner: Option<ConnectionId>,
}

impl Room {
    /// Deals the first round and opens passing. Needs a full table in the
    /// lobby.
    pub fn start_game(&mut self) -> Result<(), GameError> {
        self.start_game_with(&mut rand::rng())
    }

    /// Like [`Room::start_game`], shuffling with `rng`.
    pub fn start_game_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        self.expect_state(GameState::Waiting)?;
        if self.players.len() != self.max_players {
            return Err(GameError::NotEnoughPlayers {
                needed: self.max_players,
                have: self.players.len(),
            });
        }

        self.round_number = 0;
        self.deal_round(rng);
        tracing::info!(room_id = %self.id, code = %self.code, "game started");
        Ok(())
    }

    /// Records `conn`'s three-card pass selection, moving the cards out of
    /// their hand. When the last selection arrives the exchange happens,
    /// the two of clubs holder takes the lead, and play begins.
    pub fn pass_cards(
        &mut self,
        conn: ConnectionId,
        card_ids: &[CardId],
    ) -> Result<PassOutcome, GameError> {
        self.expect_state(GameState::Passing)?;
        let seat = self.seat_of(conn).ok_or(GameError::PlayerNotFound)?;
        let player = &self.players[seat];

        if player.has_passed() {
            return Err(GameError::AlreadyPassed);
        }
        if card_ids.len() != PASS_SIZE {
            return Err(GameError::MustPassThree(card_ids.len()));
        }
        let mut seen = HashSet::with_capacity(PASS_SIZE);
        for &id in card_ids {
            if !seen.insert(id) {
                return Err(GameError::DuplicateCard(id));
            }
            if !player.hand.iter().any(|c| c.id() == id) {
                return Err(GameError::CardNotInHand(id));
            }
        }

        let player = &mut self.players[seat];
        let (passed, kept): (Vec<Card>, Vec<Card>) = std::mem::take(&mut player.hand)
            .into_iter()
            .partition(|c| seen.contains(&c.id()));
        player.hand = kept;
        player.passed_cards = passed;

        tracing::debug!(room_id = %self.id, %conn, "cards passed");

        if !all_passed(&self.players) {
            return Ok(PassOutcome { exchanged: false });
        }

        exchange(&mut self.players, self.pass_direction);
        self.current_turn = find_two_of_clubs_holder(&self.players).unwrap_or(0);
        self.first_trick_of_round = true;
        self.enter(GameState::Playing);
        tracing::info!(
            room_id = %self.id,
            direction = %self.pass_direction,
            lead = self.current_turn,
            "cards exchanged"
        );
        Ok(PassOutcome { exchanged: true })
    }

    /// Plays one card for `conn` into the current trick, resolving the
    /// trick, the round, and the game as far as this card finishes them.
    pub fn play_card(
        &mut self,
        conn: ConnectionId,
        card_id: CardId,
    ) -> Result<PlayOutcome, GameError> {
        self.expect_state(GameState::Playing)?;
        let seat = self.seat_of(conn).ok_or(GameError::PlayerNotFound)?;
        if seat != self.current_turn {
            return Err(GameError::NotYourTurn);
        }

        let hand = &self.players[seat].hand;
        let index = hand
            .iter()
            .position(|c| c.id() == card_id)
            .ok_or(GameError::CardNotInHand(card_id))?;
        check_play(&hand[index], hand, self.led_suit, self.first_trick_of_round)?;

        let card = self.players[seat].hand.remove(index);
        if self.current_trick.is_empty() {
            self.led_suit = Some(card.suit());
        }
        self.current_trick.push(card);
        self.current_turn = (self.current_turn + 1) % self.players.len();

        let mut outcome = PlayOutcome {
            card,
            trick: None,
            round: None,
        };
        if self.current_trick.len() == self.players.len() {
            outcome.trick = Some(self.complete_trick());
            if is_round_over(&self.players) {
                outcome.round = Some(self.end_round());
            }
        }
        Ok(outcome)
    }

    /// Awards the full trick to its winner, who leads next.
    fn complete_trick(&mut self) -> CompletedTrick {
        let n = self.players.len();
        let taken = std::mem::take(&mut self.current_trick);
        self.led_suit = None;
        self.first_trick_of_round = false;

        // The turn already advanced past the last card, so it points back
        // at whoever led.
        let leader = (self.current_turn + n - taken.len()) % n;
        let led = taken[0].suit();
        let position = trick_winner(&taken, led).unwrap_or(0);
        let winner = (leader + position) % n;
        let points = trick_points(&taken);

        let Ok(cards) = <Trick>::try_from(taken) else {
            unreachable!("a complete trick holds one card per seat");
        };

        let player = &mut self.players[winner];
        player.tricks.push(cards);
        player.score += points;
        self.current_turn = winner;

        tracing::debug!(room_id = %self.id, winner = %player.id, points, "trick completed");
        CompletedTrick {
            winner: player.id,
            points,
            cards,
        }
    }

    /// Applies moon scoring, then either finishes the game or deals the
    /// next round.
    fn end_round(&mut self) -> RoundEnd {
        let moon = shooting_the_moon(&self.players);
        if let Some(shooter) = moon {
            for (seat, player) in self.players.iter_mut().enumerate() {
                player.score = if seat == shooter { 0 } else { MOON_POINTS };
            }
            tracing::info!(room_id = %self.id, shooter = %self.players[shooter].id, "shot the moon");
        }
        let moon = moon.map(|seat| self.players[seat].id);

        if is_game_over(&self.players, self.end_point) {
            self.enter(GameState::Finished);
            let winner = find_winner(&self.players).map(|seat| self.players[seat].id);
            tracing::info!(room_id = %self.id, rounds = self.round_number + 1, "game over");
            return RoundEnd { moon, winner };
        }

        self.round_number += 1;
        self.deal_round(&mut rand::rng());
        RoundEnd { moon, winner: None }
    }

    /// Fresh deck, fresh hands, passing for the current round number.
    fn deal_round<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for player in &mut self.players {
            player.hand.clear();
            player.tricks.clear();
            player.passed_cards.clear();
        }
        self.current_trick.clear();
        self.led_suit = None;
        self.first_trick_of_round = true;
        self.pass_direction = PassDirection::for_round(self.round_number);

        self.deck = create_deck();
        deal_with(&mut self.players, &mut self.deck, rng);
        self.current_turn = find_two_of_clubs_holder(&self.players).unwrap_or(0);
        self.enter(GameState::Passing);
    }
}
