//! Deck assembly, shuffling, and drawing.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::cards_types::{Card, CardId, CardType};

/// Copies of each card in a normal deck.
const NORMAL_FREQUENCIES: [(CardType, u8); 13] = [
    (CardType::Peek, 4),
    (CardType::Gauge, 3),
    (CardType::FalseTell, 2),
    (CardType::Inflation, 3),
    (CardType::WildShift, 2),
    (CardType::PhantomBid, 2),
    (CardType::Insurance, 3),
    (CardType::DoubleChallenge, 2),
    (CardType::LateChallenge, 2),
    (CardType::Reroll, 3),
    (CardType::Polish, 2),
    (CardType::Crack, 2),
    (CardType::BlindSwap, 2),
];

/// Chaos mode doubles the dice-manipulation cards.
const CHAOS_FREQUENCIES: [(CardType, u8); 13] = [
    (CardType::Peek, 4),
    (CardType::Gauge, 3),
    (CardType::FalseTell, 2),
    (CardType::Inflation, 3),
    (CardType::WildShift, 2),
    (CardType::PhantomBid, 2),
    (CardType::Insurance, 3),
    (CardType::DoubleChallenge, 2),
    (CardType::LateChallenge, 2),
    (CardType::Reroll, 6),
    (CardType::Polish, 4),
    (CardType::Crack, 4),
    (CardType::BlindSwap, 4),
];

pub fn frequency_table(chaos_mode: bool) -> &'static [(CardType, u8)] {
    if chaos_mode {
        &CHAOS_FREQUENCIES
    } else {
        &NORMAL_FREQUENCIES
    }
}

/// Fisher-Yates shuffle driven by the caller's RNG.
pub fn shuffle_cards<R: Rng + ?Sized>(cards: &mut [Card], rng: &mut R) {
    for i in (1..cards.len()).rev() {
        let j = rng.random_range(0..=i);
        cards.swap(i, j);
    }
}

/// What happened when a player tried to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn(Card),
    /// Hand already at the cap; nothing was taken from the deck.
    HandFull,
    /// Both piles are empty (every card is in someone's hand).
    Exhausted,
}

/// Shared draw pile plus discard pile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    draw_pile: Vec<Card>,
    discard_pile: Vec<Card>,
}

impl Deck {
    /// Build a shuffled deck from the frequency table. Card ids start at 1.
    pub fn create<R: Rng + ?Sized>(chaos_mode: bool, rng: &mut R) -> Self {
        let mut next_id: CardId = 1;
        let mut draw_pile = Vec::new();
        for &(card_type, copies) in frequency_table(chaos_mode) {
            for _ in 0..copies {
                draw_pile.push(Card {
                    id: next_id,
                    card_type,
                });
                next_id += 1;
            }
        }
        shuffle_cards(&mut draw_pile, rng);
        Self {
            draw_pile,
            discard_pile: Vec::new(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.draw_pile.len()
    }

    pub fn discarded(&self) -> usize {
        self.discard_pile.len()
    }

    pub fn discard(&mut self, card: Card) {
        self.discard_pile.push(card);
    }

    /// Draw one card, reshuffling the discard pile in when the draw pile runs dry.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Card> {
        if self.draw_pile.is_empty() && !self.discard_pile.is_empty() {
            self.draw_pile.append(&mut self.discard_pile);
            shuffle_cards(&mut self.draw_pile, rng);
        }
        self.draw_pile.pop()
    }

    /// Draw into `hand` unless it already holds `cap` cards.
    pub fn draw_into<R: Rng + ?Sized>(
        &mut self,
        hand: &mut Vec<Card>,
        cap: usize,
        rng: &mut R,
    ) -> DrawOutcome {
        if hand.len() >= cap {
            return DrawOutcome::HandFull;
        }
        match self.draw(rng) {
            Some(card) => {
                hand.push(card);
                DrawOutcome::Drawn(card)
            }
            None => DrawOutcome::Exhausted,
        }
    }

    /// Put cards back (used when a finished game resets to the lobby).
    pub fn reclaim(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.discard_pile.extend(cards);
    }
}
