//! Test-only game state helpers for domain unit tests.

#[cfg(test)]
pub use state_helpers::{d6, die, game_with_dice, seated_lobby, set_hand};

#[cfg(test)]
mod state_helpers {
    use crate::domain::cards_types::{Card, CardType};
    use crate::domain::dice::{Die, DieType};
    use crate::domain::rules::RuleSet;
    use crate::domain::state::{GameState, Phase, PlayerId, PlayerKind, PlayerState};

    /// A die with a caller-chosen id.
    pub fn die(id: u32, die_type: DieType, face: u8) -> Die {
        Die { id, die_type, face }
    }

    /// Fixed-face D6 dice with ids starting at `first_id`.
    pub fn d6(first_id: u32, faces: &[u8]) -> Vec<Die> {
        faces
            .iter()
            .enumerate()
            .map(|(i, &f)| die(first_id + i as u32, DieType::D6, f))
            .collect()
    }

    /// Lobby with `n` humans at seats 0..n.
    pub fn seated_lobby(n: u8) -> GameState {
        let mut state = GameState::new(RuleSet::default(), Some(42));
        for id in 0..n {
            state
                .players
                .push(PlayerState::new(id, format!("p{id}"), PlayerKind::Human));
        }
        state
    }

    /// A game in `Bidding` with fixed dice per seat and seat 0 to act.
    ///
    /// Dice ids are unique across seats (1000 + seat * 100 + i + 1) and clear of
    /// anything the mint issues early; hands start empty.
    pub fn game_with_dice(faces: &[&[u8]]) -> GameState {
        let mut state = seated_lobby(faces.len() as u8);
        for (seat, f) in faces.iter().enumerate() {
            let p = &mut state.players[seat];
            p.dice = d6(1001 + seat as u32 * 100, f);
            p.eliminated = p.dice.is_empty();
            p.ready = true;
        }
        state.phase = Phase::Bidding;
        state.round_no = 1;
        state.turn = Some(0);
        state
    }

    /// Replace `seat`'s hand with fresh cards of the given types (ids 900+).
    pub fn set_hand(state: &mut GameState, seat: PlayerId, types: &[CardType]) -> Vec<Card> {
        let cards: Vec<Card> = types
            .iter()
            .enumerate()
            .map(|(i, &card_type)| Card {
                id: 900 + seat as u32 * 10 + i as u32,
                card_type,
            })
            .collect();
        if let Some(p) = state.players.iter_mut().find(|p| p.id == seat) {
            p.hand = cards.clone();
        }
        cards
    }
}
