//! Sampling concrete tables consistent with what the searching seat knows.

use rand::Rng;

use super::sim::{SimBid, SimSeat, SimState};
use crate::ai::probability::DieBelief;
use crate::domain::dice::DieType;
use crate::domain::player_view::AiGameContext;
use crate::domain::state::{Bid, PlayerId};

/// Everything a determinization needs, detached from the live context so it
/// can be moved onto worker threads.
#[derive(Debug, Clone)]
pub struct SearchSetup {
    /// Live seats in seating order with per-die beliefs.
    pub seats: Vec<(PlayerId, Vec<DieBelief>)>,
    pub to_act: usize,
    pub root: usize,
    pub current: Option<SimBid>,
    pub previous: Option<SimBid>,
    pub root_insured: bool,
    pub late_available: bool,
}

impl SearchSetup {
    /// `None` when the context's seat is not on the table.
    pub fn from_context(ctx: &AiGameContext) -> Option<Self> {
        let mut seats: Vec<(PlayerId, Vec<DieBelief>)> = Vec::new();
        seats.push((
            ctx.seat,
            ctx.my_dice().iter().map(DieBelief::from).collect(),
        ));
        for (owner, known) in ctx.opponent_dice() {
            let belief = match known {
                Some(k) => match k.face {
                    Some(face) => DieBelief::Known(face),
                    None => DieBelief::Typed(k.die_type),
                },
                None => DieBelief::Unknown,
            };
            match seats.iter_mut().find(|(id, _)| *id == owner) {
                Some((_, dice)) => dice.push(belief),
                None => seats.push((owner, vec![belief])),
            }
        }
        seats.retain(|(_, dice)| !dice.is_empty());
        seats.sort_by_key(|(id, _)| *id);

        let index_of = |player: PlayerId| seats.iter().position(|(id, _)| *id == player);
        let root = index_of(ctx.seat)?;
        let to_act = ctx.public.turn.and_then(index_of).unwrap_or(root);
        let sim_bid = |b: Bid| {
            index_of(b.player).map(|bidder| SimBid {
                bidder,
                quantity: b.quantity,
                face: b.face,
            })
        };
        let current = ctx.current_bid().and_then(sim_bid);
        let previous = ctx.previous_bid().and_then(sim_bid);

        Some(Self {
            root,
            to_act,
            current,
            previous,
            root_insured: ctx.effects().insurance,
            late_available: ctx.effects().late_challenge,
            seats,
        })
    }

    /// Sample one table: known faces stay, known sizes roll by size, the rest
    /// roll as d6.
    pub fn determinize<R: Rng + ?Sized>(&self, rng: &mut R) -> SimState {
        let seats = self
            .seats
            .iter()
            .map(|(id, beliefs)| SimSeat {
                id: *id,
                faces: beliefs.iter().map(|b| sample_face(*b, rng)).collect(),
            })
            .collect();
        let mut state = SimState::new(seats, self.to_act, self.root);
        state.current = self.current;
        state.previous = self.previous;
        state.root_insured = self.root_insured;
        state.late_available = self.late_available;
        state
    }
}

fn sample_face<R: Rng + ?Sized>(belief: DieBelief, rng: &mut R) -> u8 {
    match belief {
        DieBelief::Known(face) => face,
        DieBelief::Typed(t) => t.roll(rng),
        DieBelief::Unknown => DieType::D6.roll(rng),
    }
}
