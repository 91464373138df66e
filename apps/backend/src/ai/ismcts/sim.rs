//! Round-level simulation over one determinized table.
//!
//! Only bids and calls are modelled; cards and reaction windows are not. A
//! call ends the simulation and is scored from the searching seat's view.

use crate::ai::normal::{naive_move, NaiveMove};
use crate::domain::bidding::{min_quantity_for_face, minimal_raises};
use crate::domain::rules::WILD_FACE;
use crate::domain::state::{Bid, PlayerId};

/// Reward when the searching seat keeps its dice.
pub const REWARD_SAFE: f64 = 1.0;
/// Reward when the searching seat loses dice.
pub const REWARD_LOSS: f64 = 0.0;
/// Reward when a rollout hits its depth limit.
pub const REWARD_UNDECIDED: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimAction {
    Bid { quantity: u8, face: u8 },
    Dudo,
    /// Challenge the bid before the current one. Searching seat only.
    LateDudo,
    Jonti,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimBid {
    /// Index into `SimState::seats`.
    pub bidder: usize,
    pub quantity: u8,
    pub face: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimSeat {
    pub id: PlayerId,
    pub faces: Vec<u8>,
}

fn matches(die_face: u8, face: u8) -> bool {
    die_face == face || (face != WILD_FACE && die_face == WILD_FACE)
}

#[derive(Debug, Clone)]
pub struct SimState {
    pub seats: Vec<SimSeat>,
    /// Index of the seat to act.
    pub to_act: usize,
    /// Index of the searching seat.
    pub root: usize,
    pub current: Option<SimBid>,
    pub previous: Option<SimBid>,
    pub root_insured: bool,
    pub late_available: bool,
    reward: Option<f64>,
}

impl SimState {
    pub fn new(seats: Vec<SimSeat>, to_act: usize, root: usize) -> Self {
        Self {
            seats,
            to_act,
            root,
            current: None,
            previous: None,
            root_insured: false,
            late_available: false,
            reward: None,
        }
    }

    pub fn total_dice(&self) -> u8 {
        let n: usize = self.seats.iter().map(|s| s.faces.len()).sum();
        n.min(u8::MAX as usize) as u8
    }

    pub fn is_terminal(&self) -> bool {
        self.reward.is_some()
    }

    pub fn reward(&self) -> Option<f64> {
        self.reward
    }

    pub fn root_to_act(&self) -> bool {
        self.to_act == self.root
    }

    fn count(&self, face: u8) -> u8 {
        let n = self
            .seats
            .iter()
            .flat_map(|s| s.faces.iter())
            .filter(|&&f| matches(f, face))
            .count();
        n.min(u8::MAX as usize) as u8
    }

    fn as_bid(&self, b: SimBid) -> Bid {
        Bid {
            player: self.seats[b.bidder].id,
            quantity: b.quantity,
            face: b.face,
        }
    }

    /// Actions the tree expands for the seat to act: the minimum raise on
    /// every face, plus the calls open to it.
    pub fn actions(&self) -> Vec<SimAction> {
        if self.is_terminal() {
            return Vec::new();
        }
        let current = self.current.map(|b| self.as_bid(b));
        let mut out: Vec<SimAction> = minimal_raises(current.as_ref(), self.total_dice())
            .into_iter()
            .map(|(quantity, face)| SimAction::Bid { quantity, face })
            .collect();
        if self.current.is_some_and(|b| b.bidder != self.to_act) {
            out.push(SimAction::Dudo);
            out.push(SimAction::Jonti);
        }
        if self.root_to_act()
            && self.late_available
            && self.previous.is_some_and(|b| b.bidder != self.root)
        {
            out.push(SimAction::LateDudo);
        }
        out
    }

    pub fn apply(&mut self, action: SimAction) {
        if self.is_terminal() {
            return;
        }
        match action {
            SimAction::Bid { quantity, face } => {
                self.previous = self.current;
                self.current = Some(SimBid {
                    bidder: self.to_act,
                    quantity,
                    face,
                });
                self.to_act = (self.to_act + 1) % self.seats.len();
            }
            SimAction::Dudo => {
                if let Some(bid) = self.current {
                    self.resolve_dudo(bid);
                }
            }
            SimAction::LateDudo => {
                self.late_available = false;
                if let Some(bid) = self.previous {
                    self.resolve_dudo(bid);
                }
            }
            SimAction::Jonti => {
                if let Some(bid) = self.current {
                    let exact = self.count(bid.face) == bid.quantity;
                    let root_lost = !exact && self.to_act == self.root;
                    self.reward = Some(if root_lost { REWARD_LOSS } else { REWARD_SAFE });
                }
            }
        }
    }

    fn resolve_dudo(&mut self, bid: SimBid) {
        let bluff = self.count(bid.face) < bid.quantity;
        let loser = if bluff { bid.bidder } else { self.to_act };
        let insured = loser == self.to_act && self.to_act == self.root && self.root_insured;
        let root_lost = loser == self.root && !insured;
        self.reward = Some(if root_lost { REWARD_LOSS } else { REWARD_SAFE });
    }

    /// Cheap policy for rollouts: the naive heuristic on the acting seat's
    /// own faces.
    pub fn rollout_action(&self) -> SimAction {
        let seat = &self.seats[self.to_act];
        let current = self.current.map(|b| (b.quantity, b.face));
        let can_challenge = self.current.is_some_and(|b| b.bidder != self.to_act);
        match naive_move(&seat.faces, self.total_dice(), current, can_challenge) {
            NaiveMove::Challenge => SimAction::Dudo,
            NaiveMove::Raise { quantity, face } => {
                let prev = self.current.map(|b| self.as_bid(b));
                let min = min_quantity_for_face(prev.as_ref(), face).max(1);
                if quantity >= min && quantity <= self.total_dice() {
                    SimAction::Bid { quantity, face }
                } else if can_challenge {
                    SimAction::Dudo
                } else {
                    SimAction::Bid {
                        quantity: 1,
                        face: WILD_FACE,
                    }
                }
            }
        }
    }

    /// Play the cheap policy until a call or `depth` actions.
    pub fn rollout(&mut self, depth: u32) -> f64 {
        for _ in 0..depth {
            if let Some(r) = self.reward {
                return r;
            }
            let action = self.rollout_action();
            self.apply(action);
        }
        self.reward.unwrap_or(REWARD_UNDECIDED)
    }
}
