//! Per-opponent bidding statistics.
//!
//! Bids are recorded unlabeled as they happen. When a round reaches a Dudo
//! or Jonti resolution, every bid of that round is labeled against the
//! reveal. Bids from rounds that never resolved stay unlabeled.

use std::collections::{HashMap, VecDeque};

use crate::domain::challenge::RoundOutcome;
use crate::domain::state::{Bid, PlayerId};

/// Bounded history per opponent.
pub const HISTORY_LIMIT: usize = 50;
/// Beta(2, 2) prior on the bluff rate.
const PRIOR_BLUFFS: f64 = 2.0;
const PRIOR_HONEST: f64 = 2.0;
/// Labeled bids needed for half confidence.
const CONFIDENCE_HALF: f64 = 10.0;
/// Per-bid decay of the face histogram.
const FACE_DECAY: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidRecord {
    pub round_no: u32,
    pub quantity: u8,
    pub face: u8,
    /// `None` until the round resolves.
    pub bluff: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProfile {
    history: VecDeque<BidRecord>,
    bids_seen: u32,
    quantity_raises: u32,
    labeled: u32,
    bluffs: u32,
    face_weights: [f64; 6],
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_LIMIT),
            bids_seen: 0,
            quantity_raises: 0,
            labeled: 0,
            bluffs: 0,
            face_weights: [0.0; 6],
        }
    }
}

impl PlayerProfile {
    pub fn history(&self) -> impl Iterator<Item = &BidRecord> {
        self.history.iter()
    }

    /// Posterior mean bluff rate.
    pub fn bluff_rate(&self) -> f64 {
        (self.bluffs as f64 + PRIOR_BLUFFS)
            / (self.labeled as f64 + PRIOR_BLUFFS + PRIOR_HONEST)
    }

    /// How much to trust `bluff_rate`, in `[0, 1)`.
    pub fn confidence(&self) -> f64 {
        let n = self.labeled as f64;
        n / (n + CONFIDENCE_HALF)
    }

    /// Share of bids that raised the quantity.
    pub fn aggressiveness(&self) -> f64 {
        if self.bids_seen == 0 {
            return 0.5;
        }
        self.quantity_raises as f64 / self.bids_seen as f64
    }

    /// Normalized, recency-weighted preference for `face`.
    pub fn face_preference(&self, face: u8) -> f64 {
        let total: f64 = self.face_weights.iter().sum();
        if total <= 0.0 || !(1..=6).contains(&face) {
            return 1.0 / 6.0;
        }
        self.face_weights[face as usize - 1] / total
    }

    fn record(&mut self, round_no: u32, bid: &Bid, prev: Option<&Bid>) {
        if self.history.len() == HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.history.push_back(BidRecord {
            round_no,
            quantity: bid.quantity,
            face: bid.face,
            bluff: None,
        });
        self.bids_seen += 1;
        if prev.map(|p| bid.quantity > p.quantity).unwrap_or(false) {
            self.quantity_raises += 1;
        }
        for w in self.face_weights.iter_mut() {
            *w *= FACE_DECAY;
        }
        if (1..=6).contains(&bid.face) {
            self.face_weights[bid.face as usize - 1] += 1.0;
        }
    }

    /// Cards may rewrite the standing bid after it was placed.
    fn settle_final_bid(&mut self, round_no: u32, final_bid: &Bid) {
        if let Some(rec) = self
            .history
            .iter_mut()
            .rev()
            .find(|r| r.round_no == round_no && r.bluff.is_none())
        {
            rec.quantity = final_bid.quantity;
            rec.face = final_bid.face;
        }
    }

    fn label_round(&mut self, round_no: u32, outcome: &RoundOutcome) {
        for rec in self.history.iter_mut() {
            if rec.round_no != round_no || rec.bluff.is_some() {
                continue;
            }
            let bluff = outcome.count_for(rec.face) < rec.quantity;
            rec.bluff = Some(bluff);
            self.labeled += 1;
            if bluff {
                self.bluffs += 1;
            }
        }
    }
}

/// Statistics for every seat at the table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpponentModel {
    profiles: HashMap<PlayerId, PlayerProfile>,
}

impl OpponentModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self, player: PlayerId) -> Option<&PlayerProfile> {
        self.profiles.get(&player)
    }

    /// Bluff rate and confidence for `player`, prior-only when unseen.
    pub fn bluff_prior(&self, player: PlayerId) -> (f64, f64) {
        match self.profiles.get(&player) {
            Some(p) => (p.bluff_rate(), p.confidence()),
            None => (0.5, 0.0),
        }
    }

    /// Record a bid as it is placed.
    pub fn observe_bid(&mut self, round_no: u32, bid: &Bid, prev: Option<&Bid>) {
        self.profiles
            .entry(bid.player)
            .or_default()
            .record(round_no, bid, prev);
    }

    /// Label every bid of `round_no` against the reveal. The challenged bid
    /// is labeled as it stood at the call.
    pub fn observe_outcome(&mut self, round_no: u32, outcome: &RoundOutcome) {
        let final_bid = outcome.bid();
        if let Some(profile) = self.profiles.get_mut(&final_bid.player) {
            profile.settle_final_bid(round_no, &final_bid);
        }
        for profile in self.profiles.values_mut() {
            profile.label_round(round_no, outcome);
        }
    }

    pub fn reset(&mut self) {
        self.profiles.clear();
    }
}
