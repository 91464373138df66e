//! Dice types, face tables, and per-face match probabilities.
//!
//! Every die type maps onto effective values 1..=6. Bigger dice carry extra
//! copies of the low faces, so the chance of rolling a wild 1 grows with size.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::rules::{MAX_FACE, WILD_FACE};

pub type DieId = u32;

/// Die sizes in upgrade order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DieType {
    D3,
    D4,
    D6,
    D8,
    D10,
}

const D3_FACES: &[u8] = &[2, 4, 6];
const D4_FACES: &[u8] = &[2, 3, 5, 6];
const D6_FACES: &[u8] = &[1, 2, 3, 4, 5, 6];
const D8_FACES: &[u8] = &[1, 1, 2, 2, 3, 4, 5, 6];
const D10_FACES: &[u8] = &[1, 1, 1, 2, 2, 3, 3, 4, 5, 6];

impl DieType {
    pub const ALL: [DieType; 5] = [
        DieType::D3,
        DieType::D4,
        DieType::D6,
        DieType::D8,
        DieType::D10,
    ];

    /// Effective value of every physical side.
    pub const fn faces(self) -> &'static [u8] {
        match self {
            DieType::D3 => D3_FACES,
            DieType::D4 => D4_FACES,
            DieType::D6 => D6_FACES,
            DieType::D8 => D8_FACES,
            DieType::D10 => D10_FACES,
        }
    }

    pub const fn sides(self) -> usize {
        self.faces().len()
    }

    /// One step up the size order; `None` at D10.
    pub fn upgrade(self) -> Option<DieType> {
        match self {
            DieType::D3 => Some(DieType::D4),
            DieType::D4 => Some(DieType::D6),
            DieType::D6 => Some(DieType::D8),
            DieType::D8 => Some(DieType::D10),
            DieType::D10 => None,
        }
    }

    /// One step down the size order; `None` at D3.
    pub fn downgrade(self) -> Option<DieType> {
        match self {
            DieType::D3 => None,
            DieType::D4 => Some(DieType::D3),
            DieType::D6 => Some(DieType::D4),
            DieType::D8 => Some(DieType::D6),
            DieType::D10 => Some(DieType::D8),
        }
    }

    /// Probability that a roll shows exactly `face`.
    pub fn face_probability(self, face: u8) -> f64 {
        let faces = self.faces();
        let hits = faces.iter().filter(|&&f| f == face).count();
        hits as f64 / faces.len() as f64
    }

    /// Probability that a roll counts toward a bid on `face`.
    ///
    /// Wild 1s are added in unless the bid is itself on 1s.
    pub fn match_probability(self, face: u8) -> f64 {
        if face == WILD_FACE {
            self.face_probability(WILD_FACE)
        } else {
            self.face_probability(face) + self.face_probability(WILD_FACE)
        }
    }

    /// Sample one side uniformly.
    pub fn roll<R: Rng + ?Sized>(self, rng: &mut R) -> u8 {
        let faces = self.faces();
        faces[rng.random_range(0..faces.len())]
    }
}

impl std::fmt::Display for DieType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DieType::D3 => "d3",
            DieType::D4 => "d4",
            DieType::D6 => "d6",
            DieType::D8 => "d8",
            DieType::D10 => "d10",
        };
        f.write_str(label)
    }
}

/// A rolled die. Replaced, never mutated, when its type or face changes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Die {
    pub id: DieId,
    pub die_type: DieType,
    pub face: u8,
}

impl Die {
    /// Does this die count toward a bid on `face`?
    pub fn matches(&self, face: u8) -> bool {
        if face == WILD_FACE {
            self.face == WILD_FACE
        } else {
            self.face == face || self.face == WILD_FACE
        }
    }
}

/// Count dice that count toward `face`, wilds included where applicable.
pub fn count_matches<'a, I>(dice: I, face: u8) -> u8
where
    I: IntoIterator<Item = &'a Die>,
{
    let count = dice.into_iter().filter(|d| d.matches(face)).count();
    count.min(u8::MAX as usize) as u8
}

/// Mints dice with ids that are never reused within one game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DieMint {
    next_id: DieId,
}

impl DieMint {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    pub fn roll<R: Rng + ?Sized>(&mut self, die_type: DieType, rng: &mut R) -> Die {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        Die {
            id,
            die_type,
            face: die_type.roll(rng),
        }
    }

    /// Same type and face under a fresh id, so nothing learned about the old die carries over.
    pub fn reissue(&mut self, die: &Die) -> Die {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        Die { id, ..*die }
    }
}

/// Faces a bid may name, in ascending order.
pub fn bid_faces() -> impl Iterator<Item = u8> {
    WILD_FACE..=MAX_FACE
}
