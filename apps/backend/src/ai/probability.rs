//! Exact match-count distributions over heterogeneous dice.
//!
//! Every die is an independent Bernoulli trial with its own success
//! probability, so the count of matches follows a Poisson-Binomial
//! distribution. It is built by convolving one die at a time; known dice
//! contribute a certain 0 or 1.

use crate::domain::dice::{Die, DieType};
use crate::domain::player_view::AiGameContext;
use crate::domain::rules::WILD_FACE;

/// What the observer knows about one die.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DieBelief {
    /// Face visible (own die or peeked).
    Known(u8),
    /// Size known (gauged), face hidden.
    Typed(DieType),
    /// Nothing known; treated as a D6.
    Unknown,
}

impl DieBelief {
    /// Probability this die counts toward a bid on `face`.
    pub fn match_probability(self, face: u8) -> f64 {
        match self {
            DieBelief::Known(f) => {
                let hit = if face == WILD_FACE {
                    f == WILD_FACE
                } else {
                    f == face || f == WILD_FACE
                };
                if hit {
                    1.0
                } else {
                    0.0
                }
            }
            DieBelief::Typed(t) => t.match_probability(face),
            DieBelief::Unknown => DieType::D6.match_probability(face),
        }
    }
}

impl From<&Die> for DieBelief {
    fn from(die: &Die) -> Self {
        DieBelief::Known(die.face)
    }
}

/// Probability mass over match counts `0..=n`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchDistribution {
    pmf: Vec<f64>,
}

impl Default for MatchDistribution {
    fn default() -> Self {
        Self { pmf: vec![1.0] }
    }
}

impl MatchDistribution {
    /// Convolve one Bernoulli trial per probability.
    pub fn from_probabilities<I>(probabilities: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut dist = Self::default();
        for p in probabilities {
            dist.add_trial(p);
        }
        dist
    }

    /// Distribution of matches on `face` across `dice`.
    pub fn for_dice(dice: &[DieBelief], face: u8) -> Self {
        Self::from_probabilities(dice.iter().map(|d| d.match_probability(face)))
    }

    /// Fold one more die in.
    pub fn add_trial(&mut self, p: f64) {
        let p = p.clamp(0.0, 1.0);
        let q = 1.0 - p;
        let mut next = vec![0.0; self.pmf.len() + 1];
        for (k, &mass) in self.pmf.iter().enumerate() {
            next[k] += mass * q;
            next[k + 1] += mass * p;
        }
        self.pmf = next;
    }

    /// Number of dice folded in.
    pub fn trials(&self) -> usize {
        self.pmf.len() - 1
    }

    pub fn pmf(&self) -> &[f64] {
        &self.pmf
    }

    /// P(matches == k).
    pub fn exactly(&self, k: usize) -> f64 {
        self.pmf.get(k).copied().unwrap_or(0.0)
    }

    /// P(matches >= k).
    pub fn at_least(&self, k: usize) -> f64 {
        if k == 0 {
            return 1.0;
        }
        let tail: f64 = self.pmf.iter().skip(k).sum();
        tail.clamp(0.0, 1.0)
    }

    pub fn expected(&self) -> f64 {
        self.pmf
            .iter()
            .enumerate()
            .map(|(k, &m)| k as f64 * m)
            .sum()
    }

    pub fn variance(&self) -> f64 {
        let mean = self.expected();
        self.pmf
            .iter()
            .enumerate()
            .map(|(k, &m)| {
                let d = k as f64 - mean;
                d * d * m
            })
            .sum()
    }
}

/// Everything `ctx`'s seat knows about every die in play: own dice by face,
/// opponent dice by leaked face or type, the rest unknown.
pub fn beliefs_for(ctx: &AiGameContext) -> Vec<DieBelief> {
    let mut out: Vec<DieBelief> = ctx.my_dice().iter().map(DieBelief::from).collect();
    for (_, known) in ctx.opponent_dice() {
        out.push(match known {
            Some(k) => match k.face {
                Some(face) => DieBelief::Known(face),
                None => DieBelief::Typed(k.die_type),
            },
            None => DieBelief::Unknown,
        });
    }
    out
}

/// Exact distribution of matches on `face` from `ctx`'s point of view.
pub fn table_distribution(ctx: &AiGameContext, face: u8) -> MatchDistribution {
    MatchDistribution::for_dice(&beliefs_for(ctx), face)
}

/// Standard binomial tail P(X >= k) for X ~ Bin(n, p).
pub fn binomial_at_least(n: usize, p: f64, k: usize) -> f64 {
    if k == 0 {
        return 1.0;
    }
    if k > n {
        return 0.0;
    }
    let p = p.clamp(0.0, 1.0);
    let mut total = 0.0;
    for i in k..=n {
        total += binomial_coefficient(n, i) * p.powi(i as i32) * (1.0 - p).powi((n - i) as i32);
    }
    total.clamp(0.0, 1.0)
}

fn binomial_coefficient(n: usize, k: usize) -> f64 {
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}
