//! Per-player effect flags set by cards and consumed by later actions.

use serde::{Deserialize, Serialize};

/// The four card effects that outlive the card play itself.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Insurance,
    DoubleChallenge,
    PhantomBid,
    LateChallenge,
}

impl Effect {
    pub const ALL: [Effect; 4] = [
        Effect::Insurance,
        Effect::DoubleChallenge,
        Effect::PhantomBid,
        Effect::LateChallenge,
    ];
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEffects {
    pub insurance: bool,
    pub double_challenge: bool,
    pub phantom_bid: bool,
    pub late_challenge: bool,
}

impl ActiveEffects {
    fn slot(&mut self, effect: Effect) -> &mut bool {
        match effect {
            Effect::Insurance => &mut self.insurance,
            Effect::DoubleChallenge => &mut self.double_challenge,
            Effect::PhantomBid => &mut self.phantom_bid,
            Effect::LateChallenge => &mut self.late_challenge,
        }
    }

    pub fn is_active(&self, effect: Effect) -> bool {
        match effect {
            Effect::Insurance => self.insurance,
            Effect::DoubleChallenge => self.double_challenge,
            Effect::PhantomBid => self.phantom_bid,
            Effect::LateChallenge => self.late_challenge,
        }
    }

    pub fn set(&mut self, effect: Effect) {
        *self.slot(effect) = true;
    }

    /// Clear the flag, returning whether it was set.
    pub fn consume(&mut self, effect: Effect) -> bool {
        std::mem::replace(self.slot(effect), false)
    }

    pub fn any(&self) -> bool {
        Effect::ALL.iter().any(|e| self.is_active(*e))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consume_clears_and_reports() {
        let mut fx = ActiveEffects::default();
        assert!(!fx.consume(Effect::Insurance));
        fx.set(Effect::Insurance);
        assert!(fx.is_active(Effect::Insurance));
        assert!(fx.consume(Effect::Insurance));
        assert!(!fx.is_active(Effect::Insurance));
        assert!(!fx.consume(Effect::Insurance));
    }

    #[test]
    fn flags_are_independent() {
        let mut fx = ActiveEffects::default();
        fx.set(Effect::PhantomBid);
        fx.set(Effect::LateChallenge);
        assert!(!fx.insurance && !fx.double_challenge);
        assert!(fx.phantom_bid && fx.late_challenge);
        fx.clear();
        assert!(!fx.any());
    }
}
