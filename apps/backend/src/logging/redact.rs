use std::collections::BTreeMap;
use std::fmt;

use crate::domain::cards_types::Card;
use crate::domain::dice::{Die, DieType};

/// Logs a set of dice without their faces.
///
/// Prints the count and the die sizes, e.g. `3 dice [D6x2, D8x1]`. Faces are
/// hidden information until a challenge reveals them.
pub struct HiddenDice<'a>(pub &'a [Die]);

impl fmt::Display for HiddenDice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sizes: BTreeMap<DieType, usize> = BTreeMap::new();
        for die in self.0 {
            *sizes.entry(die.die_type).or_default() += 1;
        }
        write!(f, "{} dice [", self.0.len())?;
        for (i, (die_type, n)) in sizes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{die_type:?}x{n}")?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for HiddenDice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Logs a hand as a card count only.
pub struct HiddenHand<'a>(pub &'a [Card]);

impl fmt::Display for HiddenHand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cards", self.0.len())
    }
}

impl fmt::Debug for HiddenHand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
