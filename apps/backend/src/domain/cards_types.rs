//! Core card-related types: Card, CardType, CardCategory, Timing

use serde::{Deserialize, Serialize};

pub type CardId = u32;

/// When a card may be played.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    /// During bidding, on your own turn.
    OnTurn,
    /// During bidding, on someone else's turn.
    Reaction,
    /// While a Dudo or Jonti call is pending, for the caller and the challenged bidder.
    OnDudo,
    /// Whenever any of the above applies.
    Any,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardCategory {
    Information,
    BidManipulation,
    ChallengeInteraction,
    DiceManipulation,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Peek,
    Gauge,
    FalseTell,
    Inflation,
    WildShift,
    PhantomBid,
    Insurance,
    DoubleChallenge,
    LateChallenge,
    Reroll,
    Polish,
    Crack,
    BlindSwap,
}

impl CardType {
    pub const ALL: [CardType; 13] = [
        CardType::Peek,
        CardType::Gauge,
        CardType::FalseTell,
        CardType::Inflation,
        CardType::WildShift,
        CardType::PhantomBid,
        CardType::Insurance,
        CardType::DoubleChallenge,
        CardType::LateChallenge,
        CardType::Reroll,
        CardType::Polish,
        CardType::Crack,
        CardType::BlindSwap,
    ];

    pub const fn category(self) -> CardCategory {
        match self {
            CardType::Peek | CardType::Gauge | CardType::FalseTell => CardCategory::Information,
            CardType::Inflation | CardType::WildShift | CardType::PhantomBid => {
                CardCategory::BidManipulation
            }
            CardType::Insurance | CardType::DoubleChallenge | CardType::LateChallenge => {
                CardCategory::ChallengeInteraction
            }
            CardType::Reroll | CardType::Polish | CardType::Crack | CardType::BlindSwap => {
                CardCategory::DiceManipulation
            }
        }
    }

    pub const fn timing(self) -> Timing {
        match self {
            CardType::FalseTell => Timing::Any,
            CardType::Inflation | CardType::WildShift => Timing::Reaction,
            CardType::Insurance | CardType::DoubleChallenge => Timing::OnDudo,
            CardType::Peek
            | CardType::Gauge
            | CardType::PhantomBid
            | CardType::LateChallenge
            | CardType::Reroll
            | CardType::Polish
            | CardType::Crack
            | CardType::BlindSwap => Timing::OnTurn,
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            CardType::Peek => "Peek",
            CardType::Gauge => "Gauge",
            CardType::FalseTell => "False Tell",
            CardType::Inflation => "Inflation",
            CardType::WildShift => "Wild Shift",
            CardType::PhantomBid => "Phantom Bid",
            CardType::Insurance => "Insurance",
            CardType::DoubleChallenge => "Double Challenge",
            CardType::LateChallenge => "Late Challenge",
            CardType::Reroll => "Reroll",
            CardType::Polish => "Polish",
            CardType::Crack => "Crack",
            CardType::BlindSwap => "Blind Swap",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            CardType::Peek => "Secretly look at one opponent die.",
            CardType::Gauge => "Learn the size of two dice, not their faces.",
            CardType::FalseTell => "Pretend to peek at an opponent die.",
            CardType::Inflation => "Raise the current bid's quantity by one.",
            CardType::WildShift => "Change the face of the current bid.",
            CardType::PhantomBid => "Your next bid may ignore the raise rule.",
            CardType::Insurance => "If your Dudo fails, you keep your dice.",
            CardType::DoubleChallenge => "A Dudo against your bid costs double.",
            CardType::LateChallenge => "Challenge the bid before the current one.",
            CardType::Reroll => "Reroll one of your dice.",
            CardType::Polish => "Upgrade one of your dice to the next size.",
            CardType::Crack => "Downgrade one opponent die to the previous size.",
            CardType::BlindSwap => "Swap an opponent die with a random one of yours.",
        }
    }
}

impl std::fmt::Display for CardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Immutable card instance held in a hand or pile.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub card_type: CardType,
}

impl Card {
    pub const fn timing(&self) -> Timing {
        self.card_type.timing()
    }
}

/// `Any` cards are always playable; everything else needs an exact window match.
pub fn can_play_card(card: &Card, current: Timing) -> bool {
    match card.timing() {
        Timing::Any => true,
        timing => timing == current,
    }
}
