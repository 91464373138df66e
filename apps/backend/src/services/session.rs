//! One table: the authoritative state plus everything the server keeps
//! alongside it (AI strategies, the shared opponent model, driver flags).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::ai::{create_ai, AiConfig, AiPlayer, AiStrategy, Easy, OpponentModel};
use crate::config::GameSettings;
use crate::domain::challenge::RoundOutcome;
use crate::domain::events::DomainEvent;
use crate::domain::player_view::AiGameContext;
use crate::domain::seed_derivation::derive_ai_seed;
use crate::domain::state::{Difficulty, GameState, PlayerId};
use crate::errors::domain::DomainError;

/// Seat used to derive the fallback strategy's seed; never a real seat.
const FALLBACK_SEAT: u8 = u8::MAX;

pub struct GameSession {
    pub id: Uuid,
    pub state: GameState,
    pub settings: GameSettings,
    /// Bid history and bluff statistics shared by every AI at the table.
    pub opponents: OpponentModel,
    ai_config: AiConfig,
    ais: HashMap<PlayerId, (Difficulty, Arc<AiStrategy>)>,
    /// Random legal play used when a strategy's decision is rejected.
    fallback: Easy,
    /// Reaction prompts already put to an AI at a given version.
    asked: HashSet<(PlayerId, u64)>,
    pub(crate) driving: bool,
    /// Bumped whenever a call window opens; timers carry the value they were
    /// armed with.
    pub(crate) call_seq: u64,
    pub created_at: OffsetDateTime,
    pub last_activity: OffsetDateTime,
}

impl GameSession {
    pub fn new(id: Uuid, settings: GameSettings, ai_config: AiConfig) -> Self {
        let settings = settings.clamped();
        let state = GameState::new(settings.to_rules(), settings.seed);
        let fallback_seed = settings.seed.map(|s| derive_ai_seed(s, FALLBACK_SEAT));
        let now = OffsetDateTime::now_utc();
        Self {
            id,
            state,
            settings,
            opponents: OpponentModel::new(),
            ai_config,
            ais: HashMap::new(),
            fallback: Easy::new(fallback_seed),
            asked: HashSet::new(),
            driving: false,
            call_seq: 0,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = OffsetDateTime::now_utc();
    }

    pub fn version(&self) -> u64 {
        self.state.version
    }

    pub fn ai(&self, seat: PlayerId) -> Option<Arc<AiStrategy>> {
        self.ais.get(&seat).map(|(_, ai)| Arc::clone(ai))
    }

    pub fn ai_seats(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.ais.keys().copied()
    }

    pub fn fallback(&self) -> &Easy {
        &self.fallback
    }

    pub fn context_for(&self, seat: PlayerId) -> Result<AiGameContext, DomainError> {
        AiGameContext::build(&self.state, seat, &self.opponents)
    }

    pub(crate) fn was_asked(&self, seat: PlayerId) -> bool {
        self.asked.contains(&(seat, self.state.version))
    }

    pub(crate) fn mark_asked(&mut self, seat: PlayerId) {
        self.asked.insert((seat, self.state.version));
    }

    /// Keep one strategy per seated AI: build missing ones, drop those whose
    /// seat is gone or changed hands.
    pub fn sync_ais(&mut self) {
        let seated: HashMap<PlayerId, Difficulty> = self
            .state
            .players
            .iter()
            .filter_map(|p| p.difficulty().map(|d| (p.id, d)))
            .collect();

        self.ais
            .retain(|seat, (difficulty, _)| seated.get(seat) == Some(difficulty));

        for (seat, difficulty) in seated {
            if self.ais.contains_key(&seat) {
                continue;
            }
            let mut config = self.ai_config.clone();
            if let Some(game_seed) = self.settings.seed {
                config.seed = Some(derive_ai_seed(game_seed, seat));
            }
            let ai = create_ai(difficulty, config);
            debug!(game_id = %self.id, seat, ai = ai.name(), "AI strategy created");
            self.ais.insert(seat, (difficulty, Arc::new(ai)));
        }
    }

    /// Feed what just happened to the opponent model and the AIs.
    pub fn observe(&mut self, events: &[DomainEvent]) {
        for event in events {
            match event {
                DomainEvent::BidMade { bid, .. } => {
                    let prev = self.state.previous_bid;
                    self.opponents
                        .observe_bid(self.state.round_no, bid, prev.as_ref());
                }
                DomainEvent::DudoResolved(result) => {
                    self.round_resolved(&RoundOutcome::Dudo(result.clone()));
                }
                DomainEvent::JontiResolved(result) => {
                    self.round_resolved(&RoundOutcome::Jonti(result.clone()));
                }
                DomainEvent::RoundStarted { .. } => self.asked.clear(),
                DomainEvent::GameReset => self.reset_models(),
                _ => {}
            }
        }
    }

    fn round_resolved(&mut self, outcome: &RoundOutcome) {
        self.opponents.observe_outcome(self.state.round_no, outcome);
        for (seat, (_, ai)) in &self.ais {
            if let Ok(ctx) = AiGameContext::build(&self.state, *seat, &self.opponents) {
                ai.update_models(&ctx, outcome);
            }
        }
    }

    fn reset_models(&mut self) {
        self.opponents.reset();
        self.asked.clear();
        for (_, ai) in self.ais.values() {
            ai.reset();
        }
    }
}
