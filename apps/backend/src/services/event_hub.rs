//! Per-session fan-out of server events.
//!
//! Subscribers are keyed by an opaque token and optionally bound to the seat
//! they view the table from. Unicast events only reach the matching seat.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::player_view::private_info;
use crate::domain::snapshot::{public_state, PublicGameState};
use crate::domain::state::{GameState, PlayerId};
use crate::protocol::{Audience, Outbound, ServerEvent};

struct Subscriber {
    viewer: Option<PlayerId>,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

impl Subscriber {
    fn wants(&self, audience: Audience) -> bool {
        match audience {
            Audience::All => true,
            Audience::Only(seat) => self.viewer == Some(seat),
        }
    }
}

/// Receiving end handed to a transport.
pub struct Subscription {
    pub token: Uuid,
    pub events: mpsc::UnboundedReceiver<ServerEvent>,
}

#[derive(Default)]
pub struct EventHub {
    games: DashMap<Uuid, DashMap<Uuid, Subscriber>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self {
            games: DashMap::new(),
        }
    }

    pub fn subscribe(&self, game_id: Uuid, viewer: Option<PlayerId>) -> Subscription {
        let (tx, events) = mpsc::unbounded_channel();
        let token = Uuid::new_v4();
        let entry = self.games.entry(game_id).or_default();
        entry.insert(token, Subscriber { viewer, tx });
        debug!(%game_id, ?viewer, "Subscriber registered");
        Subscription { token, events }
    }

    /// Subscribe and queue the current snapshot for this subscriber only.
    pub fn subscribe_with_snapshot(
        &self,
        game_id: Uuid,
        viewer: Option<PlayerId>,
        state: &GameState,
    ) -> Subscription {
        let (tx, events) = mpsc::unbounded_channel();
        let sub = Subscriber { viewer, tx };
        for event in snapshot_batch(&sub, state, public_state(state)) {
            let _ = sub.tx.send(event);
        }
        let token = Uuid::new_v4();
        self.games.entry(game_id).or_default().insert(token, sub);
        Subscription { token, events }
    }

    pub fn unsubscribe(&self, game_id: Uuid, token: Uuid) {
        if let Some(entry) = self.games.get(&game_id) {
            entry.remove(&token);
        }
        self.games.remove_if(&game_id, |_, subs| subs.is_empty());
    }

    pub fn subscriber_count(&self, game_id: Uuid) -> usize {
        self.games.get(&game_id).map(|e| e.len()).unwrap_or(0)
    }

    pub fn publish(&self, game_id: Uuid, outbound: &[Outbound]) {
        if outbound.is_empty() {
            return;
        }
        self.deliver(game_id, |sub| {
            outbound
                .iter()
                .filter(|o| sub.wants(o.audience))
                .map(|o| o.event.clone())
                .collect()
        });
    }

    /// Send one event to whoever views the table from `seat`.
    pub fn send_to(&self, game_id: Uuid, seat: PlayerId, event: ServerEvent) {
        self.publish(game_id, &[Outbound::only(seat, event)]);
    }

    /// Public snapshot for everyone, plus each seated viewer's private info.
    pub fn send_snapshot(&self, game_id: Uuid, state: &GameState) {
        let public = public_state(state);
        self.deliver(game_id, |sub| snapshot_batch(sub, state, public.clone()));
    }

    fn deliver<F>(&self, game_id: Uuid, mut batch_for: F)
    where
        F: FnMut(&Subscriber) -> Vec<ServerEvent>,
    {
        let Some(entry) = self.games.get(&game_id) else {
            return;
        };
        let mut closed = Vec::new();
        for sub in entry.iter() {
            for event in batch_for(sub.value()) {
                if sub.value().tx.send(event).is_err() {
                    closed.push(*sub.key());
                    break;
                }
            }
        }
        for token in closed {
            warn!(%game_id, %token, "Dropping closed subscriber");
            entry.remove(&token);
        }
    }
}

fn snapshot_batch(
    sub: &Subscriber,
    state: &GameState,
    public: PublicGameState,
) -> Vec<ServerEvent> {
    let mut batch = vec![ServerEvent::GameStateUpdate { state: public }];
    if let Some(info) = sub.viewer.and_then(|seat| private_info(state, seat).ok()) {
        batch.push(ServerEvent::PrivateInfo { info });
    }
    batch
}
