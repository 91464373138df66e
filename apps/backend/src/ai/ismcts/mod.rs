//! Information-set Monte Carlo tree search over bids and calls.
//!
//! Every iteration samples a fresh table consistent with the searching seat's
//! knowledge, walks the shared tree with UCT, expands one action, rolls out
//! with the naive heuristic, and backs the result up. Actions that exist in
//! the tree do not depend on hidden dice, so one tree serves every sample.

pub mod determinize;
pub mod pool;
pub mod sim;
pub mod tree;

use std::time::Instant;

use rand::Rng;
use tracing::debug;

use crate::ai::config::AiConfig;
use crate::ai::decision::AiAction;
use crate::ai::trait_def::AiError;
use crate::domain::bidding::minimal_raises;
use crate::domain::dice::bid_faces;
use crate::domain::player_view::AiGameContext;
pub use determinize::SearchSetup;
pub use pool::{run_search, SearchJob, SearchReport};
pub use sim::SimAction;
use tree::{most_visited, Tree, ROOT};

/// One selection / expansion / rollout / backpropagation pass.
pub fn run_iteration<R: Rng + ?Sized>(
    tree: &mut Tree,
    setup: &SearchSetup,
    exploration: f64,
    rollout_depth: u32,
    rng: &mut R,
) {
    let mut state = setup.determinize(rng);
    let mut node = ROOT;

    loop {
        if state.is_terminal() {
            break;
        }
        if tree.has_untried(node) {
            if let Some(action) = tree.take_untried(node, rng) {
                state.apply(action);
                let untried = state.actions();
                node = tree.expand(node, action, untried, state.root_to_act());
            }
            break;
        }
        match tree.select_child(node, exploration) {
            Some(child) => {
                if let Some(action) = tree.node(child).action {
                    state.apply(action);
                }
                node = child;
            }
            None => break,
        }
    }

    let reward = state.rollout(rollout_depth);
    tree.backpropagate(node, reward);
}

/// Root actions, built from the context's legal helpers so the winner always
/// passes validation: the minimum raise on each face, one step above it on
/// the two faces this seat holds most of, and every open call.
pub fn root_actions(ctx: &AiGameContext) -> Vec<SimAction> {
    let legal = ctx.legal_bids();
    if legal.is_empty() && !ctx.can_call_dudo() {
        return Vec::new();
    }
    let current = ctx.current_bid();
    let mut out: Vec<SimAction> = minimal_raises(current.as_ref(), ctx.total_dice())
        .into_iter()
        .filter(|b| legal.contains(b))
        .map(|(quantity, face)| SimAction::Bid { quantity, face })
        .collect();

    let mut faces: Vec<(u8, usize)> = bid_faces()
        .map(|f| (f, ctx.my_dice().iter().filter(|d| d.matches(f)).count()))
        .collect();
    faces.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
    for &(face, _) in faces.iter().take(2) {
        let step = minimal_raises(current.as_ref(), ctx.total_dice())
            .into_iter()
            .find(|&(_, f)| f == face)
            .map(|(q, f)| (q + 1, f));
        if let Some((quantity, face)) = step {
            if legal.contains(&(quantity, face)) {
                out.push(SimAction::Bid { quantity, face });
            }
        }
    }

    if ctx.can_call_dudo() {
        out.push(SimAction::Dudo);
    }
    if ctx.can_call_jonti() {
        out.push(SimAction::Jonti);
    }
    if ctx.can_call_late_dudo() {
        out.push(SimAction::LateDudo);
    }
    out
}

pub fn to_ai_action(action: SimAction) -> AiAction {
    match action {
        SimAction::Bid { quantity, face } => AiAction::Bid { quantity, face },
        SimAction::Dudo => AiAction::Dudo { late: false },
        SimAction::LateDudo => AiAction::Dudo { late: true },
        SimAction::Jonti => AiAction::Jonti,
    }
}

/// Outcome of a finished search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub action: AiAction,
    pub win_rate: f64,
    pub report: SearchReport,
}

/// Search from `ctx` with `config`'s budget. Errors with `WorkerFailure` when
/// every worker died and with `Timeout` when no iteration completed, so the
/// caller can fall back.
pub async fn search(
    ctx: &AiGameContext,
    config: &AiConfig,
    worker_seeds: Vec<u64>,
) -> Result<SearchOutcome, AiError> {
    let setup = SearchSetup::from_context(ctx)
        .ok_or_else(|| AiError::InvalidMove("Seat is not on the table".into()))?;
    let root = root_actions(ctx);
    if root.is_empty() {
        return Err(AiError::InvalidMove("No legal action available".into()));
    }
    let started = Instant::now();
    let job = SearchJob {
        setup,
        root_actions: root,
        exploration: config.exploration,
        rollout_depth: config.rollout_depth,
        iterations: config.iterations as u64,
        deadline: started + config.time_budget(),
    };

    let report = run_search(job, worker_seeds).await;
    let best = best_of(&report)?;
    debug!(
        seat = ctx.seat,
        iterations = report.iterations,
        failed_workers = report.failed_workers,
        elapsed_ms = started.elapsed().as_millis() as u64,
        visits = best.visits,
        "Search finished"
    );
    Ok(SearchOutcome {
        action: to_ai_action(best.action),
        win_rate: best.wins / best.visits.max(1) as f64,
        report,
    })
}

fn best_of(report: &SearchReport) -> Result<tree::ChildStats, AiError> {
    if report.all_workers_failed() {
        return Err(AiError::WorkerFailure(format!(
            "all {} search workers failed",
            report.workers
        )));
    }
    most_visited(&report.children).ok_or(AiError::Timeout)
}
