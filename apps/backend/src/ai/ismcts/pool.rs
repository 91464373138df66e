//! Worker pool for parallel search.
//!
//! Each worker owns its own tree and RNG and runs determinized iterations in
//! batches on the blocking thread pool. After every batch it reports its
//! cumulative root statistics; the coordinator keeps the latest report per
//! worker and merges them when the search ends. A worker that panics or never
//! reports contributes nothing; the report counts it as failed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::determinize::SearchSetup;
use super::sim::SimAction;
use super::tree::{ChildStats, Tree};
use super::run_iteration;

/// Iterations between two reports from one worker.
const BATCH: u64 = 32;

/// Everything one search needs, shared read-only by the workers.
#[derive(Debug, Clone)]
pub struct SearchJob {
    pub setup: SearchSetup,
    pub root_actions: Vec<SimAction>,
    pub exploration: f64,
    pub rollout_depth: u32,
    pub iterations: u64,
    pub deadline: Instant,
}

#[derive(Debug)]
struct BatchReport {
    worker: usize,
    iterations: u64,
    children: Vec<ChildStats>,
}

/// Merged result of one search.
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    pub iterations: u64,
    pub children: Vec<ChildStats>,
    pub workers: usize,
    pub failed_workers: usize,
}

impl SearchReport {
    pub fn all_workers_failed(&self) -> bool {
        self.workers > 0 && self.failed_workers == self.workers
    }
}

type WorkerFn = fn(usize, u64, u64, Arc<SearchJob>, Arc<AtomicBool>, mpsc::Sender<BatchReport>);

fn run_worker(
    worker: usize,
    seed: u64,
    quota: u64,
    job: Arc<SearchJob>,
    stop: Arc<AtomicBool>,
    tx: mpsc::Sender<BatchReport>,
) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut tree = Tree::new(job.root_actions.clone());
    let mut done = 0u64;

    while done < quota && !stop.load(Ordering::Relaxed) && Instant::now() < job.deadline {
        let batch_end = (done + BATCH).min(quota);
        while done < batch_end {
            run_iteration(&mut tree, &job.setup, job.exploration, job.rollout_depth, &mut rng);
            done += 1;
            if Instant::now() >= job.deadline {
                break;
            }
        }
        let report = BatchReport {
            worker,
            iterations: done,
            children: tree.root_stats(),
        };
        if tx.blocking_send(report).is_err() {
            break;
        }
    }
}

fn merge(latest: &HashMap<usize, BatchReport>) -> (u64, Vec<ChildStats>) {
    let mut merged: Vec<ChildStats> = Vec::new();
    let mut iterations = 0;
    for report in latest.values() {
        iterations += report.iterations;
        for child in &report.children {
            match merged.iter_mut().find(|m| m.action == child.action) {
                Some(m) => {
                    m.visits += child.visits;
                    m.wins += child.wins;
                }
                None => merged.push(*child),
            }
        }
    }
    (iterations, merged)
}

/// Run `job` on `seeds.len()` workers until the deadline or the iteration
/// target, whichever comes first.
pub async fn run_search(job: SearchJob, seeds: Vec<u64>) -> SearchReport {
    run_with(job, seeds, run_worker).await
}

async fn run_with(job: SearchJob, seeds: Vec<u64>, worker_fn: WorkerFn) -> SearchReport {
    let spawned = seeds.len();
    let workers = seeds.len().max(1);
    let quota = job.iterations.div_ceil(workers as u64);
    let deadline = tokio::time::Instant::from_std(job.deadline);
    let target = job.iterations;
    let job = Arc::new(job);
    let stop = Arc::new(AtomicBool::new(false));
    let (tx, mut rx) = mpsc::channel::<BatchReport>(workers * 4);

    let handles: Vec<JoinHandle<()>> = seeds
        .into_iter()
        .enumerate()
        .map(|(worker, seed)| {
            let job = Arc::clone(&job);
            let stop = Arc::clone(&stop);
            let tx = tx.clone();
            tokio::task::spawn_blocking(move || worker_fn(worker, seed, quota, job, stop, tx))
        })
        .collect();
    drop(tx);

    let mut latest: HashMap<usize, BatchReport> = HashMap::new();
    let mut all_exited = false;
    loop {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Ok(Some(report)) => {
                latest.insert(report.worker, report);
                let total: u64 = latest.values().map(|r| r.iterations).sum();
                if total >= target {
                    break;
                }
            }
            // Every worker has dropped its sender.
            Ok(None) => {
                all_exited = true;
                break;
            }
            Err(_) => {
                debug!("Search deadline reached");
                break;
            }
        }
    }
    stop.store(true, Ordering::Relaxed);
    while let Ok(report) = rx.try_recv() {
        latest.insert(report.worker, report);
    }

    let mut failed_workers = 0;
    for handle in handles {
        if all_exited || handle.is_finished() {
            if let Err(err) = handle.await {
                warn!(error = %err, "Search worker failed");
                failed_workers += 1;
            }
        } else {
            // Still winding down; it will see the stop flag.
            tokio::spawn(async move {
                if let Err(err) = handle.await {
                    warn!(error = %err, "Search worker failed after the deadline");
                }
            });
        }
    }

    let (iterations, children) = merge(&latest);
    SearchReport {
        iterations,
        children,
        workers: spawned,
        failed_workers,
    }
}
