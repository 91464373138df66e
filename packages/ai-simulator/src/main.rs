//! AI Simulator CLI - in-memory Perudo games between AI tiers.
//!
//! Runs complete games against the real engine without the session layer,
//! for comparing tiers and catching illegal proposals at volume.

mod metrics;
mod output;
mod simulator;
mod types;

use std::time::Instant;

use clap::Parser;
use metrics::{build_game_metrics, GameRun};
use output::OutputWriter;
use perudo_backend::ai::{create_ai, AiConfig, AiStrategy};
use perudo_backend::domain::rules::RuleSet;
use perudo_backend::domain::seed_derivation::derive_ai_seed;
use perudo_backend::domain::state::Difficulty;
use simulator::{seat_labels, GameResult, Simulator};
use tracing::{info, warn};
use types::{AiType, MetricsLevel, OutputFormat};

#[derive(Parser)]
#[command(name = "ai-simulator")]
#[command(about = "In-memory Perudo simulator for AI evaluation")]
struct Args {
    /// Number of games to simulate
    #[arg(short, long, default_value = "1")]
    games: u32,

    /// AI tier per seat, comma separated (2 to 6 seats)
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = vec![AiType::Easy, AiType::Normal, AiType::Hard, AiType::ChuckNorris]
    )]
    seats: Vec<AiType>,

    /// Dice each player starts with
    #[arg(long, default_value = "5")]
    starting_dice: u8,

    /// Enable card draws and effects
    #[arg(long)]
    chaos: bool,

    /// Base seed; game N uses seed + N. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Search time budget per ChuckNorris decision
    #[arg(long, default_value = "200")]
    think_ms: u64,

    /// Search iteration cap per ChuckNorris decision
    #[arg(long, default_value = "2000")]
    iterations: u32,

    /// Search workers per ChuckNorris decision
    #[arg(long)]
    workers: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Show output summary and file paths
    #[arg(long)]
    show_output: bool,

    /// Output directory for results
    #[arg(long, default_value = "./simulation-results")]
    output_dir: String,

    /// Output format
    #[arg(long, default_value = "jsonl")]
    output_format: OutputFormat,

    /// Compress output files
    #[arg(long)]
    compress: bool,

    /// Metrics detail level
    #[arg(long, default_value = "detailed")]
    metrics_level: MetricsLevel,
}

impl std::fmt::Display for AiType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.difficulty().as_str())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Silent by default; warnings and errors only.
    let filter = if args.verbose {
        "debug"
    } else if args.show_output {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if !(2..=6).contains(&args.seats.len()) {
        return Err(format!("need 2 to 6 seats, got {}", args.seats.len()).into());
    }
    let tiers: Vec<Difficulty> = args.seats.iter().map(|s| s.difficulty()).collect();
    let ai_types = seat_labels(&tiers);
    let rules = RuleSet {
        starting_dice: args.starting_dice,
        max_dice_per_player: args.starting_dice,
        chaos_mode: args.chaos,
        ..RuleSet::default()
    }
    .normalized();

    if args.show_output {
        info!(games = args.games, seats = ?ai_types, "Starting AI simulator");
    }

    let mut output_writer =
        OutputWriter::new(&args.output_dir, &args.output_format, args.compress)?;
    let base_seed = args.seed.unwrap_or_else(rand::random);

    let start = Instant::now();
    let mut results = Vec::new();
    let mut errors = 0;

    for game_num in 1..=args.games {
        let game_seed = base_seed.wrapping_add(game_num as u64);
        let ais = build_ais(&args, &tiers, game_seed);
        let simulator = Simulator::new(game_seed, game_num, rules.clone());

        let game_start = Instant::now();
        match simulator.simulate_game(&ais).await {
            Ok(result) => {
                let run = GameRun {
                    game_id: game_num,
                    seed: game_seed,
                    ai_types: &ai_types,
                    starting_dice: rules.starting_dice,
                    total_games: args.games,
                    duration_ms: game_start.elapsed().as_secs_f64() * 1000.0,
                };
                let metrics = build_game_metrics(&run, &result, &args.metrics_level);
                if let Err(e) = output_writer.write_game(&metrics) {
                    warn!("Failed to write metrics for game {}: {}", game_num, e);
                }
                if args.verbose {
                    info!(
                        game = game_num,
                        winner = result.winner,
                        rounds = result.rounds.len(),
                        "Game completed"
                    );
                }
                results.push(result);
            }
            Err(e) => {
                errors += 1;
                warn!("Game {} failed: {}", game_num, e);
            }
        }
    }

    let elapsed = start.elapsed();
    let (jsonl_path, csv_path) = output_writer.output_paths();
    let jsonl_path = jsonl_path.cloned();
    let csv_path = csv_path.cloned();
    output_writer.finish()?;

    if args.show_output {
        if let Some(path) = jsonl_path {
            info!("Detailed results written to: {}", path.display());
        }
        if let Some(path) = csv_path {
            info!("Summary CSV written to: {}", path.display());
        }
        print_summary(&results, &ai_types, errors, elapsed, args.games);
    }

    Ok(())
}

fn build_ais(args: &Args, tiers: &[Difficulty], game_seed: u64) -> Vec<AiStrategy> {
    tiers
        .iter()
        .enumerate()
        .map(|(seat, &difficulty)| {
            let mut config = AiConfig::with_seed(derive_ai_seed(game_seed, seat as u8))
                .with_budget(args.think_ms, args.iterations);
            if let Some(workers) = args.workers {
                config = config.with_workers(workers);
            }
            create_ai(difficulty, config)
        })
        .collect()
}

fn print_summary(
    results: &[GameResult],
    ai_types: &[String],
    errors: u32,
    elapsed: std::time::Duration,
    total: u32,
) {
    println!("\n=== Simulation Summary ===");
    println!("Games completed: {}/{}", results.len(), total);
    if errors > 0 {
        println!("Errors: {}", errors);
    }
    println!("Total time: {:?}", elapsed);
    if results.is_empty() {
        return;
    }
    println!(
        "Average time per game: {:?}",
        elapsed / results.len() as u32
    );

    let seats = ai_types.len();
    let mut wins = vec![0u32; seats];
    let mut fallbacks = vec![0u32; seats];
    let mut dudos = vec![(0u32, 0u32); seats];
    for result in results {
        if let Some(w) = wins.get_mut(result.winner as usize) {
            *w += 1;
        }
        for (seat, tally) in result.seats.iter().enumerate().take(seats) {
            fallbacks[seat] += tally.fallbacks;
            dudos[seat].0 += tally.dudos_won;
            dudos[seat].1 += tally.dudos_called;
        }
    }

    println!("\n=== Results by Seat ===");
    for seat in 0..seats {
        let win_rate = wins[seat] as f64 / results.len() as f64 * 100.0;
        let (won, called) = dudos[seat];
        println!(
            "Seat {} ({}): wins={} ({:.1}%), dudo {}/{}, fallbacks={}",
            seat, ai_types[seat], wins[seat], win_rate, won, called, fallbacks[seat]
        );
    }
}
