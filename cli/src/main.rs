//! bluff CLI - Command-line harness for the bluffing game analyzer
//!
//! Builds and solves trees for a pair of starting hands, samples random
//! lines of play, tallies self-play tables for the probability oracle and
//! runs the Bayesian decision over opponent hypotheses.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bluff_engine::config::{
    AnalysisConfig, BuildOptions, ChallengeConvention, OraclePolicy, DEFAULT_MAX_NODES,
};
use bluff_engine::node::{Hand, Player};
use bluff_engine::oracle::{NoInformation, PathKey, PathTable, ProbabilityOracle};
use bluff_engine::solver::{solve, solve_parallel};
use bluff_engine::trace::{average_payoff, describe, equilibrium_path, guided_path, random_path};
use bluff_engine::Verdict;
use bluff_tree::selfplay::tally_starting_hands;
use bluff_tree::{analyze, build, TreeStats};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "bluff")]
#[command(version, about = "Equilibrium analysis for a two-player bluffing card game", long_about = None)]
struct Cli {
    /// Increase log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and solve one tree, then print the equilibrium path
    Solve(SolveArgs),

    /// Average payoff over sampled lines of play, random or oracle-guided
    Sample(SampleArgs),

    /// Enumerate self-play outcomes and write the path table as JSON
    Tally(TallyArgs),

    /// Recommend an opening move across opponent hypotheses
    Decide(DecideArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum ChallengeArg {
    Legacy,
    Resolved,
}

impl From<ChallengeArg> for ChallengeConvention {
    fn from(arg: ChallengeArg) -> Self {
        match arg {
            ChallengeArg::Legacy => ChallengeConvention::Legacy,
            ChallengeArg::Resolved => ChallengeConvention::Resolved,
        }
    }
}

/// Options shared by every command that builds a tree.
#[derive(Args)]
struct GameArgs {
    /// Player one's hand as TRUTHS,FAKES
    #[arg(long, value_parser = parse_hand)]
    p1: Hand,

    /// Player two's hand as TRUTHS,FAKES
    #[arg(long, value_parser = parse_hand)]
    p2: Hand,

    #[arg(long, default_value_t = 15)]
    max_depth: u32,

    /// Refuse to build trees larger than this many nodes
    #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
    max_nodes: u64,

    #[arg(long, value_enum, default_value = "legacy")]
    challenge: ChallengeArg,

    /// Only this player (1 or 2) consults the oracle
    #[arg(long, value_parser = parse_player)]
    informed: Option<Player>,

    /// JSON path table produced by `bluff tally`
    #[arg(long)]
    table: Option<PathBuf>,
}

impl GameArgs {
    fn options(&self) -> BuildOptions {
        BuildOptions {
            max_depth: self.max_depth,
            max_nodes: self.max_nodes,
            challenge: self.challenge.into(),
            oracle: self.informed.map_or(OraclePolicy::Both, OraclePolicy::Informed),
        }
    }
}

#[derive(Args)]
struct SolveArgs {
    #[command(flatten)]
    game: GameArgs,

    /// Solve the root's subtrees in parallel
    #[arg(long)]
    parallel: bool,
}

#[derive(Args)]
struct SampleArgs {
    #[command(flatten)]
    game: GameArgs,

    #[arg(long, default_value_t = 1000)]
    samples: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Let the oracle steer the players it informs instead of moving at random
    #[arg(long)]
    guided: bool,
}

#[derive(Args)]
struct TallyArgs {
    /// Cards per starting hand; every truth/fake split is enumerated
    #[arg(long, default_value_t = 3)]
    hand_size: u8,

    #[arg(long, default_value_t = 15)]
    max_depth: u32,

    /// Output JSON file
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct DecideArgs {
    /// YAML analysis description
    config: PathBuf,
}

fn parse_hand(s: &str) -> Result<Hand, String> {
    let (truths, fakes) = s
        .split_once(',')
        .ok_or_else(|| format!("expected TRUTHS,FAKES, got '{}'", s))?;
    let truths = truths.trim().parse().map_err(|e| format!("truths: {}", e))?;
    let fakes = fakes.trim().parse().map_err(|e| format!("fakes: {}", e))?;
    Ok(Hand::new(truths, fakes))
}

fn parse_player(s: &str) -> Result<Player, String> {
    match s {
        "1" | "one" => Ok(Player::One),
        "2" | "two" => Ok(Player::Two),
        _ => Err(format!("expected 1 or 2, got '{}'", s)),
    }
}

fn log(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )
    .context("failed to initialize logger")
}

fn load_oracle(table: Option<&Path>) -> Result<Box<dyn ProbabilityOracle>> {
    match table {
        Some(path) => {
            let table = PathTable::load(path)
                .with_context(|| format!("failed to load path table {}", path.display()))?;
            log::info!("loaded {} paths from {}", table.len(), path.display());
            Ok(Box::new(table))
        }
        None => Ok(Box::new(NoInformation)),
    }
}

fn run_solve(args: SolveArgs) -> Result<()> {
    let oracle = load_oracle(args.game.table.as_deref())?;
    let tree = build(args.game.p1, args.game.p2, oracle.as_ref(), &args.game.options())?;
    let stats = TreeStats::of(&tree);
    println!(
        "{} nodes: {} decisions, {} resolved, {} truncated, depth {}",
        stats.nodes, stats.decisions, stats.resolved, stats.truncated, stats.deepest
    );

    let solution = if args.parallel { solve_parallel(&tree) } else { solve(&tree) };
    if let Some(value) = solution.payoff(tree.root()) {
        println!("equilibrium value: {}", value);
    }
    println!();
    for id in equilibrium_path(&solution, tree.root()) {
        print!("{}", describe(&tree, id));
    }
    Ok(())
}

fn run_sample(args: SampleArgs) -> Result<()> {
    let oracle = load_oracle(args.game.table.as_deref())?;
    let options = args.game.options();
    let tree = build(args.game.p1, args.game.p2, oracle.as_ref(), &options)?;
    let mut rng = SmallRng::seed_from_u64(args.seed);
    let paths: Vec<_> = (0..args.samples)
        .map(|_| {
            if args.guided {
                guided_path(&tree, tree.root(), oracle.as_ref(), options.oracle, &mut rng)
            } else {
                random_path(&tree, tree.root(), &mut rng)
            }
        })
        .collect();
    if let Some(end) = paths.first().and_then(|path| path.last()).and_then(|&id| tree.get(id)) {
        println!("first line: {}", PathKey::from_steps(&end.history));
    }

    match average_payoff(&tree, &paths) {
        Some(average) => println!("average payoff over {} paths: {}", paths.len(), average),
        None => println!("no paths sampled"),
    }
    Ok(())
}

fn run_tally(args: TallyArgs) -> Result<()> {
    let table = tally_starting_hands(args.hand_size, args.max_depth)?;
    table
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("wrote {} paths to {}", table.len(), args.output.display());
    Ok(())
}

fn run_decide(args: DecideArgs) -> Result<()> {
    let config = AnalysisConfig::load(&args.config)?;
    let oracle = load_oracle(config.oracle_table.as_deref())?;
    let analysis = analyze(&config, oracle.as_ref())?;

    for tree in &analysis.trees {
        let value = tree.solution.payoff(tree.tree.root()).unwrap_or_default();
        println!(
            "opponent {} (prior {:.3}): {} nodes, value {}",
            tree.hypothesis.hand,
            tree.hypothesis.prior,
            tree.tree.len(),
            value
        );
    }

    match &analysis.verdict {
        Verdict::Play(recommendation) => {
            println!("recommended move: {}", recommendation.mv);
            println!("expected value  : {:.3}", recommendation.expected);
        }
        Verdict::NoFeasibleMove => println!("no move is legal under every hypothesis"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    log(cli.verbose)?;

    match cli.command {
        Commands::Solve(args) => run_solve(args),
        Commands::Sample(args) => run_sample(args),
        Commands::Tally(args) => run_tally(args),
        Commands::Decide(args) => run_decide(args),
    }
}
