//! Abalone-MCTS: command-line driver.
//!
//! ## Usage
//!
//! - `abalone-mcts` - Show a demo
//! - `abalone-mcts demo` - Run one search from the starting position
//! - `abalone-mcts selfplay` - Play a full game between two players
//! - `abalone-mcts moves [LAYOUT]` - List the legal moves of a position

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use abalone_mcts::board::Player;
use abalone_mcts::constants::{EXPLORATION, MAX_PLAYOUT_PLIES, N_ROLLOUTS};
use abalone_mcts::mcts::{Mcts, SearchConfig, terminal_reward};
use abalone_mcts::movegen::legal_moves;
use abalone_mcts::playout::random_move;
use abalone_mcts::position::BoardState;

/// Abalone-MCTS: an Abalone engine with a Monte Carlo Tree Search player
#[derive(Parser)]
#[command(name = "abalone-mcts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log search details (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single search from the starting position
    Demo(SearchArgs),
    /// Play a full game and print every position
    Selfplay {
        #[command(flatten)]
        search: SearchArgs,
        /// Opponent of the search player (who moves first)
        #[arg(long, value_enum, default_value_t = Opponent::Mcts)]
        opponent: Opponent,
        /// Stop after this many moves
        #[arg(long, default_value_t = 200)]
        max_moves: usize,
    },
    /// List legal moves for the side to move
    Moves {
        /// Layout file (nine rows of X, O and .); defaults to the start position
        layout: Option<PathBuf>,
        /// Side to move in the layout
        #[arg(long, value_enum, default_value_t = Side::One)]
        turn: Side,
    },
}

#[derive(Args, Clone)]
struct SearchArgs {
    /// Rollouts per move
    #[arg(short, long, default_value_t = N_ROLLOUTS)]
    rollouts: usize,
    /// UCT exploration coefficient
    #[arg(long, default_value_t = EXPLORATION)]
    exploration: f64,
    /// Half-moves before a playout is scored as a draw
    #[arg(long, default_value_t = MAX_PLAYOUT_PLIES)]
    max_plies: usize,
    /// Time limit per move in milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,
    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

impl SearchArgs {
    fn config(&self) -> SearchConfig {
        let mut config = SearchConfig::default()
            .with_rollouts(self.rollouts)
            .with_exploration(self.exploration)
            .with_max_playout_plies(self.max_plies);
        if let Some(ms) = self.time_limit_ms {
            config = config.with_time_limit(Duration::from_millis(ms));
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

impl Default for SearchArgs {
    fn default() -> Self {
        Self {
            rollouts: N_ROLLOUTS,
            exploration: EXPLORATION,
            max_plies: MAX_PLAYOUT_PLIES,
            time_limit_ms: None,
            seed: None,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Opponent {
    /// Another MCTS player with the same settings
    Mcts,
    /// Uniformly random legal moves
    Random,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Side {
    One,
    Two,
}

impl From<Side> for Player {
    fn from(side: Side) -> Self {
        match side {
            Side::One => Player::One,
            Side::Two => Player::Two,
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "abalone_mcts=debug" } else { "abalone_mcts=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Commands::Selfplay {
            search,
            opponent,
            max_moves,
        }) => run_selfplay(&search, opponent, max_moves),
        Some(Commands::Moves { layout, turn }) => run_moves(layout, turn.into()),
        Some(Commands::Demo(search)) => run_demo(&search),
        None => run_demo(&SearchArgs::default()),
    }
}

fn run_demo(args: &SearchArgs) -> Result<()> {
    println!("Abalone-MCTS: Abalone Monte Carlo Tree Search\n");

    let pos = BoardState::new();
    println!("{pos}");
    println!(
        "{} legal moves for {}",
        legal_moves(&pos, pos.turn()).len(),
        pos.turn()
    );

    let mut mcts = Mcts::new(args.config());
    println!("Running {} rollouts...", args.rollouts);
    let decision = mcts.search(&pos).context("search failed")?;
    println!(
        "Best move: {} (visits {}, mean reward {:.3})",
        decision.mv,
        decision.stats.visits,
        decision.stats.mean()
    );
    println!("\n{}", decision.state);
    Ok(())
}

fn run_selfplay(args: &SearchArgs, opponent: Opponent, max_moves: usize) -> Result<()> {
    let mut mcts = Mcts::new(args.config());
    let mut rng = args.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
    let mut pos = BoardState::new();
    println!("{pos}");

    for n in 1..=max_moves {
        if pos.is_terminal() {
            break;
        }
        let searcher = pos.turn() == Player::One || opponent == Opponent::Mcts;
        let (mv, next) = if searcher {
            let d = mcts.search(&pos).context("search failed")?;
            (d.mv, d.state)
        } else {
            match random_move(&pos, &mut rng) {
                Some(choice) => choice,
                None => bail!("{} has no legal move", pos.turn()),
            }
        };
        info!(move_number = n, player = %pos.turn(), %mv, "move played");
        println!("{n}. {}: {mv}", pos.turn());
        pos = next;
        println!("{pos}");
        println!(
            "marbles: X {}  O {}",
            pos.marble_count(Player::One),
            pos.marble_count(Player::Two)
        );
    }

    match pos.winner() {
        Some(winner) => {
            let reward = terminal_reward(&pos)?;
            println!("{winner} wins (reward for {} to move: {reward})", pos.turn());
        }
        None => println!("No winner after {max_moves} moves"),
    }
    Ok(())
}

fn run_moves(layout: Option<PathBuf>, turn: Player) -> Result<()> {
    let pos = match layout {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            BoardState::from_layout(&text, turn)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => BoardState::new(),
    };

    println!("{pos}");
    let moves = legal_moves(&pos, pos.turn());
    println!("{} legal moves for {}:", moves.len(), pos.turn());
    for mv in moves {
        println!("  {mv}");
    }
    Ok(())
}
