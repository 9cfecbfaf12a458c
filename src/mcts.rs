//! Monte Carlo Tree Search (MCTS) with UCT selection and random playouts.
//!
//! Each rollout runs four phases:
//! 1. Selection: descend from the root with UCT through fully explored nodes,
//!    stopping at an unexpanded or childless node, or stepping into one of the
//!    current node's unexplored children
//! 2. Expansion: record the successors of the reached node (once)
//! 3. Simulation: random playout to the end of the game
//! 4. Backpropagation: update visits and rewards along the path, flipping the
//!    reward at every ply
//!
//! Statistics are keyed by [`BoardState`] and live in a [`SearchSession`] that
//! is cleared at the start and end of every move decision.
//!
//! Reward convention: the statistics of a node are from the point of view of
//! the player who moved *into* that node, so a parent picks the child with the
//! highest mean reward.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use fastrand::Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::constants::{EXPLORATION, MAX_PLAYOUT_PLIES, N_ROLLOUTS};
use crate::movegen::successors;
use crate::playout::{playout, random_move};
use crate::position::{BoardState, Move};

/// Errors raised by the search driver.
///
/// These are contract violations by the caller, unlike [`MoveError`]
/// which reports an illegal move.
///
/// [`MoveError`]: crate::position::MoveError
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("cannot choose a move in a finished game")]
    TerminalRoot,
    #[error("reward requested for a position that is not terminal")]
    NotTerminal,
    #[error("no legal moves available")]
    NoLegalMoves,
}

/// Configuration for a move decision.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Rollouts per decision.
    pub rollouts: usize,
    /// UCT exploration coefficient.
    pub exploration: f64,
    /// Half-moves after which a playout is scored as a draw.
    pub max_playout_plies: usize,
    /// Optional wall-clock cap; at least one rollout still runs.
    pub time_limit: Option<Duration>,
    /// Seed for reproducible searches. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            rollouts: N_ROLLOUTS,
            exploration: EXPLORATION,
            max_playout_plies: MAX_PLAYOUT_PLIES,
            time_limit: None,
            seed: None,
        }
    }
}

impl SearchConfig {
    pub fn with_rollouts(mut self, rollouts: usize) -> Self {
        self.rollouts = rollouts;
        self
    }

    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn with_max_playout_plies(mut self, plies: usize) -> Self {
        self.max_playout_plies = plies;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Visit count and accumulated reward of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeStats {
    /// Number of visits (N)
    pub visits: u32,
    /// Sum of rewards (Q)
    pub reward: f64,
}

impl NodeStats {
    /// Mean reward, or 0 for an unvisited node.
    #[inline]
    pub fn mean(&self) -> f64 {
        if self.visits > 0 {
            self.reward / f64::from(self.visits)
        } else {
            0.0
        }
    }

    fn record(&mut self, reward: f64) {
        self.visits += 1;
        self.reward += reward;
    }
}

/// Search statistics for a single move decision.
#[derive(Debug, Default)]
pub struct SearchSession {
    stats: HashMap<BoardState, NodeStats>,
    /// Successors of every expanded node. A node is "explored" once it has
    /// an entry here.
    children: HashMap<BoardState, Vec<(Move, BoardState)>>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all statistics.
    pub fn reset(&mut self) {
        self.stats.clear();
        self.children.clear();
    }

    /// Statistics of `state`; zero if it was never visited.
    pub fn stats(&self, state: &BoardState) -> NodeStats {
        self.stats.get(state).copied().unwrap_or_default()
    }

    /// Recorded successors of `state`, if it has been expanded.
    pub fn children(&self, state: &BoardState) -> Option<&[(Move, BoardState)]> {
        self.children.get(state).map(Vec::as_slice)
    }

    pub fn is_expanded(&self, state: &BoardState) -> bool {
        self.children.contains_key(state)
    }

    /// Number of expanded nodes.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// The move picked by a search.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub mv: Move,
    /// Position after `mv`
    pub state: BoardState,
    /// Statistics of the chosen child (zero for a random fallback)
    pub stats: NodeStats,
    /// Rollouts that were run
    pub rollouts: usize,
}

/// MCTS driver: owns the configuration, the session and the RNG.
pub struct Mcts {
    config: SearchConfig,
    session: SearchSession,
    rng: Rng,
}

impl Default for Mcts {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl Mcts {
    pub fn new(config: SearchConfig) -> Self {
        let rng = config.seed.map_or_else(Rng::new, Rng::with_seed);
        Self {
            config,
            session: SearchSession::new(),
            rng,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Start a new decision with empty statistics.
    pub fn begin(&mut self) {
        self.session.reset();
    }

    /// Run a full decision: rollouts from `root`, pick a move, then clear
    /// the session.
    ///
    /// # Errors
    /// `SearchError::TerminalRoot` if the game at `root` is already over.
    pub fn search(&mut self, root: &BoardState) -> Result<Decision, SearchError> {
        if root.is_terminal() {
            return Err(SearchError::TerminalRoot);
        }

        self.begin();
        let start = Instant::now();
        let mut done = 0;
        while done < self.config.rollouts {
            if let Some(limit) = self.config.time_limit {
                if done > 0 && start.elapsed() >= limit {
                    break;
                }
            }
            self.rollout(root);
            done += 1;
        }

        let decision = self.choose(root).map(|d| Decision {
            rollouts: done,
            ..d
        });

        if tracing::enabled!(tracing::Level::DEBUG) {
            for (mv, stats) in self.root_children(root) {
                debug!(%mv, visits = stats.visits, reward = stats.reward, "root child");
            }
        }
        if let Ok(d) = &decision {
            debug!(
                rollouts = done,
                root_visits = self.session.stats(root).visits,
                nodes = self.session.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                mv = %d.mv,
                "search finished"
            );
        }

        self.session.reset();
        decision
    }

    /// Pick the final move from the statistics gathered so far.
    ///
    /// The child with the highest mean reward wins, ties going to the more
    /// visited one. Unvisited children are never picked; if the root has no
    /// visited child a uniformly random legal move is returned instead.
    pub fn choose(&mut self, root: &BoardState) -> Result<Decision, SearchError> {
        if root.is_terminal() {
            return Err(SearchError::TerminalRoot);
        }

        let session = &self.session;
        let best = session.children(root).and_then(|children| {
            children
                .iter()
                .filter(|(_, s)| session.stats(s).visits > 0)
                .max_by(|(_, a), (_, b)| {
                    let (a, b) = (session.stats(a), session.stats(b));
                    a.mean()
                        .total_cmp(&b.mean())
                        .then(a.visits.cmp(&b.visits))
                })
                .cloned()
        });

        let (mv, state) = match best {
            Some(child) => child,
            None => random_move(root, &mut self.rng).ok_or(SearchError::NoLegalMoves)?,
        };
        let stats = self.session.stats(&state);
        Ok(Decision {
            mv,
            state,
            stats,
            rollouts: 0,
        })
    }

    /// One select / expand / simulate / backpropagate cycle from `root`.
    pub fn rollout(&mut self, root: &BoardState) {
        let path = self.select(root);
        let Some(leaf) = path.last().cloned() else {
            return;
        };
        self.expand(&leaf);
        let reward = self.simulate(&leaf);
        trace!(depth = path.len(), reward, "rollout");
        self.backpropagate(&path, reward);
    }

    /// Moves available at `root` with their statistics, for diagnostics.
    pub fn root_children(&self, root: &BoardState) -> Vec<(Move, NodeStats)> {
        self.session
            .children(root)
            .unwrap_or_default()
            .iter()
            .map(|(mv, s)| (mv.clone(), self.session.stats(s)))
            .collect()
    }

    /// Descend to the node the next rollout should evaluate.
    fn select(&mut self, root: &BoardState) -> Vec<BoardState> {
        let mut path = vec![root.clone()];
        loop {
            let node = &path[path.len() - 1];
            let children = match self.session.children.get(node) {
                Some(c) if !c.is_empty() => c,
                // Unexpanded or terminal
                _ => return path,
            };

            let unexplored: Vec<&BoardState> = children
                .iter()
                .map(|(_, s)| s)
                .filter(|s| !self.session.children.contains_key(*s))
                .collect();
            if !unexplored.is_empty() {
                let pick = unexplored[self.rng.usize(..unexplored.len())].clone();
                path.push(pick);
                return path;
            }

            let Some(next) = self.uct_select(node).cloned() else {
                return path;
            };
            // A position can recur (marbles moved back and forth). The path
            // holds each state once, so stop at the current node instead.
            if path.contains(&next) {
                return path;
            }
            path.push(next);
        }
    }

    fn expand(&mut self, leaf: &BoardState) {
        if self.session.children.contains_key(leaf) {
            return;
        }
        self.session.children.insert(leaf.clone(), successors(leaf));
    }

    fn simulate(&mut self, leaf: &BoardState) -> f64 {
        playout(leaf, &mut self.rng, self.config.max_playout_plies)
    }

    fn backpropagate(&mut self, path: &[BoardState], mut reward: f64) {
        for state in path.iter().rev() {
            match self.session.stats.get_mut(state) {
                Some(stats) => stats.record(reward),
                None => {
                    let mut stats = NodeStats::default();
                    stats.record(reward);
                    self.session.stats.insert(state.clone(), stats);
                }
            }
            // 1 for the player who moved into this node is 0 for the one
            // who moved into its parent
            reward = 1.0 - reward;
        }
    }

    /// Child of `node` with the highest UCT score.
    ///
    /// Only called once every child is explored, which guarantees each has
    /// at least one visit.
    fn uct_select(&self, node: &BoardState) -> Option<&BoardState> {
        let children = self.session.children.get(node)?;
        let log_n = f64::from(self.session.stats(node).visits).ln();
        children.iter().map(|(_, s)| s).max_by(|a, b| {
            self.uct_score(a, log_n)
                .total_cmp(&self.uct_score(b, log_n))
        })
    }

    fn uct_score(&self, child: &BoardState, log_parent_visits: f64) -> f64 {
        let stats = self.session.stats(child);
        debug_assert!(stats.visits > 0, "UCT score of an unvisited child");
        let n = f64::from(stats.visits);
        stats.reward / n + self.config.exploration * (log_parent_visits / n).sqrt()
    }
}

/// Reward of a finished position for the player to move in it.
///
/// # Errors
/// `SearchError::NotTerminal` if the game is still running.
pub fn terminal_reward(state: &BoardState) -> Result<f64, SearchError> {
    state.reward().ok_or(SearchError::NotTerminal)
}

/// Choose a move for the side to move with `rollouts` rollouts and default
/// settings.
pub fn choose_move(state: &BoardState, rollouts: usize) -> Result<Move, SearchError> {
    let mut mcts = Mcts::new(SearchConfig::default().with_rollouts(rollouts));
    mcts.search(state).map(|d| d.mv)
}
