//! # Bidirectional Search Engine
//!
//! Drives two frontiers, forward from the source and backward from the
//! target, over the implicit movie graph.
//!
//! ## Rounds
//! One round is one expansion step of the forward side followed by one of the
//! backward side. A step expands a single node (default) or the side's whole
//! current cost layer (`SearchConfig::layered`).
//!
//! ## Meeting rules
//! - Unit-cost: the first neighbor already admitted by the other side is the
//!   meeting node; that expansion stops and the round ends at once.
//! - Weighted: every crossing is scored by the sum of both sides' costs and
//!   the cheapest one is kept; the round always completes.
//!
//! In both cases the engine stops after the first round that recorded a
//! meeting, without proving that no shorter merged path exists. Layered mode
//! checks after every full layer instead; the result is then a shortest path
//! within the fan-out caps.
//!
//! If both frontiers run dry without meeting, the outcome carries no path but
//! still reports everything that was touched.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use catalog::{EntityCache, MovieId};

use crate::config::{SearchConfig, Strategy};
use crate::expansion::GraphExpander;
use crate::frontier::{Cost, CostFrontier, Frontier, QueueFrontier};
use crate::path::reconstruct;
use crate::processed::ProcessedSet;

/// Which frontier is being expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Forward,
    Backward,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Forward => f.write_str("Forward"),
            Side::Backward => f.write_str("Backward"),
        }
    }
}

/// A node admitted by both frontiers, with the summed cost through it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Meeting {
    pub movie_id: MovieId,
    pub cost: Cost,
}

/// Everything one search run produced
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub source: MovieId,
    pub target: MovieId,
    pub strategy: Strategy,
    pub meeting: Option<Meeting>,
    /// Source-to-target movie ids; `None` when the frontiers never met
    pub path: Option<Vec<MovieId>>,
    /// Every movie id touched, in discovery order (source and target first)
    pub processed: Vec<MovieId>,
    pub rounds: usize,
    /// Nodes popped and expanded across both sides
    pub expanded: usize,
    pub elapsed: Duration,
}

impl SearchOutcome {
    pub fn found(&self) -> bool {
        self.path.is_some()
    }

    pub fn explored_count(&self) -> usize {
        self.processed.len()
    }
}

/// Runs bidirectional searches over a shared entity cache.
///
/// Holds no per-search state, so one engine can serve concurrent searches.
#[derive(Clone)]
pub struct SearchEngine {
    expander: GraphExpander,
    config: SearchConfig,
}

impl SearchEngine {
    pub fn new(cache: Arc<EntityCache>, config: SearchConfig) -> Self {
        Self {
            expander: GraphExpander::new(cache, &config),
            config,
        }
    }

    pub fn cache(&self) -> &Arc<EntityCache> {
        self.expander.cache()
    }

    /// Search for a path from `source` to `target`.
    ///
    /// Blocking: every expansion may hit the provider. Async callers should
    /// run this on a blocking thread.
    #[instrument(skip(self), fields(layered = self.config.layered))]
    pub fn search(&self, source: MovieId, target: MovieId, strategy: Strategy) -> SearchOutcome {
        match strategy {
            Strategy::UnitCost => self.run::<QueueFrontier>(source, target, strategy),
            Strategy::Weighted => self.run::<CostFrontier>(source, target, strategy),
        }
    }

    fn run<F: Frontier>(&self, source: MovieId, target: MovieId, strategy: Strategy) -> SearchOutcome {
        let started = Instant::now();
        info!("Starting {} search from {} to {}", F::NAME, source, target);

        let mut run = Run::<F>::new(&self.expander, source, target, self.config.layered);
        if source == target {
            run.meeting = Some(Meeting {
                movie_id: source,
                cost: 0,
            });
        }

        let check_between_sides = F::STOP_AT_FIRST_MEETING || self.config.layered;
        let mut rounds = 0;
        while run.meeting.is_none() {
            if run.forward.is_exhausted() && run.backward.is_exhausted() {
                break;
            }
            rounds += 1;
            debug!("Round {}", rounds);

            run.step(Side::Forward);
            if check_between_sides && run.meeting.is_some() {
                break;
            }
            run.step(Side::Backward);
        }

        let path = run.meeting.map(|meeting| {
            reconstruct(
                meeting.movie_id,
                run.forward.predecessors(),
                run.backward.predecessors(),
                source,
                target,
            )
        });
        let elapsed = started.elapsed();

        match &path {
            Some(path) => info!(
                "{} path found in {:.2?} after {} rounds: {} movies in path, {} movies explored",
                F::NAME,
                elapsed,
                rounds,
                path.len(),
                run.processed.len()
            ),
            None => info!(
                "No path found after {} rounds ({:.2?}); {} movies explored",
                rounds,
                elapsed,
                run.processed.len()
            ),
        }

        SearchOutcome {
            source,
            target,
            strategy,
            meeting: run.meeting,
            path,
            processed: run.processed.into_vec(),
            rounds,
            expanded: run.expanded,
            elapsed,
        }
    }
}

/// Mutable state of one search run
struct Run<'a, F: Frontier> {
    expander: &'a GraphExpander,
    forward: F,
    backward: F,
    processed: ProcessedSet,
    meeting: Option<Meeting>,
    layered: bool,
    expanded: usize,
}

impl<'a, F: Frontier> Run<'a, F> {
    fn new(expander: &'a GraphExpander, source: MovieId, target: MovieId, layered: bool) -> Self {
        let mut processed = ProcessedSet::new();
        processed.insert(source);
        processed.insert(target);
        Self {
            expander,
            forward: F::new(source),
            backward: F::new(target),
            processed,
            meeting: None,
            layered,
            expanded: 0,
        }
    }

    /// Expand one node, or one whole cost layer, of `side`
    fn step(&mut self, side: Side) {
        let stop_on_first = F::STOP_AT_FIRST_MEETING && !self.layered;
        let (this, other) = match side {
            Side::Forward => (&mut self.forward, &self.backward),
            Side::Backward => (&mut self.backward, &self.forward),
        };

        let Some(layer) = this.peek_cost() else {
            return;
        };
        while this.peek_cost() == Some(layer) {
            let Some((current, cost)) = this.pop() else {
                break;
            };
            self.expanded += 1;
            expand_node(
                self.expander,
                side,
                this,
                other,
                current,
                cost,
                &mut self.processed,
                &mut self.meeting,
                stop_on_first,
            );
            if !self.layered || (stop_on_first && self.meeting.is_some()) {
                break;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn expand_node<F: Frontier>(
    expander: &GraphExpander,
    side: Side,
    this: &mut F,
    other: &F,
    current: MovieId,
    cost: Cost,
    processed: &mut ProcessedSet,
    meeting: &mut Option<Meeting>,
    stop_on_first: bool,
) {
    // A node we cannot describe is a dead end, not an error
    let Some(detail) = expander.cache().movie_detail(current) else {
        debug!("{} skipping movie {}: no detail", side, current);
        return;
    };
    debug!(
        "{} exploring movie '{}' ({}) with cost {}",
        side, detail.title, current, cost
    );

    for neighbor in expander.neighbors(current) {
        processed.insert(neighbor.movie_id);

        let tentative = cost + 1;
        if !this.relax(neighbor.movie_id, current, tentative) {
            continue;
        }
        debug!(
            "{} admitted movie {} via person {} with cost {}",
            side, neighbor.movie_id, neighbor.via, tentative
        );

        let Some(other_cost) = other.cost(neighbor.movie_id) else {
            continue;
        };
        let total = tentative + other_cost;
        if meeting.is_none_or(|best| total < best.cost) {
            info!(
                "Meeting point found at movie {} (total cost {})",
                neighbor.movie_id, total
            );
            *meeting = Some(Meeting {
                movie_id: neighbor.movie_id,
                cost: total,
            });
        }
        if stop_on_first {
            return;
        }
    }
}
