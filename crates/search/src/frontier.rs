//! Frontiers: one side of a bidirectional search.
//!
//! A frontier owns the work queue for its side, the best known cost of every
//! node it has admitted, and the predecessor links used to rebuild the path.
//! The two implementations differ only in pop order:
//!
//! - [`QueueFrontier`]: FIFO. Cost is the BFS depth and a node is admitted once.
//! - [`CostFrontier`]: min-heap on cost, ties broken by insertion order. A
//!   node may be re-admitted with a strictly better cost until it is expanded.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use catalog::MovieId;

/// Accumulated traversal cost (unit edge weights today)
pub type Cost = u32;

/// One side of the search.
///
/// Rust concept: associated consts let the engine specialize its meeting
/// rule per strategy at compile time, with no runtime flag.
pub trait Frontier: Send {
    /// Name for logging
    const NAME: &'static str;

    /// The first meeting found ends the current expansion immediately
    const STOP_AT_FIRST_MEETING: bool;

    /// Seed a frontier with its root at cost 0
    fn new(root: MovieId) -> Self;

    /// Remove and return the next node to expand with its cost
    fn pop(&mut self) -> Option<(MovieId, Cost)>;

    /// Cost of the node `pop` would return next
    fn peek_cost(&mut self) -> Option<Cost>;

    fn is_exhausted(&mut self) -> bool {
        self.peek_cost().is_none()
    }

    /// Best known cost of an admitted node
    fn cost(&self, id: MovieId) -> Option<Cost>;

    /// Offer `id` at `cost` via `predecessor`.
    ///
    /// Returns `true` if the node was admitted (first sighting, or a strictly
    /// better cost on a node not yet expanded).
    fn relax(&mut self, id: MovieId, predecessor: MovieId, cost: Cost) -> bool;

    fn predecessors(&self) -> &HashMap<MovieId, MovieId>;

    /// Number of admitted nodes, root included
    fn admitted(&self) -> usize;
}

/// FIFO frontier for the unit-cost strategy
#[derive(Debug)]
pub struct QueueFrontier {
    queue: VecDeque<MovieId>,
    depth: HashMap<MovieId, Cost>,
    predecessors: HashMap<MovieId, MovieId>,
}

impl Frontier for QueueFrontier {
    const NAME: &'static str = "bfs";
    const STOP_AT_FIRST_MEETING: bool = true;

    fn new(root: MovieId) -> Self {
        Self {
            queue: VecDeque::from([root]),
            depth: HashMap::from([(root, 0)]),
            predecessors: HashMap::new(),
        }
    }

    fn pop(&mut self) -> Option<(MovieId, Cost)> {
        let id = self.queue.pop_front()?;
        Some((id, self.depth.get(&id).copied().unwrap_or_default()))
    }

    fn peek_cost(&mut self) -> Option<Cost> {
        self.queue
            .front()
            .map(|id| self.depth.get(id).copied().unwrap_or_default())
    }

    fn cost(&self, id: MovieId) -> Option<Cost> {
        self.depth.get(&id).copied()
    }

    fn relax(&mut self, id: MovieId, predecessor: MovieId, cost: Cost) -> bool {
        if self.depth.contains_key(&id) {
            return false;
        }
        self.depth.insert(id, cost);
        self.predecessors.insert(id, predecessor);
        self.queue.push_back(id);
        true
    }

    fn predecessors(&self) -> &HashMap<MovieId, MovieId> {
        &self.predecessors
    }

    fn admitted(&self) -> usize {
        self.depth.len()
    }
}

/// Min-cost frontier for the weighted strategy
#[derive(Debug)]
pub struct CostFrontier {
    /// (cost, insertion sequence, id); the sequence breaks cost ties FIFO
    heap: BinaryHeap<Reverse<(Cost, u64, MovieId)>>,
    costs: HashMap<MovieId, Cost>,
    predecessors: HashMap<MovieId, MovieId>,
    expanded: HashSet<MovieId>,
    next_seq: u64,
}

impl CostFrontier {
    fn push(&mut self, id: MovieId, cost: Cost) {
        self.heap.push(Reverse((cost, self.next_seq, id)));
        self.next_seq += 1;
    }

    /// Drop heap entries superseded by a cheaper admission or already expanded
    fn discard_stale(&mut self) {
        while let Some(&Reverse((cost, _, id))) = self.heap.peek() {
            let stale = self.expanded.contains(&id)
                || self.costs.get(&id).is_some_and(|&best| best < cost);
            if !stale {
                break;
            }
            self.heap.pop();
        }
    }
}

impl Frontier for CostFrontier {
    const NAME: &'static str = "dijkstra";
    const STOP_AT_FIRST_MEETING: bool = false;

    fn new(root: MovieId) -> Self {
        let mut frontier = Self {
            heap: BinaryHeap::new(),
            costs: HashMap::from([(root, 0)]),
            predecessors: HashMap::new(),
            expanded: HashSet::new(),
            next_seq: 0,
        };
        frontier.push(root, 0);
        frontier
    }

    fn pop(&mut self) -> Option<(MovieId, Cost)> {
        self.discard_stale();
        let Reverse((cost, _, id)) = self.heap.pop()?;
        self.expanded.insert(id);
        Some((id, cost))
    }

    fn peek_cost(&mut self) -> Option<Cost> {
        self.discard_stale();
        self.heap.peek().map(|Reverse((cost, _, _))| *cost)
    }

    fn cost(&self, id: MovieId) -> Option<Cost> {
        self.costs.get(&id).copied()
    }

    fn relax(&mut self, id: MovieId, predecessor: MovieId, cost: Cost) -> bool {
        if self.expanded.contains(&id) {
            return false;
        }
        if self.costs.get(&id).is_some_and(|&known| known <= cost) {
            return false;
        }
        self.costs.insert(id, cost);
        self.predecessors.insert(id, predecessor);
        self.push(id, cost);
        true
    }

    fn predecessors(&self) -> &HashMap<MovieId, MovieId> {
        &self.predecessors
    }

    fn admitted(&self) -> usize {
        self.costs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_fifo_and_admits_once() {
        let mut frontier = QueueFrontier::new(1);
        assert_eq!(frontier.pop(), Some((1, 0)));

        assert!(frontier.relax(2, 1, 1));
        assert!(frontier.relax(3, 1, 1));
        assert!(!frontier.relax(2, 3, 2));
        assert!(!frontier.relax(1, 2, 2));

        assert_eq!(frontier.peek_cost(), Some(1));
        assert_eq!(frontier.pop(), Some((2, 1)));
        assert_eq!(frontier.pop(), Some((3, 1)));
        assert!(frontier.is_exhausted());
        assert_eq!(frontier.predecessors().get(&2), Some(&1));
        assert_eq!(frontier.admitted(), 3);
    }

    #[test]
    fn test_cost_frontier_pops_cheapest_with_fifo_ties() {
        let mut frontier = CostFrontier::new(1);
        assert_eq!(frontier.pop(), Some((1, 0)));

        frontier.relax(5, 1, 3);
        frontier.relax(4, 1, 1);
        frontier.relax(2, 1, 1);

        assert_eq!(frontier.pop(), Some((4, 1)));
        assert_eq!(frontier.pop(), Some((2, 1)));
        assert_eq!(frontier.pop(), Some((5, 3)));
        assert_eq!(frontier.pop(), None);
    }

    #[test]
    fn test_cost_frontier_improves_and_skips_stale_entries() {
        let mut frontier = CostFrontier::new(1);
        frontier.pop();

        assert!(frontier.relax(7, 1, 5));
        // Worse and equal offers are rejected
        assert!(!frontier.relax(7, 1, 6));
        assert!(!frontier.relax(7, 1, 5));
        // A strictly better offer wins and rewires the predecessor
        assert!(frontier.relax(7, 3, 2));
        assert_eq!(frontier.cost(7), Some(2));
        assert_eq!(frontier.predecessors().get(&7), Some(&3));

        // The stale (5) entry never surfaces
        assert_eq!(frontier.pop(), Some((7, 2)));
        assert_eq!(frontier.pop(), None);

        // Expanded nodes are never re-admitted
        assert!(!frontier.relax(7, 1, 0));
    }

    #[test]
    fn test_root_is_never_readmitted() {
        let mut frontier = CostFrontier::new(9);
        assert!(!frontier.relax(9, 1, 1));
        assert_eq!(frontier.admitted(), 1);
        assert!(frontier.predecessors().is_empty());
    }
}
