use std::iter::FusedIterator;

use tracing::debug;

use crate::matrix::Matrix;

/// Node every run starts from.
pub const SOURCE: usize = 0;

/// Working set of a single shortest-path run.
///
/// `visited` only grows and `distance` only decreases.  A `None` distance
/// is infinite; a predecessor is recorded exactly when a distance improves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathState {
    pub visited: Vec<bool>,
    pub distance: Vec<Option<u64>>,
    pub predecessor: Vec<Option<usize>>,
}

impl PathState {
    pub fn new(n: usize) -> Self {
        let mut distance = vec![None; n];
        if let Some(source) = distance.get_mut(SOURCE) {
            *source = Some(0);
        }
        PathState {
            visited: vec![false; n],
            distance,
            predecessor: vec![None; n],
        }
    }

    /// Visited node indices in ascending order.
    pub fn visited_nodes(&self) -> Vec<usize> {
        self.visited
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v)
            .map(|(i, _)| i)
            .collect()
    }

    /// Lower `distance[to]` through `from` if that is shorter.
    fn relax(&mut self, from: usize, to: usize, weight: u32) -> bool {
        let Some(base) = self.distance[from] else {
            return false;
        };
        let candidate = base.saturating_add(u64::from(weight));
        if self.distance[to].map_or(true, |d| candidate < d) {
            self.distance[to] = Some(candidate);
            self.predecessor[to] = Some(from);
            true
        } else {
            false
        }
    }

    fn first_unvisited(&self) -> Option<usize> {
        self.visited.iter().position(|&v| !v)
    }
}

/// Snapshot of the algorithm state after one node has been visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    /// Iteration index, starting at 0.
    pub step: usize,
    /// Visited nodes (0-based) in ascending order.
    pub visited: Vec<usize>,
    pub distance: Vec<Option<u64>>,
    pub predecessor: Vec<Option<usize>>,
}

/// Dijkstra variant over a dense matrix that yields one [`TraceStep`] per
/// visited node.
///
/// Two behaviours differ from a textbook priority-queue Dijkstra and are
/// part of the observable trace:
///
/// - Neighbours are scanned from the highest index down, and a candidate
///   with a distance equal to the current best replaces it.  Ties between
///   next-node candidates therefore go to the lower index.
/// - When no unvisited neighbour of the current node has a finite
///   distance, the first unvisited node in ascending order is visited
///   next, so nodes in other components still get a trace row.  The step
///   count always equals the node count.
pub struct ShortestPathEngine<'a> {
    matrix: &'a Matrix,
    state: PathState,
    current: Option<usize>,
    step: usize,
}

impl<'a> ShortestPathEngine<'a> {
    pub fn new(matrix: &'a Matrix) -> Self {
        let n = matrix.size();
        ShortestPathEngine {
            matrix,
            state: PathState::new(n),
            current: (n > 0).then_some(SOURCE),
            step: 0,
        }
    }

    pub fn state(&self) -> &PathState {
        &self.state
    }

    /// Relax every edge out of `current` and return the unvisited
    /// neighbour with the smallest finite distance.
    fn scan(&mut self, current: usize) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;

        for i in (0..self.matrix.size()).rev() {
            if i == current {
                continue;
            }
            let Some(weight) = self.matrix.weight(current, i) else {
                continue;
            };

            self.state.relax(current, i, weight);

            if self.state.visited[i] {
                continue;
            }
            if let Some(d) = self.state.distance[i] {
                if best.map_or(true, |(_, min)| d <= min) {
                    best = Some((i, d));
                }
            }
        }

        best.map(|(i, _)| i)
    }

    fn snapshot(&self) -> TraceStep {
        TraceStep {
            step: self.step,
            visited: self.state.visited_nodes(),
            distance: self.state.distance.clone(),
            predecessor: self.state.predecessor.clone(),
        }
    }
}

impl Iterator for ShortestPathEngine<'_> {
    type Item = TraceStep;

    fn next(&mut self) -> Option<TraceStep> {
        let current = self.current?;

        let candidate = self.scan(current);
        self.state.visited[current] = true;
        debug!(step = self.step, node = current, "visited");

        let snapshot = self.snapshot();
        self.step += 1;

        self.current = candidate.or_else(|| {
            let fallback = self.state.first_unvisited();
            if let Some(node) = fallback {
                debug!(node, "no reachable candidate, jumping to first unvisited node");
            }
            fallback
        });

        Some(snapshot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.current {
            Some(_) => self.state.visited.iter().filter(|&&v| !v).count(),
            None => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ShortestPathEngine<'_> {}

impl FusedIterator for ShortestPathEngine<'_> {}
