//! # Bayes-Ball
//!
//! d-separation by direction-sensitive reachability.
//!
//! The search is a BFS over `(node, previous node, direction)` triples
//! starting at `(start, none, Up)`:
//!
//! - `Up` means the ball arrived against an edge (from a child). An
//!   unobserved node passes it on to its parents (`Up`) and children (`Down`).
//! - `Down` means the ball arrived along an edge (from a parent). An
//!   unobserved node passes it on to its children. Arriving from a parent
//!   makes the node a collider for that path: the ball bounces back to the
//!   parents only if the node or one of its descendants is observed.
//!
//! Reaching the end node means the two variables are dependent. Each triple
//! is processed once; deduplication is on the full triple because the
//! collider rule depends on the arrival edge.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::engine::errors::ExecError;
use crate::engine::network::{BayesianNetwork, VarId};
use crate::engine::query::{IndependenceQuery, INVALID_QUERY_FORMAT};

/// Direction of travel relative to the DAG's edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Travelling against an edge, towards a parent
    Up,
    /// Travelling along an edge, towards a child
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Visit {
    node: VarId,
    prev: Option<VarId>,
    direction: Direction,
}

/// Counters describing one Bayes-Ball search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BayesBallDiagnostics {
    /// Distinct triples expanded
    pub processed: usize,
    /// Triples pushed onto the queue (including duplicates)
    pub enqueued: usize,
}

/// Bayes-Ball engine over a read-only network.
#[derive(Debug, Clone, Copy)]
pub struct BayesBall<'a> {
    network: &'a BayesianNetwork,
}

impl<'a> BayesBall<'a> {
    pub fn new(network: &'a BayesianNetwork) -> Self {
        Self { network }
    }

    /// Answers a textual query: `"yes"` if d-separated, `"no"` otherwise.
    ///
    /// Malformed text yields [`INVALID_QUERY_FORMAT`]. Names missing from the
    /// network fail the query.
    pub fn run(&self, query: &str) -> Result<String, ExecError> {
        let parsed = match IndependenceQuery::parse(query) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::debug!(%err, "rejecting independence query");
                return Ok(INVALID_QUERY_FORMAT.to_string());
            }
        };
        let independent = self.answer(&parsed)?;
        Ok(if independent { "yes" } else { "no" }.to_string())
    }

    /// Resolves names and returns whether `start` and `end` are d-separated.
    pub fn answer(&self, query: &IndependenceQuery) -> Result<bool, ExecError> {
        let start = self.network.var_id(&query.start)?;
        let end = self.network.var_id(&query.end)?;
        let evidence = query
            .evidence
            .iter()
            .map(|name| self.network.var_id(name))
            .collect::<Result<FxHashSet<_>, _>>()?;

        let (independent, diagnostics) = self.d_separated_with_diagnostics(start, end, &evidence);
        tracing::debug!(
            start = %query.start,
            end = %query.end,
            evidence = ?query.evidence,
            independent,
            processed = diagnostics.processed,
            "bayes-ball"
        );
        Ok(independent)
    }

    /// Whether `start` and `end` are d-separated given `evidence`.
    pub fn d_separated(&self, start: VarId, end: VarId, evidence: &FxHashSet<VarId>) -> bool {
        self.d_separated_with_diagnostics(start, end, evidence).0
    }

    /// Like [`BayesBall::d_separated`], also reporting search counters.
    pub fn d_separated_with_diagnostics(
        &self,
        start: VarId,
        end: VarId,
        evidence: &FxHashSet<VarId>,
    ) -> (bool, BayesBallDiagnostics) {
        let mut diagnostics = BayesBallDiagnostics::default();
        let mut visited: FxHashSet<Visit> = FxHashSet::default();
        let mut queue = VecDeque::new();
        queue.push_back(Visit {
            node: start,
            prev: None,
            direction: Direction::Up,
        });
        diagnostics.enqueued += 1;

        while let Some(visit) = queue.pop_front() {
            if visit.node == end {
                return (false, diagnostics);
            }
            if !visited.insert(visit) {
                continue;
            }
            diagnostics.processed += 1;
            tracing::trace!(
                node = self.network.var_name(visit.node),
                direction = ?visit.direction,
                "bayes-ball visit"
            );

            let current = visit.node;
            let observed = evidence.contains(&current);
            let mut push = |node: VarId, direction: Direction| {
                queue.push_back(Visit {
                    node,
                    prev: Some(current),
                    direction,
                });
                diagnostics.enqueued += 1;
            };

            match visit.direction {
                Direction::Up => {
                    if !observed {
                        for parent in self.network.parents(current) {
                            push(*parent, Direction::Up);
                        }
                        for child in self.network.children(current) {
                            push(*child, Direction::Down);
                        }
                    }
                }
                Direction::Down => {
                    if !observed {
                        for child in self.network.children(current) {
                            push(*child, Direction::Down);
                        }
                    }
                    let from_parent = visit
                        .prev
                        .is_some_and(|prev| self.network.is_parent(prev, current));
                    let bounce = if from_parent {
                        // collider: opened by evidence on the node or below it
                        observed || self.has_descendant_in_evidence(current, evidence)
                    } else {
                        true
                    };
                    if bounce {
                        for parent in self.network.parents(current) {
                            push(*parent, Direction::Up);
                        }
                    }
                }
            }
        }

        (true, diagnostics)
    }

    /// Whether `node` or any node reachable through child edges is observed.
    pub fn has_descendant_in_evidence(&self, node: VarId, evidence: &FxHashSet<VarId>) -> bool {
        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::from([node]);
        while let Some(current) = queue.pop_front() {
            if evidence.contains(&current) {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            queue.extend(
                self.network
                    .children(current)
                    .iter()
                    .filter(|child| !visited.contains(*child)),
            );
        }
        false
    }
}
