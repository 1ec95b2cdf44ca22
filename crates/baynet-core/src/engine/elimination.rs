//! # Variable Elimination
//!
//! Answers `P(Q=q | evidence)` by summing hidden variables out of a product of
//! CPT factors, in a caller-supplied order.
//!
//! ## Pipeline
//!
//! 1. Parse and resolve the query against the network.
//! 2. Build one factor per node, restricted by the evidence in its scope.
//!    Factors left with fewer than [`EliminationConfig::min_factor_rows`] rows
//!    carry no constraint and are dropped, unless they mention the query
//!    variable.
//! 3. Prune the elimination order: a hidden variable that is neither an
//!    ancestor of the query / evidence nor d-connected to the query (Bayes-Ball)
//!    cannot influence the answer; it is dropped together with every factor
//!    mentioning it.
//! 4. For each remaining variable, multiply the factors that mention it and
//!    sum it out. Active factors are kept sorted by ascending scope size.
//! 5. Multiply what is left, normalize if the result carries evidence mass,
//!    and read the query row.
//!
//! Every query owns its [`OpCounter`]; the engine itself holds no mutable
//! state and can be shared across threads.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::engine::bayes_ball::BayesBall;
use crate::engine::errors::ExecError;
use crate::engine::factor::{Evidence, Factor, OpCounter};
use crate::engine::network::{BayesianNetwork, OutcomeIndex, VarId};
use crate::engine::query::{ProbabilityQuery, INVALID_QUERY_FORMAT};

/// Tuning knobs for variable elimination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EliminationConfig {
    /// Initial factors with fewer rows than this are discarded. The default of
    /// 2 drops single-row factors, which only scale the result.
    pub min_factor_rows: usize,
    /// Drop hidden variables that are not ancestors of the query or evidence.
    pub prune_non_ancestors: bool,
    /// Drop hidden variables d-separated from the query given the evidence.
    pub prune_d_separated: bool,
    /// A result whose mass differs from 1 by more than this is normalized.
    pub normalization_tolerance: f64,
}

impl Default for EliminationConfig {
    fn default() -> Self {
        Self {
            min_factor_rows: 2,
            prune_non_ancestors: true,
            prune_d_separated: true,
            normalization_tolerance: 1e-9,
        }
    }
}

impl EliminationConfig {
    pub fn validate(self) -> Result<Self, ExecError> {
        if self.min_factor_rows == 0 {
            return Err(ExecError::ValidationError(
                "elimination: min_factor_rows must be > 0".into(),
            ));
        }
        if !self.normalization_tolerance.is_finite() || self.normalization_tolerance < 0.0 {
            return Err(ExecError::ValidationError(
                "elimination: normalization_tolerance must be finite and >= 0".into(),
            ));
        }
        Ok(self)
    }
}

/// Outcome of one probability query.
#[derive(Debug, Clone, PartialEq)]
pub struct EliminationResult {
    /// The requested probability (0 when `lookup_missed`)
    pub probability: f64,
    /// Scalar work performed for this query
    pub counts: OpCounter,
    /// Hidden variables actually eliminated, in order
    pub elimination_order: Vec<VarId>,
    /// Hidden variables removed by pruning
    pub pruned: Vec<VarId>,
    /// The query row was absent from the final factor
    pub lookup_missed: bool,
}

impl fmt::Display for EliminationResult {
    /// `"<probability to 5 dp>,<additions>,<multiplications>"`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.5},{},{}",
            self.probability, self.counts.additions, self.counts.multiplications
        )
    }
}

/// A probability query with names resolved to ids.
#[derive(Debug, Clone)]
struct ResolvedQuery {
    variable: VarId,
    value: OutcomeIndex,
    evidence: Evidence,
    order: Vec<VarId>,
}

/// Variable elimination engine over a read-only network.
#[derive(Debug, Clone)]
pub struct VariableElimination<'a> {
    network: &'a BayesianNetwork,
    config: EliminationConfig,
}

impl<'a> VariableElimination<'a> {
    pub fn new(network: &'a BayesianNetwork) -> Self {
        Self {
            network,
            config: EliminationConfig::default(),
        }
    }

    pub fn with_config(
        network: &'a BayesianNetwork,
        config: EliminationConfig,
    ) -> Result<Self, ExecError> {
        Ok(Self {
            network,
            config: config.validate()?,
        })
    }

    pub fn config(&self) -> &EliminationConfig {
        &self.config
    }

    /// Answers a textual query with `"<p>,<additions>,<multiplications>"`.
    ///
    /// Malformed text yields [`INVALID_QUERY_FORMAT`].
    pub fn run(&self, query: &str) -> Result<String, ExecError> {
        match ProbabilityQuery::parse(query) {
            Ok(parsed) => Ok(self.evaluate(&parsed)?.to_string()),
            Err(err) => {
                tracing::debug!(%err, "rejecting probability query");
                Ok(INVALID_QUERY_FORMAT.to_string())
            }
        }
    }

    /// Runs the elimination pipeline for a parsed query.
    pub fn evaluate(&self, query: &ProbabilityQuery) -> Result<EliminationResult, ExecError> {
        let resolved = self.resolve(query)?;
        let mut counts = OpCounter::new();

        if let Some(observed) = resolved.evidence.get(&resolved.variable) {
            let probability = if *observed == resolved.value { 1.0 } else { 0.0 };
            return Ok(EliminationResult {
                probability,
                counts,
                elimination_order: Vec::new(),
                pruned: Vec::new(),
                lookup_missed: false,
            });
        }

        let mut factors = self.initial_factors(resolved.variable, &resolved.evidence);
        let (order, pruned) = self.prune(&resolved, &mut factors);
        tracing::debug!(
            order = ?self.network.names(&order),
            pruned = ?self.network.names(&pruned),
            factors = factors.len(),
            "elimination plan"
        );

        let mut eliminated = Vec::with_capacity(order.len());
        for var in order {
            let (relevant, rest): (Vec<Factor>, Vec<Factor>) =
                factors.into_iter().partition(|f| f.contains_variable(var));
            factors = rest;
            if relevant.is_empty() {
                tracing::debug!(var = self.network.var_name(var), "no factor mentions variable");
                continue;
            }
            let merged = self.multiply_and_sum_out(relevant, var, &mut counts)?;
            factors.push(merged);
            factors.sort_by_key(|f| f.scope().len());
            eliminated.push(var);
        }

        self.read_answer(factors, &resolved, counts, eliminated, pruned)
    }

    /// Multiplies the remaining factors and reads the query row.
    ///
    /// No factor left, or a missing row, yields the 0 sentinel with
    /// `lookup_missed` set.
    fn read_answer(
        &self,
        factors: Vec<Factor>,
        resolved: &ResolvedQuery,
        mut counts: OpCounter,
        eliminated: Vec<VarId>,
        pruned: Vec<VarId>,
    ) -> Result<EliminationResult, ExecError> {
        let Some(result) = multiply_all(factors, &mut counts) else {
            tracing::warn!(
                query = self.network.var_name(resolved.variable),
                "no factor left after elimination"
            );
            return Ok(self.missed(counts, eliminated, pruned));
        };

        if let Some(stray) = result
            .scope()
            .iter()
            .find(|v| **v != resolved.variable && !resolved.evidence.contains_key(*v))
        {
            return Err(ExecError::Internal(format!(
                "result factor still mentions '{}'; it must appear in the elimination order",
                self.network.var_name(*stray)
            )));
        }

        let result = if result.scope().len() > 1
            || (result.total_mass() - 1.0).abs() > self.config.normalization_tolerance
        {
            result.normalize(&mut counts)?
        } else {
            result
        };

        let mut key = resolved.evidence.clone();
        key.insert(resolved.variable, resolved.value);
        let probability = match result.lookup(&key) {
            Some(p) if result.contains_variable(resolved.variable) => p,
            _ => {
                tracing::warn!(
                    key = ?self.describe_assignment(&key),
                    rows = ?self.describe_rows(&result),
                    "query row missing from result factor"
                );
                return Ok(self.missed(counts, eliminated, pruned));
            }
        };

        Ok(EliminationResult {
            probability,
            counts,
            elimination_order: eliminated,
            pruned,
            lookup_missed: false,
        })
    }

    fn resolve(&self, query: &ProbabilityQuery) -> Result<ResolvedQuery, ExecError> {
        let variable = self.network.var_id(&query.variable)?;
        let value = self.network.outcome_index(variable, &query.value)?;

        let mut evidence = Evidence::new();
        for (name, val) in &query.evidence {
            let id = self.network.var_id(name)?;
            evidence.insert(id, self.network.outcome_index(id, val)?);
        }

        let mut seen = FxHashSet::default();
        let mut order = Vec::with_capacity(query.elimination_order.len());
        for name in &query.elimination_order {
            let id = self.network.var_id(name)?;
            if id == variable || evidence.contains_key(&id) {
                tracing::debug!(var = %name, "skipping observed variable in elimination order");
                continue;
            }
            if seen.insert(id) {
                order.push(id);
            }
        }

        Ok(ResolvedQuery {
            variable,
            value,
            evidence,
            order,
        })
    }

    /// One factor per node, restricted by the evidence in its scope.
    ///
    /// Factors over the query variable are always kept, whatever their size.
    fn initial_factors(&self, query: VarId, evidence: &Evidence) -> Vec<Factor> {
        let mut factors = Vec::with_capacity(self.network.len());
        for id in self.network.topological_order() {
            let node = self.network.node(*id);
            match node.cpt().restrict(evidence) {
                Some(factor)
                    if factor.len() >= self.config.min_factor_rows
                        || factor.contains_variable(query) =>
                {
                    factors.push(factor)
                }
                Some(_) | None => {
                    tracing::trace!(node = node.name(), "dropping unconstrained factor");
                }
            }
        }
        factors.sort_by_key(|f| f.scope().len());
        factors
    }

    /// Splits the candidate order into variables to eliminate and pruned ones,
    /// removing the factors of pruned variables.
    fn prune(&self, query: &ResolvedQuery, factors: &mut Vec<Factor>) -> (Vec<VarId>, Vec<VarId>) {
        let ball = BayesBall::new(self.network);
        let observed: FxHashSet<VarId> = query.evidence.keys().copied().collect();
        let targets: Vec<VarId> = std::iter::once(query.variable)
            .chain(query.evidence.keys().copied())
            .collect();

        let mut keep = Vec::with_capacity(query.order.len());
        let mut pruned = Vec::new();
        for var in &query.order {
            let irrelevant = (self.config.prune_non_ancestors
                && !targets.iter().any(|t| self.network.is_ancestor(*var, *t)))
                || (self.config.prune_d_separated
                    && ball.d_separated(query.variable, *var, &observed));
            if irrelevant {
                factors.retain(|f| !f.contains_variable(*var));
                pruned.push(*var);
            } else {
                keep.push(*var);
            }
        }
        (keep, pruned)
    }

    fn multiply_and_sum_out(
        &self,
        mut relevant: Vec<Factor>,
        var: VarId,
        counts: &mut OpCounter,
    ) -> Result<Factor, ExecError> {
        relevant.sort_by_key(|f| f.scope().len());
        let product = multiply_all(relevant, counts).ok_or_else(|| {
            ExecError::Internal("multiply_and_sum_out called without factors".into())
        })?;
        product.sum_out(var, counts).map_err(|err| match err {
            ExecError::UnknownVariable(_) => {
                ExecError::UnknownVariable(self.network.var_name(var).to_string())
            }
            other => other,
        })
    }

    fn missed(
        &self,
        counts: OpCounter,
        elimination_order: Vec<VarId>,
        pruned: Vec<VarId>,
    ) -> EliminationResult {
        EliminationResult {
            probability: 0.0,
            counts,
            elimination_order,
            pruned,
            lookup_missed: true,
        }
    }

    fn describe_assignment(&self, assignment: &Evidence) -> Vec<String> {
        assignment
            .iter()
            .map(|(var, outcome)| {
                let variable = self.network.node(*var).variable();
                format!("{}={}", variable.name(), variable.outcome(*outcome).unwrap_or("?"))
            })
            .collect()
    }

    fn describe_rows(&self, factor: &Factor) -> Vec<String> {
        factor
            .sorted_rows()
            .into_iter()
            .map(|(key, value)| {
                let row: Evidence = factor.scope().iter().copied().zip(key).collect();
                format!("[{}] -> {}", self.describe_assignment(&row).join(", "), value)
            })
            .collect()
    }
}

/// Left fold of pairwise products; `None` for an empty list.
fn multiply_all(factors: Vec<Factor>, counts: &mut OpCounter) -> Option<Factor> {
    let mut iter = factors.into_iter();
    let first = iter.next()?;
    Some(iter.fold(first, |acc, f| acc.multiply(&f, counts)))
}
