//! # Factor Algebra
//!
//! A [`Factor`] is a table from assignments of an ordered scope of variables to
//! non-negative reals. CPTs, intermediate products and query results are all
//! factors.
//!
//! ## Representation
//!
//! - The scope is a deduplicated list of [`VarId`]s.
//! - Keys are fixed-order tuples of outcome indices, one per scope position
//!   ([`Assignment`]). No strings are built or parsed on the hot path.
//! - Factors are immutable values: every operation returns a new factor.
//!
//! ## Instrumentation
//!
//! [`Factor::multiply`], [`Factor::sum_out`] and [`Factor::normalize`] record
//! the scalar work they perform in a caller-owned [`OpCounter`]. Counters are
//! never shared between queries.
//!
//! Shared variables are always matched by identity: two factors may list the
//! same variables in different orders.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::engine::errors::ExecError;
use crate::engine::network::{OutcomeIndex, VarId};

/// Inline capacity for scopes and assignment keys.
const INLINE_SCOPE: usize = 8;

/// Ordered variable list of a factor.
pub type Scope = SmallVec<[VarId; INLINE_SCOPE]>;

/// Outcome indices aligned with a factor's scope.
pub type Assignment = SmallVec<[OutcomeIndex; INLINE_SCOPE]>;

/// Observed values: variable → outcome index.
pub type Evidence = BTreeMap<VarId, OutcomeIndex>;

/// Scalar operation counts accumulated while answering one query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpCounter {
    /// Scalar additions (sum-out collisions, normalization sums)
    pub additions: u64,
    /// Scalar multiplications (one per emitted product row)
    pub multiplications: u64,
}

impl OpCounter {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A table over an ordered scope of variables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Factor {
    scope: Scope,
    table: FxHashMap<Assignment, f64>,
}

impl Factor {
    /// Builds a factor from a scope and its rows.
    ///
    /// Fails if the scope repeats a variable, if a key's length differs from
    /// the scope length, or if the same key appears twice.
    pub fn new<S, R>(scope: S, rows: R) -> Result<Self, ExecError>
    where
        S: IntoIterator<Item = VarId>,
        R: IntoIterator<Item = (Assignment, f64)>,
    {
        let scope: Scope = scope.into_iter().collect();
        for (i, var) in scope.iter().enumerate() {
            if scope[..i].contains(var) {
                return Err(ExecError::ValidationError(format!(
                    "factor scope repeats variable {}",
                    var
                )));
            }
        }

        let rows = rows.into_iter();
        let mut table = FxHashMap::default();
        table.reserve(rows.size_hint().0);
        for (key, value) in rows {
            if key.len() != scope.len() {
                return Err(ExecError::ValidationError(format!(
                    "factor key has {} entries for a scope of {}",
                    key.len(),
                    scope.len()
                )));
            }
            if table.insert(key, value).is_some() {
                return Err(ExecError::ValidationError(
                    "factor table repeats an assignment".into(),
                ));
            }
        }

        Ok(Self { scope, table })
    }

    /// The factor's variables, in key order.
    pub fn scope(&self) -> &[VarId] {
        &self.scope
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Scope membership test.
    pub fn contains_variable(&self, var: VarId) -> bool {
        self.scope.contains(&var)
    }

    /// Position of `var` in the scope, if present.
    pub fn position_of(&self, var: VarId) -> Option<usize> {
        self.scope.iter().position(|v| *v == var)
    }

    /// Value stored under a key aligned with [`Factor::scope`].
    pub fn get(&self, key: &[OutcomeIndex]) -> Option<f64> {
        self.table.get(key).copied()
    }

    /// Value for an assignment given by variable identity.
    ///
    /// Entries for variables outside the scope are ignored. Returns `None` if
    /// a scope variable is unassigned or the row does not exist.
    pub fn lookup(&self, assignment: &Evidence) -> Option<f64> {
        let key = self
            .scope
            .iter()
            .map(|v| assignment.get(v).copied())
            .collect::<Option<Assignment>>()?;
        self.get(&key)
    }

    /// Iterates over `(key, value)` rows in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&Assignment, f64)> + '_ {
        self.table.iter().map(|(k, v)| (k, *v))
    }

    /// Rows sorted by key, for stable output.
    pub fn sorted_rows(&self) -> Vec<(Assignment, f64)> {
        let mut rows: Vec<_> = self.table.iter().map(|(k, v)| (k.clone(), *v)).collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    /// Sum of all table values.
    pub fn total_mass(&self) -> f64 {
        self.table.values().sum()
    }

    /// Conditions the factor on `evidence`.
    ///
    /// Rows that disagree with an evidence entry for a scope variable are
    /// dropped, and the evidence variables are projected out of the scope and
    /// the keys. Evidence on variables outside the scope is ignored.
    ///
    /// Returns `None` when no row survives: the caller should treat the factor
    /// as absent.
    pub fn restrict(&self, evidence: &Evidence) -> Option<Factor> {
        if self.table.is_empty() {
            return None;
        }

        let mut fixed: SmallVec<[(usize, OutcomeIndex); 4]> = SmallVec::new();
        let mut keep: SmallVec<[usize; INLINE_SCOPE]> = SmallVec::new();
        for (i, var) in self.scope.iter().enumerate() {
            match evidence.get(var) {
                Some(outcome) => fixed.push((i, *outcome)),
                None => keep.push(i),
            }
        }
        if fixed.is_empty() {
            return Some(self.clone());
        }

        let scope: Scope = keep.iter().map(|i| self.scope[*i]).collect();
        let mut table = FxHashMap::default();
        for (key, value) in &self.table {
            if fixed.iter().all(|(i, outcome)| key[*i] == *outcome) {
                let reduced: Assignment = keep.iter().map(|i| key[*i]).collect();
                table.insert(reduced, *value);
            }
        }

        if table.is_empty() {
            None
        } else {
            Some(Factor { scope, table })
        }
    }

    /// Pointwise product of two factors.
    ///
    /// The result scope is `self`'s scope followed by the variables of `other`
    /// not already present. Rows are joined on the shared variables; each
    /// emitted product counts one multiplication. Rows landing on the same
    /// destination key are summed.
    pub fn multiply(&self, other: &Factor, counter: &mut OpCounter) -> Factor {
        let mut scope = self.scope.clone();
        // (position in self, position in other) for shared variables
        let mut shared: SmallVec<[(usize, usize); 4]> = SmallVec::new();
        // positions in other that extend the scope
        let mut extra: SmallVec<[usize; INLINE_SCOPE]> = SmallVec::new();
        for (j, var) in other.scope.iter().enumerate() {
            match self.position_of(*var) {
                Some(i) => shared.push((i, j)),
                None => {
                    scope.push(*var);
                    extra.push(j);
                }
            }
        }

        // Hash join: bucket the other side by its projection on the shared variables.
        let mut buckets: FxHashMap<Assignment, Vec<(&Assignment, f64)>> = FxHashMap::default();
        for (key, value) in &other.table {
            let projection: Assignment = shared.iter().map(|(_, j)| key[*j]).collect();
            buckets.entry(projection).or_default().push((key, *value));
        }

        let mut table: FxHashMap<Assignment, f64> = FxHashMap::default();
        for (left_key, left_value) in &self.table {
            let projection: Assignment = shared.iter().map(|(i, _)| left_key[*i]).collect();
            let Some(matches) = buckets.get(&projection) else {
                continue;
            };
            for (right_key, right_value) in matches {
                let mut key = left_key.clone();
                key.extend(extra.iter().map(|j| right_key[*j]));
                *table.entry(key).or_insert(0.0) += left_value * right_value;
                counter.multiplications += 1;
            }
        }

        Factor { scope, table }
    }

    /// Marginalizes `var` out of the factor.
    ///
    /// Each row collapsing onto an already populated reduced key counts one
    /// addition, so the total is `rows - distinct reduced keys`.
    pub fn sum_out(&self, var: VarId, counter: &mut OpCounter) -> Result<Factor, ExecError> {
        let pos = self
            .position_of(var)
            .ok_or_else(|| ExecError::UnknownVariable(var.to_string()))?;

        let mut scope = self.scope.clone();
        scope.remove(pos);

        let mut table: FxHashMap<Assignment, f64> = FxHashMap::default();
        for (key, value) in &self.table {
            let mut reduced = key.clone();
            reduced.remove(pos);
            match table.get_mut(&reduced) {
                Some(acc) => {
                    *acc += value;
                    counter.additions += 1;
                }
                None => {
                    table.insert(reduced, *value);
                }
            }
        }

        Ok(Factor { scope, table })
    }

    /// Scales the table so that its values sum to one.
    ///
    /// Computing the sum counts `len - 1` additions. An empty table or a
    /// zero / non-finite sum is an invalid result, not a zero probability.
    pub fn normalize(&self, counter: &mut OpCounter) -> Result<Factor, ExecError> {
        if self.table.is_empty() {
            return Err(ExecError::Numerical(
                "cannot normalize an empty factor".into(),
            ));
        }
        let sum = self.total_mass();
        if !sum.is_finite() || sum <= 0.0 {
            return Err(ExecError::Numerical(format!(
                "cannot normalize a factor with total mass {}",
                sum
            )));
        }
        counter.additions += (self.table.len() - 1) as u64;

        let table = self
            .table
            .iter()
            .map(|(k, v)| (k.clone(), v / sum))
            .collect();
        Ok(Factor {
            scope: self.scope.clone(),
            table,
        })
    }
}
