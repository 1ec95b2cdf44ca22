//! # Bayesian Network Model
//!
//! The read-only DAG every query runs against.
//!
//! ## Design
//!
//! - Nodes live in a single `Vec` owned by [`BayesianNetwork`]; a [`VarId`] is
//!   an index into it. Parent and child lists are index lists, so the
//!   back-references never form ownership cycles.
//! - Each node's CPT is stored as a [`Factor`] with scope `parents ++ [self]`.
//! - Building a network validates acyclicity once; a cycle is a load-time error.
//!
//! ## Example
//!
//! ```rust
//! use baynet_core::engine::network::NetworkBuilder;
//!
//! let network = NetworkBuilder::new()
//!     .variable("A", ["T", "F"])
//!     .variable("B", ["T", "F"])
//!     .cpt("A", [] as [&str; 0], [0.6, 0.4])
//!     .cpt("B", ["A"], [0.8, 0.2, 0.3, 0.7])
//!     .build()
//!     .unwrap();
//! let b = network.var_id("B").unwrap();
//! assert_eq!(network.parents(b).len(), 1);
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use baynet_frontend::{DefinitionDecl, NetworkAst, VariableDecl};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::engine::errors::ExecError;
use crate::engine::factor::{Assignment, Factor};

/// Index of an outcome within a variable's domain.
pub type OutcomeIndex = u16;

/// Typical fan-in / fan-out kept inline.
const INLINE_ADJACENCY: usize = 4;

/// Identifier of a variable (node) in a [`BayesianNetwork`].
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarId(pub u32);

impl VarId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named discrete variable with an ordered outcome domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: Arc<str>,
    outcomes: Vec<Arc<str>>,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn outcomes(&self) -> &[Arc<str>] {
        &self.outcomes
    }

    pub fn cardinality(&self) -> usize {
        self.outcomes.len()
    }

    /// Index of `value` in the domain.
    pub fn outcome_index(&self, value: &str) -> Option<OutcomeIndex> {
        self.outcomes
            .iter()
            .position(|o| o.as_ref() == value)
            .map(|i| i as OutcomeIndex)
    }

    /// Label of the outcome at `index`.
    pub fn outcome(&self, index: OutcomeIndex) -> Option<&str> {
        self.outcomes.get(index as usize).map(|o| o.as_ref())
    }
}

/// A variable together with its place in the DAG and its CPT.
#[derive(Debug, Clone)]
pub struct NetworkNode {
    id: VarId,
    variable: Variable,
    parents: SmallVec<[VarId; INLINE_ADJACENCY]>,
    children: SmallVec<[VarId; INLINE_ADJACENCY]>,
    cpt: Factor,
}

impl NetworkNode {
    pub fn id(&self) -> VarId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.variable.name()
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    /// Parents in `GIVEN` order; this is also the CPT key order.
    pub fn parents(&self) -> &[VarId] {
        &self.parents
    }

    pub fn children(&self) -> &[VarId] {
        &self.children
    }

    /// The CPT as a factor over `parents ++ [self]`.
    pub fn cpt(&self) -> &Factor {
        &self.cpt
    }
}

/// An immutable discrete Bayesian network.
#[derive(Debug, Clone)]
pub struct BayesianNetwork {
    name: Option<String>,
    nodes: Vec<NetworkNode>,
    by_name: FxHashMap<Arc<str>, VarId>,
    topological_order: Vec<VarId>,
}

impl BayesianNetwork {
    /// Parses, validates and builds a network from XMLBIF source.
    pub fn parse(source: &str) -> Result<Self, ExecError> {
        let ast = baynet_frontend::parse_network(source)?;
        Self::from_ast(&ast)
    }

    /// Reads and builds a network from an XMLBIF file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExecError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| ExecError::Io(format!("reading '{}': {}", path.display(), e)))?;
        Self::parse(&source)
    }

    /// Builds a network from a parsed document.
    ///
    /// The AST is validated first; the DAG is then checked for cycles.
    pub fn from_ast(ast: &NetworkAst) -> Result<Self, ExecError> {
        baynet_frontend::validate_network(ast)?;

        let mut by_name = FxHashMap::default();
        let mut variables = Vec::with_capacity(ast.variables.len());
        for (i, decl) in ast.variables.iter().enumerate() {
            let id = VarId(i as u32);
            let variable = build_variable(decl);
            by_name.insert(variable.name.clone(), id);
            variables.push(variable);
        }

        let mut parents: Vec<SmallVec<[VarId; INLINE_ADJACENCY]>> =
            vec![SmallVec::new(); variables.len()];
        let mut children: Vec<SmallVec<[VarId; INLINE_ADJACENCY]>> =
            vec![SmallVec::new(); variables.len()];
        let mut cpts: Vec<Option<Factor>> = vec![None; variables.len()];

        for def in &ast.definitions {
            let id = lookup_id(&by_name, &def.variable)?;
            for parent in &def.given {
                let parent_id = lookup_id(&by_name, parent)?;
                parents[id.index()].push(parent_id);
                children[parent_id.index()].push(id);
            }
            cpts[id.index()] = Some(build_cpt(id, &parents[id.index()], &variables, def)?);
        }

        let nodes = variables
            .into_iter()
            .zip(parents)
            .zip(children)
            .zip(cpts)
            .enumerate()
            .map(|(i, (((variable, parents), children), cpt))| {
                let cpt = cpt.ok_or_else(|| {
                    ExecError::ValidationError(format!(
                        "variable '{}' has no definition",
                        variable.name()
                    ))
                })?;
                Ok(NetworkNode {
                    id: VarId(i as u32),
                    variable,
                    parents,
                    children,
                    cpt,
                })
            })
            .collect::<Result<Vec<_>, ExecError>>()?;

        let mut network = BayesianNetwork {
            name: ast.name.clone(),
            nodes,
            by_name,
            topological_order: Vec::new(),
        };
        network.topological_order = network.topological_sort()?;

        tracing::debug!(
            network = network.name.as_deref().unwrap_or("<unnamed>"),
            nodes = network.nodes.len(),
            "built bayesian network"
        );
        for id in &network.topological_order {
            let node = network.node(*id);
            tracing::trace!(
                node = node.name(),
                parents = ?network.names(node.parents()),
                children = ?network.names(node.children()),
                rows = node.cpt().len(),
                "network node"
            );
        }

        Ok(network)
    }

    /// The `<NETWORK><NAME>` of the source document, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, in declaration order.
    pub fn nodes(&self) -> &[NetworkNode] {
        &self.nodes
    }

    /// The node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this network.
    pub fn node(&self, id: VarId) -> &NetworkNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: VarId) -> Option<&NetworkNode> {
        self.nodes.get(id.index())
    }

    /// Looks up a node by variable name.
    pub fn node_by_name(&self, name: &str) -> Option<&NetworkNode> {
        self.by_name.get(name).map(|id| self.node(*id))
    }

    /// Resolves a variable name to its id.
    pub fn var_id(&self, name: &str) -> Result<VarId, ExecError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ExecError::UnknownVariable(name.to_string()))
    }

    /// Resolves an outcome label of `id`'s domain.
    pub fn outcome_index(&self, id: VarId, value: &str) -> Result<OutcomeIndex, ExecError> {
        let variable = self.node(id).variable();
        variable
            .outcome_index(value)
            .ok_or_else(|| ExecError::UnknownOutcome {
                variable: variable.name().to_string(),
                value: value.to_string(),
            })
    }

    pub fn var_name(&self, id: VarId) -> &str {
        self.node(id).name()
    }

    /// Names for a list of ids, for diagnostics.
    pub fn names(&self, ids: &[VarId]) -> Vec<&str> {
        ids.iter().map(|id| self.var_name(*id)).collect()
    }

    pub fn parents(&self, id: VarId) -> &[VarId] {
        self.node(id).parents()
    }

    pub fn children(&self, id: VarId) -> &[VarId] {
        self.node(id).children()
    }

    /// Whether `parent` is a direct parent of `child`.
    pub fn is_parent(&self, parent: VarId, child: VarId) -> bool {
        self.parents(child).contains(&parent)
    }

    /// Node ids ordered so that every parent precedes its children.
    pub fn topological_order(&self) -> &[VarId] {
        &self.topological_order
    }

    /// Whether `candidate` is `target` or one of its ancestors.
    ///
    /// Walks parent edges upward from `target`.
    pub fn is_ancestor(&self, candidate: VarId, target: VarId) -> bool {
        let mut visited = FxHashSet::default();
        let mut stack = vec![target];
        while let Some(current) = stack.pop() {
            if current == candidate {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(self.parents(current).iter().copied());
        }
        false
    }

    /// Depth-first topological sort over child edges.
    ///
    /// A node reached again while still on the DFS path closes a cycle.
    fn topological_sort(&self) -> Result<Vec<VarId>, ExecError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            Visiting,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.nodes.len()];
        let mut finished = Vec::with_capacity(self.nodes.len());

        for root in &self.nodes {
            if marks[root.id.index()] != Mark::Unvisited {
                continue;
            }
            // (node, index of the next child to explore)
            let mut stack: Vec<(VarId, usize)> = vec![(root.id, 0)];
            marks[root.id.index()] = Mark::Visiting;
            while let Some((current, next_child)) = stack.last_mut() {
                let children = self.children(*current);
                if let Some(child) = children.get(*next_child).copied() {
                    *next_child += 1;
                    match marks[child.index()] {
                        Mark::Visiting => {
                            return Err(ExecError::CyclicNetwork(
                                self.var_name(child).to_string(),
                            ))
                        }
                        Mark::Unvisited => {
                            marks[child.index()] = Mark::Visiting;
                            stack.push((child, 0));
                        }
                        Mark::Done => {}
                    }
                } else {
                    marks[current.index()] = Mark::Done;
                    finished.push(*current);
                    stack.pop();
                }
            }
        }

        finished.reverse();
        Ok(finished)
    }
}

impl fmt::Display for BayesianNetwork {
    /// Human-readable structure dump in topological order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Bayesian network '{}' ({} nodes)",
            self.name().unwrap_or("<unnamed>"),
            self.len()
        )?;
        for id in &self.topological_order {
            let node = self.node(*id);
            writeln!(f, "Node: {}", node.name())?;
            writeln!(f, "  Outcomes: {}", node.variable().outcomes().join(", "))?;
            writeln!(f, "  Parents: [{}]", self.names(node.parents()).join(", "))?;
            writeln!(f, "  Children: [{}]", self.names(node.children()).join(", "))?;
            writeln!(f, "  CPT:")?;
            let scope = node.cpt().scope();
            for (key, p) in node.cpt().sorted_rows() {
                let row: Vec<String> = scope
                    .iter()
                    .zip(key.iter())
                    .map(|(var, outcome)| {
                        let variable = self.node(*var).variable();
                        format!("{}={}", variable.name(), variable.outcome(*outcome).unwrap_or("?"))
                    })
                    .collect();
                writeln!(f, "    {} -> {:.3}", row.join(", "), p)?;
            }
        }
        Ok(())
    }
}

/// Programmatic construction of networks, mainly for tests and embedding.
///
/// The builder assembles a [`NetworkAst`] and goes through the same
/// validation and cycle checks as parsed documents.
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    ast: NetworkAst,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.ast.name = Some(name.into());
        self
    }

    /// Declares a variable with its outcome labels.
    pub fn variable<I, S>(mut self, name: impl Into<String>, outcomes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ast.variables.push(VariableDecl {
            name: name.into(),
            kind: Some("nature".to_string()),
            outcomes: outcomes.into_iter().map(Into::into).collect(),
            properties: Vec::new(),
        });
        self
    }

    /// Defines the CPT of `name` given `parents`, in XMLBIF table order.
    pub fn cpt<P, S, T>(mut self, name: impl Into<String>, parents: P, table: T) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
        T: IntoIterator<Item = f64>,
    {
        self.ast.definitions.push(DefinitionDecl {
            variable: name.into(),
            given: parents.into_iter().map(Into::into).collect(),
            table: table.into_iter().collect(),
        });
        self
    }

    pub fn build(self) -> Result<BayesianNetwork, ExecError> {
        BayesianNetwork::from_ast(&self.ast)
    }
}

fn build_variable(decl: &VariableDecl) -> Variable {
    Variable {
        name: Arc::from(decl.name.as_str()),
        outcomes: decl.outcomes.iter().map(|o| Arc::from(o.as_str())).collect(),
    }
}

fn lookup_id(by_name: &FxHashMap<Arc<str>, VarId>, name: &str) -> Result<VarId, ExecError> {
    by_name
        .get(name)
        .copied()
        .ok_or_else(|| ExecError::UnknownVariable(name.to_string()))
}

/// Lays an XMLBIF table out as a factor over `parents ++ [id]`.
///
/// The last scope position varies fastest, so entry `i` decodes as a
/// mixed-radix number over the scope's cardinalities.
fn build_cpt(
    id: VarId,
    parents: &[VarId],
    variables: &[Variable],
    def: &DefinitionDecl,
) -> Result<Factor, ExecError> {
    let scope: SmallVec<[VarId; 8]> = parents.iter().copied().chain(std::iter::once(id)).collect();
    let radices: SmallVec<[usize; 8]> = scope
        .iter()
        .map(|v| variables[v.index()].cardinality())
        .collect();

    let rows = def.table.iter().enumerate().map(|(i, p)| {
        let mut key: Assignment = smallvec::smallvec![0; scope.len()];
        let mut rest = i;
        for pos in (0..scope.len()).rev() {
            key[pos] = (rest % radices[pos]) as OutcomeIndex;
            rest /= radices[pos];
        }
        (key, *p)
    });
    Factor::new(scope.iter().copied(), rows)
}
