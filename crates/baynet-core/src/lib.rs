//! # baynet Core
//!
//! Exact inference over discrete Bayesian networks loaded from XMLBIF:
//! conditional independence by Bayes-Ball and conditional probabilities by
//! variable elimination.
//!
//! ```rust
//! use baynet_core::{load_network, QueryRunner};
//!
//! let source = r#"
//! <NETWORK>
//!   <VARIABLE><NAME>A</NAME><OUTCOME>T</OUTCOME><OUTCOME>F</OUTCOME></VARIABLE>
//!   <VARIABLE><NAME>B</NAME><OUTCOME>T</OUTCOME><OUTCOME>F</OUTCOME></VARIABLE>
//!   <DEFINITION><FOR>A</FOR><TABLE>0.6 0.4</TABLE></DEFINITION>
//!   <DEFINITION><FOR>B</FOR><GIVEN>A</GIVEN><TABLE>0.8 0.2 0.3 0.7</TABLE></DEFINITION>
//! </NETWORK>
//! "#;
//! let network = load_network(source).unwrap();
//! let runner = QueryRunner::new(&network);
//! assert_eq!(runner.answer("P(A=T|B=T) B").output, "0.80000,1,2");
//! assert_eq!(runner.answer("A-B").output, "no");
//! ```

pub mod engine;

// Re-export commonly used types
pub use engine::batch::{run_batch, BatchAnswer, BatchInput, QueryRunner};
pub use engine::bayes_ball::BayesBall;
pub use engine::elimination::{EliminationConfig, EliminationResult, VariableElimination};
pub use engine::errors::ExecError;
pub use engine::factor::{Factor, OpCounter};
pub use engine::network::{BayesianNetwork, NetworkBuilder, VarId};
pub use engine::query::INVALID_QUERY_FORMAT;

/// Parse, validate and build a network from XMLBIF source.
///
/// This is a convenience function that converts frontend errors to core errors.
pub fn load_network(source: &str) -> Result<BayesianNetwork, ExecError> {
    BayesianNetwork::parse(source)
}
