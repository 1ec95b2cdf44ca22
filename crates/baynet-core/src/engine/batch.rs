//! # Batch Driver
//!
//! Reads an input file whose first non-empty line names a network document and
//! whose remaining non-empty lines are queries, and answers every query in
//! input order.
//!
//! A query that fails (unknown variable, numerical failure, ...) does not stop
//! the batch: its answer becomes an `error: ...` line. With the `rayon`
//! feature, queries are answered in parallel; the output order is unchanged.

use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::engine::bayes_ball::BayesBall;
use crate::engine::elimination::{EliminationConfig, VariableElimination};
use crate::engine::errors::ExecError;
use crate::engine::network::BayesianNetwork;
use crate::engine::query::{Query, INVALID_QUERY_FORMAT};

/// A parsed batch input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    pub network_path: PathBuf,
    pub queries: Vec<String>,
}

impl BatchInput {
    /// Splits batch text into the network path and the query lines.
    ///
    /// Blank lines are skipped and surrounding whitespace is trimmed.
    pub fn parse(text: &str) -> Result<Self, ExecError> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let network_path = lines
            .next()
            .map(PathBuf::from)
            .ok_or_else(|| ExecError::ValidationError("batch input is empty".into()))?;
        Ok(Self {
            network_path,
            queries: lines.map(str::to_string).collect(),
        })
    }

    /// Reads a batch file. A relative network path is resolved against the
    /// directory containing the batch file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ExecError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ExecError::Io(format!("reading '{}': {}", path.display(), e)))?;
        let mut input = Self::parse(&text)?;
        if input.network_path.is_relative() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                input.network_path = dir.join(&input.network_path);
            }
        }
        Ok(input)
    }

    /// Loads the network named on the first line.
    pub fn load_network(&self) -> Result<BayesianNetwork, ExecError> {
        let network = BayesianNetwork::from_path(&self.network_path)?;
        tracing::debug!(
            path = %self.network_path.display(),
            nodes = network.len(),
            "loaded batch network"
        );
        Ok(network)
    }
}

/// The answer to one batch line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchAnswer {
    pub query: String,
    pub output: String,
    /// The query was well formed but could not be answered
    pub failed: bool,
}

impl fmt::Display for BatchAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.output)
    }
}

/// Routes query lines to the Bayes-Ball or variable elimination engine.
#[derive(Debug, Clone)]
pub struct QueryRunner<'a> {
    network: &'a BayesianNetwork,
    elimination: VariableElimination<'a>,
}

impl<'a> QueryRunner<'a> {
    pub fn new(network: &'a BayesianNetwork) -> Self {
        Self {
            network,
            elimination: VariableElimination::new(network),
        }
    }

    pub fn with_config(
        network: &'a BayesianNetwork,
        config: EliminationConfig,
    ) -> Result<Self, ExecError> {
        Ok(Self {
            network,
            elimination: VariableElimination::with_config(network, config)?,
        })
    }

    /// Answers a single line. Never fails: errors become `error: ...` output.
    pub fn answer(&self, line: &str) -> BatchAnswer {
        let query = line.trim().to_string();
        let result = match Query::parse(&query) {
            Ok(Query::Independence(parsed)) => BayesBall::new(self.network)
                .answer(&parsed)
                .map(|independent| if independent { "yes" } else { "no" }.to_string()),
            Ok(Query::Probability(parsed)) => self
                .elimination
                .evaluate(&parsed)
                .map(|result| result.to_string()),
            Err(err) => {
                tracing::debug!(%err, "unrecognised batch line");
                Ok(INVALID_QUERY_FORMAT.to_string())
            }
        };

        match result {
            Ok(output) => BatchAnswer {
                query,
                output,
                failed: false,
            },
            Err(err) => {
                tracing::warn!(query = %query, error = %err, "query failed");
                BatchAnswer {
                    output: format!("error: {}", err),
                    query,
                    failed: true,
                }
            }
        }
    }

    /// Answers all lines, preserving input order.
    pub fn answer_all(&self, queries: &[String]) -> Vec<BatchAnswer> {
        #[cfg(feature = "rayon")]
        {
            queries.par_iter().map(|q| self.answer(q)).collect()
        }

        #[cfg(not(feature = "rayon"))]
        {
            queries.iter().map(|q| self.answer(q)).collect()
        }
    }
}

/// Answers `queries` against an already loaded network, in input order.
pub fn run_batch(
    network: &BayesianNetwork,
    queries: &[String],
    config: EliminationConfig,
) -> Result<Vec<BatchAnswer>, ExecError> {
    tracing::info!(
        network = network.name().unwrap_or("<unnamed>"),
        queries = queries.len(),
        "running batch"
    );
    let runner = QueryRunner::with_config(network, config)?;
    Ok(runner.answer_all(queries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::network::NetworkBuilder;

    fn pair() -> BayesianNetwork {
        NetworkBuilder::new()
            .variable("A", ["T", "F"])
            .variable("B", ["T", "F"])
            .cpt("A", [] as [&str; 0], [0.6, 0.4])
            .cpt("B", ["A"], [0.8, 0.2, 0.3, 0.7])
            .build()
            .expect("pair")
    }

    #[test]
    fn parse_skips_blank_lines() {
        let input = BatchInput::parse("\n  net.xml  \n\nA-B\n  \nP(B=T|A=T)\n").unwrap();
        assert_eq!(input.network_path, PathBuf::from("net.xml"));
        assert_eq!(input.queries, vec!["A-B", "P(B=T|A=T)"]);
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert!(matches!(
            BatchInput::parse(" \n\n"),
            Err(ExecError::ValidationError(_))
        ));
    }

    #[test]
    fn routes_each_line() {
        let net = pair();
        let runner = QueryRunner::new(&net);
        assert_eq!(runner.answer("A-B").output, "no");
        assert_eq!(runner.answer("P(B=T|A=T)").output, "0.80000,0,0");
        assert_eq!(runner.answer("hello").output, INVALID_QUERY_FORMAT);
    }

    #[test]
    fn failures_become_error_lines() {
        let net = pair();
        let runner = QueryRunner::new(&net);
        let answer = runner.answer("P(Z=T)");
        assert!(answer.failed);
        assert!(answer.output.starts_with("error: "));
    }

    #[test]
    fn run_batch_rejects_invalid_config() {
        let net = pair();
        let config = EliminationConfig {
            normalization_tolerance: f64::NAN,
            ..EliminationConfig::default()
        };
        let queries = vec!["A-B".to_string()];
        assert!(matches!(
            run_batch(&net, &queries, config),
            Err(ExecError::ValidationError(_))
        ));
    }

    #[test]
    fn answer_all_preserves_order() {
        let net = pair();
        let runner = QueryRunner::new(&net);
        let queries: Vec<String> = ["P(A=T|B=T) B", "A-B|", "P(B=T|A=T)", "junk"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let outputs: Vec<String> = runner
            .answer_all(&queries)
            .into_iter()
            .map(|a| a.output)
            .collect();
        assert_eq!(
            outputs,
            vec!["0.80000,1,2", "no", "0.80000,0,0", INVALID_QUERY_FORMAT]
        );
    }
}
