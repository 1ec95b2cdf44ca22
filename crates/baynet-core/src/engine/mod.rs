//! The inference engine for baynet networks.
//!
//! This module provides:
//! - **errors**: Error types for loading and query failures
//! - **network**: The immutable DAG with CPTs, and its builder
//! - **factor**: Factor tables and the restrict / multiply / sum-out / normalize algebra
//! - **query**: Parsing of independence and probability query text
//! - **bayes_ball**: d-separation by Bayes-Ball reachability
//! - **elimination**: Variable elimination with pruning and operation counts
//! - **batch**: Input-file driver that answers queries in order

pub mod batch;
pub mod bayes_ball;
pub mod elimination;
pub mod errors;
pub mod factor;
pub mod network;
pub mod query;
