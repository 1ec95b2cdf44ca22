//! # Query Language
//!
//! Parsing of the two textual query forms:
//!
//! - **Independence**: `A-B` or `A-B|E1,E2=v,...`. Evidence values are
//!   accepted but ignored, since blocking does not depend on them.
//! - **Probability**: `P(Q=q|E1=v1,E2=v2,...) H1-H2-H3`. The trailing token
//!   is a dash-joined candidate elimination order and may be omitted.
//!
//! Parsing is purely syntactic: names are resolved against a network by the
//! engines. Malformed text yields a [`QueryFormatError`], which the engines
//! turn into the [`INVALID_QUERY_FORMAT`] answer instead of failing.

use thiserror::Error;

/// Answer line produced for structurally malformed query text.
pub const INVALID_QUERY_FORMAT: &str = "Invalid query format";

/// Structural problem in query text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed query '{query}': {reason}")]
pub struct QueryFormatError {
    pub query: String,
    pub reason: String,
}

impl QueryFormatError {
    fn new(query: &str, reason: impl Into<String>) -> Self {
        Self {
            query: query.to_string(),
            reason: reason.into(),
        }
    }
}

/// A parsed query line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Independence(IndependenceQuery),
    Probability(ProbabilityQuery),
}

impl Query {
    /// Routes a batch line: `P(` starts a probability query, any other line
    /// containing `-` is an independence query.
    pub fn parse(line: &str) -> Result<Self, QueryFormatError> {
        let line = line.trim();
        if line.starts_with("P(") {
            ProbabilityQuery::parse(line).map(Query::Probability)
        } else if line.contains('-') {
            IndependenceQuery::parse(line).map(Query::Independence)
        } else {
            Err(QueryFormatError::new(line, "not a recognised query form"))
        }
    }
}

/// `start-end|evidence...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndependenceQuery {
    pub start: String,
    pub end: String,
    /// Evidence variable names (values dropped)
    pub evidence: Vec<String>,
}

impl IndependenceQuery {
    pub fn parse(query: &str) -> Result<Self, QueryFormatError> {
        let parts: Vec<&str> = query.trim().split('|').collect();
        if parts.len() != 1 && parts.len() != 2 {
            return Err(QueryFormatError::new(query, "expected at most one '|'"));
        }

        let nodes: Vec<&str> = parts[0].split('-').map(str::trim).collect();
        if nodes.len() != 2 {
            return Err(QueryFormatError::new(
                query,
                "expected exactly two variables joined by '-'",
            ));
        }
        if nodes.iter().any(|n| n.is_empty()) {
            return Err(QueryFormatError::new(query, "empty variable name"));
        }

        let mut evidence = Vec::new();
        if let Some(given) = parts.get(1).map(|g| g.trim()).filter(|g| !g.is_empty()) {
            for item in given.split(',') {
                let name = item.split('=').next().unwrap_or_default().trim();
                if name.is_empty() {
                    return Err(QueryFormatError::new(query, "empty evidence name"));
                }
                evidence.push(name.to_string());
            }
        }

        Ok(Self {
            start: nodes[0].to_string(),
            end: nodes[1].to_string(),
            evidence,
        })
    }
}

/// `P(variable=value|evidence...) order`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbabilityQuery {
    pub variable: String,
    pub value: String,
    /// `(name, value)` pairs in query order
    pub evidence: Vec<(String, String)>,
    /// Candidate elimination order, possibly empty
    pub elimination_order: Vec<String>,
}

impl ProbabilityQuery {
    pub fn parse(query: &str) -> Result<Self, QueryFormatError> {
        let text = query.trim();
        let body_start = text
            .strip_prefix("P(")
            .ok_or_else(|| QueryFormatError::new(query, "expected 'P(' prefix"))?;
        let close = body_start
            .find(')')
            .ok_or_else(|| QueryFormatError::new(query, "missing ')'"))?;
        let body = &body_start[..close];
        let tail = body_start[close + 1..].trim();

        let parts: Vec<&str> = body.split('|').collect();
        if parts.len() != 1 && parts.len() != 2 {
            return Err(QueryFormatError::new(query, "expected at most one '|'"));
        }

        let (variable, value) = parse_assignment(query, parts[0])?;

        let mut evidence: Vec<(String, String)> = Vec::new();
        if let Some(given) = parts.get(1).map(|g| g.trim()).filter(|g| !g.is_empty()) {
            for item in given.split(',') {
                let (name, val) = parse_assignment(query, item)?;
                match evidence.iter().find(|(n, _)| *n == name) {
                    Some((_, existing)) if *existing != val => {
                        return Err(QueryFormatError::new(
                            query,
                            format!("conflicting evidence for '{}'", name),
                        ))
                    }
                    Some(_) => {}
                    None => evidence.push((name, val)),
                }
            }
        }

        let elimination_order = parse_order(query, tail)?;

        Ok(Self {
            variable,
            value,
            evidence,
            elimination_order,
        })
    }
}

fn parse_assignment(query: &str, item: &str) -> Result<(String, String), QueryFormatError> {
    let pieces: Vec<&str> = item.split('=').map(str::trim).collect();
    match pieces.as_slice() {
        [name, value] if !name.is_empty() && !value.is_empty() => {
            Ok((name.to_string(), value.to_string()))
        }
        _ => Err(QueryFormatError::new(
            query,
            format!("expected 'Name=Value', found '{}'", item.trim()),
        )),
    }
}

fn parse_order(query: &str, tail: &str) -> Result<Vec<String>, QueryFormatError> {
    if tail.is_empty() {
        return Ok(Vec::new());
    }
    if tail.split_whitespace().count() != 1 {
        return Err(QueryFormatError::new(
            query,
            "elimination order must be a single dash-joined token",
        ));
    }
    tail.split('-')
        .map(|name| {
            let name = name.trim();
            if name.is_empty() {
                Err(QueryFormatError::new(query, "empty name in elimination order"))
            } else {
                Ok(name.to_string())
            }
        })
        .collect()
}
