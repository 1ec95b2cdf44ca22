//! # Semantic Validation
//!
//! Checks performed on a parsed [`NetworkAst`]:
//!
//! - Variable names are unique and every variable has at least one outcome
//! - Outcome labels are unique within a variable
//! - Every variable has exactly one definition, and every definition names a
//!   declared variable
//! - `GIVEN` parents are declared, distinct, and differ from the defined variable
//! - Table size equals the product of parent cardinalities times the
//!   variable's own cardinality
//! - Table entries are finite probabilities in `[0, 1]`
//!
//! Row sums are not checked: callers are expected to supply consistent tables.
//! Acyclicity is a graph property and is checked when the network is built.

use std::collections::HashSet;

use crate::ast::*;
use crate::errors::FrontendError;

/// Performs semantic validation on a parsed network.
///
/// # Example
///
/// ```rust,ignore
/// let ast = parser::parse_network(source)?;
/// validate::validate_network(&ast)?;
/// ```
pub fn validate_network(ast: &NetworkAst) -> Result<(), FrontendError> {
    let mut names = HashSet::new();
    for var in &ast.variables {
        if var.name.is_empty() {
            return Err(FrontendError::validation("variable with empty name"));
        }
        if !names.insert(var.name.as_str()) {
            return Err(FrontendError::validation(format!(
                "duplicate variable '{}'",
                var.name
            )));
        }
        validate_outcomes(var)?;
    }

    let mut defined = HashSet::new();
    for def in &ast.definitions {
        let var = ast.variable(&def.variable).ok_or_else(|| {
            FrontendError::validation(format!(
                "definition for undeclared variable '{}'",
                def.variable
            ))
        })?;
        if !defined.insert(def.variable.as_str()) {
            return Err(FrontendError::validation(format!(
                "variable '{}' is defined more than once",
                def.variable
            )));
        }
        validate_definition(ast, var, def)?;
    }

    if let Some(missing) = ast
        .variables
        .iter()
        .find(|v| !defined.contains(v.name.as_str()))
    {
        return Err(FrontendError::validation(format!(
            "variable '{}' has no definition",
            missing.name
        )));
    }

    Ok(())
}

fn validate_outcomes(var: &VariableDecl) -> Result<(), FrontendError> {
    if var.outcomes.is_empty() {
        return Err(FrontendError::validation(format!(
            "variable '{}' has no outcomes",
            var.name
        )));
    }
    if var.outcomes.len() > u16::MAX as usize {
        return Err(FrontendError::validation(format!(
            "variable '{}' has too many outcomes ({})",
            var.name,
            var.outcomes.len()
        )));
    }
    let mut seen = HashSet::new();
    for outcome in &var.outcomes {
        if !seen.insert(outcome.as_str()) {
            return Err(FrontendError::validation(format!(
                "variable '{}' repeats outcome '{}'",
                var.name, outcome
            )));
        }
    }
    Ok(())
}

fn validate_definition(
    ast: &NetworkAst,
    var: &VariableDecl,
    def: &DefinitionDecl,
) -> Result<(), FrontendError> {
    let mut expected = var.outcomes.len();
    let mut seen = HashSet::new();
    for parent in &def.given {
        if parent == &def.variable {
            return Err(FrontendError::validation(format!(
                "variable '{}' lists itself as a parent",
                def.variable
            )));
        }
        if !seen.insert(parent.as_str()) {
            return Err(FrontendError::validation(format!(
                "variable '{}' lists parent '{}' twice",
                def.variable, parent
            )));
        }
        let parent_decl = ast.variable(parent).ok_or_else(|| {
            FrontendError::validation(format!(
                "variable '{}' has undeclared parent '{}'",
                def.variable, parent
            ))
        })?;
        expected = expected.saturating_mul(parent_decl.outcomes.len());
    }

    if def.table.len() != expected {
        return Err(FrontendError::validation(format!(
            "table for '{}' has {} entries, expected {}",
            def.variable,
            def.table.len(),
            expected
        )));
    }

    if let Some(bad) = def
        .table
        .iter()
        .find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0)
    {
        return Err(FrontendError::validation(format!(
            "table for '{}' contains {}, which is not a probability",
            def.variable, bad
        )));
    }

    Ok(())
}
