//! # XMLBIF Parser
//!
//! This module implements the network document parser using the Pest parser generator.
//!
//! ## Overview
//!
//! The parser transforms XMLBIF source text into a [`NetworkAst`] without
//! performing semantic validation. It handles:
//!
//! - The optional `<?xml ...?>` prolog, `<!DOCTYPE ...>` and `<BIF>` wrapper
//! - `<VARIABLE>` declarations with outcomes and properties
//! - `<DEFINITION>` blocks with `FOR`, `GIVEN` and `TABLE`
//!
//! Comments may appear anywhere whitespace may. Numbers in `<TABLE>` are
//! parsed to `f64` at parse time.
//!
//! ## Grammar
//!
//! The grammar is defined in `grammar.pest` using Pest's PEG syntax.

use crate::ast::*;
use crate::errors::FrontendError;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "../grammar.pest"]
pub struct XmlBifParser;

/// Parses an XMLBIF document into a [`NetworkAst`].
///
/// This is a pure syntactic parser. Use [`crate::validate::validate_network`]
/// to check cross references and table sizes.
///
/// # Example
///
/// ```rust
/// use baynet_frontend::parse_network;
///
/// let source = r#"
///     <NETWORK>
///       <VARIABLE TYPE="nature"><NAME>A</NAME><OUTCOME>T</OUTCOME><OUTCOME>F</OUTCOME></VARIABLE>
///       <DEFINITION><FOR>A</FOR><TABLE>0.6 0.4</TABLE></DEFINITION>
///     </NETWORK>
/// "#;
/// let ast = parse_network(source).unwrap();
/// assert_eq!(ast.variables.len(), 1);
/// assert_eq!(ast.definitions[0].table, vec![0.6, 0.4]);
/// ```
pub fn parse_network(source: &str) -> Result<NetworkAst, FrontendError> {
    let mut pairs = XmlBifParser::parse(Rule::document, source)
        .map_err(|e| FrontendError::ParseError(e.to_string()))?;

    let document = pairs
        .next()
        .ok_or_else(|| FrontendError::ParseError("empty document".to_string()))?;
    debug_assert_eq!(document.as_rule(), Rule::document);

    for inner in document.into_inner() {
        match inner.as_rule() {
            Rule::network => return build_network(inner),
            Rule::bif => {
                let network = inner
                    .into_inner()
                    .find(|p| p.as_rule() == Rule::network)
                    .ok_or_else(|| {
                        FrontendError::ParseError("<BIF> without <NETWORK>".to_string())
                    })?;
                return build_network(network);
            }
            _ => {}
        }
    }

    Err(FrontendError::ParseError(
        "document has no <NETWORK> element".to_string(),
    ))
}

fn build_network(pair: Pair<Rule>) -> Result<NetworkAst, FrontendError> {
    let mut ast = NetworkAst::default();
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::network_name => ast.name = Some(inner_text(p)),
            Rule::variable => ast.variables.push(build_variable(p)?),
            Rule::definition => ast.definitions.push(build_definition(p)?),
            _ => {}
        }
    }
    Ok(ast)
}

fn build_variable(pair: Pair<Rule>) -> Result<VariableDecl, FrontendError> {
    let mut name = None;
    let mut kind = None;
    let mut outcomes = Vec::new();
    let mut properties = Vec::new();
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::attribute => {
                let (key, value) = build_attribute(p)?;
                if key.eq_ignore_ascii_case("type") {
                    kind = Some(value);
                }
            }
            Rule::var_name if name.is_none() => name = Some(inner_text(p)),
            Rule::var_name => {
                return Err(FrontendError::ParseError(
                    "<VARIABLE> has more than one <NAME>".to_string(),
                ))
            }
            Rule::outcome => outcomes.push(inner_text(p)),
            Rule::property => properties.push(inner_text(p)),
            _ => {}
        }
    }
    let name =
        name.ok_or_else(|| FrontendError::ParseError("<VARIABLE> without <NAME>".to_string()))?;
    Ok(VariableDecl {
        name,
        kind,
        outcomes,
        properties,
    })
}

fn build_definition(pair: Pair<Rule>) -> Result<DefinitionDecl, FrontendError> {
    let mut variable = None;
    let mut given = Vec::new();
    let mut table = None;
    for p in pair.into_inner() {
        match p.as_rule() {
            Rule::for_clause if variable.is_none() => variable = Some(inner_text(p)),
            Rule::for_clause => {
                return Err(FrontendError::ParseError(
                    "<DEFINITION> has more than one <FOR>".to_string(),
                ))
            }
            Rule::given => given.push(inner_text(p)),
            Rule::table if table.is_none() => table = Some(build_table(p)?),
            Rule::table => {
                return Err(FrontendError::ParseError(
                    "<DEFINITION> has more than one <TABLE>".to_string(),
                ))
            }
            _ => {}
        }
    }
    let variable = variable
        .ok_or_else(|| FrontendError::ParseError("<DEFINITION> without <FOR>".to_string()))?;
    let table = table.ok_or_else(|| {
        FrontendError::ParseError(format!("<DEFINITION> for '{}' without <TABLE>", variable))
    })?;
    Ok(DefinitionDecl {
        variable,
        given,
        table,
    })
}

fn build_table(pair: Pair<Rule>) -> Result<Vec<f64>, FrontendError> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::number)
        .map(|p| {
            p.as_str()
                .parse::<f64>()
                .map_err(|e| FrontendError::ParseError(format!("bad number '{}': {}", p.as_str(), e)))
        })
        .collect()
}

fn build_attribute(pair: Pair<Rule>) -> Result<(String, String), FrontendError> {
    let mut inner = pair.into_inner();
    let key = inner
        .next()
        .ok_or_else(|| FrontendError::ParseError("Missing attribute name".to_string()))?
        .as_str()
        .to_string();
    let value = inner
        .next()
        .ok_or_else(|| FrontendError::ParseError("Missing attribute value".to_string()))?
        .as_str()
        .trim_matches('"')
        .to_string();
    Ok((key, value))
}

/// Returns the trimmed text content of a simple `<TAG>text</TAG>` element.
fn inner_text(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::text)
        .map(|p| p.as_str().trim().to_string())
        .unwrap_or_default()
}
