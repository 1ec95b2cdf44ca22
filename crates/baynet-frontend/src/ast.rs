//! # Abstract Syntax Tree
//!
//! Data structures produced by the XMLBIF parser.
//!
//! ## Structure
//!
//! A network document consists of:
//! - **Variables**: a name, an ordered outcome domain and free-form properties
//! - **Definitions**: the CPT of one variable, conditioned on its `GIVEN` parents
//!
//! The AST is purely syntactic. Cross references (parents, table sizes) are
//! checked by [`crate::validate::validate_network`].

/// The root of a parsed network document.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkAst {
    /// Optional network name from `<NETWORK><NAME>`
    pub name: Option<String>,
    /// Variable declarations in document order
    pub variables: Vec<VariableDecl>,
    /// CPT definitions in document order
    pub definitions: Vec<DefinitionDecl>,
}

impl NetworkAst {
    /// Finds a variable declaration by name.
    pub fn variable(&self, name: &str) -> Option<&VariableDecl> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Finds the definition whose `FOR` names the given variable.
    pub fn definition_for(&self, name: &str) -> Option<&DefinitionDecl> {
        self.definitions.iter().find(|d| d.variable == name)
    }
}

/// A `<VARIABLE>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableDecl {
    /// The variable name
    pub name: String,
    /// Value of the `TYPE` attribute (usually "nature"), if present
    pub kind: Option<String>,
    /// Outcome labels in declaration order
    pub outcomes: Vec<String>,
    /// Raw `<PROPERTY>` contents (e.g. editor positions)
    pub properties: Vec<String>,
}

/// A `<DEFINITION>` element: the CPT of `variable` given `given`.
///
/// The table is laid out with the first parent varying slowest and the
/// variable's own outcomes varying fastest.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefinitionDecl {
    /// Name from `<FOR>`
    pub variable: String,
    /// Parent names from `<GIVEN>`, in order
    pub given: Vec<String>,
    /// Probabilities from `<TABLE>`
    pub table: Vec<f64>,
}
