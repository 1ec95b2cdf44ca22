//! # baynet Frontend
//!
//! Parser, AST, and validation for XMLBIF Bayesian network documents.

pub mod ast;
pub mod errors;
pub mod parser;
pub mod validate;

// Re-export commonly used types
pub use ast::*;
pub use errors::FrontendError;
pub use parser::parse_network;
pub use validate::validate_network;
