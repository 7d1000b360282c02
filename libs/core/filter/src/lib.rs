//! Filter Engine
//!
//! A small textual filter language for list endpoints. Expressions like
//!
//! ```text
//! active:true and (level:'SENIOR' or salary>:2000) and name~'rust*'
//! ```
//!
//! are parsed into a [`FilterNode`] predicate tree, which can then be
//! compiled into a SeaORM [`sea_orm::Condition`] for SQL-backed
//! repositories, or evaluated directly against JSON values for in-memory
//! repositories and tests.
//!
//! # Operators
//!
//! | Operator | Meaning            |
//! |----------|--------------------|
//! | `:`      | equals             |
//! | `!`      | not equals         |
//! | `>` `>:` | greater (or equal) |
//! | `<` `<:` | less (or equal)    |
//! | `~`      | LIKE (`*` wildcard)|
//! | `in`     | set membership     |
//!
//! `and` binds tighter than `or`; `not` and parentheses are supported.
//! Keywords are case-insensitive.
//!
//! Re-serializing a parsed tree with `Display` yields a canonical form that
//! parses back to an equal tree.

pub mod ast;
pub mod condition;
pub mod eval;
pub mod parser;

pub use ast::{CompareOp, FilterNode, FilterValue};
pub use condition::{to_condition, FieldResolver, MapResolver};
pub use eval::matches;
pub use parser::parse;

use thiserror::Error;

/// Errors produced while parsing or applying a filter expression.
///
/// All variants map to a 400 response at the HTTP layer.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("Malformed filter at position {position}: {message}")]
    Malformed { position: usize, message: String },

    #[error("Unknown filter field '{0}'")]
    UnknownField(String),

    #[error("Operator '{op}' cannot be applied to field '{field}'")]
    BadOperand { field: String, op: String },
}

impl FilterError {
    pub(crate) fn malformed(position: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            message: message.into(),
        }
    }
}

pub type FilterResult<T> = Result<T, FilterError>;
