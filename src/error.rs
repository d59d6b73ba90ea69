use thiserror::Error;

use crate::events::{AttributeKind, EventError};

/// Errors that can arise while building a rule set: registering attributes, resolving names and
/// string literals, and validating an expression before it is handed to the evaluator.
///
/// These are recoverable by construction: the caller is an external parser/validator collaborator
/// that may legitimately be fed not-yet-checked rule text, and is expected to surface these as
/// diagnostics rather than crash.
#[derive(Debug, PartialEq, Error)]
pub enum BuildError {
    #[error("attribute {0:?} has already been defined")]
    DuplicateAttribute(String),
    #[error("expression refers to unknown attribute {0:?}")]
    UnknownAttribute(String),
    #[error("{name:?}: expected a value of kind {expected:?}, found {actual:?}")]
    MismatchingKind {
        name: String,
        expected: AttributeKind,
        actual: AttributeKind,
    },
    #[error(transparent)]
    Event(#[from] EventError),
}

/// Error returned when a bound is requested over a domain kind that does not admit one.
#[derive(Debug, PartialEq, Error)]
pub enum BoundError {
    #[error("attribute {0:?} does not have a bounded domain")]
    UnboundedDomain(String),
}
