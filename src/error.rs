use crate::parser::ParsingError;
use thiserror::Error;

/// Everything that can abort the evaluation of a single console line.
///
/// None of these are fatal to the host: [`crate::Interpreter::evaluate`] reports
/// them through the logger and yields no value.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// `=` with nothing in front of it.
    #[error("Invalid variable")]
    InvalidAssignment,

    #[error("Malformed expression '{input}': {source}")]
    Malformed {
        input: String,
        #[source]
        source: ParsingError,
    },

    #[error("No method found with given name: {name}")]
    UnknownCommand { name: String },

    #[error("Argument count is invalid for: {signature} Input method: {name}, Args: {args}")]
    ArityMismatch {
        signature: String,
        name: String,
        args: String,
    },

    #[error("Argument {index} is null. Expected: {expected}")]
    NullArgument { index: usize, expected: String },

    #[error("Method param type not implemented: {argument} to {expected}")]
    UnsupportedParameterType { argument: String, expected: String },

    #[error("Could not parse argument {argument} to {expected}. {reason}")]
    CoercionFailure {
        argument: String,
        expected: String,
        reason: String,
    },

    #[error("Multiple objects of same type is not allowed: {type_name}")]
    DuplicateTargetType { type_name: String },

    #[error("Invocation of {name} failed: {source:#}")]
    InvocationFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T, E = ConsoleError> = std::result::Result<T, E>;
