//! Error types for birdql

use thiserror::Error;

/// Result type alias for birdql operations
pub type QbResult<T> = Result<T, QbError>;

/// Errors raised while validating, building or executing a statement.
///
/// Everything except [`QbError::Execution`], [`QbError::Decode`] and
/// [`QbError::Aborted`] is a programmer error: the query description itself is
/// malformed and retrying will not help.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QbError {
    /// Identifier matches a dangerous pattern (statement terminator or keyword token)
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Column expression matches none of the accepted shapes
    #[error("Invalid column expression: \"{0}\"")]
    InvalidColumnExpression(String),

    /// Table expression does not match `[schema.]table [[AS] alias]`
    #[error("Invalid table expression: \"{0}\"")]
    InvalidTableExpression(String),

    /// Column expression without a column segment
    #[error("No column provided: {0}")]
    MissingColumn(String),

    /// Table expression without a table segment
    #[error("No table provided: {0}")]
    MissingTable(String),

    /// Empty or blank field name in a condition
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Wrong arity, wrong value type or empty list for an operator
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    /// Operator outside the recognized set for the condition shape
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// SELECT built without any field
    #[error("SELECT fields are required")]
    MissingSelectFields,

    /// SELECT/UPDATE/DELETE built without a table
    #[error("FROM table is required")]
    MissingFromTable,

    /// INSERT/UPDATE/CREATE TABLE built without any column
    #[error("{0} requires at least one column")]
    MissingValues(&'static str),

    /// Error reported by the execution engine
    #[error("Execution error: {0}")]
    Execution(String),

    /// Row could not be mapped to the requested type
    #[error("Decode error: {0}")]
    Decode(String),

    /// A query hook refused to let the statement run
    #[error("Query aborted by hook: {0}")]
    Aborted(String),
}

impl QbError {
    /// Create an invalid condition error
    pub fn invalid_condition(message: impl Into<String>) -> Self {
        Self::InvalidCondition(message.into())
    }

    /// Create an invalid field error
    pub fn invalid_field(message: impl Into<String>) -> Self {
        Self::InvalidField(message.into())
    }

    /// Create an unsupported operator error
    pub fn unsupported_operator(message: impl Into<String>) -> Self {
        Self::UnsupportedOperator(message.into())
    }

    /// Create an execution error, typically from an engine's own error type
    pub fn execution(message: impl ToString) -> Self {
        Self::Execution(message.to_string())
    }

    /// Check if this error comes from malformed quoting input
    pub fn is_quoting_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdentifier(_)
                | Self::InvalidColumnExpression(_)
                | Self::InvalidTableExpression(_)
                | Self::MissingColumn(_)
                | Self::MissingTable(_)
        )
    }

    /// Check if this error was raised while classifying a condition
    pub fn is_condition_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidField(_) | Self::InvalidCondition(_) | Self::UnsupportedOperator(_)
        )
    }

    /// Check if this error was reported by the execution engine
    pub fn is_execution_error(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}

impl From<serde_json::Error> for QbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
