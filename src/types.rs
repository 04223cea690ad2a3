use crate::{RqliteError, Statement, Value};

#[derive(Clone, Debug, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub types: Vec<String>,
    pub values: Vec<Vec<Value>>,
    pub time: Option<f64>,
}

impl QueryResult {
    /// Returns the position of a column by case-insensitive name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecResult {
    pub last_insert_id: Option<i64>,
    pub rows_affected: u64,
    pub time: Option<f64>,
}

/// Outcome of one submitted statement.
#[derive(Clone, Debug, PartialEq)]
pub enum StatementOutcome {
    Query(QueryResult),
    Exec(ExecResult),
    SqlError { index: usize, message: String },
}

impl StatementOutcome {
    /// Converts a statement-level failure into an error.
    pub fn check(&self) -> Result<&Self, RqliteError> {
        match self {
            Self::SqlError { index, message } => Err(RqliteError::Statement {
                index: *index,
                message: message.clone(),
            }),
            other => Ok(other),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::SqlError { .. })
    }

    pub fn as_query(&self) -> Option<&QueryResult> {
        match self {
            Self::Query(result) => Some(result),
            _ => None,
        }
    }

    pub fn as_exec(&self) -> Option<&ExecResult> {
        match self {
            Self::Exec(result) => Some(result),
            _ => None,
        }
    }
}

/// Server response to one execute or query request.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletedResponse {
    pub status_code: u16,
    /// Server-reported duration in seconds, when the server sent one.
    pub time: Option<f64>,
    /// One outcome per submitted statement, in submission order.
    pub results: Vec<StatementOutcome>,
}

impl CompletedResponse {
    pub fn first(&self) -> Option<&StatementOutcome> {
        self.results.first()
    }
}

/// Result of [`RqliteClient::execute`](crate::RqliteClient::execute).
///
/// A `Deferred` response stands for statements accepted into the client
/// buffer but not yet sent. It carries no row data.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    Deferred { statements: Vec<Statement> },
    Completed(CompletedResponse),
}

impl Response {
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred { .. })
    }

    /// Outcomes of a completed request. Empty for deferred responses.
    pub fn results(&self) -> &[StatementOutcome] {
        match self {
            Self::Deferred { .. } => &[],
            Self::Completed(completed) => &completed.results,
        }
    }

    pub fn completed(self) -> Option<CompletedResponse> {
        match self {
            Self::Deferred { .. } => None,
            Self::Completed(completed) => Some(completed),
        }
    }
}
