/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum RqliteError {
    /// Connection, DNS, TLS or timeout failure from `reqwest`.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// A single statement failed on the server.
    #[error("statement error at index {index}: {message}")]
    Statement {
        /// Position of the failing statement in the submitted batch.
        index: usize,
        /// Error message reported by rqlite.
        message: String,
    },
    /// A batch stopped at its first failing statement.
    ///
    /// `rows_affected` holds the counts of the statements that succeeded
    /// before `index`. Without a transaction those writes may already be
    /// applied.
    #[error("batch failed at statement {index}: {message}")]
    Batch {
        index: usize,
        message: String,
        rows_affected: Vec<u64>,
    },
    /// Response body was not valid JSON or had an unexpected shape.
    #[error("decode error: {0}")]
    Decode(String),
    /// Caller misuse detected before any request was sent.
    #[error("usage error: {0}")]
    Usage(String),
}
