use std::{fmt, mem};

use reqwest::Method;

use crate::{
    decode::{check_status, decode_response},
    transport::Transport,
    wire, ClientOptions, CompletedResponse, ConnectionConfig, Params, Response, Result,
    RqliteError, Statement, StatementOutcome,
};

/// Client-side batching state.
///
/// Each entry of `Buffering` holds the statements of one deferred
/// `execute` call.
#[derive(Clone, Debug, Default)]
enum BufferState {
    #[default]
    Idle,
    Buffering(Vec<Vec<Statement>>),
}

/// HTTP client for the rqlite data and cluster API.
#[derive(Clone)]
pub struct RqliteClient {
    transport: Transport,
    base_url: String,
    options: ClientOptions,
    buffer: BufferState,
}

impl fmt::Debug for RqliteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RqliteClient")
            .field("base_url", &self.base_url)
            .field("transport", &self.transport)
            .field("options", &self.options)
            .field("buffered", &self.buffered_len())
            .finish()
    }
}

impl RqliteClient {
    /// Creates a client for a node, e.g. `http://localhost:4001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            transport: Transport::default(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            options: ClientOptions::default(),
            buffer: BufferState::Idle,
        }
    }

    /// Creates a client from `RQLITE_URL`, `RQLITE_USER` and
    /// `RQLITE_PASSWORD`.
    ///
    /// See [`ConnectionConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        ConnectionConfig::from_env().map(ConnectionConfig::into_client)
    }

    /// Sends `Authorization: Basic` on every request.
    ///
    /// The header is skipped when both parts are empty.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.transport
            .set_basic_auth(username.into(), password.into());
        self
    }

    /// Applies request options such as timeout and consistency level.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sets the request timeout in seconds. `0` disables the timeout.
    pub fn set_timeout_sec(&mut self, secs: i64) -> Result<()> {
        if secs < 0 {
            return Err(RqliteError::Usage(format!("invalid timeout [{secs}]")));
        }
        self.options.timeout_sec = if secs == 0 { -1 } else { secs };
        Ok(())
    }

    pub fn timeout_sec(&self) -> i64 {
        self.options.timeout_sec
    }

    pub fn is_buffering(&self) -> bool {
        matches!(self.buffer, BufferState::Buffering(_))
    }

    /// Number of statements waiting in the buffer.
    pub fn buffered_len(&self) -> usize {
        match &self.buffer {
            BufferState::Idle => 0,
            BufferState::Buffering(calls) => calls.iter().map(Vec::len).sum(),
        }
    }

    /// Starts deferring `execute` calls. Does nothing if already buffering.
    pub fn start_buffer(&mut self) {
        if !self.is_buffering() {
            self.buffer = BufferState::Buffering(Vec::new());
        }
    }

    /// Ends buffering.
    ///
    /// With `commit` set and a non-empty buffer, all buffered statements are
    /// sent in submission order as one transactional execute request and its
    /// response is returned. Otherwise nothing is sent and `None` is
    /// returned. The buffer is discarded in every case, including when the
    /// flush request fails.
    pub async fn stop_buffer(&mut self, commit: bool) -> Result<Option<Response>> {
        let BufferState::Buffering(calls) = mem::take(&mut self.buffer) else {
            return Ok(None);
        };
        let statements: Vec<Statement> = calls.into_iter().flatten().collect();

        if !commit || statements.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!(discarded = statements.len(), "buffer dropped");
            return Ok(None);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(statements = statements.len(), "flushing buffer");

        self.send_execute(true, &statements)
            .await
            .map(|completed| Some(Response::Completed(completed)))
    }

    /// Callback form of [`stop_buffer`](Self::stop_buffer).
    ///
    /// `on_result` runs only when a flush request was actually sent.
    pub async fn stop_buffer_with<F>(&mut self, commit: bool, on_result: F) -> Result<()>
    where
        F: FnOnce(Response),
    {
        if let Some(response) = self.stop_buffer(commit).await? {
            on_result(response);
        }
        Ok(())
    }

    /// Runs write statements on `/db/execute`.
    ///
    /// While buffering, the statements are queued and a
    /// [`Response::Deferred`] is returned without contacting the server.
    pub async fn execute<I>(&mut self, transactional: bool, statements: I) -> Result<Response>
    where
        I: IntoIterator<Item = Statement>,
    {
        let statements: Vec<Statement> = statements.into_iter().collect();

        if let BufferState::Buffering(calls) = &mut self.buffer {
            wire::encode_statements(&statements)?;

            #[cfg(feature = "tracing")]
            tracing::trace!(?statements, "deferring statements");

            calls.push(statements.clone());
            return Ok(Response::Deferred { statements });
        }

        self.send_execute(transactional, &statements)
            .await
            .map(Response::Completed)
    }

    /// Runs one write statement in a transaction and checks its outcome.
    ///
    /// A deferred response passes the check unchanged.
    pub async fn execute_single<P: Into<Params>>(
        &mut self,
        sql: &str,
        params: P,
    ) -> Result<Response> {
        let response = self
            .execute(true, [Statement::with_params(sql, params)])
            .await?;
        if let Response::Completed(completed) = &response {
            check_first(completed)?;
        }
        Ok(response)
    }

    /// Runs write statements and returns the affected row count of each.
    ///
    /// Stops at the first statement error, reporting the counts of the
    /// statements before it in [`RqliteError::Batch`]. While buffering the
    /// batch is deferred and an empty list is returned.
    pub async fn execute_batch<I>(&mut self, transactional: bool, statements: I) -> Result<Vec<u64>>
    where
        I: IntoIterator<Item = Statement>,
    {
        let response = self.execute(transactional, statements).await?;
        let mut rows_affected = Vec::with_capacity(response.results().len());
        for outcome in response.results() {
            match outcome {
                StatementOutcome::SqlError { index, message } => {
                    return Err(RqliteError::Batch {
                        index: *index,
                        message: message.clone(),
                        rows_affected,
                    });
                }
                StatementOutcome::Exec(exec) => rows_affected.push(exec.rows_affected),
                StatementOutcome::Query(_) => rows_affected.push(0),
            }
        }
        Ok(rows_affected)
    }

    /// Runs read statements on `/db/query`. Never buffered.
    pub async fn query<I>(&self, statements: I) -> Result<CompletedResponse>
    where
        I: IntoIterator<Item = Statement>,
    {
        let statements: Vec<Statement> = statements.into_iter().collect();
        let url = format!("{}/db/query{}", self.base_url, self.request_query(false)?);
        self.post(&url, &statements).await
    }

    /// Runs one read statement and checks its outcome.
    pub async fn query_single<P: Into<Params>>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<CompletedResponse> {
        let response = self.query([Statement::with_params(sql, params)]).await?;
        check_first(&response)?;
        Ok(response)
    }

    /// Node and cluster status as returned by `/status`.
    pub async fn status(&self) -> Result<serde_json::Value> {
        self.get_json("status").await
    }

    /// Cluster membership as returned by `/nodes`.
    pub async fn nodes(&self) -> Result<serde_json::Value> {
        self.get_json("nodes").await
    }

    /// Raw `/readyz` body.
    pub async fn ready(&self) -> Result<String> {
        self.get("readyz").await
    }

    async fn send_execute(
        &self,
        transactional: bool,
        statements: &[Statement],
    ) -> Result<CompletedResponse> {
        let url = format!(
            "{}/db/execute{}",
            self.base_url,
            self.request_query(transactional)?
        );
        self.post(&url, statements).await
    }

    fn request_query(&self, transactional: bool) -> Result<String> {
        self.options.validate()?;
        Ok(self.options.query_string(transactional))
    }

    async fn post(&self, url: &str, statements: &[Statement]) -> Result<CompletedResponse> {
        let body = wire::encode_statements(statements)?;
        let raw = self
            .transport
            .send(
                Method::POST,
                url,
                Some(&body),
                self.options.request_timeout(),
            )
            .await?;
        decode_response(raw)
    }

    async fn get(&self, path: &str) -> Result<String> {
        let url = format!("{}/{path}", self.base_url);
        let raw = self
            .transport
            .send(Method::GET, &url, None, self.options.request_timeout())
            .await?;
        check_status(raw).map(|raw| raw.body)
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let body = self.get(path).await?;
        serde_json::from_str(&body).map_err(|err| {
            RqliteError::Decode(format!("invalid /{path} JSON: {err}; body: {body}"))
        })
    }
}

fn check_first(response: &CompletedResponse) -> Result<()> {
    response
        .first()
        .ok_or_else(|| RqliteError::Decode("missing result".to_owned()))?
        .check()
        .map(|_| ())
}
