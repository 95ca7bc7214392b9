//! Query execution
//!
//! A [`Connection`] hands compiled queries to a [`DatabaseClient`], times and
//! logs them, retries once after a dropped connection and renames the
//! returned `_key` attributes to `id`. While a transaction is open, write
//! statements are queued on the transaction instead of being executed.

use crate::bindings::Bindings;
use crate::builder::{AggregateFunction, Builder, IntoDocument, IntoUpdateData, QueryBuilder};
use crate::config::ConnectionConfig;
use crate::error::ClientError;
use crate::grammar::CompiledQuery;
use crate::transaction::{TransactionCollections, TransactionManager, TransactionOptions};
use crate::value::convert_key_to_id;
use crate::{Error, Result, Value};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::{Duration, Instant};

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Documents returned by an executed statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    documents: Vec<serde_json::Value>,
    writes_executed: u64,
}

impl Cursor {
    pub fn new(documents: Vec<serde_json::Value>, writes_executed: u64) -> Self {
        Self {
            documents,
            writes_executed,
        }
    }

    pub fn get_all(&self) -> &[serde_json::Value] {
        &self.documents
    }

    pub fn fetch_all(self) -> Vec<serde_json::Value> {
        self.documents
    }

    /// Number of documents the statement modified
    pub fn writes_executed(&self) -> u64 {
        self.writes_executed
    }
}

/// A prepared AQL statement
pub trait Statement: Send {
    fn execute(self) -> impl Future<Output = ClientResult<Cursor>> + Send;

    /// The execution plan the server would use
    fn explain(self) -> impl Future<Output = ClientResult<serde_json::Value>> + Send;
}

/// Transport to an ArangoDB server
pub trait DatabaseClient: Send + Sync {
    type Statement: Statement;

    fn prepare(&self, aql: &str, bindings: &Bindings) -> ClientResult<Self::Statement>;

    /// Run a JavaScript transaction and return its result
    fn execute_transaction(
        &self,
        options: &TransactionOptions,
    ) -> impl Future<Output = ClientResult<serde_json::Value>> + Send;

    fn reconnect(&mut self) -> impl Future<Output = ClientResult<()>> + Send;
}

/// Event emitted after every executed query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExecuted {
    pub connection: String,
    pub query: String,
    pub bindings: Bindings,
    pub time: Duration,
}

type Listener = Box<dyn Fn(&QueryExecuted) + Send + Sync>;

/// A named connection to one database
pub struct Connection<C: DatabaseClient> {
    client: C,
    config: ConnectionConfig,
    transactions: TransactionManager,
    listeners: Vec<Listener>,
    query_log: Vec<QueryExecuted>,
    logging_queries: bool,
    pretending: bool,
}

impl<C: DatabaseClient> std::fmt::Debug for Connection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("config", &self.config)
            .field("transaction_level", &self.transactions.depth())
            .field("listeners", &self.listeners.len())
            .field("pretending", &self.pretending)
            .finish()
    }
}

impl<C: DatabaseClient> Connection<C> {
    pub fn new(client: C, config: ConnectionConfig) -> Self {
        let logging_queries = config.log_queries;
        Self {
            client,
            config,
            transactions: TransactionManager::new(),
            listeners: Vec::new(),
            query_log: Vec::new(),
            logging_queries,
            pretending: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// A builder without a source, using this connection's table prefix
    pub fn query(&self) -> Builder {
        Builder::new().with_table_prefix(self.config.prefix.clone())
    }

    /// A builder over `collection`, using this connection's table prefix
    pub fn table(&self, collection: &str) -> Builder {
        self.query().from(collection)
    }

    /// Register a callback invoked after every executed query
    pub fn listen<F>(&mut self, listener: F)
    where
        F: Fn(&QueryExecuted) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn enable_query_log(&mut self) {
        self.logging_queries = true;
    }

    pub fn disable_query_log(&mut self) {
        self.logging_queries = false;
    }

    pub fn logging(&self) -> bool {
        self.logging_queries
    }

    pub fn query_log(&self) -> &[QueryExecuted] {
        &self.query_log
    }

    pub fn flush_query_log(&mut self) {
        self.query_log.clear();
    }

    /// Record queries without sending them to the server
    pub fn start_pretending(&mut self) {
        self.pretending = true;
        self.flush_query_log();
    }

    /// Stop pretending and return the queries recorded meanwhile
    pub fn finish_pretending(&mut self) -> Vec<QueryExecuted> {
        self.pretending = false;
        std::mem::take(&mut self.query_log)
    }

    pub fn pretending(&self) -> bool {
        self.pretending
    }

    /// Run a read query and return its rows with `_key` renamed to `id`
    pub async fn select(&mut self, query: &CompiledQuery) -> Result<Vec<serde_json::Value>> {
        let cursor = self.run(query).await?;
        Ok(cursor.fetch_all().into_iter().map(convert_key_to_id).collect())
    }

    /// Run a read query and deserialize every row
    pub async fn select_as<T>(&mut self, query: &CompiledQuery) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        self.select(query)
            .await?
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(Error::from))
            .collect()
    }

    pub async fn select_one(&mut self, query: &CompiledQuery) -> Result<Option<serde_json::Value>> {
        Ok(self.select(query).await?.into_iter().next())
    }

    /// Run a write query; queued instead while a transaction is open
    pub async fn statement(&mut self, query: &CompiledQuery) -> Result<bool> {
        self.write(query).await.map(|_| true)
    }

    /// Run a write query and return the number of modified documents
    ///
    /// Queued writes report zero.
    pub async fn affecting_statement(&mut self, query: &CompiledQuery) -> Result<u64> {
        Ok(self
            .write(query)
            .await?
            .map(|cursor| cursor.writes_executed())
            .unwrap_or(0))
    }

    /// Run a write query and return the rows it produced
    pub async fn returning_statement(
        &mut self,
        query: &CompiledQuery,
    ) -> Result<Vec<serde_json::Value>> {
        Ok(self
            .write(query)
            .await?
            .map(Cursor::fetch_all)
            .unwrap_or_default())
    }

    pub async fn explain(&mut self, query: &CompiledQuery) -> Result<serde_json::Value> {
        let statement = self
            .client
            .prepare(&query.aql, &query.bindings)
            .map_err(|err| self.query_error(query, err))?;
        self.with_timeout(statement.explain())
            .await?
            .map_err(|err| self.query_error(query, err))
    }

    async fn write(&mut self, query: &CompiledQuery) -> Result<Option<Cursor>> {
        if self.transactions.depth() > 0 {
            self.transactions.add_query(query, None)?;
            return Ok(None);
        }
        self.run(query).await.map(Some)
    }

    async fn run(&mut self, query: &CompiledQuery) -> Result<Cursor> {
        if self.pretending {
            self.record(query.aql.clone(), query.bindings.clone(), Duration::ZERO);
            return Ok(Cursor::default());
        }

        let start = Instant::now();
        let cursor = match self.try_run(query).await {
            Err(err) if err.is_lost_connection() && self.config.reconnect => {
                tracing::warn!(
                    connection = %self.config.name,
                    error = %err,
                    "connection lost, reconnecting"
                );
                self.client
                    .reconnect()
                    .await
                    .map_err(|source| self.query_error(query, source))?;
                self.try_run(query).await?
            }
            other => other?,
        };

        let elapsed = start.elapsed();
        tracing::debug!(
            connection = %self.config.name,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            aql = %query.aql,
            bindings = query.bindings.len(),
            "query executed"
        );
        self.record(query.aql.clone(), query.bindings.clone(), elapsed);
        Ok(cursor)
    }

    async fn try_run(&self, query: &CompiledQuery) -> Result<Cursor> {
        let statement = self
            .client
            .prepare(&query.aql, &query.bindings)
            .map_err(|err| self.query_error(query, err))?;
        self.with_timeout(statement.execute())
            .await?
            .map_err(|err| self.query_error(query, err))
    }

    async fn with_timeout<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = T>,
    {
        match self.config.query_timeout() {
            Some(timeout) => tokio::time::timeout(timeout, future)
                .await
                .map_err(|_| Error::Timeout(timeout)),
            None => Ok(future.await),
        }
    }

    fn query_error(&self, query: &CompiledQuery, source: ClientError) -> Error {
        Error::query(
            self.config.name.clone(),
            query.aql.clone(),
            query.bindings.clone(),
            source,
        )
    }

    fn record(&mut self, query: String, bindings: Bindings, time: Duration) {
        let event = QueryExecuted {
            connection: self.config.name.clone(),
            query,
            bindings,
            time,
        };
        for listener in &self.listeners {
            listener(&event);
        }
        if self.logging_queries || self.pretending {
            self.query_log.push(event);
        }
    }

    /// Current transaction nesting level
    pub fn transaction_level(&self) -> usize {
        self.transactions.depth()
    }

    pub fn begin_transaction(&mut self, collections: TransactionCollections) {
        self.transactions.begin(collections);
    }

    /// Queue a query on the open transaction
    ///
    /// Without explicit collections they are read off the AQL.
    pub fn add_transaction_query(
        &mut self,
        query: &CompiledQuery,
        collections: Option<TransactionCollections>,
    ) -> Result<()> {
        self.transactions.add_query(query, collections)
    }

    /// Commit the current level
    ///
    /// Nested levels fold into their parent and return `None`; the outermost
    /// level executes the transaction and returns the server's result.
    pub async fn commit(&mut self) -> Result<Option<serde_json::Value>> {
        match self.transactions.commit()? {
            Some(options) => {
                let attempts = self.config.transaction_attempts;
                self.execute_transaction(&options, attempts).await.map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn rollback(&mut self) -> Result<()> {
        self.transactions.rollback()
    }

    /// Collect the queries queued by `callback` into one transaction
    ///
    /// A concurrency failure or a lost connection re-executes the same
    /// transaction, up to `attempts` times in total. A failing callback
    /// discards its level.
    pub async fn transaction<F, T>(
        &mut self,
        collections: TransactionCollections,
        attempts: u32,
        callback: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.begin_transaction(collections);
        let value = match callback(self) {
            Ok(value) => value,
            Err(err) => {
                if err.is_lost_connection() {
                    self.transactions.reset();
                } else {
                    self.transactions.rollback()?;
                }
                return Err(err);
            }
        };

        if let Some(options) = self.transactions.commit()? {
            self.execute_transaction(&options, attempts).await?;
        }
        Ok(value)
    }

    async fn execute_transaction(
        &mut self,
        options: &TransactionOptions,
        attempts: u32,
    ) -> Result<serde_json::Value> {
        if self.pretending {
            self.record(options.action.clone(), Bindings::new(), Duration::ZERO);
            return Ok(serde_json::Value::Null);
        }

        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            let start = Instant::now();
            match self.client.execute_transaction(options).await {
                Ok(result) => {
                    let elapsed = start.elapsed();
                    tracing::debug!(
                        connection = %self.config.name,
                        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                        attempt,
                        write = ?options.collections.write,
                        "transaction committed"
                    );
                    self.record(options.action.clone(), Bindings::new(), elapsed);
                    return Ok(result);
                }
                Err(err) if err.is_concurrency_error() && attempt < attempts => {
                    tracing::warn!(
                        connection = %self.config.name,
                        attempt,
                        error = %err,
                        "transaction conflict, retrying"
                    );
                    attempt += 1;
                }
                Err(err)
                    if err.is_lost_connection() && self.config.reconnect && attempt < attempts =>
                {
                    tracing::warn!(
                        connection = %self.config.name,
                        attempt,
                        error = %err,
                        "connection lost during transaction, reconnecting"
                    );
                    self.transactions.reset();
                    self.client.reconnect().await.map_err(|source| {
                        Error::query(
                            self.config.name.clone(),
                            options.action.clone(),
                            Bindings::new(),
                            source,
                        )
                    })?;
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_lost_connection() {
                        self.transactions.reset();
                    }
                    return Err(Error::query(
                        self.config.name.clone(),
                        options.action.clone(),
                        Bindings::new(),
                        err,
                    ));
                }
            }
        }
    }
}

/// Read methods executed through a [`Connection`]
pub trait ExecutableQuery: QueryBuilder {
    /// All matching rows
    fn get<C>(
        &self,
        connection: &mut Connection<C>,
    ) -> impl Future<Output = Result<Vec<serde_json::Value>>> + Send
    where
        C: DatabaseClient;

    /// All matching rows, deserialized
    fn get_as<C, T>(&self, connection: &mut Connection<C>) -> impl Future<Output = Result<Vec<T>>> + Send
    where
        C: DatabaseClient,
        T: DeserializeOwned + Send;

    /// The first matching row
    fn first<C>(
        &self,
        connection: &mut Connection<C>,
    ) -> impl Future<Output = Result<Option<serde_json::Value>>> + Send
    where
        C: DatabaseClient;

    /// The row whose `id` is `id`
    fn find<C, V>(
        &self,
        connection: &mut Connection<C>,
        id: V,
    ) -> impl Future<Output = Result<Option<serde_json::Value>>> + Send
    where
        C: DatabaseClient,
        V: Into<Value>;

    /// One attribute of the first matching row
    fn value<C>(
        &self,
        connection: &mut Connection<C>,
        column: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>>> + Send
    where
        C: DatabaseClient;

    fn exists<C>(&self, connection: &mut Connection<C>) -> impl Future<Output = Result<bool>> + Send
    where
        C: DatabaseClient;

    fn count<C>(&self, connection: &mut Connection<C>) -> impl Future<Output = Result<u64>> + Send
    where
        C: DatabaseClient;

    fn max<C>(
        &self,
        connection: &mut Connection<C>,
        column: &str,
    ) -> impl Future<Output = Result<serde_json::Value>> + Send
    where
        C: DatabaseClient;

    fn min<C>(
        &self,
        connection: &mut Connection<C>,
        column: &str,
    ) -> impl Future<Output = Result<serde_json::Value>> + Send
    where
        C: DatabaseClient;

    fn avg<C>(
        &self,
        connection: &mut Connection<C>,
        column: &str,
    ) -> impl Future<Output = Result<serde_json::Value>> + Send
    where
        C: DatabaseClient;

    fn sum<C>(
        &self,
        connection: &mut Connection<C>,
        column: &str,
    ) -> impl Future<Output = Result<serde_json::Value>> + Send
    where
        C: DatabaseClient;

    /// The execution plan of the query
    fn explain<C>(
        &self,
        connection: &mut Connection<C>,
    ) -> impl Future<Output = Result<serde_json::Value>> + Send
    where
        C: DatabaseClient;
}

/// Compute one aggregate; empty results yield `null`
async fn run_aggregate<C>(
    connection: &mut Connection<C>,
    query: Result<CompiledQuery>,
) -> Result<serde_json::Value>
where
    C: DatabaseClient,
{
    let row = connection.select_one(&query?).await?;
    Ok(row
        .and_then(|mut row| row.get_mut("aggregate").map(serde_json::Value::take))
        .unwrap_or(serde_json::Value::Null))
}

impl ExecutableQuery for Builder {
    fn get<C>(
        &self,
        connection: &mut Connection<C>,
    ) -> impl Future<Output = Result<Vec<serde_json::Value>>> + Send
    where
        C: DatabaseClient,
    {
        let query = self.to_compiled();
        async move { connection.select(&query?).await }
    }

    fn get_as<C, T>(&self, connection: &mut Connection<C>) -> impl Future<Output = Result<Vec<T>>> + Send
    where
        C: DatabaseClient,
        T: DeserializeOwned + Send,
    {
        let query = self.to_compiled();
        async move { connection.select_as(&query?).await }
    }

    fn first<C>(
        &self,
        connection: &mut Connection<C>,
    ) -> impl Future<Output = Result<Option<serde_json::Value>>> + Send
    where
        C: DatabaseClient,
    {
        let query = self.clone().limit(1).to_compiled();
        async move { connection.select_one(&query?).await }
    }

    fn find<C, V>(
        &self,
        connection: &mut Connection<C>,
        id: V,
    ) -> impl Future<Output = Result<Option<serde_json::Value>>> + Send
    where
        C: DatabaseClient,
        V: Into<Value>,
    {
        let query = self.clone().where_(("id", id.into())).limit(1).to_compiled();
        async move { connection.select_one(&query?).await }
    }

    fn value<C>(
        &self,
        connection: &mut Connection<C>,
        column: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>>> + Send
    where
        C: DatabaseClient,
    {
        let key = crate::alias::attribute_name(column);
        let query = self.clone().select(column).limit(1).to_compiled();
        async move {
            let row = connection.select_one(&query?).await?;
            Ok(row.and_then(|mut row| row.get_mut(&key).map(serde_json::Value::take)))
        }
    }

    fn exists<C>(&self, connection: &mut Connection<C>) -> impl Future<Output = Result<bool>> + Send
    where
        C: DatabaseClient,
    {
        let query = self.exists_query();
        async move {
            let row = connection.select_one(&query?).await?;
            Ok(row.and_then(|row| row.as_bool()).unwrap_or(false))
        }
    }

    fn count<C>(&self, connection: &mut Connection<C>) -> impl Future<Output = Result<u64>> + Send
    where
        C: DatabaseClient,
    {
        let query = self.aggregate_query(AggregateFunction::Count, None);
        async move {
            let count = run_aggregate(connection, query).await?;
            Ok(count.as_u64().unwrap_or(0))
        }
    }

    fn max<C>(
        &self,
        connection: &mut Connection<C>,
        column: &str,
    ) -> impl Future<Output = Result<serde_json::Value>> + Send
    where
        C: DatabaseClient,
    {
        let query = self.aggregate_query(AggregateFunction::Max, Some(column));
        run_aggregate(connection, query)
    }

    fn min<C>(
        &self,
        connection: &mut Connection<C>,
        column: &str,
    ) -> impl Future<Output = Result<serde_json::Value>> + Send
    where
        C: DatabaseClient,
    {
        let query = self.aggregate_query(AggregateFunction::Min, Some(column));
        run_aggregate(connection, query)
    }

    fn avg<C>(
        &self,
        connection: &mut Connection<C>,
        column: &str,
    ) -> impl Future<Output = Result<serde_json::Value>> + Send
    where
        C: DatabaseClient,
    {
        let query = self.aggregate_query(AggregateFunction::Avg, Some(column));
        run_aggregate(connection, query)
    }

    fn sum<C>(
        &self,
        connection: &mut Connection<C>,
        column: &str,
    ) -> impl Future<Output = Result<serde_json::Value>> + Send
    where
        C: DatabaseClient,
    {
        let query = self.aggregate_query(AggregateFunction::Sum, Some(column));
        run_aggregate(connection, query)
    }

    fn explain<C>(
        &self,
        connection: &mut Connection<C>,
    ) -> impl Future<Output = Result<serde_json::Value>> + Send
    where
        C: DatabaseClient,
    {
        let query = self.to_compiled();
        async move { connection.explain(&query?).await }
    }
}

/// Write methods executed through a [`Connection`]
pub trait ExecutableModification: QueryBuilder {
    fn insert<C, I, D>(
        &self,
        connection: &mut Connection<C>,
        rows: I,
    ) -> impl Future<Output = Result<bool>> + Send
    where
        C: DatabaseClient,
        I: IntoIterator<Item = D>,
        D: IntoDocument;

    /// Insert one document and return its key as `id`
    ///
    /// Inside a transaction the insert is queued and no key is returned.
    fn insert_get_id<C, D>(
        &self,
        connection: &mut Connection<C>,
        row: D,
    ) -> impl Future<Output = Result<Option<serde_json::Value>>> + Send
    where
        C: DatabaseClient,
        D: IntoDocument;

    fn update<C, U>(
        &self,
        connection: &mut Connection<C>,
        values: U,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        C: DatabaseClient,
        U: IntoUpdateData;

    fn increment<C, V>(
        &self,
        connection: &mut Connection<C>,
        column: &str,
        amount: V,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        C: DatabaseClient,
        V: Into<Value>;

    fn decrement<C, V>(
        &self,
        connection: &mut Connection<C>,
        column: &str,
        amount: V,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        C: DatabaseClient,
        V: Into<Value>;

    fn upsert<C, I, D>(
        &self,
        connection: &mut Connection<C>,
        rows: I,
        unique_by: &[&str],
        update: Option<&[&str]>,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        C: DatabaseClient,
        I: IntoIterator<Item = D>,
        D: IntoDocument;

    fn delete<C>(
        &self,
        connection: &mut Connection<C>,
        id: Option<Value>,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        C: DatabaseClient;

    fn truncate<C>(&self, connection: &mut Connection<C>) -> impl Future<Output = Result<bool>> + Send
    where
        C: DatabaseClient;
}

impl ExecutableModification for Builder {
    fn insert<C, I, D>(
        &self,
        connection: &mut Connection<C>,
        rows: I,
    ) -> impl Future<Output = Result<bool>> + Send
    where
        C: DatabaseClient,
        I: IntoIterator<Item = D>,
        D: IntoDocument,
    {
        let query = self.insert_query(rows);
        async move { connection.statement(&query?).await }
    }

    fn insert_get_id<C, D>(
        &self,
        connection: &mut Connection<C>,
        row: D,
    ) -> impl Future<Output = Result<Option<serde_json::Value>>> + Send
    where
        C: DatabaseClient,
        D: IntoDocument,
    {
        let query = self.insert_get_id_query(row);
        async move {
            let rows = connection.returning_statement(&query?).await?;
            Ok(rows.into_iter().next())
        }
    }

    fn update<C, U>(
        &self,
        connection: &mut Connection<C>,
        values: U,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        C: DatabaseClient,
        U: IntoUpdateData,
    {
        let query = self.update_query(values);
        async move { connection.affecting_statement(&query?).await }
    }

    fn increment<C, V>(
        &self,
        connection: &mut Connection<C>,
        column: &str,
        amount: V,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        C: DatabaseClient,
        V: Into<Value>,
    {
        let query = self.increment_query(column, amount);
        async move { connection.affecting_statement(&query?).await }
    }

    fn decrement<C, V>(
        &self,
        connection: &mut Connection<C>,
        column: &str,
        amount: V,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        C: DatabaseClient,
        V: Into<Value>,
    {
        let query = self.decrement_query(column, amount);
        async move { connection.affecting_statement(&query?).await }
    }

    fn upsert<C, I, D>(
        &self,
        connection: &mut Connection<C>,
        rows: I,
        unique_by: &[&str],
        update: Option<&[&str]>,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        C: DatabaseClient,
        I: IntoIterator<Item = D>,
        D: IntoDocument,
    {
        let query = self.upsert_query(rows, unique_by, update);
        async move { connection.affecting_statement(&query?).await }
    }

    fn delete<C>(
        &self,
        connection: &mut Connection<C>,
        id: Option<Value>,
    ) -> impl Future<Output = Result<u64>> + Send
    where
        C: DatabaseClient,
    {
        let query = self.delete_query(id);
        async move { connection.affecting_statement(&query?).await }
    }

    fn truncate<C>(&self, connection: &mut Connection<C>) -> impl Future<Output = Result<bool>> + Send
    where
        C: DatabaseClient,
    {
        let query = self.truncate_query();
        async move { connection.statement(&query?).await }
    }
}
