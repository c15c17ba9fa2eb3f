use log::{debug, info, warn};

use super::cache::QueryResultCache;
use super::error::QueryError;
use super::types::{
    FilterField, MetricField, QueryConfig, QueryFilter, QueryMetric, RunQueryRequest,
    RunQueryResponse,
};
use crate::api::{ApiClient, ApiError, Envelope};
use crate::data::DataSourceRegistry;
use crate::shared::{RequestSequence, RequestTag};

/// Query id recorded when the server runs a query without returning one.
pub const UNSAVED_QUERY_ID: &str = "temp";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryState {
    #[default]
    Idle,
    Configuring,
    Executing,
    ResultReady {
        query_id: String,
    },
    Failed {
        message: String,
    },
}

/// A dispatched query execution. Hand it back to
/// [`QueryBuilder::complete`] together with the server's answer.
#[derive(Debug, Clone)]
pub struct PendingQuery {
    tag: RequestTag,
    pub request: RunQueryRequest,
}

impl PendingQuery {
    pub fn tag(&self) -> RequestTag {
        self.tag
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    name: String,
    data_source_id: Option<String>,
    group_by: Option<String>,
    filters: Vec<QueryFilter>,
    metrics: Vec<QueryMetric>,
    state: QueryState,
    last_query_id: Option<String>,
    sequence: RequestSequence,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_source_id(&self) -> Option<&str> {
        self.data_source_id.as_deref()
    }

    pub fn group_by(&self) -> Option<&str> {
        self.group_by.as_deref()
    }

    pub fn filters(&self) -> &[QueryFilter] {
        &self.filters
    }

    pub fn metrics(&self) -> &[QueryMetric] {
        &self.metrics
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Id of the last query that ran successfully from this builder.
    pub fn last_query_id(&self) -> Option<&str> {
        self.last_query_id.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Selecting a source clears group-by, filters and metrics: their column
    /// domain belonged to the previous source.
    pub fn set_data_source(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.data_source_id = (!id.is_empty()).then_some(id);
        self.group_by = None;
        self.filters.clear();
        self.metrics.clear();
        self.touch();
    }

    pub fn set_group_by(&mut self, column: Option<String>) {
        self.group_by = column.filter(|c| !c.is_empty());
        self.touch();
    }

    pub fn add_filter(&mut self) -> usize {
        self.filters.push(QueryFilter::default());
        self.touch();
        self.filters.len() - 1
    }

    pub fn update_filter(&mut self, index: usize, field: FilterField) {
        let Some(filter) = self.filters.get_mut(index) else {
            return;
        };
        match field {
            FilterField::Column(column) => filter.column = column,
            FilterField::Operator(op) => filter.operator = op,
            FilterField::Value(value) => filter.value = value,
        }
        self.touch();
    }

    pub fn remove_filter(&mut self, index: usize) {
        if index < self.filters.len() {
            self.filters.remove(index);
            self.touch();
        }
    }

    pub fn add_metric(&mut self) -> usize {
        self.metrics.push(QueryMetric::default());
        self.touch();
        self.metrics.len() - 1
    }

    pub fn update_metric(&mut self, index: usize, field: MetricField) {
        let Some(metric) = self.metrics.get_mut(index) else {
            return;
        };
        match field {
            MetricField::Column(column) => metric.column = column,
            MetricField::Aggregation(agg) => metric.aggregation = agg,
            MetricField::Alias(alias) => metric.alias = alias,
        }
        self.touch();
    }

    pub fn remove_metric(&mut self, index: usize) {
        if index < self.metrics.len() {
            self.metrics.remove(index);
            self.touch();
        }
    }

    /// Name and data source are mandatory; group-by, metrics and filters are
    /// all optional. Columns outside the source's schema only log a warning,
    /// the executor has the final word on them.
    pub fn validate(&self, registry: &DataSourceRegistry) -> Result<(), QueryError> {
        let result = self.check(registry);
        if let Err(e) = &result {
            warn!("Query not submitted: {}", e.user_message());
        }
        result
    }

    fn check(&self, registry: &DataSourceRegistry) -> Result<(), QueryError> {
        if self.name.trim().is_empty() {
            return Err(QueryError::Validation("Query name is required".to_string()));
        }
        let Some(source_id) = self.data_source_id.as_deref() else {
            return Err(QueryError::Validation("Data source is required".to_string()));
        };
        let Some(source) = registry.get(source_id) else {
            return Err(QueryError::Validation(format!(
                "Data source {source_id} is not available"
            )));
        };

        let referenced = self
            .group_by
            .iter()
            .chain(self.metrics.iter().map(|m| &m.column))
            .chain(self.filters.iter().map(|f| &f.column));
        for column in referenced {
            if column.is_empty() {
                warn!("Query '{}' has an entry with no column selected", self.name.trim());
            } else if !source.has_column(column) {
                warn!("Column '{column}' is not part of data source '{}'", source.name);
            }
        }
        Ok(())
    }

    pub fn to_request(&self) -> Option<RunQueryRequest> {
        Some(RunQueryRequest {
            data_source_id: self.data_source_id.clone()?,
            name: self.name.trim().to_string(),
            config: QueryConfig {
                filters: self.filters.clone(),
                group_by: self.group_by.clone(),
                metrics: self.metrics.clone(),
            },
        })
    }

    /// Validates and moves to `Executing`. Each call supersedes any
    /// previously dispatched execution.
    pub fn begin_submit(&mut self, registry: &DataSourceRegistry) -> Result<PendingQuery, QueryError> {
        self.validate(registry)?;
        let request = self
            .to_request()
            .ok_or_else(|| QueryError::Validation("Data source is required".to_string()))?;

        let tag = self.sequence.next();
        self.state = QueryState::Executing;
        debug!("Dispatching query '{}' (request {})", request.name, tag.value());
        Ok(PendingQuery { tag, request })
    }

    /// Applies the outcome of a dispatched execution.
    ///
    /// Returns `Ok(None)` without touching any state when `pending` has been
    /// superseded by a later submit. On success the rows go into `cache` and
    /// the query id is returned. On failure only the state changes, to
    /// `Failed`, and the server's message is surfaced.
    pub fn complete(
        &mut self,
        pending: &PendingQuery,
        outcome: Result<RunQueryResponse, ApiError>,
        cache: &mut QueryResultCache,
    ) -> Result<Option<String>, QueryError> {
        if !self.sequence.is_current(pending.tag) {
            debug!("Dropping stale result for request {}", pending.tag.value());
            return Ok(None);
        }

        match outcome {
            Ok(response) => {
                let query_id = response
                    .query_id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| UNSAVED_QUERY_ID.to_string());
                info!(
                    "Query '{}' returned {} rows as {query_id}",
                    pending.request.name,
                    response.result.len()
                );
                cache.insert(query_id.clone(), response.result);
                self.last_query_id = Some(query_id.clone());
                self.state = QueryState::ResultReady {
                    query_id: query_id.clone(),
                };
                Ok(Some(query_id))
            }
            Err(e) => {
                let err = QueryError::from_api(e, "Server Error: Please try again");
                self.state = QueryState::Failed {
                    message: err.user_message().to_string(),
                };
                Err(err)
            }
        }
    }

    /// Runs the query remotely and caches its rows. Requires an admin or
    /// editor session.
    pub async fn submit(
        &mut self,
        client: &ApiClient,
        registry: &DataSourceRegistry,
        cache: &mut QueryResultCache,
    ) -> Result<Option<String>, QueryError> {
        if !client.session().can_edit() {
            return Err(QueryError::Forbidden(
                "You don't have permission to access Query Builder".to_string(),
            ));
        }

        let pending = self.begin_submit(registry)?;
        let outcome = client
            .post::<_, Envelope<RunQueryResponse>>("/api/queries/run", &pending.request)
            .await
            .map(|env| env.data);
        self.complete(&pending, outcome, cache)
    }

    fn touch(&mut self) {
        if self.state != QueryState::Executing {
            self.state = QueryState::Configuring;
        }
    }
}
