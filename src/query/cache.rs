use log::debug;
use std::collections::HashMap;

use super::error::QueryError;
use super::types::QueryResultResponse;
use crate::api::{ApiClient, Envelope};
use crate::shared::Row;

/// Result rows keyed by query id. Rows are read-only once stored and entries
/// live until [`clear`](Self::clear).
#[derive(Debug, Clone, Default)]
pub struct QueryResultCache {
    entries: HashMap<String, Vec<Row>>,
    current: Option<String>,
}

impl QueryResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, query_id: &str) -> Option<&[Row]> {
        self.entries.get(query_id).map(Vec::as_slice)
    }

    pub fn contains(&self, query_id: &str) -> bool {
        self.entries.contains_key(query_id)
    }

    pub fn insert(&mut self, query_id: impl Into<String>, rows: Vec<Row>) {
        let query_id = query_id.into();
        self.current = Some(query_id.clone());
        self.entries.insert(query_id, rows);
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_rows(&self) -> Option<&[Row]> {
        self.current.as_deref().and_then(|id| self.get(id))
    }

    /// Forgets which result is current; cached entries stay.
    pub fn clear_current(&mut self) {
        self.current = None;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the rows for `query_id`, hitting the network only on a miss.
    pub async fn fetch(&mut self, client: &ApiClient, query_id: &str) -> Result<&[Row], QueryError> {
        if self.contains(query_id) {
            debug!("Query result {query_id} served from cache");
            self.current = Some(query_id.to_string());
            return Ok(self.get(query_id).unwrap_or_default());
        }

        let path = format!("/api/queries/{}", urlencoding::encode(query_id));
        let res: Envelope<QueryResultResponse> = client
            .get(&path)
            .await
            .map_err(|e| QueryError::from_api(e, "Failed to load query result"))?;

        self.insert(query_id, res.data.result);
        Ok(self.get(query_id).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(product: &str, revenue: i64) -> Row {
        let mut row = Row::new();
        row.insert("product".to_string(), json!(product));
        row.insert("revenue".to_string(), json!(revenue));
        row
    }

    #[test]
    fn test_insert_sets_current() {
        let mut cache = QueryResultCache::new();
        cache.insert("q1", vec![row("A", 10)]);
        cache.insert("q2", vec![row("B", 20)]);

        assert_eq!(cache.current_id(), Some("q2"));
        assert_eq!(cache.get("q1").map(<[Row]>::len), Some(1));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_clear_current_keeps_entries() {
        let mut cache = QueryResultCache::new();
        cache.insert("q1", vec![row("A", 10)]);
        cache.clear_current();
        assert!(cache.current_rows().is_none());
        assert!(cache.contains("q1"));

        cache.clear();
        assert!(cache.is_empty());
    }
}
