use super::types::{DataSource, PreviewData};

/// Client-side cache of uploaded data sources, newest first.
#[derive(Debug, Clone, Default)]
pub struct DataSourceRegistry {
    sources: Vec<DataSource>,
    preview: Option<PreviewData>,
}

impl DataSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sources(sources: Vec<DataSource>) -> Self {
        Self {
            sources,
            preview: None,
        }
    }

    /// Swaps in a freshly fetched list wholesale.
    pub fn replace_all(&mut self, sources: Vec<DataSource>) {
        self.sources = sources;
    }

    /// Records a just-uploaded source at the front, replacing any entry with
    /// the same id.
    pub fn insert_front(&mut self, source: DataSource) {
        self.sources.retain(|s| s.id != source.id);
        self.sources.insert(0, source);
    }

    pub fn remove(&mut self, id: &str) -> Option<DataSource> {
        let index = self.sources.iter().position(|s| s.id == id)?;
        Some(self.sources.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&DataSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn columns(&self, id: &str) -> Option<&[String]> {
        self.get(id).map(|s| s.columns.as_slice())
    }

    pub fn as_slice(&self) -> &[DataSource] {
        &self.sources
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataSource> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn preview(&self) -> Option<&PreviewData> {
        self.preview.as_ref()
    }

    pub fn set_preview(&mut self, preview: PreviewData) {
        self.preview = Some(preview);
    }

    pub fn clear_preview(&mut self) {
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str, columns: &[&str]) -> DataSource {
        DataSource {
            id: id.to_string(),
            name: format!("{id}.csv"),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            row_count: 3,
            collection_name: None,
            uploaded_by: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_replace_all_is_wholesale() {
        let mut registry = DataSourceRegistry::from_sources(vec![source("a", &["x"])]);
        registry.replace_all(vec![source("b", &["y"]), source("c", &["z"])]);
        assert!(!registry.contains("a"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_insert_front_dedupes() {
        let mut registry = DataSourceRegistry::from_sources(vec![source("a", &[]), source("b", &[])]);
        registry.insert_front(source("b", &["product"]));
        let ids: Vec<&str> = registry.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(registry.columns("b"), Some(&["product".to_string()][..]));
    }

    #[test]
    fn test_remove_missing_is_none() {
        let mut registry = DataSourceRegistry::from_sources(vec![source("a", &[])]);
        assert!(registry.remove("zzz").is_none());
        assert!(registry.remove("a").is_some());
        assert!(registry.is_empty());
    }
}
