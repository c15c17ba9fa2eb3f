use log::{info, warn};
use reqwest::multipart::{Form, Part};
use std::path::Path;

use super::error::DataError;
use super::registry::DataSourceRegistry;
use super::types::{CsvUpload, DataSource, PreviewData};
use crate::api::{ApiClient, Envelope};

impl DataSourceRegistry {
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<&[DataSource], DataError> {
        let res: Envelope<Vec<DataSource>> = client
            .get("/api/data")
            .await
            .map_err(|e| DataError::from_api(e, "Failed to fetch data sources"))?;

        info!("Fetched {} data sources", res.data.len());
        self.replace_all(res.data);
        Ok(self.as_slice())
    }

    pub async fn upload_csv(
        &mut self,
        client: &ApiClient,
        upload: CsvUpload,
    ) -> Result<&DataSource, DataError> {
        validate_upload(&upload)?;

        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str("text/csv")
            .map_err(|e| DataError::Validation(e.to_string()))?;
        let form = Form::new().text("name", upload.name).part("file", part);

        let res: Envelope<DataSource> = client
            .post_multipart("/api/data/upload", form)
            .await
            .map_err(|e| DataError::from_api(e, "Upload failed"))?;

        info!(
            "Uploaded data source {} ({} rows, {} columns)",
            res.data.id,
            res.data.row_count,
            res.data.columns.len()
        );
        let id = res.data.id.clone();
        self.insert_front(res.data);
        self.get(&id)
            .ok_or_else(|| DataError::Request("Upload failed".to_string()))
    }

    pub async fn upload_csv_file(
        &mut self,
        client: &ApiClient,
        path: &Path,
    ) -> Result<&DataSource, DataError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.upload_csv(client, CsvUpload::new(file_name, bytes)).await
    }

    /// Deletes remotely, then drops the local entry. The registry is left as
    /// is when the server refuses.
    pub async fn delete(&mut self, client: &ApiClient, id: &str) -> Result<(), DataError> {
        let path = format!("/api/data/{}", urlencoding::encode(id));
        let _: serde_json::Value = client
            .delete(&path)
            .await
            .map_err(|e| DataError::from_api(e, "Delete failed"))?;

        if self.remove(id).is_none() {
            warn!("Deleted data source {id} was not in the local registry");
        }
        Ok(())
    }

    pub async fn load_preview(
        &mut self,
        client: &ApiClient,
        id: &str,
        page: u32,
        limit: u32,
    ) -> Result<&PreviewData, DataError> {
        let path = format!(
            "/api/data/preview/{}?page={}&limit={}",
            urlencoding::encode(id),
            page.max(1),
            limit.max(1)
        );
        let preview: PreviewData = client
            .get(&path)
            .await
            .map_err(|e| DataError::from_api(e, "Failed to fetch preview data"))?;

        self.set_preview(preview);
        self.preview()
            .ok_or_else(|| DataError::Request("Failed to fetch preview data".to_string()))
    }
}

fn validate_upload(upload: &CsvUpload) -> Result<(), DataError> {
    if upload.name.trim().is_empty() {
        return Err(DataError::Validation("Data source name is required".to_string()));
    }
    if !upload.file_name.to_lowercase().ends_with(".csv") {
        return Err(DataError::Validation("Only CSV files are accepted".to_string()));
    }
    if upload.bytes.is_empty() {
        return Err(DataError::Validation("Uploaded file is empty".to_string()));
    }
    Ok(())
}
