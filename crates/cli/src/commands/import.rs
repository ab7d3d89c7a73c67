use anyhow::{Context, Result};
use leadmatch_core::env_config::env_non_empty;
use leadmatch_service::{ImportRequest, ImportService};
use leadmatch_storage::StorageBackend;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

fn read_rows(file: &Path) -> Result<Vec<Value>> {
    let raw = if file.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf).context("reading rows from stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?
    };
    serde_json::from_str(&raw).context("rows file must contain a JSON array of objects")
}

pub(crate) async fn run(
    file: &Path,
    tenant: String,
    icp: String,
    source: String,
    batch: Option<String>,
) -> Result<()> {
    let rows = read_rows(file)?;
    let database_url = env_non_empty("DATABASE_URL");
    let storage = Arc::new(StorageBackend::connect(database_url.as_deref()).await?);

    let request = ImportRequest {
        tenant_id: Some(tenant),
        icp_id: Some(icp),
        source: Some(source),
        source_batch_id: Some(batch.unwrap_or_else(|| uuid::Uuid::new_v4().to_string())),
        rows: Some(rows),
        column_mapping: None,
    };
    let response = ImportService::new(Arc::clone(&storage)).import(&request).await;
    storage.close().await;
    let response = response?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
