//! CSV import: map, normalize, deduplicate and insert one batch of rows.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use leadmatch_core::constants::MAX_IMPORT_ROWS;
use leadmatch_core::{
    BatchMeta, CandidateRecord, ColumnMapping, Duplicate, DuplicateReason, ExistingRecordIndex,
    RawRow, normalize_row, partition, row_has_data,
};
use leadmatch_storage::{CandidateStore, CompanyStore, StorageBackend};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ServiceError;

const REQUIRED_PARAMS: &str = "Parâmetros obrigatórios: tenantId, icpId, source, sourceBatchId, rows";
const NO_VALID_ROWS: &str = "Nenhuma linha válida encontrada no CSV";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub icp_id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub source_batch_id: Option<String>,
    #[serde(default)]
    pub rows: Option<Vec<Value>>,
    /// Canonical field (or synonym) → source column name.
    #[serde(default)]
    pub column_mapping: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateSummary {
    pub company_name: String,
    pub cnpj: Option<String>,
    pub website: Option<String>,
    pub reason: String,
    pub reason_code: DuplicateReason,
}

impl From<&Duplicate> for DuplicateSummary {
    fn from(dup: &Duplicate) -> Self {
        Self {
            company_name: dup.record.company_name.clone(),
            cnpj: dup.record.cnpj.clone(),
            website: dup.record.website.clone(),
            reason: dup.reason.message().to_owned(),
            reason_code: dup.reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub success: bool,
    pub inserted_count: usize,
    pub imported_count: usize,
    pub duplicates_count: usize,
    pub duplicated_count: usize,
    pub batch_id: String,
    pub warnings: Vec<String>,
    pub duplicates: Vec<DuplicateSummary>,
}

impl ImportResponse {
    fn new(batch_id: String, inserted: usize, duplicates: &[Duplicate], warnings: Vec<String>) -> Self {
        Self {
            success: true,
            inserted_count: inserted,
            imported_count: inserted,
            duplicates_count: duplicates.len(),
            duplicated_count: duplicates.len(),
            batch_id,
            warnings,
            duplicates: duplicates.iter().map(DuplicateSummary::from).collect(),
        }
    }
}

struct ValidatedImport<'a> {
    tenant_id: &'a str,
    meta: BatchMeta,
    rows: &'a [Value],
}

fn required(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn validate(request: &ImportRequest) -> Result<ValidatedImport<'_>, ServiceError> {
    let (Some(tenant_id), Some(icp_id), Some(source), Some(batch_id), Some(rows)) = (
        required(request.tenant_id.as_ref()),
        required(request.icp_id.as_ref()),
        required(request.source.as_ref()),
        required(request.source_batch_id.as_ref()),
        request.rows.as_deref(),
    ) else {
        return Err(ServiceError::InvalidInput(REQUIRED_PARAMS.to_owned()));
    };
    if rows.len() > MAX_IMPORT_ROWS {
        return Err(ServiceError::InvalidInput(format!(
            "rows: máximo de {MAX_IMPORT_ROWS} linhas por lote (recebidas {})",
            rows.len()
        )));
    }
    Ok(ValidatedImport {
        tenant_id,
        meta: BatchMeta {
            source: source.to_owned(),
            source_batch_id: batch_id.to_owned(),
            icp_id: icp_id.to_owned(),
        },
        rows,
    })
}

/// Explicit mapping when one is given, otherwise headers matched against field synonyms.
fn build_mapping(
    explicit: Option<&BTreeMap<String, String>>,
    rows: &[&RawRow],
) -> Result<ColumnMapping, ServiceError> {
    if let Some(pairs) = explicit {
        let mapping = ColumnMapping::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        if !mapping.is_empty() {
            return Ok(mapping);
        }
    }
    let mut seen: HashSet<&str> = HashSet::new();
    let headers: Vec<&str> = rows
        .iter()
        .flat_map(|row| row.keys())
        .map(String::as_str)
        .filter(|h| seen.insert(*h))
        .collect();
    Ok(ColumnMapping::detect(headers))
}

/// Warnings in a fixed order: duplicates, skipped rows, discarded CNPJs, concurrent inserts.
fn batch_warnings(
    duplicates: usize,
    skipped_rows: usize,
    discarded_cnpjs: usize,
    concurrent: usize,
) -> Vec<String> {
    let mut warnings = Vec::new();
    if duplicates > 0 {
        warnings.push(format!("{duplicates} linhas ignoradas por duplicidade"));
    }
    if skipped_rows > 0 {
        warnings.push(format!("{skipped_rows} linhas vazias ou inválidas foram ignoradas"));
    }
    if discarded_cnpjs > 0 {
        warnings.push(format!("{discarded_cnpjs} CNPJs inválidos descartados (esperados 14 dígitos)"));
    }
    if concurrent > 0 {
        warnings.push(format!("{concurrent} linhas já inseridas por outra importação simultânea"));
    }
    warnings
}

fn unique<I: IntoIterator<Item = String>>(values: I) -> Vec<String> {
    let mut seen = HashSet::new();
    values.into_iter().filter(|v| seen.insert(v.clone())).collect()
}

pub struct ImportService {
    storage: Arc<StorageBackend>,
}

impl ImportService {
    #[must_use]
    pub fn new(storage: Arc<StorageBackend>) -> Self {
        Self { storage }
    }

    /// Imports one batch: normalizes rows, drops duplicates and inserts the rest.
    ///
    /// A failed duplicate lookup aborts the whole batch before anything is written.
    pub async fn import(&self, request: &ImportRequest) -> Result<ImportResponse, ServiceError> {
        let ValidatedImport { tenant_id, meta, rows } = validate(request)?;
        let batch_id = meta.source_batch_id.clone();
        tracing::info!(tenant_id, batch_id = %batch_id, source = %meta.source, rows = rows.len(), "import started");

        let objects: Vec<&RawRow> =
            rows.iter().filter_map(Value::as_object).filter(|row| row_has_data(row)).collect();
        if objects.is_empty() {
            tracing::info!(tenant_id, batch_id = %batch_id, "import has no valid rows");
            return Ok(ImportResponse::new(batch_id, 0, &[], vec![NO_VALID_ROWS.to_owned()]));
        }
        let skipped_rows = rows.len().saturating_sub(objects.len());

        let mapping = build_mapping(request.column_mapping.as_ref(), &objects)?;
        let mut discarded_cnpjs = 0usize;
        let records: Vec<CandidateRecord> = objects
            .into_iter()
            .map(|row| {
                let normalized = normalize_row(row, &mapping, &meta);
                if let Some(raw) = &normalized.discarded_cnpj {
                    tracing::debug!(company = %normalized.record.company_name, cnpj = %raw, "discarding CNPJ without 14 digits");
                    discarded_cnpjs = discarded_cnpjs.saturating_add(1);
                }
                normalized.record
            })
            .collect();

        let index = self.build_index(tenant_id, &records).await?;
        let mut dedup = partition(records, &index);
        let lookup_duplicates = dedup.duplicates.len();

        let outcome = self.storage.insert_candidates(tenant_id, &dedup.to_insert).await?;
        let concurrent = dedup.reject_conflicts(&outcome.conflicted);
        if concurrent > 0 {
            tracing::warn!(tenant_id, batch_id = %batch_id, concurrent, "rows skipped by concurrent import");
        }
        if discarded_cnpjs > 0 {
            tracing::warn!(tenant_id, batch_id = %batch_id, discarded_cnpjs, "CNPJs discarded");
        }
        let duplicates = dedup.duplicates;
        let warnings = batch_warnings(duplicates.len(), skipped_rows, discarded_cnpjs, concurrent);

        tracing::info!(
            tenant_id,
            batch_id = %batch_id,
            inserted = outcome.inserted,
            duplicates = duplicates.len(),
            lookup_duplicates,
            "import finished"
        );
        Ok(ImportResponse::new(batch_id, outcome.inserted, &duplicates, warnings))
    }

    async fn build_index(
        &self,
        tenant_id: &str,
        records: &[CandidateRecord],
    ) -> Result<ExistingRecordIndex, ServiceError> {
        let cnpjs = unique(records.iter().filter_map(|r| r.cnpj.clone()));
        let domains = unique(records.iter().filter_map(|r| r.domain.clone()));

        let lookups = tokio::try_join!(
            self.storage.existing_company_cnpjs(tenant_id, &cnpjs),
            self.storage.existing_candidate_cnpjs(tenant_id, &cnpjs),
            self.storage.existing_company_domains(tenant_id, &domains),
        );
        let (company_cnpjs, candidate_cnpjs, company_domains) = lookups.map_err(|e| {
            tracing::error!(tenant_id, error = %e, "duplicate lookup failed, aborting batch");
            e
        })?;
        Ok(ExistingRecordIndex { company_cnpjs, candidate_cnpjs, company_domains })
    }
}
