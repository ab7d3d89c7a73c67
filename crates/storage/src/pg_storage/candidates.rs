//! CandidateStore implementation for PgStorage.

use std::collections::HashSet;

use async_trait::async_trait;
use leadmatch_core::CandidateRecord;
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::PgStorage;
use crate::error::StorageError;
use crate::traits::CandidateStore;
use crate::types::InsertOutcome;

/// Rows per INSERT statement; 20 binds per row stays well under the 65535 bind limit.
const INSERT_CHUNK_ROWS: usize = 1000;

const CANDIDATE_COLUMNS: &str = "company_name, cnpj, website, domain, sector, uf, city, country,
     contact_name, contact_role, contact_email, contact_phone, linkedin_url, notes,
     source, source_batch_id, icp_id";

fn row_to_candidate(row: &sqlx::postgres::PgRow) -> Result<CandidateRecord, StorageError> {
    Ok(CandidateRecord {
        company_name: row.try_get("company_name")?,
        cnpj: row.try_get("cnpj")?,
        website: row.try_get("website")?,
        domain: row.try_get("domain")?,
        sector: row.try_get("sector")?,
        uf: row.try_get("uf")?,
        city: row.try_get("city")?,
        country: row.try_get("country")?,
        contact_name: row.try_get("contact_name")?,
        contact_role: row.try_get("contact_role")?,
        contact_email: row.try_get("contact_email")?,
        contact_phone: row.try_get("contact_phone")?,
        linkedin_url: row.try_get("linkedin_url")?,
        notes: row.try_get("notes")?,
        source: row.try_get("source")?,
        source_batch_id: row.try_get("source_batch_id")?,
        icp_id: row.try_get("icp_id")?,
    })
}

#[async_trait]
impl CandidateStore for PgStorage {
    async fn existing_candidate_cnpjs(
        &self,
        tenant_id: &str,
        cnpjs: &[String],
    ) -> Result<HashSet<String>, StorageError> {
        if cnpjs.is_empty() {
            return Ok(HashSet::new());
        }
        let rows = sqlx::query(
            "SELECT DISTINCT cnpj FROM prospecting_candidates
             WHERE tenant_id = $1 AND cnpj = ANY($2)",
        )
        .bind(tenant_id)
        .bind(cnpjs)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(|r| r.try_get::<String, _>("cnpj").map_err(StorageError::from)).collect()
    }

    async fn insert_candidates(
        &self,
        tenant_id: &str,
        records: &[CandidateRecord],
    ) -> Result<InsertOutcome, StorageError> {
        if records.is_empty() {
            return Ok(InsertOutcome::default());
        }
        let ids: Vec<String> = records.iter().map(|_| Uuid::new_v4().to_string()).collect();
        let mut returned: HashSet<String> = HashSet::with_capacity(records.len());

        let mut tx = self.pool.begin().await?;
        for (chunk_ids, chunk) in ids.chunks(INSERT_CHUNK_ROWS).zip(records.chunks(INSERT_CHUNK_ROWS)) {
            let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
                "INSERT INTO prospecting_candidates (id, tenant_id, {CANDIDATE_COLUMNS}) "
            ));
            qb.push_values(chunk_ids.iter().zip(chunk), |mut b, (id, rec)| {
                b.push_bind(id)
                    .push_bind(tenant_id)
                    .push_bind(&rec.company_name)
                    .push_bind(&rec.cnpj)
                    .push_bind(&rec.website)
                    .push_bind(&rec.domain)
                    .push_bind(&rec.sector)
                    .push_bind(&rec.uf)
                    .push_bind(&rec.city)
                    .push_bind(&rec.country)
                    .push_bind(&rec.contact_name)
                    .push_bind(&rec.contact_role)
                    .push_bind(&rec.contact_email)
                    .push_bind(&rec.contact_phone)
                    .push_bind(&rec.linkedin_url)
                    .push_bind(&rec.notes)
                    .push_bind(&rec.source)
                    .push_bind(&rec.source_batch_id)
                    .push_bind(&rec.icp_id);
            });
            qb.push(" ON CONFLICT (tenant_id, cnpj) WHERE cnpj IS NOT NULL DO NOTHING RETURNING id");

            let rows = qb.build().fetch_all(&mut *tx).await?;
            for row in &rows {
                returned.insert(row.try_get("id")?);
            }
        }
        tx.commit().await?;

        let conflicted: Vec<usize> = ids
            .iter()
            .enumerate()
            .filter(|(_, id)| !returned.contains(*id))
            .map(|(idx, _)| idx)
            .collect();
        Ok(InsertOutcome { inserted: returned.len(), conflicted })
    }

    async fn list_candidates(&self, tenant_id: &str) -> Result<Vec<CandidateRecord>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {CANDIDATE_COLUMNS} FROM prospecting_candidates
             WHERE tenant_id = $1 ORDER BY created_at, id"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_candidate).collect()
    }
}
