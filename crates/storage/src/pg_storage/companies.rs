//! CompanyStore implementation for PgStorage.

use std::collections::HashSet;

use async_trait::async_trait;
use leadmatch_core::{extract_domain, normalize_cnpj};
use sqlx::Row;
use uuid::Uuid;

use super::PgStorage;
use crate::error::StorageError;
use crate::traits::CompanyStore;
use crate::types::Company;

#[async_trait]
impl CompanyStore for PgStorage {
    async fn existing_company_cnpjs(
        &self,
        tenant_id: &str,
        cnpjs: &[String],
    ) -> Result<HashSet<String>, StorageError> {
        if cnpjs.is_empty() {
            return Ok(HashSet::new());
        }
        // Stored CNPJs may carry punctuation; compare on digits only.
        let rows = sqlx::query(
            r"SELECT DISTINCT regexp_replace(cnpj, '\D', '', 'g') AS digits
              FROM companies
              WHERE tenant_id = $1
                AND cnpj IS NOT NULL
                AND regexp_replace(cnpj, '\D', '', 'g') = ANY($2)",
        )
        .bind(tenant_id)
        .bind(cnpjs)
        .fetch_all(&self.pool)
        .await?;

        let mut found = HashSet::with_capacity(rows.len());
        for row in &rows {
            let digits: String = row.try_get("digits")?;
            if let Some(cnpj) = normalize_cnpj(Some(&digits)) {
                found.insert(cnpj);
            }
        }
        Ok(found)
    }

    async fn existing_company_domains(
        &self,
        tenant_id: &str,
        domains: &[String],
    ) -> Result<HashSet<String>, StorageError> {
        if domains.is_empty() {
            return Ok(HashSet::new());
        }
        let wanted: HashSet<&str> = domains.iter().map(String::as_str).collect();
        let rows = sqlx::query(
            "SELECT website FROM companies WHERE tenant_id = $1 AND website IS NOT NULL",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        let mut found = HashSet::new();
        for row in &rows {
            let website: String = row.try_get("website")?;
            if let Some(domain) = extract_domain(Some(&website))
                && wanted.contains(domain.as_str())
            {
                found.insert(domain);
            }
        }
        Ok(found)
    }

    async fn save_company(&self, tenant_id: &str, company: &Company) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO companies (id, tenant_id, company_name, cnpj, website)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(tenant_id)
        .bind(&company.company_name)
        .bind(&company.cnpj)
        .bind(&company.website)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
