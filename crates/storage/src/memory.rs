//! In-process storage backend.
//!
//! Used when no `DATABASE_URL` is configured and by tests. Enforces the same
//! `(tenant_id, cnpj)` uniqueness as the PostgreSQL schema, under one write lock.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use leadmatch_core::{CandidateRecord, extract_domain, normalize_cnpj};
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::traits::{CandidateStore, CompanyStore};
use crate::types::{Company, InsertOutcome};

#[derive(Debug, Default)]
struct TenantData {
    companies: Vec<Company>,
    candidates: Vec<CandidateRecord>,
    candidate_cnpjs: HashSet<String>,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    tenants: Arc<RwLock<HashMap<String, TenantData>>>,
    closed: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every later operation with [`StorageError::Closed`], clones included.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl CompanyStore for MemoryStorage {
    async fn existing_company_cnpjs(
        &self,
        tenant_id: &str,
        cnpjs: &[String],
    ) -> Result<HashSet<String>, StorageError> {
        self.ensure_open()?;
        let wanted: HashSet<&str> = cnpjs.iter().map(String::as_str).collect();
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(tenant_id)
            .map(|t| {
                t.companies
                    .iter()
                    .filter_map(|c| normalize_cnpj(c.cnpj.as_deref()))
                    .filter(|cnpj| wanted.contains(cnpj.as_str()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn existing_company_domains(
        &self,
        tenant_id: &str,
        domains: &[String],
    ) -> Result<HashSet<String>, StorageError> {
        self.ensure_open()?;
        let wanted: HashSet<&str> = domains.iter().map(String::as_str).collect();
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(tenant_id)
            .map(|t| {
                t.companies
                    .iter()
                    .filter_map(|c| extract_domain(c.website.as_deref()))
                    .filter(|d| wanted.contains(d.as_str()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn save_company(&self, tenant_id: &str, company: &Company) -> Result<(), StorageError> {
        self.ensure_open()?;
        let mut tenants = self.tenants.write().await;
        tenants.entry(tenant_id.to_owned()).or_default().companies.push(company.clone());
        Ok(())
    }
}

#[async_trait]
impl CandidateStore for MemoryStorage {
    async fn existing_candidate_cnpjs(
        &self,
        tenant_id: &str,
        cnpjs: &[String],
    ) -> Result<HashSet<String>, StorageError> {
        self.ensure_open()?;
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(tenant_id)
            .map(|t| cnpjs.iter().filter(|c| t.candidate_cnpjs.contains(*c)).cloned().collect())
            .unwrap_or_default())
    }

    async fn insert_candidates(
        &self,
        tenant_id: &str,
        records: &[CandidateRecord],
    ) -> Result<InsertOutcome, StorageError> {
        self.ensure_open()?;
        let mut tenants = self.tenants.write().await;
        let tenant = tenants.entry(tenant_id.to_owned()).or_default();
        let mut outcome = InsertOutcome::default();

        for (idx, record) in records.iter().enumerate() {
            if let Some(cnpj) = record.cnpj.as_deref()
                && !tenant.candidate_cnpjs.insert(cnpj.to_owned())
            {
                outcome.conflicted.push(idx);
                continue;
            }
            tenant.candidates.push(record.clone());
            outcome.inserted = outcome.inserted.saturating_add(1);
        }
        Ok(outcome)
    }

    async fn list_candidates(&self, tenant_id: &str) -> Result<Vec<CandidateRecord>, StorageError> {
        self.ensure_open()?;
        let tenants = self.tenants.read().await;
        Ok(tenants.get(tenant_id).map(|t| t.candidates.clone()).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, cnpj: Option<&str>) -> CandidateRecord {
        CandidateRecord {
            company_name: name.to_owned(),
            cnpj: cnpj.map(ToOwned::to_owned),
            website: None,
            domain: None,
            sector: None,
            uf: None,
            city: None,
            country: None,
            contact_name: None,
            contact_role: None,
            contact_email: None,
            contact_phone: None,
            linkedin_url: None,
            notes: None,
            source: "csv".to_owned(),
            source_batch_id: "b".to_owned(),
            icp_id: "i".to_owned(),
        }
    }

    #[tokio::test]
    async fn company_cnpjs_are_compared_as_digits() {
        let store = MemoryStorage::new();
        store.save_company("t1", &Company::new("Acme").with_cnpj("11.222.333/0001-44")).await.unwrap();

        let found = store
            .existing_company_cnpjs("t1", &["11222333000144".to_owned(), "99888777000166".to_owned()])
            .await
            .unwrap();
        assert_eq!(found, HashSet::from(["11222333000144".to_owned()]));
    }

    #[tokio::test]
    async fn lookups_are_tenant_scoped() {
        let store = MemoryStorage::new();
        store.save_company("t1", &Company::new("Acme").with_cnpj("11222333000144")).await.unwrap();

        let found = store.existing_company_cnpjs("t2", &["11222333000144".to_owned()]).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn company_domains_ignore_scheme_and_www() {
        let store = MemoryStorage::new();
        store
            .save_company("t1", &Company::new("Acme").with_website("https://www.acme.com.br/"))
            .await
            .unwrap();

        let found = store
            .existing_company_domains("t1", &["acme.com.br".to_owned(), "other.com".to_owned()])
            .await
            .unwrap();
        assert_eq!(found, HashSet::from(["acme.com.br".to_owned()]));
    }

    #[tokio::test]
    async fn insert_skips_conflicting_cnpj() {
        let store = MemoryStorage::new();
        store.insert_candidates("t1", &[candidate("A", Some("11222333000144"))]).await.unwrap();

        let outcome = store
            .insert_candidates(
                "t1",
                &[candidate("B", Some("11222333000144")), candidate("C", None), candidate("D", None)],
            )
            .await
            .unwrap();
        assert_eq!(outcome.inserted, 2);
        assert_eq!(outcome.conflicted, vec![0]);

        let queued = store.existing_candidate_cnpjs("t1", &["11222333000144".to_owned()]).await.unwrap();
        assert_eq!(queued.len(), 1);
        assert_eq!(store.list_candidates("t1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn concurrent_inserts_keep_one_row_per_cnpj() {
        let store = MemoryStorage::new();
        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert_candidates("t1", &[candidate(&format!("Acme {i}"), Some("11222333000144"))])
                    .await
                    .unwrap()
            }));
        }
        let mut inserted = 0;
        for handle in handles {
            inserted += handle.await.unwrap().inserted;
        }
        assert_eq!(inserted, 1);
        assert_eq!(store.list_candidates("t1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn closed_store_rejects_reads_and_writes() {
        let store = MemoryStorage::new();
        let shared = store.clone();
        store.close();

        let err = shared.existing_company_cnpjs("t1", &["11222333000144".to_owned()]).await.unwrap_err();
        assert!(matches!(err, StorageError::Closed));
        let err = shared.insert_candidates("t1", &[candidate("A", None)]).await.unwrap_err();
        assert!(matches!(err, StorageError::Closed));
    }
}
