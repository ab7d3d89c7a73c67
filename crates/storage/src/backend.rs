//! Unified storage backend with enum dispatch.

use std::collections::HashSet;

use async_trait::async_trait;
use leadmatch_core::CandidateRecord;

use crate::error::StorageError;
use crate::traits::{CandidateStore, CompanyStore};
use crate::types::{Company, InsertOutcome};

macro_rules! dispatch {
    ($self:expr, $trait:path, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            StorageBackend::Memory(s) => <crate::MemoryStorage as $trait>::$method(s, $($arg),*).await,
            #[cfg(feature = "postgres")]
            StorageBackend::Postgres(s) => <crate::PgStorage as $trait>::$method(s, $($arg),*).await,
        }
    };
}

#[derive(Clone, Debug)]
pub enum StorageBackend {
    Memory(crate::MemoryStorage),
    #[cfg(feature = "postgres")]
    Postgres(crate::PgStorage),
}

impl StorageBackend {
    pub fn new_memory() -> Self {
        Self::Memory(crate::MemoryStorage::new())
    }

    #[cfg(feature = "postgres")]
    pub async fn new_postgres(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self::Postgres(crate::PgStorage::new(database_url).await?))
    }

    /// PostgreSQL when a URL is given, otherwise a process-local in-memory store.
    pub async fn connect(database_url: Option<&str>) -> Result<Self, StorageError> {
        match database_url {
            #[cfg(feature = "postgres")]
            Some(url) => Self::new_postgres(url).await,
            #[cfg(not(feature = "postgres"))]
            Some(_) => Err(StorageError::Config(
                "DATABASE_URL is set but this build has no postgres support".to_owned(),
            )),
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory storage (data is not persisted)");
                Ok(Self::new_memory())
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            #[cfg(feature = "postgres")]
            Self::Postgres(_) => "postgres",
        }
    }

    /// Stops serving requests; later calls fail instead of touching stale state.
    pub async fn close(&self) {
        match self {
            Self::Memory(s) => s.close(),
            #[cfg(feature = "postgres")]
            Self::Postgres(s) => s.close().await,
        }
        tracing::info!(backend = self.kind(), "storage closed");
    }
}

// ── CompanyStore ─────────────────────────────────────────────────

#[async_trait]
impl CompanyStore for StorageBackend {
    async fn existing_company_cnpjs(
        &self,
        tenant_id: &str,
        cnpjs: &[String],
    ) -> Result<HashSet<String>, StorageError> {
        dispatch!(self, CompanyStore, existing_company_cnpjs(tenant_id, cnpjs))
    }

    async fn existing_company_domains(
        &self,
        tenant_id: &str,
        domains: &[String],
    ) -> Result<HashSet<String>, StorageError> {
        dispatch!(self, CompanyStore, existing_company_domains(tenant_id, domains))
    }

    async fn save_company(&self, tenant_id: &str, company: &Company) -> Result<(), StorageError> {
        dispatch!(self, CompanyStore, save_company(tenant_id, company))
    }
}

// ── CandidateStore ───────────────────────────────────────────────

#[async_trait]
impl CandidateStore for StorageBackend {
    async fn existing_candidate_cnpjs(
        &self,
        tenant_id: &str,
        cnpjs: &[String],
    ) -> Result<HashSet<String>, StorageError> {
        dispatch!(self, CandidateStore, existing_candidate_cnpjs(tenant_id, cnpjs))
    }

    async fn insert_candidates(
        &self,
        tenant_id: &str,
        records: &[CandidateRecord],
    ) -> Result<InsertOutcome, StorageError> {
        dispatch!(self, CandidateStore, insert_candidates(tenant_id, records))
    }

    async fn list_candidates(&self, tenant_id: &str) -> Result<Vec<CandidateRecord>, StorageError> {
        dispatch!(self, CandidateStore, list_candidates(tenant_id))
    }
}
