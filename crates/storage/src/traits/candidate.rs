use std::collections::HashSet;

use async_trait::async_trait;
use leadmatch_core::CandidateRecord;

use crate::error::StorageError;
use crate::types::InsertOutcome;

/// Candidates queued for review ("already queued").
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// Subset of `cnpjs` already queued for the tenant.
    async fn existing_candidate_cnpjs(
        &self,
        tenant_id: &str,
        cnpjs: &[String],
    ) -> Result<HashSet<String>, StorageError>;

    /// Insert all records in one batch.
    ///
    /// Records whose CNPJ is already queued for the tenant (for instance by a
    /// concurrent import) are skipped and reported in [`InsertOutcome::conflicted`].
    async fn insert_candidates(
        &self,
        tenant_id: &str,
        records: &[CandidateRecord],
    ) -> Result<InsertOutcome, StorageError>;

    /// All candidates queued for the tenant, oldest first.
    async fn list_candidates(&self, tenant_id: &str) -> Result<Vec<CandidateRecord>, StorageError>;
}
