use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::Company;

/// Confirmed companies ("already a customer record").
#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// Subset of `cnpjs` (14-digit strings) already held by the tenant's companies.
    async fn existing_company_cnpjs(
        &self,
        tenant_id: &str,
        cnpjs: &[String],
    ) -> Result<HashSet<String>, StorageError>;

    /// Subset of `domains` already linked to one of the tenant's companies.
    async fn existing_company_domains(
        &self,
        tenant_id: &str,
        domains: &[String],
    ) -> Result<HashSet<String>, StorageError>;

    /// Save a confirmed company.
    async fn save_company(&self, tenant_id: &str, company: &Company) -> Result<(), StorageError>;
}
