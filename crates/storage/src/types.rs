//! Storage types shared across modules

use serde::{Deserialize, Serialize};

/// A confirmed company as kept in the `companies` store.
///
/// CNPJ and website are stored as entered; lookups normalize them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub company_name: String,
    pub cnpj: Option<String>,
    pub website: Option<String>,
}

impl Company {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self { company_name: company_name.into(), cnpj: None, website: None }
    }

    #[must_use]
    pub fn with_cnpj(mut self, cnpj: impl Into<String>) -> Self {
        self.cnpj = Some(cnpj.into());
        self
    }

    #[must_use]
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }
}

/// Result of a batched candidate insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted: usize,
    /// Positions (in the submitted slice) of records skipped by the
    /// `(tenant_id, cnpj)` uniqueness constraint.
    pub conflicted: Vec<usize>,
}
