//! Duplicate detection for import batches.
//!
//! The engine is a pure partition over a pre-built [`ExistingRecordIndex`];
//! reading the stores and inserting the survivors is the caller's job.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::CandidateRecord;

/// Per-tenant lookup sets, built once per batch and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingRecordIndex {
    /// CNPJ digits already present in the confirmed-company store.
    pub company_cnpjs: HashSet<String>,
    /// CNPJ digits already queued in the pending-candidate store.
    pub candidate_cnpjs: HashSet<String>,
    /// Domains of confirmed companies. Pending candidates never block on domain.
    pub company_domains: HashSet<String>,
}

impl ExistingRecordIndex {
    pub fn is_empty(&self) -> bool {
        self.company_cnpjs.is_empty()
            && self.candidate_cnpjs.is_empty()
            && self.company_domains.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateReason {
    CompanyCnpj,
    CandidateCnpj,
    CompanyWebsite,
    BatchCnpj,
    /// Lost a race against a concurrent import at insert time.
    ConcurrentInsert,
}

impl DuplicateReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::CompanyCnpj => "CNPJ já existente em companies",
            Self::CandidateCnpj => "CNPJ já existente em prospecting_candidates",
            Self::CompanyWebsite => "Website já vinculado a outra empresa em companies",
            Self::BatchCnpj => "CNPJ repetido no mesmo lote",
            Self::ConcurrentInsert => "CNPJ inserido concorrentemente",
        }
    }
}

impl std::fmt::Display for DuplicateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub record: CandidateRecord,
    pub reason: DuplicateReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupPartition {
    pub to_insert: Vec<CandidateRecord>,
    pub duplicates: Vec<Duplicate>,
}

impl DedupPartition {
    pub fn len(&self) -> usize {
        self.to_insert.len().saturating_add(self.duplicates.len())
    }

    pub fn is_empty(&self) -> bool {
        self.to_insert.is_empty() && self.duplicates.is_empty()
    }

    /// Moves the rows the store refused at insert time (indices into
    /// `to_insert`) to `duplicates` as [`DuplicateReason::ConcurrentInsert`].
    ///
    /// Returns how many rows moved. Unknown indices are ignored and
    /// [`Self::len`] is unchanged.
    pub fn reject_conflicts(&mut self, conflicted: &[usize]) -> usize {
        if conflicted.is_empty() {
            return 0;
        }
        let conflicted: HashSet<usize> = conflicted.iter().copied().collect();
        let mut moved = 0usize;
        for (idx, record) in std::mem::take(&mut self.to_insert).into_iter().enumerate() {
            if conflicted.contains(&idx) {
                self.duplicates.push(Duplicate { record, reason: DuplicateReason::ConcurrentInsert });
                moved = moved.saturating_add(1);
            } else {
                self.to_insert.push(record);
            }
        }
        moved
    }
}

/// Why `record` would be rejected, or `None` if it may be inserted.
///
/// Checks run in a fixed order: company CNPJ, candidate CNPJ, CNPJ seen earlier
/// in the batch, then company domain. A record with neither CNPJ nor domain is
/// never a duplicate.
pub fn duplicate_reason(
    record: &CandidateRecord,
    index: &ExistingRecordIndex,
    batch_cnpjs: &HashSet<String>,
) -> Option<DuplicateReason> {
    let identity = record.identity();
    if identity.is_empty() {
        return None;
    }
    if let Some(cnpj) = identity.cnpj_digits.as_deref() {
        if index.company_cnpjs.contains(cnpj) {
            return Some(DuplicateReason::CompanyCnpj);
        }
        if index.candidate_cnpjs.contains(cnpj) {
            return Some(DuplicateReason::CandidateCnpj);
        }
        if batch_cnpjs.contains(cnpj) {
            return Some(DuplicateReason::BatchCnpj);
        }
    }
    if let Some(domain) = identity.domain.as_deref()
        && index.company_domains.contains(domain)
    {
        return Some(DuplicateReason::CompanyWebsite);
    }
    None
}

/// Splits a batch into records to insert and duplicates with their reason.
///
/// Every input record lands in exactly one of the two lists, in input order.
pub fn partition(batch: Vec<CandidateRecord>, index: &ExistingRecordIndex) -> DedupPartition {
    let mut out = DedupPartition::default();
    let mut batch_cnpjs: HashSet<String> = HashSet::new();

    for record in batch {
        match duplicate_reason(&record, index, &batch_cnpjs) {
            Some(reason) => {
                tracing::debug!(company = %record.company_name, %reason, "duplicate row");
                out.duplicates.push(Duplicate { record, reason });
            },
            None => {
                if let Some(cnpj) = record.cnpj.as_deref() {
                    batch_cnpjs.insert(cnpj.to_owned());
                }
                out.to_insert.push(record);
            },
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{extract_domain, normalize_cnpj, normalize_website};

    fn record(name: &str, cnpj: Option<&str>, website: Option<&str>) -> CandidateRecord {
        let website = normalize_website(website);
        CandidateRecord {
            company_name: name.to_owned(),
            cnpj: normalize_cnpj(cnpj),
            domain: extract_domain(website.as_deref()),
            website,
            sector: None,
            uf: None,
            city: None,
            country: Some("Brasil".to_owned()),
            contact_name: None,
            contact_role: None,
            contact_email: None,
            contact_phone: None,
            linkedin_url: None,
            notes: None,
            source: "csv".to_owned(),
            source_batch_id: "b1".to_owned(),
            icp_id: "icp".to_owned(),
        }
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn existing_company_cnpj_is_duplicate() {
        let index = ExistingRecordIndex {
            company_cnpjs: set(&["11222333000144"]),
            ..Default::default()
        };
        let out = partition(vec![record("Acme", Some("11.222.333/0001-44"), None)], &index);
        assert!(out.to_insert.is_empty());
        assert_eq!(out.duplicates.len(), 1);
        assert_eq!(out.duplicates[0].reason.message(), "CNPJ já existente em companies");
    }

    #[test]
    fn candidate_cnpj_has_its_own_reason() {
        let index = ExistingRecordIndex {
            candidate_cnpjs: set(&["11222333000144"]),
            ..Default::default()
        };
        let out = partition(vec![record("Acme", Some("11222333000144"), None)], &index);
        assert_eq!(out.duplicates[0].reason, DuplicateReason::CandidateCnpj);
    }

    #[test]
    fn company_cnpj_checked_before_candidate_cnpj() {
        let index = ExistingRecordIndex {
            company_cnpjs: set(&["11222333000144"]),
            candidate_cnpjs: set(&["11222333000144"]),
            ..Default::default()
        };
        let out = partition(vec![record("Acme", Some("11222333000144"), None)], &index);
        assert_eq!(out.duplicates[0].reason, DuplicateReason::CompanyCnpj);
    }

    #[test]
    fn website_collision_ignores_scheme_and_path() {
        let existing = extract_domain(Some("https://acme.com.br")).unwrap();
        let index = ExistingRecordIndex { company_domains: set(&[&existing]), ..Default::default() };
        let out =
            partition(vec![record("Acme", None, Some("http://www.acme.com.br/contato"))], &index);
        assert_eq!(out.duplicates.len(), 1);
        assert_eq!(out.duplicates[0].reason, DuplicateReason::CompanyWebsite);
        assert_eq!(out.duplicates[0].record.domain.as_deref(), Some("acme.com.br"));
    }

    #[test]
    fn identity_holds_cnpj_digits_and_domain() {
        let identity =
            record("Acme", Some("11.222.333/0001-44"), Some("https://www.acme.com.br/x")).identity();
        assert_eq!(identity.cnpj_digits.as_deref(), Some("11222333000144"));
        assert_eq!(identity.domain.as_deref(), Some("acme.com.br"));
        assert!(record("Acme", None, None).identity().is_empty());
    }

    #[test]
    fn record_without_identity_is_never_duplicate() {
        let index = ExistingRecordIndex {
            company_cnpjs: set(&["11222333000144"]),
            company_domains: set(&["acme.com.br"]),
            ..Default::default()
        };
        let out = partition(vec![record("Acme", None, None), record("Acme", Some("123"), None)], &index);
        assert_eq!(out.to_insert.len(), 2);
    }

    #[test]
    fn repeated_cnpj_in_batch_is_duplicate() {
        let out = partition(
            vec![
                record("Acme", Some("11222333000144"), None),
                record("Acme Filial", Some("11.222.333/0001-44"), None),
            ],
            &ExistingRecordIndex::default(),
        );
        assert_eq!(out.to_insert.len(), 1);
        assert_eq!(out.duplicates[0].reason, DuplicateReason::BatchCnpj);
        assert_eq!(out.duplicates[0].record.company_name, "Acme Filial");
    }

    #[test]
    fn repeated_domain_in_batch_is_kept() {
        let out = partition(
            vec![record("A", None, Some("acme.com.br")), record("B", None, Some("www.acme.com.br"))],
            &ExistingRecordIndex::default(),
        );
        assert_eq!(out.to_insert.len(), 2);
    }

    #[test]
    fn partition_is_complete() {
        let index = ExistingRecordIndex {
            company_cnpjs: set(&["11222333000144"]),
            candidate_cnpjs: set(&["99888777000166"]),
            company_domains: set(&["acme.com.br"]),
        };
        let batch = vec![
            record("a", Some("11222333000144"), None),
            record("b", Some("99888777000166"), None),
            record("c", None, Some("acme.com.br")),
            record("d", Some("55444333000122"), None),
            record("e", Some("55444333000122"), None),
            record("f", None, None),
        ];
        let n = batch.len();
        let out = partition(batch, &index);
        assert_eq!(out.len(), n);
        assert_eq!(out.to_insert.len(), 2);
        assert_eq!(out.duplicates.len(), 4);
    }

    #[test]
    fn conflicts_move_to_duplicates_without_losing_rows() {
        let batch = vec![
            record("Dup", Some("99888777000166"), None),
            record("A", Some("11222333000144"), None),
            record("B", None, Some("b.com.br")),
            record("C", Some("55444333000122"), None),
        ];
        let index = ExistingRecordIndex {
            candidate_cnpjs: set(&["99888777000166"]),
            ..Default::default()
        };
        let mut out = partition(batch, &index);
        assert_eq!(out.to_insert.len(), 3);

        let moved = out.reject_conflicts(&[0, 2, 17]);
        assert_eq!(moved, 2);
        assert_eq!(out.len(), 4);

        let kept: Vec<&str> = out.to_insert.iter().map(|r| r.company_name.as_str()).collect();
        assert_eq!(kept, vec!["B"]);
        let reasons: Vec<(&str, DuplicateReason)> =
            out.duplicates.iter().map(|d| (d.record.company_name.as_str(), d.reason)).collect();
        assert_eq!(
            reasons,
            vec![
                ("Dup", DuplicateReason::CandidateCnpj),
                ("A", DuplicateReason::ConcurrentInsert),
                ("C", DuplicateReason::ConcurrentInsert),
            ]
        );
        assert_eq!(out.duplicates[1].reason.message(), "CNPJ inserido concorrentemente");
    }

    #[test]
    fn no_conflicts_leave_partition_untouched() {
        let batch = vec![record("A", Some("11222333000144"), None)];
        let mut out = partition(batch, &ExistingRecordIndex::default());
        let before = out.clone();
        assert_eq!(out.reject_conflicts(&[]), 0);
        assert_eq!(out, before);
    }
}
