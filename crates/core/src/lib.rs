//! Core domain for leadmatch
//!
//! Pure, synchronous building blocks of the company entity-resolution
//! pipeline: field normalizers, the row classifier, the similarity scorer,
//! the deduplication partition and the segment gap matcher.

pub mod classify;
pub mod constants;
pub mod dedup;
pub mod domain_filter;
pub mod env_config;
mod error;
pub mod gaps;
pub mod keywords;
mod model;
pub mod normalize;
pub mod score;
pub mod text;

pub use classify::{classify, classify_with};
pub use dedup::{DedupPartition, Duplicate, DuplicateReason, ExistingRecordIndex, partition};
pub use domain_filter::DomainFilter;
pub use error::*;
pub use gaps::{Catalog, GapResult};
pub use keywords::KeywordSets;
pub use model::*;
pub use normalize::{
    extract_domain, normalize_cnpj, normalize_email, normalize_phone, normalize_uf,
    normalize_website,
};
