//! Storage backend trait abstraction
//!
//! Async, tenant-scoped stores consumed by the import pipeline. Both stores
//! are read to build the per-batch lookup index; only the candidate store is
//! written to.

pub mod candidate;
pub mod company;

pub use candidate::CandidateStore;
pub use company::CompanyStore;
