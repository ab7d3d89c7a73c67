//! Service layer for leadmatch
//!
//! Orchestrates the pure core pipeline against storage and the Serper client
//! for the HTTP handlers and the CLI.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod competitor_service;
mod error;
mod gap_service;
mod import_service;

pub use competitor_service::{
    CompetitorSearchRequest, CompetitorSearchResponse, CompetitorService, display_name,
};
pub use error::ServiceError;
pub use gap_service::{
    BenchmarkOpportunity, CompetitorRef, GapService, Opportunity, Priority, ProductGapRequest,
    ProductGapResponse, ProductInUse, SalesApproach, SalesStrategy, SimilarCompany, StackSuggestion,
};
pub use import_service::{DuplicateSummary, ImportRequest, ImportResponse, ImportService};
