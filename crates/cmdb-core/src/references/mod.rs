//! Reverse-reference discovery ("who points at me")
//!
//! [`ReverseReferenceFinder`] merges the direct/section and multi-data
//! pipelines into one deduplicated, sorted and paginated listing.
//! [`clear_references`] reuses the same lookup to null the inbound
//! references of an object about to be deleted.

pub mod clear;
pub mod finder;
pub mod paging;

pub use clear::clear_references;
pub use finder::{merge_unique, ObjectCriteria, ReferenceQuery, ReverseReferenceFinder};
pub use paging::{paginate, sort_objects, PagedResult, SortKey, SortOrder};
