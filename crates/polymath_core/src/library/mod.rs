//! Topic library view: filtering, search, sorting and filter options.
//!
//! # Responsibility
//! - Produce the ordered list shown in the library from a store snapshot.
//! - List the domain labels the library can be filtered by.
//!
//! # Invariants
//! - Stages never mutate their input and never add topics.
//! - Stage order is fixed: domain → status → search → sort.

pub mod domains;
pub mod query;
