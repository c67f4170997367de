//! Revision scheduling and date-indexed queries.
//!
//! # Responsibility
//! - Derive revision dates from topics (`scheduler`).
//! - Classify topics as active or completed (`completion`).
//! - Answer "what is due on day X" over a whole library (`index`).
//!
//! # Invariants
//! - Everything here is pure: inputs are borrowed, nothing is cached.
//! - All comparisons are by calendar day; `today` is always passed in.

pub mod completion;
pub mod index;
pub mod scheduler;
