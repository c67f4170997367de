//! Use-case services over the topic store.
//!
//! # Responsibility
//! - Validate user input before it reaches the store.
//! - Compose store snapshots with the scheduler, index and library pipeline.
//!
//! # Invariants
//! - Invalid input never mutates the store.
//! - Every read use-case takes `today` from the caller.

pub mod sample_data;
pub mod topic_service;
