//! Domain model for topics and user preferences.
//!
//! # Invariants
//! - Every topic is identified by a stable `TopicId`.
//! - Revisions are derived on demand and never stored on the model.

pub mod settings;
pub mod topic;
