//! Topic store: the single owner of persisted topics, settings and history.
//!
//! # Responsibility
//! - Load and repair persisted entries through the normalizer.
//! - Apply writes, persist them, and notify subscribers.
//! - Own the import/export wire format.
//!
//! # Invariants
//! - In-memory state changes only after the backing write succeeded.
//! - Corrupted entries degrade to empty/default values, never to errors.

pub mod topic_store;
