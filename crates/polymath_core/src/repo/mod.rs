//! Persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the key-value contract the topic store persists through.
//! - Keep SQLite details out of store and service code.
//!
//! # Invariants
//! - Values are opaque JSON text; parsing and repair belong to the store.

pub mod kv_repo;
