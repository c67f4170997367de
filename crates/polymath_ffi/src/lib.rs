//! Flutter-facing bindings for `polymath_core`.

pub mod api;
