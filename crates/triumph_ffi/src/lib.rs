//! Flutter-facing bindings for the Triumph Board core.

pub mod api;
