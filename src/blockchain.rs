// Thin re-export module: implementation is in `blockchain/core.rs`, split into
// block/ledger types, canonical hashing and chain validation.

pub mod core;
pub use core::*;
