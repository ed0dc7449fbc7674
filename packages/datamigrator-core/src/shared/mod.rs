//! Shared module - Common types and utilities
//!
//! Used by every feature; depends on nothing feature-specific.

pub mod interner;

pub use interner::{intern_str, InternedString};
