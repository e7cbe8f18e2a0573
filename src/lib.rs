//! gamedeck - game library metadata aggregation
//!
//! This library crate exposes the search pipeline for the binary and for
//! integration testing.

pub mod config;
pub mod metadata;
pub mod providers;
pub mod search;
