//! Aggregation context shared by all providers of a search.
//!
//! Providers add collections, games and files to a [`SearchContext`]. Game
//! identity is keyed by canonical file path: two declarations resolving to the
//! same path always end up in the same game. Once list discovery is over the
//! context is finalized and consumed into a [`gamedeck_common::Catalog`].

mod context;
mod diagnostic;

pub use context::{ContextError, PendingCollection, PendingGame, SearchContext};
pub use diagnostic::Diagnostic;
