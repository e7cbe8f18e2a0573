//! Typed ID wrappers.
//!
//! Game identities are dense integers handed out by the search context in
//! discovery order. They are only stable for the duration of one aggregation
//! run, so they are never persisted.

use serde::{Deserialize, Serialize};

/// Identifier of a game within a single aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(usize);

impl GameId {
    /// Wrap a raw index.
    #[must_use]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// The raw index.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// The id that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<usize> for GameId {
    fn from(raw: usize) -> Self {
        Self(raw)
    }
}

impl From<GameId> for usize {
    fn from(id: GameId) -> Self {
        id.0
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
