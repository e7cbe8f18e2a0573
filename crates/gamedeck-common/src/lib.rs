//! Gamedeck-Common: Shared catalog model, ids, and utilities.
//!
//! This crate provides the types every part of gamedeck agrees on:
//!
//! - **Typed IDs**: dense [`GameId`] handles assigned during an aggregation run
//! - **Core Types**: asset types and multi-valued game fields
//! - **Catalog Model**: finalized games, game files, collections and assets
//! - **Path Utilities**: canonicalization, resolution and `file://` URIs
//!
//! # Examples
//!
//! ```
//! use gamedeck_common::{AssetType, Assets, GameId};
//!
//! let id = GameId::new(0);
//! assert_eq!(id.get(), 0);
//!
//! let mut assets = Assets::default();
//! assets.add(AssetType::BoxFront, "file:///games/media/foo/box_front.png");
//! assert!(assets.single(AssetType::BoxFront).is_some());
//! ```

pub mod assets;
pub mod ids;
pub mod model;
pub mod paths;
pub mod types;

pub use assets::Assets;
pub use ids::*;
pub use model::*;
pub use types::*;
