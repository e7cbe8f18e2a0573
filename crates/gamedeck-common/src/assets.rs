//! Per-game and per-collection asset maps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::AssetType;

/// Mapping from asset type to one URI or an ordered list of URIs.
///
/// Single-valued types are stored in `single` and follow overwrite semantics.
/// Multi-valued types ([`AssetType::is_multi`]) live in `multi` and append
/// each distinct URI once, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assets {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    single: BTreeMap<AssetType, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    multi: BTreeMap<AssetType, Vec<String>>,
}

impl Assets {
    /// URI of a single-valued asset.
    ///
    /// For a multi-valued type this returns the first entry of its list.
    pub fn single(&self, ty: AssetType) -> Option<&str> {
        if ty.is_multi() {
            self.multi.get(&ty).and_then(|list| list.first()).map(String::as_str)
        } else {
            self.single.get(&ty).map(String::as_str)
        }
    }

    /// All URIs of an asset type; a single-valued type yields at most one.
    pub fn multi(&self, ty: AssetType) -> &[String] {
        if ty.is_multi() {
            self.multi.get(&ty).map(Vec::as_slice).unwrap_or_default()
        } else {
            self.single.get(&ty).map(std::slice::from_ref).unwrap_or_default()
        }
    }

    /// Add an explicitly declared asset.
    ///
    /// Single-valued types are overwritten, multi-valued types append the URI
    /// unless it is already present.
    pub fn add(&mut self, ty: AssetType, uri: impl Into<String>) {
        let uri = uri.into();
        if uri.is_empty() {
            return;
        }
        if ty.is_multi() {
            let list = self.multi.entry(ty).or_default();
            if !list.contains(&uri) {
                list.push(uri);
            }
        } else {
            self.single.insert(ty, uri);
        }
    }

    /// Add an asset found on disk by convention.
    ///
    /// Unlike [`Assets::add`], a single-valued type that already has a value
    /// is left alone.
    pub fn add_discovered(&mut self, ty: AssetType, uri: impl Into<String>) {
        if !ty.is_multi() && self.single.contains_key(&ty) {
            return;
        }
        self.add(ty, uri);
    }

    /// Fold another asset map into this one with [`Assets::add`] semantics.
    pub fn merge_from(&mut self, other: Assets) {
        for (ty, uri) in other.single {
            self.add(ty, uri);
        }
        for (ty, list) in other.multi {
            for uri in list {
                self.add(ty, uri);
            }
        }
    }

    /// Whether the given type has at least one URI.
    pub fn has(&self, ty: AssetType) -> bool {
        !self.multi(ty).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.single.is_empty() && self.multi.values().all(Vec::is_empty)
    }
}
