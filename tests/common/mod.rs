//! Shared test harness for integration tests.
//!
//! Provides [`GameLibrary`], a temporary game directory tree with helpers to
//! create game files, media files and metadata files, and to run the
//! metadata provider over it.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use gamedeck::metadata::MetadataProvider;
use gamedeck::providers::Provider;
use gamedeck::search::SearchContext;
use gamedeck_common::paths::canonicalize;
use gamedeck_common::Catalog;
use tempfile::TempDir;

/// A temporary game library on disk.
pub struct GameLibrary {
    _dir: TempDir,
    root: PathBuf,
}

impl GameLibrary {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = canonicalize(dir.path()).expect("temp dir has no canonical path");
        Self { _dir: dir, root }
    }

    /// Canonical root directory of the library.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Create an empty file, with its parent directories.
    pub fn touch(&self, rel: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, b"").unwrap();
        path
    }

    /// Write a metadata file into `dir` (relative to the root).
    pub fn metafile(&self, dir: &str, name: &str, text: &str) -> PathBuf {
        let path = self.path(dir).join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, text).unwrap();
        path
    }

    /// `file://` URI of a file of the library.
    pub fn uri(&self, rel: &str) -> String {
        gamedeck_common::paths::to_file_uri(&self.path(rel))
    }

    /// Run list discovery for `dirs` and return the unfinalized context.
    pub fn find_lists(&self, dirs: &[&str]) -> SearchContext {
        let provider = self.provider(dirs);
        let mut ctx = SearchContext::new();
        provider.find_lists(&mut ctx);
        ctx
    }

    /// Run both static phases for `dirs`. Returns the warnings as text and
    /// the finished catalog.
    pub fn scan(&self, dirs: &[&str]) -> (Vec<String>, Catalog) {
        let provider = self.provider(dirs);
        let mut ctx = SearchContext::new();
        provider.load();
        provider.find_lists(&mut ctx);
        ctx.finalize();
        provider.find_static_data(&mut ctx);

        let warnings = ctx.diagnostics().iter().map(|d| d.to_string()).collect();
        (warnings, ctx.consume())
    }

    pub fn provider(&self, dirs: &[&str]) -> MetadataProvider {
        MetadataProvider::new(dirs.iter().map(|dir| self.path(dir)).collect())
    }
}
