//! Directory-based asset discovery.
//!
//! After the game list is final, every game and collection gets a set of
//! candidate media directories. Files inside them are matched to asset types
//! by their base name (`box_front.png`, `video.mp4`, ...) and attached as
//! `file://` URIs. Assets declared explicitly in metadata files always win
//! over discovered single-valued ones.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use gamedeck_common::paths::{canonicalize, extension_lowercase, to_file_uri};
use gamedeck_common::{AssetType, Assets};
use tracing::{debug, info};

use super::filter::MEDIA_DIR_NAME;
use crate::search::{PendingCollection, PendingGame, SearchContext};

/// Asset file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundAsset {
    pub asset_type: AssetType,
    pub path: PathBuf,
}

fn accepts_extension(ty: AssetType, path: &Path) -> bool {
    extension_lowercase(path)
        .map(|ext| ty.extensions().contains(&ext.as_str()))
        .unwrap_or(false)
}

fn sorted_entries(dir: &Path) -> Vec<fs::DirEntry> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut entries: Vec<fs::DirEntry> = read_dir.filter_map(Result::ok).collect();
    entries.sort_by_key(|entry| entry.file_name());
    entries
}

/// Asset files inside one media directory.
///
/// Files are recognized by their stem. A subdirectory named after a
/// multi-valued type (`screenshots/`, `videos/`) contributes all of its files
/// with a fitting extension. Results are in file name order.
pub fn scan_media_dir(dir: &Path) -> Vec<FoundAsset> {
    let mut found = Vec::new();

    for entry in sorted_entries(dir) {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            let name = entry.file_name();
            let Some(ty) = name.to_str().and_then(AssetType::from_name) else {
                continue;
            };
            if !ty.is_multi() {
                continue;
            }
            for sub in sorted_entries(&path) {
                let sub_path = sub.path();
                if sub_path.is_file() && accepts_extension(ty, &sub_path) {
                    found.push(FoundAsset {
                        asset_type: ty,
                        path: sub_path,
                    });
                }
            }
            continue;
        }

        let ty = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(AssetType::from_name);
        if let Some(ty) = ty {
            if accepts_extension(ty, &path) {
                found.push(FoundAsset {
                    asset_type: ty,
                    path,
                });
            }
        }
    }
    found
}

fn attach(assets: &mut Assets, found: Vec<FoundAsset>) -> usize {
    let mut attached = 0;
    for asset in found {
        let path = canonicalize(&asset.path).unwrap_or(asset.path);
        let uri = to_file_uri(&path);
        if asset.asset_type.is_multi() {
            assets.add(asset.asset_type, uri);
        } else if !assets.has(asset.asset_type) {
            assets.add_discovered(asset.asset_type, uri);
        } else {
            continue;
        }
        attached += 1;
    }
    attached
}

fn push_unique(dirs: &mut Vec<PathBuf>, dir: PathBuf) {
    if !dirs.contains(&dir) {
        dirs.push(dir);
    }
}

/// Candidate media directories of a game.
///
/// For every root directory containing one of the game's files, the media
/// root is `override` if set, else `<root>/media`. Inside it the candidates
/// are the file's root-relative path without extension and the game title.
pub fn game_media_dirs(
    game: &PendingGame,
    roots: &[PathBuf],
    media_override: Option<&Path>,
) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let title = game.data.title.as_str();

    let mut all_roots: Vec<&Path> = roots.iter().map(PathBuf::as_path).collect();
    if let Some(root) = game.root_dir.as_deref() {
        if !all_roots.contains(&root) {
            all_roots.push(root);
        }
    }

    for root in all_roots {
        let media = media_override
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.join(MEDIA_DIR_NAME));

        let mut under_root = false;
        for file in &game.files {
            if let Ok(rel) = file.strip_prefix(root) {
                under_root = true;
                push_unique(&mut dirs, media.join(rel.with_extension("")));
            }
        }
        // File-less games are declared in a metadata file, which is their root.
        let declared_here = game.files.is_empty() && game.root_dir.as_deref() == Some(root);
        if (under_root || declared_here) && !title.is_empty() {
            push_unique(&mut dirs, media.join(title));
        }
    }

    if dirs.is_empty() {
        if let Some(media) = media_override {
            for file in &game.files {
                if let Some(stem) = file.file_stem() {
                    push_unique(&mut dirs, media.join(stem));
                }
            }
            if !title.is_empty() {
                push_unique(&mut dirs, media.join(title));
            }
        }
    }
    dirs
}

/// Candidate media directories of a collection: `<media>/<name>` and
/// `<media>/<short name>`.
pub fn collection_media_dirs(coll: &PendingCollection) -> Vec<PathBuf> {
    let media = match (&coll.media_dir, &coll.launch.relative_basedir) {
        (Some(dir), _) => dir.clone(),
        (None, base) if !base.as_os_str().is_empty() => base.join(MEDIA_DIR_NAME),
        _ => return Vec::new(),
    };

    let mut dirs = vec![media.join(&coll.name)];
    if !coll.short_name.is_empty() {
        push_unique(&mut dirs, media.join(&coll.short_name));
    }
    dirs
}

/// Attach assets found in media directories to every game and collection.
pub fn discover_assets(ctx: &mut SearchContext) {
    let start = Instant::now();
    let roots = ctx.game_root_dirs().to_vec();
    let overrides: HashMap<String, PathBuf> = ctx
        .collections()
        .filter_map(|coll| coll.media_dir.clone().map(|dir| (coll.name.clone(), dir)))
        .collect();

    let mut attached = 0;
    for (id, game) in ctx.games_mut() {
        let media_override = game.data.media_dir.clone().or_else(|| {
            game.collections
                .first()
                .and_then(|name| overrides.get(name).cloned())
        });

        for dir in game_media_dirs(game, &roots, media_override.as_deref()) {
            if !dir.is_dir() {
                continue;
            }
            debug!(game = %id, dir = %dir.display(), "scanning media directory");
            attached += attach(&mut game.data.assets, scan_media_dir(&dir));
        }
    }

    for coll in ctx.collections_mut() {
        for dir in collection_media_dirs(coll) {
            if dir.is_dir() {
                attached += attach(&mut coll.assets, scan_media_dir(&dir));
            }
        }
    }

    info!(
        assets = attached,
        "Asset discovery finished in {}ms",
        start.elapsed().as_millis()
    );
}
