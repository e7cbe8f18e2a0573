//! Metadata file parser.
//!
//! A file is processed as a fold over its entries with three cursors: the
//! current collection (by name), the current game and the current file filter
//! (both indices into arenas). Games declared in a file are kept pending until
//! the whole file has been read and are then committed into the
//! [`SearchContext`]. Every problem becomes a warning of the form
//! ``"`<file>`, line <n>: <message>"`` and only drops the offending entry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use gamedeck_common::paths::{
    canonicalize, has_uri_scheme, resolve, title_from_path, to_file_uri,
};
use gamedeck_common::{AssetType, Assets, GameData};
use gamedeck_metafile::grammar::{
    classify, parse_player_count, parse_rating, parse_release_date, replace_newlines, split_list,
    CollAttrib, GameAttrib, Key,
};
use gamedeck_metafile::{merge_lines, reader, Entry};
use regex::Regex;
use tracing::{debug, warn};

use super::filter::FileFilter;
use crate::search::{ContextError, SearchContext};

/// A game declared in the file being parsed.
#[derive(Debug)]
struct PendingEntry {
    line: usize,
    data: GameData,
    /// Canonical paths with the line of the `file:` entry listing them.
    files: Vec<(PathBuf, usize)>,
    collections: Vec<String>,
}

/// Per-file parser state.
struct FileParser<'a> {
    metafile: &'a Path,
    dir: PathBuf,
    games: Vec<PendingEntry>,
    claimed: HashMap<PathBuf, usize>,
    cur_coll: Option<String>,
    cur_game: Option<usize>,
    cur_filter: Option<usize>,
}

/// Parse one metadata file into the context.
///
/// Collection blocks append a [`FileFilter`] to `filters`; the caller expands
/// them once every file of the provider has been read. An unreadable file is
/// logged and skipped.
pub fn parse_metafile(ctx: &mut SearchContext, metafile: &Path, filters: &mut Vec<FileFilter>) {
    let items = match reader::read_file(metafile) {
        Ok(items) => items,
        Err(err) => {
            warn!("failed to read `{}`: {}", metafile.display(), err);
            return;
        }
    };

    let dir = metafile
        .parent()
        .and_then(canonicalize)
        .unwrap_or_else(|| metafile.parent().map(Path::to_path_buf).unwrap_or_default());

    let mut parser = FileParser {
        metafile,
        dir,
        games: Vec::new(),
        claimed: HashMap::new(),
        cur_coll: None,
        cur_game: None,
        cur_filter: None,
    };

    for item in items {
        match item {
            Ok(entry) => parser.apply(ctx, filters, &entry),
            Err(err) => ctx.warn_at(metafile, err.line, err.kind.to_string()),
        }
    }

    parser.commit(ctx);
}

/// URI of an asset value, resolved against `dir` unless it has a scheme.
fn asset_uri(dir: &Path, value: &str) -> String {
    if has_uri_scheme(value) {
        return value.to_string();
    }
    let path = resolve(dir, value);
    to_file_uri(&canonicalize(&path).unwrap_or(path))
}

fn normalize_extensions(values: &[String]) -> Vec<String> {
    split_list(values)
        .into_iter()
        .map(|ext| ext.trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn text_value(values: &[String]) -> String {
    replace_newlines(&merge_lines(values))
}

impl FileParser<'_> {
    fn warn(&self, ctx: &mut SearchContext, line: usize, message: impl Into<String>) {
        ctx.warn_at(self.metafile, line, message);
    }

    fn apply(&mut self, ctx: &mut SearchContext, filters: &mut Vec<FileFilter>, entry: &Entry) {
        match classify(&entry.key) {
            Key::Collection => self.open_collection(ctx, filters, entry),
            Key::Game => self.open_game(entry),
            Key::Extension => {}
            Key::Asset(token) => self.apply_asset(ctx, entry, token),
            Key::Attribute(key) => {
                if let Some(idx) = self.cur_game {
                    self.apply_game_attrib(ctx, idx, key, entry);
                } else if let Some(name) = self.cur_coll.clone() {
                    self.apply_coll_attrib(ctx, filters, &name, key, entry);
                } else {
                    self.warn(ctx, entry.line, "no `collection` or `game` defined yet, entry ignored");
                }
            }
        }
    }

    fn open_collection(
        &mut self,
        ctx: &mut SearchContext,
        filters: &mut Vec<FileFilter>,
        entry: &Entry,
    ) {
        let name = merge_lines(&entry.values);
        if name.is_empty() {
            self.warn(ctx, entry.line, "collection without a name, entry ignored");
            return;
        }

        let coll = ctx.add_collection(&name);
        if coll.launch.relative_basedir.as_os_str().is_empty() {
            coll.launch.relative_basedir = self.dir.clone();
        }

        filters.push(FileFilter::new(name.clone(), self.dir.clone()));
        self.cur_filter = Some(filters.len() - 1);
        self.cur_coll = Some(name);
        self.cur_game = None;
    }

    /// Open a game block. A title already declared in this file reopens
    /// that game, so its files and attributes accumulate.
    fn open_game(&mut self, entry: &Entry) {
        let title = merge_lines(&entry.values);
        let existing = if title.is_empty() {
            None
        } else {
            self.games.iter().position(|game| game.data.title == title)
        };

        let idx = match existing {
            Some(idx) => {
                debug!(title = %title, line = entry.line, "game block reopened");
                idx
            }
            None => {
                self.games.push(PendingEntry {
                    line: entry.line,
                    data: GameData::new(title),
                    files: Vec::new(),
                    collections: Vec::new(),
                });
                self.games.len() - 1
            }
        };

        if let Some(name) = &self.cur_coll {
            let collections = &mut self.games[idx].collections;
            if !collections.contains(name) {
                collections.push(name.clone());
            }
        }
        self.cur_game = Some(idx);
    }

    fn apply_asset(&mut self, ctx: &mut SearchContext, entry: &Entry, token: &str) {
        if self.cur_game.is_none() && self.cur_coll.is_none() {
            self.warn(ctx, entry.line, "no `collection` or `game` defined yet, entry ignored");
            return;
        }
        let Some(ty) = AssetType::from_name(token) else {
            self.warn(ctx, entry.line, format!("unknown asset type `{token}`, entry ignored"));
            return;
        };

        let assets: &mut Assets = match (self.cur_game, self.cur_coll.as_deref()) {
            (Some(idx), _) => &mut self.games[idx].data.assets,
            (None, Some(name)) => match ctx.collection_mut(name) {
                Some(coll) => &mut coll.assets,
                None => return,
            },
            (None, None) => return,
        };
        for value in &entry.values {
            assets.add(ty, asset_uri(&self.dir, value));
        }
    }

    fn apply_game_attrib(&mut self, ctx: &mut SearchContext, idx: usize, key: &str, entry: &Entry) {
        let Some(attrib) = GameAttrib::from_key(key) else {
            self.warn(ctx, entry.line, format!("unrecognized game property `{key}`, ignored"));
            return;
        };

        match attrib {
            GameAttrib::Files => self.add_game_files(ctx, idx, entry),
            GameAttrib::LaunchCmd => {
                let launch = &mut self.games[idx].data.launch;
                launch.launch_cmd = merge_lines(&entry.values);
                launch.relative_basedir = self.dir.clone();
            }
            GameAttrib::LaunchWorkdir => {
                let launch = &mut self.games[idx].data.launch;
                launch.launch_workdir = merge_lines(&entry.values);
                launch.relative_basedir = self.dir.clone();
            }
            GameAttrib::PlayerCount => match parse_player_count(&merge_lines(&entry.values)) {
                Ok(count) => self.games[idx].data.player_count = Some(count),
                Err(err) => self.warn(ctx, entry.line, err.to_string()),
            },
            GameAttrib::ShortDesc => self.games[idx].data.summary = text_value(&entry.values),
            GameAttrib::LongDesc => self.games[idx].data.description = text_value(&entry.values),
            GameAttrib::Release => match parse_release_date(&merge_lines(&entry.values)) {
                Ok(date) => self.games[idx].data.release = Some(date),
                Err(err) => self.warn(ctx, entry.line, err.to_string()),
            },
            GameAttrib::Rating => match parse_rating(&merge_lines(&entry.values)) {
                Ok(rating) => self.games[idx].data.rating = Some(rating),
                Err(err) => self.warn(ctx, entry.line, err.to_string()),
            },
            GameAttrib::SortBy => self.games[idx].data.sort_by = merge_lines(&entry.values),
            GameAttrib::MediaDir => {
                let dir = resolve(&self.dir, &merge_lines(&entry.values));
                self.games[idx].data.media_dir = Some(canonicalize(&dir).unwrap_or(dir));
            }
            GameAttrib::List(field) => {
                self.games[idx]
                    .data
                    .extend_list(field, split_list(&entry.values));
            }
        }
    }

    fn add_game_files(&mut self, ctx: &mut SearchContext, idx: usize, entry: &Entry) {
        for value in &entry.values {
            let path = match canonicalize(resolve(&self.dir, value)) {
                Some(path) if path.is_file() => path,
                _ => {
                    self.warn(
                        ctx,
                        entry.line,
                        format!("game file `{value}` doesn't seem to exist, ignored"),
                    );
                    continue;
                }
            };
            if self.claimed.contains_key(&path) {
                self.warn(ctx, entry.line, format!("duplicate file `{value}`"));
                continue;
            }
            self.claimed.insert(path.clone(), idx);
            self.games[idx].files.push((path, entry.line));
        }
    }

    fn apply_coll_attrib(
        &mut self,
        ctx: &mut SearchContext,
        filters: &mut [FileFilter],
        name: &str,
        key: &str,
        entry: &Entry,
    ) {
        let Some(attrib) = CollAttrib::from_key(key) else {
            self.warn(ctx, entry.line, format!("unrecognized collection property `{key}`, ignored"));
            return;
        };

        let regex = match attrib {
            CollAttrib::Regex | CollAttrib::IgnoreRegex => {
                let pattern = merge_lines(&entry.values);
                match Regex::new(&pattern) {
                    Ok(regex) => Some(regex),
                    Err(_) => {
                        self.warn(
                            ctx,
                            entry.line,
                            format!("invalid regular expression `{pattern}`, ignored"),
                        );
                        return;
                    }
                }
            }
            _ => None,
        };

        let dir = self.dir.clone();
        let resolved = || entry.values.iter().map(|v| resolve(&dir, v)).collect::<Vec<_>>();
        let filter = self.cur_filter.and_then(|i| filters.get_mut(i));
        let Some(coll) = ctx.collection_mut(name) else {
            return;
        };

        match (attrib, filter) {
            (CollAttrib::ShortName, _) => coll.short_name = merge_lines(&entry.values),
            (CollAttrib::LaunchCmd, _) => {
                coll.launch.launch_cmd = merge_lines(&entry.values);
                coll.launch.relative_basedir = dir.clone();
            }
            (CollAttrib::LaunchWorkdir, _) => {
                coll.launch.launch_workdir = merge_lines(&entry.values);
                coll.launch.relative_basedir = dir.clone();
            }
            (CollAttrib::ShortDesc, _) => coll.summary = text_value(&entry.values),
            (CollAttrib::LongDesc, _) => coll.description = text_value(&entry.values),
            (CollAttrib::SortBy, _) => coll.sort_by = merge_lines(&entry.values),
            (CollAttrib::MediaDir, _) => {
                let media = resolve(&dir, &merge_lines(&entry.values));
                coll.media_dir = Some(canonicalize(&media).unwrap_or(media));
            }
            (CollAttrib::Directories, Some(filter)) => filter.directories.extend(resolved()),
            (CollAttrib::Files, Some(filter)) => filter.files.extend(resolved()),
            (CollAttrib::IgnoreFiles, Some(filter)) => filter.ignore_files.extend(resolved()),
            (CollAttrib::Extensions, Some(filter)) => {
                filter.extensions.extend(normalize_extensions(&entry.values))
            }
            (CollAttrib::IgnoreExtensions, Some(filter)) => {
                filter.ignore_extensions.extend(normalize_extensions(&entry.values))
            }
            (CollAttrib::Regex, Some(filter)) => filter.regex = regex,
            (CollAttrib::IgnoreRegex, Some(filter)) => filter.ignore_regex = regex,
            (_, None) => debug!(collection = name, "no active file filter"),
        }
    }

    /// Move the pending games of this file into the context.
    fn commit(self, ctx: &mut SearchContext) {
        for entry in self.games {
            let PendingEntry {
                line,
                mut data,
                files,
                collections,
            } = entry;

            if files.is_empty() && !data.launch.has_command() {
                ctx.warn_at(
                    self.metafile,
                    line,
                    format!("game `{}` has no files and no launch command, ignored", data.title),
                );
                continue;
            }

            if data.title.is_empty() {
                if let Some((first, _)) = files.first() {
                    data.title = title_from_path(first);
                }
            }

            let owner = files.iter().find_map(|(path, _)| ctx.game_id_for_path(path));
            let id = match owner {
                Some(id) => {
                    if let Some(game) = ctx.game_mut(id) {
                        game.data.merge_from(data);
                    }
                    id
                }
                None => ctx.create_game(data),
            };

            for (path, file_line) in files {
                if let Err(ContextError::DuplicatePath { path, .. }) = ctx.add_file(id, path) {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    ctx.warn_at(self.metafile, file_line, format!("duplicate file `{name}`"));
                }
            }

            if let Some(game) = ctx.game_mut(id) {
                if game.root_dir.is_none() {
                    game.root_dir = Some(self.dir.clone());
                }
            }
            for name in collections {
                if let Err(err) = ctx.add_to_collection(&name, id) {
                    debug!(%err, "could not add game to collection");
                }
            }
        }
    }
}
