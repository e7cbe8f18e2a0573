//! Reading complete metadata files from disk.

use gamedeck_common::AssetType;
use gamedeck_metafile::discovery::{find_in_dir, DEFAULT_FILENAME};
use gamedeck_metafile::grammar::{classify, CollAttrib, GameAttrib, Key};
use gamedeck_metafile::reader::{read_file, Entry, ReadError};

const SAMPLE: &str = "\
# Sample metadata file
collection: Super Console
shortname: sc
extensions: sfc, smc
launch: emulator
  --fullscreen
  {file.path}

game: Adventure Quest
file: adventure.sfc
developers: Studio A, Studio B
rating: 90%
assets.box_front: media/aq/front.png
x-custom-tool: whatever
description:
  An epic adventure.
  .
  Second part.

this line is broken
";

fn write_sample() -> (tempfile::TempDir, Vec<Entry>, Vec<(usize, ReadError)>) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(DEFAULT_FILENAME), SAMPLE).unwrap();

    let found = find_in_dir(dir.path());
    assert_eq!(found.len(), 1);

    let mut entries = Vec::new();
    let mut errors = Vec::new();
    for item in read_file(&found[0]).unwrap() {
        match item {
            Ok(entry) => entries.push(entry),
            Err(err) => errors.push((err.line, err.kind)),
        }
    }
    (dir, entries, errors)
}

#[test]
fn reads_entries_with_line_numbers() {
    let (_dir, entries, errors) = write_sample();

    let keys: Vec<_> = entries.iter().map(|e| e.key.as_str()).collect();
    assert_eq!(
        keys,
        [
            "collection",
            "shortname",
            "extensions",
            "launch",
            "game",
            "file",
            "developers",
            "rating",
            "assets.box_front",
            "x-custom-tool",
            "description",
        ]
    );

    let launch = &entries[3];
    assert_eq!(launch.line, 5);
    assert_eq!(launch.values, ["emulator", "--fullscreen", "{file.path}"]);

    let description = entries.last().unwrap();
    assert_eq!(description.line, 15);
    assert_eq!(description.values, ["An epic adventure.", ".", "Second part."]);

    assert_eq!(errors, [(20, ReadError::NotKeyValue)]);
}

#[test]
fn keys_classify_in_their_block() {
    let (_dir, entries, _) = write_sample();

    assert_eq!(classify(&entries[0].key), Key::Collection);
    assert_eq!(
        CollAttrib::from_key(&entries[2].key),
        Some(CollAttrib::Extensions)
    );
    assert_eq!(classify(&entries[4].key), Key::Game);
    assert_eq!(GameAttrib::from_key(&entries[5].key), Some(GameAttrib::Files));

    match classify(&entries[8].key) {
        Key::Asset(token) => assert_eq!(AssetType::from_name(token), Some(AssetType::BoxFront)),
        other => panic!("expected asset key, got {other:?}"),
    }
    assert_eq!(classify(&entries[9].key), Key::Extension);
}
