//! Benchmarks for gamedeck-metafile.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use gamedeck_metafile::grammar::{classify, parse_rating, parse_release_date, replace_newlines};
use gamedeck_metafile::reader::read_str;
use gamedeck_metafile::merge_lines;

fn sample_metafile(games: usize) -> String {
    let mut text = String::from(
        "# generated\ncollection: Bench Games\nshortname: bench\nextensions: ext, bin\nlaunch: emu {file.path}\n\n",
    );
    for idx in 0..games {
        text.push_str(&format!(
            "game: Game {idx}\nfile: game_{idx}.ext\ndeveloper: Studio {idx}\nrating: {}%\nrelease: 1998-05-{:02}\n\
             description:\n  First paragraph of game {idx}.\n  .\n  Second paragraph\\nwith a break.\n\n",
            idx % 100,
            idx % 28 + 1,
        ));
    }
    text
}

fn bench_read_str(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_str");
    for games in [10, 1000] {
        let text = sample_metafile(games);
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_function(format!("{games}_games"), |b| {
            b.iter(|| read_str(black_box(&text)))
        });
    }
    group.finish();
}

fn bench_grammar(c: &mut Criterion) {
    let text = sample_metafile(200);
    let entries: Vec<_> = read_str(&text).into_iter().filter_map(Result::ok).collect();

    c.bench_function("classify_and_validate", |b| {
        b.iter(|| {
            for entry in &entries {
                black_box(classify(&entry.key));
                match entry.key.as_str() {
                    "rating" => {
                        let _ = black_box(parse_rating(&entry.values[0]));
                    }
                    "release" => {
                        let _ = black_box(parse_release_date(&entry.values[0]));
                    }
                    "description" => {
                        black_box(replace_newlines(&merge_lines(&entry.values)));
                    }
                    _ => {}
                }
            }
        })
    });
}

criterion_group!(benches, bench_read_str, bench_grammar);
criterion_main!(benches);
