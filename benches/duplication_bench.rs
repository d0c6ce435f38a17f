//! Duplication detection benchmarks.
//!
//! Token streams are registered through the real sensor context so the
//! numbers cover the same path the executor takes.

use criterion::{criterion_group, criterion_main, Criterion};
use sensorkit::duplication::{DuplicationConfig, DuplicationEngine, TokenStream};
use sensorkit::fs::{FileSystem, FileType, InputFile, Language};
use sensorkit::rule::ActiveRules;
use sensorkit::sensor::{InMemorySensorStorage, SensorContext};
use sensorkit::sensors::cpd;
use sensorkit::settings::Settings;
use std::hint::black_box;
use std::sync::Arc;

/// Lines whose every token embeds the file and line index, so no two
/// filler lines ever hash alike.
fn filler_lines(file: usize, from: usize, count: usize) -> String {
    let mut out = String::new();
    for line in from..from + count {
        out.push_str(&format!(
            "let v{line} = table_{file}[{line}] + offset_{file};\n"
        ));
    }
    out
}

/// A 12-line block shared by exactly the two files of one pair.
fn clone_block(pair: usize) -> String {
    let mut block = String::new();
    for line in 0..12 {
        block.push_str(&format!(
            "acc_{pair} = mix(acc_{pair}, seed[{line}], {line});\n"
        ));
    }
    block
}

fn synthetic_files(count: usize, with_clones: bool) -> Vec<Arc<InputFile>> {
    (0..count)
        .map(|i| {
            let mut contents = filler_lines(i, 0, 20);
            if with_clones {
                contents.push_str(&clone_block(i / 2));
            } else {
                contents.push_str(&filler_lines(i, 100, 12));
            }
            contents.push_str(&filler_lines(i, 200, 20));
            Arc::new(InputFile::new(
                format!("src/file_{i}.rs"),
                format!("/bench/src/file_{i}.rs"),
                contents,
                Language::Rust,
                FileType::Main,
            ))
        })
        .collect()
}

/// Register one whitespace token per word through the context, the way a
/// language sensor feeds the engine.
fn build_streams(files: &[Arc<InputFile>]) -> Vec<TokenStream> {
    let file_system = FileSystem::new("/bench", files.to_vec());
    let settings = Settings::new();
    let rules = ActiveRules::new();
    let mut storage = InMemorySensorStorage::new();
    let mut context = SensorContext::new(&settings, &file_system, &rules, &mut storage);
    for file in files {
        let mut builder = context.duplication_token_builder(file);
        for (index, line) in file.contents().lines().enumerate() {
            for word in line.split_whitespace() {
                builder.add_token(index as u32 + 1, word).unwrap();
            }
        }
        builder.save().unwrap();
    }
    drop(context);
    storage.token_streams().to_vec()
}

fn bench_detect_without_clones(c: &mut Criterion) {
    let files = synthetic_files(50, false);
    let streams = build_streams(&files);
    let engine = DuplicationEngine::new(DuplicationConfig {
        min_tokens: 24,
        min_lines: 5,
    });

    c.bench_function("detect_50_files_no_clones", |b| {
        b.iter(|| engine.detect(black_box(&streams)));
    });
}

fn bench_detect_paired_clones(c: &mut Criterion) {
    let files = synthetic_files(50, true);
    let streams = build_streams(&files);
    let engine = DuplicationEngine::new(DuplicationConfig {
        min_tokens: 24,
        min_lines: 5,
    });

    c.bench_function("detect_50_files_paired_clones", |b| {
        b.iter(|| engine.detect(black_box(&streams)));
    });
}

fn bench_tokenize_source(c: &mut Criterion) {
    let source: String = (0..120)
        .map(|i| format!("let value_{i} = base.wrapping_mul({i}); // step {i}\n"))
        .collect();

    c.bench_function("tokenize_120_lines", |b| {
        b.iter(|| cpd::tokenize(black_box(&source), Language::Rust));
    });
}

criterion_group!(
    benches,
    bench_detect_without_clones,
    bench_detect_paired_clones,
    bench_tokenize_source
);

criterion_main!(benches);
