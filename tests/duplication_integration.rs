//! Duplication detection end to end: token streams registered through the
//! sensor context, groups computed by the engine.

use sensorkit::duplication::{
    duplicated_lines, DuplicatedBlock, DuplicationConfig, DuplicationEngine,
};
use sensorkit::settings::Settings;
use sensorkit::testkit::{SensorContextTester, TestInputFile};

/// Register every whitespace-separated word of `path` as one duplication
/// token, the way a language sensor would.
fn tokenize(tester: &mut SensorContextTester, path: &str) {
    let file = tester.input_file(path).unwrap();
    let contents = file.contents().to_string();
    let mut ctx = tester.context();
    let mut builder = ctx.duplication_token_builder(&file);
    for (index, line) in contents.lines().enumerate() {
        for word in line.split_whitespace() {
            builder.add_token(index as u32 + 1, word).unwrap();
        }
    }
    builder.save().unwrap();
}

const SHARED_FN: &str = "fn checksum(bytes: &[u8]) -> u32 {\n    let mut state = 0u32;\n    for byte in bytes {\n        state = state.rotate_left(5) ^ u32::from(*byte);\n    }\n    state\n}\n";

#[test]
fn test_cross_file_duplication_via_token_builder() {
    let mut tester = SensorContextTester::new("/proj")
        .with_file(
            TestInputFile::new("src/a.rs", format!("{SHARED_FN}static A_SEED: u32 = 17;\n"))
                .build(),
        )
        .with_file(
            TestInputFile::new("src/b.rs", format!("{SHARED_FN}const B_SEED: u32 = 23;\n"))
                .build(),
        );
    tokenize(&mut tester, "src/a.rs");
    tokenize(&mut tester, "src/b.rs");

    let engine = DuplicationEngine::new(DuplicationConfig {
        min_tokens: 10,
        min_lines: 3,
    });
    let groups = engine.detect(tester.storage().token_streams());

    let a_groups = &groups[std::path::Path::new("src/a.rs")];
    assert_eq!(a_groups.len(), 1);
    assert_eq!(a_groups[0].origin, DuplicatedBlock::new("src/a.rs", 1, 7));
    assert_eq!(
        a_groups[0].duplicates,
        vec![DuplicatedBlock::new("src/b.rs", 1, 7)]
    );
    assert_eq!(duplicated_lines(a_groups), 7);

    let b_groups = &groups[std::path::Path::new("src/b.rs")];
    assert_eq!(b_groups[0].origin, DuplicatedBlock::new("src/b.rs", 1, 7));
}

#[test]
fn test_thresholds_filter_out_short_clones() {
    let mut tester = SensorContextTester::new("/proj")
        .with_file(TestInputFile::new("src/a.rs", SHARED_FN).build())
        .with_file(TestInputFile::new("src/b.rs", SHARED_FN).build());
    tokenize(&mut tester, "src/a.rs");
    tokenize(&mut tester, "src/b.rs");

    // The shared function is 24 tokens over 7 lines. Raise either
    // threshold past it and nothing is reported.
    let strict_tokens = DuplicationEngine::new(DuplicationConfig {
        min_tokens: 30,
        min_lines: 3,
    });
    assert!(strict_tokens
        .detect(tester.storage().token_streams())
        .is_empty());

    let strict_lines = DuplicationEngine::new(DuplicationConfig {
        min_tokens: 10,
        min_lines: 9,
    });
    assert!(strict_lines
        .detect(tester.storage().token_streams())
        .is_empty());
}

#[test]
fn test_file_repeating_itself_reports_both_blocks() {
    let region = "let x = width * scale;\nlet y = height * scale;\nlet z = depth * scale;\nemit(x, y, z);\n";
    let contents = format!("{region}recalibrate(&mut frame);\n{region}");
    let mut tester = SensorContextTester::new("/proj")
        .with_file(TestInputFile::new("src/frame.rs", contents).build());
    tokenize(&mut tester, "src/frame.rs");

    let engine = DuplicationEngine::new(DuplicationConfig {
        min_tokens: 10,
        min_lines: 3,
    });
    let groups = engine.detect(tester.storage().token_streams());

    let frame = &groups[std::path::Path::new("src/frame.rs")];
    assert_eq!(frame.len(), 2);
    assert_eq!(frame[0].origin, DuplicatedBlock::new("src/frame.rs", 1, 4));
    assert_eq!(
        frame[0].duplicates,
        vec![DuplicatedBlock::new("src/frame.rs", 6, 9)]
    );
    assert_eq!(frame[1].origin, DuplicatedBlock::new("src/frame.rs", 6, 9));
    assert_eq!(duplicated_lines(frame), 8);
}

#[test]
fn test_streams_shorter_than_the_window_are_skipped() {
    let mut tester = SensorContextTester::new("/proj")
        .with_file(TestInputFile::new("src/tiny.rs", "fn t() {}\n").build())
        .with_file(TestInputFile::new("src/tiny2.rs", "fn t() {}\n").build());
    tokenize(&mut tester, "src/tiny.rs");
    tokenize(&mut tester, "src/tiny2.rs");

    let engine = DuplicationEngine::new(DuplicationConfig::default());
    assert!(engine.detect(tester.storage().token_streams()).is_empty());
}

#[test]
fn test_config_reads_thresholds_from_settings() {
    let mut settings = Settings::new();
    settings.set(DuplicationConfig::MIN_TOKENS_KEY, "25");
    settings.set(DuplicationConfig::MIN_LINES_KEY, "2");

    let config = DuplicationConfig::from_settings(&settings).unwrap();
    assert_eq!(config.min_tokens, 25);
    assert_eq!(config.min_lines, 2);

    settings.set(DuplicationConfig::MIN_TOKENS_KEY, "1");
    assert!(DuplicationConfig::from_settings(&settings).is_err());
}
