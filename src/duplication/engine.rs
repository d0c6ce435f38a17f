//! Token-window duplication engine.
//!
//! Every run of `min_tokens` consecutive tokens is hashed into a project-wide
//! index. Windows sharing a hash are duplicate candidates; candidates on the
//! same file-pair diagonal are merged into maximal blocks, which are then
//! filtered by `min_lines` and regrouped per origin file.

use super::{DuplicatedBlock, DuplicationGroup, TokenStream};
use crate::errors::{Error, Result};
use crate::settings::Settings;
use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::PathBuf;
use xxhash_rust::xxh64::xxh64;

pub const DEFAULT_MIN_TOKENS: usize = 50;
pub const DEFAULT_MIN_LINES: u32 = 5;

// Degenerate token runs ("0 0 0 ...") can put thousands of windows behind
// one hash. Buckets past this size are noise, not duplication.
const MAX_WINDOWS_PER_HASH: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DuplicationConfig {
    pub min_tokens: usize,
    pub min_lines: u32,
}

impl Default for DuplicationConfig {
    fn default() -> Self {
        Self {
            min_tokens: DEFAULT_MIN_TOKENS,
            min_lines: DEFAULT_MIN_LINES,
        }
    }
}

impl DuplicationConfig {
    pub const MIN_TOKENS_KEY: &'static str = "sensorkit.cpd.min_tokens";
    pub const MIN_LINES_KEY: &'static str = "sensorkit.cpd.min_lines";

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut config = Self::default();
        if let Some(min_tokens) = settings.get_int(Self::MIN_TOKENS_KEY)? {
            config.min_tokens = usize::try_from(min_tokens).map_err(|_| {
                Error::Configuration(format!("{} must be positive", Self::MIN_TOKENS_KEY))
            })?;
        }
        if let Some(min_lines) = settings.get_int(Self::MIN_LINES_KEY)? {
            config.min_lines = u32::try_from(min_lines).map_err(|_| {
                Error::Configuration(format!("{} must be positive", Self::MIN_LINES_KEY))
            })?;
        }
        if config.min_tokens < 2 {
            return Err(Error::Configuration(format!(
                "{} must be at least 2, got {}",
                Self::MIN_TOKENS_KEY,
                config.min_tokens
            )));
        }
        if config.min_lines < 1 {
            return Err(Error::Configuration(format!(
                "{} must be at least 1",
                Self::MIN_LINES_KEY
            )));
        }
        Ok(config)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Window {
    stream: usize,
    start: usize,
}

/// A matched window pair, `a` always ordered before `b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct PairHit {
    a: Window,
    b: Window,
}

pub struct DuplicationEngine {
    config: DuplicationConfig,
}

impl DuplicationEngine {
    pub fn new(config: DuplicationConfig) -> Self {
        Self { config }
    }

    /// Detect duplications across the given streams. The result maps each
    /// file to its groups, every block of the file appearing once as an
    /// origin with all its copies attached.
    pub fn detect(&self, streams: &[TokenStream]) -> BTreeMap<PathBuf, Vec<DuplicationGroup>> {
        let hits = self.collect_hits(streams);
        let runs = merge_diagonal_runs(hits);
        let pairs = self.runs_to_block_pairs(streams, runs);
        group_by_origin(pairs)
    }

    fn collect_hits(&self, streams: &[TokenStream]) -> Vec<PairHit> {
        let min_tokens = self.config.min_tokens;
        let index: DashMap<u64, Vec<Window>> = DashMap::new();

        streams.par_iter().enumerate().for_each(|(stream, ts)| {
            let tokens = ts.tokens();
            if tokens.len() < min_tokens {
                return;
            }
            for start in 0..=tokens.len() - min_tokens {
                let hash = hash_window(&tokens[start..start + min_tokens]);
                index.entry(hash).or_default().push(Window { stream, start });
            }
        });

        let mut hits = Vec::new();
        for entry in index.into_iter() {
            let (hash, mut windows) = entry;
            if windows.len() < 2 {
                continue;
            }
            if windows.len() > MAX_WINDOWS_PER_HASH {
                log::debug!(
                    "skipping degenerate duplication bucket {hash:#018x} with {} windows",
                    windows.len()
                );
                continue;
            }
            windows.sort();
            for i in 0..windows.len() {
                for j in i + 1..windows.len() {
                    let (a, b) = (windows[i], windows[j]);
                    // Windows of one file that share tokens are the file
                    // repeating itself, not a duplicate pair.
                    if a.stream == b.stream && b.start - a.start < min_tokens {
                        continue;
                    }
                    hits.push(PairHit { a, b });
                }
            }
        }
        // DashMap iteration order is arbitrary, restore determinism here.
        hits.sort();
        hits.dedup();
        hits
    }

    fn runs_to_block_pairs(
        &self,
        streams: &[TokenStream],
        runs: Vec<Run>,
    ) -> Vec<(DuplicatedBlock, DuplicatedBlock)> {
        let min_tokens = self.config.min_tokens;
        let mut pairs = Vec::new();
        for run in runs {
            let last = run.first_start + run.windows - 1 + min_tokens - 1;
            let a = block_for(&streams[run.a_stream], run.first_start, last);
            let b_first = offset(run.first_start, run.delta);
            let b = block_for(&streams[run.b_stream], b_first, offset(last, run.delta));
            if a.line_count() >= self.config.min_lines && b.line_count() >= self.config.min_lines {
                pairs.push((a, b));
            }
        }
        pairs
    }
}

/// Count of distinct lines covered by the origin blocks of one file's groups.
pub fn duplicated_lines(groups: &[DuplicationGroup]) -> u32 {
    let mut lines: BTreeSet<u32> = BTreeSet::new();
    for group in groups {
        lines.extend(group.origin.start_line..=group.origin.end_line);
    }
    lines.len() as u32
}

fn hash_window(tokens: &[super::Token]) -> u64 {
    let mut buf = Vec::with_capacity(tokens.len() * 8);
    for token in tokens {
        buf.extend_from_slice(token.image.as_bytes());
        buf.push(0x1F);
    }
    xxh64(&buf, 0)
}

/// A maximal run of window hits on one (file a, file b, start delta)
/// diagonal.
#[derive(Clone, Copy, Debug)]
struct Run {
    a_stream: usize,
    b_stream: usize,
    delta: i64,
    first_start: usize,
    windows: usize,
}

fn offset(start: usize, delta: i64) -> usize {
    (start as i64 + delta) as usize
}

fn merge_diagonal_runs(hits: Vec<PairHit>) -> Vec<Run> {
    let mut diagonals: HashMap<(usize, usize, i64), Vec<usize>> = HashMap::new();
    for hit in hits {
        let delta = hit.b.start as i64 - hit.a.start as i64;
        diagonals
            .entry((hit.a.stream, hit.b.stream, delta))
            .or_default()
            .push(hit.a.start);
    }

    let mut keys: Vec<_> = diagonals.keys().copied().collect();
    keys.sort();

    let mut runs = Vec::new();
    for key in keys {
        let (a_stream, b_stream, delta) = key;
        let mut starts = diagonals.remove(&key).unwrap_or_default();
        starts.sort_unstable();
        starts.dedup();

        let mut iter = starts.into_iter();
        let Some(first) = iter.next() else { continue };
        let mut run = Run {
            a_stream,
            b_stream,
            delta,
            first_start: first,
            windows: 1,
        };
        let mut last = first;
        for start in iter {
            if start == last + 1 {
                run.windows += 1;
            } else {
                runs.push(run);
                run = Run {
                    a_stream,
                    b_stream,
                    delta,
                    first_start: start,
                    windows: 1,
                };
            }
            last = start;
        }
        runs.push(run);
    }
    runs
}

fn block_for(stream: &TokenStream, first_token: usize, last_token: usize) -> DuplicatedBlock {
    let tokens = stream.tokens();
    DuplicatedBlock::new(
        stream.file(),
        tokens[first_token].line,
        tokens[last_token].line,
    )
}

fn group_by_origin(
    pairs: Vec<(DuplicatedBlock, DuplicatedBlock)>,
) -> BTreeMap<PathBuf, Vec<DuplicationGroup>> {
    let mut by_origin: BTreeMap<DuplicatedBlock, BTreeSet<DuplicatedBlock>> = BTreeMap::new();
    for (a, b) in pairs {
        by_origin.entry(a.clone()).or_default().insert(b.clone());
        by_origin.entry(b).or_default().insert(a);
    }

    let mut by_file: BTreeMap<PathBuf, Vec<DuplicationGroup>> = BTreeMap::new();
    for (origin, duplicates) in by_origin {
        by_file
            .entry(origin.file.clone())
            .or_default()
            .push(DuplicationGroup {
                origin,
                duplicates: duplicates.into_iter().collect(),
            });
    }
    by_file
}
