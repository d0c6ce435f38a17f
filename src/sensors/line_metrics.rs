//! Line counting sensor: total, code, comment and blank lines per file.
//!
//! Counting is language-aware through the comment markers each language
//! declares. Block comments are tracked across lines, so the body of a
//! `/* ... */` span counts as comment even where no line carries a marker.
//! Comment markers inside string literals are not detected; that would need
//! a real parser, and the built-ins stay text-based.

use crate::errors::Result;
use crate::fs::{FilePredicate, InputFile, Language};
use crate::measure::metrics;
use crate::sensor::{Sensor, SensorContext, SensorDescriptor};
use std::sync::Arc;

pub struct LineMetricsSensor;

impl Sensor for LineMetricsSensor {
    fn describe(&self) -> SensorDescriptor {
        SensorDescriptor::new("line-metrics")
    }

    fn execute(&self, context: &mut SensorContext<'_>) -> Result<()> {
        let files: Vec<Arc<InputFile>> = context
            .file_system()
            .files(&FilePredicate::main_files())
            .cloned()
            .collect();

        let mut total = LineCounts::default();
        for file in &files {
            let counts = count_lines(file.contents(), file.language());
            total.add(counts);
            save_counts(context, Some(file.as_ref()), counts)?;
        }

        save_counts(context, None, total)?;
        context
            .new_measure()
            .on_project()
            .for_metric(&metrics::FILES)
            .with_value(files.len() as i64)
            .save()?;
        Ok(())
    }
}

fn save_counts(
    context: &mut SensorContext<'_>,
    file: Option<&InputFile>,
    counts: LineCounts,
) -> Result<()> {
    let pairs = [
        (&metrics::LINES, counts.lines),
        (&metrics::NCLOC, counts.code),
        (&metrics::COMMENT_LINES, counts.comment),
        (&metrics::BLANK_LINES, counts.blank),
    ];
    for (metric, value) in pairs {
        let measure = context.new_measure().for_metric(metric).with_value(value);
        let measure = match file {
            Some(file) => measure.on_file(file),
            None => measure.on_project(),
        };
        measure.save()?;
    }
    Ok(())
}

/// Line counts for one file; `lines == code + comment + blank` always holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineCounts {
    pub lines: i64,
    pub code: i64,
    pub comment: i64,
    pub blank: i64,
}

impl LineCounts {
    fn add(&mut self, other: LineCounts) {
        self.lines += other.lines;
        self.code += other.code;
        self.comment += other.comment;
        self.blank += other.blank;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LineKind {
    Blank,
    Comment,
    Code,
}

#[derive(Default)]
struct CommentState {
    in_block: bool,
}

/// Count and classify every line of `contents`.
pub fn count_lines(contents: &str, language: Language) -> LineCounts {
    let mut counts = LineCounts::default();
    let mut state = CommentState::default();

    for line in contents.lines() {
        counts.lines += 1;
        match classify_line(line.trim(), &mut state, language) {
            LineKind::Blank => counts.blank += 1,
            LineKind::Comment => counts.comment += 1,
            LineKind::Code => counts.code += 1,
        }
    }

    counts
}

fn classify_line(trimmed: &str, state: &mut CommentState, language: Language) -> LineKind {
    if trimmed.is_empty() {
        return LineKind::Blank;
    }

    if state.in_block {
        if let Some((_, close)) = language.block_comment_delimiters() {
            if trimmed.contains(close) {
                state.in_block = false;
            }
        }
        return LineKind::Comment;
    }

    if is_line_comment(trimmed, language) {
        return LineKind::Comment;
    }

    if let Some((open, close)) = language.block_comment_delimiters() {
        if let Some(start) = trimmed.find(open) {
            let has_code_before = !trimmed[..start].trim().is_empty();
            let rest = &trimmed[start + open.len()..];
            return match rest.find(close) {
                Some(end) => {
                    let after = rest[end + close.len()..].trim();
                    if has_code_before || !after.is_empty() {
                        LineKind::Code
                    } else {
                        LineKind::Comment
                    }
                }
                None => {
                    state.in_block = true;
                    if has_code_before {
                        LineKind::Code
                    } else {
                        LineKind::Comment
                    }
                }
            };
        }
    }

    LineKind::Code
}

fn is_line_comment(trimmed: &str, language: Language) -> bool {
    language
        .line_comment_prefixes()
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}

/// Lines classified as code, with their 1-based numbers. The duplication
/// tokenizer runs on these so comments and blanks never produce tokens.
pub fn code_lines(contents: &str, language: Language) -> Vec<(u32, &str)> {
    let mut state = CommentState::default();
    contents
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            match classify_line(line.trim(), &mut state, language) {
                LineKind::Code => Some((index as u32 + 1, line)),
                _ => None,
            }
        })
        .collect()
}
