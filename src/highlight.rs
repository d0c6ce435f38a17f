//! Syntax highlighting reported by sensors.
//!
//! Spans may nest (a doc comment inside a larger region) but may not cross
//! each other, and every span must lie inside the file it decorates.

use crate::errors::{Error, Result};
use crate::fs::InputFile;
use crate::sensor::storage::SensorStorage;
use crate::text::TextRange;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    Annotation,
    Comment,
    DocComment,
    Constant,
    Keyword,
    KeywordLight,
    PreprocessDirective,
    StringLiteral,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HighlightSpan {
    pub range: TextRange,
    pub kind: HighlightKind,
}

/// All highlighting for one file, spans ordered outer-before-inner.
#[derive(Clone, Debug, Serialize)]
pub struct FileHighlighting {
    file: PathBuf,
    spans: Vec<HighlightSpan>,
}

impl FileHighlighting {
    pub fn file(&self) -> &PathBuf {
        &self.file
    }

    pub fn spans(&self) -> &[HighlightSpan] {
        &self.spans
    }
}

/// Builder for one file's highlighting, obtained from the sensor context.
pub struct HighlightingBuilder<'a> {
    storage: &'a mut dyn SensorStorage,
    file: &'a InputFile,
    spans: Vec<HighlightSpan>,
}

impl<'a> HighlightingBuilder<'a> {
    pub(crate) fn new(storage: &'a mut dyn SensorStorage, file: &'a InputFile) -> Self {
        Self {
            storage,
            file,
            spans: Vec::new(),
        }
    }

    /// Record one span. Fails when the range falls outside the file.
    pub fn highlight(&mut self, range: TextRange, kind: HighlightKind) -> Result<&mut Self> {
        self.file.validate_range(&range)?;
        self.spans.push(HighlightSpan { range, kind });
        Ok(self)
    }

    /// Sort, reject crossing spans, drop exact duplicates, then store.
    pub fn save(self) -> Result<()> {
        let mut spans = self.spans;
        // Outer spans first: start ascending, longer span wins ties.
        spans.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then(b.range.end.cmp(&a.range.end))
                .then(a.kind.cmp(&b.kind))
        });
        spans.dedup();

        for pair in spans.windows(2) {
            if pair[0].range.crosses(&pair[1].range) {
                return Err(Error::validation(format!(
                    "highlighting spans {} and {} cross in {}",
                    pair[0].range,
                    pair[1].range,
                    self.file.relative_path().display()
                )));
            }
        }

        self.storage.store_highlighting(FileHighlighting {
            file: self.file.relative_path().to_path_buf(),
            spans,
        })
    }
}
