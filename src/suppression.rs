//! In-source issue suppression markers.
//!
//! A line is suppressed when it carries `sensorkit:ignore` in a comment, or
//! when the line directly above carries `sensorkit:ignore-next-line`. The
//! markers are plain substrings of the line, so they work inside any comment
//! syntax the language uses.

use crate::fs::InputFile;
use once_cell::sync::Lazy;
use regex::Regex;

static MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"sensorkit:ignore(-next-line)?").unwrap());

/// Which marker a line carries, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    SameLine,
    NextLine,
}

fn marker_on(text: &str) -> Option<Marker> {
    MARKER.captures(text).map(|caps| {
        if caps.get(1).is_some() {
            Marker::NextLine
        } else {
            Marker::SameLine
        }
    })
}

/// True when an issue reported on `line` (1-based) of `file` should be
/// dropped because of a suppression marker.
pub fn is_line_suppressed(file: &InputFile, line: u32) -> bool {
    if let Some(text) = file.line_text(line) {
        if marker_on(text) == Some(Marker::SameLine) {
            return true;
        }
    }
    if line > 1 {
        if let Some(text) = file.line_text(line - 1) {
            if marker_on(text) == Some(Marker::NextLine) {
                return true;
            }
        }
    }
    false
}
