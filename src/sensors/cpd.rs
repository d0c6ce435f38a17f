//! Copy-paste tokenizer: turns main files into duplication token streams.
//!
//! The sensor only produces the streams; matching happens in the engine
//! after all sensors ran. Comment and blank lines are skipped and trailing
//! line comments stripped, so reformatted copies of the same code still
//! hash alike. Comment markers inside string literals fool the stripper,
//! which at worst drops a few tokens from one line.

use crate::errors::Result;
use crate::fs::{FilePredicate, InputFile, Language};
use crate::sensor::{Sensor, SensorContext, SensorDescriptor};
use std::sync::Arc;

use super::line_metrics::code_lines;

pub struct CpdSensor;

impl Sensor for CpdSensor {
    fn describe(&self) -> SensorDescriptor {
        SensorDescriptor::new("cpd")
    }

    fn execute(&self, context: &mut SensorContext<'_>) -> Result<()> {
        let files: Vec<Arc<InputFile>> = context
            .file_system()
            .files(&FilePredicate::main_files())
            .cloned()
            .collect();

        for file in &files {
            let tokens = tokenize(file.contents(), file.language());
            if tokens.is_empty() {
                continue;
            }
            let mut builder = context.duplication_token_builder(file);
            for (line, image) in &tokens {
                builder.add_token(*line, image.as_str())?;
            }
            builder.save()?;
        }
        Ok(())
    }
}

/// Tokenize code lines into `(line, image)` pairs: identifier and number
/// runs stay whole, every other non-whitespace character is its own token.
pub fn tokenize(contents: &str, language: Language) -> Vec<(u32, String)> {
    let mut tokens = Vec::new();
    for (line, text) in code_lines(contents, language) {
        let code = strip_trailing_comment(text, language);
        tokenize_line(code, |image| tokens.push((line, image)));
    }
    tokens
}

fn tokenize_line(code: &str, mut push: impl FnMut(String)) {
    let mut current = String::new();
    for c in code.chars() {
        if c.is_alphanumeric() || c == '_' {
            current.push(c);
            continue;
        }
        if !current.is_empty() {
            push(std::mem::take(&mut current));
        }
        if !c.is_whitespace() {
            push(c.to_string());
        }
    }
    if !current.is_empty() {
        push(current);
    }
}

fn strip_trailing_comment<'a>(line: &'a str, language: Language) -> &'a str {
    language
        .line_comment_prefixes()
        .iter()
        .filter_map(|prefix| line.find(prefix))
        .min()
        .map(|index| &line[..index])
        .unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FileSystem, FileType};
    use crate::sensor::{InMemorySensorStorage, SensorContext};
    use crate::settings::Settings;

    #[test]
    fn test_tokenize_splits_identifiers_and_symbols() {
        let tokens = tokenize("let x = foo_bar(1);\n", Language::Rust);
        let images: Vec<&str> = tokens.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(images, vec!["let", "x", "=", "foo_bar", "(", "1", ")", ";"]);
        assert!(tokens.iter().all(|(line, _)| *line == 1));
    }

    #[test]
    fn test_tokenize_skips_comments_and_blanks() {
        let source = "// header\n\nlet a = 1; // trailing\n";
        let tokens = tokenize(source, Language::Rust);
        let images: Vec<&str> = tokens.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(images, vec!["let", "a", "=", "1", ";"]);
        assert_eq!(tokens[0].0, 3);
    }

    #[test]
    fn test_execute_stores_one_stream_per_file() {
        let main = Arc::new(InputFile::new(
            "src/a.rs",
            "/proj/src/a.rs",
            "fn a() { 1 }\n",
            Language::Rust,
            FileType::Main,
        ));
        let test = Arc::new(InputFile::new(
            "tests/t.rs",
            "/proj/tests/t.rs",
            "fn t() { 2 }\n",
            Language::Rust,
            FileType::Test,
        ));
        let fs = FileSystem::new("/proj", vec![main, test]);
        let settings = Settings::new();
        let rules = crate::rule::ActiveRules::new();
        let mut storage = InMemorySensorStorage::new();

        let mut context = SensorContext::new(&settings, &fs, &rules, &mut storage);
        CpdSensor.execute(&mut context).unwrap();

        assert_eq!(storage.token_streams().len(), 1);
        let stream = &storage.token_streams()[0];
        assert_eq!(stream.file(), std::path::Path::new("src/a.rs"));
        assert!(!stream.is_empty());
    }

    #[test]
    fn test_execute_skips_files_with_no_code() {
        let file = Arc::new(InputFile::new(
            "notes.rs",
            "/proj/notes.rs",
            "// only comments\n\n",
            Language::Rust,
            FileType::Main,
        ));
        let fs = FileSystem::new("/proj", vec![file]);
        let settings = Settings::new();
        let rules = crate::rule::ActiveRules::new();
        let mut storage = InMemorySensorStorage::new();

        let mut context = SensorContext::new(&settings, &fs, &rules, &mut storage);
        CpdSensor.execute(&mut context).unwrap();
        assert!(storage.token_streams().is_empty());
    }
}
