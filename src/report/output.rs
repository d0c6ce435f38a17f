use crate::issue::Issue;
use crate::report::AnalysisResults;
use crate::rule::Severity;
use colored::*;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

pub trait OutputWriter {
    fn write_results(&mut self, results: &AnalysisResults) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_results(&mut self, results: &AnalysisResults) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(results)?;
        self.writer.write_all(json.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_results(&mut self, results: &AnalysisResults) -> anyhow::Result<()> {
        self.write_header(results)?;
        self.write_summary(results)?;
        self.write_issues(results)?;
        self.write_duplications(results)?;
        self.write_test_failures(results)?;
        self.write_cycles(results)?;
        Ok(())
    }
}

impl<W: Write> MarkdownWriter<W> {
    fn write_header(&mut self, results: &AnalysisResults) -> anyhow::Result<()> {
        writeln!(self.writer, "# Analysis Report")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Generated: {}",
            results.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(self.writer, "Project: {}", results.project.base_dir.display())?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_summary(&mut self, results: &AnalysisResults) -> anyhow::Result<()> {
        writeln!(self.writer, "## Summary")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value |")?;
        writeln!(self.writer, "|--------|-------|")?;
        self.write_summary_row("Files", &results.project.files.to_string())?;
        self.write_summary_row("Languages", &results.project.languages.join(", "))?;
        self.write_summary_row(
            "Sensors run",
            &format!(
                "{} of {}",
                results.sensors.iter().filter(|s| !s.is_failed()).count(),
                results.sensors.len()
            ),
        )?;
        self.write_summary_row("Issues", &results.issue_count().to_string())?;
        self.write_summary_row("Suppressed issues", &results.suppressed_issues.to_string())?;
        self.write_summary_row(
            "Tests",
            &format!(
                "{} ({} failing)",
                results.test_count(),
                results.failing_test_count()
            ),
        )?;
        self.write_summary_row(
            "Files with duplication",
            &results.duplicated_file_count().to_string(),
        )?;
        self.write_summary_row(
            "Dependency cycles",
            &results.dependency_cycles.len().to_string(),
        )?;
        self.write_summary_row("Duration", &format!("{}ms", results.duration_ms))?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_summary_row(&mut self, metric: &str, value: &str) -> anyhow::Result<()> {
        writeln!(self.writer, "| {metric} | {value} |")?;
        Ok(())
    }

    fn write_issues(&mut self, results: &AnalysisResults) -> anyhow::Result<()> {
        if results.issues.is_empty() {
            return Ok(());
        }

        writeln!(self.writer, "## Issues")?;
        writeln!(self.writer)?;
        for (severity, count) in results.issues_by_severity() {
            writeln!(self.writer, "- {severity}: {count}")?;
        }
        writeln!(self.writer)?;

        for issue in top_issues(&results.issues, 20) {
            writeln!(
                self.writer,
                "- [ ] `{}` - {} {}: {}",
                location_of(issue),
                issue.severity(),
                issue.rule(),
                issue.message()
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_duplications(&mut self, results: &AnalysisResults) -> anyhow::Result<()> {
        if results.duplicated_file_count() == 0 {
            return Ok(());
        }

        writeln!(self.writer, "## Duplications")?;
        writeln!(self.writer)?;
        for (file, groups) in &results.duplications {
            if groups.is_empty() {
                continue;
            }
            writeln!(self.writer, "### {}", file.display())?;
            for group in groups {
                let copies: Vec<String> = group
                    .duplicates
                    .iter()
                    .map(|b| {
                        format!("{}:{}-{}", b.file.display(), b.start_line, b.end_line)
                    })
                    .collect();
                writeln!(
                    self.writer,
                    "- lines {}-{} duplicated by {}",
                    group.origin.start_line,
                    group.origin.end_line,
                    copies.join(", ")
                )?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn write_test_failures(&mut self, results: &AnalysisResults) -> anyhow::Result<()> {
        if results.failing_test_count() == 0 {
            return Ok(());
        }

        writeln!(self.writer, "## Failing Tests")?;
        writeln!(self.writer)?;
        for case in results.test_cases.iter().filter(|c| !c.status().is_ok()) {
            writeln!(
                self.writer,
                "- `{}#{}` ({}){}",
                case.file().display(),
                case.name(),
                case.status(),
                case.message().map(|m| format!(": {m}")).unwrap_or_default()
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_cycles(&mut self, results: &AnalysisResults) -> anyhow::Result<()> {
        if results.dependency_cycles.is_empty() {
            return Ok(());
        }

        writeln!(self.writer, "## Dependency Cycles")?;
        writeln!(self.writer)?;
        for cycle in &results.dependency_cycles {
            let files: Vec<String> = cycle.files.iter().map(|f| f.display().to_string()).collect();
            writeln!(self.writer, "- {}", files.join(" -> "))?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct TerminalWriter;

impl Default for TerminalWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalWriter {
    pub fn new() -> Self {
        Self
    }
}

impl OutputWriter for TerminalWriter {
    fn write_results(&mut self, results: &AnalysisResults) -> anyhow::Result<()> {
        print_header();
        print_summary(results);
        print_issue_table(results);
        print_cycles(results);
        print_pass_fail_status(results);
        Ok(())
    }
}

fn print_header() {
    println!("{}", "Analysis Report".bold().blue());
    println!("{}", "===============".blue());
    println!();
}

fn print_summary(results: &AnalysisResults) {
    println!("{} Summary:", "📊".bold());
    println!("  Files analyzed: {}", results.project.files);
    println!("  Languages: {}", results.project.languages.join(", "));
    println!(
        "  Sensors: {} run, {} skipped, {} failed",
        results
            .sensors
            .iter()
            .filter(|s| matches!(s.status, crate::report::SensorStatus::Executed))
            .count(),
        results
            .sensors
            .iter()
            .filter(|s| matches!(s.status, crate::report::SensorStatus::Skipped { .. }))
            .count(),
        results.failed_sensors().len()
    );

    let issue_display = if results.issue_count() == 0 {
        results.issue_count().to_string().green().to_string()
    } else if blocker_count(results) > 0 {
        results.issue_count().to_string().red().to_string()
    } else {
        results.issue_count().to_string().yellow().to_string()
    };
    println!(
        "  Issues: {issue_display} ({} suppressed)",
        results.suppressed_issues
    );
    println!(
        "  Tests: {} ({} failing)",
        results.test_count(),
        results.failing_test_count()
    );
    println!(
        "  Duplication: {} files, cycles: {}",
        results.duplicated_file_count(),
        results.dependency_cycles.len()
    );
    println!("  Duration: {}ms", results.duration_ms);
    println!();
}

fn print_issue_table(results: &AnalysisResults) {
    if results.issues.is_empty() {
        return;
    }

    println!("{} Issues (top 10):", "⚠️".yellow());
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Severity", "Rule", "Location", "Message"]);
    for issue in top_issues(&results.issues, 10) {
        table.add_row(vec![
            issue.severity().to_string(),
            issue.rule().to_string(),
            location_of(issue),
            issue.message().to_string(),
        ]);
    }
    println!("{table}");
    println!();
}

fn print_cycles(results: &AnalysisResults) {
    if results.dependency_cycles.is_empty() {
        return;
    }

    println!(
        "{} Dependency cycles ({}):",
        "🔁".bold(),
        results.dependency_cycles.len()
    );
    for cycle in results.dependency_cycles.iter().take(5) {
        let files: Vec<String> = cycle.files.iter().map(|f| f.display().to_string()).collect();
        println!("  - {}", files.join(" -> "));
    }
    println!();
}

fn print_pass_fail_status(results: &AnalysisResults) {
    let pass = is_passing(results);
    let (symbol, status, message) = if pass {
        (
            "✓".green(),
            "PASS".green().bold(),
            "no blockers, failed sensors or failing tests",
        )
    } else {
        (
            "✗".red(),
            "FAIL".red().bold(),
            "blockers, failed sensors or failing tests present",
        )
    };

    println!("{symbol} Quality gate: {status} ({message})");
}

fn is_passing(results: &AnalysisResults) -> bool {
    !results.has_failures() && blocker_count(results) == 0 && results.failing_test_count() == 0
}

fn blocker_count(results: &AnalysisResults) -> usize {
    results
        .issues
        .iter()
        .filter(|i| i.severity() == Severity::Blocker)
        .count()
}

/// Most severe first, then by location, capped at `limit`.
fn top_issues(issues: &[Issue], limit: usize) -> Vec<&Issue> {
    let mut sorted: Vec<&Issue> = issues.iter().collect();
    sorted.sort_by(|a, b| {
        b.severity()
            .cmp(&a.severity())
            .then_with(|| a.component().to_string().cmp(&b.component().to_string()))
            .then(a.line().cmp(&b.line()))
    });
    sorted.truncate(limit);
    sorted
}

fn location_of(issue: &Issue) -> String {
    match issue.line() {
        Some(line) => format!("{}:{line}", issue.component()),
        None => issue.component().to_string(),
    }
}

pub fn create_writer(format: OutputFormat) -> Box<dyn OutputWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter::new(std::io::stdout())),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(std::io::stdout())),
        OutputFormat::Terminal => Box::new(TerminalWriter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ProjectSummary, SensorOutcome};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn sample_results() -> AnalysisResults {
        AnalysisResults {
            project: ProjectSummary {
                base_dir: PathBuf::from("/tmp/demo"),
                files: 2,
                languages: vec!["Rust".to_string()],
            },
            timestamp: chrono::Utc::now(),
            duration_ms: 12,
            sensors: vec![SensorOutcome::executed("lines", 3)],
            measures: Vec::new(),
            issues: Vec::new(),
            suppressed_issues: 1,
            highlighting: Vec::new(),
            symbol_tables: Vec::new(),
            duplications: BTreeMap::new(),
            test_cases: Vec::new(),
            test_coverage: Vec::new(),
            dependencies: Vec::new(),
            dependency_cycles: Vec::new(),
        }
    }

    #[test]
    fn test_markdown_writer_emits_summary() {
        let mut buffer = Vec::new();
        MarkdownWriter::new(&mut buffer)
            .write_results(&sample_results())
            .unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with("# Analysis Report"));
        assert!(output.contains("| Files | 2 |"));
        assert!(output.contains("| Suppressed issues | 1 |"));
        // No issues, so no issues section.
        assert!(!output.contains("## Issues"));
    }

    #[test]
    fn test_json_writer_round_trips() {
        let mut buffer = Vec::new();
        JsonWriter::new(&mut buffer)
            .write_results(&sample_results())
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["project"]["files"], 2);
        assert_eq!(value["sensors"][0]["status"], "executed");
    }
}
