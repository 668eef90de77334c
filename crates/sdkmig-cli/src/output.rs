//! Reporting for sdkmig runs
//!
//! Text output shows a colored line diff per file followed by the applied
//! edits grouped by rule and the lines that received a migration comment.
//! `diff` prints patch-compatible unified diffs; `json` prints one document
//! with every file report and a per-rule summary.

use std::collections::BTreeMap;
use std::path::Path;

use colored::*;
use sdkmig_rules::comments;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Diff,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "diff" => Some(OutputFormat::Diff),
            _ => None,
        }
    }
}

/// One applied edit, positioned in the text its rule saw
#[derive(Debug, Clone, Serialize)]
pub struct EditInfo {
    pub rule: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// What one file contributes to the report
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReport {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<EditInfo>,
    /// Lines of the migrated file that carry a new migration comment
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub manual_review: Vec<usize>,
    /// Rules that hit the pass limit on this file
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub capped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    /// Report for a migrated file; `old`/`new` locate the added migration comments
    pub fn migrated(path: &Path, edits: Vec<EditInfo>, capped: Vec<String>, old: &str, new: &str) -> Self {
        Self {
            path: path.display().to_string(),
            edits,
            manual_review: new_comment_lines(old, new),
            capped,
            error: None,
        }
    }

    pub fn unchanged(path: &Path) -> Self {
        Self {
            path: path.display().to_string(),
            ..Default::default()
        }
    }

    pub fn failed(path: &Path, error: String) -> Self {
        Self {
            path: path.display().to_string(),
            error: Some(error),
            ..Default::default()
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.edits.is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Edit counts per rule, in the order the rules ran
    pub fn rule_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for edit in &self.edits {
            match counts.iter_mut().find(|(rule, _)| *rule == edit.rule) {
                Some((_, count)) => *count += 1,
                None => counts.push((edit.rule.as_str(), 1)),
            }
        }
        counts
    }
}

/// 1-based lines of `new` that were added and hold a migration comment
fn new_comment_lines(old: &str, new: &str) -> Vec<usize> {
    TextDiff::from_lines(old, new)
        .iter_all_changes()
        .filter(|change| change.tag() == ChangeTag::Insert && comments::has_comment(change.value()))
        .filter_map(|change| change.new_index().map(|index| index + 1))
        .collect()
}

/// Run totals
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_processed: usize,
    pub files_with_changes: usize,
    pub total_edits: usize,
    /// Migration comments left for a person to resolve
    pub manual_review: usize,
    /// Files where some rule hit the pass limit
    pub capped_files: usize,
    pub errors: usize,
    /// Edits per rule across all files
    pub rules: BTreeMap<String, usize>,
}

/// Full JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub summary: Summary,
    pub files: Vec<FileReport>,
}

/// Accumulates file reports and prints them in the selected format
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    files: Vec<FileReport>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            files: Vec::new(),
            summary: Summary::default(),
        }
    }

    fn record(&mut self, report: FileReport) {
        self.summary.files_processed += 1;
        if report.has_error() {
            self.summary.errors += 1;
        }
        if report.has_changes() {
            self.summary.files_with_changes += 1;
            self.summary.total_edits += report.edits.len();
            for (rule, count) in report.rule_counts() {
                *self.summary.rules.entry(rule.to_string()).or_default() += count;
            }
        }
        self.summary.manual_review += report.manual_review.len();
        if !report.capped.is_empty() {
            self.summary.capped_files += 1;
        }
        self.files.push(report);
    }

    /// A file with pending changes (check mode)
    pub fn report_check(&mut self, report: FileReport, old_source: &str, new_source: &str) {
        match self.format {
            OutputFormat::Text => {
                println!("{}", report.path.bold());
                print_diff(old_source, new_source);
                println!();
                self.print_details(&report);
            }
            OutputFormat::Diff => print_unified_diff(&report.path, old_source, new_source),
            OutputFormat::Json => {}
        }
        self.record(report);
    }

    /// A file that was rewritten in place
    pub fn report_fix(&mut self, report: FileReport) {
        if self.format == OutputFormat::Text {
            println!("{}", report.path.bold());
            println!("  {} Migrated with {} edit(s)", "OK".green(), report.edits.len());
            self.print_details(&report);
        }
        self.record(report);
    }

    /// A file no rule changed
    pub fn report_skipped(&mut self, path: &Path) {
        if self.verbose && self.format == OutputFormat::Text {
            println!("{}: nothing to migrate", path.display());
        }
        self.record(FileReport::unchanged(path));
    }

    pub fn report_error(&mut self, path: &Path, error: &str) {
        if self.format == OutputFormat::Text {
            eprintln!("{}: {} - {}", "Warning".yellow(), path.display(), error);
        }
        self.record(FileReport::failed(path, error.to_string()));
    }

    /// Per-rule edit counts, then lines needing a manual look
    fn print_details(&self, report: &FileReport) {
        for (rule, count) in report.rule_counts() {
            println!("  {} {} {} edit(s)", "->".green(), format!("[{}]", rule).dimmed(), count);
            if self.verbose {
                for edit in report.edits.iter().filter(|e| e.rule == rule) {
                    println!("       {}:{} {}", edit.line, edit.column, edit.message);
                }
            }
        }
        for line in &report.manual_review {
            println!("  {} line {}: migration comment needs review", "!".yellow(), line);
        }
        for rule in &report.capped {
            println!(
                "  {} [{}] still had edits at the pass limit",
                "!".red(),
                rule
            );
        }
        println!();
    }

    /// Print the summary (text) or the whole document (json)
    pub fn finish(self, check_mode: bool) {
        match self.format {
            OutputFormat::Text => {
                println!("{}", "Summary".bold().underline());
                println!("  Files processed: {}", self.summary.files_processed);
                println!("  Files with changes: {}", self.summary.files_with_changes);
                println!("  Total edits: {}", self.summary.total_edits);
                for (rule, count) in &self.summary.rules {
                    println!("    {:<32} {}", rule, count);
                }
                if self.summary.manual_review > 0 {
                    println!(
                        "  {}: {}",
                        "Migration comments to review".yellow(),
                        self.summary.manual_review
                    );
                }
                if self.summary.capped_files > 0 {
                    println!(
                        "  {}: {} (raise [migration] max_passes)",
                        "Files stopped at the pass limit".red(),
                        self.summary.capped_files
                    );
                }
                if self.summary.errors > 0 {
                    println!("  Errors: {}", self.summary.errors);
                }
                if check_mode && self.summary.total_edits > 0 {
                    println!();
                    println!("{}", "Run with --fix to apply changes".yellow());
                }
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    summary: self.summary,
                    files: self.files,
                };
                match serde_json::to_string_pretty(&output) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("{}: failed to serialize results: {}", "Error".red(), e),
                }
            }
            // Patch output stays applicable with `patch -p1`
            OutputFormat::Diff => {}
        }
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

/// Changed lines only, colored
fn print_diff(old: &str, new: &str) {
    for line in diff::lines(old, new) {
        match line {
            diff::Result::Left(l) => println!("  {}", format!("- {}", l).red()),
            diff::Result::Right(r) => println!("  {}", format!("+ {}", r).green()),
            diff::Result::Both(_, _) => {}
        }
    }
}

/// `diff -u` compatible output
fn print_unified_diff(path: &str, old: &str, new: &str) {
    let diff = TextDiff::from_lines(old, new);
    println!("--- a/{}", path);
    println!("+++ b/{}", path);
    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        println!("{}", hunk.header());
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            print!("{}{}", sign, change);
            if change.missing_newline() {
                println!();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(rule: &str) -> EditInfo {
        EditInfo {
            rule: rule.to_string(),
            line: 12,
            column: 9,
            message: "Replace new SendMessageRequest() with SendMessageRequest.builder()".to_string(),
        }
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("text"), Some(OutputFormat::Text));
        assert_eq!(OutputFormat::from_str("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("diff"), Some(OutputFormat::Diff));
        assert_eq!(OutputFormat::from_str("xml"), None);
    }

    #[test]
    fn test_manual_review_lines_are_new_comments_only() {
        let old = "class A {\n    /*AWS SDK for Java v2 migration: old*/ f();\n    s3.setRegion(r);\n}\n";
        let new = "class A {\n    /*AWS SDK for Java v2 migration: old*/ f();\n    /*AWS SDK for Java v2 migration: setRegion is not supported*/s3.setRegion(r);\n}\n";
        let report = FileReport::migrated(
            Path::new("A.java"),
            vec![edit("s3_unsupported_comments")],
            Vec::new(),
            old,
            new,
        );
        assert_eq!(report.manual_review, vec![3]);
    }

    #[test]
    fn test_rule_counts_keep_pipeline_order() {
        let report = FileReport {
            path: "A.java".to_string(),
            edits: vec![edit("change_sdk_type"), edit("enum_casing"), edit("change_sdk_type")],
            ..Default::default()
        };
        assert_eq!(report.rule_counts(), vec![("change_sdk_type", 2), ("enum_casing", 1)]);
    }

    #[test]
    fn test_summary_counts() {
        let mut reporter = Reporter::new(OutputFormat::Json, false);
        reporter.report_fix(FileReport {
            path: "A.java".to_string(),
            edits: vec![edit("change_sdk_type"), edit("enum_casing")],
            manual_review: vec![7],
            capped: vec!["setter_to_builder".to_string()],
            error: None,
        });
        reporter.report_skipped(Path::new("B.java"));
        reporter.report_error(Path::new("C.java"), "parse error");

        let summary = reporter.summary();
        assert_eq!(summary.files_processed, 3);
        assert_eq!(summary.files_with_changes, 1);
        assert_eq!(summary.total_edits, 2);
        assert_eq!(summary.manual_review, 1);
        assert_eq!(summary.capped_files, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.rules.get("enum_casing"), Some(&1));
    }

    #[test]
    fn test_json_serialization() {
        let mut rules = BTreeMap::new();
        rules.insert("new_class_to_builder".to_string(), 1);
        let output = JsonOutput {
            version: "0.1.0".to_string(),
            summary: Summary {
                files_processed: 4,
                files_with_changes: 1,
                total_edits: 1,
                rules,
                ..Default::default()
            },
            files: vec![
                FileReport {
                    path: "Example.java".to_string(),
                    edits: vec![edit("new_class_to_builder")],
                    ..Default::default()
                },
                FileReport::unchanged(Path::new("Clean.java")),
            ],
        };

        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"files_processed\":4"));
        assert!(json.contains("\"rules\":{\"new_class_to_builder\":1}"));
        assert!(json.contains("\"line\":12"));
        assert!(json.contains("{\"path\":\"Clean.java\"}"));
    }
}
