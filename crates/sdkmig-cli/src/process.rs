//! File processing logic for sdkmig

use anyhow::{Context, Result};
use std::path::Path;

use sdkmig_core::logging;
use sdkmig_rules::{migrate_source, MigrationError, MigrationSettings, Rule};

use crate::output::EditInfo;

/// Result of processing a single file
pub struct ProcessResult {
    /// Edits that were applied, in pipeline order
    pub edits: Vec<EditInfo>,
    /// Original source code
    pub old_source: String,
    /// New source code after edits (only if edits were found)
    pub new_source: Option<String>,
    /// Rules that still produced edits when the pass limit was reached
    pub capped: Vec<String>,
}

/// Migrate a single Java file in memory
///
/// Returns `Ok(None)` when the file does not parse.
pub fn process_file(
    path: &Path,
    rules: &[&dyn Rule],
    settings: &MigrationSettings,
) -> Result<Option<ProcessResult>> {
    let source_code = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let outcome = match migrate_source(&source_code, rules, settings) {
        Ok(outcome) => outcome,
        Err(MigrationError::Parse(err)) => {
            logging::log_file_error(path, &err.to_string());
            return Ok(None);
        }
        Err(err) => {
            logging::log_file_error(path, &err.to_string());
            return Err(err).with_context(|| format!("Failed to migrate {}", path.display()));
        }
    };
    logging::log_file_result(path, &outcome.counts());

    if !outcome.is_changed() {
        return Ok(Some(ProcessResult {
            edits: vec![],
            old_source: source_code,
            new_source: None,
            capped: Vec::new(),
        }));
    }

    let edits = outcome
        .applied
        .iter()
        .map(|edit| EditInfo {
            rule: edit.rule.to_string(),
            line: edit.line,
            column: edit.column,
            message: edit.message.clone(),
        })
        .collect();

    Ok(Some(ProcessResult {
        edits,
        old_source: source_code,
        new_source: Some(outcome.source),
        capped: outcome.capped.iter().map(|rule| rule.to_string()).collect(),
    }))
}

/// Write the processed result to the file
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_rules::RuleRegistry;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_process_file_reports_rule_names() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Example.java");
        fs::write(
            &path,
            "import com.amazonaws.services.sqs.model.SendMessageRequest;\n\nclass Example {\n    SendMessageRequest request;\n}\n",
        )
        .unwrap();

        let registry = RuleRegistry::with_defaults().unwrap();
        let rules: Vec<&dyn Rule> = registry.get_enabled(&["change_sdk_type".to_string()].into_iter().collect());
        let result = process_file(&path, &rules, &MigrationSettings::default())
            .unwrap()
            .unwrap();

        assert!(!result.edits.is_empty());
        assert!(result.capped.is_empty());
        assert!(result.edits.iter().all(|e| e.rule == "change_sdk_type"));
        assert!(result
            .new_source
            .unwrap()
            .contains("import software.amazon.awssdk.services.sqs.model.SendMessageRequest;"));
        // The file itself is untouched until write_file
        assert!(fs::read_to_string(&path).unwrap().contains("com.amazonaws"));
    }

    #[test]
    fn test_parse_error_is_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Broken.java");
        fs::write(&path, "class Broken { void f( }").unwrap();

        let registry = RuleRegistry::with_defaults().unwrap();
        let rules: Vec<&dyn Rule> = registry.get_enabled(&["change_sdk_type".to_string()].into_iter().collect());
        assert!(process_file(&path, &rules, &MigrationSettings::default())
            .unwrap()
            .is_none());
    }
}
