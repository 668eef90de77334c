//! Migration pipeline over one Java source
//!
//! Rules run in registry order. Each rule is re-run on its own output until
//! it proposes nothing more, up to `max_passes`. Within a pass, edits that
//! overlap an earlier-kept edit are dropped and picked up again next pass.

use std::path::PathBuf;

use sdkmig_core::{apply_edits, logging, parse_java, retain_non_conflicting, EditError, ParseError};
use thiserror::Error;

use crate::recipe::load_recipes;
use crate::registry::{ConfigError, Rule, RuleError, RuleRegistry};

pub const DEFAULT_MAX_PASSES: usize = 8;

#[derive(Debug, Clone)]
pub struct MigrationSettings {
    /// Packages of in-house SDK forks that must not be rewritten
    pub excluded_namespaces: Vec<String>,
    /// Extra recipe files merged after the built-in tables
    pub recipes: Vec<PathBuf>,
    pub max_passes: usize,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            excluded_namespaces: Vec::new(),
            recipes: Vec::new(),
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl MigrationSettings {
    /// Build the rule pipeline for these settings
    pub fn registry(&self) -> Result<RuleRegistry, ConfigError> {
        if self.max_passes == 0 {
            return Err(ConfigError::Validation("max_passes must be at least 1".to_string()));
        }
        let tables = load_recipes(&self.recipes)?;
        RuleRegistry::from_tables(&tables, &self.excluded_namespaces)
    }
}

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("failed to parse Java source: {0}")]
    Parse(#[from] ParseError),

    #[error("{rule}: failed to apply edits: {source}")]
    Edit {
        rule: &'static str,
        #[source]
        source: EditError,
    },

    #[error("{rule}: {source}")]
    Rule {
        rule: &'static str,
        #[source]
        source: RuleError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// One edit as applied, positioned in the text the rule saw
#[derive(Debug, Clone)]
pub struct AppliedEdit {
    pub rule: &'static str,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    pub source: String,
    pub applied: Vec<AppliedEdit>,
    /// Rules stopped by the pass limit while still proposing edits
    pub capped: Vec<&'static str>,
}

impl MigrationOutcome {
    pub fn is_changed(&self) -> bool {
        !self.applied.is_empty()
    }

    /// Applied edits per rule, in pipeline order
    pub fn counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for edit in &self.applied {
            match counts.iter_mut().find(|(rule, _)| rule == edit.rule) {
                Some((_, count)) => *count += 1,
                None => counts.push((edit.rule.to_string(), 1)),
            }
        }
        counts
    }
}

/// Run `rules` over `source` and return the migrated text
pub fn migrate_source(
    source: &str,
    rules: &[&dyn Rule],
    settings: &MigrationSettings,
) -> Result<MigrationOutcome, MigrationError> {
    let mut text = source.to_string();
    let mut applied = Vec::new();
    let mut capped = Vec::new();

    // Reject unparsable input up front, even when no rule would touch it
    parse_java(&text)?;

    for rule in rules {
        let mut passes = 0;
        loop {
            if passes == settings.max_passes {
                logging::log(&format!(
                    "{} still proposes edits after {} passes; stopping",
                    rule.name(),
                    passes
                ));
                capped.push(rule.name());
                break;
            }

            let unit = parse_java(&text)?;
            let edits = rule.check(&unit, &text).map_err(|source| MigrationError::Rule {
                rule: rule.name(),
                source,
            })?;
            if edits.is_empty() {
                break;
            }

            let (edits, deferred) = retain_non_conflicting(edits);
            if deferred > 0 {
                logging::log(&format!(
                    "{}: {} overlapping edits deferred to the next pass",
                    rule.name(),
                    deferred
                ));
            }

            let migrated = apply_edits(&text, &edits).map_err(|source| MigrationError::Edit {
                rule: rule.name(),
                source,
            })?;
            if migrated == text {
                break;
            }

            applied.extend(edits.iter().map(|edit| {
                let (line, column) = offset_to_line_column(&text, edit.span.start);
                AppliedEdit {
                    rule: rule.name(),
                    line,
                    column,
                    message: edit.message.clone(),
                }
            }));
            text = migrated;
            passes += 1;
        }
    }

    Ok(MigrationOutcome {
        source: text,
        applied,
        capped,
    })
}

/// Convert byte offset to line and column numbers (1-based)
pub fn offset_to_line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }

    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_core::ast::CompilationUnit;
    use sdkmig_core::{Edit, Span};

    use crate::registry::Category;

    /// Appends one marker per pass, forever
    struct Unbounded;

    impl Rule for Unbounded {
        fn name(&self) -> &'static str {
            "unbounded"
        }
        fn description(&self) -> &'static str {
            "test rule"
        }
        fn category(&self) -> Category {
            Category::Annotations
        }
        fn check(&self, _unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
            Ok(vec![Edit::insert(source.len(), "//x\n", "append marker")])
        }
    }

    /// Two overlapping edits; only one can land per pass
    struct Overlapping;

    impl Rule for Overlapping {
        fn name(&self) -> &'static str {
            "overlapping"
        }
        fn description(&self) -> &'static str {
            "test rule"
        }
        fn category(&self) -> Category {
            Category::Types
        }
        fn check(&self, _unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
            let mut edits = Vec::new();
            if let Some(start) = source.find("Alpha") {
                edits.push(Edit::new(Span::new(start, start + 5), "Beta", "Alpha to Beta"));
            }
            if let Some(start) = source.find("lpha Gamma") {
                edits.push(Edit::new(Span::new(start, start + 10), "lpha Delta", "Gamma to Delta"));
            }
            Ok(edits)
        }
    }

    #[test]
    fn test_offset_to_line_column() {
        let source = "line1\nline2\nline3";
        assert_eq!(offset_to_line_column(source, 0), (1, 1));
        assert_eq!(offset_to_line_column(source, 5), (1, 6));
        assert_eq!(offset_to_line_column(source, 6), (2, 1));
        assert_eq!(offset_to_line_column(source, 12), (3, 1));
    }

    #[test]
    fn test_pass_limit() {
        let settings = MigrationSettings {
            max_passes: 3,
            ..Default::default()
        };
        let outcome = migrate_source("class A {}\n", &[&Unbounded], &settings).unwrap();
        assert_eq!(outcome.source, "class A {}\n//x\n//x\n//x\n");
        assert_eq!(outcome.capped, vec!["unbounded"]);
        assert_eq!(outcome.counts(), vec![("unbounded".to_string(), 3)]);
    }

    #[test]
    fn test_overlapping_edits_are_deferred() {
        let source = "class A { /* Alpha Gamma */ }\n";
        let outcome = migrate_source(source, &[&Overlapping], &MigrationSettings::default()).unwrap();
        assert_eq!(outcome.source, "class A { /* Beta Gamma */ }\n");
        assert!(outcome.capped.is_empty());
    }

    #[test]
    fn test_default_pipeline() {
        let settings = MigrationSettings::default();
        let registry = settings.registry().unwrap();
        let rules: Vec<&dyn Rule> = registry.get_enabled(
            &registry.all_names().iter().map(|s| s.to_string()).collect(),
        );
        let source = r#"import com.amazonaws.services.sqs.model.SendMessageRequest;

class A {
    Object f() {
        return new SendMessageRequest().withQueueUrl("url").withMessageBody("hi");
    }
}
"#;
        let outcome = migrate_source(source, &rules, &settings).unwrap();
        assert!(outcome.is_changed());
        assert!(outcome
            .source
            .contains(r#"return SendMessageRequest.builder().queueUrl("url").messageBody("hi").build();"#));
        assert!(outcome.source.contains("import software.amazon.awssdk.services.sqs.model.SendMessageRequest;"));
    }

    #[test]
    fn test_zero_passes_rejected() {
        let settings = MigrationSettings {
            max_passes: 0,
            ..Default::default()
        };
        assert!(matches!(settings.registry(), Err(ConfigError::Validation(_))));
    }
}
