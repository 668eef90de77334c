//! Rule: numeric_to_duration (Configurable)
//!
//! Setters that took a number of milliseconds (or seconds, minutes) take a
//! `java.time.Duration` in v2.
//!
//! Pattern:
//! ```java
//! // Before
//! new ClientConfiguration().withSocketTimeout(5000)
//!
//! // After
//! new ClientConfiguration().socketTimeout(Duration.ofMillis(5000))
//! ```

use sdkmig_core::ast::*;
use sdkmig_core::{visit, Edit, Visitor};

use crate::imports::ImportEditor;
use crate::patterns::{select, MethodPattern};
use crate::recipe::RecipeTables;
use crate::registry::{Category, ConfigError, Rule, RuleError};
use crate::resolve::TypeResolver;
use crate::sdk_types::DURATION;

/// Unit of the numeric argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millis,
    Seconds,
    Minutes,
}

impl TimeUnit {
    pub fn parse(method: &str, unit: &str) -> Result<Self, ConfigError> {
        match unit {
            "millis" => Ok(TimeUnit::Millis),
            "seconds" => Ok(TimeUnit::Seconds),
            "minutes" => Ok(TimeUnit::Minutes),
            _ => Err(ConfigError::UnsupportedTimeUnit {
                method: method.to_string(),
                unit: unit.to_string(),
            }),
        }
    }

    /// `Duration` factory for this unit
    pub fn factory(&self) -> &'static str {
        match self {
            TimeUnit::Millis => "ofMillis",
            TimeUnit::Seconds => "ofSeconds",
            TimeUnit::Minutes => "ofMinutes",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DurationMapping {
    pub pattern: MethodPattern,
    pub new_name: String,
    pub unit: TimeUnit,
}

/// Configuration for the numeric_to_duration rule
#[derive(Debug, Clone, Default)]
pub struct NumericToDurationConfig {
    pub mappings: Vec<DurationMapping>,
}

impl NumericToDurationConfig {
    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        let mut mappings = Vec::new();
        for entry in &tables.duration_setters {
            mappings.push(DurationMapping {
                pattern: MethodPattern::parse(&entry.method)?,
                new_name: entry.new_name.clone(),
                unit: TimeUnit::parse(&entry.method, &entry.unit)?,
            });
        }
        Ok(Self { mappings })
    }
}

pub fn check_numeric_to_duration_with_config(
    unit: &CompilationUnit,
    source: &str,
    config: &NumericToDurationConfig,
) -> Vec<Edit> {
    if config.mappings.is_empty() {
        return Vec::new();
    }

    let resolver = TypeResolver::new(unit, source);
    let mut checker = NumericToDurationChecker {
        source,
        config,
        resolver: &resolver,
        imports: ImportEditor::new(unit, source),
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);

    let NumericToDurationChecker { imports, mut edits, .. } = checker;
    let import_edits = imports.finish(&edits);
    edits.extend(import_edits);
    edits
}

struct NumericToDurationChecker<'a, 'r> {
    source: &'a str,
    config: &'r NumericToDurationConfig,
    resolver: &'r TypeResolver<'a>,
    imports: ImportEditor<'a>,
    edits: Vec<Edit>,
}

impl<'a> NumericToDurationChecker<'a, '_> {
    fn get_text(&self, span: sdkmig_core::Span) -> &'a str {
        span.text(self.source)
    }

    fn check_call(&mut self, call: &MethodInvocation) {
        if call.args.len() != 1 {
            return;
        }
        let candidates: Vec<(usize, _)> = self
            .config
            .mappings
            .iter()
            .enumerate()
            .filter(|(_, m)| m.pattern.matches_name(&call.name.name))
            .map(|(i, m)| (i, m.pattern.match_call(call, self.resolver)))
            .collect();
        let Some(index) = select(&candidates) else {
            return;
        };
        let mapping = &self.config.mappings[index];
        let arg = &call.args.items[0];
        let wrapped = format!("Duration.{}({})", mapping.unit.factory(), self.get_text(arg.span()));

        self.edits.push(Edit::new(
            call.name.span,
            mapping.new_name.clone(),
            format!("Rename {}() to {}()", call.name.name, mapping.new_name),
        ));
        self.edits.push(Edit::new(
            arg.span(),
            wrapped,
            format!("Wrap {}() argument in Duration", mapping.new_name),
        ));
        self.imports.maybe_add_import(DURATION);
    }
}

impl<'a> Visitor<'a> for NumericToDurationChecker<'a, '_> {
    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        if let Expr::MethodInvocation(call) = expr {
            self.check_call(call);
        }
        true
    }
}

pub struct NumericToDurationRule {
    config: NumericToDurationConfig,
}

impl NumericToDurationRule {
    pub fn new(config: NumericToDurationConfig) -> Self {
        Self { config }
    }

    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        Ok(Self::new(NumericToDurationConfig::from_tables(tables)?))
    }
}

impl Rule for NumericToDurationRule {
    fn name(&self) -> &'static str {
        "numeric_to_duration"
    }

    fn description(&self) -> &'static str {
        "Rename numeric timeout setters and wrap their value in java.time.Duration"
    }

    fn category(&self) -> Category {
        Category::CallPatterns
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_numeric_to_duration_with_config(unit, source, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::load_tables_from_string;
    use sdkmig_core::{apply_edits, parse_java};

    fn transform(source: &str) -> String {
        let config = NumericToDurationConfig::from_tables(&RecipeTables::builtin().unwrap()).unwrap();
        let unit = parse_java(source).unwrap();
        let edits = check_numeric_to_duration_with_config(&unit, source, &config);
        apply_edits(source, &edits).unwrap()
    }

    #[test]
    fn test_timeouts_become_durations() {
        let source = r#"import com.amazonaws.ClientConfiguration;

class A {
    ClientConfiguration config(int timeout) {
        return new ClientConfiguration()
            .withConnectionTimeout(timeout)
            .withSocketTimeout(5000)
            .withConnectionTTL(60000L);
    }
}
"#;
        let result = transform(source);
        assert!(result.contains(".connectionTimeout(Duration.ofMillis(timeout))"));
        assert!(result.contains(".socketTimeout(Duration.ofMillis(5000))"));
        assert!(result.contains(".connectionTimeToLive(Duration.ofMillis(60000L))"));
        assert!(result.contains("import java.time.Duration;"));
        assert_eq!(result.matches("import java.time.Duration;").count(), 1);
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let source = r#"import com.amazonaws.ClientConfiguration;

class A {
    ClientConfiguration config() {
        return new ClientConfiguration().withRequestTimeout(100);
    }
}
"#;
        let once = transform(source);
        assert!(once.contains(".apiCallAttemptTimeout(Duration.ofMillis(100))"));
        assert_eq!(transform(&once), once);
    }

    #[test]
    fn test_configured_units() {
        let tables = load_tables_from_string(
            r#"
duration_setters:
  - method: "com.acme.Poller withIntervalSeconds(int)"
    new_name: interval
    unit: seconds
"#,
        )
        .unwrap();
        let config = NumericToDurationConfig::from_tables(&tables).unwrap();
        let source = r#"import com.acme.Poller;

class A {
    void f(Poller poller) {
        poller.withIntervalSeconds(30);
    }
}
"#;
        let unit = parse_java(source).unwrap();
        let edits = check_numeric_to_duration_with_config(&unit, source, &config);
        let result = apply_edits(source, &edits).unwrap();
        assert!(result.contains("poller.interval(Duration.ofSeconds(30));"));
    }

    #[test]
    fn test_unknown_unit_is_config_error() {
        let err = TimeUnit::parse("com.acme.Poller withInterval(int)", "hours").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedTimeUnit { .. }));
    }
}
