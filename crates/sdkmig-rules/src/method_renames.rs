//! Rule: method_renames (Configurable)
//!
//! Renames calls matched by a method pattern, keeping receiver and arguments.
//!
//! Pattern:
//! ```java
//! // Before
//! AmazonS3ClientBuilder.standard().withRegion("us-west-2").withCredentials(provider)
//!
//! // After
//! AmazonS3ClientBuilder.standard().region("us-west-2").credentialsProvider(provider)
//! ```
//!
//! When several entries share a method name (overloads), the call is only
//! renamed if argument types single out one entry.

use sdkmig_core::ast::*;
use sdkmig_core::{visit, Edit, Visitor};

use crate::patterns::{select, MethodPattern};
use crate::recipe::RecipeTables;
use crate::registry::{Category, ConfigError, Rule, RuleError};
use crate::resolve::TypeResolver;

/// A single rename mapping
#[derive(Debug, Clone)]
pub struct MethodRenameMapping {
    pub pattern: MethodPattern,
    pub new_name: String,
}

/// Configuration for the method_renames rule
#[derive(Debug, Clone, Default)]
pub struct MethodRenamesConfig {
    pub mappings: Vec<MethodRenameMapping>,
}

impl MethodRenamesConfig {
    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        let mappings = tables
            .method_renames
            .iter()
            .map(|entry| {
                Ok(MethodRenameMapping {
                    pattern: MethodPattern::parse(&entry.method)?,
                    new_name: entry.new_name.clone(),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { mappings })
    }
}

pub fn check_method_renames_with_config(
    unit: &CompilationUnit,
    source: &str,
    config: &MethodRenamesConfig,
) -> Vec<Edit> {
    if config.mappings.is_empty() {
        return Vec::new();
    }

    let resolver = TypeResolver::new(unit, source);
    let mut checker = MethodRenamesChecker {
        config,
        resolver: &resolver,
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);
    checker.edits
}

struct MethodRenamesChecker<'a, 'r> {
    config: &'r MethodRenamesConfig,
    resolver: &'r TypeResolver<'a>,
    edits: Vec<Edit>,
}

impl MethodRenamesChecker<'_, '_> {
    fn check_call(&mut self, call: &MethodInvocation) {
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
        if mapping.new_name == call.name.name {
            return;
        }
        self.edits.push(Edit::new(
            call.name.span,
            mapping.new_name.clone(),
            format!("Rename {}() to {}()", call.name.name, mapping.new_name),
        ));
    }
}

impl<'a> Visitor<'a> for MethodRenamesChecker<'a, '_> {
    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        if let Expr::MethodInvocation(call) = expr {
            self.check_call(call);
        }
        true
    }
}

pub struct MethodRenamesRule {
    config: MethodRenamesConfig,
}

impl MethodRenamesRule {
    pub fn new(config: MethodRenamesConfig) -> Self {
        Self { config }
    }

    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        Ok(Self::new(MethodRenamesConfig::from_tables(tables)?))
    }
}

impl Rule for MethodRenamesRule {
    fn name(&self) -> &'static str {
        "method_renames"
    }

    fn description(&self) -> &'static str {
        "Rename v1 methods whose v2 equivalent has a different name"
    }

    fn category(&self) -> Category {
        Category::CallPatterns
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_method_renames_with_config(unit, source, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_core::{apply_edits, parse_java};

    fn check_java_with_config(source: &str, config: &MethodRenamesConfig) -> Vec<Edit> {
        let unit = parse_java(source).unwrap();
        check_method_renames_with_config(&unit, source, config)
    }

    fn transform(source: &str) -> String {
        let config = MethodRenamesConfig::from_tables(&RecipeTables::builtin().unwrap()).unwrap();
        apply_edits(source, &check_java_with_config(source, &config)).unwrap()
    }

    fn make_config(entries: &[(&str, &str)]) -> MethodRenamesConfig {
        MethodRenamesConfig {
            mappings: entries
                .iter()
                .map(|(pattern, new_name)| MethodRenameMapping {
                    pattern: MethodPattern::parse(pattern).unwrap(),
                    new_name: new_name.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_client_builder_chain() {
        let source = r#"import com.amazonaws.services.s3.AmazonS3;
import com.amazonaws.services.s3.AmazonS3ClientBuilder;

class A {
    AmazonS3 build(Object provider, Object config) {
        return AmazonS3ClientBuilder.standard()
            .withRegion("us-west-2")
            .withCredentials(provider)
            .withClientConfiguration(config)
            .build();
    }
}
"#;
        let result = transform(source);
        assert!(result.contains(".region(\"us-west-2\")"));
        assert!(result.contains(".credentialsProvider(provider)"));
        assert!(result.contains(".overrideConfiguration(config)"));
        assert!(result.contains(".build();"));
    }

    #[test]
    fn test_client_configuration() {
        let source = r#"import com.amazonaws.ClientConfiguration;

class A {
    ClientConfiguration config() {
        return new ClientConfiguration().withMaxConnections(100).withTcpKeepAlive(true);
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("new ClientConfiguration().maxConnections(100).tcpKeepAlive(true)"));
    }

    #[test]
    fn test_argument_types_decide_overloads() {
        let source = r#"import com.amazonaws.services.s3.AmazonS3;

class A {
    void f(AmazonS3 s3, Object request) {
        s3.getObjectMetadata("bucket", "key");
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("s3.getObjectMetadata(\"bucket\", \"key\")"));
    }

    #[test]
    fn test_ambiguous_overloads_are_skipped() {
        let source = r#"import com.acme.Legacy;

class A {
    void f(Legacy legacy, Object unknown) {
        legacy.send(unknown);
    }
}
"#;
        let config = make_config(&[
            ("com.acme.Legacy send(String)", "sendText"),
            ("com.acme.Legacy send(int)", "sendNumber"),
        ]);
        assert!(check_java_with_config(source, &config).is_empty());

        let typed = source.replace("Object unknown", "String unknown");
        let edits = check_java_with_config(&typed, &config);
        let result = apply_edits(&typed, &edits).unwrap();
        assert!(result.contains("legacy.sendText(unknown);"));
    }

    #[test]
    fn test_unrelated_receiver_untouched() {
        let source = r#"class A {
    void f(Builder b) {
        b.withRegion("x");
    }
}
"#;
        let config = MethodRenamesConfig::from_tables(&RecipeTables::builtin().unwrap()).unwrap();
        assert!(check_java_with_config(source, &config).is_empty());
    }
}
