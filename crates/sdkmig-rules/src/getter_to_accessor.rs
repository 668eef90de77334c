//! Rule: getter_to_accessor (Configurable)
//!
//! v2 model classes expose fluent accessors without the bean prefix.
//!
//! Pattern:
//! ```java
//! // Before
//! String bucket = request.getBucketName();
//! boolean more = listing.isTruncated();
//! String body = message.getBody();
//!
//! // After
//! String bucket = request.bucket();
//! boolean more = listing.isTruncated();
//! String body = message.body();
//! ```

use sdkmig_core::ast::*;
use sdkmig_core::{visit, Edit, Visitor};

use crate::naming::simple_name;
use crate::patterns::MemberRenames;
use crate::recipe::RecipeTables;
use crate::registry::{Category, ConfigError, Rule, RuleError};
use crate::resolve::TypeResolver;
use crate::sdk_types::is_v2_model;

/// Configuration for the getter_to_accessor rule
#[derive(Debug, Clone, Default)]
pub struct GetterToAccessorConfig {
    pub member_renames: MemberRenames,
}

impl GetterToAccessorConfig {
    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        Ok(Self {
            member_renames: MemberRenames::from_tables(tables)?,
        })
    }
}

pub fn check_getter_to_accessor_with_config(
    unit: &CompilationUnit,
    source: &str,
    config: &GetterToAccessorConfig,
) -> Vec<Edit> {
    if !source.contains(".get") && !source.contains(".is") {
        return Vec::new();
    }

    let resolver = TypeResolver::new(unit, source);
    let mut checker = GetterToAccessorChecker {
        config,
        resolver: &resolver,
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);
    checker.edits
}

struct GetterToAccessorChecker<'a, 'r> {
    config: &'r GetterToAccessorConfig,
    resolver: &'r TypeResolver<'a>,
    edits: Vec<Edit>,
}

impl GetterToAccessorChecker<'_, '_> {
    fn check_call(&mut self, call: &MethodInvocation) {
        let name = call.name.name.as_str();
        if !call.args.is_empty() || name == "getClass" || !(is_getter(name, "get") || is_getter(name, "is")) {
            return;
        }
        let Some(target) = call.target.as_deref() else {
            return;
        };
        let Some(ty) = self.resolver.type_of(target) else {
            return;
        };
        // Exceptions are handled by exception_accessors
        if ty.is_static || !is_v2_model(&ty.name) || simple_name(&ty.name).ends_with("Exception") {
            return;
        }

        let accessor = self.config.member_renames.member_name(&ty.name, name);
        if accessor == name {
            return;
        }
        self.edits.push(Edit::new(
            call.name.span,
            accessor.clone(),
            format!("Replace {}() with {}()", name, accessor),
        ));
    }
}

impl<'a> Visitor<'a> for GetterToAccessorChecker<'a, '_> {
    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        if let Expr::MethodInvocation(call) = expr {
            self.check_call(call);
        }
        true
    }
}

fn is_getter(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
}

pub struct GetterToAccessorRule {
    config: GetterToAccessorConfig,
}

impl GetterToAccessorRule {
    pub fn new(config: GetterToAccessorConfig) -> Self {
        Self { config }
    }

    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        Ok(Self::new(GetterToAccessorConfig::from_tables(tables)?))
    }
}

impl Rule for GetterToAccessorRule {
    fn name(&self) -> &'static str {
        "getter_to_accessor"
    }

    fn description(&self) -> &'static str {
        "Replace getX()/isX() on v2 model objects with fluent accessors"
    }

    fn category(&self) -> Category {
        Category::CallPatterns
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_getter_to_accessor_with_config(unit, source, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_core::{apply_edits, parse_java};

    fn check_java(source: &str) -> Vec<Edit> {
        let config = GetterToAccessorConfig::from_tables(&RecipeTables::builtin().unwrap()).unwrap();
        let unit = parse_java(source).unwrap();
        check_getter_to_accessor_with_config(&unit, source, &config)
    }

    fn transform(source: &str) -> String {
        apply_edits(source, &check_java(source)).unwrap()
    }

    #[test]
    fn test_getters_become_accessors() {
        let source = r#"import software.amazon.awssdk.services.sqs.model.Message;

class A {
    String f(Message message) {
        return message.getBody() + message.getMessageId();
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("return message.body() + message.messageId();"));
        assert!(check_java(&result).is_empty());
    }

    #[test]
    fn test_member_renames() {
        let source = r#"import software.amazon.awssdk.services.s3.model.ListObjectsResponse;
import software.amazon.awssdk.services.s3.model.GetObjectRequest;

class A {
    void f(ListObjectsResponse listing, GetObjectRequest request) {
        listing.getObjectSummaries();
        listing.isTruncated();
        request.getBucketName();
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("listing.contents();"));
        assert!(result.contains("listing.isTruncated();"));
        assert!(result.contains("request.bucket();"));
    }

    #[test]
    fn test_non_model_receivers_untouched() {
        let source = r#"import java.io.File;
import software.amazon.awssdk.services.s3.model.NoSuchKeyException;

class A {
    void f(File file, NoSuchKeyException e) {
        file.getName();
        e.getMessage();
        file.getClass();
    }
}
"#;
        assert!(check_java(source).is_empty());
    }
}
