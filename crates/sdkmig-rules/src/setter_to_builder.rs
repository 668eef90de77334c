//! Rule: setter_to_builder (Configurable)
//!
//! v2 model objects are immutable. A setter statement reassigns the
//! variable from a copy built with `toBuilder()`, and a free-standing
//! `withX` chain on an existing object becomes one `toBuilder()` ... `build()`
//! round trip. A `withX` chain whose result is discarded is assigned back.
//!
//! Pattern:
//! ```java
//! // Before
//! request.setQueueUrl("url");
//! request.withMessageBody("hi");
//! return request.withQueueUrl("url").withDelaySeconds(5);
//!
//! // After
//! request = request.toBuilder().queueUrl("url").build();
//! request = request.toBuilder().messageBody("hi").build();
//! return request.toBuilder().queueUrl("url").delaySeconds(5).build();
//! ```
//!
//! Chains rooted at a constructor are left to `new_class_to_builder`.

use std::collections::HashSet;

use sdkmig_core::ast::*;
use sdkmig_core::{visit, Edit, Span, Visitor};

use crate::naming::simple_name;
use crate::patterns::MemberRenames;
use crate::recipe::RecipeTables;
use crate::registry::{Category, ConfigError, Rule, RuleError};
use crate::resolve::TypeResolver;
use crate::sdk_types::is_v2_model;

/// Configuration for the setter_to_builder rule
#[derive(Debug, Clone, Default)]
pub struct SetterToBuilderConfig {
    /// Non-model types that also have `toBuilder()`
    pub builder_types: HashSet<String>,
    pub member_renames: MemberRenames,
}

impl SetterToBuilderConfig {
    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        Ok(Self {
            builder_types: tables.builder_types.iter().cloned().collect(),
            member_renames: MemberRenames::from_tables(tables)?,
        })
    }

    fn is_immutable(&self, fqn: &str) -> bool {
        (is_v2_model(fqn) && !simple_name(fqn).ends_with("Exception")) || self.builder_types.contains(fqn)
    }
}

pub fn check_setter_to_builder_with_config(
    unit: &CompilationUnit,
    source: &str,
    config: &SetterToBuilderConfig,
) -> Vec<Edit> {
    if !source.contains(".set") && !source.contains(".with") {
        return Vec::new();
    }

    let resolver = TypeResolver::new(unit, source);
    let mut checker = SetterToBuilderChecker {
        source,
        config,
        resolver: &resolver,
        handled: HashSet::new(),
        discarded: None,
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);
    checker.edits
}

struct SetterToBuilderChecker<'a, 'r> {
    source: &'a str,
    config: &'r SetterToBuilderConfig,
    resolver: &'r TypeResolver<'a>,
    /// End offsets of chain links already examined
    handled: HashSet<usize>,
    /// End offset of a call that is a whole expression statement
    discarded: Option<usize>,
    edits: Vec<Edit>,
}

impl SetterToBuilderChecker<'_, '_> {
    /// Fully qualified type of an immutable model instance
    fn model_type(&self, expr: &Expr) -> Option<String> {
        let ty = self.resolver.type_of(expr)?;
        (!ty.is_static && self.config.is_immutable(&ty.name)).then_some(ty.name)
    }

    /// `obj.setX(v);` and `this.obj.setX(v);`
    fn check_setter(&mut self, call: &MethodInvocation, span: Span) {
        let name = call.name.name.as_str();
        if call.args.len() != 1 || !is_accessor(name, "set") {
            return;
        }
        let Some(target) = call.target.as_deref() else {
            return;
        };
        if !is_assignable(target) {
            return;
        }
        let Some(fqn) = self.model_type(target) else {
            return;
        };

        let object = target.span().text(self.source);
        let member = self.config.member_renames.member_name(&fqn, name);
        let value = call.args.items[0].span().text(self.source);
        self.edits.push(Edit::new(
            span,
            format!("{} = {}.toBuilder().{}({}).build();", object, object, member, value),
            format!("Replace {}() with toBuilder().{}()", name, member),
        ));
    }

    /// `obj.withA(a).withB(b)` → `obj.toBuilder().a(a).b(b).build()`
    fn check_chain(&mut self, call: &MethodInvocation) {
        if self.handled.contains(&call.span.end) {
            return;
        }
        let (links, root) = call.chain();
        for link in &links {
            self.handled.insert(link.span.end);
        }
        let Some(root) = root else {
            return;
        };
        if matches!(root.unparenthesized(), Expr::NewClass(_)) {
            return;
        }

        let mut renames = Vec::new();
        let mut build_at = None;
        for link in links.iter().rev() {
            let name = link.name.name.as_str();
            if link.args.is_empty() || !is_accessor(name, "with") {
                break;
            }
            renames.push(link);
            build_at = Some(link.span.end);
        }
        let Some(build_at) = build_at else {
            return;
        };
        let Some(fqn) = self.model_type(root) else {
            return;
        };

        if self.discarded == Some(call.span.end) && renames.len() == links.len() && is_assignable(root) {
            let object = root.span().text(self.source);
            self.edits.push(Edit::insert(
                root.span().start,
                format!("{} = ", object),
                "Keep the rebuilt object",
            ));
        }
        self.edits.push(Edit::insert(root.span().end, ".toBuilder()", "Copy into a builder"));
        for link in renames {
            let member = self.config.member_renames.member_name(&fqn, &link.name.name);
            self.edits.push(Edit::new(
                link.name.span,
                member.clone(),
                format!("Replace {}() with {}()", link.name.name, member),
            ));
        }
        self.edits.push(Edit::insert(build_at, ".build()", "Build the v2 object"));
    }
}

impl<'a> Visitor<'a> for SetterToBuilderChecker<'a, '_> {
    fn visit_statement(&mut self, stmt: &'a Stmt, _source: &str) -> bool {
        if let Stmt::Expression {
            expr: Expr::MethodInvocation(call),
            span,
        } = stmt
        {
            self.discarded = Some(call.span.end);
            self.check_setter(call, *span);
        }
        true
    }

    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        if let Expr::MethodInvocation(call) = expr {
            self.check_chain(call);
        }
        true
    }
}

/// `obj` or `this.obj`
fn is_assignable(expr: &Expr) -> bool {
    match expr.unparenthesized() {
        Expr::Identifier(_) => true,
        Expr::FieldAccess(access) => matches!(*access.target, Expr::This(_)),
        _ => false,
    }
}

/// `setFoo` / `withFoo` style names
fn is_accessor(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
}

pub struct SetterToBuilderRule {
    config: SetterToBuilderConfig,
}

impl SetterToBuilderRule {
    pub fn new(config: SetterToBuilderConfig) -> Self {
        Self { config }
    }

    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        Ok(Self::new(SetterToBuilderConfig::from_tables(tables)?))
    }
}

impl Rule for SetterToBuilderRule {
    fn name(&self) -> &'static str {
        "setter_to_builder"
    }

    fn description(&self) -> &'static str {
        "Replace setters and withX calls on immutable v2 objects with toBuilder()"
    }

    fn category(&self) -> Category {
        Category::CallPatterns
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_setter_to_builder_with_config(unit, source, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_core::{apply_edits, parse_java};

    fn check_java(source: &str) -> Vec<Edit> {
        let config = SetterToBuilderConfig::from_tables(&RecipeTables::builtin().unwrap()).unwrap();
        let unit = parse_java(source).unwrap();
        check_setter_to_builder_with_config(&unit, source, &config)
    }

    fn transform(source: &str) -> String {
        apply_edits(source, &check_java(source)).unwrap()
    }

    #[test]
    fn test_setter_statement() {
        let source = r#"import software.amazon.awssdk.services.sqs.model.SendMessageRequest;

class A {
    void f(SendMessageRequest request) {
        request.setQueueUrl("url");
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("request = request.toBuilder().queueUrl(\"url\").build();"));
        assert!(check_java(&result).is_empty());
    }

    #[test]
    fn test_field_setter_with_member_rename() {
        let source = r#"import software.amazon.awssdk.services.s3.model.ListObjectsRequest;

class A {
    ListObjectsRequest request;

    void f() {
        this.request.setBucketName("b");
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("this.request = this.request.toBuilder().bucket(\"b\").build();"));
    }

    #[test]
    fn test_wither_chain_on_existing_object() {
        let source = r#"import software.amazon.awssdk.services.sqs.model.SendMessageRequest;

class A {
    SendMessageRequest f(SendMessageRequest request) {
        return request.withQueueUrl("url").withDelaySeconds(5);
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("return request.toBuilder().queueUrl(\"url\").delaySeconds(5).build();"));
    }

    #[test]
    fn test_discarded_wither_is_assigned_back() {
        let source = r#"import software.amazon.awssdk.services.sqs.model.SendMessageRequest;

class A {
    void f(SendMessageRequest r) {
        r.withMessageBody("x");
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("r = r.toBuilder().messageBody(\"x\").build();"));
        assert!(check_java(&result).is_empty());
    }

    #[test]
    fn test_configuration_setter() {
        let source = r#"import software.amazon.awssdk.core.client.config.ClientOverrideConfiguration;

class A {
    void f(ClientOverrideConfiguration config) {
        config.setMaxConnections(10);
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("config = config.toBuilder().maxConnections(10).build();"));
    }

    #[test]
    fn test_constructor_chains_and_other_types_untouched() {
        let source = r#"import java.util.Calendar;
import software.amazon.awssdk.services.sqs.model.SendMessageRequest;

class A {
    void f(Calendar calendar) {
        calendar.setLenient(true);
        Object r = new SendMessageRequest().withQueueUrl("url");
        Object b = SendMessageRequest.builder().queueUrl("url");
    }
}
"#;
        assert!(check_java(source).is_empty());
    }
}
