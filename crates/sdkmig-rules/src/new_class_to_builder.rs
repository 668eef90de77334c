//! Rule: new_class_to_builder (Configurable)
//!
//! v2 model objects are immutable and created through builders. A
//! constructor call becomes `Type.builder()`, positional constructor
//! arguments become fluent calls (per `builder_constructors`), and a
//! `withX` chain on the new object is folded into the builder before a
//! single trailing `.build()`.
//!
//! Pattern:
//! ```java
//! // Before
//! new SendMessageRequest().withQueueUrl("url").withMessageBody("hi")
//! new GetObjectRequest("bucket", "key")
//!
//! // After
//! SendMessageRequest.builder().queueUrl("url").messageBody("hi").build()
//! GetObjectRequest.builder().bucket("bucket").key("key").build()
//! ```
//!
//! Constructors with arguments but no table entry of the same arity are
//! left alone.

use std::collections::HashSet;

use sdkmig_core::ast::*;
use sdkmig_core::{visit, Edit, Span, Visitor};

use crate::naming::simple_name;
use crate::patterns::{arg_matches, select, ArgMatch, MemberRenames};
use crate::recipe::RecipeTables;
use crate::registry::{Category, ConfigError, Rule, RuleError};
use crate::resolve::TypeResolver;
use crate::sdk_types::is_v2_model;

#[derive(Debug, Clone)]
pub struct BuilderConstructorMapping {
    pub type_name: String,
    pub parameter_types: Vec<String>,
    pub fluent_names: Vec<String>,
}

/// Configuration for the new_class_to_builder rule
#[derive(Debug, Clone, Default)]
pub struct NewClassToBuilderConfig {
    pub constructors: Vec<BuilderConstructorMapping>,
    /// Non-model types that also have `builder()`
    pub builder_types: HashSet<String>,
    /// Chain links that are already v2 builder calls
    pub fluent_names: HashSet<String>,
    pub member_renames: MemberRenames,
}

impl NewClassToBuilderConfig {
    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        let mut constructors = Vec::new();
        for entry in &tables.builder_constructors {
            if entry.parameter_types.len() != entry.fluent_names.len() {
                return Err(ConfigError::LengthMismatch {
                    type_name: entry.type_name.clone(),
                    params: entry.parameter_types.len(),
                    names: entry.fluent_names.len(),
                });
            }
            constructors.push(BuilderConstructorMapping {
                type_name: entry.type_name.clone(),
                parameter_types: entry.parameter_types.clone(),
                fluent_names: entry.fluent_names.clone(),
            });
        }
        Ok(Self {
            constructors,
            builder_types: tables.builder_types.iter().cloned().collect(),
            fluent_names: tables.fluent_names().into_iter().map(str::to_string).collect(),
            member_renames: MemberRenames::from_tables(tables)?,
        })
    }

    fn has_builder(&self, fqn: &str) -> bool {
        (is_v2_model(fqn) && !simple_name(fqn).ends_with("Exception")) || self.builder_types.contains(fqn)
    }
}

pub fn check_new_class_to_builder_with_config(
    unit: &CompilationUnit,
    source: &str,
    config: &NewClassToBuilderConfig,
) -> Vec<Edit> {
    if !source.contains("new ") {
        return Vec::new();
    }

    let resolver = TypeResolver::new(unit, source);
    let mut checker = NewClassToBuilderChecker {
        source,
        config,
        resolver: &resolver,
        handled: HashSet::new(),
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);
    checker.edits
}

struct NewClassToBuilderChecker<'a, 'r> {
    source: &'a str,
    config: &'r NewClassToBuilderConfig,
    resolver: &'r TypeResolver<'a>,
    /// Start offsets of constructor calls already rewritten with their chain
    handled: HashSet<usize>,
    edits: Vec<Edit>,
}

impl NewClassToBuilderChecker<'_, '_> {
    fn get_text(&self, span: Span) -> &str {
        span.text(self.source)
    }

    /// `Type.builder().a(x).b(y)` for a constructor, if it can be converted
    fn builder_head(&self, new: &NewClass) -> Option<(String, String)> {
        if new.body.is_some() || new.class.array_dims > 0 {
            return None;
        }
        let fqn = self.resolver.resolve_type_ref(&new.class).name;
        if !self.config.has_builder(&fqn) {
            return None;
        }
        let type_text = self.get_text(new.class.name_span);
        let mut head = format!("{}.builder()", type_text);
        if new.args.is_empty() {
            return Some((fqn, head));
        }

        let candidates: Vec<(usize, ArgMatch)> = self
            .config
            .constructors
            .iter()
            .enumerate()
            .filter(|(_, c)| c.type_name == fqn && c.parameter_types.len() == new.args.len())
            .map(|(i, c)| {
                let matched = c
                    .parameter_types
                    .iter()
                    .zip(&new.args.items)
                    .map(|(ty, arg)| arg_matches(ty, self.resolver.type_of(arg).as_ref()))
                    .fold(ArgMatch::Yes, ArgMatch::and);
                (i, matched)
            })
            .collect();
        let constructor = &self.config.constructors[select(&candidates)?];
        for (name, arg) in constructor.fluent_names.iter().zip(&new.args.items) {
            head.push_str(&format!(".{}({})", name, self.get_text(arg.span())));
        }
        Some((fqn, head))
    }

    /// The v2 builder call for a chain link, `None` when the chain stops here
    fn link_name(&self, fqn: &str, link: &MethodInvocation) -> Option<String> {
        let name = link.name.name.as_str();
        if self.config.fluent_names.contains(name) {
            return Some(name.to_string());
        }
        let is_wither = name
            .strip_prefix("with")
            .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()));
        if !is_wither || link.args.is_empty() {
            return None;
        }
        Some(self.config.member_renames.member_name(fqn, name))
    }

    /// Rewrite the constructor at the root of `call`'s chain together with
    /// the chain links that configure it
    fn check_chain(&mut self, call: &MethodInvocation) {
        let (links, root) = call.chain();
        let Some(Expr::NewClass(new)) = root.map(Expr::unparenthesized) else {
            return;
        };
        if self.handled.contains(&new.span.start) {
            return;
        }
        let Some((fqn, head)) = self.builder_head(new) else {
            return;
        };
        self.handled.insert(new.span.start);

        let mut renames = Vec::new();
        let mut build_at = root.map(Expr::span).unwrap_or(new.span).end;
        for link in links.iter().rev() {
            let Some(v2_name) = self.link_name(&fqn, link) else {
                break;
            };
            if v2_name != link.name.name {
                renames.push(Edit::new(
                    link.name.span,
                    v2_name.clone(),
                    format!("Replace {}() with {}()", link.name.name, v2_name),
                ));
            }
            build_at = link.span.end;
        }

        self.edits.push(Edit::new(
            new.span,
            head,
            format!("Replace new {}() with a builder", simple_name(&fqn)),
        ));
        self.edits.extend(renames);
        self.edits.push(Edit::insert(build_at, ".build()", "Build the v2 object"));
    }

    fn check_new(&mut self, new: &NewClass) {
        if self.handled.contains(&new.span.start) {
            return;
        }
        let Some((fqn, head)) = self.builder_head(new) else {
            return;
        };
        self.handled.insert(new.span.start);
        self.edits.push(Edit::new(
            new.span,
            format!("{}.build()", head),
            format!("Replace new {}() with a builder", simple_name(&fqn)),
        ));
    }
}

impl<'a> Visitor<'a> for NewClassToBuilderChecker<'a, '_> {
    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        match expr {
            Expr::MethodInvocation(call) => self.check_chain(call),
            Expr::NewClass(new) => self.check_new(new),
            _ => {}
        }
        true
    }
}

pub struct NewClassToBuilderRule {
    config: NewClassToBuilderConfig,
}

impl NewClassToBuilderRule {
    pub fn new(config: NewClassToBuilderConfig) -> Self {
        Self { config }
    }

    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        Ok(Self::new(NewClassToBuilderConfig::from_tables(tables)?))
    }
}

impl Rule for NewClassToBuilderRule {
    fn name(&self) -> &'static str {
        "new_class_to_builder"
    }

    fn description(&self) -> &'static str {
        "Replace constructors of v2 model types with builders"
    }

    fn category(&self) -> Category {
        Category::CallPatterns
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_new_class_to_builder_with_config(unit, source, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_core::{apply_edits, parse_java};

    fn check_java(source: &str) -> Vec<Edit> {
        let config = NewClassToBuilderConfig::from_tables(&RecipeTables::builtin().unwrap()).unwrap();
        let unit = parse_java(source).unwrap();
        check_new_class_to_builder_with_config(&unit, source, &config)
    }

    fn transform(source: &str) -> String {
        apply_edits(source, &check_java(source)).unwrap()
    }

    #[test]
    fn test_wither_chain_folds_into_builder() {
        let source = r#"import software.amazon.awssdk.services.sqs.model.SendMessageRequest;

class A {
    Object f() {
        return new SendMessageRequest().withQueueUrl("url").withMessageBody("hi");
    }
}
"#;
        let result = transform(source);
        assert!(result.contains(
            "return SendMessageRequest.builder().queueUrl(\"url\").messageBody(\"hi\").build();"
        ));
    }

    #[test]
    fn test_constructor_arguments_become_fluent_calls() {
        let source = r#"import software.amazon.awssdk.services.s3.model.GetObjectRequest;

class A {
    Object f(String bucket) {
        return new GetObjectRequest(bucket, "key");
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("return GetObjectRequest.builder().bucket(bucket).key(\"key\").build();"));
    }

    #[test]
    fn test_member_renames_apply_in_chain() {
        let source = r#"import software.amazon.awssdk.services.s3.model.ListObjectsRequest;

class A {
    Object f() {
        return new ListObjectsRequest().withBucketName("b").withPrefix("p").toString();
    }
}
"#;
        let result = transform(source);
        assert!(result.contains(
            "return ListObjectsRequest.builder().bucket(\"b\").prefix(\"p\").build().toString();"
        ));
    }

    #[test]
    fn test_configuration_builder_type() {
        let source = r#"import software.amazon.awssdk.core.client.config.ClientOverrideConfiguration;

class A {
    ClientOverrideConfiguration f() {
        return new ClientOverrideConfiguration().maxConnections(10);
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("return ClientOverrideConfiguration.builder().maxConnections(10).build();"));
    }

    #[test]
    fn test_nested_constructor_argument() {
        let source = r#"import software.amazon.awssdk.services.s3.model.Tag;
import java.util.Arrays;

class A {
    Object f() {
        return Arrays.asList(new Tag("k", "v"));
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("return Arrays.asList(Tag.builder().key(\"k\").value(\"v\").build());"));
    }

    #[test]
    fn test_unknown_arity_is_left_alone() {
        let source = r#"import software.amazon.awssdk.services.s3.model.GetObjectRequest;

class A {
    Object f(Object id) {
        return new GetObjectRequest(id, "a", "b", "c");
    }
}
"#;
        assert!(check_java(source).is_empty());
    }

    #[test]
    fn test_non_sdk_types_untouched() {
        let source = r#"import java.util.ArrayList;

class A {
    Object f() {
        return new ArrayList<String>();
    }
}
"#;
        assert!(check_java(source).is_empty());
    }
}
