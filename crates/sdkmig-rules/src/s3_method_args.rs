//! Rule: s3_method_args (Configurable)
//!
//! v2 S3 client methods take a single request object. Positional
//! convenience overloads are rewritten into a request built from the
//! arguments, optionally renaming the method, appending extra arguments
//! (request bodies) or a suffix.
//!
//! Pattern:
//! ```java
//! // Before
//! s3.deleteVersion("bucket", "key", "v1");
//! String body = s3.getObjectAsString("bucket", "key");
//!
//! // After
//! s3.deleteObject(DeleteObjectRequest.builder().bucket("bucket").key("key").versionId("v1").build());
//! String body = s3.getObjectAsBytes(GetObjectRequest.builder().bucket("bucket").key("key").build()).asUtf8String();
//! ```
//!
//! A fluent name of `_` keeps that argument out of the request; it is only
//! reachable through `extra_args`.

use sdkmig_core::ast::*;
use sdkmig_core::{visit, Edit, Span, Visitor};

use crate::imports::ImportEditor;
use crate::naming::simple_name;
use crate::patterns::{expand_template, select, MethodPattern};
use crate::recipe::RecipeTables;
use crate::registry::{Category, ConfigError, Rule, RuleError};
use crate::resolve::TypeResolver;

/// Placeholder for an argument that is not a request field
const SKIP: &str = "_";

#[derive(Debug, Clone)]
pub struct RequestPojoMapping {
    pub pattern: MethodPattern,
    pub request: String,
    pub fluent_names: Vec<String>,
    pub v2_method: Option<String>,
    pub extra_args: Vec<String>,
    pub suffix: Option<String>,
    pub imports: Vec<String>,
}

/// Configuration for the s3_method_args rule
#[derive(Debug, Clone, Default)]
pub struct S3MethodArgsConfig {
    pub mappings: Vec<RequestPojoMapping>,
}

impl S3MethodArgsConfig {
    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        let mut mappings = Vec::with_capacity(tables.request_pojo_methods.len());
        for entry in &tables.request_pojo_methods {
            let pattern = MethodPattern::parse(&entry.method)?;
            if let Some(arity) = pattern.arity() {
                if arity != entry.fluent_names.len() {
                    return Err(ConfigError::LengthMismatch {
                        type_name: entry.method.clone(),
                        params: arity,
                        names: entry.fluent_names.len(),
                    });
                }
            }
            mappings.push(RequestPojoMapping {
                pattern,
                request: entry.request.clone(),
                fluent_names: entry.fluent_names.clone(),
                v2_method: entry.v2_method.clone(),
                extra_args: entry.extra_args.clone(),
                suffix: entry.suffix.clone(),
                imports: entry.imports.clone(),
            });
        }
        Ok(Self { mappings })
    }
}

impl RequestPojoMapping {
    /// `Request.builder().a($0).b($1).build()` with the argument texts filled in
    fn request_expr(&self, args: &[&str]) -> String {
        let mut out = format!("{}.builder()", simple_name(&self.request));
        for (name, arg) in self.fluent_names.iter().zip(args) {
            if name == SKIP {
                continue;
            }
            out.push_str(&format!(".{}({})", name, arg));
        }
        out.push_str(".build()");
        out
    }

    fn replacement(&self, method: &str, args: &[&str]) -> String {
        let mut call_args = vec![self.request_expr(args)];
        call_args.extend(self.extra_args.iter().map(|extra| expand_template(extra, None, args)));
        format!(
            "{}({}){}",
            self.v2_method.as_deref().unwrap_or(method),
            call_args.join(", "),
            self.suffix.as_deref().unwrap_or_default()
        )
    }
}

pub fn check_s3_method_args_with_config(
    unit: &CompilationUnit,
    source: &str,
    config: &S3MethodArgsConfig,
) -> Vec<Edit> {
    if config.mappings.is_empty() {
        return Vec::new();
    }

    let resolver = TypeResolver::new(unit, source);
    let mut checker = S3MethodArgsChecker {
        source,
        config,
        resolver: &resolver,
        imports: ImportEditor::new(unit, source),
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);

    let S3MethodArgsChecker { imports, mut edits, .. } = checker;
    let import_edits = imports.finish(&edits);
    edits.extend(import_edits);
    edits
}

struct S3MethodArgsChecker<'a, 'r> {
    source: &'a str,
    config: &'r S3MethodArgsConfig,
    resolver: &'r TypeResolver<'a>,
    imports: ImportEditor<'a>,
    edits: Vec<Edit>,
}

impl S3MethodArgsChecker<'_, '_> {
    fn check_call(&mut self, call: &MethodInvocation) {
        if call.target.is_none() || call.args.is_empty() {
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

        let args: Vec<&str> = call
            .args
            .items
            .iter()
            .map(|arg| arg.span().text(self.source))
            .collect();
        let replacement = mapping.replacement(&call.name.name, &args);
        self.edits.push(Edit::new(
            Span::new(call.name.span.start, call.span.end),
            replacement,
            format!(
                "Pass a {} to {}()",
                simple_name(&mapping.request),
                mapping.v2_method.as_deref().unwrap_or(&call.name.name)
            ),
        ));
        self.imports.maybe_add_import(&mapping.request);
        for fqn in &mapping.imports {
            self.imports.maybe_add_import(fqn);
        }
    }
}

impl<'a> Visitor<'a> for S3MethodArgsChecker<'a, '_> {
    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        if let Expr::MethodInvocation(call) = expr {
            self.check_call(call);
        }
        true
    }
}

pub struct S3MethodArgsRule {
    config: S3MethodArgsConfig,
}

impl S3MethodArgsRule {
    pub fn new(config: S3MethodArgsConfig) -> Self {
        Self { config }
    }

    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        Ok(Self::new(S3MethodArgsConfig::from_tables(tables)?))
    }
}

impl Rule for S3MethodArgsRule {
    fn name(&self) -> &'static str {
        "s3_method_args"
    }

    fn description(&self) -> &'static str {
        "Turn positional S3 client arguments into a request object"
    }

    fn category(&self) -> Category {
        Category::S3
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_s3_method_args_with_config(unit, source, &self.config))
    }
}
