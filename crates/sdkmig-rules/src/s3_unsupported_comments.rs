//! Rule: s3_unsupported_comments (Configurable)
//!
//! Leaves a migration comment on v1 calls and constructors that have no
//! automatic v2 rewrite. Entries come from the `comments` recipe table and
//! may also swap imports (e.g. `CannedAccessControlList` for
//! `ObjectCannedACL`).
//!
//! Pattern:
//! ```java
//! // Before
//! s3.setRegion(region);
//!
//! // After
//! /*AWS SDK for Java v2 migration: Transform for setRegion method not supported. ...*/s3.setRegion(region);
//! ```

use sdkmig_core::ast::*;
use sdkmig_core::{visit, Edit, Visitor};

use crate::comments;
use crate::imports::ImportEditor;
use crate::patterns::{ArgMatch, MethodPattern};
use crate::recipe::{CommentEntry, RecipeTables};
use crate::registry::{Category, ConfigError, Rule, RuleError};
use crate::resolve::TypeResolver;

/// A comment attached to calls matching a method pattern
#[derive(Debug, Clone)]
pub struct MethodComment {
    pub pattern: MethodPattern,
    pub comment: String,
    pub remove_imports: Vec<String>,
    pub add_imports: Vec<String>,
}

/// A comment attached to `new` expressions of a class
#[derive(Debug, Clone)]
pub struct ConstructorComment {
    pub class: String,
    /// Only constructors with this many arguments; `None` matches all
    pub arity: Option<usize>,
    pub comment: String,
    pub remove_imports: Vec<String>,
    pub add_imports: Vec<String>,
}

/// Configuration for the s3_unsupported_comments rule
#[derive(Debug, Clone, Default)]
pub struct S3UnsupportedCommentsConfig {
    pub methods: Vec<MethodComment>,
    pub constructors: Vec<ConstructorComment>,
}

impl S3UnsupportedCommentsConfig {
    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for entry in &tables.comments {
            let CommentEntry {
                method,
                new_class,
                arity,
                comment,
                remove_imports,
                add_imports,
            } = entry.clone();
            match (method, new_class) {
                (Some(method), _) => config.methods.push(MethodComment {
                    pattern: MethodPattern::parse(&method)?,
                    comment,
                    remove_imports,
                    add_imports,
                }),
                (None, Some(class)) => config.constructors.push(ConstructorComment {
                    class,
                    arity,
                    comment,
                    remove_imports,
                    add_imports,
                }),
                (None, None) => {
                    return Err(ConfigError::Validation(format!(
                        "comment entry `{}` needs `method` or `new_class`",
                        comment
                    )))
                }
            }
        }
        Ok(config)
    }
}

pub fn check_s3_unsupported_comments_with_config(
    unit: &CompilationUnit,
    source: &str,
    config: &S3UnsupportedCommentsConfig,
) -> Vec<Edit> {
    if config.methods.is_empty() && config.constructors.is_empty() {
        return Vec::new();
    }

    let resolver = TypeResolver::new(unit, source);
    let mut checker = S3UnsupportedCommentsChecker {
        source,
        config,
        resolver: &resolver,
        imports: ImportEditor::new(unit, source),
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);

    let S3UnsupportedCommentsChecker { imports, mut edits, .. } = checker;
    let import_edits = imports.finish(&edits);
    edits.extend(import_edits);
    edits
}

struct S3UnsupportedCommentsChecker<'a, 'r> {
    source: &'a str,
    config: &'r S3UnsupportedCommentsConfig,
    resolver: &'r TypeResolver<'a>,
    imports: ImportEditor<'a>,
    edits: Vec<Edit>,
}

impl<'a, 'r> S3UnsupportedCommentsChecker<'a, 'r> {
    fn annotate(&mut self, offset: usize, comment: &str, remove: &[String], add: &[String]) {
        let Some(edit) = comments::annotate(self.source, offset, comment) else {
            return;
        };
        self.edits.push(edit);
        for fqn in remove {
            self.imports.remove_import(fqn);
        }
        for fqn in add {
            self.imports.maybe_add_import(fqn);
        }
    }

    fn check_call(&mut self, call: &MethodInvocation) {
        let config = self.config;
        let found = config
            .methods
            .iter()
            .find(|entry| entry.pattern.match_call(call, self.resolver) != ArgMatch::No);
        if let Some(entry) = found {
            self.annotate(
                call.span.start,
                &entry.comment,
                &entry.remove_imports,
                &entry.add_imports,
            );
        }
    }

    fn check_new(&mut self, new: &NewClass) {
        let config = self.config;
        let class = self.resolver.resolve_type_ref(&new.class).name;
        let found = config.constructors.iter().find(|entry| {
            entry.class == class && entry.arity.map_or(true, |arity| arity == new.args.len())
        });
        if let Some(entry) = found {
            self.annotate(
                new.span.start,
                &entry.comment,
                &entry.remove_imports,
                &entry.add_imports,
            );
        }
    }
}

impl<'a, 'r> Visitor<'a> for S3UnsupportedCommentsChecker<'a, 'r> {
    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        match expr {
            Expr::MethodInvocation(call) => self.check_call(call),
            Expr::NewClass(new) => self.check_new(new),
            _ => {}
        }
        true
    }
}

pub struct S3UnsupportedCommentsRule {
    config: S3UnsupportedCommentsConfig,
}

impl S3UnsupportedCommentsRule {
    pub fn new(config: S3UnsupportedCommentsConfig) -> Self {
        Self { config }
    }

    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        Ok(Self::new(S3UnsupportedCommentsConfig::from_tables(tables)?))
    }
}

impl Rule for S3UnsupportedCommentsRule {
    fn name(&self) -> &'static str {
        "s3_unsupported_comments"
    }

    fn description(&self) -> &'static str {
        "Annotate v1 calls and constructors that have no automatic v2 rewrite"
    }

    fn category(&self) -> Category {
        Category::Annotations
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_s3_unsupported_comments_with_config(unit, source, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_core::{apply_edits, parse_java};

    fn check_java(source: &str) -> Vec<Edit> {
        let tables = RecipeTables::builtin().unwrap();
        let config = S3UnsupportedCommentsConfig::from_tables(&tables).unwrap();
        let unit = parse_java(source).unwrap();
        check_s3_unsupported_comments_with_config(&unit, source, &config)
    }

    fn transform(source: &str) -> String {
        let edits = check_java(source);
        apply_edits(source, &edits).unwrap()
    }

    #[test]
    fn test_set_region_is_annotated() {
        let source = r#"import com.amazonaws.services.s3.AmazonS3;

class A {
    void f(AmazonS3 s3, com.amazonaws.regions.Region region) {
        s3.setRegion(region);
    }
}
"#;
        let result = transform(source);
        assert!(result.contains(
            "/*AWS SDK for Java v2 migration: Transform for setRegion method not supported."
        ));
        assert!(result.contains("*/s3.setRegion(region);"));
    }

    #[test]
    fn test_annotation_is_idempotent() {
        let source = r#"import com.amazonaws.services.s3.AmazonS3;

class A {
    void f(AmazonS3 s3) {
        s3.setEndpoint("http://localhost");
    }
}
"#;
        let once = transform(source);
        let twice = transform(&once);
        assert_eq!(once, twice);
        assert_eq!(once.matches("AWS SDK for Java v2 migration").count(), 1);
    }

    #[test]
    fn test_acl_swaps_imports() {
        let source = r#"import com.amazonaws.services.s3.AmazonS3;
import com.amazonaws.services.s3.model.CannedAccessControlList;

class A {
    void f(AmazonS3 s3) {
        s3.setObjectAcl("b", "k", CannedAccessControlList.PublicRead);
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("Transform for AccessControlList and CannedAccessControlList not supported"));
        assert!(!result.contains("import com.amazonaws.services.s3.model.CannedAccessControlList;"));
        assert!(result.contains("import software.amazon.awssdk.services.s3.model.ObjectCannedACL;"));
    }

    #[test]
    fn test_constructor_arity() {
        let source = r#"import com.amazonaws.services.s3.model.CreateBucketRequest;

class A {
    void f() {
        CreateBucketRequest a = new CreateBucketRequest("b");
        CreateBucketRequest b = new CreateBucketRequest("b", "us-west-2");
    }
}
"#;
        let edits = check_java(source);
        assert_eq!(edits.len(), 1);
        let result = apply_edits(source, &edits).unwrap();
        assert!(result.contains("= new CreateBucketRequest(\"b\");"));
        assert!(result.contains("Transform for createBucketRequest with region is not supported"));
        assert!(result.contains("in the request builder*/new CreateBucketRequest(\"b\", \"us-west-2\")"));
    }

    #[test]
    fn test_create_bucket_with_string_region_untouched() {
        let source = r#"import com.amazonaws.services.s3.AmazonS3;

class A {
    void f(AmazonS3 s3) {
        s3.createBucket("b", "us-west-2");
    }
}
"#;
        assert!(check_java(source).is_empty());
    }

    #[test]
    fn test_unrelated_receiver_untouched() {
        let source = r#"class A {
    void f(Object s3) {
        s3.setRegion(null);
    }
}
"#;
        assert!(check_java(source).is_empty());
    }
}
