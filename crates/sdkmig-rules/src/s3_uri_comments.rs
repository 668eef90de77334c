//! Rule: s3_uri_comments
//!
//! `AmazonS3URI` URL-decodes the object key by default; the v2 `S3Uri`
//! returned by `S3Utilities.parseUri` does not. Constructions that rely on
//! decoding get a migration comment. Passing the literal `false` as the
//! second argument already opts out of decoding, so those stay silent.
//!
//! Pattern:
//! ```java
//! // Before
//! AmazonS3URI uri = new AmazonS3URI(location);
//!
//! // After
//! AmazonS3URI uri = /*AWS SDK for Java v2 migration: ...*/new AmazonS3URI(location);
//! ```

use sdkmig_core::ast::*;
use sdkmig_core::{visit, Edit, Visitor};

use crate::comments;
use crate::registry::{Category, Rule, RuleError};
use crate::resolve::TypeResolver;

const AMAZON_S3_URI: &str = "com.amazonaws.services.s3.AmazonS3URI";

const URI_COMMENT: &str = "v2 S3Uri does not URL-decode the object key. AmazonS3URI decodes it unless \
constructed with urlEncode=false. Please manually migrate to S3Client.utilities().parseUri(URI.create(...)) \
and decode the key yourself if the string was URL-encoded.";

pub fn check_s3_uri_comments(unit: &CompilationUnit, source: &str) -> Vec<Edit> {
    if !source.contains("AmazonS3URI") {
        return Vec::new();
    }
    let resolver = TypeResolver::new(unit, source);
    let mut checker = S3UriChecker {
        source,
        resolver: &resolver,
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);
    checker.edits
}

struct S3UriChecker<'a, 'r> {
    source: &'a str,
    resolver: &'r TypeResolver<'a>,
    edits: Vec<Edit>,
}

impl S3UriChecker<'_, '_> {
    fn needs_comment(&self, new: &NewClass) -> bool {
        if self.resolver.resolve_type_ref(&new.class).name != AMAZON_S3_URI {
            return false;
        }
        match new.args.items.as_slice() {
            [_] => true,
            // Anything but a literal `false` may still decode
            [_, second] => !second
                .as_literal()
                .is_some_and(|lit| lit.kind == LiteralKind::Boolean && lit.text == "false"),
            _ => false,
        }
    }
}

impl<'a> Visitor<'a> for S3UriChecker<'a, '_> {
    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        if let Expr::NewClass(new) = expr {
            if self.needs_comment(new) {
                if let Some(edit) = comments::annotate(self.source, new.span.start, URI_COMMENT) {
                    self.edits.push(edit);
                }
            }
        }
        true
    }
}

pub struct S3UriCommentsRule;

impl Rule for S3UriCommentsRule {
    fn name(&self) -> &'static str {
        "s3_uri_comments"
    }

    fn description(&self) -> &'static str {
        "Annotate AmazonS3URI constructions that rely on URL decoding"
    }

    fn category(&self) -> Category {
        Category::Annotations
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_s3_uri_comments(unit, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_core::{apply_edits, parse_java};

    fn check_java(source: &str) -> Vec<Edit> {
        let unit = parse_java(source).unwrap();
        check_s3_uri_comments(&unit, source)
    }

    #[test]
    fn test_single_argument_is_annotated() {
        let source = r#"import com.amazonaws.services.s3.AmazonS3URI;

class A {
    AmazonS3URI parse(String location) {
        return new AmazonS3URI(location);
    }
}
"#;
        let edits = check_java(source);
        assert_eq!(edits.len(), 1);
        let result = apply_edits(source, &edits).unwrap();
        assert!(result.contains("return /*AWS SDK for Java v2 migration: v2 S3Uri does not URL-decode"));
        assert!(result.contains("*/new AmazonS3URI(location);"));
    }

    #[test]
    fn test_literal_false_is_silent() {
        let source = r#"import com.amazonaws.services.s3.AmazonS3URI;

class A {
    void f(String location) {
        AmazonS3URI uri = new AmazonS3URI(location, false);
    }
}
"#;
        assert!(check_java(source).is_empty());
    }

    #[test]
    fn test_non_literal_flag_is_annotated() {
        let source = r#"import com.amazonaws.services.s3.AmazonS3URI;

class A {
    void f(String location, boolean encode) {
        AmazonS3URI a = new AmazonS3URI(location, true);
        AmazonS3URI b = new AmazonS3URI(location, encode);
    }
}
"#;
        assert_eq!(check_java(source).len(), 2);
    }

    #[test]
    fn test_idempotent() {
        let source = r#"import com.amazonaws.services.s3.AmazonS3URI;

class A {
    void f(String location) {
        AmazonS3URI uri = new AmazonS3URI(location);
    }
}
"#;
        let once = apply_edits(source, &check_java(source)).unwrap();
        assert!(check_java(&once).is_empty());
    }
}
