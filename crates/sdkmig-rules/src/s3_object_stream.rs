//! Rule: s3_object_stream
//!
//! v1 `getObject` returns an `S3Object` holding both the metadata and an
//! `S3ObjectInputStream`; v2 returns the stream itself,
//! `ResponseInputStream<GetObjectResponse>`, with the metadata behind
//! `response()`.
//!
//! Pattern:
//! ```java
//! // Before
//! S3Object object = s3.getObject("bucket", "key");
//! S3ObjectInputStream in = object.getObjectContent();
//! String type = object.getObjectMetadata().getContentType();
//! String key = object.getKey();
//!
//! // After
//! ResponseInputStream<GetObjectResponse> object = s3.getObject("bucket", "key");
//! ResponseInputStream<GetObjectResponse> in = object;
//! String type = object.response().getContentType();
//! String key = object.response().getKey();
//! ```

use std::collections::HashSet;

use sdkmig_core::ast::*;
use sdkmig_core::{visit, Edit, Span, Visitor};

use crate::imports::ImportEditor;
use crate::registry::{Category, Rule, RuleError};
use crate::resolve::TypeResolver;
use crate::sdk_types::{
    GET_OBJECT_RESPONSE, RESPONSE_INPUT_STREAM, V1_S3_OBJECT, V1_S3_OBJECT_INPUT_STREAM,
};

const STREAM_TYPE: &str = "ResponseInputStream<GetObjectResponse>";

pub fn check_s3_object_stream(unit: &CompilationUnit, source: &str) -> Vec<Edit> {
    if !["S3Object", "getObjectContent", "getObjectMetadata"]
        .iter()
        .any(|marker| source.contains(marker))
    {
        return Vec::new();
    }

    let resolver = TypeResolver::new(unit, source);
    let mut checker = S3ObjectStreamChecker {
        source,
        resolver: &resolver,
        imports: ImportEditor::new(unit, source),
        skip_types: HashSet::new(),
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);

    let S3ObjectStreamChecker { mut imports, mut edits, .. } = checker;
    if !edits.is_empty() {
        imports.maybe_remove_import(V1_S3_OBJECT);
        imports.maybe_remove_import(V1_S3_OBJECT_INPUT_STREAM);
    }
    let import_edits = imports.finish(&edits);
    edits.extend(import_edits);
    edits
}

struct S3ObjectStreamChecker<'a, 'r> {
    source: &'a str,
    resolver: &'r TypeResolver<'a>,
    imports: ImportEditor<'a>,
    /// Type references that name a constructor or class literal
    skip_types: HashSet<usize>,
    edits: Vec<Edit>,
}

impl<'a> S3ObjectStreamChecker<'a, '_> {
    fn get_text(&self, span: Span) -> &'a str {
        span.text(self.source)
    }

    fn is_s3_object(&self, expr: &Expr) -> bool {
        self.resolver
            .type_of(expr)
            .is_some_and(|ty| !ty.is_static && ty.name == V1_S3_OBJECT)
    }

    fn retype(&mut self, ty: &TypeRef) {
        if ty.primitive || ty.is_var() || !ty.type_args.is_empty() {
            return;
        }
        let resolved = self.resolver.resolve_type_name(&ty.name);
        if resolved != V1_S3_OBJECT && resolved != V1_S3_OBJECT_INPUT_STREAM {
            return;
        }
        self.edits.push(Edit::new(
            ty.name_span,
            STREAM_TYPE,
            format!("Replace {} with {}", ty.name, STREAM_TYPE),
        ));
        self.imports.maybe_add_import(RESPONSE_INPUT_STREAM);
        self.imports.maybe_add_import(GET_OBJECT_RESPONSE);
    }

    fn check_call(&mut self, call: &MethodInvocation) {
        let Some(target) = call.target.as_deref() else {
            return;
        };
        if !call.args.is_empty() || !self.is_s3_object(target) {
            return;
        }
        let name = call.name.name.as_str();
        match name {
            "getObjectContent" => {
                self.edits.push(Edit::new(
                    call.span,
                    self.get_text(target.span()),
                    "Use the response stream directly",
                ));
            }
            "getObjectMetadata" => {
                self.edits.push(Edit::new(
                    call.name.span,
                    "response",
                    "Replace getObjectMetadata() with response()",
                ));
            }
            _ if name.starts_with("get") || name.starts_with("is") => {
                self.edits.push(Edit::insert(
                    call.name.span.start,
                    "response().",
                    format!("Read {}() from the response", name),
                ));
            }
            _ => {}
        }
    }
}

impl<'a> Visitor<'a> for S3ObjectStreamChecker<'a, '_> {
    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        match expr {
            Expr::MethodInvocation(call) => self.check_call(call),
            Expr::NewClass(new) => {
                self.skip_types.insert(new.class.span.start);
            }
            Expr::ClassLiteral { ty, .. } => {
                self.skip_types.insert(ty.span.start);
            }
            _ => {}
        }
        true
    }

    fn visit_type_ref(&mut self, ty: &'a TypeRef, _source: &str) -> bool {
        if !self.skip_types.contains(&ty.span.start) {
            self.retype(ty);
        }
        true
    }
}

pub struct S3ObjectStreamRule;

impl Rule for S3ObjectStreamRule {
    fn name(&self) -> &'static str {
        "s3_object_stream"
    }

    fn description(&self) -> &'static str {
        "Replace S3Object with ResponseInputStream<GetObjectResponse>"
    }

    fn category(&self) -> Category {
        Category::S3
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_s3_object_stream(unit, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_core::{apply_edits, parse_java};

    fn check_java(source: &str) -> Vec<Edit> {
        let unit = parse_java(source).unwrap();
        check_s3_object_stream(&unit, source)
    }

    fn transform(source: &str) -> String {
        apply_edits(source, &check_java(source)).unwrap()
    }

    #[test]
    fn test_variable_and_accessors() {
        let source = r#"import com.amazonaws.services.s3.AmazonS3;
import com.amazonaws.services.s3.model.S3Object;
import com.amazonaws.services.s3.model.S3ObjectInputStream;

class A {
    void f(AmazonS3 s3) {
        S3Object object = s3.getObject("bucket", "key");
        S3ObjectInputStream in = object.getObjectContent();
        String type = object.getObjectMetadata().getContentType();
        String key = object.getKey();
        object.close();
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("ResponseInputStream<GetObjectResponse> object = s3.getObject(\"bucket\", \"key\");"));
        assert!(result.contains("ResponseInputStream<GetObjectResponse> in = object;"));
        assert!(result.contains("String type = object.response().getContentType();"));
        assert!(result.contains("String key = object.response().getKey();"));
        assert!(result.contains("object.close();"));
        assert!(result.contains("import software.amazon.awssdk.core.ResponseInputStream;"));
        assert!(result.contains("import software.amazon.awssdk.services.s3.model.GetObjectResponse;"));
        assert!(!result.contains("import com.amazonaws.services.s3.model.S3Object;"));
        assert!(!result.contains("import com.amazonaws.services.s3.model.S3ObjectInputStream;"));
    }

    #[test]
    fn test_inline_get_object_content() {
        let source = r#"import com.amazonaws.services.s3.AmazonS3;
import java.io.InputStream;

class A {
    InputStream f(AmazonS3 s3) {
        return s3.getObject("bucket", "key").getObjectContent();
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("return s3.getObject(\"bucket\", \"key\");"));
    }

    #[test]
    fn test_parameter_and_return_types() {
        let source = r#"import com.amazonaws.services.s3.model.S3Object;

class A {
    S3Object keep(S3Object object) {
        return object;
    }
}
"#;
        let result = transform(source);
        assert!(result.contains(
            "ResponseInputStream<GetObjectResponse> keep(ResponseInputStream<GetObjectResponse> object)"
        ));
    }

    #[test]
    fn test_second_pass_is_clean() {
        let source = r#"import com.amazonaws.services.s3.AmazonS3;
import com.amazonaws.services.s3.model.S3Object;

class A {
    String f(AmazonS3 s3) {
        S3Object object = s3.getObject("bucket", "key");
        return object.getBucketName();
    }
}
"#;
        let once = transform(source);
        assert!(check_java(&once).is_empty());
    }
}
