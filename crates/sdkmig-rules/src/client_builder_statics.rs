//! Rule: client_builder_statics
//!
//! v2 client builders are not instantiated through static methods on the
//! builder type; the client interface offers `builder()` and `create()`.
//!
//! Pattern:
//! ```java
//! // Before
//! S3Client s3 = S3ClientBuilder.standard().region(Region.US_WEST_2).build();
//! SqsClient sqs = SqsClientBuilder.defaultClient();
//!
//! // After
//! S3Client s3 = S3Client.builder().region(Region.US_WEST_2).build();
//! SqsClient sqs = SqsClient.create();
//! ```

use sdkmig_core::ast::*;
use sdkmig_core::{visit, Edit, Visitor};

use crate::imports::ImportEditor;
use crate::naming::simple_name;
use crate::registry::{Category, Rule, RuleError};
use crate::resolve::TypeResolver;
use crate::sdk_types::{client_for_builder, is_v2_client_builder};

pub fn check_client_builder_statics(unit: &CompilationUnit, source: &str) -> Vec<Edit> {
    if !source.contains("ClientBuilder") {
        return Vec::new();
    }

    let resolver = TypeResolver::new(unit, source);
    let mut checker = ClientBuilderStaticsChecker {
        resolver: &resolver,
        imports: ImportEditor::new(unit, source),
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);

    let ClientBuilderStaticsChecker { imports, mut edits, .. } = checker;
    let import_edits = imports.finish(&edits);
    edits.extend(import_edits);
    edits
}

struct ClientBuilderStaticsChecker<'a, 'r> {
    resolver: &'r TypeResolver<'a>,
    imports: ImportEditor<'a>,
    edits: Vec<Edit>,
}

impl ClientBuilderStaticsChecker<'_, '_> {
    fn check_call(&mut self, call: &MethodInvocation) {
        let factory = match call.name.name.as_str() {
            "standard" => "builder",
            "defaultClient" => "create",
            _ => return,
        };
        if !call.args.is_empty() {
            return;
        }
        let Some(target) = call.target.as_deref() else {
            return;
        };
        let Expr::Identifier(receiver) = target else {
            return;
        };
        let Some(ty) = self.resolver.type_of(target) else {
            return;
        };
        if !ty.is_static || !is_v2_client_builder(&ty.name) {
            return;
        }
        let Some(client) = client_for_builder(&ty.name) else {
            return;
        };

        let client_name = simple_name(&client);
        self.edits.push(Edit::new(
            receiver.span,
            client_name,
            format!("Replace {} with {}", receiver.name, client_name),
        ));
        self.edits.push(Edit::new(
            call.name.span,
            factory,
            format!("Replace {}() with {}()", call.name.name, factory),
        ));
        self.imports.maybe_add_import(&client);
        self.imports.maybe_remove_import(&ty.name);
    }
}

impl<'a> Visitor<'a> for ClientBuilderStaticsChecker<'a, '_> {
    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        if let Expr::MethodInvocation(call) = expr {
            self.check_call(call);
        }
        true
    }
}

pub struct ClientBuilderStaticsRule;

impl Rule for ClientBuilderStaticsRule {
    fn name(&self) -> &'static str {
        "client_builder_statics"
    }

    fn description(&self) -> &'static str {
        "Replace XClientBuilder.standard()/defaultClient() with XClient.builder()/create()"
    }

    fn category(&self) -> Category {
        Category::CallPatterns
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_client_builder_statics(unit, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_core::{apply_edits, parse_java};

    fn check_java(source: &str) -> Vec<Edit> {
        let unit = parse_java(source).unwrap();
        check_client_builder_statics(&unit, source)
    }

    fn transform(source: &str) -> String {
        apply_edits(source, &check_java(source)).unwrap()
    }

    #[test]
    fn test_standard_becomes_builder() {
        let source = r#"import software.amazon.awssdk.services.s3.S3Client;
import software.amazon.awssdk.services.s3.S3ClientBuilder;

class A {
    S3Client s3 = S3ClientBuilder.standard().region("us-west-2").build();
}
"#;
        let result = transform(source);
        assert!(result.contains("S3Client s3 = S3Client.builder().region(\"us-west-2\").build();"));
        assert!(!result.contains("import software.amazon.awssdk.services.s3.S3ClientBuilder;"));
        assert_eq!(result.matches("import software.amazon.awssdk.services.s3.S3Client;").count(), 1);
    }

    #[test]
    fn test_default_client_becomes_create() {
        let source = r#"import software.amazon.awssdk.services.sqs.SqsClientBuilder;

class A {
    Object sqs = SqsClientBuilder.defaultClient();
}
"#;
        let result = transform(source);
        assert!(result.contains("Object sqs = SqsClient.create();"));
        assert!(result.contains("import software.amazon.awssdk.services.sqs.SqsClient;"));
        assert!(!result.contains("SqsClientBuilder"));
    }

    #[test]
    fn test_async_builder() {
        let source = r#"import software.amazon.awssdk.services.s3.S3AsyncClientBuilder;

class A {
    Object s3 = S3AsyncClientBuilder.standard().build();
}
"#;
        let result = transform(source);
        assert!(result.contains("Object s3 = S3AsyncClient.builder().build();"));
    }

    #[test]
    fn test_builder_variables_untouched() {
        let source = r#"import software.amazon.awssdk.services.s3.S3ClientBuilder;

class A {
    void f(S3ClientBuilder builder) {
        builder.standard();
    }
}
"#;
        assert!(check_java(source).is_empty());
    }
}
