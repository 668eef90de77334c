//! Rule: exception_accessors
//!
//! v1 `AmazonServiceException` getters become v2 `AwsServiceException`
//! accessors, most of which moved under `awsErrorDetails()`.
//!
//! Pattern:
//! ```java
//! // Before
//! catch (AmazonServiceException e) {
//!     log(e.getErrorCode(), e.getStatusCode());
//! }
//!
//! // After
//! catch (AmazonServiceException e) {
//!     log(e.awsErrorDetails().errorCode(), e.statusCode());
//! }
//! ```

use sdkmig_core::ast::*;
use sdkmig_core::{visit, Edit, Span, Visitor};

use crate::comments;
use crate::registry::{Category, Rule, RuleError};
use crate::resolve::TypeResolver;
use crate::sdk_types::V1_SERVICE_EXCEPTION;

/// v1 getter → v2 accessor chain
const ACCESSORS: &[(&str, &str)] = &[
    ("getErrorCode", "awsErrorDetails().errorCode()"),
    ("getErrorMessage", "awsErrorDetails().errorMessage()"),
    ("getServiceName", "awsErrorDetails().serviceName()"),
    ("getStatusCode", "statusCode()"),
    ("getRequestId", "requestId()"),
    ("getHttpHeaders", "awsErrorDetails().sdkHttpResponse().headers()"),
    ("getRawResponseContent", "awsErrorDetails().rawResponse().asUtf8String()"),
    ("getRawResponse", "awsErrorDetails().rawResponse().asByteArray()"),
];

const ERROR_TYPE_COMMENT: &str = "getErrorType is not supported in v2. AwsServiceException is a \
service-side error; use isThrottlingException() or isClockSkewException() for specific checks.";

pub fn check_exception_accessors(unit: &CompilationUnit, source: &str) -> Vec<Edit> {
    let resolver = TypeResolver::new(unit, source);
    let mut checker = ExceptionAccessorsChecker {
        source,
        resolver: &resolver,
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);
    checker.edits
}

struct ExceptionAccessorsChecker<'a, 'r> {
    source: &'a str,
    resolver: &'r TypeResolver<'a>,
    edits: Vec<Edit>,
}

impl ExceptionAccessorsChecker<'_, '_> {
    fn is_service_exception(&self, target: &Expr) -> bool {
        self.resolver
            .type_of(target)
            .is_some_and(|ty| ty.is_instance_of(V1_SERVICE_EXCEPTION))
    }

    fn check_call(&mut self, call: &MethodInvocation) {
        if !call.args.is_empty() {
            return;
        }
        let Some(target) = call.target.as_deref() else {
            return;
        };
        let name = call.name.name.as_str();
        if name == "getErrorType" {
            if self.is_service_exception(target) {
                if let Some(edit) = comments::annotate(self.source, call.span.start, ERROR_TYPE_COMMENT) {
                    self.edits.push(edit);
                }
            }
            return;
        }
        let Some((_, replacement)) = ACCESSORS.iter().find(|(getter, _)| *getter == name) else {
            return;
        };
        if !self.is_service_exception(target) {
            return;
        }
        self.edits.push(Edit::new(
            Span::new(call.name.span.start, call.span.end),
            *replacement,
            format!("Replace {}() with {}", name, replacement),
        ));
    }
}

impl<'a> Visitor<'a> for ExceptionAccessorsChecker<'a, '_> {
    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        if let Expr::MethodInvocation(call) = expr {
            self.check_call(call);
        }
        true
    }
}

pub struct ExceptionAccessorsRule;

impl Rule for ExceptionAccessorsRule {
    fn name(&self) -> &'static str {
        "exception_accessors"
    }

    fn description(&self) -> &'static str {
        "Rewrite AmazonServiceException getters to AwsServiceException accessors"
    }

    fn category(&self) -> Category {
        Category::Exceptions
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_exception_accessors(unit, source))
    }
}
