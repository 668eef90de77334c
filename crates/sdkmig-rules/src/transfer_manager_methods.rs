//! Rule: transfer_manager_methods (Configurable)
//!
//! Rewrites v1 Transfer Manager calls (already retyped to
//! `S3TransferManager`) into the v2 request-object API using the
//! `call_templates` table, and replaces the credentials constructor with a
//! builder over an `S3AsyncClient`.
//!
//! Pattern:
//! ```java
//! // Before
//! S3TransferManager tm = new S3TransferManager(credentials);
//! tm.download("bucket", "key", file);
//!
//! // After
//! S3TransferManager tm = S3TransferManager.builder().s3Client(S3AsyncClient.builder()
//!     .credentialsProvider(StaticCredentialsProvider.create(credentials)).build()).build();
//! tm.downloadFile(DownloadFileRequest.builder().getObjectRequest(GetObjectRequest.builder()
//!     .bucket("bucket").key("key").build()).destination(file).build());
//! ```

use sdkmig_core::ast::*;
use sdkmig_core::{visit, Edit, Visitor};

use crate::comments;
use crate::imports::ImportEditor;
use crate::naming::simple_name;
use crate::patterns::{expand_template, select, MethodPattern};
use crate::recipe::RecipeTables;
use crate::registry::{Category, ConfigError, Rule, RuleError};
use crate::resolve::TypeResolver;
use crate::sdk_types::{S3_ASYNC_CLIENT, S3_TRANSFER_MANAGER};

const STATIC_CREDENTIALS_PROVIDER: &str =
    "software.amazon.awssdk.auth.credentials.StaticCredentialsProvider";
const CREDENTIALS_PACKAGE: &str = "software.amazon.awssdk.auth.credentials";

#[derive(Debug, Clone)]
pub struct CallTemplateMapping {
    pub pattern: MethodPattern,
    pub template: String,
    pub imports: Vec<String>,
    pub comment: Option<String>,
}

/// Configuration for the transfer_manager_methods rule
#[derive(Debug, Clone, Default)]
pub struct TransferManagerMethodsConfig {
    pub templates: Vec<CallTemplateMapping>,
}

impl TransferManagerMethodsConfig {
    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        let templates = tables
            .call_templates
            .iter()
            .map(|entry| {
                Ok(CallTemplateMapping {
                    pattern: MethodPattern::parse(&entry.method)?,
                    template: entry.template.clone(),
                    imports: entry.imports.clone(),
                    comment: entry.comment.clone(),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { templates })
    }
}

pub fn check_transfer_manager_methods_with_config(
    unit: &CompilationUnit,
    source: &str,
    config: &TransferManagerMethodsConfig,
) -> Vec<Edit> {
    if !source.contains("TransferManager") {
        return Vec::new();
    }

    let resolver = TypeResolver::new(unit, source);
    let mut checker = TransferManagerMethodsChecker {
        source,
        config,
        resolver: &resolver,
        imports: ImportEditor::new(unit, source),
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);

    let TransferManagerMethodsChecker { imports, mut edits, .. } = checker;
    let import_edits = imports.finish(&edits);
    edits.extend(import_edits);
    edits
}

struct TransferManagerMethodsChecker<'a, 'r> {
    source: &'a str,
    config: &'r TransferManagerMethodsConfig,
    resolver: &'r TypeResolver<'a>,
    imports: ImportEditor<'a>,
    edits: Vec<Edit>,
}

impl TransferManagerMethodsChecker<'_, '_> {
    fn check_call(&mut self, call: &MethodInvocation) {
        let Some(target) = call.target.as_deref() else {
            return;
        };
        let candidates: Vec<(usize, _)> = self
            .config
            .templates
            .iter()
            .enumerate()
            .filter(|(_, t)| t.pattern.matches_name(&call.name.name))
            .map(|(i, t)| (i, t.pattern.match_call(call, self.resolver)))
            .collect();
        let Some(index) = select(&candidates) else {
            return;
        };
        let mapping = &self.config.templates[index];

        let args: Vec<&str> = call
            .args
            .items
            .iter()
            .map(|arg| arg.span().text(self.source))
            .collect();
        let mut replacement =
            expand_template(&mapping.template, Some(target.span().text(self.source)), &args);
        if let Some(comment) = &mapping.comment {
            replacement = format!("{}{}", comments::comment_text(comment), replacement);
        }
        self.edits.push(Edit::new(
            call.span,
            replacement,
            format!("Rewrite {}() for S3TransferManager", call.name.name),
        ));
        for fqn in &mapping.imports {
            self.imports.maybe_add_import(fqn);
        }
    }

    /// `new S3TransferManager(credentials)` or `(credentialsProvider)`
    fn check_new(&mut self, new: &NewClass) {
        if new.args.len() != 1 || new.body.is_some() {
            return;
        }
        if self.resolver.resolve_type_ref(&new.class).name != S3_TRANSFER_MANAGER {
            return;
        }
        let arg = &new.args.items[0];
        let Some(arg_type) = self.resolver.type_of(arg) else {
            return;
        };
        if arg_type.is_static || !arg_type.name.starts_with(CREDENTIALS_PACKAGE) {
            return;
        }

        let arg_text = arg.span().text(self.source);
        let provider = if simple_name(&arg_type.name).ends_with("Provider") {
            arg_text.to_string()
        } else {
            self.imports.maybe_add_import(STATIC_CREDENTIALS_PROVIDER);
            format!("StaticCredentialsProvider.create({})", arg_text)
        };
        self.edits.push(Edit::new(
            new.span,
            format!(
                "S3TransferManager.builder().s3Client(S3AsyncClient.builder().credentialsProvider({}).build()).build()",
                provider
            ),
            "Build S3TransferManager over an S3AsyncClient",
        ));
        self.imports.maybe_add_import(S3_ASYNC_CLIENT);
    }
}

impl<'a> Visitor<'a> for TransferManagerMethodsChecker<'a, '_> {
    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        match expr {
            Expr::MethodInvocation(call) => self.check_call(call),
            Expr::NewClass(new) => self.check_new(new),
            _ => {}
        }
        true
    }
}

pub struct TransferManagerMethodsRule {
    config: TransferManagerMethodsConfig,
}

impl TransferManagerMethodsRule {
    pub fn new(config: TransferManagerMethodsConfig) -> Self {
        Self { config }
    }

    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        Ok(Self::new(TransferManagerMethodsConfig::from_tables(tables)?))
    }
}

impl Rule for TransferManagerMethodsRule {
    fn name(&self) -> &'static str {
        "transfer_manager_methods"
    }

    fn description(&self) -> &'static str {
        "Rewrite Transfer Manager calls to the S3TransferManager request API"
    }

    fn category(&self) -> Category {
        Category::S3
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_transfer_manager_methods_with_config(unit, source, &self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_core::{apply_edits, parse_java};

    fn check_java(source: &str) -> Vec<Edit> {
        let config =
            TransferManagerMethodsConfig::from_tables(&RecipeTables::builtin().unwrap()).unwrap();
        let unit = parse_java(source).unwrap();
        check_transfer_manager_methods_with_config(&unit, source, &config)
    }

    fn transform(source: &str) -> String {
        apply_edits(source, &check_java(source)).unwrap()
    }

    #[test]
    fn test_download_with_bucket_key_file() {
        let source = r#"import java.io.File;
import software.amazon.awssdk.transfer.s3.S3TransferManager;

class A {
    void f(S3TransferManager tm, File file) {
        tm.download("bucket", "key", file);
    }
}
"#;
        let result = transform(source);
        assert!(result.contains(
            "tm.downloadFile(DownloadFileRequest.builder().getObjectRequest(GetObjectRequest.builder().bucket(\"bucket\").key(\"key\").build()).destination(file).build());"
        ));
        assert!(result.contains("import software.amazon.awssdk.transfer.s3.model.DownloadFileRequest;"));
        assert!(result.contains("import software.amazon.awssdk.services.s3.model.GetObjectRequest;"));
    }

    #[test]
    fn test_simple_renames() {
        let source = r#"import software.amazon.awssdk.transfer.s3.S3TransferManager;

class A {
    void f(S3TransferManager tm, Object state) {
        tm.resumeDownload(state);
        tm.shutdownNow();
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("tm.resumeDownloadFile(state);"));
        assert!(result.contains("tm.close();"));
    }

    #[test]
    fn test_static_factories() {
        let source = r#"import software.amazon.awssdk.transfer.s3.S3TransferManager;

class A {
    S3TransferManager a = S3TransferManager.defaultTransferManager();
    S3TransferManager b = S3TransferManager.standard().build();
}
"#;
        let result = transform(source);
        assert!(result.contains("S3TransferManager a = S3TransferManager.create();"));
        assert!(result.contains("S3TransferManager b = S3TransferManager.builder().build();"));
    }

    #[test]
    fn test_credentials_constructor() {
        let source = r#"import software.amazon.awssdk.auth.credentials.AwsCredentials;
import software.amazon.awssdk.transfer.s3.S3TransferManager;

class A {
    S3TransferManager f(AwsCredentials credentials) {
        return new S3TransferManager(credentials);
    }
}
"#;
        let result = transform(source);
        assert!(result.contains(
            "return S3TransferManager.builder().s3Client(S3AsyncClient.builder().credentialsProvider(StaticCredentialsProvider.create(credentials)).build()).build();"
        ));
        assert!(result.contains("import software.amazon.awssdk.services.s3.S3AsyncClient;"));
        assert!(result.contains("import software.amazon.awssdk.auth.credentials.StaticCredentialsProvider;"));
    }

    #[test]
    fn test_credentials_provider_constructor() {
        let source = r#"import software.amazon.awssdk.auth.credentials.AwsCredentialsProvider;
import software.amazon.awssdk.transfer.s3.S3TransferManager;

class A {
    S3TransferManager f(AwsCredentialsProvider provider) {
        return new S3TransferManager(provider);
    }
}
"#;
        let result = transform(source);
        assert!(result.contains(
            "S3TransferManager.builder().s3Client(S3AsyncClient.builder().credentialsProvider(provider).build()).build()"
        ));
        assert!(!result.contains("StaticCredentialsProvider"));
    }

    #[test]
    fn test_rewritten_calls_are_stable() {
        let source = r#"import software.amazon.awssdk.transfer.s3.S3TransferManager;
import software.amazon.awssdk.services.s3.model.CopyObjectRequest;

class A {
    void f(S3TransferManager tm, CopyObjectRequest request) {
        tm.copy(request);
    }
}
"#;
        let once = transform(source);
        assert!(once.contains("tm.copy(CopyRequest.builder().copyObjectRequest(request).build());"));
        assert!(check_java(&once).is_empty());
    }
}
