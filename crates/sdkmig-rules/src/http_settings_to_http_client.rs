//! Rule: http_settings_to_http_client
//!
//! v1 `ClientConfiguration` mixed HTTP transport settings with request
//! settings. In v2 the transport settings belong to the HTTP client, so they
//! are taken out of the `ClientOverrideConfiguration` builder chain and
//! re-applied through `httpClientBuilder(...)` on every SDK client builder
//! that receives that configuration.
//!
//! Settings are recorded under the variable the configuration is assigned
//! to, the method that returns it, or (for a configuration built inline)
//! the `overrideConfiguration` call it is passed to.
//!
//! Pattern:
//! ```java
//! // Before
//! ClientOverrideConfiguration config = ClientOverrideConfiguration.builder()
//!     .maxConnections(100)
//!     .build();
//! SqsClient sqs = SqsClient.builder().overrideConfiguration(config).build();
//!
//! // After
//! ClientOverrideConfiguration config = ClientOverrideConfiguration.builder()
//!     .build();
//! SqsClient sqs = SqsClient.builder().httpClientBuilder(ApacheHttpClient.builder().maxConnections(100)).overrideConfiguration(config).build();
//! ```
//!
//! Async clients get `NettyNioAsyncHttpClient` instead, where
//! `maxConnections` is `maxConcurrency` and `socketTimeout` is `readTimeout`.

use std::collections::HashSet;

use sdkmig_core::ast::*;
use sdkmig_core::{logging, visit, Edit, Scope, Span, Visitor};

use crate::comments;
use crate::context::MigrationContext;
use crate::imports::ImportEditor;
use crate::naming::simple_name;
use crate::registry::{Category, Rule, RuleError};
use crate::resolve::TypeResolver;
use crate::sdk_types::{
    is_v2_async_builder, is_v2_client_builder, APACHE_HTTP_CLIENT, CLIENT_OVERRIDE_CONFIGURATION,
    NETTY_HTTP_CLIENT,
};

/// `ClientOverrideConfiguration.Builder` methods that configure the transport
const HTTP_SETTINGS: &[&str] = &[
    "maxConnections",
    "connectionTimeout",
    "connectionTimeToLive",
    "connectionMaxIdleTime",
    "tcpKeepAlive",
    "connectionTtl",
    "socketTimeout",
];

const UNATTACHED_SETTINGS: &str = "HTTP settings are not part of ClientOverrideConfiguration in v2. \
     Configure them on the SDK client with httpClientBuilder(ApacheHttpClient.builder()) or \
     httpClientBuilder(NettyNioAsyncHttpClient.builder()).";

#[derive(Debug, Clone)]
struct HttpSettings {
    /// `(setting, value)` in source order
    values: Vec<(String, String)>,
    /// Chain text removed once the settings are re-applied
    removals: Vec<Span>,
    anchor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Collect,
    Attach,
}

#[derive(Debug, Clone)]
enum Owner {
    Variable(String),
    /// Method returning a `ClientOverrideConfiguration`
    Method(String),
    Call { name: String, start: usize },
    Other,
}

pub fn check_http_settings_to_http_client(unit: &CompilationUnit, source: &str) -> Vec<Edit> {
    if !source.contains("ClientOverrideConfiguration") {
        return Vec::new();
    }

    let resolver = TypeResolver::new(unit, source);
    let mut checker = HttpSettingsChecker {
        source,
        resolver: &resolver,
        imports: ImportEditor::new(unit, source),
        phase: Phase::Collect,
        owners: Vec::new(),
        handled: HashSet::new(),
        http_client_links: HashSet::new(),
        settings: MigrationContext::new(),
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);
    checker.phase = Phase::Attach;
    checker.handled.clear();
    visit(&mut checker, unit, source);

    let HttpSettingsChecker {
        imports,
        settings,
        mut edits,
        ..
    } = checker;

    let summary = settings.finish();
    for recorded in summary.consumed {
        for span in recorded.removals {
            edits.push(Edit::delete(span, "Move HTTP setting to the HTTP client builder"));
        }
    }
    for recorded in summary.pending {
        let names: Vec<&str> = recorded.values.iter().map(|(name, _)| name.as_str()).collect();
        logging::log(&format!(
            "HTTP settings [{}] are not passed to any SDK client builder; left in place",
            names.join(", ")
        ));
        edits.extend(comments::annotate(source, recorded.anchor, UNATTACHED_SETTINGS));
    }

    let import_edits = imports.finish(&edits);
    edits.extend(import_edits);
    edits
}

struct HttpSettingsChecker<'a, 'r> {
    source: &'a str,
    resolver: &'r TypeResolver<'a>,
    imports: ImportEditor<'a>,
    phase: Phase,
    owners: Vec<Owner>,
    /// End offsets of chain links already examined
    handled: HashSet<usize>,
    /// End offsets of links in chains that already call `httpClientBuilder`
    http_client_links: HashSet<usize>,
    settings: MigrationContext<HttpSettings>,
    edits: Vec<Edit>,
}

impl HttpSettingsChecker<'_, '_> {
    fn is_config_builder(&self, expr: &Expr) -> bool {
        self.resolver.type_of(expr).is_some_and(|ty| {
            !ty.is_static
                && ty
                    .name
                    .strip_prefix(CLIENT_OVERRIDE_CONFIGURATION)
                    .is_some_and(|rest| rest == ".Builder")
        })
    }

    fn collect_chain(&mut self, call: &MethodInvocation) {
        if self.handled.contains(&call.span.end) {
            return;
        }
        let (links, _) = call.chain();
        for link in &links {
            self.handled.insert(link.span.end);
        }

        let mut recorded = HttpSettings {
            values: Vec::new(),
            removals: Vec::new(),
            anchor: 0,
        };
        for link in links.iter().rev() {
            let name = link.name.name.as_str();
            if !HTTP_SETTINGS.contains(&name) || link.args.len() != 1 {
                continue;
            }
            let Some(target) = link.target.as_deref() else {
                continue;
            };
            if !self.is_config_builder(target) {
                continue;
            }
            if recorded.values.is_empty() {
                recorded.anchor = link.name.span.start;
            }
            let value = link.args.items[0].span().text(self.source).to_string();
            recorded.values.push((name.to_string(), value));
            recorded.removals.push(Span::new(target.span().end, link.span.end));
        }
        if recorded.values.is_empty() {
            return;
        }

        let key = match self.owners.last() {
            Some(Owner::Variable(name)) => Some(name.clone()),
            Some(Owner::Method(name)) => Some(method_key(name)),
            Some(Owner::Call { name, start }) if name == "overrideConfiguration" => Some(inline_key(*start)),
            _ => None,
        };
        match key {
            Some(key) => self.settings.record(&key, recorded),
            None => {
                logging::log("HTTP settings on a configuration with no variable or method; left in place");
                self.edits
                    .extend(comments::annotate(self.source, recorded.anchor, UNATTACHED_SETTINGS));
            }
        }
    }

    /// Outer calls are visited first, so a chain is scanned whole before any of its links
    fn scan_chain(&mut self, call: &MethodInvocation) {
        if self.handled.contains(&call.span.end) {
            return;
        }
        let (links, _) = call.chain();
        let sets_client = links.iter().any(|link| link.name.name == "httpClientBuilder");
        for link in &links {
            self.handled.insert(link.span.end);
            if sets_client {
                self.http_client_links.insert(link.span.end);
            }
        }
    }

    /// `clientBuilder.overrideConfiguration(config)`
    fn attach(&mut self, call: &MethodInvocation) {
        if call.name.name != "overrideConfiguration" || call.args.len() != 1 {
            return;
        }
        let Some(target) = call.target.as_deref() else {
            return;
        };
        let Some(builder) = self.resolver.type_of(target) else {
            return;
        };
        if builder.is_static || !is_v2_client_builder(&builder.name) {
            return;
        }
        if self.http_client_links.contains(&call.span.end) {
            logging::log(&format!(
                "{} already sets an HTTP client; HTTP settings not moved",
                simple_name(&builder.name)
            ));
            return;
        }

        let values = match call.args.items[0].unparenthesized() {
            Expr::Identifier(ident) => self.settings.share(&ident.name).map(|s| s.values.clone()),
            Expr::MethodInvocation(config_call)
                if config_call.args.is_empty()
                    && matches!(config_call.target.as_deref(), None | Some(Expr::This(_))) =>
            {
                self.settings
                    .share(&method_key(&config_call.name.name))
                    .map(|s| s.values.clone())
            }
            _ => self
                .settings
                .take(&inline_key(call.span.start))
                .map(|s| s.values.clone()),
        };
        let Some(values) = values else {
            return;
        };

        let async_client = is_v2_async_builder(&builder.name);
        let http_client = if async_client {
            NETTY_HTTP_CLIENT
        } else {
            APACHE_HTTP_CLIENT
        };
        let mut text = format!(".httpClientBuilder({}.builder()", simple_name(http_client));
        for (name, value) in &values {
            text.push_str(&format!(".{}({})", http_client_setting(name, async_client), value));
        }
        text.push(')');

        self.imports.maybe_add_import(http_client);
        self.edits.push(Edit::insert(
            target.span().end,
            text,
            format!("Configure HTTP settings on {}", simple_name(http_client)),
        ));
    }
}

impl<'a> Visitor<'a> for HttpSettingsChecker<'a, '_> {
    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        if let Expr::MethodInvocation(call) = expr {
            match self.phase {
                Phase::Collect => self.collect_chain(call),
                Phase::Attach => {
                    self.scan_chain(call);
                    self.attach(call);
                }
            }
        }
        true
    }

    fn enter_scope(&mut self, scope: Scope<'a>) {
        let owner = match scope {
            Scope::Variable { declarator, .. } => Owner::Variable(declarator.name.name.clone()),
            Scope::Assignment { target } => match target.as_identifier() {
                Some(ident) => Owner::Variable(ident.name.clone()),
                None => Owner::Other,
            },
            Scope::Method(method) => {
                let returns_config = method.return_type.as_ref().is_some_and(|ty| {
                    self.resolver.resolve_type_ref(ty).name == CLIENT_OVERRIDE_CONFIGURATION
                });
                if returns_config {
                    Owner::Method(method.name.name.clone())
                } else {
                    Owner::Other
                }
            }
            Scope::Arguments(call) => Owner::Call {
                name: call.name.name.clone(),
                start: call.span.start,
            },
            _ => Owner::Other,
        };
        self.owners.push(owner);
    }

    fn leave_scope(&mut self, _scope: Scope<'a>) {
        self.owners.pop();
    }
}

fn method_key(name: &str) -> String {
    format!("{}()", name)
}

/// Key of a configuration built inside the call starting at `call_start`
fn inline_key(call_start: usize) -> String {
    format!("@{}", call_start)
}

/// Builder method for a setting on the chosen HTTP client
fn http_client_setting(name: &str, async_client: bool) -> &str {
    match (name, async_client) {
        ("connectionTtl", _) => "connectionTimeToLive",
        ("maxConnections", true) => "maxConcurrency",
        ("socketTimeout", true) => "readTimeout",
        _ => name,
    }
}

pub struct HttpSettingsToHttpClientRule;

impl Rule for HttpSettingsToHttpClientRule {
    fn name(&self) -> &'static str {
        "http_settings_to_http_client"
    }

    fn description(&self) -> &'static str {
        "Move HTTP settings from ClientOverrideConfiguration to the SDK client's HTTP client builder"
    }

    fn category(&self) -> Category {
        Category::Http
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_http_settings_to_http_client(unit, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_core::{apply_edits, parse_java};

    fn check_java(source: &str) -> Vec<Edit> {
        let unit = parse_java(source).unwrap();
        check_http_settings_to_http_client(&unit, source)
    }

    fn transform(source: &str) -> String {
        apply_edits(source, &check_java(source)).unwrap()
    }

    #[test]
    fn test_local_variable_settings_move_to_apache_client() {
        let source = r#"import software.amazon.awssdk.core.client.config.ClientOverrideConfiguration;
import software.amazon.awssdk.services.sqs.SqsClient;
import java.time.Duration;

public class Example {
    public void test() {
        ClientOverrideConfiguration clientConfiguration = ClientOverrideConfiguration.builder()
            .apiCallAttemptTimeout(Duration.ofMillis(1000))
            .maxConnections(1000)
            .tcpKeepAlive(true)
            .build();

        SqsClient sqs = SqsClient.builder()
            .overrideConfiguration(clientConfiguration)
            .build();
    }
}
"#;
        let result = transform(source);
        assert!(result.contains(
            "ClientOverrideConfiguration.builder()\n            .apiCallAttemptTimeout(Duration.ofMillis(1000))\n            .build();"
        ));
        assert!(result.contains(
            "SqsClient.builder().httpClientBuilder(ApacheHttpClient.builder().maxConnections(1000).tcpKeepAlive(true))\n            .overrideConfiguration(clientConfiguration)"
        ));
        assert!(result.contains("import software.amazon.awssdk.http.apache.ApacheHttpClient;"));
        assert!(check_java(&result).is_empty());
    }

    #[test]
    fn test_builder_variable_without_build() {
        let source = r#"import software.amazon.awssdk.core.client.config.ClientOverrideConfiguration;
import software.amazon.awssdk.services.sqs.SqsClient;
import software.amazon.awssdk.services.sqs.SqsClientBuilder;

public class Example {
    private void method() {
        ClientOverrideConfiguration configuration = ClientOverrideConfiguration.builder().maxConnections(2000).build();
        SqsClientBuilder clientBuilder = SqsClient.builder();
        clientBuilder.overrideConfiguration(configuration);
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("ClientOverrideConfiguration configuration = ClientOverrideConfiguration.builder().build();"));
        assert!(result.contains(
            "clientBuilder.httpClientBuilder(ApacheHttpClient.builder().maxConnections(2000)).overrideConfiguration(configuration);"
        ));
    }

    #[test]
    fn test_method_config_shared_by_sync_and_async_clients() {
        let source = r#"import software.amazon.awssdk.core.client.config.ClientOverrideConfiguration;
import software.amazon.awssdk.services.sqs.SqsAsyncClient;
import software.amazon.awssdk.services.sqs.SqsClient;
import java.time.Duration;

public class Example {
    public ClientOverrideConfiguration configuration() {
        return ClientOverrideConfiguration.builder().maxConnections(50).socketTimeout(Duration.ofSeconds(5)).build();
    }

    public void test() {
        SqsAsyncClient a = SqsAsyncClient.builder().overrideConfiguration(configuration()).build();
        SqsClient b = SqsClient.builder().overrideConfiguration(configuration()).build();
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("return ClientOverrideConfiguration.builder().build();"));
        assert!(result.contains(
            "SqsAsyncClient.builder().httpClientBuilder(NettyNioAsyncHttpClient.builder().maxConcurrency(50).readTimeout(Duration.ofSeconds(5))).overrideConfiguration(configuration())"
        ));
        assert!(result.contains(
            "SqsClient.builder().httpClientBuilder(ApacheHttpClient.builder().maxConnections(50).socketTimeout(Duration.ofSeconds(5))).overrideConfiguration(configuration())"
        ));
        assert!(result.contains("import software.amazon.awssdk.http.nio.netty.NettyNioAsyncHttpClient;"));
        assert!(check_java(&result).is_empty());
    }

    #[test]
    fn test_inline_configuration() {
        let source = r#"import software.amazon.awssdk.core.client.config.ClientOverrideConfiguration;
import software.amazon.awssdk.services.s3.S3Client;
import java.time.Duration;

public class Example {
    S3Client s3 = S3Client.builder().overrideConfiguration(ClientOverrideConfiguration.builder().connectionTtl(Duration.ofSeconds(2)).build()).build();
}
"#;
        let result = transform(source);
        assert!(result.contains(
            "S3Client.builder().httpClientBuilder(ApacheHttpClient.builder().connectionTimeToLive(Duration.ofSeconds(2))).overrideConfiguration(ClientOverrideConfiguration.builder().build()).build();"
        ));
    }

    #[test]
    fn test_existing_http_client_builder_keeps_settings() {
        let source = r#"import software.amazon.awssdk.core.client.config.ClientOverrideConfiguration;
import software.amazon.awssdk.http.apache.ApacheHttpClient;
import software.amazon.awssdk.services.sqs.SqsClient;

public class Example {
    public void test() {
        ClientOverrideConfiguration config = ClientOverrideConfiguration.builder().maxConnections(10).build();
        SqsClient sqs = SqsClient.builder().httpClientBuilder(ApacheHttpClient.builder()).overrideConfiguration(config).build();
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("maxConnections(10)"));
        assert!(result.contains(&comments::comment_text(UNATTACHED_SETTINGS)));
        assert!(result.contains(
            "SqsClient.builder().httpClientBuilder(ApacheHttpClient.builder()).overrideConfiguration(config)"
        ));
        assert!(check_java(&result).is_empty());
    }

    #[test]
    fn test_http_client_builder_after_override_configuration() {
        let source = r#"import software.amazon.awssdk.core.client.config.ClientOverrideConfiguration;
import software.amazon.awssdk.http.apache.ApacheHttpClient;
import software.amazon.awssdk.services.sqs.SqsClient;

public class Example {
    public void test() {
        ClientOverrideConfiguration cfg = ClientOverrideConfiguration.builder().maxConnections(10).build();
        SqsClient sqs = SqsClient.builder().overrideConfiguration(cfg).httpClientBuilder(ApacheHttpClient.builder()).build();
    }
}
"#;
        let result = transform(source);
        assert_eq!(result.matches("httpClientBuilder(").count(), 1);
        assert!(result.contains("maxConnections(10)"));
        assert!(result.contains(&comments::comment_text(UNATTACHED_SETTINGS)));
        assert!(check_java(&result).is_empty());
    }
}
