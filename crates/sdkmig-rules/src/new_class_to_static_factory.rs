//! Rule: new_class_to_static_factory (Configurable)
//!
//! Credential and provider types in v2 have private constructors and
//! static factories instead.
//!
//! Pattern:
//! ```java
//! // Before
//! new AwsBasicCredentials(accessKey, secretKey)
//! new DefaultCredentialsProvider()
//!
//! // After
//! AwsBasicCredentials.create(accessKey, secretKey)
//! DefaultCredentialsProvider.create()
//! ```
//!
//! A listed type constructed with more than three arguments has no factory
//! and fails the file.

use sdkmig_core::ast::*;
use sdkmig_core::{logging, visit, Edit, Visitor};

use crate::recipe::RecipeTables;
use crate::registry::{Category, ConfigError, Rule, RuleError};
use crate::resolve::TypeResolver;

/// Largest factory arity any v2 credentials type offers
pub const MAX_FACTORY_ARGS: usize = 3;

#[derive(Debug, Clone)]
pub struct StaticFactoryMapping {
    pub type_name: String,
    pub method: String,
    pub max_args: usize,
}

/// Configuration for the new_class_to_static_factory rule
#[derive(Debug, Clone, Default)]
pub struct NewClassToStaticFactoryConfig {
    pub factories: Vec<StaticFactoryMapping>,
}

impl NewClassToStaticFactoryConfig {
    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        let mut factories = Vec::new();
        for entry in &tables.static_factories {
            if entry.max_args > MAX_FACTORY_ARGS {
                return Err(ConfigError::FactoryArity {
                    type_name: entry.type_name.clone(),
                    max_args: entry.max_args,
                });
            }
            factories.push(StaticFactoryMapping {
                type_name: entry.type_name.clone(),
                method: entry.method.clone(),
                max_args: entry.max_args,
            });
        }
        Ok(Self { factories })
    }
}

pub fn check_new_class_to_static_factory_with_config(
    unit: &CompilationUnit,
    source: &str,
    config: &NewClassToStaticFactoryConfig,
) -> Result<Vec<Edit>, RuleError> {
    if config.factories.is_empty() || !source.contains("new ") {
        return Ok(Vec::new());
    }

    let resolver = TypeResolver::new(unit, source);
    let mut checker = NewClassToStaticFactoryChecker {
        source,
        config,
        resolver: &resolver,
        error: None,
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);

    match checker.error {
        Some(err) => Err(err),
        None => Ok(checker.edits),
    }
}

struct NewClassToStaticFactoryChecker<'a, 'r> {
    source: &'a str,
    config: &'r NewClassToStaticFactoryConfig,
    resolver: &'r TypeResolver<'a>,
    error: Option<RuleError>,
    edits: Vec<Edit>,
}

impl NewClassToStaticFactoryChecker<'_, '_> {
    fn check_new(&mut self, new: &NewClass) {
        if new.body.is_some() {
            return;
        }
        let fqn = self.resolver.resolve_type_ref(&new.class).name;
        let Some(factory) = self.config.factories.iter().find(|f| f.type_name == fqn) else {
            return;
        };

        let count = new.args.len();
        if count > MAX_FACTORY_ARGS {
            self.error = Some(RuleError::UnsupportedArgumentCount {
                type_name: fqn,
                count,
                max: MAX_FACTORY_ARGS,
            });
            return;
        }
        if count > factory.max_args {
            logging::log(&format!(
                "Skipping new {} with {} arguments: {}() takes at most {}",
                fqn, count, factory.method, factory.max_args
            ));
            return;
        }

        let type_text = new.class.name_span.text(self.source);
        let args = if new.args.is_empty() {
            ""
        } else {
            new.args.inner_span().text(self.source)
        };
        self.edits.push(Edit::new(
            new.span,
            format!("{}.{}({})", type_text, factory.method, args),
            format!("Replace new {}() with {}.{}()", type_text, type_text, factory.method),
        ));
    }
}

impl<'a> Visitor<'a> for NewClassToStaticFactoryChecker<'a, '_> {
    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        if self.error.is_some() {
            return false;
        }
        if let Expr::NewClass(new) = expr {
            self.check_new(new);
        }
        true
    }
}

pub struct NewClassToStaticFactoryRule {
    config: NewClassToStaticFactoryConfig,
}

impl NewClassToStaticFactoryRule {
    pub fn new(config: NewClassToStaticFactoryConfig) -> Self {
        Self { config }
    }

    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        Ok(Self::new(NewClassToStaticFactoryConfig::from_tables(tables)?))
    }
}

impl Rule for NewClassToStaticFactoryRule {
    fn name(&self) -> &'static str {
        "new_class_to_static_factory"
    }

    fn description(&self) -> &'static str {
        "Replace constructors of credential types with static factories"
    }

    fn category(&self) -> Category {
        Category::CallPatterns
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        check_new_class_to_static_factory_with_config(unit, source, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_core::{apply_edits, parse_java, retain_non_conflicting};

    fn check_java(source: &str) -> Result<Vec<Edit>, RuleError> {
        let config =
            NewClassToStaticFactoryConfig::from_tables(&RecipeTables::builtin().unwrap()).unwrap();
        let unit = parse_java(source).unwrap();
        check_new_class_to_static_factory_with_config(&unit, source, &config)
    }

    /// Nested constructors overlap; the inner one lands on a later pass
    fn transform(source: &str) -> String {
        let mut current = source.to_string();
        for _ in 0..8 {
            let edits = check_java(&current).unwrap();
            if edits.is_empty() {
                break;
            }
            let (edits, _) = retain_non_conflicting(edits);
            current = apply_edits(&current, &edits).unwrap();
        }
        current
    }

    #[test]
    fn test_credentials_factories() {
        let source = r#"import software.amazon.awssdk.auth.credentials.AwsBasicCredentials;
import software.amazon.awssdk.auth.credentials.DefaultCredentialsProvider;
import software.amazon.awssdk.auth.credentials.StaticCredentialsProvider;

class A {
    Object f(String key, String secret) {
        Object provider = new DefaultCredentialsProvider();
        return new StaticCredentialsProvider(new AwsBasicCredentials(key, secret));
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("Object provider = DefaultCredentialsProvider.create();"));
        assert!(result.contains("return StaticCredentialsProvider.create(AwsBasicCredentials.create(key, secret));"));
    }

    #[test]
    fn test_too_many_arguments_fails() {
        let source = r#"import software.amazon.awssdk.auth.credentials.AwsSessionCredentials;

class A {
    Object f() {
        return new AwsSessionCredentials("a", "b", "c", "d");
    }
}
"#;
        let err = check_java(source).unwrap_err();
        assert!(matches!(err, RuleError::UnsupportedArgumentCount { count: 4, max: 3, .. }));
    }

    #[test]
    fn test_unlisted_types_untouched() {
        let source = r#"import software.amazon.awssdk.services.s3.model.Tag;

class A {
    Object f() {
        return new Tag();
    }
}
"#;
        assert!(check_java(source).unwrap().is_empty());
    }

    #[test]
    fn test_factory_arity_validation() {
        let tables = crate::recipe::load_tables_from_string(
            "static_factories:\n  - type: com.acme.Credentials\n    max_args: 2\n",
        )
        .unwrap();
        let config = NewClassToStaticFactoryConfig::from_tables(&tables).unwrap();
        assert_eq!(config.factories[0].method, "create");
        assert_eq!(config.factories[0].max_args, 2);
    }
}
