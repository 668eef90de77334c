//! Rule trait and registry for sdkmig migration rules

use std::collections::HashSet;
use std::path::PathBuf;

use sdkmig_core::ast::CompilationUnit;
use sdkmig_core::Edit;
use thiserror::Error;

use crate::naming::TypeMapper;
use crate::recipe::RecipeTables;
use crate::{
    change_sdk_type, client_builder_statics, enum_casing, exception_accessors, getter_to_accessor,
    http_settings_to_http_client, method_renames, new_class_to_builder, new_class_to_static_factory,
    numeric_to_duration, s3_method_args, s3_object_stream, s3_put_object_payload, s3_unsupported_comments,
    s3_uri_comments, setter_to_builder, transfer_manager_methods,
};

/// Rule categories for filtering and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Type and import rewrites
    Types,
    /// Method, constructor and builder call shapes
    CallPatterns,
    /// S3 and Transfer Manager specific rewrites
    S3,
    /// HTTP client configuration
    Http,
    /// Exception accessors
    Exceptions,
    /// Migration comments for code without an automatic equivalent
    Annotations,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Types => "types",
            Category::CallPatterns => "call-patterns",
            Category::S3 => "s3",
            Category::Http => "http",
            Category::Exceptions => "exceptions",
            Category::Annotations => "annotations",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that make a rule give up on a file
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("{type_name} constructed with {count} arguments; static factory supports at most {max}")]
    UnsupportedArgumentCount {
        type_name: String,
        count: usize,
        max: usize,
    },
}

/// Invalid recipe tables or settings, detected when rules are built
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read recipe file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid recipe YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{type_name}: {params} parameter types but {names} fluent names")]
    LengthMismatch {
        type_name: String,
        params: usize,
        names: usize,
    },

    #[error("{type_name}: static factory max_args {max_args} exceeds 3")]
    FactoryArity { type_name: String, max_args: usize },

    #[error("{method}: unsupported time unit `{unit}` (expected millis, seconds or minutes)")]
    UnsupportedTimeUnit { method: String, unit: String },

    #[error("malformed pattern `{pattern}`: {reason}")]
    MalformedPattern { pattern: String, reason: String },

    #[error("invalid recipe entry: {0}")]
    Validation(String),
}

/// A migration rule that inspects one Java file and proposes edits
pub trait Rule: Send + Sync {
    /// The unique identifier for this rule (e.g., "change_sdk_type")
    fn name(&self) -> &'static str;

    /// A short description of what this rule does
    fn description(&self) -> &'static str;

    fn category(&self) -> Category;

    /// Check a parsed file and return suggested edits
    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError>;
}

/// Ordered registry of migration rules
///
/// Registration order is pipeline order: later rules see the output of
/// earlier ones.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Build every rule from recipe tables
    pub fn from_tables(
        tables: &RecipeTables,
        excluded_namespaces: &[String],
    ) -> Result<Self, ConfigError> {
        let mapper = TypeMapper::new(excluded_namespaces.to_vec());
        let mut registry = Self::new();

        registry.register(Box::new(s3_unsupported_comments::S3UnsupportedCommentsRule::from_tables(tables)?));
        registry.register(Box::new(s3_uri_comments::S3UriCommentsRule));
        registry.register(Box::new(exception_accessors::ExceptionAccessorsRule));
        registry.register(Box::new(method_renames::MethodRenamesRule::from_tables(tables)?));
        registry.register(Box::new(numeric_to_duration::NumericToDurationRule::from_tables(tables)?));
        registry.register(Box::new(s3_object_stream::S3ObjectStreamRule));
        registry.register(Box::new(change_sdk_type::ChangeSdkTypeRule::new(mapper.clone())));
        registry.register(Box::new(client_builder_statics::ClientBuilderStaticsRule));
        registry.register(Box::new(s3_method_args::S3MethodArgsRule::from_tables(tables)?));
        registry.register(Box::new(transfer_manager_methods::TransferManagerMethodsRule::from_tables(tables)?));
        registry.register(Box::new(new_class_to_builder::NewClassToBuilderRule::from_tables(tables)?));
        registry.register(Box::new(new_class_to_static_factory::NewClassToStaticFactoryRule::from_tables(tables)?));
        registry.register(Box::new(s3_put_object_payload::S3PutObjectPayloadRule));
        registry.register(Box::new(setter_to_builder::SetterToBuilderRule::from_tables(tables)?));
        registry.register(Box::new(getter_to_accessor::GetterToAccessorRule::from_tables(tables)?));
        registry.register(Box::new(enum_casing::EnumCasingRule::new(mapper)));
        registry.register(Box::new(http_settings_to_http_client::HttpSettingsToHttpClientRule));

        Ok(registry)
    }

    /// All rules built from the embedded default recipes
    pub fn with_defaults() -> Result<Self, ConfigError> {
        Self::from_tables(&RecipeTables::builtin()?, &[])
    }

    /// Register a new rule at the end of the pipeline
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    /// Get all rule names in pipeline order
    pub fn all_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Rule> {
        self.rules
            .iter()
            .find(|r| r.name() == name)
            .map(|r| r.as_ref())
    }

    /// Get rules filtered by enabled names, in pipeline order
    pub fn get_enabled(&self, enabled: &HashSet<String>) -> Vec<&dyn Rule> {
        self.rules
            .iter()
            .filter(|r| enabled.contains(r.name()))
            .map(|r| r.as_ref())
            .collect()
    }

    /// Get all rules with their descriptions (for --list-rules)
    pub fn list_rules(&self) -> Vec<(&'static str, &'static str, Category)> {
        self.rules
            .iter()
            .map(|r| (r.name(), r.description(), r.category()))
            .collect()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_order() {
        let registry = RuleRegistry::with_defaults().unwrap();
        let names = registry.all_names();
        assert_eq!(names.len(), 17);
        assert_eq!(names[0], "s3_unsupported_comments");
        assert_eq!(names.last(), Some(&"http_settings_to_http_client"));

        let position = |name: &str| names.iter().position(|n| *n == name).unwrap();
        assert!(position("change_sdk_type") < position("client_builder_statics"));
        assert!(position("new_class_to_builder") < position("s3_put_object_payload"));
        assert!(position("s3_put_object_payload") < position("setter_to_builder"));
    }

    #[test]
    fn test_get_enabled_keeps_pipeline_order() {
        let registry = RuleRegistry::with_defaults().unwrap();
        let enabled: HashSet<String> = ["enum_casing", "change_sdk_type"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rules = registry.get_enabled(&enabled);
        let names: Vec<_> = rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["change_sdk_type", "enum_casing"]);
    }

    #[test]
    fn test_list_rules_has_descriptions() {
        let registry = RuleRegistry::with_defaults().unwrap();
        for (name, description, _) in registry.list_rules() {
            assert!(!description.is_empty(), "{} has no description", name);
        }
        assert!(registry.get("s3_method_args").is_some());
        assert!(registry.get("array_push").is_none());
    }
}
