//! Recipe table schema definitions
//!
//! Defines the structure of the YAML recipe tables using serde for
//! deserialization. Every table is optional so user recipe files only
//! need to list what they add.

use serde::{Deserialize, Serialize};

/// All recipe tables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RecipeTables {
    pub method_renames: Vec<MethodRename>,
    pub duration_setters: Vec<DurationSetter>,
    pub builder_constructors: Vec<BuilderConstructor>,
    /// Non-model types that have a `builder()` (e.g. `ClientOverrideConfiguration`)
    pub builder_types: Vec<String>,
    pub static_factories: Vec<StaticFactory>,
    pub member_renames: Vec<MemberRename>,
    pub request_pojo_methods: Vec<RequestPojoMethod>,
    pub call_templates: Vec<CallTemplate>,
    pub comments: Vec<CommentEntry>,
}

/// Rename a method matched by a pattern
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MethodRename {
    /// Method pattern, e.g. `com.amazonaws.ClientConfiguration withMaxConnections(int)`
    pub method: String,
    pub new_name: String,
}

/// A setter taking a numeric time value that becomes a `Duration` setter
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DurationSetter {
    pub method: String,
    pub new_name: String,
    /// `millis`, `seconds` or `minutes`
    pub unit: String,
}

/// A constructor whose positional arguments map to builder calls
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BuilderConstructor {
    #[serde(rename = "type")]
    pub type_name: String,
    pub parameter_types: Vec<String>,
    pub fluent_names: Vec<String>,
}

/// A constructor replaced with a static factory
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticFactory {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_factory_method")]
    pub method: String,
    #[serde(default = "default_max_args")]
    pub max_args: usize,
}

fn default_factory_method() -> String {
    "create".to_string()
}

fn default_max_args() -> usize {
    3
}

/// A v2 member whose name differs from the converted v1 accessor name
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemberRename {
    /// Type pattern, e.g. `software.amazon.awssdk.services.s3.model.*`
    #[serde(rename = "type")]
    pub type_name: String,
    pub from: String,
    pub to: String,
}

/// A multi-argument method that takes a single request object in v2
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestPojoMethod {
    pub method: String,
    /// Fully qualified request class
    pub request: String,
    /// Builder call for each positional argument; `_` keeps the argument
    /// off the request (it is only used through `extra_args` / `suffix`)
    pub fluent_names: Vec<String>,
    /// Replacement for the method name (may contain a call chain,
    /// e.g. `utilities().getUrl`)
    #[serde(default)]
    pub v2_method: Option<String>,
    /// Extra arguments after the request object; `$0`.. refer to the
    /// original arguments
    #[serde(default)]
    pub extra_args: Vec<String>,
    /// Text appended after the call, e.g. `.asUtf8String()`
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub imports: Vec<String>,
}

/// Replace a call with a template
///
/// `$target` is the receiver text, `$0`.. the original arguments.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CallTemplate {
    pub method: String,
    pub template: String,
    #[serde(default)]
    pub imports: Vec<String>,
    /// Migration comment placed before the rewritten call
    #[serde(default)]
    pub comment: Option<String>,
}

/// A migration comment for a call or constructor without automatic rewrite
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommentEntry {
    /// Method pattern
    #[serde(default)]
    pub method: Option<String>,
    /// Fully qualified class for constructor matches
    #[serde(default)]
    pub new_class: Option<String>,
    /// Constructor argument count (constructors only)
    #[serde(default)]
    pub arity: Option<usize>,
    pub comment: String,
    #[serde(default)]
    pub remove_imports: Vec<String>,
    #[serde(default)]
    pub add_imports: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tables() {
        let yaml = r#"
method_renames:
  - method: "com.amazonaws.ClientConfiguration withMaxConnections(int)"
    new_name: maxConnections
static_factories:
  - type: software.amazon.awssdk.auth.credentials.AwsBasicCredentials
builder_constructors:
  - type: software.amazon.awssdk.services.s3.model.GetObjectRequest
    parameter_types: [String, String]
    fluent_names: [bucket, key]
"#;
        let tables: RecipeTables = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(tables.method_renames.len(), 1);
        assert_eq!(tables.static_factories[0].method, "create");
        assert_eq!(tables.static_factories[0].max_args, 3);
        assert_eq!(tables.builder_constructors[0].fluent_names, vec!["bucket", "key"]);
        assert!(tables.comments.is_empty());
    }
}
