//! Recipe tables: the data that drives the table-based rules
//!
//! The defaults ship embedded in the binary (`recipes/default.yaml`); user
//! recipe files listed in the configuration are merged after them.
//!
//! # Example recipe file
//!
//! ```yaml
//! method_renames:
//!   - method: "com.acme.LegacyClient withEndpoint(String)"
//!     new_name: endpointOverride
//!
//! static_factories:
//!   - type: com.acme.Credentials
//!     max_args: 2
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_recipes, load_tables_from_file, load_tables_from_string};
pub use schema::{
    BuilderConstructor, CallTemplate, CommentEntry, DurationSetter, MemberRename, MethodRename,
    RecipeTables, RequestPojoMethod, StaticFactory,
};

use crate::patterns::{MethodPattern, TypePattern};
use crate::registry::ConfigError;

const TIME_UNITS: &[&str] = &["millis", "seconds", "minutes"];

impl RecipeTables {
    /// The embedded default recipes
    pub fn builtin() -> Result<Self, ConfigError> {
        load_tables_from_string(include_str!("../../recipes/default.yaml"))
    }

    /// Append every table of `other` after this one's entries
    pub fn merge(&mut self, other: RecipeTables) {
        self.method_renames.extend(other.method_renames);
        self.duration_setters.extend(other.duration_setters);
        self.builder_constructors.extend(other.builder_constructors);
        self.builder_types.extend(other.builder_types);
        self.static_factories.extend(other.static_factories);
        self.member_renames.extend(other.member_renames);
        self.request_pojo_methods.extend(other.request_pojo_methods);
        self.call_templates.extend(other.call_templates);
        self.comments.extend(other.comments);
    }

    /// Check every entry; the first invalid one is reported
    pub fn validate(&self) -> Result<(), ConfigError> {
        for entry in &self.method_renames {
            MethodPattern::parse(&entry.method)?;
        }
        for entry in &self.duration_setters {
            MethodPattern::parse(&entry.method)?;
            if !TIME_UNITS.contains(&entry.unit.as_str()) {
                return Err(ConfigError::UnsupportedTimeUnit {
                    method: entry.method.clone(),
                    unit: entry.unit.clone(),
                });
            }
        }
        for entry in &self.builder_constructors {
            if entry.parameter_types.len() != entry.fluent_names.len() {
                return Err(ConfigError::LengthMismatch {
                    type_name: entry.type_name.clone(),
                    params: entry.parameter_types.len(),
                    names: entry.fluent_names.len(),
                });
            }
        }
        for entry in &self.static_factories {
            if entry.max_args > 3 {
                return Err(ConfigError::FactoryArity {
                    type_name: entry.type_name.clone(),
                    max_args: entry.max_args,
                });
            }
        }
        for entry in &self.member_renames {
            TypePattern::parse(&entry.type_name)?;
        }
        for entry in &self.request_pojo_methods {
            let pattern = MethodPattern::parse(&entry.method)?;
            if let Some(arity) = pattern.arity() {
                if arity != entry.fluent_names.len() {
                    return Err(ConfigError::LengthMismatch {
                        type_name: entry.method.clone(),
                        params: arity,
                        names: entry.fluent_names.len(),
                    });
                }
            }
        }
        for entry in &self.call_templates {
            MethodPattern::parse(&entry.method)?;
        }
        for entry in &self.comments {
            match (&entry.method, &entry.new_class) {
                (Some(method), None) => {
                    MethodPattern::parse(method)?;
                }
                (None, Some(_)) => {}
                _ => {
                    return Err(ConfigError::Validation(format!(
                        "comment entry `{}` needs exactly one of `method` or `new_class`",
                        entry.comment
                    )))
                }
            }
        }
        Ok(())
    }

    /// Builder calls that may appear in a constructor chain and must be kept
    /// as they are (new names produced by the rename tables)
    pub fn fluent_names(&self) -> Vec<&str> {
        self.method_renames
            .iter()
            .map(|r| r.new_name.as_str())
            .chain(self.duration_setters.iter().map(|d| d.new_name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_are_valid() {
        let tables = RecipeTables::builtin().unwrap();
        assert!(!tables.method_renames.is_empty());
        assert!(!tables.request_pojo_methods.is_empty());
        assert!(!tables.call_templates.is_empty());
        assert!(!tables.comments.is_empty());
        assert!(tables.fluent_names().contains(&"maxConnections"));
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let yaml = r#"
builder_constructors:
  - type: software.amazon.awssdk.services.s3.model.GetObjectRequest
    parameter_types: [String, String]
    fluent_names: [bucket]
"#;
        let err = load_tables_from_string(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::LengthMismatch { params: 2, names: 1, .. }));
    }

    #[test]
    fn test_factory_arity_is_rejected() {
        let yaml = r#"
static_factories:
  - type: software.amazon.awssdk.auth.credentials.AwsSessionCredentials
    max_args: 4
"#;
        let err = load_tables_from_string(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::FactoryArity { max_args: 4, .. }));
    }

    #[test]
    fn test_unknown_time_unit_is_rejected() {
        let yaml = r#"
duration_setters:
  - method: "com.amazonaws.ClientConfiguration withSocketTimeout(int)"
    new_name: socketTimeout
    unit: hours
"#;
        let err = load_tables_from_string(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedTimeUnit { .. }));
    }

    #[test]
    fn test_malformed_pattern_is_rejected() {
        let yaml = r#"
method_renames:
  - method: "withSocketTimeout(int)"
    new_name: socketTimeout
"#;
        let err = load_tables_from_string(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedPattern { .. }));
    }

    #[test]
    fn test_merge_appends() {
        let mut base = RecipeTables::builtin().unwrap();
        let before = base.static_factories.len();
        let extra = load_tables_from_string(
            "static_factories:\n  - type: com.acme.Credentials\n    max_args: 2\n",
        )
        .unwrap();
        base.merge(extra);
        assert_eq!(base.static_factories.len(), before + 1);
        assert_eq!(base.static_factories.last().unwrap().type_name, "com.acme.Credentials");
    }
}
