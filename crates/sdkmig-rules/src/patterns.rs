//! Method and type patterns used by recipe tables
//!
//! Patterns use the OpenRewrite-style method pattern syntax:
//!
//! ```text
//! com.amazonaws.services.s3.AmazonS3 copyObject(String, String, String, String)
//! com.amazonaws.ClientConfiguration withSocketTimeout(int)
//! com.amazonaws.services.s3.transfer.* addProgressListener(..)
//! ```
//!
//! The receiver is a type pattern where `*` matches one package segment or
//! part of a name; `..` matches any argument list.

use std::sync::OnceLock;

use regex::Regex;
use sdkmig_core::ast::MethodInvocation;

use crate::naming::{simple_name, v2_member_name};
use crate::recipe::RecipeTables;
use crate::registry::ConfigError;
use crate::resolve::{ResolvedType, TypeResolver};
use crate::sdk_types;

/// Outcome of matching one call against one pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgMatch {
    Yes,
    No,
    /// Name, receiver and arity match but some argument type is unknown
    Unknown,
}

impl ArgMatch {
    pub fn and(self, other: ArgMatch) -> ArgMatch {
        match (self, other) {
            (ArgMatch::No, _) | (_, ArgMatch::No) => ArgMatch::No,
            (ArgMatch::Unknown, _) | (_, ArgMatch::Unknown) => ArgMatch::Unknown,
            _ => ArgMatch::Yes,
        }
    }
}

/// A fully qualified type name with optional `*` wildcards
#[derive(Debug, Clone)]
pub struct TypePattern {
    raw: String,
    regex: Option<Regex>,
}

impl TypePattern {
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(ConfigError::MalformedPattern {
                pattern: pattern.to_string(),
                reason: "empty type pattern".to_string(),
            });
        }
        if pattern == "*" {
            return Ok(Self {
                raw: pattern.to_string(),
                regex: None,
            });
        }
        let escaped = regex::escape(pattern).replace(r"\*", "[^.]*");
        let regex = Regex::new(&format!("^{}$", escaped)).map_err(|e| {
            ConfigError::MalformedPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            regex: Some(regex),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_any(&self) -> bool {
        self.regex.is_none()
    }

    pub fn matches(&self, fqn: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(fqn),
            None => true,
        }
    }

    /// Matches the type or one of its known supertypes
    pub fn matches_type(&self, ty: &ResolvedType) -> bool {
        sdk_types::supertypes(&ty.name).iter().any(|t| self.matches(t))
    }
}

#[derive(Debug, Clone)]
enum ArgPattern {
    Any,
    List(Vec<String>),
}

/// `ReceiverType methodName(ArgType, ...)`
#[derive(Debug, Clone)]
pub struct MethodPattern {
    raw: String,
    receiver: TypePattern,
    name: String,
    name_regex: Option<Regex>,
    args: ArgPattern,
}

fn method_pattern_regex() -> &'static Regex {
    static METHOD_PATTERN: OnceLock<Regex> = OnceLock::new();
    METHOD_PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\S+)\s+([A-Za-z_*][\w*]*)\((.*)\)\s*$").unwrap()
    })
}

impl MethodPattern {
    pub fn parse(pattern: &str) -> Result<Self, ConfigError> {
        let malformed = |reason: &str| ConfigError::MalformedPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };
        let caps = method_pattern_regex()
            .captures(pattern)
            .ok_or_else(|| malformed("expected `Type method(args)`"))?;

        let receiver = TypePattern::parse(&caps[1])?;
        let name = caps[2].to_string();
        let name_regex = if name.contains('*') {
            let escaped = regex::escape(&name).replace(r"\*", r"\w*");
            Some(Regex::new(&format!("^{}$", escaped)).map_err(|e| malformed(&e.to_string()))?)
        } else {
            None
        };

        let raw_args = caps[3].trim();
        let args = if raw_args == ".." {
            ArgPattern::Any
        } else if raw_args.is_empty() {
            ArgPattern::List(Vec::new())
        } else {
            let list: Vec<String> = raw_args.split(',').map(|a| a.trim().to_string()).collect();
            if list.iter().any(|a| a.is_empty() || a.contains("..")) {
                return Err(malformed("argument list must be `..` or a list of types"));
            }
            ArgPattern::List(list)
        };

        Ok(Self {
            raw: pattern.to_string(),
            receiver,
            name,
            name_regex,
            args,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn method_name(&self) -> &str {
        &self.name
    }

    /// Fixed argument count, `None` for `(..)`
    pub fn arity(&self) -> Option<usize> {
        match &self.args {
            ArgPattern::Any => None,
            ArgPattern::List(list) => Some(list.len()),
        }
    }

    pub fn matches_name(&self, name: &str) -> bool {
        match &self.name_regex {
            Some(regex) => regex.is_match(name),
            None => self.name == name,
        }
    }

    /// Name and receiver type match (arguments ignored)
    pub fn matches_target(&self, call: &MethodInvocation, resolver: &TypeResolver) -> bool {
        if !self.matches_name(&call.name.name) {
            return false;
        }
        if self.receiver.is_any() {
            return true;
        }
        call.target
            .as_deref()
            .and_then(|target| resolver.type_of(target))
            .is_some_and(|ty| !ty.is_static && self.receiver.matches_type(&ty))
            || self.matches_static_receiver(call, resolver)
    }

    fn matches_static_receiver(&self, call: &MethodInvocation, resolver: &TypeResolver) -> bool {
        call.target
            .as_deref()
            .and_then(|target| resolver.type_of(target))
            .is_some_and(|ty| ty.is_static && self.receiver.matches(&ty.name))
    }

    /// Full match including argument types
    pub fn match_call(&self, call: &MethodInvocation, resolver: &TypeResolver) -> ArgMatch {
        if !self.matches_target(call, resolver) {
            return ArgMatch::No;
        }
        match &self.args {
            ArgPattern::Any => ArgMatch::Yes,
            ArgPattern::List(expected) => {
                if expected.len() != call.args.len() {
                    return ArgMatch::No;
                }
                expected
                    .iter()
                    .zip(&call.args.items)
                    .map(|(ty, arg)| arg_matches(ty, resolver.type_of(arg).as_ref()))
                    .fold(ArgMatch::Yes, ArgMatch::and)
            }
        }
    }
}

const WIDENING: &[(&str, &[&str])] = &[
    ("long", &["int", "short", "byte", "char", "long", "java.lang.Integer", "java.lang.Long"]),
    ("int", &["short", "byte", "char", "java.lang.Integer"]),
    ("double", &["int", "long", "float", "java.lang.Double"]),
    ("boolean", &["java.lang.Boolean"]),
    ("java.lang.Long", &["long"]),
    ("java.lang.Integer", &["int"]),
    ("java.lang.Boolean", &["boolean"]),
];

fn same_type(expected: &str, actual: &str) -> bool {
    expected == actual
        || ((!expected.contains('.') || !actual.contains('.'))
            && simple_name(expected) == simple_name(actual))
}

fn is_primitive(name: &str) -> bool {
    matches!(
        name,
        "int" | "long" | "boolean" | "double" | "float" | "short" | "byte" | "char"
    )
}

/// Does an argument of type `actual` fit a parameter declared as `expected`
pub fn arg_matches(expected: &str, actual: Option<&ResolvedType>) -> ArgMatch {
    let Some(actual) = actual else {
        return ArgMatch::Unknown;
    };
    if actual.is_static {
        return ArgMatch::Unknown;
    }
    let actual = actual.name.as_str();
    if expected == "Object" || expected == "java.lang.Object" {
        return ArgMatch::Yes;
    }
    if actual == "null" {
        return if is_primitive(expected) {
            ArgMatch::No
        } else {
            ArgMatch::Yes
        };
    }
    if same_type(expected, actual) {
        return ArgMatch::Yes;
    }
    let expected_fqn = match expected {
        "String" => "java.lang.String",
        "Long" => "java.lang.Long",
        "Integer" => "java.lang.Integer",
        "Boolean" => "java.lang.Boolean",
        other => other,
    };
    if WIDENING
        .iter()
        .any(|(to, from)| *to == expected_fqn && from.contains(&actual))
    {
        return ArgMatch::Yes;
    }
    if simple_name(expected) == "InputStream" && sdk_types::is_input_stream(actual) {
        return ArgMatch::Yes;
    }
    if sdk_types::supertypes(actual)
        .iter()
        .skip(1)
        .any(|t| same_type(expected, t))
    {
        return ArgMatch::Yes;
    }
    ArgMatch::No
}

/// Pick the candidate a call should be rewritten with
///
/// A lone non-rejected candidate wins; among several, only a unique
/// candidate whose every argument type is known to match.
pub fn select<T: Clone>(candidates: &[(T, ArgMatch)]) -> Option<T> {
    let viable: Vec<&(T, ArgMatch)> = candidates
        .iter()
        .filter(|(_, m)| *m != ArgMatch::No)
        .collect();
    match viable.as_slice() {
        [] => None,
        [(only, _)] => Some(only.clone()),
        _ => {
            let exact: Vec<&&(T, ArgMatch)> =
                viable.iter().filter(|(_, m)| *m == ArgMatch::Yes).collect();
            match exact.as_slice() {
                [(only, _)] => Some(only.clone()),
                _ => None,
            }
        }
    }
}

/// v2 member names that differ from the converted v1 accessor name
#[derive(Debug, Clone, Default)]
pub struct MemberRenames {
    entries: Vec<(TypePattern, String, String)>,
}

impl MemberRenames {
    pub fn from_tables(tables: &RecipeTables) -> Result<Self, ConfigError> {
        let entries = tables
            .member_renames
            .iter()
            .map(|entry| {
                Ok((
                    TypePattern::parse(&entry.type_name)?,
                    entry.from.clone(),
                    entry.to.clone(),
                ))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { entries })
    }

    /// v2 member for the v1 accessor `method` on `type_fqn`
    /// (`withBucketName` → `bucket`)
    pub fn member_name(&self, type_fqn: &str, method: &str) -> String {
        let converted = v2_member_name(method);
        self.entries
            .iter()
            .find(|(ty, from, _)| *from == converted && ty.matches(type_fqn))
            .map(|(_, _, to)| to.clone())
            .unwrap_or(converted)
    }
}

/// Fill a replacement template: `$target` is the receiver text, `$0`.. the
/// argument texts
pub fn expand_template(template: &str, target: Option<&str>, args: &[&str]) -> String {
    let mut out = template.replace("$target", target.unwrap_or_default());
    // Highest index first so `$1` never eats the prefix of `$12`
    for (i, arg) in args.iter().enumerate().rev() {
        out = out.replace(&format!("${}", i), arg);
    }
    out
}
