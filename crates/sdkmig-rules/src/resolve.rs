//! Best-effort static typing for Java expressions
//!
//! Rules only rewrite code when the receiver type of a call is known, so the
//! resolver answers "what type does this expression have" from what a
//! single file offers: imports, declared variables, local method return
//! types and a handful of SDK conventions (`builder()` / `build()`,
//! fluent setters). Anything it cannot prove comes back as `None`.

use std::collections::HashMap;

use sdkmig_core::ast::*;
use sdkmig_core::{visit, Scope, Visitor};

use crate::naming::{split_fqn, V1_PREFIX, V2_PREFIX};
use crate::sdk_types::{self, RESPONSE_BYTES, RESPONSE_INPUT_STREAM};

/// Nesting limit for `var` initializers and call chains
const MAX_DEPTH: usize = 32;

const PRIMITIVES: &[&str] = &[
    "int", "long", "boolean", "double", "float", "short", "byte", "char", "void",
];

const JAVA_LANG: &[&str] = &[
    "String",
    "Object",
    "Integer",
    "Long",
    "Boolean",
    "Double",
    "Float",
    "Short",
    "Byte",
    "Character",
    "Number",
    "Math",
    "System",
    "Thread",
    "Runnable",
    "Exception",
    "RuntimeException",
    "Throwable",
    "Error",
    "Class",
    "Iterable",
    "Void",
    "StringBuilder",
    "IllegalArgumentException",
    "IllegalStateException",
    "InterruptedException",
    "NullPointerException",
    "UnsupportedOperationException",
    "AutoCloseable",
    "CharSequence",
    "Enum",
    "Comparable",
    "Override",
    "Deprecated",
    "SuppressWarnings",
    "FunctionalInterface",
];

/// JDK types outside `java.lang` that SDK wildcard imports must not claim
const COMMON_JDK: &[(&str, &str)] = &[
    ("List", "java.util.List"),
    ("Map", "java.util.Map"),
    ("Set", "java.util.Set"),
    ("HashMap", "java.util.HashMap"),
    ("ArrayList", "java.util.ArrayList"),
    ("LinkedList", "java.util.LinkedList"),
    ("HashSet", "java.util.HashSet"),
    ("TreeMap", "java.util.TreeMap"),
    ("Collection", "java.util.Collection"),
    ("Collections", "java.util.Collections"),
    ("Arrays", "java.util.Arrays"),
    ("Optional", "java.util.Optional"),
    ("Objects", "java.util.Objects"),
    ("Iterator", "java.util.Iterator"),
    ("UUID", "java.util.UUID"),
    ("Date", "java.util.Date"),
    ("Properties", "java.util.Properties"),
    ("File", "java.io.File"),
    ("InputStream", "java.io.InputStream"),
    ("OutputStream", "java.io.OutputStream"),
    ("FileInputStream", "java.io.FileInputStream"),
    ("ByteArrayInputStream", "java.io.ByteArrayInputStream"),
    ("BufferedInputStream", "java.io.BufferedInputStream"),
    ("IOException", "java.io.IOException"),
    ("URI", "java.net.URI"),
    ("URL", "java.net.URL"),
    ("Path", "java.nio.file.Path"),
    ("Paths", "java.nio.file.Paths"),
    ("Files", "java.nio.file.Files"),
    ("Instant", "java.time.Instant"),
    ("Duration", "java.time.Duration"),
    ("TimeUnit", "java.util.concurrent.TimeUnit"),
    ("ExecutorService", "java.util.concurrent.ExecutorService"),
    ("Executors", "java.util.concurrent.Executors"),
    ("CompletableFuture", "java.util.concurrent.CompletableFuture"),
];

/// Return types of frequently chained v1 `AmazonS3` calls
const V1_S3_RETURNS: &[(&str, &str)] = &[
    ("getObject", "com.amazonaws.services.s3.model.S3Object"),
    ("getObjectMetadata", "com.amazonaws.services.s3.model.ObjectMetadata"),
    ("putObject", "com.amazonaws.services.s3.model.PutObjectResult"),
    ("listObjects", "com.amazonaws.services.s3.model.ObjectListing"),
    ("listObjectsV2", "com.amazonaws.services.s3.model.ListObjectsV2Result"),
];

/// Static factories returning an instance of their own type
const SELF_FACTORIES: &[&str] = &[
    "create",
    "of",
    "valueOf",
    "fromValue",
    "ofMillis",
    "ofSeconds",
    "ofMinutes",
    "ofHours",
    "ofDays",
    "standard",
];

/// The type of an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    /// Fully qualified name when known, otherwise the name as written
    pub name: String,
    /// Resolved type arguments
    pub args: Vec<String>,
    /// The expression names the type itself (`AmazonS3ClientBuilder` in
    /// `AmazonS3ClientBuilder.standard()`)
    pub is_static: bool,
}

impl ResolvedType {
    pub fn instance(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            is_static: false,
        }
    }

    pub fn type_ref(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            is_static: true,
        }
    }

    /// Instance of `fqn` or of one of its known subtypes
    pub fn is_instance_of(&self, fqn: &str) -> bool {
        !self.is_static && sdk_types::supertypes(&self.name).iter().any(|t| t == fqn)
    }
}

struct VarInfo<'a> {
    offset: usize,
    ty: &'a TypeRef,
    init: Option<&'a Expr>,
}

/// Per-file type resolution
pub struct TypeResolver<'a> {
    package: Option<String>,
    imports: HashMap<String, String>,
    static_members: HashMap<String, String>,
    wildcards: Vec<String>,
    declared: HashMap<String, String>,
    variables: HashMap<String, Vec<VarInfo<'a>>>,
    methods: HashMap<String, &'a TypeRef>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(unit: &'a CompilationUnit, source: &'a str) -> Self {
        let mut imports = HashMap::new();
        let mut static_members = HashMap::new();
        let mut wildcards = Vec::new();

        for import in &unit.imports {
            match (import.is_static, import.is_wildcard) {
                (false, false) => {
                    imports.insert(import.simple_name().to_string(), import.path.clone());
                }
                (false, true) => wildcards.push(import.path.clone()),
                (true, false) => {
                    static_members
                        .insert(import.simple_name().to_string(), import.qualifier().to_string());
                }
                (true, true) => {}
            }
        }

        let package = unit.package.as_ref().map(|p| p.name.clone());
        let mut collector = Collector {
            package: package.clone(),
            outer: Vec::new(),
            declared: HashMap::new(),
            variables: HashMap::new(),
            methods: HashMap::new(),
        };
        visit(&mut collector, unit, source);

        Self {
            package,
            imports,
            static_members,
            wildcards,
            declared: collector.declared,
            variables: collector.variables,
            methods: collector.methods,
        }
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Owner type of a statically imported member
    pub fn static_import_owner(&self, member: &str) -> Option<&str> {
        self.static_members.get(member).map(String::as_str)
    }

    /// True when `name` is a declared variable, field or parameter anywhere in the file
    pub fn is_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Resolve a (possibly dotted) type name as written in source
    pub fn resolve_type_name(&self, dotted: &str) -> String {
        if PRIMITIVES.contains(&dotted) {
            return dotted.to_string();
        }
        let (head, rest) = match dotted.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (dotted, None),
        };
        if head.starts_with(|c: char| c.is_ascii_lowercase()) && rest.is_some() {
            return dotted.to_string();
        }
        let qualify = |fqn: &str| match rest {
            Some(rest) => format!("{}.{}", fqn, rest),
            None => fqn.to_string(),
        };

        if let Some(fqn) = self.imports.get(head) {
            return qualify(fqn);
        }
        if let Some(fqn) = self.declared.get(head) {
            return qualify(fqn);
        }
        if JAVA_LANG.contains(&head) {
            return qualify(&format!("java.lang.{}", head));
        }
        if let Some((_, fqn)) = COMMON_JDK.iter().find(|(name, _)| *name == head) {
            return qualify(fqn);
        }
        if let Some(package) = self.sdk_wildcard_for(head) {
            return format!("{}.{}", package, dotted);
        }
        dotted.to_string()
    }

    fn sdk_wildcard_for(&self, name: &str) -> Option<&str> {
        let sdk: Vec<&str> = self
            .wildcards
            .iter()
            .map(String::as_str)
            .filter(|w| w.starts_with(V1_PREFIX) || w.starts_with(V2_PREFIX))
            .collect();
        if sdk.len() > 1 {
            let model_like = ["Request", "Result", "Response", "Exception"]
                .iter()
                .any(|suffix| name.ends_with(suffix));
            if let Some(found) = sdk.iter().find(|w| w.ends_with(".model") == model_like) {
                return Some(found);
            }
        }
        sdk.first().copied()
    }

    pub fn resolve_type_ref(&self, ty: &TypeRef) -> ResolvedType {
        let mut name = if ty.primitive {
            ty.name.clone()
        } else {
            self.resolve_type_name(&ty.name)
        };
        for _ in 0..ty.array_dims {
            name.push_str("[]");
        }
        ResolvedType {
            name,
            args: ty
                .type_args
                .iter()
                .map(|arg| self.resolve_type_ref(arg).name)
                .collect(),
            is_static: false,
        }
    }

    /// Type of the variable `name` as seen at byte offset `at`
    pub fn variable_type(&self, name: &str, at: usize) -> Option<ResolvedType> {
        self.variable_type_at(name, at, 0)
    }

    fn variable_type_at(&self, name: &str, at: usize, depth: usize) -> Option<ResolvedType> {
        let infos = self.variables.get(name)?;
        let info = infos
            .iter()
            .filter(|info| info.offset <= at)
            .max_by_key(|info| info.offset)
            .or_else(|| infos.first())?;
        if info.ty.is_var() {
            return self.infer(info.init?, depth + 1);
        }
        Some(self.resolve_type_ref(info.ty))
    }

    /// Declared return type of a method in this file
    pub fn local_method_type(&self, name: &str) -> Option<ResolvedType> {
        self.methods.get(name).map(|ty| self.resolve_type_ref(ty))
    }

    /// Type of an expression, if it can be determined
    pub fn type_of(&self, expr: &Expr) -> Option<ResolvedType> {
        self.infer(expr, 0)
    }

    fn infer(&self, expr: &Expr, depth: usize) -> Option<ResolvedType> {
        if depth > MAX_DEPTH {
            return None;
        }
        match expr.unparenthesized() {
            Expr::Identifier(ident) => self
                .variable_type_at(&ident.name, ident.span.start, depth)
                .or_else(|| {
                    ident
                        .name
                        .starts_with(|c: char| c.is_ascii_uppercase())
                        .then(|| ResolvedType::type_ref(self.resolve_type_name(&ident.name)))
                }),
            Expr::FieldAccess(access) => {
                if let Expr::This(_) = access.target.unparenthesized() {
                    return self.variable_type_at(&access.field.name, access.span.start, depth);
                }
                self.infer_dotted(expr)
            }
            Expr::MethodInvocation(call) => self.method_return_type(call, depth),
            Expr::NewClass(new) => Some(self.resolve_type_ref(&new.class)),
            Expr::Literal(lit) => Some(ResolvedType::instance(match lit.kind {
                LiteralKind::String => "java.lang.String",
                LiteralKind::Char => "char",
                LiteralKind::Integer => "int",
                LiteralKind::Long => "long",
                LiteralKind::Floating => "double",
                LiteralKind::Boolean => "boolean",
                LiteralKind::Null => "null",
            })),
            Expr::Cast { ty, .. } => Some(self.resolve_type_ref(ty)),
            _ => None,
        }
    }

    /// `StorageClass.Standard`, `com.amazonaws.regions.Regions.US_EAST_1`, `Outer.Inner`
    fn infer_dotted(&self, expr: &Expr) -> Option<ResolvedType> {
        let dotted = expr.dotted_name()?;
        let head = dotted.split('.').next()?;
        if self.is_variable(head) {
            return None;
        }
        if head.starts_with(|c: char| c.is_ascii_lowercase()) {
            let (package, chain) = split_fqn(&dotted);
            if package.is_empty() || chain.is_empty() {
                return None;
            }
            let mut parts = chain.split('.');
            let ty = format!("{}.{}", package, parts.next()?);
            return Some(match parts.next() {
                Some(_) => ResolvedType::instance(ty),
                None => ResolvedType::type_ref(ty),
            });
        }
        // A constant of the leading type
        Some(ResolvedType::instance(self.resolve_type_name(head)))
    }

    fn method_return_type(&self, call: &MethodInvocation, depth: usize) -> Option<ResolvedType> {
        let name = call.name.name.as_str();
        let target = match call.target.as_deref() {
            Some(Expr::This(_)) | None => return self.local_method_type(name),
            Some(target) => target,
        };
        let receiver = self.infer(target, depth + 1)?;
        let ty = receiver.name.as_str();

        if receiver.is_static {
            return match name {
                "builder" if sdk_types::is_v2_client(ty) || sdk_types::is_v1_client(ty) => {
                    Some(ResolvedType::instance(format!("{}Builder", ty)))
                }
                "builder" => Some(ResolvedType::instance(format!("{}.Builder", ty))),
                "defaultClient" if sdk_types::is_v2_client_builder(ty) => {
                    sdk_types::client_for_builder(ty).map(ResolvedType::instance)
                }
                "defaultClient" => ty
                    .strip_suffix("ClientBuilder")
                    .map(ResolvedType::instance),
                _ if SELF_FACTORIES.contains(&name) => Some(ResolvedType::instance(ty)),
                _ => None,
            };
        }

        let is_builder = ty.ends_with("Builder");
        if name == "build" && call.args.is_empty() && is_builder {
            if let Some(outer) = ty.strip_suffix(".Builder") {
                return Some(ResolvedType::instance(outer));
            }
            return ty.strip_suffix("Builder").map(ResolvedType::instance);
        }
        if is_builder && (sdk_types::is_v1_type(ty) || sdk_types::is_v2_type(ty)) {
            return Some(ResolvedType::instance(ty));
        }
        if name == "toBuilder" {
            return Some(ResolvedType::instance(format!("{}.Builder", ty)));
        }
        if name == "response" && (ty == RESPONSE_INPUT_STREAM || ty == RESPONSE_BYTES) {
            return receiver.args.first().map(ResolvedType::instance);
        }
        if receiver.is_instance_of(sdk_types::V1_S3_CLIENT) {
            return V1_S3_RETURNS
                .iter()
                .find(|(method, _)| *method == name)
                .map(|(_, ret)| ResolvedType::instance(*ret));
        }
        if ty == sdk_types::S3_CLIENT && name == "getObject" {
            return Some(ResolvedType {
                name: RESPONSE_INPUT_STREAM.to_string(),
                args: vec![sdk_types::GET_OBJECT_RESPONSE.to_string()],
                is_static: false,
            });
        }
        // v1 POJOs and configuration objects are fluent
        let fluent = name.starts_with("with")
            || (!call.args.is_empty() && !name.starts_with("get") && !name.starts_with("is"));
        if sdk_types::is_v1_type(ty) && !sdk_types::is_v1_client(ty) && fluent {
            return Some(ResolvedType::instance(ty));
        }
        None
    }
}

struct Collector<'a> {
    package: Option<String>,
    outer: Vec<String>,
    declared: HashMap<String, String>,
    variables: HashMap<String, Vec<VarInfo<'a>>>,
    methods: HashMap<String, &'a TypeRef>,
}

impl Collector<'_> {
    fn qualified(&self, name: &str) -> String {
        let mut parts: Vec<&str> = self.package.iter().map(String::as_str).collect();
        parts.extend(self.outer.iter().map(String::as_str));
        parts.push(name);
        parts.join(".")
    }
}

impl<'a> Visitor<'a> for Collector<'a> {
    fn visit_type_decl(&mut self, decl: &'a TypeDecl, _source: &str) -> bool {
        let fqn = self.qualified(&decl.name.name);
        self.declared.entry(decl.name.name.clone()).or_insert(fqn);
        for component in &decl.components {
            self.variables
                .entry(component.name.name.clone())
                .or_default()
                .push(VarInfo {
                    offset: component.name.span.start,
                    ty: &component.ty,
                    init: None,
                });
        }
        true
    }

    fn visit_method(&mut self, method: &'a MethodDecl, _source: &str) -> bool {
        if let Some(ret) = &method.return_type {
            self.methods.entry(method.name.name.clone()).or_insert(ret);
        }
        for param in &method.params {
            self.variables
                .entry(param.name.name.clone())
                .or_default()
                .push(VarInfo {
                    offset: param.name.span.start,
                    ty: &param.ty,
                    init: None,
                });
        }
        true
    }

    fn visit_variable_declaration(&mut self, decl: &'a VariableDeclaration, _source: &str) -> bool {
        for declarator in &decl.declarators {
            self.variables
                .entry(declarator.name.name.clone())
                .or_default()
                .push(VarInfo {
                    offset: declarator.name.span.start,
                    ty: &decl.ty,
                    init: declarator.init.as_ref(),
                });
        }
        true
    }

    fn enter_scope(&mut self, scope: Scope<'a>) {
        if let Scope::Type(decl) = scope {
            self.outer.push(decl.name.name.clone());
        }
    }

    fn leave_scope(&mut self, scope: Scope<'a>) {
        if let Scope::Type(_) = scope {
            self.outer.pop();
        }
    }
}
