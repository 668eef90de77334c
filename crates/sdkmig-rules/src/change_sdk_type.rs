//! Rule: change_sdk_type
//!
//! Rewrites every reference to a v1 type that has a v2 equivalent: type
//! references, static receivers, qualified constants, fully qualified names
//! in code, single, wildcard and static imports.
//!
//! Pattern:
//! ```java
//! // Before
//! import com.amazonaws.services.s3.AmazonS3;
//! import com.amazonaws.services.s3.model.BucketLifecycleConfiguration;
//!
//! AmazonS3 s3;
//! BucketLifecycleConfiguration.Rule rule;
//!
//! // After
//! import software.amazon.awssdk.services.s3.S3Client;
//! import software.amazon.awssdk.services.s3.model.LifecycleRule;
//!
//! S3Client s3;
//! LifecycleRule rule;
//! ```
//!
//! Imports are rewritten in place so their order is kept. An import whose
//! only uses moved to another v2 type is dropped, and two v1 imports that map
//! to the same v2 type collapse into one.

use std::collections::{HashMap, HashSet};

use sdkmig_core::ast::*;
use sdkmig_core::{visit, Edit, Span, Visitor};

use crate::imports::ImportEditor;
use crate::naming::{simple_name, split_fqn, top_level_of, TypeMapper, TypeMapping};
use crate::registry::{Category, Rule, RuleError};
use crate::resolve::TypeResolver;
use crate::sdk_types::{is_v1_type, package_of};

pub fn check_change_sdk_type(unit: &CompilationUnit, source: &str, mapper: &TypeMapper) -> Vec<Edit> {
    if !source.contains("com.amazonaws") {
        return Vec::new();
    }

    let resolver = TypeResolver::new(unit, source);
    let mut declared = HashSet::new();
    collect_declared(&unit.types, &mut declared);

    let mut checker = ChangeSdkTypeChecker {
        source,
        unit,
        resolver: &resolver,
        mapper,
        cache: HashMap::new(),
        declared,
        head_uses: HashMap::new(),
        wildcard_uses: HashSet::new(),
        wildcard_refs: HashSet::new(),
        needed: Vec::new(),
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);
    checker.finish()
}

fn collect_declared(types: &[TypeDecl], out: &mut HashSet<String>) {
    for decl in types {
        out.insert(decl.name.name.clone());
        for member in &decl.members {
            if let Member::Type(inner) = member {
                collect_declared(std::slice::from_ref(inner), out);
            }
        }
    }
}

fn is_qualified(name: &str) -> bool {
    name.contains('.') && name.starts_with(|c: char| c.is_ascii_lowercase())
}

fn is_type_like(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
}

struct ChangeSdkTypeChecker<'a, 'r> {
    source: &'a str,
    unit: &'a CompilationUnit,
    resolver: &'r TypeResolver<'a>,
    mapper: &'r TypeMapper,
    cache: HashMap<String, Option<TypeMapping>>,
    /// Simple names of types declared in this file
    declared: HashSet<String>,
    /// Import simple name → whether some reference still needs that import
    head_uses: HashMap<String, bool>,
    /// v1 wildcard packages that resolved at least one reference
    wildcard_uses: HashSet<String>,
    /// v1 wildcard packages that some reference may come from, mapped or not
    wildcard_refs: HashSet<String>,
    /// v2 types the rewritten references need imported
    needed: Vec<String>,
    edits: Vec<Edit>,
}

impl<'a> ChangeSdkTypeChecker<'a, '_> {
    fn get_text(&self, span: Span) -> &'a str {
        span.text(self.source)
    }

    fn lookup(&mut self, fqn: &str) -> Option<TypeMapping> {
        if let Some(cached) = self.cache.get(fqn) {
            return cached.clone();
        }
        let mapping = self.mapper.map(fqn);
        self.cache.insert(fqn.to_string(), mapping.clone());
        mapping
    }

    fn has_single_import(&self, simple: &str) -> bool {
        self.unit
            .imports
            .iter()
            .any(|i| !i.is_static && !i.is_wildcard && i.simple_name() == simple)
    }

    /// Rewrite a reference written as `written` at `span` that resolves to `fqn`
    fn rewrite_reference(&mut self, span: Span, written: &str, fqn: &str) {
        if !is_v1_type(fqn) {
            return;
        }
        let head = written.split('.').next().unwrap_or(written);
        if !is_qualified(written) && !self.has_single_import(head) && !self.declared.contains(head) {
            self.wildcard_refs
                .insert(package_of(&top_level_of(fqn)).to_string());
        }
        let Some(mapping) = self.lookup(fqn) else {
            return;
        };

        if is_qualified(written) {
            if written != mapping.v2 {
                self.edits.push(Edit::new(
                    span,
                    mapping.v2.clone(),
                    format!("Replace {} with {}", written, mapping.v2),
                ));
            }
            return;
        }

        let v1_segments: Vec<&str> = split_fqn(fqn).1.split('.').collect();
        let (v2_package, v2_chain) = split_fqn(&mapping.v2);
        let v2_segments: Vec<&str> = v2_chain.split('.').collect();
        let written_count = written.split('.').count().min(v1_segments.len());
        let same_shape = v2_segments.len() == v1_segments.len();

        let (replacement, import) = if same_shape {
            let skip = v1_segments.len() - written_count;
            let import = format!("{}.{}", v2_package, v2_segments[..=skip].join("."));
            (v2_segments[skip..].join("."), import)
        } else {
            (v2_chain.to_string(), mapping.v2_top_level())
        };

        if self.has_single_import(head) {
            let still_needed = self.head_uses.entry(head.to_string()).or_insert(false);
            *still_needed |= same_shape;
        } else if !self.declared.contains(head) {
            self.wildcard_uses
                .insert(package_of(&top_level_of(fqn)).to_string());
        }

        let (replacement, import) = if self.declared.contains(simple_name(&import)) {
            // A type of this file shadows the simple name
            (mapping.v2.clone(), None)
        } else {
            (replacement, Some(import))
        };
        if let Some(import) = import {
            self.needed.push(import);
        }
        if replacement != written {
            self.edits.push(Edit::new(
                span,
                replacement.clone(),
                format!("Replace {} with {}", written, replacement),
            ));
        }
    }

    /// `AmazonS3ClientBuilder` in `AmazonS3ClientBuilder.standard()`
    fn check_static_receiver(&mut self, target: &Expr) {
        let Expr::Identifier(ident) = target else {
            return;
        };
        let name = ident.name.as_str();
        if !is_type_like(name)
            || self.resolver.is_variable(name)
            || self.resolver.static_import_owner(name).is_some()
        {
            return;
        }
        let fqn = self.resolver.resolve_type_name(name);
        self.rewrite_reference(ident.span, name, &fqn);
    }

    /// Returns `false` when the whole access was rewritten
    fn check_field_access(&mut self, access: &FieldAccess, expr: &Expr) -> bool {
        let Some(dotted) = expr.dotted_name() else {
            return true;
        };
        let head = dotted.split('.').next().unwrap_or(dotted.as_str());
        if self.resolver.is_variable(head) {
            return true;
        }

        if is_qualified(&dotted) {
            // `com.amazonaws.regions.Regions` inside a longer expression
            let (package, chain) = split_fqn(&dotted);
            if !package.is_empty() && !chain.is_empty() && !chain.contains('.') {
                self.rewrite_reference(access.span, &dotted, &dotted);
                return false;
            }
            return true;
        }

        if dotted.split('.').all(is_type_like) {
            // Nested types that moved, e.g. `RequestPaymentConfiguration.Payer`
            let fqn = self.resolver.resolve_type_name(&dotted);
            if let Some(mapping) = self.lookup(&fqn) {
                let v1_depth = split_fqn(&fqn).1.split('.').count();
                let v2_depth = mapping.v2_class_chain().split('.').count();
                if v1_depth != v2_depth {
                    self.rewrite_reference(access.span, &dotted, &fqn);
                    return false;
                }
            }
        }
        self.check_static_receiver(&access.target);
        true
    }

    fn rewrite_imports(&mut self, imports: &mut ImportEditor) {
        let unit = self.unit;
        let mut seen: HashSet<String> = HashSet::new();
        for import in &unit.imports {
            if import.is_wildcard && !import.is_static {
                self.rewrite_wildcard(import, imports);
                continue;
            }

            let (owner, member) = if import.is_static && !import.is_wildcard {
                (import.qualifier(), Some(import.simple_name()))
            } else {
                (import.path.as_str(), None)
            };
            let Some(mapping) = self.lookup(owner) else {
                continue;
            };
            let new_path = match member {
                Some(member) => format!("{}.{}", mapping.v2, member),
                None => mapping.v2.clone(),
            };
            let key = format!("{}{}", if import.is_static { "static " } else { "" }, new_path);

            let unused = member.is_none()
                && !import.is_static
                && self.head_uses.get(import.simple_name()) == Some(&false);
            if unused || seen.contains(&key) {
                imports.remove_import(&import.path);
                continue;
            }
            seen.insert(key);
            if !import.is_static {
                imports.mark_present(&new_path);
            }
            self.edits.push(Edit::new(
                import.path_span,
                new_path.clone(),
                format!("Replace import {} with {}", import.path, new_path),
            ));
        }
    }

    fn rewrite_wildcard(&mut self, import: &Import, imports: &mut ImportEditor) {
        if !is_v1_type(&import.path) {
            return;
        }
        let v2_package = self.mapper.map_wildcard(&import.path);
        if !self.wildcard_uses.contains(&import.path) {
            // Nothing resolves through it any more
            if v2_package.is_some() && !self.wildcard_refs.contains(&import.path) {
                self.edits.push(Edit::delete(
                    import.span,
                    format!("Remove unused import {}.*", import.path),
                ));
            }
            return;
        }
        match v2_package {
            Some(v2_package) => {
                imports.mark_present(&format!("{}.*", v2_package));
                self.edits.push(Edit::new(
                    import.path_span,
                    v2_package.clone(),
                    format!("Replace import {}.* with {}.*", import.path, v2_package),
                ));
            }
            None => {
                // Sub-packages were flattened: every used member gets its own import
                self.edits.push(Edit::delete(
                    import.span,
                    format!("Remove import {}.*", import.path),
                ));
            }
        }
    }

    fn finish(mut self) -> Vec<Edit> {
        let mut imports = ImportEditor::new(self.unit, self.source);
        self.rewrite_imports(&mut imports);
        for fqn in std::mem::take(&mut self.needed) {
            imports.maybe_add_import(&fqn);
        }
        let mut edits = self.edits;
        let import_edits = imports.finish(&edits);
        edits.extend(import_edits);
        edits
    }
}

impl<'a> Visitor<'a> for ChangeSdkTypeChecker<'a, '_> {
    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        match expr {
            Expr::FieldAccess(access) => self.check_field_access(access, expr),
            Expr::MethodInvocation(call) => {
                if let Some(target) = call.target.as_deref() {
                    self.check_static_receiver(target);
                }
                true
            }
            _ => true,
        }
    }

    fn visit_type_ref(&mut self, ty: &'a TypeRef, _source: &str) -> bool {
        if ty.primitive || ty.is_var() {
            return true;
        }
        let fqn = self.resolver.resolve_type_name(&ty.name);
        let written = self.get_text(ty.name_span);
        if written == ty.name {
            self.rewrite_reference(ty.name_span, &ty.name, &fqn);
        }
        true
    }
}

pub struct ChangeSdkTypeRule {
    mapper: TypeMapper,
}

impl ChangeSdkTypeRule {
    pub fn new(mapper: TypeMapper) -> Self {
        Self { mapper }
    }
}

impl Rule for ChangeSdkTypeRule {
    fn name(&self) -> &'static str {
        "change_sdk_type"
    }

    fn description(&self) -> &'static str {
        "Replace v1 types and imports with their v2 equivalents"
    }

    fn category(&self) -> Category {
        Category::Types
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_change_sdk_type(unit, source, &self.mapper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkmig_core::{apply_edits, parse_java};

    fn check_java_with_mapper(source: &str, mapper: &TypeMapper) -> Vec<Edit> {
        let unit = parse_java(source).unwrap();
        check_change_sdk_type(&unit, source, mapper)
    }

    fn transform(source: &str) -> String {
        let edits = check_java_with_mapper(source, &TypeMapper::new(Vec::new()));
        apply_edits(source, &edits).unwrap()
    }

    #[test]
    fn test_client_and_model_types() {
        let source = r#"package foo;

import com.amazonaws.services.s3.AmazonS3;
import com.amazonaws.services.s3.AmazonS3ClientBuilder;
import com.amazonaws.services.s3.model.ObjectMetadata;
import java.util.List;

class A {
    private final AmazonS3 s3 = AmazonS3ClientBuilder.standard().build();

    List<ObjectMetadata> metadata(ObjectMetadata first) {
        return null;
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("import software.amazon.awssdk.services.s3.S3Client;"));
        assert!(result.contains("import software.amazon.awssdk.services.s3.S3ClientBuilder;"));
        assert!(result.contains("import software.amazon.awssdk.services.s3.model.HeadObjectResponse;"));
        assert!(result.contains("private final S3Client s3 = S3ClientBuilder.standard().build();"));
        assert!(result.contains("List<HeadObjectResponse> metadata(HeadObjectResponse first)"));
        assert!(!result.contains("com.amazonaws"));
    }

    #[test]
    fn test_nested_type_moves_and_owner_import_goes() {
        let source = r#"import com.amazonaws.services.s3.model.BucketLifecycleConfiguration;

class A {
    void f() {
        BucketLifecycleConfiguration.Rule rule = new BucketLifecycleConfiguration.Rule();
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("LifecycleRule rule = new LifecycleRule();"));
        assert!(result.contains("import software.amazon.awssdk.services.s3.model.LifecycleRule;"));
        assert!(!result.contains("BucketLifecycleConfiguration"));
    }

    #[test]
    fn test_nested_constant_access() {
        let source = r#"import com.amazonaws.services.s3.model.RequestPaymentConfiguration;

class A {
    Object payer() {
        return RequestPaymentConfiguration.Payer.Requester;
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("return Payer.Requester;"));
        assert!(result.contains("import software.amazon.awssdk.services.s3.model.Payer;"));
        assert!(!result.contains("import com.amazonaws"));
    }

    #[test]
    fn test_fully_qualified_references() {
        let source = r#"class A {
    Object region() {
        com.amazonaws.services.s3.AmazonS3 s3 = null;
        return com.amazonaws.regions.Regions.US_EAST_1;
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("software.amazon.awssdk.services.s3.S3Client s3 = null;"));
        assert!(result.contains("return software.amazon.awssdk.regions.Region.US_EAST_1;"));
    }

    #[test]
    fn test_wildcard_import_is_replaced() {
        let source = r#"import com.amazonaws.services.s3.model.*;

class A {
    GetObjectRequest request;
    CopyObjectResult result;
}
"#;
        let result = transform(source);
        assert!(result.contains("import software.amazon.awssdk.services.s3.model.*;"));
        assert!(result.contains("CopyObjectResponse result;"));
        assert!(!result.contains("import software.amazon.awssdk.services.s3.model.GetObjectRequest;"));
    }

    #[test]
    fn test_unused_wildcard_import_is_removed() {
        let source = r#"import com.amazonaws.services.sqs.model.*;

class A {
    void f() {
        int x = 1;
    }
}
"#;
        let result = transform(source);
        assert!(!result.contains("com.amazonaws"));
        assert!(!result.contains("import software.amazon.awssdk"));
        assert!(check_java_with_mapper(&result, &TypeMapper::new(Vec::new())).is_empty());
    }

    #[test]
    fn test_wildcard_kept_for_unmapped_references() {
        let source = r#"import com.amazonaws.services.acme.model.*;

class A {
    Widget widget;
}
"#;
        let mapper = TypeMapper::new(vec!["com.amazonaws.services.acme".to_string()]);
        assert!(check_java_with_mapper(source, &mapper).is_empty());
    }

    #[test]
    fn test_duplicate_imports_collapse() {
        let source = r#"import com.amazonaws.services.s3.transfer.TransferManager;
import com.amazonaws.services.s3.transfer.TransferManagerBuilder;

class A {
    TransferManager tm = TransferManagerBuilder.standard().build();
}
"#;
        let result = transform(source);
        assert_eq!(
            result.matches("import software.amazon.awssdk.transfer.s3.S3TransferManager;").count(),
            1
        );
        assert!(result.contains("S3TransferManager tm = S3TransferManager.standard().build();"));
    }

    #[test]
    fn test_static_import() {
        let source = r#"import static com.amazonaws.services.s3.model.StorageClass.Standard;

class A {
    Object s = Standard;
}
"#;
        let result = transform(source);
        assert!(result.contains("import static software.amazon.awssdk.services.s3.model.StorageClass.Standard;"));
    }

    #[test]
    fn test_exception_in_catch_and_throws() {
        let source = r#"import com.amazonaws.AmazonServiceException;

class A {
    void f() throws AmazonServiceException {
        try {
            run();
        } catch (AmazonServiceException e) {
            throw e;
        }
    }
}
"#;
        let result = transform(source);
        assert!(result.contains("import software.amazon.awssdk.awscore.exception.AwsServiceException;"));
        assert!(result.contains("throws AwsServiceException"));
        assert!(result.contains("catch (AwsServiceException e)"));
    }

    #[test]
    fn test_custom_sdk_is_skipped() {
        let source = r#"import com.amazonaws.services.custom.AmazonCustom;

class A {
    AmazonCustom client;
}
"#;
        let mapper = TypeMapper::new(vec!["com.amazonaws.services.custom".to_string()]);
        assert!(check_java_with_mapper(source, &mapper).is_empty());
    }

    #[test]
    fn test_second_pass_is_clean() {
        let source = r#"import com.amazonaws.services.s3.AmazonS3;
import com.amazonaws.services.s3.model.PutObjectResult;

class A {
    PutObjectResult put(AmazonS3 s3) {
        return null;
    }
}
"#;
        let once = transform(source);
        assert!(check_java_with_mapper(&once, &TypeMapper::new(Vec::new())).is_empty());
    }
}
