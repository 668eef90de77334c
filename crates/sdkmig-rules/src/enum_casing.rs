//! Rule: enum_casing
//!
//! v1 S3 enum constants are PascalCase; their v2 counterparts are
//! SCREAMING_SNAKE_CASE. Qualified constants, static imports of constants
//! and the bare uses those imports allow are all renamed.
//!
//! Pattern:
//! ```java
//! // Before
//! import static software.amazon.awssdk.services.s3.model.Tier.Expedited;
//! request.storageClass(StorageClass.ReducedRedundancy);
//! restore.tier(Expedited);
//!
//! // After
//! import static software.amazon.awssdk.services.s3.model.Tier.EXPEDITED;
//! request.storageClass(StorageClass.REDUCED_REDUNDANCY);
//! restore.tier(EXPEDITED);
//! ```

use convert_case::{Boundary, Case, Converter};
use sdkmig_core::ast::*;
use sdkmig_core::{visit, Edit, Span, Visitor};

use crate::naming::TypeMapper;
use crate::registry::{Category, Rule, RuleError};
use crate::resolve::TypeResolver;

/// Constants the word splitter gets wrong
const CASING_EXCEPTIONS: &[(&str, &str)] = &[("textORcsv", "TEXT_OR_CSV")];

/// v2 spelling of a v1 enum constant (`ObjectLockRetentionMode` →
/// `OBJECT_LOCK_RETENTION_MODE`); already converted names are returned as is
pub fn v2_casing(constant: &str) -> String {
    if let Some((_, v2)) = CASING_EXCEPTIONS.iter().find(|(v1, _)| *v1 == constant) {
        return v2.to_string();
    }
    Converter::new()
        .set_boundaries(&[Boundary::Underscore, Boundary::LowerUpper, Boundary::Acronym])
        .to_case(Case::UpperSnake)
        .convert(constant)
}

pub fn check_enum_casing(unit: &CompilationUnit, source: &str, mapper: &TypeMapper) -> Vec<Edit> {
    let resolver = TypeResolver::new(unit, source);
    let mut checker = EnumCasingChecker {
        source,
        mapper,
        resolver: &resolver,
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);
    checker.edits
}

struct EnumCasingChecker<'a, 'r> {
    source: &'a str,
    mapper: &'r TypeMapper,
    resolver: &'r TypeResolver<'a>,
    edits: Vec<Edit>,
}

impl EnumCasingChecker<'_, '_> {
    fn rename(&mut self, span: Span, name: &str) {
        let renamed = v2_casing(name);
        if renamed != name {
            self.edits.push(Edit::new(
                span,
                renamed.clone(),
                format!("Replace enum constant {} with {}", name, renamed),
            ));
        }
    }

    fn check_field_access(&mut self, access: &FieldAccess) {
        let Some(owner) = self.resolver.type_of(&access.target) else {
            return;
        };
        if owner.is_static && self.mapper.is_v2_enum(&owner.name) {
            self.rename(access.field.span, &access.field.name);
        }
    }

    /// A bare constant made visible by a static import
    fn check_identifier(&mut self, ident: &Identifier) {
        if self.resolver.is_variable(&ident.name) {
            return;
        }
        let Some(owner) = self.resolver.static_import_owner(&ident.name) else {
            return;
        };
        if self.mapper.is_v2_enum(owner) {
            self.rename(ident.span, &ident.name);
        }
    }
}

impl<'a> Visitor<'a> for EnumCasingChecker<'a, '_> {
    fn visit_import(&mut self, import: &'a Import, _source: &str) {
        if !import.is_static || import.is_wildcard || !self.mapper.is_v2_enum(import.qualifier()) {
            return;
        }
        let constant = import.simple_name();
        let start = import.path_span.end - constant.len();
        debug_assert_eq!(&self.source[start..import.path_span.end], constant);
        self.rename(Span::new(start, import.path_span.end), constant);
    }

    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        match expr {
            Expr::FieldAccess(access) => self.check_field_access(access),
            Expr::Identifier(ident) => self.check_identifier(ident),
            _ => {}
        }
        true
    }
}

pub struct EnumCasingRule {
    mapper: TypeMapper,
}

impl EnumCasingRule {
    pub fn new(mapper: TypeMapper) -> Self {
        Self { mapper }
    }
}

impl Rule for EnumCasingRule {
    fn name(&self) -> &'static str {
        "enum_casing"
    }

    fn description(&self) -> &'static str {
        "Rename PascalCase enum constants to their v2 SCREAMING_SNAKE_CASE names"
    }

    fn category(&self) -> Category {
        Category::Types
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_enum_casing(unit, source, &self.mapper))
    }
}
