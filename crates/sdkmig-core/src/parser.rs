//! Java front end
//!
//! Parses source text with tree-sitter-java and lowers the concrete syntax
//! tree into the typed [`ast`](crate::ast) model.

use thiserror::Error;
use tree_sitter::Node;

use crate::ast::*;
use crate::edit::Span;

/// Errors produced while parsing a Java file
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to load Java grammar: {0}")]
    Language(String),

    #[error("Parser returned no tree")]
    NoTree,

    #[error("Syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
}

/// Parse a Java compilation unit
pub fn parse_java(source: &str) -> Result<CompilationUnit, ParseError> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| ParseError::Language(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or(ParseError::NoTree)?;
    let root = tree.root_node();

    if root.has_error() {
        let error = first_error(root).unwrap_or(root);
        let position = error.start_position();
        return Err(ParseError::Syntax {
            line: position.row + 1,
            column: position.column + 1,
        });
    }

    Ok(Lowerer { source }.lower_unit(root))
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    all_children(node)
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !is_comment(child.kind()))
        .collect()
}

fn all_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn span_of(node: Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

fn is_comment(kind: &str) -> bool {
    matches!(kind, "line_comment" | "block_comment" | "comment")
}

fn is_type_kind(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier"
            | "scoped_type_identifier"
            | "generic_type"
            | "array_type"
            | "integral_type"
            | "floating_point_type"
            | "boolean_type"
            | "void_type"
            | "annotated_type"
    )
}

fn is_type_decl_kind(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration"
    )
}

fn is_statement_kind(kind: &str) -> bool {
    kind.ends_with("_statement")
        || matches!(
            kind,
            "block" | "local_variable_declaration" | "explicit_constructor_invocation"
        )
}

fn is_expression_kind(kind: &str) -> bool {
    matches!(
        kind,
        "identifier"
            | "field_access"
            | "method_invocation"
            | "object_creation_expression"
            | "string_literal"
            | "text_block"
            | "character_literal"
            | "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal"
            | "decimal_floating_point_literal"
            | "hex_floating_point_literal"
            | "true"
            | "false"
            | "null_literal"
            | "assignment_expression"
            | "lambda_expression"
            | "cast_expression"
            | "class_literal"
            | "this"
            | "super"
            | "parenthesized_expression"
            | "binary_expression"
            | "unary_expression"
            | "update_expression"
            | "ternary_expression"
            | "instanceof_expression"
            | "array_access"
            | "array_creation_expression"
            | "array_initializer"
            | "method_reference"
            | "switch_expression"
    )
}

struct Lowerer<'s> {
    source: &'s str,
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        &self.source[node.start_byte()..node.end_byte()]
    }

    fn ident(&self, node: Node<'_>) -> Identifier {
        Identifier {
            name: self.text(node).to_string(),
            span: span_of(node),
        }
    }

    fn field_ident(&self, node: Node<'_>, field: &str) -> Identifier {
        match node.child_by_field_name(field) {
            Some(child) => self.ident(child),
            None => Identifier {
                name: String::new(),
                span: Span::empty(node.start_byte()),
            },
        }
    }

    fn lower_unit(&self, root: Node<'_>) -> CompilationUnit {
        let mut unit = CompilationUnit {
            span: span_of(root),
            ..Default::default()
        };

        for child in named_children(root) {
            match child.kind() {
                "package_declaration" => {
                    let name = named_children(child)
                        .into_iter()
                        .find(|n| matches!(n.kind(), "identifier" | "scoped_identifier"))
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default();
                    unit.package = Some(PackageDecl {
                        name,
                        span: span_of(child),
                    });
                }
                "import_declaration" => unit.imports.push(self.lower_import(child)),
                kind if is_type_decl_kind(kind) => unit.types.push(self.lower_type_decl(child)),
                _ => {}
            }
        }

        unit
    }

    fn lower_import(&self, node: Node<'_>) -> Import {
        let children = all_children(node);
        let is_static = children.iter().any(|c| c.kind() == "static");
        let is_wildcard = children.iter().any(|c| c.kind() == "asterisk");
        let path_node = children
            .iter()
            .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"));

        let (path, path_span) = match path_node {
            Some(n) => (self.text(*n).to_string(), span_of(*n)),
            None => (String::new(), Span::empty(node.start_byte())),
        };

        Import {
            path,
            path_span,
            is_static,
            is_wildcard,
            span: span_of(node),
        }
    }

    fn lower_type_decl(&self, node: Node<'_>) -> TypeDecl {
        let kind = match node.kind() {
            "interface_declaration" => TypeDeclKind::Interface,
            "enum_declaration" => TypeDeclKind::Enum,
            "record_declaration" => TypeDeclKind::Record,
            "annotation_type_declaration" => TypeDeclKind::Annotation,
            _ => TypeDeclKind::Class,
        };

        let mut extends = Vec::new();
        let mut implements = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "superclass" | "extends_interfaces" => extends.extend(self.collect_types(child)),
                "super_interfaces" => implements.extend(self.collect_types(child)),
                _ => {}
            }
        }

        let components = node
            .child_by_field_name("parameters")
            .map(|params| self.lower_params(params))
            .unwrap_or_default();

        let members = node
            .child_by_field_name("body")
            .map(|body| self.lower_members(body))
            .unwrap_or_default();

        TypeDecl {
            kind,
            name: self.field_ident(node, "name"),
            extends,
            implements,
            components,
            members,
            span: span_of(node),
        }
    }

    /// Find every type node below `node` without descending into types
    fn collect_types(&self, node: Node<'_>) -> Vec<TypeRef> {
        let mut types = Vec::new();
        for child in named_children(node) {
            if is_type_kind(child.kind()) {
                types.push(self.lower_type(child));
            } else {
                types.extend(self.collect_types(child));
            }
        }
        types
    }

    fn lower_members(&self, body: Node<'_>) -> Vec<Member> {
        let mut members = Vec::new();
        for child in named_children(body) {
            match child.kind() {
                "field_declaration" | "constant_declaration" => {
                    members.push(Member::Field(self.lower_variable_declaration(child)));
                }
                "method_declaration"
                | "constructor_declaration"
                | "compact_constructor_declaration"
                | "annotation_type_element_declaration" => {
                    members.push(Member::Method(self.lower_method(child)));
                }
                "block" => members.push(Member::Initializer(self.lower_block(child))),
                "static_initializer" => {
                    if let Some(block) = named_children(child).into_iter().find(|c| c.kind() == "block") {
                        members.push(Member::Initializer(self.lower_block(block)));
                    }
                }
                "enum_constant" => {
                    let args = child
                        .child_by_field_name("arguments")
                        .map(|a| self.lower_arguments(a).items)
                        .unwrap_or_default();
                    let body_members = child
                        .child_by_field_name("body")
                        .map(|b| self.lower_members(b))
                        .unwrap_or_default();
                    members.push(Member::EnumConstant {
                        name: self.field_ident(child, "name"),
                        args,
                        members: body_members,
                        span: span_of(child),
                    });
                }
                "enum_body_declarations" => members.extend(self.lower_members(child)),
                kind if is_type_decl_kind(kind) => {
                    members.push(Member::Type(self.lower_type_decl(child)));
                }
                _ => {}
            }
        }
        members
    }

    fn lower_method(&self, node: Node<'_>) -> MethodDecl {
        let return_type = if node.kind() == "method_declaration"
            || node.kind() == "annotation_type_element_declaration"
        {
            node.child_by_field_name("type").map(|t| self.lower_type(t))
        } else {
            None
        };

        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.lower_params(p))
            .unwrap_or_default();

        let throws = named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "throws")
            .flat_map(|c| self.collect_types(c))
            .collect();

        let body = node.child_by_field_name("body").map(|b| self.lower_block(b));

        MethodDecl {
            name: self.field_ident(node, "name"),
            return_type,
            params,
            throws,
            body,
            span: span_of(node),
        }
    }

    fn lower_params(&self, node: Node<'_>) -> Vec<Param> {
        let mut params = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "formal_parameter" => {
                    if let Some(ty) = child.child_by_field_name("type") {
                        params.push(Param {
                            ty: self.lower_type(ty),
                            name: self.field_ident(child, "name"),
                            span: span_of(child),
                        });
                    }
                }
                "spread_parameter" => {
                    let parts = named_children(child);
                    let ty = parts.iter().find(|c| is_type_kind(c.kind()));
                    let declarator = parts.iter().find(|c| c.kind() == "variable_declarator");
                    if let (Some(ty), Some(declarator)) = (ty, declarator) {
                        params.push(Param {
                            ty: self.lower_type(*ty),
                            name: self.field_ident(*declarator, "name"),
                            span: span_of(child),
                        });
                    }
                }
                _ => {}
            }
        }
        params
    }

    fn lower_variable_declaration(&self, node: Node<'_>) -> VariableDeclaration {
        let ty = match node.child_by_field_name("type") {
            Some(t) => self.lower_type(t),
            None => self.unknown_type(node),
        };

        let mut cursor = node.walk();
        let declarators = node
            .children_by_field_name("declarator", &mut cursor)
            .map(|d| VariableDeclarator {
                name: self.field_ident(d, "name"),
                init: d.child_by_field_name("value").map(|v| self.lower_expr(v)),
                span: span_of(d),
            })
            .collect();

        VariableDeclaration {
            ty,
            declarators,
            span: span_of(node),
        }
    }

    fn unknown_type(&self, node: Node<'_>) -> TypeRef {
        TypeRef {
            name: String::new(),
            name_span: Span::empty(node.start_byte()),
            segments: Vec::new(),
            type_args: Vec::new(),
            array_dims: 0,
            primitive: false,
            span: Span::empty(node.start_byte()),
        }
    }

    fn lower_block(&self, node: Node<'_>) -> Block {
        Block {
            stmts: named_children(node)
                .into_iter()
                .map(|c| self.lower_stmt(c))
                .collect(),
            span: span_of(node),
        }
    }

    fn lower_stmt(&self, node: Node<'_>) -> Stmt {
        match node.kind() {
            "local_variable_declaration" => {
                Stmt::LocalVariable(self.lower_variable_declaration(node))
            }
            "expression_statement" => match named_children(node).into_iter().next() {
                Some(expr) => Stmt::Expression {
                    expr: self.lower_expr(expr),
                    span: span_of(node),
                },
                None => Stmt::Compound(self.lower_compound(node)),
            },
            "block" => Stmt::Block(self.lower_block(node)),
            "return_statement" => Stmt::Return {
                value: named_children(node)
                    .into_iter()
                    .next()
                    .map(|v| self.lower_expr(v)),
                span: span_of(node),
            },
            "enhanced_for_statement" => {
                let mut compound = Compound {
                    kind: node.kind().to_string(),
                    span: span_of(node),
                    ..Default::default()
                };
                if let Some(ty) = node.child_by_field_name("type") {
                    let name = self.field_ident(node, "name");
                    compound.locals.push(VariableDeclaration {
                        ty: self.lower_type(ty),
                        span: Span::new(ty.start_byte(), name.span.end),
                        declarators: vec![VariableDeclarator {
                            span: name.span,
                            name,
                            init: None,
                        }],
                    });
                }
                if let Some(value) = node.child_by_field_name("value") {
                    compound.exprs.push(self.lower_expr(value));
                }
                if let Some(body) = node.child_by_field_name("body") {
                    compound.stmts.push(self.lower_stmt(body));
                }
                Stmt::Compound(compound)
            }
            kind if is_type_decl_kind(kind) => Stmt::LocalType(self.lower_type_decl(node)),
            _ => Stmt::Compound(self.lower_compound(node)),
        }
    }

    fn lower_compound(&self, node: Node<'_>) -> Compound {
        let mut compound = Compound {
            kind: node.kind().to_string(),
            span: span_of(node),
            ..Default::default()
        };
        self.collect_children(node, &mut compound);
        compound
    }

    fn collect_children(&self, node: Node<'_>, out: &mut Compound) {
        for child in named_children(node) {
            let kind = child.kind();
            if is_type_kind(kind) {
                out.types.push(self.lower_type(child));
            } else if is_statement_kind(kind) {
                out.stmts.push(self.lower_stmt(child));
            } else if is_type_decl_kind(kind) {
                out.members.push(Member::Type(self.lower_type_decl(child)));
            } else if kind == "class_body" {
                out.members.extend(self.lower_members(child));
            } else if kind == "catch_formal_parameter" {
                self.lower_catch_parameter(child, out);
            } else if kind == "resource" && child.child_by_field_name("type").is_some() {
                out.locals.push(self.lower_variable_like(child));
            } else if is_expression_kind(kind) {
                out.exprs.push(self.lower_expr(child));
            } else if matches!(kind, "modifiers" | "marker_annotation" | "annotation") {
                continue;
            } else {
                self.collect_children(child, out);
            }
        }
    }

    /// `catch (A | B e)` introduces `e` typed as the first alternative
    fn lower_catch_parameter(&self, node: Node<'_>, out: &mut Compound) {
        let mut types = named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "catch_type")
            .flat_map(|c| self.collect_types(c))
            .collect::<Vec<_>>();
        if types.is_empty() {
            return;
        }
        let first = types.remove(0);
        let name = self.field_ident(node, "name");
        out.locals.push(VariableDeclaration {
            span: span_of(node),
            ty: first,
            declarators: vec![VariableDeclarator {
                span: name.span,
                name,
                init: None,
            }],
        });
        out.types.extend(types);
    }

    /// A node with `type`, `name` and optional `value` fields
    fn lower_variable_like(&self, node: Node<'_>) -> VariableDeclaration {
        let ty = match node.child_by_field_name("type") {
            Some(t) => self.lower_type(t),
            None => self.unknown_type(node),
        };
        let name = self.field_ident(node, "name");
        VariableDeclaration {
            ty,
            declarators: vec![VariableDeclarator {
                span: name.span,
                name,
                init: node.child_by_field_name("value").map(|v| self.lower_expr(v)),
            }],
            span: span_of(node),
        }
    }

    fn lower_arguments(&self, node: Node<'_>) -> Arguments {
        Arguments {
            items: named_children(node)
                .into_iter()
                .map(|c| self.lower_expr(c))
                .collect(),
            span: span_of(node),
        }
    }

    fn lower_expr(&self, node: Node<'_>) -> Expr {
        let span = span_of(node);
        match node.kind() {
            "identifier" => Expr::Identifier(self.ident(node)),
            "field_access" => match node.child_by_field_name("object") {
                Some(object) => Expr::FieldAccess(FieldAccess {
                    target: Box::new(self.lower_expr(object)),
                    field: self.field_ident(node, "field"),
                    span,
                }),
                None => Expr::Other(self.lower_compound(node)),
            },
            "method_invocation" => Expr::MethodInvocation(MethodInvocation {
                target: node
                    .child_by_field_name("object")
                    .map(|o| Box::new(self.lower_expr(o))),
                name: self.field_ident(node, "name"),
                args: node
                    .child_by_field_name("arguments")
                    .map(|a| self.lower_arguments(a))
                    .unwrap_or(Arguments {
                        items: Vec::new(),
                        span: Span::empty(span.end),
                    }),
                span,
            }),
            "object_creation_expression" => match node.child_by_field_name("type") {
                Some(ty) => Expr::NewClass(NewClass {
                    class: self.lower_type(ty),
                    args: node
                        .child_by_field_name("arguments")
                        .map(|a| self.lower_arguments(a))
                        .unwrap_or(Arguments {
                            items: Vec::new(),
                            span: Span::empty(span.end),
                        }),
                    body: named_children(node)
                        .into_iter()
                        .find(|c| c.kind() == "class_body")
                        .map(|b| self.lower_members(b)),
                    span,
                }),
                None => Expr::Other(self.lower_compound(node)),
            },
            "string_literal" | "text_block" => self.literal(node, LiteralKind::String),
            "character_literal" => self.literal(node, LiteralKind::Char),
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal" => {
                let text = self.text(node);
                if text.ends_with('L') || text.ends_with('l') {
                    self.literal(node, LiteralKind::Long)
                } else {
                    self.literal(node, LiteralKind::Integer)
                }
            }
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                self.literal(node, LiteralKind::Floating)
            }
            "true" | "false" => self.literal(node, LiteralKind::Boolean),
            "null_literal" => self.literal(node, LiteralKind::Null),
            "assignment_expression" => {
                match (node.child_by_field_name("left"), node.child_by_field_name("right")) {
                    (Some(left), Some(right)) => Expr::Assignment {
                        target: Box::new(self.lower_expr(left)),
                        value: Box::new(self.lower_expr(right)),
                        span,
                    },
                    _ => Expr::Other(self.lower_compound(node)),
                }
            }
            "lambda_expression" => self.lower_lambda(node),
            "cast_expression" => {
                match (node.child_by_field_name("type"), node.child_by_field_name("value")) {
                    (Some(ty), Some(value)) => Expr::Cast {
                        ty: self.lower_type(ty),
                        expr: Box::new(self.lower_expr(value)),
                        span,
                    },
                    _ => Expr::Other(self.lower_compound(node)),
                }
            }
            "class_literal" => match named_children(node).into_iter().find(|c| is_type_kind(c.kind())) {
                Some(ty) => Expr::ClassLiteral {
                    ty: self.lower_type(ty),
                    span,
                },
                None => Expr::Other(self.lower_compound(node)),
            },
            "this" => Expr::This(span),
            _ => Expr::Other(self.lower_compound(node)),
        }
    }

    fn literal(&self, node: Node<'_>, kind: LiteralKind) -> Expr {
        Expr::Literal(Literal {
            kind,
            text: self.text(node).to_string(),
            span: span_of(node),
        })
    }

    fn lower_lambda(&self, node: Node<'_>) -> Expr {
        let params = match node.child_by_field_name("parameters") {
            Some(p) if p.kind() == "identifier" => vec![self.ident(p)],
            Some(p) => named_children(p)
                .into_iter()
                .filter_map(|c| match c.kind() {
                    "identifier" => Some(self.ident(c)),
                    "formal_parameter" => Some(self.field_ident(c, "name")),
                    _ => None,
                })
                .collect(),
            None => Vec::new(),
        };

        let body = match node.child_by_field_name("body") {
            Some(b) if b.kind() == "block" => LambdaBody::Block(self.lower_block(b)),
            Some(b) => LambdaBody::Expr(Box::new(self.lower_expr(b))),
            None => LambdaBody::Block(Block {
                stmts: Vec::new(),
                span: Span::empty(node.end_byte()),
            }),
        };

        Expr::Lambda(Lambda {
            params,
            body,
            span: span_of(node),
        })
    }

    fn lower_type(&self, node: Node<'_>) -> TypeRef {
        let span = span_of(node);
        match node.kind() {
            "integral_type" | "floating_point_type" | "boolean_type" | "void_type" => TypeRef {
                name: self.text(node).to_string(),
                name_span: span,
                segments: vec![self.ident(node)],
                type_args: Vec::new(),
                array_dims: 0,
                primitive: true,
                span,
            },
            "array_type" => {
                let mut element = match node.child_by_field_name("element") {
                    Some(e) => self.lower_type(e),
                    None => self.unknown_type(node),
                };
                let dims = node
                    .child_by_field_name("dimensions")
                    .map(|d| self.text(d).matches('[').count())
                    .unwrap_or(1);
                element.array_dims += dims;
                element.span = span;
                element
            }
            "annotated_type" => {
                match named_children(node).into_iter().filter(|c| is_type_kind(c.kind())).last() {
                    Some(inner) => self.lower_type(inner),
                    None => self.unknown_type(node),
                }
            }
            _ => {
                let mut segments = Vec::new();
                let mut type_args = Vec::new();
                self.collect_type_segments(node, &mut segments, &mut type_args);
                let name = segments
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(".");
                let name_span = match (segments.first(), segments.last()) {
                    (Some(first), Some(last)) => Span::new(first.span.start, last.span.end),
                    _ => span,
                };
                TypeRef {
                    name,
                    name_span,
                    segments,
                    type_args,
                    array_dims: 0,
                    primitive: false,
                    span,
                }
            }
        }
    }

    fn collect_type_segments(
        &self,
        node: Node<'_>,
        segments: &mut Vec<Identifier>,
        type_args: &mut Vec<TypeRef>,
    ) {
        match node.kind() {
            "type_identifier" => segments.push(self.ident(node)),
            "type_arguments" => {
                for arg in named_children(node) {
                    if is_type_kind(arg.kind()) {
                        type_args.push(self.lower_type(arg));
                    } else if arg.kind() == "wildcard" {
                        type_args.extend(self.collect_types(arg));
                    }
                }
            }
            _ => {
                for child in named_children(node) {
                    self.collect_type_segments(child, segments, type_args);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_method_body(unit: &CompilationUnit) -> &Block {
        unit.types[0]
            .members
            .iter()
            .find_map(|m| match m {
                Member::Method(method) => method.body.as_ref(),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_parse_imports() {
        let source = r#"
package foo;

import com.amazonaws.services.s3.AmazonS3;
import com.amazonaws.services.s3.model.*;
import static com.amazonaws.services.s3.model.StorageClass.Standard;

class A {}
"#;
        let unit = parse_java(source).unwrap();
        assert_eq!(unit.package.as_ref().unwrap().name, "foo");
        assert_eq!(unit.imports.len(), 3);
        assert_eq!(unit.imports[0].path, "com.amazonaws.services.s3.AmazonS3");
        assert!(!unit.imports[0].is_wildcard);
        assert_eq!(unit.imports[1].path, "com.amazonaws.services.s3.model");
        assert!(unit.imports[1].is_wildcard);
        assert!(unit.imports[2].is_static);
        assert_eq!(unit.imports[2].simple_name(), "Standard");
        assert_eq!(unit.types[0].name.name, "A");
    }

    #[test]
    fn test_parse_method_chain() {
        let source = r#"
class A {
    void run() {
        SendMessageRequest req = new SendMessageRequest().withQueueUrl("url").withMessageBody("hi");
    }
}
"#;
        let unit = parse_java(source).unwrap();
        let body = first_method_body(&unit);
        let Stmt::LocalVariable(decl) = &body.stmts[0] else {
            panic!("expected local variable");
        };
        assert_eq!(decl.ty.name, "SendMessageRequest");
        let init = decl.declarators[0].init.as_ref().unwrap();
        let call = init.as_method_invocation().unwrap();
        assert_eq!(call.name.name, "withMessageBody");
        let (links, root) = call.chain();
        assert_eq!(links.len(), 2);
        assert!(matches!(root, Some(Expr::NewClass(_))));
    }

    #[test]
    fn test_parse_generic_and_nested_types() {
        let source = r#"
class A {
    List<BucketLifecycleConfiguration.Rule> rules;
    ResponseInputStream<GetObjectResponse>[] streams;
}
"#;
        let unit = parse_java(source).unwrap();
        let fields: Vec<&VariableDeclaration> = unit.types[0]
            .members
            .iter()
            .filter_map(|m| match m {
                Member::Field(f) => Some(f),
                _ => None,
            })
            .collect();
        assert_eq!(fields[0].ty.name, "List");
        assert_eq!(fields[0].ty.type_args[0].name, "BucketLifecycleConfiguration.Rule");
        assert_eq!(fields[0].ty.type_args[0].segments.len(), 2);
        assert_eq!(fields[1].ty.array_dims, 1);
        assert_eq!(fields[1].ty.type_args[0].name, "GetObjectResponse");
    }

    #[test]
    fn test_parse_catch_parameter() {
        let source = r#"
class A {
    void run() {
        try {
            s3.deleteBucket("b");
        } catch (AmazonServiceException e) {
            log(e.getErrorCode());
        }
    }
}
"#;
        let unit = parse_java(source).unwrap();
        let body = first_method_body(&unit);
        let Stmt::Compound(try_stmt) = &body.stmts[0] else {
            panic!("expected try statement");
        };
        assert_eq!(try_stmt.locals.len(), 1);
        assert_eq!(try_stmt.locals[0].ty.name, "AmazonServiceException");
        assert_eq!(try_stmt.locals[0].declarators[0].name.name, "e");
    }

    #[test]
    fn test_parse_literals() {
        let source = r#"
class A {
    void run() {
        foo("s", 10, 20L, true, null);
    }
}
"#;
        let unit = parse_java(source).unwrap();
        let body = first_method_body(&unit);
        let Stmt::Expression { expr, .. } = &body.stmts[0] else {
            panic!("expected expression statement");
        };
        let call = expr.as_method_invocation().unwrap();
        let kinds: Vec<LiteralKind> = call
            .args
            .items
            .iter()
            .map(|a| a.as_literal().unwrap().kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                LiteralKind::String,
                LiteralKind::Integer,
                LiteralKind::Long,
                LiteralKind::Boolean,
                LiteralKind::Null
            ]
        );
    }

    #[test]
    fn test_syntax_error() {
        let result = parse_java("class A { void run( { }");
        assert!(matches!(result, Err(ParseError::Syntax { .. })));
    }
}
