//! AST visitor for traversing Java syntax trees
//!
//! Provides a trait-based visitor pattern that rules can implement.
//! Default implementations handle traversal; rules override specific methods.
//! Traversal also reports the enclosing constructs through
//! [`Visitor::enter_scope`] / [`Visitor::leave_scope`] so rules can keep an
//! explicit path stack instead of walking parent pointers.

use crate::ast::*;

/// An enclosing construct reported during traversal
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    Type(&'a TypeDecl),
    Method(&'a MethodDecl),
    /// Initializer of a declared variable
    Variable {
        decl: &'a VariableDeclaration,
        declarator: &'a VariableDeclarator,
    },
    /// Right-hand side of an assignment to `target`
    Assignment { target: &'a Expr },
    /// Argument list of a call
    Arguments(&'a MethodInvocation),
    Lambda(&'a Lambda),
}

/// Trait for visiting Java AST nodes
///
/// Default implementations traverse child nodes. Override specific methods
/// to perform actions at those nodes.
pub trait Visitor<'a> {
    fn visit_import(&mut self, _import: &'a Import, _source: &str) {}

    /// Called for each type declaration. Return `true` to continue into members.
    fn visit_type_decl(&mut self, _decl: &'a TypeDecl, _source: &str) -> bool {
        true
    }

    /// Called for each method or constructor. Return `true` to continue into the body.
    fn visit_method(&mut self, _method: &'a MethodDecl, _source: &str) -> bool {
        true
    }

    /// Called for each field, local, catch parameter or resource declaration
    fn visit_variable_declaration(&mut self, _decl: &'a VariableDeclaration, _source: &str) -> bool {
        true
    }

    /// Called for each statement. Return `true` to continue traversal into children.
    fn visit_statement(&mut self, _stmt: &'a Stmt, _source: &str) -> bool {
        true
    }

    /// Called for each expression. Return `true` to continue traversal into children.
    fn visit_expression(&mut self, _expr: &'a Expr, _source: &str) -> bool {
        true
    }

    /// Called for each type reference. Return `true` to continue into type arguments.
    fn visit_type_ref(&mut self, _ty: &'a TypeRef, _source: &str) -> bool {
        true
    }

    fn enter_scope(&mut self, _scope: Scope<'a>) {}

    fn leave_scope(&mut self, _scope: Scope<'a>) {}

    /// Visit a compilation unit (entry point)
    fn visit_unit(&mut self, unit: &'a CompilationUnit, source: &str) {
        for import in &unit.imports {
            self.visit_import(import, source);
        }
        for decl in &unit.types {
            self.traverse_type_decl(decl, source);
        }
    }

    fn traverse_type_decl(&mut self, decl: &'a TypeDecl, source: &str) {
        if !self.visit_type_decl(decl, source) {
            return;
        }
        self.enter_scope(Scope::Type(decl));
        for ty in decl.extends.iter().chain(decl.implements.iter()) {
            self.traverse_type_ref(ty, source);
        }
        for component in &decl.components {
            self.traverse_type_ref(&component.ty, source);
        }
        for member in &decl.members {
            self.traverse_member(member, source);
        }
        self.leave_scope(Scope::Type(decl));
    }

    fn traverse_member(&mut self, member: &'a Member, source: &str) {
        match member {
            Member::Field(field) => self.traverse_variable_declaration(field, source),
            Member::Method(method) => self.traverse_method(method, source),
            Member::Type(decl) => self.traverse_type_decl(decl, source),
            Member::Initializer(block) => self.traverse_block(block, source),
            Member::EnumConstant { args, members, .. } => {
                for arg in args {
                    self.traverse_expression(arg, source);
                }
                for inner in members {
                    self.traverse_member(inner, source);
                }
            }
        }
    }

    fn traverse_method(&mut self, method: &'a MethodDecl, source: &str) {
        if !self.visit_method(method, source) {
            return;
        }
        self.enter_scope(Scope::Method(method));
        if let Some(ret) = &method.return_type {
            self.traverse_type_ref(ret, source);
        }
        for param in &method.params {
            self.traverse_type_ref(&param.ty, source);
        }
        for ty in &method.throws {
            self.traverse_type_ref(ty, source);
        }
        if let Some(body) = &method.body {
            self.traverse_block(body, source);
        }
        self.leave_scope(Scope::Method(method));
    }

    fn traverse_variable_declaration(&mut self, decl: &'a VariableDeclaration, source: &str) {
        if !self.visit_variable_declaration(decl, source) {
            return;
        }
        self.traverse_type_ref(&decl.ty, source);
        for declarator in &decl.declarators {
            if let Some(init) = &declarator.init {
                let scope = Scope::Variable { decl, declarator };
                self.enter_scope(scope);
                self.traverse_expression(init, source);
                self.leave_scope(scope);
            }
        }
    }

    fn traverse_block(&mut self, block: &'a Block, source: &str) {
        for stmt in &block.stmts {
            self.traverse_statement(stmt, source);
        }
    }

    /// Traverse a statement and its children
    fn traverse_statement(&mut self, stmt: &'a Stmt, source: &str) {
        if !self.visit_statement(stmt, source) {
            return;
        }

        match stmt {
            Stmt::LocalVariable(decl) => self.traverse_variable_declaration(decl, source),
            Stmt::Expression { expr, .. } => self.traverse_expression(expr, source),
            Stmt::Block(block) => self.traverse_block(block, source),
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    self.traverse_expression(value, source);
                }
            }
            Stmt::LocalType(decl) => self.traverse_type_decl(decl, source),
            Stmt::Compound(compound) => self.traverse_compound(compound, source),
        }
    }

    fn traverse_compound(&mut self, compound: &'a Compound, source: &str) {
        for local in &compound.locals {
            self.traverse_variable_declaration(local, source);
        }
        for ty in &compound.types {
            self.traverse_type_ref(ty, source);
        }
        for expr in &compound.exprs {
            self.traverse_expression(expr, source);
        }
        for stmt in &compound.stmts {
            self.traverse_statement(stmt, source);
        }
        for member in &compound.members {
            self.traverse_member(member, source);
        }
    }

    /// Traverse an expression and its children
    fn traverse_expression(&mut self, expr: &'a Expr, source: &str) {
        if !self.visit_expression(expr, source) {
            return;
        }

        match expr {
            Expr::Identifier(_) | Expr::Literal(_) | Expr::This(_) => {}
            Expr::FieldAccess(access) => self.traverse_expression(&access.target, source),
            Expr::MethodInvocation(call) => {
                if let Some(target) = &call.target {
                    self.traverse_expression(target, source);
                }
                let scope = Scope::Arguments(call);
                self.enter_scope(scope);
                for arg in &call.args.items {
                    self.traverse_expression(arg, source);
                }
                self.leave_scope(scope);
            }
            Expr::NewClass(new) => {
                self.traverse_type_ref(&new.class, source);
                for arg in &new.args.items {
                    self.traverse_expression(arg, source);
                }
                if let Some(members) = &new.body {
                    for member in members {
                        self.traverse_member(member, source);
                    }
                }
            }
            Expr::Assignment { target, value, .. } => {
                self.traverse_expression(target, source);
                let scope = Scope::Assignment { target: &**target };
                self.enter_scope(scope);
                self.traverse_expression(value, source);
                self.leave_scope(scope);
            }
            Expr::Lambda(lambda) => {
                let scope = Scope::Lambda(lambda);
                self.enter_scope(scope);
                match &lambda.body {
                    LambdaBody::Expr(body) => self.traverse_expression(body, source),
                    LambdaBody::Block(block) => self.traverse_block(block, source),
                }
                self.leave_scope(scope);
            }
            Expr::Cast { ty, expr, .. } => {
                self.traverse_type_ref(ty, source);
                self.traverse_expression(expr, source);
            }
            Expr::ClassLiteral { ty, .. } => self.traverse_type_ref(ty, source),
            Expr::Other(compound) => self.traverse_compound(compound, source),
        }
    }

    fn traverse_type_ref(&mut self, ty: &'a TypeRef, source: &str) {
        if !self.visit_type_ref(ty, source) {
            return;
        }
        for arg in &ty.type_args {
            self.traverse_type_ref(arg, source);
        }
    }
}

/// Convenience function to visit a compilation unit
pub fn visit<'a, V: Visitor<'a>>(visitor: &mut V, unit: &'a CompilationUnit, source: &str) {
    visitor.visit_unit(unit, source);
}
