//! Typed Java syntax tree
//!
//! A closed set of node kinds lowered from the tree-sitter concrete syntax
//! tree. Every node keeps the byte span it was parsed from so rules can
//! emit [`Edit`](crate::Edit)s against the original text. Constructs the
//! migration rules never rewrite directly (loops, switch, binary operators,
//! ...) are kept as [`Stmt::Compound`] / [`Expr::Other`] with their
//! children still lowered.

use crate::edit::Span;

/// A parsed `.java` file
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit {
    pub package: Option<PackageDecl>,
    pub imports: Vec<Import>,
    pub types: Vec<TypeDecl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct PackageDecl {
    pub name: String,
    pub span: Span,
}

/// An `import` declaration
#[derive(Debug, Clone)]
pub struct Import {
    /// Dotted path without the trailing `.*`
    pub path: String,
    /// Span of the dotted path
    pub path_span: Span,
    pub is_static: bool,
    pub is_wildcard: bool,
    /// Span of the whole declaration including `import` and `;`
    pub span: Span,
}

impl Import {
    /// The simple name introduced by a non-wildcard import
    pub fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// For a static import, the owning type; otherwise the package
    pub fn qualifier(&self) -> &str {
        match self.path.rfind('.') {
            Some(pos) => &self.path[..pos],
            None => "",
        }
    }
}

/// An identifier with its location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDeclKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

/// A class, interface, enum, record or annotation declaration
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub kind: TypeDeclKind,
    pub name: Identifier,
    pub extends: Vec<TypeRef>,
    pub implements: Vec<TypeRef>,
    /// Record components
    pub components: Vec<Param>,
    pub members: Vec<Member>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Member {
    Field(VariableDeclaration),
    Method(MethodDecl),
    Type(TypeDecl),
    Initializer(Block),
    /// Enum constant with its constructor arguments and optional body
    EnumConstant {
        name: Identifier,
        args: Vec<Expr>,
        members: Vec<Member>,
        span: Span,
    },
}

/// A method or constructor declaration
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: Identifier,
    /// `None` for constructors
    pub return_type: Option<TypeRef>,
    pub params: Vec<Param>,
    pub throws: Vec<TypeRef>,
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub ty: TypeRef,
    pub name: Identifier,
    pub span: Span,
}

/// A reference to a type as written in source
#[derive(Debug, Clone)]
pub struct TypeRef {
    /// Dotted name without type arguments, e.g. `BucketLifecycleConfiguration.Rule`
    pub name: String,
    /// Span covering the dotted name
    pub name_span: Span,
    /// Each dotted segment
    pub segments: Vec<Identifier>,
    pub type_args: Vec<TypeRef>,
    pub array_dims: usize,
    pub primitive: bool,
    /// Span of the full type including arguments and dimensions
    pub span: Span,
}

impl TypeRef {
    pub fn simple_name(&self) -> &str {
        self.segments
            .last()
            .map(|s| s.name.as_str())
            .unwrap_or(&self.name)
    }

    pub fn is_var(&self) -> bool {
        self.name == "var" && self.segments.len() == 1
    }
}

/// A local variable or field declaration, possibly with several declarators
#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub ty: TypeRef,
    pub declarators: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VariableDeclarator {
    pub name: Identifier,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    LocalVariable(VariableDeclaration),
    Expression { expr: Expr, span: Span },
    Block(Block),
    Return { value: Option<Expr>, span: Span },
    LocalType(TypeDecl),
    /// Any other statement (if, loops, try, switch, ...)
    Compound(Compound),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::LocalVariable(decl) => decl.span,
            Stmt::Expression { span, .. } => *span,
            Stmt::Block(block) => block.span,
            Stmt::Return { span, .. } => *span,
            Stmt::LocalType(decl) => decl.span,
            Stmt::Compound(compound) => compound.span,
        }
    }
}

/// Children of a node that has no dedicated variant
///
/// Children appear in source order within each list.
#[derive(Debug, Clone, Default)]
pub struct Compound {
    /// tree-sitter node kind, e.g. `if_statement`
    pub kind: String,
    pub span: Span,
    /// Variables introduced by the construct (catch parameters, resources,
    /// enhanced-for variables)
    pub locals: Vec<VariableDeclaration>,
    pub exprs: Vec<Expr>,
    pub stmts: Vec<Stmt>,
    pub types: Vec<TypeRef>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Char,
    Integer,
    Long,
    Floating,
    Boolean,
    Null,
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Arguments {
    pub items: Vec<Expr>,
    /// Span including the parentheses
    pub span: Span,
}

impl Arguments {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Span between the parentheses
    pub fn inner_span(&self) -> Span {
        Span::new(self.span.start + 1, self.span.end.saturating_sub(1).max(self.span.start + 1))
    }
}

#[derive(Debug, Clone)]
pub struct FieldAccess {
    pub target: Box<Expr>,
    pub field: Identifier,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodInvocation {
    pub target: Option<Box<Expr>>,
    pub name: Identifier,
    pub args: Arguments,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct NewClass {
    pub class: TypeRef,
    pub args: Arguments,
    /// Anonymous class body
    pub body: Option<Vec<Member>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone)]
pub struct Lambda {
    pub params: Vec<Identifier>,
    pub body: LambdaBody,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Identifier(Identifier),
    FieldAccess(FieldAccess),
    MethodInvocation(MethodInvocation),
    NewClass(NewClass),
    Literal(Literal),
    Assignment {
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    Lambda(Lambda),
    Cast {
        ty: TypeRef,
        expr: Box<Expr>,
        span: Span,
    },
    ClassLiteral {
        ty: TypeRef,
        span: Span,
    },
    This(Span),
    /// Any other expression (binary, ternary, array access, ...)
    Other(Compound),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Identifier(ident) => ident.span,
            Expr::FieldAccess(access) => access.span,
            Expr::MethodInvocation(call) => call.span,
            Expr::NewClass(new) => new.span,
            Expr::Literal(lit) => lit.span,
            Expr::Assignment { span, .. } => *span,
            Expr::Lambda(lambda) => lambda.span,
            Expr::Cast { span, .. } => *span,
            Expr::ClassLiteral { span, .. } => *span,
            Expr::This(span) => *span,
            Expr::Other(compound) => compound.span,
        }
    }

    /// Strip redundant parentheses
    pub fn unparenthesized(&self) -> &Expr {
        match self {
            Expr::Other(compound)
                if compound.kind == "parenthesized_expression" && compound.exprs.len() == 1 =>
            {
                compound.exprs[0].unparenthesized()
            }
            _ => self,
        }
    }

    /// Dotted name for identifier / field-access chains (`a.b.C`)
    pub fn dotted_name(&self) -> Option<String> {
        match self {
            Expr::Identifier(ident) => Some(ident.name.clone()),
            Expr::FieldAccess(access) => {
                let prefix = access.target.dotted_name()?;
                Some(format!("{}.{}", prefix, access.field.name))
            }
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self.unparenthesized() {
            Expr::Identifier(ident) => Some(ident),
            _ => None,
        }
    }

    pub fn as_method_invocation(&self) -> Option<&MethodInvocation> {
        match self {
            Expr::MethodInvocation(call) => Some(call),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self.unparenthesized() {
            Expr::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

impl MethodInvocation {
    /// Walk a fluent chain `root.a().b().c()` from this call down to its root
    ///
    /// Returns the calls from outermost (`c`) to innermost (`a`) and the
    /// root expression that is not itself a method invocation (if any).
    pub fn chain(&self) -> (Vec<&MethodInvocation>, Option<&Expr>) {
        let mut links = vec![self];
        let mut current = self;
        loop {
            match current.target.as_deref() {
                Some(Expr::MethodInvocation(inner)) => {
                    links.push(inner);
                    current = inner;
                }
                other => return (links, other),
            }
        }
    }

    /// True for a call with a single argument that is the boolean literal `value`
    pub fn has_single_bool_arg(&self, value: bool) -> bool {
        self.args.len() == 1
            && self.args.items[0]
                .as_literal()
                .is_some_and(|lit| lit.kind == LiteralKind::Boolean && lit.text == value.to_string())
    }
}
