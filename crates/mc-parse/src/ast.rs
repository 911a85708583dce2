//! C abstract syntax tree.
//!
//! Every statement and declaration carries the 1-based line of its first
//! token, which is where rule violations are reported.

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslationUnit {
    pub items: Vec<ExternalDecl>,
}

impl TranslationUnit {
    /// Function definitions in source order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.items.iter().filter_map(|item| match item {
            ExternalDecl::Function(f) => Some(f),
            ExternalDecl::Declaration(_) => None,
        })
    }
}

/// File-scope item.
#[derive(Debug, Clone, PartialEq)]
pub enum ExternalDecl {
    Function(FunctionDef),
    Declaration(Declaration),
}

/// A function definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub specifiers: DeclSpecifiers,
    pub declarator: Declarator,
    pub body: Block,
    pub line: usize,
}

impl FunctionDef {
    /// Function name.
    pub fn name(&self) -> &str {
        self.declarator.name.as_deref().unwrap_or("")
    }

    /// Parameters of the defining declarator.
    pub fn params(&self) -> &[Param] {
        self.declarator.function_params().unwrap_or(&[])
    }
}

/// A `{ ... }` compound statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub items: Vec<Stmt>,
    pub line: usize,
}

/// Storage-class specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
    ThreadLocal,
}

/// Declaration specifiers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeclSpecifiers {
    pub storage: Vec<StorageClass>,
    /// `const`, `volatile`, `inline`, ...
    pub qualifiers: Vec<String>,
    /// Type keywords and typedef names, as written
    pub type_names: Vec<String>,
    pub record: Option<RecordSpec>,
    pub enumeration: Option<EnumSpec>,
}

impl DeclSpecifiers {
    /// Whether this declares typedef names.
    pub fn is_typedef(&self) -> bool {
        self.storage.contains(&StorageClass::Typedef)
    }

    /// Whether nothing was consumed.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
            && self.qualifiers.is_empty()
            && self.type_names.is_empty()
            && self.record.is_none()
            && self.enumeration.is_none()
    }
}

/// `struct` or `union`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Struct,
    Union,
}

/// A struct or union specifier.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSpec {
    pub kind: RecordKind,
    pub tag: Option<String>,
    /// `None` for a reference to a tag declared elsewhere
    pub members: Option<Vec<Declaration>>,
    pub line: usize,
}

/// An enum specifier.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSpec {
    pub tag: Option<String>,
    pub enumerators: Option<Vec<Enumerator>>,
    pub line: usize,
}

/// One enumeration constant.
#[derive(Debug, Clone, PartialEq)]
pub struct Enumerator {
    pub name: String,
    pub value: Option<Expr>,
    pub line: usize,
}

/// A declaration, at file or block scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub specifiers: DeclSpecifiers,
    pub declarators: Vec<InitDeclarator>,
    pub line: usize,
}

/// Declarator with optional initializer (or bit-field width for members).
#[derive(Debug, Clone, PartialEq)]
pub struct InitDeclarator {
    pub declarator: Declarator,
    pub init: Option<Initializer>,
    pub bit_width: Option<Expr>,
}

/// A declarator: an optional name plus derivations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Declarator {
    pub name: Option<String>,
    pub line: usize,
    /// Derivations from the name outward: `*p[3]` is `[Array, Pointer]`
    pub derived: Vec<Derived>,
}

impl Declarator {
    /// Whether this declares a function.
    pub fn is_function(&self) -> bool {
        matches!(self.derived.first(), Some(Derived::Function { .. }))
    }

    /// Parameters, if this declares a function.
    pub fn function_params(&self) -> Option<&[Param]> {
        match self.derived.first() {
            Some(Derived::Function { params, .. }) => Some(params.as_slice()),
            _ => None,
        }
    }
}

/// Type derivation.
#[derive(Debug, Clone, PartialEq)]
pub enum Derived {
    Pointer,
    Array(Option<Expr>),
    Function { params: Vec<Param>, variadic: bool },
}

/// Function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub specifiers: DeclSpecifiers,
    pub declarator: Declarator,
}

/// Type name as used in casts and `sizeof`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeName {
    pub specifiers: DeclSpecifiers,
    pub declarator: Declarator,
}

/// Initializer.
#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    Expr(Expr),
    /// Brace list; designators are not kept
    List(Vec<Initializer>),
}

/// `for` clause 1.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Declaration(Declaration),
    Expr(Expr),
}

/// Statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Compound(Block),
    Declaration(Declaration),
    /// Expression statement; `None` is the null statement `;`
    Expr {
        expr: Option<Expr>,
        line: usize,
    },
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        line: usize,
    },
    Switch {
        cond: Expr,
        body: Box<Stmt>,
        line: usize,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
        line: usize,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
        line: usize,
    },
    For {
        init: Option<ForInit>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
        line: usize,
    },
    Case {
        value: Expr,
        body: Box<Stmt>,
        line: usize,
    },
    Default {
        body: Box<Stmt>,
        line: usize,
    },
    Labeled {
        label: String,
        body: Box<Stmt>,
        line: usize,
    },
    Goto {
        label: String,
        line: usize,
    },
    Break {
        line: usize,
    },
    Continue {
        line: usize,
    },
    Return {
        value: Option<Expr>,
        line: usize,
    },
}

impl Stmt {
    /// Line of the first token.
    pub fn line(&self) -> usize {
        match self {
            Stmt::Compound(block) => block.line,
            Stmt::Declaration(decl) => decl.line,
            Stmt::Expr { line, .. }
            | Stmt::If { line, .. }
            | Stmt::Switch { line, .. }
            | Stmt::While { line, .. }
            | Stmt::DoWhile { line, .. }
            | Stmt::For { line, .. }
            | Stmt::Case { line, .. }
            | Stmt::Default { line, .. }
            | Stmt::Labeled { line, .. }
            | Stmt::Goto { line, .. }
            | Stmt::Break { line }
            | Stmt::Continue { line }
            | Stmt::Return { line, .. } => *line,
        }
    }

    /// Whether this is a `{ ... }` block.
    pub fn is_compound(&self) -> bool {
        matches!(self, Stmt::Compound(_))
    }
}

/// Expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(String),
    /// Integer, floating or character constant, as written
    Constant(String),
    /// Adjacent literals are concatenated, quotes kept per piece
    StringLit(String),
    /// Prefix `++ -- & * + - ~ !`
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    /// Postfix `++ --`
    Postfix {
        op: String,
        operand: Box<Expr>,
    },
    Binary {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        op: String,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Comma(Vec<Expr>),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Member {
        base: Box<Expr>,
        field: String,
        arrow: bool,
    },
    Cast {
        ty: Box<TypeName>,
        operand: Box<Expr>,
    },
    SizeofType(Box<TypeName>),
    SizeofExpr(Box<Expr>),
    AlignofType(Box<TypeName>),
    CompoundLiteral {
        ty: Box<TypeName>,
        init: Vec<Initializer>,
    },
}
