//! Abstract syntax tree shared by the parser, resolver and interpreter.
//!
//! Nodes are immutable once the parser hands them out.  Every expression
//! carries an [`ExprId`] assigned at construction time; the resolver keys
//! its binding-distance table on that id rather than on node contents, so
//! two identical `a` references in different scopes resolve independently.

use std::rc::Rc;

use serde::Serialize;

use crate::token::Token;

/// Stable identity of an expression node, unique within one [`crate::lox::Lox`]
/// session (ids keep growing across successive parses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExprId(pub usize);

/// A **literal constant** that appears directly in the source code.
///
/// These variants are the *terminal leaves* of the expression tree.  The
/// parser copies the value out of the token at parse‑time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// An expression node: an identity plus its shape.
#[derive(Debug, Clone, Serialize)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
}

impl Expr {
    pub fn new(id: ExprId, kind: ExprKind) -> Self {
        Self { id, kind }
    }
}

/// Every kind of *expression* in Lox.
#[derive(Debug, Clone, Serialize)]
pub enum ExprKind {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Prefix unary operator expression
    /// *Example:* `!isReady` or `-42`
    Unary {
        /// The operator token (`!` or `-`).
        operator: Token,
        right: Box<Expr>,
    },

    /// Infix binary operator expression
    /// *Example:* `a + b`, `x <= y`
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token, // `AND` or `OR`
        right: Box<Expr>,
    },

    /// Variable access.
    Variable(Token),

    /// Assignment expression: `identifier "=" expression`
    Assign { name: Token, value: Box<Expr> },

    /// Function‑, method‑ or constructor‑call expression
    /// *Example:* `clock()` or `Point(1, 2)`
    Call {
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// object.property
    Get { object: Box<Expr>, name: Token },

    /// object.property = value
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// The `this` keyword inside a method.
    This(Token),
}

/// A function or method declaration.  Shared between the statement that
/// declares it and every closure created from it.
#[derive(Debug, Serialize)]
pub struct FunctionDecl {
    pub name: Token,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<Token>,

    pub body: Vec<Stmt>,
}

/// **Abstract‑Syntax‑Tree node** for *statements*.  A program is a sequence
/// of these nodes returned by [`crate::parser::Parser::parse`].
///
/// There is no `for` node: the parser desugars `for` into `while`.
#[derive(Debug, Clone, Serialize)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While {
        condition: Expr,
        body: Box<Stmt>,
    },

    /// Function declaration ‑ becomes a first‑class callable value.
    Function(Rc<FunctionDecl>),

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    Class {
        name: Token,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
