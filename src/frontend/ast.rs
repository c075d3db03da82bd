//! Abstract syntax produced by the parser.

use smallvec::SmallVec;
use std::rc::Rc;

/// A half-open byte-offset span `[start, end)` into the source that
/// produced a token or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start, other.end)
    }
}

/// An identifier together with the span it was written at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// A single parameter name in a function or struct declaration.
pub type ParamList = SmallVec<[Ident; 4]>;

/// A sequence of statements, the last of which is the block's value.
pub type Block = Rc<[Expr]>;

/// An AST expression node. The language is expression-oriented: bindings,
/// function declarations, and struct declarations are themselves
/// expressions whose value is the bound name's final value (or `unit`).
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    #[must_use]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Unit,
    Ident(String),

    /// `lhs op rhs`, lowered at evaluation time into `lhs.op(rhs)`.
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// `op operand`, lowered into `operand.op()`.
    Unary { op: UnOp, operand: Box<Expr> },

    /// `callee(args...)`
    Call { callee: Box<Expr>, args: Vec<Expr> },

    /// `receiver.name`
    Select { receiver: Box<Expr>, name: Ident },

    /// A tuple literal. `elements.len() == 0` is the empty tuple `(,)`.
    Tuple { elements: Vec<Expr> },

    /// `(params): body`
    AnonFn { params: ParamList, body: Block },

    /// `fn name(params): body`
    FnDecl {
        name: Ident,
        params: ParamList,
        body: Block,
    },

    /// `struct Name(self, params): body`
    StructDecl {
        name: Ident,
        params: ParamList,
        body: Block,
    },

    /// `name = expr`, right-associative: `value` may itself be a `Bind`.
    Bind { name: Ident, value: Box<Expr> },

    /// `if cond: then [else if cond2: then2]* [else: else_]?`
    If {
        branches: Vec<(Expr, Block)>,
        else_branch: Option<Block>,
    },

    /// An explicit `{ ... }`-style block: the value of the last
    /// expression, or `unit` if empty.
    Block(Block),
}

/// Binary operators the parser recognizes; each lowers to a method call on
/// the left operand at evaluation time, except `&&`/`||` which
/// short-circuit and are evaluated structurally rather than dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinOp {
    /// The method name this operator lowers to on the left operand.
    #[must_use]
    pub fn method_name(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

impl UnOp {
    #[must_use]
    pub fn method_name(self) -> &'static str {
        match self {
            // Distinct from `BinOp::Sub`'s `"-"`: the two share a
            // token but not an arity, and `select_field` resolves a
            // single bound method per name, so unary negation needs a
            // name of its own.
            UnOp::Neg => "neg",
            UnOp::Not => "!",
        }
    }
}
