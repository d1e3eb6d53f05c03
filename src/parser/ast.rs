// Lowered program definitions: the host instruction set the rewriter targets

use super::parse::ParseError;
use crate::runtime::Target;
use std::rc::Rc;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A line of the user source, as cited by the commands it produces
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceLine {
    pub number: usize,
    pub text: Rc<str>,
}

impl SourceLine {
    pub fn new(number: usize, text: &str) -> Self {
        SourceLine {
            number,
            text: Rc::from(text),
        }
    }
}

/// The three constructor-backed container kinds (arrays have their own
/// statement because they carry a size and initializer)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Stack,
    Queue,
    List,
}

impl ContainerKind {
    /// Map a declared generic type name onto a container kind
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "stack" => Some(ContainerKind::Stack),
            "queue" => Some(ContainerKind::Queue),
            "list" | "vector" | "LinkedList" => Some(ContainerKind::List),
            _ => None,
        }
    }

    pub fn target(self) -> Target {
        match self {
            ContainerKind::Stack => Target::Stack,
            ContainerKind::Queue => Target::Queue,
            ContainerKind::List => Target::LinkedList,
        }
    }

    /// Name of the runtime constructor in the lowered listing
    pub fn constructor(self) -> &'static str {
        match self {
            ContainerKind::Stack => "__createStack",
            ContainerKind::Queue => "__createQueue",
            ContainerKind::List => "__createList",
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "===",
            BinOp::Ne => "!==",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,    // -x
    Not,    // !x
    BitNot, // ~x
}

/// Increment / decrement forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOp {
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

/// Expressions of the lowered program
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Variable(String),
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    CompoundAssign {
        op: BinOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Step {
        op: StepOp,
        target: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    MethodCall {
        object: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        member: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// Iteration guard wrapped around a loop condition
    Guard(Box<Expr>),
}

impl Expr {
    /// Wrap a loop condition in the iteration guard
    pub fn guarded(condition: Option<Expr>) -> Expr {
        Expr::Guard(Box::new(
            condition.unwrap_or(Expr::Literal(Literal::Bool(true))),
        ))
    }
}

/// Statements of the lowered program
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Source-line marker: commands emitted after it cite this line
    Line(SourceLine),
    /// Untyped binding (`let name = init;`)
    Let {
        name: String,
        init: Option<Expr>,
    },
    /// Container constructor bound to a constant
    Construct {
        name: String,
        kind: ContainerKind,
    },
    /// Array constructor with declared size and initializer list. A missing
    /// size takes the initializer length.
    ArrayDecl {
        name: String,
        size: Option<Expr>,
        init: Vec<Expr>,
    },
    Expr(Expr),
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    DoWhile {
        body: Vec<Stmt>,
        condition: Expr,
    },
    For {
        init: Vec<Stmt>,
        condition: Expr,
        increment: Vec<Expr>,
        body: Vec<Stmt>,
    },
    Block(Vec<Stmt>),
    Return(Option<Expr>),
    Break,
    Continue,
    /// A construct the rewriter could not lower; fails when executed
    Malformed(ParseError),
}

/// Untyped function definition
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub functions: Vec<FunctionDef>,
    pub body: Vec<Stmt>,
    /// Set when `main` is defined; its invocation is the last body statement
    pub entry: Option<String>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }
}
