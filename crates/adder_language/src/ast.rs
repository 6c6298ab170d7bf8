//! Abstract syntax tree for the Adder language.
//!
//! The parser produces statements and expressions; every node carries the
//! [`Span`] it was parsed from. Function bodies are reference counted so that
//! executing a `def` does not copy the body.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::span::Span;

// =============================================================================
// Statements
// =============================================================================

/// A statement with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    /// What the statement does.
    pub kind: StmtKind,
    /// Where the statement starts.
    pub span: Span,
}

impl Stmt {
    /// Creates a new statement.
    #[must_use]
    pub const fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// An expression evaluated for its side effects (or echoed interactively).
    Expr(Expr),
    /// `a = b = value`
    Assign {
        /// Assignment targets, leftmost first.
        targets: Vec<Expr>,
        /// The assigned value.
        value: Expr,
    },
    /// `target op= value`
    AugAssign {
        /// The target (a name, subscript or attribute).
        target: Expr,
        /// The arithmetic operator.
        op: BinOp,
        /// The right-hand side.
        value: Expr,
    },
    /// `pass`
    Pass,
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// `return [value]`
    Return(Option<Expr>),
    /// `if test: body [elif ...] [else: orelse]`
    If {
        /// The condition.
        test: Expr,
        /// Statements run when the condition holds.
        body: Vec<Stmt>,
        /// Statements run otherwise (`elif` chains nest here).
        orelse: Vec<Stmt>,
    },
    /// `while test: body [else: orelse]`
    While {
        /// The loop condition.
        test: Expr,
        /// The loop body.
        body: Vec<Stmt>,
        /// Run when the loop ends without `break`.
        orelse: Vec<Stmt>,
    },
    /// `for target in iter: body [else: orelse]`
    For {
        /// The loop variable(s).
        target: Expr,
        /// The iterated expression.
        iter: Expr,
        /// The loop body.
        body: Vec<Stmt>,
        /// Run when the loop ends without `break`.
        orelse: Vec<Stmt>,
    },
    /// `def name(params): body`
    FunctionDef(Rc<FunctionDef>),
    /// `global a, b`
    Global(Vec<String>),
    /// `del a, b[0]`
    Del(Vec<Expr>),
    /// `raise [exc]`
    Raise(Option<Expr>),
    /// `try: ... except ...: ... else: ... finally: ...`
    Try {
        /// The guarded statements.
        body: Vec<Stmt>,
        /// Exception handlers, tried in order.
        handlers: Vec<ExceptHandler>,
        /// Run when the body raises nothing.
        orelse: Vec<Stmt>,
        /// Always run.
        finalbody: Vec<Stmt>,
    },
    /// `assert test[, msg]`
    Assert {
        /// The asserted condition.
        test: Expr,
        /// Optional failure message.
        msg: Option<Expr>,
    },
    /// `import a.b` or `from a import b`; the names are the bindings created.
    Import {
        /// The dotted module path.
        module: String,
        /// Names the statement would bind.
        names: Vec<String>,
    },
}

/// One `except` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct ExceptHandler {
    /// The matched exception class expression (`None` catches everything).
    pub kind: Option<Expr>,
    /// The `as` binding.
    pub name: Option<String>,
    /// The handler body.
    pub body: Vec<Stmt>,
    /// Location of the `except` keyword.
    pub span: Span,
}

// =============================================================================
// Functions
// =============================================================================

/// A function definition shared by `def` statements and `lambda` expressions.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    /// The function name (`<lambda>` for lambdas).
    pub name: String,
    /// Positional parameters.
    pub params: Vec<Param>,
    /// The function body.
    pub body: Vec<Stmt>,
    /// Names bound in the body.
    pub scope: Scope,
    /// Where the definition starts.
    pub span: Span,
}

/// A function parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    /// The parameter name.
    pub name: String,
    /// Default value expression, evaluated when the function is defined.
    pub default: Option<Expr>,
}

/// Name bindings of a function body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scope {
    /// Names local to the function: parameters and assigned names.
    pub locals: HashSet<String>,
    /// Names declared `global`.
    pub globals: HashSet<String>,
}

impl Scope {
    /// Computes the scope of a function from its parameters and body.
    ///
    /// Nested function bodies are not entered; a nested `def` only binds its
    /// own name.
    #[must_use]
    pub fn analyze(params: &[Param], body: &[Stmt]) -> Self {
        let mut scope = Self::default();
        for param in params {
            scope.locals.insert(param.name.clone());
        }
        scope.collect_block(body);
        for name in &scope.globals {
            scope.locals.remove(name);
        }
        scope
    }

    /// Returns true if `name` is local to the function.
    #[must_use]
    pub fn is_local(&self, name: &str) -> bool {
        self.locals.contains(name)
    }

    fn collect_block(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.collect_stmt(stmt);
        }
    }

    fn collect_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Assign { targets, .. } => {
                for target in targets {
                    self.collect_target(target);
                }
            }
            StmtKind::AugAssign { target, .. } => self.collect_target(target),
            StmtKind::For {
                target,
                body,
                orelse,
                ..
            } => {
                self.collect_target(target);
                self.collect_block(body);
                self.collect_block(orelse);
            }
            StmtKind::If { body, orelse, .. } | StmtKind::While { body, orelse, .. } => {
                self.collect_block(body);
                self.collect_block(orelse);
            }
            StmtKind::FunctionDef(def) => {
                self.locals.insert(def.name.clone());
            }
            StmtKind::Global(names) => {
                self.globals.extend(names.iter().cloned());
            }
            StmtKind::Del(targets) => {
                for target in targets {
                    self.collect_target(target);
                }
            }
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                self.collect_block(body);
                for handler in handlers {
                    if let Some(name) = &handler.name {
                        self.locals.insert(name.clone());
                    }
                    self.collect_block(&handler.body);
                }
                self.collect_block(orelse);
                self.collect_block(finalbody);
            }
            StmtKind::Import { names, .. } => {
                self.locals.extend(names.iter().cloned());
            }
            StmtKind::Expr(_)
            | StmtKind::Pass
            | StmtKind::Break
            | StmtKind::Continue
            | StmtKind::Return(_)
            | StmtKind::Raise(_)
            | StmtKind::Assert { .. } => {}
        }
    }

    fn collect_target(&mut self, target: &Expr) {
        match &target.kind {
            ExprKind::Name(name) => {
                self.locals.insert(name.clone());
            }
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                for item in items {
                    self.collect_target(item);
                }
            }
            _ => {}
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

/// An expression with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    /// What the expression computes.
    pub kind: ExprKind,
    /// Where the expression starts.
    pub span: Span,
}

impl Expr {
    /// Creates a new expression.
    #[must_use]
    pub const fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns a short description used in "cannot assign to" messages.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match &self.kind {
            ExprKind::None | ExprKind::Bool(_) => "keyword",
            ExprKind::Int(_) | ExprKind::Float(_) | ExprKind::Str(_) => "literal",
            ExprKind::Name(_) => "name",
            ExprKind::List(_) => "list",
            ExprKind::Tuple(_) => "tuple",
            ExprKind::Dict(_) => "dict display",
            ExprKind::Unary { .. } | ExprKind::Binary { .. } => "operator",
            ExprKind::BoolOp { .. } => "boolean operator",
            ExprKind::Compare { .. } => "comparison",
            ExprKind::IfExp { .. } => "conditional expression",
            ExprKind::Lambda(_) => "lambda",
            ExprKind::Call { .. } => "function call",
            ExprKind::Attribute { .. } => "attribute",
            ExprKind::Subscript { .. } => "subscript",
            ExprKind::Slice { .. } => "slice",
        }
    }
}

/// Expression kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// `None`
    None,
    /// `True` or `False`
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Float literal.
    Float(f64),
    /// String literal (adjacent literals already concatenated).
    Str(Rc<str>),
    /// Variable reference.
    Name(String),
    /// `[a, b]`
    List(Vec<Expr>),
    /// `(a, b)` or `a, b`
    Tuple(Vec<Expr>),
    /// `{k: v}`
    Dict(Vec<(Expr, Expr)>),
    /// `-x`, `+x`, `~x`, `not x`
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<Expr>,
    },
    /// Arithmetic and bitwise operators.
    Binary {
        /// The operator.
        op: BinOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Short-circuiting `and` / `or`.
    BoolOp {
        /// The operator.
        op: BoolOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Possibly chained comparison: `a < b <= c`.
    Compare {
        /// The first operand.
        left: Box<Expr>,
        /// Each operator with its right-hand operand.
        ops: Vec<(CmpOp, Expr)>,
    },
    /// `body if test else orelse`
    IfExp {
        /// The condition.
        test: Box<Expr>,
        /// Value when the condition holds.
        body: Box<Expr>,
        /// Value otherwise.
        orelse: Box<Expr>,
    },
    /// `lambda params: expr`
    Lambda(Rc<FunctionDef>),
    /// `func(args, name=value)`
    Call {
        /// The callee.
        func: Box<Expr>,
        /// Positional arguments.
        args: Vec<Expr>,
        /// Keyword arguments.
        keywords: Vec<(String, Expr)>,
    },
    /// `value.attr`
    Attribute {
        /// The object.
        value: Box<Expr>,
        /// The attribute name.
        attr: String,
    },
    /// `value[index]`
    Subscript {
        /// The container.
        value: Box<Expr>,
        /// The index (possibly a [`ExprKind::Slice`]).
        index: Box<Expr>,
    },
    /// `lower:upper:step`, only valid as a subscript index.
    Slice {
        /// Start bound.
        lower: Option<Box<Expr>>,
        /// End bound.
        upper: Option<Box<Expr>>,
        /// Step.
        step: Option<Box<Expr>>,
    },
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Neg,
    /// `+`
    Pos,
    /// `~`
    Invert,
    /// `not`
    Not,
}

/// Binary arithmetic and bitwise operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `//`
    FloorDiv,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `<<`
    LShift,
    /// `>>`
    RShift,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
}

impl BinOp {
    /// Parses an operator symbol (without a trailing `=`).
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "//" => Self::FloorDiv,
            "%" => Self::Mod,
            "**" => Self::Pow,
            "<<" => Self::LShift,
            ">>" => Self::RShift,
            "&" => Self::BitAnd,
            "|" => Self::BitOr,
            "^" => Self::BitXor,
            _ => return None,
        })
    }

    /// Returns the operator symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::FloorDiv => "//",
            Self::Mod => "%",
            Self::Pow => "**",
            Self::LShift => "<<",
            Self::RShift => ">>",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Short-circuiting boolean operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoolOp {
    /// `and`
    And,
    /// `or`
    Or,
}

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtE,
    /// `>`
    Gt,
    /// `>=`
    GtE,
    /// `in`
    In,
    /// `not in`
    NotIn,
    /// `is`
    Is,
    /// `is not`
    IsNot,
}

impl CmpOp {
    /// Returns the operator symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtE => "<=",
            Self::Gt => ">",
            Self::GtE => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::Is => "is",
            Self::IsNot => "is not",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> Expr {
        Expr::new(ExprKind::Name(n.to_string()), Span::default())
    }

    fn stmt(kind: StmtKind) -> Stmt {
        Stmt::new(kind, Span::default())
    }

    #[test]
    fn scope_collects_params_and_assignments() {
        let body = vec![
            stmt(StmtKind::Assign {
                targets: vec![Expr::new(
                    ExprKind::Tuple(vec![name("a"), name("b")]),
                    Span::default(),
                )],
                value: name("c"),
            }),
            stmt(StmtKind::Expr(name("d"))),
        ];
        let params = vec![Param {
            name: "p".to_string(),
            default: None,
        }];
        let scope = Scope::analyze(&params, &body);
        assert!(scope.is_local("p"));
        assert!(scope.is_local("a"));
        assert!(scope.is_local("b"));
        assert!(!scope.is_local("c"));
        assert!(!scope.is_local("d"));
    }

    #[test]
    fn global_declaration_removes_local() {
        let body = vec![
            stmt(StmtKind::Global(vec!["counter".to_string()])),
            stmt(StmtKind::AugAssign {
                target: name("counter"),
                op: BinOp::Add,
                value: Expr::new(ExprKind::Int(1), Span::default()),
            }),
        ];
        let scope = Scope::analyze(&[], &body);
        assert!(!scope.is_local("counter"));
        assert!(scope.globals.contains("counter"));
    }

    #[test]
    fn binop_symbols_round_trip() {
        for op in [BinOp::Add, BinOp::FloorDiv, BinOp::Pow, BinOp::BitXor] {
            assert_eq!(BinOp::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(BinOp::from_symbol("=="), None);
    }

    #[test]
    fn describe_assignment_targets() {
        let call = Expr::new(
            ExprKind::Call {
                func: Box::new(name("f")),
                args: vec![],
                keywords: vec![],
            },
            Span::default(),
        );
        assert_eq!(call.describe(), "function call");
        assert_eq!(Expr::new(ExprKind::Int(1), Span::default()).describe(), "literal");
    }
}
