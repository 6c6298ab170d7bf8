//! Parser for the Adder language.
//!
//! A recursive-descent parser over the significant tokens produced by the
//! [`Lexer`]. Whenever the token stream runs out while the grammar still
//! needs input, the parser reports [`UNEXPECTED_EOF`]; the REPL relies on that
//! message to tell unfinished input from wrong input.

use std::rc::Rc;

use crate::ast::{
    BinOp, BoolOp, CmpOp, ExceptHandler, Expr, ExprKind, FunctionDef, Param, Scope, Stmt,
    StmtKind, UnaryOp,
};
use crate::error::{SyntaxError, UNEXPECTED_EOF};
use crate::keywords::{UNSUPPORTED, is_keyword};
use crate::lexer::{Diagnostic, INCONSISTENT_DEDENT, Lexer};
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Result type for parser operations.
pub type ParseResult<T> = std::result::Result<T, SyntaxError>;

/// Deepest nesting the parser accepts, counted separately for expressions
/// (brackets, unary operators, lambdas) and for compound statements.
pub const MAX_NESTING: usize = 100;

/// Message for expressions nested past [`MAX_NESTING`].
pub const TOO_MANY_PARENTHESES: &str = "too many nested parentheses";

/// Message for blocks nested past [`MAX_NESTING`].
pub const TOO_MANY_BLOCKS: &str = "too many statically nested blocks";

/// Augmented assignment operators.
const AUGMENTED: &[&str] = &[
    "+=", "-=", "*=", "/=", "//=", "%=", "**=", "<<=", ">>=", "&=", "|=", "^=",
];

/// Parser for Adder source code.
pub struct Parser<'src> {
    /// Source text (for error messages).
    source: &'src str,
    /// Program identifier reported in errors.
    filename: &'src str,
    /// Significant tokens; always ends with `Eof`.
    tokens: Vec<Token>,
    /// Lexer diagnostics, looked up when an `Error` token is reached.
    diagnostics: Vec<Diagnostic>,
    /// Index of the current token.
    pos: usize,
    /// Current expression nesting depth.
    expr_depth: usize,
    /// Current compound statement nesting depth.
    block_depth: usize,
}

/// What a nesting level is counted against.
#[derive(Clone, Copy)]
enum Nesting {
    Expression,
    Block,
}

impl<'src> Parser<'src> {
    /// Creates a new parser for the given source.
    #[must_use]
    pub fn new(source: &'src str, filename: &'src str) -> Self {
        let (tokens, diagnostics) = Lexer::tokenize(source);
        let tokens = tokens
            .into_iter()
            .filter(|t| !t.kind.is_trivia())
            .collect();
        Self {
            source,
            filename,
            tokens,
            diagnostics,
            pos: 0,
            expr_depth: 0,
            block_depth: 0,
        }
    }

    /// Parses exactly one statement, as typed at an interactive prompt.
    ///
    /// A simple statement line may hold several `;`-separated statements.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is empty, holds more than one
    /// statement, or cannot be parsed.
    pub fn parse_single(&mut self) -> ParseResult<Vec<Stmt>> {
        if self.check(TokenKind::Eof) {
            return Err(self.unexpected());
        }
        let stmts = self.parse_statement()?;
        match self.peek().kind {
            TokenKind::Eof => Ok(stmts),
            TokenKind::Error | TokenKind::Indent => Err(self.unexpected()),
            _ => Err(self.error_here(
                "multiple statements found while compiling a single statement",
            )),
        }
    }

    /// Parses a whole module.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement cannot be parsed.
    pub fn parse_module(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::Eof) {
            stmts.extend(self.parse_statement()?);
        }
        Ok(stmts)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Parses one compound statement or one simple statement line.
    fn parse_statement(&mut self) -> ParseResult<Vec<Stmt>> {
        let tok = self.peek();
        if tok.kind == TokenKind::Indent {
            return Err(self.unexpected());
        }
        if tok.kind == TokenKind::Name {
            match tok.literal.as_str() {
                "if" => return Ok(vec![self.nested(Nesting::Block, Self::parse_if)?]),
                "while" => return Ok(vec![self.nested(Nesting::Block, Self::parse_while)?]),
                "for" => return Ok(vec![self.nested(Nesting::Block, Self::parse_for)?]),
                "def" => return Ok(vec![self.nested(Nesting::Block, Self::parse_def)?]),
                "try" => return Ok(vec![self.nested(Nesting::Block, Self::parse_try)?]),
                _ => {}
            }
        }
        self.parse_simple_line()
    }

    /// Parses `small (';' small)* [';'] NEWLINE`.
    fn parse_simple_line(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut stmts = vec![self.parse_small()?];
        while self.eat_op(";") {
            if self.check(TokenKind::Newline) {
                break;
            }
            stmts.push(self.parse_small()?);
        }
        self.expect(TokenKind::Newline)?;
        Ok(stmts)
    }

    /// Parses one simple statement.
    fn parse_small(&mut self) -> ParseResult<Stmt> {
        let tok = self.peek().clone();
        let span = tok.span;
        if tok.kind != TokenKind::Name {
            return self.parse_expr_stmt();
        }

        let kind = match tok.literal.as_str() {
            "pass" => {
                self.advance();
                StmtKind::Pass
            }
            "break" => {
                self.advance();
                StmtKind::Break
            }
            "continue" => {
                self.advance();
                StmtKind::Continue
            }
            "return" => {
                self.advance();
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_exprlist()?)
                };
                StmtKind::Return(value)
            }
            "raise" => {
                self.advance();
                let value = if self.at_statement_end() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                StmtKind::Raise(value)
            }
            "global" => {
                self.advance();
                let mut names = vec![self.expect_name()?];
                while self.eat_op(",") {
                    names.push(self.expect_name()?);
                }
                StmtKind::Global(names)
            }
            "del" => {
                self.advance();
                let target = self.parse_exprlist()?;
                let targets = match target.kind {
                    ExprKind::Tuple(items) => items,
                    _ => vec![target],
                };
                for target in &targets {
                    self.check_target(target, "delete")?;
                }
                StmtKind::Del(targets)
            }
            "assert" => {
                self.advance();
                let test = self.parse_expr()?;
                let msg = if self.eat_op(",") {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                StmtKind::Assert { test, msg }
            }
            "import" => {
                self.advance();
                let module = self.parse_dotted_name()?;
                let mut names = vec![self.parse_import_alias(&module)?];
                while self.eat_op(",") {
                    let other = self.parse_dotted_name()?;
                    names.push(self.parse_import_alias(&other)?);
                }
                StmtKind::Import { module, names }
            }
            "from" => {
                self.advance();
                let module = self.parse_dotted_name()?;
                self.expect_keyword("import")?;
                let parenthesized = self.eat_op("(");
                let mut names = Vec::new();
                loop {
                    let name = self.expect_name()?;
                    names.push(self.parse_import_alias(&name)?);
                    if !self.eat_op(",") || (parenthesized && self.check_op(")")) {
                        break;
                    }
                }
                if parenthesized {
                    self.expect_op(")")?;
                }
                StmtKind::Import { module, names }
            }
            word if UNSUPPORTED.contains(&word) => {
                return Err(self.error_here(&format!("'{word}' is not supported")));
            }
            _ => return self.parse_expr_stmt(),
        };
        Ok(Stmt::new(kind, span))
    }

    /// Parses an expression statement, assignment, or augmented assignment.
    fn parse_expr_stmt(&mut self) -> ParseResult<Stmt> {
        let span = self.peek().span;
        let first = self.parse_exprlist()?;

        let tok = self.peek();
        if tok.kind == TokenKind::Operator && AUGMENTED.contains(&tok.literal.as_str()) {
            let symbol = &tok.literal[..tok.literal.len() - 1];
            let op = BinOp::from_symbol(symbol).ok_or_else(|| self.unexpected())?;
            if !matches!(
                first.kind,
                ExprKind::Name(_) | ExprKind::Subscript { .. } | ExprKind::Attribute { .. }
            ) {
                return Err(self.error_at(
                    first.span,
                    &format!("'{}' is an illegal expression for augmented assignment", first.describe()),
                ));
            }
            self.advance();
            let value = self.parse_exprlist()?;
            return Ok(Stmt::new(
                StmtKind::AugAssign {
                    target: first,
                    op,
                    value,
                },
                span,
            ));
        }

        if !self.check_op("=") {
            return Ok(Stmt::new(StmtKind::Expr(first), span));
        }

        let mut exprs = vec![first];
        while self.eat_op("=") {
            exprs.push(self.parse_exprlist()?);
        }
        let value = exprs.pop().ok_or_else(|| self.unexpected())?;
        for target in &exprs {
            self.check_target(target, "assign to")?;
        }
        Ok(Stmt::new(
            StmtKind::Assign {
                targets: exprs,
                value,
            },
            span,
        ))
    }

    /// Parses `if test: block (elif test: block)* [else: block]`.
    ///
    /// Also used for `elif`, which is an `if` nested in the `orelse`.
    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let span = self.advance().span;
        let test = self.parse_expr()?;
        let body = self.parse_block()?;
        let orelse = if self.check_keyword("elif") {
            vec![self.nested(Nesting::Block, Self::parse_if)?]
        } else if self.eat_keyword("else") {
            self.parse_block()?
        } else {
            Vec::new()
        };
        Ok(Stmt::new(StmtKind::If { test, body, orelse }, span))
    }

    /// Parses `while test: block [else: block]`.
    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let span = self.advance().span;
        let test = self.parse_expr()?;
        let body = self.parse_block()?;
        let orelse = self.parse_else()?;
        Ok(Stmt::new(StmtKind::While { test, body, orelse }, span))
    }

    /// Parses `for target in iter: block [else: block]`.
    fn parse_for(&mut self) -> ParseResult<Stmt> {
        let span = self.advance().span;
        let target = self.parse_target_list()?;
        self.check_target(&target, "assign to")?;
        self.expect_keyword("in")?;
        let iter = self.parse_exprlist()?;
        let body = self.parse_block()?;
        let orelse = self.parse_else()?;
        Ok(Stmt::new(
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            },
            span,
        ))
    }

    /// Parses an optional `else: block`.
    fn parse_else(&mut self) -> ParseResult<Vec<Stmt>> {
        if self.eat_keyword("else") {
            self.parse_block()
        } else {
            Ok(Vec::new())
        }
    }

    /// Parses `def name(params): block`.
    fn parse_def(&mut self) -> ParseResult<Stmt> {
        let span = self.advance().span;
        let name = self.expect_name()?;
        self.expect_op("(")?;
        let params = self.parse_params(")")?;
        self.expect_op(")")?;
        let body = self.parse_block()?;
        let scope = Scope::analyze(&params, &body);
        let def = FunctionDef {
            name,
            params,
            body,
            scope,
            span,
        };
        Ok(Stmt::new(StmtKind::FunctionDef(Rc::new(def)), span))
    }

    /// Parses a parameter list up to (not including) `close`.
    fn parse_params(&mut self, close: &str) -> ParseResult<Vec<Param>> {
        let mut params: Vec<Param> = Vec::new();
        while !self.check_op(close) {
            let span = self.peek().span;
            let name = self.expect_name()?;
            if params.iter().any(|p| p.name == name) {
                return Err(self.error_at(
                    span,
                    &format!("duplicate argument '{name}' in function definition"),
                ));
            }
            let default = if self.eat_op("=") {
                Some(self.parse_expr()?)
            } else {
                if params.iter().any(|p| p.default.is_some()) {
                    return Err(self.error_at(span, "non-default argument follows default argument"));
                }
                None
            };
            params.push(Param { name, default });
            if !self.eat_op(",") {
                break;
            }
        }
        Ok(params)
    }

    /// Parses `try: block (except [expr [as name]]: block)* [else: block] [finally: block]`.
    fn parse_try(&mut self) -> ParseResult<Stmt> {
        let span = self.advance().span;
        let body = self.parse_block()?;

        let mut handlers = Vec::new();
        while self.check_keyword("except") {
            let handler_span = self.advance().span;
            if handlers
                .last()
                .is_some_and(|h: &ExceptHandler| h.kind.is_none())
            {
                return Err(self.error_at(handler_span, "default 'except:' must be last"));
            }
            let (kind, name) = if self.check_op(":") {
                (None, None)
            } else {
                let kind = self.parse_expr()?;
                let name = if self.eat_keyword("as") {
                    Some(self.expect_name()?)
                } else {
                    None
                };
                (Some(kind), name)
            };
            let body = self.parse_block()?;
            handlers.push(ExceptHandler {
                kind,
                name,
                body,
                span: handler_span,
            });
        }

        let orelse = if !handlers.is_empty() && self.eat_keyword("else") {
            self.parse_block()?
        } else {
            Vec::new()
        };
        let finalbody = if self.eat_keyword("finally") {
            self.parse_block()?
        } else {
            Vec::new()
        };

        if handlers.is_empty() && finalbody.is_empty() {
            return Err(self.unexpected());
        }

        Ok(Stmt::new(
            StmtKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
            },
            span,
        ))
    }

    /// Parses `':' (simple_line | NEWLINE INDENT statement+ DEDENT)`.
    fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect_op(":")?;
        if !self.check(TokenKind::Newline) {
            return self.parse_simple_line();
        }
        self.advance();

        if !self.check(TokenKind::Indent) {
            return Err(match self.peek().kind {
                TokenKind::Eof | TokenKind::Error => self.unexpected(),
                _ => self.error_here("expected an indented block").indentation(),
            });
        }
        self.advance();

        let mut body = Vec::new();
        while !self.check(TokenKind::Dedent) && !self.check(TokenKind::Eof) {
            body.extend(self.parse_statement()?);
        }
        self.expect(TokenKind::Dedent)?;
        Ok(body)
    }

    /// Parses a dotted module path like `a.b.c`.
    fn parse_dotted_name(&mut self) -> ParseResult<String> {
        let mut name = self.expect_name()?;
        while self.eat_op(".") {
            name.push('.');
            name.push_str(&self.expect_name()?);
        }
        Ok(name)
    }

    /// Parses an optional `as alias`, returning the name that gets bound.
    fn parse_import_alias(&mut self, imported: &str) -> ParseResult<String> {
        if self.eat_keyword("as") {
            return self.expect_name();
        }
        Ok(imported.split('.').next().unwrap_or(imported).to_string())
    }

    /// Validates an assignment or deletion target.
    fn check_target(&self, target: &Expr, action: &str) -> ParseResult<()> {
        match &target.kind {
            ExprKind::Name(_) | ExprKind::Subscript { .. } | ExprKind::Attribute { .. } => Ok(()),
            ExprKind::Tuple(items) | ExprKind::List(items) => {
                for item in items {
                    self.check_target(item, action)?;
                }
                Ok(())
            }
            _ => Err(self.error_at(
                target.span,
                &format!("cannot {action} {}", target.describe()),
            )),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Parses `expr (',' expr)* [',']`, producing a tuple when commas appear.
    fn parse_exprlist(&mut self) -> ParseResult<Expr> {
        self.parse_sequence(Self::parse_expr)
    }

    /// Parses a `for` target list; stops before `in`.
    fn parse_target_list(&mut self) -> ParseResult<Expr> {
        self.parse_sequence(Self::parse_bitor)
    }

    fn parse_sequence(
        &mut self,
        item: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let span = self.peek().span;
        let first = item(self)?;
        if !self.check_op(",") {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat_op(",") {
            if !self.can_start_expr() {
                break;
            }
            items.push(item(self)?);
        }
        Ok(Expr::new(ExprKind::Tuple(items), span))
    }

    /// Parses a full expression: lambda or conditional expression.
    fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.nested(Nesting::Expression, Self::parse_conditional)
    }

    fn parse_conditional(&mut self) -> ParseResult<Expr> {
        if self.check_keyword("lambda") {
            return self.parse_lambda();
        }
        let span = self.peek().span;
        let body = self.parse_or()?;
        if !self.eat_keyword("if") {
            return Ok(body);
        }
        let test = self.parse_or()?;
        self.expect_keyword("else")?;
        let orelse = self.parse_expr()?;
        Ok(Expr::new(
            ExprKind::IfExp {
                test: Box::new(test),
                body: Box::new(body),
                orelse: Box::new(orelse),
            },
            span,
        ))
    }

    /// Parses `lambda params: expr`.
    fn parse_lambda(&mut self) -> ParseResult<Expr> {
        let span = self.advance().span;
        let params = self.parse_params(":")?;
        self.expect_op(":")?;
        let value = self.parse_expr()?;
        let body = vec![Stmt::new(StmtKind::Return(Some(value)), span)];
        let scope = Scope::analyze(&params, &body);
        let def = FunctionDef {
            name: "<lambda>".to_string(),
            params,
            body,
            scope,
            span,
        };
        Ok(Expr::new(ExprKind::Lambda(Rc::new(def)), span))
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = bool_op(BoolOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_not()?;
        while self.eat_keyword("and") {
            let right = self.parse_not()?;
            left = bool_op(BoolOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> ParseResult<Expr> {
        if self.check_keyword("not") {
            let span = self.advance().span;
            let operand = self.nested(Nesting::Expression, Self::parse_not)?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span,
            ));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let span = self.peek().span;
        let left = self.parse_bitor()?;
        let mut ops = Vec::new();
        while let Some(op) = self.eat_comparison_op() {
            ops.push((op, self.parse_bitor()?));
        }
        if ops.is_empty() {
            return Ok(left);
        }
        Ok(Expr::new(
            ExprKind::Compare {
                left: Box::new(left),
                ops,
            },
            span,
        ))
    }

    /// Consumes a comparison operator if one is next.
    fn eat_comparison_op(&mut self) -> Option<CmpOp> {
        let tok = self.peek();
        let (op, width) = match (tok.kind, tok.literal.as_str()) {
            (TokenKind::Operator, "==") => (CmpOp::Eq, 1),
            (TokenKind::Operator, "!=") => (CmpOp::NotEq, 1),
            (TokenKind::Operator, "<") => (CmpOp::Lt, 1),
            (TokenKind::Operator, "<=") => (CmpOp::LtE, 1),
            (TokenKind::Operator, ">") => (CmpOp::Gt, 1),
            (TokenKind::Operator, ">=") => (CmpOp::GtE, 1),
            (TokenKind::Name, "in") => (CmpOp::In, 1),
            (TokenKind::Name, "not") if self.peek_at(1).is_name("in") => (CmpOp::NotIn, 2),
            (TokenKind::Name, "is") if self.peek_at(1).is_name("not") => (CmpOp::IsNot, 2),
            (TokenKind::Name, "is") => (CmpOp::Is, 1),
            _ => return None,
        };
        for _ in 0..width {
            self.advance();
        }
        Some(op)
    }

    fn parse_bitor(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(&["|"], Self::parse_bitxor)
    }

    fn parse_bitxor(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(&["^"], Self::parse_bitand)
    }

    fn parse_bitand(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(&["&"], Self::parse_shift)
    }

    fn parse_shift(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(&["<<", ">>"], Self::parse_arith)
    }

    fn parse_arith(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(&["+", "-"], Self::parse_term)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        self.parse_binary_level(&["*", "/", "//", "%"], Self::parse_factor)
    }

    /// Parses a left-associative chain of the given operators.
    fn parse_binary_level(
        &mut self,
        symbols: &[&str],
        next: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut left = next(self)?;
        loop {
            let tok = self.peek();
            if tok.kind != TokenKind::Operator || !symbols.contains(&tok.literal.as_str()) {
                return Ok(left);
            }
            let Some(op) = BinOp::from_symbol(&tok.literal) else {
                return Ok(left);
            };
            self.advance();
            let right = next(self)?;
            let span = left.span;
            left = Expr::new(
                ExprKind::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
            );
        }
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        let tok = self.peek();
        let op = match (tok.kind, tok.literal.as_str()) {
            (TokenKind::Operator, "-") => UnaryOp::Neg,
            (TokenKind::Operator, "+") => UnaryOp::Pos,
            (TokenKind::Operator, "~") => UnaryOp::Invert,
            _ => return self.parse_power(),
        };
        let span = self.advance().span;
        let operand = self.nested(Nesting::Expression, Self::parse_factor)?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_power(&mut self) -> ParseResult<Expr> {
        let base = self.parse_primary()?;
        if !self.eat_op("**") {
            return Ok(base);
        }
        let exponent = self.nested(Nesting::Expression, Self::parse_factor)?;
        let span = base.span;
        Ok(Expr::new(
            ExprKind::Binary {
                op: BinOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            },
            span,
        ))
    }

    /// Parses an atom followed by calls, subscripts and attribute accesses.
    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_atom()?;
        loop {
            let span = expr.span;
            if self.eat_op("(") {
                let (args, keywords) = self.parse_call_args()?;
                self.expect_op(")")?;
                expr = Expr::new(
                    ExprKind::Call {
                        func: Box::new(expr),
                        args,
                        keywords,
                    },
                    span,
                );
            } else if self.eat_op("[") {
                let index = self.parse_subscript()?;
                self.expect_op("]")?;
                expr = Expr::new(
                    ExprKind::Subscript {
                        value: Box::new(expr),
                        index: Box::new(index),
                    },
                    span,
                );
            } else if self.eat_op(".") {
                let attr = self.expect_name()?;
                expr = Expr::new(
                    ExprKind::Attribute {
                        value: Box::new(expr),
                        attr,
                    },
                    span,
                );
            } else {
                return Ok(expr);
            }
        }
    }

    /// Parses call arguments up to (not including) `)`.
    fn parse_call_args(&mut self) -> ParseResult<(Vec<Expr>, Vec<(String, Expr)>)> {
        let mut args = Vec::new();
        let mut keywords: Vec<(String, Expr)> = Vec::new();
        while !self.check_op(")") {
            let tok = self.peek();
            if tok.kind == TokenKind::Name
                && !is_keyword(&tok.literal)
                && self.peek_at(1).is_op("=")
            {
                let span = tok.span;
                let name = self.advance().literal;
                self.advance();
                if keywords.iter().any(|(k, _)| *k == name) {
                    return Err(self.error_at(span, &format!("keyword argument repeated: {name}")));
                }
                keywords.push((name, self.parse_expr()?));
            } else {
                let span = tok.span;
                let arg = self.parse_expr()?;
                if !keywords.is_empty() {
                    return Err(self.error_at(span, "positional argument follows keyword argument"));
                }
                args.push(arg);
            }
            if !self.eat_op(",") {
                break;
            }
        }
        Ok((args, keywords))
    }

    /// Parses a subscript: an index, a slice, or a tuple of them.
    fn parse_subscript(&mut self) -> ParseResult<Expr> {
        let span = self.peek().span;
        let first = self.parse_slice_item()?;
        if !self.check_op(",") {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat_op(",") {
            if self.check_op("]") {
                break;
            }
            items.push(self.parse_slice_item()?);
        }
        Ok(Expr::new(ExprKind::Tuple(items), span))
    }

    fn parse_slice_item(&mut self) -> ParseResult<Expr> {
        let span = self.peek().span;
        let lower = if self.check_op(":") {
            None
        } else {
            let expr = self.parse_expr()?;
            if !self.check_op(":") {
                return Ok(expr);
            }
            Some(Box::new(expr))
        };
        self.expect_op(":")?;
        let upper = if self.at_slice_bound_end() {
            None
        } else {
            Some(Box::new(self.parse_expr()?))
        };
        let step = if self.eat_op(":") && !self.at_slice_bound_end() {
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };
        Ok(Expr::new(ExprKind::Slice { lower, upper, step }, span))
    }

    fn at_slice_bound_end(&self) -> bool {
        self.check_op(":") || self.check_op("]") || self.check_op(",")
    }

    /// Parses literals, names and bracketed displays.
    fn parse_atom(&mut self) -> ParseResult<Expr> {
        let tok = self.peek().clone();
        let span = tok.span;
        match tok.kind {
            TokenKind::Number => {
                self.advance();
                let kind = self.parse_number(&tok)?;
                Ok(Expr::new(kind, span))
            }
            TokenKind::String => {
                let mut text = String::new();
                while self.check(TokenKind::String) {
                    let tok = self.advance();
                    text.push_str(&decode_string(&tok.literal));
                }
                Ok(Expr::new(ExprKind::Str(text.into()), span))
            }
            TokenKind::Name => {
                let kind = match tok.literal.as_str() {
                    "None" => ExprKind::None,
                    "True" => ExprKind::Bool(true),
                    "False" => ExprKind::Bool(false),
                    word if is_keyword(word) => return Err(self.unexpected()),
                    _ => ExprKind::Name(tok.literal.clone()),
                };
                self.advance();
                Ok(Expr::new(kind, span))
            }
            TokenKind::Operator if tok.literal == "(" => {
                self.advance();
                if self.eat_op(")") {
                    return Ok(Expr::new(ExprKind::Tuple(Vec::new()), span));
                }
                let inner = self.parse_exprlist()?;
                self.expect_op(")")?;
                Ok(inner)
            }
            TokenKind::Operator if tok.literal == "[" => {
                self.advance();
                let mut items = Vec::new();
                while !self.check_op("]") {
                    items.push(self.parse_expr()?);
                    if !self.eat_op(",") {
                        break;
                    }
                }
                self.expect_op("]")?;
                Ok(Expr::new(ExprKind::List(items), span))
            }
            TokenKind::Operator if tok.literal == "{" => {
                self.advance();
                let mut pairs = Vec::new();
                while !self.check_op("}") {
                    let key = self.parse_expr()?;
                    self.expect_op(":")?;
                    let value = self.parse_expr()?;
                    pairs.push((key, value));
                    if !self.eat_op(",") {
                        break;
                    }
                }
                self.expect_op("}")?;
                Ok(Expr::new(ExprKind::Dict(pairs), span))
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Converts a number token into an int or float literal.
    fn parse_number(&self, tok: &Token) -> ParseResult<ExprKind> {
        let text: String = tok.literal.chars().filter(|&c| c != '_').collect();
        let lower = text.to_ascii_lowercase();
        let radix = match lower.get(..2) {
            Some("0x") => Some((16, "hexadecimal")),
            Some("0o") => Some((8, "octal")),
            Some("0b") => Some((2, "binary")),
            _ => None,
        };

        if let Some((radix, label)) = radix {
            return i64::from_str_radix(&text[2..], radix)
                .map(ExprKind::Int)
                .map_err(|e| self.number_error(tok, &e, label));
        }

        if lower.contains(['.', 'e']) {
            return text
                .parse::<f64>()
                .map(ExprKind::Float)
                .map_err(|_| self.error_at(tok.span, "invalid decimal literal"));
        }

        if text.len() > 1 && text.starts_with('0') && text.chars().any(|c| c != '0') {
            return Err(self.error_at(
                tok.span,
                "leading zeros in decimal integer literals are not permitted",
            ));
        }
        text.parse::<i64>()
            .map(ExprKind::Int)
            .map_err(|e| self.number_error(tok, &e, "decimal"))
    }

    fn number_error(&self, tok: &Token, error: &std::num::ParseIntError, label: &str) -> SyntaxError {
        use std::num::IntErrorKind;
        match error.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                self.error_at(tok.span, "integer literal is too large")
            }
            _ => self.error_at(tok.span, &format!("invalid {label} literal")),
        }
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    /// Returns the current token.
    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    /// Returns the token `n` positions ahead, or the final `Eof`.
    fn peek_at(&self, n: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)]
    }

    /// Consumes and returns the current token. Never moves past `Eof`.
    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_op(&self, op: &str) -> bool {
        self.peek().is_op(op)
    }

    fn check_keyword(&self, word: &str) -> bool {
        self.peek().is_name(word)
    }

    fn eat_op(&mut self, op: &str) -> bool {
        let found = self.check_op(op);
        if found {
            self.advance();
        }
        found
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        let found = self.check_keyword(word);
        if found {
            self.advance();
        }
        found
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_op(&mut self, op: &str) -> ParseResult<Token> {
        if self.check_op(op) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_keyword(&mut self, word: &str) -> ParseResult<Token> {
        if self.check_keyword(word) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    /// Consumes an identifier that is not a reserved word.
    fn expect_name(&mut self) -> ParseResult<String> {
        let tok = self.peek();
        if tok.kind == TokenKind::Name && !is_keyword(&tok.literal) {
            Ok(self.advance().literal)
        } else {
            Err(self.unexpected())
        }
    }

    /// Returns true at the end of a simple statement.
    fn at_statement_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Newline | TokenKind::Eof) || self.check_op(";")
    }

    /// Returns true if the current token can begin an expression.
    fn can_start_expr(&self) -> bool {
        let tok = self.peek();
        match tok.kind {
            TokenKind::Number | TokenKind::String | TokenKind::Error => true,
            TokenKind::Name => {
                !is_keyword(&tok.literal)
                    || matches!(
                        tok.literal.as_str(),
                        "None" | "True" | "False" | "not" | "lambda"
                    )
            }
            TokenKind::Operator => matches!(tok.literal.as_str(), "(" | "[" | "{" | "-" | "+" | "~"),
            _ => false,
        }
    }

    // =========================================================================
    // Errors
    // =========================================================================

    /// Builds the error for an unexpected current token.
    fn unexpected(&self) -> SyntaxError {
        let tok = self.peek();
        match tok.kind {
            TokenKind::Eof => self.error_at(tok.span, UNEXPECTED_EOF),
            TokenKind::Indent => self.error_at(tok.span, "unexpected indent").indentation(),
            TokenKind::Error => {
                let message = self
                    .diagnostics
                    .iter()
                    .find(|d| d.span.start == tok.span.start)
                    .map_or("invalid syntax", |d| d.message.as_str());
                let err = self.error_at(tok.span, message);
                if message == INCONSISTENT_DEDENT {
                    err.indentation()
                } else {
                    err
                }
            }
            _ => self.error_at(tok.span, "invalid syntax"),
        }
    }

    /// Runs `parse` one nesting level deeper, failing once the input is
    /// nested past [`MAX_NESTING`].
    fn nested<T>(
        &mut self,
        nesting: Nesting,
        parse: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        let (depth, message) = match nesting {
            Nesting::Expression => (self.expr_depth, TOO_MANY_PARENTHESES),
            Nesting::Block => (self.block_depth, TOO_MANY_BLOCKS),
        };
        if depth >= MAX_NESTING {
            return Err(self.error_here(message));
        }
        self.set_depth(nesting, depth + 1);
        let result = parse(self);
        self.set_depth(nesting, depth);
        result
    }

    fn set_depth(&mut self, nesting: Nesting, depth: usize) {
        match nesting {
            Nesting::Expression => self.expr_depth = depth,
            Nesting::Block => self.block_depth = depth,
        }
    }

    fn error_here(&self, message: &str) -> SyntaxError {
        self.error_at(self.peek().span, message)
    }

    fn error_at(&self, span: Span, message: &str) -> SyntaxError {
        SyntaxError::new(message, self.filename).at(self.source, span.line, span.column)
    }
}

fn bool_op(op: BoolOp, left: Expr, right: Expr) -> Expr {
    let span = left.span;
    Expr::new(
        ExprKind::BoolOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        },
        span,
    )
}

/// Decodes a string literal token (prefix, quotes and escapes) into its value.
fn decode_string(literal: &str) -> String {
    let prefix_len = literal
        .find(['"', '\''])
        .unwrap_or(literal.len());
    let raw = literal[..prefix_len].contains(['r', 'R']);
    let rest = &literal[prefix_len..];
    let quote_len = if rest.starts_with("\"\"\"") || rest.starts_with("'''") {
        3
    } else {
        1
    };
    let body = rest
        .get(quote_len..rest.len().saturating_sub(quote_len))
        .unwrap_or_default();
    if raw {
        return body.to_string();
    }

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('f') => out.push('\x0c'),
            Some('v') => out.push('\x0b'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\n') => {}
            Some('x') => push_code_point(&mut out, &mut chars, 2, 'x'),
            Some('u') => push_code_point(&mut out, &mut chars, 4, 'u'),
            Some('U') => push_code_point(&mut out, &mut chars, 8, 'U'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Decodes a `\xhh`, `\uhhhh` or `\Uhhhhhhhh` escape, keeping it verbatim if
/// it is malformed.
fn push_code_point(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    marker: char,
) {
    let mut hex = String::new();
    while hex.len() < digits {
        match chars.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                hex.push(*c);
                chars.next();
            }
            _ => break,
        }
    }
    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
        Some(c) if hex.len() == digits => out.push(c),
        _ => {
            out.push('\\');
            out.push(marker);
            out.push_str(&hex);
        }
    }
}
