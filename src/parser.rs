use tracing::{debug, trace};

use crate::{
    ast::{
        Arg, BinaryOperator, BoolOperator, CmpOperator, Constant, Expr, ExprKind, Ident, Module,
        Stmt, StmtKind, UnaryOperator,
    },
    symbol_table::{DuplicateSymbol, Symbol, SymbolKind, SymbolTable},
    token::{Span, Spanned, Token, TokenKind},
    types::{builtins, DataType},
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Parses a token buffer (as produced by [`crate::lexer::lex`]) into a
/// module, checking scopes and inferring variable types along the way.
pub fn parse(tokens: &[Token]) -> Result<Module> {
    parse_with_symbols(tokens, SymbolTable::with_builtins()).map(|(module, _)| module)
}

/// Like [`parse`], but starts from the provided global scope and hands the
/// resulting table back.
pub fn parse_with_symbols(
    tokens: &[Token],
    symbols: SymbolTable,
) -> Result<(Module, SymbolTable)> {
    assert!(
        tokens.last().is_some_and(Token::is_eof),
        "token buffer must end with eof"
    );
    let mut p = Parser {
        tokens,
        cursor: 0,
        indent_level: 0,
        frame: 0,
        symbols,
    };
    let module = p.parse_module()?;
    debug!(statements = module.body.len(), "parsed module");
    Ok((module, p.symbols))
}

struct Parser<'tok> {
    tokens: &'tok [Token],
    cursor: usize,
    /// Depth, in tabs, of the block currently being parsed.
    indent_level: usize,
    /// Index of the outermost scope of the function being parsed, `0` at
    /// module level. Assignments never resolve to a symbol below it.
    frame: usize,
    symbols: SymbolTable,
}

impl<'tok> Parser<'tok> {
    fn parse_module(&mut self) -> Result<Module> {
        let mut body = Vec::with_capacity(16);
        while !self.is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement()? {
                body.push(stmt);
            }
        }
        Ok(Module { body })
    }

    /// Parses one statement. Bare line breaks and indents yield `None`.
    fn parse_statement(&mut self) -> Result<Option<Stmt>> {
        use TokenKind::*;
        let stmt = match self.peek().kind {
            Identifier | ArrayMember | Return | FuncCall => self.parse_simple_statement()?,
            Def => self.parse_function_def()?,
            If => self.parse_if()?,
            For => self.parse_for()?,
            While => self.parse_while()?,
            Newline | Indent => {
                self.advance();
                return Ok(None);
            }
            other => {
                let error = Error::UnexpectedStatement { token: other };
                return Err(self.peek().span.wrap(error));
            }
        };
        Ok(Some(stmt))
    }

    fn parse_simple_statement(&mut self) -> Result<Stmt> {
        let stmt = match self.peek().kind {
            TokenKind::Identifier | TokenKind::ArrayMember => self.parse_assignment()?,
            TokenKind::Return => self.parse_return()?,
            TokenKind::FuncCall => {
                let value = self.parse_call()?;
                let span = value.span;
                Stmt {
                    kind: StmtKind::Expr { value },
                    span,
                }
            }
            other => {
                let error = Error::UnexpectedStatement { token: other };
                return Err(self.peek().span.wrap(error));
            }
        };
        let next = self.peek();
        if !matches!(next.kind, TokenKind::Newline | TokenKind::Eof) {
            let error = Error::ExpectedEndOfStatement { actual: next.kind };
            return Err(next.span.wrap(error));
        }
        Ok(stmt)
    }

    fn parse_assignment(&mut self) -> Result<Stmt> {
        if self.is(TokenKind::ArrayMember) {
            let target = self.parse_array_member()?;
            self.consume(TokenKind::Assign)?;
            let value = self.parse_condition()?;

            let (found, _) = self.infer(&value);
            if !matches!(found, DataType::Int | DataType::Unknown) {
                return Err(value.span.wrap(Error::NonIntegerElement { found }));
            }
            let span = target.span.to(value.span);
            return Ok(Stmt {
                kind: StmtKind::Assign {
                    targets: vec![target],
                    value,
                },
                span,
            });
        }

        let name = self.consume(TokenKind::Identifier)?;
        self.consume(TokenKind::Assign)?;
        // The right-hand side is resolved before the target is bound, so
        // `x = x` fails when `x` is new.
        let value = self.parse_condition()?;
        self.bind(name, &value)?;

        let target = Expr::new(
            ExprKind::Name {
                id: name.text.clone(),
            },
            name.span,
        );
        let span = name.span.to(value.span);
        Ok(Stmt {
            kind: StmtKind::Assign {
                targets: vec![target],
                value,
            },
            span,
        })
    }

    /// Binds `name` to the type inferred from `value`, defining it in the
    /// current scope on first assignment. Names of enclosing functions are
    /// shadowed, never rebound.
    fn bind(&mut self, name: &Token, value: &Expr) -> Result<()> {
        let (inferred, length) = self.infer(value);
        let Some(symbol) = self.symbols.lookup_in_frame_mut(&name.text, self.frame) else {
            let symbol = Symbol::new(&name.text, SymbolKind::Variable).with_type(inferred, length);
            self.define(symbol, name.span)?;
            return Ok(());
        };
        if !symbol.kind.is_value() {
            return Err(name.span.wrap(Error::NotAVariable(name.text.clone())));
        }
        match symbol.data_type {
            Some(previous) if !previous.is_compatible_with(inferred) => {
                symbol.data_type = Some(DataType::Unknown);
                let error = Error::TypeConflict {
                    name: name.text.clone(),
                    previous,
                    inferred,
                };
                Err(value.span.wrap(error))
            }
            // An unresolved value never erases what is already known.
            Some(previous) if previous != DataType::Unknown && inferred == DataType::Unknown => {
                Ok(())
            }
            _ => {
                symbol.data_type = Some(inferred);
                symbol.length = length;
                Ok(())
            }
        }
    }

    fn parse_return(&mut self) -> Result<Stmt> {
        let start = self.consume(TokenKind::Return)?;
        let value = self.parse_condition()?;
        let span = start.span.to(value.span);
        Ok(Stmt {
            kind: StmtKind::Return { value },
            span,
        })
    }

    fn parse_function_def(&mut self) -> Result<Stmt> {
        let start = self.consume(TokenKind::Def)?;
        let name = self.consume(TokenKind::Identifier)?;
        self.consume(TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.is(TokenKind::RParen) {
            args.push(self.parse_param()?);
            if !self.take(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::RParen)?;

        // Defined before the body so the function may call itself.
        self.define(Symbol::new(&name.text, SymbolKind::Function), name.span)?;
        trace!(name = &*name.text, params = args.len(), "function definition");

        // The scope pushed below is the function's outermost one.
        let enclosing = std::mem::replace(&mut self.frame, self.symbols.depth());
        let body = self.with_scope(|p| {
            for arg in &args {
                let ty = arg.annotation.unwrap_or(DataType::Int);
                let symbol = Symbol::new(&arg.name.name, SymbolKind::Parameter).with_type(ty, None);
                p.define(symbol, arg.name.span)?;
            }
            p.parse_suite()
        });
        self.frame = enclosing;
        let body = body?;

        Ok(Stmt {
            kind: StmtKind::FunctionDef {
                name: Ident {
                    name: name.text.clone(),
                    span: name.span,
                },
                args,
                body,
            },
            span: start.span,
        })
    }

    fn parse_param(&mut self) -> Result<Arg> {
        let name = self.consume(TokenKind::Identifier)?;
        let annotation = if self.take(TokenKind::Colon) {
            let ty = self.consume(TokenKind::Identifier)?;
            let Some(data_type) = DataType::from_annotation(&ty.text) else {
                return Err(ty.span.wrap(Error::UnknownTypeName(ty.text.clone())));
            };
            Some(data_type)
        } else {
            None
        };
        Ok(Arg {
            name: Ident {
                name: name.text.clone(),
                span: name.span,
            },
            annotation,
        })
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        let level = self.indent_level;
        let start = self.consume(TokenKind::If)?;
        let test = self.parse_condition()?;
        let body = self.parse_suite()?;

        let mut elifs = Vec::new();
        while self.at_clause(TokenKind::Elif, level) {
            self.take(TokenKind::Indent);
            let elif = self.consume(TokenKind::Elif)?;
            let test = self.parse_condition()?;
            let body = self.parse_suite()?;
            elifs.push((elif.span, test, body));
        }

        // Fold right to left so the first `elif` is the outermost `orelse`.
        let mut orelse = self.parse_orelse(level)?;
        for (span, test, body) in elifs.into_iter().rev() {
            let nested = StmtKind::If { test, body, orelse };
            orelse = vec![Stmt { kind: nested, span }];
        }

        Ok(Stmt {
            kind: StmtKind::If { test, body, orelse },
            span: start.span,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        let level = self.indent_level;
        let start = self.consume(TokenKind::While)?;
        let test = self.parse_condition()?;
        let body = self.parse_suite()?;
        let orelse = self.parse_orelse(level)?;
        Ok(Stmt {
            kind: StmtKind::While { test, body, orelse },
            span: start.span,
        })
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        let level = self.indent_level;
        let start = self.consume(TokenKind::For)?;
        let target = self.consume(TokenKind::Identifier)?;
        self.consume(TokenKind::In)?;
        let iter = self.parse_expression()?;
        self.declare_loop_variable(target)?;
        let body = self.parse_suite()?;
        let orelse = self.parse_orelse(level)?;

        let target = Expr::new(
            ExprKind::Name {
                id: target.text.clone(),
            },
            target.span,
        );
        Ok(Stmt {
            kind: StmtKind::For {
                target,
                iter,
                body,
                orelse,
            },
            span: start.span,
        })
    }

    /// Loop variables are integers. An existing name is reused only when it
    /// already holds one.
    fn declare_loop_variable(&mut self, target: &Token) -> Result<()> {
        let Some(symbol) = self.symbols.lookup_in_frame_mut(&target.text, self.frame) else {
            let symbol = Symbol::new(&target.text, SymbolKind::Variable).with_type(DataType::Int, None);
            return self.define(symbol, target.span);
        };
        if !symbol.kind.is_value() {
            return Err(target.span.wrap(Error::NotAVariable(target.text.clone())));
        }
        match symbol.data_type {
            Some(previous) if !previous.is_compatible_with(DataType::Int) => {
                let error = Error::TypeConflict {
                    name: target.text.clone(),
                    previous,
                    inferred: DataType::Int,
                };
                Err(target.span.wrap(error))
            }
            _ => {
                symbol.data_type = Some(DataType::Int);
                Ok(())
            }
        }
    }

    /// Whether the clause keyword `kind` continues a compound statement that
    /// was opened at depth `level`.
    fn at_clause(&self, kind: TokenKind, level: usize) -> bool {
        if level == 0 {
            return self.is(kind);
        }
        let current = self.peek();
        current.kind == TokenKind::Indent
            && current.indent_depth() == level
            && self.lookahead(1).kind == kind
    }

    fn parse_orelse(&mut self, level: usize) -> Result<Vec<Stmt>> {
        if !self.at_clause(TokenKind::Else, level) {
            return Ok(Vec::new());
        }
        self.take(TokenKind::Indent);
        self.consume(TokenKind::Else)?;
        self.parse_suite()
    }

    /// Parses `':' simple_statement` or `':' NEWLINE block`.
    fn parse_suite(&mut self) -> Result<Vec<Stmt>> {
        self.consume(TokenKind::Colon)?;
        if self.take(TokenKind::Newline) {
            return self.parse_block();
        }
        let stmt = self.with_scope(Parser::parse_simple_statement)?;
        self.skip_blank_lines();
        Ok(vec![stmt])
    }

    /// Parses consecutive statements indented exactly one level deeper than
    /// the enclosing block, in a fresh scope.
    ///
    /// Returns at the first line indented less, without consuming it, having
    /// popped exactly one level. A dedent spanning several levels is thus
    /// unwound one enclosing block at a time.
    fn parse_block(&mut self) -> Result<Vec<Stmt>> {
        self.skip_blank_lines();
        let first = self.peek();
        if first.kind != TokenKind::Indent {
            return Err(first.span.wrap(Error::ExpectedIndent { actual: first.kind }));
        }
        let expected = self.indent_level + 1;
        let actual = first.indent_depth();
        if actual != expected {
            return Err(first.span.wrap(Error::WrongIndentLevel { expected, actual }));
        }
        self.indent_level = expected;

        let body = self.with_scope(|p| {
            let mut body = Vec::with_capacity(8);
            while p.is(TokenKind::Indent) {
                let current = p.peek();
                let depth = current.indent_depth();
                if depth < p.indent_level {
                    break;
                }
                if depth > p.indent_level {
                    let error = Error::WrongIndentLevel {
                        expected: p.indent_level,
                        actual: depth,
                    };
                    return Err(current.span.wrap(error));
                }
                p.advance();
                if let Some(stmt) = p.parse_statement()? {
                    body.push(stmt);
                }
                p.skip_blank_lines();
            }
            Ok(body)
        })?;

        self.indent_level -= 1;
        Ok(body)
    }

    fn parse_condition(&mut self) -> Result<Expr> {
        let mut left = self.parse_not_test()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::And => BoolOperator::And,
                TokenKind::Or => BoolOperator::Or,
                _ => break,
            };
            self.advance();
            let right = self.parse_not_test()?;
            let span = left.span.to(right.span);
            left = match left.kind {
                ExprKind::BoolOp {
                    op: previous,
                    mut values,
                } if previous == op => {
                    values.push(right);
                    Expr::new(ExprKind::BoolOp { op, values }, span)
                }
                kind => {
                    let values = vec![Expr::new(kind, left.span), right];
                    Expr::new(ExprKind::BoolOp { op, values }, span)
                }
            };
        }
        Ok(left)
    }

    fn parse_not_test(&mut self) -> Result<Expr> {
        if self.is(TokenKind::Not) {
            let not = self.advance();
            let operand = self.parse_not_test()?;
            let span = not.span.to(operand.span);
            let kind = ExprKind::UnaryOp {
                op: UnaryOperator::Not,
                operand: Box::new(operand),
            };
            return Ok(Expr::new(kind, span));
        }
        self.parse_comparison()
    }

    /// At most one comparator is accepted.
    fn parse_comparison(&mut self) -> Result<Expr> {
        let left = self.parse_expression()?;
        let Some(op) = Self::comparison_operator(self.peek().kind) else {
            return Ok(left);
        };
        self.advance();
        let right = self.parse_expression()?;

        let next = self.peek();
        if next.kind.is_comparison() {
            return Err(next.span.wrap(Error::ChainedComparison));
        }

        let span = left.span.to(right.span);
        let kind = ExprKind::Compare {
            left: Box::new(left),
            ops: vec![op],
            comparators: vec![right],
        };
        Ok(Expr::new(kind, span))
    }

    fn comparison_operator(kind: TokenKind) -> Option<CmpOperator> {
        let op = match kind {
            TokenKind::Less => CmpOperator::Lt,
            TokenKind::Greater => CmpOperator::Gt,
            TokenKind::LessEq => CmpOperator::LtE,
            TokenKind::GreaterEq => CmpOperator::GtE,
            TokenKind::EqEq => CmpOperator::Eq,
            TokenKind::NotEq => CmpOperator::NotEq,
            _ => return None,
        };
        Some(op)
    }

    fn parse_expression(&mut self) -> Result<Expr> {
        let token = self.peek();
        match token.kind {
            TokenKind::String => {
                self.advance();
                let value = Constant::Str(unquote(&token.text).into());
                return Ok(Expr::new(ExprKind::Constant { value }, token.span));
            }
            TokenKind::True | TokenKind::False => {
                self.advance();
                let value = Constant::Bool(token.kind == TokenKind::True);
                return Ok(Expr::new(ExprKind::Constant { value }, token.span));
            }
            TokenKind::LBracket => return self.parse_list(),
            _ => {}
        }

        let mut left = self.parse_term()?;
        loop {
            let token = self.peek();
            let (op, right) = match token.kind {
                TokenKind::Plus => {
                    self.advance();
                    (BinaryOperator::Add, self.parse_term()?)
                }
                TokenKind::Minus => {
                    self.advance();
                    (BinaryOperator::Sub, self.parse_term()?)
                }
                // `n-1` is lexed as `n` followed by the literal `-1`.
                TokenKind::Number if token.text.starts_with('-') => {
                    self.advance();
                    let magnitude = self.int_literal(&token.text[1..], token.span)?;
                    (BinaryOperator::Sub, self.parse_term_rest(magnitude)?)
                }
                _ => break,
            };
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let first = self.parse_factor()?;
        self.parse_term_rest(first)
    }

    fn parse_term_rest(&mut self, mut left: Expr) -> Result<Expr> {
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOperator::Mult,
                TokenKind::SlashSlash => BinaryOperator::FloorDiv,
                TokenKind::Percent => BinaryOperator::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr> {
        let token = self.peek();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                self.int_literal(&token.text, token.span)
            }
            TokenKind::Identifier => {
                self.advance();
                match self.symbols.lookup(&token.text) {
                    None => Err(token.span.wrap(Error::UndefinedVariable(token.text.clone()))),
                    Some(symbol) if !symbol.kind.is_value() => {
                        Err(token.span.wrap(Error::NotAVariable(token.text.clone())))
                    }
                    Some(_) => {
                        let id = token.text.clone();
                        Ok(Expr::new(ExprKind::Name { id }, token.span))
                    }
                }
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_condition()?;
                self.consume(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::FuncCall => self.parse_call(),
            TokenKind::ArrayMember => self.parse_array_member(),
            TokenKind::Minus | TokenKind::Plus => {
                self.advance();
                let op = if token.kind == TokenKind::Minus {
                    UnaryOperator::USub
                } else {
                    UnaryOperator::UAdd
                };
                let operand = self.parse_factor()?;
                let span = token.span.to(operand.span);
                let kind = ExprKind::UnaryOp {
                    op,
                    operand: Box::new(operand),
                };
                Ok(Expr::new(kind, span))
            }
            other => Err(token.span.wrap(Error::UnexpectedTokenInExpr { token: other })),
        }
    }

    fn int_literal(&self, text: &str, span: Span) -> Result<Expr> {
        let Ok(parsed) = text.parse::<i32>() else {
            return Err(span.wrap(Error::InvalidInteger(text.into())));
        };
        let value = Constant::Int(parsed);
        Ok(Expr::new(ExprKind::Constant { value }, span))
    }

    fn parse_list(&mut self) -> Result<Expr> {
        let start = self.consume(TokenKind::LBracket)?;
        let mut elts = Vec::new();
        while !self.is(TokenKind::RBracket) {
            elts.push(self.parse_expression()?);
            if !self.take(TokenKind::Comma) {
                break;
            }
        }
        let end = self.consume(TokenKind::RBracket)?;
        Ok(Expr::new(ExprKind::List { elts }, start.span.to(end.span)))
    }

    fn parse_call(&mut self) -> Result<Expr> {
        let name = self.consume(TokenKind::FuncCall)?;
        match self.symbols.lookup(&name.text) {
            None => {
                return Err(name.span.wrap(Error::UndefinedFunction(name.text.clone())));
            }
            Some(symbol) if symbol.kind != SymbolKind::Function => {
                return Err(name.span.wrap(Error::NotAFunction(name.text.clone())));
            }
            Some(_) => {}
        }

        self.consume(TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.is(TokenKind::RParen) {
            args.push(self.parse_condition()?);
            if !self.take(TokenKind::Comma) {
                break;
            }
        }
        let end = self.consume(TokenKind::RParen)?;

        let func = Ident {
            name: name.text.clone(),
            span: name.span,
        };
        Ok(Expr::new(
            ExprKind::Call { func, args },
            name.span.to(end.span),
        ))
    }

    fn parse_array_member(&mut self) -> Result<Expr> {
        let name = self.consume(TokenKind::ArrayMember)?;
        let Some(symbol) = self.symbols.lookup(&name.text) else {
            return Err(name.span.wrap(Error::UndefinedArray(name.text.clone())));
        };
        if !symbol.kind.is_value() || !symbol.data_type.is_some_and(DataType::is_indexable) {
            let error = Error::NotIndexable {
                name: name.text.clone(),
                data_type: symbol.data_type,
            };
            return Err(name.span.wrap(error));
        }

        self.consume(TokenKind::LBracket)?;
        let index = self.parse_expression()?;
        let end = self.consume(TokenKind::RBracket)?;

        let value = Expr::new(
            ExprKind::Name {
                id: name.text.clone(),
            },
            name.span,
        );
        let kind = ExprKind::Subscript {
            value: Box::new(value),
            slice: Box::new(index),
        };
        Ok(Expr::new(kind, name.span.to(end.span)))
    }

    /// Derives the static type (and length, for lists and strings) of an
    /// expression from its shape.
    fn infer(&self, expr: &Expr) -> (DataType, Option<usize>) {
        match &expr.kind {
            ExprKind::Constant { value } => match value {
                Constant::Int(_) => (DataType::Int, None),
                Constant::Bool(_) => (DataType::Bool, None),
                Constant::Str(s) => (DataType::Str, Some(s.chars().count())),
            },
            ExprKind::List { elts } => (DataType::List, Some(elts.len())),
            ExprKind::BinOp { left, right, .. } => {
                let (left, _) = self.infer(left);
                let (right, _) = self.infer(right);
                (arithmetic_result(left, right), None)
            }
            ExprKind::Compare { .. } | ExprKind::BoolOp { .. } => (DataType::Bool, None),
            ExprKind::Call { func, .. } if &*func.name == builtins::LEN => (DataType::Int, None),
            ExprKind::Call { .. } => (DataType::Unknown, None),
            ExprKind::Name { id } => match self.symbols.lookup(id) {
                Some(symbol) => (
                    symbol.data_type.unwrap_or(DataType::Unknown),
                    symbol.length,
                ),
                None => (DataType::Unknown, None),
            },
            ExprKind::Subscript { value, .. } => (self.infer(value).0.element(), None),
            ExprKind::UnaryOp { operand, .. } => (self.infer(operand).0, None),
        }
    }
}

impl<'tok> Parser<'tok> {
    /// Returns the current token. Past the end, this is the final eof.
    fn peek(&self) -> &'tok Token {
        self.lookahead(0)
    }

    fn lookahead(&self, n: usize) -> &'tok Token {
        let tokens = self.tokens;
        tokens
            .get(self.cursor + n)
            .unwrap_or_else(|| &tokens[tokens.len() - 1])
    }

    /// Returns the current token and advances.
    fn advance(&mut self) -> &'tok Token {
        let current = self.peek();
        if self.cursor < self.tokens.len() {
            self.cursor += 1;
        }
        current
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one. If not,
    /// fails with an error at the current token.
    fn consume(&mut self, expect: TokenKind) -> Result<&'tok Token> {
        let current = self.peek();
        if current.kind == expect {
            self.advance();
            Ok(current)
        } else {
            Err(current.span.wrap(Error::Unexpected {
                actual: current.kind,
                expected: expect,
            }))
        }
    }

    /// Skips empty lines, including lines holding nothing but tabs.
    fn skip_blank_lines(&mut self) {
        loop {
            let blank_indent = self.is(TokenKind::Indent)
                && matches!(
                    self.lookahead(1).kind,
                    TokenKind::Newline | TokenKind::Eof
                );
            if !(self.is(TokenKind::Newline) || blank_indent) {
                break;
            }
            self.advance();
        }
    }

    fn define(&mut self, symbol: Symbol, span: Span) -> Result<()> {
        match self.symbols.define(symbol) {
            Ok(_) => Ok(()),
            Err(DuplicateSymbol(name)) => Err(span.wrap(Error::DuplicateSymbol(name))),
        }
    }

    /// Runs `f` inside a new child scope. The scope is popped whatever `f`
    /// returns.
    fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.symbols.push_scope();
        let result = f(self);
        self.symbols.pop_scope();
        result
    }
}

fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    let span = left.span.to(right.span);
    let kind = ExprKind::BinOp {
        left: Box::new(left),
        op,
        right: Box::new(right),
    };
    Expr::new(kind, span)
}

fn arithmetic_result(left: DataType, right: DataType) -> DataType {
    use DataType::*;
    match (left, right) {
        (Int, Int) => Int,
        (Bool, Bool) => Bool,
        (Char, Char) => Char,
        (Int | Bool | Char, Int | Bool | Char) => Int,
        _ => Unknown,
    }
}

/// Strips the surrounding quotes of a string token. Escapes are kept as
/// written; an unclosed string only loses its opening quote.
fn unquote(text: &str) -> &str {
    let mut chars = text.chars();
    let Some(quote) = chars.next() else {
        return text;
    };
    let inner = chars.as_str();
    inner.strip_suffix(quote).unwrap_or(inner)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Unexpected {
        actual: TokenKind,
        expected: TokenKind,
    },
    UnexpectedStatement {
        token: TokenKind,
    },
    UnexpectedTokenInExpr {
        token: TokenKind,
    },
    ExpectedEndOfStatement {
        actual: TokenKind,
    },
    ExpectedIndent {
        actual: TokenKind,
    },
    WrongIndentLevel {
        expected: usize,
        actual: usize,
    },
    ChainedComparison,
    InvalidInteger(Box<str>),
    UnknownTypeName(Box<str>),
    UndefinedVariable(Box<str>),
    UndefinedFunction(Box<str>),
    UndefinedArray(Box<str>),
    NotAVariable(Box<str>),
    NotAFunction(Box<str>),
    NotIndexable {
        name: Box<str>,
        data_type: Option<DataType>,
    },
    DuplicateSymbol(Box<str>),
    TypeConflict {
        name: Box<str>,
        previous: DataType,
        inferred: DataType,
    },
    NonIntegerElement {
        found: DataType,
    },
}
