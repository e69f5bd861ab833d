//! Recursive-descent parser over the layout-aware token stream.

use crate::{
    ParseError,
    ast::*,
    lexer::{Token, tokenize},
};

type PResult<T> = Result<T, ParseError>;

/// Bracket, unary and block nesting allowed before parsing gives up.
pub const MAX_NESTING: u32 = 64;

/// Operators and postfix operations folded into one left-deep spine.
pub const MAX_CHAIN: u32 = 256;

pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<(Token, Span)>,
    pos: usize,
    depth: u32,
    chain: u32,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> PResult<Self> {
        Ok(Self { source, tokens: tokenize(source)?, pos: 0, depth: 0, chain: 0 })
    }

    pub fn parse_module(&mut self) -> PResult<Module> {
        let mut body = Vec::new();
        while !self.at(&Token::Eof) {
            if self.eat(&Token::Newline) {
                continue;
            }
            body.extend(self.statement()?);
        }
        Ok(Module { body })
    }

    // ==================== TOKEN CURSOR ====================

    fn nth(&self, n: usize) -> &(Token, Span) {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn peek(&self) -> &Token {
        &self.nth(0).0
    }

    fn span(&self) -> Span {
        self.nth(0).1
    }

    fn prev_span(&self) -> Span {
        match self.pos.checked_sub(1) {
            Some(prev) => self.tokens[prev].1,
            None => self.span(),
        }
    }

    fn advance(&mut self) -> (Token, Span) {
        let current = self.nth(0).clone();
        if current.0 != Token::Eof {
            self.pos += 1;
        }
        current
    }

    fn at(&self, token: &Token) -> bool {
        self.peek() == token
    }

    fn eat(&mut self, token: &Token) -> bool {
        let found = self.at(token);
        if found {
            self.pos += 1;
        }
        found
    }

    fn expect(&mut self, token: Token, context: &str) -> PResult<Span> {
        if self.at(&token) {
            Ok(self.advance().1)
        } else {
            Err(self.unexpected(&format!("expected {token} {context}")))
        }
    }

    fn expect_name(&mut self, context: &str) -> PResult<(String, Span)> {
        if !matches!(self.peek(), Token::Name(_)) {
            return Err(self.unexpected(&format!("expected identifier {context}")));
        }
        match self.advance() {
            (Token::Name(name), span) => Ok((name, span)),
            _ => Err(self.unexpected(&format!("expected identifier {context}"))),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::new(self.source, self.span(), format!("{expected}, found {}", self.peek()))
    }

    /// Runs `parse` one nesting level deeper.
    fn nested<T>(&mut self, what: &str, parse: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::new(self.source, self.span(), format!("too many nested {what}")));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Counts one more fold onto the spine being built. Callers reset
    /// `chain` once the spine is complete.
    fn extend_chain(&mut self) -> PResult<()> {
        if self.chain >= MAX_CHAIN {
            return Err(ParseError::new(self.source, self.span(), "expression is too long"));
        }
        self.chain += 1;
        Ok(())
    }

    fn at_statement_end(&self) -> bool {
        matches!(self.peek(), Token::Newline | Token::Semicolon | Token::Eof)
    }

    fn can_start_expr(&self) -> bool {
        matches!(
            self.peek(),
            Token::Name(_)
                | Token::Int(_)
                | Token::Float(_)
                | Token::Str(_)
                | Token::LParen
                | Token::LBracket
                | Token::LBrace
                | Token::Minus
                | Token::Plus
                | Token::Tilde
                | Token::Not
                | Token::NoneLit
                | Token::True
                | Token::False
                | Token::Ellipsis
                | Token::Star
                | Token::Lambda
        )
    }

    // ==================== STATEMENTS ====================

    fn statement(&mut self) -> PResult<Vec<Stmt>> {
        let stmt = match self.peek() {
            Token::Def => self.function_def(Vec::new(), self.span())?,
            Token::Class => self.class_def(Vec::new(), self.span())?,
            Token::At => self.decorated()?,
            Token::If => self.if_stmt()?,
            Token::While => self.while_stmt()?,
            Token::For => self.for_stmt()?,
            Token::Try => self.try_stmt()?,
            Token::With => self.with_stmt()?,
            Token::Indent => return Err(self.unexpected("unexpected indent")),
            _ => return self.simple_line(),
        };
        Ok(vec![stmt])
    }

    /// One or more `;`-separated simple statements terminated by a newline.
    fn simple_line(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = vec![self.simple_statement()?];
        while self.eat(&Token::Semicolon) {
            if self.at_statement_end() {
                break;
            }
            stmts.push(self.simple_statement()?);
        }
        if !self.eat(&Token::Newline) && !self.at(&Token::Eof) {
            return Err(self.unexpected("expected end of statement"));
        }
        Ok(stmts)
    }

    fn block(&mut self) -> PResult<Vec<Stmt>> {
        self.nested("blocks", Self::suite)
    }

    /// `:` followed by an indented suite or an inline simple statement.
    fn suite(&mut self) -> PResult<Vec<Stmt>> {
        self.expect(Token::Colon, "to open a block")?;
        if !self.eat(&Token::Newline) {
            return self.simple_line();
        }
        if !self.eat(&Token::Indent) {
            return Err(self.unexpected("expected an indented block"));
        }
        let mut body = Vec::new();
        while !self.eat(&Token::Dedent) && !self.at(&Token::Eof) {
            if self.eat(&Token::Newline) {
                continue;
            }
            body.extend(self.statement()?);
        }
        Ok(body)
    }

    fn simple_statement(&mut self) -> PResult<Stmt> {
        let start = self.span();
        let kind = match self.peek() {
            Token::Pass => {
                self.advance();
                StmtKind::Pass
            }
            Token::Break => {
                self.advance();
                StmtKind::Break
            }
            Token::Continue => {
                self.advance();
                StmtKind::Continue
            }
            Token::Return => {
                self.advance();
                let value = if self.at_statement_end() { None } else { Some(self.testlist()?) };
                StmtKind::Return(value)
            }
            Token::Raise => {
                self.advance();
                let exc = if self.at_statement_end() { None } else { Some(self.test()?) };
                if self.eat(&Token::From) {
                    self.test()?;
                }
                StmtKind::Raise(exc)
            }
            Token::Assert => {
                self.advance();
                let test = self.test()?;
                let msg = if self.eat(&Token::Comma) { Some(self.test()?) } else { None };
                StmtKind::Assert { test, msg }
            }
            Token::Del => {
                self.advance();
                let mut targets = vec![self.bit_or()?];
                while self.eat(&Token::Comma) && !self.at_statement_end() {
                    targets.push(self.bit_or()?);
                }
                StmtKind::Delete(targets)
            }
            Token::Global => {
                self.advance();
                StmtKind::Global(self.names("in `global` statement")?)
            }
            Token::Nonlocal => {
                self.advance();
                StmtKind::Nonlocal(self.names("in `nonlocal` statement")?)
            }
            Token::Import => {
                self.advance();
                StmtKind::Import(self.aliases()?)
            }
            Token::From => {
                self.advance();
                let module = self.dotted_name()?;
                self.expect(Token::Import, "in `from` import")?;
                let names = if self.eat(&Token::Star) {
                    vec![Alias { name: "*".to_owned(), asname: None }]
                } else if self.eat(&Token::LParen) {
                    let names = self.aliases()?;
                    self.eat(&Token::Comma);
                    self.expect(Token::RParen, "to close import list")?;
                    names
                } else {
                    self.aliases()?
                };
                StmtKind::ImportFrom { module, names }
            }
            _ => self.expression_statement()?,
        };
        Ok(Stmt { kind, span: start.to(self.prev_span()) })
    }

    fn expression_statement(&mut self) -> PResult<StmtKind> {
        let first = self.testlist()?;

        if let Some(op) = augmented_op(self.peek()) {
            self.advance();
            let value = self.testlist()?;
            return Ok(StmtKind::AugAssign { target: first, op, value });
        }

        match self.peek() {
            Token::Assign => {
                let mut targets = vec![first];
                loop {
                    self.advance();
                    let next = self.testlist()?;
                    if self.at(&Token::Assign) {
                        targets.push(next);
                    } else {
                        return Ok(StmtKind::Assign { targets, value: next });
                    }
                }
            }
            Token::Colon => {
                self.advance();
                let annotation = self.test()?;
                let value = if self.eat(&Token::Assign) { Some(self.testlist()?) } else { None };
                Ok(StmtKind::AnnAssign { target: first, annotation, value })
            }
            _ => Ok(StmtKind::Expr(first)),
        }
    }

    fn dotted_name(&mut self) -> PResult<String> {
        let mut name = String::new();
        while self.at(&Token::Dot) || self.at(&Token::Ellipsis) {
            name.push_str(if self.advance().0 == Token::Dot { "." } else { "..." });
        }
        if let Token::Name(_) = self.peek() {
            name.push_str(&self.expect_name("in module path")?.0);
            while self.eat(&Token::Dot) {
                name.push('.');
                name.push_str(&self.expect_name("in module path")?.0);
            }
        }
        if name.is_empty() {
            return Err(self.unexpected("expected module name"));
        }
        Ok(name)
    }

    fn names(&mut self, context: &str) -> PResult<Vec<String>> {
        let mut names = vec![self.expect_name(context)?.0];
        while self.eat(&Token::Comma) {
            names.push(self.expect_name(context)?.0);
        }
        Ok(names)
    }

    fn aliases(&mut self) -> PResult<Vec<Alias>> {
        let mut names = Vec::new();
        loop {
            let name = self.dotted_name()?;
            let asname = if self.eat(&Token::As) { Some(self.expect_name("after `as`")?.0) } else { None };
            names.push(Alias { name, asname });
            if !self.at(&Token::Comma) || !matches!(self.nth(1).0, Token::Name(_)) {
                break;
            }
            self.advance();
        }
        Ok(names)
    }

    fn decorated(&mut self) -> PResult<Stmt> {
        let start = self.span();
        let mut decorators = Vec::new();
        while self.eat(&Token::At) {
            decorators.push(self.test()?);
            self.expect(Token::Newline, "after decorator")?;
            while self.eat(&Token::Newline) {}
        }
        match self.peek() {
            Token::Def => self.function_def(decorators, start),
            Token::Class => self.class_def(decorators, start),
            _ => Err(self.unexpected("expected `def` or `class` after decorators")),
        }
    }

    /// Compound statements span their header line.
    fn function_def(&mut self, decorators: Vec<Expr>, start: Span) -> PResult<Stmt> {
        self.expect(Token::Def, "")?;
        let (name, _) = self.expect_name("after `def`")?;
        self.expect(Token::LParen, "to open parameter list")?;
        let params = self.params(&Token::RParen)?;
        self.expect(Token::RParen, "to close parameter list")?;
        let returns = if self.eat(&Token::Arrow) { Some(self.test()?) } else { None };
        let span = start.to(self.prev_span());
        let body = self.block()?;

        let func = FunctionDef { name, params, returns, decorators, body, span };
        Ok(Stmt { kind: StmtKind::FunctionDef(func), span })
    }

    /// Lambda parameters end at `:` and take no annotations.
    fn params(&mut self, close: &Token) -> PResult<Vec<Param>> {
        let annotated = *close != Token::Colon;
        let mut params = Vec::new();
        while !self.at(close) {
            let start = self.span();
            let kind = if self.eat(&Token::Star) {
                ParamKind::VarArgs
            } else if self.eat(&Token::DoubleStar) {
                ParamKind::KwArgs
            } else {
                ParamKind::Normal
            };

            // Bare `*` and `/` are separators, not parameters.
            let is_separator = (kind == ParamKind::VarArgs && self.at(&Token::Comma))
                || (kind == ParamKind::Normal && self.eat(&Token::Slash));
            if !is_separator {
                let (name, _) = self.expect_name("as parameter name")?;
                let annotation =
                    if annotated && self.eat(&Token::Colon) { Some(self.test()?) } else { None };
                let default = if self.eat(&Token::Assign) { Some(self.test()?) } else { None };
                let span = start.to(self.prev_span());
                params.push(Param { name, kind, annotation, default, span });
            }

            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn class_def(&mut self, decorators: Vec<Expr>, start: Span) -> PResult<Stmt> {
        self.expect(Token::Class, "")?;
        let (name, _) = self.expect_name("after `class`")?;
        let bases = if self.eat(&Token::LParen) { self.call_args()?.0 } else { Vec::new() };
        let span = start.to(self.prev_span());
        let body = self.block()?;

        let class = ClassDef { name, bases, decorators, body, span };
        Ok(Stmt { kind: StmtKind::ClassDef(class), span })
    }

    fn if_stmt(&mut self) -> PResult<Stmt> {
        // Entered on either `if` or `elif`.
        let start = self.advance().1;
        let test = self.named_test()?;
        let span = start.to(self.prev_span());
        let body = self.block()?;
        let orelse = match self.peek() {
            Token::Elif => vec![self.nested("blocks", Self::if_stmt)?],
            Token::Else => {
                self.advance();
                self.block()?
            }
            _ => Vec::new(),
        };
        Ok(Stmt { kind: StmtKind::If { test, body, orelse }, span })
    }

    fn while_stmt(&mut self) -> PResult<Stmt> {
        let start = self.advance().1;
        let test = self.named_test()?;
        let span = start.to(self.prev_span());
        let body = self.block()?;
        let orelse = if self.eat(&Token::Else) { self.block()? } else { Vec::new() };
        Ok(Stmt { kind: StmtKind::While { test, body, orelse }, span })
    }

    fn for_stmt(&mut self) -> PResult<Stmt> {
        let start = self.advance().1;
        let target = self.target_list()?;
        self.expect(Token::In, "in `for` statement")?;
        let iter = self.testlist()?;
        let span = start.to(self.prev_span());
        let body = self.block()?;
        let orelse = if self.eat(&Token::Else) { self.block()? } else { Vec::new() };
        Ok(Stmt { kind: StmtKind::For { target, iter, body, orelse }, span })
    }

    fn try_stmt(&mut self) -> PResult<Stmt> {
        let span = self.advance().1;
        let body = self.block()?;

        let mut handlers = Vec::new();
        while self.at(&Token::Except) {
            let start = self.advance().1;
            // `except*` handles exception groups the same way here.
            self.eat(&Token::Star);
            let ty = if self.at(&Token::Colon) { None } else { Some(self.test()?) };
            let name = if ty.is_some() && self.eat(&Token::As) {
                Some(self.expect_name("after `as`")?.0)
            } else {
                None
            };
            let span = start.to(self.prev_span());
            let body = self.block()?;
            handlers.push(ExceptHandler { ty, name, body, span });
        }

        let orelse =
            if !handlers.is_empty() && self.eat(&Token::Else) { self.block()? } else { Vec::new() };
        let has_finally = self.eat(&Token::Finally);
        if handlers.is_empty() && !has_finally {
            return Err(self.unexpected("expected `except` or `finally` after `try` block"));
        }
        let finalbody = if has_finally { self.block()? } else { Vec::new() };
        Ok(Stmt { kind: StmtKind::Try { body, handlers, orelse, finalbody }, span })
    }

    fn with_stmt(&mut self) -> PResult<Stmt> {
        let start = self.advance().1;
        let items = match self.parenthesized_with_items()? {
            Some(items) => items,
            None => self.with_items()?,
        };
        let span = start.to(self.prev_span());
        let body = self.block()?;
        Ok(Stmt { kind: StmtKind::With { items, body }, span })
    }

    fn with_items(&mut self) -> PResult<Vec<WithItem>> {
        let mut items = Vec::new();
        loop {
            let context = self.test()?;
            let target = if self.eat(&Token::As) { Some(self.bit_or()?) } else { None };
            items.push(WithItem { context, target });
            if !self.eat(&Token::Comma) || self.at(&Token::RParen) {
                return Ok(items);
            }
        }
    }

    /// `with (a as x, b as y):` form. Rewinds and yields `None` when the
    /// parentheses turn out to belong to the first context expression.
    fn parenthesized_with_items(&mut self) -> PResult<Option<Vec<WithItem>>> {
        if !self.at(&Token::LParen) {
            return Ok(None);
        }
        let (pos, depth, chain) = (self.pos, self.depth, self.chain);
        self.advance();
        let items = self.with_items();
        if items.is_ok() && self.eat(&Token::RParen) && self.at(&Token::Colon) {
            return items.map(Some);
        }
        (self.pos, self.depth, self.chain) = (pos, depth, chain);
        Ok(None)
    }

    /// Loop targets stop below comparisons so `in` is not consumed.
    fn target_list(&mut self) -> PResult<Expr> {
        let first = self.bit_or()?;
        if !self.at(&Token::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if self.at(&Token::In) {
                break;
            }
            items.push(self.bit_or()?);
        }
        Ok(self.tuple(items))
    }

    // ==================== EXPRESSIONS ====================

    fn tuple(&self, items: Vec<Expr>) -> Expr {
        let span = match (items.first(), items.last()) {
            (Some(first), Some(last)) => first.span.to(last.span),
            _ => self.prev_span(),
        };
        Expr::new(ExprKind::Tuple(items), span)
    }

    fn testlist(&mut self) -> PResult<Expr> {
        let first = self.test_or_star()?;
        self.testlist_rest(first)
    }

    fn testlist_rest(&mut self, first: Expr) -> PResult<Expr> {
        if !self.at(&Token::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if !self.can_start_expr() {
                break;
            }
            items.push(self.test_or_star()?);
        }
        Ok(self.tuple(items))
    }

    fn test_or_star(&mut self) -> PResult<Expr> {
        if self.at(&Token::Star) {
            let start = self.advance().1;
            let inner = self.bit_or()?;
            let span = start.to(inner.span);
            return Ok(Expr::new(ExprKind::Starred(Box::new(inner)), span));
        }
        self.named_test()
    }

    /// `name := value` or a plain test.
    fn named_test(&mut self) -> PResult<Expr> {
        if !matches!(self.peek(), Token::Name(_)) || self.nth(1).0 != Token::ColonAssign {
            return self.test();
        }
        let (name, start) = self.expect_name("before `:=`")?;
        self.advance();
        let value = self.test()?;
        let span = start.to(value.span);
        let target = Expr::new(ExprKind::Name(name), start);
        Ok(Expr::new(ExprKind::NamedExpr { target: Box::new(target), value: Box::new(value) }, span))
    }

    pub(crate) fn test(&mut self) -> PResult<Expr> {
        if self.at(&Token::Lambda) {
            return self.lambda();
        }
        let body = self.or_test()?;
        if !self.eat(&Token::If) {
            return Ok(body);
        }
        let test = self.or_test()?;
        self.expect(Token::Else, "in conditional expression")?;
        let orelse = self.nested("expressions", Self::test)?;
        let span = body.span.to(orelse.span);
        Ok(Expr::new(
            ExprKind::IfExp { test: Box::new(test), body: Box::new(body), orelse: Box::new(orelse) },
            span,
        ))
    }

    fn lambda(&mut self) -> PResult<Expr> {
        let start = self.advance().1;
        let params = self.params(&Token::Colon)?;
        self.expect(Token::Colon, "after lambda parameters")?;
        let body = self.nested("expressions", Self::test)?;
        let span = start.to(body.span);
        Ok(Expr::new(ExprKind::Lambda { params, body: Box::new(body) }, span))
    }

    fn bool_level(
        &mut self,
        next: fn(&mut Self) -> PResult<Expr>,
        token: Token,
        op: BoolOp,
    ) -> PResult<Expr> {
        let first = next(self)?;
        if !self.at(&token) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(&token) {
            values.push(next(self)?);
        }
        let span = values[0].span.to(values[values.len() - 1].span);
        Ok(Expr::new(ExprKind::BoolOp { op, values }, span))
    }

    fn or_test(&mut self) -> PResult<Expr> {
        self.bool_level(Self::and_test, Token::Or, BoolOp::Or)
    }

    fn and_test(&mut self) -> PResult<Expr> {
        self.bool_level(Self::not_test, Token::And, BoolOp::And)
    }

    fn not_test(&mut self) -> PResult<Expr> {
        if !self.at(&Token::Not) {
            return self.comparison();
        }
        let start = self.advance().1;
        let operand = self.nested("expressions", Self::not_test)?;
        let span = start.to(operand.span);
        Ok(Expr::new(ExprKind::UnaryOp { op: UnaryOp::Not, operand: Box::new(operand) }, span))
    }

    fn comparison(&mut self) -> PResult<Expr> {
        let left = self.bit_or()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();
        loop {
            let op = match (self.peek(), &self.nth(1).0) {
                (Token::EqEqual, _) => CmpOp::Eq,
                (Token::NotEqual, _) => CmpOp::NotEq,
                (Token::Less, _) => CmpOp::Lt,
                (Token::LessEqual, _) => CmpOp::LtE,
                (Token::Greater, _) => CmpOp::Gt,
                (Token::GreaterEqual, _) => CmpOp::GtE,
                (Token::In, _) => CmpOp::In,
                (Token::Not, Token::In) => {
                    self.advance();
                    CmpOp::NotIn
                }
                (Token::Is, Token::Not) => {
                    self.advance();
                    CmpOp::IsNot
                }
                (Token::Is, _) => CmpOp::Is,
                _ => break,
            };
            self.advance();
            ops.push(op);
            comparators.push(self.bit_or()?);
        }
        if ops.is_empty() {
            return Ok(left);
        }
        let span = left.span.to(self.prev_span());
        Ok(Expr::new(ExprKind::Compare { left: Box::new(left), ops, comparators }, span))
    }

    /// `|` through `*` level operators, all left-associative, by precedence
    /// climbing.
    fn bit_or(&mut self) -> PResult<Expr> {
        self.binary(0)
    }

    fn binary(&mut self, min_precedence: u8) -> PResult<Expr> {
        let chain = self.chain;
        let mut left = self.factor()?;
        while let Some((op, precedence)) =
            binary_op(self.peek()).filter(|&(_, precedence)| precedence >= min_precedence)
        {
            self.advance();
            self.extend_chain()?;
            let right = self.binary(precedence + 1)?;
            let span = left.span.to(right.span);
            left = Expr::new(ExprKind::BinOp { left: Box::new(left), op, right: Box::new(right) }, span);
        }
        self.chain = chain;
        Ok(left)
    }

    fn factor(&mut self) -> PResult<Expr> {
        let op = match self.peek() {
            Token::Minus => UnaryOp::USub,
            Token::Plus => UnaryOp::UAdd,
            Token::Tilde => UnaryOp::Invert,
            _ => return self.power(),
        };
        let start = self.advance().1;
        let operand = self.nested("expressions", Self::factor)?;
        let span = start.to(operand.span);
        Ok(Expr::new(ExprKind::UnaryOp { op, operand: Box::new(operand) }, span))
    }

    fn power(&mut self) -> PResult<Expr> {
        let base = self.atom_expr()?;
        if !self.eat(&Token::DoubleStar) {
            return Ok(base);
        }
        let exponent = self.nested("expressions", Self::factor)?;
        let span = base.span.to(exponent.span);
        Ok(Expr::new(
            ExprKind::BinOp { left: Box::new(base), op: BinOp::Pow, right: Box::new(exponent) },
            span,
        ))
    }

    fn atom_expr(&mut self) -> PResult<Expr> {
        let chain = self.chain;
        let mut expr = self.atom()?;
        loop {
            if matches!(self.peek(), Token::LParen | Token::LBracket | Token::Dot) {
                self.extend_chain()?;
            }
            match self.peek() {
                Token::LParen => {
                    self.advance();
                    let (args, keywords) = self.call_args()?;
                    let span = expr.span.to(self.prev_span());
                    expr = Expr::new(ExprKind::Call { func: Box::new(expr), args, keywords }, span);
                }
                Token::LBracket => {
                    self.advance();
                    let index = self.subscript()?;
                    self.expect(Token::RBracket, "to close subscript")?;
                    let span = expr.span.to(self.prev_span());
                    expr = Expr::new(
                        ExprKind::Subscript { value: Box::new(expr), index: Box::new(index) },
                        span,
                    );
                }
                Token::Dot => {
                    self.advance();
                    let (attr, attr_span) = self.expect_name("after `.`")?;
                    let span = expr.span.to(attr_span);
                    expr = Expr::new(ExprKind::Attribute { value: Box::new(expr), attr }, span);
                }
                _ => break,
            }
        }
        self.chain = chain;
        Ok(expr)
    }

    /// Arguments after an opening `(`, consuming the closing `)`.
    fn call_args(&mut self) -> PResult<(Vec<Expr>, Vec<Keyword>)> {
        let mut args = Vec::new();
        let mut keywords = Vec::new();
        while !self.at(&Token::RParen) {
            match (self.peek(), &self.nth(1).0) {
                (Token::Star, _) => args.push(self.test_or_star()?),
                (Token::DoubleStar, _) => {
                    self.advance();
                    keywords.push(Keyword { arg: None, value: self.test()? });
                }
                (Token::Name(_), Token::Assign) => {
                    let (arg, _) = self.expect_name("as keyword argument")?;
                    self.advance();
                    keywords.push(Keyword { arg: Some(arg), value: self.test()? });
                }
                _ => {
                    let arg = self.named_test()?;
                    if self.at(&Token::For) && args.is_empty() && keywords.is_empty() {
                        let generators = self.comprehension_clauses()?;
                        let span = arg.span.to(self.prev_span());
                        let elt = Box::new(arg);
                        args.push(Expr::new(ExprKind::GeneratorExp { elt, generators }, span));
                    } else {
                        args.push(arg);
                    }
                }
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen, "to close argument list")?;
        Ok((args, keywords))
    }

    fn subscript(&mut self) -> PResult<Expr> {
        let first = self.subscript_item()?;
        if !self.at(&Token::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(&Token::Comma) {
            if self.at(&Token::RBracket) {
                break;
            }
            items.push(self.subscript_item()?);
        }
        Ok(self.tuple(items))
    }

    fn subscript_item(&mut self) -> PResult<Expr> {
        let start = self.span();
        let lower = if self.at(&Token::Colon) {
            None
        } else {
            let expr = self.test()?;
            if !self.at(&Token::Colon) {
                return Ok(expr);
            }
            Some(Box::new(expr))
        };
        self.advance();

        let slice_end = |p: &Self| matches!(p.peek(), Token::Colon | Token::RBracket | Token::Comma);
        let upper = if slice_end(&*self) { None } else { Some(Box::new(self.test()?)) };
        let step = if self.eat(&Token::Colon) && !slice_end(&*self) {
            Some(Box::new(self.test()?))
        } else {
            None
        };
        let span = start.to(self.prev_span());
        Ok(Expr::new(ExprKind::Slice { lower, upper, step }, span))
    }

    fn atom(&mut self) -> PResult<Expr> {
        let start = self.span();
        let constant = |kind| Ok(Expr::new(ExprKind::Constant(kind), start));
        match self.peek().clone() {
            Token::Name(name) => {
                self.advance();
                Ok(Expr::new(ExprKind::Name(name), start))
            }
            Token::Int(value) => {
                self.advance();
                constant(Constant::Int(value))
            }
            Token::Float(value) => {
                self.advance();
                constant(Constant::Float(value))
            }
            Token::NoneLit => {
                self.advance();
                constant(Constant::None)
            }
            Token::True => {
                self.advance();
                constant(Constant::Bool(true))
            }
            Token::False => {
                self.advance();
                constant(Constant::Bool(false))
            }
            Token::Ellipsis => {
                self.advance();
                constant(Constant::Ellipsis)
            }
            Token::Str(_) => self.strings(),
            Token::LParen => {
                self.advance();
                self.nested("parentheses", |p| p.parenthesized(start))
            }
            Token::LBracket => {
                self.advance();
                self.nested("parentheses", |p| p.list_display(start))
            }
            Token::LBrace => {
                self.advance();
                self.nested("parentheses", |p| p.dict_or_set(start))
            }
            _ => Err(self.unexpected("expected expression")),
        }
    }

    /// After `(`: a tuple, a generator expression or a grouped expression.
    fn parenthesized(&mut self, start: Span) -> PResult<Expr> {
        if self.eat(&Token::RParen) {
            return Ok(Expr::new(ExprKind::Tuple(Vec::new()), start.to(self.prev_span())));
        }
        let first = self.test_or_star()?;
        if self.at(&Token::For) {
            let generators = self.comprehension_clauses()?;
            self.expect(Token::RParen, "to close generator expression")?;
            let span = start.to(self.prev_span());
            return Ok(Expr::new(ExprKind::GeneratorExp { elt: Box::new(first), generators }, span));
        }
        let inner = self.testlist_rest(first)?;
        self.expect(Token::RParen, "to close parenthesized expression")?;
        Ok(inner)
    }

    fn list_display(&mut self, start: Span) -> PResult<Expr> {
        let mut items = Vec::new();
        if !self.at(&Token::RBracket) {
            let first = self.test_or_star()?;
            if self.at(&Token::For) {
                let generators = self.comprehension_clauses()?;
                self.expect(Token::RBracket, "to close list comprehension")?;
                let span = start.to(self.prev_span());
                return Ok(Expr::new(ExprKind::ListComp { elt: Box::new(first), generators }, span));
            }
            items.push(first);
            if self.eat(&Token::Comma) {
                self.collection_items(&Token::RBracket, &mut items)?;
            }
        }
        self.expect(Token::RBracket, "to close list")?;
        Ok(Expr::new(ExprKind::List(items), start.to(self.prev_span())))
    }

    /// The `for ... in ... if ...` clauses after a comprehension element.
    fn comprehension_clauses(&mut self) -> PResult<Vec<Comprehension>> {
        let mut generators = Vec::new();
        while self.eat(&Token::For) {
            let target = self.target_list()?;
            self.expect(Token::In, "in comprehension")?;
            let iter = self.or_test()?;
            let mut ifs = Vec::new();
            while self.eat(&Token::If) {
                ifs.push(self.or_test()?);
            }
            generators.push(Comprehension { target, iter, ifs });
        }
        Ok(generators)
    }

    /// Adjacent string literals concatenate.
    fn strings(&mut self) -> PResult<Expr> {
        let start = self.span();
        let mut text = String::new();
        let mut is_bytes = false;
        while let Token::Str(lit) = self.peek() {
            text.push_str(&lit.value);
            is_bytes |= lit.is_bytes;
            self.advance();
        }
        let constant = if is_bytes {
            Constant::Bytes(text.chars().map(|c| c as u32 as u8).collect())
        } else {
            Constant::Str(text)
        };
        Ok(Expr::new(ExprKind::Constant(constant), start.to(self.prev_span())))
    }

    fn collection_items(&mut self, close: &Token, items: &mut Vec<Expr>) -> PResult<()> {
        while !self.at(close) {
            items.push(self.test_or_star()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        Ok(())
    }

    /// Set literals come back as lists.
    fn dict_or_set(&mut self, start: Span) -> PResult<Expr> {
        let mut keys = Vec::new();
        let mut values = Vec::new();
        if self.eat(&Token::RBrace) {
            let span = start.to(self.prev_span());
            return Ok(Expr::new(ExprKind::Dict { keys, values }, span));
        }

        if self.eat(&Token::DoubleStar) {
            keys.push(None);
            values.push(self.bit_or()?);
        } else {
            let first = self.test_or_star()?;
            if !self.eat(&Token::Colon) {
                return self.set_display(start, first);
            }
            let value = self.test()?;
            if self.at(&Token::For) {
                let generators = self.comprehension_clauses()?;
                self.expect(Token::RBrace, "to close dict comprehension")?;
                let (key, value) = (Box::new(first), Box::new(value));
                let span = start.to(self.prev_span());
                return Ok(Expr::new(ExprKind::DictComp { key, value, generators }, span));
            }
            keys.push(Some(first));
            values.push(value);
        }

        while self.eat(&Token::Comma) && !self.at(&Token::RBrace) {
            if self.eat(&Token::DoubleStar) {
                keys.push(None);
                values.push(self.bit_or()?);
            } else {
                keys.push(Some(self.test()?));
                self.expect(Token::Colon, "in dict entry")?;
                values.push(self.test()?);
            }
        }
        self.expect(Token::RBrace, "to close dict")?;
        Ok(Expr::new(ExprKind::Dict { keys, values }, start.to(self.prev_span())))
    }

    fn set_display(&mut self, start: Span, first: Expr) -> PResult<Expr> {
        if self.at(&Token::For) {
            let generators = self.comprehension_clauses()?;
            self.expect(Token::RBrace, "to close set comprehension")?;
            let span = start.to(self.prev_span());
            return Ok(Expr::new(ExprKind::SetComp { elt: Box::new(first), generators }, span));
        }
        let mut items = vec![first];
        if self.eat(&Token::Comma) {
            self.collection_items(&Token::RBrace, &mut items)?;
        }
        self.expect(Token::RBrace, "to close set")?;
        Ok(Expr::new(ExprKind::List(items), start.to(self.prev_span())))
    }
}

fn binary_op(token: &Token) -> Option<(BinOp, u8)> {
    Some(match token {
        Token::Pipe => (BinOp::BitOr, 0),
        Token::Caret => (BinOp::BitXor, 1),
        Token::Amper => (BinOp::BitAnd, 2),
        Token::LeftShift => (BinOp::LShift, 3),
        Token::RightShift => (BinOp::RShift, 3),
        Token::Plus => (BinOp::Add, 4),
        Token::Minus => (BinOp::Sub, 4),
        Token::Star => (BinOp::Mult, 5),
        Token::Slash => (BinOp::Div, 5),
        Token::DoubleSlash => (BinOp::FloorDiv, 5),
        Token::Percent => (BinOp::Mod, 5),
        Token::At => (BinOp::MatMult, 5),
        _ => return None,
    })
}

fn augmented_op(token: &Token) -> Option<BinOp> {
    Some(match token {
        Token::PlusAssign => BinOp::Add,
        Token::MinusAssign => BinOp::Sub,
        Token::StarAssign => BinOp::Mult,
        Token::SlashAssign => BinOp::Div,
        Token::DoubleSlashAssign => BinOp::FloorDiv,
        Token::PercentAssign => BinOp::Mod,
        Token::DoubleStarAssign => BinOp::Pow,
        Token::LeftShiftAssign => BinOp::LShift,
        Token::RightShiftAssign => BinOp::RShift,
        Token::AmperAssign => BinOp::BitAnd,
        Token::PipeAssign => BinOp::BitOr,
        Token::CaretAssign => BinOp::BitXor,
        _ => return None,
    })
}
