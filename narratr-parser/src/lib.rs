//! Hand-written recursive-descent / precedence-climbing parser for
//! Narratr. Builds the AST and populates the symbol table in the same pass
//! (declarations register, and identifiers resolve, as soon as their
//! enclosing scope is known -- there is no separate resolution walk).

mod error;

pub use error::Error;

use narratr_ast::{
    ArithOp, Block, CompareOp, Direction, Expr, ItemBlock, Program, SceneBlock, Stmt, StartState,
    Suite, UnaryOp,
};
use narratr_lexer::{Token, TokenKind};
use narratr_symtab::{Entry, Scope, SymbolTable, SymbolType, SymbolValue};

/// Parses `source` in its entirety, returning the AST and the symbol table
/// populated during parsing, or the first lexical/syntax/semantic error
/// encountered (parsing is not error-recovering; the first failure is
/// fatal, per `spec.md` §4.2 and §7).
pub fn parse(source: &str) -> Result<(Program, SymbolTable), Error> {
    let tokens = narratr_lexer::tokenize(source)?;
    Parser::new(tokens).parse_program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    symtab: SymbolTable,
    current_scope: Scope,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            symtab: SymbolTable::new(),
            current_scope: Scope::Global,
        }
    }

    // -- token stream helpers -------------------------------------------

    fn peek(&self) -> &TokenKind {
        self.tokens[self.pos].kind()
    }

    fn peek_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(Token::kind)
    }

    fn peek_token(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn line(&self) -> u32 {
        self.peek_token().location().line()
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn syntax_error(&self) -> Error {
        Error::Syntax {
            found: format!("{}", self.peek_token()),
            line: self.line(),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Error> {
        if *self.peek() == kind {
            Ok(self.advance())
        } else {
            Err(self.syntax_error())
        }
    }

    fn expect_ident(&mut self) -> Result<String, Error> {
        if let TokenKind::Ident(name) = self.peek().clone() {
            self.advance();
            Ok(name)
        } else {
            Err(self.syntax_error())
        }
    }

    fn expect_sceneid(&mut self) -> Result<u32, Error> {
        if let TokenKind::SceneId(n) = *self.peek() {
            self.advance();
            Ok(n)
        } else {
            Err(self.syntax_error())
        }
    }

    fn skip_newlines_optional(&mut self) {
        while *self.peek() == TokenKind::Newline {
            self.advance();
        }
    }

    fn skip_newlines_required(&mut self) -> Result<(), Error> {
        if *self.peek() != TokenKind::Newline {
            return Err(self.syntax_error());
        }
        self.skip_newlines_optional();
        Ok(())
    }

    // -- top level --------------------------------------------------------

    fn parse_program(mut self) -> Result<(Program, SymbolTable), Error> {
        self.skip_newlines_optional();
        let mut blocks = Vec::new();
        while *self.peek() != TokenKind::EndMarker {
            let block = match self.peek() {
                TokenKind::Scene => Block::Scene(self.parse_scene_block()?),
                TokenKind::Item => Block::Item(self.parse_item_block()?),
                TokenKind::Start => Block::Start(self.parse_start_state()?),
                _ => return Err(self.syntax_error()),
            };
            blocks.push(block);
            self.skip_newlines_optional();
        }
        Ok((Program { blocks }, self.symtab))
    }

    fn parse_scene_block(&mut self) -> Result<SceneBlock, Error> {
        let line = self.line();
        self.expect(TokenKind::Scene)?;
        let scene_id = self.expect_sceneid()?;
        self.expect(TokenKind::LBrace)?;
        self.skip_newlines_optional();
        let wrapped = if *self.peek() == TokenKind::Indent {
            self.advance();
            true
        } else {
            false
        };

        if self
            .symtab
            .insert(
                &format!("${}", scene_id),
                SymbolValue::Scene(scene_id),
                SymbolType::Scene,
                Scope::Global,
                false,
            )
            .is_err()
        {
            return Err(Error::Semantic {
                message: format!("scene ${} is already declared", scene_id),
                line,
            });
        }

        let prev_scope = self.current_scope.clone();
        self.current_scope = Scope::Scene(scene_id);
        self.expect(TokenKind::Setup)?;
        self.expect(TokenKind::Colon)?;
        let setup = self.parse_optional_suite()?;
        self.expect(TokenKind::Action)?;
        self.expect(TokenKind::Colon)?;
        let action = self.parse_optional_suite()?;
        self.expect(TokenKind::Cleanup)?;
        self.expect(TokenKind::Colon)?;
        let cleanup = self.parse_optional_suite()?;
        self.current_scope = prev_scope;

        if wrapped {
            self.expect(TokenKind::Dedent)?;
        }
        self.skip_newlines_optional();
        self.expect(TokenKind::RBrace)?;

        Ok(SceneBlock {
            scene_id,
            setup,
            action,
            cleanup,
            line,
        })
    }

    fn parse_item_block(&mut self) -> Result<ItemBlock, Error> {
        let line = self.line();
        self.expect(TokenKind::Item)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let mut formals = Vec::new();
        if *self.peek() != TokenKind::RParen {
            loop {
                formals.push(self.expect_ident()?);
                if *self.peek() == TokenKind::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::LBrace)?;

        if self
            .symtab
            .insert(
                &name,
                SymbolValue::Item(name.clone()),
                SymbolType::Item,
                Scope::Global,
                false,
            )
            .is_err()
        {
            return Err(Error::Semantic {
                message: format!("item '{}' is already declared", name),
                line,
            });
        }

        let prev_scope = self.current_scope.clone();
        self.current_scope = Scope::Item(name.clone());
        for formal in &formals {
            self.symtab.overwrite(Entry::new(
                formal.clone(),
                SymbolValue::Unit,
                SymbolType::Dynamic,
                Scope::Item(name.clone()),
                false,
            ));
        }

        self.skip_newlines_optional();
        let body = if *self.peek() == TokenKind::RBrace {
            None
        } else {
            Some(self.parse_suite()?)
        };
        self.current_scope = prev_scope;
        self.expect(TokenKind::RBrace)?;

        Ok(ItemBlock {
            name,
            formals,
            body,
            line,
        })
    }

    fn parse_start_state(&mut self) -> Result<StartState, Error> {
        let line = self.line();
        self.expect(TokenKind::Start)?;
        self.expect(TokenKind::Colon)?;
        let scene_id = self.expect_sceneid()?;
        Ok(StartState { scene_id, line })
    }

    // -- suites ------------------------------------------------------------

    /// `setup_block`/`action_block`/`cleanup_block`'s suite: may be entirely
    /// absent (bare `setup:` followed directly by the next keyword).
    fn parse_optional_suite(&mut self) -> Result<Suite, Error> {
        if *self.peek() == TokenKind::Newline {
            self.skip_newlines_optional();
            if *self.peek() == TokenKind::Indent {
                self.advance();
                let stmts = self.parse_statements_until_dedent()?;
                self.expect(TokenKind::Dedent)?;
                self.skip_newlines_optional();
                Ok(stmts)
            } else {
                Ok(Vec::new())
            }
        } else {
            Ok(vec![self.parse_simple_statement()?])
        }
    }

    /// `suite := simple_statement | INDENT statement+ DEDENT` -- used where
    /// the grammar does not also allow the bare-`newlines` empty
    /// alternative (item bodies, `if`/`elif`/`else`/`while` bodies).
    fn parse_suite(&mut self) -> Result<Suite, Error> {
        if *self.peek() == TokenKind::Newline {
            self.skip_newlines_optional();
            self.expect(TokenKind::Indent)?;
            let stmts = self.parse_statements_until_dedent()?;
            self.expect(TokenKind::Dedent)?;
            self.skip_newlines_optional();
            Ok(stmts)
        } else {
            Ok(vec![self.parse_simple_statement()?])
        }
    }

    fn parse_statements_until_dedent(&mut self) -> Result<Suite, Error> {
        let mut stmts = Vec::new();
        while *self.peek() != TokenKind::Dedent {
            stmts.push(self.parse_statement()?);
        }
        Ok(stmts)
    }

    fn parse_statement(&mut self) -> Result<Stmt, Error> {
        match self.peek() {
            TokenKind::If => self.parse_if_statement(),
            TokenKind::While => self.parse_while_statement(),
            _ => self.parse_simple_statement(),
        }
    }

    fn parse_if_statement(&mut self) -> Result<Stmt, Error> {
        let line = self.line();
        self.expect(TokenKind::If)?;
        let cond = self.parse_test()?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_suite()?;
        let mut branches = vec![(cond, body)];
        while *self.peek() == TokenKind::Elif {
            self.advance();
            let cond = self.parse_test()?;
            self.expect(TokenKind::Colon)?;
            let body = self.parse_suite()?;
            branches.push((cond, body));
        }
        let else_branch = if *self.peek() == TokenKind::Else {
            self.advance();
            self.expect(TokenKind::Colon)?;
            Some(self.parse_suite()?)
        } else {
            None
        };
        Ok(Stmt::If {
            branches,
            else_branch,
            line,
        })
    }

    fn parse_while_statement(&mut self) -> Result<Stmt, Error> {
        let line = self.line();
        self.expect(TokenKind::While)?;
        let cond = self.parse_test()?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_suite()?;
        Ok(Stmt::While { cond, body, line })
    }

    // -- simple statements --------------------------------------------------

    fn parse_simple_statement(&mut self) -> Result<Stmt, Error> {
        match self.peek() {
            TokenKind::Say => {
                let line = self.line();
                self.advance();
                let values = self.parse_testlist()?;
                self.skip_newlines_required()?;
                Ok(Stmt::Say(values, line))
            }
            TokenKind::Exposition => {
                let line = self.line();
                self.advance();
                let values = self.parse_testlist()?;
                self.skip_newlines_required()?;
                Ok(Stmt::Exposition(values, line))
            }
            TokenKind::Win => {
                let line = self.line();
                self.advance();
                let values = self.parse_optional_testlist()?;
                self.skip_newlines_required()?;
                Ok(Stmt::Win(values, line))
            }
            TokenKind::Lose => {
                let line = self.line();
                self.advance();
                let values = self.parse_optional_testlist()?;
                self.skip_newlines_required()?;
                Ok(Stmt::Lose(values, line))
            }
            TokenKind::Break => {
                let line = self.line();
                self.advance();
                self.skip_newlines_required()?;
                Ok(Stmt::Break(line))
            }
            TokenKind::Continue => {
                let line = self.line();
                self.advance();
                self.skip_newlines_required()?;
                Ok(Stmt::Continue(line))
            }
            TokenKind::Moves => self.parse_moves_statement(),
            TokenKind::Moveto => self.parse_moveto_statement(),
            _ => self.parse_expr_or_assignment_statement(),
        }
    }

    fn parse_optional_testlist(&mut self) -> Result<Option<Vec<Expr>>, Error> {
        if *self.peek() == TokenKind::Newline {
            Ok(None)
        } else {
            Ok(Some(self.parse_testlist()?))
        }
    }

    fn parse_moves_statement(&mut self) -> Result<Stmt, Error> {
        let line = self.line();
        self.expect(TokenKind::Moves)?;
        let mut arms = Vec::new();
        loop {
            let dir = self.parse_direction()?;
            self.expect(TokenKind::LParen)?;
            let scene_id = self.expect_sceneid()?;
            self.expect(TokenKind::RParen)?;
            arms.push((dir, scene_id));
            if *self.peek() == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }
        self.skip_newlines_required()?;
        Ok(Stmt::Moves(arms, line))
    }

    fn parse_direction(&mut self) -> Result<Direction, Error> {
        let dir = match self.peek() {
            TokenKind::Left => Direction::Left,
            TokenKind::Right => Direction::Right,
            TokenKind::Up => Direction::Up,
            TokenKind::Down => Direction::Down,
            _ => return Err(self.syntax_error()),
        };
        self.advance();
        Ok(dir)
    }

    fn parse_moveto_statement(&mut self) -> Result<Stmt, Error> {
        let line = self.line();
        self.expect(TokenKind::Moveto)?;
        let scene_id = self.expect_sceneid()?;
        self.skip_newlines_required()?;
        Ok(Stmt::MoveTo(scene_id, line))
    }

    /// `["god"] testlist "is" testlist | testlist`. The common case -- a
    /// bare name immediately followed by `is` -- is fast-pathed so a
    /// not-yet-declared left-hand name never has to round-trip through
    /// general expression resolution (which would reject it as undefined).
    fn parse_expr_or_assignment_statement(&mut self) -> Result<Stmt, Error> {
        let line = self.line();
        let god = if *self.peek() == TokenKind::God {
            self.advance();
            true
        } else {
            false
        };

        if let TokenKind::Ident(name) = self.peek().clone() {
            if matches!(self.peek_at(1), Some(TokenKind::Is)) {
                self.advance(); // identifier
                self.advance(); // is
                let value = self.parse_testlist()?;
                let target = self.bind_assignment(&name, god, line);
                self.skip_newlines_required()?;
                return Ok(Stmt::Assign {
                    god,
                    target,
                    value,
                    line,
                });
            }
        }

        if god {
            return Err(self.syntax_error());
        }

        let lhs = self.parse_testlist()?;
        if *self.peek() == TokenKind::Is {
            self.advance();
            let value = self.parse_testlist()?;
            if lhs.len() != 1 {
                return Err(Error::Semantic {
                    message: "assignment target must be a single name, not a list".to_string(),
                    line,
                });
            }
            let name = match lhs.into_iter().next().unwrap() {
                Expr::Ident { name, .. } => name,
                other => {
                    return Err(Error::Semantic {
                        message: format!(
                            "assignment target must be a simple name, found {:?}",
                            other
                        ),
                        line,
                    })
                }
            };
            let target = self.bind_assignment(&name, false, line);
            self.skip_newlines_required()?;
            Ok(Stmt::Assign {
                god: false,
                target,
                value,
                line,
            })
        } else {
            self.skip_newlines_required()?;
            Ok(Stmt::ExprStmt(lhs, line))
        }
    }

    /// Registers (or re-registers -- Narratr variables are freely
    /// reassignable, only scene/item *declarations* reject duplicates) `name`
    /// in its home scope and returns the resolved `Expr::Ident` for the
    /// assignment target. A plain (non-`god`-keyword) reassignment of a name
    /// already bound `god` in `Scope::Global` keeps that routing rather than
    /// shadowing it with a fresh scene-local entry, mirroring the read side
    /// (`lower_ident`'s `entry.god` check in narratr-codegen).
    fn bind_assignment(&mut self, name: &str, god: bool, line: u32) -> Expr {
        let already_god = self
            .symtab
            .get(name, Scope::Global)
            .map_or(false, |entry| entry.god);
        let god = god || already_god;
        let scope = if god {
            Scope::Global
        } else {
            self.current_scope.clone()
        };
        let key = scope.key(name);
        self.symtab.overwrite(Entry::new(
            name.to_string(),
            SymbolValue::Unit,
            SymbolType::Dynamic,
            scope,
            god,
        ));
        Expr::Ident {
            name: name.to_string(),
            key: Some(key),
            line,
        }
    }

    // -- expressions ---------------------------------------------------------

    fn parse_testlist(&mut self) -> Result<Vec<Expr>, Error> {
        let mut items = vec![self.parse_test()?];
        while *self.peek() == TokenKind::Comma {
            self.advance();
            items.push(self.parse_test()?);
        }
        Ok(items)
    }

    fn parse_test(&mut self) -> Result<Expr, Error> {
        self.parse_or_test()
    }

    fn parse_or_test(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_and_test()?;
        while *self.peek() == TokenKind::Or {
            self.advance();
            let right = self.parse_and_test()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and_test(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_not_test()?;
        while *self.peek() == TokenKind::And {
            self.advance();
            let right = self.parse_not_test()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not_test(&mut self) -> Result<Expr, Error> {
        if *self.peek() == TokenKind::Not && !matches!(self.peek_at(1), Some(TokenKind::Ident(w)) if w == "equals")
        {
            self.advance();
            let inner = self.parse_not_test()?;
            Ok(Expr::Not(Box::new(inner)))
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_arith()?;
        loop {
            let op = if *self.peek() == TokenKind::Less {
                Some(CompareOp::Less)
            } else if *self.peek() == TokenKind::Greater {
                Some(CompareOp::Greater)
            } else if *self.peek() == TokenKind::LessEq {
                Some(CompareOp::LessEq)
            } else if *self.peek() == TokenKind::GreaterEq {
                Some(CompareOp::GreaterEq)
            } else if *self.peek() == TokenKind::EqEq {
                Some(CompareOp::Eq)
            } else if *self.peek() == TokenKind::NotEq {
                Some(CompareOp::NotEq)
            } else if *self.peek() == TokenKind::Not
                && matches!(self.peek_at(1), Some(TokenKind::Ident(w)) if w == "equals")
            {
                Some(CompareOp::NotEq)
            } else {
                None
            };
            let Some(op) = op else { break };
            if *self.peek() == TokenKind::Not {
                self.advance();
                self.advance();
            } else {
                self.advance();
            }
            let right = self.parse_arith()?;
            left = Expr::Compare(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_arith(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => ArithOp::Add,
                TokenKind::Minus => ArithOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = Expr::BinOp(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expr, Error> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => ArithOp::Mul,
                TokenKind::Slash => ArithOp::Div,
                TokenKind::SlashSlash => ArithOp::FloorDiv,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = Expr::BinOp(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, Error> {
        match self.peek() {
            TokenKind::Plus => {
                self.advance();
                Ok(Expr::UnaryOp(UnaryOp::Plus, Box::new(self.parse_factor()?)))
            }
            TokenKind::Minus => {
                self.advance();
                Ok(Expr::UnaryOp(UnaryOp::Minus, Box::new(self.parse_factor()?)))
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, Error> {
        let mut base = self.parse_atom()?;
        loop {
            match self.peek() {
                TokenKind::Dot => {
                    let line = self.line();
                    self.advance();
                    let attr = self.expect_ident()?;
                    base = Expr::Attr {
                        base: Box::new(base),
                        attr,
                        line,
                    };
                }
                TokenKind::LParen => {
                    let line = self.line();
                    self.advance();
                    let args = if *self.peek() == TokenKind::RParen {
                        Vec::new()
                    } else {
                        self.parse_args()?
                    };
                    self.expect(TokenKind::RParen)?;
                    base = Expr::Call {
                        callee: Box::new(base),
                        args,
                        line,
                    };
                }
                _ => break,
            }
        }
        Ok(base)
    }

    fn parse_args(&mut self) -> Result<Vec<Expr>, Error> {
        let mut args = vec![self.parse_test()?];
        while *self.peek() == TokenKind::Comma {
            self.advance();
            args.push(self.parse_test()?);
        }
        Ok(args)
    }

    fn parse_atom(&mut self) -> Result<Expr, Error> {
        let line = self.line();
        match self.peek().clone() {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_test()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => self.parse_list(),
            TokenKind::IntLit(n) => {
                self.advance();
                Ok(Expr::Int(n))
            }
            TokenKind::FloatLit(n) => {
                self.advance();
                Ok(Expr::Float(n))
            }
            TokenKind::StringLit(s) => {
                self.advance();
                Ok(Expr::Str(s))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Bool(false))
            }
            TokenKind::Ident(name) => {
                self.advance();
                self.resolve_ident(name, line)
            }
            _ => Err(self.syntax_error()),
        }
    }

    fn parse_list(&mut self) -> Result<Expr, Error> {
        let line = self.line();
        self.expect(TokenKind::LBracket)?;
        let items = if *self.peek() == TokenKind::RBracket {
            Vec::new()
        } else {
            self.parse_testlist()?
        };
        self.expect(TokenKind::RBracket)?;
        Ok(Expr::List(items, line))
    }

    /// Resolves a non-assignment-target identifier use. `god` entries take
    /// priority over the current local scope, matching the original's
    /// cross-scene visibility: a `god` variable shadows a same-named local
    /// wherever both exist.
    fn resolve_ident(&mut self, name: String, line: u32) -> Result<Expr, Error> {
        if matches!(name.as_str(), "str" | "int" | "float" | "pocket") {
            return Ok(Expr::Ident {
                name,
                key: None,
                line,
            });
        }
        if self.symtab.get(&name, Scope::Global).is_some() {
            let key = Scope::Global.key(&name);
            return Ok(Expr::Ident {
                name,
                key: Some(key),
                line,
            });
        }
        if self.symtab.get(&name, self.current_scope.clone()).is_some() {
            let key = self.current_scope.key(&name);
            return Ok(Expr::Ident {
                name,
                key: Some(key),
                line,
            });
        }
        Err(Error::Semantic {
            message: format!("'{}' is not defined", name),
            line,
        })
    }
}
