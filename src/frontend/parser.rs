//! Recursive-descent parser.
//!
//! Grammar:
//!
//! ```text
//! file     := function*
//! function := "fn" IDENT "(" (param ("," param)*)? ")" "->" "i32" block
//! param    := IDENT ":" "i32"
//! block    := "{" stmt* "}"
//! stmt     := "let" IDENT "=" expr ";" | "return" expr ";" | expr ";"
//! expr     := term (("+" | "-") term)*
//! term     := unary (("*" | "/" | "%") unary)*
//! unary    := "-" unary | primary
//! primary  := INT | IDENT | IDENT "(" args? ")" | "(" expr ")"
//! ```

use super::ast::{BinaryOp, Expr, Function, Param, SourceFile, Stmt};
use super::error::{FrontendError, Pos};
use super::lexer::{Token, TokenKind};

const INT_TYPE: &str = "i32";

pub fn parse(mut tokens: Vec<Token>) -> Result<SourceFile, FrontendError> {
    if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
        let pos = tokens.last().map(|t| t.pos).unwrap_or_default();
        tokens.push(Token {
            kind: TokenKind::Eof,
            pos,
        });
    }
    Parser { tokens, index: 0 }.file()
}

struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // `parse` guarantees a trailing Eof.
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.index += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, FrontendError> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.describe()))
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Pos), FrontendError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok((name, token.pos))
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn expect_int_type(&mut self) -> Result<(), FrontendError> {
        let (name, pos) = self.expect_ident()?;
        if name != INT_TYPE {
            return Err(FrontendError::syntax(
                pos,
                format!("unknown type `{}`, only `{}` is supported", name, INT_TYPE),
            ));
        }
        Ok(())
    }

    fn unexpected(&self, expected: &str) -> FrontendError {
        let token = self.peek();
        FrontendError::syntax(
            token.pos,
            format!("expected {}, found {}", expected, token.kind.describe()),
        )
    }

    fn file(&mut self) -> Result<SourceFile, FrontendError> {
        let mut functions = Vec::new();
        while !self.check(&TokenKind::Eof) {
            functions.push(self.function()?);
        }
        Ok(SourceFile { functions })
    }

    fn function(&mut self) -> Result<Function, FrontendError> {
        let pos = self.expect(TokenKind::Fn)?.pos;
        let (name, _) = self.expect_ident()?;

        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let (param, param_pos) = self.expect_ident()?;
                self.expect(TokenKind::Colon)?;
                self.expect_int_type()?;
                params.push(Param {
                    name: param,
                    pos: param_pos,
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Arrow)?;
        self.expect_int_type()?;

        let body = self.block()?;

        Ok(Function {
            name,
            params,
            body,
            pos,
        })
    }

    fn block(&mut self) -> Result<Vec<Stmt>, FrontendError> {
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.check(&TokenKind::Eof) {
                return Err(self.unexpected("`}`"));
            }
            stmts.push(self.stmt()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn stmt(&mut self) -> Result<Stmt, FrontendError> {
        let pos = self.peek().pos;

        let stmt = if self.eat(&TokenKind::Let) {
            let (name, _) = self.expect_ident()?;
            self.expect(TokenKind::Equal)?;
            let value = self.expr()?;
            Stmt::Let { name, value, pos }
        } else if self.eat(&TokenKind::Return) {
            let value = self.expr()?;
            Stmt::Return { value, pos }
        } else {
            Stmt::Expr(self.expr()?)
        };

        self.expect(TokenKind::Semi)?;
        Ok(stmt)
    }

    fn expr(&mut self) -> Result<Expr, FrontendError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            let pos = self.advance().pos;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                pos,
            };
        }
    }

    fn term(&mut self) -> Result<Expr, FrontendError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Rem,
                _ => return Ok(lhs),
            };
            let pos = self.advance().pos;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                pos,
            };
        }
    }

    fn unary(&mut self) -> Result<Expr, FrontendError> {
        if self.check(&TokenKind::Minus) {
            let pos = self.advance().pos;
            let operand = self.unary()?;
            return Ok(Expr::Neg {
                operand: Box::new(operand),
                pos,
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, FrontendError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Int(value) => {
                self.advance();
                Ok(Expr::Int {
                    value,
                    pos: token.pos,
                })
            }
            TokenKind::Ident(name) => {
                self.advance();
                if !self.eat(&TokenKind::LParen) {
                    return Ok(Expr::Var {
                        name,
                        pos: token.pos,
                    });
                }

                let mut args = Vec::new();
                if !self.check(&TokenKind::RParen) {
                    loop {
                        args.push(self.expr()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Call {
                    name,
                    args,
                    pos: token.pos,
                })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            _ => Err(self.unexpected("an expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::lex;

    fn parse_str(source: &str) -> Result<SourceFile, FrontendError> {
        parse(lex(source)?)
    }

    #[test]
    fn test_parse_function() {
        let file = parse_str("fn add(a: i32, b: i32) -> i32 { return a + b; }").unwrap();
        assert_eq!(file.functions.len(), 1);

        let func = &file.functions[0];
        assert_eq!(func.name, "add");
        assert_eq!(func.params.len(), 2);
        assert!(matches!(func.body[0], Stmt::Return { .. }));
    }

    #[test]
    fn test_precedence() {
        let file = parse_str("fn f() -> i32 { return 1 + 2 * 3; }").unwrap();
        let Stmt::Return { value, .. } = &file.functions[0].body[0] else {
            panic!("expected return");
        };

        match value {
            Expr::Binary { op, rhs, .. } => {
                assert_eq!(*op, BinaryOp::Add);
                assert!(matches!(**rhs, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("unexpected expression: {:?}", other),
        }
    }

    #[test]
    fn test_parse_call_and_neg() {
        let file = parse_str("fn f() -> i32 { let x = -g(1, (2)); return x; }").unwrap();
        let Stmt::Let { value, .. } = &file.functions[0].body[0] else {
            panic!("expected let");
        };
        match value {
            Expr::Neg { operand, .. } => {
                assert!(matches!(
                    &**operand,
                    Expr::Call { name, args, .. } if name == "g" && args.len() == 2
                ));
            }
            other => panic!("unexpected expression: {:?}", other),
        }
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse_str("fn f() -> i32 { return 1 }").unwrap_err();
        assert!(err.to_string().contains("expected `;`, found `}`"));
    }

    #[test]
    fn test_unknown_type() {
        let err = parse_str("fn f(x: i64) -> i32 { return x; }").unwrap_err();
        assert!(err.to_string().contains("unknown type `i64`"));
    }

    #[test]
    fn test_empty_token_stream() {
        let file = parse(Vec::new()).unwrap();
        assert!(file.functions.is_empty());
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse_str("fn f() -> i32 { return 1;").unwrap_err();
        assert!(err.to_string().contains("end of file"));
    }
}
