//! Lexer for Ion source text.

use super::error::{FrontendError, Pos};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Eof,

    Ident(String),
    Int(i64),

    // Keywords
    Fn,
    Let,
    Return,

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Comma,     // ,
    Semi,      // ;
    Colon,     // :
    Arrow,     // ->
    Equal,     // =

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
}

impl TokenKind {
    /// Short human description for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Ident(name) => format!("identifier `{}`", name),
            TokenKind::Int(value) => format!("integer `{}`", value),
            TokenKind::Fn => "`fn`".to_string(),
            TokenKind::Let => "`let`".to_string(),
            TokenKind::Return => "`return`".to_string(),
            TokenKind::LParen => "`(`".to_string(),
            TokenKind::RParen => "`)`".to_string(),
            TokenKind::LBrace => "`{`".to_string(),
            TokenKind::RBrace => "`}`".to_string(),
            TokenKind::Comma => "`,`".to_string(),
            TokenKind::Semi => "`;`".to_string(),
            TokenKind::Colon => "`:`".to_string(),
            TokenKind::Arrow => "`->`".to_string(),
            TokenKind::Equal => "`=`".to_string(),
            TokenKind::Plus => "`+`".to_string(),
            TokenKind::Minus => "`-`".to_string(),
            TokenKind::Star => "`*`".to_string(),
            TokenKind::Slash => "`/`".to_string(),
            TokenKind::Percent => "`%`".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

/// Lex a source string into tokens. The last token is always `Eof`.
pub fn lex(source: &str) -> Result<Vec<Token>, FrontendError> {
    Lexer::new(source).run()
}

struct Lexer<'src> {
    chars: std::iter::Peekable<std::str::Chars<'src>>,
    line: u32,
    column: u32,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn pos(&self) -> Pos {
        Pos::new(self.line, self.column)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn run(mut self) -> Result<Vec<Token>, FrontendError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia();
            let pos = self.pos();

            let Some(c) = self.bump() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    pos,
                });
                return Ok(tokens);
            };

            let kind = match c {
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semi,
                ':' => TokenKind::Colon,
                '=' => TokenKind::Equal,
                '+' => TokenKind::Plus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '%' => TokenKind::Percent,
                '-' => {
                    if self.chars.peek() == Some(&'>') {
                        self.bump();
                        TokenKind::Arrow
                    } else {
                        TokenKind::Minus
                    }
                }
                c if c.is_ascii_digit() => self.number(c, pos)?,
                c if c.is_alphabetic() || c == '_' => self.word(c),
                other => {
                    return Err(FrontendError::syntax(
                        pos,
                        format!("unexpected character `{}`", other),
                    ))
                }
            };

            tokens.push(Token { kind, pos });
        }
    }

    /// Skip whitespace and `//` line comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.chars.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    if ahead.peek() != Some(&'/') {
                        return;
                    }
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    fn number(&mut self, first: char, pos: Pos) -> Result<TokenKind, FrontendError> {
        let mut text = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() || c == '_' {
                self.bump();
                if c != '_' {
                    text.push(c);
                }
            } else {
                break;
            }
        }

        let value: i64 = text.parse().map_err(|_| {
            FrontendError::syntax(pos, format!("integer literal `{}` is too large", text))
        })?;

        if value > i64::from(i32::MAX) {
            return Err(FrontendError::syntax(
                pos,
                format!("integer literal `{}` does not fit in i32", text),
            ));
        }

        Ok(TokenKind::Int(value))
    }

    fn word(&mut self, first: char) -> TokenKind {
        let mut text = String::from(first);
        while let Some(&c) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.bump();
                text.push(c);
            } else {
                break;
            }
        }

        match text.as_str() {
            "fn" => TokenKind::Fn,
            "let" => TokenKind::Let,
            "return" => TokenKind::Return,
            _ => TokenKind::Ident(text),
        }
    }
}
