//! Small hand-written lexer for the machine notation.
//!
//! Keywords are recognised here so the parser can decide on a single token
//! of lookahead; everything else is identifiers, labels and punctuation.
//
//  Lexical items:
//
//      Ident    ::= [A-Za-z_][A-Za-z0-9_]*     (minus the keywords)
//      Keyword  ::= machine | initial | final | state | states | on
//      Str      ::= '\'' [^'\n]* '\'' | '"' [^"\n]* '"'
//      Symbols  ::= '{' | '}' | ':' | ','
//      Whitespace and comments (// until end-of-line) are discarded.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::{Error, LexError, Result};
use crate::model::Pos;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Machine,
    Initial,
    Final,
    State,
    States,
    On,
}

impl Keyword {
    fn from_ident(ident: &str) -> Option<Keyword> {
        let kw = match ident {
            "machine" => Keyword::Machine,
            "initial" => Keyword::Initial,
            "final" => Keyword::Final,
            "state" => Keyword::State,
            "states" => Keyword::States,
            "on" => Keyword::On,
            _ => return None,
        };
        Some(kw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Machine => "machine",
            Keyword::Initial => "initial",
            Keyword::Final => "final",
            Keyword::State => "state",
            Keyword::States => "states",
            Keyword::On => "on",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Str(String), // quotes stripped
    Keyword(Keyword),
    LBrace,
    RBrace,
    Colon,
    Comma,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(s) => f.write_str(s),
            TokenKind::Str(s) => write!(f, "'{s}'"),
            TokenKind::Keyword(kw) => f.write_str(kw.as_str()),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

#[derive(Clone)]
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: u32,
    column: u32,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
            line: 1,
            column: 1,
            finished: false,
        }
    }

    fn pos(&self) -> Pos {
        Pos::new(self.line, self.column)
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn consume_while<F: Fn(char) -> bool>(&mut self, pred: F, buf: &mut String) {
        while let Some(c) = self.peek_char() {
            if pred(c) {
                buf.push(c);
                self.next_char();
            } else {
                break;
            }
        }
    }

    /// Skips whitespace and `//` comments. A lone `/` is left in place so the
    /// caller reports it as an unexpected character.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char() {
                Some(c) if c.is_whitespace() => {
                    self.next_char();
                }
                Some('/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    if ahead.peek() != Some(&'/') {
                        return;
                    }
                    while let Some(c) = self.peek_char() {
                        if c == '\n' {
                            break;
                        }
                        self.next_char();
                    }
                }
                _ => return,
            }
        }
    }

    fn read_identifier(&mut self, first: char) -> String {
        let mut id = String::new();
        id.push(first);
        self.consume_while(|c| c.is_ascii_alphanumeric() || c == '_', &mut id);
        id
    }

    fn read_label(&mut self, quote: char) -> std::result::Result<String, LexError> {
        let mut txt = String::new();
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.next_char();
            if c == quote {
                return Ok(txt);
            }
            txt.push(c);
        }
        Err(LexError::UnterminatedString)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        self.skip_trivia();

        let pos = self.pos();
        let ch = match self.next_char() {
            Some(c) => c,
            None => {
                self.finished = true;
                return Some(Ok(Token {
                    kind: TokenKind::Eof,
                    pos,
                }));
            }
        };

        let kind = match ch {
            '{' => Ok(TokenKind::LBrace),
            '}' => Ok(TokenKind::RBrace),
            ':' => Ok(TokenKind::Colon),
            ',' => Ok(TokenKind::Comma),
            '\'' | '"' => self.read_label(ch).map(TokenKind::Str),
            c if c.is_ascii_alphabetic() || c == '_' => {
                let ident = self.read_identifier(c);
                Ok(match Keyword::from_ident(&ident) {
                    Some(kw) => TokenKind::Keyword(kw),
                    None => TokenKind::Ident(ident),
                })
            }
            e => Err(LexError::UnexpectedChar(e)),
        };

        let res = match kind {
            Ok(kind) => {
                tracing::trace!(%kind, %pos, "token");
                Ok(Token { kind, pos })
            }
            Err(e) => {
                // fail-fast: nothing after a bad character is lexed
                self.finished = true;
                Err(Error::new(pos, e))
            }
        };
        Some(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn kinds(src: &str) -> Vec<TokenKind> {
        let tokens: Result<Vec<_>> = Lexer::new(src).collect();
        tokens.unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_tokenisation() {
        let test_cases = vec![
            (
                "machine light { initial green }",
                vec![
                    TokenKind::Keyword(Keyword::Machine),
                    TokenKind::Ident("light".into()),
                    TokenKind::LBrace,
                    TokenKind::Keyword(Keyword::Initial),
                    TokenKind::Ident("green".into()),
                    TokenKind::RBrace,
                    TokenKind::Eof,
                ],
            ),
            (
                "on { timer: yellow, 'done.x': \"stop\" }",
                vec![
                    TokenKind::Keyword(Keyword::On),
                    TokenKind::LBrace,
                    TokenKind::Ident("timer".into()),
                    TokenKind::Colon,
                    TokenKind::Ident("yellow".into()),
                    TokenKind::Comma,
                    TokenKind::Str("done.x".into()),
                    TokenKind::Colon,
                    TokenKind::Str("stop".into()),
                    TokenKind::RBrace,
                    TokenKind::Eof,
                ],
            ),
            (
                "final state stop_2 // trailing comment\nstates",
                vec![
                    TokenKind::Keyword(Keyword::Final),
                    TokenKind::Keyword(Keyword::State),
                    TokenKind::Ident("stop_2".into()),
                    TokenKind::Keyword(Keyword::States),
                    TokenKind::Eof,
                ],
            ),
            ("", vec![TokenKind::Eof]),
        ];

        for (src, expected) in test_cases {
            assert_eq!(kinds(src), expected, "source: {src:?}");
        }
    }

    #[test]
    fn test_keyword_prefixes_are_identifiers() {
        assert_eq!(
            kinds("onward stateful finally"),
            vec![
                TokenKind::Ident("onward".into()),
                TokenKind::Ident("stateful".into()),
                TokenKind::Ident("finally".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens: Vec<Token> = Lexer::new("machine m {\n  state a\n}")
            .collect::<Result<_>>()
            .unwrap();
        let positions: Vec<Pos> = tokens.iter().map(|t| t.pos).collect();
        assert_eq!(
            positions,
            vec![
                Pos::new(1, 1),
                Pos::new(1, 9),
                Pos::new(1, 11),
                Pos::new(2, 3),
                Pos::new(2, 9),
                Pos::new(3, 1),
                Pos::new(3, 2),
            ]
        );
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("state a\n  @b");
        assert!(lexer.next().unwrap().is_ok());
        assert!(lexer.next().unwrap().is_ok());
        let err = lexer.next().unwrap().unwrap_err();
        assert_eq!(err.pos, Pos::new(2, 3));
        assert_eq!(err.kind, ErrorKind::Lex(LexError::UnexpectedChar('@')));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_single_slash_is_rejected() {
        let err = Lexer::new("a / b")
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert_eq!(err.pos, Pos::new(1, 3));
        assert_eq!(err.kind, ErrorKind::Lex(LexError::UnexpectedChar('/')));
    }

    #[test]
    fn test_unterminated_label() {
        let err = Lexer::new("on { 'open: x }\n")
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert_eq!(err.pos, Pos::new(1, 6));
        assert_eq!(err.kind, ErrorKind::Lex(LexError::UnterminatedString));
    }
}
