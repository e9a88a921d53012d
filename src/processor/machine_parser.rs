//! Parser that consumes the lexer and builds a `MachineAst`.
//
//  Grammar:
//
//      file       ::= machine EOF
//      machine    ::= 'machine' IDENT? block
//      block      ::= '{' item* '}'
//      item       ::= 'initial' name | 'initial' state_decl | state_decl
//      state_decl ::= 'final'? 'state' name state_body?
//      state_body ::= '{' member* '}'
//      member     ::= 'on' '{' (transition (',' transition)* ','?)? '}'
//                   | 'states' block
//      transition ::= name ':' name
//      name       ::= IDENT | STR
//
//  Every choice is made on the next token alone; nothing is backtracked.

use std::iter::Peekable;

use super::ast::*;
use super::lexer::{Keyword, Lexer, Token, TokenKind};
use crate::error::{Error, ParseError, Result};
use crate::model::Pos;

/// Lexes and parses one machine declaration.
pub fn parse(src: &str) -> Result<MachineAst> {
    let ast = Parser::new(src).parse()?;
    tracing::debug!(
        machine = ast.name.as_ref().map_or("<default>", Name::as_str),
        states = ast.state_count(),
        "parsed machine"
    );
    Ok(ast)
}

fn unexpected(tok: &Token, expected: &str) -> Error {
    let err = match tok.kind {
        TokenKind::Eof => ParseError::UnexpectedEof {
            expected: expected.to_string(),
        },
        ref kind => ParseError::Unexpected {
            found: kind.to_string(),
            expected: expected.to_string(),
        },
    };
    Error::new(tok.pos, err)
}

struct Parser<'a> {
    lex: Peekable<Lexer<'a>>,
    /// Position of the last token handed out, reused if the stream runs dry.
    last_pos: Pos,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            lex: Lexer::new(src).peekable(),
            last_pos: Pos::START,
        }
    }

    fn parse(&mut self) -> Result<MachineAst> {
        let machine = self.parse_machine()?;
        let tok = self.next_token()?;
        if tok.kind != TokenKind::Eof {
            return Err(unexpected(&tok, "end of input after the machine"));
        }
        Ok(machine)
    }

    fn peek(&mut self) -> Result<Token> {
        match self.lex.peek() {
            Some(Ok(tok)) => Ok(tok.clone()),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(Token {
                kind: TokenKind::Eof,
                pos: self.last_pos,
            }),
        }
    }

    fn peek_is(&mut self, kind: &TokenKind) -> Result<bool> {
        Ok(&self.peek()?.kind == kind)
    }

    fn next_token(&mut self) -> Result<Token> {
        match self.lex.next() {
            Some(res) => {
                let tok = res?;
                self.last_pos = tok.pos;
                Ok(tok)
            }
            None => Ok(Token {
                kind: TokenKind::Eof,
                pos: self.last_pos,
            }),
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token> {
        let tok = self.next_token()?;
        if tok.kind != kind {
            return Err(unexpected(&tok, expected));
        }
        Ok(tok)
    }

    fn parse_name(&mut self, expected: &str) -> Result<Name> {
        let tok = self.next_token()?;
        match tok.kind {
            TokenKind::Ident(value) | TokenKind::Str(value) => Ok(Name::new(value, tok.pos)),
            _ => Err(unexpected(&tok, expected)),
        }
    }

    fn parse_machine(&mut self) -> Result<MachineAst> {
        let kw = self.expect(TokenKind::Keyword(Keyword::Machine), "'machine'")?;

        let tok = self.peek()?;
        let name = match tok.kind {
            TokenKind::Ident(ident) => {
                self.next_token()?;
                Some(Name::new(ident, tok.pos))
            }
            _ => None,
        };

        let scope = self.parse_block()?;
        Ok(MachineAst {
            name,
            pos: kw.pos,
            scope,
        })
    }

    fn parse_block(&mut self) -> Result<Scope> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut scope = Scope::default();

        loop {
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::RBrace => {
                    self.next_token()?;
                    return Ok(scope);
                }
                TokenKind::Keyword(Keyword::Initial) => {
                    self.next_token()?;
                    match self.peek()?.kind {
                        TokenKind::Keyword(Keyword::State | Keyword::Final) => {
                            let state = self.parse_state()?;
                            scope.initial_decls.push(state.name.clone());
                            scope.states.push(state);
                        }
                        _ => {
                            let name = self.parse_name("state name after 'initial'")?;
                            scope.initial_decls.push(name);
                        }
                    }
                }
                TokenKind::Keyword(Keyword::State | Keyword::Final) => {
                    let state = self.parse_state()?;
                    scope.states.push(state);
                }
                _ => return Err(unexpected(&tok, "'state', 'final', 'initial' or '}'")),
            }
        }
    }

    fn parse_state(&mut self) -> Result<StateNode> {
        let is_final = self.peek_is(&TokenKind::Keyword(Keyword::Final))?;
        if is_final {
            self.next_token()?;
        }
        self.expect(TokenKind::Keyword(Keyword::State), "'state'")?;
        let name = self.parse_name("state name")?;

        let mut node = StateNode::new(name);
        node.is_final = is_final;

        // a state without braces is an empty leaf
        if self.peek_is(&TokenKind::LBrace)? {
            self.parse_state_body(&mut node)?;
        }
        Ok(node)
    }

    fn parse_state_body(&mut self, node: &mut StateNode) -> Result<()> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut seen_states = false;

        loop {
            let tok = self.peek()?;
            match tok.kind {
                TokenKind::RBrace => {
                    self.next_token()?;
                    return Ok(());
                }
                TokenKind::Keyword(Keyword::On) => {
                    self.next_token()?;
                    self.parse_transitions(&mut node.transitions)?;
                }
                TokenKind::Keyword(Keyword::States) => {
                    self.next_token()?;
                    if seen_states {
                        return Err(Error::new(
                            tok.pos,
                            ParseError::DuplicateBlock {
                                state: node.name.value.clone(),
                                block: "states",
                            },
                        ));
                    }
                    seen_states = true;
                    node.children = self.parse_block()?;
                }
                _ => return Err(unexpected(&tok, "'on', 'states' or '}'")),
            }
        }
    }

    fn parse_transitions(&mut self, out: &mut Vec<Transition>) -> Result<()> {
        self.expect(TokenKind::LBrace, "'{' after 'on'")?;

        loop {
            if self.peek_is(&TokenKind::RBrace)? {
                self.next_token()?;
                return Ok(());
            }

            let event = self.parse_name("event name")?;
            self.expect(TokenKind::Colon, "':' after event name")?;
            let target = self.parse_name("target state name")?;
            out.push(Transition { event, target });

            let tok = self.next_token()?;
            match tok.kind {
                TokenKind::Comma => continue,
                TokenKind::RBrace => return Ok(()),
                _ => return Err(unexpected(&tok, "',' or '}'")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, LexError};

    fn names(scope: &Scope) -> Vec<&str> {
        scope.states.iter().map(|s| s.name.as_str()).collect()
    }

    fn edges(state: &StateNode) -> Vec<(&str, &str)> {
        state
            .transitions
            .iter()
            .map(|t| (t.event.as_str(), t.target.as_str()))
            .collect()
    }

    #[test]
    fn test_parse_flat_machine() {
        let src = "machine toggle {\n  initial off\n  state off { on { flip: on_ } }\n  state on_ { on { flip: off } }\n}";
        let ast = parse(src).unwrap();

        assert_eq!(ast.name.as_ref().map(Name::as_str), Some("toggle"));
        assert_eq!(ast.name.as_ref().unwrap().pos, Pos::new(1, 9));
        assert_eq!(ast.pos, Pos::new(1, 1));
        assert_eq!(ast.scope.initial().map(Name::as_str), Some("off"));
        assert_eq!(ast.scope.initial().unwrap().pos, Pos::new(2, 11));
        assert_eq!(names(&ast.scope), vec!["off", "on_"]);
        assert_eq!(edges(&ast.scope.states[0]), vec![("flip", "on_")]);
        assert_eq!(ast.scope.states[1].transitions[0].target.pos, Pos::new(4, 26));
    }

    #[test]
    fn test_parse_initial_marker_and_final() {
        let src = "machine m { initial state a { on { go: b } } final state b }";
        let ast = parse(src).unwrap();

        assert_eq!(ast.scope.initial_decls.len(), 1);
        assert_eq!(ast.scope.initial().unwrap().as_str(), "a");
        assert!(!ast.scope.states[0].is_final);
        assert!(ast.scope.states[1].is_final);
        assert!(ast.scope.states[1].transitions.is_empty());
    }

    #[test]
    fn test_parse_nested_states() {
        let src = r#"
machine light {
  initial green
  state green { on { timer: red } }
  state red {
    on { timer: green }
    states {
      initial state walk { on { countdown: stop } }
      final state stop
    }
  }
}"#;
        let ast = parse(src).unwrap();
        let red = &ast.scope.states[1];

        assert_eq!(edges(red), vec![("timer", "green")]);
        assert_eq!(red.children.initial().unwrap().as_str(), "walk");
        assert_eq!(names(&red.children), vec!["walk", "stop"]);
        assert!(red.children.states[1].is_final);
        assert_eq!(ast.state_count(), 4);
    }

    #[test]
    fn test_parse_labels_and_trailing_comma() {
        let src = "machine { initial 'idle state' state 'idle state' { on { 'done.load': 'idle state', retry: \"idle state\", } } }";
        let ast = parse(src).unwrap();

        assert_eq!(ast.name, None);
        assert_eq!(ast.scope.initial().unwrap().as_str(), "idle state");
        assert_eq!(
            edges(&ast.scope.states[0]),
            vec![("done.load", "idle state"), ("retry", "idle state")]
        );
    }

    #[test]
    fn test_parse_split_on_blocks_keep_order() {
        let src = "machine m { initial a state a { on { x: a } on { y: a } } }";
        let ast = parse(src).unwrap();
        assert_eq!(edges(&ast.scope.states[0]), vec![("x", "a"), ("y", "a")]);
    }

    #[test]
    fn test_parse_errors() {
        let test_cases = vec![
            (
                "state a",
                Pos::new(1, 1),
                ErrorKind::Parse(ParseError::Unexpected {
                    found: "state".into(),
                    expected: "'machine'".into(),
                }),
            ),
            (
                "machine m {\n  state a { on { go b } }\n}",
                Pos::new(2, 21),
                ErrorKind::Parse(ParseError::Unexpected {
                    found: "b".into(),
                    expected: "':' after event name".into(),
                }),
            ),
            (
                "machine m { state a { on { go: b c: d } } }",
                Pos::new(1, 34),
                ErrorKind::Parse(ParseError::Unexpected {
                    found: "c".into(),
                    expected: "',' or '}'".into(),
                }),
            ),
            (
                "machine m { state a {",
                Pos::new(1, 22),
                ErrorKind::Parse(ParseError::UnexpectedEof {
                    expected: "'on', 'states' or '}'".into(),
                }),
            ),
            (
                "machine m { state }",
                Pos::new(1, 19),
                ErrorKind::Parse(ParseError::Unexpected {
                    found: "}".into(),
                    expected: "state name".into(),
                }),
            ),
            (
                "machine m { initial a state a } }",
                Pos::new(1, 33),
                ErrorKind::Parse(ParseError::Unexpected {
                    found: "}".into(),
                    expected: "end of input after the machine".into(),
                }),
            ),
            (
                "machine m { state a { states { } states { } } }",
                Pos::new(1, 34),
                ErrorKind::Parse(ParseError::DuplicateBlock {
                    state: "a".into(),
                    block: "states",
                }),
            ),
            (
                "machine m { state a { final } }",
                Pos::new(1, 23),
                ErrorKind::Parse(ParseError::Unexpected {
                    found: "final".into(),
                    expected: "'on', 'states' or '}'".into(),
                }),
            ),
            (
                "machine m {\n  state a; }",
                Pos::new(2, 10),
                ErrorKind::Lex(LexError::UnexpectedChar(';')),
            ),
        ];

        for (src, pos, kind) in test_cases {
            let err = parse(src).unwrap_err();
            assert_eq!((err.pos, err.kind), (pos, kind), "source: {src:?}");
        }
    }
}
