//! Parenthesized tree notation
//!
//! A small front end reading the notation written by [`SyntacticTree::to_notation`]:
//!
//! ```text
//! ; a comment
//! (NOVELLA
//!   (_LEVEL (LEVEL_TITLE (WORD_ "Intro")))
//!   (PARAGRAPH_REGULAR (WORD_ "it") WHITESPACE_ (WORD_ "works")))
//! ```
//!
//! A bare name is a childless node of that kind, a quoted string is a text node, and
//! `(HEAD child ...)` gives children to a kind or a quoted text. Strings accept `\"`,
//! `\\` and `\n` escapes. Every node is located in its source.

use crate::diagnostics::{Location, Problem};
use crate::parser::{DocumentParser, ParsedDocument};
use crate::tree::{NodeKind, Payload, SyntacticTree};
use tracing::trace;

/// Reads tree notation. Stateless, so one instance may serve every thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotationParser;

impl NotationParser {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentParser for NotationParser {
    fn parse(&self, source_name: &str, content: &str) -> ParsedDocument {
        let (tokens, mut problems) = lex(source_name, content);
        trace!(source = source_name, tokens = tokens.len(), "Lexed notation");

        let mut parser = Parser {
            tokens,
            position: 0,
            problems: Vec::new(),
        };
        let tree = parser.parse_document(source_name);
        problems.append(&mut parser.problems);
        ParsedDocument::new(tree, problems)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Open,
    Close,
    Symbol(String),
    Text(String),
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    location: Location,
}

fn lex(source_name: &str, input: &str) -> (Vec<Token>, Vec<Problem>) {
    let mut tokens = Vec::new();
    let mut problems = Vec::new();
    let mut chars = input.chars().peekable();
    let (mut line, mut column) = (1u32, 1u32);

    while let Some(&current) = chars.peek() {
        let location = Location::new(source_name, line, column);
        match current {
            '(' | ')' => {
                chars.next();
                bump(current, &mut line, &mut column);
                let kind = if current == '(' {
                    TokenKind::Open
                } else {
                    TokenKind::Close
                };
                tokens.push(Token { kind, location });
            }
            ';' => {
                while let Some(c) = chars.next_if(|c| *c != '\n') {
                    bump(c, &mut line, &mut column);
                }
            }
            '"' => {
                chars.next();
                bump(current, &mut line, &mut column);
                let mut text = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    bump(c, &mut line, &mut column);
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some(escaped) => {
                                bump(escaped, &mut line, &mut column);
                                match escaped {
                                    'n' => text.push('\n'),
                                    '"' | '\\' => text.push(escaped),
                                    other => {
                                        problems.push(Problem::at(
                                            format!("Unknown escape sequence '\\{other}'"),
                                            Location::new(source_name, line, column - 2),
                                        ));
                                        text.push(other);
                                    }
                                }
                            }
                            None => break,
                        },
                        _ => text.push(c),
                    }
                }
                if !closed {
                    problems.push(Problem::at("Unterminated string", location.clone()));
                }
                tokens.push(Token {
                    kind: TokenKind::Text(text),
                    location,
                });
            }
            c if c.is_whitespace() => {
                chars.next();
                bump(c, &mut line, &mut column);
            }
            _ => {
                let mut symbol = String::new();
                while let Some(c) =
                    chars.next_if(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | ';'))
                {
                    bump(c, &mut line, &mut column);
                    symbol.push(c);
                }
                tokens.push(Token {
                    kind: TokenKind::Symbol(symbol),
                    location,
                });
            }
        }
    }
    (tokens, problems)
}

/// Moves the position past `c`.
fn bump(c: char, line: &mut u32, column: &mut u32) {
    if c == '\n' {
        *line += 1;
        *column = 1;
    } else {
        *column += 1;
    }
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    problems: Vec<Problem>,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn parse_document(&mut self, source_name: &str) -> Option<SyntacticTree> {
        if self.tokens.is_empty() {
            self.problems
                .push(Problem::at("Empty document", Location::new(source_name, 1, 1)));
            return None;
        }
        let root = self.parse_form();
        while let Some(token) = self.peek() {
            if token.kind != TokenKind::Close {
                let location = token.location.clone();
                self.problems
                    .push(Problem::at("Unexpected content after the root node", location));
            }
            self.parse_form();
        }
        root
    }

    /// Parses one form; `None` when it could not become a node.
    fn parse_form(&mut self) -> Option<SyntacticTree> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Text(text) => Some(located(
                Payload::Text(text.into()),
                Vec::new(),
                token.location,
            )),
            TokenKind::Symbol(name) => self
                .kind(&name, &token.location)
                .map(|kind| located(Payload::Kind(kind), Vec::new(), token.location)),
            TokenKind::Close => {
                self.problems
                    .push(Problem::at("Unbalanced closing parenthesis", token.location));
                None
            }
            TokenKind::Open => self.parse_node(token.location),
        }
    }

    fn parse_node(&mut self, open: Location) -> Option<SyntacticTree> {
        let head = match self.peek().map(|token| token.kind.clone()) {
            Some(TokenKind::Symbol(name)) => {
                let location = self.advance().map_or_else(|| open.clone(), |t| t.location);
                self.kind(&name, &location).map(Payload::Kind)
            }
            Some(TokenKind::Text(text)) => {
                self.advance();
                Some(Payload::Text(text.into()))
            }
            _ => {
                self.problems
                    .push(Problem::at("Expected a node kind after '('", open.clone()));
                None
            }
        };

        let mut children = Vec::new();
        loop {
            match self.peek().map(|token| &token.kind) {
                None => {
                    self.problems
                        .push(Problem::at("Unclosed parenthesis", open.clone()));
                    break;
                }
                Some(TokenKind::Close) => {
                    self.advance();
                    break;
                }
                Some(_) => children.extend(self.parse_form()),
            }
        }
        head.map(|payload| located(payload, children, open))
    }

    fn kind(&mut self, name: &str, location: &Location) -> Option<NodeKind> {
        let kind = NodeKind::from_name(name);
        if kind.is_none() {
            self.problems.push(Problem::at(
                format!("Unknown node kind '{name}'"),
                location.clone(),
            ));
        }
        kind
    }
}

fn located(payload: Payload, children: Vec<SyntacticTree>, location: Location) -> SyntacticTree {
    SyntacticTree::new(payload, children, Some(location))
}
