//! Recursive-descent rule parser
//!
//! Grammar, with AND and OR on a single precedence level folded left to right:
//!
//! ```text
//! expr      := term ((AND | OR) term)*
//! term      := '(' expr ')' | condition
//! condition := IDENTIFIER comparator (NUMBER | STRING)
//! ```

use crate::error::{Result, RuleError};
use crate::rule::ast::{AstNode, Condition, Literal};
use crate::rule::tokenizer::{tokenize, Token, TokenKind};
use tracing::trace;

/// Default bound on parenthesis nesting
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Parse a rule string into an AST
pub fn parse(rule: &str) -> Result<AstNode> {
    Parser::new().parse(rule)
}

/// Parse an already tokenized rule
pub fn parse_tokens(tokens: &[Token]) -> Result<AstNode> {
    Parser::new().parse_tokens(tokens)
}

/// Parser configuration; holds no state between calls
#[derive(Debug, Clone, Copy)]
pub struct Parser {
    max_depth: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn parse(&self, rule: &str) -> Result<AstNode> {
        let tokens = tokenize(rule)?;
        trace!(tokens = tokens.len(), "tokenized rule");
        self.parse_tokens(&tokens)
    }

    pub fn parse_tokens(&self, tokens: &[Token]) -> Result<AstNode> {
        let mut cursor = Cursor {
            tokens,
            pos: 0,
            depth: 0,
            max_depth: self.max_depth,
        };
        let node = cursor.expr()?;

        if let Some(token) = cursor.peek() {
            return Err(RuleError::ParseError(format!(
                "unexpected token {} after expression at position {}",
                token.describe(),
                token.offset
            )));
        }

        Ok(node)
    }
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn found(&self) -> String {
        match self.peek() {
            Some(token) => format!("found {}", token.describe()),
            None => "found end of input".to_string(),
        }
    }

    fn expr(&mut self) -> Result<AstNode> {
        let mut node = self.term()?;

        while let Some(Token {
            kind: TokenKind::Logic(operator),
            ..
        }) = self.peek()
        {
            let operator = *operator;
            self.pos += 1;
            let right = self.term()?;
            node = AstNode::logical(operator, node, right);
        }

        Ok(node)
    }

    fn term(&mut self) -> Result<AstNode> {
        match self.peek().map(|t| t.kind) {
            Some(TokenKind::LParen) => {
                self.pos += 1;
                self.depth += 1;
                if self.depth > self.max_depth {
                    return Err(RuleError::ParseError(format!(
                        "nesting too deep (limit {})",
                        self.max_depth
                    )));
                }

                let node = self.expr()?;

                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => {
                        self.depth -= 1;
                        Ok(node)
                    }
                    Some(token) => Err(RuleError::ParseError(format!(
                        "expected ')', found {}",
                        token.describe()
                    ))),
                    None => Err(RuleError::ParseError(
                        "expected ')', found end of input".to_string(),
                    )),
                }
            }
            Some(TokenKind::Identifier) => self.condition(),
            _ => Err(RuleError::ParseError(format!(
                "expected identifier or '(', {}",
                self.found()
            ))),
        }
    }

    fn condition(&mut self) -> Result<AstNode> {
        let attribute = match self.advance() {
            Some(token) if token.kind == TokenKind::Identifier => token.value.clone(),
            _ => {
                return Err(RuleError::ParseError(format!(
                    "expected identifier, {}",
                    self.found()
                )))
            }
        };

        let comparator = match self.peek().map(|t| t.kind) {
            Some(TokenKind::Operator(cmp)) => {
                self.pos += 1;
                cmp
            }
            _ => {
                return Err(RuleError::ParseError(format!(
                    "expected comparator after '{}', {}",
                    attribute,
                    self.found()
                )))
            }
        };

        let value = match self.peek() {
            Some(token) if token.kind == TokenKind::Number => {
                let number = token.value.parse::<f64>().map_err(|_| {
                    RuleError::ParseError(format!("invalid number '{}'", token.value))
                })?;
                self.pos += 1;
                Literal::Number(number)
            }
            Some(token) if token.kind == TokenKind::String => {
                self.pos += 1;
                Literal::String(token.value.clone())
            }
            _ => {
                return Err(RuleError::ParseError(format!(
                    "expected number or string after '{} {}', {}",
                    attribute,
                    comparator,
                    self.found()
                )))
            }
        };

        Ok(AstNode::Condition(Condition {
            attribute,
            comparator,
            value,
        }))
    }
}
