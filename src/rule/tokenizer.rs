//! Rule string tokenizer

use crate::error::{Result, RuleError};
use crate::rule::ast::{Comparator, LogicalOperator};

/// Lexical token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Operator(Comparator),
    Logic(LogicalOperator),
    LParen,
    RParen,
}

/// A single token with its source text and byte offset
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text; string literals have their quotes stripped
    pub value: String,
    pub offset: usize,
}

impl Token {
    fn new(kind: TokenKind, value: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            offset,
        }
    }

    /// Short description used in parse error messages
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::String => format!("string '{}'", self.value),
            TokenKind::Number => format!("number {}", self.value),
            TokenKind::Identifier => format!("identifier '{}'", self.value),
            _ => format!("'{}'", self.value),
        }
    }
}

/// Split a rule string into tokens
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::new(TokenKind::LParen, "(", start));
            }
            ')' => {
                chars.next();
                tokens.push(Token::new(TokenKind::RParen, ")", start));
            }
            '>' | '<' | '!' | '=' => {
                chars.next();
                let followed_by_eq = matches!(chars.peek(), Some(&(_, '=')));
                let symbol = match (c, followed_by_eq) {
                    ('>', true) => ">=",
                    ('<', true) => "<=",
                    ('!', true) => "!=",
                    ('>', false) => ">",
                    ('<', false) => "<",
                    ('=', _) => "=",
                    _ => {
                        return Err(RuleError::LexError(format!(
                            "unexpected character '!' at position {}",
                            start
                        )))
                    }
                };
                if symbol.len() == 2 {
                    chars.next();
                }
                // from_symbol covers every symbol produced above
                let comparator = Comparator::from_symbol(symbol).ok_or_else(|| {
                    RuleError::LexError(format!("unknown operator '{}'", symbol))
                })?;
                tokens.push(Token::new(TokenKind::Operator(comparator), symbol, start));
            }
            '\'' | '"' => {
                chars.next();
                let mut literal = String::new();
                let mut closed = false;
                for (_, ch) in chars.by_ref() {
                    if ch == c {
                        closed = true;
                        break;
                    }
                    literal.push(ch);
                }
                if !closed {
                    return Err(RuleError::LexError(format!(
                        "unterminated string starting at position {}",
                        start
                    )));
                }
                tokens.push(Token::new(TokenKind::String, literal, start));
            }
            c if c.is_ascii_digit() || (c == '-' && next_is_digit(text, start)) => {
                tokens.push(lex_number(text, start, &mut chars));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut end = start;
                while let Some(&(i, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        end = i + ch.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let word = &text[start..end];
                let kind = match LogicalOperator::from_keyword(word) {
                    Some(op) => TokenKind::Logic(op),
                    None => TokenKind::Identifier,
                };
                tokens.push(Token::new(kind, word, start));
            }
            other => {
                return Err(RuleError::LexError(format!(
                    "unexpected character '{}' at position {}",
                    other, start
                )));
            }
        }
    }

    Ok(tokens)
}

fn next_is_digit(text: &str, minus_at: usize) -> bool {
    text[minus_at + 1..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
}

/// Consume `-?digits(.digits*)?`; the caller guarantees the first char starts a number
fn lex_number(
    text: &str,
    start: usize,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> Token {
    let mut end = start;
    let mut seen_dot = false;

    if let Some(&(i, '-')) = chars.peek() {
        end = i + 1;
        chars.next();
    }
    while let Some(&(i, ch)) = chars.peek() {
        if ch.is_ascii_digit() {
            end = i + 1;
            chars.next();
        } else if ch == '.' && !seen_dot {
            seen_dot = true;
            end = i + 1;
            chars.next();
        } else {
            break;
        }
    }

    Token::new(TokenKind::Number, &text[start..end], start)
}
