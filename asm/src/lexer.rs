use crate::error::Error;
use crate::token::{Token, TokenKind};
use std::iter::Peekable;
use std::str::CharIndices;

/// Tokenizes a single assembly line. `;` starts a comment that runs to
/// the end of the line.
pub struct LineLexer<'a> {
    line: &'a str,
    iter: Peekable<CharIndices<'a>>,
}

impl<'a> LineLexer<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            line,
            iter: line.char_indices().peekable(),
        }
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.iter.clone().nth(n).map(|(_, c)| c)
    }

    /// Consumes characters matching `pred` and returns the slice from
    /// `start` to the last consumed character.
    fn take_while(&mut self, start: usize, pred: impl Fn(char) -> bool) -> &'a str {
        let mut end = start;
        while let Some(&(idx, c)) = self.iter.peek() {
            if !pred(c) {
                break;
            }
            self.iter.next();
            end = idx + c.len_utf8();
        }
        &self.line[start..end]
    }

    pub fn run(mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        while let Some(&(idx, ch)) = self.iter.peek() {
            if ch.is_whitespace() {
                self.iter.next();
                continue;
            }
            if ch == ';' {
                break;
            }
            if let Some(kind) = single_char_token(ch) {
                self.iter.next();
                tokens.push(Token::new(kind, ch.to_string()));
                continue;
            }
            if ch == '$' {
                self.iter.next();
                let digits = self.take_while(idx + 1, |c| c.is_ascii_digit());
                if digits.is_empty() {
                    return Err(Error::InvalidToken(format!("${digits}")));
                }
                let lexeme = format!("${digits}");
                let value = digits
                    .parse::<i64>()
                    .map_err(|_| Error::OperandOutOfRange(lexeme.clone()))?;
                tokens.push(Token::new(TokenKind::Reg(value), lexeme));
                continue;
            }
            if ch == '.' {
                self.iter.next();
                let word = self.take_while(idx + 1, |c| c.is_ascii_alphanumeric());
                let lexeme = format!(".{word}");
                if lexeme != ".word" {
                    return Err(Error::InvalidDirective(lexeme));
                }
                tokens.push(Token::new(TokenKind::Word, lexeme));
                continue;
            }
            if ch == '0' && self.peek_nth(1) == Some('x') {
                self.iter.next();
                self.iter.next();
                let digits = self.take_while(idx + 2, |c| c.is_ascii_hexdigit());
                let lexeme = format!("0x{digits}");
                if digits.is_empty() {
                    return Err(Error::InvalidToken(lexeme));
                }
                let value = i64::from_str_radix(digits, 16)
                    .map_err(|_| Error::OperandOutOfRange(lexeme.clone()))?;
                tokens.push(Token::new(TokenKind::HexInt(value), lexeme));
                continue;
            }
            if ch.is_ascii_digit() || ch == '-' {
                if ch == '-' {
                    self.iter.next();
                }
                let digits = self.take_while(
                    if ch == '-' { idx + 1 } else { idx },
                    |c| c.is_ascii_digit(),
                );
                if digits.is_empty() {
                    return Err(Error::InvalidToken(ch.to_string()));
                }
                let lexeme = &self.line[idx..idx + digits.len() + usize::from(ch == '-')];
                let value = lexeme
                    .parse::<i64>()
                    .map_err(|_| Error::OperandOutOfRange(lexeme.to_string()))?;
                tokens.push(Token::new(TokenKind::Int(value), lexeme));
                continue;
            }
            if ch.is_ascii_alphabetic() {
                let name = self.take_while(idx, |c| c.is_ascii_alphanumeric());
                if self.iter.peek().map(|&(_, c)| c) == Some(':') {
                    self.iter.next();
                    tokens.push(Token::new(
                        TokenKind::Label(name.to_string()),
                        format!("{name}:"),
                    ));
                } else {
                    tokens.push(Token::new(TokenKind::Id(name.to_string()), name));
                }
                continue;
            }
            return Err(Error::InvalidToken(ch.to_string()));
        }
        Ok(tokens)
    }
}

fn single_char_token(ch: char) -> Option<TokenKind> {
    match ch {
        ',' => Some(TokenKind::Comma),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        _ => None,
    }
}
