/// One lexical token of an assembly line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Label definition, `name:`. The payload is the bare name.
    Label(String),
    /// The `.word` directive.
    Word,
    /// A mnemonic or a label used as an operand.
    Id(String),
    /// `$n`. Range checking happens in pass 1, so the raw number is kept.
    Reg(i64),
    /// Decimal literal, possibly negative.
    Int(i64),
    /// Hexadecimal literal, always unsigned.
    HexInt(i64),
    Comma,
    LParen,
    RParen,
}
