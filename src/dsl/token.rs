//! Token types for the LDL tokenizer.

use std::fmt;

/// A token produced by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// The raw lexeme. Empty for [`TokenKind::Eos`].
    pub value: String,
    pub line: usize,
    pub col: usize,
}

/// The kind of token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structural
    Begin, // {
    End,   // }

    // Directive headers
    Alias,
    Setting,
    BossSetting,

    // Directive body
    Delimiter, // ::
    Mapping,   // key->value

    // Grid symbol
    Raw,

    // Special
    Eos,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
            col,
        }
    }

    pub fn eos(line: usize, col: usize) -> Self {
        Self::new(TokenKind::Eos, "", line, col)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Begin => "'{'",
            TokenKind::End => "'}'",
            TokenKind::Alias => "#ALIAS",
            TokenKind::Setting => "#SETTING",
            TokenKind::BossSetting => "#BOSS_SETTING",
            TokenKind::Delimiter => "'::'",
            TokenKind::Mapping => "mapping",
            TokenKind::Raw => "symbol",
            TokenKind::Eos => "end of input",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eos => write!(f, "{}", self.kind),
            _ => write!(f, "{} '{}'", self.kind, self.value),
        }
    }
}
