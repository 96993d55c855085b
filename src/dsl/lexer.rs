//! Tokenizer for the Level Definition Language.
//!
//! Pull-based: [`Tokenizer::next_token`] yields one [`Token`] at a time and
//! keeps returning [`TokenKind::Eos`] once the input is exhausted. To restart,
//! build a new tokenizer over the same source.
//!
//! The tokenizer never rejects input. A lexeme that looks like a directive but
//! names an unknown directive degrades to [`TokenKind::Raw`].

use std::collections::VecDeque;

use super::token::{Token, TokenKind};

const DIRECTIVE_SEPARATOR: &str = "::";

pub struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    pending: VecDeque<Token>,
}

impl Tokenizer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            pending: VecDeque::new(),
        }
    }

    /// Produce the next token. Sticky at [`TokenKind::Eos`].
    pub fn next_token(&mut self) -> Token {
        if let Some(token) = self.pending.pop_front() {
            return token;
        }

        self.skip_whitespace();

        if self.is_at_end() {
            return Token::eos(self.line, self.col);
        }

        match self.peek() {
            '{' => self.single_char(TokenKind::Begin),
            '}' => self.single_char(TokenKind::End),
            _ => self.lex_word(),
        }
    }

    /// Collect every token up to and including the first `Eos`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eos;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn peek(&self) -> char {
        self.chars[self.pos]
    }

    fn advance(&mut self) -> char {
        let ch = self.chars[self.pos];
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        ch
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    fn single_char(&mut self, kind: TokenKind) -> Token {
        let line = self.line;
        let col = self.col;
        let ch = self.advance();
        Token::new(kind, ch.to_string(), line, col)
    }

    /// Lex a whitespace/brace-delimited word and classify it.
    fn lex_word(&mut self) -> Token {
        let line = self.line;
        let col = self.col;
        let mut word = String::new();

        while !self.is_at_end() {
            let ch = self.peek();
            if ch.is_whitespace() || ch == '{' || ch == '}' {
                break;
            }
            word.push(self.advance());
        }

        match split_directive(&word) {
            Some((kind, body)) => {
                let header_len = word.len() - body.len() - DIRECTIVE_SEPARATOR.len();
                let delimiter_col = col + word[..header_len].chars().count();
                let body_col = delimiter_col + DIRECTIVE_SEPARATOR.len();
                self.pending.push_back(Token::new(
                    TokenKind::Delimiter,
                    DIRECTIVE_SEPARATOR,
                    line,
                    delimiter_col,
                ));
                self.pending
                    .push_back(Token::new(TokenKind::Mapping, body, line, body_col));
                Token::new(kind, &word[..header_len], line, col)
            }
            None => Token::new(TokenKind::Raw, word, line, col),
        }
    }
}

/// Split `#DIRECTIVE::body` into the directive kind and its body.
///
/// Only the three known directive names are recognized and the body must be
/// non-empty. Whether the body is a well-formed `key->value` is decided by
/// the parser.
fn split_directive(word: &str) -> Option<(TokenKind, &str)> {
    let rest = word.strip_prefix('#')?;
    let (name, body) = rest.split_once(DIRECTIVE_SEPARATOR)?;
    if body.is_empty() || !body.chars().all(is_mapping_char) {
        return None;
    }
    let kind = match name {
        "ALIAS" => TokenKind::Alias,
        "SETTING" => TokenKind::Setting,
        "BOSS_SETTING" => TokenKind::BossSetting,
        _ => return None,
    };
    Some((kind, body))
}

fn is_mapping_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '+' | '-' | '>' | ':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Tokenizer::new(src)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_braces() {
        assert_eq!(
            kinds("{ }"),
            vec![TokenKind::Begin, TokenKind::End, TokenKind::Eos]
        );
    }

    #[test]
    fn lex_braces_without_whitespace() {
        let tokens = Tokenizer::new("{{A B}}").tokenize();
        let values: Vec<&str> = tokens.iter().map(|t| t.value.as_str()).collect();
        assert_eq!(values, vec!["{", "{", "A", "B", "}", "}", ""]);
        assert_eq!(tokens[2].kind, TokenKind::Raw);
    }

    #[test]
    fn lex_alias_directive() {
        let tokens = Tokenizer::new("#ALIAS::B->Box").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Alias);
        assert_eq!(tokens[0].value, "#ALIAS");
        assert_eq!(tokens[1].kind, TokenKind::Delimiter);
        assert_eq!(tokens[2].kind, TokenKind::Mapping);
        assert_eq!(tokens[2].value, "B->Box");
        assert_eq!(tokens[3].kind, TokenKind::Eos);
    }

    #[test]
    fn lex_setting_and_boss_setting() {
        assert_eq!(
            kinds("#SETTING::INFINITE->1\n#BOSS_SETTING::EVERY_100->Smasher"),
            vec![
                TokenKind::Setting,
                TokenKind::Delimiter,
                TokenKind::Mapping,
                TokenKind::BossSetting,
                TokenKind::Delimiter,
                TokenKind::Mapping,
                TokenKind::Eos,
            ]
        );
    }

    #[test]
    fn lex_mapping_without_arrow_still_a_directive() {
        let tokens = Tokenizer::new("#ALIAS::X").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Alias);
        assert_eq!(tokens[2].kind, TokenKind::Mapping);
        assert_eq!(tokens[2].value, "X");
    }

    #[test]
    fn lex_unknown_directive_is_raw() {
        let tokens = Tokenizer::new("#FOO::a->b #ALIAS:: #ALIAS").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Raw);
        assert_eq!(tokens[0].value, "#FOO::a->b");
        assert_eq!(tokens[1].kind, TokenKind::Raw);
        assert_eq!(tokens[2].kind, TokenKind::Raw);
    }

    #[test]
    fn lex_eos_is_sticky() {
        let mut tokenizer = Tokenizer::new("A");
        assert_eq!(tokenizer.next_token().kind, TokenKind::Raw);
        for _ in 0..3 {
            assert_eq!(tokenizer.next_token().kind, TokenKind::Eos);
        }
    }

    #[test]
    fn lex_empty_input() {
        assert_eq!(kinds(""), vec![TokenKind::Eos]);
        assert_eq!(kinds(" \n\t "), vec![TokenKind::Eos]);
    }

    #[test]
    fn lex_line_tracking() {
        let tokens = Tokenizer::new("#SETTING::SHUFFLE->1\n{\n  { A }\n}").tokenize();
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[2].col, 11);
        assert_eq!(tokens[3].line, 2);
        assert_eq!(tokens[5].line, 3);
        assert_eq!(tokens[5].col, 5);
    }

    #[test]
    fn lex_symbols_with_modifiers() {
        let tokens = Tokenizer::new("{ Cannon:left 0 }").tokenize();
        assert_eq!(tokens[1].kind, TokenKind::Raw);
        assert_eq!(tokens[1].value, "Cannon:left");
        assert_eq!(tokens[2].value, "0");
    }
}
