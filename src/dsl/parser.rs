//! Recursive-descent parser for the Level Definition Language.
//!
//! ```text
//! document         := definition* level_block*
//! definition       := alias_def | setting_def | boss_setting_def
//! alias_def        := ALIAS DELIMITER MAPPING
//! setting_def      := SETTING DELIMITER MAPPING
//! boss_setting_def := BOSS_SETTING DELIMITER MAPPING
//! level_block      := BEGIN level_line* END
//! level_line       := BEGIN RAW* END
//! ```
//!
//! Parsing stops at the first error. Directives and level blocks may be
//! interleaved; every level block appends one structure to the manager.

use crate::level::{Structure, StructureManager};

use super::error::CompileError;
use super::lexer::Tokenizer;
use super::token::{Token, TokenKind};

const MAPPING_ARROW: &str = "->";

pub struct Parser {
    source: String,
    tokenizer: Tokenizer,
    look_ahead: Token,
}

impl Parser {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut tokenizer = Tokenizer::new(&source);
        let look_ahead = tokenizer.next_token();
        Self {
            source,
            tokenizer,
            look_ahead,
        }
    }

    /// Parse the whole document into `manager`.
    ///
    /// The parser rewinds itself afterwards (whether or not parsing
    /// succeeded), so it can be run again over the same source.
    pub fn parse(&mut self, manager: &mut StructureManager) -> Result<(), CompileError> {
        let result = self
            .parse_document(manager)
            .and_then(|()| self.read_token(TokenKind::Eos).map(drop));
        self.reset();
        result
    }

    fn parse_document(&mut self, manager: &mut StructureManager) -> Result<(), CompileError> {
        loop {
            match self.look_ahead.kind {
                TokenKind::Alias => self.parse_alias(manager)?,
                TokenKind::Setting => self.parse_setting(manager)?,
                TokenKind::BossSetting => self.parse_boss_setting(manager)?,
                TokenKind::Begin => self.parse_level(manager)?,
                _ => return Ok(()),
            }
        }
    }

    fn parse_level(&mut self, manager: &mut StructureManager) -> Result<(), CompileError> {
        let begin = self.read_token(TokenKind::Begin)?;
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut positions = Vec::new();
        while self.is_token(TokenKind::Begin) {
            positions.push((self.look_ahead.line, self.look_ahead.col));
            rows.push(self.read_level_line()?);
        }
        self.read_token(TokenKind::End)?;
        let structure = Structure::from_rows(rows).map_err(|e| {
            let (line, col) = positions[e.row];
            CompileError::ragged_rows(e.to_string(), line, col)
        })?;

        tracing::trace!(
            line = begin.line,
            rows = structure.height(),
            "parsed level block"
        );
        manager.add_structure(structure);
        Ok(())
    }

    fn read_level_line(&mut self) -> Result<Vec<String>, CompileError> {
        self.read_token(TokenKind::Begin)?;
        let mut line = Vec::new();
        while !self.is_token(TokenKind::End) {
            line.push(self.read_token(TokenKind::Raw)?.value);
        }
        self.read_token(TokenKind::End)?;
        Ok(line)
    }

    fn parse_alias(&mut self, manager: &mut StructureManager) -> Result<(), CompileError> {
        self.read_token(TokenKind::Alias)?;
        self.read_token(TokenKind::Delimiter)?;
        let (key, value, _) = self.parse_mapping()?;
        manager.set_alias(key, value);
        Ok(())
    }

    fn parse_setting(&mut self, manager: &mut StructureManager) -> Result<(), CompileError> {
        self.read_token(TokenKind::Setting)?;
        self.read_token(TokenKind::Delimiter)?;
        let (key, value, _) = self.parse_mapping()?;
        manager.set_setting(key, value);
        Ok(())
    }

    fn parse_boss_setting(&mut self, manager: &mut StructureManager) -> Result<(), CompileError> {
        self.read_token(TokenKind::BossSetting)?;
        self.read_token(TokenKind::Delimiter)?;
        let (key, value, token) = self.parse_mapping()?;
        manager
            .boss_setting_mut()
            .set_setting(&key, value)
            .map_err(|e| CompileError::invalid_mapping(e.to_string(), token.line, token.col))
    }

    /// Read a `MAPPING` token and split it at the first `->`.
    fn parse_mapping(&mut self) -> Result<(String, String, Token), CompileError> {
        let token = self.read_token(TokenKind::Mapping)?;
        match token.value.split_once(MAPPING_ARROW) {
            Some((key, value)) if !key.is_empty() && !value.is_empty() => {
                Ok((key.to_string(), value.to_string(), token.clone()))
            }
            _ => Err(CompileError::invalid_mapping(
                format!("expected 'key->value', got '{}'", token.value),
                token.line,
                token.col,
            )),
        }
    }

    fn reset(&mut self) {
        self.tokenizer = Tokenizer::new(&self.source);
        self.look_ahead = self.tokenizer.next_token();
    }

    fn is_token(&self, kind: TokenKind) -> bool {
        self.look_ahead.kind == kind
    }

    fn read_token(&mut self, kind: TokenKind) -> Result<Token, CompileError> {
        if !self.is_token(kind) {
            return Err(CompileError::unexpected(kind, &self.look_ahead));
        }
        let next = self.tokenizer.next_token();
        Ok(std::mem::replace(&mut self.look_ahead, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::error::ErrorKind;
    use crate::level::SettingKey;

    fn parse(src: &str) -> Result<StructureManager, CompileError> {
        let mut manager = StructureManager::new();
        Parser::new(src).parse(&mut manager)?;
        Ok(manager)
    }

    #[test]
    fn parse_empty_document() {
        let manager = parse("").unwrap();
        assert_eq!(manager.amount_of_structures(), 0);
        assert!(manager.aliases().is_empty());
    }

    #[test]
    fn parse_directives_only() {
        let src = "#ALIAS::B->Box\n#SETTING::INFINITE->1\n#SETTING::GROUP->forest";
        let manager = parse(src).unwrap();
        assert_eq!(manager.amount_of_structures(), 0);
        assert_eq!(manager.resolve_alias("B"), "Box");
        assert!(manager.is_setting_set(SettingKey::Infinite));
        assert_eq!(manager.setting("GROUP"), Some("forest"));
    }

    #[test]
    fn parse_single_level_block() {
        let manager = parse("{{A A A}}").unwrap();
        assert_eq!(manager.amount_of_structures(), 1);
        let s = manager.structure(0).unwrap();
        assert_eq!(s.width(), 3);
        assert_eq!(s.height(), 1);
    }

    #[test]
    fn parse_multi_row_block() {
        let src = "{\n  { . . C }\n  { . B . }\n  { F F F }\n}";
        let manager = parse(src).unwrap();
        let s = manager.structure(0).unwrap();
        assert_eq!(s.height(), 3);
        assert_eq!(s.width(), 3);
        assert_eq!(s.cell(0, 2), Some("C"));
        assert_eq!(s.cell(2, 0), Some("F"));
    }

    #[test]
    fn parse_multiple_blocks_in_order() {
        let manager = parse("{{A}} {{B B}} {{C C C}}").unwrap();
        assert_eq!(manager.amount_of_structures(), 3);
        assert_eq!(manager.structure(0).unwrap().width(), 1);
        assert_eq!(manager.structure(2).unwrap().width(), 3);
    }

    #[test]
    fn parse_directives_between_blocks() {
        let manager = parse("{{A}}\n#ALIAS::A->Box\n{{A}}").unwrap();
        assert_eq!(manager.amount_of_structures(), 2);
        assert_eq!(manager.resolve_alias("A"), "Box");
    }

    #[test]
    fn parse_empty_level_block() {
        let manager = parse("{}").unwrap();
        assert_eq!(manager.amount_of_structures(), 1);
        let s = manager.structure(0).unwrap();
        assert_eq!(s.height(), 0);
        assert_eq!(s.width(), 0);
    }

    #[test]
    fn parse_alias_last_write_wins() {
        let manager = parse("#ALIAS::B->Box #ALIAS::B->Brick").unwrap();
        assert_eq!(manager.resolve_alias("B"), "Brick");
    }

    #[test]
    fn parse_boss_setting() {
        let manager = parse("#BOSS_SETTING::100->Smasher\n{{A}}").unwrap();
        assert_eq!(manager.boss_setting().rules().len(), 1);
    }

    #[test]
    fn parse_error_missing_arrow() {
        let err = parse("#ALIAS::X").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidMapping);
        assert_eq!((err.line, err.col), (1, 9));
    }

    #[test]
    fn parse_error_empty_value() {
        let err = parse("#SETTING::SHUFFLE->").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidMapping);
    }

    #[test]
    fn parse_error_bad_boss_trigger() {
        let err = parse("#BOSS_SETTING::SOON->Smasher").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidMapping);
    }

    #[test]
    fn parse_error_zero_boss_trigger() {
        let err = parse("#BOSS_SETTING::0->Smasher\n{{A}}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidMapping);
        assert_eq!((err.line, err.col), (1, 16));
        assert!(err.message.contains("'0'"), "{}", err.message);
    }

    #[test]
    fn parse_error_raw_at_top_level() {
        let err = parse("A {{A}}").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::UnexpectedToken {
                expected: TokenKind::Eos,
                found: TokenKind::Raw,
            }
        );
    }

    #[test]
    fn parse_error_missing_brace() {
        let err = parse("{{A A}").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::UnexpectedToken {
                expected: TokenKind::End,
                found: TokenKind::Eos,
            }
        );
    }

    #[test]
    fn parse_error_raw_outside_row() {
        let err = parse("{ A }").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::UnexpectedToken {
                expected: TokenKind::End,
                found: TokenKind::Raw,
            }
        );
    }

    #[test]
    fn parse_error_ragged_rows() {
        let err = parse("{\n{A A}\n{A}\n}").unwrap_err();
        assert_eq!(err.kind, ErrorKind::RaggedRows);
        assert_eq!(err.line, 3);
    }

    #[test]
    fn parser_is_reusable() {
        let src = "#SETTING::DO_GAPS->1\n{{A B}}";
        let mut parser = Parser::new(src);
        let mut first = StructureManager::new();
        let mut second = StructureManager::new();
        parser.parse(&mut first).unwrap();
        parser.parse(&mut second).unwrap();
        assert_eq!(first, second);
    }
}
