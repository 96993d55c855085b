//! LDL compiler: level text → tokens → [`StructureManager`].

pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use error::{CompileError, ErrorKind};
pub use lexer::Tokenizer;
pub use parser::Parser;
pub use token::{Token, TokenKind};

use crate::level::StructureManager;

/// The LDL compiler.
///
/// Parses level text through tokenizer → parser into a compiled
/// [`StructureManager`]. Nothing is returned unless the whole document parses.
pub struct Compiler;

impl Compiler {
    /// Compile level text into a fresh, fully populated manager.
    pub fn compile(source: &str) -> Result<StructureManager, CompileError> {
        let mut manager = StructureManager::new();
        Parser::new(source).parse(&mut manager)?;
        Ok(manager)
    }
}
