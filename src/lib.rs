//! Ahead-of-time compiler for a small, statically shaped subset of Python.
//!
//! Source text flows through [`lexer`], [`parser`] and [`codegen`], ending as
//! an [`ir::Module`] whose textual form is LLVM assembly.

use tracing::info;

use crate::token::{Span, Spanned};

/// The lexer takes the source input, mapping it into a sequence of tokens.
pub mod lexer;

/// The parser takes a sequence of tokens, mapping it into an AST. Names are
/// resolved and typed against a [`symbol_table::SymbolTable`] as it goes.
pub mod parser;

/// Code generation lowers an AST into IR.
pub mod codegen;

/// An in-memory, LLVM-flavoured intermediate representation.
pub mod ir;

pub mod ast;
pub mod symbol_table;
pub mod token;
pub mod types;

pub mod util {
    pub mod fmt;
    #[cfg(test)]
    pub(crate) mod test_utils;
}

/// Runs every stage over `src`, naming the resulting module `module_name`.
pub fn compile(src: &str, module_name: &str) -> Result<ir::Module, Error> {
    let tokens = lexer::lex(src)?;
    let module = parser::parse(&tokens)?;
    let ir = codegen::generate(&module, module_name)?;
    info!(module = module_name, functions = ir.functions.len(), "compiled");
    Ok(ir)
}

/// The first error reported by any stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Lex(Spanned<lexer::Error>),
    Parse(Spanned<parser::Error>),
    Codegen(Spanned<codegen::Error>),
}

impl Error {
    pub fn span(&self) -> Span {
        match self {
            Error::Lex(e) => e.span,
            Error::Parse(e) => e.span,
            Error::Codegen(e) => e.span,
        }
    }

    /// Name of the stage that failed, as shown in diagnostics.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Lex(_) => "lexical",
            Error::Parse(_) => "syntax",
            Error::Codegen(_) => "codegen",
        }
    }
}

impl From<Spanned<lexer::Error>> for Error {
    fn from(e: Spanned<lexer::Error>) -> Self {
        Error::Lex(e)
    }
}

impl From<Spanned<parser::Error>> for Error {
    fn from(e: Spanned<parser::Error>) -> Self {
        Error::Parse(e)
    }
}

impl From<Spanned<codegen::Error>> for Error {
    fn from(e: Spanned<codegen::Error>) -> Self {
        Error::Codegen(e)
    }
}
