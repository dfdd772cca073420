pub mod analyzer;
pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod llvm_codegen;
pub mod module_loader;
pub mod parser;
pub mod symbols;
pub mod token;

use std::path::PathBuf;

use thiserror::Error;

pub use crate::diagnostics::{Diagnostic, Span};
pub use crate::llvm_codegen::{BuildMode, Codegen, CodegenOptions, OutType};

pub const DAL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Standard-library directory baked in at build time (see build.rs).
pub const DAL_STD_DIR: &str = env!("DAL_STD_DIR");

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("LLVM error: {0}")]
    Llvm(String),

    /// Source-level errors. The driver renders these with file, line,
    /// column and a caret.
    #[error("compilation failed with {} error(s)", .0.len())]
    Diagnostics(Vec<Diagnostic>),
}
