use std::fs;
use std::io;
use std::path::Path;

use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::{Diagnostic, Span};
use crate::lexer;
use crate::llvm_codegen::Codegen;
use crate::parser;
use crate::symbols::{ImportId, ImportTable};
use crate::CompileError;

/// File extension of Dal source files.
pub const SOURCE_EXT: &str = "dal";

/// Load one source file: read, tokenize, parse, register the import,
/// then chase its `import` declarations through the search paths. A
/// file is parsed at most once per compilation; the global import map
/// is keyed by canonical path.
pub fn add_code(cg: &mut Codegen, path: &Path) -> Result<ImportId, CompileError> {
    let abs = fs::canonicalize(path).map_err(|e| CompileError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if !abs.is_file() {
        return Err(CompileError::Io {
            path: abs,
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }
    let source = fs::read_to_string(&abs).map_err(|e| CompileError::Io {
        path: abs.clone(),
        source: e,
    })?;

    if cg.verbose() {
        println!("\n[+] adding code: {}", abs.display());
        println!("----------------------------------------");
    }

    let (tokens, lex_errors) = lexer::tokenize(&source, &abs);
    if !lex_errors.is_empty() {
        return Err(CompileError::Diagnostics(lex_errors));
    }

    if cg.verbose() {
        println!("\ntokens:");
        for tok in &tokens {
            println!("  {}", tok.describe(&source));
        }
    }

    let (ast, root) =
        parser::parse(&source, &abs, &tokens).map_err(|d| CompileError::Diagnostics(vec![*d]))?;

    if cg.verbose() {
        println!("\nast:");
        print!("{}", ast.dump(root, 0));
    }

    let id = ImportId(cg.imports.len());
    cg.imports.push(ImportTable::new(abs.clone(), source, ast, root));
    cg.import_map.insert(abs, id);

    let children: Vec<NodeId> = cg.import(id).ast.root_children(root).to_vec();
    for child in children {
        let target = {
            let import = cg.import(id);
            match &import.ast.node(child).kind {
                NodeKind::Import { path } => {
                    let name = import.ast.as_string(*path).unwrap_or("").to_string();
                    Some((name, import.ast.span(child)))
                }
                _ => None,
            }
        };
        if let Some((name, span)) = target {
            resolve_import(cg, id, &name, span)?;
        }
    }

    Ok(id)
}

/// Locate `<name>.dal` in the configured search roots and load it. The
/// first existing regular file wins.
fn resolve_import(
    cg: &mut Codegen,
    importer: ImportId,
    name: &str,
    span: Span,
) -> Result<(), CompileError> {
    let file_name = format!("{name}.{SOURCE_EXT}");

    for search_root in cg.search_paths.clone() {
        let candidate = search_root.join(&file_name);
        if !candidate.is_file() {
            continue;
        }
        let abs = fs::canonicalize(&candidate).map_err(|e| CompileError::Io {
            path: candidate.clone(),
            source: e,
        })?;
        if cg.import_map.contains_key(&abs) {
            return Ok(());
        }
        add_code(cg, &candidate)?;
        return Ok(());
    }

    let searched = cg
        .search_paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let import = cg.import(importer);
    let diag = Diagnostic::new(
        format!("unable to find import '{name}' (searched: {searched})"),
        &import.path,
        span,
        &import.source,
    );
    Err(CompileError::Diagnostics(vec![diag]))
}
