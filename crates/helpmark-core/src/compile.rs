use crate::ast::Document;
use crate::error::CompileError;
use crate::parser::parse;
use crate::resolver::resolve;

/// Compiles raw input bytes. Invalid UTF-8 is replaced, not rejected.
pub fn compile(source: &[u8]) -> Result<Document, CompileError> {
    compile_str(&String::from_utf8_lossy(source))
}

pub fn compile_str(source: &str) -> Result<Document, CompileError> {
    let document = resolve(parse(source)?)?;
    debug_assert!(!document.has_pending_references());
    Ok(document)
}
