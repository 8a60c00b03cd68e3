mod ast;
mod coalesce;
mod compile;
mod diagnostic;
mod emit;
mod error;
mod image;
mod inline;
mod lines;
mod parser;
mod resolver;
mod variables;

pub use ast::{AnchorId, DocPart, Document, HeadingLevel, PendingReference};
pub use coalesce::coalesce_text;
pub use compile::{compile, compile_str};
pub use diagnostic::{
    Diagnostic, E_REF_UNRESOLVED, E_TITLE_DUP, E_VAR_REDEFINED, Position, RelatedDiagnostic,
};
pub use emit::{
    HtmlEmitOptions, emit_html, emit_html_sanitized, emit_html_sanitized_with_options,
    emit_html_with_options,
};
pub use error::{CompileError, ImageError, RenderError};
pub use image::{
    IMAGE_EXTENSIONS, ImageData, ImageSource, MemoryImages, has_image_extension, image_mime,
};
pub use parser::parse;
pub use resolver::resolve;
